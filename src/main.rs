// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow, Context};
use log::{warn, info, debug, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use parking_lot::Mutex;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use clap::{Parser, ValueEnum, CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use lyricsync::app_config::{self, Config, ProviderKind};
use lyricsync::lyrics::{
    DisplayMode, FetchOutcome, HostPlayer, LyricsDisplay, LyricsOrchestrator, OrchestratorConfig, Renderer, SongInfo,
    TimedLyricsDocument, VirtualClock, merge_lyrics, resolve_mode,
};
use lyricsync::lyrics::clock::SystemTimeSource;
use lyricsync::providers::http::HttpLyricsProvider;
use lyricsync::providers::local::LocalLyricsProvider;
use lyricsync::providers::{JsonLyricsParser, LyricsParser, LyricsProvider, OverlayProvider};
use lyricsync::session::LyricsSession;

/// CLI Wrapper for ProviderKind to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliProviderKind {
    Http,
    Local,
}

impl From<CliProviderKind> for ProviderKind {
    fn from(cli_provider: CliProviderKind) -> Self {
        match cli_provider {
            CliProviderKind::Http => ProviderKind::Http,
            CliProviderKind::Local => ProviderKind::Local,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

/// CLI Wrapper for DisplayMode to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliDisplayMode {
    None,
    Translate,
    Romanize,
    Both,
}

impl From<CliDisplayMode> for DisplayMode {
    fn from(cli_mode: CliDisplayMode) -> Self {
        match cli_mode {
            CliDisplayMode::None => DisplayMode::None,
            CliDisplayMode::Translate => DisplayMode::Translate,
            CliDisplayMode::Romanize => DisplayMode::Romanize,
            CliDisplayMode::Both => DisplayMode::Both,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch lyrics for a song and print them
    Show(ShowArgs),

    /// Merge lyrics documents from files and print the result as JSON
    Merge(MergeArgs),

    /// Generate shell completions for lyricsync
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct ShowArgs {
    /// Track title
    #[arg(long)]
    title: String,

    /// Track artist
    #[arg(long)]
    artist: String,

    /// Album name
    #[arg(long)]
    album: Option<String>,

    /// Track duration in seconds
    #[arg(long)]
    duration: Option<f64>,

    /// Show translations
    #[arg(long)]
    translate: bool,

    /// Show romanizations
    #[arg(long)]
    romanize: bool,

    /// Collapse word-level timing to lines
    #[arg(long)]
    line_mode: bool,

    /// Play the lyrics back in real time
    #[arg(long)]
    play: bool,

    /// Lyrics provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliProviderKind>,

    /// Target language code for translations (e.g., 'en', 'es', 'fr')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

#[derive(Parser, Debug)]
struct MergeArgs {
    /// Base lyrics document
    #[arg(long)]
    base: PathBuf,

    /// Translation overlay document
    #[arg(long)]
    translation: Option<PathBuf>,

    /// Romanization overlay document
    #[arg(long)]
    romanization: Option<PathBuf>,

    /// Intended display mode (defaults to the overlays given)
    #[arg(long, value_enum)]
    mode: Option<CliDisplayMode>,
}

/// lyricsync - Playback-synchronized lyrics
///
/// Fetches time-coded lyrics with translation and romanization overlays and
/// keeps them in step with a media player.
#[derive(Parser, Debug)]
#[command(name = "lyricsync")]
#[command(version)]
#[command(about = "Playback-synchronized lyrics tool")]
#[command(long_about = "lyricsync fetches time-coded lyrics, merges translation and romanization overlays, and plays them back in sync.

EXAMPLES:
    lyricsync show --title Song --artist Artist            # Fetch and print lyrics
    lyricsync show --title Song --artist Artist --romanize # With romanization
    lyricsync show --title Song --artist Artist --play     # Play back in real time
    lyricsync show -p local --title Song --artist Artist   # Read from the lyrics directory
    lyricsync merge --base a.json --translation b.json     # Merge documents
    lyricsync completions bash > lyricsync.bash            # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI color for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let level = record.level();

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {} {}\x1B[0m",
                Self::get_color_for_level(level),
                now,
                Self::get_emoji_for_level(level),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Prints delivered lyrics to stdout
#[derive(Default)]
struct ConsoleRenderer {
    // @field: Last delivered display
    last_display: Mutex<Option<LyricsDisplay>>,
}

impl ConsoleRenderer {
    fn print_document(document: &TimedLyricsDocument, mode: DisplayMode) {
        for line in &document.lines {
            println!("[{}] {}", format_timestamp(line.start_time), line.text);

            if mode.needs_romanization() {
                let syllables: String = line
                    .syllables
                    .iter()
                    .map(|s| s.romanized_text.as_deref().unwrap_or(s.text.as_str()))
                    .collect();
                let romanized = line.romanized_text.clone().unwrap_or(syllables);
                if !romanized.is_empty() {
                    println!("           {}", romanized);
                }
            }
            if mode.needs_translation() {
                if let Some(translated) = &line.translated_text {
                    println!("           {}", translated);
                }
            }
        }
    }
}

impl Renderer for ConsoleRenderer {
    fn display(&self, display: LyricsDisplay) {
        println!("{} ({} mode, {:?} timing)", display.song.identity(), display.mode, display.document.kind);
        Self::print_document(&display.document, display.mode);
        *self.last_display.lock() = Some(display);
    }

    fn not_found(&self) {
        println!("No lyrics found");
    }

    fn error(&self) {
        println!("Lyrics could not be loaded");
    }

    fn cleanup(&self) {
        self.last_display.lock().take();
    }
}

/// Host that only logs seek requests
struct ConsoleHost;

impl HostPlayer for ConsoleHost {
    fn seek_to(&self, time_ms: u64) {
        info!("Seek to {} ms", time_ms);
    }
}

/// Output of the merge command
#[derive(Serialize)]
struct MergeOutput {
    mode: DisplayMode,
    lyrics: TimedLyricsDocument,
}

fn format_timestamp(seconds: f64) -> String {
    let total_ms = (seconds * 1000.0).round() as u64;
    format!("{:02}:{:02}.{:03}", total_ms / 60_000, (total_ms / 1000) % 60, total_ms % 1000)
}

fn apply_log_level(level: &app_config::LogLevel) {
    log::set_max_level(level.to_level_filter());
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once; the max level starts at info and is
    // updated after loading the config
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "lyricsync", &mut std::io::stdout());
            Ok(())
        }
        Commands::Show(args) => run_show(args).await,
        Commands::Merge(args) => run_merge(args),
    }
}

/// Load the configuration file, creating a default one when missing
fn load_or_create_config(config_path: &str) -> Result<Config> {
    let path = Path::new(config_path);
    if path.exists() {
        return Config::from_file(path);
    }

    warn!("Config file not found at '{}', creating default config.", config_path);
    let config = Config::default();
    config.save(path)
        .context(format!("Failed to write default config to file: {}", config_path))?;
    Ok(config)
}

fn build_providers(config: &Config) -> Result<(Arc<dyn LyricsProvider>, Arc<dyn OverlayProvider>)> {
    match config.provider.kind {
        ProviderKind::Http => {
            let provider = Arc::new(HttpLyricsProvider::new(&config.provider.endpoint, config.provider.timeout_secs)?);
            let lyrics: Arc<dyn LyricsProvider> = provider.clone();
            let overlay: Arc<dyn OverlayProvider> = provider;
            Ok((lyrics, overlay))
        }
        ProviderKind::Local => {
            let provider = Arc::new(LocalLyricsProvider::new(&config.provider.lyrics_dir));
            let lyrics: Arc<dyn LyricsProvider> = provider.clone();
            let overlay: Arc<dyn OverlayProvider> = provider;
            Ok((lyrics, overlay))
        }
    }
}

async fn run_show(options: ShowArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        apply_log_level(&cmd_log_level.clone().into());
    }

    let mut config = load_or_create_config(&options.config_path)?;

    // Override config with CLI options if provided
    if let Some(provider) = &options.provider {
        config.provider.kind = provider.clone().into();
    }
    if let Some(target_lang) = &options.target_language {
        config.target_language = target_lang.clone();
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
    config.display.translation_enabled |= options.translate;
    config.display.romanization_enabled |= options.romanize;
    if options.line_mode {
        config.display.word_by_word = false;
    }

    config.validate()
        .context("Configuration validation failed")?;

    if options.log_level.is_none() {
        apply_log_level(&config.log_level);
    }

    let (lyrics_provider, overlay_provider) = build_providers(&config)?;
    let renderer = Arc::new(ConsoleRenderer::default());
    let orchestrator = LyricsOrchestrator::new(
        lyrics_provider,
        overlay_provider,
        renderer.clone(),
        OrchestratorConfig::from_config(&config),
    );
    let clock = Arc::new(VirtualClock::new(
        config.sync.drift_threshold_secs,
        Arc::new(SystemTimeSource::new()),
    ));
    let session = LyricsSession::new(orchestrator, clock, Arc::new(ConsoleHost));

    let song = SongInfo::new(&options.title, &options.artist, options.album.as_deref(), options.duration)
        .with_source("cli");

    match session.load_song(song).await {
        FetchOutcome::Delivered { mode } => debug!("Delivered in {} mode", mode),
        FetchOutcome::NotFound => return Ok(()),
        FetchOutcome::Errored => return Err(anyhow!("Failed to fetch lyrics for '{}'", options.title)),
        other => debug!("Fetch ended with {:?}", other),
    }

    if options.play {
        play(&session).await;
    }

    Ok(())
}

/// Print each line as the clock reaches it
async fn play(session: &LyricsSession) {
    let Some(document) = session.orchestrator().last_fetched() else {
        return;
    };
    let end = document.lines.last().map(|line| line.end_time).unwrap_or(0.0);

    session.update_time(0.0);
    session.set_playing(true);

    let mut ticker = tokio::time::interval(Duration::from_millis(50));
    let mut current = None;

    while session.current_time() <= end {
        ticker.tick().await;

        let active = session.active_line();
        if active != current {
            if let Some(line) = active.and_then(|index| document.lines.get(index)) {
                println!("[{}] {}", format_timestamp(session.current_time()), line.text);
            }
            current = active;
        }
    }

    session.set_playing(false);
}

fn run_merge(options: MergeArgs) -> Result<()> {
    let parser = JsonLyricsParser;
    let read = |path: &Path| -> Result<TimedLyricsDocument> {
        let raw = std::fs::read_to_string(path)
            .context(format!("Failed to read lyrics file: {}", path.display()))?;
        parser.parse(&raw)
            .context(format!("Failed to parse lyrics file: {}", path.display()))
    };

    let base = read(&options.base)?;
    let translation = options.translation.as_deref().map(&read).transpose()?;
    let romanization = options.romanization.as_deref().map(&read).transpose()?;

    let intended = options
        .mode
        .map(DisplayMode::from)
        .unwrap_or_else(|| DisplayMode::from_flags(translation.is_some(), romanization.is_some()));

    let output = MergeOutput {
        mode: resolve_mode(intended, translation.is_some(), romanization.is_some()),
        lyrics: merge_lyrics(&base, translation.as_ref(), romanization.as_ref()),
    };

    println!("{}", serde_json::to_string_pretty(&output).context("Failed to serialize merged lyrics")?);
    Ok(())
}
