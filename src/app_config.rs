use anyhow::{Result, anyhow, Context};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Display settings handed to the renderer
    #[serde(default)]
    pub display: DisplaySettings,

    /// Clock and request timing
    #[serde(default)]
    pub sync: SyncConfig,

    /// Lyrics provider settings
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Target language code for translations (ISO)
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Which text is shown enlarged by the renderer
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LargerTextMode {
    /// Original lyrics are the main text
    #[default]
    Lyrics,
    /// Romanization is the main text
    Romanization,
}

/// Display settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DisplaySettings {
    /// Show translations for new songs
    #[serde(default)]
    pub translation_enabled: bool,

    /// Show romanizations for new songs
    #[serde(default)]
    pub romanization_enabled: bool,

    /// Keep word-level timing (false collapses it to line-level)
    #[serde(default = "default_true")]
    pub word_by_word: bool,

    /// Which text is shown enlarged
    #[serde(default)]
    pub larger_text_mode: LargerTextMode,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            translation_enabled: false,
            romanization_enabled: false,
            word_by_word: true,
            larger_text_mode: LargerTextMode::default(),
        }
    }
}

/// Clock and request timing configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SyncConfig {
    /// Position deviation (seconds) tolerated before the clock re-anchors
    #[serde(default = "default_drift_threshold_secs")]
    pub drift_threshold_secs: f64,

    /// Window (milliseconds) in which duplicate requests are dropped
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl SyncConfig {
    /// Debounce window as a duration
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            drift_threshold_secs: default_drift_threshold_secs(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

/// Lyrics provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    // @provider: Remote lyrics service over HTTP
    #[default]
    Http,
    // @provider: Directory of JSON lyrics documents
    Local,
}

impl ProviderKind {
    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Http => "http".to_string(),
            Self::Local => "local".to_string(),
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "local" => Ok(Self::Local),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type", default)]
    pub kind: ProviderKind,

    // @field: Service URL (http provider)
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    // @field: Lyrics directory (local provider)
    #[serde(default = "default_lyrics_dir")]
    pub lyrics_dir: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::default(),
            endpoint: default_endpoint(),
            lyrics_dir: default_lyrics_dir(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Matching `log` filter
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_drift_threshold_secs() -> f64 {
    0.2
}

fn default_debounce_ms() -> u64 {
    200
}

fn default_target_language() -> String {
    "en".to_string()
}

fn default_endpoint() -> String {
    "http://localhost:8787".to_string()
}

fn default_lyrics_dir() -> String {
    "lyrics".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Config {
    /// Load a configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .context(format!("Failed to open config file: {}", path.display()))?;

        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Write the configuration as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;

        std::fs::write(path, config_json)
            .context(format!("Failed to write config to file: {}", path.display()))?;

        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        let _target_name = crate::language_utils::get_language_name(&self.target_language)?;

        if !(self.sync.drift_threshold_secs > 0.0) {
            return Err(anyhow!(
                "Drift threshold must be positive, got {}",
                self.sync.drift_threshold_secs
            ));
        }

        match self.provider.kind {
            ProviderKind::Http => {
                url::Url::parse(&self.provider.endpoint)
                    .context(format!("Invalid provider endpoint: {}", self.provider.endpoint))?;
            }
            ProviderKind::Local => {
                if self.provider.lyrics_dir.trim().is_empty() {
                    return Err(anyhow!("A lyrics directory is required for the local provider"));
                }
            }
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            display: DisplaySettings::default(),
            sync: SyncConfig::default(),
            provider: ProviderConfig::default(),
            target_language: default_target_language(),
            log_level: LogLevel::default(),
        }
    }
}
