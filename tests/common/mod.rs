/*!
 * Common test utilities for the lyricsync test suite
 */

#![allow(dead_code)]

use anyhow::Result;
use parking_lot::Mutex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use lyricsync::lyrics::{
    DisplayMode, HostPlayer, LyricLine, LyricsDisplay, LyricsKind, LyricsOrchestrator, ManualTimeSource,
    OrchestratorConfig, Renderer, SongInfo, Syllable, TimedLyricsDocument,
};
use lyricsync::providers::mock::{MockLyricsProvider, MockOverlayProvider};

/// Initialize logging once for tests that want to see pipeline logs
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// A song with the given title by "Artist"
pub fn song(title: &str) -> SongInfo {
    SongInfo::new(title, "Artist", Some("Album"), Some(180.0))
}

/// A line-level document with one line per text, two seconds apart
pub fn line_document(texts: &[&str]) -> TimedLyricsDocument {
    let lines = texts
        .iter()
        .enumerate()
        .map(|(i, text)| LyricLine::new(i as f64 * 2.0, i as f64 * 2.0 + 1.5, *text))
        .collect();
    TimedLyricsDocument::new(LyricsKind::Line, lines)
}

/// A translation overlay for `base`, one translated text per line
pub fn translation_document(base: &TimedLyricsDocument, translations: &[&str]) -> TimedLyricsDocument {
    let lines = base
        .lines
        .iter()
        .zip(translations)
        .map(|(line, translated)| LyricLine::new(line.start_time, line.end_time, line.text.clone()).with_translation(*translated))
        .collect();
    TimedLyricsDocument::new(LyricsKind::Line, lines)
}

/// A word-level document, one line per group of syllables
pub fn word_document(lines: &[&[&str]]) -> TimedLyricsDocument {
    let lines = lines
        .iter()
        .enumerate()
        .map(|(i, syllables)| {
            let start = i as f64 * 2.0;
            let syllables: Vec<Syllable> = syllables
                .iter()
                .enumerate()
                .map(|(j, text)| Syllable::new(start + j as f64 * 0.25, start + (j + 1) as f64 * 0.25, *text))
                .collect();
            let text: String = syllables.iter().map(|s| s.text.as_str()).collect();
            LyricLine::new(start, start + 1.5, text).with_syllables(syllables)
        })
        .collect();
    TimedLyricsDocument::new(LyricsKind::Word, lines)
}

/// What a recording renderer was told
#[derive(Debug, Clone)]
pub enum RenderEvent {
    Display(LyricsDisplay),
    NotFound,
    Error,
    Cleanup,
}

/// Renderer that records every call
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    events: Mutex<Vec<RenderEvent>>,
    slow_display: Option<(String, Duration)>,
}

impl RecordingRenderer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A renderer that blocks for `delay` before recording displays of `title`
    pub fn with_slow_display(title: &str, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            slow_display: Some((title.to_string(), delay)),
            ..Self::default()
        })
    }

    pub fn events(&self) -> Vec<RenderEvent> {
        self.events.lock().clone()
    }

    /// Displays received, in order
    pub fn displays(&self) -> Vec<LyricsDisplay> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                RenderEvent::Display(display) => Some(display.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn not_found_count(&self) -> usize {
        self.events.lock().iter().filter(|e| matches!(e, RenderEvent::NotFound)).count()
    }

    pub fn error_count(&self) -> usize {
        self.events.lock().iter().filter(|e| matches!(e, RenderEvent::Error)).count()
    }

    pub fn cleanup_count(&self) -> usize {
        self.events.lock().iter().filter(|e| matches!(e, RenderEvent::Cleanup)).count()
    }
}

impl Renderer for RecordingRenderer {
    fn display(&self, display: LyricsDisplay) {
        if let Some((title, delay)) = &self.slow_display {
            if display.song.title == *title {
                std::thread::sleep(*delay);
            }
        }
        self.events.lock().push(RenderEvent::Display(display));
    }

    fn not_found(&self) {
        self.events.lock().push(RenderEvent::NotFound);
    }

    fn error(&self) {
        self.events.lock().push(RenderEvent::Error);
    }

    fn cleanup(&self) {
        self.events.lock().push(RenderEvent::Cleanup);
    }
}

/// Host player that records seek requests
#[derive(Debug, Default)]
pub struct RecordingHost {
    seeks: Mutex<Vec<u64>>,
}

impl RecordingHost {
    pub fn seeks(&self) -> Vec<u64> {
        self.seeks.lock().clone()
    }
}

impl HostPlayer for RecordingHost {
    fn seek_to(&self, time_ms: u64) {
        self.seeks.lock().push(time_ms);
    }
}

/// An orchestrator wired to mocks, with handles to inspect them
pub struct TestPipeline {
    pub orchestrator: LyricsOrchestrator,
    pub lyrics: MockLyricsProvider,
    pub overlays: MockOverlayProvider,
    pub renderer: Arc<RecordingRenderer>,
    pub time: ManualTimeSource,
}

/// Orchestrator config with the given intended mode for new songs
pub fn config_for_mode(mode: DisplayMode) -> OrchestratorConfig {
    let mut config = OrchestratorConfig::default();
    config.settings.translation_enabled = mode.needs_translation();
    config.settings.romanization_enabled = mode.needs_romanization();
    config.debounce = Duration::from_millis(200);
    config
}

/// Build an orchestrator over mock providers on manual time
pub fn create_pipeline(
    lyrics: MockLyricsProvider,
    overlays: MockOverlayProvider,
    config: OrchestratorConfig,
) -> TestPipeline {
    let renderer = RecordingRenderer::new();
    let time = ManualTimeSource::new();
    let orchestrator = LyricsOrchestrator::with_time_source(
        Arc::new(lyrics.clone()),
        Arc::new(overlays.clone()),
        renderer.clone(),
        config,
        Arc::new(time.clone()),
    );

    TestPipeline {
        orchestrator,
        lyrics,
        overlays,
        renderer,
        time,
    }
}
