/*!
 * Renderer and host player interfaces.
 *
 * The renderer paints lines and samples `VirtualClock::time()` on its own
 * schedule; the pipeline only hands it finished documents and status
 * signals.
 */

use std::fmt;
use std::sync::Weak;

use crate::app_config::DisplaySettings;
use super::document::{SongInfo, TimedLyricsDocument};
use super::mode::DisplayMode;
use super::orchestrator::{FetchOutcome, FetchRequest, LyricsOrchestrator, OrchestratorInner};

/// Paints lyrics
pub trait Renderer: Send + Sync {
    /// Show a merged document
    fn display(&self, display: LyricsDisplay);

    /// Show the "no lyrics" state
    fn not_found(&self);

    /// Show the error state
    fn error(&self);

    /// Tear down the previous display before a new request runs
    fn cleanup(&self) {}
}

/// The media player lyrics are synchronized with
pub trait HostPlayer: Send + Sync {
    /// Seek playback to `time_ms` milliseconds
    fn seek_to(&self, time_ms: u64);
}

/// Everything a renderer needs to show a song's lyrics
#[derive(Debug, Clone)]
pub struct LyricsDisplay {
    /// Merged document
    pub document: TimedLyricsDocument,

    /// Song the document belongs to
    pub song: SongInfo,

    /// Effective display mode
    pub mode: DisplayMode,

    /// Display settings in effect
    pub settings: DisplaySettings,

    /// Callbacks back into the pipeline
    pub controls: DisplayControls,
}

/// Refetch and mode-switch callbacks handed to the renderer
///
/// Holds a weak handle, so a renderer keeping a display alive does not keep
/// the pipeline alive. Calls after the pipeline is dropped return `None`.
#[derive(Clone)]
pub struct DisplayControls {
    inner: Weak<OrchestratorInner>,
}

impl DisplayControls {
    pub(crate) fn new(inner: Weak<OrchestratorInner>) -> Self {
        Self { inner }
    }

    fn orchestrator(&self) -> Option<LyricsOrchestrator> {
        self.inner.upgrade().map(LyricsOrchestrator::from_inner)
    }

    /// Fetch lyrics for `song` again
    pub async fn refetch(&self, song: SongInfo, is_new_song: bool, force_reload: bool) -> Option<FetchOutcome> {
        let orchestrator = self.orchestrator()?;
        Some(orchestrator.fetch(FetchRequest::new(song, is_new_song, force_reload)).await)
    }

    /// Switch the display mode, re-fetching `song` or the last known song
    pub async fn switch_mode(&self, mode: DisplayMode, song: Option<SongInfo>) -> Option<FetchOutcome> {
        let orchestrator = self.orchestrator()?;
        Some(orchestrator.switch_mode(mode, song).await)
    }

    /// Whether the pipeline is still alive
    pub fn is_connected(&self) -> bool {
        self.inner.strong_count() > 0
    }
}

impl fmt::Debug for DisplayControls {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisplayControls")
            .field("connected", &self.is_connected())
            .finish()
    }
}
