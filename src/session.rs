use log::{debug, info};
use parking_lot::Mutex;
use std::sync::Arc;

use crate::lyrics::{
    FetchOutcome, FetchRequest, HostPlayer, LyricsOrchestrator, ShowOutcome, SongIdentity, SongInfo, VirtualClock,
};

// @module: Host-facing lyrics session

/// Entry points the host player calls into
///
/// Track changes go to the orchestrator; position and play-state reports go
/// to the clock the renderer samples.
pub struct LyricsSession {
    // @field: Fetch pipeline
    orchestrator: LyricsOrchestrator,
    // @field: Playback clock shared with the renderer
    clock: Arc<VirtualClock>,
    // @field: Player receiving seek requests
    host: Arc<dyn HostPlayer>,
    // @field: Last track searched or loaded
    last_track: Mutex<Option<SongIdentity>>,
}

impl LyricsSession {
    // @method: Create a session
    pub fn new(orchestrator: LyricsOrchestrator, clock: Arc<VirtualClock>, host: Arc<dyn HostPlayer>) -> Self {
        Self {
            orchestrator,
            clock,
            host,
            last_track: Mutex::new(None),
        }
    }

    /// Prefetch lyrics for an upcoming track without rendering them
    ///
    /// Returns `None` when the track was already searched or loaded.
    pub async fn search_song(&self, song: SongInfo) -> Option<FetchOutcome> {
        if !self.remember(&song) {
            debug!("Ignoring repeated search for '{}'", song.identity());
            return None;
        }

        self.orchestrator.set_search_only(true);
        Some(self.orchestrator.fetch(FetchRequest::new_song(song)).await)
    }

    /// Render what the last search prefetched
    pub fn show_song(&self) -> ShowOutcome {
        self.orchestrator.show()
    }

    /// Fetch and render lyrics for a track that is playing now
    ///
    /// A load debounced by a recent search of the same track renders what
    /// that search cached.
    pub async fn load_song(&self, song: SongInfo) -> FetchOutcome {
        self.remember(&song);
        self.orchestrator.set_search_only(false);

        let outcome = self.orchestrator.fetch(FetchRequest::new_song(song)).await;
        if outcome == FetchOutcome::Debounced && self.orchestrator.show() == ShowOutcome::Rendered {
            debug!("Rendered prefetched lyrics for debounced load");
        }
        outcome
    }

    /// Position report in milliseconds
    pub fn update_time(&self, time_ms: f64) {
        self.clock.sync(time_ms / 1000.0);
    }

    /// Play/pause report
    pub fn set_playing(&self, is_playing: bool) {
        self.clock.set_playing(is_playing);
    }

    /// Seek the player to the start of a line of the last fetched lyrics
    ///
    /// Returns the line start in seconds, or `None` for an unknown line.
    pub fn seek_to_line(&self, index: usize) -> Option<f64> {
        let start = self.orchestrator.last_fetched()?.line_start(index)?;

        info!("Seeking to line {} at {:.3}s", index, start);
        self.host.seek_to((start * 1000.0).round() as u64);
        self.clock.sync(start);
        Some(start)
    }

    /// Predicted playback position in seconds
    pub fn current_time(&self) -> f64 {
        self.clock.time()
    }

    /// Index of the line active at the current position
    pub fn active_line(&self) -> Option<usize> {
        self.orchestrator.last_fetched()?.active_line_index(self.clock.time())
    }

    /// The fetch pipeline
    pub fn orchestrator(&self) -> &LyricsOrchestrator {
        &self.orchestrator
    }

    /// The playback clock
    pub fn clock(&self) -> &Arc<VirtualClock> {
        &self.clock
    }

    /// Record `song` as the last track, returning false if it already was
    fn remember(&self, song: &SongInfo) -> bool {
        let identity = song.identity();
        let mut last_track = self.last_track.lock();
        if last_track.as_ref() == Some(&identity) {
            return false;
        }
        *last_track = Some(identity);
        true
    }
}
