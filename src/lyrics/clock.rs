/*!
 * Drift-correcting playback clock.
 *
 * The host player reports its position sparsely and with jitter. The
 * renderer samples the clock every frame, so between reports the position is
 * projected from a wall-clock anchor. Reports that stay within the drift
 * threshold of the projection are ignored; larger deviations (seeks, stalls)
 * re-anchor the clock immediately.
 */

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;

/// Default drift tolerance in seconds
pub const DEFAULT_DRIFT_THRESHOLD_SECS: f64 = 0.2;

/// Source of monotonic wall-clock time
pub trait TimeSource: Send + Sync {
    /// Seconds elapsed since an arbitrary fixed origin
    fn now_secs(&self) -> f64;
}

/// Wall-clock time from `std::time::Instant`
#[derive(Debug, Clone)]
pub struct SystemTimeSource {
    origin: Instant,
}

impl SystemTimeSource {
    /// Create a time source anchored at the current instant
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for SystemTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemTimeSource {
    fn now_secs(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Time source that only moves when told to
///
/// Clones share the same time, so a test can hold one handle and advance
/// the time seen by a clock or orchestrator holding another.
#[derive(Debug, Clone, Default)]
pub struct ManualTimeSource {
    now: Arc<Mutex<f64>>,
}

impl ManualTimeSource {
    /// Create a manual time source starting at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward by `secs`
    pub fn advance(&self, secs: f64) {
        *self.now.lock() += secs;
    }

    /// Jump to an absolute time
    pub fn set(&self, secs: f64) {
        *self.now.lock() = secs;
    }
}

impl TimeSource for ManualTimeSource {
    fn now_secs(&self) -> f64 {
        *self.now.lock()
    }
}

/// Anchor state of the virtual clock
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClockState {
    /// Whether playback is paused
    pub paused: bool,
    /// Song time while paused (or before the first play signal)
    pub paused_time: f64,
    /// Wall-clock anchor
    pub base_sys_time: f64,
    /// Song time at the wall-clock anchor
    pub base_song_time: f64,
}

impl Default for ClockState {
    fn default() -> Self {
        Self {
            paused: true,
            paused_time: 0.0,
            base_sys_time: 0.0,
            base_song_time: 0.0,
        }
    }
}

impl ClockState {
    fn projected(&self, now: f64) -> f64 {
        self.base_song_time + (now - self.base_sys_time)
    }
}

/// Predicts playback position between sparse position reports
pub struct VirtualClock {
    state: Mutex<ClockState>,
    drift_threshold: f64,
    time_source: Arc<dyn TimeSource>,
}

impl VirtualClock {
    /// Create a clock with the given drift threshold and time source
    pub fn new(drift_threshold: f64, time_source: Arc<dyn TimeSource>) -> Self {
        Self {
            state: Mutex::new(ClockState::default()),
            drift_threshold,
            time_source,
        }
    }

    /// Create a clock on system time with the default threshold
    pub fn with_system_time() -> Self {
        Self::new(DEFAULT_DRIFT_THRESHOLD_SECS, Arc::new(SystemTimeSource::new()))
    }

    /// Feed a position report from the host player
    pub fn sync(&self, song_time: f64) {
        let now = self.time_source.now_secs();
        let mut state = self.state.lock();

        if state.paused {
            state.paused_time = song_time;
            return;
        }

        let drift = (song_time - state.projected(now)).abs();
        if drift > self.drift_threshold {
            log::trace!("Clock drift {:.3}s, re-anchoring at {:.3}s", drift, song_time);
            state.base_sys_time = now;
            state.base_song_time = song_time;
        }
    }

    /// Feed a play/pause signal from the host player
    pub fn set_playing(&self, is_playing: bool) {
        let now = self.time_source.now_secs();
        let mut state = self.state.lock();

        if is_playing && state.paused {
            state.paused = false;
            state.base_song_time = state.paused_time;
            state.base_sys_time = now;
        } else if !is_playing && !state.paused {
            state.paused_time = state.projected(now);
            state.paused = true;
        }
    }

    /// Current estimated playback position in seconds
    pub fn time(&self) -> f64 {
        let state = self.state.lock();
        if state.paused {
            state.paused_time
        } else {
            state.projected(self.time_source.now_secs())
        }
    }

    /// Whether the clock is paused
    pub fn is_paused(&self) -> bool {
        self.state.lock().paused
    }

    /// Snapshot of the anchor state
    pub fn state(&self) -> ClockState {
        *self.state.lock()
    }

    /// The configured drift threshold in seconds
    pub fn drift_threshold(&self) -> f64 {
        self.drift_threshold
    }
}

impl std::fmt::Debug for VirtualClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VirtualClock")
            .field("state", &self.state())
            .field("drift_threshold", &self.drift_threshold)
            .finish()
    }
}
