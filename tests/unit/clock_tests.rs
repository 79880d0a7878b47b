/*!
 * Tests for the drift-correcting virtual clock
 */

use std::sync::Arc;
use lyricsync::lyrics::{ManualTimeSource, VirtualClock};

fn create_clock(threshold: f64) -> (VirtualClock, ManualTimeSource) {
    let time = ManualTimeSource::new();
    (VirtualClock::new(threshold, Arc::new(time.clone())), time)
}

fn assert_close(actual: f64, expected: f64) {
    assert!((actual - expected).abs() < 1e-9, "expected {}, got {}", expected, actual);
}

/// Jittery reports within the threshold never move the anchor
#[test]
fn test_sync_withJitterBelowThreshold_shouldFollowWallClock() {
    let (clock, time) = create_clock(0.2);
    clock.sync(30.0);
    clock.set_playing(true);

    let jitter = [0.1, -0.15, 0.05, 0.18, -0.18];
    for (i, offset) in jitter.iter().enumerate() {
        time.advance(0.25);
        let true_position = 30.0 + (i + 1) as f64 * 0.25;
        clock.sync(true_position + offset);
    }

    assert_close(clock.time(), 31.25);
}

/// A seek snaps the clock to the reported position
#[test]
fn test_sync_afterSeek_shouldReportNewPosition() {
    let (clock, time) = create_clock(0.2);
    clock.set_playing(true);
    time.advance(10.0);

    clock.sync(95.0);
    assert_close(clock.time(), 95.0);

    time.advance(2.0);
    assert_close(clock.time(), 97.0);
}

/// A stalled player drifts behind and is corrected on the next report
#[test]
fn test_sync_afterStall_shouldCorrectBackwards() {
    let (clock, time) = create_clock(0.2);
    clock.set_playing(true);

    time.advance(5.0);
    clock.sync(3.0);

    assert_close(clock.time(), 3.0);
}

/// Pausing freezes the position; resuming continues from it
#[test]
fn test_setPlaying_pauseAndResume_shouldContinueFromPausedPosition() {
    let (clock, time) = create_clock(0.2);
    clock.set_playing(true);
    time.advance(4.0);

    clock.set_playing(false);
    time.advance(60.0);
    assert_close(clock.time(), 4.0);

    clock.set_playing(true);
    time.advance(1.0);
    assert_close(clock.time(), 5.0);
}

/// A larger threshold tolerates larger deviations
#[test]
fn test_sync_withCustomThreshold_shouldUseIt() {
    let (clock, time) = create_clock(1.0);
    clock.set_playing(true);
    time.advance(2.0);

    clock.sync(2.8);

    assert_close(clock.time(), 2.0);
    assert_eq!(clock.drift_threshold(), 1.0);
}

/// Anchors are relative to the time source, whatever its epoch
#[test]
fn test_time_withLateTimeSourceEpoch_shouldMeasureFromAnchor() {
    let (clock, time) = create_clock(0.2);
    time.set(1_700_000_000.0);
    clock.sync(12.0);
    clock.set_playing(true);

    time.set(1_700_000_003.5);

    assert_close(clock.time(), 15.5);
}
