/*!
 * # lyricsync - Playback-synchronized lyrics
 *
 * A Rust library that keeps time-coded lyrics in step with an external,
 * independently clocked media player.
 *
 * ## Features
 *
 * - Drift-correcting virtual clock between sparse position reports
 * - Line- and word-level lyrics with translation and romanization overlays
 * - Request orchestration that drops stale and duplicate fetches
 * - Background prefetch with a render gate cache
 * - Lyrics providers:
 *   - Remote lyrics service over HTTP
 *   - Local directory of JSON documents
 * - ISO 639-1 and ISO 639-2 language code support
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `lyrics`: The synchronization pipeline:
 *   - `lyrics::clock`: Virtual playback clock
 *   - `lyrics::merge`: Overlay merging
 *   - `lyrics::mode`: Display mode resolution
 *   - `lyrics::orchestrator`: Fetch orchestration
 *   - `lyrics::cache`: Render gate cache
 * - `session`: Host-facing entry points
 * - `language_utils`: ISO language code utilities
 * - `providers`: Lyrics and overlay providers:
 *   - `providers::http`: HTTP lyrics service client
 *   - `providers::local`: Local lyrics directory
 *   - `providers::mock`: Scripted providers for tests
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod errors;
pub mod language_utils;
pub mod lyrics;
pub mod providers;
pub mod session;

// Re-export main types for easier usage
pub use app_config::Config;
pub use errors::{AppError, LyricsError, ProviderError};
pub use language_utils::{get_language_name, language_codes_match, normalize_to_part1_or_part2t};
pub use lyrics::{
    DisplayMode, FetchOutcome, LyricsOrchestrator, SongInfo, TimedLyricsDocument, VirtualClock,
};
pub use session::LyricsSession;
