/*!
 * Playback-synchronized lyrics pipeline.
 *
 * This module contains the pipeline between a media player and a lyrics
 * renderer. It is split into several submodules:
 *
 * - `document`: Timed lyrics document model
 * - `clock`: Drift-correcting playback clock
 * - `merge`: Merging of base lyrics with overlays
 * - `mode`: Display mode resolution
 * - `cache`: Render gate cache for search-only mode
 * - `orchestrator`: Request orchestration
 * - `renderer`: Renderer and host player interfaces
 */

// Re-export main types for easier usage
pub use self::cache::{CachedDisplay, RenderCache};
pub use self::clock::{ClockState, ManualTimeSource, SystemTimeSource, TimeSource, VirtualClock};
pub use self::document::{
    LyricLine, LyricsKind, LyricsMetadata, SongIdentity, SongInfo, Syllable, TimedLyricsDocument,
};
pub use self::merge::{collapse_to_lines, merge_lyrics};
pub use self::mode::{DisplayMode, resolve_mode};
pub use self::orchestrator::{
    FetchOutcome, FetchPhase, FetchRequest, LyricsOrchestrator, OrchestratorConfig, ShowOutcome,
};
pub use self::renderer::{DisplayControls, HostPlayer, LyricsDisplay, Renderer};

// Submodules
pub mod cache;
pub mod clock;
pub mod document;
pub mod merge;
pub mod mode;
pub mod orchestrator;
pub mod renderer;
