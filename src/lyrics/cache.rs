/*!
 * Render gate cache.
 *
 * While lyrics are prefetched in the background (search-only mode) the
 * merged result is parked here instead of being rendered. Only the latest
 * result is kept, and it is only released for the song it belongs to.
 */

use std::sync::Arc;
use parking_lot::RwLock;
use log::debug;

use crate::app_config::DisplaySettings;
use super::document::{SongIdentity, SongInfo, TimedLyricsDocument};
use super::mode::DisplayMode;

/// A merged result waiting to be rendered
#[derive(Debug, Clone, PartialEq)]
pub struct CachedDisplay {
    /// Merged lyrics document
    pub document: TimedLyricsDocument,

    /// Song the document belongs to
    pub song: SongInfo,

    /// Effective display mode
    pub mode: DisplayMode,

    /// Settings in effect when the result was produced
    pub settings: DisplaySettings,
}

impl CachedDisplay {
    /// Identity of the cached song
    pub fn identity(&self) -> SongIdentity {
        self.song.identity()
    }
}

/// Holds at most one pending merged result
#[derive(Debug, Default)]
pub struct RenderCache {
    /// Internal slot
    slot: Arc<RwLock<Option<CachedDisplay>>>,
}

impl RenderCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a result, replacing any previous one
    pub fn store(&self, entry: CachedDisplay) {
        debug!("Caching lyrics for '{}' ({})", entry.song.identity(), entry.mode);
        *self.slot.write() = Some(entry);
    }

    /// Take the stored result if it belongs to `expected`
    ///
    /// A result for another song is left in place.
    pub fn take(&self, expected: &SongIdentity) -> Option<CachedDisplay> {
        let mut slot = self.slot.write();

        match slot.as_ref() {
            Some(entry) if entry.identity() == *expected => {
                debug!("Cache hit for '{}'", expected);
                slot.take()
            }
            Some(entry) => {
                debug!("Cache holds '{}', not '{}'", entry.identity(), expected);
                None
            }
            None => {
                debug!("Cache miss for '{}'", expected);
                None
            }
        }
    }

    /// Drop the stored result
    pub fn clear(&self) {
        if self.slot.write().take().is_some() {
            debug!("Render cache cleared");
        }
    }

    /// Identity of the stored result, if any
    pub fn cached_identity(&self) -> Option<SongIdentity> {
        self.slot.read().as_ref().map(CachedDisplay::identity)
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.slot.read().is_none()
    }
}

impl Clone for RenderCache {
    fn clone(&self) -> Self {
        Self {
            slot: self.slot.clone(),
        }
    }
}
