/*!
 * Mock provider implementations for testing.
 *
 * Responses are scripted per song (and per overlay action):
 * - `with_lyrics` / `with_overlay` - Succeed with a document
 * - `with_not_found` - Answer "no lyrics"
 * - `with_failure` / `failing` - Fail with a transport error
 * - `with_delay` - Respond after a delay, for overlap tests
 *
 * Songs without a script are answered with not-found (base) or a failed
 * overlay.
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::errors::ProviderError;
use crate::lyrics::document::{SongIdentity, SongInfo, TimedLyricsDocument};
use super::{BaseLyricsResponse, LyricsProvider, OverlayAction, OverlayProvider, OverlayResponse};

/// Scripted base-lyrics behavior for one song
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Return the document
    Found(TimedLyricsDocument),
    /// Answer that no lyrics exist
    NotFound,
    /// Fail with a transport error
    Failing,
}

/// A recorded base lyrics request
#[derive(Debug, Clone, PartialEq)]
pub struct MockLyricsCall {
    /// Requested song
    pub identity: SongIdentity,
    /// Whether a reload was forced
    pub force_reload: bool,
}

/// Mock base lyrics provider
#[derive(Debug, Clone, Default)]
pub struct MockLyricsProvider {
    scripts: Arc<Mutex<HashMap<SongIdentity, MockBehavior>>>,
    delays: Arc<Mutex<HashMap<SongIdentity, Duration>>>,
    calls: Arc<Mutex<Vec<MockLyricsCall>>>,
    request_count: Arc<AtomicUsize>,
}

impl MockLyricsProvider {
    /// Create a provider with no scripted songs
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `document` for `song`
    pub fn with_lyrics(self, song: &SongInfo, document: TimedLyricsDocument) -> Self {
        self.set_behavior(song, MockBehavior::Found(document));
        self
    }

    /// Answer not-found for `song`
    pub fn with_not_found(self, song: &SongInfo) -> Self {
        self.set_behavior(song, MockBehavior::NotFound);
        self
    }

    /// Fail with a transport error for `song`
    pub fn with_failure(self, song: &SongInfo) -> Self {
        self.set_behavior(song, MockBehavior::Failing);
        self
    }

    /// Delay responses for `song`
    pub fn with_delay(self, song: &SongInfo, delay_ms: u64) -> Self {
        self.delays.lock().insert(song.identity(), Duration::from_millis(delay_ms));
        self
    }

    /// Replace the script for `song`
    pub fn set_behavior(&self, song: &SongInfo, behavior: MockBehavior) {
        self.scripts.lock().insert(song.identity(), behavior);
    }

    /// Number of requests received
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Requests received, in order
    pub fn calls(&self) -> Vec<MockLyricsCall> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl LyricsProvider for MockLyricsProvider {
    async fn fetch_lyrics(&self, song: &SongInfo, force_reload: bool) -> Result<BaseLyricsResponse, ProviderError> {
        let identity = song.identity();
        self.request_count.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().push(MockLyricsCall {
            identity: identity.clone(),
            force_reload,
        });

        let delay = self.delays.lock().get(&identity).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let behavior = self.scripts.lock().get(&identity).cloned();
        match behavior {
            Some(MockBehavior::Found(document)) => Ok(BaseLyricsResponse::Found(document)),
            Some(MockBehavior::Failing) => Err(ProviderError::ApiError {
                message: "Simulated provider failure".to_string(),
                status_code: 500,
            }),
            Some(MockBehavior::NotFound) | None => Ok(BaseLyricsResponse::NotFound {
                reason: Some(format!("No scripted lyrics for '{}'", identity)),
            }),
        }
    }
}

/// A recorded overlay request
#[derive(Debug, Clone, PartialEq)]
pub struct MockOverlayCall {
    /// Requested overlay
    pub action: OverlayAction,
    /// Requested song
    pub identity: SongIdentity,
    /// Requested language
    pub target_language: String,
}

/// Mock overlay provider
#[derive(Debug, Clone, Default)]
pub struct MockOverlayProvider {
    overlays: Arc<Mutex<HashMap<(SongIdentity, OverlayAction), TimedLyricsDocument>>>,
    failing: Arc<Mutex<HashSet<OverlayAction>>>,
    delays: Arc<Mutex<HashMap<OverlayAction, Duration>>>,
    calls: Arc<Mutex<Vec<MockOverlayCall>>>,
}

impl MockOverlayProvider {
    /// Create a provider with no scripted overlays
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `document` for `action` on `song`
    pub fn with_overlay(self, action: OverlayAction, song: &SongInfo, document: TimedLyricsDocument) -> Self {
        self.overlays.lock().insert((song.identity(), action), document);
        self
    }

    /// Fail every `action` request with a transport error
    pub fn failing(self, action: OverlayAction) -> Self {
        self.failing.lock().insert(action);
        self
    }

    /// Delay every `action` request
    pub fn with_delay(self, action: OverlayAction, delay_ms: u64) -> Self {
        self.delays.lock().insert(action, Duration::from_millis(delay_ms));
        self
    }

    /// Requests received, in order
    pub fn calls(&self) -> Vec<MockOverlayCall> {
        self.calls.lock().clone()
    }

    /// Number of requests received for `action`
    pub fn request_count(&self, action: OverlayAction) -> usize {
        self.calls.lock().iter().filter(|call| call.action == action).count()
    }
}

#[async_trait]
impl OverlayProvider for MockOverlayProvider {
    async fn fetch_overlay(
        &self,
        action: OverlayAction,
        song: &SongInfo,
        target_language: &str,
    ) -> Result<OverlayResponse, ProviderError> {
        let identity = song.identity();
        self.calls.lock().push(MockOverlayCall {
            action,
            identity: identity.clone(),
            target_language: target_language.to_string(),
        });

        let delay = self.delays.lock().get(&action).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.lock().contains(&action) {
            return Err(ProviderError::ConnectionError(format!("Simulated {} failure", action)));
        }

        let document = self.overlays.lock().get(&(identity, action)).cloned();
        Ok(match document {
            Some(document) => OverlayResponse::Success(document),
            None => OverlayResponse::Failure {
                error: Some(format!("No scripted {} overlay", action)),
            },
        })
    }
}
