/*!
 * Fetch orchestration.
 *
 * A request runs through these phases:
 * - `FetchingBase`: base lyrics are looked up
 * - `FetchingOverlays`: translation and romanization are fetched concurrently
 * - `Merging`: overlays are merged and the effective mode resolved
 * - `Delivered` / `Cached`: the result goes to the renderer, or to the cache
 *   in search-only mode
 *
 * Every accepted request takes a new generation number. After each await
 * the request checks that its generation is still the latest one; if not, it
 * was superseded and its result is dropped without reaching the renderer.
 *
 * Renderer calls are serialized by a render lock, and a result is only
 * handed over while its generation is still the latest. A newer request's
 * `cleanup` therefore always follows any display it raced with. Renderer
 * methods must not call back into the orchestrator synchronously.
 */

use futures::join;
use log::{debug, error, info, warn};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::{Config, DisplaySettings, LargerTextMode};
use crate::errors::LyricsError;
use crate::language_utils;
use crate::providers::{BaseLyricsResponse, LyricsProvider, OverlayAction, OverlayProvider, OverlayResponse};
use super::cache::{CachedDisplay, RenderCache};
use super::clock::{SystemTimeSource, TimeSource};
use super::document::{LyricsKind, SongIdentity, SongInfo, TimedLyricsDocument};
use super::merge::{collapse_to_lines, merge_lyrics};
use super::mode::{DisplayMode, resolve_mode};
use super::renderer::{DisplayControls, LyricsDisplay, Renderer};

/// Orchestrator settings
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorConfig {
    /// Display settings handed to the renderer
    pub settings: DisplaySettings,

    /// Window in which identical requests are dropped
    pub debounce: Duration,

    /// Language requested from the overlay provider
    pub target_language: String,
}

impl OrchestratorConfig {
    /// Build from the application configuration
    pub fn from_config(config: &Config) -> Self {
        let target_language = language_utils::normalize_to_part1_or_part2t(&config.target_language)
            .unwrap_or_else(|e| {
                warn!("Using target language '{}' as is: {}", config.target_language, e);
                config.target_language.clone()
            });

        Self {
            settings: config.display.clone(),
            debounce: config.sync.debounce(),
            target_language,
        }
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// A request to fetch and show lyrics
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    /// Song to fetch
    pub song: SongInfo,

    /// Recompute the intended mode from settings
    pub is_new_song: bool,

    /// Bypass debouncing and provider caches
    pub force_reload: bool,
}

impl FetchRequest {
    /// Create a request
    pub fn new(song: SongInfo, is_new_song: bool, force_reload: bool) -> Self {
        Self {
            song,
            is_new_song,
            force_reload,
        }
    }

    /// A request for a song that just started
    pub fn new_song(song: SongInfo) -> Self {
        Self::new(song, true, false)
    }
}

/// Where the latest request is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchPhase {
    #[default]
    Idle,
    FetchingBase,
    FetchingOverlays,
    Merging,
    Delivered,
    Cached,
    NotFound,
    Errored,
}

impl FetchPhase {
    /// Whether a request is in flight
    pub fn is_active(self) -> bool {
        matches!(self, Self::FetchingBase | Self::FetchingOverlays | Self::Merging)
    }
}

/// How a fetch call ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Handed to the renderer
    Delivered { mode: DisplayMode },
    /// Stored in the cache (search-only mode)
    Cached { mode: DisplayMode },
    /// No lyrics exist; the renderer was told
    NotFound,
    /// Base lyrics could not be fetched; the renderer was told
    Errored,
    /// A newer request replaced this one
    Superseded,
    /// Dropped as a duplicate
    Debounced,
}

/// How a show call ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowOutcome {
    /// A cached result for the current song was rendered
    Rendered,
    /// Nothing usable was cached
    CacheMiss,
}

#[derive(Debug, Clone)]
struct LastRequest {
    identity: SongIdentity,
    mode: DisplayMode,
    at: f64,
}

#[derive(Debug, Default)]
struct OrchestratorState {
    generation: u64,
    settings: DisplaySettings,
    intended_mode: DisplayMode,
    last_processed_mode: Option<DisplayMode>,
    last_request: Option<LastRequest>,
    phase: FetchPhase,
    search_only: bool,
    current_song: Option<SongInfo>,
    last_fetched: Option<TimedLyricsDocument>,
}

/// What an accepted request runs with
#[derive(Debug, Clone)]
struct RequestToken {
    generation: u64,
    mode: DisplayMode,
    settings: DisplaySettings,
}

pub(crate) struct OrchestratorInner {
    lyrics_provider: Arc<dyn LyricsProvider>,
    overlay_provider: Arc<dyn OverlayProvider>,
    renderer: Arc<dyn Renderer>,
    time_source: Arc<dyn TimeSource>,
    cache: RenderCache,
    debounce: Duration,
    target_language: String,
    state: Mutex<OrchestratorState>,
    render_lock: Mutex<()>,
}

/// Fetches, merges and delivers lyrics, one song at a time
#[derive(Clone)]
pub struct LyricsOrchestrator {
    inner: Arc<OrchestratorInner>,
}

impl LyricsOrchestrator {
    /// Create an orchestrator on system time
    pub fn new(
        lyrics_provider: Arc<dyn LyricsProvider>,
        overlay_provider: Arc<dyn OverlayProvider>,
        renderer: Arc<dyn Renderer>,
        config: OrchestratorConfig,
    ) -> Self {
        Self::with_time_source(
            lyrics_provider,
            overlay_provider,
            renderer,
            config,
            Arc::new(SystemTimeSource::new()),
        )
    }

    /// Create an orchestrator measuring the debounce window on `time_source`
    pub fn with_time_source(
        lyrics_provider: Arc<dyn LyricsProvider>,
        overlay_provider: Arc<dyn OverlayProvider>,
        renderer: Arc<dyn Renderer>,
        config: OrchestratorConfig,
        time_source: Arc<dyn TimeSource>,
    ) -> Self {
        let state = OrchestratorState {
            settings: config.settings,
            ..Default::default()
        };

        Self {
            inner: Arc::new(OrchestratorInner {
                lyrics_provider,
                overlay_provider,
                renderer,
                time_source,
                cache: RenderCache::new(),
                debounce: config.debounce,
                target_language: config.target_language,
                state: Mutex::new(state),
                render_lock: Mutex::new(()),
            }),
        }
    }

    pub(crate) fn from_inner(inner: Arc<OrchestratorInner>) -> Self {
        Self { inner }
    }

    /// Fetch, merge and deliver lyrics for a song
    pub async fn fetch(&self, request: FetchRequest) -> FetchOutcome {
        let Some(token) = self.accept(&request) else {
            return FetchOutcome::Debounced;
        };

        self.render(|renderer| renderer.cleanup());

        match self.run(&request.song, request.force_reload, &token).await {
            Ok(outcome) => outcome,
            Err(LyricsError::Superseded { generation }) => {
                debug!("Dropping result for '{}' (generation {})", request.song.identity(), generation);
                FetchOutcome::Superseded
            }
            Err(LyricsError::NotFound(reason)) => {
                info!("No lyrics for '{}': {}", request.song.identity(), reason);
                self.set_phase(token.generation, FetchPhase::NotFound);
                if !self.notify(token.generation, |renderer| renderer.not_found()) {
                    return FetchOutcome::Superseded;
                }
                FetchOutcome::NotFound
            }
            Err(e) => {
                error!("Failed to fetch lyrics for '{}': {}", request.song.identity(), e);
                self.set_phase(token.generation, FetchPhase::Errored);
                if !self.notify(token.generation, |renderer| renderer.error()) {
                    return FetchOutcome::Superseded;
                }
                FetchOutcome::Errored
            }
        }
    }

    /// Set the intended mode and re-fetch with a forced reload
    ///
    /// Re-fetches `song`, or the song of the latest accepted request. Without
    /// either, the mode resets to `none` and the renderer shows an error.
    pub async fn switch_mode(&self, mode: DisplayMode, song: Option<SongInfo>) -> FetchOutcome {
        let target = {
            let mut state = self.inner.state.lock();
            state.intended_mode = mode;
            song.or_else(|| state.current_song.clone())
        };

        match target {
            Some(song) => self.fetch(FetchRequest::new(song, false, true)).await,
            None => {
                warn!("Cannot switch to {} mode: no song to refetch", mode);
                self.inner.state.lock().intended_mode = DisplayMode::None;
                self.render(|renderer| renderer.error());
                FetchOutcome::Errored
            }
        }
    }

    /// Leave search-only mode and render the cached result for the current song
    pub fn show(&self) -> ShowOutcome {
        let current = {
            let mut state = self.inner.state.lock();
            state.search_only = false;
            state.current_song.as_ref().map(SongInfo::identity)
        };

        let Some(entry) = current.as_ref().and_then(|identity| self.inner.cache.take(identity)) else {
            self.inner.cache.clear();
            return ShowOutcome::CacheMiss;
        };

        info!("Showing cached lyrics for '{}' ({})", entry.identity(), entry.mode);
        let display = LyricsDisplay {
            document: entry.document,
            song: entry.song,
            mode: entry.mode,
            settings: entry.settings,
            controls: self.controls(),
        };
        self.render(|renderer| renderer.display(display));
        ShowOutcome::Rendered
    }

    /// Enter or leave search-only mode
    pub fn set_search_only(&self, search_only: bool) {
        self.inner.state.lock().search_only = search_only;
    }

    /// Whether results are cached instead of rendered
    pub fn is_search_only(&self) -> bool {
        self.inner.state.lock().search_only
    }

    /// Replace the display settings used by later requests
    pub fn update_settings(&self, settings: DisplaySettings) {
        self.inner.state.lock().settings = settings;
    }

    /// Current display settings
    pub fn settings(&self) -> DisplaySettings {
        self.inner.state.lock().settings.clone()
    }

    /// Phase of the latest request
    pub fn phase(&self) -> FetchPhase {
        self.inner.state.lock().phase
    }

    /// Mode the next non-new-song request runs with
    pub fn intended_mode(&self) -> DisplayMode {
        self.inner.state.lock().intended_mode
    }

    /// Effective mode of the last merged result
    pub fn last_processed_mode(&self) -> Option<DisplayMode> {
        self.inner.state.lock().last_processed_mode
    }

    /// Last merged document
    pub fn last_fetched(&self) -> Option<TimedLyricsDocument> {
        self.inner.state.lock().last_fetched.clone()
    }

    /// Song of the latest accepted request
    pub fn current_song(&self) -> Option<SongInfo> {
        self.inner.state.lock().current_song.clone()
    }

    /// Generation of the latest accepted request
    pub fn generation(&self) -> u64 {
        self.inner.state.lock().generation
    }

    /// The render gate cache
    pub fn cache(&self) -> &RenderCache {
        &self.inner.cache
    }

    fn controls(&self) -> DisplayControls {
        DisplayControls::new(Arc::downgrade(&self.inner))
    }

    /// Apply debouncing, then register the request as the latest one
    fn accept(&self, request: &FetchRequest) -> Option<RequestToken> {
        let now = self.inner.time_source.now_secs();
        let identity = request.song.identity();
        let mut state = self.inner.state.lock();

        let mode = if request.is_new_song {
            DisplayMode::from_flags(state.settings.translation_enabled, state.settings.romanization_enabled)
        } else {
            state.intended_mode
        };

        if !request.force_reload {
            if let Some(last) = &state.last_request {
                let duplicate = last.identity == identity && last.mode == mode;
                let within_window = now - last.at < self.inner.debounce.as_secs_f64();
                if duplicate && (within_window || state.phase.is_active()) {
                    debug!("Debounced request for '{}' ({})", identity, mode);
                    return None;
                }
            }
        }

        state.generation += 1;
        state.intended_mode = mode;
        state.phase = FetchPhase::FetchingBase;
        state.current_song = Some(request.song.clone());
        state.last_request = Some(LastRequest {
            identity: identity.clone(),
            mode,
            at: now,
        });

        let token = RequestToken {
            generation: state.generation,
            mode,
            settings: state.settings.clone(),
        };
        drop(state);

        if self.inner.cache.cached_identity().is_some_and(|cached| cached != identity) {
            self.inner.cache.clear();
        }

        debug!(
            "Fetching lyrics for '{}' (generation {}, mode {}, forced {})",
            identity, token.generation, mode, request.force_reload
        );
        Some(token)
    }

    async fn run(&self, song: &SongInfo, force_reload: bool, token: &RequestToken) -> Result<FetchOutcome, LyricsError> {
        let response = self.inner.lyrics_provider.fetch_lyrics(song, force_reload).await;
        self.ensure_current(token.generation)?;

        let base = match response? {
            BaseLyricsResponse::Found(document) => document,
            BaseLyricsResponse::NotFound { reason } => {
                return Err(LyricsError::NotFound(
                    reason.unwrap_or_else(|| "provider has no lyrics".to_string()),
                ));
            }
        };

        self.set_phase(token.generation, FetchPhase::FetchingOverlays);

        let wants_translation = token.mode.needs_translation();
        let wants_romanization = token.mode.needs_romanization()
            || token.settings.larger_text_mode == LargerTextMode::Romanization;

        let (translation, romanization) = join!(
            self.fetch_overlay(OverlayAction::Translate, song, wants_translation),
            self.fetch_overlay(OverlayAction::Romanize, song, wants_romanization),
        );
        self.ensure_current(token.generation)?;
        self.set_phase(token.generation, FetchPhase::Merging);

        let mut document = merge_lyrics(&base, translation.as_ref(), romanization.as_ref());
        let mode = resolve_mode(token.mode, translation.is_some(), romanization.is_some());

        if document.kind == LyricsKind::Word && !token.settings.word_by_word {
            document = collapse_to_lines(document);
        }

        self.deliver(song, document, mode, token)
    }

    async fn fetch_overlay(&self, action: OverlayAction, song: &SongInfo, wanted: bool) -> Option<TimedLyricsDocument> {
        if !wanted {
            return None;
        }

        match self.inner.overlay_provider.fetch_overlay(action, song, &self.inner.target_language).await {
            Ok(OverlayResponse::Success(document)) => Some(document),
            Ok(OverlayResponse::Failure { error }) => {
                warn!(
                    "No {} overlay for '{}': {}",
                    action,
                    song.identity(),
                    error.as_deref().unwrap_or("unknown error")
                );
                None
            }
            Err(e) => {
                warn!("Failed to fetch {} overlay for '{}': {}", action, song.identity(), e);
                None
            }
        }
    }

    fn deliver(
        &self,
        song: &SongInfo,
        document: TimedLyricsDocument,
        mode: DisplayMode,
        token: &RequestToken,
    ) -> Result<FetchOutcome, LyricsError> {
        let search_only = {
            let mut state = self.inner.state.lock();
            if state.generation != token.generation {
                return Err(LyricsError::Superseded { generation: token.generation });
            }
            state.phase = if state.search_only { FetchPhase::Cached } else { FetchPhase::Delivered };
            state.last_fetched = Some(document.clone());
            state.last_processed_mode = Some(mode);
            state.search_only
        };

        if search_only {
            self.inner.cache.store(CachedDisplay {
                document,
                song: song.clone(),
                mode,
                settings: token.settings.clone(),
            });
            return Ok(FetchOutcome::Cached { mode });
        }

        info!("Delivering {} lines for '{}' ({})", document.len(), song.identity(), mode);
        let display = LyricsDisplay {
            document,
            song: song.clone(),
            mode,
            settings: token.settings.clone(),
            controls: self.controls(),
        };
        if !self.notify(token.generation, |renderer| renderer.display(display)) {
            return Err(LyricsError::Superseded { generation: token.generation });
        }
        Ok(FetchOutcome::Delivered { mode })
    }

    /// Call the renderer under the render lock
    fn render(&self, call: impl FnOnce(&dyn Renderer)) {
        let _render = self.inner.render_lock.lock();
        call(self.inner.renderer.as_ref());
    }

    /// Call the renderer only if `generation` is still the latest request
    fn notify(&self, generation: u64, call: impl FnOnce(&dyn Renderer)) -> bool {
        let _render = self.inner.render_lock.lock();
        if self.inner.state.lock().generation != generation {
            return false;
        }
        call(self.inner.renderer.as_ref());
        true
    }

    fn ensure_current(&self, generation: u64) -> Result<(), LyricsError> {
        if self.inner.state.lock().generation == generation {
            Ok(())
        } else {
            Err(LyricsError::Superseded { generation })
        }
    }

    fn set_phase(&self, generation: u64, phase: FetchPhase) {
        let mut state = self.inner.state.lock();
        if state.generation == generation {
            state.phase = phase;
        }
    }
}

impl fmt::Debug for LyricsOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("LyricsOrchestrator")
            .field("generation", &state.generation)
            .field("phase", &state.phase)
            .field("intended_mode", &state.intended_mode)
            .field("search_only", &state.search_only)
            .finish()
    }
}
