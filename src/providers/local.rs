/*!
 * Lyrics read from a local directory.
 *
 * Documents are looked up by file name:
 * - `<artist> - <title>.json` for base lyrics
 * - `<artist> - <title>.translation.<lang>.json` for translations
 * - `<artist> - <title>.romanization.json` for romanizations
 */

use async_trait::async_trait;
use log::debug;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::errors::{LyricsError, ProviderError};
use crate::lyrics::document::{SongInfo, TimedLyricsDocument};
use super::{
    BaseLyricsResponse, JsonLyricsParser, LyricsParser, LyricsProvider, OverlayAction, OverlayProvider,
    OverlayResponse,
};

/// Provider backed by a directory of JSON lyrics documents
#[derive(Debug, Clone)]
pub struct LocalLyricsProvider {
    root: PathBuf,
    parser: JsonLyricsParser,
}

impl LocalLyricsProvider {
    /// Create a provider reading from `root`
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            parser: JsonLyricsParser,
        }
    }

    fn stem(song: &SongInfo) -> String {
        sanitize(&format!("{} - {}", song.artist, song.title))
    }

    /// Path of the base lyrics document for a song
    pub fn base_path(&self, song: &SongInfo) -> PathBuf {
        self.root.join(format!("{}.json", Self::stem(song)))
    }

    /// Path of an overlay document for a song
    pub fn overlay_path(&self, action: OverlayAction, song: &SongInfo, target_language: &str) -> PathBuf {
        let name = match action {
            OverlayAction::Translate => format!("{}.translation.{}.json", Self::stem(song), target_language),
            OverlayAction::Romanize => format!("{}.romanization.json", Self::stem(song)),
        };
        self.root.join(name)
    }

    /// Read a file, `None` if it does not exist
    async fn read_optional(path: &Path) -> Result<Option<String>, ProviderError> {
        match tokio::fs::read_to_string(path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No lyrics file at {}", path.display());
                Ok(None)
            }
            Err(e) => Err(ProviderError::RequestFailed(format!("Failed to read {}: {}", path.display(), e))),
        }
    }

    fn parse(&self, raw: &str, path: &Path) -> Result<TimedLyricsDocument, ProviderError> {
        self.parser.parse(raw).map_err(|e| match e {
            LyricsError::MalformedDocument(reason) => {
                ProviderError::ParseError(format!("{}: {}", path.display(), reason))
            }
            other => ProviderError::ParseError(other.to_string()),
        })
    }
}

/// Replace characters that are not allowed in file names
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c => c,
        })
        .collect()
}

#[async_trait]
impl LyricsProvider for LocalLyricsProvider {
    async fn fetch_lyrics(&self, song: &SongInfo, _force_reload: bool) -> Result<BaseLyricsResponse, ProviderError> {
        let path = self.base_path(song);

        match Self::read_optional(&path).await? {
            Some(raw) => Ok(BaseLyricsResponse::Found(self.parse(&raw, &path)?)),
            None => Ok(BaseLyricsResponse::NotFound {
                reason: Some(format!("{} does not exist", path.display())),
            }),
        }
    }
}

#[async_trait]
impl OverlayProvider for LocalLyricsProvider {
    async fn fetch_overlay(
        &self,
        action: OverlayAction,
        song: &SongInfo,
        target_language: &str,
    ) -> Result<OverlayResponse, ProviderError> {
        let path = self.overlay_path(action, song, target_language);

        match Self::read_optional(&path).await? {
            Some(raw) => Ok(OverlayResponse::Success(self.parse(&raw, &path)?)),
            None => Ok(OverlayResponse::Failure {
                error: Some(format!("{} does not exist", path.display())),
            }),
        }
    }
}
