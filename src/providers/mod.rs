/*!
 * Provider implementations for lyrics and overlay services.
 *
 * This module contains the collaborator interfaces the lyrics pipeline
 * consumes, and client implementations for them:
 * - `http`: Remote lyrics service
 * - `local`: Directory of JSON lyrics documents
 * - `mock`: Scripted providers for tests and demos
 */

use async_trait::async_trait;
use serde::Deserialize;
use std::fmt::{self, Debug};

use crate::errors::{LyricsError, ProviderError};
use crate::lyrics::document::{SongInfo, TimedLyricsDocument};

/// Which overlay is requested from an overlay provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayAction {
    /// Translation into the target language
    Translate,
    /// Romanization of the original text
    Romanize,
}

impl OverlayAction {
    /// Lowercase identifier used on the wire
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Translate => "translate",
            Self::Romanize => "romanize",
        }
    }
}

impl fmt::Display for OverlayAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a base lyrics lookup that reached the provider
#[derive(Debug, Clone, PartialEq)]
pub enum BaseLyricsResponse {
    /// Lyrics were found
    Found(TimedLyricsDocument),
    /// The provider answered but has no lyrics for the song
    NotFound {
        /// Reason reported by the provider
        reason: Option<String>,
    },
}

/// Result of an overlay request that reached the provider
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayResponse {
    /// Overlay document aligned with the base lyrics
    Success(TimedLyricsDocument),
    /// The provider could not produce the overlay
    Failure {
        /// Error reported by the provider
        error: Option<String>,
    },
}

impl OverlayResponse {
    /// The overlay document, if the request succeeded
    pub fn into_document(self) -> Option<TimedLyricsDocument> {
        match self {
            Self::Success(document) => Some(document),
            Self::Failure { .. } => None,
        }
    }
}

/// Source of base lyrics
#[async_trait]
pub trait LyricsProvider: Send + Sync + Debug {
    /// Look up lyrics for a song
    ///
    /// # Arguments
    /// * `song` - The song to look up
    /// * `force_reload` - Bypass any provider-side cache
    ///
    /// # Returns
    /// * `Result<BaseLyricsResponse, ProviderError>` - The lookup result, or a transport error
    async fn fetch_lyrics(&self, song: &SongInfo, force_reload: bool) -> Result<BaseLyricsResponse, ProviderError>;
}

/// Source of translation and romanization overlays
#[async_trait]
pub trait OverlayProvider: Send + Sync + Debug {
    /// Request an overlay for a song's lyrics
    ///
    /// # Arguments
    /// * `action` - Translation or romanization
    /// * `song` - The song whose lyrics are overlaid
    /// * `target_language` - ISO code of the translation language
    ///
    /// # Returns
    /// * `Result<OverlayResponse, ProviderError>` - The overlay result, or a transport error
    async fn fetch_overlay(
        &self,
        action: OverlayAction,
        song: &SongInfo,
        target_language: &str,
    ) -> Result<OverlayResponse, ProviderError>;
}

/// Turns raw lyrics text into a timed document
pub trait LyricsParser: Send + Sync + Debug {
    /// Parse raw text
    fn parse(&self, raw: &str) -> Result<TimedLyricsDocument, LyricsError>;
}

/// Parser for the JSON document format
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLyricsParser;

impl LyricsParser for JsonLyricsParser {
    fn parse(&self, raw: &str) -> Result<TimedLyricsDocument, LyricsError> {
        let document: TimedLyricsDocument = serde_json::from_str(raw)
            .map_err(|e| LyricsError::MalformedDocument(e.to_string()))?;
        document.validate()?;
        Ok(document)
    }
}

/// Base lyrics envelope as sent by lyrics services
#[derive(Debug, Deserialize)]
pub struct LyricsEnvelope {
    /// Whether the lookup succeeded
    #[serde(default)]
    pub success: bool,

    /// Lyrics payload
    #[serde(default)]
    pub lyrics: Option<TimedLyricsDocument>,

    /// Error message
    #[serde(default)]
    pub error: Option<String>,
}

impl TryFrom<LyricsEnvelope> for BaseLyricsResponse {
    type Error = ProviderError;

    fn try_from(envelope: LyricsEnvelope) -> Result<Self, Self::Error> {
        match envelope {
            LyricsEnvelope { success: true, lyrics: Some(document), .. } => Ok(Self::Found(checked(document)?)),
            LyricsEnvelope { error, .. } => Ok(Self::NotFound { reason: error }),
        }
    }
}

/// Overlay envelope as sent by lyrics services
#[derive(Debug, Deserialize)]
pub struct OverlayEnvelope {
    /// Whether the overlay was produced
    #[serde(default)]
    pub success: bool,

    /// Overlay payload
    #[serde(rename = "translatedLyrics", default)]
    pub translated_lyrics: Option<TimedLyricsDocument>,

    /// Error message
    #[serde(default)]
    pub error: Option<String>,
}

impl TryFrom<OverlayEnvelope> for OverlayResponse {
    type Error = ProviderError;

    fn try_from(envelope: OverlayEnvelope) -> Result<Self, Self::Error> {
        match envelope {
            OverlayEnvelope { success: true, translated_lyrics: Some(document), .. } => {
                Ok(Self::Success(checked(document)?))
            }
            OverlayEnvelope { error, .. } => Ok(Self::Failure { error }),
        }
    }
}

/// Reject service payloads that break the document invariants
fn checked(document: TimedLyricsDocument) -> Result<TimedLyricsDocument, ProviderError> {
    document.validate().map_err(|e| match e {
        LyricsError::MalformedDocument(reason) => ProviderError::ParseError(reason),
        other => ProviderError::ParseError(other.to_string()),
    })?;
    Ok(document)
}

pub mod http;
pub mod local;
pub mod mock;
