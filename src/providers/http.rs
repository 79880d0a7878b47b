use async_trait::async_trait;
use log::{debug, error};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

use crate::errors::ProviderError;
use crate::lyrics::document::SongInfo;
use super::{
    BaseLyricsResponse, LyricsEnvelope, LyricsProvider, OverlayAction, OverlayEnvelope, OverlayProvider,
    OverlayResponse,
};

/// Client for a remote lyrics service
#[derive(Debug, Clone)]
pub struct HttpLyricsProvider {
    /// HTTP client for API requests
    client: Client,
    /// Base URL of the service
    endpoint: Url,
}

impl HttpLyricsProvider {
    /// Create a new client
    ///
    /// # Arguments
    /// * `endpoint` - Base URL of the lyrics service
    /// * `timeout_secs` - Per-request timeout
    pub fn new(endpoint: &str, timeout_secs: u64) -> Result<Self, ProviderError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| ProviderError::RequestFailed(format!("Invalid endpoint '{}': {}", endpoint, e)))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ProviderError::ConnectionError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, endpoint })
    }

    fn route(&self, path: &str) -> Result<Url, ProviderError> {
        let mut base = self.endpoint.clone();
        if !base.path().ends_with('/') {
            let with_slash = format!("{}/", base.path());
            base.set_path(&with_slash);
        }
        base.join(path)
            .map_err(|e| ProviderError::RequestFailed(format!("Invalid route '{}': {}", path, e)))
    }

    /// URL of a base lyrics lookup
    pub fn lyrics_url(&self, song: &SongInfo, force_reload: bool) -> Result<Url, ProviderError> {
        let mut url = self.route("lyrics")?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("title", &song.title)
                .append_pair("artist", &song.artist)
                .append_pair("album", &song.album)
                .append_pair("duration", &song.duration.to_string());
            if force_reload {
                query.append_pair("force", "true");
            }
        }
        Ok(url)
    }

    /// URL of an overlay request
    pub fn overlay_url(
        &self,
        action: OverlayAction,
        song: &SongInfo,
        target_language: &str,
    ) -> Result<Url, ProviderError> {
        let mut url = self.route("overlay")?;
        url.query_pairs_mut()
            .append_pair("action", action.as_str())
            .append_pair("lang", target_language)
            .append_pair("title", &song.title)
            .append_pair("artist", &song.artist)
            .append_pair("album", &song.album);
        Ok(url)
    }

    /// GET a URL, returning `None` on 404
    async fn get<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<Option<T>, ProviderError> {
        debug!("GET {}", url);

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout(e.to_string())
            } else if e.is_connect() {
                ProviderError::ConnectionError(e.to_string())
            } else {
                ProviderError::RequestFailed(e.to_string())
            }
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let error_text = response.text().await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Lyrics service error ({}): {}", status, error_text);
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message: error_text,
            });
        }

        let body = response.json::<T>().await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;
        Ok(Some(body))
    }
}

#[async_trait]
impl LyricsProvider for HttpLyricsProvider {
    async fn fetch_lyrics(&self, song: &SongInfo, force_reload: bool) -> Result<BaseLyricsResponse, ProviderError> {
        let url = self.lyrics_url(song, force_reload)?;

        match self.get::<LyricsEnvelope>(url).await? {
            Some(envelope) => envelope.try_into(),
            None => Ok(BaseLyricsResponse::NotFound { reason: None }),
        }
    }
}

#[async_trait]
impl OverlayProvider for HttpLyricsProvider {
    async fn fetch_overlay(
        &self,
        action: OverlayAction,
        song: &SongInfo,
        target_language: &str,
    ) -> Result<OverlayResponse, ProviderError> {
        let url = self.overlay_url(action, song, target_language)?;

        match self.get::<OverlayEnvelope>(url).await? {
            Some(envelope) => envelope.try_into(),
            None => Ok(OverlayResponse::Failure {
                error: Some(format!("No {} overlay available", action)),
            }),
        }
    }
}
