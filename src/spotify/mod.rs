//! # Spotify Integration Module
//!
//! Implements [`MusicService`] against the Spotify Web API. The client is a
//! thin layer: it builds requests, attaches the bearer credential and maps
//! HTTP status codes onto the crate's [`Error`] taxonomy. It never retries.
//!
//! ## Status mapping
//!
//! | Status | Error |
//! |---|---|
//! | 400, 401 | [`Error::Credential`] (the caller must re-authenticate) |
//! | 404 | [`Error::NotFound`] |
//! | 429 | [`Error::RateLimited`] |
//! | other non-2xx | [`Error::Remote`] |
//!
//! Reads that the engine treats as optional (`get_playlist`,
//! `get_playlist_tracks`) turn every failure except a credential failure into
//! `Ok(None)`.
//!
//! ## API Coverage
//!
//! - `GET /me` - current user id, when not configured
//! - `GET /me/playlists` - user's playlists
//! - `GET /me/tracks` - saved tracks
//! - `GET /playlists/{id}` and `GET /playlists/{id}/tracks`
//! - `POST /users/{user_id}/playlists` - create playlist
//! - `POST /playlists/{id}/tracks` and `DELETE /playlists/{id}/tracks`
//! - `GET /audio-features`, `GET /recommendations`, `GET /search`

mod library;
mod playlist;
mod search;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::OnceCell;

use crate::{
    config,
    error::{Error, Result},
    service::MusicService,
    types::{AudioFeatures, Page, Playlist, PlaylistDetails, PlaylistHandle, SearchPage, TrackItem, TrackRef},
};

/// HTTP implementation of [`MusicService`] for the Spotify Web API.
pub struct SpotifyClient {
    http: Client,
    base_url: String,
    token: String,
    market: Option<String>,
    user_id: OnceCell<String>,
}

impl SpotifyClient {
    /// Create a client for `base_url` (e.g. `https://api.spotify.com/v1`)
    /// that authenticates every call with `token`.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(Error::Config(format!(
                "API URL must start with http:// or https://, got '{}'",
                base_url
            )));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("mixcli/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url,
            token: token.into(),
            market: None,
            user_id: OnceCell::new(),
        })
    }

    /// Create a client from the environment configuration.
    pub fn from_config(token: impl Into<String>) -> Result<Self> {
        let mut client = Self::new(config::spotify_apiurl(), token)?;
        if let Some(market) = config::spotify_market() {
            client = client.with_market(market);
        }
        if let Some(user_id) = config::spotify_user() {
            client = client.with_user_id(user_id);
        }
        Ok(client)
    }

    /// Ask for track relinking against `market` on every read.
    pub fn with_market(mut self, market: impl Into<String>) -> Self {
        self.market = Some(market.into());
        self
    }

    /// Use a known user id instead of resolving it through `GET /me`.
    pub fn with_user_id(self, user_id: impl Into<String>) -> Self {
        let _ = self.user_id.set(user_id.into());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.http.get(self.url(path)).bearer_auth(&self.token)
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.http.post(self.url(path)).bearer_auth(&self.token)
    }

    fn delete(&self, path: &str) -> RequestBuilder {
        self.http.delete(self.url(path)).bearer_auth(&self.token)
    }

    fn with_market_param(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.market {
            Some(market) => request.query(&[("market", market.as_str())]),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        check_status(response).await
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.send(request).await?;
        Ok(response.json::<T>().await?)
    }

    /// Id of the account that owns created playlists.
    pub async fn user_id(&self) -> Result<&str> {
        let id = self
            .user_id
            .get_or_try_init(|| async {
                let me: crate::types::UserProfile = self.send_json(self.get("/me")).await?;
                log::debug!("resolved current user id {}", me.id);
                Ok::<_, Error>(me.id)
            })
            .await?;
        Ok(id.as_str())
    }
}

/// Map a non-success response onto the error taxonomy.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let retry_after_secs = response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(0);
    let message = response.text().await.unwrap_or_default();

    Err(match status {
        StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => Error::Credential {
            status: status.as_u16(),
            message,
        },
        StatusCode::NOT_FOUND => Error::NotFound(message),
        StatusCode::TOO_MANY_REQUESTS => Error::RateLimited { retry_after_secs },
        _ => Error::Remote {
            status: status.as_u16(),
            message,
        },
    })
}

/// Collapse a failed optional read into `None`, keeping credential errors.
fn none_unless_credential<T>(what: &str, result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_credential() => Err(e),
        Err(e) => {
            log::warn!("{} failed: {}", what, e);
            Ok(None)
        }
    }
}

#[async_trait]
impl MusicService for SpotifyClient {
    async fn list_playlists(&self, offset: u32, limit: u32) -> Result<Page<Playlist>> {
        self.fetch_playlists(offset, limit).await
    }

    async fn get_playlist(&self, id: &str) -> Result<Option<PlaylistDetails>> {
        let result = self.fetch_playlist(id).await;
        none_unless_credential("get playlist", result)
    }

    async fn get_playlist_tracks(&self, id: &str, offset: u32) -> Result<Option<Page<TrackItem>>> {
        let result = self.fetch_playlist_tracks(id, offset).await;
        none_unless_credential("get playlist tracks", result)
    }

    async fn create_playlist(&self, name: &str, description: &str) -> Result<PlaylistHandle> {
        self.create(name, description).await
    }

    async fn append_tracks(&self, playlist_id: &str, uris: &[String]) -> Result<()> {
        self.add_tracks(playlist_id, uris).await
    }

    async fn delete_tracks(&self, playlist_id: &str, uris: &[String]) -> Result<()> {
        self.remove_tracks(playlist_id, uris).await
    }

    async fn list_user_tracks(&self, offset: u32, limit: u32) -> Result<Page<TrackItem>> {
        self.fetch_saved_tracks(offset, limit).await
    }

    async fn get_track_features(&self, ids: &[String]) -> Result<Vec<AudioFeatures>> {
        self.fetch_audio_features(ids).await
    }

    async fn get_recommendations(&self, seed_ids: &[String]) -> Result<Vec<TrackRef>> {
        self.fetch_recommendations(seed_ids).await
    }

    async fn search_playlists(&self, query: &str, offset: u32, limit: u32) -> Result<SearchPage> {
        self.search(query, offset, limit).await
    }
}
