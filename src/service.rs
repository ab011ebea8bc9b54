//! The remote capability set consumed by the playlist engine.
//!
//! The engine never talks HTTP itself. Everything it needs from the streaming
//! service goes through [`MusicService`], which [`crate::spotify::SpotifyClient`]
//! implements against the Spotify Web API and tests implement in memory.

use async_trait::async_trait;

use crate::{
    error::Result,
    types::{AudioFeatures, Page, Playlist, PlaylistDetails, PlaylistHandle, SearchPage, TrackItem, TrackRef},
};

/// Maximum number of uris accepted by a single append call.
pub const MAX_TRACKS_PER_WRITE: usize = 100;

/// Page size used when listing the user's playlists.
pub const PLAYLIST_PAGE_SIZE: u32 = 50;

/// Page size used when listing a playlist's tracks.
pub const PLAYLIST_TRACKS_PAGE_SIZE: u32 = 100;

/// Page size used when listing the user's saved tracks.
pub const USER_TRACKS_PAGE_SIZE: u32 = 50;

/// Maximum number of ids accepted by a single audio-features call.
pub const MAX_FEATURE_IDS: usize = 100;

/// Maximum number of seed tracks accepted by the recommendations endpoint.
pub const MAX_RECOMMENDATION_SEEDS: usize = 5;

#[async_trait]
pub trait MusicService: Send + Sync {
    async fn list_playlists(&self, offset: u32, limit: u32) -> Result<Page<Playlist>>;

    /// Returns `Ok(None)` when the playlist does not exist or could not be
    /// read. Credential failures are still returned as errors.
    async fn get_playlist(&self, id: &str) -> Result<Option<PlaylistDetails>>;

    /// Same `None` semantics as [`MusicService::get_playlist`].
    async fn get_playlist_tracks(&self, id: &str, offset: u32) -> Result<Option<Page<TrackItem>>>;

    async fn create_playlist(&self, name: &str, description: &str) -> Result<PlaylistHandle>;

    /// `uris` must hold at most [`MAX_TRACKS_PER_WRITE`] entries.
    async fn append_tracks(&self, playlist_id: &str, uris: &[String]) -> Result<()>;

    /// No-op when `uris` is empty.
    async fn delete_tracks(&self, playlist_id: &str, uris: &[String]) -> Result<()>;

    async fn list_user_tracks(&self, offset: u32, limit: u32) -> Result<Page<TrackItem>>;

    async fn get_track_features(&self, ids: &[String]) -> Result<Vec<AudioFeatures>>;

    async fn get_recommendations(&self, seed_ids: &[String]) -> Result<Vec<TrackRef>>;

    async fn search_playlists(&self, query: &str, offset: u32, limit: u32) -> Result<SearchPage>;
}
