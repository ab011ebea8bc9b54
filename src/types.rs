use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Opaque identifiers for a single track. Two refs are equal when their
/// `uri`s are equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackRef {
    pub id: String,
    pub uri: String,
}

impl TrackRef {
    pub fn new(id: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            uri: uri.into(),
        }
    }
}

impl PartialEq for TrackRef {
    fn eq(&self, other: &Self) -> bool {
        self.uri == other.uri
    }
}

impl Eq for TrackRef {}

impl Hash for TrackRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.uri.hash(state);
    }
}

/// One fetched slice of a paginated remote collection. An empty `items`
/// marks the end of the stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub total: Option<u32>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, offset: u32, total: Option<u32>) -> Self {
        Self {
            items,
            offset,
            total,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A destination playlist owned by the remote account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistHandle {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistTracksInfo {
    pub total: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tracks: Option<PlaylistTracksInfo>,
}

impl Playlist {
    pub fn handle(&self) -> PlaylistHandle {
        PlaylistHandle {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }

    pub fn track_total(&self) -> u32 {
        self.tracks.as_ref().map(|t| t.total).unwrap_or(0)
    }
}

/// A playlist together with the first page of its items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistDetails {
    pub id: String,
    pub name: String,
    pub tracks: Page<TrackItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: Option<String>,
    pub uri: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub popularity: Option<u32>,
}

/// Entry of a playlist or of the saved-tracks library. Local files and
/// removed tracks come back with a null `track`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackItem {
    pub track: Option<Track>,
}

impl TrackItem {
    pub fn track_ref(&self) -> Option<TrackRef> {
        let track = self.track.as_ref()?;
        let id = track.id.clone()?;
        Some(TrackRef::new(id, track.uri.clone()))
    }

    pub fn popularity(&self) -> Option<u32> {
        self.track.as_ref().and_then(|t| t.popularity)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioFeatures {
    pub id: String,
    pub uri: String,
    pub energy: f32,
    pub valence: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioFeaturesResponse {
    pub audio_features: Vec<Option<AudioFeatures>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationsResponse {
    pub tracks: Vec<Track>,
}

/// Page of playlists found by a search query.
pub type SearchPage = Page<Playlist>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub playlists: Page<Option<Playlist>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub description: String,
    pub public: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTracksRequest {
    pub uris: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UriObject {
    pub uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteTracksRequest {
    pub tracks: Vec<UriObject>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotResponse {
    pub snapshot_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: String,
    pub expires_in: u64,
    pub obtained_at: u64,
}

#[derive(Tabled)]
pub struct PlaylistTableRow {
    pub name: String,
    pub tracks: u32,
    pub id: String,
}
