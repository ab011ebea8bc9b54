//! In-memory `MusicService` shared by the engine tests.

#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
};

use async_trait::async_trait;
use mixcli::{
    Error, Result,
    service::MusicService,
    types::{
        AudioFeatures, Page, Playlist, PlaylistDetails, PlaylistHandle, PlaylistTracksInfo,
        SearchPage, Track, TrackItem, TrackRef,
    },
};

pub fn track(n: usize) -> TrackRef {
    TrackRef::new(format!("t{}", n), format!("spotify:track:t{}", n))
}

pub fn tracks(range: std::ops::Range<usize>) -> Vec<TrackRef> {
    range.map(track).collect()
}

pub fn uris(tracks: &[TrackRef]) -> Vec<String> {
    tracks.iter().map(|t| t.uri.clone()).collect()
}

#[derive(Debug, Clone)]
pub struct FakePlaylist {
    pub id: String,
    pub name: String,
    pub tracks: Vec<TrackRef>,
}

#[derive(Debug, Default, Clone)]
pub struct Calls {
    pub list_playlists: usize,
    pub get_playlist: usize,
    pub get_playlist_tracks: usize,
    pub create_playlist: usize,
    pub delete_tracks: usize,
    pub list_user_tracks: usize,
    pub get_track_features: usize,
    pub get_recommendations: usize,
    pub search_playlists: usize,
    /// Size of every append call, in order.
    pub appends: Vec<usize>,
}

#[derive(Debug, Default)]
pub struct FakeState {
    pub playlists: Vec<FakePlaylist>,
    pub liked: Vec<TrackRef>,
    pub features: HashMap<String, (f32, f32)>,
    pub popularity: HashMap<String, u32>,
    pub recommendations: Vec<TrackRef>,
    pub recommendation_cursor: usize,
    pub unreadable: HashSet<String>,
    pub reject_credentials: bool,
    /// Playlist list pages at or past this offset fail with a 503.
    pub playlists_fail_from: Option<u32>,
    /// Liked track pages at or past this offset fail with a 503.
    pub liked_fail_from: Option<u32>,
    pub calls: Calls,
    next_id: usize,
}

#[derive(Debug, Default)]
pub struct FakeService {
    pub state: Mutex<FakeState>,
}

impl FakeService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_playlist(self, name: &str, tracks: Vec<TrackRef>) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let id = format!("pl{}", state.next_id);
            state.next_id += 1;
            state.playlists.push(FakePlaylist {
                id,
                name: name.to_string(),
                tracks,
            });
        }
        self
    }

    pub fn with_liked(self, tracks: Vec<TrackRef>) -> Self {
        self.state.lock().unwrap().liked = tracks;
        self
    }

    pub fn with_features(self, id: &str, energy: f32, valence: f32) -> Self {
        self.state
            .lock()
            .unwrap()
            .features
            .insert(id.to_string(), (energy, valence));
        self
    }

    pub fn with_popularity(self, id: &str, popularity: u32) -> Self {
        self.state
            .lock()
            .unwrap()
            .popularity
            .insert(id.to_string(), popularity);
        self
    }

    pub fn with_recommendations(self, tracks: Vec<TrackRef>) -> Self {
        self.state.lock().unwrap().recommendations = tracks;
        self
    }

    pub fn unreadable(self, name: &str) -> Self {
        let id = self.playlist_id(name).expect("unknown playlist");
        self.state.lock().unwrap().unreadable.insert(id);
        self
    }

    pub fn failing_playlist_list_from(self, offset: u32) -> Self {
        self.state.lock().unwrap().playlists_fail_from = Some(offset);
        self
    }

    pub fn failing_liked_from(self, offset: u32) -> Self {
        self.state.lock().unwrap().liked_fail_from = Some(offset);
        self
    }

    pub fn reject_credentials(&self) {
        self.state.lock().unwrap().reject_credentials = true;
    }

    pub fn calls(&self) -> Calls {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn reset_calls(&self) {
        self.state.lock().unwrap().calls = Calls::default();
    }

    pub fn playlist_id(&self, name: &str) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .playlists
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.id.clone())
    }

    pub fn contents(&self, name: &str) -> Option<Vec<TrackRef>> {
        self.state
            .lock()
            .unwrap()
            .playlists
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.tracks.clone())
    }

    pub fn playlist_count(&self) -> usize {
        self.state.lock().unwrap().playlists.len()
    }

    fn item(state: &FakeState, track: &TrackRef) -> TrackItem {
        TrackItem {
            track: Some(Track {
                id: Some(track.id.clone()),
                uri: track.uri.clone(),
                name: String::new(),
                popularity: state.popularity.get(&track.id).copied(),
            }),
        }
    }

    fn page_of(state: &FakeState, tracks: &[TrackRef], offset: u32, limit: u32) -> Page<TrackItem> {
        let start = (offset as usize).min(tracks.len());
        let end = (start + limit as usize).min(tracks.len());
        Page::new(
            tracks[start..end]
                .iter()
                .map(|t| Self::item(state, t))
                .collect(),
            offset,
            Some(tracks.len() as u32),
        )
    }

    fn check_credentials(state: &FakeState) -> Result<()> {
        if state.reject_credentials {
            return Err(Error::Credential {
                status: 401,
                message: "The access token expired".to_string(),
            });
        }
        Ok(())
    }

    fn check_available(from: Option<u32>, offset: u32) -> Result<()> {
        if from.is_some_and(|from| offset >= from) {
            return Err(Error::Remote {
                status: 503,
                message: "Service unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl MusicService for FakeService {
    async fn list_playlists(&self, offset: u32, limit: u32) -> Result<Page<Playlist>> {
        let mut state = self.state.lock().unwrap();
        state.calls.list_playlists += 1;
        Self::check_credentials(&state)?;
        Self::check_available(state.playlists_fail_from, offset)?;

        let items: Vec<Playlist> = state
            .playlists
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .map(|p| Playlist {
                id: p.id.clone(),
                name: p.name.clone(),
                description: None,
                tracks: Some(PlaylistTracksInfo {
                    total: p.tracks.len() as u32,
                }),
            })
            .collect();
        Ok(Page::new(items, offset, Some(state.playlists.len() as u32)))
    }

    async fn get_playlist(&self, id: &str) -> Result<Option<PlaylistDetails>> {
        let mut state = self.state.lock().unwrap();
        state.calls.get_playlist += 1;
        Self::check_credentials(&state)?;
        if state.unreadable.contains(id) {
            return Ok(None);
        }

        let Some(playlist) = state.playlists.iter().find(|p| p.id == id) else {
            return Ok(None);
        };
        Ok(Some(PlaylistDetails {
            id: playlist.id.clone(),
            name: playlist.name.clone(),
            tracks: Self::page_of(&state, &playlist.tracks, 0, 100),
        }))
    }

    async fn get_playlist_tracks(&self, id: &str, offset: u32) -> Result<Option<Page<TrackItem>>> {
        let mut state = self.state.lock().unwrap();
        state.calls.get_playlist_tracks += 1;
        Self::check_credentials(&state)?;
        if state.unreadable.contains(id) {
            return Ok(None);
        }

        let Some(playlist) = state.playlists.iter().find(|p| p.id == id) else {
            return Ok(None);
        };
        Ok(Some(Self::page_of(&state, &playlist.tracks, offset, 100)))
    }

    async fn create_playlist(&self, name: &str, _description: &str) -> Result<PlaylistHandle> {
        let mut state = self.state.lock().unwrap();
        state.calls.create_playlist += 1;
        Self::check_credentials(&state)?;

        let id = format!("pl{}", state.next_id);
        state.next_id += 1;
        state.playlists.push(FakePlaylist {
            id: id.clone(),
            name: name.to_string(),
            tracks: Vec::new(),
        });
        Ok(PlaylistHandle {
            id,
            name: name.to_string(),
        })
    }

    async fn append_tracks(&self, playlist_id: &str, uris: &[String]) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.appends.push(uris.len());
        Self::check_credentials(&state)?;

        let playlist = state
            .playlists
            .iter_mut()
            .find(|p| p.id == playlist_id)
            .ok_or_else(|| Error::NotFound(playlist_id.to_string()))?;
        for uri in uris {
            let id = uri.rsplit(':').next().unwrap_or_default();
            playlist.tracks.push(TrackRef::new(id, uri.clone()));
        }
        Ok(())
    }

    async fn delete_tracks(&self, playlist_id: &str, uris: &[String]) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.delete_tracks += 1;
        Self::check_credentials(&state)?;

        let playlist = state
            .playlists
            .iter_mut()
            .find(|p| p.id == playlist_id)
            .ok_or_else(|| Error::NotFound(playlist_id.to_string()))?;
        playlist.tracks.retain(|t| !uris.contains(&t.uri));
        Ok(())
    }

    async fn list_user_tracks(&self, offset: u32, limit: u32) -> Result<Page<TrackItem>> {
        let mut state = self.state.lock().unwrap();
        state.calls.list_user_tracks += 1;
        Self::check_credentials(&state)?;
        Self::check_available(state.liked_fail_from, offset)?;

        Ok(Self::page_of(&state, &state.liked, offset, limit))
    }

    async fn get_track_features(&self, ids: &[String]) -> Result<Vec<AudioFeatures>> {
        let mut state = self.state.lock().unwrap();
        state.calls.get_track_features += 1;
        Self::check_credentials(&state)?;
        assert!(ids.len() <= 100, "feature lookups are limited to 100 ids");

        Ok(ids
            .iter()
            .filter_map(|id| {
                let (energy, valence) = *state.features.get(id)?;
                Some(AudioFeatures {
                    id: id.clone(),
                    uri: format!("spotify:track:{}", id),
                    energy,
                    valence,
                })
            })
            .collect())
    }

    async fn get_recommendations(&self, seed_ids: &[String]) -> Result<Vec<TrackRef>> {
        let mut state = self.state.lock().unwrap();
        state.calls.get_recommendations += 1;
        Self::check_credentials(&state)?;
        assert!(seed_ids.len() <= 5, "at most five seeds per request");

        if state.recommendations.is_empty() {
            return Ok(Vec::new());
        }
        let total = state.recommendations.len();
        let batch: Vec<TrackRef> = (0..20)
            .map(|i| state.recommendations[(state.recommendation_cursor + i) % total].clone())
            .collect();
        state.recommendation_cursor = (state.recommendation_cursor + 20) % total;
        Ok(batch)
    }

    async fn search_playlists(&self, query: &str, offset: u32, limit: u32) -> Result<SearchPage> {
        let mut state = self.state.lock().unwrap();
        state.calls.search_playlists += 1;
        Self::check_credentials(&state)?;

        let query = query.to_lowercase();
        let items: Vec<Playlist> = state
            .playlists
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&query))
            .skip(offset as usize)
            .take(limit as usize)
            .map(|p| Playlist {
                id: p.id.clone(),
                name: p.name.clone(),
                description: None,
                tracks: Some(PlaylistTracksInfo {
                    total: p.tracks.len() as u32,
                }),
            })
            .collect();
        Ok(SearchPage::new(items, offset, None))
    }
}
