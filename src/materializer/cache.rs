use std::collections::HashMap;

use crate::types::TrackRef;

/// Lookups remembered for the duration of one generation run.
///
/// Random-source flows draw the same playlist more than once; the cache
/// keeps its tracks so the second draw costs no request. A cache belongs to
/// exactly one run and is dropped with it.
#[derive(Debug, Default)]
pub struct TrackCache {
    playlists: HashMap<String, Vec<TrackRef>>,
    popularity: HashMap<String, u32>,
}

impl TrackCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn playlist(&self, playlist_id: &str) -> Option<&[TrackRef]> {
        self.playlists.get(playlist_id).map(Vec::as_slice)
    }

    /// Track at `index` of a cached playlist.
    pub fn track(&self, playlist_id: &str, index: usize) -> Option<&TrackRef> {
        self.playlists.get(playlist_id)?.get(index)
    }

    pub fn insert_playlist(&mut self, playlist_id: impl Into<String>, tracks: Vec<TrackRef>) {
        self.playlists.insert(playlist_id.into(), tracks);
    }

    pub fn record_popularity(&mut self, track_id: impl Into<String>, popularity: u32) {
        self.popularity.insert(track_id.into(), popularity);
    }

    pub fn popularity(&self, track_id: &str) -> Option<u32> {
        self.popularity.get(track_id).copied()
    }

    pub fn cached_playlists(&self) -> usize {
        self.playlists.len()
    }
}
