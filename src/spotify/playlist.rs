use super::SpotifyClient;
use crate::{
    error::Result,
    service::PLAYLIST_TRACKS_PAGE_SIZE,
    types::{
        AddTracksRequest, CreatePlaylistRequest, DeleteTracksRequest, Page, Playlist,
        PlaylistDetails, PlaylistHandle, SnapshotResponse, TrackItem, UriObject,
    },
};

impl SpotifyClient {
    /// Retrieves one page of the current user's playlists.
    ///
    /// # API Endpoint
    ///
    /// `GET /me/playlists?offset={offset}&limit={limit}`
    pub(super) async fn fetch_playlists(&self, offset: u32, limit: u32) -> Result<Page<Playlist>> {
        let request = self
            .get("/me/playlists")
            .query(&[("offset", offset), ("limit", limit)]);
        self.send_json(request).await
    }

    /// Retrieves a playlist together with the first page of its items.
    ///
    /// # API Endpoint
    ///
    /// `GET /playlists/{id}`
    pub(super) async fn fetch_playlist(&self, id: &str) -> Result<PlaylistDetails> {
        let request = self.with_market_param(self.get(&format!("/playlists/{}", id)));
        self.send_json(request).await
    }

    /// Retrieves one page of a playlist's items.
    ///
    /// # API Endpoint
    ///
    /// `GET /playlists/{id}/tracks?offset={offset}&limit=100`
    pub(super) async fn fetch_playlist_tracks(&self, id: &str, offset: u32) -> Result<Page<TrackItem>> {
        let request = self
            .get(&format!("/playlists/{}/tracks", id))
            .query(&[("offset", offset), ("limit", PLAYLIST_TRACKS_PAGE_SIZE)]);
        let request = self.with_market_param(request);
        self.send_json(request).await
    }

    /// Creates a private playlist owned by the current user.
    ///
    /// # API Endpoint
    ///
    /// `POST /users/{user_id}/playlists`
    pub(super) async fn create(&self, name: &str, description: &str) -> Result<PlaylistHandle> {
        let user_id = self.user_id().await?.to_string();
        let body = CreatePlaylistRequest {
            name: name.to_string(),
            description: description.to_string(),
            public: false,
        };

        let request = self
            .post(&format!("/users/{}/playlists", user_id))
            .json(&body);
        let playlist: Playlist = self.send_json(request).await?;
        log::debug!("created playlist {} ({})", playlist.name, playlist.id);

        Ok(playlist.handle())
    }

    /// Appends tracks to the end of a playlist. The remote accepts at most
    /// 100 uris per call.
    ///
    /// # API Endpoint
    ///
    /// `POST /playlists/{id}/tracks`
    pub(super) async fn add_tracks(&self, playlist_id: &str, uris: &[String]) -> Result<()> {
        let body = AddTracksRequest {
            uris: uris.to_vec(),
        };
        let request = self
            .post(&format!("/playlists/{}/tracks", playlist_id))
            .json(&body);
        let snapshot: SnapshotResponse = self.send_json(request).await?;
        log::trace!("playlist {} now at snapshot {}", playlist_id, snapshot.snapshot_id);
        Ok(())
    }

    /// Removes every occurrence of the given tracks from a playlist.
    ///
    /// # API Endpoint
    ///
    /// `DELETE /playlists/{id}/tracks`
    pub(super) async fn remove_tracks(&self, playlist_id: &str, uris: &[String]) -> Result<()> {
        if uris.is_empty() {
            return Ok(());
        }

        let body = DeleteTracksRequest {
            tracks: uris
                .iter()
                .map(|uri| UriObject { uri: uri.clone() })
                .collect(),
        };
        let request = self
            .delete(&format!("/playlists/{}/tracks", playlist_id))
            .json(&body);
        let snapshot: SnapshotResponse = self.send_json(request).await?;
        log::trace!("playlist {} now at snapshot {}", playlist_id, snapshot.snapshot_id);
        Ok(())
    }
}
