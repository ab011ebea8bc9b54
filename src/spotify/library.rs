use super::SpotifyClient;
use crate::{
    error::Result,
    types::{AudioFeatures, AudioFeaturesResponse, Page, RecommendationsResponse, TrackItem, TrackRef},
};

impl SpotifyClient {
    /// Retrieves one page of the user's saved ("liked") tracks.
    ///
    /// # API Endpoint
    ///
    /// `GET /me/tracks?offset={offset}&limit={limit}`
    pub(super) async fn fetch_saved_tracks(&self, offset: u32, limit: u32) -> Result<Page<TrackItem>> {
        let request = self
            .get("/me/tracks")
            .query(&[("offset", offset), ("limit", limit)]);
        let request = self.with_market_param(request);
        self.send_json(request).await
    }

    /// Retrieves audio features for up to 100 track ids. Ids the service has
    /// no features for are left out of the result.
    ///
    /// # API Endpoint
    ///
    /// `GET /audio-features?ids={ids}`
    pub(super) async fn fetch_audio_features(&self, ids: &[String]) -> Result<Vec<AudioFeatures>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let request = self
            .get("/audio-features")
            .query(&[("ids", ids.join(","))]);
        let response: AudioFeaturesResponse = self.send_json(request).await?;

        Ok(response.audio_features.into_iter().flatten().collect())
    }

    /// Retrieves tracks recommended from up to five seed tracks.
    ///
    /// # API Endpoint
    ///
    /// `GET /recommendations?seed_tracks={ids}`
    pub(super) async fn fetch_recommendations(&self, seed_ids: &[String]) -> Result<Vec<TrackRef>> {
        if seed_ids.is_empty() {
            return Ok(Vec::new());
        }

        let request = self
            .get("/recommendations")
            .query(&[("seed_tracks", seed_ids.join(",")), ("limit", "100".to_string())]);
        let request = self.with_market_param(request);
        let response: RecommendationsResponse = self.send_json(request).await?;

        Ok(response
            .tracks
            .into_iter()
            .filter_map(|t| t.id.map(|id| TrackRef::new(id, t.uri)))
            .collect())
    }
}
