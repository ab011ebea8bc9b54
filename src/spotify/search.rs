use super::SpotifyClient;
use crate::{
    error::Result,
    types::{SearchPage, SearchResponse},
};

impl SpotifyClient {
    /// Searches public playlists matching `query`. The service pads result
    /// pages with nulls for playlists it can no longer serve; those are
    /// dropped, so a page may hold fewer items than `limit` without being
    /// the last one.
    ///
    /// # API Endpoint
    ///
    /// `GET /search?q={query}&type=playlist&offset={offset}&limit={limit}`
    pub(super) async fn search(&self, query: &str, offset: u32, limit: u32) -> Result<SearchPage> {
        let request = self.get("/search").query(&[
            ("q", query.to_string()),
            ("type", "playlist".to_string()),
            ("offset", offset.to_string()),
            ("limit", limit.to_string()),
        ]);
        let request = self.with_market_param(request);
        let response: SearchResponse = self.send_json(request).await?;

        let page = response.playlists;
        Ok(SearchPage::new(
            page.items.into_iter().flatten().collect(),
            page.offset,
            page.total,
        ))
    }
}
