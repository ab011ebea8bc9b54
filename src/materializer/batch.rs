use std::collections::HashSet;

use crate::{
    error::Result,
    service::{MAX_TRACKS_PER_WRITE, MusicService},
    types::PlaylistHandle,
};

/// Ordered partition of a slice into contiguous chunks of at most `size`
/// items. Iteration ends after the last (possibly shorter) chunk; an empty
/// slice yields no chunks.
#[derive(Debug, Clone)]
pub struct BatchPlan<'a, T> {
    items: &'a [T],
    size: usize,
    position: usize,
}

impl<'a, T> BatchPlan<'a, T> {
    /// Plans `items` in chunks of `size`, keeping their order.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let uris: Vec<String> = (0..250).map(|i| format!("spotify:track:{}", i)).collect();
    /// let sizes: Vec<usize> = BatchPlan::new(&uris, 100).map(|b| b.len()).collect();
    /// assert_eq!(sizes, vec![100, 100, 50]);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero.
    pub fn new(items: &'a [T], size: usize) -> Self {
        assert!(size > 0, "batch size must be positive");
        Self {
            items,
            size,
            position: 0,
        }
    }

    /// Total number of chunks in the plan.
    pub fn batch_count(&self) -> usize {
        self.items.len().div_ceil(self.size)
    }
}

impl<'a, T> Iterator for BatchPlan<'a, T> {
    type Item = &'a [T];

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.items.len() {
            return None;
        }
        let end = (self.position + self.size).min(self.items.len());
        let chunk = &self.items[self.position..end];
        self.position = end;
        Some(chunk)
    }
}

/// Outcome of emptying a playlist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClearStats {
    /// Delete calls issued.
    pub cycles: usize,
    /// Entries reported by the fetches that preceded those deletes.
    pub removed: usize,
}

/// Removes everything from `playlist`.
///
/// Fetches the first page of the playlist, deletes every track on it and
/// repeats until the service reports the playlist as empty.
///
/// # Arguments
///
/// * `service` - Service owning the playlist
/// * `playlist` - The destination to empty
///
/// # Returns
///
/// How many delete calls were made and how many entries they covered.
///
/// # Errors
///
/// Credential failures and failed deletes. A page that cannot be read ends
/// the drain early with a warning instead, and so does a page made only of
/// entries without a uri.
///
/// # Example
///
/// ```ignore
/// let stats = clear_playlist(&client, &destination).await?;
/// log::debug!("{} delete calls", stats.cycles);
/// ```
pub async fn clear_playlist<S>(service: &S, playlist: &PlaylistHandle) -> Result<ClearStats>
where
    S: MusicService + ?Sized,
{
    let mut stats = ClearStats::default();

    loop {
        let Some(page) = service.get_playlist_tracks(&playlist.id, 0).await? else {
            log::warn!(
                "could not read playlist {} while clearing it, treating it as empty",
                playlist.name
            );
            break;
        };

        if page.is_empty() {
            break;
        }

        let mut seen = HashSet::new();
        let uris: Vec<String> = page
            .items
            .iter()
            .filter_map(|item| item.track.as_ref().map(|t| t.uri.clone()))
            .filter(|uri| seen.insert(uri.clone()))
            .collect();

        if uris.is_empty() {
            log::warn!(
                "playlist {} still holds {} entries without a track uri, they cannot be removed",
                playlist.name,
                page.items.len()
            );
            break;
        }

        service.delete_tracks(&playlist.id, &uris).await?;
        stats.cycles += 1;
        stats.removed += page.items.len();
        log::debug!(
            "cleared {} entries from {} (cycle {})",
            page.items.len(),
            playlist.name,
            stats.cycles
        );
    }

    Ok(stats)
}

/// Appends `uris` to `playlist` in batches of [`MAX_TRACKS_PER_WRITE`], one
/// call at a time and in order.
///
/// # Arguments
///
/// * `service` - Service owning the playlist
/// * `playlist` - The destination, normally emptied by [`clear_playlist`]
/// * `uris` - Track uris in their final order
///
/// # Returns
///
/// The number of append calls made, zero for an empty `uris`.
///
/// # Errors
///
/// The first failed append. Nothing is retried; the batches before it stay
/// written and the next clear removes them.
///
/// # Example
///
/// ```ignore
/// let uris: Vec<String> = tracks.iter().map(|t| t.uri.clone()).collect();
/// let batches = write_tracks(&client, &destination, &uris).await?;
/// ```
pub async fn write_tracks<S>(service: &S, playlist: &PlaylistHandle, uris: &[String]) -> Result<usize>
where
    S: MusicService + ?Sized,
{
    let plan = BatchPlan::new(uris, MAX_TRACKS_PER_WRITE);
    let total = plan.batch_count();
    let mut written = 0;

    for batch in plan {
        service.append_tracks(&playlist.id, batch).await?;
        written += 1;
        log::debug!(
            "wrote batch {}/{} ({} tracks) to {}",
            written,
            total,
            batch.len(),
            playlist.name
        );
    }

    Ok(written)
}
