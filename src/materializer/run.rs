use std::{collections::HashSet, fmt};

use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};

use super::{
    accumulator::{
        CandidateSet, Predicate, SampleWidth, accumulate, accumulate_into, distinct_count,
        pick_unique,
    },
    batch::{ClearStats, clear_playlist, write_tracks},
    cache::TrackCache,
    pagination::{FailurePolicy, Paginator},
    run_config::{RunConfig, SourceStrategy},
    shuffle::shuffle,
};
use crate::{
    error::{Error, Result},
    mood::{Mood, TrackFeatures},
    service::{
        MAX_FEATURE_IDS, MAX_RECOMMENDATION_SEEDS, MusicService, PLAYLIST_PAGE_SIZE,
        PLAYLIST_TRACKS_PAGE_SIZE, USER_TRACKS_PAGE_SIZE,
    },
    types::{Playlist, PlaylistHandle, TrackItem, TrackRef},
};

/// Page size used when walking search results.
pub const SEARCH_PAGE_SIZE: u32 = 50;

/// The service refuses search offsets past this point.
pub const SEARCH_MAX_OFFSET: u32 = 1000;

/// Phase of a generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Clearing,
    Collecting,
    Sampling,
    Shuffling,
    Writing,
    Failed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Idle => "idle",
            RunState::Clearing => "clearing",
            RunState::Collecting => "collecting",
            RunState::Sampling => "sampling",
            RunState::Shuffling => "shuffling",
            RunState::Writing => "writing",
            RunState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Receives progress notifications from a run. Every method defaults to a
/// no-op; `()` ignores everything.
pub trait RunObserver: Send {
    fn on_state(&mut self, _state: RunState) {}

    fn on_source(&mut self, _name: &str) {}

    fn on_progress(&mut self, _collected: usize, _target: Option<usize>) {}
}

impl RunObserver for () {}

/// Summary of a successful run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub destination: PlaylistHandle,
    pub created: bool,
    pub cleared: ClearStats,
    /// Candidates dropped by the mood filter.
    pub filtered_out: usize,
    /// Final track order as written.
    pub tracks: Vec<TrackRef>,
    pub batches: usize,
}

/// Regenerates playlists through a [`MusicService`].
///
/// The materializer holds no state between runs other than its random
/// source. Callers must not run two generations against the same
/// destination at once.
pub struct Materializer<S, R = StdRng> {
    service: S,
    rng: R,
}

impl<S: MusicService> Materializer<S, StdRng> {
    /// Materializer seeded from the operating system.
    pub fn new(service: S) -> Self {
        Self::with_rng(service, StdRng::from_os_rng())
    }
}

impl<S: MusicService, R: Rng + Send> Materializer<S, R> {
    pub fn with_rng(service: S, rng: R) -> Self {
        Self { service, rng }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Clear, collect, sample, shuffle and write one destination playlist.
    ///
    /// Any failure aborts the run; nothing is retried and nothing written so
    /// far is rolled back. Running again starts from scratch.
    pub async fn run(&mut self, config: &RunConfig, observer: &mut dyn RunObserver) -> Result<RunReport> {
        config.validate()?;

        let mut run = GenerationRun {
            service: &self.service,
            rng: &mut self.rng,
            config,
            observer,
            state: RunState::Idle,
            cache: TrackCache::new(),
        };

        match run.execute().await {
            Ok(report) => Ok(report),
            Err(e) => {
                log::debug!("run for {} failed while {}: {}", config.destination, run.state, e);
                run.enter(RunState::Failed);
                Err(e)
            }
        }
    }
}

/// Looks a playlist of the current user up by exact name, paging through
/// the playlist list until it is found or the list ends.
///
/// # Arguments
///
/// * `service` - Service holding the user's playlists
/// * `name` - Exact playlist name, compared case-sensitively
///
/// # Returns
///
/// The first playlist with that name, or `None` once the whole list has
/// been read without a match.
///
/// # Errors
///
/// Any failed page read. A lookup that could not see the whole list never
/// reports `None`.
pub async fn find_playlist_by_name<S>(service: &S, name: &str) -> Result<Option<Playlist>>
where
    S: MusicService + ?Sized,
{
    let mut playlists = Paginator::new(
        move |offset| async move { service.list_playlists(offset, PLAYLIST_PAGE_SIZE).await.map(Some) },
        PLAYLIST_PAGE_SIZE,
        FailurePolicy::Propagate,
    );
    playlists.find(|p| p.name == name).await
}

/// Every playlist of the current user.
///
/// # Errors
///
/// Any failed page read; a partial list is never returned.
pub async fn list_all_playlists<S>(service: &S) -> Result<Vec<Playlist>>
where
    S: MusicService + ?Sized,
{
    Paginator::new(
        move |offset| async move { service.list_playlists(offset, PLAYLIST_PAGE_SIZE).await.map(Some) },
        PLAYLIST_PAGE_SIZE,
        FailurePolicy::Propagate,
    )
    .collect_all()
    .await
}

fn name_matches(name: &str, patterns: &[String]) -> bool {
    patterns.iter().any(|p| name.contains(p.as_str()))
}

/// State of one run. Owns the per-run cache, which dies with it.
struct GenerationRun<'a, S, R> {
    service: &'a S,
    rng: &'a mut R,
    config: &'a RunConfig,
    observer: &'a mut dyn RunObserver,
    state: RunState,
    cache: TrackCache,
}

impl<'a, S: MusicService, R: Rng + Send> GenerationRun<'a, S, R> {
    fn enter(&mut self, state: RunState) {
        log::debug!("{}: {} -> {}", self.config.destination, self.state, state);
        self.state = state;
        self.observer.on_state(state);
    }

    async fn execute(&mut self) -> Result<RunReport> {
        self.enter(RunState::Clearing);
        let (destination, created) = self.resolve_destination().await?;
        let cleared = clear_playlist(self.service, &destination).await?;

        self.enter(RunState::Collecting);
        let mut candidates = self.collect(&destination).await?;
        log::debug!(
            "collected {} tracks for {} after reading {} playlists",
            candidates.len(),
            self.config.destination,
            self.cache.cached_playlists()
        );

        self.enter(RunState::Sampling);
        let mut filtered_out = 0;
        if let Some(mood) = self.config.filter {
            let before = candidates.len();
            candidates = self.apply_mood(mood, candidates).await?;
            filtered_out = before - candidates.len();
        }

        self.enter(RunState::Shuffling);
        let mut tracks = candidates.into_vec();
        shuffle(&mut tracks, &mut *self.rng);

        self.enter(RunState::Writing);
        let uris: Vec<String> = tracks.iter().map(|t| t.uri.clone()).collect();
        let batches = write_tracks(self.service, &destination, &uris).await?;

        self.enter(RunState::Idle);
        Ok(RunReport {
            destination,
            created,
            cleared,
            filtered_out,
            tracks,
            batches,
        })
    }

    async fn resolve_destination(&mut self) -> Result<(PlaylistHandle, bool)> {
        let name = self.config.destination.as_str();
        if let Some(existing) = find_playlist_by_name(self.service, name).await? {
            return Ok((existing.handle(), false));
        }

        log::info!("playlist {} not found, creating it", name);
        let handle = self
            .service
            .create_playlist(name, &self.config.description)
            .await?;
        Ok((handle, true))
    }

    async fn collect(&mut self, destination: &PlaylistHandle) -> Result<CandidateSet> {
        let config = self.config;
        let target = config.target_size;
        let mut candidates = CandidateSet::new();

        match &config.source {
            SourceStrategy::LikedTracks => {
                let liked = self.liked_tracks().await?;
                accumulate_into(&mut candidates, liked, target, None);
            }
            SourceStrategy::MatchingPlaylists {
                patterns,
                include_liked,
            } => {
                if *include_liked {
                    let liked = self.liked_tracks().await?;
                    accumulate_into(&mut candidates, liked, target, None);
                }
                let mut sources = self.matching_playlists(patterns, destination).await?;
                if target.is_some() {
                    sources.shuffle(&mut *self.rng);
                }
                for source in sources {
                    if candidates.reached(target) {
                        break;
                    }
                    self.observer.on_source(&source.name);
                    if let Some(tracks) = self.load_playlist(&source.id).await? {
                        accumulate_into(&mut candidates, tracks, target, None);
                        self.observer.on_progress(candidates.len(), target);
                    }
                }
            }
            SourceStrategy::RandomPlaylists {
                patterns,
                base_playlist,
                sample,
                force_first,
            } => {
                if let Some(base) = base_playlist {
                    match find_playlist_by_name(self.service, base).await? {
                        Some(playlist) => {
                            self.observer.on_source(&playlist.name);
                            if let Some(tracks) = self.load_playlist(&playlist.id).await? {
                                accumulate_into(&mut candidates, tracks, target, None);
                            }
                        }
                        None => log::info!("base playlist {} not found, skipping it", base),
                    }
                }
                let sources = self.matching_playlists(patterns, destination).await?;
                self.draw_from_playlists(&mut candidates, sources, *sample, *force_first)
                    .await?;
            }
            SourceStrategy::PlaylistContents { name } => {
                let playlist = find_playlist_by_name(self.service, name)
                    .await?
                    .ok_or_else(|| Error::NotFound(format!("playlist '{}'", name)))?;
                self.observer.on_source(&playlist.name);
                let tracks = self
                    .load_playlist(&playlist.id)
                    .await?
                    .ok_or_else(|| Error::NotFound(format!("contents of playlist '{}'", name)))?;
                accumulate_into(&mut candidates, tracks, target, None);
            }
            SourceStrategy::Recommendations { seeds_per_round } => {
                self.draw_recommendations(&mut candidates, *seeds_per_round)
                    .await?;
            }
            SourceStrategy::Search { query, sample } => {
                self.draw_from_search(&mut candidates, query, *sample, destination)
                    .await?;
            }
        }

        self.observer.on_progress(candidates.len(), target);
        Ok(candidates)
    }

    async fn liked_tracks(&mut self) -> Result<Vec<TrackRef>> {
        let service = self.service;
        let items = Paginator::new(
            move |offset| async move {
                service
                    .list_user_tracks(offset, USER_TRACKS_PAGE_SIZE)
                    .await
                    .map(Some)
            },
            USER_TRACKS_PAGE_SIZE,
            FailurePolicy::Propagate,
        )
        .collect_all()
        .await?;

        Ok(self.to_refs(&items))
    }

    async fn matching_playlists(
        &mut self,
        patterns: &[String],
        destination: &PlaylistHandle,
    ) -> Result<Vec<Playlist>> {
        let playlists = list_all_playlists(self.service).await?;
        Ok(playlists
            .into_iter()
            .filter(|p| p.id != destination.id && name_matches(&p.name, patterns))
            .collect())
    }

    fn to_refs(&mut self, items: &[TrackItem]) -> Vec<TrackRef> {
        items
            .iter()
            .filter_map(|item| {
                let track = item.track_ref()?;
                if let Some(popularity) = item.popularity() {
                    self.cache.record_popularity(track.id.clone(), popularity);
                }
                Some(track)
            })
            .collect()
    }

    /// All tracks of a playlist, from the cache when this run has seen it
    /// before. `None` when the playlist cannot be read.
    async fn load_playlist(&mut self, playlist_id: &str) -> Result<Option<Vec<TrackRef>>> {
        if let Some(tracks) = self.cache.playlist(playlist_id) {
            return Ok(Some(tracks.to_vec()));
        }

        let Some(details) = self.service.get_playlist(playlist_id).await? else {
            log::debug!("playlist {} unavailable, skipping it", playlist_id);
            return Ok(None);
        };
        log::debug!("using playlist {}", details.name);

        let mut items = details.tracks.items;
        let known_total = details.tracks.total.unwrap_or(0) as usize;
        if known_total > items.len() {
            let service = self.service;
            let id = playlist_id.to_string();
            let start = items.len() as u32;
            let rest = Paginator::new(
                move |offset| {
                    let id = id.clone();
                    async move { service.get_playlist_tracks(&id, start + offset).await }
                },
                PLAYLIST_TRACKS_PAGE_SIZE,
                FailurePolicy::EndOfStream,
            )
            .collect_all()
            .await?;
            items.extend(rest);
        }

        let tracks = self.to_refs(&items);
        self.cache.insert_playlist(playlist_id, tracks.clone());
        Ok(Some(tracks))
    }

    /// Counts a round that added nothing. Returns true once the strategy
    /// should give up.
    fn stalled(&self, stalled_rounds: &mut usize, added: usize) -> bool {
        if added > 0 {
            *stalled_rounds = 0;
            return false;
        }
        *stalled_rounds += 1;
        if *stalled_rounds >= self.config.max_stalled_rounds {
            log::warn!(
                "no new tracks for {} rounds, stopping collection for {}",
                stalled_rounds,
                self.config.destination
            );
            return true;
        }
        false
    }

    fn sample_from(&mut self, tracks: &[TrackRef], width: Option<SampleWidth>) -> Result<Vec<TrackRef>> {
        match width {
            None => Ok(tracks.to_vec()),
            Some(width) => {
                let k = width.draw(&mut *self.rng).min(distinct_count(tracks));
                pick_unique(k, tracks, &mut *self.rng)
            }
        }
    }

    async fn draw_from_playlists(
        &mut self,
        candidates: &mut CandidateSet,
        mut sources: Vec<Playlist>,
        sample: Option<SampleWidth>,
        force_first: bool,
    ) -> Result<()> {
        if sources.is_empty() {
            return Err(Error::NoSources("no playlist matches the source patterns".into()));
        }
        sources.shuffle(&mut *self.rng);

        let target = self.config.target_size;
        let mut stalled_rounds = 0;

        while !candidates.reached(target) {
            let source = &sources[self.rng.random_range(0..sources.len())];
            self.observer.on_source(&source.name);

            let mut added = 0;
            if let Some(tracks) = self.load_playlist(&source.id).await? {
                let mut drawn = self.sample_from(&tracks, sample)?;
                if force_first {
                    if let Some(first) = self.cache.track(&source.id, 0) {
                        drawn.insert(0, first.clone());
                    }
                }
                added = accumulate_into(candidates, drawn, target, None);
            }

            self.observer.on_progress(candidates.len(), target);
            if self.stalled(&mut stalled_rounds, added) {
                break;
            }
        }

        Ok(())
    }

    async fn draw_recommendations(&mut self, candidates: &mut CandidateSet, seeds_per_round: usize) -> Result<()> {
        let pool = self.liked_tracks().await?;
        if pool.is_empty() {
            return Err(Error::NoSources("no liked tracks to seed recommendations".into()));
        }

        let target = self.config.target_size;
        let seeds = seeds_per_round
            .min(MAX_RECOMMENDATION_SEEDS)
            .min(distinct_count(&pool));
        let mut stalled_rounds = 0;

        while !candidates.reached(target) {
            let seed_ids: Vec<String> = pick_unique(seeds, &pool, &mut *self.rng)?
                .into_iter()
                .map(|t| t.id)
                .collect();
            let recommended = self.service.get_recommendations(&seed_ids).await?;
            let added = accumulate_into(candidates, recommended, target, None);

            self.observer.on_progress(candidates.len(), target);
            if self.stalled(&mut stalled_rounds, added) {
                break;
            }
        }

        Ok(())
    }

    async fn draw_from_search(
        &mut self,
        candidates: &mut CandidateSet,
        query: &str,
        sample: SampleWidth,
        destination: &PlaylistHandle,
    ) -> Result<()> {
        let target = self.config.target_size;
        let service = self.service;
        let query = query.to_string();
        let mut results = Paginator::new(
            move |offset| {
                let query = query.clone();
                async move {
                    service
                        .search_playlists(&query, offset, SEARCH_PAGE_SIZE)
                        .await
                        .map(Some)
                }
            },
            SEARCH_PAGE_SIZE,
            FailurePolicy::SkipAndContinue,
        )
        .with_max_offset(SEARCH_MAX_OFFSET);

        let mut visited = HashSet::new();
        while let Some(mut page) = results.next_page().await? {
            page.shuffle(&mut *self.rng);
            for playlist in page {
                if candidates.reached(target) {
                    return Ok(());
                }
                if playlist.id == destination.id || !visited.insert(playlist.id.clone()) {
                    continue;
                }

                self.observer.on_source(&playlist.name);
                let Some(tracks) = self.load_playlist(&playlist.id).await? else {
                    continue;
                };
                let picked = self.sample_from(&tracks, Some(sample))?;
                accumulate_into(candidates, picked, target, None);
                self.observer.on_progress(candidates.len(), target);
            }
        }

        if !candidates.reached(target) {
            log::warn!(
                "search results ran out at offset {} with {} of {:?} tracks collected",
                results.offset(),
                candidates.len(),
                target
            );
        }
        Ok(())
    }

    /// Keeps the candidates whose features match `mood`. Tracks without
    /// features are dropped.
    async fn apply_mood(&mut self, mood: Mood, candidates: CandidateSet) -> Result<CandidateSet> {
        let ids: Vec<String> = candidates.iter().map(|t| t.id.clone()).collect();
        let mut keep = HashSet::new();

        for chunk in ids.chunks(MAX_FEATURE_IDS) {
            let features = self.service.get_track_features(chunk).await?;
            for feature in features {
                let input = TrackFeatures {
                    energy: feature.energy,
                    valence: feature.valence,
                    popularity: self.cache.popularity(&feature.id).unwrap_or(0),
                };
                if mood.matches(&input) {
                    keep.insert(feature.id);
                }
            }
        }

        let before = candidates.len();
        let matching: Predicate = &|t| keep.contains(&t.id);
        let kept = accumulate(vec![candidates.into_vec()], None, Some(matching), &mut *self.rng);
        log::debug!("{} filter kept {} of {} tracks", mood, kept.len(), before);
        Ok(kept)
    }
}
