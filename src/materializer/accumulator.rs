use std::collections::HashSet;

use rand::{Rng, seq::SliceRandom};

use crate::{
    error::{Error, Result},
    types::TrackRef,
};

/// Deduplicated accumulator of tracks, keyed by uri.
///
/// Keeps first-insertion order so that a seeded run is reproducible; the
/// order carries no meaning otherwise.
#[derive(Debug, Clone, Default)]
pub struct CandidateSet {
    tracks: Vec<TrackRef>,
    uris: HashSet<String>,
}

impl CandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if a track with the same uri is already present.
    pub fn insert(&mut self, track: TrackRef) -> bool {
        if !self.uris.insert(track.uri.clone()) {
            return false;
        }
        self.tracks.push(track);
        true
    }

    /// Inserts every track and returns how many were new.
    pub fn extend(&mut self, tracks: impl IntoIterator<Item = TrackRef>) -> usize {
        let mut added = 0;
        for track in tracks {
            if self.insert(track) {
                added += 1;
            }
        }
        added
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// True once the set holds at least `target` tracks. Never true without
    /// a target.
    pub fn reached(&self, target: Option<usize>) -> bool {
        target.is_some_and(|t| self.len() >= t)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackRef> {
        self.tracks.iter()
    }

    pub fn into_vec(self) -> Vec<TrackRef> {
        self.tracks
    }
}

impl FromIterator<TrackRef> for CandidateSet {
    fn from_iter<I: IntoIterator<Item = TrackRef>>(iter: I) -> Self {
        let mut set = CandidateSet::new();
        set.extend(iter);
        set
    }
}

/// Filter applied to every candidate before it is accumulated.
pub type Predicate<'a> = &'a dyn Fn(&TrackRef) -> bool;

/// Folds one source into `set`.
///
/// Tracks rejected by `predicate` are skipped. Stops as soon as the set
/// holds `target` tracks, even in the middle of the source.
///
/// # Arguments
///
/// * `set` - The candidates collected so far
/// * `source` - Tracks of one source, in source order
/// * `target` - Size at which accumulation stops, `None` to take everything
/// * `predicate` - Optional filter, `None` keeps every track
///
/// # Returns
///
/// How many tracks were new to the set.
pub fn accumulate_into(
    set: &mut CandidateSet,
    source: impl IntoIterator<Item = TrackRef>,
    target: Option<usize>,
    predicate: Option<Predicate<'_>>,
) -> usize {
    let mut added = 0;
    for track in source {
        if set.reached(target) {
            break;
        }
        if predicate.is_none_or(|keep| keep(&track)) && set.insert(track) {
            added += 1;
        }
    }
    added
}

/// Folds in-memory sources into a fresh [`CandidateSet`].
///
/// With a `target`, the sources are visited in random order so that the
/// ones left unread are not always the same. Each source is folded with
/// [`accumulate_into`].
///
/// # Arguments
///
/// * `sources` - Track lists to merge
/// * `target` - Size at which accumulation stops, `None` for the union
/// * `predicate` - Optional filter evaluated per candidate
/// * `rng` - Random source for the visiting order
///
/// # Example
///
/// ```ignore
/// let even: Predicate = &|t| t.id.ends_with(['0', '2', '4', '6', '8']);
/// let set = accumulate(vec![liked, radio], Some(200), Some(even), &mut rng);
/// assert!(set.len() <= 200);
/// ```
pub fn accumulate<R: Rng + ?Sized>(
    mut sources: Vec<Vec<TrackRef>>,
    target: Option<usize>,
    predicate: Option<Predicate<'_>>,
    rng: &mut R,
) -> CandidateSet {
    let mut set = CandidateSet::new();

    if target.is_some() {
        sources.shuffle(rng);
    }

    for source in sources {
        if set.reached(target) {
            break;
        }
        accumulate_into(&mut set, source, target, predicate);
    }

    set
}

/// Number of distinct uris in `pool`.
pub fn distinct_count(pool: &[TrackRef]) -> usize {
    pool.iter().map(|t| t.uri.as_str()).collect::<HashSet<_>>().len()
}

/// Picks `k` random tracks from `pool` without replacement, no two sharing
/// a uri.
///
/// Uses rejection sampling: draw an index, discard it if its uri was already
/// taken. Meant for small pools and small `k`.
///
/// # Arguments
///
/// * `k` - Number of tracks to pick
/// * `pool` - Tracks to pick from, duplicates allowed
/// * `rng` - Random source for the index draws
///
/// # Returns
///
/// `k` tracks with pairwise distinct uris, in draw order.
///
/// # Errors
///
/// [`Error::SampleTooLarge`] when `k` exceeds the number of distinct uris
/// in `pool`.
///
/// # Example
///
/// ```ignore
/// let k = width.draw(&mut rng).min(distinct_count(&tracks));
/// let picked = pick_unique(k, &tracks, &mut rng)?;
/// ```
pub fn pick_unique<R: Rng + ?Sized>(k: usize, pool: &[TrackRef], rng: &mut R) -> Result<Vec<TrackRef>> {
    let available = distinct_count(pool);
    if k > available {
        return Err(Error::SampleTooLarge {
            requested: k,
            available,
        });
    }

    let mut taken: HashSet<&str> = HashSet::with_capacity(k);
    let mut picked = Vec::with_capacity(k);
    while picked.len() < k {
        let candidate = &pool[rng.random_range(0..pool.len())];
        if taken.insert(candidate.uri.as_str()) {
            picked.push(candidate.clone());
        }
    }

    Ok(picked)
}

/// How many tracks to sample from one source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleWidth {
    pub min: usize,
    pub max: usize,
}

impl SampleWidth {
    pub fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    pub fn fixed(k: usize) -> Self {
        Self { min: k, max: k }
    }

    pub fn is_valid(&self) -> bool {
        self.min > 0 && self.min <= self.max
    }

    /// Uniform draw in `min..=max`.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        if self.min >= self.max {
            return self.min;
        }
        rng.random_range(self.min..=self.max)
    }
}
