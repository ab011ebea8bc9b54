//! # Playlist Materializer
//!
//! Regenerates a destination playlist from tracks spread across many remote
//! paginated collections. Every generation flow is the same run,
//! parameterized by a [`RunConfig`]:
//!
//! ```text
//! Idle -> Clearing -> Collecting -> Sampling -> Shuffling -> Writing -> Idle
//!   \________\___________\____________\____________\___________\--> Failed
//! ```
//!
//! - **Clearing** resolves (or creates) the destination and empties it.
//! - **Collecting** drains or samples the configured source into a
//!   [`CandidateSet`], deduplicated by uri.
//! - **Sampling** applies the optional mood filter.
//! - **Shuffling** puts the result in Fisher–Yates order.
//! - **Writing** appends it in batches of 100.
//!
//! A failure in any phase ends the run in `Failed` and is returned to the
//! caller. Nothing is retried or rolled back; the clear phase of the next run
//! removes whatever a failed run left behind.
//!
//! ## Building blocks
//!
//! - [`Paginator`] - offset/limit iteration with an explicit [`FailurePolicy`]
//! - [`CandidateSet`], [`accumulate`], [`accumulate_into`], [`pick_unique`] - deduplication and sampling
//! - [`shuffle`] - Fisher–Yates over an injected random source
//! - [`BatchPlan`], [`clear_playlist`], [`write_tracks`] - destructive refresh
//! - [`TrackCache`] - lookups remembered for one run only

mod accumulator;
mod batch;
mod cache;
mod pagination;
mod run;
mod run_config;
mod shuffle;

pub use accumulator::{
    CandidateSet, Predicate, SampleWidth, accumulate, accumulate_into, distinct_count, pick_unique,
};
pub use batch::{BatchPlan, ClearStats, clear_playlist, write_tracks};
pub use cache::TrackCache;
pub use pagination::{FailurePolicy, Paginator};
pub use run::{
    Materializer, RunObserver, RunReport, RunState, SEARCH_MAX_OFFSET, SEARCH_PAGE_SIZE,
    find_playlist_by_name, list_all_playlists,
};
pub use run_config::{
    ALL_LIKED, COMBINED_DAILY_MIX, DEFAULT_MAX_STALLED_ROUNDS, JUST_RADIOS, MERGED_MIXES, Preset,
    RECOMMENDED_MIX, RunConfig, SUPER_RANDOM, SourceStrategy,
};
pub use shuffle::shuffle;
