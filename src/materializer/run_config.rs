use std::fmt;

use super::accumulator::SampleWidth;
use crate::{
    error::{Error, Result},
    mood::Mood,
};

/// Consecutive rounds without a new track after which random-source
/// strategies give up.
pub const DEFAULT_MAX_STALLED_ROUNDS: usize = 25;

/// Where candidate tracks come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceStrategy {
    /// Every saved track of the user.
    LikedTracks,
    /// Full contents of every playlist whose name contains one of
    /// `patterns`, optionally together with the saved tracks.
    MatchingPlaylists {
        patterns: Vec<String>,
        include_liked: bool,
    },
    /// Repeated random draws among playlists whose name contains one of
    /// `patterns`. `base_playlist` is taken whole first when it exists. With
    /// `sample`, each draw contributes a random subset, and `force_first`
    /// adds the drawn playlist's first track on top.
    RandomPlaylists {
        patterns: Vec<String>,
        base_playlist: Option<String>,
        sample: Option<SampleWidth>,
        force_first: bool,
    },
    /// Every track of the playlist with this exact name.
    PlaylistContents { name: String },
    /// Recommendations seeded by random saved tracks, `seeds_per_round`
    /// seeds per request.
    Recommendations { seeds_per_round: usize },
    /// Samples from playlists found by a search query.
    Search { query: String, sample: SampleWidth },
}

impl SourceStrategy {
    fn needs_target(&self) -> bool {
        matches!(
            self,
            SourceStrategy::RandomPlaylists { .. }
                | SourceStrategy::Recommendations { .. }
                | SourceStrategy::Search { .. }
        )
    }

    fn referenced_playlist(&self) -> Option<&str> {
        match self {
            SourceStrategy::RandomPlaylists { base_playlist, .. } => base_playlist.as_deref(),
            SourceStrategy::PlaylistContents { name } => Some(name.as_str()),
            _ => None,
        }
    }

    fn sample(&self) -> Option<SampleWidth> {
        match self {
            SourceStrategy::RandomPlaylists { sample, .. } => *sample,
            SourceStrategy::Search { sample, .. } => Some(*sample),
            _ => None,
        }
    }
}

/// Everything one generation run needs to know.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Name of the destination playlist, created when missing.
    pub destination: String,
    /// Description used when the destination has to be created.
    pub description: String,
    pub source: SourceStrategy,
    /// Stop collecting once this many distinct tracks are gathered.
    pub target_size: Option<usize>,
    pub filter: Option<Mood>,
    pub max_stalled_rounds: usize,
}

impl RunConfig {
    pub fn new(destination: impl Into<String>, source: SourceStrategy) -> Self {
        Self {
            destination: destination.into(),
            description: String::new(),
            source,
            target_size: None,
            filter: None,
            max_stalled_rounds: DEFAULT_MAX_STALLED_ROUNDS,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_target_size(mut self, target_size: usize) -> Self {
        self.target_size = Some(target_size);
        self
    }

    pub fn with_filter(mut self, mood: Mood) -> Self {
        self.filter = Some(mood);
        self
    }

    /// Replace the sampling width of strategies that sample.
    pub fn with_sample(mut self, width: SampleWidth) -> Self {
        match &mut self.source {
            SourceStrategy::RandomPlaylists { sample, .. } => *sample = Some(width),
            SourceStrategy::Search { sample, .. } => *sample = width,
            _ => {}
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.destination.trim().is_empty() {
            return Err(Error::InvalidConfig("destination name is empty".into()));
        }

        if self.target_size == Some(0) {
            return Err(Error::InvalidConfig("target size must be positive".into()));
        }

        if self.source.needs_target() && self.target_size.is_none() {
            return Err(Error::InvalidConfig(
                "random and search sources need a target size".into(),
            ));
        }

        if self.source.referenced_playlist() == Some(self.destination.as_str()) {
            return Err(Error::InvalidConfig(format!(
                "playlist '{}' cannot be both source and destination",
                self.destination
            )));
        }

        if let Some(sample) = self.source.sample() {
            if !sample.is_valid() {
                return Err(Error::InvalidConfig(format!(
                    "invalid sample width {}..={}",
                    sample.min, sample.max
                )));
            }
        }

        if let SourceStrategy::Recommendations { seeds_per_round } = self.source {
            if seeds_per_round == 0 {
                return Err(Error::InvalidConfig("at least one seed per round is needed".into()));
            }
        }

        Ok(())
    }
}

/// The generation flows offered out of the box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preset {
    MergedMixes,
    Radios,
    Liked,
    DailyMixes,
    SuperRandom,
    Mood(Mood),
    Recommended,
    Discover(String),
}

pub const MERGED_MIXES: &str = "Merged mixes";
pub const JUST_RADIOS: &str = "Just radios";
pub const ALL_LIKED: &str = "All liked";
pub const COMBINED_DAILY_MIX: &str = "Combined daily mix";
pub const SUPER_RANDOM: &str = "Super random";
pub const RECOMMENDED_MIX: &str = "Recommended mix";

fn patterns(items: &[&str]) -> Vec<String> {
    items.iter().map(|p| p.to_string()).collect()
}

impl Preset {
    pub fn config(&self) -> RunConfig {
        match self {
            Preset::MergedMixes => RunConfig::new(
                MERGED_MIXES,
                SourceStrategy::MatchingPlaylists {
                    patterns: patterns(&["Mix", "Discover"]),
                    include_liked: true,
                },
            )
            .with_description("Liked songs and every mix, shuffled together."),
            Preset::Radios => RunConfig::new(
                JUST_RADIOS,
                SourceStrategy::RandomPlaylists {
                    patterns: patterns(&["Radio"]),
                    base_playlist: None,
                    sample: None,
                    force_first: false,
                },
            )
            .with_description("Random picks from your radio playlists.")
            .with_target_size(2000),
            Preset::Liked => RunConfig::new(ALL_LIKED, SourceStrategy::LikedTracks)
                .with_description("All liked songs, shuffled."),
            Preset::DailyMixes => RunConfig::new(
                COMBINED_DAILY_MIX,
                SourceStrategy::MatchingPlaylists {
                    patterns: patterns(&["Daily Mix", "Discover Weekly"]),
                    include_liked: false,
                },
            )
            .with_description("Daily mixes and Discover Weekly in one playlist."),
            Preset::SuperRandom => RunConfig::new(
                SUPER_RANDOM,
                SourceStrategy::RandomPlaylists {
                    patterns: patterns(&["Radio"]),
                    base_playlist: Some(COMBINED_DAILY_MIX.to_string()),
                    sample: Some(SampleWidth::new(4, 9)),
                    force_first: true,
                },
            )
            .with_description("The combined daily mix topped up with samples of your radios.")
            .with_target_size(600),
            Preset::Mood(mood) => RunConfig::new(
                format!("{} {}", SUPER_RANDOM, mood),
                SourceStrategy::PlaylistContents {
                    name: SUPER_RANDOM.to_string(),
                },
            )
            .with_description(format!("The {} part of {}.", mood, SUPER_RANDOM))
            .with_filter(*mood),
            Preset::Recommended => RunConfig::new(
                RECOMMENDED_MIX,
                SourceStrategy::Recommendations { seeds_per_round: 5 },
            )
            .with_description("Recommendations seeded by your liked songs.")
            .with_target_size(200),
            Preset::Discover(query) => RunConfig::new(
                format!("Discovered: {}", query),
                SourceStrategy::Search {
                    query: query.clone(),
                    sample: SampleWidth::new(4, 9),
                },
            )
            .with_description(format!("Samples of playlists matching \"{}\".", query))
            .with_target_size(200),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Preset::MergedMixes => f.write_str("merged-mixes"),
            Preset::Radios => f.write_str("radios"),
            Preset::Liked => f.write_str("liked"),
            Preset::DailyMixes => f.write_str("daily-mixes"),
            Preset::SuperRandom => f.write_str("super-random"),
            Preset::Mood(mood) => write!(f, "mood {}", mood),
            Preset::Recommended => f.write_str("recommended"),
            Preset::Discover(query) => write!(f, "discover \"{}\"", query),
        }
    }
}
