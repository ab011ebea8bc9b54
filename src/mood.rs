//! Mood classification of tracks from their audio features.

use std::fmt;

use clap::ValueEnum;

/// Inputs of a mood decision for one track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackFeatures {
    pub energy: f32,
    pub valence: f32,
    pub popularity: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Mood {
    /// energy >= 0.5
    Energetic,
    /// energy <= 0.5
    Calm,
    /// valence >= 0.5
    Happy,
    /// valence <= 0.5
    Sad,
    /// popularity >= 50
    Popular,
}

impl Mood {
    /// Whether a track with `features` belongs to this mood. Tracks exactly
    /// on the 0.5 line count as both energetic and calm (or happy and sad).
    pub fn matches(&self, features: &TrackFeatures) -> bool {
        match self {
            Mood::Energetic => features.energy >= 0.5,
            Mood::Calm => features.energy <= 0.5,
            Mood::Happy => features.valence >= 0.5,
            Mood::Sad => features.valence <= 0.5,
            Mood::Popular => features.popularity >= 50,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Energetic => "energetic",
            Mood::Calm => "calm",
            Mood::Happy => "happy",
            Mood::Sad => "sad",
            Mood::Popular => "popular",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
