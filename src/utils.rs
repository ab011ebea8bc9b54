use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::{materializer::SampleWidth, types::Playlist};

/// Braille spinner shared by every long-running command.
pub fn spinner(message: impl Into<String>) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.into());
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb
}

/// Builds a sample width from optional command-line bounds. A single bound
/// means a fixed width.
pub fn sample_width(min: Option<usize>, max: Option<usize>) -> Option<SampleWidth> {
    match (min, max) {
        (Some(min), Some(max)) => Some(SampleWidth::new(min, max)),
        (Some(k), None) | (None, Some(k)) => Some(SampleWidth::fixed(k)),
        (None, None) => None,
    }
}

/// Keeps playlists whose name contains `search`, ignoring case, and sorts
/// them by name.
pub fn filter_and_sort_playlists(playlists: &mut Vec<Playlist>, search: Option<&str>) {
    if let Some(search) = search {
        let search_term = search.to_lowercase();
        playlists.retain(|p| p.name.to_lowercase().contains(&search_term));
    }
    playlists.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
}
