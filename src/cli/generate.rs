use indicatif::ProgressBar;
use rand::{SeedableRng, rngs::StdRng};

use crate::{
    config, error, info,
    management::{TokenManager, TokenSource},
    materializer::{Materializer, Preset, RunObserver, RunState, SampleWidth},
    spotify::SpotifyClient,
    success, utils, warning,
};

/// Command-line adjustments applied on top of a preset.
#[derive(Debug, Clone, Default)]
pub struct GenerateOverrides {
    pub name: Option<String>,
    pub target_size: Option<usize>,
    pub sample: Option<SampleWidth>,
    pub seed: Option<u64>,
}

/// Feeds run progress into a spinner.
struct SpinnerObserver {
    pb: ProgressBar,
    state: RunState,
}

impl RunObserver for SpinnerObserver {
    fn on_state(&mut self, state: RunState) {
        self.state = state;
        self.pb.set_message(format!("{}...", state));
    }

    fn on_source(&mut self, name: &str) {
        self.pb.set_message(format!("{}: {}", self.state, name));
    }

    fn on_progress(&mut self, collected: usize, target: Option<usize>) {
        match target {
            Some(target) => self
                .pb
                .set_message(format!("{}: {}/{} tracks", self.state, collected, target)),
            None => self
                .pb
                .set_message(format!("{}: {} tracks", self.state, collected)),
        }
    }
}

pub(crate) async fn load_client() -> (TokenManager, SpotifyClient) {
    let token_mgr = match TokenManager::load().await {
        Ok(t) => t,
        Err(e) => {
            error!(
                "Failed to load token. Set SPOTIFY_ACCESS_TOKEN or store one at {}\n Error: {}",
                config::spotify_token_path().display(),
                e
            );
        }
    };

    let token = match token_mgr.access_token() {
        Ok(token) => token.to_string(),
        Err(e) => {
            forget_token(&token_mgr).await;
            error!("{}", e);
        }
    };

    match SpotifyClient::from_config(token) {
        Ok(client) => (token_mgr, client),
        Err(e) => error!("Cannot create Spotify client. Err: {}", e),
    }
}

/// Removes a rejected token so the next invocation asks for a new one.
pub(crate) async fn forget_token(token_mgr: &TokenManager) {
    match token_mgr.clear().await {
        Ok(true) => warning!("Stored token removed, log in again."),
        Ok(false) => {
            if let TokenSource::Environment = token_mgr.source() {
                warning!("Token from SPOTIFY_ACCESS_TOKEN was rejected, replace it.");
            }
        }
        Err(e) => warning!("Failed to remove stored token. Err: {}", e),
    }
}

pub async fn generate(preset: Preset, overrides: GenerateOverrides) {
    let mut run_config = preset.config();
    if let Some(name) = overrides.name {
        run_config.destination = name;
    }
    if let Some(target_size) = overrides.target_size {
        run_config = run_config.with_target_size(target_size);
    }
    if let Some(sample) = overrides.sample {
        run_config = run_config.with_sample(sample);
    }

    let (token_mgr, client) = load_client().await;
    let mut materializer = match overrides.seed {
        Some(seed) => Materializer::with_rng(client, StdRng::seed_from_u64(seed)),
        None => Materializer::new(client),
    };

    info!("Generating {} ({})", run_config.destination, preset);

    let mut observer = SpinnerObserver {
        pb: utils::spinner("Starting..."),
        state: RunState::Idle,
    };
    let result = materializer.run(&run_config, &mut observer).await;
    observer.pb.finish_and_clear();

    match result {
        Ok(report) => {
            if report.created {
                info!("Created playlist {}", report.destination.name);
            }
            if report.cleared.removed > 0 {
                info!(
                    "Removed {} old tracks in {} passes",
                    report.cleared.removed, report.cleared.cycles
                );
            }
            if run_config.filter.is_some() {
                info!("{} tracks did not match the mood", report.filtered_out);
            }
            success!(
                "Playlist {} now holds {} tracks ({} batches)",
                report.destination.name,
                report.tracks.len(),
                report.batches
            );
        }
        Err(e) if e.is_credential() => {
            forget_token(&token_mgr).await;
            error!("Spotify rejected the credential. Err: {}", e);
        }
        Err(e) => error!("Failed to generate {}. Err: {}", run_config.destination, e),
    }
}
