use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use mixcli::{
    cli, config, error,
    materializer::Preset,
    mood::Mood,
    utils,
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Regenerate a playlist from a preset
    Generate(GenerateOptions),

    /// List your playlists
    Playlists(PlaylistsOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct GenerateOptions {
    /// Name of the destination playlist (defaults to the preset's name)
    #[clap(long, global = true)]
    pub name: Option<String>,

    /// Stop collecting after this many distinct tracks
    #[clap(long, global = true)]
    pub target_size: Option<usize>,

    /// Smallest number of tracks sampled from one source playlist
    #[clap(long, global = true)]
    pub min_sample: Option<usize>,

    /// Largest number of tracks sampled from one source playlist
    #[clap(long, global = true)]
    pub max_sample: Option<usize>,

    /// Seed the random source for a reproducible playlist
    #[clap(long, global = true)]
    pub seed: Option<u64>,

    #[command(subcommand)]
    pub preset: PresetCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum PresetCommand {
    /// Liked songs plus every "Mix" and "Discover" playlist
    MergedMixes,
    /// Random picks from your "Radio" playlists
    Radios,
    /// All liked songs, shuffled
    Liked,
    /// Every "Daily Mix" and "Discover Weekly" playlist
    DailyMixes,
    /// Combined daily mix topped up with radio samples
    SuperRandom,
    /// The part of "Super random" matching a mood
    Mood {
        #[clap(value_enum)]
        mood: Mood,
    },
    /// Recommendations seeded by your liked songs
    Recommended,
    /// Samples from playlists matching a search query
    Discover {
        /// Search query
        #[clap(long)]
        query: String,
    },
}

impl From<PresetCommand> for Preset {
    fn from(command: PresetCommand) -> Self {
        match command {
            PresetCommand::MergedMixes => Preset::MergedMixes,
            PresetCommand::Radios => Preset::Radios,
            PresetCommand::Liked => Preset::Liked,
            PresetCommand::DailyMixes => Preset::DailyMixes,
            PresetCommand::SuperRandom => Preset::SuperRandom,
            PresetCommand::Mood { mood } => Preset::Mood(mood),
            PresetCommand::Recommended => Preset::Recommended,
            PresetCommand::Discover { query } => Preset::Discover(query),
        }
    }
}

#[derive(Parser, Debug, Clone)]
pub struct PlaylistsOptions {
    /// Only show playlists whose name contains this text
    #[clap(long)]
    pub search: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    match cli.command {
        Command::Generate(opt) => {
            let overrides = cli::GenerateOverrides {
                name: opt.name,
                target_size: opt.target_size,
                sample: utils::sample_width(opt.min_sample, opt.max_sample),
                seed: opt.seed,
            };
            cli::generate(opt.preset.into(), overrides).await
        }
        Command::Playlists(opt) => cli::playlists(opt.search).await,
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
