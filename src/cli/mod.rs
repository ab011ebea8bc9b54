//! # CLI Module
//!
//! User-facing commands of mixcli. Each command loads the bearer token,
//! builds a [`crate::spotify::SpotifyClient`] and hands the work to the
//! [`crate::materializer`] engine, reporting progress with a spinner and the
//! crate's colored output macros.
//!
//! ## Commands
//!
//! - [`generate`] - Regenerates one playlist from a [`crate::materializer::Preset`]
//! - [`playlists`] - Lists the user's playlists as a table
//!
//! ## Credential failures
//!
//! When Spotify rejects the token, the stored token file is removed before
//! the command exits, so the next invocation starts from a fresh login.
//!
//! ## Usage
//!
//! ```bash
//! mixcli generate merged-mixes
//! mixcli generate radios --target-size 500
//! mixcli generate mood calm
//! mixcli generate discover --query "lofi beats" --min-sample 2 --max-sample 5
//! mixcli playlists --search radio
//! ```

mod generate;
mod playlists;

pub use generate::GenerateOverrides;
pub use generate::generate;
pub use playlists::playlists;
