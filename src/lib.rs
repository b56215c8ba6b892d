//! Last.fm to Spotify Playlist Sync Library
//!
//! This library mirrors a user's most played tracks on Last.fm into freshly
//! created Spotify playlists. A weekly and a monthly job fetch the top tracks
//! for their period, resolve every track on Spotify with a best-effort search
//! and populate a new playlist named after the covered date range.
//!
//! # Modules
//!
//! - `api` - HTTP endpoints for the admin surface and the OAuth callback
//! - `cli` - Command-line interface implementations
//! - `clock` - Wall clock abstraction shared by the sync engine and scheduler
//! - `config` - Configuration management and environment variables
//! - `error` - Error types of the sync engine and scheduler
//! - `lastfm` - Last.fm API client (source of the top tracks)
//! - `management` - Persistent token and schedule state
//! - `scheduler` - Recurring weekly/monthly job scheduler
//! - `server` - Local HTTP server
//! - `spotify` - Spotify Web API client implementation
//! - `sync` - The sync orchestration engine
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//!
//! # Example
//!
//! ```
//! use lastsync::{config, cli};
//!
//! #[tokio::main]
//! async fn main() -> lastsync::Res<()> {
//!     config::load_env().await?;
//!     // Use CLI functions...
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod clock;
pub mod config;
pub mod error;
pub mod lastfm;
pub mod management;
pub mod scheduler;
pub mod server;
pub mod spotify;
pub mod sync;
pub mod types;
pub mod utils;

/// A convenient Result type alias for the command-line and bootstrap layer.
///
/// Library modules return their own typed errors (see [`error`]); this alias
/// is used where those errors only need to be reported to the user.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("Starting authentication process...");
/// info!("Resolved {} tracks", count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// # Example
///
/// ```
/// success!("Authentication completed successfully");
/// success!("Added {} tracks", count);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only meant for the command-line layer. Library code returns errors instead.
///
/// # Example
///
/// ```
/// error!("Failed to load configuration");
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// # Example
///
/// ```
/// warning!("No schedule state found, using defaults");
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
