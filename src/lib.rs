//! Spotify Playlist Builder CLI Library
//!
//! This library authenticates a user against the Spotify Web API with the
//! authorization-code flow and builds playlists from lists of song names. It
//! includes modules for the OAuth callback server, the Web API client, CLI
//! operations, configuration and a few utilities.
//!
//! # Modules
//!
//! - `api` - HTTP endpoints of the local callback server
//! - `cli` - Command-line operations and the interactive menu
//! - `config` - Configuration value and environment loading
//! - `error` - Error type shared by all modules
//! - `management` - Results artifacts written next to a playlist run
//! - `server` - Local HTTP server receiving the authorization redirect
//! - `spotify` - Spotify Web API client implementation
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//!
//! # Example
//!
//! ```
//! use spotlist::{config, cli};
//!
//! #[tokio::main]
//! async fn main() -> spotlist::error::Result<()> {
//!     config::load_env().await?;
//!     let config = config::Config::from_env()?;
//!     let session = cli::login(&config, false).await?;
//!     // Use CLI functions...
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod management;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

/// Prints an informational message with a blue bullet point.
///
/// Creates a formatted output line with a distinctive blue "o" indicator
/// followed by the provided message. Used for general information and
/// status updates throughout the application.
///
/// # Arguments
///
/// The macro accepts the same arguments as `println!`, supporting format
/// strings and interpolation.
///
/// # Example
///
/// ```
/// info!("Waiting for authorization in the browser...");
/// info!("Resolved {} of {} songs", found, total);
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
/// Creates a formatted output line with a green "✓" indicator to signify
/// successful completion of operations. Used to provide positive feedback
/// when operations complete successfully.
///
/// # Arguments
///
/// The macro accepts the same arguments as `println!`, supporting format
/// strings and interpolation.
///
/// # Example
///
/// ```
/// success!("Authentication successful!");
/// success!("Added {} tracks to {}", count, name);
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
/// Creates a formatted error output with a red "!" indicator and immediately
/// terminates the program with exit code 1. Used for unrecoverable errors
/// that require immediate program termination.
///
/// # Arguments
///
/// The macro accepts the same arguments as `println!`, supporting format
/// strings and interpolation.
///
/// # Behavior
///
/// This macro will cause the program to exit immediately after printing
/// the error message. It should only be used for fatal errors where
/// recovery is not possible.
///
/// # Example
///
/// ```
/// error!("Cannot load environment. Err: {}", err);
/// error!("Authorization failed: {}", err);
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
/// Creates a formatted output line with a yellow "!" indicator to highlight
/// potential issues or important notices that don't require program termination.
/// Used for recoverable issues or important information that users should notice.
///
/// # Arguments
///
/// The macro accepts the same arguments as `println!`, supporting format
/// strings and interpolation.
///
/// # Example
///
/// ```
/// warning!("Failed to open browser");
/// warning!("Import failed: {}", err);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red cross without exiting.
///
/// Used when the requested operation failed but the program can carry on,
/// e.g. the interactive menu offering itself again after a failed import.
#[macro_export]
macro_rules! failure {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "x".red().bold(), std::format_args!($($arg)*));
  })
}
