//! # CLI Module
//!
//! This module provides the command-line layer of spotlist. It sequences the
//! Spotify integration for each user command and takes care of user
//! interaction, progress feedback and error presentation.
//!
//! ## Command Categories
//!
//! ### Authentication
//!
//! - [`login`] - Runs the authorization flow and opens a [`Session`]
//!
//! ### Playlist Operations
//!
//! - [`create`] - Creates an empty playlist
//! - [`import`] - Creates a playlist and fills it from a CSV of song names
//! - [`list_playlists`] - Shows the user's playlists
//!
//! ### Interactive Mode
//!
//! - [`menu`] - Prompts for operations until the user quits
//!
//! ## Architecture Design
//!
//! ```text
//! CLI Layer (User Interface)
//!     ↓
//! Management Layer (Results artifacts)
//!     ↓
//! Spotify Layer (Authorization, Search, Playlists)
//!     ↓
//! Network Layer (HTTP Requests)
//! ```
//!
//! ## Error Handling Philosophy
//!
//! - Authorization failures end the run; nothing works without a token
//! - Operation failures end the operation and are reported; the menu is
//!   offered again
//! - Songs that cannot be found are listed after the search, they never
//!   stop an import
//!
//! ## Usage Patterns
//!
//! ```bash
//! spotlist                                   # interactive menu
//! spotlist login                             # check credentials
//! spotlist create --name "Road Trip"         # empty playlist
//! spotlist import songs.csv --name "Road Trip" --description "Summer"
//! spotlist import songs.csv --name "Road Trip" --reuse --existing
//! spotlist playlists                         # list playlists
//! ```

use crate::spotify::SpotifyClient;

mod auth;
mod menu;
mod playlist;

pub use auth::login;
pub use auth::login_with;
pub use menu::menu;
pub use playlist::ImportOptions;
pub use playlist::create;
pub use playlist::import;
pub use playlist::list_playlists;

/// Authorized client plus the id of the user it acts for.
#[derive(Debug, Clone)]
pub struct Session {
    pub client: SpotifyClient,
    pub user_id: String,
}
