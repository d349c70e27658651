//! # Spotify Integration Module
//!
//! This module is the integration layer between spotlist and the Spotify Web
//! API. It covers the authorization-code flow, the lookup of free-text song
//! names in the catalog and the creation and population of playlists.
//!
//! ## Architecture
//!
//! ```text
//! CLI Layer (menu, subcommands)
//!          ↓
//! Spotify Integration Layer
//!     ├── Authorization (grant providers, credential exchange)
//!     ├── Catalog Resolver (track search)
//!     └── Playlist Mutator (create, lookup, batched append)
//!          ↓
//! HTTP Layer (reqwest, JSON)
//!          ↓
//! Spotify Web API
//! ```
//!
//! ## Core Modules
//!
//! ### Authorization Module
//!
//! [`auth`] - Obtains an authorization grant and exchanges it for a bearer
//! token:
//! - **Pluggable Acquisition**: [`auth::GrantProvider`] abstracts how the grant
//!   is obtained (browser + local callback server, pasted redirect URL, fixed
//!   grant in tests)
//! - **Bounded Polling**: the browser flow polls once per second and gives up
//!   after the configured timeout
//! - **Credential Exchange**: HTTP Basic authenticated token request, no retry
//!
//! ### Catalog Resolver Module
//!
//! [`search`] - Maps song names to track URIs:
//! - **First Match Wins**: the first search hit is taken, no fuzzy fallback
//! - **Order Preserving**: matched URIs keep the relative order of the input
//! - **Failure Isolation**: a failing search is recorded and the next song
//!   is looked up; earlier results are never discarded
//! - **Results Artifact**: resolved URIs can be persisted per playlist name
//!
//! ### Playlist Module
//!
//! [`playlist`] - Creates playlists and fills them:
//! - **Name Lookup**: playlists are found by name, first match in listing order
//! - **Batching**: tracks are sent in batches of at most 100
//! - **Insert Mode**: append at the end (default) or insert every batch at the
//!   head, which reverses batch order in the playlist
//!
//! ## API Coverage
//!
//! - `POST /api/token` - Authorization code exchange
//! - `GET /me` - Current user profile
//! - `GET /me/playlists` - User playlists, paginated through `next`
//! - `POST /users/{user_id}/playlists` - Create playlist
//! - `GET /search` - Track search
//! - `POST /playlists/{playlist_id}/tracks` - Add tracks
//!
//! ## Concurrency
//!
//! Requests are issued one after the other. The bearer token is read-only and
//! owned by the [`SpotifyClient`] for the lifetime of the run; it is neither
//! refreshed nor stored on disk.
//!
//! ## Usage Patterns
//!
//! ```rust,ignore
//! let token = spotify::auth::authorize(&provider, &http, &config).await?;
//! let client = SpotifyClient::new(http, &config.api_url, token);
//! let user_id = client.current_user_id().await?;
//!
//! let name = client.create_playlist(&user_id, &descriptor).await?;
//! let resolution = client.resolve_tracks(&songs).await;
//! client.add_tracks(&name, &resolution.uris, InsertMode::Append).await?;
//! ```

use reqwest::{Client, RequestBuilder, Response};

use crate::{
    error::{Error, Result},
    types::{BearerToken, UserProfile},
};

pub mod auth;
pub mod playlist;
pub mod search;

/// Web API client bound to one bearer token.
#[derive(Debug, Clone)]
pub struct SpotifyClient {
    http: Client,
    api_url: String,
    token: BearerToken,
}

impl SpotifyClient {
    pub fn new(http: Client, api_url: &str, token: BearerToken) -> Self {
        SpotifyClient {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Absolute URL for an API path such as `/me`.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    fn get(&self, url: &str) -> RequestBuilder {
        self.http.get(url).bearer_auth(self.token.secret())
    }

    fn post(&self, url: &str) -> RequestBuilder {
        self.http.post(url).bearer_auth(self.token.secret())
    }

    /// Fetches the id of the authenticated user.
    ///
    /// The id scopes playlist creation and does not change during a run,
    /// so callers fetch it once and pass it along.
    pub async fn current_user_id(&self) -> Result<String> {
        let response = self
            .get(&self.url("/me"))
            .send()
            .await
            .map_err(|e| Error::api("GET /me", e))?;
        let response = ensure_success("GET /me", response).await?;
        let profile: UserProfile = response
            .json()
            .await
            .map_err(|e| Error::api("GET /me", e))?;
        Ok(profile.id)
    }
}

/// Turns a non-success response into the body text of the error, so the
/// message from Spotify reaches the user.
async fn error_body(response: Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    if body.is_empty() {
        status.to_string()
    } else {
        format!("{}: {}", status, body)
    }
}

async fn ensure_success(endpoint: &str, response: Response) -> Result<Response> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(Error::api(endpoint, error_body(response).await))
    }
}
