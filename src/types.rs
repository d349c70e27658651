use std::fmt;

use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// One-time authorization code taken from the redirect URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationGrant(pub String);

impl AuthorizationGrant {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// What the callback server observed on the redirect URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    Grant(AuthorizationGrant),
    /// The provider redirected with an `error` parameter instead of a code.
    Denied(String),
}

/// Access token attached to every Web API call. Never persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        BearerToken(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(<redacted>)")
    }
}

/// A free-text song title read from one input row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongQuery(pub String);

impl fmt::Display for SongQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistDescriptor {
    pub name: String,
    pub description: String,
    pub public: bool,
}

/// Where a batch lands in the target playlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InsertMode {
    /// Every batch goes to the end, so the playlist keeps input order.
    #[default]
    Append,
    /// Every batch goes to position 0, so the last batch ends up first.
    Head,
}

/// Outcome of a successful [`add_tracks`](crate::spotify::SpotifyClient::add_tracks).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendReport {
    pub playlist_id: String,
    pub batches: usize,
    pub tracks: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub description: String,
    pub public: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistResponse {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetUserPlaylistsResponse {
    pub items: Vec<Playlist>,
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
}

#[derive(Tabled)]
pub struct PlaylistTableRow {
    pub name: String,
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub tracks: Tracks,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tracks {
    pub items: Vec<Track>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTrackToPlaylistRequest {
    pub uris: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTrackToPlaylistResponse {
    pub snapshot_id: String,
}

#[derive(Tabled)]
pub struct UnresolvedTableRow {
    pub song: String,
    pub reason: String,
}
