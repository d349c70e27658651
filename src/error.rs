//! Error types for spotlist.

use std::time::Duration;

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Every failure the authorization-to-playlist pipeline can report.
///
/// Authorization and token failures end the whole run. Search failures are
/// recovered per query by the resolver and only surface in its report.
/// Playlist lookup and mutation failures end the requested operation.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or malformed configuration value.
    #[error("configuration error: {0}")]
    Config(String),

    /// The interactive session ended before a grant was observed.
    #[error("authorization aborted: {0}")]
    AuthorizationAborted(String),

    /// The configured polling ceiling elapsed without a grant. A closed
    /// browser window cannot be detected and also ends up here.
    #[error(
        "authorization timed out after {0:?}; if the browser window was closed, \
         run again or use --manual to paste the redirect address"
    )]
    AuthorizationTimedOut(Duration),

    /// The token endpoint rejected the grant or answered without a token.
    #[error("token exchange failed: {0}")]
    TokenExchange(String),

    /// A single search request failed.
    #[error("search for '{query}' failed: {reason}")]
    SearchQuery { query: String, reason: String },

    /// No playlist of the authenticated user carries this name.
    #[error("playlist '{0}' not found")]
    PlaylistNotFound(String),

    /// A batch append failed. `batch` is 1-based; `submitted` counts the
    /// tracks added by the batches that went through before it.
    #[error(
        "adding batch {batch} of {batches} failed after {submitted} tracks were added: {reason}"
    )]
    Mutation {
        batch: usize,
        batches: usize,
        submitted: usize,
        reason: String,
    },

    /// Any other Web API call answered with an error.
    #[error("{endpoint} request failed: {reason}")]
    Api { endpoint: String, reason: String },

    /// The song list could not be interpreted.
    #[error("invalid input: {0}")]
    Input(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Builds an [`Error::Api`] from any displayable cause.
    pub fn api(endpoint: &str, reason: impl std::fmt::Display) -> Self {
        Error::Api {
            endpoint: endpoint.to_string(),
            reason: reason.to_string(),
        }
    }
}
