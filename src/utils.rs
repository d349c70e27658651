use std::{io::Read, path::Path};

use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::Url;

use crate::{
    error::{Error, Result},
    spotify::auth::AuthorizationParams,
    types::{AuthorizationGrant, SongQuery},
};

const GRANT_MARKER: &str = "code=";
const NAME_COLUMN: &str = "Name";

/// Builds the authorization endpoint URL with all parameters URL-encoded.
pub fn authorize_url(params: &AuthorizationParams) -> Result<String> {
    let url = Url::parse_with_params(
        &params.auth_url,
        &[
            ("client_id", params.client_id.as_str()),
            ("response_type", "code"),
            ("redirect_uri", params.redirect_uri.as_str()),
            ("scope", params.scope.as_str()),
        ],
    )
    .map_err(|e| Error::Config(format!("authorization URL '{}': {}", params.auth_url, e)))?;

    Ok(url.to_string())
}

/// Takes everything after the first `code=` up to the end of `url`.
///
/// Returns `None` when the marker is absent or nothing follows it.
pub fn extract_grant(url: &str) -> Option<AuthorizationGrant> {
    let start = url.find(GRANT_MARKER)? + GRANT_MARKER.len();
    let code = &url[start..];
    if code.is_empty() {
        return None;
    }
    Some(AuthorizationGrant(code.to_string()))
}

/// `Basic` authorization header value for the token endpoint.
pub fn basic_auth_header(client_id: &str, client_secret: &str) -> String {
    format!(
        "Basic {}",
        STANDARD.encode(format!("{}:{}", client_id, client_secret))
    )
}

/// File name of the results artifact for a playlist.
///
/// Characters that are unsafe in file names are replaced with `_`, so the
/// same playlist name always maps to the same file.
pub fn results_file_name(playlist_name: &str) -> String {
    let safe: String = playlist_name
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("uri_{}.json", safe)
}

/// Reads one [`SongQuery`] per row from the `Name` column of a CSV file.
pub fn read_song_queries(path: &Path) -> Result<Vec<SongQuery>> {
    let file = std::fs::File::open(path)
        .map_err(|e| Error::Input(format!("cannot open {}: {}", path.display(), e)))?;
    parse_song_queries(file)
}

/// Same as [`read_song_queries`] for any reader. Blank cells are skipped.
pub fn parse_song_queries<R: Read>(reader: R) -> Result<Vec<SongQuery>> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let column = rdr
        .headers()?
        .iter()
        .position(|h| h.trim_start_matches('\u{feff}').trim() == NAME_COLUMN)
        .ok_or_else(|| Error::Input(format!("missing '{}' column", NAME_COLUMN)))?;

    let mut queries = Vec::new();
    for record in rdr.records() {
        let record = record?;
        if let Some(name) = record.get(column).map(str::trim) {
            if !name.is_empty() {
                queries.push(SongQuery(name.to_string()));
            }
        }
    }

    Ok(queries)
}
