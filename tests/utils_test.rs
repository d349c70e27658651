use std::{
    collections::HashMap,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    time::Duration,
};

use spotlist::config::{Config, DEFAULT_API_URL, DEFAULT_SCOPE};
use spotlist::error::Error;
use spotlist::spotify::auth::AuthorizationParams;
use spotlist::types::{AuthorizationGrant, SongQuery};
use spotlist::utils::*;

// Helper function to create authorization parameters
fn create_test_params() -> AuthorizationParams {
    AuthorizationParams {
        auth_url: "https://accounts.spotify.com/authorize".to_string(),
        client_id: "my-client".to_string(),
        redirect_uri: "http://localhost:8888/callback".to_string(),
        scope: DEFAULT_SCOPE.to_string(),
    }
}

// Helper function to build a configuration from a fixed set of variables
fn config_from(vars: &[(&str, &str)]) -> Result<Config, Error> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Config::from_lookup(|key| vars.get(key).cloned())
}

const REQUIRED: [(&str, &str); 3] = [
    ("SPOTIFY_API_AUTH_CLIENT_ID", "id"),
    ("SPOTIFY_API_AUTH_CLIENT_SECRET", "secret"),
    ("SPOTIFY_API_REDIRECT_URI", "http://localhost:8888/callback"),
];

#[test]
fn test_authorize_url_encodes_parameters() {
    let url = authorize_url(&create_test_params()).unwrap();

    assert!(url.starts_with("https://accounts.spotify.com/authorize?"));
    assert!(url.contains("client_id=my-client"));
    assert!(url.contains("response_type=code"));
    assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A8888%2Fcallback"));
    // scopes are space-delimited, spaces are form-encoded
    assert!(url.contains(
        "scope=user-library-read+playlist-modify-private+playlist-modify-public"
    ));
}

#[test]
fn test_authorize_url_rejects_invalid_endpoint() {
    let mut params = create_test_params();
    params.auth_url = "not a url".to_string();

    assert!(matches!(authorize_url(&params), Err(Error::Config(_))));
}

#[test]
fn test_extract_grant() {
    assert_eq!(
        extract_grant("http://localhost:8888/callback?code=AQBx-12_z"),
        Some(AuthorizationGrant("AQBx-12_z".to_string()))
    );

    // everything after the marker up to the end of the URL
    assert_eq!(
        extract_grant("/callback?code=abc&state=xyz"),
        Some(AuthorizationGrant("abc&state=xyz".to_string()))
    );

    assert_eq!(extract_grant("http://localhost:8888/callback?error=access_denied"), None);
    assert_eq!(extract_grant("http://localhost:8888/callback?code="), None);
    assert_eq!(extract_grant(""), None);
}

#[test]
fn test_basic_auth_header() {
    // base64("client:secret")
    assert_eq!(
        basic_auth_header("client", "secret"),
        "Basic Y2xpZW50OnNlY3JldA=="
    );
}

#[test]
fn test_results_file_name() {
    assert_eq!(results_file_name("Road Trip"), "uri_Road Trip.json");

    // deterministic
    assert_eq!(results_file_name("Mix 2024"), results_file_name("Mix 2024"));

    // no path separators leak into the file name
    let name = results_file_name("rock/pop: the best?");
    assert_eq!(name, "uri_rock_pop_ the best_.json");
    assert!(!name.contains('/'));
}

#[test]
fn test_parse_song_queries() {
    let csv = "Name,Artist,Album\nSong A,Artist A,Album A\n\"Song, B\",Artist B,Album B\n";
    let songs = parse_song_queries(csv.as_bytes()).unwrap();

    assert_eq!(
        songs,
        vec![
            SongQuery("Song A".to_string()),
            SongQuery("Song, B".to_string())
        ]
    );
}

#[test]
fn test_parse_song_queries_column_position_and_blank_cells() {
    let csv = "Artist,Name\nX,First\nY,\nZ,  Third  \n";
    let songs = parse_song_queries(csv.as_bytes()).unwrap();

    assert_eq!(
        songs,
        vec![
            SongQuery("First".to_string()),
            SongQuery("Third".to_string())
        ]
    );
}

#[test]
fn test_parse_song_queries_with_byte_order_mark() {
    let csv = "\u{feff}Name\nSong A\n";
    let songs = parse_song_queries(csv.as_bytes()).unwrap();

    assert_eq!(songs, vec![SongQuery("Song A".to_string())]);
}

#[test]
fn test_parse_song_queries_missing_name_column() {
    let csv = "Title,Artist\nSong A,Artist A\n";
    let result = parse_song_queries(csv.as_bytes());

    assert!(matches!(result, Err(Error::Input(_))));
}

#[test]
fn test_read_song_queries_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = read_song_queries(&dir.path().join("nope.csv"));

    assert!(matches!(result, Err(Error::Input(_))));
}

#[test]
fn test_config_defaults() {
    let config = config_from(&REQUIRED).unwrap();

    assert_eq!(config.client_id, "id");
    assert_eq!(config.client_secret, "secret");
    assert_eq!(config.api_url, DEFAULT_API_URL);
    assert_eq!(config.scope, DEFAULT_SCOPE);
    assert_eq!(config.auth_timeout, Some(Duration::from_secs(300)));
    assert!(config.results_dir.ends_with("spotlist/results"));
}

#[test]
fn test_config_missing_credentials() {
    let result = config_from(&[("SPOTIFY_API_AUTH_CLIENT_ID", "id")]);

    match result {
        Err(Error::Config(msg)) => assert!(msg.contains("SPOTIFY_API_AUTH_CLIENT_SECRET")),
        other => panic!("expected config error, got {:?}", other),
    }
}

#[test]
fn test_config_legacy_variable_names() {
    let config = config_from(&[
        ("SPOTIPY_CLIENT_ID", "legacy-id"),
        ("SPOTIPY_CLIENT_SECRET", "legacy-secret"),
        ("SPOTIPY_REDIRECT_URI", "http://127.0.0.1:9000/cb"),
    ])
    .unwrap();

    assert_eq!(config.client_id, "legacy-id");
    assert_eq!(config.redirect_uri, "http://127.0.0.1:9000/cb");
}

#[test]
fn test_config_overrides() {
    let mut vars = REQUIRED.to_vec();
    vars.extend([
        ("SPOTIFY_API_URL", "http://127.0.0.1:1234/v1/"),
        ("AUTH_TIMEOUT_SECS", "0"),
        ("RESULTS_DIR", "/tmp/spotlist-results"),
        ("SPOTIFY_API_AUTH_SCOPE", "playlist-modify-public"),
    ]);
    let config = config_from(&vars).unwrap();

    assert_eq!(config.api_url, "http://127.0.0.1:1234/v1");
    assert_eq!(config.auth_timeout, None);
    assert_eq!(config.results_dir.to_str(), Some("/tmp/spotlist-results"));
    assert_eq!(config.scope, "playlist-modify-public");
}

#[test]
fn test_config_invalid_timeout() {
    let mut vars = REQUIRED.to_vec();
    vars.push(("AUTH_TIMEOUT_SECS", "soon"));

    assert!(matches!(config_from(&vars), Err(Error::Config(_))));
}

#[test]
fn test_callback_addr() {
    let config = config_from(&REQUIRED).unwrap();
    assert_eq!(
        config.callback_addr().unwrap(),
        SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8888)
    );

    let mut vars = REQUIRED.to_vec();
    vars.push(("SERVER_ADDRESS", "0.0.0.0:9999"));
    let config = config_from(&vars).unwrap();
    assert_eq!(config.callback_addr().unwrap().port(), 9999);

    let config = Config::new("id", "secret", "https://example.com/callback");
    assert!(matches!(config.callback_addr(), Err(Error::Config(_))));
}

#[test]
fn test_config_debug_redacts_secret() {
    let config = config_from(&REQUIRED).unwrap();
    let debug = format!("{:?}", config);

    assert!(!debug.contains("\"secret\""));
    assert!(debug.contains("<redacted>"));
}
