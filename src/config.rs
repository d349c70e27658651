//! Configuration management for spotlist.
//!
//! Configuration is read once at startup into a [`Config`] value which is then
//! passed explicitly to the authorization flow and the API client. Values come
//! from environment variables, optionally seeded from `.env` files:
//!
//! 1. Environment variables (highest priority)
//! 2. `.env` in the local data directory (`spotlist/.env`)
//! 3. `.env` in the current working directory
//! 4. Application defaults (where applicable)

use std::{
    env, fmt,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
    time::Duration,
};

use reqwest::Url;

use crate::{
    error::{Error, Result},
    spotify::auth::AuthorizationParams,
};

pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_SCOPE: &str = "user-library-read playlist-modify-private playlist-modify-public";
pub const DEFAULT_AUTH_TIMEOUT_SECS: u64 = 300;

/// Loads environment variables from `.env` files.
///
/// Looks for `spotlist/.env` in the platform-specific local data directory
/// first and then for a `.env` in the working directory. Both files are
/// optional; variables already present in the environment are never
/// overwritten.
///
/// # Directory Structure
///
/// - Linux: `~/.local/share/spotlist/.env`
/// - macOS: `~/Library/Application Support/spotlist/.env`
/// - Windows: `%LOCALAPPDATA%/spotlist/.env`
///
/// # Errors
///
/// Returns [`Error::Config`] if the data directory cannot be created or an
/// existing `.env` file cannot be parsed.
pub async fn load_env() -> Result<()> {
    let mut path = data_dir();
    async_fs::create_dir_all(&path).await?;
    path.push(".env");

    if path.is_file() {
        dotenv::from_path(&path)
            .map_err(|e| Error::Config(format!("cannot load {}: {}", path.display(), e)))?;
    }

    // a missing .env in the working directory is fine
    dotenv::dotenv().ok();
    Ok(())
}

/// Returns `spotlist` inside the platform's local data directory.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("spotlist");
    path
}

/// Runtime configuration, built once at startup.
#[derive(Clone)]
pub struct Config {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub scope: String,
    pub auth_url: String,
    pub token_url: String,
    pub api_url: String,
    /// Explicit bind address for the callback server. Derived from
    /// `redirect_uri` when unset.
    pub server_addr: Option<String>,
    /// Ceiling for the authorization poll. `None` polls forever.
    pub auth_timeout: Option<Duration>,
    pub results_dir: PathBuf,
}

impl Config {
    /// Builds a configuration with Spotify defaults for everything but the
    /// client credentials.
    pub fn new(client_id: &str, client_secret: &str, redirect_uri: &str) -> Self {
        let mut results_dir = data_dir();
        results_dir.push("results");

        Config {
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            redirect_uri: redirect_uri.to_string(),
            scope: DEFAULT_SCOPE.to_string(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            server_addr: None,
            auth_timeout: Some(Duration::from_secs(DEFAULT_AUTH_TIMEOUT_SECS)),
            results_dir,
        }
    }

    /// Reads the configuration from the process environment.
    ///
    /// Call [`load_env`] first to pick up `.env` files.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name
    /// to its value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when a client credential or the redirect URI
    /// is missing, or when `AUTH_TIMEOUT_SECS` is not a number.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |keys: &[&str]| -> Result<String> {
            keys.iter()
                .find_map(|key| lookup(key).filter(|v| !v.trim().is_empty()))
                .ok_or_else(|| Error::Config(format!("{} must be set", keys[0])))
        };

        let client_id = required(&["SPOTIFY_API_AUTH_CLIENT_ID", "SPOTIPY_CLIENT_ID"])?;
        let client_secret = required(&["SPOTIFY_API_AUTH_CLIENT_SECRET", "SPOTIPY_CLIENT_SECRET"])?;
        let redirect_uri = required(&["SPOTIFY_API_REDIRECT_URI", "SPOTIPY_REDIRECT_URI"])?;

        let mut config = Config::new(&client_id, &client_secret, &redirect_uri);

        if let Some(scope) = lookup("SPOTIFY_API_AUTH_SCOPE") {
            config.scope = scope;
        }
        if let Some(url) = lookup("SPOTIFY_API_AUTH_URL") {
            config.auth_url = url;
        }
        if let Some(url) = lookup("SPOTIFY_API_TOKEN_URL") {
            config.token_url = url;
        }
        if let Some(url) = lookup("SPOTIFY_API_URL") {
            config.api_url = url.trim_end_matches('/').to_string();
        }
        if let Some(dir) = lookup("RESULTS_DIR") {
            config.results_dir = PathBuf::from(dir);
        }
        config.server_addr = lookup("SERVER_ADDRESS");

        if let Some(secs) = lookup("AUTH_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .map_err(|e| Error::Config(format!("AUTH_TIMEOUT_SECS: {}", e)))?;
            config.auth_timeout = match secs {
                0 => None,
                n => Some(Duration::from_secs(n)),
            };
        }

        Ok(config)
    }

    /// Address the local callback server listens on.
    ///
    /// Uses `SERVER_ADDRESS` when set, otherwise the host and port of the
    /// redirect URI. `localhost` maps to `127.0.0.1`.
    pub fn callback_addr(&self) -> Result<SocketAddr> {
        if let Some(addr) = &self.server_addr {
            return addr
                .parse()
                .map_err(|e| Error::Config(format!("SERVER_ADDRESS '{}': {}", addr, e)));
        }

        let url = Url::parse(&self.redirect_uri)
            .map_err(|e| Error::Config(format!("redirect URI '{}': {}", self.redirect_uri, e)))?;
        let port = url.port_or_known_default().ok_or_else(|| {
            Error::Config(format!("redirect URI '{}' has no port", self.redirect_uri))
        })?;
        let ip = match url.host_str() {
            Some("localhost") => IpAddr::V4(Ipv4Addr::LOCALHOST),
            Some(host) => host
                .trim_matches(|c| c == '[' || c == ']')
                .parse()
                .map_err(|_| {
                    Error::Config(format!(
                        "cannot listen on redirect host '{}', set SERVER_ADDRESS",
                        host
                    ))
                })?,
            None => {
                return Err(Error::Config(format!(
                    "redirect URI '{}' has no host",
                    self.redirect_uri
                )));
            }
        };

        Ok(SocketAddr::new(ip, port))
    }

    /// Parameters handed to a [`GrantProvider`](crate::spotify::auth::GrantProvider).
    pub fn authorization_params(&self) -> AuthorizationParams {
        AuthorizationParams {
            auth_url: self.auth_url.clone(),
            client_id: self.client_id.clone(),
            redirect_uri: self.redirect_uri.clone(),
            scope: self.scope.clone(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri)
            .field("scope", &self.scope)
            .field("auth_url", &self.auth_url)
            .field("token_url", &self.token_url)
            .field("api_url", &self.api_url)
            .field("server_addr", &self.server_addr)
            .field("auth_timeout", &self.auth_timeout)
            .field("results_dir", &self.results_dir)
            .finish()
    }
}
