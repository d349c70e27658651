use reqwest::Client;

use crate::{
    cli::Session,
    config::Config,
    error::Result,
    info,
    spotify::{
        SpotifyClient,
        auth::{self, BrowserGrantProvider, GrantProvider, ManualGrantProvider},
    },
};

/// Authorizes the user and opens a [`Session`].
///
/// With `manual` set the authorization URL is printed and the redirect URL
/// is read from stdin; otherwise the browser is opened and a local callback
/// server waits for the redirect.
pub async fn login(config: &Config, manual: bool) -> Result<Session> {
    let provider: Box<dyn GrantProvider> = if manual {
        Box::new(ManualGrantProvider::new())
    } else {
        Box::new(BrowserGrantProvider::new(
            config.callback_addr()?,
            config.auth_timeout,
        ))
    };

    login_with(provider.as_ref(), config).await
}

/// Same as [`login`] with a caller-supplied grant provider.
pub async fn login_with(provider: &dyn GrantProvider, config: &Config) -> Result<Session> {
    let http = Client::new();
    let token = auth::authorize(provider, &http, config).await?;

    let client = SpotifyClient::new(http, &config.api_url, token);
    let user_id = client.current_user_id().await?;
    info!("Logged in as {}", user_id);

    Ok(Session { client, user_id })
}
