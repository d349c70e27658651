use std::{
    io,
    net::SocketAddr,
    sync::Arc,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use reqwest::{Client, header::AUTHORIZATION};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::{
    config::Config,
    error::{Error, Result},
    info,
    server::CallbackServer,
    success,
    types::{AuthorizationGrant, BearerToken, CallbackOutcome},
    utils, warning,
};

/// Interval between two looks at the callback state.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Client parameters sent to the authorization endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationParams {
    pub auth_url: String,
    pub client_id: String,
    pub redirect_uri: String,
    pub scope: String,
}

/// Something that can obtain an authorization grant from the user.
///
/// Implementations own whatever interactive resource they need (a browser
/// window and callback server, a terminal prompt, ...) and must release it
/// before returning, whether a grant was obtained or not. Credential exchange
/// and everything downstream only ever see the returned grant.
///
/// # Errors
///
/// Implementations return [`Error::AuthorizationAborted`] when the user
/// ended the session without granting access and
/// [`Error::AuthorizationTimedOut`] when a polling ceiling was reached.
#[async_trait]
pub trait GrantProvider: Send + Sync {
    async fn request_grant(&self, params: &AuthorizationParams) -> Result<AuthorizationGrant>;
}

/// Opens a URL in a user agent.
pub type BrowserOpener = Arc<dyn Fn(&str) -> io::Result<()> + Send + Sync>;

/// Obtains a grant through the system browser and a local callback server.
///
/// The provider starts a short-lived HTTP server on the address the redirect
/// URI points to, opens the authorization URL in the default browser and then
/// polls the state shared with the callback handler once per
/// [`POLL_INTERVAL`] until the provider redirects back.
///
/// # Flow
///
/// 1. **Server Start**: binds the callback server to `listen_addr`
/// 2. **Browser Launch**: opens the authorization URL with the client id,
///    `response_type=code`, the redirect URI and the space-delimited scopes
/// 3. **User Authorization**: the user logs in and grants access
/// 4. **Callback Handling**: the server records the redirect URL
/// 5. **Grant Extraction**: everything after `code=` becomes the grant
/// 6. **Server Stop**: the callback server is shut down on every exit path
///
/// # Abort and Timeout
///
/// A redirect that carries `error=...` instead of a code (the user pressed
/// "Cancel") ends the flow with [`Error::AuthorizationAborted`]. When a
/// timeout is configured and elapses first, the flow ends with
/// [`Error::AuthorizationTimedOut`]. Without a timeout the poll waits forever.
///
/// # Example
///
/// ```
/// let provider = BrowserGrantProvider::new(config.callback_addr()?, config.auth_timeout);
/// let grant = provider.request_grant(&config.authorization_params()).await?;
/// ```
pub struct BrowserGrantProvider {
    listen_addr: SocketAddr,
    timeout: Option<Duration>,
    poll_interval: Duration,
    opener: BrowserOpener,
}

impl BrowserGrantProvider {
    pub fn new(listen_addr: SocketAddr, timeout: Option<Duration>) -> Self {
        BrowserGrantProvider {
            listen_addr,
            timeout,
            poll_interval: POLL_INTERVAL,
            opener: Arc::new(|url: &str| webbrowser::open(url)),
        }
    }

    /// Replaces the system browser with `opener`.
    pub fn with_opener(mut self, opener: BrowserOpener) -> Self {
        self.opener = opener;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

#[async_trait]
impl GrantProvider for BrowserGrantProvider {
    async fn request_grant(&self, params: &AuthorizationParams) -> Result<AuthorizationGrant> {
        let auth_url = utils::authorize_url(params)?;

        let shared_state: Arc<Mutex<Option<CallbackOutcome>>> = Arc::new(Mutex::new(None));
        let server = CallbackServer::start(self.listen_addr, Arc::clone(&shared_state)).await?;

        if (self.opener)(&auth_url).is_err() {
            warning!(
                "Failed to open browser. Please navigate to the following URL manually:\n{}",
                auth_url
            );
        } else {
            info!("Waiting for authorization in the browser...");
        }

        let grant = wait_for_grant(shared_state, self.poll_interval, self.timeout).await;
        server.shutdown().await;

        grant
    }
}

/// Polls the callback state until it holds an outcome or the timeout elapses.
async fn wait_for_grant(
    shared_state: Arc<Mutex<Option<CallbackOutcome>>>,
    poll_interval: Duration,
    timeout: Option<Duration>,
) -> Result<AuthorizationGrant> {
    let start = Instant::now();

    loop {
        let lock = shared_state.lock().await;
        match lock.as_ref() {
            Some(CallbackOutcome::Grant(grant)) => return Ok(grant.clone()),
            Some(CallbackOutcome::Denied(reason)) => {
                return Err(Error::AuthorizationAborted(format!(
                    "provider redirected with error '{}'",
                    reason
                )));
            }
            None => {}
        }
        drop(lock);

        if let Some(max_wait) = timeout {
            if start.elapsed() >= max_wait {
                return Err(Error::AuthorizationTimedOut(max_wait));
            }
        }

        tokio::time::sleep(poll_interval).await;
    }
}

/// Reads one line of user input.
pub type LineReader = Arc<dyn Fn() -> io::Result<String> + Send + Sync>;

/// Obtains a grant by asking the user to paste the redirect URL.
///
/// Meant for machines without a browser or where the redirect URI does not
/// point to this machine. The authorization URL is printed, the user opens it
/// anywhere, and pastes back the address the browser ended up on. An empty
/// line, or one without `code=`, aborts the flow.
pub struct ManualGrantProvider {
    reader: LineReader,
}

impl ManualGrantProvider {
    pub fn new() -> Self {
        ManualGrantProvider {
            reader: Arc::new(|| {
                let mut buffer = String::new();
                io::stdin().read_line(&mut buffer)?;
                Ok(buffer)
            }),
        }
    }

    /// Reads the pasted address through `reader` instead of stdin.
    pub fn with_reader(mut self, reader: LineReader) -> Self {
        self.reader = reader;
        self
    }
}

impl Default for ManualGrantProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GrantProvider for ManualGrantProvider {
    async fn request_grant(&self, params: &AuthorizationParams) -> Result<AuthorizationGrant> {
        let auth_url = utils::authorize_url(params)?;
        info!(
            "Open the following URL, log in and paste the address you are redirected to:\n{}",
            auth_url
        );

        let reader = Arc::clone(&self.reader);
        let line = tokio::task::spawn_blocking(move || reader())
            .await
            .map_err(|e| Error::AuthorizationAborted(e.to_string()))??;

        let line = line.trim();
        if line.is_empty() {
            return Err(Error::AuthorizationAborted(
                "no address was pasted".to_string(),
            ));
        }

        utils::extract_grant(line).ok_or_else(|| {
            Error::AuthorizationAborted("no authorization code in the pasted address".to_string())
        })
    }
}

/// Exchanges an authorization grant for a bearer token.
///
/// Sends a single `POST` to the token endpoint, authenticated with HTTP Basic
/// (`base64(client_id:client_secret)`) and carrying the form body
/// `grant_type=authorization_code&code=<grant>&redirect_uri=<uri>`. The
/// `access_token` field of the JSON answer is returned verbatim.
///
/// # Arguments
///
/// * `http` - HTTP client used for the request
/// * `config` - Supplies client credentials, redirect URI and token URL
/// * `grant` - One-time code obtained from a [`GrantProvider`]
///
/// # Errors
///
/// Returns [`Error::TokenExchange`] when the request cannot be sent, the
/// endpoint answers with a non-success status, the body is not JSON or it
/// lacks `access_token`. There is no retry; the grant is single-use anyway.
///
/// # Example
///
/// ```
/// let token = exchange_code(&Client::new(), &config, &grant).await?;
/// let client = SpotifyClient::new(Client::new(), &config.api_url, token);
/// ```
pub async fn exchange_code(
    http: &Client,
    config: &Config,
    grant: &AuthorizationGrant,
) -> Result<BearerToken> {
    let response = http
        .post(&config.token_url)
        .header(
            AUTHORIZATION,
            utils::basic_auth_header(&config.client_id, &config.client_secret),
        )
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", grant.as_str()),
            ("redirect_uri", config.redirect_uri.as_str()),
        ])
        .send()
        .await
        .map_err(|e| Error::TokenExchange(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::TokenExchange(format!("{}: {}", status, body)));
    }

    let json: Value = response
        .json()
        .await
        .map_err(|e| Error::TokenExchange(e.to_string()))?;

    json["access_token"]
        .as_str()
        .map(BearerToken::new)
        .ok_or_else(|| Error::TokenExchange("response has no access_token".to_string()))
}

/// Runs the complete authorization flow: grant acquisition, then exchange.
///
/// The grant never outlives this call. A failed acquisition stops before any
/// request reaches the token endpoint.
pub async fn authorize(
    provider: &dyn GrantProvider,
    http: &Client,
    config: &Config,
) -> Result<BearerToken> {
    let grant = provider
        .request_grant(&config.authorization_params())
        .await?;
    let token = exchange_code(http, config, &grant).await?;
    success!("Authentication successful!");
    Ok(token)
}
