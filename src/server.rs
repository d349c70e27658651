use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{Extension, Router, routing::get};
use tokio::{
    net::TcpListener,
    sync::{Mutex, oneshot},
    task::JoinHandle,
};

use crate::{api, error::Result, types::CallbackOutcome, warning};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Local HTTP server receiving the authorization redirect.
///
/// Any path other than `/health` is treated as the redirect target, so the
/// path of the configured redirect URI does not matter. The server stops
/// when [`shutdown`](CallbackServer::shutdown) is awaited or, as a last
/// resort, when the value is dropped.
pub struct CallbackServer {
    local_addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl CallbackServer {
    pub async fn start(
        addr: SocketAddr,
        state: Arc<Mutex<Option<CallbackOutcome>>>,
    ) -> Result<Self> {
        let app = Router::new()
            .route("/health", get(api::health))
            .fallback(api::callback)
            .layer(Extension(state));

        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        let (tx, rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    rx.await.ok();
                })
                .await;
            if let Err(e) = result {
                warning!("Callback server stopped with error: {}", e);
            }
        });

        Ok(CallbackServer {
            local_addr,
            shutdown: Some(tx),
            handle,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stops accepting connections and waits for the server task to end.
    ///
    /// Connections a browser keeps alive get [`SHUTDOWN_GRACE`] to close
    /// before the task is aborted.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if tokio::time::timeout(SHUTDOWN_GRACE, &mut self.handle)
            .await
            .is_err()
        {
            self.handle.abort();
            let _ = (&mut self.handle).await;
        }
    }
}

impl Drop for CallbackServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
            self.handle.abort();
        }
    }
}
