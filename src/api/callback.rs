use std::{collections::HashMap, sync::Arc};

use axum::{
    Extension,
    extract::{OriginalUri, Query},
    response::Html,
};
use tokio::sync::Mutex;

use crate::{types::CallbackOutcome, utils};

/// Records the authorization redirect in the shared state.
///
/// The first redirect carrying either `code=` or an `error` parameter wins;
/// later hits (favicon requests, reloads) leave the state alone.
pub async fn callback(
    OriginalUri(uri): OriginalUri,
    Query(params): Query<HashMap<String, String>>,
    Extension(shared_state): Extension<Arc<Mutex<Option<CallbackOutcome>>>>,
) -> Html<&'static str> {
    let outcome = match utils::extract_grant(&uri.to_string()) {
        Some(grant) => CallbackOutcome::Grant(grant),
        None => match params.get("error") {
            Some(error) => CallbackOutcome::Denied(error.clone()),
            None => return Html("<h4>Missing authorization code.</h4>"),
        },
    };

    let mut state = shared_state.lock().await;
    if state.is_none() {
        *state = Some(outcome.clone());
    }

    match outcome {
        CallbackOutcome::Grant(_) => {
            Html("<h2>Authorization received.</h2><p>You can close this browser window.</p>")
        }
        CallbackOutcome::Denied(_) => Html("<h4>Authorization denied.</h4>"),
    }
}
