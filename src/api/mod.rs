//! # API Module
//!
//! HTTP endpoints served by the short-lived local server that receives the
//! Spotify authorization redirect.
//!
//! ## Endpoints
//!
//! - [`callback`] - Records the redirect URL. Everything after `code=` is the
//!   authorization grant; an `error` parameter means the user denied access.
//!   The handler only stores the outcome; the polling side in
//!   [`crate::spotify::auth`] decides what to do with it.
//! - [`health`] - Returns status and version, handy to check that the
//!   callback server is reachable on the configured address.
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use axum::{Extension, Router, routing::get};
//! use spotlist::api::{callback, health};
//!
//! let app = Router::new()
//!     .route("/health", get(health))
//!     .fallback(callback)
//!     .layer(Extension(state));
//! ```

mod callback;
mod health;

pub use callback::callback;
pub use health::health;
