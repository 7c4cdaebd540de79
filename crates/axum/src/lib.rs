//! Serve a [bindserve](https://docs.rs/bindserve) [`Server`] from an [Axum](https://docs.rs/axum/latest/axum/) HTTP server.
#![warn(
    clippy::all,
    clippy::cargo,
    clippy::unwrap_used,
    clippy::panic,
    clippy::todo,
    clippy::panic_in_result_fn,
    // missing_docs
)]
#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

use axum::{
    body::Bytes,
    extract::{OriginalUri, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use bindserve::Server;

/// Construct a new [`axum::Router`](axum::Router) exposing a [`Server`].
pub struct Endpoint;

impl Endpoint {
    /// Routes `GET {base}.js`, `GET {base}.d.ts` and `POST {base}/*path` to `server`.
    ///
    /// The routes already contain the base path so the router must be merged, not nested.
    ///
    /// # Usage
    ///
    /// ```rust
    /// let server = bindserve::Router::new()
    ///     .func("version", || "1.0.0")
    ///     .build(bindserve::Config::new("/api"))
    ///     .unwrap();
    ///
    /// let endpoint: axum::Router = bindserve_axum::Endpoint::new(server);
    /// let app = axum::Router::new().merge(endpoint);
    /// ```
    pub fn new<S>(server: Server) -> axum::Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        let base = server.config().base_path().to_owned();

        axum::Router::new()
            .route(&format!("{base}.js"), get(handle))
            .route(&format!("{base}.d.ts"), get(handle))
            .route(&format!("{base}/*path"), post(handle))
            .with_state(server)
    }
}

// Endpoints are plain blocking functions so every request runs on the blocking pool.
async fn handle(
    State(server): State<Server>,
    OriginalUri(uri): OriginalUri,
    body: Bytes,
) -> Response {
    let path = uri.path().to_owned();
    match tokio::task::spawn_blocking(move || server.handle(&path, &body)).await {
        Ok(response) => (
            response.status,
            [(header::CONTENT_TYPE, response.content_type)],
            response.body,
        )
            .into_response(),
        Err(err) => {
            tracing::error!(%err, "request task failed");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
    }
}
