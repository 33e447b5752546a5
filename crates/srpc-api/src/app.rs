//! Router assembly.
//!
//! Every bound endpoint answers both GET and POST at its path. The
//! documentation route and the health probes are mounted directly on the
//! router and never appear in the documentation tree.
//!
//! Middleware order (outermost to innermost):
//!   TraceLayer -> CatchPanicLayer -> DefaultBodyLimit -> handler

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::{Json, Router};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use crate::binder::dispatch;
use crate::config::ServerConfig;
use crate::docs::generate_docs;
use crate::registry::Registry;

/// Build the application router for a frozen registry.
///
/// # Panics
///
/// axum panics if two endpoints share a path, or if an endpoint path
/// collides with the documentation or health routes.
pub fn app(registry: &Registry, config: &ServerConfig) -> Router {
    let mut rpc = Router::new();
    for endpoint in registry.iter() {
        let endpoint = endpoint.clone();
        let path = endpoint.binding().path().to_string();
        let handler = move |body: Bytes| {
            let endpoint = endpoint.clone();
            async move { dispatch(&endpoint, body).await }
        };
        rpc = rpc.route(&path, get(handler.clone()).post(handler));
    }

    if let Some(docs_path) = &config.docs_path {
        let tree = Arc::new(generate_docs(&config.app_name, registry));
        rpc = rpc.route(
            docs_path,
            get(move || {
                let tree = tree.clone();
                async move { Json(tree.as_ref().clone()) }
            }),
        );
    }

    let rpc = rpc.layer(DefaultBodyLimit::max(config.body_limit));

    Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness))
        .merge(rpc)
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
}

/// Bind `config.socket_addr()` and serve `router` until the process exits.
pub async fn serve(router: Router, config: &ServerConfig) -> std::io::Result<()> {
    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, app = %config.app_name, "srpc listening");
    axum::serve(listener, router).await
}

/// Liveness probe: 200 while the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe. The registry is frozen before the router exists, so a
/// serving router is always ready.
async fn readiness() -> &'static str {
    "ready"
}
