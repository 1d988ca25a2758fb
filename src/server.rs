//! Sample responder: the target of the HTTP-log emitter.
//!
//! Every request, whatever its method or path, gets an empty `200` with
//! `Content-Type: text/plain`. Its only job is to produce access-log lines.

use crate::observability::metrics;
use axum::{
    http::{header, StatusCode, Uri},
    response::IntoResponse,
    Extension, Router,
};
use std::future::Future;
use std::net::SocketAddr;
use tracing::info;

#[derive(Clone, Copy, Debug)]
struct ResponderOptions {
    log_requests: bool,
}

async fn respond(Extension(opts): Extension<ResponderOptions>, uri: Uri) -> impl IntoResponse {
    metrics::responder::request();
    if opts.log_requests {
        info!("<- {}", uri);
    }
    (StatusCode::OK, [(header::CONTENT_TYPE, "text/plain")], "")
}

/// Router answering every path. `log_requests` logs each request path.
pub fn create_responder(log_requests: bool) -> Router {
    Router::new()
        .fallback(respond)
        .layer(Extension(ResponderOptions { log_requests }))
}

/// Serve the responder on `0.0.0.0:port` until `shutdown` resolves.
pub async fn start_responder<F>(
    port: u16,
    log_requests: bool,
    shutdown: F,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = create_responder(log_requests);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!(%addr, "Sample responder listening");
    hyper::Server::try_bind(&addr)?
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("Sample responder stopped");

    Ok(())
}
