//! Debug drain: logs every request in full and answers with an empty `200`.

use axum::{
    body::Bytes,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::IntoResponse,
    Router,
};
use std::net::SocketAddr;
use tracing::info;

/// Human-readable dump of one request: request line, indented headers, body.
pub fn describe_request(method: &Method, uri: &Uri, headers: &HeaderMap, body: &[u8]) -> String {
    let header_lines: Vec<String> = headers
        .iter()
        .map(|(name, value)| format!("  {}:{}", name, String::from_utf8_lossy(value.as_bytes())))
        .collect();
    format!(
        "{} {}\n{}\n{}\n",
        method,
        uri,
        header_lines.join("\n"),
        String::from_utf8_lossy(body)
    )
}

async fn drain(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> impl IntoResponse {
    info!("{}", describe_request(&method, &uri, &headers, &body));
    (StatusCode::OK, [(header::CONTENT_TYPE, "text/plain")], "")
}

pub fn create_drain() -> Router {
    Router::new().fallback(drain)
}

pub async fn start_drain(port: u16) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "Debug drain listening");
    hyper::Server::try_bind(&addr)?
        .serve(create_drain().into_make_service())
        .await?;
    Ok(())
}
