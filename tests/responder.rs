use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use log_monitor::{drain, server};
use tower::ServiceExt;

async fn call(app: axum::Router, method: Method, uri: &str, body: &'static str) -> (StatusCode, Option<String>, Vec<u8>) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::from(body))
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let content_type = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = hyper::body::to_bytes(resp.into_body()).await.unwrap();
    (status, content_type, bytes.to_vec())
}

#[tokio::test]
async fn responder_answers_sample_paths() {
    let (status, content_type, body) =
        call(server::create_responder(false), Method::GET, "/samples/12345", "").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("text/plain"));
    assert!(body.is_empty());
}

#[tokio::test]
async fn responder_answers_any_method_and_path() {
    for (method, uri) in [
        (Method::GET, "/"),
        (Method::POST, "/anything/else?x=1"),
        (Method::DELETE, "/samples"),
    ] {
        let (status, _, body) = call(server::create_responder(true), method, uri, "payload").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_empty());
    }
}

#[tokio::test]
async fn drain_accepts_bodies_and_returns_empty_ok() {
    let (status, content_type, body) = call(
        drain::create_drain(),
        Method::POST,
        "/logs",
        "83 <40>1 2024-06-01T08:00:00Z host app web.1 - hello",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("text/plain"));
    assert!(body.is_empty());
}
