use axum::http::{self, header, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Greeting, CHUNKS, ETAG, HELLO};
use tower::ServiceExt;

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

// --- fixed length ---

#[tokio::test]
async fn hello_returns_text() {
    let resp = app().oneshot(get("/hello")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_bytes(resp).await, HELLO.as_bytes());
}

#[tokio::test]
async fn json_returns_greeting() {
    let resp = app().oneshot(get("/json")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/json"
    );
    let greeting: Greeting = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(greeting.message, HELLO);
    assert_eq!(greeting.id, 1);
}

// --- streamed ---

#[tokio::test]
async fn chunked_streams_every_part() {
    let resp = app().oneshot(get("/chunked")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().get(header::CONTENT_LENGTH).is_none());
    assert_eq!(body_bytes(resp).await, CHUNKS.concat().as_bytes());
}

// --- conditional ---

#[tokio::test]
async fn etag_without_condition_returns_body() {
    let resp = app().oneshot(get("/etag")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get(header::ETAG).unwrap(), ETAG);
    assert_eq!(body_bytes(resp).await, HELLO.as_bytes());
}

#[tokio::test]
async fn etag_matching_returns_304() {
    let request = Request::builder()
        .uri("/etag")
        .header(header::IF_NONE_MATCH, ETAG)
        .body(String::new())
        .unwrap();
    let resp = app().oneshot(request).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_MODIFIED);
    assert!(body_bytes(resp).await.is_empty());
}

// --- echo ---

#[tokio::test]
async fn echo_returns_request_body() {
    let request = Request::builder()
        .method("POST")
        .uri("/echo")
        .header(http::header::CONTENT_TYPE, "text/plain")
        .body("ping".to_string())
        .unwrap();
    let resp = app().oneshot(request).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "text/plain");
    assert_eq!(body_bytes(resp).await, "ping".as_bytes());
}

#[tokio::test]
async fn echo_rejects_get() {
    let resp = app().oneshot(get("/echo")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn unknown_path_is_404() {
    let resp = app().oneshot(get("/nope")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
