use std::convert::Infallible;

use axum::{
    body::{Body, Bytes},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use futures_util::stream;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

pub const HELLO: &str = "Hello, world!";
pub const ETAG: &str = "\"v1\"";
pub const CHUNKS: [&str; 3] = ["first chunk, ", "second chunk, ", "last chunk"];

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Greeting {
    pub message: String,
    pub id: u32,
}

pub fn app() -> Router {
    Router::new()
        .route("/hello", get(hello))
        .route("/json", get(json))
        .route("/chunked", get(chunked))
        .route("/etag", get(etag))
        .route("/echo", post(echo))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn hello() -> &'static str {
    HELLO
}

async fn json() -> Json<Greeting> {
    Json(Greeting {
        message: HELLO.to_string(),
        id: 1,
    })
}

/// No length is known up front, so the body goes out chunked.
async fn chunked() -> Response {
    let parts = CHUNKS.map(|part| Ok::<_, Infallible>(Bytes::from_static(part.as_bytes())));
    Response::builder()
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from_stream(stream::iter(parts)))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

async fn etag(headers: HeaderMap) -> Response {
    let fresh = headers
        .get(header::IF_NONE_MATCH)
        .is_some_and(|value| value.as_bytes() == ETAG.as_bytes());
    if fresh {
        (StatusCode::NOT_MODIFIED, [(header::ETAG, ETAG)]).into_response()
    } else {
        (StatusCode::OK, [(header::ETAG, ETAG)], HELLO).into_response()
    }
}

async fn echo(headers: HeaderMap, body: Bytes) -> Response {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();
    ([(header::CONTENT_TYPE, content_type)], body).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greeting_serializes_to_json() {
        let greeting = Greeting {
            message: "Test".to_string(),
            id: 7,
        };
        let json = serde_json::to_value(&greeting).unwrap();
        assert_eq!(json["message"], "Test");
        assert_eq!(json["id"], 7);
    }

    #[test]
    fn greeting_roundtrips_through_json() {
        let json = serde_json::to_string(&Greeting {
            message: HELLO.to_string(),
            id: 1,
        })
        .unwrap();
        let back: Greeting = serde_json::from_str(&json).unwrap();
        assert_eq!(back.message, HELLO);
        assert_eq!(back.id, 1);
    }

    #[test]
    fn chunks_spell_the_whole_body() {
        assert_eq!(CHUNKS.concat(), "first chunk, second chunk, last chunk");
    }
}
