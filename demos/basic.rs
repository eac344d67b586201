//! Minimal davhook example: a tiny in-memory file store with request debug
//! logging.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example basic
//!
//! Try:
//!   curl -X PUT http://localhost:8080/dav/notes.txt \
//!        -H 'content-type: text/plain' -d 'hello world'
//!   curl http://localhost:8080/dav/notes.txt
//!   curl -X PROPFIND http://localhost:8080/dav/notes.txt

use std::collections::HashMap;
use std::sync::{LazyLock, Mutex};

use bytes::Bytes;
use davhook::log::TracingLog;
use davhook::middleware::DebugLogger;
use davhook::{ContentType, Method, Request, Response, Router, Server, StatusCode};

static FILES: LazyLock<Mutex<HashMap<String, Bytes>>> = LazyLock::new(Default::default);

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let propfind = Method::from_bytes(b"PROPFIND").expect("valid method");

    let app = Router::new()
        .on(Method::GET, "/{name}", get_file)
        .on(Method::PUT, "/{name}", put_file)
        .on(propfind, "/{name}", propfind_file);

    Server::bind("0.0.0.0:8080")
        .base_uri("/dav/")
        .with(DebugLogger::new(TracingLog))
        .serve(app)
        .await
        .expect("server error");
}

async fn get_file(req: Request) -> Response {
    let name = req.param("name").unwrap_or_default();
    match FILES.lock().unwrap().get(name) {
        Some(body) => Response::builder().bytes(ContentType::OctetStream, body.to_vec()),
        None => Response::status(StatusCode::NOT_FOUND),
    }
}

// The debug logger has already previewed the body; the handler still gets all of it.
async fn put_file(mut req: Request) -> Response {
    let name = req.param("name").unwrap_or_default().to_owned();
    let Ok(body) = req.bytes().await else {
        return Response::status(StatusCode::BAD_REQUEST);
    };
    FILES.lock().unwrap().insert(name, body);
    Response::status(StatusCode::CREATED)
}

async fn propfind_file(req: Request) -> Response {
    let name = req.param("name").unwrap_or_default();
    let Some(len) = FILES.lock().unwrap().get(name).map(Bytes::len) else {
        return Response::status(StatusCode::NOT_FOUND);
    };
    let xml = format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<d:multistatus xmlns:d="DAV:">
  <d:response>
    <d:href>/dav/{name}</d:href>
    <d:propstat>
      <d:prop><d:getcontentlength>{len}</d:getcontentlength></d:prop>
      <d:status>HTTP/1.1 200 OK</d:status>
    </d:propstat>
  </d:response>
</d:multistatus>"#
    );
    Response::builder()
        .status(StatusCode::MULTI_STATUS)
        .bytes(ContentType::Xml, xml.into_bytes())
}
