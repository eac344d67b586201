//! Incoming HTTP request type.

use std::collections::HashMap;

use bytes::Bytes;
use http::request::Parts;
use http::{HeaderMap, Method, Uri};

use crate::body::Body;
use crate::error::{BoxError, Error};

/// An incoming HTTP request.
///
/// The head (method, URI, headers) is read-only. The body is a single-pass
/// stream that middleware may take and replace before the handler sees it.
pub struct Request {
    head: Parts,
    body: Body,
    pub(crate) params: HashMap<String, String>,
}

impl Request {
    pub fn method(&self) -> &Method { &self.head.method }
    pub fn uri(&self) -> &Uri { &self.head.uri }
    pub fn path(&self) -> &str { self.head.uri.path() }
    pub fn headers(&self) -> &HeaderMap { &self.head.headers }

    /// Header lookup. Names are case-insensitive; values that are not valid
    /// UTF-8 read as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.head.headers.get(name)?.to_str().ok()
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/files/{name}`, `req.param("name")` on `/files/a.txt` returns `Some("a.txt")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Moves the body out, leaving an empty one behind.
    pub fn take_body(&mut self) -> Body {
        std::mem::take(&mut self.body)
    }

    /// Replaces the body. Downstream readers see only the new one.
    pub fn set_body(&mut self, body: Body) {
        self.body = body;
    }

    /// Reads the whole body into memory.
    pub async fn bytes(&mut self) -> Result<Bytes, Error> {
        self.take_body().collect().await.map_err(Error::body)
    }
}

impl<B> From<http::Request<B>> for Request
where
    B: hyper::body::Body<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError>,
{
    fn from(req: http::Request<B>) -> Self {
        let (head, body) = req.into_parts();
        Self { head, body: Body::new(body), params: HashMap::new() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::Full;

    fn request(body: &'static str) -> Request {
        http::Request::builder()
            .method("PUT")
            .uri("/dav/notes.txt?rev=2")
            .header("Content-Type", "text/plain")
            .body(Full::new(Bytes::from_static(body.as_bytes())))
            .unwrap()
            .into()
    }

    #[test]
    fn exposes_head() {
        let req = request("");
        assert_eq!(req.method(), Method::PUT);
        assert_eq!(req.path(), "/dav/notes.txt");
        assert_eq!(req.uri().query(), Some("rev=2"));
    }

    #[test]
    fn header_lookup_ignores_case() {
        let req = request("");
        assert_eq!(req.header("content-type"), Some("text/plain"));
        assert_eq!(req.header("CONTENT-TYPE"), Some("text/plain"));
        assert_eq!(req.header("x-missing"), None);
    }

    #[tokio::test]
    async fn take_body_leaves_empty_body() {
        let mut req = request("payload");
        let body = req.take_body();
        assert_eq!(body.collect().await.unwrap(), "payload");
        assert!(req.bytes().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn set_body_replaces_content() {
        let mut req = request("old");
        req.set_body(Body::from("new"));
        assert_eq!(req.bytes().await.unwrap(), "new");
    }
}
