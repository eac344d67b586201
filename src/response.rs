//! Outgoing HTTP response type and the [`IntoResponse`] conversion trait.
//!
//! Build a [`Response`] in your handler and return it. The server hands it
//! to hyper as-is.

use bytes::Bytes;
use http::header::{CONTENT_TYPE, HeaderName, HeaderValue};
use http::StatusCode;
use http_body_util::Full;
use tracing::warn;

// ── ContentType ───────────────────────────────────────────────────────────────

/// Common content-type values for use with [`ResponseBuilder::bytes`].
pub enum ContentType {
    Html,         // text/html; charset=utf-8
    Json,         // application/json
    OctetStream,  // application/octet-stream
    Text,         // text/plain; charset=utf-8
    Xml,          // application/xml; charset=utf-8  (WebDAV multistatus)
}

impl ContentType {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Html        => "text/html; charset=utf-8",
            Self::Json        => "application/json",
            Self::OctetStream => "application/octet-stream",
            Self::Text        => "text/plain; charset=utf-8",
            Self::Xml         => "application/xml; charset=utf-8",
        }
    }
}

// ── Response ─────────────────────────────────────────────────────────────────

/// An outgoing HTTP response.
///
/// ```rust
/// use davhook::{ContentType, Response, StatusCode};
///
/// Response::text("hello");
/// Response::status(StatusCode::NO_CONTENT);
///
/// Response::builder()
///     .status(StatusCode::MULTI_STATUS)
///     .header("dav", "1")
///     .bytes(ContentType::Xml, b"<d:multistatus xmlns:d=\"DAV:\"/>".to_vec());
/// ```
pub struct Response {
    inner: http::Response<Full<Bytes>>,
}

impl Response {
    /// `200 OK`, `application/json`.
    pub fn json(body: Vec<u8>) -> Self {
        Self::builder().json(body)
    }

    /// `200 OK`, `text/plain; charset=utf-8`.
    pub fn text(body: impl Into<String>) -> Self {
        Self::builder().text(body)
    }

    /// Response with no body.
    pub fn status(code: StatusCode) -> Self {
        Self::builder().status(code).no_body()
    }

    /// Builder for responses that need a custom status or extra headers.
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder { headers: Vec::new(), status: StatusCode::OK }
    }

    pub fn status_code(&self) -> StatusCode { self.inner.status() }

    pub(crate) fn into_inner(self) -> http::Response<Full<Bytes>> { self.inner }
}

// ── ResponseBuilder ───────────────────────────────────────────────────────────

/// Fluent builder for [`Response`].
///
/// Defaults to `200 OK`. Terminated by a typed body method.
pub struct ResponseBuilder {
    headers: Vec<(String, String)>,
    status: StatusCode,
}

impl ResponseBuilder {
    pub fn status(mut self, code: StatusCode) -> Self {
        self.status = code;
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    pub fn json(self, body: Vec<u8>) -> Response {
        self.finish(Some(ContentType::Json.as_str()), body.into())
    }

    pub fn text(self, body: impl Into<String>) -> Response {
        let body: String = body.into();
        self.finish(Some(ContentType::Text.as_str()), Bytes::from(body))
    }

    /// Terminate with a typed body. Use this for XML, HTML, binary, etc.
    pub fn bytes(self, content_type: ContentType, body: Vec<u8>) -> Response {
        self.finish(Some(content_type.as_str()), body.into())
    }

    /// Terminate with no body (e.g. `204 No Content`, `201 Created` from a PUT).
    pub fn no_body(self) -> Response {
        self.finish(None, Bytes::new())
    }

    fn finish(self, content_type: Option<&'static str>, body: Bytes) -> Response {
        let mut inner = http::Response::new(Full::new(body));
        *inner.status_mut() = self.status;

        let headers = inner.headers_mut();
        if let Some(ct) = content_type {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(ct));
        }
        for (name, value) in self.headers {
            match (HeaderName::try_from(name.as_str()), HeaderValue::try_from(value.as_str())) {
                (Ok(name), Ok(value)) => { headers.append(name, value); }
                _ => warn!(header = %name, "dropping invalid response header"),
            }
        }

        Response { inner }
    }
}

// ── IntoResponse ──────────────────────────────────────────────────────────────

/// Conversion into an HTTP [`Response`].
///
/// Implement on your own types to return them directly from handlers.
pub trait IntoResponse {
    fn into_response(self) -> Response;
}

impl IntoResponse for Response {
    fn into_response(self) -> Response { self }
}

impl IntoResponse for &'static str {
    fn into_response(self) -> Response { Response::text(self) }
}

impl IntoResponse for String {
    fn into_response(self) -> Response { Response::text(self) }
}

/// Return a status directly from a handler: `return StatusCode::NOT_FOUND`
impl IntoResponse for StatusCode {
    fn into_response(self) -> Response { Response::status(self) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_sets_content_type() {
        let res = Response::text("hi").into_inner();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()[CONTENT_TYPE], "text/plain; charset=utf-8");
    }

    #[test]
    fn builder_keeps_status_and_headers() {
        let res = Response::builder()
            .status(StatusCode::MULTI_STATUS)
            .header("dav", "1, 2")
            .bytes(ContentType::Xml, b"<x/>".to_vec())
            .into_inner();
        assert_eq!(res.status(), StatusCode::MULTI_STATUS);
        assert_eq!(res.headers()["dav"], "1, 2");
        assert_eq!(res.headers()[CONTENT_TYPE], "application/xml; charset=utf-8");
    }

    #[test]
    fn invalid_header_is_dropped() {
        let res = Response::builder()
            .header("bad header", "x")
            .no_body()
            .into_inner();
        assert!(res.headers().is_empty());
    }

    #[test]
    fn status_code_into_response() {
        assert_eq!(StatusCode::NOT_FOUND.into_response().status_code(), StatusCode::NOT_FOUND);
    }
}
