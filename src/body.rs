//! Streaming request body.
//!
//! A [`Body`] is read frame by frame and only once. Anything that wants to look
//! at the bytes ahead of the handler (see [`crate::inspect::preview`]) must hand
//! back a replacement body with the same content.

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Empty, Full};
use hyper::body::{Frame, SizeHint};

use crate::error::BoxError;

/// A type-erased, single-pass request body.
pub struct Body(UnsyncBoxBody<Bytes, BoxError>);

impl Body {
    /// Wraps any `http_body::Body` yielding [`Bytes`].
    pub fn new<B>(body: B) -> Self
    where
        B: hyper::body::Body<Data = Bytes> + Send + 'static,
        B::Error: Into<BoxError>,
    {
        Self(body.map_err(Into::into).boxed_unsync())
    }

    pub fn empty() -> Self {
        Self::new(Empty::<Bytes>::new())
    }

    /// Reads the remaining frames and concatenates their data. Trailers are
    /// discarded.
    pub async fn collect(self) -> Result<Bytes, BoxError> {
        Ok(BodyExt::collect(self.0).await?.to_bytes())
    }
}

impl Default for Body {
    fn default() -> Self { Self::empty() }
}

impl std::fmt::Debug for Body {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Body").finish_non_exhaustive()
    }
}

impl hyper::body::Body for Body {
    type Data = Bytes;
    type Error = BoxError;

    fn poll_frame(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Bytes>, BoxError>>> {
        Pin::new(&mut self.0).poll_frame(cx)
    }

    fn is_end_stream(&self) -> bool { self.0.is_end_stream() }

    fn size_hint(&self) -> SizeHint { self.0.size_hint() }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self { Self::new(Full::new(bytes)) }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self { Self::from(Bytes::from(bytes)) }
}

impl From<String> for Body {
    fn from(s: String) -> Self { Self::from(Bytes::from(s)) }
}

impl From<&'static str> for Body {
    fn from(s: &'static str) -> Self { Self::from(Bytes::from_static(s.as_bytes())) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::body::Body as _;

    #[tokio::test]
    async fn collects_full_body() {
        let body = Body::from("hello world");
        assert_eq!(body.collect().await.unwrap(), "hello world");
    }

    #[tokio::test]
    async fn empty_body_is_end_of_stream() {
        let body = Body::empty();
        assert!(body.is_end_stream());
        assert_eq!(body.collect().await.unwrap(), Bytes::new());
    }

    #[test]
    fn size_hint_is_exact_for_buffered_bytes() {
        let body = Body::from(vec![0u8; 42]);
        assert_eq!(body.size_hint().exact(), Some(42));
    }
}
