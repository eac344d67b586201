//! Request body inspection.
//!
//! Two pieces: an [`AllowList`] deciding which content types are worth
//! showing, and [`preview`], which peeks at the start of a body and hands back
//! a replacement that still yields every byte.
//!
//! ```text
//!  original:    [ frame ][ frame ][ fra|me ][ frame ] ...
//!                \_______ preview ______/
//!  replacement: [ preview ][ me ][ frame ] ...      (rest read lazily)
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::{Bytes, BytesMut};
use http_body_util::BodyExt;
use hyper::body::{Body as HttpBody, Frame, SizeHint};
use regex::Regex;

use crate::body::Body;
use crate::error::BoxError;

/// Default number of body bytes captured by a preview.
pub const DEFAULT_PREVIEW_LIMIT: usize = 10 * 1024;

/// Content types previewed unless configured otherwise.
pub const DEFAULT_PATTERNS: [&str; 2] = ["^text/", "^application/xml"];

// ── AllowList ─────────────────────────────────────────────────────────────────

/// Ordered set of regular expressions tested against a `Content-Type` value.
#[derive(Clone, Debug)]
pub struct AllowList {
    patterns: Vec<Regex>,
}

impl AllowList {
    /// Compiles `patterns` in order. Fails on the first invalid one.
    pub fn new<I, S>(patterns: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns.into_iter()
            .map(|p| Regex::new(p.as_ref()))
            .collect::<Result<_, _>>()?;
        Ok(Self { patterns })
    }

    /// True if `content_type` matches any pattern. An absent header never does.
    pub fn matches(&self, content_type: Option<&str>) -> bool {
        let Some(content_type) = content_type else { return false };
        self.patterns.iter().any(|p| p.is_match(content_type))
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(Regex::as_str)
    }
}

impl Default for AllowList {
    fn default() -> Self {
        Self::new(DEFAULT_PATTERNS)
            .unwrap_or_else(|e| panic!("invalid default content-type pattern: {e}"))
    }
}

/// Whether a body with this content type should be previewed.
pub fn should_preview(content_type: Option<&str>, allow_list: &AllowList) -> bool {
    allow_list.matches(content_type)
}

// ── preview ───────────────────────────────────────────────────────────────────

/// The captured prefix of a body and the body to hand downstream instead.
#[derive(Debug)]
pub struct Preview {
    /// At most `limit` bytes from the start of the body.
    pub bytes: Bytes,
    /// Yields `bytes` followed by everything the original had left.
    pub body: Body,
}

/// Reads up to `limit` bytes from `body`.
///
/// The original must not be read again; use [`Preview::body`] in its place.
/// A body shorter than `limit` is not an error, the preview is just shorter.
/// Only the prefix is read here; the remainder streams through the returned
/// body as the downstream reader pulls it.
pub async fn preview(mut body: Body, limit: usize) -> Result<Preview, StreamReadError> {
    let mut head = BytesMut::new();
    let mut pending = VecDeque::new();

    while head.len() < limit {
        let frame = match body.frame().await {
            None => break,
            Some(Ok(frame)) => frame,
            Some(Err(source)) => return Err(StreamReadError { source, body }),
        };
        match frame.into_data() {
            Ok(mut data) => {
                let wanted = limit - head.len();
                if data.len() > wanted {
                    let rest = data.split_off(wanted);
                    pending.push_back(Frame::data(rest));
                }
                head.extend_from_slice(&data);
            }
            // Trailers end the stream.
            Err(frame) => {
                pending.push_back(frame);
                break;
            }
        }
    }

    let bytes = head.freeze();
    if !bytes.is_empty() {
        pending.push_front(Frame::data(bytes.clone()));
    }

    Ok(Preview {
        bytes,
        body: Body::new(Replay { pending, rest: body }),
    })
}

/// Frames already pulled off the original, then the original itself.
struct Replay {
    pending: VecDeque<Frame<Bytes>>,
    rest: Body,
}

impl HttpBody for Replay {
    type Data = Bytes;
    type Error = BoxError;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Bytes>, BoxError>>> {
        let this = self.get_mut();
        match this.pending.pop_front() {
            Some(frame) => Poll::Ready(Some(Ok(frame))),
            None => Pin::new(&mut this.rest).poll_frame(cx),
        }
    }

    fn is_end_stream(&self) -> bool {
        self.pending.is_empty() && self.rest.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        let buffered: u64 = self.pending.iter()
            .filter_map(Frame::data_ref)
            .map(|data| data.len() as u64)
            .sum();
        let rest = self.rest.size_hint();

        let mut hint = SizeHint::new();
        hint.set_lower(rest.lower() + buffered);
        if let Some(upper) = rest.upper() {
            hint.set_upper(upper + buffered);
        }
        hint
    }
}

// ── StreamReadError ───────────────────────────────────────────────────────────

/// The original body failed while the preview was being read.
///
/// Holds what is left of the body so the caller can put it back on the
/// request. Bytes read before the failure are gone.
pub struct StreamReadError {
    source: BoxError,
    body: Body,
}

impl StreamReadError {
    /// The partially consumed original body.
    pub fn into_body(self) -> Body {
        self.body
    }
}

impl fmt::Debug for StreamReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamReadError")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for StreamReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to read request body: {}", self.source)
    }
}

impl std::error::Error for StreamReadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.source.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderMap;

    /// Yields the given frames in order, then ends.
    struct Frames(VecDeque<Result<Frame<Bytes>, BoxError>>);

    impl Frames {
        fn data(chunks: &[&'static str]) -> Self {
            Self(chunks.iter().map(|c| Ok(Frame::data(Bytes::from_static(c.as_bytes())))).collect())
        }
    }

    impl HttpBody for Frames {
        type Data = Bytes;
        type Error = BoxError;

        fn poll_frame(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
        ) -> Poll<Option<Result<Frame<Bytes>, BoxError>>> {
            Poll::Ready(self.get_mut().0.pop_front())
        }
    }

    #[test]
    fn default_allow_list() {
        let list = AllowList::default();
        assert!(list.matches(Some("text/plain")));
        assert!(list.matches(Some("text/html; charset=utf-8")));
        assert!(list.matches(Some("application/xml")));
        assert!(list.matches(Some("application/xml; charset=utf-8")));
        assert!(!list.matches(Some("application/octet-stream")));
        assert!(!list.matches(Some("application/json")));
        assert!(!list.matches(Some("")));
        assert!(!list.matches(None));
    }

    #[test]
    fn patterns_are_anchored_as_written() {
        let list = AllowList::default();
        assert!(!list.matches(Some("multipart/text/plain")));
        assert_eq!(list.patterns().collect::<Vec<_>>(), DEFAULT_PATTERNS);
    }

    #[test]
    fn custom_allow_list() {
        let list = AllowList::new(["^application/json$"]).unwrap();
        assert!(should_preview(Some("application/json"), &list));
        assert!(!should_preview(Some("text/plain"), &list));

        assert!(AllowList::new(["("]).is_err());
        assert!(!AllowList::new(Vec::<String>::new()).unwrap().matches(Some("text/plain")));
    }

    #[tokio::test]
    async fn short_body_is_previewed_whole() {
        let preview = preview(Body::from("hello world"), DEFAULT_PREVIEW_LIMIT).await.unwrap();
        assert_eq!(preview.bytes, "hello world");
        assert_eq!(preview.body.collect().await.unwrap(), "hello world");
    }

    #[tokio::test]
    async fn long_body_is_truncated_in_preview_only() {
        let original = vec![b'x'; 20_000];
        let preview = preview(Body::from(original.clone()), DEFAULT_PREVIEW_LIMIT).await.unwrap();
        assert_eq!(preview.bytes.len(), DEFAULT_PREVIEW_LIMIT);
        assert!(preview.bytes.iter().all(|&b| b == b'x'));
        assert_eq!(preview.body.collect().await.unwrap(), original);
    }

    #[tokio::test]
    async fn limit_inside_a_frame_splits_it() {
        let body = Body::new(Frames::data(&["abc", "defg", "hij"]));
        let preview = preview(body, 5).await.unwrap();
        assert_eq!(preview.bytes, "abcde");
        assert_eq!(preview.body.collect().await.unwrap(), "abcdefghij");
    }

    #[tokio::test]
    async fn limit_on_a_frame_boundary() {
        let body = Body::new(Frames::data(&["abc", "def"]));
        let preview = preview(body, 3).await.unwrap();
        assert_eq!(preview.bytes, "abc");
        assert_eq!(preview.body.collect().await.unwrap(), "abcdef");
    }

    #[tokio::test]
    async fn zero_limit_previews_nothing() {
        let preview = preview(Body::from("payload"), 0).await.unwrap();
        assert!(preview.bytes.is_empty());
        assert_eq!(preview.body.collect().await.unwrap(), "payload");
    }

    #[tokio::test]
    async fn empty_body() {
        let preview = preview(Body::empty(), DEFAULT_PREVIEW_LIMIT).await.unwrap();
        assert!(preview.bytes.is_empty());
        assert!(preview.body.is_end_stream());
        assert!(preview.body.collect().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn trailers_survive() {
        let mut trailers = HeaderMap::new();
        trailers.insert("x-checksum", "abc".parse().unwrap());
        let mut frames = Frames::data(&["body"]);
        frames.0.push_back(Ok(Frame::trailers(trailers)));

        let preview = preview(Body::new(frames), 100).await.unwrap();
        assert_eq!(preview.bytes, "body");

        let collected = BodyExt::collect(preview.body).await.unwrap();
        assert_eq!(collected.trailers().unwrap()["x-checksum"], "abc");
        assert_eq!(collected.to_bytes(), "body");
    }

    #[tokio::test]
    async fn size_hint_covers_buffered_and_remaining() {
        let preview = preview(Body::from(vec![0u8; 300]), 100).await.unwrap();
        assert_eq!(preview.body.size_hint().exact(), Some(300));
    }

    #[tokio::test]
    async fn read_failure_returns_remaining_body() {
        let mut frames = Frames::data(&["abc"]);
        frames.0.push_back(Err("connection reset".into()));
        frames.0.push_back(Ok(Frame::data(Bytes::from_static(b"tail"))));

        let err = preview(Body::new(frames), 100).await.unwrap_err();
        assert_eq!(err.to_string(), "failed to read request body: connection reset");
        assert_eq!(err.into_body().collect().await.unwrap(), "tail");
    }
}
