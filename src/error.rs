//! Unified error type.

use std::fmt;

/// Boxed error produced by a request [`Body`](crate::Body).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The error type returned by davhook's fallible operations.
///
/// Application-level errors (404, 422, etc.) are expressed as HTTP
/// [`Response`](crate::Response) values, not as `Error`s. This type surfaces
/// infrastructure failures: binding to a port, or a request body that broke
/// off while a handler was reading it.
#[derive(Debug)]
pub struct Error(Kind);

#[derive(Debug)]
enum Kind {
    Io(std::io::Error),
    Body(BoxError),
}

impl Error {
    pub(crate) fn body(e: BoxError) -> Self {
        Self(Kind::Body(e))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Kind::Io(e) => write!(f, "io: {e}"),
            Kind::Body(e) => write!(f, "body: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.0 {
            Kind::Io(e) => Some(e),
            Kind::Body(e) => Some(e.as_ref()),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self(Kind::Io(e))
    }
}
