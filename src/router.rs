//! Radix-tree request router.
//!
//! One tree per HTTP method, WebDAV extension methods included. O(path-length)
//! lookup. Paths are matched relative to the server's base URI.

use std::collections::HashMap;
use std::sync::Arc;

use http::Method;
use matchit::Router as MatchitRouter;

use crate::handler::{BoxedHandler, Handler};

/// The application router.
///
/// Build it once at startup and pass it to [`Server::serve`](crate::Server::serve).
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Path parameters use `{name}` syntax. WebDAV methods are built with
    /// [`Method::from_bytes`]:
    ///
    /// ```rust,no_run
    /// # use davhook::{Method, Request, Response, Router};
    /// # async fn get_file(_: Request) -> Response { Response::text("") }
    /// # async fn propfind(_: Request) -> Response { Response::text("") }
    /// let propfind_method = Method::from_bytes(b"PROPFIND").unwrap();
    /// Router::new()
    ///     .on(Method::GET,     "/files/{name}", get_file)
    ///     .on(propfind_method, "/files/{name}", propfind);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route or conflicts with one already
    /// registered for `method`.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    pub(crate) fn lookup(
        &self,
        method: &Method,
        path: &str,
    ) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let tree = self.routes.get(method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Response;

    async fn ok(_: crate::Request) -> Response { Response::text("ok") }

    #[test]
    fn matches_method_and_params() {
        let mkcol = Method::from_bytes(b"MKCOL").unwrap();
        let router = Router::new()
            .on(Method::GET, "/files/{name}", ok)
            .on(mkcol.clone(), "/files/{name}", ok);

        let (_, params) = router.lookup(&Method::GET, "/files/a.txt").unwrap();
        assert_eq!(params["name"], "a.txt");
        assert!(router.lookup(&mkcol, "/files/dir").is_some());
        assert!(router.lookup(&Method::PUT, "/files/a.txt").is_none());
        assert!(router.lookup(&Method::GET, "/other").is_none());
    }
}
