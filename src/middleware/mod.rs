//! Middleware layer.
//!
//! Middleware runs once per request, after the head is parsed and before the
//! request is routed to its handler. It gets exclusive access to the
//! [`Request`] for that moment. It can inspect the request or swap the body,
//! but it cannot answer the request itself.
//!
//! Register middleware on the server; it runs in registration order:
//!
//! ```rust,no_run
//! use davhook::{Router, Server};
//! use davhook::log::TracingLog;
//! use davhook::middleware::DebugLogger;
//!
//! # async fn run() -> Result<(), davhook::Error> {
//! Server::bind("0.0.0.0:8080")
//!     .base_uri("/dav/")
//!     .with(DebugLogger::new(TracingLog))
//!     .serve(Router::new())
//!     .await
//! # }
//! ```
//!
//! Built-in middleware:
//! - [`DebugLogger`]: logs method, path, headers and a preview of text bodies

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;

pub mod debug;

pub use debug::DebugLogger;

/// Future returned by [`Middleware::before_method`].
pub type MiddlewareFuture<'a> = Pin<Box<dyn Future<Output = ()> + Send + 'a>>;

/// A pre-dispatch hook.
pub trait Middleware: Send + Sync + 'static {
    /// Short identifier, shown wherever loaded middleware is listed.
    fn name(&self) -> &str;

    /// Fully qualified Rust type of the middleware.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Called once when the server starts, before it accepts connections.
    fn initialize(&self, _ctx: &Context<'_>) {}

    /// Called for every request before it is routed.
    fn before_method<'a>(&'a self, ctx: &'a Context<'a>, req: &'a mut Request) -> MiddlewareFuture<'a>;
}

/// What middleware can see of the server it is running in.
#[derive(Clone, Copy)]
pub struct Context<'a> {
    base_uri: &'a str,
    middleware: &'a [Arc<dyn Middleware>],
}

impl<'a> Context<'a> {
    pub fn new(base_uri: &'a str, middleware: &'a [Arc<dyn Middleware>]) -> Self {
        Self { base_uri, middleware }
    }

    /// Prefix under which routes are mounted. Always ends with `/`.
    pub fn base_uri(&self) -> &'a str {
        self.base_uri
    }

    /// Every registered middleware, in the order it runs.
    pub fn middleware(&self) -> impl Iterator<Item = &'a dyn Middleware> + 'a {
        self.middleware.iter().map(|m| &**m)
    }
}
