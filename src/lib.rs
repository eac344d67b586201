//! # davhook
//!
//! A minimal HTTP framework for WebDAV-style services, with a pre-dispatch
//! middleware hook and a built-in request debug logger.
//!
//! - Radix-tree routing via [`matchit`], one tree per method, WebDAV methods
//!   included
//! - Streaming request bodies; nothing is buffered unless someone asks
//! - Middleware that runs before routing and may replace the body
//! - [`DebugLogger`](middleware::DebugLogger): logs each request and previews
//!   text and XML bodies without taking a single byte away from the handler
//! - Graceful shutdown on SIGTERM / Ctrl-C
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use davhook::{Method, Request, Response, Router, Server, StatusCode};
//! use davhook::log::TracingLog;
//! use davhook::middleware::DebugLogger;
//!
//! #[tokio::main]
//! async fn main() {
//!     let app = Router::new()
//!         .on(Method::PUT, "/{name}", put_file);
//!
//!     Server::bind("0.0.0.0:8080")
//!         .base_uri("/dav/")
//!         .with(DebugLogger::new(TracingLog))
//!         .serve(app)
//!         .await
//!         .unwrap();
//! }
//!
//! async fn put_file(mut req: Request) -> Response {
//!     match req.bytes().await {
//!         Ok(body) => Response::text(format!("stored {} bytes", body.len())),
//!         Err(_) => Response::status(StatusCode::BAD_REQUEST),
//!     }
//! }
//! ```

mod body;
mod error;
mod handler;
mod request;
mod response;
mod router;
mod server;

pub mod inspect;
pub mod log;
pub mod middleware;

pub use body::Body;
pub use error::{BoxError, Error};
pub use handler::Handler;
pub use http::{Method, StatusCode};
pub use request::Request;
pub use response::{ContentType, IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
