//! HTTP server and graceful shutdown.
//!
//! # Request flow
//!
//! 1. hyper parses the request head; the body stays a stream.
//! 2. Every registered [`Middleware`] runs `before_method`, in order.
//! 3. The path is made relative to the base URI and routed.
//!
//! # Graceful shutdown
//!
//! On SIGTERM or Ctrl-C (or the future passed to
//! [`Server::serve_with_shutdown`]) the server stops accepting, lets every
//! in-flight connection finish, then returns.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::error::Error;
use crate::middleware::{Context, Middleware};
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;

enum Bind {
    Addr(SocketAddr),
    Listener(TcpListener),
}

/// The HTTP server.
pub struct Server {
    bind: Bind,
    base_uri: String,
    middleware: Vec<Arc<dyn Middleware>>,
}

/// Everything a connection task needs, shared across all of them.
struct App {
    router: Router,
    base_uri: String,
    middleware: Vec<Arc<dyn Middleware>>,
}

impl App {
    fn context(&self) -> Context<'_> {
        Context::new(&self.base_uri, &self.middleware)
    }
}

impl Server {
    /// Configures the server to bind to `addr` when serving starts.
    ///
    /// # Panics
    ///
    /// Panics if `addr` is not a valid `host:port` string.
    pub fn bind(addr: &str) -> Self {
        let addr: SocketAddr = addr.parse().expect("invalid socket address");
        Self::with_bind(Bind::Addr(addr))
    }

    /// Serves on an already bound listener.
    pub fn from_listener(listener: TcpListener) -> Self {
        Self::with_bind(Bind::Listener(listener))
    }

    fn with_bind(bind: Bind) -> Self {
        Self { bind, base_uri: "/".to_owned(), middleware: Vec::new() }
    }

    /// Prefix under which the router's paths are mounted. Defaults to `/`.
    ///
    /// `/dav` and `/dav/` are equivalent; a route `/{name}` then answers
    /// `/dav/notes.txt`.
    pub fn base_uri(mut self, uri: &str) -> Self {
        let trimmed = uri.trim_matches('/');
        self.base_uri = if trimmed.is_empty() {
            "/".to_owned()
        } else {
            format!("/{trimmed}/")
        };
        self
    }

    /// Registers middleware. Runs after anything registered before it.
    pub fn with(mut self, middleware: impl Middleware) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// Serves until SIGTERM or Ctrl-C, then drains in-flight connections.
    pub async fn serve(self, router: Router) -> Result<(), Error> {
        self.serve_with_shutdown(router, shutdown_signal()).await
    }

    /// Serves until `signal` resolves, then drains in-flight connections.
    pub async fn serve_with_shutdown<F>(self, router: Router, signal: F) -> Result<(), Error>
    where
        F: Future<Output = ()>,
    {
        let listener = match self.bind {
            Bind::Addr(addr) => TcpListener::bind(addr).await?,
            Bind::Listener(listener) => listener,
        };
        let addr = listener.local_addr()?;

        let app = Arc::new(App {
            router,
            base_uri: self.base_uri,
            middleware: self.middleware,
        });

        let ctx = app.context();
        for m in &app.middleware {
            m.initialize(&ctx);
        }

        info!(%addr, base_uri = %app.base_uri, "davhook listening");

        let mut tasks = tokio::task::JoinSet::new();
        tokio::pin!(signal);

        loop {
            tokio::select! {
                // Check shutdown first so a signal stops accepting immediately.
                biased;

                () = &mut signal => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let app = Arc::clone(&app);
                    let io = TokioIo::new(stream);

                    tasks.spawn(async move {
                        let svc = service_fn(move |req| dispatch(Arc::clone(&app), req));

                        if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                            .serve_connection(io, svc)
                            .await
                        {
                            error!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                // Reap finished tasks so the set does not grow without bound.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        while tasks.join_next().await.is_some() {}

        info!("davhook stopped");
        Ok(())
    }
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Runs middleware, then routes one request. Never fails: unknown routes are
/// a 404 and middleware cannot abort the request.
async fn dispatch(
    app: Arc<App>,
    req: hyper::Request<Incoming>,
) -> Result<http::Response<Full<Bytes>>, Infallible> {
    let mut req = Request::from(req);

    let ctx = app.context();
    for m in &app.middleware {
        m.before_method(&ctx, &mut req).await;
    }

    let found = relative_path(&app.base_uri, req.path())
        .and_then(|path| app.router.lookup(req.method(), path));

    let response = match found {
        Some((handler, params)) => {
            req.params = params;
            handler.call(req).await
        }
        None => Response::status(StatusCode::NOT_FOUND),
    };

    Ok(response.into_inner())
}

/// Strips `base` (which ends in `/`) from `path`, keeping a leading `/`.
/// `None` if `path` lies outside `base`.
fn relative_path<'a>(base: &str, path: &'a str) -> Option<&'a str> {
    let prefix = base.trim_end_matches('/');
    let rest = path.strip_prefix(prefix)?;
    match rest {
        "" => Some("/"),
        _ if rest.starts_with('/') => Some(rest),
        _ => None,
    }
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on SIGTERM (Unix) or Ctrl-C.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let sigterm = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}
