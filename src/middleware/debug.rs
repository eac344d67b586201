//! Request debug logging.
//!
//! [`DebugLogger`] writes a readable account of each request before it is
//! handled:
//!
//! ```text
//! INFO   PUT /dav/notes.txt
//! DEBUG  Plugins loaded:
//! DEBUG    debuglogger (davhook::middleware::debug::DebugLogger<davhook::log::TracingLog>)
//! DEBUG  Base URI: /dav/
//! DEBUG  Headers:
//! DEBUG    content-type: text/plain
//! DEBUG  Request body:
//! DEBUG  hello world
//! ```
//!
//! The body is only shown for allow-listed content types (text and XML by
//! default) and only up to the preview limit. The handler still receives the
//! complete body.

use chrono::{DateTime, Utc};
use tracing::Level;

use crate::inspect::{self, AllowList, DEFAULT_PREVIEW_LIMIT, Preview};
use crate::log::{Log, TracingLog};
use crate::middleware::{Context, Middleware, MiddlewareFuture};
use crate::request::Request;

/// Logs every request through a [`Log`] sink.
pub struct DebugLogger<L = TracingLog> {
    log: L,
    allow_list: AllowList,
    preview_limit: usize,
    started: DateTime<Utc>,
}

impl<L: Log> DebugLogger<L> {
    /// Default allow-list (`^text/`, `^application/xml`) and a 10 KiB preview.
    pub fn new(log: L) -> Self {
        Self {
            log,
            allow_list: AllowList::default(),
            preview_limit: DEFAULT_PREVIEW_LIMIT,
            started: Utc::now(),
        }
    }

    /// Content types whose bodies are previewed.
    pub fn allow_list(mut self, allow_list: AllowList) -> Self {
        self.allow_list = allow_list;
        self
    }

    /// Maximum number of body bytes logged per request.
    pub fn preview_limit(mut self, limit: usize) -> Self {
        self.preview_limit = limit;
        self
    }

    async fn log_request(&self, ctx: &Context<'_>, req: &mut Request) {
        self.log.log(Level::INFO, &format!("{} {}", req.method(), req.path()));

        self.log.log(Level::DEBUG, "Plugins loaded:");
        for m in ctx.middleware() {
            self.log.log(Level::DEBUG, &format!("  {} ({})", m.name(), m.type_name()));
        }
        self.log.log(Level::DEBUG, &format!("Base URI: {}", ctx.base_uri()));

        self.log.log(Level::DEBUG, "Headers:");
        for (name, value) in req.headers() {
            let value = String::from_utf8_lossy(value.as_bytes());
            self.log.log(Level::DEBUG, &format!("  {name}: {value}"));
        }

        if !inspect::should_preview(req.header("content-type"), &self.allow_list) {
            return;
        }

        match inspect::preview(req.take_body(), self.preview_limit).await {
            Ok(Preview { bytes, body }) => {
                self.log.log(Level::DEBUG, "Request body:");
                self.log.log(Level::DEBUG, &String::from_utf8_lossy(&bytes));
                req.set_body(body);
            }
            Err(err) => {
                self.log.log(Level::ERROR, &format!("Skipping request body preview: {err}"));
                req.set_body(err.into_body());
            }
        }
    }
}

impl<L: Log> Middleware for DebugLogger<L> {
    fn name(&self) -> &str {
        "debuglogger"
    }

    fn initialize(&self, _ctx: &Context<'_>) {
        self.log.log(Level::INFO, &format!(
            "Initialized plugin. Start time {} ({}). Version: {}",
            self.started.timestamp(),
            self.started.to_rfc2822(),
            env!("CARGO_PKG_VERSION"),
        ));
    }

    fn before_method<'a>(&'a self, ctx: &'a Context<'a>, req: &'a mut Request) -> MiddlewareFuture<'a> {
        Box::pin(self.log_request(ctx, req))
    }
}
