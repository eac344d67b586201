//! Logging collaborator for middleware.
//!
//! Middleware that reports about requests writes through a [`Log`] instead
//! of calling `tracing` directly, so the sink can be swapped (or recorded in
//! tests). [`TracingLog`] is the default and forwards to `tracing`.

use std::sync::Arc;

use tracing::Level;

/// A sink that accepts a severity and a text message.
///
/// Implementations must not fail observably. Whatever goes wrong inside a
/// sink stays there.
pub trait Log: Send + Sync + 'static {
    fn log(&self, level: Level, message: &str);
}

impl<L: Log + ?Sized> Log for Arc<L> {
    fn log(&self, level: Level, message: &str) {
        (**self).log(level, message);
    }
}

/// Forwards every message as a `tracing` event with target `davhook::debug`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLog;

impl Log for TracingLog {
    fn log(&self, level: Level, message: &str) {
        // The event macros need the level as a constant.
        match level {
            Level::ERROR => tracing::error!(target: "davhook::debug", "{message}"),
            Level::WARN  => tracing::warn!(target: "davhook::debug", "{message}"),
            Level::INFO  => tracing::info!(target: "davhook::debug", "{message}"),
            Level::DEBUG => tracing::debug!(target: "davhook::debug", "{message}"),
            _            => tracing::trace!(target: "davhook::debug", "{message}"),
        }
    }
}
