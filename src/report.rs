//! Diagnostics for routes that produce no example.
//!
//! The resolver receives a [`Reporter`] explicitly. In quiet mode a failed
//! route logs one warning plus a hint to re-run verbosely; in verbose mode it
//! logs the full error and every intermediate fallback failure.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::Level;

use crate::error::ExampleError;
use crate::route::RouteInfo;

/// Printed in quiet mode after a route failure
pub const VERBOSE_HINT: &str = "Run with verbose logging enabled to see the full error.";

/// Destination for diagnostic lines
pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, level: Level, message: &str);
}

/// Emits diagnostics as `tracing` events under the `specimen` target
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&self, level: Level, message: &str) {
        match level {
            Level::ERROR => tracing::error!(target: "specimen", "{message}"),
            Level::WARN => tracing::warn!(target: "specimen", "{message}"),
            Level::INFO => tracing::info!(target: "specimen", "{message}"),
            Level::DEBUG => tracing::debug!(target: "specimen", "{message}"),
            _ => tracing::trace!(target: "specimen", "{message}"),
        }
    }
}

/// Keeps diagnostics in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<(Level, String)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<(Level, String)> {
        self.lines.lock().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.lines.lock().iter().map(|(_, line)| line.clone()).collect()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines.lock().iter().any(|(_, line)| line.contains(needle))
    }
}

impl DiagnosticSink for MemorySink {
    fn emit(&self, level: Level, message: &str) {
        self.lines.lock().push((level, message.to_string()));
    }
}

#[derive(Clone)]
pub struct Reporter {
    verbose: bool,
    sink: Arc<dyn DiagnosticSink>,
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new(false, Arc::new(TracingSink))
    }
}

impl Reporter {
    pub fn new(verbose: bool, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self { verbose, sink }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Intermediate detail, dropped in quiet mode
    pub fn detail(&self, message: impl AsRef<str>) {
        if self.verbose {
            self.sink.emit(Level::DEBUG, message.as_ref());
        }
    }

    /// Emitted regardless of verbosity
    pub fn warn(&self, message: impl AsRef<str>) {
        self.sink.emit(Level::WARN, message.as_ref());
    }

    pub fn route_failure(&self, route: &RouteInfo, error: &ExampleError) {
        self.sink.emit(
            Level::WARN,
            &format!(
                "Couldn't generate example response for {route}: {}",
                error.headline()
            ),
        );

        if self.verbose {
            for line in error.details() {
                self.sink.emit(Level::WARN, &line);
            }
        } else {
            self.sink.emit(Level::INFO, VERBOSE_HINT);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigurationError;
    use axum::http::Method;

    fn failure() -> ExampleError {
        ConfigurationError::MissingModelAnnotation {
            resource: "UserResource".into(),
        }
        .into()
    }

    #[test]
    fn quiet_mode_prints_hint() {
        let sink = Arc::new(MemorySink::new());
        let reporter = Reporter::new(false, sink.clone());
        let route = RouteInfo::single(Method::GET, "/users");

        reporter.detail("factory failed");
        reporter.route_failure(&route, &failure());

        assert_eq!(
            sink.lines(),
            vec![
                (
                    Level::WARN,
                    "Couldn't generate example response for [GET] /users: missing resource annotation"
                        .to_string()
                ),
                (Level::INFO, VERBOSE_HINT.to_string()),
            ]
        );
    }

    #[test]
    fn verbose_mode_prints_details() {
        let sink = Arc::new(MemorySink::new());
        let reporter = Reporter::new(true, sink.clone());
        let route = RouteInfo::single(Method::POST, "/users");

        reporter.detail("factory failed");
        reporter.route_failure(&route, &failure());

        let messages = sink.messages();
        assert_eq!(messages[0], "factory failed");
        assert!(messages[2].contains("missing @resourcemodel annotation"));
        assert!(!sink.contains(VERBOSE_HINT));
    }

    #[test]
    fn warnings_ignore_verbosity() {
        let sink = Arc::new(MemorySink::new());
        Reporter::new(false, sink.clone()).warn("rollback failed");
        Reporter::new(true, sink.clone()).warn("rollback failed again");

        assert_eq!(
            sink.lines(),
            vec![
                (Level::WARN, "rollback failed".to_string()),
                (Level::WARN, "rollback failed again".to_string()),
            ]
        );
    }

    #[test]
    fn tracing_sink_accepts_every_level() {
        let sink = TracingSink;
        for level in [Level::ERROR, Level::WARN, Level::INFO, Level::DEBUG, Level::TRACE] {
            sink.emit(level, "message");
        }
    }
}
