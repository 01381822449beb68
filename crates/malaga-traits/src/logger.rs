//! Logging collaborator.
//!
//! Components that report progress receive a `&dyn Logger` explicitly; there is
//! no process-wide logger registry. [`TracingLogger`] is the production
//! implementation and forwards to the `tracing` macros, so output is controlled
//! by whatever subscriber the binary installs.

use std::sync::Mutex;
use std::time::Instant;

/// Severity of a recorded log message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Progress information.
    Info,
    /// Degraded but recoverable conditions.
    Warn,
    /// Failures.
    Error,
}

/// Sink for progress and diagnostic messages.
pub trait Logger: Send + Sync {
    /// Logs an informational message.
    fn info(&self, message: &str);

    /// Logs a warning.
    fn warn(&self, message: &str);

    /// Logs an error.
    fn error(&self, message: &str);
}

/// Logger that forwards to `tracing`, tagging each event with a component name.
#[derive(Debug, Clone)]
pub struct TracingLogger {
    component: String,
}

impl TracingLogger {
    /// Creates a logger for the named component, e.g. `"prepare"`.
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
        }
    }

    /// The component name attached to every event.
    pub fn component(&self) -> &str {
        &self.component
    }
}

impl Logger for TracingLogger {
    fn info(&self, message: &str) {
        tracing::info!(component = %self.component, "{message}");
    }

    fn warn(&self, message: &str) {
        tracing::warn!(component = %self.component, "{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!(component = %self.component, "{message}");
    }
}

/// Logger that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn info(&self, _message: &str) {}
    fn warn(&self, _message: &str) {}
    fn error(&self, _message: &str) {}
}

/// Logger that keeps every message in memory.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    records: Mutex<Vec<(Level, String)>>,
}

impl MemoryLogger {
    /// Creates an empty logger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of all recorded messages in arrival order.
    pub fn records(&self) -> Vec<(Level, String)> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    /// Returns the messages recorded at `level`.
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.records()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m)
            .collect()
    }

    fn push(&self, level: Level, message: &str) {
        if let Ok(mut records) = self.records.lock() {
            records.push((level, message.to_string()));
        }
    }
}

impl Logger for MemoryLogger {
    fn info(&self, message: &str) {
        self.push(Level::Info, message);
    }

    fn warn(&self, message: &str) {
        self.push(Level::Warn, message);
    }

    fn error(&self, message: &str) {
        self.push(Level::Error, message);
    }
}

/// Scope guard that logs how long an operation took.
///
/// ```
/// use malaga_traits::logger::{MemoryLogger, Timer};
///
/// let logger = MemoryLogger::new();
/// {
///     let _timer = Timer::start(&logger, "grouping");
/// }
/// assert_eq!(logger.records().len(), 2);
/// ```
pub struct Timer<'a> {
    logger: &'a dyn Logger,
    label: String,
    started: Instant,
}

impl<'a> Timer<'a> {
    /// Logs `"<label> started."` and starts the clock.
    pub fn start(logger: &'a dyn Logger, label: impl Into<String>) -> Self {
        let label = label.into();
        logger.info(&format!("{label} started."));
        Self {
            logger,
            label,
            started: Instant::now(),
        }
    }

    /// Seconds elapsed since the timer started.
    pub fn elapsed_secs(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }
}

impl std::fmt::Debug for Timer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timer")
            .field("label", &self.label)
            .field("started", &self.started)
            .finish()
    }
}

impl Drop for Timer<'_> {
    fn drop(&mut self) {
        self.logger.info(&format!(
            "{} finished in {:.2} seconds.",
            self.label,
            self.elapsed_secs()
        ));
    }
}
