//! Logger implementation and the process-wide default logger
//!
//! A `Logger` binds a [`Handler`] together with a list of persistent
//! arguments and a pair of gates (source capture, debug). Its `log`
//! method accepts a superset of the usual printf-style format, where a
//! verb may carry a `%{name}` clause naming the matching argument:
//!
//! ```
//! use evlog::{Logger, RecordingHandler, Value};
//! use std::sync::Arc;
//!
//! let recorder = Arc::new(RecordingHandler::new());
//! let logger = Logger::new(Arc::clone(&recorder));
//!
//! logger.log("Hello %{name}s!", &[Value::from("Luke")]);
//!
//! let events = recorder.events();
//! assert_eq!(events[0].message, "Hello Luke!");
//! assert_eq!(events[0].args.get("name"), Some(&Value::from("Luke")));
//! ```
//!
//! Loggers are safe to use concurrently from any number of threads; the
//! only mutable state in the log path is the per-call scratch record
//! checked out of the pool.

use super::event::{Args, Value};
use super::format;
use super::handler::Handler;
use super::pool::ScratchGuard;
use chrono::Utc;
use parking_lot::RwLock;
use std::fmt::Write as _;
use std::panic::Location;
use std::sync::Arc;

pub struct Logger {
    handler: Arc<dyn Handler>,
    args: Args,
    enable_source: bool,
    enable_debug: bool,
}

impl Logger {
    /// Create a logger sending events to `handler`, with source capture
    /// and debug events enabled.
    pub fn new<H>(handler: H) -> Self
    where
        H: Handler + 'static,
    {
        Self {
            handler: Arc::new(handler),
            args: Args::new(),
            enable_source: true,
            enable_debug: true,
        }
    }

    /// Control whether events report the `file:line` of their call site.
    /// Capturing the source is cheap here (unlike frame walking) but the
    /// toggle is kept for parity with sinks that drop the field anyway.
    #[must_use]
    pub fn with_source(mut self, enabled: bool) -> Self {
        self.enable_source = enabled;
        self
    }

    /// Control whether `debug` calls produce events.
    #[must_use]
    pub fn with_debug(mut self, enabled: bool) -> Self {
        self.enable_debug = enabled;
        self
    }

    pub fn debug_enabled(&self) -> bool {
        self.enable_debug
    }

    /// The persistent arguments injected into every event.
    pub fn args(&self) -> &Args {
        &self.args
    }

    /// Format an event and send it to the handler.
    #[track_caller]
    pub fn log(&self, template: &str, values: &[Value]) {
        self.emit(Location::caller(), false, template, values, None);
    }

    /// Like [`log`](Self::log), with a pre-built argument list appended to
    /// the event after the parsed arguments. The extra arguments take no
    /// part in message formatting.
    #[track_caller]
    pub fn log_with(&self, template: &str, values: &[Value], extra: Args) {
        self.emit(Location::caller(), false, template, values, Some(&extra));
    }

    /// Like [`log`](Self::log), but a complete no-op (no parsing, no
    /// pool checkout, no handler call) when debug is disabled.
    #[track_caller]
    pub fn debug(&self, template: &str, values: &[Value]) {
        if self.enable_debug {
            self.emit(Location::caller(), true, template, values, None);
        }
    }

    /// Debug variant of [`log_with`](Self::log_with).
    #[track_caller]
    pub fn debug_with(&self, template: &str, values: &[Value], extra: Args) {
        if self.enable_debug {
            self.emit(Location::caller(), true, template, values, Some(&extra));
        }
    }

    /// Return a new logger sharing this handler and flags, with `args`
    /// appended to its persistent argument list. The receiver is not
    /// mutated, and extending the child never touches the parent's
    /// storage.
    #[must_use]
    pub fn with(&self, args: Args) -> Logger {
        let mut merged = Args::with_capacity(self.args.len() + args.len());
        merged.extend(self.args.iter().cloned());
        merged.extend(args);

        Logger {
            handler: Arc::clone(&self.handler),
            args: merged,
            enable_source: self.enable_source,
            enable_debug: self.enable_debug,
        }
    }

    fn emit(
        &self,
        location: &'static Location<'static>,
        debug: bool,
        template: &str,
        values: &[Value],
        extra: Option<&Args>,
    ) {
        let mut guard = ScratchGuard::acquire();
        let scratch = &mut *guard;

        if self.enable_source {
            let _ = write!(
                scratch.event.source,
                "{}:{}",
                location.file(),
                location.line()
            );
        }

        // Event args order: persistent args, parsed message args, then the
        // explicit trailing args.
        scratch.event.args.extend(self.args.iter().cloned());
        format::rewrite(template, values, &mut scratch.fmt, &mut scratch.event.args);
        if let Some(extra) = extra {
            scratch.event.args.extend(extra.iter().cloned());
        }

        format::render(&scratch.fmt, values, &mut scratch.event.message);
        scratch.event.time = Utc::now();
        scratch.event.debug = debug;

        self.handler.handle_event(&scratch.event);

        // The guard resets and repools the scratch, whether the handler
        // returned or panicked.
    }
}

static DEFAULT_LOGGER: RwLock<Option<Arc<Logger>>> = RwLock::new(None);

/// Install the process-wide default logger used by the free [`log`] and
/// [`debug`] functions. Until this is called the default route discards
/// all events.
pub fn set_default(logger: Logger) {
    *DEFAULT_LOGGER.write() = Some(Arc::new(logger));
}

/// The currently installed default logger, if any.
pub fn default_logger() -> Option<Arc<Logger>> {
    DEFAULT_LOGGER.read().clone()
}

/// Emit a log event to the default logger.
#[track_caller]
pub fn log(template: &str, values: &[Value]) {
    if let Some(logger) = default_logger() {
        logger.emit(Location::caller(), false, template, values, None);
    }
}

/// Emit a log event with trailing args to the default logger.
#[track_caller]
pub fn log_with(template: &str, values: &[Value], extra: Args) {
    if let Some(logger) = default_logger() {
        logger.emit(Location::caller(), false, template, values, Some(&extra));
    }
}

/// Emit a debug event to the default logger.
#[track_caller]
pub fn debug(template: &str, values: &[Value]) {
    if let Some(logger) = default_logger() {
        if logger.enable_debug {
            logger.emit(Location::caller(), true, template, values, None);
        }
    }
}
