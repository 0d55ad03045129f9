//! # evlog
//!
//! Structured event logging with named format arguments, pluggable
//! handlers and pooled, low-allocation event construction.
//!
//! A log call takes a printf-like template whose verbs may name their
//! arguments (`%{name}s`); the logger turns it into a structured
//! [`Event`] carrying the formatted message, the call site, a timestamp
//! and the ordered named arguments, then hands it to a [`Handler`].
//! Handlers encode events as newline-delimited JSON
//! ([`StructuredHandler`]), human-readable text ([`TextHandler`]), fan
//! out to other handlers ([`MultiHandler`]) or record them for test
//! assertions ([`RecordingHandler`]).
//!
//! ## Example
//!
//! ```
//! use evlog::{log, Logger, StructuredHandler};
//!
//! let logger = Logger::new(StructuredHandler::new(std::io::stdout()));
//! log!(logger, "Hello %{name}s!", "Luke"; "from" => "Han");
//! ```
//!
//! Events handed to a handler alias pooled scratch memory and are only
//! valid for the duration of the `handle_event` call; handlers clone
//! what they keep. The hot path performs no heap allocation once the
//! pool is warm.

pub mod core;
pub mod handlers;
pub mod macros;

pub mod prelude {
    pub use crate::core::{
        Arg, Args, CapturedError, Discard, Error, Event, Frame, Handler, HandlerFn, Logger,
        MultiHandler, Result, Value,
    };
    pub use crate::handlers::{RecordingHandler, StructuredHandler, TextHandler, Timezone};
}

pub use crate::core::{
    debug as debug_default, default_logger, log as log_default, log_with as log_with_default,
    set_default, Arg, Args, CapturedError, Discard, Error, Event, Frame, Handler, HandlerFn,
    Logger, MultiHandler, Result, Value,
};
pub use crate::handlers::{
    RecordingHandler, StructuredHandler, TextHandler, Timezone, DEFAULT_TIME_FORMAT,
};
