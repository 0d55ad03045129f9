//! Core event logging types and traits

pub mod error;
pub mod event;
pub mod format;
pub mod handler;
pub mod logger;
pub(crate) mod pool;

pub use error::{Error, Result};
pub use event::{Arg, Args, CapturedError, Event, Frame, Value};
pub use handler::{Discard, Handler, HandlerFn, MultiHandler};
pub use logger::{debug, default_logger, log, log_with, set_default, Logger};
