//! Logging macros for ergonomic event formatting.
//!
//! These macros convert heterogeneous arguments through `Value::from` and
//! build trailing argument lists, so call sites read like `println!`:
//!
//! ```
//! use evlog::{log, Logger, RecordingHandler};
//! use std::sync::Arc;
//!
//! let recorder = Arc::new(RecordingHandler::new());
//! let logger = Logger::new(Arc::clone(&recorder));
//!
//! log!(logger, "Hello %{name}s!", "Luke");
//! log!(logger, "Hello %{name}s!", "Luke"; "from" => "Han");
//! ```

/// Build an [`Args`](crate::Args) list from `name => value` pairs.
///
/// # Examples
///
/// ```
/// use evlog::args;
///
/// let args = args! { "from" => "Han", "attempt" => 2 };
/// assert_eq!(args.len(), 2);
/// ```
#[macro_export]
macro_rules! args {
    () => {
        $crate::Args::new()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {
        $crate::Args::from(vec![$($crate::Arg::new($name, $value)),+])
    };
}

/// Log an event through a logger.
///
/// Arguments after the template are format values; an optional block
/// after `;` appends pre-built `name => value` args to the event without
/// taking part in message formatting.
///
/// # Examples
///
/// ```
/// # use evlog::{Logger, Discard};
/// # let logger = Logger::new(Discard);
/// use evlog::log;
/// log!(logger, "listening on port %{port}d", 8080);
/// log!(logger, "request done"; "status" => 200, "path" => "/healthz");
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $template:expr $(, $value:expr)* ; $($name:expr => $extra:expr),+ $(,)?) => {
        $logger.log_with(
            $template,
            &[$($crate::Value::from($value)),*],
            $crate::args!($($name => $extra),+),
        )
    };
    ($logger:expr, $template:expr $(, $value:expr)* $(,)?) => {
        $logger.log($template, &[$($crate::Value::from($value)),*])
    };
}

/// Log a debug event through a logger; a no-op when the logger has debug
/// disabled.
///
/// # Examples
///
/// ```
/// # use evlog::{Logger, Discard};
/// # let logger = Logger::new(Discard);
/// use evlog::debug;
/// debug!(logger, "cache miss for %{key}s", "user:42");
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr, $template:expr $(, $value:expr)* ; $($name:expr => $extra:expr),+ $(,)?) => {
        $logger.debug_with(
            $template,
            &[$($crate::Value::from($value)),*],
            $crate::args!($($name => $extra),+),
        )
    };
    ($logger:expr, $template:expr $(, $value:expr)* $(,)?) => {
        $logger.debug($template, &[$($crate::Value::from($value)),*])
    };
}
