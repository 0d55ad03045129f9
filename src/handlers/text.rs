//! Human-readable text event handler
//!
//! Renders `[prefix][time][ - source][ - message]` lines, optionally
//! followed by an indented `key: value` block for the event's arguments
//! and a trailing `errors:` section. Not intended for machine parsing.

use crate::core::{Event, Handler, Result, Value};
use chrono::Local;
use parking_lot::Mutex;
use std::fmt::Write as _;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Default time format: local wall clock with millisecond precision.
pub const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Time zone the event time is rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Timezone {
    #[default]
    Local,
    Utc,
}

/// Handler which formats events in a human-readable format and writes
/// them to its output.
///
/// Safe to share between threads; writes are serialized by an internal
/// mutex guarding the output and a reusable line buffer.
pub struct TextHandler<W> {
    prefix: String,
    time_format: String,
    timezone: Timezone,
    show_args: bool,
    state: Mutex<TextState<W>>,
}

struct TextState<W> {
    output: W,
    buf: String,
}

impl<W: Write> TextHandler<W> {
    /// Create a handler writing to `output` with a prefix on each line.
    pub fn new(prefix: impl Into<String>, output: W) -> Self {
        Self {
            prefix: prefix.into(),
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            timezone: Timezone::Local,
            show_args: false,
            state: Mutex::new(TextState {
                output,
                buf: String::with_capacity(4096),
            }),
        }
    }

    /// Set the chrono format used for the event time. An empty format
    /// suppresses the time column entirely.
    #[must_use]
    pub fn with_time_format(mut self, format: impl Into<String>) -> Self {
        self.time_format = format.into();
        self
    }

    #[must_use]
    pub fn with_timezone(mut self, timezone: Timezone) -> Self {
        self.timezone = timezone;
        self
    }

    /// Output one indented detail line per argument, plus the errors
    /// section.
    #[must_use]
    pub fn with_args(mut self, enabled: bool) -> Self {
        self.show_args = enabled;
        self
    }
}

impl TextHandler<BufWriter<File>> {
    /// Create a handler appending to the file at `path`.
    pub fn create<P: AsRef<Path>>(prefix: impl Into<String>, path: P) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::new(prefix, BufWriter::new(file)))
    }
}

impl<W: Write + Send> Handler for TextHandler<W> {
    fn handle_event(&self, event: &Event) {
        let mut state = self.state.lock();
        let state = &mut *state;

        state.buf.clear();
        state.buf.push_str(&self.prefix);

        if !self.time_format.is_empty() {
            let _ = match self.timezone {
                Timezone::Local => write!(
                    state.buf,
                    "{}",
                    event.time.with_timezone(&Local).format(&self.time_format)
                ),
                Timezone::Utc => write!(state.buf, "{}", event.time.format(&self.time_format)),
            };
            state.buf.push_str(" - ");
        }

        if !event.source.is_empty() {
            state.buf.push_str(&event.source);
            state.buf.push_str(" - ");
        }

        state.buf.push_str(&event.message);
        state.buf.push('\n');

        if self.show_args {
            let mut has_errors = false;

            for arg in event.args.iter() {
                if arg.value.is_error() {
                    has_errors = true;
                } else {
                    let _ = writeln!(state.buf, "\t{}: {}", arg.name, arg.value);
                }
            }

            if has_errors {
                state.buf.push_str("\terrors:\n");

                for arg in event.args.iter() {
                    if let Value::Error(err) = &arg.value {
                        let _ = write!(state.buf, "\t\t- {}", err.message);
                        if let Some(errno) = err.errno {
                            let _ = write!(state.buf, " [errno {}]", errno);
                        }
                        state.buf.push('\n');
                        for frame in &err.stack {
                            let _ = writeln!(state.buf, "\t\t  {}", frame);
                        }
                    }
                }
            }
        }

        let _ = state.output.write_all(state.buf.as_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Arg, Args, CapturedError, Frame};
    use chrono::{TimeZone as _, Utc};
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().clone()).unwrap()
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn fixed_event() -> Event {
        let mut event = Event::new("Hello Luke!", Args::new());
        event.time = Utc.with_ymd_and_hms(2026, 1, 2, 15, 4, 5).unwrap();
        event
    }

    #[test]
    fn test_line_layout() {
        let buf = SharedBuf::default();
        let handler = TextHandler::new("app: ", buf.clone()).with_timezone(Timezone::Utc);

        let mut event = fixed_event();
        event.source = "src/lib.rs:10".to_string();
        handler.handle_event(&event);

        assert_eq!(
            buf.contents(),
            "app: 2026-01-02 15:04:05.000 - src/lib.rs:10 - Hello Luke!\n"
        );
    }

    #[test]
    fn test_empty_time_format_suppresses_time() {
        let buf = SharedBuf::default();
        let handler = TextHandler::new("", buf.clone()).with_time_format("");

        handler.handle_event(&fixed_event());

        assert_eq!(buf.contents(), "Hello Luke!\n");
    }

    #[test]
    fn test_args_block() {
        let buf = SharedBuf::default();
        let handler = TextHandler::new("", buf.clone())
            .with_time_format("")
            .with_args(true);

        let mut event = fixed_event();
        event.args = Args::from(vec![Arg::new("name", "Luke"), Arg::new("answer", 42)]);
        handler.handle_event(&event);

        assert_eq!(
            buf.contents(),
            "Hello Luke!\n\tname: Luke\n\tanswer: 42\n"
        );
    }

    #[test]
    fn test_errors_section() {
        let buf = SharedBuf::default();
        let handler = TextHandler::new("", buf.clone())
            .with_time_format("")
            .with_args(true);

        let io = std::io::Error::other("boom");
        let captured = CapturedError::capture(&io)
            .with_stack(vec![Frame::new("src/main.rs", 42, "main")]);

        let mut event = fixed_event();
        event.args = Args::from(vec![
            Arg::new("host", "example.com"),
            Arg::new("err", captured),
        ]);
        handler.handle_event(&event);

        assert_eq!(
            buf.contents(),
            "Hello Luke!\n\thost: example.com\n\terrors:\n\t\t- boom\n\t\t  src/main.rs:42:main\n"
        );
    }

    #[test]
    fn test_args_block_disabled_by_default() {
        let buf = SharedBuf::default();
        let handler = TextHandler::new("", buf.clone()).with_time_format("");

        let mut event = fixed_event();
        event.args = Args::from(vec![Arg::new("name", "Luke")]);
        handler.handle_event(&event);

        assert_eq!(buf.contents(), "Hello Luke!\n");
    }
}
