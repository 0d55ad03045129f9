//! Structured (newline-delimited JSON) event handler
//!
//! Each event becomes a single JSON object per line, UTF-8, with fixed
//! top-level keys in a fixed order: `level`, `time`, `info`, `data`,
//! `message`. This is a wire format consumed by log-shipping tooling, so
//! the key names and nesting are stable.
//!
//! Error-typed argument values are elevated: they force the level to
//! `ERROR`, are excluded from `data`, and appear under `info.errors` as
//! `{type, error, errno, stack}` entries.

use crate::core::{Args, Error, Event, Handler, Result, Value};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::ser::{SerializeMap, SerializeSeq, Serializer};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Handler which encodes events as newline-delimited JSON and writes them
/// to its output.
///
/// Safe to share between threads: writes are serialized by an internal
/// mutex which also guards the reusable encode buffer, so steady-state
/// encoding does not allocate.
pub struct StructuredHandler<W> {
    program: String,
    pid: u32,
    state: Mutex<EncoderState<W>>,
}

struct EncoderState<W> {
    output: W,
    buf: Vec<u8>,
}

impl<W: Write> StructuredHandler<W> {
    /// Create a handler writing to `output`. The reported pid defaults to
    /// the current process; the program name is empty until set.
    pub fn new(output: W) -> Self {
        Self {
            program: String::new(),
            pid: std::process::id(),
            state: Mutex::new(EncoderState {
                output,
                buf: Vec::with_capacity(4096),
            }),
        }
    }

    /// Set the program name reported under `info.program`.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Override the pid reported under `info.pid`. Zero suppresses the
    /// field.
    #[must_use]
    pub fn with_pid(mut self, pid: u32) -> Self {
        self.pid = pid;
        self
    }
}

impl StructuredHandler<BufWriter<File>> {
    /// Create a handler appending to the file at `path`.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write + Send> Handler for StructuredHandler<W> {
    fn handle_event(&self, event: &Event) {
        let mut state = self.state.lock();
        let state = &mut *state;

        state.buf.clear();
        let encoded = EncodedEvent {
            level: level_for(event),
            program: &self.program,
            pid: self.pid,
            event,
        };
        if let Err(err) = serde_json::to_writer(&mut state.buf, &encoded) {
            // Encoding into a Vec cannot fail for well-formed values;
            // surfacing beats silently losing the event.
            panic!("structured event encoding failed: {}", Error::Json(err));
        }
        state.buf.push(b'\n');

        let _ = state.output.write_all(&state.buf);
    }
}

/// Severity for the encoded event: any error-typed arg forces `ERROR`,
/// then the debug flag selects `DEBUG`, otherwise `INFO`.
fn level_for(event: &Event) -> &'static str {
    if event.args.has_errors() {
        "ERROR"
    } else if event.debug {
        "DEBUG"
    } else {
        "INFO"
    }
}

// Serialization views borrowing from the event, so encoding goes straight
// from the event to the byte buffer with no intermediate tree.

struct EncodedEvent<'a> {
    level: &'static str,
    program: &'a str,
    pid: u32,
    event: &'a Event,
}

impl Serialize for EncodedEvent<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(5))?;
        map.serialize_entry("level", self.level)?;
        map.serialize_entry("time", &Iso8601Millis(self.event.time))?;
        map.serialize_entry(
            "info",
            &EncodedInfo {
                program: self.program,
                source: &self.event.source,
                pid: self.pid,
                args: &self.event.args,
            },
        )?;
        map.serialize_entry("data", &EncodedData(&self.event.args))?;
        map.serialize_entry("message", &self.event.message)?;
        map.end()
    }
}

struct Iso8601Millis(DateTime<Utc>);

impl Serialize for Iso8601Millis {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0.format("%Y-%m-%dT%H:%M:%S%.3fZ"))
    }
}

struct EncodedInfo<'a> {
    program: &'a str,
    source: &'a str,
    pid: u32,
    args: &'a Args,
}

impl Serialize for EncodedInfo<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if !self.program.is_empty() {
            map.serialize_entry("program", self.program)?;
        }
        if !self.source.is_empty() {
            map.serialize_entry("source", self.source)?;
        }
        if self.pid != 0 {
            map.serialize_entry("pid", &self.pid)?;
        }
        if self.args.has_errors() {
            map.serialize_entry("errors", &EncodedErrors(self.args))?;
        }
        map.end()
    }
}

struct EncodedErrors<'a>(&'a Args);

impl Serialize for EncodedErrors<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(None)?;
        for arg in self.0.iter() {
            if let Value::Error(err) = &arg.value {
                seq.serialize_element(err)?;
            }
        }
        seq.end()
    }
}

/// Non-error args as a flat object in argument order. Duplicate names are
/// written as-is; deduplication is left to the consumer's object model.
struct EncodedData<'a>(&'a Args);

impl Serialize for EncodedData<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for arg in self.0.iter() {
            if !arg.value.is_error() {
                map.serialize_entry(&arg.name, &arg.value)?;
            }
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Arg, CapturedError, Frame, Logger};
    use std::sync::Arc;

    /// Writer that appends into a shared buffer, for inspecting output.
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

    fn encode(event: &Event, handler: &StructuredHandler<SharedBuf>, buf: &SharedBuf) -> serde_json::Value {
        handler.handle_event(event);
        let contents = buf.contents();
        let line = contents.lines().last().unwrap();
        serde_json::from_str(line).unwrap()
    }

    #[test]
    fn test_basic_event_shape() {
        let buf = SharedBuf::default();
        let handler = StructuredHandler::new(buf.clone())
            .with_program("testapp")
            .with_pid(1234);

        let mut event = Event::new("Hello Luke!", Args::from(vec![Arg::new("name", "Luke")]));
        event.source = "src/lib.rs:10".to_string();

        let json = encode(&event, &handler, &buf);
        assert_eq!(json["level"], "INFO");
        assert_eq!(json["message"], "Hello Luke!");
        assert_eq!(json["info"]["program"], "testapp");
        assert_eq!(json["info"]["source"], "src/lib.rs:10");
        assert_eq!(json["info"]["pid"], 1234);
        assert_eq!(json["data"]["name"], "Luke");
        assert!(json["info"].get("errors").is_none());

        // Time is ISO-8601 with millisecond precision, UTC.
        let time = json["time"].as_str().unwrap();
        assert!(time.ends_with('Z'));
        assert_eq!(time.len(), "2026-01-02T15:04:05.000Z".len());
    }

    #[test]
    fn test_top_level_key_order_is_stable() {
        let buf = SharedBuf::default();
        let handler = StructuredHandler::new(buf.clone());

        handler.handle_event(&Event::new("ordered", Args::new()));

        let line = buf.contents();
        let positions: Vec<usize> = ["\"level\"", "\"time\"", "\"info\"", "\"data\"", "\"message\""]
            .iter()
            .map(|key| line.find(key).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{line}");
    }

    #[test]
    fn test_debug_level() {
        let buf = SharedBuf::default();
        let handler = StructuredHandler::new(buf.clone());

        let event = Event::new("dbg", Args::new()).with_debug(true);
        let json = encode(&event, &handler, &buf);
        assert_eq!(json["level"], "DEBUG");
    }

    #[test]
    fn test_error_elevation() {
        let buf = SharedBuf::default();
        let handler = StructuredHandler::new(buf.clone());

        let io = std::io::Error::from_raw_os_error(111);
        let event = Event::new(
            "dial failed",
            Args::from(vec![
                Arg::new("host", "example.com"),
                Arg::new("error", Value::error(&io)),
            ]),
        );

        let json = encode(&event, &handler, &buf);
        assert_eq!(json["level"], "ERROR");
        assert_eq!(json["info"]["errors"][0]["error"], io.to_string());
        assert_eq!(json["info"]["errors"][0]["errno"], 111);
        assert!(json["info"]["errors"][0]["type"]
            .as_str()
            .unwrap()
            .contains("io::Error"));
        assert!(json["info"]["errors"][0].get("stack").is_none());

        // The error arg must not also appear in data.
        assert!(json["data"].get("error").is_none());
        assert_eq!(json["data"]["host"], "example.com");
    }

    #[test]
    fn test_error_stack_frames() {
        let buf = SharedBuf::default();
        let handler = StructuredHandler::new(buf.clone());

        let io = std::io::Error::other("boom");
        let captured = CapturedError::capture(&io)
            .with_stack(vec![Frame::new("src/main.rs", 42, "main")]);
        let event = Event::new("crash", Args::from(vec![Arg::new("err", captured)]));

        let json = encode(&event, &handler, &buf);
        assert_eq!(json["info"]["errors"][0]["stack"][0], "src/main.rs:42:main");
    }

    #[test]
    fn test_data_preserves_order_and_duplicates() {
        let buf = SharedBuf::default();
        let handler = StructuredHandler::new(buf.clone());

        handler.handle_event(&Event::new(
            "dup",
            Args::from(vec![
                Arg::new("z", 1),
                Arg::new("a", 2),
                Arg::new("z", 3),
            ]),
        ));

        let line = buf.contents();
        let data_start = line.find("\"data\"").unwrap();
        let data = &line[data_start..];
        assert!(data.find("\"z\":1").unwrap() < data.find("\"a\":2").unwrap());
        assert!(data.find("\"a\":2").unwrap() < data.find("\"z\":3").unwrap());
    }

    #[test]
    fn test_one_line_per_event() {
        let buf = SharedBuf::default();
        let handler = StructuredHandler::new(buf.clone());

        for i in 0..3 {
            handler.handle_event(&Event::new(
                format!("event {i}"),
                Args::new(),
            ));
        }

        let contents = buf.contents();
        assert_eq!(contents.lines().count(), 3);
        for line in contents.lines() {
            let parsed: serde_json::Value = serde_json::from_str(line).unwrap();
            assert!(parsed["message"].is_string());
        }
    }

    #[test]
    fn test_end_to_end_through_logger() {
        let buf = SharedBuf::default();
        let logger = Logger::new(StructuredHandler::new(buf.clone()));

        logger.log("Hello %{name}s!", &[Value::from("Luke")]);

        let contents = buf.contents();
        let json: serde_json::Value = serde_json::from_str(contents.lines().last().unwrap()).unwrap();
        assert_eq!(json["message"], "Hello Luke!");
        assert_eq!(json["data"]["name"], "Luke");
        assert!(json["info"]["source"].as_str().unwrap().contains("structured.rs"));
    }

    #[test]
    fn test_create_appends_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");

        {
            let handler = StructuredHandler::create(&path).unwrap();
            handler.handle_event(&Event::new("persisted", Args::new()));
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("persisted"));
    }
}
