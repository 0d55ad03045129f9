//! Event, argument and value types
//!
//! This module provides the vocabulary every other part of the crate is
//! built on:
//! - `Value`: a polymorphic argument value
//! - `Arg` / `Args`: a named value and an ordered list of them
//! - `CapturedError` / `Frame`: an error chain captured for encoding
//! - `Event`: one structured log record

use chrono::{DateTime, Utc};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Value type for event arguments.
///
/// Conversions from the usual primitives are provided through `From`, so
/// call sites can rely on `impl Into<Value>` bounds. Error values carry a
/// [`CapturedError`] and receive special treatment from the encoders: they
/// are elevated into the `errors` section and force the event severity to
/// `ERROR`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Object(Vec<(String, Value)>),
    Error(CapturedError),
}

impl Value {
    /// Capture an error value from any `std::error::Error`.
    pub fn error<E>(err: &E) -> Self
    where
        E: std::error::Error + 'static,
    {
        Value::Error(CapturedError::capture(err))
    }

    /// Sentinel substituted when a template verb has no matching argument.
    pub fn missing() -> Self {
        Value::String("MISSING".to_string())
    }

    /// Whether this value is error-typed.
    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Uint(u) => write!(f, "{}", u),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::String(s) => write!(f, "{}", s),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i != 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Object(pairs) => {
                write!(f, "{{")?;
                for (i, (key, value)) in pairs.iter().enumerate() {
                    if i != 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, "}}")
            }
            Value::Error(err) => write!(f, "{}", err.message),
        }
    }
}

// Hand-written rather than `#[serde(untagged)]` so objects keep their
// insertion order and error values collapse to their message.
impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Uint(u) => serializer.serialize_u64(*u),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::List(items) => serializer.collect_seq(items),
            Value::Object(pairs) => {
                let mut map = serializer.serialize_map(Some(pairs.len()))?;
                for (key, value) in pairs {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            Value::Error(err) => serializer.serialize_str(&err.message),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<u64> for Value {
    fn from(u: u64) -> Self {
        Value::Uint(u)
    }
}

impl From<u32> for Value {
    fn from(u: u32) -> Self {
        Value::Uint(u as u64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<CapturedError> for Value {
    fn from(err: CapturedError) -> Self {
        Value::Error(err)
    }
}

/// An error chain captured eagerly so the event can outlive the error.
///
/// The structured encoder emits this as `{type, error, errno, stack}`;
/// `errno` and `stack` are omitted when absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapturedError {
    /// Concrete type name of the captured error.
    #[serde(rename = "type")]
    pub type_name: String,

    /// Full display message of the outermost error.
    #[serde(rename = "error")]
    pub message: String,

    /// POSIX error number, when the root cause is an OS-level IO error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errno: Option<i32>,

    /// Stack frames attached to the error, if any.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stack: Vec<Frame>,
}

impl CapturedError {
    /// Capture `err` together with its root cause.
    ///
    /// The source chain is walked to the root; if the root is an IO error
    /// carrying an OS error code, that code is recorded as `errno`.
    pub fn capture<E>(err: &E) -> Self
    where
        E: std::error::Error + 'static,
    {
        let mut root: &(dyn std::error::Error + 'static) = err;
        while let Some(source) = root.source() {
            root = source;
        }

        let errno = root
            .downcast_ref::<std::io::Error>()
            .and_then(std::io::Error::raw_os_error);

        Self {
            type_name: std::any::type_name::<E>().to_string(),
            message: err.to_string(),
            errno,
            stack: Vec::new(),
        }
    }

    /// Attach stack frames to the captured error.
    #[must_use]
    pub fn with_stack(mut self, stack: Vec<Frame>) -> Self {
        self.stack = stack;
        self
    }
}

/// One stack frame, rendered and encoded as `file:line:function`.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub file: String,
    pub line: u32,
    pub function: String,
}

impl Frame {
    pub fn new(file: impl Into<String>, line: u32, function: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line,
            function: function.into(),
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.function)
    }
}

impl Serialize for Frame {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// A named value attached to an event. An empty name marks a positional
/// argument that had no name clause in the template.
#[derive(Debug, Clone, PartialEq)]
pub struct Arg {
    pub name: String,
    pub value: Value,
}

impl Arg {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// An ordered list of arguments.
///
/// Order is significant: it reflects logger-level persistent args, then
/// args parsed out of the message template, then any trailing explicit
/// args, in that order. Converting through a map loses the order but not
/// the membership.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args(Vec<Arg>);

impl Args {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    pub fn push(&mut self, arg: Arg) {
        self.0.push(arg);
    }

    /// Look up the first argument with the given name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.iter().find(|a| a.name == name).map(|a| &a.value)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Arg> {
        self.0.iter()
    }

    /// Drop all arguments. Used by the pool to release values a previous
    /// call referenced before the record is reused.
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Whether any argument carries an error value.
    pub fn has_errors(&self) -> bool {
        self.0.iter().any(|a| a.value.is_error())
    }

    /// Convert to a name -> value map. Duplicate names resolve
    /// last-write-wins; ordering is not preserved.
    pub fn to_map(&self) -> HashMap<String, Value> {
        self.0
            .iter()
            .map(|a| (a.name.clone(), a.value.clone()))
            .collect()
    }

    /// Build an argument list from a map. The resulting order is
    /// unspecified.
    pub fn from_map(map: HashMap<String, Value>) -> Self {
        Self(map.into_iter().map(|(name, value)| Arg { name, value }).collect())
    }
}

impl From<Vec<Arg>> for Args {
    fn from(args: Vec<Arg>) -> Self {
        Self(args)
    }
}

impl FromIterator<Arg> for Args {
    fn from_iter<I: IntoIterator<Item = Arg>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<Arg> for Args {
    fn extend<I: IntoIterator<Item = Arg>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl IntoIterator for Args {
    type Item = Arg;
    type IntoIter = std::vec::IntoIter<Arg>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Args {
    type Item = &'a Arg;
    type IntoIter = std::slice::Iter<'a, Arg>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// One structured log record.
///
/// Events handed to a handler are only valid for the duration of the
/// `handle_event` call: the logger reuses their backing buffers for the
/// next event. `Clone` produces a fully independent copy and is the one
/// way to retain an event past that call.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Formatted message.
    pub message: String,

    /// `file:line` of the call site, empty when source capture is off.
    pub source: String,

    /// Time the event was produced.
    pub time: DateTime<Utc>,

    /// Whether the event was produced by a debug call.
    pub debug: bool,

    /// Arguments attached to the event.
    pub args: Args,
}

impl Event {
    /// Create an event with the given message and arguments. Source is
    /// empty, time is now and the debug flag is unset; this is mostly
    /// useful for building expected events in tests.
    pub fn new(message: impl Into<String>, args: Args) -> Self {
        Self {
            message: message.into(),
            source: String::new(),
            time: Utc::now(),
            debug: false,
            args,
        }
    }

    /// Set the debug flag.
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}
