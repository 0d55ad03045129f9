//! Process-wide pool of scratch records
//!
//! Each `Logger` call checks out one scratch record holding the pooled
//! event and its formatting buffers, and returns it when done. Records
//! keep their buffer capacity between uses so steady-state logging does
//! not allocate; clearing the args on release drops the values a previous
//! call referenced, so pooled records never pin large payloads.

use super::event::{Args, Event};
use chrono::Utc;
use parking_lot::Mutex;
use std::ops::{Deref, DerefMut};

const MESSAGE_CAPACITY: usize = 512;
const FORMAT_CAPACITY: usize = 512;
const SOURCE_CAPACITY: usize = 128;
const ARGS_CAPACITY: usize = 8;

/// Upper bound on retained records; checkouts beyond this are still
/// served, the surplus is simply dropped on release.
const MAX_POOLED: usize = 64;

static POOL: Mutex<Vec<Box<Scratch>>> = Mutex::new(Vec::new());

/// Scratch state for building one event.
pub(crate) struct Scratch {
    /// The pooled event. Its message, source and args buffers are reused
    /// across calls.
    pub event: Event,

    /// Rewrite buffer for the positional format string.
    pub fmt: String,
}

impl Scratch {
    fn with_capacity() -> Box<Self> {
        Box::new(Self {
            event: Event {
                message: String::with_capacity(MESSAGE_CAPACITY),
                source: String::with_capacity(SOURCE_CAPACITY),
                time: Utc::now(),
                debug: false,
                args: Args::with_capacity(ARGS_CAPACITY),
            },
            fmt: String::with_capacity(FORMAT_CAPACITY),
        })
    }

    fn reset(&mut self) {
        self.event.message.clear();
        self.event.source.clear();
        self.event.debug = false;
        self.event.args.clear();
        self.fmt.clear();
    }
}

/// RAII checkout of a scratch record. The record is reset and returned to
/// the pool on drop, on every exit path including unwinds.
pub(crate) struct ScratchGuard {
    scratch: Option<Box<Scratch>>,
}

impl ScratchGuard {
    pub fn acquire() -> Self {
        let scratch = POOL.lock().pop().unwrap_or_else(Scratch::with_capacity);
        Self {
            scratch: Some(scratch),
        }
    }
}

impl Deref for ScratchGuard {
    type Target = Scratch;

    fn deref(&self) -> &Scratch {
        self.scratch.as_ref().expect("scratch present until drop")
    }
}

impl DerefMut for ScratchGuard {
    fn deref_mut(&mut self) -> &mut Scratch {
        self.scratch.as_mut().expect("scratch present until drop")
    }
}

impl Drop for ScratchGuard {
    fn drop(&mut self) {
        if let Some(mut scratch) = self.scratch.take() {
            scratch.reset();
            let mut pool = POOL.lock();
            if pool.len() < MAX_POOLED {
                pool.push(scratch);
            }
        }
    }
}
