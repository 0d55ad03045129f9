//! Recording handler for tests
//!
//! Clones every event it receives so assertions can run after the logger
//! call returns. Assertions compare only the message, args and debug
//! flag; source and time are non-deterministic across runs and are
//! deliberately ignored.

use crate::core::{Event, Handler};
use parking_lot::Mutex;

/// Handler that records events for later inspection.
#[derive(Debug, Default)]
pub struct RecordingHandler {
    events: Mutex<Vec<Event>>,
}

impl RecordingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events recorded so far.
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }

    /// Assert that exactly `expected` events were recorded, in order,
    /// comparing message, args and debug flag only.
    ///
    /// # Panics
    ///
    /// Panics with a descriptive message on any mismatch.
    pub fn assert_events(&self, expected: &[Event]) {
        let recorded = self.events.lock();

        assert_eq!(
            recorded.len(),
            expected.len(),
            "expected {} events but got {}: {:?}",
            expected.len(),
            recorded.len(),
            *recorded
        );

        for (i, (got, want)) in recorded.iter().zip(expected).enumerate() {
            assert_eq!(got.message, want.message, "message mismatch at event {i}");
            assert_eq!(got.args, want.args, "args mismatch at event {i}");
            assert_eq!(got.debug, want.debug, "debug flag mismatch at event {i}");
        }
    }
}

impl Handler for RecordingHandler {
    fn handle_event(&self, event: &Event) {
        self.events.lock().push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Arg, Args};

    #[test]
    fn test_records_independent_copies() {
        let handler = RecordingHandler::new();

        let event = Event::new("kept", Args::from(vec![Arg::new("k", "v")]));
        handler.handle_event(&event);
        drop(event);

        let events = handler.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].message, "kept");
    }

    #[test]
    fn test_assert_ignores_source_and_time() {
        let handler = RecordingHandler::new();

        let mut event = Event::new("msg", Args::new());
        event.source = "somewhere.rs:1".to_string();
        handler.handle_event(&event);

        // Expected event has no source and a different time.
        handler.assert_events(&[Event::new("msg", Args::new())]);
    }

    #[test]
    #[should_panic(expected = "message mismatch")]
    fn test_assert_catches_message_mismatch() {
        let handler = RecordingHandler::new();
        handler.handle_event(&Event::new("actual", Args::new()));
        handler.assert_events(&[Event::new("expected", Args::new())]);
    }

    #[test]
    fn test_clear() {
        let handler = RecordingHandler::new();
        handler.handle_event(&Event::new("one", Args::new()));
        handler.clear();
        assert!(handler.is_empty());
    }
}
