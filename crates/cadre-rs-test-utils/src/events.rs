//! Event sink fakes.

use cadre_rs_protocol::{EventMsg, EventSink};
use parking_lot::Mutex;

/// Event sink that captures every emitted event for inspection.
#[derive(Default)]
pub struct CapturingSink {
    events: Mutex<Vec<EventMsg>>,
}

impl CapturingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events captured so far, in emission order.
    pub fn events(&self) -> Vec<EventMsg> {
        self.events.lock().clone()
    }
}

impl EventSink for CapturingSink {
    fn emit(&self, event: EventMsg) {
        self.events.lock().push(event);
    }
}
