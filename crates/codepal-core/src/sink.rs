use codepal_types::UiEvent;
use parking_lot::Mutex;

/// Outbound channel towards whatever renders the conversation.
pub trait UiSink: Send + Sync {
    fn emit(&self, event: UiEvent);
}

/// Keeps every emitted event in order. Handy for hosts that poll and for tests.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<UiEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<UiEvent> {
        self.events.lock().clone()
    }

    pub fn take(&self) -> Vec<UiEvent> {
        std::mem::take(&mut *self.events.lock())
    }
}

impl UiSink for RecordingSink {
    fn emit(&self, event: UiEvent) {
        self.events.lock().push(event);
    }
}
