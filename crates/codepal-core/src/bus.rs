use codepal_types::UiEvent;
use tokio::sync::broadcast;

use crate::{PanelId, UiSink};

/// Event published on the bus, tagged with the panel it belongs to.
#[derive(Debug, Clone)]
pub struct PanelEvent {
    pub panel: PanelId,
    pub event: UiEvent,
}

/// Broadcast bus fanning panel events out to any number of renderers.
pub struct UiBus {
    tx: broadcast::Sender<PanelEvent>,
}

impl UiBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1024);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PanelEvent> {
        self.tx.subscribe()
    }

    /// A sink bound to one panel.
    pub fn sink_for(&self, panel: PanelId) -> PanelSink {
        PanelSink {
            panel,
            tx: self.tx.clone(),
        }
    }
}

impl Default for UiBus {
    fn default() -> Self {
        Self::new()
    }
}

pub struct PanelSink {
    panel: PanelId,
    tx: broadcast::Sender<PanelEvent>,
}

impl UiSink for PanelSink {
    fn emit(&self, event: UiEvent) {
        tracing::debug!(panel = %self.panel, event = ?event_kind(&event), "publishing ui event");
        // No subscriber is not an error: the panel may be hidden.
        let _ = self.tx.send(PanelEvent {
            panel: self.panel.clone(),
            event,
        });
    }
}

fn event_kind(event: &UiEvent) -> &'static str {
    match event {
        UiEvent::Loading(_) => "loading",
        UiEvent::Response(_) => "response",
        UiEvent::Error(_) => "error",
        UiEvent::Info(_) => "info",
        UiEvent::UserMessage(_) => "userMessage",
        UiEvent::EditorContent(_) => "editorContent",
    }
}
