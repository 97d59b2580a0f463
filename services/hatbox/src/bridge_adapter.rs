use anyhow::{Context, Result};
use async_trait::async_trait;
use hatbox_core::events::{EventKind, RecognizedEvent};
use hatbox_core::recognizer::Recognizer;
use hatbox_link::ConversationControl;
use hatbox_link::types::ServerEvent;
use std::sync::Arc;

/// An adapter that implements the core `Recognizer` trait over a bridge
/// connection. Generic over `ConversationControl` so tests can mock the client.
pub struct BridgeRecognizer<C: ConversationControl> {
    client: Arc<C>,
}

impl<C: ConversationControl> BridgeRecognizer<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<C: ConversationControl> Recognizer for BridgeRecognizer<C> {
    async fn start_conversation(&self) -> Result<()> {
        self.client
            .start_conversation()
            .await
            .context("Failed to ask the bridge for a new turn")
    }

    async fn stop_conversation(&self) -> Result<()> {
        self.client
            .stop_conversation()
            .await
            .context("Failed to ask the bridge to end the turn")
    }
}

/// Translates a bridge event into the dispatcher's event type. `Close` has no
/// counterpart; the event loop handles it.
pub fn to_recognized(event: &ServerEvent) -> Option<RecognizedEvent> {
    let recognized = match event {
        ServerEvent::Close { .. } => return None,
        ServerEvent::Error(data) => RecognizedEvent::assistant_error(data.error().is_fatal()),
        ServerEvent::StartFinished(_) => RecognizedEvent::new(EventKind::StartFinished),
        ServerEvent::TurnStarted(_) => RecognizedEvent::new(EventKind::TurnStarted),
        ServerEvent::RecognizingSpeechFinished(data) => RecognizedEvent {
            kind: EventKind::SpeechFinished,
            text: data.text().map(str::to_string),
            is_fatal: None,
        },
        ServerEvent::EndOfUtterance(_) => RecognizedEvent::new(EventKind::EndOfUtterance),
        ServerEvent::TurnFinished(_) => RecognizedEvent::new(EventKind::TurnFinished),
        ServerEvent::TurnTimeout(_) => RecognizedEvent::new(EventKind::TurnTimeout),
        ServerEvent::NoResponse(_) => RecognizedEvent::new(EventKind::NoResponse),
    };
    Some(recognized)
}
