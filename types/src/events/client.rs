/// `conversation.start` event
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ConversationStartEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    event_id: Option<String>,
}

impl ConversationStartEvent {
    pub fn new() -> Self {
        Self { event_id: None }
    }

    pub fn with_event_id(mut self, event_id: &str) -> Self {
        self.event_id = Some(event_id.to_string());
        self
    }

    pub fn event_id(&self) -> Option<&str> {
        self.event_id.as_deref()
    }
}

/// `conversation.stop` event
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ConversationStopEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    event_id: Option<String>,
}

impl ConversationStopEvent {
    pub fn new() -> Self {
        Self { event_id: None }
    }

    pub fn with_event_id(mut self, event_id: &str) -> Self {
        self.event_id = Some(event_id.to_string());
        self
    }

    pub fn event_id(&self) -> Option<&str> {
        self.event_id.as_deref()
    }
}
