/// The kinds of events the speech assistant reports, in the order they
/// usually arrive during a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    StartFinished,
    TurnStarted,
    SpeechFinished,
    EndOfUtterance,
    TurnFinished,
    TurnTimeout,
    NoResponse,
    AssistantError,
}

/// One event from the recognizer, consumed exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognizedEvent {
    pub kind: EventKind,
    pub text: Option<String>,
    pub is_fatal: Option<bool>,
}

impl RecognizedEvent {
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            text: None,
            is_fatal: None,
        }
    }

    pub fn speech(text: impl Into<String>) -> Self {
        Self {
            kind: EventKind::SpeechFinished,
            text: Some(text.into()),
            is_fatal: None,
        }
    }

    pub fn assistant_error(is_fatal: bool) -> Self {
        Self {
            kind: EventKind::AssistantError,
            text: None,
            is_fatal: Some(is_fatal),
        }
    }
}
