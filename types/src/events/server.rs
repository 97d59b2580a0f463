mod error;

pub use error::ErrorDetails;

/// `error` event
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ErrorEvent {
    #[serde(default)]
    event_id: Option<String>,

    /// Details about the error
    error: ErrorDetails,
}

impl ErrorEvent {
    pub fn new(error: ErrorDetails) -> Self {
        Self {
            event_id: None,
            error,
        }
    }

    pub fn event_id(&self) -> Option<&str> {
        self.event_id.as_deref()
    }

    pub fn error(&self) -> &ErrorDetails {
        &self.error
    }
}

/// `speech.recognizing_finished` event
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RecognizingSpeechFinishedEvent {
    #[serde(default)]
    event_id: Option<String>,

    /// The transcript, absent when the recognizer heard nothing usable
    #[serde(default)]
    text: Option<String>,
}

impl RecognizingSpeechFinishedEvent {
    pub fn new(text: &str) -> Self {
        Self {
            event_id: None,
            text: Some(text.to_string()),
        }
    }

    pub fn event_id(&self) -> Option<&str> {
        self.event_id.as_deref()
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

/// Declares a server event that carries nothing but its optional id.
macro_rules! bare_event {
    ($(#[$doc:meta] $name:ident),* $(,)?) => {
        $(
            #[$doc]
            #[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
            pub struct $name {
                #[serde(default)]
                event_id: Option<String>,
            }

            impl $name {
                pub fn new() -> Self {
                    Self { event_id: None }
                }

                pub fn event_id(&self) -> Option<&str> {
                    self.event_id.as_deref()
                }
            }
        )*
    };
}

bare_event!(
    /// `assistant.start_finished` event
    StartFinishedEvent,
    /// `conversation.turn_started` event
    TurnStartedEvent,
    /// `speech.end_of_utterance` event
    EndOfUtteranceEvent,
    /// `conversation.turn_finished` event
    TurnFinishedEvent,
    /// `conversation.turn_timeout` event
    TurnTimeoutEvent,
    /// `conversation.no_response` event
    NoResponseEvent,
);
