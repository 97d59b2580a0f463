pub mod client;
mod server;

use client::*;
pub use server::*;

/// Messages sent from this program to the assistant bridge.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    #[serde(rename = "conversation.start")]
    ConversationStart(ConversationStartEvent),
    #[serde(rename = "conversation.stop")]
    ConversationStop(ConversationStopEvent),
}

/// Messages the assistant bridge forwards from the vendor assistant library.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    #[serde(rename = "close")]
    Close {
        reason: Option<String>,
    },
    #[serde(rename = "error")]
    Error(ErrorEvent),
    #[serde(rename = "assistant.start_finished")]
    StartFinished(StartFinishedEvent),
    #[serde(rename = "conversation.turn_started")]
    TurnStarted(TurnStartedEvent),
    #[serde(rename = "speech.recognizing_finished")]
    RecognizingSpeechFinished(RecognizingSpeechFinishedEvent),
    #[serde(rename = "speech.end_of_utterance")]
    EndOfUtterance(EndOfUtteranceEvent),
    #[serde(rename = "conversation.turn_finished")]
    TurnFinished(TurnFinishedEvent),
    #[serde(rename = "conversation.turn_timeout")]
    TurnTimeout(TurnTimeoutEvent),
    #[serde(rename = "conversation.no_response")]
    NoResponse(NoResponseEvent),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speech_event_deserializes_with_text() {
        let raw = r#"{"type":"speech.recognizing_finished","event_id":"ev_1","text":"Play Hello"}"#;
        let event: ServerEvent = serde_json::from_str(raw).unwrap();
        match event {
            ServerEvent::RecognizingSpeechFinished(data) => {
                assert_eq!(data.event_id(), Some("ev_1"));
                assert_eq!(data.text(), Some("Play Hello"));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn speech_event_without_text_is_accepted() {
        let raw = r#"{"type":"speech.recognizing_finished"}"#;
        let event: ServerEvent = serde_json::from_str(raw).unwrap();
        assert!(matches!(
            event,
            ServerEvent::RecognizingSpeechFinished(ref data) if data.text().is_none()
        ));
    }

    #[test]
    fn fatal_error_event_carries_flag() {
        let raw = r#"{"type":"error","error":{"message":"device gone","is_fatal":true}}"#;
        let event: ServerEvent = serde_json::from_str(raw).unwrap();
        match event {
            ServerEvent::Error(data) => {
                assert!(data.error().is_fatal());
                assert_eq!(data.error().message(), "device gone");
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn client_events_serialize_with_type_tag() {
        let stop = ClientEvent::ConversationStop(ConversationStopEvent::new());
        let json = serde_json::to_value(&stop).unwrap();
        assert_eq!(json["type"], "conversation.stop");

        let start =
            ClientEvent::ConversationStart(ConversationStartEvent::new().with_event_id("btn_1"));
        let json = serde_json::to_value(&start).unwrap();
        assert_eq!(json["type"], "conversation.start");
        assert_eq!(json["event_id"], "btn_1");
    }
}
