#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Stats {
    events_received: u64,
    turns_started: u64,
    speech_recognized: u64,
}

impl Stats {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, event: &crate::types::ServerEvent) {
        self.events_received += 1;
        match event {
            crate::types::ServerEvent::TurnStarted(_) => self.turns_started += 1,
            crate::types::ServerEvent::RecognizingSpeechFinished(_) => {
                self.speech_recognized += 1
            }
            _ => {}
        }
    }

    pub fn events_received(&self) -> u64 {
        self.events_received
    }

    pub fn turns_started(&self) -> u64 {
        self.turns_started
    }

    pub fn speech_recognized(&self) -> u64 {
        self.speech_recognized
    }
}
