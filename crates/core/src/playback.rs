use crate::error::DeviceError;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

/// What the media engine reports about the current media.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Nothing has been loaded yet.
    Idle,
    Opening,
    Buffering,
    Playing,
    Paused,
    Stopped,
    /// The media played to the end.
    Ended,
    Error,
}

impl EngineState {
    /// A track in one of these states still owns the engine, so the next
    /// track of a sequence must wait. Paused counts: pausing must not skip.
    pub fn is_active(self) -> bool {
        matches!(
            self,
            EngineState::Opening
                | EngineState::Buffering
                | EngineState::Playing
                | EngineState::Paused
        )
    }
}

/// The single media player the device drives.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PlaybackEngine: Send + Sync {
    /// Load `media_ref` and start playing it, replacing whatever was loaded.
    async fn play(&self, media_ref: &str) -> Result<(), DeviceError>;

    async fn stop(&self) -> Result<(), DeviceError>;

    /// `true` pauses, `false` resumes.
    async fn pause(&self, paused: bool) -> Result<(), DeviceError>;

    async fn state(&self) -> EngineState;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_states_hold_the_engine() {
        for state in [
            EngineState::Opening,
            EngineState::Buffering,
            EngineState::Playing,
            EngineState::Paused,
        ] {
            assert!(state.is_active(), "{state:?}");
        }
        for state in [
            EngineState::Idle,
            EngineState::Stopped,
            EngineState::Ended,
            EngineState::Error,
        ] {
            assert!(!state.is_active(), "{state:?}");
        }
    }
}
