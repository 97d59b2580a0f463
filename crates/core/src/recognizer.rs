use anyhow::Result;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use std::fmt;

/// The conversation controls of the speech assistant.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Recognizer: Send + Sync {
    /// Open a new turn, as if the hot word had been said.
    async fn start_conversation(&self) -> Result<()>;

    /// End the current turn without waiting for the assistant to answer.
    async fn stop_conversation(&self) -> Result<()>;
}

/// What the status light should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ready,
    Listening,
    Thinking,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Ready => "ready",
            Status::Listening => "listening",
            Status::Thinking => "thinking",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fire-and-forget status indicator.
#[cfg_attr(test, automock)]
pub trait StatusUi: Send + Sync {
    fn status(&self, status: Status);
}
