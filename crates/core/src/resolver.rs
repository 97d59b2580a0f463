use crate::error::ResolveError;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

/// Free text used to look up one playable track, e.g. "daft punk one more time".
pub type TrackQuery = String;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTrack {
    /// Something the playback engine can open, usually a stream URL.
    pub media_ref: String,
    pub title: String,
}

/// Turns a track query into a playable media reference.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TrackResolver: Send + Sync {
    async fn resolve(&self, query: &str) -> Result<ResolvedTrack, ResolveError>;
}

/// The title as it should be spoken: punctuation dropped, words and spacing kept.
pub fn spoken_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '_')
        .collect()
}
