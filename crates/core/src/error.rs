use std::time::Duration;

/// Why a track query could not be turned into something playable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("no playable track matches the query")]
    NotFound,
    #[error("track lookup timed out after {0:?}")]
    Timeout(Duration),
    #[error("track lookup failed: {0}")]
    Unavailable(String),
}

/// Why an artist or playlist search produced no tracks.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("nothing in the catalog matches the name")]
    NotFound,
    #[error("catalog search timed out after {0:?}")]
    Timeout(Duration),
    #[error("catalog search failed: {0}")]
    Unavailable(String),
}

/// A failure of the media engine or of a system facility (mixer, power, TTS).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    #[error("{program} could not be run: {reason}")]
    Spawn { program: String, reason: String },
    #[error("{program} failed: {reason}")]
    Failed { program: String, reason: String },
    #[error("unexpected output from {program}: {output:?}")]
    Output { program: String, output: String },
    #[error("nothing is loaded")]
    NothingLoaded,
}

/// A failure while starting one track of a session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Device(#[from] DeviceError),
}

/// Errors the dispatcher hands back to the event loop. Only fatal ones exist;
/// everything else is handled where it happens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("the assistant reported a fatal error")]
    FatalAssistant,
}
