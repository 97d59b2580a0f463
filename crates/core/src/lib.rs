pub mod catalog;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod grammar;
pub mod manager;
pub mod playback;
pub mod recognizer;
pub mod resolver;
pub mod session;
pub mod system;

#[cfg(test)]
pub(crate) mod testing;

/// A voice command parsed from one recognized utterance.
///
/// This enum is the boundary between what the user said and what the
/// dispatcher does about it. Arguments are already normalized (lower case,
/// trimmed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Stop the current playback session.
    Stop,
    PowerOff,
    Reboot,
    /// Speak the device's IP address.
    SayIp,
    Pause,
    Resume,
    /// Find and play a single track matching the query.
    Play(String),
    /// Play the top tracks of the named artist.
    Artist(String),
    /// Play the tracks of the named playlist.
    Playlist(String),
    VolumeUp,
    VolumeDown,
    /// Anything the grammar does not recognize. Dropped silently.
    Unknown,
}

impl Command {
    /// Whether the dispatcher must end the assistant's conversation turn
    /// before acting on this command.
    pub fn ends_turn(&self) -> bool {
        !matches!(self, Command::Stop | Command::Unknown)
    }
}
