//! The spoken command grammar.
//!
//! Text is lower-cased and trimmed, then matched against the exact phrases
//! first and the argument-taking prefixes second. Prefixes are tried most
//! specific first so "playlist x" is never read as "play" + "list x".

use crate::Command;

/// Prefix commands, most specific first. The remainder becomes the argument.
const PREFIXES: [(&str, fn(String) -> Command); 3] = [
    ("playlist ", Command::Playlist),
    ("artist ", Command::Artist),
    ("play ", Command::Play),
];

pub fn normalize(text: &str) -> String {
    text.to_lowercase().trim().to_string()
}

fn exact(text: &str) -> Option<Command> {
    let command = match text {
        "stop" => Command::Stop,
        "power off" => Command::PowerOff,
        "reboot" => Command::Reboot,
        "ip address" => Command::SayIp,
        "pause" => Command::Pause,
        "resume" => Command::Resume,
        "volume up" => Command::VolumeUp,
        "volume down" => Command::VolumeDown,
        _ => return None,
    };
    Some(command)
}

/// Parses one recognized utterance. Never fails: unmatched text is
/// [`Command::Unknown`].
pub fn parse(text: &str) -> Command {
    let text = normalize(text);
    if let Some(command) = exact(&text) {
        return command;
    }
    for (prefix, build) in PREFIXES {
        if let Some(rest) = text.strip_prefix(prefix) {
            let argument = rest.trim();
            if !argument.is_empty() {
                return build(argument.to_string());
            }
        }
    }
    Command::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_phrases_map_to_their_commands() {
        let cases = [
            ("stop", Command::Stop),
            ("power off", Command::PowerOff),
            ("reboot", Command::Reboot),
            ("ip address", Command::SayIp),
            ("pause", Command::Pause),
            ("resume", Command::Resume),
            ("volume up", Command::VolumeUp),
            ("volume down", Command::VolumeDown),
        ];
        for (text, expected) in cases {
            assert_eq!(parse(text), expected, "input: {text:?}");
        }
    }

    #[test]
    fn matching_ignores_case_and_surrounding_whitespace() {
        assert_eq!(parse("  Power Off \n"), Command::PowerOff);
        assert_eq!(parse("STOP"), Command::Stop);
        assert_eq!(
            parse(" Play Around The World "),
            Command::Play("around the world".into())
        );
    }

    #[test]
    fn prefixes_consume_the_remainder() {
        assert_eq!(parse("play hey jude"), Command::Play("hey jude".into()));
        assert_eq!(parse("artist daft punk"), Command::Artist("daft punk".into()));
        assert_eq!(
            parse("playlist my favorites"),
            Command::Playlist("my favorites".into())
        );
    }

    #[test]
    fn playlist_is_not_read_as_play() {
        assert_eq!(parse("playlist jazz"), Command::Playlist("jazz".into()));
        assert_eq!(parse("play list jazz"), Command::Play("list jazz".into()));
    }

    #[test]
    fn exact_phrases_win_over_prefixes() {
        // "stop" has no prefix form; "play stop" is a song called "stop".
        assert_eq!(parse("play stop"), Command::Play("stop".into()));
        assert_eq!(parse("stop"), Command::Stop);
    }

    #[test]
    fn everything_else_is_unknown() {
        for text in [
            "",
            "   ",
            "play",
            "play   ",
            "artist",
            "playlist",
            "stop the music",
            "volume",
            "volume up please",
            "what time is it",
            "display something",
        ] {
            assert_eq!(parse(text), Command::Unknown, "input: {text:?}");
        }
    }

    #[test]
    fn only_stop_and_unknown_keep_the_turn_open() {
        assert!(!Command::Stop.ends_turn());
        assert!(!Command::Unknown.ends_turn());
        assert!(Command::PowerOff.ends_turn());
        assert!(Command::Play("x".into()).ends_turn());
        assert!(Command::VolumeDown.ends_turn());
    }
}
