//! Chat event types shared between the ingestion pipeline and the engine.

use std::fmt;
use std::str::FromStr;

/// A validated chat command name.
///
/// The full command vocabulary is closed: routing is an exhaustive match, so
/// adding a variant forces every dispatch site to handle it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    StartGame,
    EndGame,
    Yes,
    No,
    Status,
    Help,
}

impl Command {
    pub const ALL: [Command; 6] = [
        Command::StartGame,
        Command::EndGame,
        Command::Yes,
        Command::No,
        Command::Status,
        Command::Help,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Command::StartGame => "startgame",
            Command::EndGame => "endgame",
            Command::Yes => "yes",
            Command::No => "no",
            Command::Status => "status",
            Command::Help => "help",
        }
    }
}

impl FromStr for Command {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "startgame" => Ok(Command::StartGame),
            "endgame" => Ok(Command::EndGame),
            "yes" => Ok(Command::Yes),
            "no" => Ok(Command::No),
            "status" => Ok(Command::Status),
            "help" => Ok(Command::Help),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "!{}", self.as_str())
    }
}

/// One fully-processed inbound chat observation.
///
/// Produced once by the normalizer + spam filter, consumed once by the
/// session loop. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    /// The bot's browser session joined a ship; carries the bracketed code.
    SystemJoin { ship_id: String },
    /// A syntactically valid player command (rate limits not yet applied).
    Command {
        username: String,
        name: Command,
        args: Vec<String>,
    },
    /// A player tripped the spam strike limit and is now serving a timeout.
    SpamPenalty { username: String, command: Command },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_round_trips_through_str() {
        for cmd in Command::ALL {
            assert_eq!(cmd.as_str().parse::<Command>(), Ok(cmd));
        }
    }

    #[test]
    fn unknown_command_is_rejected() {
        assert!("ping".parse::<Command>().is_err());
        assert!("".parse::<Command>().is_err());
        assert!("YES".parse::<Command>().is_err());
    }

    #[test]
    fn display_carries_prefix() {
        assert_eq!(Command::StartGame.to_string(), "!startgame");
    }
}
