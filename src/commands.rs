//! Chat command parsing.
//!
//! Converts raw message text into a structured [`Command`]. Commands are
//! bare `!`-prefixed words (`!start 10`, `!play 1 3`); anything else is not
//! for the bot and parses to an error the caller drops silently. Index
//! arguments stay raw strings here — the game session owns their
//! validation.

use command_parser::Parser;
use log::debug;

/// A parsed chat command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Start a game; the optional argument is a point limit.
    Start(Vec<String>),
    /// Stop the running game.
    Stop,
    /// Pause the running game.
    Pause,
    /// Resume a paused game.
    Resume,
    /// Join the running game.
    Join,
    /// Leave the running game.
    Quit,
    /// Privately show the caller's hand.
    Cards,
    /// Play the cards at the given hand numbers.
    Play(Vec<String>),
    /// Pick the winning entry by number.
    Winner(Vec<String>),
    /// Phase-dependent alias for [`Command::Play`] / [`Command::Winner`].
    Pick(Vec<String>),
    /// List the players.
    List,
    /// Show the scores.
    Points,
    /// Show what the game is waiting for.
    Status,
    /// Show the command overview.
    Help,
    /// Toggle decorated private messages for the caller.
    NoColor,
}

/// Why a message did not produce a [`Command`].
#[derive(Debug, PartialEq, Eq)]
pub enum CommandParsingError {
    /// The message is not a command at all.
    NotACommand,
    /// A `!` command, but not one of ours.
    Unknown,
}

impl Command {
    /// Parses a message body into a command.
    pub fn parse(parser: &Parser, body: &str) -> Result<Self, CommandParsingError> {
        // For an unknown reason the parser ignores the last word, so we add a dummy word at the end
        let body = body.to_string() + " dummy";

        let parsed = match parser.parse(&body) {
            Ok(parsed) => parsed,
            Err(_) => return Err(CommandParsingError::NotACommand),
        };

        debug!("parsed command {:?}", parsed);
        let args = parsed.arguments.clone();

        match parsed.name.as_str() {
            "start" => Ok(Command::Start(args)),
            "stop" => Ok(Command::Stop),
            "pause" => Ok(Command::Pause),
            "resume" => Ok(Command::Resume),
            "join" => Ok(Command::Join),
            "quit" => Ok(Command::Quit),
            "cards" => Ok(Command::Cards),
            "play" => Ok(Command::Play(args)),
            "winner" => Ok(Command::Winner(args)),
            "pick" => Ok(Command::Pick(args)),
            "list" => Ok(Command::List),
            "points" => Ok(Command::Points),
            "status" => Ok(Command::Status),
            "help" => Ok(Command::Help),
            "nocolor" => Ok(Command::NoColor),
            _ => Err(CommandParsingError::Unknown),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_parser() -> Parser {
        Parser::new('!', '-')
    }

    fn parse(body: &str) -> Result<Command, CommandParsingError> {
        Command::parse(&create_parser(), body)
    }

    #[test]
    fn test_parse_plain_commands() {
        assert_eq!(parse("!stop"), Ok(Command::Stop));
        assert_eq!(parse("!pause"), Ok(Command::Pause));
        assert_eq!(parse("!resume"), Ok(Command::Resume));
        assert_eq!(parse("!join"), Ok(Command::Join));
        assert_eq!(parse("!quit"), Ok(Command::Quit));
        assert_eq!(parse("!cards"), Ok(Command::Cards));
        assert_eq!(parse("!list"), Ok(Command::List));
        assert_eq!(parse("!points"), Ok(Command::Points));
        assert_eq!(parse("!status"), Ok(Command::Status));
        assert_eq!(parse("!help"), Ok(Command::Help));
        assert_eq!(parse("!nocolor"), Ok(Command::NoColor));
    }

    #[test]
    fn test_parse_start_without_point_limit() {
        assert_eq!(parse("!start"), Ok(Command::Start(Vec::new())));
    }

    #[test]
    fn test_parse_start_with_point_limit() {
        assert_eq!(parse("!start 10"), Ok(Command::Start(vec!["10".to_string()])));
    }

    #[test]
    fn test_parse_play_keeps_arguments_raw() {
        assert_eq!(
            parse("!play 1 3"),
            Ok(Command::Play(vec!["1".to_string(), "3".to_string()]))
        );
        // Even junk goes through; the session rejects it.
        assert_eq!(parse("!play x"), Ok(Command::Play(vec!["x".to_string()])));
    }

    #[test]
    fn test_parse_winner() {
        assert_eq!(parse("!winner 2"), Ok(Command::Winner(vec!["2".to_string()])));
    }

    #[test]
    fn test_parse_pick() {
        assert_eq!(
            parse("!pick 1 2"),
            Ok(Command::Pick(vec!["1".to_string(), "2".to_string()]))
        );
    }

    #[test]
    fn test_parse_unknown_command() {
        assert_eq!(parse("!dance"), Err(CommandParsingError::Unknown));
    }

    #[test]
    fn test_parse_regular_message() {
        assert_eq!(
            parse("just chatting away"),
            Err(CommandParsingError::NotACommand)
        );
    }
}
