// Composer commands - parsing of the lines typed into the terminal.
//
// Lines starting with `/` are commands, anything else is a message to send.

use thiserror::Error;

/// Default number of blocked attempts shown by `/blocked`.
pub const DEFAULT_BLOCKED_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/open <user> <user>...` - start a conversation
    Open(Vec<u64>),
    /// `/as <user>` - act as this user
    As(u64),
    /// `/use <conversation>` - switch the current conversation
    Use(u64),
    /// `/inbox` - conversations of the current user
    Inbox,
    /// `/history` - messages of the current conversation
    History,
    /// `/blocked [n]` - most recent blocked attempts
    Blocked(usize),
    /// `/check <text>` - show the verdict without sending
    Check(String),
    Help,
    Quit,
    /// Plain text: send as the current user
    Send(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command: /{0}")]
    Unknown(String),

    #[error("/{command} expects {expected}")]
    BadArguments {
        command: &'static str,
        expected: &'static str,
    },
}

fn parse_id(raw: &str, command: &'static str, expected: &'static str) -> Result<u64, CommandError> {
    raw.parse::<u64>()
        .map_err(|_| CommandError::BadArguments { command, expected })
}

/// Parse one input line. Blank lines yield `None`.
pub fn parse_line(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let Some(rest) = line.strip_prefix('/') else {
        return Ok(Some(Command::Send(line.to_string())));
    };

    let (name, args) = match rest.split_once(char::is_whitespace) {
        Some((name, args)) => (name, args.trim()),
        None => (rest, ""),
    };

    let command = match name.to_lowercase().as_str() {
        "open" => {
            const EXPECTED: &str = "two or more user ids";
            let ids = args
                .split_whitespace()
                .map(|raw| parse_id(raw, "open", EXPECTED))
                .collect::<Result<Vec<_>, _>>()?;
            if ids.len() < 2 {
                return Err(CommandError::BadArguments {
                    command: "open",
                    expected: EXPECTED,
                });
            }
            Command::Open(ids)
        }
        "as" => Command::As(parse_id(args, "as", "a user id")?),
        "use" => Command::Use(parse_id(args, "use", "a conversation id")?),
        "inbox" => Command::Inbox,
        "history" => Command::History,
        "blocked" => {
            if args.is_empty() {
                Command::Blocked(DEFAULT_BLOCKED_LIMIT)
            } else {
                let limit = args
                    .parse::<usize>()
                    .ok()
                    .filter(|n| *n > 0)
                    .ok_or(CommandError::BadArguments {
                        command: "blocked",
                        expected: "a positive number",
                    })?;
                Command::Blocked(limit)
            }
        }
        "check" => {
            if args.is_empty() {
                return Err(CommandError::BadArguments {
                    command: "check",
                    expected: "some text",
                });
            }
            Command::Check(args.to_string())
        }
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };

    Ok(Some(command))
}

pub const HELP_TEXT: &str = "\
Commands:
  /open <user> <user>...  start a conversation
  /as <user>              act as this user
  /use <conversation>     switch conversation
  /inbox                  list your conversations
  /history                show the current conversation
  /blocked [n]            show recent blocked messages
  /check <text>           show the filter verdict without sending
  /help                   this text
  /quit                   leave
Anything else is sent as a message.";
