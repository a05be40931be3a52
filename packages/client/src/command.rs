//! Parsing of input lines into hub invocations.

use chathub_server::{
    domain::OutboundFrame,
    infrastructure::{
        codec::encode_invocation,
        dto::websocket::{JOIN_ROOM, LEAVE_ROOM, SEND_MESSAGE, SEND_MESSAGE_TO_ROOM},
    },
};
use serde_json::Value;
use thiserror::Error;

pub const HELP: &str = "Commands: /join <room>, /leave <room>, /room <room> <text>, /quit";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("usage: {0}")]
    MissingArgument(&'static str),

    #[error("unknown command '{0}'. {HELP}")]
    UnknownCommand(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Plain line: message to everyone
    Say(String),
    Join(String),
    Leave(String),
    Room { room: String, text: String },
    Quit,
    Empty,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Self::Empty);
        }
        let Some(rest) = line.strip_prefix('/') else {
            return Ok(Self::Say(line.to_string()));
        };

        let (name, argument) = match rest.split_once(char::is_whitespace) {
            Some((name, argument)) => (name, argument.trim()),
            None => (rest, ""),
        };
        match name {
            "join" => single(argument, "/join <room>").map(Self::Join),
            "leave" => single(argument, "/leave <room>").map(Self::Leave),
            "room" => match argument.split_once(char::is_whitespace) {
                Some((room, text)) if !text.trim().is_empty() => Ok(Self::Room {
                    room: room.to_string(),
                    text: text.trim().to_string(),
                }),
                _ => Err(CommandError::MissingArgument("/room <room> <text>")),
            },
            "quit" | "exit" => Ok(Self::Quit),
            other => Err(CommandError::UnknownCommand(other.to_string())),
        }
    }

    /// The invocation this command sends, if any.
    pub fn to_invocation(&self, display_name: &str, invocation_id: &str) -> Option<OutboundFrame> {
        let (target, arguments) = match self {
            Self::Say(text) => (SEND_MESSAGE, vec![Value::from(display_name), Value::from(text.as_str())]),
            Self::Join(room) => (JOIN_ROOM, vec![Value::from(room.as_str())]),
            Self::Leave(room) => (LEAVE_ROOM, vec![Value::from(room.as_str())]),
            Self::Room { room, text } => (
                SEND_MESSAGE_TO_ROOM,
                vec![
                    Value::from(room.as_str()),
                    Value::from(display_name),
                    Value::from(text.as_str()),
                ],
            ),
            Self::Quit | Self::Empty => return None,
        };
        Some(encode_invocation(Some(invocation_id), target, arguments))
    }
}

fn single(argument: &str, usage: &'static str) -> Result<String, CommandError> {
    if argument.is_empty() || argument.contains(char::is_whitespace) {
        return Err(CommandError::MissingArgument(usage));
    }
    Ok(argument.to_string())
}
