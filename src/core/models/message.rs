use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A selectable option rendered by the transport (an inline keyboard button on
/// Telegram). `value` is what comes back as the user's choice.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ReplyOption {
    pub label: String,
    pub value: String,
}

impl ReplyOption {
    pub fn new(label: &str, value: &str) -> Self {
        ReplyOption {
            label: label.to_string(),
            value: value.to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub text: String,
    pub options: Vec<ReplyOption>,
}

impl OutgoingMessage {
    pub fn text(text: impl Into<String>) -> Self {
        OutgoingMessage {
            text: text.into(),
            options: Vec::new(),
        }
    }

    pub fn with_options(text: impl Into<String>, options: Vec<ReplyOption>) -> Self {
        OutgoingMessage {
            text: text.into(),
            options,
        }
    }
}

/// What the user sent in one turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UserInput {
    Command { name: String, args: Vec<String> },
    Text(String),
    Choice(String),
}

impl UserInput {
    /// Splits `/name arg1 arg2` into a command; anything else is plain text.
    /// A `@botname` suffix on the command is dropped.
    pub fn parse_text(text: &str) -> Self {
        let trimmed = text.trim();
        match trimmed.strip_prefix('/') {
            Some(rest) if !rest.is_empty() => {
                let mut parts = rest.split_whitespace();
                let head = parts.next().unwrap_or_default();
                let name = head.split('@').next().unwrap_or_default().to_lowercase();
                UserInput::Command {
                    name,
                    args: parts.map(str::to_string).collect(),
                }
            }
            _ => UserInput::Text(text.to_string()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IncomingUpdate {
    pub user_id: String,
    pub display_name: Option<String>,
    pub endpoint: Option<String>,
    pub input: UserInput,
}
