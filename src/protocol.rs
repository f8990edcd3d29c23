//! JSON messages exchanged between the host and the embedded renderer.
//!
//! Every message is a JSON object with an `action` string naming its kind.
//! Field names are camelCase on the wire.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed message: {0}")]
    Malformed(String),
    #[error("unknown action `{0}`")]
    UnknownAction(String),
    #[error("invalid message payload: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Formatting commands understood by the rich editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormatCommand {
    ToggleHeading1,
    ToggleHeading2,
    ToggleHeading3,
    ToggleBold,
    ToggleItalic,
    ToggleUnderline,
    ToggleCode,
    ToggleBulletList,
    ToggleOrderedList,
    ToggleBlockquote,
    ToggleCodeBlock,
}

impl FormatCommand {
    pub const ALL: [Self; 11] = [
        Self::ToggleHeading1,
        Self::ToggleHeading2,
        Self::ToggleHeading3,
        Self::ToggleBold,
        Self::ToggleItalic,
        Self::ToggleUnderline,
        Self::ToggleCode,
        Self::ToggleBulletList,
        Self::ToggleOrderedList,
        Self::ToggleBlockquote,
        Self::ToggleCodeBlock,
    ];

    /// The mark that is active once this command has been applied.
    pub const fn mark(self) -> Mark {
        match self {
            Self::ToggleHeading1 => Mark::Heading1,
            Self::ToggleHeading2 => Mark::Heading2,
            Self::ToggleHeading3 => Mark::Heading3,
            Self::ToggleBold => Mark::Bold,
            Self::ToggleItalic => Mark::Italic,
            Self::ToggleUnderline => Mark::Underline,
            Self::ToggleCode => Mark::Code,
            Self::ToggleBulletList => Mark::BulletList,
            Self::ToggleOrderedList => Mark::OrderedList,
            Self::ToggleBlockquote => Mark::Blockquote,
            Self::ToggleCodeBlock => Mark::CodeBlock,
        }
    }
}

/// Formatting active at the rich editor's cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Mark {
    Heading1,
    Heading2,
    Heading3,
    Bold,
    Italic,
    Underline,
    Code,
    BulletList,
    OrderedList,
    Blockquote,
    CodeBlock,
}

impl Mark {
    /// Short toolbar label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Heading1 => "H1",
            Self::Heading2 => "H2",
            Self::Heading3 => "H3",
            Self::Bold => "B",
            Self::Italic => "I",
            Self::Underline => "U",
            Self::Code => "`",
            Self::BulletList => "•",
            Self::OrderedList => "1.",
            Self::Blockquote => ">",
            Self::CodeBlock => "```",
        }
    }
}

/// A key press forwarded to the rich editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EditorKey {
    Char(char),
    Backspace,
    Delete,
    Enter,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// Host → renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum HostCommand {
    SetContent {
        id: u64,
        revision: u64,
        markdown: String,
    },
    SyncContent {
        id: u64,
    },
    ExecuteCommand {
        id: u64,
        command: FormatCommand,
    },
    GetActiveMarks {
        id: u64,
    },
    Input {
        id: u64,
        key: EditorKey,
    },
    Shutdown,
}

impl HostCommand {
    pub const ACTIONS: &'static [&'static str] = &[
        "setContent",
        "syncContent",
        "executeCommand",
        "getActiveMarks",
        "input",
        "shutdown",
    ];

    /// Request id, for commands that expect an acknowledgment.
    pub const fn id(&self) -> Option<u64> {
        match self {
            Self::SetContent { id, .. }
            | Self::SyncContent { id }
            | Self::ExecuteCommand { id, .. }
            | Self::GetActiveMarks { id }
            | Self::Input { id, .. } => Some(*id),
            Self::Shutdown => None,
        }
    }
}

/// Renderer → host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum RendererEvent {
    #[serde(rename_all = "camelCase")]
    ContentChanged {
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        base_revision: Option<u64>,
    },
    EditorReady {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    Error {
        error: String,
    },
    #[serde(rename_all = "camelCase")]
    SyncRequested {
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        base_revision: Option<u64>,
    },
    Ack {
        id: u64,
    },
    ActiveMarks {
        id: u64,
        marks: Vec<Mark>,
    },
    CursorMoved {
        line: usize,
        column: usize,
    },
    ConsoleLog {
        level: LogLevel,
        message: String,
    },
}

impl RendererEvent {
    pub const ACTIONS: &'static [&'static str] = &[
        "contentChanged",
        "editorReady",
        "error",
        "syncRequested",
        "ack",
        "activeMarks",
        "cursorMoved",
        "consoleLog",
    ];
}

/// Serialize a message to a JSON text frame.
pub fn encode<T: Serialize>(message: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string(message)
}

/// Decode a frame sent by the renderer.
pub fn decode_event(frame: &str) -> Result<RendererEvent, ProtocolError> {
    decode_tagged(frame, RendererEvent::ACTIONS)
}

/// Decode a frame sent by the host.
pub fn decode_command(frame: &str) -> Result<HostCommand, ProtocolError> {
    decode_tagged(frame, HostCommand::ACTIONS)
}

fn decode_tagged<T: DeserializeOwned>(frame: &str, known: &[&str]) -> Result<T, ProtocolError> {
    let value: Value = serde_json::from_str(frame)?;
    let Some(object) = value.as_object() else {
        return Err(ProtocolError::Malformed("expected a JSON object".to_string()));
    };
    let Some(action) = object.get("action").and_then(Value::as_str) else {
        return Err(ProtocolError::Malformed(
            "missing string `action` field".to_string(),
        ));
    };
    if !known.contains(&action) {
        return Err(ProtocolError::UnknownAction(action.to_string()));
    }
    Ok(serde_json::from_value(value)?)
}
