use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Who produced a turn. The model only ever sees these two roles; the
/// system instruction travels outside the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Model,
}

/// A request from the model to run one named tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    pub arguments: Value,
}

/// The stringified outcome of a tool invocation, successful or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub name: String,
    pub payload: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TurnContent {
    Text { text: String },
    ToolCall(ToolCall),
    ToolResult(ToolOutput),
}

/// One unit of conversation content, tagged by role and content kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: TurnContent,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: TurnContent::Text { text: text.into() },
        }
    }

    pub fn model_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            content: TurnContent::Text { text: text.into() },
        }
    }

    pub fn tool_call(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            role: Role::Model,
            content: TurnContent::ToolCall(ToolCall {
                name: name.into(),
                arguments,
            }),
        }
    }

    /// Tool results are replayed to the model as user-role turns, matching
    /// how the Gemini API expects function responses to be threaded.
    pub fn tool_result(name: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: TurnContent::ToolResult(ToolOutput {
                name: name.into(),
                payload: payload.into(),
            }),
        }
    }
}
