use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Role of a message participant
///
/// The four roles this gateway acts on are matched case-insensitively.
/// Anything else (for example `developer`) is kept verbatim as
/// [`Role::Other`] and forwarded as plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    /// System instruction
    System,
    /// User message
    User,
    /// Assistant response
    Assistant,
    /// Tool result
    Tool,
    /// Role name this gateway does not interpret
    Other(String),
}

impl Role {
    /// Wire name, as received for [`Role::Other`]
    pub fn as_str(&self) -> &str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
            Self::Other(name) => name,
        }
    }
}

impl From<String> for Role {
    fn from(name: String) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "system" => Self::System,
            "user" => Self::User,
            "assistant" => Self::Assistant,
            "tool" => Self::Tool,
            _ => Self::Other(name),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::from)
    }
}

/// Message in a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Message {
    /// Role of the message author
    pub role: Role,
    /// Text content, empty when the client sent `null` or omitted it
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub content: String,
    /// Tool calls made by the assistant
    #[serde(default, deserialize_with = "super::null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// ID of the tool call this message answers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Message {
    /// Create a plain text message
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }
}

/// Tool invocation proposed by the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolCall {
    /// Call identifier, echoed back in the tool result
    #[serde(default)]
    pub id: String,
    /// Call type, `function` for everything this gateway understands
    #[serde(rename = "type", default = "function_type")]
    pub call_type: String,
    /// Function being called
    pub function: FunctionCall,
}

/// Function name and JSON-encoded arguments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FunctionCall {
    pub name: String,
    /// Arguments as a JSON string, not necessarily valid JSON
    #[serde(default)]
    pub arguments: String,
}

pub(crate) fn function_type() -> String {
    "function".to_owned()
}
