use std::collections::BTreeMap;

use serde::Serialize;

use super::{Message, ToolDefinition};

/// Provider-agnostic chat-completion request
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompletionRequest {
    /// Model identifier, passed to the upstream unchanged
    pub model: String,
    /// Conversation history in order
    pub messages: Vec<Message>,
    /// Whether the client asked for a streamed response
    pub stream: bool,
    /// Tools offered to the model
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,
    /// Gateway-internal annotations, never serialized or forwarded
    #[serde(skip)]
    pub metadata: BTreeMap<String, String>,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            ..Self::default()
        }
    }

    /// Canonical JSON encoding, the input to the request content hash
    pub fn to_canonical_json(&self) -> Vec<u8> {
        serde_json::to_vec(self).unwrap_or_default()
    }
}
