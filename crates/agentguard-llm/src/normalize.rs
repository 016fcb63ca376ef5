//! Strict decoding of inbound chat-completion bodies

use serde::Deserialize;

use crate::error::DecodeError;
use crate::types::{CompletionRequest, Message, ToolDefinition, null_as_default};

/// Client request body as accepted on `/v1/chat/completions`
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct InboundRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(default, deserialize_with = "null_as_default")]
    stream: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    tools: Vec<ToolDefinition>,
}

/// Decode a client body into a canonical request
///
/// Exactly one JSON object is accepted. Unknown fields at any depth and any
/// non-whitespace bytes after the object are rejected.
pub fn decode_request(body: &[u8]) -> Result<CompletionRequest, DecodeError> {
    let mut deserializer = serde_json::Deserializer::from_slice(body);

    let inbound =
        InboundRequest::deserialize(&mut deserializer).map_err(|e| DecodeError::Malformed(e.to_string()))?;
    deserializer.end().map_err(|_| DecodeError::TrailingData)?;

    Ok(CompletionRequest {
        model: inbound.model,
        messages: inbound.messages,
        stream: inbound.stream,
        tools: inbound.tools,
        metadata: Default::default(),
    })
}
