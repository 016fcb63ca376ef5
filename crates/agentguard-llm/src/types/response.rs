use bytes::Bytes;

use super::ToolCall;

/// Provider-agnostic view of a buffered upstream response
///
/// Used for auditing only. The client always receives `raw_body`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionResponse {
    /// Upstream response identifier, empty when the provider has none
    pub id: String,
    /// Model reported by the upstream
    pub model: String,
    /// Assistant text
    pub content: String,
    /// Tool calls proposed by the model, in upstream order
    pub tool_calls: Vec<ToolCall>,
    /// Exact upstream body bytes
    pub raw_body: Bytes,
}

impl CompletionResponse {
    /// Names of the proposed tool calls, in upstream order
    pub fn tool_names(&self) -> impl Iterator<Item = &str> {
        self.tool_calls.iter().map(|call| call.function.name.as_str())
    }
}
