//! Canonical, provider-agnostic request and response model
//!
//! Every adapter translates from and to these types. Their serialized form
//! is the OpenAI-style chat-completion shape and is the content hashed into
//! `llm_request` audit events.

pub mod message;
pub mod request;
pub mod response;
pub mod tool;

pub use message::{FunctionCall, Message, Role, ToolCall};
pub use request::CompletionRequest;
pub use response::CompletionResponse;
pub use tool::{FunctionDefinition, ToolDefinition};

/// Treat an explicit JSON `null` as the type's default value
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + serde::Deserialize<'de>,
{
    use serde::Deserialize;

    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
