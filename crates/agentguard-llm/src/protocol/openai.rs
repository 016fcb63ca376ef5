//! `OpenAI` chat completion API wire format

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::types::{CompletionRequest, CompletionResponse, FunctionCall, Message, ToolCall, ToolDefinition, null_as_default};

// -- Request types --

/// Outbound chat completion request
#[derive(Debug, Serialize)]
pub struct OpenAiRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [Message],
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub stream: bool,
    #[serde(skip_serializing_if = "is_empty_slice")]
    pub tools: &'a [ToolDefinition],
}

impl<'a> From<&'a CompletionRequest> for OpenAiRequest<'a> {
    fn from(request: &'a CompletionRequest) -> Self {
        Self {
            model: &request.model,
            messages: &request.messages,
            stream: request.stream,
            tools: &request.tools,
        }
    }
}

fn is_empty_slice<T>(slice: &&[T]) -> bool {
    slice.is_empty()
}

// -- Response types --

/// Chat completion response, lenient about fields it does not read
#[derive(Debug, Default, Deserialize)]
pub struct OpenAiResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub model: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OpenAiChoice {
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: OpenAiChoiceMessage,
}

#[derive(Debug, Default, Deserialize)]
pub struct OpenAiChoiceMessage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tool_calls: Vec<OpenAiToolCall>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OpenAiToolCall {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub call_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub function: OpenAiFunctionCall,
}

#[derive(Debug, Default, Deserialize)]
pub struct OpenAiFunctionCall {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub arguments: String,
}

impl From<OpenAiToolCall> for ToolCall {
    fn from(call: OpenAiToolCall) -> Self {
        Self {
            id: call.id,
            call_type: call.call_type,
            function: FunctionCall {
                name: call.function.name,
                arguments: call.function.arguments,
            },
        }
    }
}

/// Encode the canonical request as an `OpenAI` request body
pub fn encode_request(request: &CompletionRequest) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec(&OpenAiRequest::from(request))
}

/// Interpret a buffered chat completion body
///
/// Content comes from the first choice with non-empty content; tool calls
/// from every choice, in order.
pub fn parse_response(body: Bytes) -> Result<CompletionResponse, ParseError> {
    let parsed: OpenAiResponse = match serde_json::from_slice(&body) {
        Ok(parsed) => parsed,
        Err(e) => return Err(ParseError::new(e.to_string(), body)),
    };

    let mut response = CompletionResponse {
        id: parsed.id,
        model: parsed.model,
        raw_body: body,
        ..CompletionResponse::default()
    };

    for choice in parsed.choices {
        if response.content.is_empty() {
            response.content = choice.message.content;
        }
        response
            .tool_calls
            .extend(choice.message.tool_calls.into_iter().map(ToolCall::from));
    }

    Ok(response)
}
