//! AWS Bedrock Converse API wire format

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::ParseError;
use crate::types::{CompletionRequest, CompletionResponse, FunctionCall, Role, ToolCall, null_as_default};

// -- Request types --

/// Converse request body. The model ID travels in the URL path.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConverseRequest {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<ConverseMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub system: Vec<ContentBlock>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_config: Option<ToolConfig>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConverseMessage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub role: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: Vec<ContentBlock>,
}

/// A content block. Exactly one member is set on blocks this gateway builds.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_use: Option<ToolUse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_result: Option<ToolResult>,
}

impl ContentBlock {
    fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_owned()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolUse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub tool_use_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub tool_use_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: Vec<ContentBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ToolConfig {
    pub tools: Vec<Tool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub tool_spec: ToolSpec,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolSpec {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub input_schema: InputSchema,
}

#[derive(Debug, Serialize)]
pub struct InputSchema {
    pub json: Value,
}

// -- Response types --

#[derive(Debug, Default, Deserialize)]
pub struct ConverseResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub output: ConverseOutput,
}

#[derive(Debug, Default, Deserialize)]
pub struct ConverseOutput {
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: ConverseMessage,
}

/// Translate a canonical request into a Converse request body
///
/// System messages are hoisted into `system`. Tool messages become user
/// turns carrying a single `toolResult`. Unrecognised roles keep their
/// lowercased name and carry text only. Messages left with no content
/// blocks are dropped.
pub fn build_request(request: &CompletionRequest) -> ConverseRequest {
    let mut converse = ConverseRequest::default();

    for (i, message) in request.messages.iter().enumerate() {
        let text = (!message.content.is_empty()).then(|| ContentBlock::text(&message.content));

        let (role, blocks) = match &message.role {
            Role::System => {
                converse.system.extend(text);
                continue;
            }
            Role::User => ("user".to_owned(), text.into_iter().collect()),
            Role::Other(name) => (name.to_lowercase(), text.into_iter().collect()),
            Role::Assistant => {
                let mut blocks: Vec<ContentBlock> = text.into_iter().collect();
                blocks.extend(message.tool_calls.iter().enumerate().map(|(j, call)| {
                    let tool_use_id = if call.id.is_empty() {
                        format!("toolcall-{i}-{j}")
                    } else {
                        call.id.clone()
                    };

                    ContentBlock {
                        tool_use: Some(ToolUse {
                            tool_use_id,
                            name: call.function.name.clone(),
                            input: tool_input(&call.function.arguments),
                        }),
                        ..ContentBlock::default()
                    }
                }));
                ("assistant".to_owned(), blocks)
            }
            Role::Tool => {
                let tool_use_id = message
                    .tool_call_id
                    .clone()
                    .filter(|id| !id.is_empty())
                    .unwrap_or_else(|| format!("toolcall-{i}"));

                let result = ContentBlock {
                    tool_result: Some(ToolResult {
                        tool_use_id,
                        content: text.into_iter().collect(),
                        status: None,
                    }),
                    ..ContentBlock::default()
                };
                ("user".to_owned(), vec![result])
            }
        };

        if !blocks.is_empty() {
            converse.messages.push(ConverseMessage {
                role,
                content: blocks,
            });
        }
    }

    let tools: Vec<Tool> = request
        .tools
        .iter()
        .filter(|tool| tool.is_function())
        .map(|tool| Tool {
            tool_spec: ToolSpec {
                name: tool.function.name.clone(),
                description: tool.function.description.clone().filter(|d| !d.is_empty()),
                input_schema: InputSchema {
                    json: tool
                        .function
                        .parameters
                        .clone()
                        .unwrap_or_else(|| json!({"type": "object"})),
                },
            },
        })
        .collect();

    if !tools.is_empty() {
        converse.tool_config = Some(ToolConfig { tools });
    }

    converse
}

/// Arguments string to a `toolUse` input document
fn tool_input(arguments: &str) -> Option<Value> {
    if arguments.is_empty() {
        return Some(json!({}));
    }

    match serde_json::from_str::<Value>(arguments) {
        Ok(Value::Null) => None,
        Ok(value) => Some(value),
        Err(_) => Some(json!({"raw": arguments})),
    }
}

/// Interpret a buffered Converse response body
pub fn parse_response(body: Bytes) -> Result<CompletionResponse, ParseError> {
    let parsed: ConverseResponse = match serde_json::from_slice(&body) {
        Ok(parsed) => parsed,
        Err(e) => return Err(ParseError::new(e.to_string(), body)),
    };

    let message = parsed.output.message;
    if message.role.is_empty() && message.content.is_empty() {
        return Err(ParseError::new("missing output message", body));
    }

    let mut response = CompletionResponse {
        raw_body: body,
        ..CompletionResponse::default()
    };

    for block in message.content {
        if let Some(text) = block.text {
            response.content.push_str(&text);
        }
        if let Some(tool_use) = block.tool_use {
            let arguments = tool_use
                .input
                .and_then(|input| serde_json::to_string(&input).ok())
                .unwrap_or_else(|| "{}".to_owned());

            response.tool_calls.push(ToolCall {
                id: tool_use.tool_use_id,
                call_type: "function".to_owned(),
                function: FunctionCall {
                    name: tool_use.name,
                    arguments,
                },
            });
        }
    }

    Ok(response)
}
