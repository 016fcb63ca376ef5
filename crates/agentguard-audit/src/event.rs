use agentguard_core::TraceId;
use agentguard_policy::{Action, Decision, RuleId};
use serde::Serialize;

/// RFC 3339 UTC timestamp with second precision
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Kind of occurrence an audit event records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EventType {
    /// Inbound request accepted for processing
    LlmRequest,
    /// Upstream response received
    LlmResponse,
    /// Model proposed a tool call
    ToolProposal,
    /// Policy engine produced a decision
    PolicyDecision,
}

/// A single immutable audit record
///
/// Optional fields are omitted from the serialized record when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    trace_id: TraceId,
    timestamp: String,
    event_type: EventType,
    #[serde(skip_serializing_if = "Option::is_none")]
    provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    decision: Option<Action>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rule_id: Option<RuleId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hash: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

impl Event {
    /// Start building an event stamped with the current time
    pub fn builder(trace_id: &TraceId, event_type: EventType) -> EventBuilder {
        EventBuilder {
            event: Self {
                trace_id: trace_id.clone(),
                timestamp: jiff::Timestamp::now().strftime(TIMESTAMP_FORMAT).to_string(),
                event_type,
                provider: None,
                model: None,
                decision: None,
                rule_id: None,
                reason: None,
                tool_name: None,
                hash: None,
                stream: false,
            },
        }
    }

    pub const fn trace_id(&self) -> &TraceId {
        &self.trace_id
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub const fn event_type(&self) -> EventType {
        self.event_type
    }

    pub fn provider(&self) -> Option<&str> {
        self.provider.as_deref()
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub const fn decision(&self) -> Option<Action> {
        self.decision
    }

    pub const fn rule_id(&self) -> Option<RuleId> {
        self.rule_id
    }

    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    pub fn tool_name(&self) -> Option<&str> {
        self.tool_name.as_deref()
    }

    pub fn hash(&self) -> Option<&str> {
        self.hash.as_deref()
    }

    pub const fn stream(&self) -> bool {
        self.stream
    }
}

/// Field-by-field constructor for [`Event`]
#[derive(Debug)]
#[must_use]
pub struct EventBuilder {
    event: Event,
}

impl EventBuilder {
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.event.provider = Some(provider.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.event.model = Some(model.into());
        self
    }

    /// Record the action, rule and reason of a policy decision
    pub fn decision(mut self, decision: &Decision) -> Self {
        self.event.decision = Some(decision.action);
        self.event.rule_id = Some(decision.rule_id);
        self.event.reason = Some(decision.reason.clone());
        self
    }

    pub fn tool_name(mut self, tool_name: impl Into<String>) -> Self {
        self.event.tool_name = Some(tool_name.into());
        self
    }

    pub fn hash(mut self, hash: impl Into<String>) -> Self {
        self.event.hash = Some(hash.into());
        self
    }

    pub const fn stream(mut self, stream: bool) -> Self {
        self.event.stream = stream;
        self
    }

    pub fn build(self) -> Event {
        self.event
    }
}
