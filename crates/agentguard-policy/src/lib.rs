//! Allow/deny policy evaluation for models and proposed tool calls
//!
//! The engine is fail-closed: a subject is only allowed when an allow
//! pattern matches it and no deny pattern does. With no rules configured,
//! everything is denied.

#![allow(clippy::must_use_candidate)]

mod pattern;

use serde::{Deserialize, Serialize};

use crate::pattern::Pattern;

/// Allow and deny pattern lists for one subject kind
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSet {
    /// Patterns that permit a subject, checked in order
    #[serde(default)]
    pub allow: Vec<String>,
    /// Patterns that reject a subject, checked in order before `allow`
    #[serde(default)]
    pub deny: Vec<String>,
}

/// Policy configuration covering models and tools
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyConfig {
    /// Rules applied to the requested model
    #[serde(default)]
    pub models: RuleSet,
    /// Rules applied to tool calls proposed by the model
    #[serde(default)]
    pub tools: RuleSet,
}

/// Outcome of a policy evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display, strum::IntoStaticStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Action {
    Allow,
    Deny,
}

/// Code naming the rule that produced a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display, strum::IntoStaticStr)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleId {
    ModelDeny,
    ModelAllow,
    ModelDefaultDeny,
    ToolDeny,
    ToolAllow,
    ToolDefaultDeny,
}

/// A single policy decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decision {
    /// Allow or deny
    pub action: Action,
    /// Rule that fired
    pub rule_id: RuleId,
    /// Human-readable explanation
    pub reason: String,
}

impl Decision {
    pub const fn is_allowed(&self) -> bool {
        matches!(self.action, Action::Allow)
    }
}

/// What a rule set is applied to
#[derive(Debug, Clone, Copy)]
enum Subject {
    Model,
    Tool,
}

impl Subject {
    const fn label(self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Tool => "tool",
        }
    }

    const fn deny(self) -> RuleId {
        match self {
            Self::Model => RuleId::ModelDeny,
            Self::Tool => RuleId::ToolDeny,
        }
    }

    const fn allow(self) -> RuleId {
        match self {
            Self::Model => RuleId::ModelAllow,
            Self::Tool => RuleId::ToolAllow,
        }
    }

    const fn default_deny(self) -> RuleId {
        match self {
            Self::Model => RuleId::ModelDefaultDeny,
            Self::Tool => RuleId::ToolDefaultDeny,
        }
    }
}

/// Rule set with its patterns parsed once at construction
#[derive(Debug)]
struct CompiledRules {
    subject: Subject,
    allow: Vec<Pattern>,
    deny: Vec<Pattern>,
}

impl CompiledRules {
    fn new(subject: Subject, rules: &RuleSet) -> Self {
        Self {
            subject,
            allow: rules.allow.iter().map(|p| Pattern::parse(p)).collect(),
            deny: rules.deny.iter().map(|p| Pattern::parse(p)).collect(),
        }
    }

    fn evaluate(&self, name: &str) -> Decision {
        let label = self.subject.label();

        if self.deny.iter().any(|p| p.matches(name)) {
            return Decision {
                action: Action::Deny,
                rule_id: self.subject.deny(),
                reason: format!("{label} {name:?} is explicitly denied"),
            };
        }

        if self.allow.iter().any(|p| p.matches(name)) {
            return Decision {
                action: Action::Allow,
                rule_id: self.subject.allow(),
                reason: format!("{label} {name:?} is explicitly allowed"),
            };
        }

        let reason = if self.allow.is_empty() {
            "no policy rules defined".to_owned()
        } else {
            format!("{label} {name:?} is not in the allow list")
        };

        Decision {
            action: Action::Deny,
            rule_id: self.subject.default_deny(),
            reason,
        }
    }
}

/// Immutable policy engine shared by all requests
#[derive(Debug)]
pub struct PolicyEngine {
    models: CompiledRules,
    tools: CompiledRules,
}

impl PolicyEngine {
    /// Build the engine from configuration
    pub fn new(config: &PolicyConfig) -> Self {
        tracing::debug!(
            model_allow = config.models.allow.len(),
            model_deny = config.models.deny.len(),
            tool_allow = config.tools.allow.len(),
            tool_deny = config.tools.deny.len(),
            "policy engine initialized"
        );

        Self {
            models: CompiledRules::new(Subject::Model, &config.models),
            tools: CompiledRules::new(Subject::Tool, &config.tools),
        }
    }

    /// Decide whether a model may be used
    pub fn evaluate_model(&self, model: &str) -> Decision {
        self.models.evaluate(model)
    }

    /// Decide whether a proposed tool call may be acted on
    pub fn evaluate_tool(&self, tool: &str) -> Decision {
        self.tools.evaluate(tool)
    }
}
