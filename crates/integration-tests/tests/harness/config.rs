//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;

use agentguard_config::{BedrockConfig, Config, ProviderConfig, RuleSet, ServerConfig};
use secrecy::SecretString;

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Minimal config listening on an ephemeral port with an empty policy
    pub fn new() -> Self {
        Self {
            config: Config {
                server: ServerConfig {
                    listen_address: Some(SocketAddr::from(([127, 0, 0, 1], 0))),
                },
                ..Config::default()
            },
        }
    }

    /// Point an `OpenAI`-compatible provider at a mock upstream
    pub fn with_openai_provider(mut self, base_url: &str) -> Self {
        self.config.provider = ProviderConfig {
            provider_type: "openai".to_owned(),
            base_url: Some(base_url.parse().expect("valid URL")),
            api_key: Some(SecretString::from("test-key")),
            ..ProviderConfig::default()
        };
        self
    }

    /// Point a Bedrock provider with static credentials at a mock upstream
    pub fn with_bedrock_provider(mut self, endpoint: &str) -> Self {
        self.config.provider = ProviderConfig {
            provider_type: "bedrock".to_owned(),
            bedrock: BedrockConfig {
                region: Some("us-east-1".to_owned()),
                endpoint: Some(endpoint.parse().expect("valid URL")),
                access_key_id: Some(SecretString::from("AKIDEXAMPLE")),
                secret_access_key: Some(SecretString::from("wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY")),
                session_token: None,
            },
            ..ProviderConfig::default()
        };
        self
    }

    /// Allow exactly the listed models
    pub fn allow_models(mut self, models: &[&str]) -> Self {
        self.config.policy.models.allow = to_owned(models);
        self
    }

    /// Deny the listed model patterns
    pub fn deny_models(mut self, models: &[&str]) -> Self {
        self.config.policy.models.deny = to_owned(models);
        self
    }

    /// Replace the tool rules
    pub fn tools(mut self, allow: &[&str], deny: &[&str]) -> Self {
        self.config.policy.tools = RuleSet {
            allow: to_owned(allow),
            deny: to_owned(deny),
        };
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config
    }
}

fn to_owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_owned()).collect()
}
