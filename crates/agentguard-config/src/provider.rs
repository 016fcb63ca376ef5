use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Provider type names accepted in `provider.type`
pub const PROVIDER_TYPES: &[&str] = &["openai", "openai_compatible", "openrouter", "bedrock"];

/// Configuration for the upstream LLM provider
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// Provider protocol type, resolved through the provider registry
    #[serde(rename = "type", default)]
    pub provider_type: String,
    /// Base URL of the upstream API
    #[serde(default)]
    pub base_url: Option<Url>,
    /// API key sent as a bearer token
    #[serde(default)]
    pub api_key: Option<SecretString>,
    /// OpenRouter-specific settings
    #[serde(default)]
    pub openrouter: OpenRouterConfig,
    /// AWS Bedrock-specific settings
    #[serde(default)]
    pub bedrock: BedrockConfig,
}

/// OpenRouter settings, overriding the provider-level base URL and key
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OpenRouterConfig {
    #[serde(default)]
    pub base_url: Option<Url>,
    #[serde(default)]
    pub api_key: Option<SecretString>,
    /// Sent as `HTTP-Referer` for attribution
    #[serde(default)]
    pub referer: Option<String>,
    /// Sent as `X-Title` for attribution
    #[serde(default)]
    pub title: Option<String>,
}

/// AWS Bedrock settings
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BedrockConfig {
    /// AWS region, also used as the signing scope
    #[serde(default)]
    pub region: Option<String>,
    /// Runtime endpoint override
    #[serde(default)]
    pub endpoint: Option<Url>,
    /// Access key ID (optional, uses default credential chain if absent)
    #[serde(default)]
    pub access_key_id: Option<SecretString>,
    /// Secret access key
    #[serde(default)]
    pub secret_access_key: Option<SecretString>,
    /// Session token for temporary credentials
    #[serde(default)]
    pub session_token: Option<SecretString>,
}
