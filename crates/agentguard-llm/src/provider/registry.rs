//! Lookup from configured provider type names to adapter constructors

use std::sync::Arc;

use agentguard_config::ProviderConfig;
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use indexmap::IndexMap;
use secrecy::{ExposeSecret, SecretString};

use super::Provider;
use super::bedrock::BedrockProvider;
use super::credentials::{AwsCredentialSource, SharedCredentialSource};
use super::openai::OpenAiProvider;
use super::openrouter::OpenRouterProvider;
use crate::error::LlmError;

/// Constructor for one provider type
pub type ProviderFactory = fn(&ProviderConfig) -> BoxFuture<'_, Result<Arc<dyn Provider>, LlmError>>;

/// Read-only table of provider constructors keyed by type name
pub struct ProviderRegistry {
    factories: IndexMap<&'static str, ProviderFactory>,
}

impl ProviderRegistry {
    /// Every built-in adapter under its configuration type name
    pub fn builtin() -> Self {
        let factories = IndexMap::from([
            ("openai_compatible", openai as ProviderFactory),
            ("openai", openai),
            ("openrouter", openrouter),
            ("bedrock", bedrock),
        ]);

        Self { factories }
    }

    /// Registered type names in registration order
    pub fn types(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.factories.keys().copied()
    }

    /// Construct the adapter selected by `config.provider_type`
    ///
    /// # Errors
    ///
    /// Returns `LlmError::UnsupportedProvider` for unknown type names, or
    /// the constructor's own error.
    pub async fn create(&self, config: &ProviderConfig) -> Result<Arc<dyn Provider>, LlmError> {
        let Some(factory) = self.factories.get(config.provider_type.as_str()) else {
            tracing::error!(
                provider_type = %config.provider_type,
                supported = ?self.types().collect::<Vec<_>>(),
                "no adapter registered for provider type"
            );
            return Err(LlmError::UnsupportedProvider(config.provider_type.clone()));
        };

        let provider = factory(config).await?;
        tracing::info!(provider_type = %config.provider_type, provider = provider.name(), "provider initialized");

        Ok(provider)
    }
}

fn non_empty(secret: Option<&SecretString>) -> Option<&SecretString> {
    secret.filter(|s| !s.expose_secret().is_empty())
}

fn openai(config: &ProviderConfig) -> BoxFuture<'_, Result<Arc<dyn Provider>, LlmError>> {
    let result = config
        .base_url
        .as_ref()
        .ok_or_else(|| LlmError::InvalidConfig("provider base_url is required".to_owned()))
        .map(|base_url| {
            Arc::new(OpenAiProvider::new(base_url, non_empty(config.api_key.as_ref()).cloned())) as Arc<dyn Provider>
        });

    futures_util::future::ready(result).boxed()
}

fn openrouter(config: &ProviderConfig) -> BoxFuture<'_, Result<Arc<dyn Provider>, LlmError>> {
    let section = &config.openrouter;
    let base_url = section.base_url.as_ref().or(config.base_url.as_ref());
    let api_key = non_empty(section.api_key.as_ref()).or_else(|| non_empty(config.api_key.as_ref()));

    let result = match api_key {
        Some(api_key) => Ok(Arc::new(OpenRouterProvider::new(
            base_url,
            Some(api_key.clone()),
            section.referer.clone(),
            section.title.clone(),
        )) as Arc<dyn Provider>),
        None => Err(LlmError::InvalidConfig("openrouter api key is required".to_owned())),
    };

    futures_util::future::ready(result).boxed()
}

fn bedrock(config: &ProviderConfig) -> BoxFuture<'_, Result<Arc<dyn Provider>, LlmError>> {
    async move {
        let section = &config.bedrock;
        let region = section
            .region
            .as_deref()
            .filter(|r| !r.is_empty())
            .ok_or_else(|| LlmError::InvalidConfig("bedrock region is required".to_owned()))?;

        let access_key_id = non_empty(section.access_key_id.as_ref());
        let secret_access_key = non_empty(section.secret_access_key.as_ref());
        let session_token = non_empty(section.session_token.as_ref());

        let credentials: SharedCredentialSource = match (access_key_id, secret_access_key) {
            (Some(access_key_id), Some(secret_access_key)) => Arc::new(AwsCredentialSource::from_static(
                access_key_id,
                secret_access_key,
                session_token,
            )),
            (None, None) if session_token.is_none() => Arc::new(
                AwsCredentialSource::from_default_chain(region)
                    .await
                    .map_err(|e| LlmError::InvalidConfig(format!("loading aws config: {e}")))?,
            ),
            _ => {
                return Err(LlmError::InvalidConfig(
                    "bedrock access_key_id and secret_access_key must both be set".to_owned(),
                ));
            }
        };

        Ok(Arc::new(BedrockProvider::new(region, section.endpoint.as_ref(), credentials)) as Arc<dyn Provider>)
    }
    .boxed()
}
