//! AWS credential sources for request signing

use std::sync::Arc;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::provider::{ProvideCredentials, SharedCredentialsProvider};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

/// Credentials used for one signing operation
#[derive(Debug, Clone)]
pub struct Credentials {
    access_key_id: String,
    secret_access_key: SecretString,
    session_token: Option<SecretString>,
}

impl Credentials {
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        session_token: Option<String>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: SecretString::from(secret_access_key.into()),
            session_token: session_token.filter(|t| !t.is_empty()).map(SecretString::from),
        }
    }

    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    pub const fn secret_access_key(&self) -> &SecretString {
        &self.secret_access_key
    }

    pub const fn session_token(&self) -> Option<&SecretString> {
        self.session_token.as_ref()
    }
}

/// Failure to obtain credentials
#[derive(Debug, Error)]
#[error("{0}")]
pub struct CredentialError(String);

impl From<String> for CredentialError {
    fn from(message: String) -> Self {
        Self(message)
    }
}

/// Source of credentials, consulted before every signed request
#[async_trait]
pub trait CredentialSource: Send + Sync {
    async fn retrieve(&self) -> Result<Credentials, CredentialError>;
}

/// Credentials backed by the AWS SDK provider chain
///
/// Refreshing and caching of temporary credentials is handled by the
/// underlying provider.
pub struct AwsCredentialSource {
    provider: SharedCredentialsProvider,
}

impl AwsCredentialSource {
    pub const fn new(provider: SharedCredentialsProvider) -> Self {
        Self { provider }
    }

    /// Fixed keys from configuration
    pub fn from_static(
        access_key_id: &SecretString,
        secret_access_key: &SecretString,
        session_token: Option<&SecretString>,
    ) -> Self {
        let credentials = aws_credential_types::Credentials::new(
            access_key_id.expose_secret(),
            secret_access_key.expose_secret(),
            session_token
                .map(|t| t.expose_secret().to_owned())
                .filter(|t| !t.is_empty()),
            None,
            "agentguard-config",
        );

        Self::new(SharedCredentialsProvider::new(credentials))
    }

    /// The default chain: environment, shared profile, web identity,
    /// container and instance metadata
    pub async fn from_default_chain(region: &str) -> Result<Self, CredentialError> {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_owned()))
            .load()
            .await;

        let provider = sdk_config
            .credentials_provider()
            .ok_or_else(|| CredentialError("no aws credentials provider available".to_owned()))?;

        Ok(Self::new(provider))
    }
}

#[async_trait]
impl CredentialSource for AwsCredentialSource {
    async fn retrieve(&self) -> Result<Credentials, CredentialError> {
        let credentials = self
            .provider
            .provide_credentials()
            .await
            .map_err(|e| CredentialError(e.to_string()))?;

        Ok(Credentials::new(
            credentials.access_key_id(),
            credentials.secret_access_key(),
            credentials.session_token().map(str::to_owned),
        ))
    }
}

/// Fixed credentials handed out as-is
#[cfg(test)]
pub(crate) struct StaticCredentials(Credentials);

#[cfg(test)]
impl StaticCredentials {
    pub(crate) const fn new(credentials: Credentials) -> Self {
        Self(credentials)
    }
}

#[cfg(test)]
#[async_trait]
impl CredentialSource for StaticCredentials {
    async fn retrieve(&self) -> Result<Credentials, CredentialError> {
        Ok(self.0.clone())
    }
}

/// Shared handle to a credential source
pub type SharedCredentialSource = Arc<dyn CredentialSource>;
