use std::path::Path;

use secrecy::{ExposeSecret, SecretString};

use crate::Config;
use crate::provider::PROVIDER_TYPES;

impl Config {
    /// Load and validate configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let config = Self::read(path)?;
        config.validate()?;

        Ok(config)
    }

    /// Read a TOML file without validating it
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes the result. Callers applying command-line overrides
    /// must call [`Config::validate`] afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, expansion fails or
    /// TOML parsing fails
    pub fn read(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        let config = Self::from_toml(&raw)?;
        tracing::debug!(path = %path.display(), provider = %config.provider.provider_type, "configuration loaded");

        Ok(config)
    }

    /// Expand, deserialize and validate raw TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if expansion, parsing or validation fails
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let config = Self::from_toml(raw)?;
        config.validate()?;

        Ok(config)
    }

    fn from_toml(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error if the listen address or provider settings are
    /// missing or inconsistent
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.listen_address.is_none() {
            anyhow::bail!("server.listen_address is required");
        }

        self.validate_provider()
    }

    fn validate_provider(&self) -> anyhow::Result<()> {
        let provider = &self.provider;

        match provider.provider_type.as_str() {
            "" => anyhow::bail!("provider type is required"),
            "openai" | "openai_compatible" => {
                if provider.base_url.is_none() {
                    anyhow::bail!("provider base_url is required");
                }
            }
            "openrouter" => {
                if !is_set(provider.api_key.as_ref()) && !is_set(provider.openrouter.api_key.as_ref()) {
                    anyhow::bail!("openrouter api key is required");
                }
            }
            "bedrock" => {
                let bedrock = &provider.bedrock;
                if bedrock.region.as_deref().is_none_or(str::is_empty) {
                    anyhow::bail!("bedrock region is required");
                }

                match (is_set(bedrock.access_key_id.as_ref()), is_set(bedrock.secret_access_key.as_ref())) {
                    (true, false) => anyhow::bail!("bedrock secret_access_key is required when access_key_id is set"),
                    (false, true) => anyhow::bail!("bedrock access_key_id is required when secret_access_key is set"),
                    (false, false) if is_set(bedrock.session_token.as_ref()) => {
                        anyhow::bail!("bedrock session_token requires access_key_id and secret_access_key")
                    }
                    _ => {}
                }
            }
            other => anyhow::bail!(
                "unsupported provider type: {other} (expected one of: {})",
                PROVIDER_TYPES.join(", ")
            ),
        }

        Ok(())
    }
}

/// Whether an optional secret holds a non-empty value
fn is_set(secret: Option<&SecretString>) -> bool {
    secret.is_some_and(|s| !s.expose_secret().is_empty())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const OPENAI: &str = r#"
        [server]
        listen_address = "127.0.0.1:8080"

        [provider]
        type = "openai"
        base_url = "https://api.openai.com"
        api_key = "sk-test"

        [policy.models]
        allow = ["gpt-4o", "gpt-4o-mini"]
        deny = ["gpt-3.5*"]

        [policy.tools]
        allow = ["search_web"]
    "#;

    #[test]
    fn parse_valid_config() {
        let config = Config::parse(OPENAI).unwrap();

        assert_eq!(config.server.listen_address.unwrap().port(), 8080);
        assert_eq!(config.provider.provider_type, "openai");
        assert_eq!(config.provider.base_url.as_ref().unwrap().host_str(), Some("api.openai.com"));
        assert_eq!(config.provider.api_key.as_ref().unwrap().expose_secret(), "sk-test");
        assert_eq!(config.policy.models.allow.len(), 2);
        assert_eq!(config.policy.models.deny, vec!["gpt-3.5*"]);
        assert_eq!(config.policy.tools.allow, vec!["search_web"]);
        assert!(config.telemetry.is_none());
    }

    #[test]
    fn load_from_file_with_env_injection() {
        let mut file = std::env::temp_dir();
        file.push(format!("agentguard-config-{}.toml", std::process::id()));
        let mut handle = std::fs::File::create(&file).unwrap();
        handle
            .write_all(
                br#"
                [server]
                listen_address = "127.0.0.1:9000"

                [provider]
                type = "openai_compatible"
                base_url = "http://localhost:11434"
                api_key = "{{ env.AG_TEST_API_KEY }}"
                "#,
            )
            .unwrap();

        temp_env::with_var("AG_TEST_API_KEY", Some("sk-from-env"), || {
            let config = Config::load(&file).unwrap();
            assert_eq!(config.provider.api_key.as_ref().unwrap().expose_secret(), "sk-from-env");
        });

        std::fs::remove_file(&file).ok();
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = Config::load(Path::new("/nonexistent/agentguard.toml")).unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }

    #[test]
    fn listen_address_is_required() {
        let err = Config::parse(
            r#"
            [provider]
            type = "openai"
            base_url = "https://api.openai.com"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("listen_address"));
    }

    #[test]
    fn read_defers_validation() {
        let mut file = std::env::temp_dir();
        file.push(format!("agentguard-config-read-{}.toml", std::process::id()));
        std::fs::write(&file, "[provider]\ntype = \"openai\"\nbase_url = \"https://api.openai.com\"\n").unwrap();

        let mut config = Config::read(&file).unwrap();
        assert!(config.validate().is_err());

        config.server.listen_address = Some("127.0.0.1:7000".parse().unwrap());
        assert!(config.validate().is_ok());
        assert!(Config::load(&file).is_err());

        std::fs::remove_file(&file).ok();
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = Config::parse(&format!("{OPENAI}\n[extra]\nkey = 1\n")).unwrap_err();
        assert!(err.to_string().contains("failed to parse config"));
    }

    #[test]
    fn unsupported_provider_type() {
        let err = Config::parse(
            r#"
            [server]
            listen_address = "127.0.0.1:8080"

            [provider]
            type = "azure"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("unsupported provider type: azure"));
    }

    #[test]
    fn openai_requires_base_url() {
        let err = Config::parse(
            r#"
            [server]
            listen_address = "127.0.0.1:8080"

            [provider]
            type = "openai"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("base_url is required"));
    }

    #[test]
    fn openrouter_requires_api_key() {
        let base = r#"
            [server]
            listen_address = "127.0.0.1:8080"

            [provider]
            type = "openrouter"
        "#;
        let err = Config::parse(base).unwrap_err();
        assert!(err.to_string().contains("openrouter api key is required"));

        let with_section_key = format!("{base}\n[provider.openrouter]\napi_key = \"sk-or\"\ntitle = \"AgentGuard\"\n");
        let config = Config::parse(&with_section_key).unwrap();
        assert_eq!(config.provider.openrouter.title.as_deref(), Some("AgentGuard"));
    }

    #[test]
    fn bedrock_requires_region() {
        let err = Config::parse(
            r#"
            [server]
            listen_address = "127.0.0.1:8080"

            [provider]
            type = "bedrock"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("bedrock region is required"));
    }

    #[test]
    fn bedrock_static_credentials_must_be_paired() {
        let err = Config::parse(
            r#"
            [server]
            listen_address = "127.0.0.1:8080"

            [provider]
            type = "bedrock"

            [provider.bedrock]
            region = "us-east-1"
            access_key_id = "AKIDEXAMPLE"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("secret_access_key is required"));

        let config = Config::parse(
            r#"
            [server]
            listen_address = "127.0.0.1:8080"

            [provider]
            type = "bedrock"

            [provider.bedrock]
            region = "us-east-1"
            access_key_id = "AKIDEXAMPLE"
            secret_access_key = "secret"
            session_token = "token"
            "#,
        )
        .unwrap();
        assert_eq!(config.provider.bedrock.region.as_deref(), Some("us-east-1"));
        assert!(config.provider.bedrock.endpoint.is_none());
    }

    #[test]
    fn telemetry_defaults() {
        let config = Config::parse(&format!("{OPENAI}\n[telemetry]\nlog_format = \"json\"\n")).unwrap();
        let telemetry = config.telemetry.unwrap();

        assert_eq!(telemetry.service_name, "agentguard");
        assert_eq!(telemetry.filter, "info");
        assert_eq!(telemetry.log_format, crate::telemetry::LogFormat::Json);
        assert!(telemetry.exporter.is_none());
    }
}
