//! Client construction from configuration.

use crate::config::{LlmConfig, WordlinkConfig};
use crate::llm::{LlmHttpConfig, OpenAiClient};

/// Builds HTTP configuration from LLM config with environment overrides.
#[must_use]
pub fn build_http_config(llm_config: &LlmConfig) -> LlmHttpConfig {
    LlmHttpConfig::from_config(llm_config).with_env_overrides()
}

/// Builds an `OpenAI` client from configuration.
///
/// Only the settings decide the credentials. Environment variables reach
/// them through [`WordlinkConfig::with_env_overrides`]; a blank token leaves
/// the client without one so the request fails before it is sent.
#[must_use]
pub fn build_openai_client(config: &WordlinkConfig) -> OpenAiClient {
    let mut client = if config.settings.has_token() {
        OpenAiClient::new().with_secret_api_key(config.settings.api_token.clone())
    } else {
        OpenAiClient::new().without_api_key()
    };
    client = client.with_organization(config.settings.organization_id.clone());
    if let Some(ref model) = config.llm.model {
        client = client.with_model(model);
    }
    if let Some(ref base_url) = config.llm.base_url {
        client = client.with_endpoint(base_url);
    }
    tracing::debug!(model = client.model(), "Built OpenAI client");
    client.with_http_config(build_http_config(&config.llm))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    #[test]
    fn test_model_from_config() {
        let mut config = WordlinkConfig::default();
        config.llm.model = Some("gpt-4o-mini".to_string());
        assert_eq!(build_openai_client(&config).model(), "gpt-4o-mini");
    }

    #[test]
    fn test_missing_token_fails_locally() {
        let config = WordlinkConfig::default();
        let client = build_openai_client(&config);
        assert!(!client.has_api_key());
    }

    #[test]
    fn test_token_from_settings() {
        let mut config = WordlinkConfig::default();
        config.settings.api_token = SecretString::from("sk-test".to_string());
        assert!(build_openai_client(&config).has_api_key());
    }
}
