//! `OpenAI` chat-completions client.

use super::{ChatMessage, LlmHttpConfig, LlmProvider, build_http_client};
use crate::{Error, Result};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// `OpenAI` LLM client.
pub struct OpenAiClient {
    /// API key.
    api_key: Option<SecretString>,
    /// Organization sent as `OpenAI-Organization`.
    organization: Option<String>,
    /// API endpoint.
    endpoint: String,
    /// Model to use.
    model: String,
    /// HTTP client.
    client: reqwest::blocking::Client,
}

impl OpenAiClient {
    /// Default API endpoint.
    pub const DEFAULT_ENDPOINT: &'static str = "https://api.openai.com/v1";

    /// Default model.
    pub const DEFAULT_MODEL: &'static str = "gpt-3.5-turbo";

    /// Creates a new `OpenAI` client.
    ///
    /// Picks up `OPENAI_API_KEY` and `OPENAI_ORGANIZATION` when they are set.
    #[must_use]
    pub fn new() -> Self {
        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .map(SecretString::from);
        let organization = std::env::var("OPENAI_ORGANIZATION")
            .ok()
            .filter(|org| !org.trim().is_empty());
        Self {
            api_key,
            organization,
            endpoint: Self::DEFAULT_ENDPOINT.to_string(),
            model: Self::DEFAULT_MODEL.to_string(),
            client: build_http_client(LlmHttpConfig::default()),
        }
    }

    /// Sets the API key.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::from(key.into()));
        self
    }

    /// Sets the API key from an already wrapped secret.
    #[must_use]
    pub fn with_secret_api_key(mut self, key: SecretString) -> Self {
        self.api_key = Some(key);
        self
    }

    /// Clears the API key.
    #[must_use]
    pub fn without_api_key(mut self) -> Self {
        self.api_key = None;
        self
    }

    /// Sets the organization identifier.
    #[must_use]
    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        let organization = organization.into();
        self.organization = (!organization.trim().is_empty()).then_some(organization);
        self
    }

    /// Sets the API endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Rebuilds the HTTP client with the given timeouts.
    #[must_use]
    pub fn with_http_config(mut self, config: LlmHttpConfig) -> Self {
        self.client = build_http_client(config);
        self
    }

    /// The configured model.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Whether a non-blank API key is set.
    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.validate().is_ok()
    }

    /// Validates that the client is configured.
    ///
    /// A missing token is reported the same way the service would report it:
    /// as a failed request.
    fn validate(&self) -> Result<&SecretString> {
        match &self.api_key {
            Some(key) if !key.expose_secret().trim().is_empty() => Ok(key),
            _ => Err(Error::NetworkFailure {
                operation: "openai_request".to_string(),
                cause: "API token not set".to_string(),
            }),
        }
    }

    /// Sends one chat-completion request and returns the first choice.
    pub(crate) fn request(&self, messages: Vec<ChatMessage>) -> Result<String> {
        let api_key = self.validate()?;

        let span = tracing::info_span!(
            "llm.request",
            provider = "openai",
            model = %self.model,
            messages = messages.len(),
            status = tracing::field::Empty,
        );
        let _enter = span.enter();

        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages,
        };

        let mut builder = self
            .client
            .post(format!("{}/chat/completions", self.endpoint))
            .bearer_auth(api_key.expose_secret())
            .json(&request);
        if let Some(organization) = &self.organization {
            builder = builder.header("OpenAI-Organization", organization);
        }

        let response = builder.send().map_err(|e| Error::NetworkFailure {
            operation: "openai_request".to_string(),
            cause: e.to_string(),
        })?;

        let status = response.status();
        span.record("status", status.as_u16());
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(Error::NetworkFailure {
                operation: "openai_request".to_string(),
                cause: format!("API returned status: {status} - {body}"),
            });
        }

        let response: ChatCompletionResponse =
            response.json().map_err(|e| Error::NetworkFailure {
                operation: "openai_response".to_string(),
                cause: e.to_string(),
            })?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| Error::NetworkFailure {
                operation: "openai_response".to_string(),
                cause: "No choices in response".to_string(),
            })?;

        tracing::debug!(chars = content.len(), "Received completion");
        Ok(content)
    }
}

impl Default for OpenAiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl LlmProvider for OpenAiClient {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn complete(&self, prompt: &str) -> Result<String> {
        self.request(vec![ChatMessage::user(prompt)])
    }

    fn complete_with_system(&self, system: &str, user: &str) -> Result<String> {
        self.request(vec![ChatMessage::system(system), ChatMessage::user(user)])
    }
}

/// Request to the Chat Completions API.
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

/// Response from the Chat Completions API.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

/// A choice in the response.
#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

/// Message of a choice; `content` is null for refusals and tool calls.
#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}
