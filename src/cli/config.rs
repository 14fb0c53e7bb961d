//! Config command rendering.

use crate::config::WordlinkConfig;
use secrecy::ExposeSecret;

/// Renders the effective configuration with the API token redacted.
#[must_use]
pub fn render_config(config: &WordlinkConfig) -> String {
    let token = config.settings.api_token.expose_secret();
    let token = if token.trim().is_empty() {
        "(not set)".to_string()
    } else {
        redact(token)
    };
    let organization = if config.settings.organization_id.trim().is_empty() {
        "(not set)"
    } else {
        config.settings.organization_id.as_str()
    };
    let source = config
        .source
        .as_ref()
        .map_or_else(|| "(defaults)".to_string(), |p| p.display().to_string());

    [
        "Current Configuration".to_string(),
        "=====================".to_string(),
        format!("Source: {source}"),
        String::new(),
        "Settings:".to_string(),
        format!("  API Token: {token}"),
        format!("  Organization: {organization}"),
        String::new(),
        "LLM:".to_string(),
        format!(
            "  Model: {}",
            config.llm.model.as_deref().unwrap_or("(default)")
        ),
        format!(
            "  Base URL: {}",
            config.llm.base_url.as_deref().unwrap_or("(default)")
        ),
        String::new(),
        "Sampler:".to_string(),
        format!("  Subset Size: {}", config.sampler.subset_size),
        format!(
            "  Excluded Prefixes: {}",
            config.sampler.excluded_prefixes.join(", ")
        ),
        String::new(),
        format!("Association Mode: {}", config.association.mode.as_str()),
    ]
    .join("\n")
}

/// Keeps the last four characters of a token.
fn redact(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{tail}")
}
