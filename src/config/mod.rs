//! Configuration management.
//!
//! Configuration comes from a TOML file with environment overrides on top.
//! The `[settings]` table holds the two persisted user settings (API token
//! and organization); everything else tunes the pipelines.

use crate::{Error, Result};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration for wordlink.
#[derive(Debug, Clone, Default)]
pub struct WordlinkConfig {
    /// Persisted user settings.
    pub settings: Settings,
    /// LLM provider configuration.
    pub llm: LlmConfig,
    /// Candidate sampling.
    pub sampler: SamplerConfig,
    /// Association run behavior.
    pub association: AssociationConfig,
    /// Logging output.
    pub logging: LoggingSettings,
    /// File this configuration was loaded from, if any.
    pub source: Option<PathBuf>,
}

/// The persisted user settings: API token and organization identifier.
///
/// Both are read-only while a pipeline runs and change only through
/// [`Settings::save`].
#[derive(Debug, Clone)]
pub struct Settings {
    /// Bearer token for the text-generation service.
    pub api_token: SecretString,
    /// Organization identifier sent with each request.
    pub organization_id: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_token: SecretString::from(String::new()),
            organization_id: String::new(),
        }
    }
}

impl Settings {
    /// Whether a non-blank token is configured.
    #[must_use]
    pub fn has_token(&self) -> bool {
        !self.api_token.expose_secret().trim().is_empty()
    }

    /// Writes these settings into the `[settings]` table of `path`.
    ///
    /// Other tables in the file are preserved. The file and its parent
    /// directories are created when missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or written.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut document = if path.exists() {
            let contents = std::fs::read_to_string(path).map_err(|e| Error::OperationFailed {
                operation: "read_config_file".to_string(),
                cause: e.to_string(),
            })?;
            toml::from_str::<toml::Table>(&contents).map_err(|e| Error::OperationFailed {
                operation: "parse_config_file".to_string(),
                cause: e.to_string(),
            })?
        } else {
            toml::Table::new()
        };

        let mut table = toml::Table::new();
        table.insert(
            "api_token".to_string(),
            toml::Value::String(self.api_token.expose_secret().to_string()),
        );
        table.insert(
            "organization_id".to_string(),
            toml::Value::String(self.organization_id.clone()),
        );
        document.insert("settings".to_string(), toml::Value::Table(table));

        let contents = toml::to_string(&document).map_err(|e| Error::OperationFailed {
            operation: "serialize_config_file".to_string(),
            cause: e.to_string(),
        })?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| Error::OperationFailed {
                    operation: "create_config_dir".to_string(),
                    cause: e.to_string(),
                })?;
            }
        }
        std::fs::write(path, contents).map_err(|e| Error::OperationFailed {
            operation: "write_config_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;

        tracing::info!(path = %path.display(), "Saved settings");
        Ok(())
    }
}

/// LLM provider configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LlmConfig {
    /// Model name.
    pub model: Option<String>,
    /// Base URL of the chat-completions API.
    pub base_url: Option<String>,
    /// Request timeout in milliseconds.
    pub timeout_ms: Option<u64>,
    /// Connect timeout in milliseconds.
    pub connect_timeout_ms: Option<u64>,
}

/// Candidate sampling configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplerConfig {
    /// Notes drawn per association run, before exclusions.
    pub subset_size: usize,
    /// Name prefixes that are never sent as candidates.
    pub excluded_prefixes: Vec<String>,
}

impl SamplerConfig {
    /// Notes drawn per run.
    pub const DEFAULT_SUBSET_SIZE: usize = 20;

    /// Screenshot, pasted-image and untitled-note naming conventions.
    pub const DEFAULT_EXCLUDED_PREFIXES: [&'static str; 3] = ["PNG", "Screenshot", "Untitled"];

    /// Sets the subset size.
    #[must_use]
    pub const fn with_subset_size(mut self, subset_size: usize) -> Self {
        self.subset_size = subset_size;
        self
    }
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            subset_size: Self::DEFAULT_SUBSET_SIZE,
            excluded_prefixes: Self::DEFAULT_EXCLUDED_PREFIXES
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

/// How association runs ask and what they show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssociationMode {
    /// One sentence per candidate, returned as a JSON object.
    #[default]
    Sentences,
    /// One sentence with the single best candidate, shown as plain text.
    BestMatch,
}

impl AssociationMode {
    /// Parses a mode string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "sentences" | "json" => Some(Self::Sentences),
            "best-match" | "best_match" | "bestmatch" => Some(Self::BestMatch),
            _ => None,
        }
    }

    /// Returns the canonical name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sentences => "sentences",
            Self::BestMatch => "best-match",
        }
    }
}

/// Association run configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssociationConfig {
    /// Request and display mode.
    pub mode: AssociationMode,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable output.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// Parses a format name, ignoring case.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Some(Self::Pretty),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Logging configuration from the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Output format.
    pub format: LogFormat,
    /// Append logs to this file instead of stderr.
    pub file: Option<PathBuf>,
    /// Filter directive, such as `wordlink=debug`.
    pub filter: Option<String>,
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    /// Persisted settings.
    pub settings: Option<ConfigFileSettings>,
    /// LLM configuration.
    pub llm: Option<ConfigFileLlm>,
    /// Sampler configuration.
    pub sampler: Option<ConfigFileSampler>,
    /// Association configuration.
    pub association: Option<ConfigFileAssociation>,
    /// Logging configuration.
    pub logging: Option<ConfigFileLogging>,
}

/// Settings section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileSettings {
    /// API token.
    pub api_token: Option<String>,
    /// Organization identifier.
    pub organization_id: Option<String>,
}

/// LLM section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileLlm {
    /// Model name.
    pub model: Option<String>,
    /// Base URL.
    pub base_url: Option<String>,
    /// Request timeout.
    pub timeout_ms: Option<u64>,
    /// Connect timeout.
    pub connect_timeout_ms: Option<u64>,
}

/// Sampler section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileSampler {
    /// Subset size.
    pub subset_size: Option<usize>,
    /// Excluded name prefixes.
    pub excluded_prefixes: Option<Vec<String>>,
}

/// Association section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileAssociation {
    /// Mode name.
    pub mode: Option<String>,
}

/// Logging section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileLogging {
    /// `pretty` or `json`.
    pub format: Option<String>,
    /// Log file path.
    pub file: Option<String>,
    /// Filter directive.
    pub filter: Option<String>,
}

impl WordlinkConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid configuration.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(contents).map_err(|e| Error::OperationFailed {
            operation: "parse_config_file".to_string(),
            cause: e.to_string(),
        })?;
        Self::from_config_file(file)
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::OperationFailed {
            operation: "read_config_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;

        let mut config = Self::from_toml(&contents)?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// Loads configuration from the default location.
    ///
    /// Returns default configuration if there is no config directory or no
    /// file at the default path.
    ///
    /// # Errors
    ///
    /// Returns an error if a file exists at the default path but cannot be
    /// read or parsed.
    pub fn load_default() -> Result<Self> {
        Self::load_or_default(Self::default_path().as_deref())
    }

    /// Loads `path` if it exists, otherwise returns defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) if path.exists() => Self::load_from_file(path),
            _ => Ok(Self::default()),
        }
    }

    /// Platform config path, such as `~/.config/wordlink/config.toml`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        let dirs = directories::BaseDirs::new()?;
        Some(dirs.config_dir().join("wordlink").join("config.toml"))
    }

    /// Path settings are saved to: the source file, else the default path.
    #[must_use]
    pub fn settings_path(&self) -> Option<PathBuf> {
        self.source.clone().or_else(Self::default_path)
    }

    /// Converts a `ConfigFile` to `WordlinkConfig`.
    fn from_config_file(file: ConfigFile) -> Result<Self> {
        let mut config = Self::default();

        if let Some(settings) = file.settings {
            if let Some(token) = settings.api_token {
                config.settings.api_token = SecretString::from(token);
            }
            if let Some(org) = settings.organization_id {
                config.settings.organization_id = org;
            }
        }
        if let Some(llm) = file.llm {
            config.llm = LlmConfig {
                model: llm.model,
                base_url: llm.base_url,
                timeout_ms: llm.timeout_ms,
                connect_timeout_ms: llm.connect_timeout_ms,
            };
        }
        if let Some(sampler) = file.sampler {
            if let Some(size) = sampler.subset_size {
                config.sampler.subset_size = size;
            }
            if let Some(prefixes) = sampler.excluded_prefixes {
                config.sampler.excluded_prefixes = prefixes;
            }
        }
        if let Some(mode) = file.association.and_then(|a| a.mode) {
            config.association.mode = AssociationMode::parse(&mode).ok_or_else(|| {
                Error::InvalidInput(format!("unknown association mode '{mode}'"))
            })?;
        }
        if let Some(logging) = file.logging {
            if let Some(format) = logging.format {
                config.logging.format = LogFormat::parse(&format).ok_or_else(|| {
                    Error::InvalidInput(format!("unknown log format '{format}'"))
                })?;
            }
            config.logging.file = logging.file.map(PathBuf::from);
            config.logging.filter = logging.filter;
        }

        Ok(config)
    }

    /// Applies environment variable overrides.
    ///
    /// | Variable | Overrides |
    /// |----------|-----------|
    /// | `WORDLINK_API_TOKEN`, then `OPENAI_API_KEY` | `settings.api_token` |
    /// | `WORDLINK_ORGANIZATION_ID`, then `OPENAI_ORGANIZATION` | `settings.organization_id` |
    /// | `WORDLINK_MODEL` | `llm.model` |
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(token) =
            env_non_empty("WORDLINK_API_TOKEN").or_else(|| env_non_empty("OPENAI_API_KEY"))
        {
            self.settings.api_token = SecretString::from(token);
        }
        if let Some(org) =
            env_non_empty("WORDLINK_ORGANIZATION_ID").or_else(|| env_non_empty("OPENAI_ORGANIZATION"))
        {
            self.settings.organization_id = org;
        }
        if let Some(model) = env_non_empty("WORDLINK_MODEL") {
            self.llm.model = Some(model);
        }
        self
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
