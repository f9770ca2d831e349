//! Provider settings, loaded once at process start and never mutated afterwards.
//!
//! Values come from an optional TOML file and are then overridden by the
//! environment (`LLM_PROVIDER`, `<PROVIDER>_API_KEY`, `<PROVIDER>_BASE_URL`,
//! `<PROVIDER>_MODEL`). A missing key for the selected provider is a startup
//! error, not a per-request one.
//!
//! ```toml
//! provider = "DEEPSEEK"
//!
//! [deepseek]
//! api_key = "sk-..."
//! model = "deepseek-chat"
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::provider::Provider;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unsupported provider '{0}'")]
    UnsupportedProvider(String),

    #[error("no API key configured for selected provider {0} (set {0}_API_KEY)")]
    MissingApiKey(Provider),
}

/// Connection details for one provider.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

impl fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct LlmSettings {
    /// Provider used when a caller does not name one.
    pub provider: Provider,
    /// Only providers with an API key appear here.
    pub providers: BTreeMap<Provider, ProviderSettings>,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    provider: Option<String>,
    #[serde(flatten)]
    sections: BTreeMap<String, ProviderSection>,
}

#[derive(Debug, Default, Deserialize)]
struct ProviderSection {
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
}

impl LlmSettings {
    /// Load from an optional TOML file plus the process environment.
    pub fn load(config_path: Option<&Path>) -> Result<Self, SettingsError> {
        let contents = match config_path {
            Some(path) => Some(std::fs::read_to_string(path).map_err(|source| {
                SettingsError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            })?),
            None => None,
        };
        Self::from_sources(contents.as_deref(), |key| std::env::var(key).ok())
    }

    /// Build settings from TOML text (if any) and a variable lookup.
    pub fn from_sources<F>(file: Option<&str>, lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let parsed: SettingsFile = match file {
            Some(text) => toml::from_str(text)?,
            None => SettingsFile::default(),
        };

        let mut sections = BTreeMap::new();
        for (name, section) in parsed.sections {
            let provider: Provider = name
                .parse()
                .map_err(|_| SettingsError::UnsupportedProvider(name.clone()))?;
            sections.insert(provider, section);
        }

        let provider_name = lookup("LLM_PROVIDER")
            .filter(|v| !v.trim().is_empty())
            .or(parsed.provider)
            .unwrap_or_else(|| Provider::OpenAi.as_str().to_string());
        let provider: Provider = provider_name
            .parse()
            .map_err(|_| SettingsError::UnsupportedProvider(provider_name.clone()))?;

        let mut providers = BTreeMap::new();
        for candidate in Provider::ALL {
            let section = sections.remove(&candidate).unwrap_or_default();
            let env = |suffix: &str| {
                lookup(&format!("{}_{}", candidate.as_str(), suffix)).filter(|v| !v.trim().is_empty())
            };

            let Some(api_key) = env("API_KEY").or(section.api_key) else {
                continue;
            };
            let base_url = env("BASE_URL")
                .or(section.base_url)
                .unwrap_or_else(|| candidate.default_base_url().to_string());
            let model = env("MODEL")
                .or(section.model)
                .unwrap_or_else(|| candidate.default_model().to_string());

            providers.insert(
                candidate,
                ProviderSettings {
                    api_key,
                    base_url: base_url.trim_end_matches('/').to_string(),
                    model,
                },
            );
        }

        if !providers.contains_key(&provider) {
            return Err(SettingsError::MissingApiKey(provider));
        }

        info!(
            "LLM provider {} selected ({} provider(s) configured)",
            provider,
            providers.len()
        );

        Ok(Self {
            provider,
            providers,
        })
    }

    pub fn provider_settings(&self, provider: Provider) -> Option<&ProviderSettings> {
        self.providers.get(&provider)
    }
}
