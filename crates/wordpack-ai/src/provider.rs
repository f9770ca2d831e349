//! Provider identities and the factory that turns a configured name into a client.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::client::anthropic::AnthropicClient;
use crate::client::gemini::GeminiClient;
use crate::client::openai::ChatCompletionsClient;
use crate::client::{ChatClient, LlmError};
use crate::settings::LlmSettings;

/// Remote text-generation backends known to the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Provider {
    #[serde(rename = "OPENAI")]
    OpenAi,
    DeepSeek,
    SiliconFlow,
    Gemini,
    Anthropic,
}

impl Provider {
    pub const ALL: [Provider; 5] = [
        Provider::OpenAi,
        Provider::DeepSeek,
        Provider::SiliconFlow,
        Provider::Gemini,
        Provider::Anthropic,
    ];

    /// Configuration key, also used as the environment variable prefix.
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAi => "OPENAI",
            Provider::DeepSeek => "DEEPSEEK",
            Provider::SiliconFlow => "SILICONFLOW",
            Provider::Gemini => "GEMINI",
            Provider::Anthropic => "ANTHROPIC",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Provider::OpenAi => "https://api.openai.com/v1",
            Provider::DeepSeek => "https://api.deepseek.com",
            Provider::SiliconFlow => "https://api.siliconflow.cn",
            Provider::Gemini => "https://generativelanguage.googleapis.com",
            Provider::Anthropic => "https://api.anthropic.com",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::OpenAi => "gpt-4o-mini",
            Provider::DeepSeek => "deepseek-chat",
            Provider::SiliconFlow => "Qwen/QwQ-32B",
            Provider::Gemini => "gemini-2.0-flash",
            Provider::Anthropic => "claude-sonnet-4-20250514",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Provider::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| LlmError::UnsupportedProvider(wanted.to_string()))
    }
}

/// Source of fresh, single-request chat clients.
///
/// The learning service asks for one client per operation so that no
/// conversation state is shared between requests.
pub trait ClientFactory: Send + Sync {
    fn create_client(&self) -> Result<Box<dyn ChatClient>, LlmError>;
}

/// Builds clients from the immutable settings loaded at startup.
#[derive(Debug, Clone)]
pub struct ProviderSelector {
    settings: Arc<LlmSettings>,
    http: reqwest::Client,
}

impl ProviderSelector {
    pub fn new(settings: Arc<LlmSettings>) -> Self {
        Self {
            settings,
            http: reqwest::Client::new(),
        }
    }

    pub fn settings(&self) -> &LlmSettings {
        &self.settings
    }

    /// Create a client for the provider named `name`.
    ///
    /// Unknown names fail with [`LlmError::UnsupportedProvider`]; known
    /// providers without credentials fail with [`LlmError::NotConfigured`].
    /// Nothing is sent over the network here.
    pub fn create(&self, name: &str) -> Result<Box<dyn ChatClient>, LlmError> {
        let provider: Provider = name.parse()?;
        self.create_for(provider)
    }

    pub fn create_for(&self, provider: Provider) -> Result<Box<dyn ChatClient>, LlmError> {
        let settings = self
            .settings
            .provider_settings(provider)
            .ok_or(LlmError::NotConfigured(provider))?;

        debug!("Creating {} client with model {}", provider, settings.model);

        let client: Box<dyn ChatClient> = match provider {
            Provider::OpenAi | Provider::DeepSeek | Provider::SiliconFlow => Box::new(
                ChatCompletionsClient::new(provider, settings, self.http.clone()),
            ),
            Provider::Gemini => Box::new(GeminiClient::new(settings, self.http.clone())),
            Provider::Anthropic => Box::new(AnthropicClient::new(settings, self.http.clone())),
        };
        Ok(client)
    }

    /// Create a client for the provider selected in configuration.
    pub fn create_default(&self) -> Result<Box<dyn ChatClient>, LlmError> {
        self.create_for(self.settings.provider)
    }
}

impl ClientFactory for ProviderSelector {
    fn create_client(&self) -> Result<Box<dyn ChatClient>, LlmError> {
        self.create_default()
    }
}
