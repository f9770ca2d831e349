//! Chat-completions wire shape shared by OpenAI, DeepSeek and SiliconFlow.

use async_trait::async_trait;
use futures::future;
use futures::stream::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{decode_json, send_checked, ChatClient, ChatMessage, Conversation, LlmError, TextStream};
use crate::provider::Provider;
use crate::settings::ProviderSettings;
use crate::sse;

/// Endpoint path and sampling parameters sent by one provider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingProfile {
    pub path: &'static str,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub top_k: Option<u32>,
}

impl SamplingProfile {
    pub fn for_provider(provider: Provider) -> Self {
        match provider {
            Provider::DeepSeek => Self {
                path: "/chat/completions",
                max_tokens: Some(8192),
                temperature: Some(1.5),
                top_p: None,
                top_k: None,
            },
            Provider::SiliconFlow => Self {
                path: "/v1/chat/completions",
                max_tokens: Some(10240),
                temperature: Some(0.7),
                top_p: Some(0.7),
                top_k: Some(50),
            },
            _ => Self {
                path: "/chat/completions",
                max_tokens: None,
                temperature: None,
                top_p: None,
                top_k: None,
            },
        }
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: Delta,
}

#[derive(Deserialize, Default)]
struct Delta {
    #[serde(default)]
    content: Option<String>,
}

/// Extract the content fragment of one stream frame, if it has any.
fn frame_content(payload: &str) -> Option<String> {
    let chunk: StreamChunk = serde_json::from_str(payload).ok()?;
    chunk
        .choices
        .into_iter()
        .next()?
        .delta
        .content
        .filter(|c| !c.is_empty())
}

#[derive(Debug)]
pub struct ChatCompletionsClient {
    provider: Provider,
    http: reqwest::Client,
    url: String,
    api_key: String,
    model: String,
    profile: SamplingProfile,
    conversation: Conversation,
}

impl ChatCompletionsClient {
    pub fn new(provider: Provider, settings: &ProviderSettings, http: reqwest::Client) -> Self {
        let profile = SamplingProfile::for_provider(provider);
        Self {
            provider,
            http,
            url: format!("{}{}", settings.base_url, profile.path),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            profile,
            conversation: Conversation::default(),
        }
    }

    async fn post(&self, stream: bool) -> Result<reqwest::Response, LlmError> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: self.conversation.messages(),
            stream,
            max_tokens: self.profile.max_tokens,
            temperature: self.profile.temperature,
            top_p: self.profile.top_p,
            top_k: self.profile.top_k,
        };

        debug!(
            "Calling {} chat completions at {} with model: {}",
            self.provider, self.url, self.model
        );

        let builder = self
            .http
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request);
        send_checked(self.provider, builder).await
    }
}

#[async_trait]
impl ChatClient for ChatCompletionsClient {
    fn provider(&self) -> Provider {
        self.provider
    }

    fn history(&self) -> &[ChatMessage] {
        self.conversation.messages()
    }

    fn append_history(&mut self, entries: Vec<ChatMessage>) {
        self.conversation.extend(entries);
    }

    async fn exchange(&mut self, user_text: &str) -> Result<String, LlmError> {
        self.conversation.push(ChatMessage::user(user_text));

        let response = self.post(false).await?;
        let response: ChatCompletionResponse = decode_json(self.provider, response).await?;
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(LlmError::EmptyResponse(self.provider))?;

        info!("Received response from {}", self.provider);
        self.conversation.push(ChatMessage::assistant(content.clone()));
        Ok(content)
    }

    async fn exchange_streamed(&mut self, user_text: &str) -> Result<TextStream, LlmError> {
        self.conversation.push(ChatMessage::user(user_text));

        let response = self.post(true).await?;
        let fragments = sse::data_frames(response.bytes_stream())
            .filter_map(|payload| future::ready(frame_content(&payload)));
        Ok(fragments.boxed())
    }
}
