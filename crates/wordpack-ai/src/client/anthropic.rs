//! Anthropic messages wire shape.

use async_trait::async_trait;
use futures::future;
use futures::stream::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{
    decode_json, send_checked, ChatClient, ChatMessage, Conversation, LlmError, Role, TextStream,
};
use crate::provider::Provider;
use crate::settings::ProviderSettings;
use crate::sse;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 4096;

#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<AnthropicMessage<'a>>,
    stream: bool,
}

#[derive(Serialize)]
struct AnthropicMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    content: Vec<AnthropicContent>,
}

#[derive(Deserialize)]
struct AnthropicContent {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct StreamEvent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    delta: Option<StreamDelta>,
}

#[derive(Deserialize)]
struct StreamDelta {
    #[serde(default)]
    text: Option<String>,
}

fn frame_content(payload: &str) -> Option<String> {
    let event: StreamEvent = serde_json::from_str(payload).ok()?;
    if event.kind != "content_block_delta" {
        return None;
    }
    event.delta?.text.filter(|t| !t.is_empty())
}

#[derive(Debug)]
pub struct AnthropicClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    conversation: Conversation,
}

impl AnthropicClient {
    pub fn new(settings: &ProviderSettings, http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: settings.base_url.clone(),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            conversation: Conversation::default(),
        }
    }

    fn build_request(&self, stream: bool) -> AnthropicRequest<'_> {
        let messages = self.conversation.messages();
        let system: Vec<&str> = messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .collect();

        AnthropicRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            system: (!system.is_empty()).then(|| system.join("\n\n")),
            messages: messages
                .iter()
                .filter_map(|m| match m.role {
                    Role::System => None,
                    Role::User => Some(AnthropicMessage {
                        role: "user",
                        content: &m.content,
                    }),
                    Role::Assistant => Some(AnthropicMessage {
                        role: "assistant",
                        content: &m.content,
                    }),
                })
                .collect(),
            stream,
        }
    }

    async fn post(&self, stream: bool) -> Result<reqwest::Response, LlmError> {
        debug!("Calling Anthropic API with model: {}", self.model);

        let builder = self
            .http
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&self.build_request(stream));
        send_checked(Provider::Anthropic, builder).await
    }
}

#[async_trait]
impl ChatClient for AnthropicClient {
    fn provider(&self) -> Provider {
        Provider::Anthropic
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
        let response: AnthropicResponse = decode_json(Provider::Anthropic, response).await?;
        let content = response
            .content
            .into_iter()
            .find_map(|c| c.text)
            .ok_or(LlmError::EmptyResponse(Provider::Anthropic))?;

        info!("Received response from Anthropic");
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
