//! Gemini `generateContent` wire shape.

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

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize, Deserialize, Default)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
    top_p: f32,
    top_k: u32,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

impl GenerateContentResponse {
    fn text(self) -> Option<String> {
        let candidate = self.candidates.into_iter().next()?;
        let text: String = candidate
            .content
            .parts
            .into_iter()
            .map(|p| p.text)
            .collect();
        // blocked candidates (finishReason SAFETY) carry no parts
        Some(text).filter(|t| !t.is_empty())
    }
}

fn frame_content(payload: &str) -> Option<String> {
    serde_json::from_str::<GenerateContentResponse>(payload)
        .ok()?
        .text()
}

/// Split the history into Gemini's separate system instruction and turns.
fn build_request(messages: &[ChatMessage]) -> GenerateContentRequest {
    let system: Vec<&str> = messages
        .iter()
        .filter(|m| m.role == Role::System)
        .map(|m| m.content.as_str())
        .collect();

    let contents = messages
        .iter()
        .filter(|m| m.role != Role::System)
        .map(|m| Content {
            role: Some(
                match m.role {
                    Role::Assistant => "model",
                    _ => "user",
                }
                .to_string(),
            ),
            parts: vec![Part {
                text: m.content.clone(),
            }],
        })
        .collect();

    GenerateContentRequest {
        system_instruction: (!system.is_empty()).then(|| Content {
            role: None,
            parts: vec![Part {
                text: system.join("\n\n"),
            }],
        }),
        contents,
        generation_config: GenerationConfig {
            temperature: 0.7,
            max_output_tokens: 8192,
            top_p: 0.95,
            top_k: 40,
        },
    }
}

#[derive(Debug)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    conversation: Conversation,
}

impl GeminiClient {
    pub fn new(settings: &ProviderSettings, http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: settings.base_url.clone(),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            conversation: Conversation::default(),
        }
    }

    async fn post(&self, method: &str) -> Result<reqwest::Response, LlmError> {
        let url = format!("{}/v1beta/models/{}:{}", self.base_url, self.model, method);
        debug!("Calling Gemini API at {}", url);

        let builder = self
            .http
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(&build_request(self.conversation.messages()));
        send_checked(Provider::Gemini, builder).await
    }
}

#[async_trait]
impl ChatClient for GeminiClient {
    fn provider(&self) -> Provider {
        Provider::Gemini
    }

    fn history(&self) -> &[ChatMessage] {
        self.conversation.messages()
    }

    fn append_history(&mut self, entries: Vec<ChatMessage>) {
        self.conversation.extend(entries);
    }

    async fn exchange(&mut self, user_text: &str) -> Result<String, LlmError> {
        self.conversation.push(ChatMessage::user(user_text));

        let response = self.post("generateContent").await?;
        let response: GenerateContentResponse = decode_json(Provider::Gemini, response).await?;
        let content = response
            .text()
            .ok_or(LlmError::EmptyResponse(Provider::Gemini))?;

        info!("Received response from Gemini");
        self.conversation.push(ChatMessage::assistant(content.clone()));
        Ok(content)
    }

    async fn exchange_streamed(&mut self, user_text: &str) -> Result<TextStream, LlmError> {
        self.conversation.push(ChatMessage::user(user_text));

        let response = self.post("streamGenerateContent?alt=sse").await?;
        let fragments = sse::data_frames(response.bytes_stream())
            .filter_map(|payload| future::ready(frame_content(&payload)));
        Ok(fragments.boxed())
    }
}
