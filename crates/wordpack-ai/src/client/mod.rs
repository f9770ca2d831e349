//! Chat clients for the supported providers.
//!
//! Every client owns a [`Conversation`] that only ever grows: the system
//! prompt, each user turn and each assistant reply are appended in order and
//! the full history is sent with every call.

pub mod anthropic;
pub mod gemini;
pub mod openai;

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::provider::Provider;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("{provider} API error ({status}): {body}")]
    Provider {
        provider: Provider,
        status: u16,
        body: String,
    },

    #[error("{provider} request failed: {source}")]
    Transport {
        provider: Provider,
        #[source]
        source: reqwest::Error,
    },

    #[error("Not supported provider: {0}")]
    UnsupportedProvider(String),

    #[error("provider {0} is not configured")]
    NotConfigured(Provider),

    #[error("No response from {0}")]
    EmptyResponse(Provider),

    #[error("unexpected response from {provider}: {message}")]
    InvalidResponse { provider: Provider, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Append-only message history held by one client.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn extend(&mut self, entries: impl IntoIterator<Item = ChatMessage>) {
        self.messages.extend(entries);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }
}

/// Incrementally delivered assistant text.
pub type TextStream = BoxStream<'static, String>;

/// Uniform contract over the remote text-generation backends.
#[async_trait]
pub trait ChatClient: Send {
    fn provider(&self) -> Provider;

    fn history(&self) -> &[ChatMessage];

    /// Bulk-append entries without calling the provider.
    fn append_history(&mut self, entries: Vec<ChatMessage>);

    fn set_system_prompt(&mut self, text: &str) {
        self.append_history(vec![ChatMessage::system(text)]);
    }

    /// Send `user_text` with the whole history and return the reply.
    ///
    /// The user entry and the reply are both appended to the history.
    async fn exchange(&mut self, user_text: &str) -> Result<String, LlmError>;

    /// Like [`ChatClient::exchange`], but the reply arrives as fragments.
    ///
    /// Only the user entry is recorded; callers that want the reply kept
    /// append the assembled text with [`ChatClient::append_history`].
    async fn exchange_streamed(&mut self, user_text: &str) -> Result<TextStream, LlmError>;
}

/// Send a prepared request and turn non-success statuses into [`LlmError::Provider`].
pub(crate) async fn send_checked(
    provider: Provider,
    request: reqwest::RequestBuilder,
) -> Result<reqwest::Response, LlmError> {
    let response = request
        .send()
        .await
        .map_err(|source| LlmError::Transport { provider, source })?;

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|source| LlmError::Transport { provider, source })?;
        return Err(LlmError::Provider {
            provider,
            status,
            body,
        });
    }

    Ok(response)
}

/// Decode a success body into `T`, reporting shape mismatches as [`LlmError::InvalidResponse`].
pub(crate) async fn decode_json<T: serde::de::DeserializeOwned>(
    provider: Provider,
    response: reqwest::Response,
) -> Result<T, LlmError> {
    let body = response
        .text()
        .await
        .map_err(|source| LlmError::Transport { provider, source })?;
    serde_json::from_str(&body).map_err(|e| LlmError::InvalidResponse {
        provider,
        message: e.to_string(),
    })
}
