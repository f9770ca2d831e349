//! Wordpack AI - LLM integration for vocabulary learning content
//!
//! This crate provides:
//! - Provider settings loaded once at startup (TOML file + environment)
//! - A uniform chat client over several remote providers (blocking and streamed)
//! - Provider selection by configured name
//! - Prompt template rendering
//! - Best-effort normalization of model text into JSON

pub mod client;
pub mod normalize;
pub mod prompt;
pub mod provider;
pub mod settings;
pub mod sse;

pub use client::{ChatClient, ChatMessage, LlmError, Role};
pub use normalize::normalize;
pub use prompt::{render, PromptParams, PromptTemplate};
pub use provider::{ClientFactory, Provider, ProviderSelector};
pub use settings::{LlmSettings, ProviderSettings, SettingsError};
