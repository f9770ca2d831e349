//! Request and response payloads.

use serde::{Deserialize, Serialize};

use crate::params::QuestionDifficulty;

/// Passage generation input. Parameters are free text and resolve to their
/// enumerated values (or defaults) inside the service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub words: Vec<String>,
    #[serde(default)]
    pub article_type: Option<String>,
    #[serde(default)]
    pub difficulty_level: Option<String>,
    #[serde(default)]
    pub tone_style: Option<String>,
    #[serde(default)]
    pub article_length: Option<String>,
    #[serde(default)]
    pub custom_word_count: Option<i64>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub sentence_complexity: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplanationRequest {
    pub words: Vec<String>,
    pub passage: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionRequest {
    pub words: Vec<String>,
    pub passage: String,
    #[serde(default)]
    pub difficulty: QuestionDifficulty,
}

/// A generated passage. Word counts stay strings on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedPassage {
    pub article: String,
    pub word_count: String,
    pub article_type: String,
    pub difficulty_level: String,
    pub tone_style: String,
    pub topic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguagePoint {
    pub word: String,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplanationResult {
    pub language_points: Vec<LanguagePoint>,
    pub translation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(non_snake_case)]
pub struct QuestionOption {
    pub A: String,
    pub B: String,
    pub C: String,
    pub D: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionExplanation {
    pub chinese_exp: String,
    pub english_exp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionItem {
    pub question: String,
    pub answer: String,
    pub option: QuestionOption,
    pub explanation: QuestionExplanation,
}

/// Result of an image upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageResult {
    pub image_path: String,
    pub words: Vec<String>,
}
