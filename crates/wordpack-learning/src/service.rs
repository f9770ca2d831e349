//! The learning orchestrator.

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tracing::{debug, info, warn};
use wordpack_ai::{normalize, render, ClientFactory, PromptParams};

use crate::error::LearningError;
use crate::models::{
    ExplanationRequest, ExplanationResult, GeneratedPassage, GenerationRequest, QuestionItem,
    QuestionRequest,
};
use crate::params::{
    clamp_complexity, ArticleLength, ArticleType, DifficultyLevel, ToneStyle, TopicArea,
};
use crate::questions::validate_questions;
use crate::sanitize::prepare_words;
use crate::templates;

pub use crate::sanitize::MAX_WORDS;

/// Longest passage, in characters, accepted for questions and explanations.
pub const MAX_PASSAGE_CHARS: usize = 10_000;

pub const EXPLANATION_FALLBACK_TRANSLATION: &str = "解析失败，请重试。";

const UNKNOWN_WORD_COUNT: &str = "Unknown";

/// Whether a result came from the model reply or from a fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Parsed,
    Fallback,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Parsed => "ok",
            Outcome::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Generated<T> {
    pub value: T,
    pub outcome: Outcome,
}

impl<T> Generated<T> {
    fn parsed(value: T) -> Self {
        Self {
            value,
            outcome: Outcome::Parsed,
        }
    }

    fn fallback(value: T) -> Self {
        Self {
            value,
            outcome: Outcome::Fallback,
        }
    }
}

/// Resolved passage parameters, echoed back when the reply omits them.
#[derive(Debug, Clone)]
struct PassageSettings {
    article_type: ArticleType,
    difficulty_level: DifficultyLevel,
    tone_style: ToneStyle,
    topic: TopicArea,
    article_length: ArticleLength,
    word_count: Option<String>,
    sentence_complexity: f64,
}

impl PassageSettings {
    fn resolve(req: &GenerationRequest) -> Self {
        let article_length = ArticleLength::resolve(req.article_length.as_deref());
        Self {
            article_type: ArticleType::resolve(req.article_type.as_deref()),
            difficulty_level: DifficultyLevel::resolve(req.difficulty_level.as_deref()),
            tone_style: ToneStyle::resolve(req.tone_style.as_deref()),
            topic: TopicArea::resolve(req.topic.as_deref()),
            word_count: article_length.custom_word_count(req.custom_word_count),
            article_length,
            sentence_complexity: clamp_complexity(req.sentence_complexity),
        }
    }

    fn prompt_params(&self, words: &[String]) -> PromptParams {
        PromptParams::new()
            .with("words", words.join(","))
            .with("article_type", self.article_type.as_str())
            .with("difficulty_level", self.difficulty_level.as_str())
            .with("cefr", self.difficulty_level.cefr())
            .with("tone_style", self.tone_style.as_str())
            .with("topic", self.topic.as_str())
            .with("article_length", self.article_length.as_str())
            .with_opt("length_range", self.article_length.range())
            .with_opt("word_count", self.word_count.clone())
            .with("sentence_complexity", format!("{:.2}", self.sentence_complexity))
    }

    fn fallback_word_count(&self) -> String {
        self.word_count
            .clone()
            .unwrap_or_else(|| UNKNOWN_WORD_COUNT.to_string())
    }

    /// Passage carrying the raw reply as its article body.
    fn fallback_passage(&self, raw: String) -> GeneratedPassage {
        GeneratedPassage {
            article: raw,
            word_count: self.fallback_word_count(),
            article_type: self.article_type.as_str().to_string(),
            difficulty_level: self.difficulty_level.as_str().to_string(),
            tone_style: self.tone_style.as_str().to_string(),
            topic: self.topic.as_str().to_string(),
            alert: None,
        }
    }

    /// Read a passage out of a normalized reply; `None` without an article.
    fn passage_from_value(&self, value: &Value) -> Option<GeneratedPassage> {
        let object = value.as_object()?;
        let article = object
            .get("article")
            .or_else(|| object.get("Article"))
            .and_then(Value::as_str)?
            .to_string();

        let text_field = |key: &str, default: &str| -> String {
            match object.get(key) {
                Some(Value::String(s)) => s.clone(),
                _ => default.to_string(),
            }
        };

        let word_count = match object.get("word_count") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => self.fallback_word_count(),
        };

        Some(GeneratedPassage {
            article,
            word_count,
            article_type: text_field("article_type", self.article_type.as_str()),
            difficulty_level: text_field("difficulty_level", self.difficulty_level.as_str()),
            tone_style: text_field("tone_style", self.tone_style.as_str()),
            topic: text_field("topic", self.topic.as_str()),
            alert: None,
        })
    }
}

/// Reject empty word lists and blank or oversized passages.
fn validate_passage_input(words: &[String], passage: &str) -> Result<(), LearningError> {
    if words.is_empty() {
        return Err(LearningError::Validation("words must not be empty".to_string()));
    }
    if passage.trim().is_empty() {
        return Err(LearningError::Validation("passage must not be empty".to_string()));
    }
    let chars = passage.chars().count();
    if chars > MAX_PASSAGE_CHARS {
        return Err(LearningError::Validation(format!(
            "passage is {} characters, the limit is {}",
            chars, MAX_PASSAGE_CHARS
        )));
    }
    Ok(())
}

/// Builds learning packages on top of a provider client factory.
#[derive(Clone)]
pub struct LearningService {
    clients: Arc<dyn ClientFactory>,
}

impl LearningService {
    pub fn new(clients: Arc<dyn ClientFactory>) -> Self {
        Self { clients }
    }

    /// One system-prompted exchange on a fresh client.
    async fn ask(
        &self,
        operation: &str,
        system_prompt: &str,
        prompt: &str,
    ) -> Result<String, LearningError> {
        let mut client = self.clients.create_client()?;
        client.set_system_prompt(system_prompt);

        info!("Calling {} to {}", client.provider(), operation);
        let start = Instant::now();
        let reply = client.exchange(prompt).await?;
        info!(
            "{} response for {} received in {:.2}s",
            client.provider(),
            operation,
            start.elapsed().as_secs_f64()
        );
        Ok(reply)
    }

    /// Generate a passage that uses the requested words.
    ///
    /// An unparsable reply is returned as the article body with the echoed
    /// parameters, so callers always get a complete passage.
    pub async fn generate_passage(
        &self,
        req: &GenerationRequest,
    ) -> Result<Generated<GeneratedPassage>, LearningError> {
        info!("Generating passage with {} words", req.words.len());

        let prepared = prepare_words(&req.words);
        if prepared.words.is_empty() {
            return Err(LearningError::Validation(
                "no usable words after removing unsupported characters".to_string(),
            ));
        }

        let settings = PassageSettings::resolve(req);
        let params = settings.prompt_params(&prepared.words);
        debug!("Passage prompt parameters: {:?}", params);
        let prompt = render(templates::WORD2PASSAGE, &params);

        let reply = self
            .ask("generate passage", templates::PASSAGE_SYSTEM_PROMPT, &prompt)
            .await?;

        let mut generated = match normalize(&reply).and_then(|v| settings.passage_from_value(&v)) {
            Some(passage) => Generated::parsed(passage),
            None => {
                warn!("Passage reply is not a usable JSON object, returning raw text");
                debug!("Unparsable passage reply: {}", reply);
                Generated::fallback(settings.fallback_passage(reply))
            }
        };
        generated.value.alert = prepared.alert;
        Ok(generated)
    }

    /// Generate multiple-choice questions; a malformed reply yields an empty list.
    pub async fn generate_questions(
        &self,
        req: &QuestionRequest,
    ) -> Result<Generated<Vec<QuestionItem>>, LearningError> {
        validate_passage_input(&req.words, &req.passage)?;
        info!(
            "Generating questions for {} words with difficulty={}",
            req.words.len(),
            req.difficulty
        );

        let prompt = render(templates::PASSAGE2QUESTION, &question_params(req));
        let reply = self
            .ask("generate questions", templates::QUESTION_SYSTEM_PROMPT, &prompt)
            .await?;

        let Some(value) = normalize(&reply) else {
            warn!("Question reply is not JSON");
            debug!("Unparsable question reply: {}", reply);
            return Ok(Generated::fallback(Vec::new()));
        };

        let questions = validate_questions(&value);
        if questions.is_empty() {
            return Ok(Generated::fallback(questions));
        }
        info!("Generated {} questions", questions.len());
        Ok(Generated::parsed(questions))
    }

    /// Explain the words in context and translate the passage.
    pub async fn generate_explanation(
        &self,
        req: &ExplanationRequest,
    ) -> Result<Generated<ExplanationResult>, LearningError> {
        validate_passage_input(&req.words, &req.passage)?;
        info!("Generating explanation for {} words", req.words.len());

        let params = PromptParams::new()
            .with("words", req.words.join(","))
            .with("passage", req.passage.as_str());
        let prompt = render(templates::WORD2TRANSLATION, &params);
        let reply = self
            .ask(
                "generate explanation",
                templates::EXPLANATION_SYSTEM_PROMPT,
                &prompt,
            )
            .await?;

        let parsed = normalize(&reply).and_then(|value| {
            serde_json::from_value::<ExplanationResult>(value)
                .map_err(|e| warn!("Explanation reply has the wrong shape: {}", e))
                .ok()
        });

        Ok(match parsed {
            Some(result) => Generated::parsed(result),
            None => {
                warn!("Explanation reply unusable, returning fallback");
                debug!("Unparsable explanation reply: {}", reply);
                Generated::fallback(ExplanationResult {
                    language_points: Vec::new(),
                    translation: EXPLANATION_FALLBACK_TRANSLATION.to_string(),
                })
            }
        })
    }
}

fn question_params(req: &QuestionRequest) -> PromptParams {
    PromptParams::new()
        .with("words", req.words.join(","))
        .with("passage", req.passage.as_str())
        .with("difficulty", req.difficulty.as_str())
}
