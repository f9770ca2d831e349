//! Wordpack Learning - builds learning packages from vocabulary lists
//!
//! Each operation validates its input, renders a prompt, runs one exchange
//! against the configured provider and turns the reply into a typed result,
//! falling back to a well-formed payload when the reply cannot be parsed.

pub mod error;
pub mod models;
pub mod params;
pub mod questions;
pub mod sanitize;
pub mod service;
pub mod templates;

pub use error::LearningError;
pub use models::{
    ExplanationRequest, ExplanationResult, GeneratedPassage, GenerationRequest, ImageResult,
    LanguagePoint, QuestionExplanation, QuestionItem, QuestionOption, QuestionRequest,
};
pub use params::{
    ArticleLength, ArticleType, DifficultyLevel, QuestionDifficulty, ToneStyle, TopicArea,
};
pub use questions::validate_questions;
pub use service::{Generated, LearningService, Outcome, MAX_PASSAGE_CHARS, MAX_WORDS};
