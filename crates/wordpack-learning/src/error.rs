use thiserror::Error;
use wordpack_ai::LlmError;

#[derive(Debug, Error)]
pub enum LearningError {
    /// Input rejected before any provider call.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Llm(#[from] LlmError),
}
