//! Shape validation for generated questions.

use serde_json::Value;
use tracing::warn;

use crate::models::QuestionItem;

const ANSWER_KEYS: [&str; 4] = ["A", "B", "C", "D"];

/// Accept a list of question objects, or an object holding one under
/// `questions`. Any malformed item rejects the whole result.
pub fn validate_questions(value: &Value) -> Vec<QuestionItem> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(map) => match map.get("questions") {
            Some(Value::Array(items)) => items,
            _ => {
                warn!(
                    "Question payload is an object without a questions list: keys={:?}",
                    map.keys().collect::<Vec<_>>()
                );
                return Vec::new();
            }
        },
        other => {
            warn!("Question payload has unsupported type: {}", type_name(other));
            return Vec::new();
        }
    };

    let mut questions = Vec::with_capacity(items.len());
    for (idx, item) in items.iter().enumerate() {
        let question: QuestionItem = match serde_json::from_value(item.clone()) {
            Ok(q) => q,
            Err(e) => {
                warn!("Question {} is malformed: {}", idx, e);
                return Vec::new();
            }
        };
        if !ANSWER_KEYS.contains(&question.answer.as_str()) {
            warn!("Question {} has answer {:?}, not one of A-D", idx, question.answer);
            return Vec::new();
        }
        questions.push(question);
    }
    questions
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
