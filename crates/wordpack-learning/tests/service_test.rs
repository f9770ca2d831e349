//! Orchestrator tests against a scripted provider.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde_json::json;
use wordpack_ai::client::TextStream;
use wordpack_ai::{ChatClient, ChatMessage, ClientFactory, LlmError, Provider, Role};
use wordpack_learning::{
    ExplanationRequest, GenerationRequest, LearningError, LearningService, Outcome,
    QuestionDifficulty, QuestionRequest, MAX_PASSAGE_CHARS,
};

/// Factory whose clients answer every exchange with the same reply and
/// record the conversation they sent.
#[derive(Clone, Default)]
struct ScriptedProvider {
    reply: Arc<Mutex<Option<Result<String, u16>>>>,
    conversations: Arc<Mutex<Vec<Vec<ChatMessage>>>>,
}

impl ScriptedProvider {
    fn replying(text: &str) -> Self {
        let provider = Self::default();
        *provider.reply.lock().unwrap() = Some(Ok(text.to_string()));
        provider
    }

    fn failing(status: u16) -> Self {
        let provider = Self::default();
        *provider.reply.lock().unwrap() = Some(Err(status));
        provider
    }

    fn calls(&self) -> usize {
        self.conversations.lock().unwrap().len()
    }

    fn last_conversation(&self) -> Vec<ChatMessage> {
        self.conversations.lock().unwrap().last().cloned().unwrap()
    }

    fn service(&self) -> LearningService {
        LearningService::new(Arc::new(self.clone()))
    }
}

struct ScriptedClient {
    owner: ScriptedProvider,
    history: Vec<ChatMessage>,
}

#[async_trait]
impl ChatClient for ScriptedClient {
    fn provider(&self) -> Provider {
        Provider::SiliconFlow
    }

    fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    fn append_history(&mut self, entries: Vec<ChatMessage>) {
        self.history.extend(entries);
    }

    async fn exchange(&mut self, user_text: &str) -> Result<String, LlmError> {
        self.history.push(ChatMessage::user(user_text));
        self.owner
            .conversations
            .lock()
            .unwrap()
            .push(self.history.clone());

        let reply = self.owner.reply.lock().unwrap().clone();
        match reply {
            Some(Ok(text)) => {
                self.history.push(ChatMessage::assistant(text.clone()));
                Ok(text)
            }
            Some(Err(status)) => Err(LlmError::Provider {
                provider: Provider::SiliconFlow,
                status,
                body: "upstream unavailable".to_string(),
            }),
            None => Err(LlmError::EmptyResponse(Provider::SiliconFlow)),
        }
    }

    async fn exchange_streamed(&mut self, user_text: &str) -> Result<TextStream, LlmError> {
        let text = self.exchange(user_text).await?;
        Ok(stream::iter(vec![text]).boxed())
    }
}

impl ClientFactory for ScriptedProvider {
    fn create_client(&self) -> Result<Box<dyn ChatClient>, LlmError> {
        Ok(Box::new(ScriptedClient {
            owner: self.clone(),
            history: Vec::new(),
        }))
    }
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}

fn question_reply() -> String {
    json!([{
        "question": "What does 'drift' most nearly mean in paragraph 1?",
        "answer": "B",
        "option": {"A": "to sink quickly", "B": "to be carried slowly", "C": "to freeze", "D": "to shout"},
        "explanation": {"chinese_exp": "drift 表示随水流缓慢移动。", "english_exp": "Drift means to move slowly with a current."}
    }])
    .to_string()
}

#[tokio::test]
async fn passage_fields_are_surfaced_verbatim() {
    let reply = "```json\n{\"article\": \"The **ocean** currents let the boat **drift**.\", \"word_count\": \"9\", \"article_type\": \"news\", \"difficulty_level\": \"intermediate\"}\n```";
    let provider = ScriptedProvider::replying(reply);

    let req = GenerationRequest {
        words: words(&["ocean", "drift"]),
        article_type: Some("news".to_string()),
        difficulty_level: Some("intermediate".to_string()),
        ..Default::default()
    };
    let generated = provider.service().generate_passage(&req).await.unwrap();

    assert_eq!(generated.outcome, Outcome::Parsed);
    let passage = generated.value;
    assert_eq!(passage.article, "The **ocean** currents let the boat **drift**.");
    assert_eq!(passage.word_count, "9");
    assert_eq!(passage.article_type, "news");
    assert_eq!(passage.difficulty_level, "intermediate");
    assert_eq!(passage.tone_style, "semi_formal");
    assert!(passage.alert.is_none());

    let conversation = provider.last_conversation();
    assert_eq!(conversation[0], ChatMessage::system("你是一个文章生成助手"));
    assert_eq!(conversation[1].role, Role::User);
    assert!(conversation[1].content.contains("ocean,drift"));
    assert!(conversation[1].content.contains("Genre: news"));
}

#[tokio::test]
async fn passage_over_fifty_words_is_truncated_with_alert() {
    let provider = ScriptedProvider::replying(r#"{"article": "text", "word_count": "300"}"#);
    let many: Vec<String> = (0..55).map(|i| format!("word{}", i)).collect();

    let req = GenerationRequest {
        words: many,
        ..Default::default()
    };
    let passage = provider.service().generate_passage(&req).await.unwrap().value;

    assert!(passage.alert.is_some());
    let prompt = &provider.last_conversation()[1].content;
    assert!(prompt.contains("word49"));
    assert!(!prompt.contains("word50"));
}

#[tokio::test]
async fn passage_words_are_sanitized_before_prompting() {
    let provider = ScriptedProvider::replying(r#"{"article": "text"}"#);
    let req = GenerationRequest {
        words: words(&["word!@#", "%%%", "well-being"]),
        ..Default::default()
    };
    provider.service().generate_passage(&req).await.unwrap();

    let prompt = &provider.last_conversation()[1].content;
    assert!(prompt.contains("word,well-being"));
    assert!(!prompt.contains("word!@#"));
}

#[tokio::test]
async fn passage_without_usable_words_is_rejected_before_calling() {
    let provider = ScriptedProvider::replying("{}");
    let req = GenerationRequest {
        words: words(&["!!", "??"]),
        ..Default::default()
    };
    let err = provider.service().generate_passage(&req).await.unwrap_err();
    assert!(matches!(err, LearningError::Validation(_)));
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn unparsable_passage_falls_back_to_raw_text() {
    let provider = ScriptedProvider::replying("Once upon a time, the ocean...");
    let req = GenerationRequest {
        words: words(&["ocean"]),
        article_length: Some("custom".to_string()),
        custom_word_count: Some(800),
        ..Default::default()
    };
    let generated = provider.service().generate_passage(&req).await.unwrap();

    assert_eq!(generated.outcome, Outcome::Fallback);
    assert_eq!(generated.value.article, "Once upon a time, the ocean...");
    assert_eq!(generated.value.word_count, "800");
    assert_eq!(generated.value.article_type, "blog");
}

#[tokio::test]
async fn unparsable_passage_without_custom_count_reports_unknown() {
    let provider = ScriptedProvider::replying("plain text");
    let req = GenerationRequest {
        words: words(&["ocean"]),
        ..Default::default()
    };
    let passage = provider.service().generate_passage(&req).await.unwrap().value;
    assert_eq!(passage.word_count, "Unknown");
}

#[tokio::test]
async fn provider_failure_propagates() {
    let provider = ScriptedProvider::failing(503);
    let req = GenerationRequest {
        words: words(&["ocean"]),
        ..Default::default()
    };
    let err = provider.service().generate_passage(&req).await.unwrap_err();
    match err {
        LearningError::Llm(LlmError::Provider { status, .. }) => assert_eq!(status, 503),
        other => panic!("expected provider error, got {other:?}"),
    }
}

#[tokio::test]
async fn passage_length_boundary_is_checked_before_calling() {
    let provider = ScriptedProvider::replying(&question_reply());
    let service = provider.service();

    let at_limit = QuestionRequest {
        words: words(&["ocean"]),
        passage: "a".repeat(MAX_PASSAGE_CHARS),
        difficulty: QuestionDifficulty::Medium,
    };
    let generated = service.generate_questions(&at_limit).await.unwrap();
    assert_eq!(generated.value.len(), 1);
    assert_eq!(provider.calls(), 1);

    let over_limit = QuestionRequest {
        passage: "a".repeat(MAX_PASSAGE_CHARS + 1),
        ..at_limit
    };
    let err = service.generate_questions(&over_limit).await.unwrap_err();
    assert!(matches!(err, LearningError::Validation(_)));
    assert_eq!(provider.calls(), 1);

    let explanation = ExplanationRequest {
        words: words(&["ocean"]),
        passage: "a".repeat(MAX_PASSAGE_CHARS + 1),
    };
    assert!(service.generate_explanation(&explanation).await.is_err());
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn questions_use_difficulty_and_system_prompt() {
    let provider = ScriptedProvider::replying(&format!("```json\n{}\n```", question_reply()));
    let req = QuestionRequest {
        words: words(&["drift"]),
        passage: "The boat began to drift.".to_string(),
        difficulty: QuestionDifficulty::Hard,
    };
    let generated = provider.service().generate_questions(&req).await.unwrap();
    assert_eq!(generated.outcome, Outcome::Parsed);
    assert_eq!(generated.value[0].answer, "B");

    let conversation = provider.last_conversation();
    assert_eq!(conversation[0].content, "你是一个问题生成助手");
    assert!(conversation[1].content.contains("Difficulty: 困难"));
}

#[tokio::test]
async fn malformed_questions_yield_empty_fallback() {
    let provider = ScriptedProvider::replying(r#"{"questions": [{"question": "q"}]}"#);
    let req = QuestionRequest {
        words: words(&["drift"]),
        passage: "The boat began to drift.".to_string(),
        difficulty: QuestionDifficulty::default(),
    };
    let generated = provider.service().generate_questions(&req).await.unwrap();
    assert_eq!(generated.outcome, Outcome::Fallback);
    assert!(generated.value.is_empty());
}

#[tokio::test]
async fn blank_passage_is_rejected() {
    let provider = ScriptedProvider::replying("{}");
    let req = ExplanationRequest {
        words: words(&["ocean"]),
        passage: "  ".to_string(),
    };
    let err = provider.service().generate_explanation(&req).await.unwrap_err();
    assert!(matches!(err, LearningError::Validation(_)));
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn explanation_is_parsed() {
    let reply = json!({
        "language_points": [{"word": "ocean", "explanation": "n. 海洋"}],
        "translation": "海洋很宽广。"
    })
    .to_string();
    let provider = ScriptedProvider::replying(&reply);
    let req = ExplanationRequest {
        words: words(&["ocean"]),
        passage: "The ocean is wide.".to_string(),
    };
    let generated = provider.service().generate_explanation(&req).await.unwrap();
    assert_eq!(generated.outcome, Outcome::Parsed);
    assert_eq!(generated.value.language_points[0].word, "ocean");
    assert_eq!(generated.value.translation, "海洋很宽广。");
    assert_eq!(provider.last_conversation()[0].content, "你是一个翻译助手");
}

#[tokio::test]
async fn unparsable_explanation_returns_fixed_fallback() {
    let provider = ScriptedProvider::replying("sorry, I cannot help");
    let req = ExplanationRequest {
        words: words(&["ocean"]),
        passage: "The ocean is wide.".to_string(),
    };
    let generated = provider.service().generate_explanation(&req).await.unwrap();
    assert_eq!(generated.outcome, Outcome::Fallback);
    assert!(generated.value.language_points.is_empty());
    assert_eq!(generated.value.translation, "解析失败，请重试。");
}
