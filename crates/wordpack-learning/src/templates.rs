//! Prompt bodies for the three generation operations.
//!
//! Rendered with [`wordpack_ai::render`]; see that module for the syntax.

pub const PASSAGE_SYSTEM_PROMPT: &str = "你是一个文章生成助手";
pub const EXPLANATION_SYSTEM_PROMPT: &str = "你是一个翻译助手";
pub const QUESTION_SYSTEM_PROMPT: &str = "你是一个问题生成助手";

/// Parameters: `words`, `article_type`, `difficulty_level`, `cefr`,
/// `tone_style`, `topic`, `article_length`, `length_range`, `word_count`,
/// `sentence_complexity`.
pub const WORD2PASSAGE: &str = r#"You are an English writer who builds reading passages around vocabulary lists for language learners.

## Target words
{{ words }}

## Requirements
- Genre: {{ article_type }}
- Reader level: {{ difficulty_level }} (CEFR {{ cefr }})
- Tone: {{ tone_style }}
- Topic: {{ topic }}
{% if article_length == "custom" %}- Length: about {{ word_count }} words (within 5%)
{% elif length_range %}- Length: {{ length_range }} words
{% else %}- Length: 300-500 words
{% endif %}- Sentence complexity: {{ sentence_complexity }} on a 0-1 scale (0 = short simple sentences, 1 = long sentences with subordinate clauses)

## Rules
1. Use every target word naturally, at least once, in a form that fits the context.
2. Bold each occurrence of a target word with Markdown, e.g. **ocean**.
3. Give the text a clear structure so the words are remembered in context.
4. Format the article as Markdown paragraphs.

## Output
Return only a JSON object, with no commentary before or after it:
```json
{
  "article": "the Markdown article",
  "word_count": "the article's word count, as a string",
  "article_type": "{{ article_type }}",
  "difficulty_level": "{{ difficulty_level }}",
  "tone_style": "{{ tone_style }}",
  "topic": "{{ topic }}"
}
```"#;

/// Parameters: `words`, `passage`.
pub const WORD2TRANSLATION: &str = r#"请根据给定的单词和英文文章完成解析。

一、单词语境解析
为每个目标单词给出：词性、音标、基础词义、在文中的具体含义，以及文中出现的搭配（注明段落）。

二、关键词组
从文章中挑选 5-8 个值得学习的词组（专业术语、惯用表达或高频搭配），说明结构、用法并给出一个仿写例句。

三、全文翻译
给出忠实、通顺的中文全文翻译，长难句逻辑清楚。

待解析单词：{{ words }}
原文内容：
{{ passage }}

只输出如下格式的 JSON，不要附加其他文字：
```json
{
  "language_points": [
    {"word": "单词或词组", "explanation": "解析内容"}
  ],
  "translation": "全文翻译"
}
```"#;

/// Parameters: `words`, `passage`, `difficulty`.
pub const PASSAGE2QUESTION: &str = r#"Write 5 English multiple-choice reading comprehension questions for the passage below.

## Coverage
- 2 questions on vocabulary in context (meaning, collocation, inference from context)
- 2 questions on discourse structure (main idea, paragraph function, cohesion)
- 1 question on inference (implied meaning, author's view)

## Rules
- Every question ties the passage to at least one target word.
- Each option is 5-15 words; distractors are plausible; no "none of the above".
- Spread the correct answers across A, B, C and D.
- Order questions by where their evidence appears in the passage.
- Difficulty: {{ difficulty }}

## Target words
{{ words }}

## Passage
{{ passage }}

## Output
Return only a JSON array, with no commentary before or after it:
```json
[
  {
    "question": "question stem",
    "answer": "A",
    "option": {"A": "...", "B": "...", "C": "...", "D": "..."},
    "explanation": {
      "chinese_exp": "中英文混合解析",
      "english_exp": "English explanation"
    }
  }
]
```"#;
