//! Generation parameters.
//!
//! Every passage parameter arrives as free text and resolves to one value of a
//! closed enumeration; unknown or missing values fall back to the default.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! generation_param {
    (
        $(#[$meta:meta])*
        $name:ident, default = $default:ident, {
            $($variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            /// Case-insensitive lookup; anything unrecognised yields the default.
            pub fn resolve(value: Option<&str>) -> Self {
                value
                    .map(str::trim)
                    .and_then(|v| {
                        Self::ALL
                            .iter()
                            .copied()
                            .find(|p| p.as_str().eq_ignore_ascii_case(v))
                    })
                    .unwrap_or_default()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

generation_param!(
    /// Genre of the generated passage.
    ArticleType, default = Blog, {
        Blog => "blog",
        News => "news",
        Story => "story",
        Essay => "essay",
        Report => "report",
        Dialogue => "dialogue",
        Speech => "speech",
    }
);

generation_param!(
    DifficultyLevel, default = Intermediate, {
        Beginner => "beginner",
        Elementary => "elementary",
        Intermediate => "intermediate",
        UpperIntermediate => "upper_intermediate",
        Advanced => "advanced",
    }
);

impl DifficultyLevel {
    pub fn cefr(&self) -> &'static str {
        match self {
            DifficultyLevel::Beginner => "A1",
            DifficultyLevel::Elementary => "A2",
            DifficultyLevel::Intermediate => "B1",
            DifficultyLevel::UpperIntermediate => "B2",
            DifficultyLevel::Advanced => "C1",
        }
    }
}

generation_param!(
    ToneStyle, default = SemiFormal, {
        Formal => "formal",
        SemiFormal => "semi_formal",
        Casual => "casual",
        Humorous => "humorous",
        Neutral => "neutral",
    }
);

generation_param!(
    TopicArea, default = General, {
        General => "general",
        Technology => "technology",
        Science => "science",
        Business => "business",
        Culture => "culture",
        Travel => "travel",
        Education => "education",
        Health => "health",
        Environment => "environment",
        Sports => "sports",
    }
);

generation_param!(
    ArticleLength, default = Medium, {
        Short => "short",
        Medium => "medium",
        Long => "long",
        Custom => "custom",
    }
);

pub const MIN_CUSTOM_WORD_COUNT: i64 = 50;
pub const MAX_CUSTOM_WORD_COUNT: i64 = 2000;
pub const DEFAULT_CUSTOM_WORD_COUNT: &str = "500";
pub const DEFAULT_SENTENCE_COMPLEXITY: f64 = 0.5;

impl ArticleLength {
    /// Word-count phrase for the preset lengths, `None` for custom.
    pub fn range(&self) -> Option<&'static str> {
        match self {
            ArticleLength::Short => Some("100-200"),
            ArticleLength::Medium => Some("300-500"),
            ArticleLength::Long => Some("600-800"),
            ArticleLength::Custom => None,
        }
    }

    /// The literal word count requested by a custom length.
    ///
    /// Counts outside 50..=2000 (or missing) become "500".
    pub fn custom_word_count(&self, requested: Option<i64>) -> Option<String> {
        if *self != ArticleLength::Custom {
            return None;
        }
        let count = requested
            .filter(|n| (MIN_CUSTOM_WORD_COUNT..=MAX_CUSTOM_WORD_COUNT).contains(n))
            .map(|n| n.to_string())
            .unwrap_or_else(|| DEFAULT_CUSTOM_WORD_COUNT.to_string());
        Some(count)
    }
}

/// Clamp into [0, 1]; non-finite or missing values use the default.
pub fn clamp_complexity(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() => v.clamp(0.0, 1.0),
        _ => DEFAULT_SENTENCE_COMPLEXITY,
    }
}

/// Difficulty label for generated questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum QuestionDifficulty {
    #[serde(rename = "简单", alias = "easy", alias = "simple")]
    Easy,
    #[default]
    #[serde(rename = "适中", alias = "medium", alias = "moderate")]
    Medium,
    #[serde(rename = "困难", alias = "hard", alias = "difficult")]
    Hard,
}

impl QuestionDifficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionDifficulty::Easy => "简单",
            QuestionDifficulty::Medium => "适中",
            QuestionDifficulty::Hard => "困难",
        }
    }
}

impl fmt::Display for QuestionDifficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
