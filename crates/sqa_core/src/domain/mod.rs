use serde::{Deserialize, Serialize};

pub const NO_CONTENT_ANSWER: &str = "No study content provided.";
pub const NO_MATCH_ANSWER: &str = "No relevant answer found in the study content.";
pub const ERROR_ANSWER: &str = "Error generating answer. Please try again.";

/// A question handed to the presentation layer.
///
/// Notes:
/// - `id` is assigned only after final grouping (dense, 1-based, in output order).
/// - `answer` stays empty until synthesis runs.
/// - `keywords` keep extraction order and contain no duplicates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Question {
    pub id: u32,
    pub text: String,
    pub answer: String,
    pub keywords: Vec<String>,
}

impl Question {
    /// Bare question as produced by extraction; not yet answered or numbered.
    pub fn unanswered(text: impl Into<String>) -> Self {
        Self {
            id: 0,
            text: text.into().trim().to_string(),
            answer: String::new(),
            keywords: Vec::new(),
        }
    }

    pub fn with_answer(mut self, answer: AnswerResult) -> Self {
        self.answer = answer.text;
        self.keywords = answer.keywords;
        self
    }
}

/// Output of answer synthesis and the payload stored in the result cache.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnswerResult {
    pub text: String,
    pub keywords: Vec<String>,
}

impl AnswerResult {
    pub fn new(text: impl Into<String>, keywords: Vec<String>) -> Self {
        Self {
            text: text.into(),
            keywords,
        }
    }

    pub fn no_content() -> Self {
        Self::new(NO_CONTENT_ANSWER, Vec::new())
    }

    pub fn no_match() -> Self {
        Self::new(NO_MATCH_ANSWER, Vec::new())
    }

    pub fn error() -> Self {
        Self::new(ERROR_ANSWER, Vec::new())
    }

    /// True for the three fixed placeholder answers.
    pub fn is_sentinel(&self) -> bool {
        self.keywords.is_empty()
            && matches!(
                self.text.as_str(),
                NO_CONTENT_ANSWER | NO_MATCH_ANSWER | ERROR_ANSWER
            )
    }
}

/// Assign ids `1..=N` in slice order, discarding whatever ids were there before.
pub fn renumber_questions(questions: &mut [Question]) {
    for (idx, q) in questions.iter_mut().enumerate() {
        q.id = idx as u32 + 1;
    }
}
