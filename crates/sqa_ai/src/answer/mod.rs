use std::cmp::Ordering;
use std::sync::Arc;

use sqa_core::cache::{answer_fingerprint, ResultCache};
use sqa_core::domain::AnswerResult;
use sqa_core::error::AppError;
use sqa_core::text::context::context_relevance;
use sqa_core::text::keywords::extract_keywords;
use sqa_core::text::similarity::similarity;
use sqa_core::text::split_sentences;
use tracing::{debug, warn};

use crate::llm::Generator;
use crate::prompts::expand_answer_prompt;

pub const OVERLAP_WEIGHT: f64 = 0.3;
pub const SIMILARITY_WEIGHT: f64 = 0.5;
pub const CONTEXT_WEIGHT: f64 = 0.2;

/// A best match must score strictly above this to be used as an answer.
pub const MIN_RELEVANCE: f64 = 0.3;

/// Number of top-ranked sentences joined into the answer context.
pub const TOP_MATCHES: usize = 2;

pub const KEY_INFORMATION_TITLE: &str = "Key Information:";
pub const DETAILED_EXPLANATION_TITLE: &str = "Detailed Explanation:";

pub type AnswerCache = ResultCache<AnswerResult>;

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredSentence {
    pub sentence: String,
    pub score: f64,
    pub keywords: Vec<String>,
}

/// Share of `question_keywords` found in `sentence_keywords`; 0 when the question has none.
fn keyword_overlap(question_keywords: &[String], sentence_keywords: &[String]) -> f64 {
    if question_keywords.is_empty() {
        return 0.0;
    }
    let hits = question_keywords
        .iter()
        .filter(|kw| sentence_keywords.contains(kw))
        .count();
    hits as f64 / question_keywords.len() as f64
}

/// Score every sentence against `question`, best first. Equal scores keep document order.
pub fn rank_sentences(question: &str, sentences: &[String]) -> Vec<ScoredSentence> {
    let question_keywords = extract_keywords(question);
    let mut scored: Vec<ScoredSentence> = sentences
        .iter()
        .map(|sentence| {
            let keywords = extract_keywords(sentence);
            let overlap = keyword_overlap(&question_keywords, &keywords);
            let sim = similarity(question, sentence);
            let ctx = context_relevance(sentence, sentences);
            ScoredSentence {
                sentence: sentence.clone(),
                score: OVERLAP_WEIGHT * overlap + SIMILARITY_WEIGHT * sim + CONTEXT_WEIGHT * ctx,
                keywords,
            }
        })
        .collect();
    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    scored
}

/// Two titled sections separated by a blank line; blank sections are left out.
pub fn format_answer(context: &str, generated: &str) -> String {
    [
        (KEY_INFORMATION_TITLE, context),
        (DETAILED_EXPLANATION_TITLE, generated),
    ]
    .into_iter()
    .filter(|(_, body)| !body.trim().is_empty())
    .map(|(title, body)| format!("{title}\n{body}"))
    .collect::<Vec<_>>()
    .join("\n\n")
}

fn merge_keywords(first: &[String], second: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(first.len() + second.len());
    for kw in first.iter().chain(second) {
        if !out.contains(kw) {
            out.push(kw.clone());
        }
    }
    out
}

/// Picks the study sentences that best answer a question and optionally expands them.
#[derive(Clone)]
pub struct AnswerSynthesizer {
    generator: Arc<dyn Generator>,
    cache: Arc<AnswerCache>,
}

impl AnswerSynthesizer {
    pub fn new(generator: Arc<dyn Generator>, cache: Arc<AnswerCache>) -> Self {
        Self { generator, cache }
    }

    pub fn cache(&self) -> &AnswerCache {
        &self.cache
    }

    /// Answer `question` from `content`. Never fails: problems become placeholder answers.
    pub fn generate_answer(&self, question: &str, content: &str) -> AnswerResult {
        let key = answer_fingerprint(question, content);
        if let Some(hit) = self.cache.get(&key) {
            return hit;
        }

        if content.is_empty() {
            return AnswerResult::no_content();
        }

        match self.synthesize(question, content) {
            Ok(Some(result)) => {
                self.cache.insert(&key, result.clone());
                result
            }
            Ok(None) => AnswerResult::no_match(),
            Err(err) => {
                warn!(error = %err, question, "answer generation failed");
                AnswerResult::error()
            }
        }
    }

    fn synthesize(&self, question: &str, content: &str) -> Result<Option<AnswerResult>, AppError> {
        let sentences = split_sentences(content);
        let ranked = rank_sentences(question, &sentences);

        let Some(top) = ranked.first() else {
            return Err(AppError::new(
                "ANSWER_NO_SENTENCES",
                "Study content has no usable sentences",
            )
            .with_details(format!("content_chars={}", content.chars().count())));
        };
        if top.score <= MIN_RELEVANCE {
            debug!(question, top_score = top.score, "no relevant sentence");
            return Ok(None);
        }

        let relevant_context = ranked
            .iter()
            .take(TOP_MATCHES)
            .map(|m| m.sentence.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        let prompt = expand_answer_prompt(question, &relevant_context);
        let text = match self.generator.generate(&prompt) {
            Ok(generated) if !generated.is_empty() => format_answer(&relevant_context, &generated),
            Ok(_) => relevant_context,
            Err(err) => {
                warn!(error = %err, question, "generation unavailable; using study text only");
                relevant_context
            }
        };

        let keywords = merge_keywords(&extract_keywords(question), &top.keywords);
        Ok(Some(AnswerResult::new(text, keywords)))
    }
}
