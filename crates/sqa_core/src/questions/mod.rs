//! Mining candidate questions from free-form text, plus the near-duplicate rule shared by
//! extraction and final grouping.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::domain::Question;
use crate::text::similarity::{normalize_text, similarity};
use crate::text::split_paragraphs;

/// Normalized questions scoring above this are the same question.
pub const DUPLICATE_THRESHOLD: f64 = 0.8;

pub const MIN_QUESTION_WORDS: usize = 3;
pub const MAX_QUESTION_WORDS: usize = 50;

pub const QUESTION_WORDS: &[&str] = &[
    "who", "what", "when", "where", "why", "how", "is", "are", "can", "could", "should", "would",
];

fn compile(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(re) => re,
        Err(err) => panic!("question regex {pattern:?} is invalid: {err}"),
    }
}

/// Applied in this order to every paragraph; group 1 is the candidate.
static QUESTION_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        // "3) ...?" / "3. ...?" / "? ...?"
        compile(r"(?:\d+[).]|\?)\s*([^\n?]+\?)"),
        // any sentence-like run ending in "?"
        compile(r"([^.!?\n]+\?)"),
        // "3. ..." / "Q: ..." to end of line
        compile(r"(?:\d+\.|Q:)\s*([^\n]+)"),
    ]
});

static QUESTION_WORD: LazyLock<Regex> =
    LazyLock::new(|| compile(&format!(r"(?i)\b(?:{})\b", QUESTION_WORDS.join("|"))));

/// A candidate is a question if it has a question word or ends in `?`, and is 3–50 words long.
pub fn is_valid_question(text: &str) -> bool {
    let text = text.trim();
    let words = text.split_whitespace().count();
    let looks_like_question = QUESTION_WORD.is_match(text) || text.ends_with('?');
    looks_like_question && (MIN_QUESTION_WORDS..=MAX_QUESTION_WORDS).contains(&words)
}

/// Same question after normalization, or normalized forms more than
/// [`DUPLICATE_THRESHOLD`] similar.
pub fn is_similar(q1: &str, q2: &str) -> bool {
    let n1 = normalize_text(q1);
    let n2 = normalize_text(q2);
    n1 == n2 || similarity(&n1, &n2) > DUPLICATE_THRESHOLD
}

fn candidates(paragraph: &str) -> impl Iterator<Item = &str> + '_ {
    QUESTION_PATTERNS.iter().flat_map(move |re| {
        re.captures_iter(paragraph)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().trim())
    })
}

/// Extract unique questions from `raw`, in order of first discovery.
pub fn extract_questions(raw: &str) -> Vec<String> {
    let mut accepted: Vec<String> = Vec::new();

    for paragraph in split_paragraphs(raw) {
        let mut batch: Vec<String> = Vec::new();
        for candidate in candidates(paragraph) {
            if candidate.is_empty() || !is_valid_question(candidate) {
                continue;
            }
            let duplicate = accepted
                .iter()
                .chain(batch.iter())
                .any(|existing| is_similar(existing, candidate));
            if !duplicate {
                batch.push(candidate.to_string());
            }
        }
        accepted.extend(batch);
    }

    debug!(questions = accepted.len(), "extracted questions");
    accepted
}

/// Collapse near-duplicates, keeping the first member of each group in input order.
///
/// A question joins the first group where it is similar to any member, not just the
/// representative, so groups can chain. Ids are left untouched; renumber afterwards.
pub fn group_similar_questions(questions: Vec<Question>) -> Vec<Question> {
    let total = questions.len();
    let mut groups: Vec<Vec<Question>> = Vec::new();

    for question in questions {
        let existing = groups
            .iter_mut()
            .find(|group| group.iter().any(|member| is_similar(&member.text, &question.text)));
        match existing {
            Some(group) => group.push(question),
            None => groups.push(vec![question]),
        }
    }

    let out: Vec<Question> = groups
        .into_iter()
        .filter_map(|group| group.into_iter().next())
        .collect();
    debug!(input = total, groups = out.len(), "grouped similar questions");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn validity_requires_question_shape_and_length() {
        assert!(is_valid_question("What is gravity?"));
        assert!(is_valid_question("Explain the water cycle?"));
        assert!(is_valid_question("  how plants grow  "));
        assert!(!is_valid_question("Gravity?"));
        assert!(!is_valid_question("Describe the water cycle in detail"));
        // "this" must not count as "is"
        assert!(!is_valid_question("Describe this diagram please"));
        let long = format!("What {}", "word ".repeat(50));
        assert!(!is_valid_question(&long));
    }

    #[test]
    fn question_words_are_case_insensitive() {
        assert!(is_valid_question("WHY do birds migrate"));
    }

    #[test]
    fn similar_after_normalization() {
        assert!(is_similar("What is the capital?", "what   is the capital ?"));
        assert!(!is_similar("What is gravity?", "How do plants grow?"));
    }

    #[test]
    fn extracts_numbered_questions_across_paragraphs() {
        let qs = extract_questions("1) What is gravity?\n\n2. How do plants grow?");
        assert_eq!(qs, vec!["What is gravity?", "How do plants grow?"]);
    }

    #[test]
    fn extracts_q_prefix_to_end_of_line() {
        let qs = extract_questions("Q: Explain why the sky is blue\nNotes follow.");
        assert_eq!(qs, vec!["Explain why the sky is blue"]);
    }

    #[test]
    fn suppresses_duplicates_across_paragraphs() {
        let raw = "What causes the seasons on Earth?\n\n2. what causes the seasons on earth\n\nWhy is the ocean salty?";
        let qs = extract_questions(raw);
        assert_eq!(qs, vec!["What causes the seasons on Earth?", "Why is the ocean salty?"]);
    }

    #[test]
    fn empty_text_has_no_questions() {
        assert!(extract_questions("").is_empty());
        assert!(extract_questions("Just a statement. Another one.").is_empty());
    }

    #[test]
    fn grouping_keeps_first_member() {
        let qs = vec![
            Question::unanswered("How does gravity work?"),
            Question::unanswered("What is photosynthesis?"),
            Question::unanswered("how does  gravity work"),
        ];
        let grouped = group_similar_questions(qs);
        let texts: Vec<&str> = grouped.iter().map(|q| q.text.as_str()).collect();
        assert_eq!(texts, vec!["How does gravity work?", "What is photosynthesis?"]);
    }
}
