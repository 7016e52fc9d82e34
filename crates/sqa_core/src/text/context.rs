use std::collections::HashSet;

use super::keywords::extract_keywords;

/// Number of neighbouring sentences considered on each side.
pub const CONTEXT_WINDOW: usize = 2;

/// Share of `sentence`'s keywords that also appear within its ±[`CONTEXT_WINDOW`] neighbourhood
/// in `all_sentences`.
///
/// The first equal entry in `all_sentences` anchors the window; a sentence that is not in the
/// list, or has no keywords, scores 0.
pub fn context_relevance<S: AsRef<str>>(sentence: &str, all_sentences: &[S]) -> f64 {
    let Some(idx) = all_sentences.iter().position(|s| s.as_ref() == sentence) else {
        return 0.0;
    };

    let start = idx.saturating_sub(CONTEXT_WINDOW);
    let end = (idx + CONTEXT_WINDOW + 1).min(all_sentences.len());
    let window_keywords: HashSet<String> = all_sentences[start..end]
        .iter()
        .flat_map(|s| extract_keywords(s.as_ref()))
        .collect();

    let own: HashSet<String> = extract_keywords(sentence).into_iter().collect();
    if own.is_empty() {
        return 0.0;
    }
    let overlap = own.iter().filter(|kw| window_keywords.contains(*kw)).count();
    overlap as f64 / own.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_sentence_scores_zero() {
        let all = ["alpha beta gamma"];
        assert_eq!(context_relevance("delta epsilon", &all), 0.0);
    }

    #[test]
    fn sentence_without_keywords_scores_zero() {
        let all = ["it is an ox", "gravity pulls mass"];
        assert_eq!(context_relevance("it is an ox", &all), 0.0);
    }

    #[test]
    fn sentence_in_own_window_is_fully_reinforced() {
        let all = ["gravity pulls mass", "orbits follow gravity"];
        assert_eq!(context_relevance("gravity pulls mass", &all), 1.0);
    }

    #[test]
    fn window_is_clamped_and_bounded() {
        let all: Vec<String> = (0..10).map(|i| format!("sentence{i} topic")).collect();
        assert_eq!(context_relevance(&all[0], &all), 1.0);
        assert_eq!(context_relevance(&all[9], &all), 1.0);
    }
}
