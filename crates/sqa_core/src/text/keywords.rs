//! Frequency-ranked keyword extraction.

use indexmap::IndexMap;

/// Function words that never count as keywords.
pub const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "is", "are", "was",
    "were",
];

/// Tokens of this length or shorter are discarded.
pub const MIN_TOKEN_LEN: usize = 2;

/// Upper bound on keywords returned per text.
pub const MAX_KEYWORDS: usize = 5;

fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.contains(&token)
}

/// Lower-cased tokens with punctuation stripped. Only ASCII word characters survive, so
/// `"don't"` becomes `"dont"` and accented letters are dropped.
fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split_whitespace().filter_map(|raw| {
        let token: String = raw
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        (token.len() > MIN_TOKEN_LEN && !is_stop_word(&token)).then_some(token)
    })
}

/// Return up to [`MAX_KEYWORDS`] salient tokens of `text`.
///
/// Ranking: frequency desc, then longer token first, then first occurrence.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let mut freq: IndexMap<String, usize> = IndexMap::new();
    for token in tokens(text) {
        *freq.entry(token).or_insert(0) += 1;
    }

    let mut ranked: Vec<(String, usize)> = freq.into_iter().collect();
    // Stable sort keeps first-seen order for full ties.
    ranked.sort_by(|(a, fa), (b, fb)| fb.cmp(fa).then(b.len().cmp(&a.len())));
    ranked
        .into_iter()
        .take(MAX_KEYWORDS)
        .map(|(token, _)| token)
        .collect()
}
