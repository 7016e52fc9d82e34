use std::sync::LazyLock;

use regex::Regex;

pub mod context;
pub mod keywords;
pub mod similarity;

/// Sentences at or below this many characters are ignored as answer candidates.
pub const MIN_SENTENCE_CHARS: usize = 20;

static PARAGRAPH_BREAK: LazyLock<Regex> = LazyLock::new(|| match Regex::new(r"\n\s*\n") {
    Ok(re) => re,
    Err(err) => panic!("paragraph regex is invalid: {err}"),
});

static SENTENCE_END: LazyLock<Regex> = LazyLock::new(|| match Regex::new(r"[.!?]+") {
    Ok(re) => re,
    Err(err) => panic!("sentence regex is invalid: {err}"),
});

/// Split on blank-line boundaries. Paragraphs are returned untrimmed; empty input yields one
/// empty paragraph.
pub fn split_paragraphs(text: &str) -> Vec<&str> {
    PARAGRAPH_BREAK.split(text).collect()
}

/// Candidate answer sentences: paragraphs split on runs of `.`, `!`, `?`, trimmed, keeping only
/// those longer than [`MIN_SENTENCE_CHARS`] characters.
pub fn split_sentences(text: &str) -> Vec<String> {
    split_paragraphs(text)
        .into_iter()
        .flat_map(|p| SENTENCE_END.split(p))
        .map(str::trim)
        .filter(|s| s.chars().count() > MIN_SENTENCE_CHARS)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paragraphs_split_on_blank_lines_with_whitespace() {
        let paras = split_paragraphs("one\ntwo\n  \nthree\n\nfour");
        assert_eq!(paras, vec!["one\ntwo", "three", "four"]);
    }

    #[test]
    fn crlf_blank_lines_also_split() {
        assert_eq!(split_paragraphs("a\r\n\r\nb"), vec!["a\r", "b"]);
    }

    #[test]
    fn sentences_drop_short_fragments() {
        let s = split_sentences("Paris is the capital of France. It has the Eiffel Tower. Ok!");
        assert_eq!(
            s,
            vec![
                "Paris is the capital of France".to_string(),
                "It has the Eiffel Tower".to_string()
            ]
        );
    }

    #[test]
    fn sentences_cross_paragraphs() {
        let s = split_sentences("Photosynthesis happens in leaves.\n\nRoots absorb water from soil?!");
        assert_eq!(s.len(), 2);
        assert_eq!(s[1], "Roots absorb water from soil");
    }
}
