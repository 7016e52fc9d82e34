use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

static NORMALIZE_RUN: LazyLock<Regex> =
    LazyLock::new(|| match Regex::new(r"[.,/#!$%^&*;:{}=\-_`~()?\s]+") {
        Ok(re) => re,
        Err(err) => panic!("normalize regex is invalid: {err}"),
    });

/// Lower-case and collapse punctuation/whitespace runs into single spaces.
pub fn normalize_text(text: &str) -> String {
    NORMALIZE_RUN
        .replace_all(&text.to_lowercase(), " ")
        .trim()
        .to_string()
}

fn bigrams(chars: &[char]) -> impl Iterator<Item = (char, char)> + '_ {
    chars.windows(2).map(|w| (w[0], w[1]))
}

/// Sørensen–Dice coefficient over character bigrams, case-insensitive, whitespace ignored.
///
/// Returns 1.0 for identical inputs and 0.0 when either side has fewer than two characters.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.to_lowercase().chars().filter(|c| !c.is_whitespace()).collect();
    let b: Vec<char> = b.to_lowercase().chars().filter(|c| !c.is_whitespace()).collect();

    if a == b {
        return 1.0;
    }
    if a.len() < 2 || b.len() < 2 {
        return 0.0;
    }

    let mut counts: HashMap<(char, char), usize> = HashMap::new();
    for bg in bigrams(&a) {
        *counts.entry(bg).or_insert(0) += 1;
    }

    let mut shared = 0usize;
    for bg in bigrams(&b) {
        if let Some(n) = counts.get_mut(&bg) {
            if *n > 0 {
                *n -= 1;
                shared += 1;
            }
        }
    }

    (2.0 * shared as f64) / ((a.len() - 1) + (b.len() - 1)) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_and_case_insensitive() {
        assert_eq!(similarity("Gravity", "gravity"), 1.0);
        assert_eq!(similarity("x", "x"), 1.0);
    }

    #[test]
    fn disjoint_is_zero() {
        assert_eq!(similarity("abc", "xyz"), 0.0);
        assert_eq!(similarity("a", "b"), 0.0);
        assert_eq!(similarity("", "ab"), 0.0);
    }

    #[test]
    fn is_symmetric() {
        let pairs = [
            ("night", "nacht"),
            ("what is gravity", "what is a gravity well"),
            ("aaab", "ab"),
        ];
        for (a, b) in pairs {
            assert_eq!(similarity(a, b), similarity(b, a));
        }
    }

    #[test]
    fn repeated_bigrams_are_counted_once_each() {
        // "aaaa" has bigrams aa,aa,aa; "aa" has one. 2*1 / (3+1)
        assert!((similarity("aaaa", "aa") - 0.5).abs() < 1e-12);
    }

    #[test]
    fn more_overlap_scores_higher() {
        let base = "photosynthesis";
        assert!(similarity(base, "photosynthetic") > similarity(base, "photograph"));
    }

    #[test]
    fn normalize_collapses_punctuation_and_whitespace() {
        assert_eq!(normalize_text("What   is the capital ?"), "what is the capital");
        assert_eq!(normalize_text("  Q: (a) x_y--z!  "), "q a x y z");
        assert_eq!(normalize_text("..."), "");
    }
}
