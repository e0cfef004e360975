//! Token-sort similarity ratio on a 0-100 scale.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Lowercases, folds accents, treats punctuation as whitespace, and sorts
/// the remaining tokens.
fn normalize(text: &str) -> String {
    let folded: String = text
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();

    let mut tokens: Vec<&str> = folded.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Normalized Levenshtein similarity of the sorted token strings, rounded.
///
/// Symmetric, and reordering the words of either side does not change it.
pub fn token_sort_ratio(a: &str, b: &str) -> u8 {
    let similarity = strsim::normalized_levenshtein(&normalize(a), &normalize(b));
    (similarity * 100.0).round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  Senior, Rust-Engineer!! "), "engineer rust senior");
        assert_eq!(normalize("Café Zürich"), "cafe zurich");
        assert_eq!(normalize("..."), "");
    }

    #[test]
    fn test_identical_and_reordered() {
        assert_eq!(token_sort_ratio("Software Engineer", "Software Engineer"), 100);
        assert_eq!(token_sort_ratio("Engineer Software", "software, ENGINEER"), 100);
    }

    #[test]
    fn test_symmetric() {
        let pairs = [
            ("Software Engineer", "Software Developer"),
            ("Backend Rust developer", "Frontend TypeScript"),
            ("", "Data Scientist"),
        ];
        for (a, b) in pairs {
            assert_eq!(token_sort_ratio(a, b), token_sort_ratio(b, a), "{a} / {b}");
        }
    }

    #[test]
    fn test_similar_titles_score_in_middle() {
        let score = token_sort_ratio("Software Engineer", "Software Developer");
        assert!((51..90).contains(&score), "score was {score}");
    }

    #[test]
    fn test_unrelated_texts_score_low() {
        assert!(token_sort_ratio("Rust systems programmer", "Pastry chef") < 40);
        assert_eq!(token_sort_ratio("", "anything"), 0);
    }
}
