//! Character-trigram similarity for near-duplicate string matching.
//!
//! Strings are lower-cased and padded with leading/trailing spaces before
//! trigram extraction, so word boundaries contribute grams and one-word
//! queries still match.

use std::collections::HashSet;

fn trigrams(text: &str) -> HashSet<String> {
    let normalized = format!("  {}  ", text.to_lowercase());
    let chars: Vec<char> = normalized.chars().collect();
    let mut grams = HashSet::new();
    for window in chars.windows(3) {
        grams.insert(window.iter().collect());
    }
    grams
}

/// Trigram-set overlap in [0, 1]. Empty inputs score 0.0.
pub fn similarity(a: &str, b: &str) -> f32 {
    if a.trim().is_empty() || b.trim().is_empty() {
        return 0.0;
    }
    let grams_a = trigrams(a);
    let grams_b = trigrams(b);
    let intersection = grams_a.intersection(&grams_b).count();
    let union = grams_a.union(&grams_b).count();
    if union == 0 {
        0.0
    } else {
        intersection as f32 / union as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_strings_are_fully_similar() {
        assert!((similarity("machine learning", "machine learning") - 1.0).abs() < 1e-6);
    }

    #[test]
    fn case_is_ignored() {
        assert!((similarity("Machine Learning", "machine learning") - 1.0).abs() < 1e-6);
    }

    #[test]
    fn near_duplicates_score_high() {
        let s = similarity("machine learning basics", "machine learning basic");
        assert!(s > 0.8, "got {}", s);
    }

    #[test]
    fn unrelated_strings_score_low() {
        let s = similarity("machine learning", "how to bake bread");
        assert!(s < 0.3, "got {}", s);
    }

    #[test]
    fn empty_input_scores_zero() {
        assert_eq!(similarity("", "anything"), 0.0);
        assert_eq!(similarity("anything", "   "), 0.0);
    }
}
