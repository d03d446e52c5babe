//! Approximate symbol matching
//!
//! Scores are on a 0-100 integer scale. `token_set_ratio` compares the
//! shared and distinct word sets of two strings so that word order and
//! repeated words do not matter; the underlying pairwise ratio is a
//! normalized Levenshtein similarity.

use lazy_static::lazy_static;
use rayon::prelude::*;
use regex::Regex;
use std::cmp::Ordering;
use std::collections::BTreeSet;

lazy_static! {
    static ref NON_ALNUM_RE: Regex = Regex::new(r"[^\p{L}\p{N}]+").unwrap();
}

/// Lowercase, replace non-alphanumeric runs with a space, trim.
pub fn preprocess(s: &str) -> String {
    NON_ALNUM_RE
        .replace_all(&s.to_lowercase(), " ")
        .trim()
        .to_string()
}

/// Plain edit-distance similarity, 0-100. Empty input scores 0.
pub fn ratio(a: &str, b: &str) -> u8 {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    (strsim::normalized_levenshtein(a, b) * 100.0).round() as u8
}

pub fn token_set_ratio(a: &str, b: &str) -> u8 {
    let a = preprocess(a);
    let b = preprocess(b);
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();

    let join = |set: Vec<&str>| set.join(" ");
    let intersection = join(tokens_a.intersection(&tokens_b).copied().collect());
    let only_a = join(tokens_a.difference(&tokens_b).copied().collect());
    let only_b = join(tokens_b.difference(&tokens_a).copied().collect());

    let combine = |rest: &str| {
        if intersection.is_empty() {
            rest.to_string()
        } else if rest.is_empty() {
            intersection.clone()
        } else {
            format!("{} {}", intersection, rest)
        }
    };
    let combined_a = combine(&only_a);
    let combined_b = combine(&only_b);

    [
        ratio(&intersection, &combined_a),
        ratio(&intersection, &combined_b),
        ratio(&combined_a, &combined_b),
    ]
    .into_iter()
    .max()
    .unwrap_or(0)
}

/// Single best-scoring candidate for `query`.
///
/// Ties go to the lexicographically smallest candidate, so the result does
/// not depend on the order of `candidates`. Returns `None` when there are no
/// candidates.
pub fn best_match<'a>(query: &str, candidates: &'a [String]) -> Option<(&'a str, u8)> {
    candidates
        .par_iter()
        .map(|c| (c.as_str(), token_set_ratio(query, c)))
        .reduce_with(|a, b| match a.1.cmp(&b.1) {
            Ordering::Greater => a,
            Ordering::Less => b,
            Ordering::Equal => {
                if a.0 <= b.0 {
                    a
                } else {
                    b
                }
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preprocess() {
        assert_eq!(preprocess("  BRCA-1 (human) "), "brca 1 human");
        assert_eq!(preprocess("---"), "");
    }

    #[test]
    fn test_ratio() {
        assert_eq!(ratio("brca1", "brca1"), 100);
        assert_eq!(ratio("", "brca1"), 0);
        assert_eq!(ratio("brcaa1", "brca1"), 83);
    }

    #[test]
    fn test_token_set_ratio_ignores_order_and_case() {
        assert_eq!(token_set_ratio("tumor protein p53", "P53 Tumor Protein"), 100);
        assert_eq!(token_set_ratio("BRCA1", "brca1"), 100);
    }

    #[test]
    fn test_token_set_ratio_subset_scores_full() {
        // Every token of the shorter string appears in the longer one
        assert_eq!(token_set_ratio("BRCA1", "BRCA1 DNA repair associated"), 100);
    }

    #[test]
    fn test_token_set_ratio_empty() {
        assert_eq!(token_set_ratio("", "BRCA1"), 0);
        assert_eq!(token_set_ratio("!!", "BRCA1"), 0);
    }

    #[test]
    fn test_best_match_prefers_higher_score() {
        let candidates = vec!["TP53".to_string(), "BRCA1".to_string(), "BRCA2".to_string()];
        let (key, score) = best_match("BRCAA1", &candidates).unwrap();
        assert_eq!(key, "BRCA1");
        assert!(score > 0);
    }

    #[test]
    fn test_best_match_ties_are_deterministic() {
        let forward = vec!["ABC2".to_string(), "ABC1".to_string()];
        let backward = vec!["ABC1".to_string(), "ABC2".to_string()];
        assert_eq!(best_match("ABC", &forward), Some(("ABC1", 75)));
        assert_eq!(best_match("ABC", &backward), Some(("ABC1", 75)));
    }

    #[test]
    fn test_best_match_empty_candidates() {
        assert_eq!(best_match("BRCA1", &[]), None);
    }
}
