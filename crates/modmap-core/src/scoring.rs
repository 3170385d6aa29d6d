//! Candidate scoring: exact match, token Jaccard, and language alignment.

use std::collections::HashSet;

use regex::Regex;
use std::sync::OnceLock;

use crate::domain::{Candidate, DiscoveredModule};

/// Score for an exact name match whose language aligns.
pub const EXACT_MATCH: f64 = 1.0;
/// Score for an exact name match in a different (or unknown) language.
pub const EXACT_MATCH_OTHER_LANGUAGE: f64 = 0.8;
/// Weight applied to token Jaccard similarity.
pub const JACCARD_WEIGHT: f64 = 0.7;
/// Bonus when the candidate language matches the module ecosystem.
pub const LANGUAGE_BONUS: f64 = 0.2;

fn separators() -> &'static Regex {
    static SEPARATORS: OnceLock<Regex> = OnceLock::new();
    SEPARATORS.get_or_init(|| Regex::new(r"[-_.\s]+").expect("static separator pattern"))
}

/// Lowercased, non-empty tokens of `text`, split on runs of `-`, `_`, `.` and whitespace.
pub fn tokenize(text: &str) -> HashSet<String> {
    separators()
        .split(&text.to_lowercase())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Whether `candidate` carries the registry language for the module's ecosystem.
pub fn language_matches(module: &DiscoveredModule, candidate: &Candidate) -> bool {
    candidate.language == module.ecosystem.registry_language()
}

/// Similarity between `search_term` and `candidate`, in `[0.0, 1.0]`.
pub fn score_candidate(module: &DiscoveredModule, candidate: &Candidate, search_term: &str) -> f64 {
    let term = search_term.to_lowercase();
    let name = candidate.name.to_lowercase();
    let lang_ok = language_matches(module, candidate);

    if term == name {
        return if lang_ok {
            EXACT_MATCH
        } else {
            EXACT_MATCH_OTHER_LANGUAGE
        };
    }

    let a = tokenize(&term);
    let b = tokenize(&name);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let shared = a.intersection(&b).count();
    let union = a.union(&b).count();
    let jaccard = shared as f64 / union as f64;

    let mut score = jaccard * JACCARD_WEIGHT;
    if lang_ok {
        score += LANGUAGE_BONUS;
    }
    score.min(1.0)
}

/// A candidate paired with its score.
#[derive(Debug, Clone, PartialEq)]
pub struct Scored<'a> {
    pub candidate: &'a Candidate,
    pub score: f64,
}

/// Score every candidate, highest first. Equal scores keep registry order.
pub fn rank<'a>(
    module: &DiscoveredModule,
    candidates: &'a [Candidate],
    search_term: &str,
) -> Vec<Scored<'a>> {
    let mut scored: Vec<Scored<'a>> = candidates
        .iter()
        .map(|candidate| Scored {
            candidate,
            score: score_candidate(module, candidate, search_term),
        })
        .collect();
    scored.sort_by(|x, y| y.score.total_cmp(&x.score));
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Manifest;

    fn java(name: &str) -> DiscoveredModule {
        DiscoveredModule::new(name, ".", Manifest::PomXml)
    }

    #[test]
    fn tokenize_splits_on_separator_runs() {
        let tokens = tokenize("Order__API-v2. service");
        let expected: HashSet<String> = ["order", "api", "v2", "service"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(tokens, expected);
    }

    #[test]
    fn tokenize_separators_only_is_empty() {
        assert!(tokenize("-_. ").is_empty());
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn exact_match_is_case_insensitive() {
        let m = java("x");
        let c = Candidate::new("1", "Order-API", "Java");
        assert_eq!(score_candidate(&m, &c, "order-api"), 1.0);
    }

    #[test]
    fn exact_match_other_language() {
        let m = java("x");
        let c = Candidate::new("1", "order-api", "Node");
        assert_eq!(score_candidate(&m, &c, "order-api"), 0.8);
    }

    #[test]
    fn partial_overlap_with_language() {
        // {order, api} vs {order, service}: 1/3 * 0.7 + 0.2
        let m = java("x");
        let c = Candidate::new("1", "order-service", "Java");
        let s = score_candidate(&m, &c, "order-api");
        assert!((s - (0.7 / 3.0 + 0.2)).abs() < 1e-12);
    }

    #[test]
    fn same_tokens_different_separators() {
        let m = java("x");
        let c = Candidate::new("1", "order_api", "");
        let s = score_candidate(&m, &c, "order-api");
        assert!((s - 0.7).abs() < 1e-12);
    }

    #[test]
    fn language_compare_is_exact() {
        let m = java("x");
        let c = Candidate::new("1", "order-api", "java");
        assert_eq!(score_candidate(&m, &c, "order-api"), 0.8);
    }

    #[test]
    fn rank_orders_descending_and_is_stable() {
        let m = java("x");
        let cands = vec![
            Candidate::new("a", "abc", "Java"),
            Candidate::new("b", "order-api", "Java"),
            Candidate::new("c", "def", "Java"),
        ];
        let ranked = rank(&m, &cands, "order-api");
        assert_eq!(ranked[0].candidate.id, "b");
        assert_eq!(ranked[1].candidate.id, "a");
        assert_eq!(ranked[2].candidate.id, "c");
    }
}
