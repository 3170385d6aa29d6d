//! Deterministic resolution against one registry snapshot.

use std::collections::BTreeMap;

use crate::domain::{Candidate, DiscoveredModule, Match, ModuleKey};
use crate::scoring::score_candidate;
use crate::search_term::extract_search_term;

/// Best-scoring candidate for `module` regardless of any threshold.
///
/// Ties keep the first candidate seen. Returns `None` only when `candidates`
/// is empty or every candidate scores exactly zero.
pub fn best_candidate<'a>(
    module: &DiscoveredModule,
    candidates: &'a [Candidate],
    search_term: &str,
) -> Option<(&'a Candidate, f64)> {
    let mut best: Option<&Candidate> = None;
    let mut best_score = 0.0;
    for candidate in candidates {
        let score = score_candidate(module, candidate, search_term);
        if score > best_score {
            best_score = score;
            best = Some(candidate);
        }
    }
    best.map(|c| (c, best_score))
}

/// Resolve one module. `None` means nothing cleared `threshold`.
pub fn resolve_module(
    module: &DiscoveredModule,
    candidates: &[Candidate],
    threshold: f64,
) -> Option<Match> {
    if candidates.is_empty() {
        return None;
    }
    let term = extract_search_term(module);
    let (candidate, score) = best_candidate(module, candidates, &term)?;
    if score < threshold {
        return None;
    }
    Some(Match::deterministic(module, candidate, score, term))
}

/// Resolve every module against the same candidate snapshot.
///
/// The returned map has exactly one entry per input module.
pub fn resolve_modules(
    modules: &[DiscoveredModule],
    candidates: &[Candidate],
    threshold: f64,
) -> BTreeMap<ModuleKey, Option<Match>> {
    modules
        .iter()
        .map(|m| (m.key(), resolve_module(m, candidates, threshold)))
        .collect()
}
