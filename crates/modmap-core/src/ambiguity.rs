//! Ambiguity detection: is the best match contested?

use crate::domain::{Candidate, DiscoveredModule};
use crate::scoring::score_candidate;
use crate::search_term::extract_search_term;

/// True when at least two candidates score at or above `floor`.
///
/// Callers decide whether the check applies at all: a module carrying an
/// operator override is never routed here.
pub fn is_ambiguous(module: &DiscoveredModule, candidates: &[Candidate], floor: f64) -> bool {
    let term = extract_search_term(module);
    let mut strong = 0usize;
    for candidate in candidates {
        if score_candidate(module, candidate, &term) >= floor {
            strong += 1;
            if strong > 1 {
                return true;
            }
        }
    }
    false
}
