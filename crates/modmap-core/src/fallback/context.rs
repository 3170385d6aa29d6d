//! Assembles the instruction block handed to the investigative agent.
//!
//! Every module-derived or registry-derived string passes through
//! [`sanitize`] before interpolation.

use std::fmt::Write;

use super::sanitize::sanitize;
use crate::config::ResolverConfig;
use crate::domain::{DiscoveredModule, Match};
use crate::scoring::Scored;

/// Best score below which names are considered to share almost no tokens.
pub const VERY_LOW_SCORE: f64 = 0.3;
/// Best score below which a candidate is close but not confident.
pub const CLOSE_SCORE: f64 = 0.5;

/// Inputs for one module's instruction block.
#[derive(Debug)]
pub struct InvestigationContext<'a> {
    pub module: &'a DiscoveredModule,
    /// Deterministic scores, highest first.
    pub ranked: &'a [Scored<'a>],
    /// Modules already resolved earlier in this run.
    pub siblings: &'a [Match],
    pub ambiguous: bool,
}

/// Ranked summary of what deterministic scoring already tried.
pub fn scoring_summary(ranked: &[Scored<'_>], ambiguous: bool, top_n: usize) -> String {
    let shown: Vec<&Scored<'_>> = ranked.iter().take(top_n).collect();
    let Some(best) = shown.first() else {
        return "No candidates scored above 0.0. The module name may be very different \
                from any registry application name."
            .to_string();
    };

    let mut out = String::from("Top candidates from deterministic scoring:");
    for s in &shown {
        let _ = write!(
            out,
            "\n  - {} (id={}, lang={}) -> score={:.2}",
            sanitize(&s.candidate.name),
            sanitize(&s.candidate.id),
            sanitize(&s.candidate.language),
            s.score
        );
    }

    if best.score < VERY_LOW_SCORE {
        out.push_str("\nAll scores are very low: names have little token overlap.");
    } else if best.score < CLOSE_SCORE {
        out.push_str(
            "\nBest score is below the 0.5 threshold: close but not confident enough.",
        );
    }
    if ambiguous {
        out.push_str(
            "\nSeveral candidates score similarly well; the top score alone is not reliable. \
             Decide which one (if any) this module belongs to.",
        );
    }
    out
}

fn siblings_block(siblings: &[Match]) -> String {
    if siblings.is_empty() {
        return String::new();
    }
    let mut out = String::from("OTHER MODULES IN THIS REPOSITORY ALREADY MATCHED:");
    for m in siblings {
        let _ = write!(
            out,
            "\n  - {} ({}) -> {} (id={})",
            sanitize(&m.module.path),
            m.module.ecosystem,
            sanitize(&m.app_name),
            sanitize(&m.app_id)
        );
    }
    out.push_str("\nConsider whether this module belongs to the same application.");
    out
}

/// System instructions for one investigation.
pub fn build_instructions(ctx: &InvestigationContext<'_>, config: &ResolverConfig) -> String {
    let module = ctx.module;
    let name = sanitize(&module.name);
    let path = sanitize(&module.path);
    let override_line = module
        .override_name()
        .map(|o| format!("- Operator-declared application name: {}\n", sanitize(o)))
        .unwrap_or_default();
    let summary = scoring_summary(ctx.ranked, ctx.ambiguous, config.top_candidates);
    let siblings = siblings_block(ctx.siblings);
    let reads = config.investigation.max_file_reads;
    let searches = config.investigation.max_registry_searches;

    format!(
        r#"You are resolving a code module to its entry in an application registry.

Deterministic name scoring could not confidently match this module. Investigate and
either find the correct registry application or confirm that none exists.

MODULE INFORMATION:
- Name: {name}
- Path: {path}
- Ecosystem: {ecosystem}
- Manifest: {manifest}
{override_line}
DETERMINISTIC SCORING CONTEXT:
{summary}
{siblings}

STEPS (follow in order, stop as soon as you have a match):

1. REVIEW CONTEXT: the scorer uses token overlap (Jaccard similarity) plus language
   alignment. If a candidate looks plausible despite a low score, note why.

2. READ MODULE FILES: read key files inside {path} for clues: README, build
   configuration, main source files. Look for application, service or deployment names.

3. SEARCH THE REGISTRY: try alternative search terms based on what you found
   (abbreviations, acronyms, deployment names, service names).

4. SUBMIT: call submit_result with HIGH, MEDIUM or LOW confidence and your reasoning.
   If no match exists submit application_id="{sentinel}", application_name="{sentinel}",
   confidence="LOW", and explain why.

A language mismatch alone is not a reason to reject a candidate: in monorepos a
frontend and a backend often share one registry application.

COST DISCIPLINE: every tool call costs tokens. Stop as soon as the evidence is enough.

DO NOT:
- Read more than {reads} files in total
- Make more than {searches} registry search calls
- Explore directories outside {path}
"#,
        ecosystem = module.ecosystem,
        manifest = module.manifest,
        sentinel = super::agent::NOT_FOUND_SENTINEL,
    )
}

/// Opening user message for one investigation.
pub fn build_prompt(module: &DiscoveredModule) -> String {
    format!(
        "Resolve the module '{}' at path '{}' to a registry application. Use the tools \
         available to investigate and find the best match.",
        sanitize(&module.name),
        sanitize(&module.path)
    )
}
