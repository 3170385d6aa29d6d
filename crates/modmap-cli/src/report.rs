//! JSON reports printed by the CLI and env-file export.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use modmap_core::{BatchOutcome, DiscoveredModule, Match, MatchSource, Unresolved};
use serde::Serialize;

/// Variable written for CI consumption.
pub const APP_ID_VAR: &str = "CONTRAST_APP_ID";

fn round_ms(ms: f64) -> f64 {
    (ms * 10.0).round() / 10.0
}

#[derive(Debug, Serialize)]
pub struct IdentifyReport {
    pub repo_path: String,
    pub app_id: Option<String>,
    pub app_name: Option<String>,
    pub confidence: Option<f64>,
    pub source: Option<MatchSource>,
    pub execution_time_ms: f64,
}

impl IdentifyReport {
    pub fn new(repo_path: &Path, hit: Option<&Match>, elapsed_ms: f64) -> Self {
        Self {
            repo_path: repo_path.display().to_string(),
            app_id: hit.map(|m| m.app_id.clone()),
            app_name: hit.map(|m| m.app_name.clone()),
            confidence: hit.map(|m| m.confidence),
            source: hit.map(|m| m.source),
            execution_time_ms: round_ms(elapsed_ms),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ModuleEntry {
    pub name: String,
    pub path: String,
    pub ecosystem: String,
    pub manifest: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub override_name: Option<String>,
}

impl From<&DiscoveredModule> for ModuleEntry {
    fn from(m: &DiscoveredModule) -> Self {
        Self {
            name: m.name.clone(),
            path: m.path.clone(),
            ecosystem: m.ecosystem.to_string(),
            manifest: m.manifest.to_string(),
            override_name: m.override_name().map(str::to_string),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MatchEntry {
    pub path: String,
    pub ecosystem: String,
    pub module: String,
    pub app_id: String,
    pub app_name: String,
    pub confidence: f64,
    pub search_term: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

impl From<&Match> for MatchEntry {
    fn from(m: &Match) -> Self {
        Self {
            path: m.module.path.clone(),
            ecosystem: m.module.ecosystem.to_string(),
            module: m.module.name.clone(),
            app_id: m.app_id.clone(),
            app_name: m.app_name.clone(),
            confidence: m.confidence,
            search_term: m.search_term.clone(),
            reasoning: m.reasoning.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UnmatchedEntry {
    pub path: String,
    pub ecosystem: String,
    pub module: String,
    pub reason: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl From<&Unresolved> for UnmatchedEntry {
    fn from(u: &Unresolved) -> Self {
        use modmap_core::UnresolvedReason::*;
        let detail = match &u.reason {
            NotFound { reasoning } => Some(reasoning.clone()),
            AgentFailed { error } => Some(error.clone()),
            NoCandidates | BelowThreshold | Ambiguous => None,
        };
        Self {
            path: u.module.path.clone(),
            ecosystem: u.module.ecosystem.to_string(),
            module: u.module.name.clone(),
            reason: u.reason.as_str(),
            detail,
        }
    }
}

/// All-modules report. Entries are lists ordered by module path and ecosystem.
#[derive(Debug, Serialize)]
pub struct MapReport {
    pub repo_path: String,
    pub total_modules: usize,
    pub deterministic_matched: Vec<MatchEntry>,
    pub llm_matched: Vec<MatchEntry>,
    pub unmatched: Vec<UnmatchedEntry>,
    pub execution_time_ms: f64,
}

impl MapReport {
    pub fn new(repo_path: &Path, outcome: &BatchOutcome, elapsed_ms: f64) -> Self {
        Self {
            repo_path: repo_path.display().to_string(),
            total_modules: outcome.total,
            deterministic_matched: outcome.deterministic.values().map(MatchEntry::from).collect(),
            llm_matched: outcome.agent.values().map(MatchEntry::from).collect(),
            unmatched: outcome.unresolved.values().map(UnmatchedEntry::from).collect(),
            execution_time_ms: round_ms(elapsed_ms),
        }
    }
}

pub fn env_line(app_id: Option<&str>) -> String {
    format!("{APP_ID_VAR}={}\n", app_id.unwrap_or_default())
}

/// Overwrite `path` with the app-id assignment.
pub fn write_env_file(path: &Path, app_id: Option<&str>) -> Result<()> {
    std::fs::write(path, env_line(app_id))
        .with_context(|| format!("failed to write {}", path.display()))
}

/// Append the app-id assignment to a GitHub Actions env file.
pub fn append_env_file(path: &Path, app_id: &str) -> Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    file.write_all(env_line(Some(app_id)).as_bytes())
        .with_context(|| format!("failed to append to {}", path.display()))
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    std::fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))
}
