//! modmap core library
//!
//! Maps the modules of a repository onto entries of an external application
//! registry. Resolution runs in two phases:
//!
//! 1. Deterministic: search-term extraction, token-overlap scoring, threshold
//!    acceptance and ambiguity detection against one registry snapshot.
//! 2. Fallback: modules the first phase could not settle are handed to an
//!    [`InvestigativeAgent`] with bounded, read-only tool access.
//!
//! Discovery, the registry and the agent runtime are collaborators behind the
//! [`ModuleSource`], [`RegistryClient`] and [`InvestigativeAgent`] traits.

pub mod ambiguity;
pub mod config;
pub mod discovery;
pub mod domain;
pub mod fakes;
pub mod fallback;
pub mod metrics;
pub mod obs;
pub mod pipeline;
pub mod registry;
pub mod resolver;
pub mod scoring;
pub mod search_term;
pub mod telemetry;

pub use ambiguity::is_ambiguous;
pub use config::{AgentLimits, InvestigationBudget, ResolverConfig};
pub use discovery::ModuleSource;
pub use domain::{
    Candidate, DiscoveredModule, Ecosystem, Manifest, Match, MatchSource, ModuleKey,
    RegistryError, ResolveError, Result,
};
pub use fallback::{
    reconcile, sanitize, trim_history, AgentConfidence, AgentError, AgentFinding, AgentRequest,
    FallbackOrchestrator, FallbackOutcome, FallbackReason, InvestigativeAgent,
    NOT_FOUND_SENTINEL,
};
pub use pipeline::{BatchOutcome, Pipeline, Unresolved, UnresolvedReason};
pub use registry::{fetch_snapshot, RegistryClient};
pub use resolver::{resolve_module, resolve_modules};
pub use scoring::{rank, score_candidate, tokenize, Scored};
pub use search_term::extract_search_term;
pub use telemetry::init_tracing;

/// Crate version, reported by the CLI.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
