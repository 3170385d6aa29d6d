//! Fallback phase: investigative agent contract, context assembly, and
//! reconciliation.

pub mod agent;
pub mod context;
pub mod error;
pub mod history;
pub mod orchestrator;
pub mod sanitize;

pub use agent::{AgentConfidence, AgentFinding, AgentRequest, InvestigativeAgent, NOT_FOUND_SENTINEL};
pub use error::AgentError;
pub use history::trim_history;
pub use orchestrator::{reconcile, FallbackOrchestrator, FallbackOutcome, FallbackReason};
pub use sanitize::{sanitize, MAX_SANITIZED_LEN};
