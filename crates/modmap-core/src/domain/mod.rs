//! Domain model: modules, candidates, matches, and errors.

pub mod candidate;
pub mod error;
pub mod matching;
pub mod module;

pub use candidate::Candidate;
pub use error::{RegistryError, ResolveError, Result};
pub use matching::{Match, MatchSource};
pub use module::{DiscoveredModule, Ecosystem, Manifest, ModuleKey};
