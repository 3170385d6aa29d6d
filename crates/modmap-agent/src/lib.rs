//! Fallback-phase agent runtime for modmap.
//!
//! [`AgentRuntime`] implements [`modmap_core::InvestigativeAgent`] as a
//! tool-use loop over a [`ModelClient`]. The model sees a read-only view of
//! the repository and a registry search tool, and reports through a
//! `submit_result` tool. Turn and tool-call ceilings come from the request's
//! [`modmap_core::AgentLimits`].

pub mod anthropic;
pub mod config;
pub mod fakes;
pub mod message;
pub mod model;
pub mod runtime;
pub mod tools;

pub use anthropic::{AnthropicClient, ClientSetupError};
pub use config::{parse_agent_model, LlmConfig, LlmConfigError, LlmProvider};
pub use message::{ContentBlock, Message, ModelReply, ModelRequest, Role, ToolDefinition};
pub use model::ModelClient;
pub use runtime::{AgentRuntime, SUBMIT_RESULT};
pub use tools::{ToolCapability, ToolError, ToolPolicy, Toolbox};
