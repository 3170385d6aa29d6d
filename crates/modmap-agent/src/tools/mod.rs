//! Tools available to the investigating model.
//!
//! - [`fs`]: `RepoFs`, read-only access confined to the repository root
//! - [`policy`]: `ToolCapability`, `ToolPolicy` (first match, default deny)
//! - [`error`]: `ToolError`

pub mod error;
pub mod fs;
pub mod policy;

use std::path::Path;
use std::sync::Arc;

use modmap_core::RegistryClient;
use serde_json::{json, Value};
use tracing::debug;

use crate::message::ToolDefinition;

pub use error::{ToolError, ToolResult};
pub use fs::RepoFs;
pub use policy::{PolicyVerdict, ToolCapability, ToolPolicy, ToolPolicyRule};

pub const LIST_DIRECTORY: &str = "list_directory";
pub const SEARCH_FILES: &str = "search_files";
pub const READ_TEXT_FILE: &str = "read_text_file";
pub const SEARCH_APPLICATIONS: &str = "search_applications";

/// Registry entries returned by one search.
pub const MAX_REGISTRY_RESULTS: usize = 25;

/// Capability a tool requires, or `None` for unknown tools.
pub fn capability_of(tool: &str) -> Option<ToolCapability> {
    match tool {
        LIST_DIRECTORY | SEARCH_FILES | READ_TEXT_FILE => Some(ToolCapability::FileRead),
        SEARCH_APPLICATIONS => Some(ToolCapability::RegistrySearch),
        _ => None,
    }
}

fn definition(name: &str, description: &str, input_schema: Value) -> ToolDefinition {
    ToolDefinition {
        name: name.to_string(),
        description: description.to_string(),
        input_schema,
    }
}

fn all_definitions() -> Vec<ToolDefinition> {
    vec![
        definition(
            LIST_DIRECTORY,
            "List the entries of a repository directory. Paths are relative to the repository root.",
            json!({
                "type": "object",
                "properties": {"path": {"type": "string", "description": "Directory path, '.' for the root"}},
                "required": ["path"]
            }),
        ),
        definition(
            SEARCH_FILES,
            "Find files or directories whose name matches a glob pattern, searching recursively from a directory.",
            json!({
                "type": "object",
                "properties": {
                    "path": {"type": "string", "description": "Directory to search from"},
                    "pattern": {"type": "string", "description": "Glob such as '*.md' or 'deploy/*.yaml'"}
                },
                "required": ["path", "pattern"]
            }),
        ),
        definition(
            READ_TEXT_FILE,
            "Read a text file from the repository. Large files are truncated.",
            json!({
                "type": "object",
                "properties": {"path": {"type": "string"}},
                "required": ["path"]
            }),
        ),
        definition(
            SEARCH_APPLICATIONS,
            "Search the application registry by name fragment. Returns id, name and language of matching applications.",
            json!({
                "type": "object",
                "properties": {"filter": {"type": "string", "description": "Text to match against application names"}},
                "required": ["filter"]
            }),
        ),
    ]
}

fn str_arg<'a>(tool: &str, input: &'a Value, key: &str) -> ToolResult<&'a str> {
    input
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| ToolError::InvalidInput {
            tool: tool.to_string(),
            reason: format!("missing string argument '{key}'"),
        })
}

/// Per-invocation tool session. Dropped when the investigation ends.
pub struct Toolbox {
    fs: RepoFs,
    registry: Arc<dyn RegistryClient>,
    policy: ToolPolicy,
}

impl Toolbox {
    pub fn open(
        repo_root: &Path,
        registry: Arc<dyn RegistryClient>,
        policy: ToolPolicy,
    ) -> ToolResult<Self> {
        Ok(Self {
            fs: RepoFs::open(repo_root)?,
            registry,
            policy,
        })
    }

    pub fn fs(&self) -> &RepoFs {
        &self.fs
    }

    /// Tools the policy permits. Denied tools are not advertised.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        all_definitions()
            .into_iter()
            .filter(|def| {
                capability_of(&def.name).is_some_and(|cap| self.policy.evaluate(&cap).is_allowed())
            })
            .collect()
    }

    pub async fn execute(&self, tool: &str, input: &Value) -> ToolResult<String> {
        let capability =
            capability_of(tool).ok_or_else(|| ToolError::UnknownTool(tool.to_string()))?;
        if let PolicyVerdict::Denied { reason } = self.policy.evaluate(&capability) {
            return Err(ToolError::Denied {
                tool: tool.to_string(),
                reason,
            });
        }
        debug!(tool, %capability, "executing tool");

        match tool {
            LIST_DIRECTORY => self.fs.list_directory(str_arg(tool, input, "path")?),
            SEARCH_FILES => self.fs.search_files(
                str_arg(tool, input, "path")?,
                str_arg(tool, input, "pattern")?,
            ),
            READ_TEXT_FILE => self.fs.read_text_file(str_arg(tool, input, "path")?),
            SEARCH_APPLICATIONS => {
                let filter = str_arg(tool, input, "filter")?;
                let found = self.registry.search(filter).await?;
                let total = found.len();
                let shown: Vec<Value> = found
                    .iter()
                    .take(MAX_REGISTRY_RESULTS)
                    .map(|c| json!({"id": c.id, "name": c.name, "language": c.language}))
                    .collect();
                Ok(json!({"total": total, "applications": shown}).to_string())
            }
            other => Err(ToolError::UnknownTool(other.to_string())),
        }
    }
}
