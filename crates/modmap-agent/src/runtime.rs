//! Bounded tool-use loop implementing [`InvestigativeAgent`].

use std::sync::Arc;

use async_trait::async_trait;
use modmap_core::{
    trim_history, AgentError, AgentFinding, AgentRequest, InvestigativeAgent, RegistryClient,
};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::message::{ContentBlock, Message, ModelRequest, Role, ToolDefinition};
use crate::model::ModelClient;
use crate::tools::{ToolPolicy, Toolbox};

/// Output tool through which the model reports its result.
pub const SUBMIT_RESULT: &str = "submit_result";

pub const DEFAULT_MAX_TOKENS: u32 = 4096;

const SUBMIT_REMINDER: &str = "Report your conclusion by calling the submit_result tool.";

pub fn submit_result_definition() -> ToolDefinition {
    ToolDefinition {
        name: SUBMIT_RESULT.to_string(),
        description: "Submit the final answer. Call exactly once when the investigation is complete."
            .to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "application_id": {"type": "string", "description": "Registry identifier, or NOT_FOUND"},
                "application_name": {"type": "string"},
                "confidence": {"type": "string", "enum": ["HIGH", "MEDIUM", "LOW"]},
                "reasoning": {"type": "string"},
                "metadata": {"type": "object"}
            },
            "required": ["application_id", "application_name", "confidence", "reasoning"]
        }),
    }
}

/// Decode a `submit_result` payload.
pub fn parse_submission(input: &Value) -> Result<AgentFinding, AgentError> {
    serde_json::from_value(input.clone())
        .map_err(|e| AgentError::MalformedOutput(format!("invalid submit_result payload: {e}")))
}

/// A result object embedded in a plain-text reply, possibly inside a code fence.
pub fn finding_from_text(text: &str) -> Option<AgentFinding> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}

/// Drives one investigation per call against a [`ModelClient`].
pub struct AgentRuntime {
    model: Arc<dyn ModelClient>,
    registry: Arc<dyn RegistryClient>,
    policy: ToolPolicy,
    max_tokens: u32,
}

impl AgentRuntime {
    pub fn new(model: Arc<dyn ModelClient>, registry: Arc<dyn RegistryClient>) -> Self {
        Self {
            model,
            registry,
            policy: ToolPolicy::investigation(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_policy(mut self, policy: ToolPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

#[async_trait]
impl InvestigativeAgent for AgentRuntime {
    async fn investigate(&self, request: AgentRequest) -> Result<AgentFinding, AgentError> {
        let limits = request.limits;
        let toolbox = Toolbox::open(&request.repo_root, Arc::clone(&self.registry), self.policy.clone())
            .map_err(|e| AgentError::Tool(e.to_string()))?;
        let mut tools = toolbox.definitions();
        tools.push(submit_result_definition());

        let mut messages = vec![Message::user_text(request.prompt.clone())];
        let mut turns: u32 = 0;
        let mut tool_calls: u32 = 0;

        loop {
            if turns >= limits.max_model_turns {
                warn!(module = %request.module_path, turns, "model turn limit reached");
                return Err(AgentError::TurnLimitExceeded {
                    limit: limits.max_model_turns,
                });
            }
            turns += 1;

            trim_history(&mut messages, &limits, |m| m.role == Role::Assistant);
            let reply = self
                .model
                .complete(ModelRequest {
                    system: &request.instructions,
                    messages: &messages,
                    tools: &tools,
                    max_tokens: self.max_tokens,
                })
                .await?;
            let uses = reply.tool_uses();
            debug!(
                module = %request.module_path,
                turn = turns,
                tool_uses = uses.len(),
                stop_reason = reply.stop_reason.as_deref().unwrap_or(""),
                "model turn"
            );
            let text = reply.text();
            messages.push(Message::assistant(reply.content));

            if uses.is_empty() {
                if let Some(finding) = finding_from_text(&text) {
                    info!(module = %request.module_path, turns, tool_calls, "result parsed from text reply");
                    return Ok(finding);
                }
                messages.push(Message::user_text(SUBMIT_REMINDER));
                continue;
            }

            let mut results = Vec::with_capacity(uses.len());
            for tool_use in uses {
                if tool_use.name == SUBMIT_RESULT {
                    match parse_submission(&tool_use.input) {
                        Ok(finding) => {
                            info!(module = %request.module_path, turns, tool_calls, "result submitted");
                            return Ok(finding);
                        }
                        Err(err) => {
                            results.push(ContentBlock::tool_error(tool_use.id, err.to_string()));
                            continue;
                        }
                    }
                }

                tool_calls += 1;
                if tool_calls > limits.max_tool_calls {
                    warn!(module = %request.module_path, tool_calls, "tool call limit reached");
                    return Err(AgentError::ToolCallLimitExceeded {
                        limit: limits.max_tool_calls,
                    });
                }
                match toolbox.execute(&tool_use.name, &tool_use.input).await {
                    Ok(output) => results.push(ContentBlock::tool_result(tool_use.id, output)),
                    Err(err) => {
                        debug!(tool = %tool_use.name, error = %err, "tool failed");
                        results.push(ContentBlock::tool_error(tool_use.id, err.to_string()));
                    }
                }
            }
            messages.push(Message::user(results));
        }
    }
}
