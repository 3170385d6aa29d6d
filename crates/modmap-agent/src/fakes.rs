//! Scripted model client for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use modmap_core::AgentError;
use serde_json::Value;

use crate::message::{ContentBlock, Message, ModelReply, ModelRequest};
use crate::model::ModelClient;

/// What the runtime sent on one turn.
#[derive(Debug, Clone)]
pub struct RecordedTurn {
    pub system: String,
    pub messages: Vec<Message>,
    pub tool_names: Vec<String>,
}

/// Replays queued replies and records every request.
#[derive(Debug, Default)]
pub struct ScriptedModel {
    script: Mutex<VecDeque<Result<ModelReply, AgentError>>>,
    turns: Mutex<Vec<RecordedTurn>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(self, reply: Result<ModelReply, AgentError>) -> Self {
        self.script.lock().unwrap().push_back(reply);
        self
    }

    /// Queue a reply that calls one tool.
    pub fn then_tool(self, id: &str, name: &str, input: Value) -> Self {
        self.then(Ok(ModelReply {
            content: vec![ContentBlock::ToolUse {
                id: id.to_string(),
                name: name.to_string(),
                input,
            }],
            stop_reason: Some("tool_use".into()),
        }))
    }

    pub fn then_text(self, text: &str) -> Self {
        self.then(Ok(ModelReply {
            content: vec![ContentBlock::text(text)],
            stop_reason: Some("end_turn".into()),
        }))
    }

    pub fn turns(&self) -> Vec<RecordedTurn> {
        self.turns.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelClient for ScriptedModel {
    async fn complete(&self, request: ModelRequest<'_>) -> Result<ModelReply, AgentError> {
        self.turns.lock().unwrap().push(RecordedTurn {
            system: request.system.to_string(),
            messages: request.messages.to_vec(),
            tool_names: request.tools.iter().map(|t| t.name.clone()).collect(),
        });
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AgentError::Model("script exhausted".into())))
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}
