//! One model turn behind a trait, so the runtime can be driven by a script.

use async_trait::async_trait;
use modmap_core::AgentError;

use crate::message::{ModelReply, ModelRequest};

#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn complete(&self, request: ModelRequest<'_>) -> Result<ModelReply, AgentError>;

    fn model_name(&self) -> &str;
}
