use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::models::message::Message;
use crate::models::tool::Tool;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: Option<i32>,
    pub output_tokens: Option<i32>,
    pub total_tokens: Option<i32>,
}

impl Usage {
    pub fn new(
        input_tokens: Option<i32>,
        output_tokens: Option<i32>,
        total_tokens: Option<i32>,
    ) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens,
        }
    }
}

/// A chat completion endpoint that can request tool calls.
///
/// Calls block until the endpoint answers; any transport or API failure is
/// returned as an error and ends the current turn.
pub trait Provider: Send + Sync {
    /// Generate the next assistant message for the transcript
    fn complete(&self, model: &str, messages: &[Message], tools: &[Tool])
        -> Result<(Message, Usage)>;
}
