use serde::{Deserialize, Serialize};

use super::role::Role;
use super::tool::ToolCall;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A single transcript entry exchanged with the model
pub struct Message {
    pub role: Role,
    #[serde(default)]
    pub content: String,
    /// Invocations requested by the model, only ever set on assistant entries
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// The call a tool entry answers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// Tool that produced a successful tool entry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Message {
    fn new<S: Into<String>>(role: Role, content: S) -> Self {
        Message {
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
            name: None,
        }
    }

    pub fn system<S: Into<String>>(content: S) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user<S: Into<String>>(content: S) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant<S: Into<String>>(content: S) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// An assistant turn as returned by the model, possibly carrying tool calls
    pub fn assistant_reply<S: Into<String>>(content: S, tool_calls: Vec<ToolCall>) -> Self {
        Message {
            tool_calls,
            ..Self::new(Role::Assistant, content)
        }
    }

    /// Output of a tool that ran successfully
    pub fn tool_result<I, N, S>(tool_call_id: I, name: N, output: S) -> Self
    where
        I: Into<String>,
        N: Into<String>,
        S: Into<String>,
    {
        Message {
            tool_call_id: Some(tool_call_id.into()),
            name: Some(name.into()),
            ..Self::new(Role::Tool, output)
        }
    }

    /// A failed tool call, reported back to the model so it can recover
    pub fn tool_error<I, E>(tool_call_id: I, error: E) -> Self
    where
        I: Into<String>,
        E: std::fmt::Display,
    {
        Message {
            tool_call_id: Some(tool_call_id.into()),
            ..Self::new(Role::Tool, format!("Error: {}", error))
        }
    }

    pub fn has_content(&self) -> bool {
        !self.content.is_empty()
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// The shape sent to the model: role and content always, tool calls only
    /// on assistant entries, the call id only on tool entries. Applying it to
    /// an already normalized message returns an identical message.
    pub fn normalized(&self) -> Message {
        Message {
            role: self.role,
            content: self.content.clone(),
            tool_calls: match self.role {
                Role::Assistant => self.tool_calls.clone(),
                _ => Vec::new(),
            },
            tool_call_id: match self.role {
                Role::Tool => self.tool_call_id.clone(),
                _ => None,
            },
            name: None,
        }
    }
}
