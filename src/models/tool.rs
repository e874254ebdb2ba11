use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::Debug;

use crate::errors::{AgentError, AgentResult};

/// A tool that can be used by a model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tool {
    /// The name of the tool
    pub name: String,
    /// A description of what the tool does
    pub description: String,
    /// A json schema of the function signature
    pub parameters: Value,
}

impl Tool {
    /// Create a new tool with the given name and description
    pub fn new<N, D>(name: N, description: D, parameters: Value) -> Self
    where
        N: Into<String>,
        D: Into<String>,
    {
        Tool {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }

    /// Names of the properties declared in the parameter schema
    pub fn parameter_names(&self) -> Vec<String> {
        self.parameters
            .get("properties")
            .and_then(Value::as_object)
            .map(|properties| properties.keys().cloned().collect())
            .unwrap_or_default()
    }
}

/// A tool invocation requested by the model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    /// Opaque id issued by the model, echoed back on the tool result
    pub id: String,
    /// The name of the tool to execute
    pub name: String,
    /// Arguments exactly as the model serialized them
    pub arguments: String,
}

impl ToolCall {
    pub fn new<I, N, A>(id: I, name: N, arguments: A) -> Self
    where
        I: Into<String>,
        N: Into<String>,
        A: Into<String>,
    {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }

    /// Parse the serialized arguments into a keyword map
    pub fn parse_arguments(&self) -> AgentResult<Map<String, Value>> {
        let value: Value = serde_json::from_str(&self.arguments).map_err(|e| {
            AgentError::InvalidParameters(format!(
                "could not parse arguments for {}: {}",
                self.name, e
            ))
        })?;

        match value {
            Value::Object(map) => Ok(map),
            other => Err(AgentError::InvalidParameters(format!(
                "arguments for {} must be an object, got {}",
                self.name, other
            ))),
        }
    }
}
