use anyhow::Result;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

use crate::errors::AgentError;
use crate::models::tool::{Tool, ToolCall};

/// Keyword arguments as decoded from a tool call
pub type Arguments = Map<String, Value>;

type Handler = Box<dyn Fn(&Arguments) -> Result<String> + Send + Sync>;

/// A callable bound to the keyword names its schema declares
pub struct ToolFunction {
    name: String,
    parameters: Vec<String>,
    handler: Handler,
}

impl ToolFunction {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Decode the call's arguments and run the handler.
    ///
    /// Fails when the arguments are not a JSON object, when they carry a
    /// keyword the schema does not declare, or when the handler fails.
    pub fn call(&self, call: &ToolCall) -> Result<String> {
        let arguments = call.parse_arguments()?;
        self.invoke(&arguments)
    }

    pub fn invoke(&self, arguments: &Arguments) -> Result<String> {
        if let Some(unexpected) = arguments
            .keys()
            .find(|key| !self.parameters.iter().any(|p| p == *key))
        {
            return Err(AgentError::InvalidParameters(format!(
                "{}() got an unexpected keyword argument '{}'",
                self.name, unexpected
            ))
            .into());
        }

        debug!(tool = %self.name, "invoking tool");
        (self.handler)(arguments)
    }
}

impl fmt::Debug for ToolFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolFunction")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .field("handler", &"<function>")
            .finish()
    }
}

/// Immutable name to callable lookup, assembled once through [`ToolRegistryBuilder`]
#[derive(Debug, Default)]
pub struct ToolRegistry {
    functions: HashMap<String, ToolFunction>,
}

impl ToolRegistry {
    pub fn builder() -> ToolRegistryBuilder {
        ToolRegistryBuilder::default()
    }

    pub fn resolve(&self, name: &str) -> Option<&ToolFunction> {
        self.functions.get(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Every schema offered to the model must have a callable behind it
    pub fn verify(&self, tools: &[Tool]) -> Result<(), AgentError> {
        match tools.iter().find(|tool| self.resolve(&tool.name).is_none()) {
            Some(missing) => Err(AgentError::Internal(format!(
                "tool schema '{}' has no registered function",
                missing.name
            ))),
            None => Ok(()),
        }
    }
}

#[derive(Default)]
pub struct ToolRegistryBuilder {
    functions: HashMap<String, ToolFunction>,
}

impl ToolRegistryBuilder {
    /// Register the callable that answers calls to `schema`
    pub fn register<F>(mut self, schema: &Tool, handler: F) -> Self
    where
        F: Fn(&Arguments) -> Result<String> + Send + Sync + 'static,
    {
        self.functions.insert(
            schema.name.clone(),
            ToolFunction {
                name: schema.name.clone(),
                parameters: schema.parameter_names(),
                handler: Box::new(handler),
            },
        );
        self
    }

    pub fn build(self) -> ToolRegistry {
        ToolRegistry {
            functions: self.functions,
        }
    }
}

/// A string argument the callable cannot run without
pub fn required_str(arguments: &Arguments, key: &str) -> Result<String, AgentError> {
    match arguments.get(key) {
        Some(Value::String(value)) => Ok(value.clone()),
        Some(Value::Null) | None => Err(AgentError::InvalidParameters(format!(
            "missing required argument '{}'",
            key
        ))),
        Some(other) => Ok(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn echo_schema() -> Tool {
        Tool::new(
            "echo",
            "Echoes back the input",
            json!({
                "type": "object",
                "properties": {"message": {"type": "string"}},
                "required": ["message"]
            }),
        )
    }

    fn registry() -> ToolRegistry {
        ToolRegistry::builder()
            .register(&echo_schema(), |args| required_str(args, "message").map_err(Into::into))
            .build()
    }

    #[test]
    fn test_resolve() {
        let registry = registry();
        assert!(registry.resolve("echo").is_some());
        assert!(registry.resolve("shout").is_none());
        assert_eq!(registry.names(), vec!["echo"]);
    }

    #[test]
    fn test_call_with_valid_arguments() -> Result<()> {
        let registry = registry();
        let function = registry.resolve("echo").unwrap();
        let output = function.call(&ToolCall::new("1", "echo", r#"{"message": "hi"}"#))?;
        assert_eq!(output, "hi");
        Ok(())
    }

    #[test]
    fn test_call_rejects_unexpected_keyword() {
        let registry = registry();
        let function = registry.resolve("echo").unwrap();
        let err = function
            .call(&ToolCall::new("1", "echo", r#"{"message": "hi", "loud": true}"#))
            .unwrap_err();
        assert!(err
            .to_string()
            .contains("unexpected keyword argument 'loud'"));
    }

    #[test]
    fn test_call_missing_required() {
        let registry = registry();
        let function = registry.resolve("echo").unwrap();
        let err = function.call(&ToolCall::new("1", "echo", "{}")).unwrap_err();
        assert!(err.to_string().contains("missing required argument 'message'"));
    }

    #[test]
    fn test_verify_reports_unregistered_schema() {
        let registry = registry();
        let orphan = Tool::new("shout", "Shouts", json!({"type": "object"}));

        assert!(registry.verify(&[echo_schema()]).is_ok());
        let err = registry.verify(&[echo_schema(), orphan]).unwrap_err();
        assert!(err.to_string().contains("shout"));
    }

    #[test]
    fn test_required_str_stringifies_scalars() -> Result<()> {
        let args = json!({"location": 10115}).as_object().cloned().unwrap();
        assert_eq!(required_str(&args, "location")?, "10115");
        Ok(())
    }
}
