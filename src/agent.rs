use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::errors::AgentError;
use crate::models::message::Message;
use crate::models::tool::{Tool, ToolCall};
use crate::providers::base::Provider;
use crate::tools::registry::ToolRegistry;

/// Upper bound on model requests for a single user turn
pub const MAX_ROUNDS: usize = 3;

pub const CLARIFICATION: &str = "I need more information to answer that. Could you please clarify?";

/// Agent drives the tool-calling dialogue between a model and the registered tools
pub struct Agent<'a> {
    provider: &'a dyn Provider,
    model: String,
    tools: &'a [Tool],
    registry: &'a ToolRegistry,
}

impl<'a> Agent<'a> {
    pub fn new<S: Into<String>>(
        provider: &'a dyn Provider,
        model: S,
        tools: &'a [Tool],
        registry: &'a ToolRegistry,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            tools,
            registry,
        }
    }

    /// Advance the conversation until the model answers in text or the round
    /// budget runs out.
    ///
    /// Entries are only ever appended to `messages`. Every tool call the model
    /// makes is answered by exactly one tool entry carrying its id, whether the
    /// tool ran, failed, or does not exist. A clarification request is appended
    /// when the turn ends on an entry without content, which includes the model
    /// returning an empty reply.
    ///
    /// Only a failure to reach the model is returned as an error.
    pub fn process_messages(&self, messages: &mut Vec<Message>) -> Result<()> {
        let mut dead_end = false;
        for round in 1..=MAX_ROUNDS {
            let normalized: Vec<Message> = messages.iter().map(Message::normalized).collect();

            let (response, usage) = self
                .provider
                .complete(&self.model, &normalized, self.tools)
                .with_context(|| format!("model request failed in round {}", round))?;
            debug!(round, total_tokens = ?usage.total_tokens, "model replied");

            // Text wins, even if the same reply also asked for tools. The calls
            // are dropped so no request ever goes unanswered in the transcript.
            if response.has_content() {
                if response.has_tool_calls() {
                    debug!(
                        round,
                        skipped = response.tool_calls.len(),
                        "reply has text, ignoring its tool calls"
                    );
                }
                messages.push(Message::assistant(response.content));
                return Ok(());
            }

            let reply = Message::assistant_reply(response.content, response.tool_calls);

            // An empty reply is a dead end. It is not kept, the clarification
            // appended below stands in for this assistant turn.
            if !reply.has_tool_calls() {
                warn!(round, "model returned neither text nor tool calls");
                dead_end = true;
                break;
            }

            let calls = reply.tool_calls.clone();
            messages.push(reply);
            for call in &calls {
                messages.push(self.dispatch_tool_call(call));
            }
            info!(round, calls = calls.len(), "tool results added to transcript");
        }

        if dead_end || !ends_with_content(messages) {
            debug!("turn ended without content, asking for clarification");
            messages.push(Message::assistant(CLARIFICATION));
        }
        Ok(())
    }

    /// Run one tool call, always producing the tool entry that answers it
    fn dispatch_tool_call(&self, call: &ToolCall) -> Message {
        let Some(function) = self.registry.resolve(&call.name) else {
            warn!(tool = %call.name, id = %call.id, "model requested an unknown tool");
            return Message::tool_error(&call.id, AgentError::ToolNotFound(call.name.clone()));
        };

        match function.call(call) {
            Ok(output) => Message::tool_result(&call.id, function.name(), output),
            Err(e) => {
                warn!(tool = %call.name, id = %call.id, error = %e, "tool call failed");
                Message::tool_error(&call.id, e)
            }
        }
    }
}

fn ends_with_content(messages: &[Message]) -> bool {
    messages.last().is_some_and(Message::has_content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::role::Role;
    use crate::providers::mock::MockProvider;
    use crate::tools::registry::required_str;
    use crate::tools::{calculator, ToolSets};
    use anyhow::anyhow;
    use serde_json::json;

    fn weather_schema() -> Tool {
        crate::tools::weather::current_weather_tool()
    }

    /// Calculator plus a weather tool that fails the way a malformed response would
    fn test_registry() -> ToolRegistry {
        ToolRegistry::builder()
            .register(&calculator::calculator_tool(), |args| {
                Ok(calculator::calculate(&required_str(args, "expression")?)?)
            })
            .register(&weather_schema(), |args| {
                let _location = required_str(args, "location")?;
                Err(anyhow!("weather response is missing 'current'"))
            })
            .build()
    }

    fn transcript() -> Vec<Message> {
        vec![
            Message::system("You are a helpful weather assistant."),
            Message::user("What is 2 + 2*3?"),
        ]
    }

    fn tool_request(calls: &[(&str, &str, &str)]) -> Message {
        Message::assistant_reply(
            "",
            calls
                .iter()
                .map(|(id, name, args)| ToolCall::new(*id, *name, *args))
                .collect(),
        )
    }

    #[test]
    fn test_text_reply_ends_after_one_round() -> Result<()> {
        let provider = MockProvider::new(vec![Message::assistant("Hello!")]);
        let registry = test_registry();
        let tools = ToolSets::new();
        let agent = Agent::new(&provider, "gpt-4o", &tools.react, &registry);

        let mut messages = transcript();
        agent.process_messages(&mut messages)?;

        assert_eq!(provider.call_count(), 1);
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[2], Message::assistant("Hello!"));
        Ok(())
    }

    #[test]
    fn test_text_wins_over_simultaneous_tool_calls() -> Result<()> {
        let reply = Message::assistant_reply(
            "The answer is 8.",
            vec![ToolCall::new("call_1", "calculator", r#"{"expression":"2 + 2*3"}"#)],
        );
        let provider = MockProvider::new(vec![reply, Message::assistant("Anything else?")]);
        let registry = test_registry();
        let agent = Agent::new(&provider, "gpt-4o", &[], &registry);

        let mut messages = transcript();
        agent.process_messages(&mut messages)?;

        assert_eq!(provider.call_count(), 1);
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[2], Message::assistant("The answer is 8."));
        assert!(!messages[2].has_tool_calls());
        assert!(messages.iter().all(|m| m.role != Role::Tool));

        // the next turn must not carry a request nobody answered
        messages.push(Message::user("Thanks"));
        agent.process_messages(&mut messages)?;
        let requests = provider.requests();
        assert!(requests[1].iter().all(|m| !m.has_tool_calls()));
        Ok(())
    }

    #[test]
    fn test_tool_result_is_fed_back() -> Result<()> {
        let provider = MockProvider::new(vec![
            tool_request(&[("call_1", "calculator", r#"{"expression": "2 + 2*3"}"#)]),
            Message::assistant("2 + 2*3 = 8"),
        ]);
        let registry = test_registry();
        let agent = Agent::new(&provider, "gpt-4o", &[], &registry);

        let mut messages = transcript();
        agent.process_messages(&mut messages)?;

        assert_eq!(messages.len(), 5);
        assert_eq!(messages[3], Message::tool_result("call_1", "calculator", "8"));
        assert_eq!(messages[4].content, "2 + 2*3 = 8");

        // The second request carries the tool result, normalized
        let requests = provider.requests();
        assert_eq!(requests.len(), 2);
        let last_sent = requests[1].last().unwrap();
        assert_eq!(last_sent.role, Role::Tool);
        assert_eq!(last_sent.content, "8");
        assert_eq!(last_sent.tool_call_id.as_deref(), Some("call_1"));
        assert!(last_sent.name.is_none());
        Ok(())
    }

    #[test]
    fn test_unknown_tools_are_reported_per_call() -> Result<()> {
        let provider = MockProvider::new(vec![
            tool_request(&[
                ("call_a", "get_stock_price", r#"{"symbol": "ACME"}"#),
                ("call_b", "calculator", r#"{"expression": "1 + 1"}"#),
                ("call_c", "send_email", "{}"),
            ]),
            Message::assistant("Done."),
        ]);
        let registry = test_registry();
        let agent = Agent::new(&provider, "gpt-4o", &[], &registry);

        let mut messages = transcript();
        agent.process_messages(&mut messages)?;

        let tool_messages: Vec<&Message> =
            messages.iter().filter(|m| m.role == Role::Tool).collect();
        assert_eq!(tool_messages.len(), 3);

        assert_eq!(tool_messages[0].content, "Error: Function get_stock_price not found");
        assert_eq!(tool_messages[0].tool_call_id.as_deref(), Some("call_a"));
        assert_eq!(tool_messages[1].content, "2");
        assert_eq!(tool_messages[1].tool_call_id.as_deref(), Some("call_b"));
        assert_eq!(tool_messages[2].content, "Error: Function send_email not found");
        assert_eq!(tool_messages[2].tool_call_id.as_deref(), Some("call_c"));
        Ok(())
    }

    #[test]
    fn test_failing_tool_keeps_call_id() -> Result<()> {
        let provider = MockProvider::new(vec![
            tool_request(&[("call_w", "get_current_weather", r#"{"location": "Cairo"}"#)]),
            Message::assistant("Sorry, the weather service is unavailable."),
        ]);
        let registry = test_registry();
        let agent = Agent::new(&provider, "gpt-4o", &[], &registry);

        let mut messages = transcript();
        agent.process_messages(&mut messages)?;

        let failure = &messages[3];
        assert_eq!(failure.role, Role::Tool);
        assert!(failure.content.starts_with("Error:"));
        assert_eq!(failure.tool_call_id.as_deref(), Some("call_w"));
        assert_eq!(messages.len(), 5);
        Ok(())
    }

    #[test]
    fn test_bad_arguments_are_reported() -> Result<()> {
        let provider = MockProvider::new(vec![
            tool_request(&[
                ("call_1", "calculator", "{not json"),
                ("call_2", "calculator", r#"{"expression": "1/0"}"#),
                ("call_3", "calculator", r#"{"expression": "1", "precision": 2}"#),
            ]),
            Message::assistant("I could not compute that."),
        ]);
        let registry = test_registry();
        let agent = Agent::new(&provider, "gpt-4o", &[], &registry);

        let mut messages = transcript();
        agent.process_messages(&mut messages)?;

        for (offset, id) in ["call_1", "call_2", "call_3"].iter().enumerate() {
            let message = &messages[3 + offset];
            assert!(message.content.starts_with("Error: "), "{}", message.content);
            assert_eq!(message.tool_call_id.as_deref(), Some(*id));
        }
        assert!(messages[4].content.contains("division by zero"));
        Ok(())
    }

    #[test]
    fn test_round_budget_is_enforced() -> Result<()> {
        let calls = (1..=5)
            .map(|i| {
                Message::assistant_reply(
                    "",
                    vec![ToolCall::new(
                        format!("call_{}", i),
                        "calculator",
                        r#"{"expression": "1 + 1"}"#,
                    )],
                )
            })
            .collect();
        let provider = MockProvider::new(calls);
        let registry = test_registry();
        let agent = Agent::new(&provider, "gpt-4o", &[], &registry);

        let mut messages = transcript();
        agent.process_messages(&mut messages)?;

        assert_eq!(provider.call_count(), MAX_ROUNDS);
        // three rounds of (request, result), ending on a tool result with content
        assert_eq!(messages.len(), 2 + MAX_ROUNDS * 2);
        assert_eq!(
            messages.last().unwrap(),
            &Message::tool_result("call_3", "calculator", "2")
        );
        Ok(())
    }

    #[test]
    fn test_round_budget_ending_on_empty_tool_output_asks_for_clarification() -> Result<()> {
        let registry = ToolRegistry::builder()
            .register(&crate::tools::search::search_tool(), |_args| Ok(String::new()))
            .build();
        let provider = MockProvider::new(
            ["s1", "s2", "s3"]
                .iter()
                .map(|id| tool_request(&[(*id, "web_search", r#"{"query": "rain"}"#)]))
                .collect(),
        );
        let agent = Agent::new(&provider, "gpt-4o", &[], &registry);

        let mut messages = transcript();
        agent.process_messages(&mut messages)?;

        assert_eq!(provider.call_count(), MAX_ROUNDS);
        assert_eq!(messages.len(), 2 + MAX_ROUNDS * 2 + 1);
        assert_eq!(messages.last().unwrap(), &Message::assistant(CLARIFICATION));
        Ok(())
    }

    #[test]
    fn test_empty_reply_becomes_clarification() -> Result<()> {
        let provider = MockProvider::new(vec![Message::assistant("")]);
        let registry = test_registry();
        let agent = Agent::new(&provider, "gpt-4o", &[], &registry);

        let mut messages = transcript();
        agent.process_messages(&mut messages)?;

        assert_eq!(provider.call_count(), 1);
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[2], Message::assistant(CLARIFICATION));
        Ok(())
    }

    #[test]
    fn test_empty_reply_after_tools_becomes_clarification() -> Result<()> {
        let provider = MockProvider::new(vec![
            tool_request(&[("call_1", "calculator", r#"{"expression": "3 * 3"}"#)]),
            Message::assistant(""),
        ]);
        let registry = test_registry();
        let agent = Agent::new(&provider, "gpt-4o", &[], &registry);

        let mut messages = transcript();
        agent.process_messages(&mut messages)?;

        assert_eq!(provider.call_count(), 2);
        assert_eq!(messages.len(), 5);
        assert_eq!(messages[3].content, "9");
        assert_eq!(messages[4], Message::assistant(CLARIFICATION));
        assert!(messages
            .iter()
            .all(|m| m.role != Role::Assistant || m.has_content() || m.has_tool_calls()));
        Ok(())
    }

    #[test]
    fn test_transcript_only_grows() -> Result<()> {
        let provider = MockProvider::new(vec![
            tool_request(&[("call_1", "calculator", r#"{"expression": "2"}"#)]),
            Message::assistant("2"),
        ]);
        let registry = test_registry();
        let agent = Agent::new(&provider, "gpt-4o", &[], &registry);

        let original = vec![
            Message::system("You are a helpful weather assistant."),
            Message::user("Hi"),
            Message::assistant("Hello! Ask me about the weather."),
            Message::user("What is 2?"),
        ];
        let mut messages = original.clone();
        agent.process_messages(&mut messages)?;

        assert!(messages.len() > original.len());
        assert_eq!(messages[..original.len()], original[..]);
        Ok(())
    }

    #[test]
    fn test_transport_failure_is_fatal() {
        let provider = MockProvider::with_results(vec![
            Ok(tool_request(&[("call_1", "calculator", r#"{"expression": "2"}"#)])),
            Err(anyhow!("connection reset")),
        ]);
        let registry = test_registry();
        let agent = Agent::new(&provider, "gpt-4o", &[], &registry);

        let mut messages = transcript();
        let err = agent.process_messages(&mut messages).unwrap_err();

        assert!(err.to_string().contains("round 2"));
        assert_eq!(provider.call_count(), 2);
    }

    #[test]
    fn test_requests_are_normalized() -> Result<()> {
        let provider = MockProvider::new(vec![Message::assistant("ok")]);
        let registry = test_registry();
        let agent = Agent::new(&provider, "gpt-4o", &[], &registry);

        let mut messages = transcript();
        messages.push(Message::tool_result("call_0", "calculator", "4"));
        agent.process_messages(&mut messages)?;

        let sent = &provider.requests()[0];
        assert!(sent.iter().all(|m| m.name.is_none()));
        assert_eq!(sent[2].tool_call_id.as_deref(), Some("call_0"));
        // the caller's copy keeps the tool name
        assert_eq!(messages[2].name.as_deref(), Some("calculator"));
        assert_eq!(
            serde_json::to_value(&sent[0])?,
            json!({"role": "system", "content": "You are a helpful weather assistant."})
        );
        Ok(())
    }
}
