use anyhow::Result;
use tracing::{error, info};

use crate::agent::Agent;
use crate::models::message::Message;
use crate::models::role::Role;
use crate::prompt::{InputType, Prompt};

pub const GREETING: &str = "Hello! I can help you with weather information. Ask me about the weather anywhere!\n\n(Type 'exit' to end the conversation)";
pub const FAREWELL: &str = "Goodbye! Have a great day!";
pub const FALLBACK: &str = "Hmm, I'm having trouble with that. Could you rephrase?";

/// The most recent assistant entry with text, scanning from the end
pub fn latest_assistant_text(messages: &[Message]) -> Option<&str> {
    messages
        .iter()
        .rev()
        .find(|m| m.role == Role::Assistant && m.has_content())
        .map(|m| m.content.as_str())
}

pub struct Session<'a> {
    agent: Agent<'a>,
    prompt: Box<dyn Prompt + 'a>,
    messages: Vec<Message>,
}

impl<'a> Session<'a> {
    pub fn new(agent: Agent<'a>, prompt: Box<dyn Prompt + 'a>, system_message: &str) -> Self {
        Session {
            agent,
            prompt,
            messages: vec![Message::system(system_message)],
        }
    }

    pub fn start(&mut self) -> Result<()> {
        self.prompt.render(&Message::assistant(GREETING))?;

        loop {
            let input = self.prompt.get_input()?;
            match input.input_type {
                InputType::Exit => {
                    self.prompt.render(&Message::assistant(FAREWELL))?;
                    break;
                }
                InputType::AskAgain => continue,
                InputType::Message => {
                    if let Some(content) = input.content {
                        self.run_turn(&content)?;
                    }
                }
            }
        }

        self.prompt.close();
        info!(entries = self.messages.len(), "session ended");
        Ok(())
    }

    /// Send one user line through the agent and show its answer.
    ///
    /// A failed model request drops everything from this turn, including the
    /// user line, so the transcript stays as it was before the turn.
    pub fn run_turn(&mut self, content: &str) -> Result<()> {
        let checkpoint = self.messages.len();
        self.messages.push(Message::user(content));

        self.prompt.show_busy();
        let outcome = self.agent.process_messages(&mut self.messages);
        self.prompt.hide_busy();

        match outcome {
            Ok(()) => {
                // only this turn's entries, an earlier answer must not be repeated
                let text =
                    latest_assistant_text(&self.messages[checkpoint..]).unwrap_or(FALLBACK);
                let reply = Message::assistant(text);
                self.prompt.render(&reply)?;
            }
            Err(e) => {
                error!(error = %format!("{:#}", e), "turn failed");
                self.messages.truncate(checkpoint);
                self.prompt.report_error(&e);
            }
        }
        Ok(())
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }
}
