pub mod cliclack;

use anyhow::Result;

use crate::models::message::Message;

pub use self::cliclack::CliclackPrompt;

/// Words that end an interactive session, compared case-insensitively
pub const EXIT_WORDS: [&str; 3] = ["exit", "quit", "bye"];

/// Terminal front-end the session talks through
pub trait Prompt {
    fn render(&mut self, message: &Message) -> Result<()>;
    fn report_error(&mut self, error: &anyhow::Error);
    fn get_input(&mut self) -> Result<Input>;
    fn show_busy(&mut self);
    fn hide_busy(&mut self);
    fn close(&self);
}

#[derive(Debug, Clone, PartialEq)]
pub struct Input {
    pub input_type: InputType,
    pub content: Option<String>, // Optional content as sometimes the user may be issuing a command eg. (Exit)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputType {
    AskAgain, // Ask the user for input again. Control flow command.
    Message,  // User sent a message
    Exit,     // User wants to exit the session
}

impl Input {
    /// Interpret one line typed by the user
    pub fn from_line(line: &str) -> Self {
        let text = line.trim();
        if text.is_empty() {
            Input {
                input_type: InputType::AskAgain,
                content: None,
            }
        } else if EXIT_WORDS.iter().any(|word| text.eq_ignore_ascii_case(word)) {
            Input {
                input_type: InputType::Exit,
                content: None,
            }
        } else {
            Input {
                input_type: InputType::Message,
                content: Some(text.to_string()),
            }
        }
    }
}
