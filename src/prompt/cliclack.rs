use std::io::{self, Write};

use anyhow::{anyhow, Result};
use bat::WrappingMode;
use cliclack::{input, log, spinner, ProgressBar};
use console::style;

use super::{Input, Prompt};
use crate::errors::RatingError;
use crate::evaluation::Rater;
use crate::models::message::Message;
use crate::strategy::Strategy;

const THEME: &str = "zenburn";

pub struct CliclackPrompt {
    spinner: Option<ProgressBar>,
}

impl CliclackPrompt {
    pub fn new() -> Self {
        CliclackPrompt { spinner: None }
    }
}

impl Default for CliclackPrompt {
    fn default() -> Self {
        Self::new()
    }
}

fn print_markdown(content: &str) -> Result<()> {
    bat::PrettyPrinter::new()
        .input(bat::Input::from_bytes(content.as_bytes()))
        .theme(THEME)
        .language("Markdown")
        .wrapping_mode(WrappingMode::Character)
        .print()
        .map_err(|e| anyhow!("failed to print reply: {}", e))?;
    Ok(())
}

fn print_reply(label: &str, content: &str) -> Result<()> {
    println!("\n{}", style(label).cyan().bold());
    print_markdown(content)?;
    println!();
    io::stdout().flush()?;
    Ok(())
}

impl Prompt for CliclackPrompt {
    fn render(&mut self, message: &Message) -> Result<()> {
        print_reply("Weather Assistant:", &message.content)
    }

    fn report_error(&mut self, error: &anyhow::Error) {
        let _ = log::error(format!("{:#}", error));
    }

    fn get_input(&mut self) -> Result<Input> {
        let line: String = input("You:").placeholder("").interact()?;
        Ok(Input::from_line(&line))
    }

    fn show_busy(&mut self) {
        let spinner = spinner();
        spinner.start("awaiting reply");
        self.spinner = Some(spinner);
    }

    fn hide_busy(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.stop("");
        }
    }

    fn close(&self) {
        // No cleanup required
    }
}

impl Rater for CliclackPrompt {
    fn show_response(&mut self, strategy: Strategy, response: &str) -> Result<()> {
        print_reply(&format!("{} Agent Response:", strategy.name()), response)
    }

    fn read_rating(&mut self, strategy: Strategy) -> Result<String> {
        let line: String = input(format!("Rate the {} agent's response (1-5):", strategy.name()))
            .placeholder("")
            .interact()?;
        Ok(line)
    }

    fn reject(&mut self, error: &RatingError) {
        let _ = log::warning(error.to_string());
    }
}
