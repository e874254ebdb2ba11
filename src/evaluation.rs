use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::agent::Agent;
use crate::errors::RatingError;
use crate::models::message::Message;
use crate::models::role::Role;
use crate::providers::base::Provider;
use crate::strategy::Strategy;
use crate::tools::registry::ToolRegistry;
use crate::tools::ToolSets;

pub const CSV_HEADER: [&str; 4] = ["agent_type", "query", "response", "rating"];

/// One human judgement of one strategy's answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub agent_type: String,
    pub query: String,
    pub response: String,
    pub rating: u8,
}

/// Where ratings come from; the terminal in the CLI, a script in tests
pub trait Rater {
    fn show_response(&mut self, strategy: Strategy, response: &str) -> Result<()>;
    fn read_rating(&mut self, strategy: Strategy) -> Result<String>;
    fn reject(&mut self, error: &RatingError);
}

pub fn parse_rating(line: &str) -> Result<u8, RatingError> {
    let value: i64 = line.trim().parse().map_err(|_| RatingError::NotANumber)?;
    if (1..=5).contains(&value) {
        Ok(value as u8)
    } else {
        Err(RatingError::OutOfRange(value))
    }
}

/// Ask until the rater gives a whole number from 1 to 5
pub fn collect_rating(rater: &mut dyn Rater, strategy: Strategy) -> Result<u8> {
    loop {
        let line = rater.read_rating(strategy)?;
        match parse_rating(&line) {
            Ok(rating) => return Ok(rating),
            Err(e) => rater.reject(&e),
        }
    }
}

/// The answer a strategy gave: the first assistant entry with text
pub fn first_answer(messages: &[Message]) -> String {
    messages
        .iter()
        .find(|m| m.role == Role::Assistant && m.has_content())
        .map(|m| m.content.clone())
        .unwrap_or_default()
}

/// Runs one query through every strategy and collects a rating for each
pub struct Evaluation<'a> {
    provider: &'a dyn Provider,
    model: &'a str,
    tool_sets: &'a ToolSets,
    registry: &'a ToolRegistry,
}

impl<'a> Evaluation<'a> {
    pub fn new(
        provider: &'a dyn Provider,
        model: &'a str,
        tool_sets: &'a ToolSets,
        registry: &'a ToolRegistry,
    ) -> Self {
        Self {
            provider,
            model,
            tool_sets,
            registry,
        }
    }

    pub fn run(&self, query: &str, rater: &mut dyn Rater) -> Result<Vec<EvaluationRecord>> {
        let mut records = Vec::with_capacity(Strategy::ALL.len());

        for strategy in Strategy::ALL {
            info!(agent = strategy.name(), "evaluating");
            let agent = Agent::new(
                self.provider,
                self.model,
                strategy.tools(self.tool_sets),
                self.registry,
            );

            let mut messages = vec![
                Message::system(strategy.system_message()),
                Message::user(query),
            ];
            agent
                .process_messages(&mut messages)
                .with_context(|| format!("{} agent failed to answer", strategy.name()))?;

            let response = first_answer(&messages);
            rater.show_response(strategy, &response)?;
            let rating = collect_rating(rater, strategy)?;

            records.push(EvaluationRecord {
                agent_type: strategy.name().to_string(),
                query: query.to_string(),
                response,
                rating,
            });
        }

        Ok(records)
    }
}

pub fn evaluation_file_name(timestamp: &DateTime<Local>) -> String {
    format!("agent_evaluation_{}.csv", timestamp.format("%Y%m%d_%H%M%S"))
}

/// Write the records, header first, to `path`
pub fn write_records(path: &Path, records: &[EvaluationRecord]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("could not create {}", path.display()))?;

    writer.write_record(CSV_HEADER)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Save the records into `dir` under a name stamped with the current time
pub fn save_records(dir: &Path, records: &[EvaluationRecord]) -> Result<PathBuf> {
    let path = dir.join(evaluation_file_name(&Local::now()));
    if path.exists() {
        warn!(path = %path.display(), "overwriting evaluation results");
    }
    write_records(&path, records)?;
    info!(path = %path.display(), rows = records.len(), "evaluation results saved");
    Ok(path)
}

pub fn summary_lines(records: &[EvaluationRecord]) -> Vec<String> {
    records
        .iter()
        .map(|record| format!("{} Agent: {}/5", record.agent_type, record.rating))
        .collect()
}
