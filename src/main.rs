use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use cliclack::input;
use console::style;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use weather_agent::agent::Agent;
use weather_agent::evaluation::{save_records, summary_lines, Evaluation};
use weather_agent::prompt::CliclackPrompt;
use weather_agent::providers::configs::OpenAiProviderConfig;
use weather_agent::providers::openai::OpenAiProvider;
use weather_agent::session::Session;
use weather_agent::strategy::Strategy;
use weather_agent::tools::weather::WeatherClient;
use weather_agent::tools::registry::ToolRegistry;
use weather_agent::tools::{build_registry, ToolSets};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    Basic,
    Cot,
    React,
    Evaluate,
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Model API key (can also be set via API_KEY or OPTOGPT_API_KEY)
    #[arg(long)]
    api_key: Option<String>,

    /// Base URL of the chat completions API (can also be set via BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Model to use (can also be set via LLM_MODEL or OPTOGPT_MODEL)
    #[arg(short, long)]
    model: Option<String>,

    /// Skip the menu and start in this mode
    #[arg(long, value_enum)]
    mode: Option<Mode>,

    /// Query for the comparative evaluation
    #[arg(short, long)]
    query: Option<String>,

    /// Directory evaluation results are written to
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Load environment variables from this file instead of ./.env
    #[arg(long)]
    env_file: Option<PathBuf>,
}

/// Map a menu answer to a mode, or `None` when it is not one of the choices
fn parse_mode(choice: &str) -> Option<Mode> {
    match choice.trim() {
        "1" => Some(Mode::Basic),
        "2" => Some(Mode::Cot),
        "3" => Some(Mode::React),
        "4" => Some(Mode::Evaluate),
        _ => None,
    }
}

fn choose_mode() -> Result<Mode> {
    println!(
        "{}",
        style("Weather Agent: Conversational Agent with Tool Use and Reasoning").bold()
    );
    println!("1: Basic Agent");
    println!("2: Chain of Thought Agent");
    println!("3: ReAct Agent");
    println!("4: Comparative Evaluation");

    let choice: String = input("Choose an option (1-4):")
        .placeholder("")
        .interact()?;
    Ok(parse_mode(&choice).unwrap_or_else(|| {
        println!("Invalid choice. Defaulting to Basic agent.");
        Mode::Basic
    }))
}

/// The strategy a chat mode talks with; evaluation runs all of them
fn strategy_for(mode: Mode) -> Option<Strategy> {
    match mode {
        Mode::Basic => Some(Strategy::Basic),
        Mode::Cot => Some(Strategy::ChainOfThought),
        Mode::React => Some(Strategy::ReAct),
        Mode::Evaluate => None,
    }
}

fn run_evaluation(
    provider: &OpenAiProvider,
    model: &str,
    tool_sets: &ToolSets,
    registry: &ToolRegistry,
    query: Option<String>,
    output_dir: &Path,
) -> Result<()> {
    println!("\nRunning Comparative Evaluation:");
    let query = match query {
        Some(query) => query,
        None => input("Enter a query to evaluate with all three agents:")
            .placeholder("")
            .interact()?,
    };

    let mut rater = CliclackPrompt::new();
    let records = Evaluation::new(provider, model, tool_sets, registry).run(&query, &mut rater)?;
    let path = save_records(output_dir, &records)?;

    println!("\nEvaluation results saved to {}", path.display());
    println!("\nEvaluation Summary:");
    for line in summary_lines(&records) {
        println!("{}", line);
    }
    Ok(())
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.env_file {
        Some(path) => {
            dotenv::from_path(path)
                .with_context(|| format!("could not load {}", path.display()))?;
        }
        None => {
            dotenv::dotenv().ok();
        }
    }
    init_logging();

    let config = OpenAiProviderConfig::resolve(cli.api_key, cli.base_url, cli.model)
        .context("API key must be provided via --api-key, API_KEY or OPTOGPT_API_KEY")?;
    let provider = OpenAiProvider::new(config)?;
    let model = provider.default_model().to_string();

    let weather = WeatherClient::from_env().context("WEATHER_API_KEY must be set")?;
    let registry = build_registry(weather);
    let tool_sets = ToolSets::new();
    tool_sets.verify(&registry)?;
    info!(model = %model, "configured");

    let mode = match cli.mode {
        Some(mode) => mode,
        None => choose_mode()?,
    };

    let Some(strategy) = strategy_for(mode) else {
        return run_evaluation(
            &provider,
            &model,
            &tool_sets,
            &registry,
            cli.query,
            &cli.output_dir,
        );
    };

    println!("\nRunning {} Agent:", strategy.name());
    let agent = Agent::new(&provider, model, strategy.tools(&tool_sets), &registry);
    let mut session = Session::new(
        agent,
        Box::new(CliclackPrompt::new()),
        strategy.system_message(),
    );
    session.start()
}
