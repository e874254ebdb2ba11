use indoc::indoc;

use crate::models::tool::Tool;
use crate::tools::ToolSets;

pub const BASIC_SYSTEM_MESSAGE: &str = "You are a helpful weather assistant.";

pub const CHAIN_OF_THOUGHT_SYSTEM_MESSAGE: &str = indoc! {"
    You are a helpful assistant that can answer questions about weather and perform calculations.
    When responding to complex questions, please follow these steps:
    1. Think step-by-step about what information you need
    2. Break down the problem into smaller parts
    3. Use the appropriate tools to gather information
    4. Explain your reasoning clearly
    5. Provide a clear final answer

    For example, if someone asks about temperature conversions or comparisons between cities, first get the weather data, then use the calculator if needed, showing your work.
"};

pub const REACT_SYSTEM_MESSAGE: &str = indoc! {"
    You are a helpful weather and information assistant that uses the ReAct (Reasoning and Acting) approach to solve problems.

    When responding to questions, follow this pattern:
    1. Thought: Think about what you need to know and what steps to take
    2. Action: Use a tool to gather information (weather data, search, calculator)
    3. Observation: Review what you learned from the tool
    4. ... (repeat the Thought, Action, Observation steps as needed)
    5. Final Answer: Provide your response based on all observations

    For example:
    User: What's the temperature difference between New York and London today?
    Thought: I need to find the current temperatures in both New York and London, then calculate the difference.
    Action: [Use get_current_weather for New York]
    Observation: [Results from weather tool]
    Thought: Now I need London's temperature.
    Action: [Use get_current_weather for London]
    Observation: [Results from weather tool]
    Thought: Now I can calculate the difference.
    Action: [Use calculator to subtract]
    Observation: [Result of calculation]
    Final Answer: The temperature difference between New York and London today is X degrees.

    Always make your reasoning explicit and show your work.
    Important format rules:
    - Assistant messages MUST EITHER contain content OR tool_calls
    - Never include empty tool_calls in messages
"};

/// Prompting strategy: a system message paired with the tools it may use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Basic,
    ChainOfThought,
    ReAct,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Basic, Strategy::ChainOfThought, Strategy::ReAct];

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Basic => "Basic",
            Strategy::ChainOfThought => "Chain of Thought",
            Strategy::ReAct => "ReAct",
        }
    }

    pub fn system_message(&self) -> &'static str {
        match self {
            Strategy::Basic => BASIC_SYSTEM_MESSAGE,
            Strategy::ChainOfThought => CHAIN_OF_THOUGHT_SYSTEM_MESSAGE,
            Strategy::ReAct => REACT_SYSTEM_MESSAGE,
        }
    }

    pub fn tools<'a>(&self, sets: &'a ToolSets) -> &'a [Tool] {
        match self {
            Strategy::Basic => &sets.basic,
            Strategy::ChainOfThought => &sets.chain_of_thought,
            Strategy::ReAct => &sets.react,
        }
    }
}
