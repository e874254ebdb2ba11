pub mod calculator;
pub mod registry;
pub mod search;
pub mod weather;

use std::sync::Arc;

use crate::errors::AgentResult;
use crate::models::tool::Tool;
use registry::{required_str, ToolRegistry};
use weather::WeatherClient;

/// The three schema lists offered to the model, each a superset of the one before
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSets {
    pub basic: Vec<Tool>,
    pub chain_of_thought: Vec<Tool>,
    pub react: Vec<Tool>,
}

impl ToolSets {
    pub fn new() -> Self {
        let basic = vec![
            weather::current_weather_tool(),
            weather::weather_forecast_tool(),
        ];

        let mut chain_of_thought = basic.clone();
        chain_of_thought.push(calculator::calculator_tool());

        let mut react = chain_of_thought.clone();
        react.push(search::search_tool());

        Self {
            basic,
            chain_of_thought,
            react,
        }
    }

    /// Fail fast if any offered schema has no callable behind it
    pub fn verify(&self, registry: &ToolRegistry) -> AgentResult<()> {
        registry.verify(&self.react)
    }
}

impl Default for ToolSets {
    fn default() -> Self {
        Self::new()
    }
}

/// Register every tool the agents can call
pub fn build_registry(weather: WeatherClient) -> ToolRegistry {
    let weather = Arc::new(weather);
    let forecast_client = Arc::clone(&weather);

    ToolRegistry::builder()
        .register(&weather::current_weather_tool(), move |args| {
            weather.current(&required_str(args, "location")?)
        })
        .register(&weather::weather_forecast_tool(), move |args| {
            forecast_client.forecast(&required_str(args, "location")?, args.get("days"))
        })
        .register(&calculator::calculator_tool(), |args| {
            Ok(calculator::calculate(&required_str(args, "expression")?)?)
        })
        .register(&search::search_tool(), |args| {
            Ok(search::web_search(&required_str(args, "query")?))
        })
        .build()
}
