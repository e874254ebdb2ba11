use serde_json::json;
use std::collections::HashSet;

use crate::models::tool::Tool;

pub const NAME: &str = "web_search";

/// Canned knowledge the simulated search draws from, in match priority order
const ENTRIES: [(&str, &str); 4] = [
    (
        "weather forecast",
        "Weather forecasts predict atmospheric conditions for a specific location and time period. They typically include temperature, precipitation, wind, and other variables.",
    ),
    (
        "temperature conversion",
        "To convert Celsius to Fahrenheit: multiply by 9/5 and add 32. To convert Fahrenheit to Celsius: subtract 32 and multiply by 5/9.",
    ),
    (
        "climate change",
        "Climate change refers to significant changes in global temperature, precipitation, wind patterns, and other measures of climate that occur over several decades or longer.",
    ),
    (
        "severe weather",
        "Severe weather includes thunderstorms, tornadoes, hurricanes, blizzards, floods, and high winds that can cause damage, disruption, and loss of life.",
    ),
];

const NO_RESULT: &str = "No relevant information found.";

pub fn search_tool() -> Tool {
    Tool::new(
        NAME,
        "Search for information on the web",
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query",
                }
            },
            "required": ["query"],
        }),
    )
}

/// Answer `query` from the canned entries, picking the entry that shares the
/// most words with it. The earliest entry wins a tie.
pub fn web_search(query: &str) -> String {
    let lowered = query.to_lowercase();
    let query_words: HashSet<&str> = lowered.split_whitespace().collect();

    let mut best: Option<&str> = None;
    let mut best_score = 0;
    for (key, text) in ENTRIES {
        let score = key
            .split_whitespace()
            .collect::<HashSet<_>>()
            .intersection(&query_words)
            .count();
        if score > best_score {
            best = Some(text);
            best_score = score;
        }
    }

    json!({
        "query": query,
        "result": best.unwrap_or(NO_RESULT),
    })
    .to_string()
}
