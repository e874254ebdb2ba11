use anyhow::{anyhow, Result};
use reqwest::blocking::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use crate::models::tool::Tool;
use crate::providers::configs::{ProviderConfig, WeatherApiConfig};

pub const CURRENT_WEATHER: &str = "get_current_weather";
pub const WEATHER_FORECAST: &str = "get_weather_forecast";
pub const DEFAULT_FORECAST_DAYS: i64 = 3;

const LOCATION_DESCRIPTION: &str =
    "The city and state, e.g., San Francisco, CA or country e.g., France";

pub fn current_weather_tool() -> Tool {
    Tool::new(
        CURRENT_WEATHER,
        "Get the current weather in a given location",
        json!({
            "type": "object",
            "properties": {
                "location": {
                    "type": "string",
                    "description": LOCATION_DESCRIPTION,
                }
            },
            "required": ["location"],
        }),
    )
}

pub fn weather_forecast_tool() -> Tool {
    Tool::new(
        WEATHER_FORECAST,
        "Get the weather forecast for a location for a specific number of days",
        json!({
            "type": "object",
            "properties": {
                "location": {
                    "type": "string",
                    "description": LOCATION_DESCRIPTION,
                },
                "days": {
                    "type": "integer",
                    "description": "The number of days to forecast (1-10)",
                    "minimum": 1,
                    "maximum": 10
                }
            },
            "required": ["location"],
        }),
    )
}

/// Client for the WeatherAPI endpoints behind the two weather tools.
///
/// Problems the service reports itself come back as `Error: ...` strings so
/// the model can read them; responses that cannot be interpreted at all are
/// returned as errors.
pub struct WeatherClient {
    client: Client,
    config: WeatherApiConfig,
}

impl WeatherClient {
    pub fn new(config: WeatherApiConfig) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(WeatherApiConfig::from_env()?)
    }

    fn get(&self, endpoint: &str, query: &[(&str, String)]) -> Result<Value> {
        let url = format!("{}/{}", self.config.host.trim_end_matches('/'), endpoint);
        debug!(%url, "querying weather service");

        // WeatherAPI reports bad locations and keys with a 4xx status and a json body.
        // reqwest errors print the request url, which carries the api key.
        let response = self
            .client
            .get(&url)
            .query(&[("key", self.config.api_key.as_str()), ("aqi", "no")])
            .query(query)
            .send()
            .map_err(|e| anyhow!("weather service request failed: {}", e.without_url()))?;

        response.json::<Value>().map_err(|e| {
            anyhow!(
                "weather service returned an unreadable response: {}",
                e.without_url()
            )
        })
    }

    pub fn current(&self, location: &str) -> Result<String> {
        let data = self.get("current.json", &[("q", location.to_string())])?;
        if let Some(message) = service_error(&data) {
            return Ok(format!("Error: {}", message));
        }

        let current = field(&data, "current")?;
        Ok(json!({
            "location": field(field(&data, "location")?, "name")?,
            "temperature_c": field(current, "temp_c")?,
            "temperature_f": field(current, "temp_f")?,
            "condition": field(field(current, "condition")?, "text")?,
            "humidity": field(current, "humidity")?,
            "wind_kph": field(current, "wind_kph")?,
        })
        .to_string())
    }

    /// Daily forecast; `days` may arrive as any JSON value from the model
    pub fn forecast(&self, location: &str, days: Option<&Value>) -> Result<String> {
        let days = match days {
            None | Some(Value::Null) => DEFAULT_FORECAST_DAYS,
            Some(value) => match parse_days(value) {
                Some(days) => days,
                None => return Ok("Error: Days parameter must be an integer".to_string()),
            },
        };
        if !(1..=10).contains(&days) {
            return Ok("Error: Days must be between 1 and 10".to_string());
        }

        let data = self.get(
            "forecast.json",
            &[("q", location.to_string()), ("days", days.to_string())],
        )?;
        if let Some(message) = service_error(&data) {
            return Ok(format!("Error: {}", message));
        }

        let forecast_days = field(field(&data, "forecast")?, "forecastday")?
            .as_array()
            .ok_or_else(|| anyhow!("'forecastday' is not a list"))?;

        let mut forecast = Vec::new();
        for day in forecast_days {
            let summary = field(day, "day")?;
            forecast.push(json!({
                "date": field(day, "date")?,
                "max_temp_c": field(summary, "maxtemp_c")?,
                "min_temp_c": field(summary, "mintemp_c")?,
                "condition": field(field(summary, "condition")?, "text")?,
                "chance_of_rain": field(summary, "daily_chance_of_rain")?,
            }));
        }

        Ok(json!({
            "location": field(field(&data, "location")?, "name")?,
            "forecast": forecast,
        })
        .to_string())
    }
}

/// Integer coercion for the `days` argument: integers, whole floats truncated,
/// and numeric strings are accepted
fn parse_days(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn service_error(data: &Value) -> Option<String> {
    let error = data.get("error")?;
    Some(
        error
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string()),
    )
}

fn field<'a>(value: &'a Value, key: &str) -> Result<&'a Value> {
    value
        .get(key)
        .ok_or_else(|| anyhow!("weather response is missing '{}'", key))
}
