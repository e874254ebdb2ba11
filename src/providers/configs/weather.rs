use super::base::ProviderConfig;
use anyhow::Result;

pub const DEFAULT_HOST: &str = "http://api.weatherapi.com/v1";

/// Credentials for the WeatherAPI service backing the weather tools
#[derive(Debug, Clone)]
pub struct WeatherApiConfig {
    pub api_key: String,
    pub host: String,
}

impl WeatherApiConfig {
    pub fn new(api_key: String, host: String) -> Self {
        Self { api_key, host }
    }
}

impl ProviderConfig for WeatherApiConfig {
    fn from_env() -> Result<Self> {
        let api_key = Self::require_env("WEATHER_API_KEY")?;

        let host = Self::get_env("WEATHER_API_HOST", false, Some(DEFAULT_HOST.to_string()))?
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        Ok(Self::new(api_key, host))
    }
}
