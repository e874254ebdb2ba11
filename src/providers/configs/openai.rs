use super::base::ProviderConfig;
use anyhow::Result;

pub const DEFAULT_HOST: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o";

#[derive(Debug, Clone)]
pub struct OpenAiProviderConfig {
    pub api_key: String,
    /// Base url of an OpenAI compatible endpoint, including the version segment
    pub host: String,
    pub model: String,
}

impl OpenAiProviderConfig {
    pub fn new(api_key: String, host: String, model: String) -> Self {
        Self {
            api_key,
            host,
            model,
        }
    }

    /// Build the config, preferring explicitly supplied values over the environment
    pub fn resolve(
        api_key: Option<String>,
        host: Option<String>,
        model: Option<String>,
    ) -> Result<Self> {
        let api_key = match api_key {
            Some(key) => key,
            None => match Self::get_env("API_KEY", false, None)? {
                Some(key) => key,
                None => Self::require_env("OPTOGPT_API_KEY")?,
            },
        };

        let host = match host {
            Some(host) => host,
            None => Self::get_env("BASE_URL", false, Some(DEFAULT_HOST.to_string()))?
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
        };

        let model = match model {
            Some(model) => model,
            None => match Self::get_env("LLM_MODEL", false, None)? {
                Some(model) => model,
                None => Self::get_env("OPTOGPT_MODEL", false, Some(DEFAULT_MODEL.to_string()))?
                    .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            },
        };

        Ok(Self::new(api_key, host, model))
    }
}

impl ProviderConfig for OpenAiProviderConfig {
    fn from_env() -> Result<Self> {
        Self::resolve(None, None, None)
    }
}
