pub mod base;
pub mod openai;
pub mod weather;

pub use base::ProviderConfig;
pub use openai::OpenAiProviderConfig;
pub use weather::WeatherApiConfig;
