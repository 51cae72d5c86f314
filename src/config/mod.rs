//! Configuration module for Reise.
//!
//! Handles application settings and API credential resolution.

mod credentials;
mod settings;

pub use credentials::{Credentials, OPENAI_API_KEY_VAR, WEATHER_API_KEY_VAR};
pub use settings::{
    AgentSettings, CorpusSettings, EmbeddingSettings, GeneralSettings, Settings,
    VectorStoreSettings, WeatherSettings,
};
