//! API credentials resolved from the environment.
//!
//! Both keys are mandatory preconditions for the rest of the system.
//! Credentials are loaded once at startup and passed by reference to the
//! components that need them, so nothing reads process-wide state on its own.

use crate::error::{ReiseError, Result};

/// Environment variable holding the OpenAI API key.
pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Environment variable holding the OpenWeatherMap API key.
pub const WEATHER_API_KEY_VAR: &str = "OPENWEATHERMAP_API_KEY";

/// API credentials for the hosted model and the weather provider.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Key for the OpenAI chat and embedding endpoints.
    pub openai_api_key: String,
    /// Key for the OpenWeatherMap API.
    pub weather_api_key: String,
}

impl Credentials {
    /// Resolve both credentials from the environment.
    ///
    /// Fails with an error naming the missing variable; no defaults,
    /// no partial operation.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            openai_api_key: require_var(OPENAI_API_KEY_VAR)?,
            weather_api_key: require_var(WEATHER_API_KEY_VAR)?,
        })
    }

    /// Construct credentials directly (for tests and embedding callers).
    pub fn new(openai_api_key: &str, weather_api_key: &str) -> Self {
        Self {
            openai_api_key: openai_api_key.to_string(),
            weather_api_key: weather_api_key.to_string(),
        }
    }
}

fn require_var(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        Ok(_) => Err(ReiseError::Config(format!(
            "{} is empty. Set it with: export {}='...'",
            name, name
        ))),
        Err(_) => Err(ReiseError::Config(format!(
            "{} is not set in environment variables. Set it with: export {}='...'",
            name, name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_new() {
        let creds = Credentials::new("sk-test", "owm-test");
        assert_eq!(creds.openai_api_key, "sk-test");
        assert_eq!(creds.weather_api_key, "owm-test");
    }

    #[test]
    fn test_missing_var_names_the_variable() {
        let err = require_var("REISE_TEST_DOES_NOT_EXIST").unwrap_err();
        assert!(err.to_string().contains("REISE_TEST_DOES_NOT_EXIST"));
    }
}
