//! Live weather lookup tool.
//!
//! Wraps the OpenWeatherMap current-weather endpoint. The tool's contract
//! with the agent is "always returns text": every failure path is mapped
//! to a descriptive string so the reasoning loop can treat failures as
//! data instead of control flow.

use crate::config::{Credentials, WeatherSettings};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

/// Timeout for weather provider requests.
const REQUEST_TIMEOUT_SECS: u64 = 15;

/// Client for the weather provider.
pub struct WeatherClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    units: String,
}

impl WeatherClient {
    /// Create a client from explicit credentials and settings.
    pub fn new(credentials: &Credentials, settings: &WeatherSettings) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .expect("Failed to create HTTP client"),
            api_key: credentials.weather_api_key.clone(),
            base_url: settings.base_url.clone(),
            units: settings.units.clone(),
        }
    }

    /// Create a client against a custom endpoint (for tests).
    pub fn with_base_url(api_key: &str, base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.to_string(),
            base_url: base_url.to_string(),
            units: "metric".to_string(),
        }
    }

    /// Fetch the current weather for a place name.
    ///
    /// Always returns text. Failures are reported in priority order:
    /// provider-level error code, HTTP 404 for an unknown place, any other
    /// HTTP error, then transport or parse failures.
    #[instrument(skip(self))]
    pub async fn current(&self, location: &str) -> String {
        let result = self
            .http
            .get(&self.base_url)
            .query(&[
                ("q", location),
                ("appid", self.api_key.as_str()),
                ("units", self.units.as_str()),
            ])
            .send()
            .await;

        let response = match result {
            Ok(r) => r,
            Err(e) => return format!("An error occurred: {}", e),
        };

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return format!(
                "Error: City '{}' not found. Please check the spelling.",
                location
            );
        }
        if !status.is_success() {
            return format!("HTTP error occurred: {} for '{}'", status, location);
        }

        let body: WeatherResponse = match response.json().await {
            Ok(b) => b,
            Err(e) => return format!("An error occurred: {}", e),
        };

        debug!("Weather response for '{}': cod={:?}", location, body.cod);
        render_report(location, &body)
    }
}

/// Current-weather response from the provider.
///
/// The provider's `cod` field is a number on success and a string on
/// error, so it is kept as a raw JSON value.
#[derive(Debug, Default, Deserialize)]
pub struct WeatherResponse {
    #[serde(default)]
    pub cod: serde_json::Value,
    #[serde(default)]
    pub weather: Vec<WeatherCondition>,
    #[serde(default)]
    pub main: Option<WeatherMain>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub sys: Option<WeatherSys>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WeatherCondition {
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct WeatherMain {
    pub temp: f64,
}

#[derive(Debug, Deserialize)]
pub struct WeatherSys {
    pub country: String,
}

impl WeatherResponse {
    fn cod_as_u64(&self) -> Option<u64> {
        match &self.cod {
            serde_json::Value::Number(n) => n.as_u64(),
            serde_json::Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }
}

/// Render a provider response into the tool's sentence.
///
/// A success-looking HTTP status with a non-success provider code is
/// reported using only the submitted location and the provider's message,
/// never fields that may be absent from the error body.
fn render_report(location: &str, body: &WeatherResponse) -> String {
    if body.cod_as_u64() != Some(200) {
        let reason = body.message.as_deref().unwrap_or("Unknown error");
        return format!(
            "Error: Could not retrieve weather for {}. Reason: {}",
            location, reason
        );
    }

    let (description, temp, city, country) = match (
        body.weather.first(),
        body.main.as_ref(),
        body.name.as_deref(),
        body.sys.as_ref(),
    ) {
        (Some(w), Some(m), Some(n), Some(s)) => (&w.description, m.temp, n, &s.country),
        _ => {
            return format!(
                "An error occurred: provider response for '{}' is missing weather fields",
                location
            )
        }
    };

    format!(
        "The current weather in {}, {} is {}°C with {}.",
        city,
        country,
        format_temp(temp),
        description
    )
}

/// Format a temperature keeping at least one decimal place (25 -> "25.0").
fn format_temp(temp: f64) -> String {
    if temp.fract() == 0.0 {
        format!("{:.1}", temp)
    } else {
        format!("{}", temp)
    }
}
