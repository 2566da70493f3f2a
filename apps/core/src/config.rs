//! Runtime configuration.
//!
//! Everything is read once at startup from the process environment (optionally
//! seeded from a `.env` file) and then shared read-only.

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;
use validator::Validate;

use crate::brain::composer::StyleConfig;
use crate::error::AppError;

// --- Defaults ---
const DEFAULT_ADDRESS_TOKENS: &[&str] = &["нері", "нери", "neri"];
const DEFAULT_WEATHER_API_BASE: &str = "https://api.openweathermap.org";
const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";
const DEFAULT_COUNTRY: &str = "UA";
const DEFAULT_LANG: &str = "uk";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Weather provider settings.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct WeatherSettings {
    /// API key; `None` means the weather feature answers with the
    /// missing-credentials message instead of calling out.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    #[validate(url)]
    pub api_base: String,
    /// ISO 3166 country code preferred when geocoding.
    #[validate(length(equal = 2))]
    pub country: String,
    #[validate(length(min = 2, max = 5))]
    pub lang: String,
}

/// Delivery channel settings.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TelegramSettings {
    #[serde(skip_serializing)]
    pub bot_token: Option<String>,
    #[validate(url)]
    pub api_base: String,
}

/// Complete application settings.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Settings {
    /// Names the assistant answers to, lowercase.
    #[validate(length(min = 1))]
    pub address_tokens: Vec<String>,
    #[validate(nested)]
    pub weather: WeatherSettings,
    #[validate(nested)]
    pub telegram: TelegramSettings,
    /// Single bounded timeout applied to every outbound HTTP call.
    #[validate(range(min = 1, max = 120))]
    pub http_timeout_secs: u64,
    #[validate(nested)]
    pub style: StyleConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            address_tokens: DEFAULT_ADDRESS_TOKENS.iter().map(|s| s.to_string()).collect(),
            weather: WeatherSettings {
                api_key: None,
                api_base: DEFAULT_WEATHER_API_BASE.to_string(),
                country: DEFAULT_COUNTRY.to_string(),
                lang: DEFAULT_LANG.to_string(),
            },
            telegram: TelegramSettings {
                bot_token: None,
                api_base: DEFAULT_TELEGRAM_API_BASE.to_string(),
            },
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            style: StyleConfig::default(),
        }
    }
}

impl Settings {
    /// Loads `.env` (if any) and then reads the environment.
    pub fn from_env() -> Result<Self, AppError> {
        match dotenv::dotenv() {
            Ok(path) => info!(path = %path.display(), "Loaded .env file"),
            Err(_) => info!("No .env file found, using process environment only"),
        }
        Self::from_vars()
    }

    /// Reads settings from the current process environment without touching `.env`.
    pub fn from_vars() -> Result<Self, AppError> {
        let mut settings = Settings::default();

        if let Some(tokens) = non_empty_var("NERI_ADDRESS_TOKENS") {
            settings.address_tokens = tokens
                .split(',')
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect();
        }

        settings.weather.api_key = non_empty_var("OPENWEATHER_API_KEY");
        if let Some(base) = non_empty_var("WEATHER_API_BASE") {
            settings.weather.api_base = base;
        }
        if let Some(country) = non_empty_var("WEATHER_COUNTRY") {
            settings.weather.country = country.to_uppercase();
        }
        if let Some(lang) = non_empty_var("WEATHER_LANG") {
            settings.weather.lang = lang.to_lowercase();
        }

        settings.telegram.bot_token = non_empty_var("BOT_TOKEN");
        if let Some(base) = non_empty_var("TELEGRAM_API_BASE") {
            settings.telegram.api_base = base;
        }

        if let Some(secs) = parse_var::<u64>("HTTP_TIMEOUT_SECS")? {
            settings.http_timeout_secs = secs;
        }
        if let Some(cap) = parse_var::<usize>("REPLY_SOFT_CAP")? {
            settings.style.soft_cap = cap;
        }
        if let Some(p) = parse_var::<f64>("NERI_EMPHASIS_P")? {
            settings.style.emphasis_probability = p;
        }
        if let Some(p) = parse_var::<f64>("NERI_DECORATION_P")? {
            settings.style.decoration_probability = p;
        }
        if let Some(p) = parse_var::<f64>("NERI_HEADER_P")? {
            settings.style.header_probability = p;
        }

        settings.validate()?;
        // validator only checks the URL shape loosely; make sure reqwest will accept it
        Url::parse(&settings.weather.api_base)?;
        Url::parse(&settings.telegram.api_base)?;

        if settings.weather.api_key.is_none() {
            warn!("OPENWEATHER_API_KEY is not set - weather requests will get the missing-credentials reply");
        }

        Ok(settings)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var<T: FromStr>(key: &str) -> Result<Option<T>, AppError>
where
    T::Err: std::fmt::Display,
{
    match non_empty_var(key) {
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| AppError::Config(format!("{} has invalid value '{}': {}", key, raw, e))),
        None => Ok(None),
    }
}
