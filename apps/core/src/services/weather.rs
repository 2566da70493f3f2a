//! OpenWeatherMap client: geocoding followed by a current-conditions query.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::brain::entities::CityQuery;
use crate::config::WeatherSettings;
use crate::error::AppError;

use super::traits::WeatherLookup;

const GEOCODING_LIMIT: &str = "5";

/// Current conditions for one place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    /// Display name in the configured language.
    pub place: String,
    /// Degrees Celsius.
    pub temperature: f64,
    pub feels_like: f64,
    /// Provider's localized description, e.g. "хмарно".
    pub description: String,
    /// Provider condition code.
    pub condition_id: u16,
}

impl WeatherReport {
    /// Symbol for the condition group.
    pub fn symbol(&self) -> &'static str {
        condition_symbol(self.condition_id)
    }

    /// Temperature rounded to whole degrees.
    pub fn temperature_rounded(&self) -> i64 {
        round_degrees(self.temperature)
    }

    pub fn feels_like_rounded(&self) -> i64 {
        round_degrees(self.feels_like)
    }

    /// Description with a capital first letter.
    pub fn description_sentence(&self) -> String {
        let mut chars = self.description.trim().chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

/// Result of a weather lookup. Failures are values, not errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum WeatherOutcome {
    Report(WeatherReport),
    /// The provider could not be reached or answered with garbage.
    LookupFailed { place: String },
    /// Geocoding returned nothing for the query.
    NotFound { query: String },
    /// No API key is configured; no request was made.
    MissingCredentials,
}

/// Maps a provider condition code to a symbol.
pub fn condition_symbol(id: u16) -> &'static str {
    match id {
        200..=299 => "⛈️",
        300..=399 => "🌦️",
        500..=599 => "🌧️",
        600..=699 => "❄️",
        700..=799 => "🌫️",
        800 => "☀️",
        801..=802 => "⛅",
        803..=804 => "☁️",
        _ => "🌡️",
    }
}

fn round_degrees(value: f64) -> i64 {
    // `as` saturates; -0.4 rounds to -0.0 and becomes 0
    value.round() as i64
}

// --- Provider wire types ---

#[derive(Debug, Deserialize)]
struct GeoPlace {
    name: String,
    #[serde(default)]
    local_names: Option<HashMap<String, String>>,
    lat: f64,
    lon: f64,
    #[serde(default)]
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CurrentConditions {
    main: MainBlock,
    #[serde(default)]
    weather: Vec<ConditionBlock>,
}

#[derive(Debug, Deserialize)]
struct MainBlock {
    temp: f64,
    feels_like: f64,
}

#[derive(Debug, Deserialize)]
struct ConditionBlock {
    id: u16,
    #[serde(default)]
    description: String,
}

/// OpenWeatherMap-backed [`WeatherLookup`].
pub struct OpenWeatherClient {
    client: Client,
    api_key: Option<String>,
    api_base: String,
    country: String,
    lang: String,
}

impl OpenWeatherClient {
    /// Builds the client; `timeout` bounds every request it makes.
    pub fn new(settings: &WeatherSettings, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key: settings.api_key.clone(),
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            country: settings.country.clone(),
            lang: settings.lang.clone(),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, AppError> {
        let res = self
            .client
            .get(format!("{}{}", self.api_base, path))
            .query(query)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(AppError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let body = res.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn geocode(&self, api_key: &str, query: &str) -> Result<Vec<GeoPlace>, AppError> {
        self.get_json(
            "/geo/1.0/direct",
            &[("q", query), ("limit", GEOCODING_LIMIT), ("appid", api_key)],
        )
        .await
    }

    async fn conditions(&self, api_key: &str, place: &GeoPlace) -> Result<CurrentConditions, AppError> {
        let lat = place.lat.to_string();
        let lon = place.lon.to_string();
        self.get_json(
            "/data/2.5/weather",
            &[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("units", "metric"),
                ("lang", self.lang.as_str()),
                ("appid", api_key),
            ],
        )
        .await
    }

    /// Prefers a place in the configured country, else the first result.
    fn pick_place(&self, places: Vec<GeoPlace>) -> Option<GeoPlace> {
        let preferred = places.iter().position(|p| {
            p.country
                .as_deref()
                .is_some_and(|c| c.eq_ignore_ascii_case(&self.country))
        });
        places.into_iter().nth(preferred.unwrap_or(0))
    }

    fn display_name(&self, place: &GeoPlace) -> String {
        place
            .local_names
            .as_ref()
            .and_then(|names| names.get(&self.lang))
            .cloned()
            .unwrap_or_else(|| place.name.clone())
    }

    async fn lookup(&self, api_key: &str, city: &CityQuery) -> Result<WeatherOutcome, AppError> {
        // the Latin name geocodes more reliably than an inflected Cyrillic one
        let queries = city.latin.iter().map(String::as_str).chain(std::iter::once(city.name.as_str()));

        let mut found = None;
        for query in queries {
            let places = self.geocode(api_key, query).await?;
            debug!(query = %query, results = places.len(), "Geocoding answered");
            if let Some(place) = self.pick_place(places) {
                found = Some(place);
                break;
            }
        }
        let Some(place) = found else {
            return Ok(WeatherOutcome::NotFound {
                query: city.name.clone(),
            });
        };

        let resolved = self.display_name(&place);
        let conditions = match self.conditions(api_key, &place).await {
            Ok(conditions) => conditions,
            Err(e) => {
                warn!(error = %e, place = %resolved, "Current conditions lookup failed");
                return Ok(WeatherOutcome::LookupFailed { place: resolved });
            }
        };
        let (condition_id, description) = conditions
            .weather
            .into_iter()
            .next()
            .map(|c| (c.id, c.description))
            .unwrap_or_default();

        Ok(WeatherOutcome::Report(WeatherReport {
            place: resolved,
            temperature: conditions.main.temp,
            feels_like: conditions.main.feels_like,
            description,
            condition_id,
        }))
    }
}

#[async_trait]
impl WeatherLookup for OpenWeatherClient {
    #[instrument(skip(self), fields(city = %city.name))]
    async fn current_weather(&self, city: &CityQuery) -> WeatherOutcome {
        let Some(api_key) = self.api_key.as_deref() else {
            info!("Weather requested without an API key");
            return WeatherOutcome::MissingCredentials;
        };

        match self.lookup(api_key, city).await {
            Ok(outcome) => outcome,
            // geocoding never answered, so only the candidate is known
            Err(e) => {
                warn!(error = %e, "Weather lookup failed");
                WeatherOutcome::LookupFailed {
                    place: city.name.clone(),
                }
            }
        }
    }
}
