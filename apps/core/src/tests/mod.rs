//! Test Module
//!
//! Crate-level test suite for the Neri backend.
//!
//! ## Test Categories
//! - `brain_tests`: routing, entity extraction and end-to-end reply properties
//! - `composer_tests`: style pipeline invariants (gender, length cap)
//! - `weather_tests`: OpenWeatherMap client against a mock server
//! - `handler_tests`: update decoding, delivery and failure handling
//! - `config_tests`: environment-driven settings

pub mod config_tests;
pub mod handler_tests;

use async_trait::async_trait;

use crate::brain::entities::CityQuery;
use crate::services::traits::WeatherLookup;
use crate::services::weather::WeatherOutcome;

/// Weather stub returning a fixed outcome and ignoring the city.
pub(crate) struct FixedWeather(pub WeatherOutcome);

#[async_trait]
impl WeatherLookup for FixedWeather {
    async fn current_weather(&self, _city: &CityQuery) -> WeatherOutcome {
        self.0.clone()
    }
}
