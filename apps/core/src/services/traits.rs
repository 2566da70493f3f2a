use async_trait::async_trait;

use crate::brain::entities::CityQuery;
use crate::error::AppError;
use crate::models::OutboundMessage;

use super::weather::WeatherOutcome;

/// Defines the interface of a current-conditions weather provider.
///
/// Implementations never fail: every transport or decoding problem is folded
/// into [`WeatherOutcome::LookupFailed`], so the reply engine can always answer.
#[async_trait]
pub trait WeatherLookup: Send + Sync + 'static {
    /// Looks up the current conditions for a city candidate.
    async fn current_weather(&self, city: &CityQuery) -> WeatherOutcome;
}

/// Defines the interface of a channel that hands replies to the chat.
#[async_trait]
pub trait DeliveryChannel: Send + Sync + 'static {
    /// Delivers one message; an error means it was not delivered.
    async fn deliver(&self, message: &OutboundMessage) -> Result<(), AppError>;
}
