use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};
use validator::Validate;

use crate::config::TelegramSettings;
use crate::error::AppError;
use crate::models::OutboundMessage;

use super::traits::DeliveryChannel;

/// Envelope of every Bot API response.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Delivers replies through the Telegram Bot API `sendMessage` method.
pub struct TelegramChannel {
    client: Client,
    /// Contains the bot token; never log it.
    endpoint: String,
}

impl TelegramChannel {
    pub fn new(settings: &TelegramSettings, timeout: Duration) -> Result<Self, AppError> {
        let token = settings
            .bot_token
            .as_deref()
            .ok_or_else(|| AppError::Config("BOT_TOKEN is not set".to_string()))?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!(
                "{}/bot{}/sendMessage",
                settings.api_base.trim_end_matches('/'),
                token
            ),
        })
    }
}

#[async_trait]
impl DeliveryChannel for TelegramChannel {
    #[instrument(skip(self, message), fields(chat_id = message.chat_id))]
    async fn deliver(&self, message: &OutboundMessage) -> Result<(), AppError> {
        message
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let res = self.client.post(&self.endpoint).json(message).send().await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(AppError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: ApiResponse = res.json().await?;
        if !envelope.ok {
            return Err(AppError::Delivery(
                envelope
                    .description
                    .unwrap_or_else(|| "sendMessage returned ok=false".to_string()),
            ));
        }

        debug!("Reply delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_token() {
        let settings = TelegramSettings {
            bot_token: None,
            api_base: "https://api.telegram.org".to_string(),
        };
        let err = TelegramChannel::new(&settings, Duration::from_secs(1)).err().unwrap();
        assert!(matches!(err, AppError::Config(_)));
    }
}
