//! Glue between a transport payload, the reply engine and a delivery channel.

use std::sync::Arc;
use tracing::{debug, error, info, instrument};

use crate::brain::ReplyEngine;
use crate::error::AppError;
use crate::models::{InboundMessage, OutboundMessage, Update};
use crate::services::traits::DeliveryChannel;

/// Handles one update at a time; cheap to clone and share across tasks.
#[derive(Clone)]
pub struct UpdateHandler {
    engine: Arc<ReplyEngine>,
    channel: Arc<dyn DeliveryChannel>,
}

impl UpdateHandler {
    pub fn new(engine: Arc<ReplyEngine>, channel: Arc<dyn DeliveryChannel>) -> Self {
        Self { engine, channel }
    }

    /// Decodes a raw update and answers it.
    ///
    /// Only a malformed payload is an error. The returned message is the reply
    /// that was handed to the channel, whether or not delivery succeeded.
    #[instrument(skip(self, payload), fields(bytes = payload.len()))]
    pub async fn handle(&self, payload: &[u8]) -> Result<Option<OutboundMessage>, AppError> {
        let update: Update = serde_json::from_slice(payload)?;
        let update_id = update.update_id;
        let Some(inbound) = update.into_inbound() else {
            debug!(update_id, "Update carries no text message, ignored");
            return Ok(None);
        };
        Ok(self.handle_message(&inbound).await)
    }

    /// Answers an already decoded message. Delivery failures are logged and dropped.
    pub async fn handle_message(&self, inbound: &InboundMessage) -> Option<OutboundMessage> {
        let reply = self.engine.reply(inbound).await?;
        let outbound = OutboundMessage::reply_to(inbound, reply.text);

        match self.channel.deliver(&outbound).await {
            Ok(()) => info!(chat_id = outbound.chat_id, intent = %reply.intent, "Reply sent"),
            Err(e) => error!(chat_id = outbound.chat_id, error = %e, "Delivery failed, reply dropped"),
        }
        Some(outbound)
    }
}
