use async_trait::async_trait;
use tokio::io::{AsyncWriteExt, Stdout};
use tokio::sync::Mutex;

use crate::error::AppError;
use crate::models::OutboundMessage;

use super::traits::DeliveryChannel;

/// Prints replies to standard output; used by the interactive console mode.
pub struct ConsoleChannel {
    out: Mutex<Stdout>,
}

impl Default for ConsoleChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleChannel {
    pub fn new() -> Self {
        Self {
            out: Mutex::new(tokio::io::stdout()),
        }
    }
}

#[async_trait]
impl DeliveryChannel for ConsoleChannel {
    async fn deliver(&self, message: &OutboundMessage) -> Result<(), AppError> {
        let mut out = self.out.lock().await;
        out.write_all(format!("{}\n", message.text).as_bytes()).await?;
        out.flush().await?;
        Ok(())
    }
}
