use serde::{Deserialize, Serialize};
use validator::Validate;

/// An incoming update as delivered by the Telegram Bot API.
///
/// Only the parts the assistant reads are modelled; unknown fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<TelegramMessage>,
    /// Edits are answered like fresh messages.
    #[serde(default)]
    pub edited_message: Option<TelegramMessage>,
}

impl Update {
    /// Extracts the text message carried by the update, if there is one.
    pub fn into_inbound(self) -> Option<InboundMessage> {
        let message = self.message.or(self.edited_message)?;
        let text = message.text?;
        Some(InboundMessage {
            chat_id: message.chat.id,
            message_id: Some(message.message_id),
            sender_id: message.from.as_ref().map(|user| user.id),
            sender: message.from.map(|user| user.display_name()),
            text,
        })
    }
}

/// A chat message inside an update.
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramMessage {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<User>,
    /// Absent for stickers, photos and service messages.
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub username: Option<String>,
}

impl User {
    /// First name, falling back to the username.
    pub fn display_name(&self) -> String {
        let first = self.first_name.trim();
        if first.is_empty() {
            self.username.clone().unwrap_or_default()
        } else {
            first.to_string()
        }
    }
}

/// A message the assistant may answer, independent of the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    pub chat_id: i64,
    pub message_id: Option<i64>,
    /// Telegram user id; `None` for the console and anonymous posts.
    #[serde(default)]
    pub sender_id: Option<i64>,
    /// Sender's display name, used for the `{sender}` slot.
    pub sender: Option<String>,
    pub text: String,
}

impl InboundMessage {
    /// A line typed into the local console.
    pub fn console(line: impl Into<String>) -> Self {
        Self {
            chat_id: 0,
            message_id: None,
            sender_id: None,
            sender: None,
            text: line.into(),
        }
    }
}

/// A reply ready for delivery; serializes to a `sendMessage` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct OutboundMessage {
    pub chat_id: i64,
    /// Telegram rejects texts longer than 4096 characters.
    #[validate(length(min = 1, max = 4096))]
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to_message_id: Option<i64>,
}

impl OutboundMessage {
    /// A reply to `inbound` in the same chat.
    pub fn reply_to(inbound: &InboundMessage, text: impl Into<String>) -> Self {
        Self {
            chat_id: inbound.chat_id,
            text: text.into(),
            reply_to_message_id: inbound.message_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_with_text() {
        let raw = r#"{
            "update_id": 10,
            "message": {
                "message_id": 7,
                "chat": {"id": -100, "type": "supergroup"},
                "from": {"id": 1, "first_name": "Оля", "is_bot": false},
                "text": "Нері, привіт"
            }
        }"#;
        let update: Update = serde_json::from_str(raw).unwrap();
        let inbound = update.into_inbound().unwrap();
        assert_eq!(inbound.chat_id, -100);
        assert_eq!(inbound.message_id, Some(7));
        assert_eq!(inbound.sender_id, Some(1));
        assert_eq!(inbound.sender.as_deref(), Some("Оля"));
        assert_eq!(inbound.text, "Нері, привіт");
    }

    #[test]
    fn test_edited_message_and_missing_text() {
        let edited = r#"{"update_id": 1, "edited_message": {"message_id": 2, "chat": {"id": 3}, "text": "нері, кинути"}}"#;
        let update: Update = serde_json::from_str(edited).unwrap();
        assert_eq!(update.into_inbound().unwrap().text, "нері, кинути");

        let sticker = r#"{"update_id": 1, "message": {"message_id": 2, "chat": {"id": 3}, "sticker": {}}}"#;
        let update: Update = serde_json::from_str(sticker).unwrap();
        assert!(update.into_inbound().is_none());
    }

    #[test]
    fn test_outbound_serialization() {
        let inbound = InboundMessage::console("нері, привіт");
        let out = OutboundMessage::reply_to(&inbound, "Мяу");
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["chat_id"], 0);
        assert!(json.get("reply_to_message_id").is_none());
        assert!(out.validate().is_ok());
    }

    #[test]
    fn test_username_fallback() {
        let user = User {
            id: 1,
            first_name: " ".to_string(),
            username: Some("daze".to_string()),
        };
        assert_eq!(user.display_name(), "daze");
    }
}
