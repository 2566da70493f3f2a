//! Reply Trace - Diagnostic record of how one message was answered.
//!
//! Built by the engine for every addressed message and logged at debug level.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::intent::{Intent, ReplyClass};

/// How a message was handled
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyTrace {
    /// Normalized utterance (address prefix removed)
    pub utterance: String,

    /// Routed intent, `None` before routing
    pub intent: Option<Intent>,

    /// Styling class of the reply
    pub class: Option<ReplyClass>,

    /// Pattern or keyword set that selected the intent
    pub matched_pattern: Option<String>,

    /// Extracted city or person, when the intent needs one
    pub entity: Option<String>,

    /// Whether a reply was produced
    pub replied: bool,

    /// Processing time in milliseconds
    pub processing_time_ms: u64,

    /// Timestamp of handling
    pub timestamp: DateTime<Utc>,
}

impl ReplyTrace {
    pub fn new(utterance: impl Into<String>) -> Self {
        Self {
            utterance: utterance.into(),
            intent: None,
            class: None,
            matched_pattern: None,
            entity: None,
            replied: false,
            processing_time_ms: 0,
            timestamp: Utc::now(),
        }
    }

    /// One-line summary for logging
    pub fn summary(&self) -> String {
        format!(
            "Intent: {}, Class: {}, Entity: {}, Replied: {}, {}ms",
            self.intent.map(|i| i.label()).unwrap_or("none"),
            self.class.map(|c| format!("{:?}", c)).unwrap_or_else(|| "none".to_string()),
            self.entity.as_deref().unwrap_or("-"),
            if self.replied { "yes" } else { "no" },
            self.processing_time_ms
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_creation() {
        let trace = ReplyTrace::new("як справи");
        assert_eq!(trace.utterance, "як справи");
        assert!(trace.intent.is_none());
        assert!(!trace.replied);
    }

    #[test]
    fn test_summary() {
        let mut trace = ReplyTrace::new("погода в києві");
        trace.intent = Some(Intent::Weather);
        trace.class = Some(ReplyClass::Factual);
        trace.entity = Some("Київ".to_string());
        let summary = trace.summary();

        assert!(summary.contains("Intent: weather"));
        assert!(summary.contains("Entity: Київ"));
    }

    #[test]
    fn test_serializes_intent_label() {
        let mut trace = ReplyTrace::new("кинути");
        trace.intent = Some(Intent::DiceRoll);
        let json = serde_json::to_value(&trace).unwrap();
        assert_eq!(json["intent"], "dice_roll");
    }
}
