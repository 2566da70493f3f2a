//! Text normalization.
//!
//! Turns a raw chat message into an [`Utterance`]: trimmed, whitespace-collapsed,
//! lowercased, with the assistant's name stripped from the front.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::AppError;

/// Normalized, prefix-stripped text of one inbound message.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Utterance {
    text: String,
    /// Whether the message started with one of the address tokens.
    addressed: bool,
}

impl Utterance {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn is_addressed(&self) -> bool {
        self.addressed
    }

    /// True if `needle` occurs anywhere in the text.
    pub fn contains(&self, needle: &str) -> bool {
        self.text.contains(needle)
    }

    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.text.split(' ').filter(|w| !w.is_empty())
    }
}

impl fmt::Display for Utterance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Collapses whitespace runs and lowercases. Does not touch the address prefix.
pub fn fold(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Normalizer bound to a fixed set of address tokens.
pub struct Normalizer {
    address_prefix: Regex,
}

impl Normalizer {
    /// Builds the anchored address-prefix pattern for `tokens`.
    ///
    /// A token only counts when it ends on a word boundary, so "нерівно" is not
    /// read as "нері" + "вно".
    pub fn new(tokens: &[String]) -> Result<Self, AppError> {
        let mut tokens: Vec<String> = tokens
            .iter()
            .map(|t| fold(t))
            .filter(|t| !t.is_empty())
            .collect();
        if tokens.is_empty() {
            return Err(AppError::Config("at least one address token is required".into()));
        }
        // longest first so a token that prefixes another never wins early
        tokens.sort_by_key(|t| std::cmp::Reverse(t.chars().count()));

        let alternatives = tokens
            .iter()
            .map(|t| regex::escape(t))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = format!(r"^(?:{})(?:\s*[,:\-–—]|\b)\s*", alternatives);
        let address_prefix = Regex::new(&pattern)
            .map_err(|e| AppError::Config(format!("invalid address token pattern: {}", e)))?;

        Ok(Self { address_prefix })
    }

    /// Normalizes `raw`. Empty or whitespace-only input yields an empty utterance.
    pub fn normalize(&self, raw: &str) -> Utterance {
        let mut text = fold(raw);
        let mut addressed = false;

        // "Нері, нері, ..." strips down to the request itself
        while let Some(m) = self.address_prefix.find(&text) {
            if m.end() == 0 {
                break;
            }
            addressed = true;
            text = text[m.end()..].trim_start().to_string();
        }

        Utterance {
            text: text.trim_end().to_string(),
            addressed,
        }
    }
}
