//! # Brain Module
//!
//! Rule-based reply engine for the Neri chat assistant.
//! Everything here is synchronous text processing except the weather lookup,
//! which is reached through the [`WeatherLookup`](crate::services::WeatherLookup) trait.
//!
//! ## Components
//! - `normalizer`: folding and address-prefix stripping
//! - `intent`: ordered first-match routing with sensitive-topic and reserved-topic filters
//! - `rules`: the routing table and response pools
//! - `lexicon`: city and person alias tables
//! - `entities`: city and person extraction
//! - `composer`: template selection, assembly and the style pipeline
//! - `commands`: `/start` and `/help`
//! - `trace`: per-message diagnostic record
//! - `engine`: main orchestrator

pub mod commands;
pub mod composer;
pub mod engine;
pub mod entities;
pub mod intent;
pub mod lexicon;
pub mod normalizer;
pub mod rules;
pub mod trace;

pub use composer::{ComposedReply, ResponseComposer, StyleConfig};
pub use engine::ReplyEngine;
pub use intent::{Intent, IntentRouter, ReplyClass};
pub use normalizer::{Normalizer, Utterance};
pub use trace::ReplyTrace;
