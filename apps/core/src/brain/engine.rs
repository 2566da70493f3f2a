//! Reply Engine - Main orchestrator of the brain.
//!
//! Runs one inbound message through the pipeline:
//! 1. administrative commands (`/start`, `/help`), recognized on the raw text
//! 2. normalization; unaddressed or empty text gets no reply
//! 3. routing (sensitive topics first, then the ordered rule table)
//! 4. entity extraction and the weather lookup, when the intent needs them
//! 5. composition
//!
//! The engine holds only read-only tables, so one instance serves any number
//! of concurrent messages.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, instrument};

use super::commands::AdminCommand;
use super::composer::{ComposeRequest, ComposedReply, ResponseComposer, ResponsePool, Slots, StyleConfig, TailKind};
use super::entities::{EntityExtractor, PersonRef};
use super::intent::{Intent, IntentRouter, PersonPools, ReplyClass, Responses, RuleBook};
use super::lexicon::Lexicon;
use super::normalizer::{Normalizer, Utterance};
use super::rules::{
    default_rulebook, CAPABILITIES, FALLBACK, HELP, WEATHER_LOOKUP_FAILED, WEATHER_NOT_FOUND,
    WEATHER_NO_CITY, WEATHER_NO_CREDENTIALS, WEATHER_REPORT,
};
use super::trace::ReplyTrace;
use crate::config::Settings;
use crate::error::AppError;
use crate::models::InboundMessage;
use crate::services::traits::WeatherLookup;
use crate::services::weather::WeatherOutcome;

/// `{sender}` value when the message carries no usable name.
const DEFAULT_SENDER: &str = "друже";

/// Pool, slots and styling chosen for one message.
struct Plan {
    intent: Intent,
    class: ReplyClass,
    pool: ResponsePool,
    slots: Slots,
    tails: &'static [TailKind],
}

/// Stateless reply engine shared by all message handlers.
pub struct ReplyEngine {
    normalizer: Normalizer,
    router: IntentRouter,
    extractor: EntityExtractor,
    composer: ResponseComposer,
    weather: Arc<dyn WeatherLookup>,
}

impl ReplyEngine {
    /// Builds the engine with the built-in rule table and lexicon.
    pub fn new(settings: &Settings, weather: Arc<dyn WeatherLookup>) -> Result<Self, AppError> {
        Self::with_rules(
            &settings.address_tokens,
            default_rulebook(),
            settings.style.clone(),
            weather,
        )
    }

    pub fn with_rules(
        address_tokens: &[String],
        rules: RuleBook,
        style: StyleConfig,
        weather: Arc<dyn WeatherLookup>,
    ) -> Result<Self, AppError> {
        Ok(Self {
            normalizer: Normalizer::new(address_tokens)?,
            router: IntentRouter::new(rules),
            extractor: EntityExtractor::new(Arc::new(Lexicon::new())),
            composer: ResponseComposer::new(style),
            weather,
        })
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Answers a message, or `None` when no reply is warranted.
    pub async fn reply(&self, message: &InboundMessage) -> Option<ComposedReply> {
        let mut rng = StdRng::from_entropy();
        self.reply_with(message, &mut rng).await
    }

    /// Same as [`reply`](Self::reply) with a caller-supplied randomness source.
    #[instrument(skip(self, message, rng), fields(chat_id = message.chat_id, sender_id = ?message.sender_id))]
    pub async fn reply_with<R: Rng + Send>(
        &self,
        message: &InboundMessage,
        rng: &mut R,
    ) -> Option<ComposedReply> {
        let start = Instant::now();
        let sender = message
            .sender
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SENDER);

        if let Some(command) = AdminCommand::parse(&message.text) {
            let (intent, pool) = match command {
                AdminCommand::Start => (Intent::Capabilities, CAPABILITIES),
                AdminCommand::Help => (Intent::Help, HELP),
            };
            debug!(intent = %intent, "Administrative command");
            let slots = Slots::new().with("sender", sender);
            return self.composer.compose(
                ComposeRequest {
                    intent,
                    class: ReplyClass::Factual,
                    pool,
                    slots: &slots,
                    tails: &[],
                },
                rng,
            );
        }

        let utterance = self.normalizer.normalize(&message.text);
        if !utterance.is_addressed() || utterance.is_empty() {
            debug!(addressed = utterance.is_addressed(), "Not answering");
            return None;
        }

        let mut trace = ReplyTrace::new(utterance.as_str());
        let slots = Slots::new()
            .with("sender", sender)
            .with("utterance", utterance.as_str());
        let plan = self.plan(&message.text, &utterance, slots, &mut trace).await;

        trace.intent = Some(plan.intent);
        trace.class = Some(plan.class);
        let reply = self.composer.compose(
            ComposeRequest {
                intent: plan.intent,
                class: plan.class,
                pool: plan.pool,
                slots: &plan.slots,
                tails: plan.tails,
            },
            rng,
        );

        trace.replied = reply.is_some();
        trace.processing_time_ms = start.elapsed().as_millis() as u64;
        debug!(trace = %trace.summary(), "Message handled");
        reply
    }

    async fn plan(
        &self,
        raw_text: &str,
        utterance: &Utterance,
        slots: Slots,
        trace: &mut ReplyTrace,
    ) -> Plan {
        let Some(route) = self.router.route(utterance) else {
            return Plan {
                intent: Intent::Fallback,
                class: ReplyClass::Playful,
                pool: FALLBACK,
                slots,
                tails: &[],
            };
        };
        trace.matched_pattern = Some(route.matched_pattern.clone());
        let rule = route.rule;

        let (pool, slots) = match &rule.responses {
            Responses::Pool(pool) => (*pool, slots),
            Responses::Person(pools) => self.plan_person(raw_text, utterance, pools, slots, trace),
            Responses::Weather => self.plan_weather(utterance, slots, trace).await,
        };

        Plan {
            intent: rule.intent,
            class: rule.class,
            pool,
            slots,
            tails: rule.tails,
        }
    }

    fn plan_person(
        &self,
        raw_text: &str,
        utterance: &Utterance,
        pools: &PersonPools,
        slots: Slots,
        trace: &mut ReplyTrace,
    ) -> (ResponsePool, Slots) {
        let Some(person) = self.extractor.extract_person_name(raw_text, utterance, pools.anchors) else {
            return (pools.missing, slots);
        };
        trace.entity = Some(person.display_name().to_string());

        let slots = slots.with("name", person.display_name());
        let pool = match &person {
            _ if person.is_self() => pools.myself.unwrap_or(pools.known),
            PersonRef::Known(_) => pools.known,
            PersonRef::Unknown(_) => pools.unknown,
        };
        match person {
            PersonRef::Known(profile) => (pool, slots.with("role", profile.role)),
            PersonRef::Unknown(_) => (pool, slots),
        }
    }

    async fn plan_weather(
        &self,
        utterance: &Utterance,
        slots: Slots,
        trace: &mut ReplyTrace,
    ) -> (ResponsePool, Slots) {
        let Some(city) = self.extractor.extract_city(utterance) else {
            return (WEATHER_NO_CITY, slots);
        };
        trace.entity = Some(city.name.clone());

        match self.weather.current_weather(&city).await {
            WeatherOutcome::Report(report) => {
                let slots = slots
                    .with("place", report.place.clone())
                    .with("temp", report.temperature_rounded().to_string())
                    .with("feels", report.feels_like_rounded().to_string())
                    .with("description", report.description_sentence())
                    .with("symbol", report.symbol());
                (WEATHER_REPORT, slots)
            }
            WeatherOutcome::LookupFailed { place } => (WEATHER_LOOKUP_FAILED, slots.with("place", place)),
            WeatherOutcome::NotFound { query } => (WEATHER_NOT_FOUND, slots.with("place", query)),
            WeatherOutcome::MissingCredentials => (WEATHER_NO_CREDENTIALS, slots),
        }
    }
}
