//! Intent routing using keyword sets and regex patterns.
//!
//! Rules are evaluated in declaration order and the first satisfied rule wins.
//! There is no scoring. Two mechanisms keep generic rules from shadowing
//! specific ones:
//! - a sensitive-topic filter checked before every rule, which short-circuits
//!   to a fixed refusal;
//! - a reserved-topic block-list that disables gated (small-talk) rules when
//!   the text mentions a higher-priority topic.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use super::composer::{ResponsePool, TailKind};
use super::normalizer::Utterance;

/// Recognized request category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Serious or unsafe topic; always refused
    SensitiveTopic,
    /// Current weather for a city
    Weather,
    /// "Who is X"
    WhoIs,
    /// "Tell me about X"
    AboutPerson,
    /// Playful punishment of someone
    Punish,
    /// Pass a greeting on to someone
    GreetSomeone,
    DiceRoll,
    RockPaperScissors,
    GameMenu,
    HowAreYou,
    WhoAmI,
    Greeting,
    Thanks,
    Compliment,
    Farewell,
    /// `/start`
    Capabilities,
    /// `/help`
    Help,
    /// Addressed, but nothing matched
    Fallback,
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl Intent {
    /// Returns a stable label for logs and traces
    pub fn label(&self) -> &'static str {
        match self {
            Intent::SensitiveTopic => "sensitive_topic",
            Intent::Weather => "weather",
            Intent::WhoIs => "who_is",
            Intent::AboutPerson => "about_person",
            Intent::Punish => "punish",
            Intent::GreetSomeone => "greet_someone",
            Intent::DiceRoll => "dice_roll",
            Intent::RockPaperScissors => "rock_paper_scissors",
            Intent::GameMenu => "game_menu",
            Intent::HowAreYou => "how_are_you",
            Intent::WhoAmI => "who_am_i",
            Intent::Greeting => "greeting",
            Intent::Thanks => "thanks",
            Intent::Compliment => "compliment",
            Intent::Farewell => "farewell",
            Intent::Capabilities => "capabilities",
            Intent::Help => "help",
            Intent::Fallback => "fallback",
        }
    }
}

/// How much styling the composer applies to an intent's reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyClass {
    /// Composite assembly plus the full style pipeline
    SmallTalk,
    /// Style pipeline only
    Playful,
    /// Gender correction and length cap only; reproducible verbatim
    Factual,
}

/// Trigger predicate of a rule.
#[derive(Debug, Clone)]
pub enum Trigger {
    /// Every keyword must occur somewhere in the text (any order, overlaps allowed).
    AllOf(&'static [&'static str]),
    /// The pattern must match somewhere in the text.
    Pattern(Regex),
}

impl Trigger {
    /// Compiles a pattern trigger from a static table entry.
    ///
    /// Panics on an invalid pattern; rule patterns are compile-time constants.
    pub fn pattern(source: &str) -> Self {
        Trigger::Pattern(
            Regex::new(source).unwrap_or_else(|e| panic!("Invalid regex '{}': {}", source, e)),
        )
    }

    /// Returns the matched text, if any.
    pub fn matches(&self, utterance: &Utterance) -> Option<String> {
        match self {
            Trigger::AllOf(keywords) => keywords
                .iter()
                .all(|k| utterance.contains(k))
                .then(|| keywords.join("+")),
            Trigger::Pattern(regex) => regex.find(utterance.as_str()).map(|m| m.as_str().to_string()),
        }
    }
}

/// Response pools of an intent that is about a person.
#[derive(Debug, Clone)]
pub struct PersonPools {
    /// Anchors after which the name is expected (e.g. "про", "покарай").
    pub anchors: &'static [&'static str],
    pub known: ResponsePool,
    pub unknown: ResponsePool,
    /// No name could be extracted at all.
    pub missing: ResponsePool,
    /// The person is the assistant itself; falls back to `known` when absent.
    pub myself: Option<ResponsePool>,
}

/// What a rule answers with.
#[derive(Debug, Clone)]
pub enum Responses {
    Pool(ResponsePool),
    Person(PersonPools),
    /// Composed from the weather lookup outcome.
    Weather,
}

/// One entry of the routing table.
#[derive(Debug, Clone)]
pub struct IntentRule {
    pub intent: Intent,
    pub class: ReplyClass,
    /// Any trigger matching satisfies the rule.
    pub triggers: Vec<Trigger>,
    /// Disabled when the text mentions a reserved topic.
    pub gated: bool,
    /// Tail categories for small-talk assembly.
    pub tails: &'static [TailKind],
    pub responses: Responses,
}

/// Complete, immutable routing configuration.
#[derive(Debug, Clone)]
pub struct RuleBook {
    /// Sensitive-topic tokens, checked before anything else.
    pub sensitive_tokens: &'static [&'static str],
    pub refusal: IntentRule,
    /// Tokens of higher-priority topics that disable gated rules.
    pub reserved_tokens: &'static [&'static str],
    /// Rules in priority order.
    pub rules: Vec<IntentRule>,
}

/// Result of routing
#[derive(Debug, Clone)]
pub struct RouteMatch<'a> {
    pub rule: &'a IntentRule,
    /// Text (or keyword set) that satisfied the trigger
    pub matched_pattern: String,
}

impl RouteMatch<'_> {
    pub fn intent(&self) -> Intent {
        self.rule.intent
    }
}

/// First-match intent router
pub struct IntentRouter {
    book: RuleBook,
}

impl IntentRouter {
    pub fn new(book: RuleBook) -> Self {
        Self { book }
    }

    pub fn rules(&self) -> &[IntentRule] {
        &self.book.rules
    }

    /// Routes an utterance; `None` means nothing matched.
    pub fn route(&self, utterance: &Utterance) -> Option<RouteMatch<'_>> {
        if utterance.is_empty() {
            return None;
        }

        if let Some(token) = self
            .book
            .sensitive_tokens
            .iter()
            .find(|t| utterance.contains(t))
        {
            debug!(token = %token, "Sensitive topic, refusing");
            return Some(RouteMatch {
                rule: &self.book.refusal,
                matched_pattern: token.to_string(),
            });
        }

        let reserved = self
            .book
            .reserved_tokens
            .iter()
            .any(|t| utterance.contains(t));

        for rule in &self.book.rules {
            if rule.gated && reserved {
                continue;
            }
            if let Some(matched_pattern) = rule.triggers.iter().find_map(|t| t.matches(utterance)) {
                debug!(intent = %rule.intent, matched = %matched_pattern, "Intent matched");
                return Some(RouteMatch {
                    rule,
                    matched_pattern,
                });
            }
        }

        debug!("No intent matched");
        None
    }
}
