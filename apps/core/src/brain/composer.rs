//! Response composition.
//!
//! Picks a template from a response pool, corrects its grammatical gender, fills
//! its slots, optionally wraps it into a composite reply (header + body + tails)
//! and runs the style pipeline: random emphasis, then random decoration. The
//! soft length cap is enforced last.
//!
//! Gender correction touches only the assistant's own text (templates, headers,
//! tails), never slot values such as names or places.

use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;
use validator::Validate;

use super::intent::{Intent, ReplyClass};

/// Computes a reply at selection time (dice rolls, game moves).
pub type Generator = fn(&mut dyn RngCore, &Slots) -> String;

/// One entry of a response pool.
#[derive(Clone, Copy)]
pub enum ResponseEntry {
    /// Template text, optionally with `{slot}` placeholders.
    Literal(&'static str),
    Computed(Generator),
}

impl ResponseEntry {
    pub fn resolve(&self, rng: &mut dyn RngCore, slots: &Slots) -> String {
        match self {
            ResponseEntry::Literal(template) => slots.render(template),
            ResponseEntry::Computed(generate) => generate(rng, slots),
        }
    }
}

impl std::fmt::Debug for ResponseEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResponseEntry::Literal(text) => f.debug_tuple("Literal").field(text).finish(),
            ResponseEntry::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// A pool of interchangeable responses; never empty in the rule tables.
pub type ResponsePool = &'static [ResponseEntry];

/// Categories of optional phrases appended to small-talk replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TailKind {
    Support,
    Vibe,
    Question,
}

impl TailKind {
    fn pool(self) -> &'static [&'static str] {
        match self {
            TailKind::Support => SUPPORT_TAILS,
            TailKind::Vibe => VIBE_TAILS,
            TailKind::Question => QUESTION_TAILS,
        }
    }
}

/// The empty header is part of the pool on purpose.
static HEADERS: &[&str] = &["", "Ох!", "Слухай.", "Мяу!", "Так-так."];

static SUPPORT_TAILS: &[&str] = &[
    "Я поруч, якщо що 🐾",
    "Тримайся, все буде добре.",
    "Якщо треба виговоритись - я тут.",
];

static VIBE_TAILS: &[&str] = &[
    "Гарного дня ✨",
    "Вайб сьогодні топовий 😎",
    "Муркочу від задоволення.",
];

static QUESTION_TAILS: &[&str] = &["А в тебе як?", "Що нового?", "Як настрій?"];

/// Decorative symbols for the decoration step.
static DECORATIONS: &[&str] = &["😺", "😼", "😸", "✨", "💫", "🐾", "🔥", "😎"];

/// Feminine first-person forms and their masculine counterparts.
static GENDER_FIXES: &[(&str, &str)] = &[
    ("я сама", "я сам"),
    ("зробила", "зробив"),
    ("зрозуміла", "зрозумів"),
    ("подумала", "подумав"),
    ("сказала", "сказав"),
    ("забула", "забув"),
    ("знайшла", "знайшов"),
    ("прочитала", "прочитав"),
    ("перевірила", "перевірив"),
    ("побачила", "побачив"),
    ("виграла", "виграв"),
    ("програла", "програв"),
    ("втомилася", "втомився"),
    ("прокинулася", "прокинувся"),
    ("загубилася", "загубився"),
    ("заплуталася", "заплутався"),
    ("була", "був"),
    ("рада", "радий"),
    ("готова", "готовий"),
    ("впевнена", "впевнений"),
    ("вдячна", "вдячний"),
    ("щаслива", "щасливий"),
    ("зайнята", "зайнятий"),
];

/// Tunables of the style pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StyleConfig {
    /// Soft cap on reply length, in characters.
    #[validate(range(min = 40, max = 4096))]
    pub soft_cap: usize,
    #[validate(range(min = 0.0, max = 1.0))]
    pub emphasis_probability: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub decoration_probability: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub header_probability: f64,
    #[validate(range(max = 4))]
    pub max_tails: usize,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            soft_cap: 260,
            emphasis_probability: 0.25,
            decoration_probability: 0.25,
            header_probability: 0.35,
            max_tails: 2,
        }
    }
}

impl StyleConfig {
    /// No randomness at all; useful for verbatim checks.
    pub fn plain() -> Self {
        Self {
            emphasis_probability: 0.0,
            decoration_probability: 0.0,
            header_probability: 0.0,
            max_tails: 0,
            ..Self::default()
        }
    }
}

/// Named values substituted into `{slot}` placeholders.
#[derive(Debug, Clone, Default)]
pub struct Slots {
    values: HashMap<&'static str, String>,
}

impl Slots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.values.insert(name, value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Replaces every known `{slot}`; unknown placeholders stay as written.
    pub fn render(&self, template: &str) -> String {
        let mut out = template.to_string();
        for (name, value) in &self.values {
            out = out.replace(&format!("{{{}}}", name), value);
        }
        out
    }
}

/// What to compose.
pub struct ComposeRequest<'a> {
    pub intent: Intent,
    pub class: ReplyClass,
    pub pool: ResponsePool,
    pub slots: &'a Slots,
    /// Tail categories allowed for small-talk replies.
    pub tails: &'a [TailKind],
}

/// Final text handed to the delivery channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposedReply {
    pub text: String,
    pub intent: Intent,
    pub class: ReplyClass,
}

/// Composer holding the compiled gender-correction pattern.
pub struct ResponseComposer {
    config: StyleConfig,
    gender_pattern: Regex,
    gender_map: HashMap<&'static str, &'static str>,
}

impl Default for ResponseComposer {
    fn default() -> Self {
        Self::new(StyleConfig::default())
    }
}

impl ResponseComposer {
    pub fn new(config: StyleConfig) -> Self {
        let mut forms: Vec<&str> = GENDER_FIXES.iter().map(|(feminine, _)| *feminine).collect();
        // longest first so "я сама" is not pre-empted by a shorter form
        forms.sort_by_key(|f| std::cmp::Reverse(f.chars().count()));
        let alternatives = forms
            .iter()
            .map(|f| regex::escape(f).replace(' ', r"\s+"))
            .collect::<Vec<_>>()
            .join("|");
        // NOTE: expect() is acceptable here: the pattern is built from a static table
        let gender_pattern = Regex::new(&format!(r"(?i)\b(?:{})\b", alternatives))
            .expect("Invalid regex: gender correction table");

        Self {
            config,
            gender_pattern,
            gender_map: GENDER_FIXES.iter().copied().collect(),
        }
    }

    pub fn config(&self) -> &StyleConfig {
        &self.config
    }

    /// Composes a reply, or `None` when the selected entry produces no text.
    pub fn compose<R: Rng>(&self, request: ComposeRequest<'_>, rng: &mut R) -> Option<ComposedReply> {
        let body = self.select(request.pool, request.slots, rng)?;

        let text = match request.class {
            ReplyClass::SmallTalk => {
                let assembled = self.assemble(body, request.tails, rng);
                let styled = self.emphasize(assembled, rng);
                self.decorate(styled, rng)
            }
            ReplyClass::Playful => {
                let styled = self.emphasize(body, rng);
                self.decorate(styled, rng)
            }
            ReplyClass::Factual => body,
        };
        let text = self.enforce_cap(text);

        debug!(intent = %request.intent, class = ?request.class, len = text.chars().count(), "Reply composed");
        Some(ComposedReply {
            text,
            intent: request.intent,
            class: request.class,
        })
    }

    /// Uniform choice from the pool; empty output means "no reply".
    ///
    /// Literal templates are gender-corrected before their slots are filled.
    pub fn select<R: Rng>(&self, pool: ResponsePool, slots: &Slots, rng: &mut R) -> Option<String> {
        let entry = pool.choose(rng)?;
        let text = match entry {
            ResponseEntry::Literal(template) => slots.render(&self.enforce_gender(template)),
            // generators only echo game moves and numbers back
            ResponseEntry::Computed(_) => self.enforce_gender(&entry.resolve(rng, slots)),
        };
        let text = text.trim().to_string();
        (!text.is_empty()).then_some(text)
    }

    /// Header + body + up to `max_tails` tails, deduplicated, trimmed to the
    /// soft cap by dropping tails from the right. The body is never dropped.
    pub fn assemble<R: Rng>(&self, body: String, tails: &[TailKind], rng: &mut R) -> String {
        let mut parts: Vec<String> = Vec::new();

        if rng.gen_bool(self.config.header_probability) {
            if let Some(header) = HEADERS.choose(rng).filter(|h| !h.is_empty()) {
                parts.push(self.enforce_gender(header));
            }
        }
        parts.push(body);
        let fixed = parts.len();

        if !tails.is_empty() && self.config.max_tails > 0 {
            let count = rng.gen_range(0..=self.config.max_tails);
            for _ in 0..count {
                let Some(kind) = tails.choose(rng) else { break };
                let Some(phrase) = kind.pool().choose(rng) else { continue };
                let phrase = self.enforce_gender(phrase);
                let so_far = parts.join(" ").to_lowercase();
                if so_far.contains(&phrase.to_lowercase()) {
                    continue;
                }
                parts.push(phrase);
            }
        }

        while parts.len() > fixed && char_len(&parts.join(" ")) > self.config.soft_cap {
            parts.pop();
        }
        parts.join(" ")
    }

    /// Upper-cases one random word (texts of three words or more).
    pub fn emphasize<R: Rng>(&self, text: String, rng: &mut R) -> String {
        if !rng.gen_bool(self.config.emphasis_probability) {
            return text;
        }
        let words: Vec<&str> = text.split(' ').collect();
        if words.iter().filter(|w| !w.is_empty()).count() < 3 {
            return text;
        }
        let candidates: Vec<usize> = words
            .iter()
            .enumerate()
            .filter(|(_, w)| w.chars().filter(|c| c.is_alphabetic()).count() >= 2)
            .filter(|(_, w)| w.chars().any(|c| c.is_lowercase()))
            .map(|(i, _)| i)
            .collect();
        let Some(&pick) = candidates.choose(rng) else {
            return text;
        };
        words
            .iter()
            .enumerate()
            .map(|(i, w)| if i == pick { w.to_uppercase() } else { w.to_string() })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Appends one decorative symbol when there is room and the text does not
    /// already end in one.
    pub fn decorate<R: Rng>(&self, text: String, rng: &mut R) -> String {
        if !rng.gen_bool(self.config.decoration_probability) || ends_with_decoration(&text) {
            return text;
        }
        let Some(symbol) = DECORATIONS.choose(rng) else {
            return text;
        };
        if char_len(&text) + 1 + char_len(symbol) > self.config.soft_cap {
            return text;
        }
        format!("{} {}", text, symbol)
    }

    /// Rewrites feminine first-person forms to masculine ones, keeping the
    /// casing shape of the matched word. Not randomized.
    pub fn enforce_gender(&self, text: &str) -> String {
        self.gender_pattern
            .replace_all(text, |caps: &Captures| {
                let matched = &caps[0];
                let key = matched.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
                match self.gender_map.get(key.as_str()) {
                    Some(masculine) => match_case(matched, masculine),
                    None => matched.to_string(),
                }
            })
            .into_owned()
    }

    /// Hard stop at the soft cap, with an ellipsis.
    pub fn enforce_cap(&self, text: String) -> String {
        let cap = self.config.soft_cap;
        if char_len(&text) <= cap {
            return text;
        }
        let mut cut: String = text.chars().take(cap.saturating_sub(1)).collect();
        cut.truncate(cut.trim_end().len());
        cut.push('…');
        cut
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Last visible char is an emoji or another non-text symbol.
fn ends_with_decoration(text: &str) -> bool {
    const TEXT_PUNCTUATION: &str = ".,!?;:…»«\"'()-–—ʼ’*";
    text.trim_end()
        .chars()
        .last()
        .is_some_and(|c| !c.is_alphanumeric() && !TEXT_PUNCTUATION.contains(c))
}

/// Gives `replacement` the casing shape of `original`.
fn match_case(original: &str, replacement: &str) -> String {
    let letters: Vec<char> = original.chars().filter(|c| c.is_alphabetic()).collect();
    if letters.len() > 1 && letters.iter().all(|c| c.is_uppercase()) {
        return replacement.to_uppercase();
    }
    if letters.first().is_some_and(|c| c.is_uppercase()) {
        let mut chars = replacement.chars();
        return match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
    }
    replacement.to_string()
}
