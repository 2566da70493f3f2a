//! Entity extraction: city names for weather requests and person names for
//! the naming, punishment and greeting intents.
//!
//! Extraction is heuristic. Stop-word filtering and alias tables do the heavy
//! lifting, suffix rewrites cover inflected forms the tables do not list.

use serde::Serialize;
use std::sync::Arc;

use super::lexicon::{
    lookup_key, Lexicon, PersonProfile, CITY_SUFFIX_RULES, PERSON_FILLER, PERSON_LEADING_SKIP,
    SELF_KEY, WHO_IS_ANCHORS,
};
use super::normalizer::Utterance;

/// Minimum length (in chars) of a two-word city candidate.
const MIN_PAIR_CANDIDATE_LEN: usize = 4;

/// Quote pairs accepted around an explicit name.
const QUOTE_PAIRS: &[(char, char)] = &[('«', '»'), ('"', '"'), ('“', '”'), ('„', '“')];

/// A city candidate handed to the weather lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CityQuery {
    /// Canonical name on an alias hit, otherwise the best-effort rewrite.
    pub name: String,
    /// Latin transliteration, known only for table hits.
    pub latin: Option<String>,
    /// Whether the name came from the alias table.
    pub known: bool,
}

/// Outcome of person-name canonicalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersonRef {
    Known(&'static PersonProfile),
    /// Not in the roster; carries the surface form for display.
    Unknown(String),
}

impl PersonRef {
    pub fn display_name(&self) -> &str {
        match self {
            PersonRef::Known(profile) => profile.display_name,
            PersonRef::Unknown(surface) => surface,
        }
    }

    pub fn is_self(&self) -> bool {
        matches!(self, PersonRef::Known(profile) if profile.key == SELF_KEY)
    }
}

/// Extracts cities and person names from normalized text.
pub struct EntityExtractor {
    lexicon: Arc<Lexicon>,
}

impl EntityExtractor {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self { lexicon }
    }

    /// Pulls a city candidate out of a weather request.
    pub fn extract_city(&self, utterance: &Utterance) -> Option<CityQuery> {
        let cleaned = lookup_key(utterance.as_str());
        let tokens: Vec<&str> = cleaned
            .split(' ')
            .filter(|t| !t.is_empty() && !self.lexicon.is_city_stop_word(t))
            .collect();

        let last = *tokens.last()?;
        let pair = (tokens.len() >= 2)
            .then(|| tokens[tokens.len() - 2..].join(" "))
            .filter(|p| p.chars().count() >= MIN_PAIR_CANDIDATE_LEN);

        match pair {
            Some(pair) => {
                let preferred = self.canonicalize_city(&pair);
                if preferred.known {
                    return Some(preferred);
                }
                // "погода києві була" - the single token can still hit the table
                let single = self.canonicalize_city(last);
                Some(if single.known { single } else { preferred })
            }
            None => Some(self.canonicalize_city(last)),
        }
    }

    /// Resolves a raw candidate against the city table, falling back to the
    /// suffix heuristics.
    pub fn canonicalize_city(&self, candidate: &str) -> CityQuery {
        if let Some(entry) = self.lexicon.city(candidate) {
            return CityQuery {
                name: entry.canonical.to_string(),
                latin: Some(entry.latin.to_string()),
                known: true,
            };
        }

        let key = lookup_key(candidate);
        let mut first_rewrite: Option<String> = None;
        for (suffix, ending) in CITY_SUFFIX_RULES {
            let Some(rewritten) = rewrite_suffix(&key, suffix, ending) else {
                continue;
            };
            if let Some(entry) = self.lexicon.city(&rewritten) {
                return CityQuery {
                    name: entry.canonical.to_string(),
                    latin: Some(entry.latin.to_string()),
                    known: true,
                };
            }
            first_rewrite.get_or_insert(rewritten);
        }

        CityQuery {
            name: title_case(first_rewrite.as_deref().unwrap_or(&key)),
            latin: None,
            known: false,
        }
    }

    /// Finds the person a request is about.
    ///
    /// Order: an explicitly quoted name in the raw text, then the words after
    /// one of the intent's `anchors`, then the words after a "who is" phrase.
    pub fn extract_person_name(
        &self,
        raw_text: &str,
        utterance: &Utterance,
        anchors: &[&str],
    ) -> Option<PersonRef> {
        if let Some(quoted) = quoted_span(raw_text) {
            return Some(self.canonicalize_person(&quoted));
        }

        let cleaned = lookup_key(utterance.as_str());
        let words: Vec<&str> = cleaned.split(' ').filter(|w| !w.is_empty()).collect();

        if let Some(candidate) = words_after_any(&words, anchors).and_then(trim_person_filler) {
            let candidate = if candidate.len() > 2 { &candidate[..2] } else { &candidate[..] };
            return Some(self.resolve_words(candidate, true));
        }

        words_after_any(&words, WHO_IS_ANCHORS)
            .and_then(trim_person_filler)
            .map(|candidate| self.resolve_words(&candidate, false))
    }

    /// Maps a surface form to a roster profile; unresolved names pass through.
    pub fn canonicalize_person(&self, surface: &str) -> PersonRef {
        match self.lexicon.person(surface) {
            Some(profile) => PersonRef::Known(profile),
            None => PersonRef::Unknown(title_case(&lookup_key(surface))),
        }
    }

    /// Two-word candidate first, then the first word alone.
    fn resolve_words(&self, words: &[&str], keep_pair_when_unknown: bool) -> PersonRef {
        if words.len() >= 2 {
            let pair = words[..2].join(" ");
            if let Some(profile) = self.lexicon.person(&pair) {
                return PersonRef::Known(profile);
            }
        }
        if let Some(profile) = self.lexicon.person(words[0]) {
            return PersonRef::Known(profile);
        }
        if keep_pair_when_unknown && words.len() >= 2 {
            PersonRef::Unknown(title_case(&words[..2].join(" ")))
        } else {
            PersonRef::Unknown(title_case(words[0]))
        }
    }
}

/// Applies one suffix rule to the last word of `key`, keeping a stem of at
/// least two characters.
fn rewrite_suffix(key: &str, suffix: &str, ending: &str) -> Option<String> {
    let (head, last) = match key.rsplit_once(' ') {
        Some((head, last)) => (Some(head), last),
        None => (None, key),
    };
    let stem = last.strip_suffix(suffix)?;
    if stem.chars().count() < 2 {
        return None;
    }
    let word = format!("{}{}", stem, ending);
    Some(match head {
        Some(head) => format!("{} {}", head, word),
        None => word,
    })
}

/// First non-empty span enclosed in a matching quote pair.
fn quoted_span(raw: &str) -> Option<String> {
    QUOTE_PAIRS.iter().find_map(|&(open, close)| {
        let start = raw.find(open)? + open.len_utf8();
        let len = raw[start..].find(close)?;
        let inner = raw[start..start + len].trim();
        (!inner.is_empty()).then(|| inner.to_string())
    })
}

/// Words following the first anchor (in `anchors` order) found in `words`,
/// with leading prepositions skipped.
fn words_after_any<'w>(words: &[&'w str], anchors: &[&str]) -> Option<Vec<&'w str>> {
    anchors.iter().find_map(|anchor| {
        // same folding as the utterance words, so "who's" meets "whoʼs"
        let anchor_key = lookup_key(anchor);
        let anchor_words: Vec<&str> = anchor_key.split(' ').filter(|w| !w.is_empty()).collect();
        if anchor_words.is_empty() || anchor_words.len() > words.len() {
            return None;
        }
        let start = words
            .windows(anchor_words.len())
            .position(|window| window == anchor_words.as_slice())?;
        let rest: Vec<&str> = words[start + anchor_words.len()..]
            .iter()
            .copied()
            .skip_while(|w| PERSON_LEADING_SKIP.contains(w))
            .collect();
        (!rest.is_empty()).then_some(rest)
    })
}

/// Drops trailing politeness particles; `None` when nothing is left.
fn trim_person_filler(mut words: Vec<&str>) -> Option<Vec<&str>> {
    while words.last().is_some_and(|w| PERSON_FILLER.contains(w)) {
        words.pop();
    }
    (!words.is_empty()).then_some(words)
}

/// "івано-франківськ" -> "Івано-Франківськ", "нью йорк" -> "Нью Йорк".
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if at_word_start && c.is_alphabetic() {
            out.extend(c.to_uppercase());
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = c == ' ' || c == '-';
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brain::normalizer::Normalizer;

    fn setup() -> (Normalizer, EntityExtractor) {
        let normalizer = Normalizer::new(&["нері".to_string(), "neri".to_string()]).unwrap();
        (normalizer, EntityExtractor::new(Arc::new(Lexicon::new())))
    }

    #[test]
    fn test_city_from_english_request() {
        let (n, e) = setup();
        let city = e.extract_city(&n.normalize("Neri, weather in Kyiv")).unwrap();
        assert_eq!(city.name, "Київ");
        assert_eq!(city.latin.as_deref(), Some("Kyiv"));
        assert!(city.known);
    }

    #[test]
    fn test_city_inflected_via_table_and_heuristics() {
        let (n, e) = setup();
        let cases = [
            ("Нері, яка погода в Києві?", "Київ"),
            ("Нері, погода у Харкові", "Харків"),
            ("Нері, погода в Тернополі", "Тернопіль"),
            ("Нері, погода в Кривому Розі", "Кривий Ріг"),
            ("Нері, погода Нью Йорк", "Нью-Йорк"),
        ];
        for (raw, expected) in cases {
            let city = e.extract_city(&n.normalize(raw)).unwrap();
            assert_eq!(city.name, expected, "input: {}", raw);
            assert!(city.known);
        }
    }

    #[test]
    fn test_unknown_city_keeps_best_effort_rewrite() {
        let (n, e) = setup();
        let city = e.extract_city(&n.normalize("Нері, погода в Броварах")).unwrap();
        assert_eq!(city.name, "Бровари");
        assert!(!city.known);
        assert!(city.latin.is_none());
    }

    #[test]
    fn test_no_city_when_only_stop_words() {
        let (n, e) = setup();
        assert!(e.extract_city(&n.normalize("Нері, яка погода зараз?")).is_none());
    }

    #[test]
    fn test_quoted_name_always_wins() {
        let (n, e) = setup();
        let raw = "Нері, розкажи про Тараса, а ще хто такий «Дейз»";
        let person = e.extract_person_name(raw, &n.normalize(raw), &["про"]).unwrap();
        assert_eq!(person.display_name(), "Дейз");
    }

    #[test]
    fn test_anchor_with_trailing_filler() {
        let (n, e) = setup();
        let raw = "Нері, покарай Макса будь ласка";
        let person = e.extract_person_name(raw, &n.normalize(raw), &["покарай"]).unwrap();
        assert!(matches!(person, PersonRef::Known(p) if p.key == "max"));
    }

    #[test]
    fn test_who_is_fallback_and_unknown_passthrough() {
        let (n, e) = setup();
        let raw = "Нері, хто такий Петро?";
        let person = e.extract_person_name(raw, &n.normalize(raw), &[]).unwrap();
        assert_eq!(person, PersonRef::Unknown("Петро".to_string()));

        let raw = "Neri, who is daze";
        let person = e.extract_person_name(raw, &n.normalize(raw), &[]).unwrap();
        assert_eq!(person.display_name(), "Дейз");
    }

    #[test]
    fn test_apostrophe_anchor_finds_the_name() {
        let (n, e) = setup();
        for raw in ["Neri, who's daze", "Neri, who’s daze?", "Neri, WHO'S Daze"] {
            let person = e.extract_person_name(raw, &n.normalize(raw), &[]);
            assert_eq!(person.map(|p| p.display_name().to_string()).as_deref(), Some("Дейз"), "{}", raw);
        }
    }

    #[test]
    fn test_missing_name() {
        let (n, e) = setup();
        let raw = "Нері, хто такий?";
        assert!(e.extract_person_name(raw, &n.normalize(raw), &[]).is_none());
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("івано-франківськ"), "Івано-Франківськ");
        assert_eq!(title_case("нью йорк"), "Нью Йорк");
    }
}
