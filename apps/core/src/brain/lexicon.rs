//! Alias tables for entity canonicalization.
//!
//! The raw tables are static data. [`Lexicon::new`] indexes them once into
//! lookup maps; the result is shared read-only (behind an `Arc`) by the
//! extractor and never mutated afterwards.

use std::collections::{HashMap, HashSet};

/// A known city: canonical Ukrainian name, Latin transliteration for the
/// weather provider, and every surface form we accept.
#[derive(Debug, PartialEq, Eq)]
pub struct CityEntry {
    pub canonical: &'static str,
    pub latin: &'static str,
    pub aliases: &'static [&'static str],
}

/// A person the assistant can talk about.
#[derive(Debug, PartialEq, Eq)]
pub struct PersonProfile {
    /// Stable identity key; several spellings map to one key.
    pub key: &'static str,
    pub display_name: &'static str,
    pub role: &'static str,
    pub aliases: &'static [&'static str],
}

/// Identity key of the assistant's own profile.
pub const SELF_KEY: &str = "neri";

static CITIES: &[CityEntry] = &[
    CityEntry {
        canonical: "Київ",
        latin: "Kyiv",
        aliases: &["київ", "києва", "києві", "києву", "києвом", "kyiv", "kiev", "киев", "києвi"],
    },
    CityEntry {
        canonical: "Львів",
        latin: "Lviv",
        aliases: &["львів", "львова", "львові", "львову", "lviv", "lvov", "львов"],
    },
    CityEntry {
        canonical: "Харків",
        latin: "Kharkiv",
        aliases: &["харків", "харкова", "харкові", "kharkiv", "kharkov", "харьков"],
    },
    CityEntry {
        canonical: "Одеса",
        latin: "Odesa",
        aliases: &["одеса", "одесі", "одеси", "одесу", "odesa", "odessa", "одесса"],
    },
    CityEntry {
        canonical: "Дніпро",
        latin: "Dnipro",
        aliases: &["дніпро", "дніпрі", "дніпра", "dnipro", "днепр"],
    },
    CityEntry {
        canonical: "Запоріжжя",
        latin: "Zaporizhzhia",
        aliases: &["запоріжжя", "запоріжжі", "zaporizhzhia", "запорожье"],
    },
    CityEntry {
        canonical: "Вінниця",
        latin: "Vinnytsia",
        aliases: &["вінниця", "вінниці", "вінницю", "vinnytsia"],
    },
    CityEntry {
        canonical: "Полтава",
        latin: "Poltava",
        aliases: &["полтава", "полтаві", "полтави", "poltava"],
    },
    CityEntry {
        canonical: "Ужгород",
        latin: "Uzhhorod",
        aliases: &["ужгород", "ужгороді", "ужгорода", "uzhhorod"],
    },
    CityEntry {
        canonical: "Кривий Ріг",
        latin: "Kryvyi Rih",
        aliases: &["кривий ріг", "кривому розі", "кривого рогу", "kryvyi rih"],
    },
    CityEntry {
        canonical: "Івано-Франківськ",
        latin: "Ivano-Frankivsk",
        aliases: &["івано-франківськ", "івано-франківську", "франик", "франику", "ivano-frankivsk"],
    },
    CityEntry {
        canonical: "Біла Церква",
        latin: "Bila Tserkva",
        aliases: &["біла церква", "білій церкві", "bila tserkva"],
    },
    CityEntry {
        canonical: "Чернігів",
        latin: "Chernihiv",
        aliases: &["чернігів", "чернігові", "chernihiv"],
    },
    CityEntry {
        canonical: "Житомир",
        latin: "Zhytomyr",
        aliases: &["житомир", "житомирі", "zhytomyr"],
    },
    CityEntry {
        canonical: "Тернопіль",
        latin: "Ternopil",
        aliases: &["тернопіль", "тернополі", "ternopil"],
    },
    CityEntry {
        canonical: "Луцьк",
        latin: "Lutsk",
        aliases: &["луцьк", "луцьку", "lutsk"],
    },
    CityEntry {
        canonical: "Суми",
        latin: "Sumy",
        aliases: &["суми", "сумах", "sumy"],
    },
    CityEntry {
        canonical: "Черкаси",
        latin: "Cherkasy",
        aliases: &["черкаси", "черкасах", "cherkasy"],
    },
    CityEntry {
        canonical: "Рівне",
        latin: "Rivne",
        aliases: &["рівне", "рівному", "rivne"],
    },
    CityEntry {
        canonical: "Миколаїв",
        latin: "Mykolaiv",
        aliases: &["миколаїв", "миколаєві", "mykolaiv"],
    },
    CityEntry {
        canonical: "Херсон",
        latin: "Kherson",
        aliases: &["херсон", "херсоні", "kherson"],
    },
    CityEntry {
        canonical: "Чернівці",
        latin: "Chernivtsi",
        aliases: &["чернівці", "чернівцях", "chernivtsi"],
    },
    CityEntry {
        canonical: "Варшава",
        latin: "Warsaw",
        aliases: &["варшава", "варшаві", "warsaw", "warszawa"],
    },
    CityEntry {
        canonical: "Лондон",
        latin: "London",
        aliases: &["лондон", "лондоні", "london"],
    },
    CityEntry {
        canonical: "Нью-Йорк",
        latin: "New York",
        aliases: &["нью-йорк", "нью йорк", "нью-йорку", "new york", "nyc"],
    },
];

static PERSONS: &[PersonProfile] = &[
    PersonProfile {
        key: "daze",
        display_name: "Дейз",
        role: "творець цього чату і мій головний тестувальник",
        aliases: &["дейз", "дейза", "дейзу", "дейзом", "дейзі", "дейзік", "daze", "deyz"],
    },
    PersonProfile {
        key: SELF_KEY,
        display_name: "Нері",
        role: "кіт-бот цього чату: погода, ігри й трохи дурниць",
        aliases: &["нері", "нери", "neri"],
    },
    PersonProfile {
        key: "max",
        display_name: "Макс",
        role: "голос розуму в цьому чаті",
        aliases: &["макс", "макса", "максу", "максом", "максим", "максима", "max"],
    },
    PersonProfile {
        key: "olya",
        display_name: "Оля",
        role: "головна по мемах",
        aliases: &["оля", "олі", "олю", "олею", "ольга", "ольги", "olya", "olha"],
    },
    PersonProfile {
        key: "taras",
        display_name: "Тарас",
        role: "людина, що завжди знає, де найкраща кава",
        aliases: &["тарас", "тараса", "тарасу", "тарасом", "taras"],
    },
];

/// Words dropped before picking a city candidate.
static CITY_STOP_WORDS: &[&str] = &[
    // question words
    "яка", "який", "яке", "які", "що", "як", "де", "чи", "what", "what's", "whats", "how", "is",
    "the", "whether",
    // politeness
    "будь", "ласка", "пліз", "плз", "please", "pls", "скажи", "підкажи", "покажи", "розкажи",
    "дізнайся", "глянь", "tell", "me", "show", "check",
    // prepositions
    "в", "у", "на", "по", "з", "із", "для", "in", "at", "for", "of", "a", "і", "й", "а",
    // topic words
    "погода", "погоду", "погоди", "погодка", "погодою", "температура", "температуру", "прогноз",
    "weather", "forecast", "temperature", "місто", "місті", "city",
    // time words
    "зараз", "сьогодні", "завтра", "там", "now", "today", "tomorrow", "right",
    // address tokens
    "нері", "нери", "neri",
];

/// Ordered inflection heuristics: (case-ending suffix, nominative ending).
///
/// Best-effort only. Each rewrite is re-checked against the city table.
pub static CITY_SUFFIX_RULES: &[(&str, &str)] = &[
    ("иці", "иця"),
    ("ові", "ів"),
    ("ову", "ів"),
    ("єві", "їв"),
    ("полі", "піль"),
    ("ську", "ськ"),
    ("цьку", "цьк"),
    ("ороді", "ород"),
    ("ирі", "ир"),
    ("рі", "ро"),
    ("ах", "и"),
    ("ому", "е"),
    ("ні", "н"),
    ("і", "а"),
];

/// Filler trimmed from the end of a person-name candidate.
pub static PERSON_FILLER: &[&str] = &[
    "будь", "ласка", "пліз", "плз", "please", "pls", "ну", "ок", "ok", "плиз", "пожалуйста",
];

/// Prepositions skipped right after an intent's anchor.
pub static PERSON_LEADING_SKIP: &[&str] = &["для", "до", "про", "to", "about", "нашого", "нашу", "our"];

/// Fixed lexical anchors for "who is X" lookups.
pub static WHO_IS_ANCHORS: &[&str] = &["хто такий", "хто така", "хто такі", "хто це", "who is", "who's", "whos"];

/// Normalizes a surface form into a lookup key: lowercase, apostrophe variants
/// unified, punctuation other than hyphen and apostrophe dropped, whitespace
/// collapsed.
pub fn lookup_key(surface: &str) -> String {
    surface
        .to_lowercase()
        .chars()
        .map(|c| match c {
            '’' | 'ʼ' | '`' | '\'' => 'ʼ',
            c if c.is_alphanumeric() || c == '-' => c,
            _ => ' ',
        })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Read-only, indexed view over the alias tables.
pub struct Lexicon {
    cities: HashMap<String, &'static CityEntry>,
    persons: HashMap<String, &'static PersonProfile>,
    city_stop_words: HashSet<String>,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::new()
    }
}

impl Lexicon {
    pub fn new() -> Self {
        let mut cities = HashMap::new();
        for entry in CITIES {
            cities.insert(lookup_key(entry.canonical), entry);
            for alias in entry.aliases {
                cities.insert(lookup_key(alias), entry);
            }
        }

        let mut persons = HashMap::new();
        for profile in PERSONS {
            persons.insert(lookup_key(profile.display_name), profile);
            for alias in profile.aliases {
                persons.insert(lookup_key(alias), profile);
            }
        }

        Self {
            cities,
            persons,
            city_stop_words: CITY_STOP_WORDS.iter().map(|w| lookup_key(w)).collect(),
        }
    }

    pub fn city(&self, surface: &str) -> Option<&'static CityEntry> {
        self.cities.get(&lookup_key(surface)).copied()
    }

    pub fn person(&self, surface: &str) -> Option<&'static PersonProfile> {
        self.persons.get(&lookup_key(surface)).copied()
    }

    /// `word` must already be a [`lookup_key`].
    pub fn is_city_stop_word(&self, word: &str) -> bool {
        self.city_stop_words.contains(word)
    }

    pub fn persons(&self) -> &'static [PersonProfile] {
        PERSONS
    }
}
