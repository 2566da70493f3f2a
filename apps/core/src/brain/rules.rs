//! Routing table and response pools.
//!
//! This is data: trigger patterns, reply templates and the few generators that
//! compute a reply at selection time. Order in [`default_rulebook`] is priority.

use rand::{Rng, RngCore};

use super::composer::{ResponseEntry, Slots, TailKind};
use super::intent::{Intent, IntentRule, PersonPools, ReplyClass, Responses, RuleBook, Trigger};

use ResponseEntry::{Computed, Literal};

/// Serious or unsafe topics. Any hit routes straight to the refusal.
static SENSITIVE_TOKENS: &[&str] = &[
    "суїцид", "самогубств", "вбити себе", "покінчити з собою", "порізати себе", "наркот",
    "закладк", "зброя", "зброю", "вибухівк", "suicide", "kill myself", "self-harm", "drugs",
    "weapon", "explosive",
];

/// Tokens of higher-priority topics; small-talk rules stay silent when one is present.
static RESERVED_TOKENS: &[&str] = &[
    "погод", "weather", "температур", "прогноз", "хто такий", "хто така", "хто це", "who is",
    "розкажи про", "tell me about", "покарай", "насвари", "punish", "передай привіт", "say hi to",
];

// --- Fixed replies ---

/// Reply when the weather provider has no credentials configured.
pub const WEATHER_MISSING_CREDENTIALS: &str =
    "Я поки не можу дивитися погоду: мені не дали ключ від погодного сервісу 🙀";

static REFUSAL: &[ResponseEntry] = &[Literal(
    "Про таке я не жартую. Якщо тобі зараз важко, поговори з близькими або подзвони на лінію підтримки 7333 💛",
)];

pub static CAPABILITIES: &[ResponseEntry] = &[Literal(
    "Я Нері 😺 Вмію: показати погоду («Нері, погода в Києві»), розповісти, хто є хто в чаті («Нері, хто такий Дейз?»), кинути кубик, зіграти в камінь-ножиці-папір, покарати когось або передати привіт.",
)];

pub static HELP: &[ResponseEntry] = &[Literal(
    "Звертайся до мене на імʼя: «Нері, ...». Приклади: «Нері, як справи?», «Нері, погода у Львові», «Нері, кинути», «Нері, камінь», «Нері, розкажи про Олю».",
)];

/// "Didn't understand" pool used when nothing matched.
pub static FALLBACK: &[ResponseEntry] = &[
    Literal("Я Нері 😺 Спробуй: «Нері, як справи?», «Нері, хто я?», «Нері, зіграємо?»"),
    Literal("Мур? Не зовсім зрозумів 🙀 Спробуй «Нері, погода в Києві» або «Нері, кинути»."),
    Literal("Це було щось дуже розумне, але я кіт 😹 Напиши /help, і я покажу, що вмію."),
];

// --- Weather ---

pub static WEATHER_REPORT: &[ResponseEntry] = &[
    Literal("{place}: зараз {temp}°C, відчувається як {feels}°C. {description} {symbol}"),
    Literal("Погода в місті {place}: {temp}°C, відчувається як {feels}°C. {description} {symbol}"),
];

pub static WEATHER_LOOKUP_FAILED: &[ResponseEntry] = &[
    Literal("Не вдалося дізнатися погоду для {place} 🙀 Спробуй трохи пізніше."),
    Literal("Погодний сервіс мовчить про {place} 😿 Спитай мене ще раз за хвилинку."),
];

pub static WEATHER_NOT_FOUND: &[ResponseEntry] = &[Literal(
    "Хм, не знайшов місто «{place}» 🤔 Перевір назву, наприклад: «Нері, погода в Києві».",
)];

pub static WEATHER_NO_CITY: &[ResponseEntry] = &[Literal(
    "Для якого міста? 🌍 Напиши, наприклад: «Нері, погода в Києві».",
)];

pub static WEATHER_NO_CREDENTIALS: &[ResponseEntry] = &[Literal(WEATHER_MISSING_CREDENTIALS)];

// --- People ---

static PERSON_KNOWN: &[ResponseEntry] = &[
    Literal("{name} - {role}."),
    Literal("{name}? Це ж {role} 😺"),
    Literal("Знаю-знаю: {name} - {role}."),
];

static PERSON_ABOUT: &[ResponseEntry] = &[
    Literal("{name} - {role}. Більше секретів не видаю 😼"),
    Literal("Про {name} коротко: {role}."),
];

static PERSON_MYSELF: &[ResponseEntry] = &[Literal("Я {name} - {role} 😺")];

static PERSON_UNKNOWN: &[ResponseEntry] = &[
    Literal("Хм, {name} мені поки не знайомий 🤔 Розкажеш, хто це?"),
    Literal("Не знаю, хто такий {name}. Познайомиш? 😺"),
];

static PERSON_MISSING: &[ResponseEntry] = &[Literal(
    "Про кого саме? Напиши, наприклад: «Нері, хто такий Дейз?»",
)];

static PUNISH: &[ResponseEntry] = &[
    Literal("{name}, тебе покарано: тиждень без мемів 😼"),
    Literal("{name} отримує штраф: десять віртуальних віджимань 💪"),
    Literal("Так, {name}, у куток! 😾"),
];

static PUNISH_MYSELF: &[ResponseEntry] = &[Literal("Себе карати не буду, я ж хороший кіт 😹")];

static PUNISH_MISSING: &[ResponseEntry] = &[Literal("Кого карати? 😼 Напиши: «Нері, покарай Дейза»")];

static GREET_SOMEONE: &[ResponseEntry] = &[
    Literal("{name}, тобі привіт від {sender}! 👋"),
    Literal("Гей, {name}! {sender} передає привіт 😺"),
];

static GREET_MYSELF: &[ResponseEntry] = &[Literal("Дякую, {sender}, мені теж привіт 😸")];

static GREET_MISSING: &[ResponseEntry] = &[Literal(
    "Кому передати привіт? Напиши: «Нері, передай привіт Олі»",
)];

// --- Games ---

const MOVES: [&str; 3] = ["камінь", "ножиці", "папір"];

fn roll_dice(rng: &mut dyn RngCore, _slots: &Slots) -> String {
    format!("Випало: {} 🎲", rng.gen_range(1..=6))
}

fn beats(a: &str, b: &str) -> bool {
    matches!(
        (a, b),
        ("камінь", "ножиці") | ("ножиці", "папір") | ("папір", "камінь")
    )
}

fn play_rock_paper_scissors(rng: &mut dyn RngCore, slots: &Slots) -> String {
    let user = slots
        .get("utterance")
        .and_then(|u| u.split_whitespace().last())
        .map(|w| w.trim_matches(|c: char| !c.is_alphabetic()))
        .unwrap_or_default();
    let bot = MOVES[rng.gen_range(0..MOVES.len())];

    if user == bot {
        format!("Я: {}. Нічия 😼", bot)
    } else if beats(user, bot) {
        format!("Я: {}. Ти виграв 💥", bot)
    } else {
        format!("Я: {}. Я виграв 😈", bot)
    }
}

static DICE: &[ResponseEntry] = &[Computed(roll_dice)];

static ROCK_PAPER_SCISSORS: &[ResponseEntry] = &[Computed(play_rock_paper_scissors)];

static GAME_MENU: &[ResponseEntry] = &[
    Literal("Окей! Вибирай: 1) кубик 🎲 (напиши «Нері, кинути») 2) камінь-ножиці-папір ✂️📄🪨 (напиши «Нері, камінь»)"),
    Literal("Граємо! «Нері, кинути» - кубик, «Нері, ножиці» - камінь-ножиці-папір 🎮"),
];

// --- Small talk ---

static HOW_ARE_YOU: &[ResponseEntry] = &[
    Literal("Я на звʼязку 😼 Як ти, {sender}?"),
    Literal("Все мурчить, дякую! А ти як, {sender}?"),
    Literal("Виспався, поїв, готовий до пригод 😸"),
];

static WHO_AM_I: &[ResponseEntry] = &[
    Literal("Ти {sender}. І ти зараз тестиш мене як бог 😎"),
    Literal("Ти {sender}, звісно. Я тебе впізнаю з першого повідомлення 😺"),
];

static GREETING: &[ResponseEntry] = &[
    Literal("Хей! Я Нері 😺 Скажи: «Нері, як справи?» або «Нері, зіграємо?»"),
    Literal("Привіт, {sender}! 😸"),
    Literal("Мур-привіт, {sender}!"),
];

static THANKS: &[ResponseEntry] = &[
    Literal("Завжди радий допомогти 😺"),
    Literal("Нема за що, {sender}!"),
];

static COMPLIMENT: &[ResponseEntry] = &[
    Literal("Ой, я аж зашарівся 😸"),
    Literal("Мур, дякую! Ти теж нічого 😎"),
];

static FAREWELL: &[ResponseEntry] = &[
    Literal("Бувай, {sender}! 🐾"),
    Literal("На звʼязку! Заходь ще 😺"),
];

fn refusal_rule() -> IntentRule {
    IntentRule {
        intent: Intent::SensitiveTopic,
        class: ReplyClass::Factual,
        // reached through the sensitive-token check, never through triggers
        triggers: Vec::new(),
        gated: false,
        tails: &[],
        responses: Responses::Pool(REFUSAL),
    }
}

fn small_talk(intent: Intent, triggers: Vec<Trigger>, tails: &'static [TailKind], pool: &'static [ResponseEntry]) -> IntentRule {
    IntentRule {
        intent,
        class: ReplyClass::SmallTalk,
        triggers,
        gated: true,
        tails,
        responses: Responses::Pool(pool),
    }
}

fn playful(intent: Intent, pattern: &str, pool: &'static [ResponseEntry]) -> IntentRule {
    IntentRule {
        intent,
        class: ReplyClass::Playful,
        triggers: vec![Trigger::pattern(pattern)],
        gated: false,
        tails: &[],
        responses: Responses::Pool(pool),
    }
}

fn about_person(intent: Intent, class: ReplyClass, pattern: &str, pools: PersonPools) -> IntentRule {
    IntentRule {
        intent,
        class,
        triggers: vec![Trigger::pattern(pattern)],
        gated: false,
        tails: &[],
        responses: Responses::Person(pools),
    }
}

/// The routing table, in priority order.
pub fn default_rulebook() -> RuleBook {
    let rules = vec![
        IntentRule {
            intent: Intent::Weather,
            class: ReplyClass::Factual,
            triggers: vec![Trigger::pattern(r"погод|weather|температур|прогноз")],
            gated: false,
            tails: &[],
            responses: Responses::Weather,
        },
        about_person(
            Intent::WhoIs,
            ReplyClass::Factual,
            r"хто так(?:ий|а|і)|хто це|who is|who['’ʼ]s|\bwhos\b",
            PersonPools {
                anchors: &[],
                known: PERSON_KNOWN,
                unknown: PERSON_UNKNOWN,
                missing: PERSON_MISSING,
                myself: Some(PERSON_MYSELF),
            },
        ),
        about_person(
            Intent::AboutPerson,
            ReplyClass::Factual,
            r"розкажи про|що (?:ти )?думаєш про|tell me about",
            PersonPools {
                anchors: &["про", "about"],
                known: PERSON_ABOUT,
                unknown: PERSON_UNKNOWN,
                missing: PERSON_MISSING,
                myself: Some(PERSON_MYSELF),
            },
        ),
        about_person(
            Intent::Punish,
            ReplyClass::Playful,
            r"покарай|насвари|punish",
            PersonPools {
                anchors: &["покарай", "насвари", "punish"],
                known: PUNISH,
                unknown: PUNISH,
                missing: PUNISH_MISSING,
                myself: Some(PUNISH_MYSELF),
            },
        ),
        about_person(
            Intent::GreetSomeone,
            ReplyClass::Playful,
            r"передай привіт|say hi to",
            PersonPools {
                anchors: &["передай привіт", "say hi to"],
                known: GREET_SOMEONE,
                unknown: GREET_SOMEONE,
                missing: GREET_MISSING,
                myself: Some(GREET_MYSELF),
            },
        ),
        playful(Intent::DiceRoll, r"кинути|кинь|\broll\b|🎲", DICE),
        playful(
            Intent::RockPaperScissors,
            r"(?:^|\s)(?:камінь|ножиці|папір)[\s!.?]*$",
            ROCK_PAPER_SCISSORS,
        ),
        playful(
            Intent::GameMenu,
            r"зіграємо|\bгра\b|\bграти\b|кубик|камінь|ножиці|папір|\bgame\b",
            GAME_MENU,
        ),
        small_talk(
            Intent::HowAreYou,
            vec![
                Trigger::AllOf(&["як", "справи"]),
                Trigger::pattern(r"\bяк ти\b|how are you"),
            ],
            &[TailKind::Support, TailKind::Vibe, TailKind::Question],
            HOW_ARE_YOU,
        ),
        small_talk(
            Intent::WhoAmI,
            vec![Trigger::pattern(r"хто я\b|who am i")],
            &[TailKind::Vibe],
            WHO_AM_I,
        ),
        small_talk(
            Intent::Greeting,
            vec![Trigger::pattern(
                r"^(?:привіт|хай|хелло|hello|hi|йо|вітаю|добрий день|добрий вечір|доброго ранку)\b",
            )],
            &[TailKind::Vibe, TailKind::Question],
            GREETING,
        ),
        small_talk(
            Intent::Thanks,
            vec![Trigger::pattern(r"дякую|спасибі|дяки|thanks|thank you")],
            &[TailKind::Vibe],
            THANKS,
        ),
        small_talk(
            Intent::Compliment,
            vec![Trigger::pattern(r"молодець|класний|крутий|розумний|люблю тебе|good bot")],
            &[TailKind::Vibe, TailKind::Support],
            COMPLIMENT,
        ),
        small_talk(
            Intent::Farewell,
            vec![Trigger::pattern(r"бувай|до побачення|на добраніч|добраніч|па-па|\bbye\b|goodbye")],
            &[TailKind::Support],
            FAREWELL,
        ),
    ];

    RuleBook {
        sensitive_tokens: SENSITIVE_TOKENS,
        refusal: refusal_rule(),
        reserved_tokens: RESERVED_TOKENS,
        rules,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn pools_of(rule: &IntentRule) -> Vec<&'static [ResponseEntry]> {
        match &rule.responses {
            Responses::Pool(pool) => vec![*pool],
            Responses::Person(p) => {
                let mut pools = vec![p.known, p.unknown, p.missing];
                pools.extend(p.myself);
                pools
            }
            Responses::Weather => vec![
                WEATHER_REPORT,
                WEATHER_LOOKUP_FAILED,
                WEATHER_NOT_FOUND,
                WEATHER_NO_CITY,
                WEATHER_NO_CREDENTIALS,
            ],
        }
    }

    #[test]
    fn test_every_pool_is_non_empty() {
        let book = default_rulebook();
        for rule in book.rules.iter().chain(std::iter::once(&book.refusal)) {
            for pool in pools_of(rule) {
                assert!(!pool.is_empty(), "empty pool for {}", rule.intent);
            }
        }
        for pool in [CAPABILITIES, HELP, FALLBACK] {
            assert!(!pool.is_empty());
        }
    }

    #[test]
    fn test_small_talk_rules_are_gated() {
        for rule in default_rulebook().rules {
            assert_eq!(rule.class == ReplyClass::SmallTalk, rule.gated, "{}", rule.intent);
        }
    }

    #[test]
    fn test_dice_is_in_range() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            let text = roll_dice(&mut rng, &Slots::new());
            let value: u8 = text
                .trim_start_matches("Випало: ")
                .trim_end_matches(" 🎲")
                .parse()
                .unwrap();
            assert!((1..=6).contains(&value));
        }
    }

    #[test]
    fn test_rock_paper_scissors_outcomes() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..30 {
            let slots = Slots::new().with("utterance", "камінь!");
            let text = play_rock_paper_scissors(&mut rng, &slots);
            if text.contains("ножиці") {
                assert!(text.ends_with("Ти виграв 💥"));
            } else if text.contains("папір") {
                assert!(text.ends_with("Я виграв 😈"));
            } else {
                assert!(text.ends_with("Нічия 😼"));
            }
        }
    }
}
