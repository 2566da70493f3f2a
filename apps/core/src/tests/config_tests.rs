//! Configuration Tests
//!
//! `Settings::from_vars` under controlled environments.

use crate::config::Settings;
use crate::error::AppError;

/// Every variable `Settings` reads; each test starts from all of them unset.
const VARS: &[&str] = &[
    "NERI_ADDRESS_TOKENS",
    "OPENWEATHER_API_KEY",
    "WEATHER_API_BASE",
    "WEATHER_COUNTRY",
    "WEATHER_LANG",
    "HTTP_TIMEOUT_SECS",
    "REPLY_SOFT_CAP",
    "BOT_TOKEN",
    "TELEGRAM_API_BASE",
    "NERI_EMPHASIS_P",
    "NERI_DECORATION_P",
    "NERI_HEADER_P",
];

fn with_env<R>(set: &[(&str, &str)], f: impl FnOnce() -> R) -> R {
    let vars: Vec<(&str, Option<&str>)> = VARS
        .iter()
        .map(|key| {
            let value = set.iter().find(|(k, _)| k == key).map(|(_, v)| *v);
            (*key, value)
        })
        .collect();
    temp_env::with_vars(vars, f)
}

#[test]
fn test_defaults_when_nothing_is_set() {
    let settings = with_env(&[], Settings::from_vars).unwrap();
    assert_eq!(settings.address_tokens, vec!["нері", "нери", "neri"]);
    assert!(settings.weather.api_key.is_none());
    assert!(settings.telegram.bot_token.is_none());
    assert_eq!(settings.weather.api_base, "https://api.openweathermap.org");
    assert_eq!(settings.weather.country, "UA");
    assert_eq!(settings.weather.lang, "uk");
    assert_eq!(settings.http_timeout_secs, 10);
    assert_eq!(settings.style.soft_cap, 260);
}

#[test]
fn test_overrides_are_applied() {
    let settings = with_env(
        &[
            ("NERI_ADDRESS_TOKENS", "Нері, Котик ,,"),
            ("OPENWEATHER_API_KEY", "  secret  "),
            ("WEATHER_API_BASE", "http://localhost:9000"),
            ("WEATHER_COUNTRY", "pl"),
            ("WEATHER_LANG", "EN"),
            ("HTTP_TIMEOUT_SECS", "3"),
            ("REPLY_SOFT_CAP", "200"),
            ("BOT_TOKEN", "123:abc"),
            ("NERI_EMPHASIS_P", "0"),
            ("NERI_DECORATION_P", "0.5"),
            ("NERI_HEADER_P", "1"),
        ],
        Settings::from_vars,
    )
    .unwrap();

    assert_eq!(settings.address_tokens, vec!["нері", "котик"]);
    assert_eq!(settings.weather.api_key.as_deref(), Some("secret"));
    assert_eq!(settings.weather.api_base, "http://localhost:9000");
    assert_eq!(settings.weather.country, "PL");
    assert_eq!(settings.weather.lang, "en");
    assert_eq!(settings.http_timeout_secs, 3);
    assert_eq!(settings.style.soft_cap, 200);
    assert_eq!(settings.telegram.bot_token.as_deref(), Some("123:abc"));
    assert_eq!(settings.style.emphasis_probability, 0.0);
    assert_eq!(settings.style.decoration_probability, 0.5);
    assert_eq!(settings.style.header_probability, 1.0);
}

#[test]
fn test_blank_values_count_as_unset() {
    let settings = with_env(&[("OPENWEATHER_API_KEY", "   "), ("HTTP_TIMEOUT_SECS", "")], Settings::from_vars).unwrap();
    assert!(settings.weather.api_key.is_none());
    assert_eq!(settings.http_timeout_secs, 10);
}

#[test]
fn test_invalid_values_are_config_errors() {
    let cases: &[(&str, &str)] = &[
        ("HTTP_TIMEOUT_SECS", "soon"),
        ("HTTP_TIMEOUT_SECS", "0"),
        ("REPLY_SOFT_CAP", "-5"),
        ("NERI_EMPHASIS_P", "1.5"),
        ("WEATHER_API_BASE", "not a url"),
        ("WEATHER_COUNTRY", "UKR"),
        ("NERI_ADDRESS_TOKENS", " , "),
    ];
    for (key, value) in cases {
        let result = with_env(&[(*key, *value)], Settings::from_vars);
        assert!(
            matches!(result, Err(AppError::Config(_))),
            "{}={:?} should be rejected, got {:?}",
            key,
            value,
            result.map(|s| s.address_tokens)
        );
    }
}
