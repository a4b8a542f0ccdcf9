//! Redaction of credentials before display.
//!
//! [`mask_sensitive`] walks a JSON value. Strings that look like URLs get
//! their `user:password@` segment and sensitive query parameters redacted.
//! Other strings are replaced wholesale when the key they sit under names a
//! secret. Objects and arrays are walked recursively.
//!
//! Any string containing both `?` and `=` takes the URL path, even when it is
//! not a URL. Callers rely on that, so it stays.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map as JsonMap, Value as JsonValue};

pub const REDACTED: &str = "******";

/// Query parameter names whose values are redacted (compared upper-cased).
pub const QUERY_SECRET_KEYS: &[&str] = &["SENTRY_KEY", "TOKEN", "API_KEY", "PASSWORD", "SECRET"];

/// Substrings that mark a key as holding a secret (compared upper-cased).
pub const SENSITIVE_KEYS: &[&str] = &["SECRET", "PASSWORD", "TOKEN", "HMAC", "KEY"];

/// Keys that contain a sensitive substring but hold no secret.
pub const WHITELISTED_KEYS: &[&str] = &[
    "PASSWORD_HASHERS",
    "CHANGE_PASSWORD",
    "RESET_PASSWORD",
    "RESET_PASSWORD_FROM_KEY",
];

static URL_PASSWORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([a-zA-Z][a-zA-Z0-9+.-]*://[^/:]+:)([^@]+)(@)")
        .expect("URL password pattern must compile")
});

/// Replaces the password of every `scheme://user:password@` occurrence.
pub fn mask_url_password(url: &str) -> String {
    URL_PASSWORD_RE
        .replace_all(url, format!("${{1}}{REDACTED}${{3}}"))
        .into_owned()
}

/// Redacts the values of sensitive query parameters after the first `?`.
pub fn mask_query_params(url: &str) -> String {
    let Some((base, query)) = url.split_once('?') else {
        return url.to_string();
    };
    let pairs: Vec<String> = query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((name, _)) if is_query_secret(name) => format!("{name}={REDACTED}"),
            Some((name, value)) => format!("{name}={value}"),
            None if is_query_secret(pair) => format!("{pair}{REDACTED}"),
            None => pair.to_string(),
        })
        .collect();
    format!("{base}?{}", pairs.join("&"))
}

pub fn mask_url(value: &str) -> String {
    mask_query_params(&mask_url_password(value))
}

/// Redacts `value` when `key` names a secret and is not whitelisted.
pub fn mask_value(key: &str, value: &str) -> String {
    if key_is_sensitive(key) {
        REDACTED.to_string()
    } else {
        value.to_string()
    }
}

pub fn key_is_sensitive(key: &str) -> bool {
    let key = key.to_uppercase();
    if WHITELISTED_KEYS.contains(&key.as_str()) {
        return false;
    }
    SENSITIVE_KEYS.iter().any(|pattern| key.contains(pattern))
}

/// Masks `value`, found under `key`. Never fails; unknown shapes pass through.
pub fn mask_sensitive(key: &str, value: &JsonValue) -> JsonValue {
    match value {
        JsonValue::String(text) => JsonValue::String(mask_text(key, text)),
        JsonValue::Object(map) => JsonValue::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), mask_sensitive(k, v)))
                .collect(),
        ),
        JsonValue::Array(items) => {
            JsonValue::Array(items.iter().map(|v| mask_sensitive(key, v)).collect())
        }
        other => other.clone(),
    }
}

/// Masks a flat key/value source such as the process environment.
pub fn mask_map<I, K, V>(entries: I) -> JsonMap<String, JsonValue>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<JsonValue>,
{
    entries
        .into_iter()
        .map(|(key, value)| {
            let key = key.into();
            let masked = mask_sensitive(&key, &value.into());
            (key, masked)
        })
        .collect()
}

fn mask_text(key: &str, text: &str) -> String {
    if URL_PASSWORD_RE.is_match(text) || (text.contains('?') && text.contains('=')) {
        mask_url(text)
    } else {
        mask_value(key, text)
    }
}

fn is_query_secret(name: &str) -> bool {
    let name = name.to_uppercase();
    QUERY_SECRET_KEYS.contains(&name.as_str())
}
