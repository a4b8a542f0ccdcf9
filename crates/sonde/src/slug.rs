use std::fmt;

use unicode_normalization::UnicodeNormalization;

/// Returns true when `value` is a non-empty run of ASCII letters, digits,
/// underscores and hyphens.
pub fn is_slug(value: &str) -> bool {
    !value.is_empty()
        && value
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

/// Lowercases `value`, drops everything that is not a word character,
/// whitespace or hyphen, folds whitespace/hyphen runs into a single hyphen
/// and trims leading and trailing hyphens and underscores.
pub fn slugify(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut pending_sep = false;
    for ch in value.chars().flat_map(char::to_lowercase) {
        if ch.is_alphanumeric() || ch == '_' {
            if pending_sep {
                out.push('-');
                pending_sep = false;
            }
            out.push(ch);
        } else if ch.is_whitespace() || ch == '-' {
            pending_sep = true;
        }
    }
    if pending_sep {
        out.push('-');
    }
    out.trim_matches(&['-', '_'][..]).to_string()
}

/// [`slugify`] after NFKD decomposition with every non-ASCII code point
/// dropped, so `café` becomes `cafe`.
pub fn slugify_ascii(value: &str) -> String {
    let folded: String = value.nfkd().filter(char::is_ascii).collect();
    slugify(&folded)
}

/// Registry key: `slugify("{app_name} {slug}")`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegistryKey(String);

impl RegistryKey {
    pub fn derive(app_name: Option<&str>, slug: &str) -> Self {
        Self(slugify(&format!("{} {slug}", app_name.unwrap_or_default())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RegistryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_grammar() {
        assert!(is_slug("database-postgresql"));
        assert!(is_slug("celery_results"));
        assert!(is_slug("A1"));
        assert!(!is_slug(""));
        assert!(!is_slug("has space"));
        assert!(!is_slug("dot.ted"));
        assert!(!is_slug("caf\u{e9}"));
        assert!(!is_slug("../etc"));
    }

    #[test]
    fn slugify_folds_separators_and_case() {
        assert_eq!(slugify("My App  settings"), "my-app-settings");
        assert_eq!(slugify("--lead and trail__"), "lead-and-trail");
        assert_eq!(slugify("a - b"), "a-b");
        assert_eq!(slugify("what?!now"), "whatnow");
        assert_eq!(slugify("snake_case stays"), "snake_case-stays");
    }

    #[test]
    fn ascii_slugify_folds_accents_and_drops_the_rest() {
        assert_eq!(slugify_ascii("caf\u{e9}"), "cafe");
        assert_eq!(slugify_ascii("Cr\u{e8}me Br\u{fb}l\u{e9}e"), "creme-brulee");
        assert_eq!(slugify_ascii("\u{65e5}\u{672c} ops"), "ops");
        assert_eq!(slugify("caf\u{e9}"), "caf\u{e9}");
    }

    #[test]
    fn key_is_deterministic() {
        let first = RegistryKey::derive(Some("sonde_web"), "Settings");
        let second = RegistryKey::derive(Some("sonde_web"), "Settings");
        assert_eq!(first, second);
        assert_eq!(first.as_str(), "sonde_web-settings");
    }

    #[test]
    fn key_without_app_name_is_just_the_slug() {
        assert_eq!(RegistryKey::derive(None, "debug").as_str(), "debug");
    }

    #[test]
    fn distinct_pairs_can_collide() {
        let a = RegistryKey::derive(Some("foo"), "bar-baz");
        let b = RegistryKey::derive(Some("foo-bar"), "baz");
        assert_eq!(a, b);
    }
}
