//! Canonical task names
//!
//! Task names are kebab-case. Namespaced names keep their `:` separator,
//! so `ts:commonJs` and `ts:common-js` resolve to the same task.

use regex::Regex;
use std::sync::LazyLock;

static CASE_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z])([A-Z])").expect("case boundary pattern is valid"));

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Normalize an identifier into its canonical kebab-case form
///
/// A hyphen is inserted at every lowercase to uppercase transition, each
/// run of whitespace becomes a single hyphen, and the result is lowercased.
/// Normalizing a canonical name returns it unchanged.
pub fn normalize(name: &str) -> String {
    let split = CASE_BOUNDARY.replace_all(name, "$1-$2");
    WHITESPACE.replace_all(&split, "-").to_lowercase()
}

/// Canonical name of a member inside a task group
pub fn qualified_name(group: &str, member: &str) -> String {
    normalize(&format!("{}:{}", group, member))
}

/// Whether a name is already in canonical form
pub fn is_canonical(name: &str) -> bool {
    normalize(name) == name
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_camel_case() {
        assert_eq!(normalize("fooBarBaz"), "foo-bar-baz");
        assert_eq!(normalize("buildCodepenExamples"), "build-codepen-examples");
    }

    #[test]
    fn test_already_kebab() {
        assert_eq!(normalize("already-kebab"), "already-kebab");
    }

    #[test]
    fn test_whitespace() {
        assert_eq!(normalize("foo Bar"), "foo-bar");
        assert_eq!(normalize("foo \t  bar"), "foo-bar");
    }

    #[test]
    fn test_colon_survives() {
        assert_eq!(normalize("ts:commonjsOnly"), "ts:commonjs-only");
        assert_eq!(qualified_name("ts", "commonjsOnly"), "ts:commonjs-only");
        assert_eq!(qualified_name("verifyApi", "extractor"), "verify-api:extractor");
    }

    #[test]
    fn test_uppercase_runs() {
        // Only lowercase-to-uppercase transitions split words
        assert_eq!(normalize("runJSONLint"), "run-jsonlint");
        assert_eq!(normalize("ABC"), "abc");
    }

    #[test]
    fn test_is_canonical() {
        assert!(is_canonical("ts:esm"));
        assert!(!is_canonical("tsEsm"));
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(s in "\\PC{0,32}") {
            let once = normalize(&s);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn prop_identifier_normalization_is_idempotent(s in "[a-zA-Z: ]{0,24}") {
            let once = normalize(&s);
            prop_assert_eq!(normalize(&once), once.clone());
            prop_assert!(!once.chars().any(|c| c.is_ascii_uppercase() || c.is_whitespace()));
        }
    }
}
