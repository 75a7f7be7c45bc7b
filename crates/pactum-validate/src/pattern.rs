//! Compiled `pattern` constraints.

use std::sync::OnceLock;

use dashmap::DashMap;
use regex::Regex;

fn compiled() -> &'static DashMap<&'static str, Option<Regex>> {
    static PATTERNS: OnceLock<DashMap<&'static str, Option<Regex>>> = OnceLock::new();
    PATTERNS.get_or_init(DashMap::new)
}

/// Tests `value` against `pattern`, compiling it once per process.
///
/// Returns `None` when the pattern does not compile; such constraints are
/// ignored.
pub fn matches(pattern: &'static str, value: &str) -> Option<bool> {
    let entry = compiled().entry(pattern).or_insert_with(|| match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(err) => {
            tracing::warn!(pattern, error = %err, "ignoring invalid pattern constraint");
            None
        }
    });
    entry.value().as_ref().map(|re| re.is_match(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unanchored_match() {
        assert_eq!(matches("[0-9]+", "abc123"), Some(true));
        assert_eq!(matches("^[0-9]+$", "abc123"), Some(false));
    }

    #[test]
    fn test_invalid_pattern_is_ignored() {
        assert_eq!(matches("([a-z", "anything"), None);
        // Cached failure stays ignored.
        assert_eq!(matches("([a-z", "anything"), None);
    }
}
