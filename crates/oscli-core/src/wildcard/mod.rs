//! Single-character wildcard matching for bulk target selection.
//!
//! Only `*` is recognised and it stands for any number (0..N) of characters.
//! Patterns compile into a [`Pattern`] once and are then applied to every
//! candidate name, typically index or context names picked for a bulk and
//! potentially destructive operation.

pub const WILDCARD: char = '*';

pub const WILDCARD_HELP: &str = "\
oscli supports wildcard expressions using the '*' character.
'*' matches any number of characters (0 .. N). Supported expressions:
'a*'    - matches any string that starts with or equals to 'a'
'*b'    - matches any string that ends with or equals to 'b'
'a*b'   - matches any string that starts with 'a' and ends with 'b'
'*a*'   - matches any string that contains 'a'
'*'     - matches any string";

/// Check whether a string carries at least one wildcard.
pub fn contains_wildcard(value: &str) -> bool {
    value.contains(WILDCARD)
}

/// A compiled wildcard expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    /// No wildcard: plain equality.
    Exact(String),
    /// Only wildcards: matches everything.
    Any,
    /// `*text*`
    Contains(String),
    /// `*text`
    Suffix(String),
    /// `text*`
    Prefix(String),
    /// `head*tail`. Only the text up to the second `*` forms the tail, so
    /// `a*b*c` behaves as `a*b`.
    Surrounds { prefix: String, suffix: String },
}

impl Pattern {
    /// Compile an expression. Rules are evaluated in order, first match wins.
    pub fn compile(pattern: &str) -> Self {
        if !contains_wildcard(pattern) {
            return Pattern::Exact(pattern.to_string());
        }
        if pattern.chars().all(|c| c == WILDCARD) {
            return Pattern::Any;
        }

        let starts = pattern.starts_with(WILDCARD);
        let ends = pattern.ends_with(WILDCARD);
        let stripped = pattern.replace(WILDCARD, "");

        if starts && ends && pattern.len() > 1 && !stripped.is_empty() {
            return Pattern::Contains(stripped);
        }
        if starts {
            return Pattern::Suffix(pattern[1..].to_string());
        }
        if ends {
            return Pattern::Prefix(pattern[..pattern.len() - 1].to_string());
        }

        // Interior wildcard: the pattern holds a '*' that is neither leading
        // nor trailing, so there are at least two segments.
        let mut segments = pattern.split(WILDCARD);
        let prefix = segments.next().unwrap_or_default();
        let suffix = segments.next().unwrap_or_default();
        Pattern::Surrounds {
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
        }
    }

    /// Apply the pattern to a candidate.
    pub fn matches(&self, candidate: &str) -> bool {
        match self {
            Pattern::Exact(value) => candidate == value,
            Pattern::Any => true,
            Pattern::Contains(needle) => candidate.contains(needle.as_str()),
            Pattern::Suffix(suffix) => candidate.ends_with(suffix.as_str()),
            Pattern::Prefix(prefix) => candidate.starts_with(prefix.as_str()),
            Pattern::Surrounds { prefix, suffix } => {
                candidate.starts_with(prefix.as_str()) && candidate.ends_with(suffix.as_str())
            }
        }
    }

    /// Select the candidates matching the pattern, preserving their order.
    ///
    /// An empty result is a valid outcome, not an error.
    pub fn filter<'a, I, S>(&self, candidates: I) -> Vec<&'a str>
    where
        I: IntoIterator<Item = &'a S>,
        S: AsRef<str> + ?Sized + 'a,
    {
        candidates
            .into_iter()
            .map(|candidate| candidate.as_ref())
            .filter(|candidate| self.matches(candidate))
            .collect()
    }
}

/// Compile `pattern` into a standalone predicate.
pub fn compile(pattern: &str) -> impl Fn(&str) -> bool + use<> {
    let pattern = Pattern::compile(pattern);
    move |candidate: &str| pattern.matches(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_pattern_matches_only_empty() {
        let matcher = compile("");
        assert!(matcher(""));
        assert!(!matcher("x"));
        assert!(!matcher("something"));
    }

    #[test]
    fn test_no_wildcard_is_exact() {
        let matcher = compile("aaa");
        assert!(matcher("aaa"));
        assert!(!matcher("aaaa"));
        assert!(!matcher("some negative string"));
    }

    #[test]
    fn test_wildcard_only_matches_everything() {
        for pattern in ["*", "**", "***"] {
            let matcher = compile(pattern);
            assert!(matcher(""), "pattern {pattern} should match empty");
            assert!(matcher("anything"));
            assert!(matcher("is this tricky string? aaabbb"));
        }
        assert_eq!(Pattern::compile("**"), Pattern::Any);
    }

    #[test]
    fn test_leading_wildcard_is_suffix() {
        let matcher = compile("*aaa");
        assert!(matcher("aaa"));
        assert!(matcher("aaaa"));
        assert!(matcher("is this tricky string? aaa"));
        assert!(!matcher("some negative string"));
    }

    #[test]
    fn test_trailing_wildcard_is_prefix() {
        let matcher = compile("aaa*");
        assert!(matcher("aaa"));
        assert!(matcher("aaa, some positive long string"));
        assert!(!matcher("is this tricky string? aaa"));
    }

    #[test]
    fn test_interior_wildcard() {
        let matcher = compile("a*b");
        assert!(matcher("aXXXb"));
        assert!(matcher("ab"));
        assert!(!matcher("aXXX"));

        let matcher = compile("aaa*bbb");
        assert!(matcher("aaa this is the match bbb"));
        assert!(matcher("aaabbb"));
        assert!(!matcher("aaa"));
        assert!(!matcher("is this tricky string? aaabbb"));
    }

    #[test]
    fn test_both_sides_is_contains() {
        let matcher = compile("*a*");
        assert!(matcher("banana"));
        assert!(!matcher("xyz"));
        assert_eq!(Pattern::compile("*a*"), Pattern::Contains("a".to_string()));
    }

    #[test]
    fn test_contains_strips_every_wildcard() {
        // Inner wildcards are dropped, not interpreted.
        let matcher = compile("*a*b*");
        assert!(matcher("xxabyy"));
        assert!(!matcher("xxaXbyy"));
    }

    #[test]
    fn test_multiple_interior_wildcards_use_second_segment() {
        let matcher = compile("a*b*c");
        assert!(matcher("aXb"));
        assert!(matcher("ab"));
        assert!(!matcher("aXc"));
        assert!(!matcher("abc"));
        assert_eq!(
            Pattern::compile("a*b*c"),
            Pattern::Surrounds {
                prefix: "a".to_string(),
                suffix: "b".to_string()
            }
        );

        let matcher = compile("logs*2024*old");
        assert!(matcher("logs-2024"));
        assert!(!matcher("logs-2023-old"));
    }

    #[test]
    fn test_leading_wildcard_keeps_inner_wildcard_literal() {
        let matcher = compile("*a*b");
        assert!(matcher("xxa*b"));
        assert!(!matcher("xxaXb"));
    }

    #[test]
    fn test_filter_preserves_order_and_allows_empty() {
        let names = vec![
            "logs-2024".to_string(),
            "metrics".to_string(),
            "logs-2025".to_string(),
        ];
        let pattern = Pattern::compile("logs-*");
        assert_eq!(pattern.filter(&names), vec!["logs-2024", "logs-2025"]);

        let none = Pattern::compile("audit*");
        assert!(none.filter(&names).is_empty());
    }

    #[test]
    fn test_contains_wildcard() {
        assert!(contains_wildcard("a*"));
        assert!(!contains_wildcard("abc"));
    }
}
