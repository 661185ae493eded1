//! String helpers shared by parsing and rendering.

use once_cell::sync::Lazy;
use regex::Regex;

/// Truncate a string to at most `max_chars` characters on a char boundary.
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

/// Truncate a string to at most `max_chars` characters, appending "..." if truncated.
pub fn truncate_with_ellipsis(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", s[..idx].trim_end()),
        None => s.to_string(),
    }
}

/// Lower-case and collapse every whitespace run to a single space.
pub fn normalize_whitespace_lower(s: &str) -> String {
    s.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

static SECRET_PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"(?i)([?&]key=)[^&\s]+", "${1}***REDACTED***"),
        (r"(?i)(api[_-]?key|apikey)[=:]\s*\S{8,}", "$1=***REDACTED***"),
        (r"(?i)(bearer)\s+\S{10,}", "$1 ***REDACTED***"),
        (r"sk-[a-zA-Z0-9_-]{20,}", "***REDACTED_API_KEY***"),
        (r"AIza[0-9A-Za-z_-]{30,}", "***REDACTED_API_KEY***"),
    ]
    .into_iter()
    .filter_map(|(pattern, replacement)| Regex::new(pattern).ok().map(|re| (re, replacement)))
    .collect()
});

/// Redact credential-looking fragments before a message reaches logs or reports.
pub fn sanitize_for_log(s: &str) -> String {
    let mut result = s.to_string();
    for (re, replacement) in SECRET_PATTERNS.iter() {
        result = re.replace_all(&result, *replacement).to_string();
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello world", 5), "hello");
        assert_eq!(truncate_chars("ééééé", 2), "éé");
    }

    #[test]
    fn test_truncate_with_ellipsis() {
        assert_eq!(truncate_with_ellipsis("hello world", 6), "hello...");
        assert_eq!(truncate_with_ellipsis("", 3), "");
    }

    #[test]
    fn test_normalize_whitespace_lower() {
        assert_eq!(normalize_whitespace_lower("  Strong\tQuarter \n BEAT "), "strong quarter beat");
    }

    #[test]
    fn test_sanitize_query_key() {
        let out = sanitize_for_log(
            "error sending request for url (https://host/v1beta/models/x:generateContent?key=AIzaSyD-secret)",
        );
        assert!(!out.contains("AIzaSyD-secret"));
        assert!(out.contains("REDACTED"));
    }

    #[test]
    fn test_sanitize_openai_key() {
        let out = sanitize_for_log("Incorrect API key provided: sk-proj-abcdefghijklmnopqrstuvwxyz");
        assert!(!out.contains("abcdefghijklmnopqrstuvwxyz"));
    }

    proptest! {
        #[test]
        fn prop_truncate_never_exceeds(s in ".{0,300}", n in 0usize..250) {
            prop_assert!(truncate_chars(&s, n).chars().count() <= n);
        }

        #[test]
        fn prop_normalize_is_idempotent(s in "[a-zA-Z0-9 \t\n]{0,120}") {
            let once = normalize_whitespace_lower(&s);
            prop_assert_eq!(normalize_whitespace_lower(&once), once);
        }
    }
}
