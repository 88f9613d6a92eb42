//! Query cleanup for the store's text-search syntax.

/// Characters with meaning in `to_tsquery` or `LIKE` patterns.
const UNSAFE: &[char] = &[
    '&', '|', '!', '(', ')', '<', '>', ':', '*', '\'', '"', '\\', '%', ',',
];

/// Replace unsafe characters with spaces, collapse whitespace and trim.
pub fn sanitize(query: &str) -> String {
    let replaced: String = query
        .chars()
        .map(|c| {
            if UNSAFE.contains(&c) || c.is_control() {
                ' '
            } else {
                c
            }
        })
        .collect();
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Prefix-match expression in `to_tsquery` syntax: `john:* & smi:*`.
/// Returns an empty string when nothing searchable remains.
pub fn build_prefix_expression(query: &str) -> String {
    sanitize(query)
        .split_whitespace()
        .map(|token| format!("{token}:*"))
        .collect::<Vec<_>>()
        .join(" & ")
}

/// Unanchored case-insensitive substring pattern for `ILIKE`.
/// `_` is escaped so it matches literally.
pub fn like_pattern(sanitized: &str) -> String {
    format!("%{}%", sanitized.replace('_', "\\_"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_operators_and_quotes() {
        assert_eq!(sanitize("john & (smith)"), "john smith");
        assert_eq!(sanitize(r#""o'brien"\"#), "o brien");
        assert_eq!(sanitize("50%*"), "50");
    }

    #[test]
    fn keeps_email_and_phone_punctuation() {
        assert_eq!(sanitize(" jane@acme.com "), "jane@acme.com");
        assert_eq!(sanitize("+1-555-0101"), "+1-555-0101");
    }

    #[test]
    fn only_unsafe_characters_sanitize_to_empty() {
        assert_eq!(sanitize("&|!()*"), "");
        assert_eq!(build_prefix_expression("&|!"), "");
    }

    #[test]
    fn prefix_expression_joins_tokens_with_and() {
        assert_eq!(build_prefix_expression("john"), "john:*");
        assert_eq!(build_prefix_expression("  john   smi "), "john:* & smi:*");
        assert_eq!(build_prefix_expression("john | smith"), "john:* & smith:*");
    }

    #[test]
    fn like_pattern_wraps_and_escapes_underscore() {
        assert_eq!(like_pattern("jo"), "%jo%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
    }
}
