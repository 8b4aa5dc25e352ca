use crate::expression::RegexPattern;

/// Translate a SQL `LIKE` pattern into an anchored, case-insensitive regex.
///
/// Metacharacters are escaped first, then `%` expands to `.*` and `?` to `.`.
/// With `negate`, the body is wrapped in a negative lookahead.
pub fn to_regex(pattern: &str, negate: bool) -> RegexPattern {
    let escaped = regex::escape(pattern);
    let mut body = escaped.replace('%', ".*").replace("\\?", ".");

    if negate {
        body = format!("(?!{body})");
    }

    RegexPattern::new(format!("^{body}$"), "i")
}
