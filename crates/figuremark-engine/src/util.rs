//! Small text helpers shared by the span, inception and assembly stages.

/// Whether the byte at `index` is escaped by an odd run of backslashes.
pub(crate) fn is_escaped(text: &str, index: usize) -> bool {
    text.as_bytes()[..index]
        .iter()
        .rev()
        .take_while(|&&b| b == b'\\')
        .count()
        % 2
        == 1
}

/// Display-encode `&`, `<` and `>` so literal markup shows as text.
pub(crate) fn encode_text(text: &str) -> String {
    escape(text, false)
}

/// Escape a value for a double-quoted tag attribute.
pub(crate) fn escape_attribute(value: &str) -> String {
    escape(value, true)
}

fn escape(text: &str, quotes: bool) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' if quotes => result.push_str("&quot;"),
            _ => result.push(c),
        }
    }
    result
}

/// Remove backslashes protecting `[ ] { } \` from mark parsing.
///
/// Escapes pair up left to right, so `\\[` becomes `\[`.
pub(crate) fn unescape_marks(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\\'
            && let Some(&next) = chars.peek()
            && matches!(next, '[' | ']' | '{' | '}' | '\\')
        {
            result.push(next);
            chars.next();
            continue;
        }
        result.push(c);
    }

    result
}

/// Convert a title to a URL-safe slug.
///
/// Lowercases ASCII alphanumerics, collapses whitespace, dashes and underscores
/// into single dashes, and drops everything else.
pub(crate) fn slugify(text: &str) -> String {
    let mut result = String::new();
    let mut last_was_dash = true;

    for c in text.trim().chars() {
        if c.is_ascii_alphanumeric() {
            result.push(c.to_ascii_lowercase());
            last_was_dash = false;
        } else if !last_was_dash && (c.is_whitespace() || c == '-' || c == '_') {
            result.push('-');
            last_was_dash = true;
        }
    }

    if result.ends_with('-') {
        result.pop();
    }

    result
}

/// Character count as a signed value, for length deltas.
pub(crate) fn char_len(text: &str) -> i64 {
    i64::try_from(text.chars().count()).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_escaped() {
        assert!(!is_escaped("[a]", 0));
        assert!(is_escaped(r"\[a]", 1));
        assert!(!is_escaped(r"\\[a]", 2));
        assert!(is_escaped(r"\\\[a]", 3));
    }

    #[test]
    fn test_encode_text() {
        assert_eq!(encode_text("a < b > c"), "a &lt; b &gt; c");
        assert_eq!(encode_text("use &lt; here"), "use &amp;lt; here");
        assert_eq!(encode_text(r#"say "hi""#), r#"say "hi""#);
    }

    #[test]
    fn test_escape_attribute() {
        assert_eq!(escape_attribute(r#"a"b"#), "a&quot;b");
        assert_eq!(escape_attribute("x > y & z"), "x &gt; y &amp; z");
    }

    #[test]
    fn test_unescape_marks() {
        assert_eq!(unescape_marks(r"\[not a mark\]\{x\}"), "[not a mark]{x}");
        assert_eq!(unescape_marks(r"a\\b"), r"a\b");
        assert_eq!(unescape_marks(r"\\[x"), r"\[x");
        assert_eq!(unescape_marks(r"keep \n and trailing \"), r"keep \n and trailing \");
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("What's New?"), "whats-new");
        assert_eq!(slugify("  Spaces  "), "spaces");
        assert_eq!(slugify("Multiple   Spaces"), "multiple-spaces");
        assert_eq!(slugify("???"), "");
    }

    #[test]
    fn test_char_len() {
        assert_eq!(char_len("héllo"), 5);
    }
}
