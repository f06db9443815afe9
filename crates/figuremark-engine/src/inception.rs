//! Incept mode: highlight the fences in place and verify the round trip.
//!
//! Incepted output keeps every source character. Stripping all tags from the
//! wrapped fence lines and transformed body must give back the block source
//! exactly, display-encoded the same way as the body text; a mismatch is
//! reported but never fatal.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::directives::{Directive, ProcessMode};
use crate::scanner::FigureBlock;
use crate::util::{char_len, encode_text};

/// Opening tag of the span highlighting fence delimiters.
const HIGHLIGHT_OPEN: &str = r#"<span class="figuremark highlight">"#;

static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<.*?>").expect("invalid tag regex"));

/// `:process-mode=incept` with any surrounding whitespace on one side.
static MODE_TRACE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    let trace = format!(
        r#":{}=['"]?{}['"]?"#,
        Directive::ProcessMode.name(),
        ProcessMode::Incept.keyword()
    );
    Regex::new(&format!(r"\s+{trace}|{trace}\s+|{trace}")).expect("invalid mode trace regex")
});

/// A highlighted `{}` left behind once the trace was its only content.
static EMPTY_ATTRIBUTES_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\s*{}\{{\s*\}}</span>\s*", regex::escape(HIGHLIGHT_OPEN)))
        .expect("invalid empty attributes regex")
});

/// Encodes literal fence text when display encoding is on.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FenceWrapper {
    pub html_encode: bool,
}

impl FenceWrapper {
    fn text(self, text: &str) -> String {
        if self.html_encode {
            encode_text(text)
        } else {
            text.to_owned()
        }
    }

    fn highlight(self, text: &str) -> String {
        format!("{HIGHLIGHT_OPEN}{}</span>", self.text(text))
    }

    /// Highlight the opening fence line, leaving the title and attribute
    /// string themselves unmarked.
    pub(crate) fn opening(self, block: &FigureBlock<'_>) -> String {
        let line = block.opening_line;
        let title = block.title_range.as_ref().filter(|_| !block.title.is_empty());

        match (title, &block.attributes_range) {
            (Some(title), Some(attrs)) => {
                let (before, braces, after) = split_braces(line, attrs);
                format!(
                    "{}{}{}{}",
                    self.highlight(&line[..title.start]),
                    self.text(&line[title.start..before]),
                    self.highlight(braces),
                    self.text(after)
                )
            }
            (Some(title), None) => format!(
                "{}{}",
                self.highlight(&line[..title.start]),
                self.text(&line[title.start..])
            ),
            (None, Some(attrs)) => {
                let (before, braces, after) = split_braces(line, attrs);
                let fence = trim_blanks(&line[..before]);
                format!(
                    "{}{}{}{}",
                    self.highlight(fence),
                    self.text(&line[fence.len()..before]),
                    self.highlight(braces),
                    self.text(after)
                )
            }
            (None, None) => self.trailing_blanks_plain(line),
        }
    }

    /// Highlight the closing fence line.
    pub(crate) fn closing(self, line: &str) -> String {
        self.trailing_blanks_plain(line)
    }

    fn trailing_blanks_plain(self, line: &str) -> String {
        let fence = trim_blanks(line);
        format!("{}{}", self.highlight(fence), self.text(&line[fence.len()..]))
    }
}

/// Split `line` around the braced attribute string whose inner range is
/// `attrs`: `(offset of the opening brace, "{...}", rest of line)`.
fn split_braces<'a>(line: &'a str, attrs: &Range<usize>) -> (usize, &'a str, &'a str) {
    let open = attrs.start - 1;
    let close = attrs.end + 1;
    (open, &line[open..close], &line[close..])
}

fn trim_blanks(text: &str) -> &str {
    text.trim_end_matches([' ', '\t'])
}

/// Compare the tag-stripped rendering with the block source.
///
/// With display encoding on, the rendering is compared against the encoded
/// source, so literal entities in the source survive the check unchanged.
/// Returns the character-count delta (rendered minus expected) on mismatch.
pub(crate) fn verify(source: &str, rendered: &str, html_encode: bool) -> Option<i64> {
    let stripped = TAG_PATTERN.replace_all(rendered, "");
    let expected = if html_encode {
        encode_text(source)
    } else {
        source.to_owned()
    };

    if stripped == expected {
        return None;
    }

    tracing::debug!(
        expected = %expected,
        stripped = %stripped,
        "Inception round trip mismatch"
    );
    Some(char_len(&stripped) - char_len(&expected))
}

/// Remove the `:process-mode=incept` trace from a wrapped opening line.
pub(crate) fn trim_mode_trace(opening: &str) -> String {
    let trimmed = MODE_TRACE_PATTERN.replace_all(opening, "");
    EMPTY_ATTRIBUTES_PATTERN
        .replace_all(&trimmed, "")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::find_block;
    use pretty_assertions::assert_eq;

    const WRAPPER: FenceWrapper = FenceWrapper { html_encode: true };

    fn opening(text: &str) -> String {
        WRAPPER.opening(&find_block(text, 0).unwrap())
    }

    fn stripped(text: &str) -> String {
        TAG_PATTERN.replace_all(text, "").into_owned()
    }

    #[test]
    fn test_opening_plain() {
        let wrapped = opening("```figure  \nx\n```");
        assert_eq!(wrapped, format!("{HIGHLIGHT_OPEN}```figure</span>  "));
    }

    #[test]
    fn test_opening_title_only() {
        let wrapped = opening("```figure My Title\nx\n```");
        assert_eq!(wrapped, format!("{HIGHLIGHT_OPEN}```figure</span> My Title"));
    }

    #[test]
    fn test_opening_attributes_only() {
        let wrapped = opening("~~~figuremark {.a} \nx\n~~~");
        assert_eq!(
            wrapped,
            format!("{HIGHLIGHT_OPEN}~~~figuremark</span> {HIGHLIGHT_OPEN}{{.a}}</span> ")
        );
    }

    #[test]
    fn test_opening_title_and_attributes() {
        let text = "```figure Cats & <Dogs> {.a}\nx\n```";
        let wrapped = opening(text);
        assert_eq!(
            wrapped,
            format!(
                "{HIGHLIGHT_OPEN}```figure</span> Cats &amp; &lt;Dogs&gt; {HIGHLIGHT_OPEN}{{.a}}</span>"
            )
        );
        assert_eq!(
            stripped(&wrapped),
            encode_text("```figure Cats & <Dogs> {.a}")
        );
    }

    #[test]
    fn test_closing() {
        assert_eq!(
            WRAPPER.closing("````\t"),
            format!("{HIGHLIGHT_OPEN}````</span>\t")
        );
    }

    #[test]
    fn test_verify() {
        let source = "```figure\n[a]{!}\n```";
        let good = format!(
            "{HIGHLIGHT_OPEN}```figure</span>\n<span class=\"x\">[</span>a<span>]{{</span>!<span>}}</span>\n{HIGHLIGHT_OPEN}```</span>"
        );
        assert_eq!(verify(source, &good, true), None);
        assert_eq!(verify(source, "```figure\na\n```", true), Some(-5));
    }

    #[test]
    fn test_verify_compares_encoded_source() {
        assert_eq!(verify("a<b", "a&lt;b", true), None);
        assert_eq!(verify("a<b", "a&lt;b", false), Some(3));
        assert_eq!(verify("a<b", "a<b", false), None);
    }

    #[test]
    fn test_verify_keeps_literal_entities() {
        assert_eq!(verify("use &lt; here", "use &amp;lt; here", true), None);
        assert_eq!(verify("use &lt; here", "use &lt; here", true), Some(-4));
    }

    #[test]
    fn test_trim_mode_trace() {
        let wrapped = opening("```figure T {.a :process-mode=incept}\nx\n```");
        assert_eq!(
            trim_mode_trace(&wrapped),
            format!("{HIGHLIGHT_OPEN}```figure</span> T {HIGHLIGHT_OPEN}{{.a}}</span>")
        );
    }

    #[test]
    fn test_trim_mode_trace_removes_emptied_braces() {
        let wrapped = opening("```figure {:process-mode='incept'}\nx\n```");
        assert_eq!(
            trim_mode_trace(&wrapped),
            format!("{HIGHLIGHT_OPEN}```figure</span>")
        );
    }
}
