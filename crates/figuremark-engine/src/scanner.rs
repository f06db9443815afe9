//! Fenced figure block detection.
//!
//! A block opens with a backtick or tilde fence of three or more characters
//! followed by the `figure`/`figuremark` keyword, an optional title and an
//! optional `{attr-string}`. It closes on the first later line made of the same
//! fence character, at least as long as the opening run, with nothing but
//! whitespace after it.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

static OPENING_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?mi)^(`{3,}|~{3,})[ \t]*figure(?:mark)?([ \t]+[^{\s][^{\n]*?)?[ \t]*(?:\{([^}\n]*)\})?[ \t\r]*$",
    )
    .expect("invalid figure block regex")
});

/// Literal `<figure>` elements already present in the document.
static FIGURE_ELEMENT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<figure[^>]*>.+?</figure>").expect("invalid figure element regex")
});

/// Blocks directly after an HTML comment opener are left alone.
const COMMENT_OPENER: &str = "<!--\n";

/// One matched figure block, borrowing from the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FigureBlock<'a> {
    /// Byte range in the document, from the opening fence to the end of the
    /// closing line (terminator excluded).
    pub range: Range<usize>,
    /// The whole block source, `document[range]`.
    pub source: &'a str,
    pub opening_line: &'a str,
    pub closing_line: &'a str,
    /// Lines strictly between the fences.
    pub body_lines: Vec<&'a str>,
    /// Trimmed title, empty when absent.
    pub title: &'a str,
    /// Title group within `opening_line`, leading whitespace included.
    pub title_range: Option<Range<usize>>,
    /// Attribute string without braces; `Some("")` for `{}`.
    pub raw_attributes: Option<&'a str>,
    /// Attribute string within `opening_line`, braces excluded.
    pub attributes_range: Option<Range<usize>>,
}

/// Find the first figure block starting at or after byte offset `from`.
pub(crate) fn find_block(text: &str, from: usize) -> Option<FigureBlock<'_>> {
    let mut search = from;

    while search <= text.len() {
        let caps = OPENING_PATTERN.captures_at(text, search)?;
        let opening = caps.get(0)?;
        let start = opening.start();
        let opening_end = opening.end();

        if text[..start].ends_with(COMMENT_OPENER) {
            search = next_line(text, opening_end);
            continue;
        }

        let fence = caps.get(1)?.as_str();
        let Some(closing) = find_closing_fence(text, opening_end, fence) else {
            search = next_line(text, opening_end);
            continue;
        };

        let opening_line = &text[start..opening_end];
        let body_lines = if closing.start > opening_end + 1 {
            text[opening_end + 1..closing.start - 1].split('\n').collect()
        } else {
            Vec::new()
        };
        let title_group = caps.get(2);
        let attributes_group = caps.get(3);

        return Some(FigureBlock {
            range: start..closing.end,
            source: &text[start..closing.end],
            opening_line,
            closing_line: &text[closing.clone()],
            body_lines,
            title: title_group.map_or("", |m| m.as_str().trim()),
            title_range: title_group.map(|m| m.start() - start..m.end() - start),
            raw_attributes: attributes_group.map(|m| m.as_str()),
            attributes_range: attributes_group.map(|m| m.start() - start..m.end() - start),
        });
    }

    None
}

/// Offset just past the line terminator following `offset`, or past the end.
fn next_line(text: &str, offset: usize) -> usize {
    text[offset..]
        .find('\n')
        .map_or(text.len() + 1, |i| offset + i + 1)
}

/// Range of the first closing fence line after the opening line ending at
/// `opening_end`.
fn find_closing_fence(text: &str, opening_end: usize, fence: &str) -> Option<Range<usize>> {
    let fence_char = fence.chars().next()?;
    if !text[opening_end..].starts_with('\n') {
        return None;
    }

    let mut line_start = opening_end + 1;
    while line_start <= text.len() {
        let line_end = text[line_start..]
            .find('\n')
            .map_or(text.len(), |i| line_start + i);
        if is_closing_fence(&text[line_start..line_end], fence_char, fence.len()) {
            return Some(line_start..line_end);
        }
        line_start = line_end + 1;
    }

    None
}

/// Check if a line is a valid closing fence.
///
/// The closing fence must:
/// - Start at the beginning of the line
/// - Use the same character as the opening fence
/// - Be at least as long as the opening fence
/// - Contain only fence characters, optionally followed by whitespace
fn is_closing_fence(line: &str, fence_char: char, min_len: usize) -> bool {
    let count = line.chars().take_while(|&c| c == fence_char).count();
    if count < min_len {
        return false;
    }

    // Fence characters are ASCII, so `count` is also a byte offset.
    line[count..].chars().all(char::is_whitespace)
}

/// Count literal `<figure>...</figure>` elements in `text`.
pub(crate) fn count_figures(text: &str) -> usize {
    FIGURE_ELEMENT_PATTERN.find_iter(text).count()
}
