//! Global announcements: `{figuremark <attr-string>}` on a line of its own.
//!
//! Announcements fold into one running [`AttributeSet`] by overwrite-merge, in
//! document order, and are removed from the output. An announcement that adds
//! classes replaces the classes announced before it; `.-:name` and `.-:` still
//! remove one or all of them.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::attributes::{AttributeSet, REMOVE_TOKEN, SHARED_CLASS};
use crate::diagnostics::Warning;

/// `{figure ...}` or `{figuremark ...}`, case-insensitive, alone on its line.
static ANNOUNCEMENT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)^\{figure(?:mark)?([^\w}\n][^}\n]*)?\}[ \t\r]*$")
        .expect("invalid announcement regex")
});

/// Running document-wide attributes.
#[derive(Debug, Default)]
pub(crate) struct GlobalDirectiveTracker {
    state: AttributeSet,
}

impl GlobalDirectiveTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Current global attributes.
    pub(crate) fn state(&self) -> &AttributeSet {
        &self.state
    }

    /// Fold one attribute string into the running state.
    pub(crate) fn announce(&mut self, raw: &str, warnings: &mut Vec<Warning>) {
        let announced = AttributeSet::parse(raw, warnings);
        let adds_classes = announced
            .classes
            .iter()
            .any(|class| class != SHARED_CLASS && !class.starts_with(REMOVE_TOKEN));
        if adds_classes {
            self.state.classes.retain(|class| class == SHARED_CLASS);
        }
        self.state.update(&announced);
    }

    /// Fold every announcement in `text[range]`, in order.
    ///
    /// Returns the byte ranges (absolute, including the line terminator) to
    /// delete with [`remove_lines`].
    pub(crate) fn absorb(
        &mut self,
        text: &str,
        range: Range<usize>,
        warnings: &mut Vec<Warning>,
    ) -> Vec<Range<usize>> {
        let mut found = Vec::new();

        for caps in ANNOUNCEMENT_PATTERN.captures_iter(&text[range.clone()]) {
            let Some(whole) = caps.get(0) else { continue };
            let start = range.start + whole.start();
            // The region may begin mid-line; `^` must be a real line start.
            if start > 0 && text.as_bytes()[start - 1] != b'\n' {
                continue;
            }

            let raw = caps.get(1).map_or("", |m| m.as_str().trim());
            tracing::debug!(attributes = raw, "Global announcement");
            self.announce(raw, warnings);

            let mut end = range.start + whole.end();
            if text[end..].starts_with('\n') {
                end += 1;
            }
            found.push(start..end);
        }

        found
    }
}

/// Delete `ranges` (ascending, non-overlapping) from `text`, last first so
/// earlier offsets stay valid. Returns the number of bytes removed.
pub(crate) fn remove_lines(text: &mut String, ranges: &[Range<usize>]) -> usize {
    let mut removed = 0;
    for range in ranges.iter().rev() {
        removed += range.len();
        text.replace_range(range.clone(), "");
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn absorb_all(text: &str) -> (GlobalDirectiveTracker, String) {
        let mut tracker = GlobalDirectiveTracker::new();
        let mut text = text.to_owned();
        let ranges = tracker.absorb(&text, 0..text.len(), &mut Vec::new());
        remove_lines(&mut text, &ranges);
        (tracker, text)
    }

    #[test]
    fn test_announcement_removed() {
        let (tracker, text) = absorb_all("before\n{figuremark .wide}\nafter\n");
        assert_eq!(text, "before\nafter\n");
        assert!(tracker.state().classes.contains("wide"));
    }

    #[test]
    fn test_short_keyword_and_case() {
        let (tracker, text) = absorb_all("{Figure .a}\n{FIGUREMARK :link-caption=none}");
        assert_eq!(text, "");
        assert!(tracker.state().classes.contains("a"));
        assert_eq!(
            tracker.state().directives.get("link-caption").map(String::as_str),
            Some("none")
        );
    }

    #[test]
    fn test_later_announcement_wins() {
        let (tracker, _) =
            absorb_all("{figuremark :link-caption=all}\ntext\n{figuremark :link-caption=none}\n");
        assert_eq!(
            tracker.state().directives.get("link-caption").map(String::as_str),
            Some("none")
        );
    }

    #[test]
    fn test_later_classes_replace_earlier() {
        let (tracker, _) = absorb_all("{figuremark .a .b}\n{figuremark .c}\n");
        assert_eq!(tracker.state().classes.to_string(), "figuremark c");
    }

    #[test]
    fn test_announcement_without_classes_keeps_them() {
        let (tracker, _) = absorb_all("{figuremark .a}\n{figuremark lang=en}\n");
        assert_eq!(tracker.state().classes.to_string(), "figuremark a");
    }

    #[test]
    fn test_class_removal_tokens() {
        let (tracker, _) = absorb_all("{figuremark .a .b}\n{figuremark .-:a}\n");
        assert_eq!(tracker.state().classes.to_string(), "figuremark b");

        let (tracker, _) = absorb_all("{figuremark .a}\n{figuremark .-:}\n");
        assert!(tracker.state().classes.is_empty());

        let (tracker, _) = absorb_all("{figuremark .a}\n{figuremark .-: .z}\n");
        assert_eq!(tracker.state().classes.to_string(), "z");
    }

    #[test]
    fn test_not_alone_on_line() {
        let input = "see {figuremark .x} here\n  {figuremark .y}\n{figures}\n";
        let (tracker, text) = absorb_all(input);
        assert_eq!(text, input);
        assert!(!tracker.state().classes.contains("x"));
        assert!(!tracker.state().classes.contains("y"));
    }

    #[test]
    fn test_trailing_whitespace_allowed() {
        let (tracker, text) = absorb_all("{figuremark .a}  \r\nrest");
        assert_eq!(text, "rest");
        assert!(tracker.state().classes.contains("a"));
    }

    #[test]
    fn test_empty_announcement() {
        let (_, text) = absorb_all("{figuremark}\nbody");
        assert_eq!(text, "body");
    }

    #[test]
    fn test_region_starting_mid_line() {
        let mut tracker = GlobalDirectiveTracker::new();
        let text = "x{figuremark .a}\n{figuremark .b}\n";
        let ranges = tracker.absorb(text, 1..text.len(), &mut Vec::new());
        assert_eq!(ranges, vec![17..33]);
        assert!(!tracker.state().classes.contains("a"));
        assert!(tracker.state().classes.contains("b"));
    }
}
