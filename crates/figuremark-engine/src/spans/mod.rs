//! Inline marks inside block bodies.
//!
//! Every mark ends in a brace-wrapped token. What precedes the token decides
//! the shape of the span, and the token itself decides its decoration:
//!
//! | Source | Shape | Token is a mark | Token is anything else |
//! |--------|-------|-----------------|------------------------|
//! | `{12}` | numeric reference | | |
//! | `[text]{t}` | bracketed | mark directive | attribute list |
//! | `run{t}` | implicit | implicit mark directive | implicit attribute list |
//! | `(run){t}`, `**run**{t}`, ... | associative | associative implicit | associative implicit |
//!
//! Lines are transformed independently, left to right; emitted output is never
//! rescanned.

mod classify;
mod render;

use crate::attributes::{ClassList, OrderedMap, REMOVE_TOKEN};
use crate::directives::{ProcessMode, Settings};
use crate::diagnostics::Warning;

use classify::next_span;

/// Mark symbols understood without any `:mark-type` configuration.
const BUILTIN_MARKS: [(&str, &str); 5] = [
    ("+", "insert"),
    ("-", "remove"),
    ("/", "comment"),
    (">", "result"),
    ("!", "highlight"),
];

/// Token-to-classes lookup: the built-in marks overlaid by a block's
/// `:mark-type` table.
#[derive(Debug, Clone)]
pub(crate) struct MarkTable {
    entries: OrderedMap<ClassList>,
}

impl MarkTable {
    /// Build the table from `overrides`, applied in order.
    ///
    /// An override whose classes are just `-:` deletes that mark, and a `-:`
    /// key drops everything before it, built-ins included.
    pub(crate) fn new(overrides: &OrderedMap<ClassList>) -> Self {
        let mut entries = OrderedMap::new();
        for (name, class) in BUILTIN_MARKS {
            entries.insert(name, std::iter::once(class).collect());
        }

        for (name, classes) in overrides.iter() {
            if name == REMOVE_TOKEN {
                entries.clear();
            } else if classes.len() == 1 && classes.contains(REMOVE_TOKEN) {
                entries.remove(name);
            } else {
                entries.insert(name, classes.clone());
            }
        }

        Self { entries }
    }

    pub(crate) fn get(&self, token: &str) -> Option<&ClassList> {
        self.entries.get(token)
    }
}

/// Rewrites the marks of one block, line by line.
#[derive(Debug, Clone)]
pub(crate) struct SpanTransformer {
    marks: MarkTable,
    mode: ProcessMode,
    associative: bool,
    html_encode: bool,
}

impl SpanTransformer {
    pub(crate) fn new(settings: &Settings, mark_types: &OrderedMap<ClassList>) -> Self {
        Self {
            marks: MarkTable::new(mark_types),
            mode: settings.process_mode,
            associative: settings.associative,
            html_encode: settings.html_encode,
        }
    }

    /// Rewrite every mark in `line`.
    pub(crate) fn transform_line(&self, line: &str, warnings: &mut Vec<Warning>) -> String {
        let mut out = String::with_capacity(line.len());
        let mut emitted = 0;

        while let Some(span) = next_span(line, emitted, self.associative) {
            out.push_str(&self.text(&line[emitted..span.start]));
            self.render(line, &span, warnings, &mut out);
            emitted = span.end;
        }

        out.push_str(&self.text(&line[emitted..]));
        out
    }

    /// Literal text, display-encoded when enabled.
    fn text(&self, text: &str) -> String {
        if self.html_encode {
            crate::util::encode_text(text)
        } else {
            text.to_owned()
        }
    }
}
