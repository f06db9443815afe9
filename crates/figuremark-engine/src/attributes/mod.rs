//! Attribute and directive strings.
//!
//! Parses the `{.class #id key=value :directive=value}` syntax used by block
//! openers, global announcements and inline marks, and renders the result as
//! HTML tag attributes.

mod collections;
mod merge;

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::diagnostics::{Warning, record};
use crate::directives::Directive;
use crate::util::escape_attribute;

pub use collections::{ClassList, OrderedMap};

/// Class carried by every element the engine emits.
pub const SHARED_CLASS: &str = "figuremark";
/// Added to spans whose token was parsed as an attribute list.
pub const ATTRIBUTED_CLASS: &str = "attributed";
/// Added to spans that mark a bare run instead of bracketed text.
pub const IMPLICIT_CLASS: &str = "implicit";
/// Added to implicit spans whose run is a naturally delimited pair.
pub const ASSOCIATIVE_CLASS: &str = "associative";
/// Sentinel that deletes instead of sets when overwrite-merged.
pub const REMOVE_TOKEN: &str = "-:";

const DIRECTIVE_PREFIX: char = ':';

/// One token: `.class`/`#id`, `key=value` (value optionally quoted), or a bare
/// dotted class list.
static TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[.#][\w:-]+|[\w:-]+=(?:"[^"]*"|'[^']*'|\S*)|[\w.-]+"#)
        .expect("invalid attribute token regex")
});

/// Mergeable element metadata: id, classes, tag attributes and directives.
///
/// # Example
///
/// ```
/// use figuremark_engine::AttributeSet;
///
/// let mut warnings = Vec::new();
/// let attrs = AttributeSet::parse(r#"#intro .wide lang="en" :caption-before=false"#, &mut warnings);
/// assert_eq!(attrs.id.as_deref(), Some("intro"));
/// assert!(attrs.classes.contains("wide"));
/// assert_eq!(attrs.to_string(), r#" id="intro" class="figuremark wide" lang="en""#);
/// assert!(warnings.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSet {
    /// Element id.
    pub id: Option<String>,
    /// Classes, always starting with [`SHARED_CLASS`] when freshly created.
    pub classes: ClassList,
    /// Arbitrary tag attributes such as `data-fignum`.
    pub attributes: OrderedMap<String>,
    /// Allow-listed directives, keyed by name without the `:` prefix.
    pub directives: OrderedMap<String>,
    /// The `:mark-type` table: mark name to the classes it renders with.
    pub mark_types: OrderedMap<ClassList>,
}

impl Default for AttributeSet {
    fn default() -> Self {
        Self::new()
    }
}

impl AttributeSet {
    /// Create an empty set carrying only the shared class.
    #[must_use]
    pub fn new() -> Self {
        let mut classes = ClassList::new();
        classes.insert(SHARED_CLASS);
        Self {
            id: None,
            classes,
            attributes: OrderedMap::new(),
            directives: OrderedMap::new(),
            mark_types: OrderedMap::new(),
        }
    }

    /// Parse an attribute string (without the surrounding braces).
    ///
    /// Parsing never fails. Unknown directives are reported to `warnings` and
    /// dropped; anything unrecognisable is absorbed as class names or skipped.
    pub fn parse(raw: &str, warnings: &mut Vec<Warning>) -> Self {
        let mut set = Self::new();

        for token in TOKEN_PATTERN.find_iter(raw).map(|m| m.as_str()) {
            if let Some(class) = token.strip_prefix('.') {
                set.classes.insert(class);
            } else if let Some(id) = token.strip_prefix('#') {
                set.id = Some(id.to_owned());
            } else if let Some((key, value)) = token.split_once('=') {
                let value = value.trim_matches(|c| c == '"' || c == '\'');
                match key.strip_prefix(DIRECTIVE_PREFIX) {
                    Some(name) => set.insert_directive(name, value, warnings),
                    None => {
                        set.attributes.insert(key, value.to_owned());
                    }
                }
            } else {
                for class in token.split('.') {
                    set.classes.insert(class);
                }
            }
        }

        set
    }

    fn insert_directive(&mut self, name: &str, value: &str, warnings: &mut Vec<Warning>) {
        match Directive::from_name(name) {
            Some(Directive::MarkType) => self.insert_mark_type(value),
            Some(directive) => {
                self.directives.insert(directive.name(), value.to_owned());
            }
            // `:-:=...` clears every directive when overwrite-merged.
            None if name == REMOVE_TOKEN => {
                self.directives.insert(REMOVE_TOKEN, value.to_owned());
            }
            None => record(
                warnings,
                Warning::UnknownDirective {
                    name: name.to_owned(),
                },
            ),
        }
    }

    /// Add a `name:class.class` entry to the mark-type table.
    fn insert_mark_type(&mut self, value: &str) {
        if value == REMOVE_TOKEN {
            self.mark_types.insert(REMOVE_TOKEN, ClassList::new());
            return;
        }

        let (name, classes) = value.split_once(':').unwrap_or((value, ""));
        if name.is_empty() {
            return;
        }
        let classes = if classes == REMOVE_TOKEN {
            std::iter::once(REMOVE_TOKEN).collect()
        } else {
            classes
                .split(|c: char| c == '.' || c.is_whitespace())
                .collect()
        };
        self.mark_types.insert(name, classes);
    }

    /// Look up a directive value by name.
    #[must_use]
    pub fn directive(&self, directive: Directive) -> Option<&str> {
        self.directives.get(directive.name()).map(String::as_str)
    }
}

/// Renders as HTML tag attributes with a leading space: ` id="…" class="…" k="v"`.
impl fmt::Display for AttributeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(id) = &self.id {
            write!(f, r#" id="{id}""#)?;
        }
        if !self.classes.is_empty() {
            write!(f, r#" class="{}""#, self.classes)?;
        }
        for (key, value) in self.attributes.iter() {
            write!(f, r#" {key}="{}""#, escape_attribute(value))?;
        }
        Ok(())
    }
}
