//! FigureMark: figure blocks and inline marks to semantic HTML.
//!
//! This crate rewrites a Markdown (or plain text) document, replacing every
//! fenced figure block with a numbered `<figure>` element and every inline mark
//! inside those blocks with a decorated `<span>`. Everything else in the
//! document passes through untouched.
//!
//! # Syntax
//!
//! ````text
//! {figuremark .wide :link-caption=all}
//!
//! ```figure Example {#intro .dark}
//! The [cat]{!} sat on the [mat]{+}, see {1}.
//! ```
//! ````
//!
//! - `{figuremark ...}` on a line of its own sets attributes and directives for
//!   every later block.
//! - `` ```figure Title {attrs} `` opens a block; a fence of the same character,
//!   at least as long, closes it.
//! - `[text]{token}`, `run{token}` and `{number}` mark text inside a block.
//!
//! # Pipeline
//!
//! For each block the [`Converter`] folds preceding announcements into the
//! global attributes, merges them under the block's own attributes, resolves
//! [`Settings`], rewrites the body line by line, optionally incepts it (keeping
//! all source characters and checking the round trip), assembles the figure and
//! splices it back into the document.
//!
//! Conversion never fails: problems become [`Warning`]s on the returned
//! [`Conversion`] and are logged through `tracing`.
//!
//! # Example
//!
//! ```
//! let result = figuremark_engine::convert("```figuremark Example {.wide}\nThe [cat]{!} sat.\n```");
//!
//! assert_eq!(result.blocks, 1);
//! assert!(result.text.contains(r#"class="figuremark wide""#));
//! assert!(result.text.contains(r#"<span class="figuremark highlight">cat</span>"#));
//! assert!(result.warnings.is_empty());
//! ```

mod assembler;
mod attributes;
mod diagnostics;
mod directives;
mod engine;
mod globals;
mod inception;
mod scanner;
mod spans;
mod util;

pub use attributes::{
    ASSOCIATIVE_CLASS, ATTRIBUTED_CLASS, AttributeSet, ClassList, IMPLICIT_CLASS, OrderedMap,
    REMOVE_TOKEN, SHARED_CLASS,
};
pub use diagnostics::Warning;
pub use directives::{
    Directive, InceptDelimiters, LinkCaption, ProcessMode, RetainBlock, Settings,
};
pub use engine::{Conversion, Converter, convert};
