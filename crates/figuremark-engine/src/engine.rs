//! The conversion loop: find a block, resolve it, splice, resume.

use std::collections::HashMap;
use std::iter;

use crate::assembler::FigureParts;
use crate::attributes::AttributeSet;
use crate::diagnostics::{Warning, record};
use crate::directives::{InceptDelimiters, ProcessMode, Settings};
use crate::globals::{GlobalDirectiveTracker, remove_lines};
use crate::inception::{FenceWrapper, trim_mode_trace, verify};
use crate::scanner::{FigureBlock, count_figures, find_block};
use crate::spans::SpanTransformer;
use crate::util::slugify;

/// Tag attribute carrying the figure number.
const FIGNUM_ATTRIBUTE: &str = "data-fignum";

/// Result of converting one document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Conversion {
    /// The rewritten document.
    pub text: String,
    /// Number of FigureMark blocks replaced.
    pub blocks: usize,
    /// Problems found along the way, in document order.
    pub warnings: Vec<Warning>,
}

impl Conversion {
    /// One-line human-readable outcome.
    #[must_use]
    pub fn summary(&self) -> String {
        if self.blocks > 0 {
            format!("Processed {} FigureMark blocks.", self.blocks)
        } else {
            "No FigureMark blocks found.".to_owned()
        }
    }
}

/// Single-use FigureMark converter.
///
/// Holds the running global attributes and figure counter for one document.
/// [`convert`](Self::convert) consumes the converter, so nothing carries over
/// into the next document.
///
/// # Example
///
/// ```
/// use figuremark_engine::Converter;
///
/// let result = Converter::new()
///     .with_globals(":fig-num-format='Figure #'")
///     .convert("```figure Demo\n[new]{+} text\n```\n");
///
/// assert_eq!(result.blocks, 1);
/// assert!(result.text.contains("Figure 1"));
/// assert!(result.text.contains(r#"<span class="figuremark insert">new</span>"#));
/// ```
#[derive(Debug, Default)]
pub struct Converter {
    globals: GlobalDirectiveTracker,
    figure_number: usize,
    blocks: usize,
    slug_counts: HashMap<String, usize>,
    warnings: Vec<Warning>,
}

impl Converter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the global attributes as if `raw` were announced before the
    /// document's first line.
    #[must_use]
    pub fn with_globals(mut self, raw: &str) -> Self {
        self.globals.announce(raw, &mut self.warnings);
        self
    }

    /// Convert every FigureMark block in `text`.
    pub fn convert(mut self, text: &str) -> Conversion {
        let mut text = text.to_owned();
        let mut cursor = 0;

        while let Some(block) = find_block(&text, cursor) {
            let range = block.range.clone();
            self.figure_number += count_figures(&text[cursor..range.start]) + 1;

            let announcements = self
                .globals
                .absorb(&text, cursor..range.start, &mut self.warnings);
            let replacement = self.render_block(&block);

            text.replace_range(range.clone(), &replacement);
            let removed = remove_lines(&mut text, &announcements);
            cursor = range.start - removed + replacement.len();
            self.blocks += 1;
        }

        let trailing = self
            .globals
            .absorb(&text, cursor..text.len(), &mut self.warnings);
        remove_lines(&mut text, &trailing);

        if self.blocks > 0 {
            tracing::info!(blocks = self.blocks, "Processed FigureMark blocks");
        } else {
            tracing::info!("No FigureMark blocks found");
        }

        Conversion {
            text,
            blocks: self.blocks,
            warnings: self.warnings,
        }
    }

    fn render_block(&mut self, block: &FigureBlock<'_>) -> String {
        let number = self.figure_number;

        let mut attrs =
            AttributeSet::parse(block.raw_attributes.unwrap_or_default(), &mut self.warnings);
        let local_id = attrs.id.take();
        attrs
            .attributes
            .insert(FIGNUM_ATTRIBUTE, number.to_string());
        attrs.incorporate(self.globals.state());

        let settings = Settings::resolve(&attrs, &mut self.warnings);
        let id = local_id.unwrap_or_else(|| self.generate_id(&settings, block.title, number));
        tracing::debug!(
            figure = number,
            id = %id,
            mode = settings.process_mode.keyword(),
            "Rendering figure block"
        );
        attrs.id = Some(id);

        let transformer = SpanTransformer::new(&settings, &attrs.mark_types);
        let mut lines: Vec<String> = block
            .body_lines
            .iter()
            .map(|line| transformer.transform_line(line, &mut self.warnings))
            .collect();

        if settings.process_mode == ProcessMode::Incept {
            attrs.classes.insert(ProcessMode::Incept.keyword());
            lines = self.incept(block, &settings, number, lines);
        }

        FigureParts {
            attrs: &attrs,
            settings: &settings,
            number,
            title: block.title,
            lines: &lines,
            source: block.source,
        }
        .assemble()
    }

    /// Wrap the fences around the transformed body, check the round trip, and
    /// keep, trim or drop the fence lines.
    fn incept(
        &mut self,
        block: &FigureBlock<'_>,
        settings: &Settings,
        number: usize,
        body: Vec<String>,
    ) -> Vec<String> {
        let wrapper = FenceWrapper {
            html_encode: settings.html_encode,
        };
        let opening = wrapper.opening(block);
        let closing = wrapper.closing(block.closing_line);

        let rendered = iter::once(&opening)
            .chain(&body)
            .chain(iter::once(&closing))
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n");
        if let Some(delta) = verify(block.source, &rendered, settings.html_encode) {
            record(
                &mut self.warnings,
                Warning::ImperfectInception {
                    figure: number,
                    delta,
                },
            );
        }

        let opening = match settings.incept_delimiters {
            InceptDelimiters::Remove => return body,
            InceptDelimiters::Keep => opening,
            InceptDelimiters::Trim => trim_mode_trace(&opening),
        };
        iter::once(opening)
            .chain(body)
            .chain(iter::once(closing))
            .collect()
    }

    /// Id for a block without a local one: `figure-<n>`, or with slug ids
    /// `figure-<slug>` made unique by a `-2`, `-3`, ... suffix.
    fn generate_id(&mut self, settings: &Settings, title: &str, number: usize) -> String {
        let slug = slugify(title);
        if !settings.slug_ids || slug.is_empty() {
            return format!("figure-{number}");
        }

        let count = self.slug_counts.entry(slug.clone()).or_insert(0);
        *count += 1;
        if *count == 1 {
            format!("figure-{slug}")
        } else {
            format!("figure-{slug}-{count}")
        }
    }
}

/// Convert `text` with a fresh [`Converter`].
pub fn convert(text: &str) -> Conversion {
    Converter::new().convert(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_no_blocks() {
        let result = convert("plain text\n");
        assert_eq!(result.text, "plain text\n");
        assert_eq!(result.blocks, 0);
        assert_eq!(result.summary(), "No FigureMark blocks found.");
    }

    #[test]
    fn test_summary() {
        let result = convert("```figure\na\n```\n```figure\nb\n```");
        assert_eq!(result.blocks, 2);
        assert_eq!(result.summary(), "Processed 2 FigureMark blocks.");
    }

    #[test]
    fn test_block_replaced_in_place() {
        let result = convert("before\n```figure\nx\n```\nafter");
        assert!(result.text.starts_with("before\n<figure "));
        assert!(result.text.ends_with("</figure>\nafter"));
    }

    #[test]
    fn test_fignum_and_id() {
        let result = convert("```figure\nx\n```");
        assert!(result
            .text
            .starts_with(r#"<figure id="figure-1" class="figuremark" data-fignum="1">"#));
    }

    #[test]
    fn test_local_id_kept() {
        let result = convert("```figure {#mine}\nx\n```");
        assert!(result.text.contains(r##"<figure id="mine""##));
        assert!(result.text.contains(r##"<a href="#mine">"##));
    }

    #[test]
    fn test_global_id_not_inherited() {
        let result = convert("{figuremark #shared}\n```figure\na\n```\n```figure\nb\n```");
        assert!(result.text.contains(r#"id="figure-1""#));
        assert!(result.text.contains(r#"id="figure-2""#));
        assert!(!result.text.contains("shared"));
    }

    #[test]
    fn test_slug_ids() {
        let input = "{figuremark :slug-ids=true}\n\
                     ```figure Hello World\na\n```\n\
                     ```figure Hello World\nb\n```\n\
                     ```figure\nc\n```";
        let result = convert(input);
        assert!(result.text.contains(r#"id="figure-hello-world""#));
        assert!(result.text.contains(r#"id="figure-hello-world-2""#));
        assert!(result.text.contains(r#"id="figure-3""#));
    }

    #[test]
    fn test_with_globals_seeds_state() {
        let result = Converter::new()
            .with_globals(".seeded")
            .convert("```figure\nx\n```");
        assert!(result.text.contains(r#"class="figuremark seeded""#));
    }

    #[test]
    fn test_converter_state_does_not_leak() {
        let first = Converter::new().convert("{figuremark .a}\n```figure\nx\n```");
        let second = Converter::new().convert("```figure\nx\n```");
        assert!(first.text.contains("figuremark a"));
        assert!(!second.text.contains("figuremark a"));
    }

    #[test]
    fn test_warnings_collected() {
        let result = convert("```figure {:bogus=1 :link-caption=maybe}\nx\n```");
        assert_eq!(result.warnings.len(), 2);
        assert!(matches!(result.warnings[0], Warning::UnknownDirective { .. }));
        assert!(matches!(
            result.warnings[1],
            Warning::InvalidDirectiveValue { .. }
        ));
    }

    #[test]
    fn test_incept_keeps_source_text() {
        let result = convert("```figure T {:process-mode=incept}\n[a]{!} b{.c}\n```");
        assert!(result.warnings.is_empty(), "{:?}", result.warnings);
        assert!(result.text.contains(r#"class="figuremark incept""#));
        assert!(!result.text.contains("process-mode"));
    }

    #[test]
    fn test_incept_delimiters_keep_and_remove() {
        let keep = convert("```figure {:process-mode=incept :incept-delimiters=keep}\nx\n```");
        assert!(keep.text.contains(":process-mode=incept"));

        let remove = convert("```figure {:process-mode=incept :incept-delimiters=remove}\nx\n```");
        assert!(!remove.text.contains("```"));
        assert!(remove.text.contains(r#"<span class="figuremark line">x</span>"#));
    }
}
