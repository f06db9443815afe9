//! Directive allow-list and per-block settings.
//!
//! Directives travel as strings inside [`AttributeSet`]s. Once a block's
//! attributes have been merged with the global state they are resolved into a
//! typed [`Settings`], falling back to defaults for missing or invalid values.

use crate::attributes::AttributeSet;
use crate::diagnostics::{Warning, record};

/// Every directive name accepted in `:name=value` tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Directive {
    /// `fig-num-format`: caption number template, `#` becomes the number.
    FigNumFormat,
    /// `empty-captions`: caption untitled blocks too.
    EmptyCaptions,
    /// `caption-before`: caption precedes the content.
    CaptionBefore,
    /// `link-caption`: which caption part links to the figure.
    LinkCaption,
    /// `retain-block`: keep the original source next to the figure.
    RetainBlock,
    /// `process-mode`: `transform` or `incept`.
    ProcessMode,
    /// `incept-delimiters`: what happens to wrapped fence lines in incept mode.
    InceptDelimiters,
    /// `mark-type`: add or remap an entry of the mark table.
    MarkType,
    /// `associative`: allow naturally delimited implicit spans.
    Associative,
    /// `html-encode`: display-encode `&`, `<` and `>` in body text and titles.
    HtmlEncode,
    /// `slug-ids`: derive generated ids from titles.
    SlugIds,
}

impl Directive {
    pub const ALL: [Directive; 11] = [
        Directive::FigNumFormat,
        Directive::EmptyCaptions,
        Directive::CaptionBefore,
        Directive::LinkCaption,
        Directive::RetainBlock,
        Directive::ProcessMode,
        Directive::InceptDelimiters,
        Directive::MarkType,
        Directive::Associative,
        Directive::HtmlEncode,
        Directive::SlugIds,
    ];

    /// Name as written after the `:` prefix.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::FigNumFormat => "fig-num-format",
            Self::EmptyCaptions => "empty-captions",
            Self::CaptionBefore => "caption-before",
            Self::LinkCaption => "link-caption",
            Self::RetainBlock => "retain-block",
            Self::ProcessMode => "process-mode",
            Self::InceptDelimiters => "incept-delimiters",
            Self::MarkType => "mark-type",
            Self::Associative => "associative",
            Self::HtmlEncode => "html-encode",
            Self::SlugIds => "slug-ids",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.name() == name)
    }
}

/// A directive value drawn from a fixed set of keywords.
trait Keyword: Copy + Default + 'static {
    const VARIANTS: &'static [Self];

    fn keyword(self) -> &'static str;
}

/// Which caption part links to the figure anchor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LinkCaption {
    #[default]
    Number,
    Title,
    All,
    None,
}

impl Keyword for LinkCaption {
    const VARIANTS: &'static [Self] = &[Self::Number, Self::Title, Self::All, Self::None];

    fn keyword(self) -> &'static str {
        match self {
            Self::Number => "num",
            Self::Title => "title",
            Self::All => "all",
            Self::None => "none",
        }
    }
}

/// How the original block source is kept alongside the figure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RetainBlock {
    #[default]
    None,
    /// As an HTML comment before the figure.
    Comment,
    /// As a tab-indented (Markdown code) block before the figure.
    Indent,
}

impl Keyword for RetainBlock {
    const VARIANTS: &'static [Self] = &[Self::None, Self::Comment, Self::Indent];

    fn keyword(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Comment => "comment",
            Self::Indent => "indent",
        }
    }
}

/// Rendering style for marks and fences.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProcessMode {
    /// Replace mark syntax with minimal semantic spans.
    #[default]
    Transform,
    /// Highlight mark syntax in place, keeping every source character.
    Incept,
}

impl ProcessMode {
    #[must_use]
    pub fn keyword(self) -> &'static str {
        Keyword::keyword(self)
    }
}

impl Keyword for ProcessMode {
    const VARIANTS: &'static [Self] = &[Self::Transform, Self::Incept];

    fn keyword(self) -> &'static str {
        match self {
            Self::Transform => "transform",
            Self::Incept => "incept",
        }
    }
}

/// What incept mode does with the wrapped fence lines once verified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InceptDelimiters {
    /// Keep them, minus the `:process-mode=incept` trace.
    #[default]
    Trim,
    /// Keep them verbatim.
    Keep,
    /// Drop both fence lines.
    Remove,
}

impl Keyword for InceptDelimiters {
    const VARIANTS: &'static [Self] = &[Self::Trim, Self::Keep, Self::Remove];

    fn keyword(self) -> &'static str {
        match self {
            Self::Trim => "trim",
            Self::Keep => "keep",
            Self::Remove => "remove",
        }
    }
}

const DEFAULT_FIG_NUM_FORMAT: &str = "Fig. #";

/// Typed directive values for one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub fig_num_format: String,
    pub empty_captions: bool,
    pub caption_before: bool,
    pub link_caption: LinkCaption,
    pub retain_block: RetainBlock,
    pub process_mode: ProcessMode,
    pub incept_delimiters: InceptDelimiters,
    pub associative: bool,
    pub html_encode: bool,
    pub slug_ids: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fig_num_format: DEFAULT_FIG_NUM_FORMAT.to_owned(),
            empty_captions: true,
            caption_before: true,
            link_caption: LinkCaption::default(),
            retain_block: RetainBlock::default(),
            process_mode: ProcessMode::default(),
            incept_delimiters: InceptDelimiters::default(),
            associative: false,
            html_encode: true,
            slug_ids: false,
        }
    }
}

impl Settings {
    /// Resolve the directives of a fully merged attribute set.
    ///
    /// Invalid values are reported and replaced by the default.
    pub fn resolve(attrs: &AttributeSet, warnings: &mut Vec<Warning>) -> Self {
        let defaults = Self::default();
        Self {
            fig_num_format: attrs
                .directive(Directive::FigNumFormat)
                .unwrap_or(DEFAULT_FIG_NUM_FORMAT)
                .to_owned(),
            empty_captions: flag(attrs, Directive::EmptyCaptions, defaults.empty_captions, warnings),
            caption_before: flag(attrs, Directive::CaptionBefore, defaults.caption_before, warnings),
            link_caption: keyword(attrs, Directive::LinkCaption, warnings),
            retain_block: keyword(attrs, Directive::RetainBlock, warnings),
            process_mode: keyword(attrs, Directive::ProcessMode, warnings),
            incept_delimiters: keyword(attrs, Directive::InceptDelimiters, warnings),
            associative: flag(attrs, Directive::Associative, defaults.associative, warnings),
            html_encode: flag(attrs, Directive::HtmlEncode, defaults.html_encode, warnings),
            slug_ids: flag(attrs, Directive::SlugIds, defaults.slug_ids, warnings),
        }
    }

    /// Caption number text for figure `number`.
    #[must_use]
    pub fn figure_label(&self, number: usize) -> String {
        self.fig_num_format.replace('#', &number.to_string())
    }
}

fn flag(
    attrs: &AttributeSet,
    directive: Directive,
    default: bool,
    warnings: &mut Vec<Warning>,
) -> bool {
    match attrs.directive(directive) {
        None => default,
        Some("true") => true,
        Some("false") => false,
        Some(other) => {
            invalid(directive, other, &default.to_string(), warnings);
            default
        }
    }
}

fn keyword<K: Keyword>(attrs: &AttributeSet, directive: Directive, warnings: &mut Vec<Warning>) -> K {
    let Some(value) = attrs.directive(directive) else {
        return K::default();
    };
    if let Some(found) = K::VARIANTS.iter().find(|k| k.keyword() == value) {
        return *found;
    }
    invalid(directive, value, K::default().keyword(), warnings);
    K::default()
}

fn invalid(directive: Directive, value: &str, default: &str, warnings: &mut Vec<Warning>) {
    record(
        warnings,
        Warning::InvalidDirectiveValue {
            name: directive.name().to_owned(),
            value: value.to_owned(),
            default: default.to_owned(),
        },
    );
}
