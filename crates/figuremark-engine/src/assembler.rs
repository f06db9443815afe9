//! Final `<figure>` markup: line spans, caption and retained source.

use std::fmt::Write;

use crate::attributes::{AttributeSet, SHARED_CLASS};
use crate::directives::{LinkCaption, ProcessMode, RetainBlock, Settings};
use crate::util::{encode_text, unescape_marks};

/// Everything needed to assemble one figure.
#[derive(Debug)]
pub(crate) struct FigureParts<'a> {
    /// Resolved figure attributes; the id is always set by now.
    pub attrs: &'a AttributeSet,
    pub settings: &'a Settings,
    pub number: usize,
    pub title: &'a str,
    /// Rendered content lines, fences included in incept mode.
    pub lines: &'a [String],
    /// Original block source.
    pub source: &'a str,
}

impl FigureParts<'_> {
    pub(crate) fn assemble(&self) -> String {
        let content = self.content();
        let body = match self.caption() {
            Some(caption) if self.settings.caption_before => format!("{caption}\n{content}"),
            Some(caption) => format!("{content}\n{caption}"),
            None => content,
        };
        let figure = format!("<figure{}>{body}</figure>", self.attrs);

        match self.settings.retain_block {
            RetainBlock::None => figure,
            RetainBlock::Comment => format!("<!--\n{}\n-->\n\n{figure}", self.source),
            RetainBlock::Indent => {
                let mut retained = String::new();
                for line in self.source.trim_start().split_inclusive('\n') {
                    retained.push('\t');
                    retained.push_str(line);
                }
                format!("{retained}\n\n{figure}")
            }
        }
    }

    fn content(&self) -> String {
        let mut lines = String::new();
        for line in self.lines {
            let _ = writeln!(lines, r#"<span class="{SHARED_CLASS} line">{line}</span>"#);
        }
        // Incepted content keeps its escapes: they are source characters.
        if self.settings.process_mode == ProcessMode::Transform {
            lines = unescape_marks(&lines);
        }
        format!(r#"<div class="figure-content">{lines}</div>"#)
    }

    fn caption(&self) -> Option<String> {
        if self.title.is_empty() && !self.settings.empty_captions {
            return None;
        }

        let number = self.settings.figure_label(self.number);
        let title = if self.settings.html_encode {
            encode_text(self.title)
        } else {
            self.title.to_owned()
        };
        let href = self.attrs.id.as_deref().unwrap_or_default();
        let link = format!(r##"<a href="#{href}">"##);

        let caption = match self.settings.link_caption {
            LinkCaption::Number => format!(
                r#"<span class="figure-number">{link}{number}</a></span><span class="figure-title">{title}</span>"#
            ),
            LinkCaption::Title => format!(
                r#"<span class="figure-number">{number}</span><span class="figure-title">{link}{title}</a></span>"#
            ),
            LinkCaption::All => format!(
                r#"{link}<span class="figure-number">{number}</span><span class="figure-title">{title}</span></a>"#
            ),
            LinkCaption::None => format!(
                r#"<span class="figure-number">{number}</span><span class="figure-title">{title}</span>"#
            ),
        };
        Some(format!("<figcaption>{caption}</figcaption>"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn settings(raw: &str) -> Settings {
        let mut warnings = Vec::new();
        Settings::resolve(&AttributeSet::parse(raw, &mut warnings), &mut warnings)
    }

    fn attrs() -> AttributeSet {
        let mut attrs = AttributeSet::new();
        attrs.id = Some("figure-3".to_owned());
        attrs
    }

    fn assemble(settings: &Settings, title: &str, lines: &[&str]) -> String {
        let attrs = attrs();
        let lines: Vec<String> = lines.iter().map(|&l| l.to_owned()).collect();
        FigureParts {
            attrs: &attrs,
            settings,
            number: 3,
            title,
            lines: &lines,
            source: "```figure\nbody\n```",
        }
        .assemble()
    }

    #[test]
    fn test_default_layout() {
        assert_eq!(
            assemble(&settings(""), "Title", &["one", "two"]),
            concat!(
                r#"<figure id="figure-3" class="figuremark">"#,
                r##"<figcaption><span class="figure-number"><a href="#figure-3">Fig. 3</a></span>"##,
                r#"<span class="figure-title">Title</span></figcaption>"#,
                "\n",
                r#"<div class="figure-content">"#,
                "<span class=\"figuremark line\">one</span>\n",
                "<span class=\"figuremark line\">two</span>\n",
                "</div></figure>"
            )
        );
    }

    #[test]
    fn test_caption_after() {
        let out = assemble(&settings(":caption-before=false"), "T", &["x"]);
        assert!(out.contains("</div>\n<figcaption>"));
    }

    #[test]
    fn test_no_caption_for_untitled_when_disabled() {
        let out = assemble(&settings(":empty-captions=false"), "", &["x"]);
        assert!(!out.contains("figcaption"));

        let out = assemble(&settings(":empty-captions=false"), "Titled", &["x"]);
        assert!(out.contains("figcaption"));
    }

    #[test]
    fn test_link_caption_variants() {
        let out = assemble(&settings(":link-caption=title"), "T", &[]);
        assert!(out.contains(r##"<span class="figure-title"><a href="#figure-3">T</a></span>"##));

        let out = assemble(&settings(":link-caption=all"), "T", &[]);
        assert!(out.contains(r##"<figcaption><a href="#figure-3"><span class="figure-number">"##));

        let out = assemble(&settings(":link-caption=none"), "T", &[]);
        assert!(!out.contains("<a "));
    }

    #[test]
    fn test_number_format() {
        let out = assemble(&settings(":fig-num-format='Figure #:'"), "", &[]);
        assert!(out.contains(">Figure 3:</a>"));
    }

    #[test]
    fn test_escapes_removed_from_content() {
        let out = assemble(&settings(""), "", &[r"\[x\] \\ \{y\}"]);
        assert!(out.contains(r"[x] \ {y}"));
    }

    #[test]
    fn test_escapes_kept_when_incepted() {
        let out = assemble(&settings(":process-mode=incept"), "", &[r"\[x\]{!}"]);
        assert!(out.contains(r"\[x\]{!}"));
    }

    #[test]
    fn test_title_encoded() {
        let out = assemble(&settings(""), "Cats & <Dogs>", &[]);
        assert!(out.contains(r#"<span class="figure-title">Cats &amp; &lt;Dogs&gt;</span>"#));

        let out = assemble(&settings(":html-encode=false"), "<b>Bold</b>", &[]);
        assert!(out.contains(r#"<span class="figure-title"><b>Bold</b></span>"#));
    }

    #[test]
    fn test_retain_comment() {
        let out = assemble(&settings(":retain-block=comment"), "", &["x"]);
        assert!(out.starts_with("<!--\n```figure\nbody\n```\n-->\n\n<figure"));
    }

    #[test]
    fn test_retain_indent() {
        let out = assemble(&settings(":retain-block=indent"), "", &["x"]);
        assert!(out.starts_with("\t```figure\n\tbody\n\t```\n\n<figure"));
    }
}
