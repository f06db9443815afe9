//! Span markup for both process modes.

use std::fmt::Write;

use crate::attributes::{
    ASSOCIATIVE_CLASS, ATTRIBUTED_CLASS, AttributeSet, IMPLICIT_CLASS, SHARED_CLASS,
};
use crate::directives::ProcessMode;
use crate::diagnostics::Warning;

use super::SpanTransformer;
use super::classify::{Shape, Span};

impl SpanTransformer {
    /// Attributes a token decorates its span with: the mark's classes, or the
    /// token parsed as an attribute list.
    fn decoration(&self, token: &str, warnings: &mut Vec<Warning>) -> AttributeSet {
        match self.marks.get(token) {
            Some(classes) => {
                let mut attrs = AttributeSet::new();
                for class in classes.iter() {
                    attrs.classes.insert(class);
                }
                attrs
            }
            None => {
                let mut attrs = AttributeSet::parse(token, warnings);
                attrs.classes.insert(ATTRIBUTED_CLASS);
                attrs
            }
        }
    }

    pub(super) fn render(
        &self,
        line: &str,
        span: &Span,
        warnings: &mut Vec<Warning>,
        out: &mut String,
    ) {
        let token = &line[span.token.clone()];

        match (&span.shape, self.mode) {
            (Shape::NumericReference, ProcessMode::Transform) => {
                let number = self.text(token);
                let _ = write!(
                    out,
                    r#"<span class="{SHARED_CLASS} reference reference-{number}">{number}</span>"#
                );
            }
            (Shape::NumericReference, ProcessMode::Incept) => {
                let number = self.text(token);
                let tag = format!(r#"<span class="{SHARED_CLASS} reference reference-{number}">"#);
                let _ = write!(out, "{tag}{{</span>{number}{tag}}}</span>");
            }
            (Shape::Bracketed { text }, ProcessMode::Transform) => {
                let attrs = self.decoration(token, warnings);
                let text = self.text(&line[text.clone()]);
                let _ = write!(out, "<span{attrs}>{text}</span>");
            }
            (Shape::Bracketed { text }, ProcessMode::Incept) => {
                let first = self.decoration(token, warnings);
                let rest = without_id(&first);
                let text = self.text(&line[text.clone()]);
                let token = self.text(token);
                let _ = write!(
                    out,
                    "<span{first}>[</span>{text}<span{rest}>]{{</span>{token}<span{rest}>}}</span>"
                );
            }
            (Shape::Implicit { run, associative }, ProcessMode::Transform) => {
                let mut attrs = self.decoration(token, warnings);
                attrs.classes.insert(IMPLICIT_CLASS);
                if *associative {
                    attrs.classes.insert(ASSOCIATIVE_CLASS);
                }
                let run = self.text(&line[run.clone()]);
                let _ = write!(out, "<span{attrs}>{run}</span>");
            }
            (Shape::Implicit { run, associative }, ProcessMode::Incept) => {
                let mut marker = AttributeSet::new();
                marker.classes.insert(IMPLICIT_CLASS);
                if *associative {
                    marker.classes.insert(ASSOCIATIVE_CLASS);
                }
                let first = self.decoration(token, warnings);
                let rest = without_id(&first);
                let run = self.text(&line[run.clone()]);
                let token = self.text(token);
                let _ = write!(
                    out,
                    "<span{marker}>{run}</span><span{first}>{{</span>{token}<span{rest}>}}</span>"
                );
            }
        }
    }
}

/// Ids are unique, so only the first of several delimiter spans carries one.
fn without_id(attrs: &AttributeSet) -> AttributeSet {
    AttributeSet {
        id: None,
        ..attrs.clone()
    }
}
