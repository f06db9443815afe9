//! Locating marks within one line.
//!
//! Scanning is anchored on the token: find an unescaped `{token}`, then look
//! backwards to decide what it applies to. Nothing before `floor` (output
//! already emitted for an earlier mark) is ever part of a new span.

use std::ops::Range;

use crate::util::is_escaped;

/// What the token applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Shape {
    /// `{12}`: no marked text at all.
    NumericReference,
    /// `[text]{token}`.
    Bracketed { text: Range<usize> },
    /// `run{token}`; associative runs keep their natural delimiters.
    Implicit { run: Range<usize>, associative: bool },
}

/// A located mark: `line[start..end]` is replaced by its rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Span {
    pub start: usize,
    pub end: usize,
    /// Token between the braces.
    pub token: Range<usize>,
    pub shape: Shape,
}

/// Characters that delimit an associative run by repetition, as in `**bold**`.
const REPEATED_DELIMITERS: &[char] = &['*', '_', '~', '=', '^', '"', '\''];

/// Smart quote pairs, closer first.
const QUOTE_PAIRS: &[(char, char)] = &[('”', '“'), ('’', '‘')];

/// Find the first mark in `line` at or after `floor`.
pub(super) fn next_span(line: &str, floor: usize, associative: bool) -> Option<Span> {
    let mut search = floor;

    while let Some(found) = line[search..].find('{') {
        let open = search + found;
        if is_escaped(line, open) {
            search = open + 1;
            continue;
        }

        let Some(found) = line[open + 1..].find(['{', '}']) else {
            return None;
        };
        let close = open + 1 + found;
        if line.as_bytes()[close] == b'{' {
            search = close;
            continue;
        }
        search = close + 1;
        if close == open + 1 {
            continue;
        }

        let token = open + 1..close;
        let shape = bracketed(line, floor, open)
            .or_else(|| is_numeric(&line[token.clone()]).then_some((open, Shape::NumericReference)))
            .or_else(|| associative.then(|| associative_run(line, floor, open)).flatten())
            .or_else(|| implicit_run(line, floor, open));

        if let Some((start, shape)) = shape {
            return Some(Span {
                start,
                end: close + 1,
                token,
                shape,
            });
        }
    }

    None
}

/// Tokens made of digits, dots and dashes, with at least one digit.
fn is_numeric(token: &str) -> bool {
    token.chars().any(|c| c.is_ascii_digit())
        && token.chars().all(|c| c.is_ascii_digit() || c == '.' || c == '-')
}

/// `[text]` directly before the token, with the nearest balanced `[`.
fn bracketed(line: &str, floor: usize, open: usize) -> Option<(usize, Shape)> {
    let close_bracket = open.checked_sub(1)?;
    if close_bracket < floor
        || line.as_bytes()[close_bracket] != b']'
        || is_escaped(line, close_bracket)
    {
        return None;
    }

    let mut depth = 0usize;
    for i in (floor..close_bracket).rev() {
        match line.as_bytes()[i] {
            b']' if !is_escaped(line, i) => depth += 1,
            b'[' if !is_escaped(line, i) => {
                if depth == 0 {
                    let text = i + 1..close_bracket;
                    return (!text.is_empty()).then_some((i, Shape::Bracketed { text }));
                }
                depth -= 1;
            }
            _ => {}
        }
    }

    None
}

/// A naturally delimited run ending right before the token.
fn associative_run(line: &str, floor: usize, open: usize) -> Option<(usize, Shape)> {
    let start = associative_start(line, floor, open)?;
    Some((
        start,
        Shape::Implicit {
            run: start..open,
            associative: true,
        },
    ))
}

/// Position of the opening delimiter paired with the one just before `open`.
fn associative_start(line: &str, floor: usize, open: usize) -> Option<usize> {
    let before = &line[floor..open];
    let last = before.chars().next_back()?;

    if last == ')' {
        return balanced_paren(line, floor, open - 1);
    }

    if let Some(&(_, opener)) = QUOTE_PAIRS.iter().find(|(closer, _)| *closer == last) {
        let content_end = open - last.len_utf8();
        return line[floor..content_end]
            .rfind(opener)
            .map(|i| floor + i)
            .filter(|&i| i + opener.len_utf8() < content_end);
    }

    if (last == ']' || last == '}') && is_escaped(line, open - 1) {
        let opener = if last == ']' { "\\[" } else { "\\{" };
        let content_end = open - 2;
        return line[floor..content_end]
            .rfind(opener)
            .map(|i| floor + i)
            .filter(|&i| !is_escaped(line, i) && i + opener.len() < content_end);
    }

    if REPEATED_DELIMITERS.contains(&last) {
        let width = before.chars().rev().take_while(|&c| c == last).count();
        let delimiter = last.to_string().repeat(width);
        let content_end = open - delimiter.len();
        return line[floor..content_end]
            .rfind(&delimiter)
            .map(|i| floor + i)
            .filter(|&i| i + delimiter.len() < content_end);
    }

    None
}

/// Position of the `(` matching the `)` at `close`.
fn balanced_paren(line: &str, floor: usize, close: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in line[floor..close].char_indices().rev() {
        match c {
            ')' => depth += 1,
            '(' if depth == 0 => return (floor + i + 1 < close).then_some(floor + i),
            '(' => depth -= 1,
            _ => {}
        }
    }
    None
}

/// The non-whitespace run directly before the token.
fn implicit_run(line: &str, floor: usize, open: usize) -> Option<(usize, Shape)> {
    let length: usize = line[floor..open]
        .chars()
        .rev()
        .take_while(|&c| !c.is_whitespace() && c != '[' && c != '{')
        .map(char::len_utf8)
        .sum();
    if length == 0 {
        return None;
    }

    let start = open - length;
    Some((
        start,
        Shape::Implicit {
            run: start..open,
            associative: false,
        },
    ))
}
