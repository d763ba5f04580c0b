use std::ops::Range;

use super::{ChartParseError, ChartParseErrorKind};

/// A non-blank line with surrounding whitespace removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Line<'a> {
    pub(crate) text: &'a str,
    /// 1-based line number.
    pub(crate) number: usize,
    /// Byte range of `text` in the source.
    pub(crate) span: Range<usize>,
}

impl Line<'_> {
    pub(crate) fn err(&self, kind: ChartParseErrorKind) -> ChartParseError {
        ChartParseError {
            kind,
            line: self.number,
            span: self.span.clone(),
        }
    }
}

pub(crate) struct Cursor<'a> {
    line: usize,
    index: usize,
    source: &'a str,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        Self {
            line: 0,
            index: if source.starts_with('\u{feff}') {
                '\u{feff}'.len_utf8()
            } else {
                0
            },
            source,
        }
    }

    pub(crate) fn next_line(&mut self) -> Option<Line<'a>> {
        loop {
            let rest = self.source.get(self.index..)?;
            if rest.is_empty() {
                return None;
            }
            let (raw, advance) = match rest.find('\n') {
                Some(newline) => (rest.get(..newline)?, newline + 1),
                None => (rest, rest.len()),
            };
            let start = self.index + (raw.len() - raw.trim_start().len());
            self.index += advance;
            self.line += 1;

            let text = raw.trim();
            if text.is_empty() {
                continue;
            }
            return Some(Line {
                text,
                number: self.line,
                span: start..start + text.len(),
            });
        }
    }

    pub(crate) fn err_at_end(&self, kind: ChartParseErrorKind) -> ChartParseError {
        ChartParseError {
            kind,
            line: self.line,
            span: self.source.len()..self.source.len(),
        }
    }
}
