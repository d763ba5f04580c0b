//! Reading `.chart` files.
//!
//! A `.chart` file is a list of sections:
//!
//! ```text
//! [Song]
//! {
//!   Resolution = 192
//! }
//! [ExpertSingle]
//! {
//!   768 = N 0 0
//! }
//! ```
//!
//! [`parse_chart`] splits the text into [`ChartSection`]s without interpreting them, and
//! [`song::ChartReader`] turns the sections into a tempo map and note tracks.

mod cursor;
pub mod song;

use std::{borrow::Cow, collections::HashMap, ops::Range};

use thiserror::Error;

use self::cursor::Cursor;
use crate::time::Tick;

/// What went wrong in [`parse_chart`].
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChartParseErrorKind {
    /// A section header was not enclosed in `[` and `]`.
    #[error("section header must be enclosed in square brackets")]
    MissingHeader,
    /// A section header was not followed by `{`.
    #[error("section does not open with {{")]
    MissingSectionOpener,
    /// The input ended inside a section.
    #[error("section is not closed with }}")]
    UnclosedSection,
    /// A line in a section had fewer than three tokens.
    #[error("line is incomplete")]
    IncompleteLine,
}

/// A fatal error in the section structure of a `.chart` file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[error("line {line}: {kind}")]
pub struct ChartParseError {
    /// What went wrong.
    pub kind: ChartParseErrorKind,
    /// 1-based line number where it went wrong.
    pub line: usize,
    /// Byte range in the source where it went wrong.
    pub span: Range<usize>,
}

impl ChartParseError {
    /// Gets the byte range as a `(start, end)` pair.
    #[must_use]
    pub const fn as_span(&self) -> (usize, usize) {
        (self.span.start, self.span.end)
    }
}

/// An event line, `tick = kind data...`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChartEvent {
    /// Where the event is.
    pub tick: Tick,
    /// The event type such as `N`, `S`, `B`, `TS` or `E`.
    pub kind: String,
    /// The remaining tokens joined by single spaces.
    pub data: String,
}

/// One `[Name] { ... }` block.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChartSection {
    name: String,
    key_values: HashMap<String, String>,
    events: Vec<ChartEvent>,
}

impl ChartSection {
    /// The name between the square brackets.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The value of a `key = value` line. Later lines override earlier ones.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&str> {
        self.key_values.get(key).map(String::as_str)
    }

    /// All `key = value` lines.
    #[must_use]
    pub const fn key_values(&self) -> &HashMap<String, String> {
        &self.key_values
    }

    /// Event lines in file order.
    #[must_use]
    pub fn events(&self) -> &[ChartEvent] {
        &self.events
    }

    /// Event lines of one kind in file order.
    pub fn events_of<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a ChartEvent> + 'a {
        self.events.iter().filter(move |event| event.kind == kind)
    }
}

/// The sections of a `.chart` file in file order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawChart {
    sections: Vec<ChartSection>,
}

impl RawChart {
    /// Sections in file order.
    #[must_use]
    pub fn sections(&self) -> &[ChartSection] {
        &self.sections
    }

    /// The first section called `name`.
    #[must_use]
    pub fn section(&self, name: &str) -> Option<&ChartSection> {
        self.sections.iter().find(|section| section.name == name)
    }
}

/// Decodes the bytes of a `.chart` file.
///
/// A UTF-8 or UTF-16 byte order mark selects the encoding and is removed. Without one the bytes
/// are read as UTF-8, replacing malformed sequences.
#[must_use]
pub fn decode_chart_bytes(bytes: &[u8]) -> Cow<'_, str> {
    let (encoding, bom_len) =
        encoding_rs::Encoding::for_bom(bytes).unwrap_or((encoding_rs::UTF_8, 0));
    let (text, had_errors) =
        encoding.decode_without_bom_handling(bytes.get(bom_len..).unwrap_or_default());
    if had_errors {
        log::warn!("chart is not valid {}, replaced malformed bytes", encoding.name());
    }
    text
}

/// Splits `.chart` text into sections.
///
/// A leading byte order mark, CRLF line endings, blank lines and indentation are accepted. The
/// first structural error aborts parsing.
///
/// # Errors
///
/// Returns [`ChartParseError`] if a header is not bracketed, a section does not open with `{`,
/// the input ends inside a section or a line in a section has fewer than three tokens.
///
/// # Example
///
/// ```
/// use fretline::chart::parse_chart;
///
/// let chart = parse_chart("[Song]\n{\n  Resolution = 480\n}\n")?;
/// assert_eq!(chart.section("Song").and_then(|s| s.value("Resolution")), Some("480"));
/// # Ok::<(), fretline::chart::ChartParseError>(())
/// ```
pub fn parse_chart(source: &str) -> Result<RawChart, ChartParseError> {
    let mut cursor = Cursor::new(source);
    let mut sections = vec![];

    while let Some(header) = cursor.next_line() {
        let name = header
            .text
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .ok_or_else(|| header.err(ChartParseErrorKind::MissingHeader))?;
        let opener = cursor
            .next_line()
            .ok_or_else(|| cursor.err_at_end(ChartParseErrorKind::MissingSectionOpener))?;
        if opener.text != "{" {
            return Err(opener.err(ChartParseErrorKind::MissingSectionOpener));
        }

        let mut section = ChartSection {
            name: name.to_string(),
            ..Default::default()
        };
        loop {
            let Some(line) = cursor.next_line() else {
                return Err(header.err(ChartParseErrorKind::UnclosedSection));
            };
            if line.text == "}" {
                break;
            }
            let tokens: Vec<&str> = line.text.split_whitespace().collect();
            let [key, _, kind, rest @ ..] = tokens.as_slice() else {
                return Err(line.err(ChartParseErrorKind::IncompleteLine));
            };
            match key.parse::<i32>() {
                Ok(tick) => section.events.push(ChartEvent {
                    tick: Tick(tick),
                    kind: (*kind).to_string(),
                    data: rest.join(" "),
                }),
                Err(_) => {
                    let value = std::iter::once(*kind)
                        .chain(rest.iter().copied())
                        .collect::<Vec<_>>()
                        .join(" ");
                    section.key_values.insert((*key).to_string(), value);
                }
            }
        }
        sections.push(section);
    }

    log::debug!("parsed {} chart sections", sections.len());
    Ok(RawChart { sections })
}
