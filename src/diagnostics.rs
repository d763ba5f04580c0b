//! Fancy diagnostics support using `ariadne`.
//!
//! This module converts [`ChartParseError`](crate::chart::ChartParseError), which carries the
//! byte span of the offending line, into an `ariadne::Report`. Ariadne computes rows and columns
//! from the span for display.
//!
//! # Usage Example
//!
//! ```rust
//! # #[cfg(feature = "diagnostics")]
//! # {
//! use fretline::{chart::parse_chart, diagnostics::emit_chart_parse_error};
//!
//! let source = "[Song]\n{\n  Resolution\n}\n";
//! if let Err(error) = parse_chart(source) {
//!     emit_chart_parse_error("song.chart", source, &error);
//! }
//! # }
//! ```

#[cfg(feature = "diagnostics")]
use ariadne::{Color, Label, Report, ReportKind, Source};

#[cfg(feature = "diagnostics")]
use crate::chart::{ChartParseError, ChartParseErrorKind};

/// Simple source container that holds the filename and source text.
/// Ariadne will automatically handle row/column calculations from byte offsets.
///
/// # Usage Example
///
/// ```rust
/// use fretline::diagnostics::SimpleSource;
///
/// let source_text = "[Song]\n{\n}\n";
/// let source = SimpleSource::new("song.chart", source_text);
///
/// assert_eq!(source.text(), source_text);
/// assert_eq!(source.name(), "song.chart");
/// ```
pub struct SimpleSource<'a> {
    /// Name of the source file.
    name: &'a str,
    /// Source text content.
    text: &'a str,
}

impl<'a> SimpleSource<'a> {
    /// Create a new source container instance.
    #[must_use]
    pub const fn new(name: &'a str, text: &'a str) -> Self {
        Self { name, text }
    }

    /// Get source text content.
    #[must_use]
    pub const fn text(&self) -> &'a str {
        self.text
    }

    /// Get source file name.
    #[must_use]
    pub const fn name(&self) -> &'a str {
        self.name
    }
}

/// Trait for converting positioned errors to `ariadne::Report`.
#[cfg(feature = "diagnostics")]
pub trait ToAriadne {
    /// Convert error to ariadne Report.
    ///
    /// # Parameters
    /// * `src` - Source file container (used for filename, ariadne handles row/column calculation)
    fn to_report<'a>(&self, src: &SimpleSource<'a>)
    -> Report<'a, (String, std::ops::Range<usize>)>;
}

#[cfg(feature = "diagnostics")]
impl ToAriadne for ChartParseError {
    fn to_report<'a>(
        &self,
        src: &SimpleSource<'a>,
    ) -> Report<'a, (String, std::ops::Range<usize>)> {
        let (start, end) = self.as_span();
        let hint = match self.kind {
            ChartParseErrorKind::MissingHeader => "expected `[SectionName]`",
            ChartParseErrorKind::MissingSectionOpener => "expected `{` on the next line",
            ChartParseErrorKind::UnclosedSection => "this section has no closing `}`",
            ChartParseErrorKind::IncompleteLine => "expected `key = value`",
        };
        let filename = src.name().to_string();
        Report::build(ReportKind::Error, (filename.clone(), start..end))
            .with_message(format!("chart: {}", self.kind))
            .with_label(
                Label::new((filename, start..end))
                    .with_message(hint)
                    .with_color(Color::Red),
            )
            .finish()
    }
}

/// Convenience method: render a `ChartParseError` to stderr.
///
/// # Parameters
/// * `name` - Name of the source file, used for display in diagnostic information
/// * `source` - Complete chart source text
/// * `error` - The error to display
#[cfg(feature = "diagnostics")]
pub fn emit_chart_parse_error(name: &str, source: &str, error: &ChartParseError) {
    let simple = SimpleSource::new(name, source);
    let report = error.to_report(&simple);
    if let Err(io_error) = report.eprint((name.to_string(), Source::from(source))) {
        log::warn!("failed to print diagnostics: {io_error}");
    }
}

/// Collect `ariadne::Report` instances for a list of `ChartParseError` without printing.
///
/// This is useful in tests to verify diagnostics can be generated while keeping test output clean.
#[cfg(feature = "diagnostics")]
#[must_use]
pub fn collect_chart_reports<'a>(
    name: &'a str,
    source: &'a str,
    errors: impl IntoIterator<Item = &'a ChartParseError>,
) -> Vec<Report<'a, (String, std::ops::Range<usize>)>> {
    let simple = SimpleSource::new(name, source);
    errors.into_iter().map(|e| e.to_report(&simple)).collect()
}
