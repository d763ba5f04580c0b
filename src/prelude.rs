//! Prelude module for the crate.
//!
//! This module re-exports the types needed to read a chart and generate its points.
//! You can use `use fretline::prelude::*;` to import them at once.

#[cfg(feature = "diagnostics")]
pub use crate::diagnostics::{SimpleSource, ToAriadne, emit_chart_parse_error};

pub use crate::{
    chart::{
        ChartEvent, ChartParseError, ChartParseErrorKind, ChartSection, RawChart,
        decode_chart_bytes, parse_chart,
        song::{ChartReader, ChartSong, Difficulty, Instrument, SongError},
    },
    config::{ConfigError, PointConfig, Resolution, Squeeze},
    hopo::HopoThreshold,
    points::{
        Point, PointSet, combo_multiplier,
        track::{BoostPhrase, ChordKind, Note, NoteColour, NoteFlags, NoteTrack, Solo},
    },
    tempo::{
        Tempo, TempoEvent, TempoMap, TempoMapError, TimeSignature,
        converter::TimeConverter,
        rows::{MeasureGrid, MeasureRow, MeasureSpan},
    },
    time::{Beat, Measure, Second, Tick},
};
