//! Timing conversion and scoring point generation for fretted rhythm game charts.
//!
//! A chart stores everything on an integer tick axis. This crate turns that axis into beats,
//! seconds and measures, and turns a note track into the ordered list of scoring points which an
//! optimiser or a renderer consumes.
//!
//! `time` module provides the strongly typed units [`time::Tick`], [`time::Beat`],
//! [`time::Second`] and [`time::Measure`].
//!
//! `tempo` module provides [`tempo::TempoMap`], the [`tempo::converter::TimeConverter`] built
//! from it and the measure layout in [`tempo::rows`].
//!
//! `points` module provides [`points::track::NoteTrack`] and the generator of
//! [`points::PointSet`]. `hopo` module provides the maximum gap for natural hammer-ons.
//!
//! `chart` module reads `.chart` files into tempo maps and note tracks.
//!
//! In detail, our policies are:
//!
//! - Validate configuration once on construction, then treat it as total.
//! - Keep every computation a pure function of its inputs.
//! - Follow what the game does when a chart is ambiguous, and log what is ignored.
//!
//! # Example
//!
//! ```
//! use fretline::prelude::*;
//!
//! let source = "[Song]\n{\n  Resolution = 192\n}\n[SyncTrack]\n{\n  0 = B 120000\n}\n[ExpertSingle]\n{\n  768 = N 0 15\n}\n";
//! let song = ChartReader::new().read(&parse_chart(source)?)?;
//! let track = song.track(Instrument::Guitar, Difficulty::Expert).expect("expert guitar");
//! let converter = TimeConverter::new(song.tempo_map(), song.resolution());
//! let points = PointSet::new(track, &converter, &PointConfig::default());
//! assert_eq!(points.len(), 4);
//! # Ok::<(), fretline::Error>(())
//! ```

pub mod chart;
pub mod config;
pub mod diagnostics;
pub mod hopo;
pub mod points;
pub mod prelude;
pub mod tempo;
pub mod time;

use thiserror::Error;

use self::{
    chart::{ChartParseError, song::SongError},
    config::ConfigError,
    tempo::TempoMapError,
};

/// Any error raised by this crate.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A configuration value was out of range.
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    /// A tempo map could not be built.
    #[error("tempo map: {0}")]
    TempoMap(#[from] TempoMapError),
    /// A `.chart` file was structurally broken.
    #[error("chart: {0}")]
    ChartParse(#[from] ChartParseError),
    /// The sections of a `.chart` file could not be interpreted.
    #[error("song: {0}")]
    Song(#[from] SongError),
}

/// A `Result` with this crate's [`enum@Error`].
pub type Result<T> = std::result::Result<T, Error>;
