//! Conversion between beats, seconds and measures along a [`TempoMap`].

use super::{Tempo, TempoMap};
use crate::{
    config::Resolution,
    time::{Beat, Measure, Second, Tick},
};

/// Beats per measure before the first time signature.
const DEFAULT_BEAT_RATE: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq)]
struct BeatTimestamp {
    beat: Beat,
    time: Second,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct MeasureTimestamp {
    measure: Measure,
    beat: Beat,
}

/// Piecewise linear conversions between the time axes of a chart.
///
/// The tempo map splits the beat axis into segments of constant tempo and the time signatures
/// split it into segments of constant beat rate. Positions before the first change extrapolate
/// with 120 BPM and 4 beats per measure, positions after the last change extrapolate with the
/// last tempo and beat rate.
///
/// # Example
///
/// ```
/// use fretline::{
///     config::Resolution,
///     tempo::{TempoEvent, TempoMap, converter::TimeConverter},
///     time::Beat,
/// };
///
/// let map = TempoMap::new(vec![], vec![TempoEvent::new(0, 150_000), TempoEvent::new(800, 200_000)])?;
/// let converter = TimeConverter::new(&map, Resolution::new(200)?);
/// assert!((converter.beats_to_seconds(Beat(5.0)).value() - 1.9).abs() < 1e-9);
/// # Ok::<(), fretline::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TimeConverter {
    resolution: Resolution,
    beat_timestamps: Vec<BeatTimestamp>,
    measure_timestamps: Vec<MeasureTimestamp>,
    last_tempo: Tempo,
    last_beat_rate: f64,
}

impl TimeConverter {
    /// Precomputes the segment boundaries of `tempo_map` at `resolution`.
    #[must_use]
    pub fn new(tempo_map: &TempoMap, resolution: Resolution) -> Self {
        let mut beat_timestamps = Vec::with_capacity(tempo_map.tempos().len());
        let mut last_tick = Tick::ZERO;
        let mut last_tempo = Tempo::DEFAULT;
        let mut last_time = Second::ZERO;
        for event in tempo_map.tempos() {
            last_time += resolution
                .to_beats(event.tick - last_tick)
                .to_second(last_tempo.milli_bpm());
            beat_timestamps.push(BeatTimestamp {
                beat: resolution.to_beats(event.tick),
                time: last_time,
            });
            last_tempo = event.tempo;
            last_tick = event.tick;
        }

        let mut measure_timestamps = Vec::with_capacity(tempo_map.time_sigs().len());
        let mut last_tick = Tick::ZERO;
        let mut last_beat_rate = DEFAULT_BEAT_RATE;
        let mut last_measure = Measure::ZERO;
        for ts in tempo_map.time_sigs() {
            last_measure += resolution
                .to_beats(ts.tick - last_tick)
                .to_measure(last_beat_rate);
            measure_timestamps.push(MeasureTimestamp {
                measure: last_measure,
                beat: resolution.to_beats(ts.tick),
            });
            last_beat_rate = ts.beat_rate();
            last_tick = ts.tick;
        }

        Self {
            resolution,
            beat_timestamps,
            measure_timestamps,
            last_tempo,
            last_beat_rate,
        }
    }

    /// The resolution this converter was built for.
    #[must_use]
    pub const fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Converts a tick position into beats.
    #[must_use]
    pub fn ticks_to_beats(&self, tick: Tick) -> Beat {
        self.resolution.to_beats(tick)
    }

    /// Converts a beat position into seconds from tick 0.
    #[must_use]
    pub fn beats_to_seconds(&self, beats: Beat) -> Second {
        Second(piecewise(
            &self.beat_timestamps,
            beats.value(),
            |stamp| (stamp.beat.value(), stamp.time.value()),
            Beat(1.0).to_second(Tempo::DEFAULT.milli_bpm()).value(),
            Beat(1.0).to_second(self.last_tempo.milli_bpm()).value(),
        ))
    }

    /// Converts a position in seconds from tick 0 into beats.
    #[must_use]
    pub fn seconds_to_beats(&self, seconds: Second) -> Beat {
        Beat(piecewise(
            &self.beat_timestamps,
            seconds.value(),
            |stamp| (stamp.time.value(), stamp.beat.value()),
            Second(1.0).to_beat(Tempo::DEFAULT.milli_bpm()).value(),
            Second(1.0).to_beat(self.last_tempo.milli_bpm()).value(),
        ))
    }

    /// Converts a beat position into measures.
    #[must_use]
    pub fn beats_to_measures(&self, beats: Beat) -> Measure {
        Measure(piecewise(
            &self.measure_timestamps,
            beats.value(),
            |stamp| (stamp.beat.value(), stamp.measure.value()),
            Beat(1.0).to_measure(DEFAULT_BEAT_RATE).value(),
            Beat(1.0).to_measure(self.last_beat_rate).value(),
        ))
    }

    /// Converts a measure position into beats.
    #[must_use]
    pub fn measures_to_beats(&self, measures: Measure) -> Beat {
        Beat(piecewise(
            &self.measure_timestamps,
            measures.value(),
            |stamp| (stamp.measure.value(), stamp.beat.value()),
            Measure(1.0).to_beat(DEFAULT_BEAT_RATE).value(),
            Measure(1.0).to_beat(self.last_beat_rate).value(),
        ))
    }

    /// Converts a measure position into seconds from tick 0.
    #[must_use]
    pub fn measures_to_seconds(&self, measures: Measure) -> Second {
        self.beats_to_seconds(self.measures_to_beats(measures))
    }

    /// Converts a position in seconds from tick 0 into measures.
    #[must_use]
    pub fn seconds_to_measures(&self, seconds: Second) -> Measure {
        self.beats_to_measures(self.seconds_to_beats(seconds))
    }
}

/// Evaluates a monotone piecewise linear function given by its breakpoints.
///
/// `point` maps a stamp to its `(x, y)` breakpoint. `before_slope` applies left of the first
/// breakpoint and `after_slope` right of the last.
fn piecewise<T>(
    stamps: &[T],
    x: f64,
    point: impl Fn(&T) -> (f64, f64),
    before_slope: f64,
    after_slope: f64,
) -> f64 {
    let pos = stamps.partition_point(|stamp| point(stamp).0 < x);
    let prev = pos.checked_sub(1).and_then(|i| stamps.get(i)).map(&point);
    let next = stamps.get(pos).map(&point);
    match (prev, next) {
        (None, None) => x * before_slope,
        (None, Some((next_x, next_y))) => next_y - (next_x - x) * before_slope,
        (Some((prev_x, prev_y)), None) => prev_y + (x - prev_x) * after_slope,
        (Some((prev_x, prev_y)), Some((next_x, next_y))) => {
            prev_y + (next_y - prev_y) * (x - prev_x) / (next_x - prev_x)
        }
    }
}
