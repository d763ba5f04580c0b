//! The tempo map of a chart: tempo changes and time signature changes, keyed by tick.
//!
//! `converter` turns the map into conversions between beats, seconds and measures, and `rows`
//! groups measures into rows for rendering collaborators.

pub mod converter;
pub mod rows;

use thiserror::Error;

use crate::time::Tick;

/// An error occurred when building a [`TempoMap`].
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TempoMapError {
    /// A tempo change had zero or negative speed.
    #[error("tempo at {tick} must be positive, but got {milli_bpm} milli-BPM")]
    NonPositiveTempo {
        /// Where the tempo change was.
        tick: Tick,
        /// The rejected value.
        milli_bpm: i64,
    },
    /// A time signature had a zero or negative part.
    #[error("time signature at {tick} must be positive/positive, but got {numerator}/{denominator}")]
    NonPositiveTimeSignature {
        /// Where the time signature change was.
        tick: Tick,
        /// The rejected numerator.
        numerator: i32,
        /// The rejected denominator.
        denominator: i32,
    },
    /// A practice speed was outside of `5..=5000` percent or not a multiple of 5.
    #[error("speed must be a multiple of 5 in 5..=5000 percent, but got {0}")]
    UnsupportedSpeed(i64),
}

/// A tempo, stored in thousandths of a beat per minute (`120000` is 120 BPM).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tempo(i64);

impl Tempo {
    /// 120 BPM, which is 500000 microseconds per quarter note.
    pub const DEFAULT: Self = Self(120_000);

    /// Creates a tempo from thousandths of a beat per minute, the unit of `.chart` `B` events.
    #[must_use]
    pub const fn from_milli_bpm(milli_bpm: i64) -> Self {
        Self(milli_bpm)
    }

    /// Creates a tempo from microseconds per quarter note, the unit of MIDI tempo events.
    ///
    /// The result is rounded to the nearest milli-BPM. A non-positive input yields a zero tempo,
    /// which [`TempoMap::new`] rejects.
    #[must_use]
    pub const fn from_micros_per_quarter(micros: i64) -> Self {
        const MICROS_MILLI_BPM: i64 = 60_000_000_000;
        if micros <= 0 {
            return Self(0);
        }
        Self((MICROS_MILLI_BPM + micros / 2) / micros)
    }

    /// Gets the tempo in milli-BPM.
    #[must_use]
    pub const fn milli_bpm(self) -> i64 {
        self.0
    }

    /// Gets the tempo in beats per minute.
    #[must_use]
    pub fn bpm(self) -> f64 {
        self.0 as f64 / 1000.0
    }
}

impl Default for Tempo {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A tempo change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TempoEvent {
    /// Where the tempo takes effect.
    pub tick: Tick,
    /// The new tempo.
    pub tempo: Tempo,
}

impl TempoEvent {
    /// Creates a tempo change from a tick and a milli-BPM value.
    #[must_use]
    pub const fn new(tick: i32, milli_bpm: i64) -> Self {
        Self {
            tick: Tick(tick),
            tempo: Tempo::from_milli_bpm(milli_bpm),
        }
    }
}

/// A time signature change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeSignature {
    /// Where the time signature takes effect.
    pub tick: Tick,
    /// Number of beats in a measure.
    pub numerator: i32,
    /// Note value of one beat.
    pub denominator: i32,
}

impl TimeSignature {
    /// Creates a time signature change.
    #[must_use]
    pub const fn new(tick: i32, numerator: i32, denominator: i32) -> Self {
        Self {
            tick: Tick(tick),
            numerator,
            denominator,
        }
    }

    /// Length of one measure in quarter notes.
    #[must_use]
    pub fn beat_rate(&self) -> f64 {
        const BASE_BEAT_RATE: f64 = 4.0;
        BASE_BEAT_RATE * f64::from(self.numerator) / f64::from(self.denominator)
    }

    /// Length of one beat of this signature in quarter notes.
    #[must_use]
    pub fn beat_length(&self) -> f64 {
        4.0 / f64::from(self.denominator)
    }
}

/// Tempo changes and time signature changes of a chart.
///
/// Both lists are sorted by tick, never hold two entries at the same tick, and are never
/// empty: a 120 BPM tempo and a 4/4 signature are present at tick 0 unless the chart overrides
/// them.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TempoMap {
    time_sigs: Vec<TimeSignature>,
    tempos: Vec<TempoEvent>,
}

impl TempoMap {
    /// Creates a tempo map from unsorted changes.
    ///
    /// Changes are sorted stably by tick. When several changes share a tick the later one in the
    /// input wins.
    ///
    /// # Errors
    ///
    /// Returns [`TempoMapError`] if any tempo is not positive or any time signature has a
    /// non-positive part.
    pub fn new(
        time_sigs: Vec<TimeSignature>,
        tempos: Vec<TempoEvent>,
    ) -> Result<Self, TempoMapError> {
        if let Some(bad) = tempos.iter().find(|event| event.tempo.milli_bpm() <= 0) {
            return Err(TempoMapError::NonPositiveTempo {
                tick: bad.tick,
                milli_bpm: bad.tempo.milli_bpm(),
            });
        }
        if let Some(bad) = time_sigs
            .iter()
            .find(|ts| ts.numerator <= 0 || ts.denominator <= 0)
        {
            return Err(TempoMapError::NonPositiveTimeSignature {
                tick: bad.tick,
                numerator: bad.numerator,
                denominator: bad.denominator,
            });
        }

        let tempos = dedup_by_tick(
            tempos,
            |event| event.tick,
            TempoEvent {
                tick: Tick::ZERO,
                tempo: Tempo::DEFAULT,
            },
        );
        let time_sigs = dedup_by_tick(time_sigs, |ts| ts.tick, TimeSignature::new(0, 4, 4));
        Ok(Self { time_sigs, tempos })
    }

    /// Time signature changes, sorted by tick.
    #[must_use]
    pub fn time_sigs(&self) -> &[TimeSignature] {
        &self.time_sigs
    }

    /// Tempo changes, sorted by tick.
    #[must_use]
    pub fn tempos(&self) -> &[TempoEvent] {
        &self.tempos
    }

    /// The time signature in effect at `tick`, falling back to 4/4 before the first change.
    #[must_use]
    pub fn time_sig_at(&self, tick: Tick) -> TimeSignature {
        let pos = self.time_sigs.partition_point(|ts| ts.tick <= tick);
        pos.checked_sub(1)
            .and_then(|i| self.time_sigs.get(i))
            .copied()
            .unwrap_or_else(|| TimeSignature::new(0, 4, 4))
    }

    /// Returns the tempo map played at `speed` percent, where 100 is normal speed.
    ///
    /// Tempos are scaled with integer arithmetic, time signatures are unaffected.
    ///
    /// # Errors
    ///
    /// Returns [`TempoMapError::UnsupportedSpeed`] if `speed` is outside of `5..=5000` or not a
    /// multiple of 5, and [`TempoMapError::NonPositiveTempo`] if a tempo rounds down to zero.
    pub fn speedup(&self, speed: i64) -> Result<Self, TempoMapError> {
        const DEFAULT_SPEED: i64 = 100;
        const MIN_SPEED: i64 = 5;
        const MAX_SPEED: i64 = 5000;

        if !(MIN_SPEED..=MAX_SPEED).contains(&speed) || speed % MIN_SPEED != 0 {
            return Err(TempoMapError::UnsupportedSpeed(speed));
        }
        let tempos = self
            .tempos
            .iter()
            .map(|event| {
                let milli_bpm = event.tempo.milli_bpm().saturating_mul(speed) / DEFAULT_SPEED;
                if milli_bpm <= 0 {
                    return Err(TempoMapError::NonPositiveTempo {
                        tick: event.tick,
                        milli_bpm,
                    });
                }
                Ok(TempoEvent {
                    tick: event.tick,
                    tempo: Tempo::from_milli_bpm(milli_bpm),
                })
            })
            .collect::<Result<_, _>>()?;
        Ok(Self {
            time_sigs: self.time_sigs.clone(),
            tempos,
        })
    }
}

impl Default for TempoMap {
    fn default() -> Self {
        Self {
            time_sigs: vec![TimeSignature::new(0, 4, 4)],
            tempos: vec![TempoEvent {
                tick: Tick::ZERO,
                tempo: Tempo::DEFAULT,
            }],
        }
    }
}

/// Sorts by tick, keeps the last entry for each tick and puts `default` at tick 0 when the
/// first change is later than that.
fn dedup_by_tick<T: Copy>(mut items: Vec<T>, tick: impl Fn(&T) -> Tick, default: T) -> Vec<T> {
    items.sort_by_key(|item| tick(item));

    let mut deduped: Vec<T> = Vec::with_capacity(items.len() + 1);
    for item in items {
        match deduped.last_mut() {
            Some(last) if tick(last) == tick(&item) => *last = item,
            _ => deduped.push(item),
        }
    }
    if deduped.first().is_none_or(|first| tick(first) > Tick::ZERO) {
        deduped.insert(0, default);
    }
    deduped
}
