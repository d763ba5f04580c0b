//! Layout of the beat axis into measures and rows of at most [`MAX_BEATS_PER_ROW`] beats.

use super::{TempoMap, TimeSignature};
use crate::{
    config::Resolution,
    time::{Beat, Tick},
};

/// The widest row, in quarter notes.
pub const MAX_BEATS_PER_ROW: f64 = 16.0;

/// One measure on the beat axis.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MeasureSpan {
    /// Where the measure starts.
    pub start: Beat,
    /// Where the measure ends. Earlier than a full measure when a time signature change cuts it
    /// off.
    pub end: Beat,
    /// The time signature the measure is played in.
    pub time_sig: TimeSignature,
}

impl MeasureSpan {
    /// Length of the measure.
    #[must_use]
    pub fn length(&self) -> Beat {
        self.end - self.start
    }
}

/// A horizontal row of measures, `[start, end)` on the beat axis.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MeasureRow {
    /// Where the row starts.
    pub start: Beat,
    /// Where the row ends.
    pub end: Beat,
}

/// Measures, rows and grid lines covering a chart up to a given beat.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MeasureGrid {
    /// Every measure in order.
    pub measures: Vec<MeasureSpan>,
    /// Rows in order, covering the measures without gaps.
    pub rows: Vec<MeasureRow>,
    /// Measure starts followed by the end of the last row.
    pub measure_lines: Vec<Beat>,
    /// Beat starts inside measures, excluding the measure starts.
    pub beat_lines: Vec<Beat>,
    /// Midpoints of every beat.
    pub half_beat_lines: Vec<Beat>,
}

impl MeasureGrid {
    /// Lays out measures from beat 0 until the measure containing `end`.
    ///
    /// Signatures whose measure would be shorter than one tick are laid out one tick per measure.
    ///
    /// A time signature change which does not land on a measure boundary ends the running
    /// measure early, and the new signature counts from the change. Measures are packed greedily
    /// into rows; a measure longer than a row fills whole rows first and its remainder starts a
    /// new one.
    #[must_use]
    pub fn new(tempo_map: &TempoMap, resolution: Resolution, end: Beat) -> Self {
        let measures = measure_spans(tempo_map, resolution, end);
        let rows = pack_rows(&measures);

        let mut measure_lines = Vec::with_capacity(measures.len() + 1);
        let mut beat_lines = vec![];
        let mut half_beat_lines = vec![];
        for measure in &measures {
            measure_lines.push(measure.start);
            let beat_length = measure.time_sig.beat_length();
            for i in 0..measure.time_sig.numerator {
                let beat = measure.start + Beat(f64::from(i) * beat_length);
                if beat >= measure.end {
                    break;
                }
                if i > 0 {
                    beat_lines.push(beat);
                }
                let half = beat + Beat(beat_length / 2.0);
                if half < measure.end {
                    half_beat_lines.push(half);
                }
            }
        }
        if let Some(last) = rows.last() {
            measure_lines.push(last.end);
        }

        Self {
            measures,
            rows,
            measure_lines,
            beat_lines,
            half_beat_lines,
        }
    }
}

fn measure_spans(tempo_map: &TempoMap, resolution: Resolution, end: Beat) -> Vec<MeasureSpan> {
    // A measure is never shorter than one tick.
    let min_measure_length = resolution.to_beats(Tick(1)).value();
    let time_sigs = tempo_map.time_sigs();
    let mut spans = vec![];
    for (i, &time_sig) in time_sigs.iter().enumerate() {
        let segment_start = resolution.to_beats(time_sig.tick);
        let segment_end = time_sigs
            .get(i + 1)
            .map(|next| resolution.to_beats(next.tick));
        let measure_length = time_sig.beat_rate().max(min_measure_length);
        for n in 0_u32.. {
            let start = segment_start + Beat(measure_length * f64::from(n));
            if start > end {
                return spans;
            }
            let full_end = segment_start + Beat(measure_length * f64::from(n + 1));
            let stop = match segment_end {
                Some(segment_end) if full_end >= segment_end => segment_end,
                _ => full_end,
            };
            spans.push(MeasureSpan {
                start,
                end: stop,
                time_sig,
            });
            if segment_end.is_some_and(|segment_end| stop >= segment_end) {
                break;
            }
        }
    }
    spans
}

fn pack_rows(measures: &[MeasureSpan]) -> Vec<MeasureRow> {
    let mut rows = vec![];
    let mut current: Option<MeasureRow> = None;
    for measure in measures {
        let mut start = measure.start;
        let mut length = measure.length().value();
        if length > MAX_BEATS_PER_ROW {
            rows.extend(current.take());
            while length > MAX_BEATS_PER_ROW {
                let end = start + Beat(MAX_BEATS_PER_ROW);
                rows.push(MeasureRow { start, end });
                start = end;
                length -= MAX_BEATS_PER_ROW;
            }
        }
        let end = measure.end;
        current = match current {
            Some(row) if (end - row.start).value() <= MAX_BEATS_PER_ROW => {
                Some(MeasureRow { start: row.start, end })
            }
            Some(row) => {
                rows.push(row);
                Some(MeasureRow { start, end })
            }
            None => Some(MeasureRow { start, end }),
        };
    }
    rows.extend(current);
    rows
}
