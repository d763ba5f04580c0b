//! Scoring points of a note track.
//!
//! Every chord becomes one [`Point`] and every sustain is cut into hold points at a fixed tick
//! step. Each point carries its hit window on the beat axis, so later stages can reason about
//! which points a player may hit together without converting times again.

pub mod track;

use std::ops::Range;

use itertools::Itertools;

use self::track::{Note, NoteColour, NoteTrack};
use crate::{
    config::PointConfig,
    tempo::converter::TimeConverter,
    time::{Beat, Second, Tick},
};

/// Score of one distinct colour in a chord, before the multiplier.
pub const NOTE_VALUE: i32 = 50;
/// Score of one hold point, before the multiplier.
pub const HOLD_VALUE: i32 = 1;
/// Sustains are subdivided into this many hold points per quarter note, at most.
pub const HOLD_POINTS_PER_BEAT: i32 = 25;

/// The combo multiplier after `chord_count` chords, counting from 1.
#[must_use]
pub const fn combo_multiplier(chord_count: usize) -> i32 {
    const COMBO_STEP: usize = 10;
    const MAX_EXTRA: usize = 3;

    let extra = chord_count / COMBO_STEP;
    let extra = if extra < MAX_EXTRA { extra } else { MAX_EXTRA };
    1 + extra as i32
}

/// One scoring opportunity.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    /// Where the point is, after the video lag shift.
    pub position: Beat,
    /// Earliest beat at which the point can be hit.
    pub hit_window_start: Beat,
    /// Latest beat at which the point can be hit.
    pub hit_window_end: Beat,
    /// Score including the combo multiplier.
    pub value: i32,
    /// Score before the combo multiplier.
    pub base_value: i32,
    /// Whether the point is a sustain subdivision.
    pub is_hold_point: bool,
    /// Whether hitting the point completes a boost phrase.
    pub is_boost_granting: bool,
}

/// The ordered points of one track, with its solo bonuses.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PointSet {
    points: Vec<Point>,
    colours: Vec<String>,
    solo_boosts: Vec<(Beat, i32)>,
    video_lag: Second,
}

impl PointSet {
    /// Generates the points of `track`.
    ///
    /// # Example
    ///
    /// ```
    /// use fretline::prelude::*;
    ///
    /// let resolution = Resolution::new(192)?;
    /// let track = NoteTrack::new(
    ///     vec![Note::new(768, 0, NoteColour::Green), Note::new(768, 0, NoteColour::Red)],
    ///     vec![],
    ///     resolution,
    /// );
    /// let converter = TimeConverter::new(&TempoMap::default(), resolution);
    /// let points = PointSet::new(&track, &converter, &PointConfig::default());
    /// assert_eq!(points.len(), 1);
    /// assert_eq!(points.points()[0].value, 100);
    /// # Ok::<(), fretline::Error>(())
    /// ```
    #[must_use]
    pub fn new(track: &NoteTrack, converter: &TimeConverter, config: &PointConfig) -> Self {
        let resolution = track.resolution();
        let step = Tick((resolution.get() / HOLD_POINTS_PER_BEAT).max(1));
        let chords: Vec<&[Note]> = track.chords().collect();
        let mut phrases = track.boost_phrases().iter().peekable();
        let mut points: Vec<(Point, String)> = Vec::with_capacity(chords.len());

        for (i, chord) in chords.iter().enumerate() {
            let Some(first) = chord.first() else {
                continue;
            };
            let tick = first.tick;
            let multiplier = combo_multiplier(i + 1);
            let base_value = NOTE_VALUE * chord.iter().map(|note| note.colour).unique().count() as i32;

            while phrases.next_if(|phrase| phrase.end() <= tick).is_some() {}
            let next_tick = chords
                .get(i + 1)
                .and_then(|next| next.first())
                .map(|next| next.tick);
            let is_boost_granting = phrases.peek().is_some_and(|phrase| {
                phrase.contains(tick) && next_tick.is_none_or(|next| !phrase.contains(next))
            });

            let chord_colours = colour_set(chord.iter().map(|note| note.colour));
            let seconds = converter.beats_to_seconds(resolution.to_beats(tick)) + config.lag();
            let point = Point {
                position: converter.seconds_to_beats(seconds),
                hit_window_start: converter.seconds_to_beats(seconds - config.early_half_width()),
                hit_window_end: converter.seconds_to_beats(seconds + config.late_half_width()),
                value: base_value * multiplier,
                base_value,
                is_hold_point: false,
                is_boost_granting,
            };

            let sustains: Vec<(Tick, String)> =
                if chord.iter().map(|note| note.sustain).all_equal() {
                    vec![(first.sustain, chord_colours.clone())]
                } else {
                    chord
                        .iter()
                        .map(|note| (note.sustain, note.colour.symbol().to_owned()))
                        .collect()
                };
            points.push((point, chord_colours));
            for (sustain, colours) in sustains
                .into_iter()
                .filter(|(sustain, _)| *sustain > Tick::ZERO)
            {
                let count = num::Integer::div_ceil(&sustain.value(), &step.value());
                points.extend((1..=count).map(|k| {
                    let beat = resolution.to_beats(tick + Tick(k.saturating_mul(step.value())));
                    let hold = Point {
                        position: beat,
                        hit_window_start: beat,
                        hit_window_end: beat,
                        value: HOLD_VALUE * multiplier,
                        base_value: HOLD_VALUE,
                        is_hold_point: true,
                        is_boost_granting: false,
                    };
                    (hold, colours.clone())
                }));
            }
        }

        points.sort_by(|(a, _), (b, _)| {
            a.position
                .total_cmp(&b.position)
                .then(a.is_hold_point.cmp(&b.is_hold_point))
        });
        let (points, colours): (Vec<_>, Vec<_>) = points.into_iter().unzip();

        let solo_boosts = track
            .solos()
            .iter()
            .map(|solo| (resolution.to_beats(solo.end), solo.value))
            .collect();

        log::debug!(
            "generated {} points from {} chords at step {}",
            points.len(),
            chords.len(),
            step
        );

        Self {
            points,
            colours,
            solo_boosts,
            video_lag: config.lag(),
        }
    }

    /// Points in ascending beat order.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Iterates the points in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Point> {
        self.points.iter()
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether there are no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Index of the first point at or after `index` which is not a hold point.
    #[must_use]
    pub fn next_non_hold_point(&self, index: usize) -> Option<usize> {
        self.find_from(index, |point| !point.is_hold_point)
    }

    /// Index of the first point at or after `index` which completes a boost phrase.
    #[must_use]
    pub fn next_boost_granting_point(&self, index: usize) -> Option<usize> {
        self.find_from(index, |point| point.is_boost_granting)
    }

    /// Colours of the notes behind the point at `index`, like `GR` for a green-red chord.
    ///
    /// Hold points report the colours of the sustain they subdivide.
    #[must_use]
    pub fn colour_set(&self, index: usize) -> Option<&str> {
        self.colours.get(index).map(String::as_str)
    }

    /// Total value of the points in `range`, clamped to the valid indices.
    #[must_use]
    pub fn range_score(&self, range: Range<usize>) -> i64 {
        let end = range.end.min(self.points.len());
        let start = range.start.min(end);
        self.points
            .get(start..end)
            .unwrap_or_default()
            .iter()
            .map(|point| i64::from(point.value))
            .sum()
    }

    /// Solo bonuses as the beat where each solo ends and its value.
    #[must_use]
    pub fn solo_boosts(&self) -> &[(Beat, i32)] {
        &self.solo_boosts
    }

    /// The video lag the points were generated with.
    #[must_use]
    pub const fn video_lag(&self) -> Second {
        self.video_lag
    }

    fn find_from(&self, index: usize, predicate: impl Fn(&Point) -> bool) -> Option<usize> {
        self.points
            .get(index..)?
            .iter()
            .position(predicate)
            .map(|offset| index + offset)
    }
}

fn colour_set(colours: impl Iterator<Item = NoteColour>) -> String {
    colours.sorted().dedup().map(NoteColour::symbol).collect()
}

impl<'a> IntoIterator for &'a PointSet {
    type Item = &'a Point;
    type IntoIter = std::slice::Iter<'a, Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
