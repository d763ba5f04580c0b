//! Tests for `fretline::points`.

mod properties;

use fretline::prelude::*;
use pretty_assertions::assert_eq;

use crate::tempo::assert_time_close;

fn generate_with(
    notes: Vec<Note>,
    phrases: Vec<BoostPhrase>,
    tempos: Vec<TempoEvent>,
    resolution: i32,
    config: PointConfig,
) -> PointSet {
    let resolution = Resolution::new(resolution).expect("positive resolution");
    let track = NoteTrack::new(notes, phrases, resolution);
    let map = TempoMap::new(vec![], tempos).expect("valid tempo map");
    let converter = TimeConverter::new(&map, resolution);
    PointSet::new(&track, &converter, &config)
}

fn generate(notes: Vec<Note>, phrases: Vec<BoostPhrase>) -> PointSet {
    generate_with(notes, phrases, vec![], 192, PointConfig::default())
}

fn positions_and_values(points: &PointSet) -> Vec<(f64, i32)> {
    points
        .iter()
        .map(|point| (point.position.value(), point.value))
        .collect()
}

#[test]
fn single_notes_score_fifty_each() {
    let points = generate(
        vec![
            Note::new(768, 0, NoteColour::Green),
            Note::new(960, 0, NoteColour::Green),
        ],
        vec![],
    );
    assert_eq!(positions_and_values(&points), vec![(4.0, 50), (5.0, 50)]);
    assert!(points.iter().all(|point| !point.is_hold_point));
}

#[test]
fn chord_scores_per_distinct_colour() {
    let points = generate(
        vec![
            Note::new(768, 0, NoteColour::Green),
            Note::new(768, 0, NoteColour::Red),
        ],
        vec![],
    );
    assert_eq!(positions_and_values(&points), vec![(4.0, 100)]);
    assert_eq!(points.points()[0].base_value, 100);
}

#[test]
fn sustain_is_subdivided() {
    let points = generate(vec![Note::new(768, 15, NoteColour::Green)], vec![]);
    let expected = [(4.0, 50), (4.0365, 1), (4.0729, 1), (4.1094, 1)];

    assert_eq!(points.len(), expected.len());
    for (point, (position, value)) in points.iter().zip(expected) {
        assert!(
            (point.position.value() - position).abs() < 1e-4,
            "expected {position}, got {}",
            point.position
        );
        assert_eq!(point.value, value);
    }
    assert_eq!(
        points.iter().map(|point| point.is_hold_point).collect::<Vec<_>>(),
        vec![false, true, true, true]
    );
}

#[test]
fn tiny_resolution_still_subdivides() {
    let points = generate_with(
        vec![Note::new(768, 2, NoteColour::Green)],
        vec![],
        vec![],
        1,
        PointConfig::default(),
    );
    assert_eq!(
        positions_and_values(&points),
        vec![(768.0, 50), (769.0, 1), (770.0, 1)]
    );
}

#[test]
fn phrase_end_grants_boost() {
    let points = generate(
        vec![Note::new(768, 0, NoteColour::Green)],
        vec![BoostPhrase::new(768, 1)],
    );
    assert!(points.points()[0].is_boost_granting);

    let points = generate(
        vec![
            Note::new(768, 0, NoteColour::Green),
            Note::new(960, 0, NoteColour::Green),
        ],
        vec![BoostPhrase::new(768, 384)],
    );
    assert_eq!(
        points
            .iter()
            .map(|point| point.is_boost_granting)
            .collect::<Vec<_>>(),
        vec![false, true]
    );
}

#[test]
fn empty_phrases_do_not_hide_later_ones() {
    let points = generate(
        vec![
            Note::new(768, 0, NoteColour::Green),
            Note::new(960, 0, NoteColour::Green),
        ],
        vec![BoostPhrase::new(0, 100), BoostPhrase::new(900, 100)],
    );
    assert_eq!(
        points
            .iter()
            .map(|point| point.is_boost_granting)
            .collect::<Vec<_>>(),
        vec![false, true]
    );
}

#[test]
fn hit_window_follows_tempo() {
    let tempos = vec![TempoEvent::new(0, 150_000), TempoEvent::new(768, 200_000)];
    let points = generate_with(
        vec![Note::new(192, 0, NoteColour::Green)],
        vec![],
        tempos.clone(),
        192,
        PointConfig::default(),
    );
    let point = points.points()[0];
    assert_time_close(Beat(0.825), point.hit_window_start, "window start");
    assert_time_close(Beat(1.175), point.hit_window_end, "window end");

    let squeezed = generate_with(
        vec![Note::new(192, 0, NoteColour::Green)],
        vec![],
        tempos.clone(),
        192,
        PointConfig::default().squeeze(0.5).expect("valid squeeze"),
    );
    let point = squeezed.points()[0];
    assert_time_close(Beat(0.9125), point.hit_window_start, "squeezed start");
    assert_time_close(Beat(1.0875), point.hit_window_end, "squeezed end");

    let points = generate_with(
        vec![
            Note::new(749, 0, NoteColour::Green),
            Note::new(787, 0, NoteColour::Red),
        ],
        vec![],
        tempos,
        192,
        PointConfig::default(),
    );
    assert!((points.points()[0].hit_window_end.value() - 4.10139).abs() < 1e-4);
    assert!((points.points()[1].hit_window_start.value() - 3.89922).abs() < 1e-4);
}

#[test]
fn video_lag_shifts_chord_points() {
    let points = generate_with(
        vec![Note::new(192, 0, NoteColour::Green)],
        vec![],
        vec![],
        192,
        PointConfig::default().video_lag(-0.2).expect("finite lag"),
    );
    let point = points.points()[0];
    assert_time_close(Beat(0.6), point.position, "position");
    assert_time_close(Beat(0.46), point.hit_window_start, "start");
    assert_time_close(Beat(0.74), point.hit_window_end, "end");
    assert_time_close(Second(-0.2), points.video_lag(), "lag");
}

#[test]
fn hold_points_have_no_window_and_no_lag() {
    let points = generate_with(
        vec![Note::new(192, 192, NoteColour::Green)],
        vec![],
        vec![],
        192,
        PointConfig::default().video_lag(0.1).expect("finite lag"),
    );
    for point in points.iter().filter(|point| point.is_hold_point) {
        assert_eq!(point.hit_window_start, point.position);
        assert_eq!(point.hit_window_end, point.position);
    }
    let first_hold = points
        .iter()
        .find(|point| point.is_hold_point)
        .expect("sustain has holds");
    assert_time_close(Beat(1.0 + 7.0 / 192.0), first_hold.position, "first hold");
}

#[test]
fn combo_multiplier_caps_at_four() {
    let notes = (0..50)
        .map(|i| Note::new(i * 192, 0, NoteColour::Green))
        .collect();
    let points = generate(notes, vec![]);
    let values: Vec<i32> = points.iter().map(|point| point.value).collect();
    assert_eq!(values[8], 50);
    assert_eq!(values[9], 100);
    assert_eq!(values[19], 150);
    assert_eq!(values[29], 200);
    assert_eq!(values[49], 200);
    assert_eq!(points.range_score(0..50), 50 * 9 + 100 * 10 + 150 * 10 + 200 * 21);
}

#[test]
fn solo_boosts_are_reported_at_solo_end() {
    let resolution = Resolution::DEFAULT;
    let track = NoteTrack::new(vec![Note::new(0, 0, NoteColour::Green)], vec![], resolution)
        .with_solos(vec![Solo {
            start: Tick(0),
            end: Tick(384),
            value: 100,
        }]);
    let converter = TimeConverter::new(&TempoMap::default(), resolution);
    let points = PointSet::new(&track, &converter, &PointConfig::default());
    assert_eq!(points.solo_boosts(), &[(Beat(2.0), 100)]);
}

#[test]
fn empty_track_has_no_points() {
    let points = generate(vec![], vec![BoostPhrase::new(0, 100)]);
    assert!(points.is_empty());
    assert_eq!(points.next_non_hold_point(0), None);
    assert_eq!(points.range_score(0..10), 0);
}
