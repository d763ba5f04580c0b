use fretline::prelude::*;
use proptest::prelude::*;

fn colour() -> impl Strategy<Value = NoteColour> {
    prop_oneof![
        Just(NoteColour::Green),
        Just(NoteColour::Red),
        Just(NoteColour::Yellow),
        Just(NoteColour::Blue),
        Just(NoteColour::Orange),
        Just(NoteColour::Open),
    ]
}

fn notes() -> impl Strategy<Value = Vec<Note>> {
    prop::collection::vec(
        (0..5_000_i32, -10..400_i32, colour())
            .prop_map(|(tick, sustain, colour)| Note::new(tick, sustain, colour)),
        0..40,
    )
}

fn tempos() -> impl Strategy<Value = Vec<TempoEvent>> {
    prop::collection::vec(
        (0..5_000_i32, 30_000..300_000_i64)
            .prop_map(|(tick, milli_bpm)| TempoEvent::new(tick, milli_bpm)),
        0..5,
    )
}

fn generate(notes: Vec<Note>, tempos: Vec<TempoEvent>, resolution: i32, squeeze: f64) -> PointSet {
    let resolution = Resolution::new(resolution).expect("positive resolution");
    let track = NoteTrack::new(notes, vec![], resolution);
    let map = TempoMap::new(vec![], tempos).expect("valid tempo map");
    let converter = TimeConverter::new(&map, resolution);
    let config = PointConfig::default()
        .squeeze(squeeze)
        .expect("squeeze within range");
    PointSet::new(&track, &converter, &config)
}

proptest! {
    #[test]
    fn points_are_sorted(notes in notes(), tempos in tempos(), resolution in 1..480_i32) {
        let points = generate(notes, tempos, resolution, 1.0);
        for (a, b) in points.iter().zip(points.iter().skip(1)) {
            prop_assert!(a.position <= b.position, "{} before {}", a.position, b.position);
        }
    }

    #[test]
    fn windows_contain_their_point(notes in notes(), tempos in tempos(), resolution in 1..480_i32) {
        let points = generate(notes, tempos, resolution, 1.0);
        for point in &points {
            prop_assert!(point.hit_window_start <= point.position);
            prop_assert!(point.position <= point.hit_window_end);
        }
    }

    #[test]
    fn every_chord_yields_one_scored_point(notes in notes(), resolution in 1..480_i32) {
        let resolution_value = Resolution::new(resolution).expect("positive resolution");
        let chords = NoteTrack::new(notes.clone(), vec![], resolution_value).chords().count();
        let points = generate(notes, vec![], resolution, 1.0);
        prop_assert_eq!(points.iter().filter(|point| !point.is_hold_point).count(), chords);
    }

    #[test]
    fn halving_squeeze_halves_window_seconds(tick in 0..5_000_i32, tempos in tempos()) {
        let map = TempoMap::new(vec![], tempos.clone()).expect("valid tempo map");
        let converter = TimeConverter::new(&map, Resolution::DEFAULT);
        let width = |point: &Point| {
            converter.beats_to_seconds(point.hit_window_end).value()
                - converter.beats_to_seconds(point.hit_window_start).value()
        };

        let full = generate(vec![Note::new(tick, 0, NoteColour::Green)], tempos.clone(), 192, 1.0);
        let half = generate(vec![Note::new(tick, 0, NoteColour::Green)], tempos, 192, 0.5);
        let (full, half) = (width(&full.points()[0]), width(&half.points()[0]));
        prop_assert!((full / 2.0 - half).abs() < 1e-9, "{full} vs {half}");
    }

    #[test]
    fn only_the_last_chord_of_a_phrase_grants_boost(
        notes in notes(),
        start in 0..5_000_i32,
        length in 1..2_000_i32,
    ) {
        let resolution = Resolution::DEFAULT;
        let phrase = BoostPhrase::new(start, length);
        let last_in_phrase = notes
            .iter()
            .map(|note| note.tick)
            .filter(|tick| phrase.contains(*tick))
            .max();
        let track = NoteTrack::new(notes, vec![phrase], resolution);
        let converter = TimeConverter::new(&TempoMap::default(), resolution);
        let points = PointSet::new(&track, &converter, &PointConfig::default());

        let granting: Vec<&Point> = points
            .iter()
            .filter(|point| point.is_boost_granting)
            .collect();
        match last_in_phrase {
            Some(tick) => {
                prop_assert_eq!(granting.len(), 1);
                let expected = resolution.to_beats(tick).value();
                prop_assert!((granting[0].position.value() - expected).abs() < 1e-9);
                prop_assert!(!granting[0].is_hold_point);
            }
            None => prop_assert!(granting.is_empty()),
        }
    }

    #[test]
    fn sustains_split_into_ceil_length_over_step(
        tick in 0..5_000_i32,
        sustain in 1..500_i32,
        resolution in 1..960_i32,
    ) {
        let step = (resolution / 25).max(1);
        let note = Note::new(tick, sustain, NoteColour::Yellow);
        let points = generate(vec![note], vec![], resolution, 1.0);
        let holds: Vec<&Point> = points.iter().filter(|point| point.is_hold_point).collect();
        prop_assert_eq!(holds.len() as i32, (sustain + step - 1) / step);
        prop_assert!(!holds.is_empty());
        prop_assert!(holds.iter().all(|point| point.value == 1));
    }
}
