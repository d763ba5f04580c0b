//! Tests for reading `.chart` files end to end.

use fretline::prelude::*;
use pretty_assertions::assert_eq;

use crate::tempo::assert_time_close;

const SONG: &str = "\u{feff}[Song]\r
{\r
  Name = \"Through the Frets\"\r
  Artist = \"Nobody\"\r
  Resolution = 192\r
}\r
[SyncTrack]\r
{\r
  0 = TS 4\r
  0 = B 120000\r
  768 = B 240000\r
}\r
[Events]\r
{\r
  0 = E \"section Intro\"\r
}\r
[ExpertSingle]\r
{\r
  768 = N 0 0\r
  768 = N 1 0\r
  768 = S 2 192\r
  768 = E solo\r
  960 = N 2 15\r
  1000 = N 3 0\r
  1000 = N 5 0\r
  1100 = E soloend\r
}\r
[EasyDoubleBass]\r
{\r
  0 = N 0 0\r
}\r
";

fn read_song(source: &str) -> Result<ChartSong, SongError> {
    let chart = parse_chart(source).expect("well formed chart");
    ChartReader::default().read(&chart)
}

#[test]
fn chart_to_points() {
    let song = read_song(SONG).expect("readable chart");
    assert_eq!(song.name(), Some("Through the Frets"));
    assert_eq!(song.artist(), Some("Nobody"));
    assert_eq!(song.charter(), None);
    assert_eq!(song.instruments(), vec![Instrument::Guitar, Instrument::Bass]);
    assert_eq!(song.difficulties(Instrument::Bass), vec![Difficulty::Easy]);

    let track = song
        .track(Instrument::Guitar, Difficulty::Expert)
        .expect("expert guitar exists");
    assert_eq!(track.solos().len(), 1);
    assert_eq!(track.solos()[0].value, 300);
    // The forced flag at 1000 turns its natural HOPO into a strum.
    assert_eq!(
        track.chord_kinds(),
        vec![ChordKind::Strum, ChordKind::Strum, ChordKind::Strum]
    );

    let converter = TimeConverter::new(song.tempo_map(), song.resolution());
    let points = PointSet::new(track, &converter, &PointConfig::default());
    let summary: Vec<_> = points
        .iter()
        .map(|point| (point.value, point.is_hold_point, point.is_boost_granting))
        .collect();
    assert_eq!(
        summary,
        vec![
            (100, false, true),
            (50, false, false),
            (1, true, false),
            (1, true, false),
            (1, true, false),
            (50, false, false),
        ]
    );
    assert_eq!(points.solo_boosts().len(), 1);

    // 768 ticks at 120 BPM, then 232 ticks at 240 BPM.
    let last = points.points()[5];
    assert_time_close(
        Second(2.0 + 232.0 / 192.0 * 0.25),
        converter.beats_to_seconds(last.position),
        "last chord",
    );
}

#[test]
fn phrase_reaching_past_the_last_tick_still_grants() {
    let song = read_song(
        "[ExpertSingle]\n{\n  100 = N 0 0\n  100 = S 2 2147483647\n  200 = N 1 0\n}\n",
    )
    .expect("readable chart");
    let track = song
        .track(Instrument::Guitar, Difficulty::Expert)
        .expect("expert guitar exists");
    assert_eq!(track.boost_phrases()[0].end(), Tick(i32::MAX));

    let converter = TimeConverter::new(song.tempo_map(), song.resolution());
    let points = PointSet::new(track, &converter, &PointConfig::default());
    assert!(!points.points()[0].is_boost_granting);
    assert!(points.points()[1].is_boost_granting);
    assert!(points.iter().all(|point| point.position >= Beat::ZERO));
}

#[test]
fn solos_are_skipped_when_disabled() {
    let chart = parse_chart(SONG).expect("well formed chart");
    let song = ChartReader::new()
        .parse_solos(false)
        .read(&chart)
        .expect("readable chart");
    let track = song
        .track(Instrument::Guitar, Difficulty::Expert)
        .expect("expert guitar exists");
    assert!(track.solos().is_empty());
}

#[test]
fn hopo_threshold_sets_track_gap() {
    let chart = parse_chart(SONG).expect("well formed chart");
    let song = ChartReader::new()
        .hopo_threshold(HopoThreshold::HopoFrequency(Tick(300)))
        .read(&chart)
        .expect("readable chart");
    let track = song
        .track(Instrument::Guitar, Difficulty::Expert)
        .expect("expert guitar exists");
    assert_eq!(track.max_hopo_gap(), Tick(300));
    // The chord at 960 is now close enough to be a natural HOPO.
    assert_eq!(
        track.chord_kinds(),
        vec![ChordKind::Strum, ChordKind::Hopo, ChordKind::Strum]
    );
}

#[test]
fn decodes_utf16_charts() {
    let mut bytes = vec![0xff, 0xfe];
    bytes.extend(
        "[Song]\n{\n  Resolution = 480\n}\n"
            .encode_utf16()
            .flat_map(u16::to_le_bytes),
    );
    let text = decode_chart_bytes(&bytes);
    let chart = parse_chart(&text).expect("well formed chart");
    assert_eq!(
        chart.section("Song").and_then(|song| song.value("Resolution")),
        Some("480")
    );
}

#[test]
fn structural_errors_point_at_the_line() {
    let source = "[Song]\n{\n  Resolution = 192\n}\nExpertSingle\n{\n}\n";
    let error = parse_chart(source).expect_err("header without brackets");
    assert_eq!(error.kind, ChartParseErrorKind::MissingHeader);
    assert_eq!(error.line, 5);
    assert_eq!(&source[error.span.clone()], "ExpertSingle");

    let error = parse_chart("[Song]\n{\n  Resolution = 192\n").expect_err("unclosed");
    assert_eq!(error.kind, ChartParseErrorKind::UnclosedSection);
    assert_eq!(error.line, 1);
}

#[test]
fn reader_errors() {
    assert_eq!(
        read_song("[Song]\n{\n  Resolution = 192\n}\n"),
        Err(SongError::NoNoteTracks)
    );
    assert!(matches!(
        read_song("[Song]\n{\n  Resolution = 0\n}\n[ExpertSingle]\n{\n  0 = N 0 0\n}\n"),
        Err(SongError::Config(ConfigError::NonPositiveResolution(0)))
    ));
    assert!(matches!(
        read_song("[SyncTrack]\n{\n  0 = TS 4 40\n}\n[ExpertSingle]\n{\n  0 = N 0 0\n}\n"),
        Err(SongError::InvalidTimeSignatureDenominator { exponent: 40, .. })
    ));
    assert!(matches!(
        read_song("[SyncTrack]\n{\n  0 = B 0\n}\n[ExpertSingle]\n{\n  0 = N 0 0\n}\n"),
        Err(SongError::TempoMap(TempoMapError::NonPositiveTempo { .. }))
    ));
    assert!(matches!(
        read_song("[ExpertSingle]\n{\n  0 = N green 0\n}\n"),
        Err(SongError::MalformedEvent { .. })
    ));
}

#[test]
fn song_converts_into_crate_error() {
    fn read(source: &str) -> fretline::Result<ChartSong> {
        let chart = parse_chart(source)?;
        Ok(ChartReader::new().read(&chart)?)
    }
    assert!(matches!(
        read("Song]\n"),
        Err(fretline::Error::ChartParse(_))
    ));
    assert!(matches!(
        read("[Song]\n{\n}\n"),
        Err(fretline::Error::Song(SongError::NoNoteTracks))
    ));
}

#[cfg(feature = "serde")]
#[test]
fn points_serialize_with_serde() {
    let song = read_song(SONG).expect("readable chart");
    let track = song
        .track(Instrument::Guitar, Difficulty::Expert)
        .expect("expert guitar exists");
    let converter = TimeConverter::new(song.tempo_map(), song.resolution());
    let points = PointSet::new(track, &converter, &PointConfig::default());

    let json = serde_json::to_string(&points).expect("serializable");
    let back: PointSet = serde_json::from_str(&json).expect("deserializable");
    assert_eq!(back, points);
}

#[cfg(feature = "diagnostics")]
#[test]
fn diagnostics_report_parse_errors() {
    use fretline::diagnostics::collect_chart_reports;

    let source = "[Song]\n{\n  Resolution\n}\n";
    let error = parse_chart(source).expect_err("incomplete line");
    let reports = collect_chart_reports("song.chart", source, [&error]);
    assert_eq!(reports.len(), 1);
}
