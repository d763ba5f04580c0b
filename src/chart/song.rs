//! Interpreting the sections of a `.chart` file.

use std::collections::{BTreeMap, BTreeSet, btree_map::Entry};

use itertools::Itertools;
use thiserror::Error;

use super::{ChartEvent, ChartSection, RawChart};
use crate::{
    config::{ConfigError, Resolution},
    hopo::HopoThreshold,
    points::track::{BoostPhrase, Note, NoteColour, NoteFlags, NoteTrack, Solo},
    tempo::{Tempo, TempoEvent, TempoMap, TempoMapError, TimeSignature},
    time::Tick,
};

/// Score of one chord inside a solo.
const SOLO_NOTE_VALUE: i32 = 100;
/// `S` event type of a boost phrase.
const BOOST_PHRASE_KEY: i32 = 2;

/// An error occurred when interpreting chart sections.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SongError {
    /// The resolution or another setting was out of range.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The `[SyncTrack]` section held an invalid tempo or time signature.
    #[error(transparent)]
    TempoMap(#[from] TempoMapError),
    /// A time signature denominator exponent did not fit.
    #[error("time signature at {tick} has denominator exponent {exponent}, which is too large")]
    InvalidTimeSignatureDenominator {
        /// Where the time signature was.
        tick: Tick,
        /// The rejected exponent.
        exponent: u32,
    },
    /// An event had missing or non-numeric data.
    #[error("[{section}] event `{kind} {data}` at {tick} is malformed")]
    MalformedEvent {
        /// The section containing the event.
        section: String,
        /// Where the event was.
        tick: Tick,
        /// The event type.
        kind: String,
        /// The event data.
        data: String,
    },
    /// No section contained any note.
    #[error("chart has no notes")]
    NoNoteTracks,
}

/// Difficulty of a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Difficulty {
    /// Easy.
    Easy,
    /// Medium.
    Medium,
    /// Hard.
    Hard,
    /// Expert.
    Expert,
}

impl Difficulty {
    const ALL: [(&'static str, Self); 4] = [
        ("Easy", Self::Easy),
        ("Medium", Self::Medium),
        ("Hard", Self::Hard),
        ("Expert", Self::Expert),
    ];
}

/// Instrument of a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Instrument {
    /// Lead guitar, `Single`.
    Guitar,
    /// Co-op guitar, `DoubleGuitar`.
    GuitarCoop,
    /// Bass, `DoubleBass`.
    Bass,
    /// Rhythm guitar, `DoubleRhythm`.
    Rhythm,
    /// Five fret keys, `Keyboard`.
    Keys,
}

impl Instrument {
    const ALL: [(&'static str, Self); 5] = [
        ("Single", Self::Guitar),
        ("DoubleGuitar", Self::GuitarCoop),
        ("DoubleBass", Self::Bass),
        ("DoubleRhythm", Self::Rhythm),
        ("Keyboard", Self::Keys),
    ];
}

/// Parses a section name such as `ExpertSingle`.
fn track_key(name: &str) -> Option<(Instrument, Difficulty)> {
    Difficulty::ALL.iter().find_map(|&(prefix, difficulty)| {
        let rest = name.strip_prefix(prefix)?;
        Instrument::ALL
            .iter()
            .find(|(suffix, _)| *suffix == rest)
            .map(|&(_, instrument)| (instrument, difficulty))
    })
}

/// Song data read from a `.chart` file.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChartSong {
    name: Option<String>,
    artist: Option<String>,
    charter: Option<String>,
    resolution: Resolution,
    tempo_map: TempoMap,
    tracks: BTreeMap<(Instrument, Difficulty), NoteTrack>,
}

impl ChartSong {
    /// Song title from `[Song] Name`.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Artist from `[Song] Artist`.
    #[must_use]
    pub fn artist(&self) -> Option<&str> {
        self.artist.as_deref()
    }

    /// Charter from `[Song] Charter`.
    #[must_use]
    pub fn charter(&self) -> Option<&str> {
        self.charter.as_deref()
    }

    /// Ticks per quarter note.
    #[must_use]
    pub const fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Tempo and time signature changes.
    #[must_use]
    pub const fn tempo_map(&self) -> &TempoMap {
        &self.tempo_map
    }

    /// The track for an instrument and difficulty.
    #[must_use]
    pub fn track(&self, instrument: Instrument, difficulty: Difficulty) -> Option<&NoteTrack> {
        self.tracks.get(&(instrument, difficulty))
    }

    /// All tracks, ordered by instrument then difficulty.
    pub fn tracks(&self) -> impl Iterator<Item = (Instrument, Difficulty, &NoteTrack)> {
        self.tracks
            .iter()
            .map(|(&(instrument, difficulty), track)| (instrument, difficulty, track))
    }

    /// Instruments with at least one track.
    #[must_use]
    pub fn instruments(&self) -> Vec<Instrument> {
        self.tracks
            .keys()
            .map(|&(instrument, _)| instrument)
            .dedup()
            .collect()
    }

    /// Difficulties available for an instrument.
    #[must_use]
    pub fn difficulties(&self, instrument: Instrument) -> Vec<Difficulty> {
        self.tracks
            .keys()
            .filter(|(inst, _)| *inst == instrument)
            .map(|&(_, difficulty)| difficulty)
            .collect()
    }
}

/// Turns [`RawChart`] sections into a [`ChartSong`].
///
/// # Example
///
/// ```
/// use fretline::chart::{parse_chart, song::{ChartReader, Difficulty, Instrument}};
///
/// let chart = parse_chart("[ExpertSingle]\n{\n  768 = N 0 0\n}\n")?;
/// let song = ChartReader::new().read(&chart)?;
/// let track = song.track(Instrument::Guitar, Difficulty::Expert).expect("expert track");
/// assert_eq!(track.notes().len(), 1);
/// # Ok::<(), fretline::Error>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChartReader {
    hopo_threshold: HopoThreshold,
    parse_solos: bool,
}

impl Default for ChartReader {
    fn default() -> Self {
        Self {
            hopo_threshold: HopoThreshold::Resolution,
            parse_solos: true,
        }
    }
}

impl ChartReader {
    /// Creates a reader with the default HOPO threshold and solos enabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets how the maximum HOPO gap of every track is derived.
    #[must_use]
    pub const fn hopo_threshold(mut self, hopo_threshold: HopoThreshold) -> Self {
        self.hopo_threshold = hopo_threshold;
        self
    }

    /// Sets whether solo sections are read. Tracks have no solos when disabled.
    #[must_use]
    pub const fn parse_solos(mut self, parse_solos: bool) -> Self {
        self.parse_solos = parse_solos;
        self
    }

    /// Interprets the sections of `chart`.
    ///
    /// # Errors
    ///
    /// Returns [`SongError`] if the resolution is not positive, the sync track holds an invalid
    /// change, an event is malformed or no section holds any note.
    pub fn read(&self, chart: &RawChart) -> Result<ChartSong, SongError> {
        let song_section = chart.section("Song");
        let resolution = match song_section.and_then(|section| section.value("Resolution")) {
            Some(value) => match value.trim().parse::<i32>() {
                Ok(ticks) => Resolution::new(ticks)?,
                Err(_) => {
                    log::warn!("ignoring unparsable resolution `{value}`");
                    Resolution::DEFAULT
                }
            },
            None => Resolution::DEFAULT,
        };
        let metadata = |key: &str| {
            song_section
                .and_then(|section| section.value(key))
                .map(|value| value.trim_matches('"').to_string())
        };

        let tempo_map = match chart.section("SyncTrack") {
            Some(section) => read_sync_track(section)?,
            None => TempoMap::default(),
        };

        let max_hopo_gap = self.hopo_threshold.chart_max_hopo_gap(resolution);
        let mut tracks = BTreeMap::new();
        for section in chart.sections() {
            let Some(key) = track_key(section.name()) else {
                continue;
            };
            let Some(track) = self.read_track(section, resolution)? else {
                continue;
            };
            match tracks.entry(key) {
                Entry::Vacant(entry) => {
                    entry.insert(track.with_max_hopo_gap(max_hopo_gap));
                }
                Entry::Occupied(_) => {
                    log::debug!("ignoring repeated section [{}]", section.name());
                }
            }
        }
        if tracks.is_empty() {
            return Err(SongError::NoNoteTracks);
        }

        log::debug!(
            "read chart with {} tracks at {resolution}",
            tracks.len()
        );
        Ok(ChartSong {
            name: metadata("Name"),
            artist: metadata("Artist"),
            charter: metadata("Charter"),
            resolution,
            tempo_map,
            tracks,
        })
    }

    /// Reads one difficulty section, or `None` when it has no notes.
    fn read_track(
        &self,
        section: &ChartSection,
        resolution: Resolution,
    ) -> Result<Option<NoteTrack>, SongError> {
        const FORCE_KEY: i32 = 5;
        const TAP_KEY: i32 = 6;

        let mut notes = vec![];
        let mut forced = BTreeSet::new();
        let mut taps = BTreeSet::new();
        for event in section.events_of("N") {
            let [fret, length] = parse_ints(section, event)?;
            let colour = match fret {
                0 => NoteColour::Green,
                1 => NoteColour::Red,
                2 => NoteColour::Yellow,
                3 => NoteColour::Blue,
                4 => NoteColour::Orange,
                7 => NoteColour::Open,
                FORCE_KEY => {
                    forced.insert(event.tick);
                    continue;
                }
                TAP_KEY => {
                    taps.insert(event.tick);
                    continue;
                }
                _ => {
                    log::warn!("[{}] ignoring note fret {fret} at {}", section.name(), event.tick);
                    continue;
                }
            };
            notes.push(Note::new(event.tick.value(), length, colour));
        }
        if notes.is_empty() {
            return Ok(None);
        }
        for note in &mut notes {
            note.flags = NoteFlags {
                forced: !taps.contains(&note.tick) && forced.contains(&note.tick),
                tap: taps.contains(&note.tick),
            };
        }

        let mut phrases = vec![];
        for event in section.events_of("S") {
            let [key, length] = parse_ints(section, event)?;
            if key == BOOST_PHRASE_KEY {
                phrases.push(BoostPhrase::new(event.tick.value(), length));
            }
        }

        let solos = if self.parse_solos {
            form_solos(section, &notes)
        } else {
            vec![]
        };
        Ok(Some(
            NoteTrack::new(notes, phrases, resolution).with_solos(solos),
        ))
    }
}

fn read_sync_track(section: &ChartSection) -> Result<TempoMap, SongError> {
    const DEFAULT_EXPONENT: u32 = 2;

    let mut tempos = vec![];
    let mut time_sigs = vec![];
    for event in section.events() {
        match event.kind.as_str() {
            "B" => {
                let milli_bpm = event
                    .data
                    .split_whitespace()
                    .next()
                    .and_then(|token| token.parse::<i64>().ok())
                    .ok_or_else(|| malformed(section, event))?;
                tempos.push(TempoEvent {
                    tick: event.tick,
                    tempo: Tempo::from_milli_bpm(milli_bpm),
                });
            }
            "TS" => {
                let mut tokens = event.data.split_whitespace();
                let numerator = tokens
                    .next()
                    .and_then(|token| token.parse::<i32>().ok())
                    .ok_or_else(|| malformed(section, event))?;
                let exponent = match tokens.next() {
                    Some(token) => token
                        .parse::<u32>()
                        .map_err(|_| malformed(section, event))?,
                    None => DEFAULT_EXPONENT,
                };
                let denominator = 1_i32.checked_shl(exponent).filter(|d| *d > 0).ok_or(
                    SongError::InvalidTimeSignatureDenominator {
                        tick: event.tick,
                        exponent,
                    },
                )?;
                time_sigs.push(TimeSignature {
                    tick: event.tick,
                    numerator,
                    denominator,
                });
            }
            _ => {}
        }
    }
    Ok(TempoMap::new(time_sigs, tempos)?)
}

/// Pairs solo markers and values each solo by the chords inside `[start, end]`.
///
/// Markers are sorted first. A start marker pairs with the first end marker after it, and start
/// markers before that end marker are absorbed. Solos without notes are dropped.
fn form_solos(section: &ChartSection, notes: &[Note]) -> Vec<Solo> {
    let markers = |name: &str| {
        section
            .events_of("E")
            .filter(|event| event.data == name)
            .map(|event| event.tick)
            .sorted()
            .collect_vec()
    };
    let on_events = markers("solo");
    let off_events = markers("soloend");

    let mut ranges = vec![];
    let mut ons = on_events.into_iter().peekable();
    let mut offs = off_events.into_iter().peekable();
    loop {
        let (Some(on), Some(off)) = (ons.peek().copied(), offs.peek().copied()) else {
            break;
        };
        if on >= off {
            offs.next();
            continue;
        }
        ranges.push((on, off));
        while ons.next_if(|&next| next < off).is_some() {}
    }
    if ons.peek().is_some() {
        log::warn!("[{}] ignoring solo without an end", section.name());
    }

    ranges
        .into_iter()
        .filter_map(|(start, end)| {
            let chords = notes
                .iter()
                .map(|note| note.tick)
                .filter(|tick| (start..=end).contains(tick))
                .unique()
                .count();
            (chords > 0).then(|| Solo {
                start,
                end,
                value: SOLO_NOTE_VALUE * chords as i32,
            })
        })
        .collect()
}

fn parse_ints(section: &ChartSection, event: &ChartEvent) -> Result<[i32; 2], SongError> {
    let mut values = event.data.split_whitespace().map(str::parse::<i32>);
    match (values.next(), values.next()) {
        (Some(Ok(first)), Some(Ok(second))) => Ok([first, second]),
        _ => Err(malformed(section, event)),
    }
}

fn malformed(section: &ChartSection, event: &ChartEvent) -> SongError {
    SongError::MalformedEvent {
        section: section.name().to_string(),
        tick: event.tick,
        kind: event.kind.clone(),
        data: event.data.clone(),
    }
}
