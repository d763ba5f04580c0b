//! Notes, boost phrases and solos of one playable chart.

use itertools::Itertools;

use crate::{config::Resolution, hopo::HopoThreshold, time::Tick};

/// Lane of a five fret note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NoteColour {
    /// Green, the lowest fret.
    Green,
    /// Red.
    Red,
    /// Yellow.
    Yellow,
    /// Blue.
    Blue,
    /// Orange, the highest fret.
    Orange,
    /// Strumming without any fret held.
    Open,
}

impl NoteColour {
    /// Short label of the lane: a fret initial, or `open`.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Green => "G",
            Self::Red => "R",
            Self::Yellow => "Y",
            Self::Blue => "B",
            Self::Orange => "O",
            Self::Open => "open",
        }
    }
}

/// Markers which change how a note is played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NoteFlags {
    /// Flips the natural strum/HOPO classification.
    pub forced: bool,
    /// Makes the note a tap note.
    pub tap: bool,
}

impl NoteFlags {
    /// No markers.
    pub const NONE: Self = Self {
        forced: false,
        tap: false,
    };
    /// Forced only.
    pub const FORCED: Self = Self {
        forced: true,
        tap: false,
    };
    /// Tap only.
    pub const TAP: Self = Self {
        forced: false,
        tap: true,
    };
}

/// A single note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Note {
    /// Where the note is.
    pub tick: Tick,
    /// Length of the sustain, zero for a note without one.
    pub sustain: Tick,
    /// Lane of the note.
    pub colour: NoteColour,
    /// Forcing markers.
    pub flags: NoteFlags,
}

impl Note {
    /// Creates a note without markers.
    #[must_use]
    pub const fn new(tick: i32, sustain: i32, colour: NoteColour) -> Self {
        Self {
            tick: Tick(tick),
            sustain: Tick(sustain),
            colour,
            flags: NoteFlags::NONE,
        }
    }

    /// Replaces the markers of the note.
    #[must_use]
    pub const fn with_flags(self, flags: NoteFlags) -> Self {
        Self { flags, ..self }
    }
}

/// A boost phrase, covering `[start, start + length)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoostPhrase {
    /// Where the phrase starts.
    pub start: Tick,
    /// Length of the phrase.
    pub length: Tick,
}

impl BoostPhrase {
    /// Creates a phrase.
    #[must_use]
    pub const fn new(start: i32, length: i32) -> Self {
        Self {
            start: Tick(start),
            length: Tick(length),
        }
    }

    /// The first tick after the phrase.
    #[must_use]
    pub fn end(&self) -> Tick {
        self.start + self.length
    }

    /// Whether `tick` is inside the phrase.
    #[must_use]
    pub fn contains(&self, tick: Tick) -> bool {
        self.start <= tick && tick < self.end()
    }
}

/// A solo section. Its bonus is granted at the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Solo {
    /// Where the solo starts.
    pub start: Tick,
    /// Where the solo ends, inclusive.
    pub end: Tick,
    /// Bonus score of the solo.
    pub value: i32,
}

/// How a chord is played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChordKind {
    /// Needs a strum.
    Strum,
    /// A hammer-on or pull-off, playable without a strum.
    Hopo,
    /// A tap note.
    Tap,
}

/// Notes, boost phrases and solos of one instrument and difficulty.
///
/// Notes are kept sorted by tick and colour, with at most one note per tick and colour. Boost
/// phrases are sorted and do not overlap.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NoteTrack {
    notes: Vec<Note>,
    boost_phrases: Vec<BoostPhrase>,
    solos: Vec<Solo>,
    resolution: Resolution,
    max_hopo_gap: Tick,
}

impl NoteTrack {
    /// Creates a track.
    ///
    /// Notes are sorted. A note repeating a tick and colour replaces the earlier one, and a
    /// negative sustain counts as no sustain. Phrases are sorted, empty phrases are dropped and a
    /// phrase overlapping the next one is cut short at the next one's start.
    #[must_use]
    pub fn new(notes: Vec<Note>, boost_phrases: Vec<BoostPhrase>, resolution: Resolution) -> Self {
        let mut notes: Vec<Note> = notes
            .into_iter()
            .map(|note| Note {
                sustain: note.sustain.max(Tick::ZERO),
                ..note
            })
            .collect();
        notes.sort_by_key(|note| (note.tick, note.colour));
        let mut deduped: Vec<Note> = Vec::with_capacity(notes.len());
        for note in notes {
            match deduped.last_mut() {
                Some(last) if (last.tick, last.colour) == (note.tick, note.colour) => *last = note,
                _ => deduped.push(note),
            }
        }

        let mut phrases: Vec<BoostPhrase> = boost_phrases
            .into_iter()
            .filter(|phrase| phrase.length > Tick::ZERO)
            .sorted_by_key(|phrase| phrase.start)
            .collect();
        let starts: Vec<Tick> = phrases.iter().skip(1).map(|phrase| phrase.start).collect();
        for (phrase, next_start) in phrases.iter_mut().zip(starts) {
            if phrase.end() > next_start {
                log::warn!(
                    "boost phrase at {} overlaps the next one at {next_start}, cutting it short",
                    phrase.start
                );
                phrase.length = next_start - phrase.start;
            }
        }
        phrases.retain(|phrase| phrase.length > Tick::ZERO);

        Self {
            notes: deduped,
            boost_phrases: phrases,
            solos: vec![],
            resolution,
            max_hopo_gap: HopoThreshold::default().chart_max_hopo_gap(resolution),
        }
    }

    /// Replaces the solos of the track.
    #[must_use]
    pub fn with_solos(mut self, mut solos: Vec<Solo>) -> Self {
        solos.sort_by_key(|solo| (solo.start, solo.end));
        self.solos = solos;
        self
    }

    /// Replaces the maximum gap for natural HOPOs.
    #[must_use]
    pub const fn with_max_hopo_gap(mut self, max_hopo_gap: Tick) -> Self {
        self.max_hopo_gap = max_hopo_gap;
        self
    }

    /// Sorted notes.
    #[must_use]
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Sorted boost phrases.
    #[must_use]
    pub fn boost_phrases(&self) -> &[BoostPhrase] {
        &self.boost_phrases
    }

    /// Sorted solos.
    #[must_use]
    pub fn solos(&self) -> &[Solo] {
        &self.solos
    }

    /// Ticks per quarter note of the track.
    #[must_use]
    pub const fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// The maximum gap for natural HOPOs.
    #[must_use]
    pub const fn max_hopo_gap(&self) -> Tick {
        self.max_hopo_gap
    }

    /// Notes grouped by tick.
    pub fn chords(&self) -> impl Iterator<Item = &[Note]> {
        self.notes.chunk_by(|a, b| a.tick == b.tick)
    }

    /// Classifies each chord in [`Self::chords`] order.
    #[must_use]
    pub fn chord_kinds(&self) -> Vec<ChordKind> {
        let mut kinds = vec![];
        let mut prev: Option<&[Note]> = None;
        for chord in self.chords() {
            let kind = if chord.iter().any(|note| note.flags.tap) {
                ChordKind::Tap
            } else {
                let natural_hopo = prev.is_some_and(|prev| self.is_natural_hopo(prev, chord));
                let forced = chord.iter().any(|note| note.flags.forced);
                if natural_hopo != forced {
                    ChordKind::Hopo
                } else {
                    ChordKind::Strum
                }
            };
            kinds.push(kind);
            prev = Some(chord);
        }
        kinds
    }

    fn is_natural_hopo(&self, prev: &[Note], chord: &[Note]) -> bool {
        let colours = |chord: &[Note]| {
            chord
                .iter()
                .map(|note| note.colour)
                .unique()
                .sorted()
                .collect_vec()
        };
        let (Some(prev_note), Some(note)) = (prev.first(), chord.first()) else {
            return false;
        };
        let current = colours(chord);
        current.len() == 1
            && note.tick - prev_note.tick <= self.max_hopo_gap
            && colours(prev) != current
    }
}
