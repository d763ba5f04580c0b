//! Maximum gap between two chords for the later one to be a natural hammer-on/pull-off.

use crate::{config::Resolution, time::Tick};

/// How the maximum HOPO gap is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HopoThreshold {
    /// Scales with the resolution the way each file format does by default.
    #[default]
    Resolution,
    /// A fixed gap in ticks.
    HopoFrequency(Tick),
    /// An eighth note, rounded up.
    EighthNote,
}

impl HopoThreshold {
    /// The maximum gap for a `.chart` file, where the default is 65 ticks at 192 resolution.
    #[must_use]
    pub const fn chart_max_hopo_gap(self, resolution: Resolution) -> Tick {
        const DEFAULT_HOPO_GAP: i32 = 65;
        const DEFAULT_RESOLUTION: i32 = 192;

        match self {
            Self::Resolution => Tick(DEFAULT_HOPO_GAP * resolution.get() / DEFAULT_RESOLUTION),
            Self::HopoFrequency(ticks) => ticks,
            Self::EighthNote => eighth_note(resolution),
        }
    }

    /// The maximum gap for a MIDI file, where the default is a third of a beat plus one tick.
    #[must_use]
    pub const fn midi_max_hopo_gap(self, resolution: Resolution) -> Tick {
        match self {
            Self::Resolution => Tick(resolution.get() / 3 + 1),
            Self::HopoFrequency(ticks) => ticks,
            Self::EighthNote => eighth_note(resolution),
        }
    }
}

const fn eighth_note(resolution: Resolution) -> Tick {
    Tick((resolution.get() + 3) / 2)
}
