//! Definitions of time units in a chart.
//!
//! A chart stores positions as integer [`Tick`]s. Everything the scoring engine computes lives on
//! one of three continuous axes: [`Beat`] (quarter notes), [`Second`] (wall clock) and
//! [`Measure`] (bars, where one 4/4 bar equals 1).

use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

/// A position on the chart-native integer timeline.
///
/// Arithmetic saturates at the ends of `i32`, so a phrase or sustain reaching past the last tick
/// ends at `i32::MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub i32);

impl Tick {
    /// The zero tick.
    pub const ZERO: Self = Self(0);

    /// Gets the raw tick count.
    #[must_use]
    pub const fn value(self) -> i32 {
        self.0
    }
}

impl From<i32> for Tick {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

impl Add for Tick {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Tick {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl AddAssign for Tick {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl std::fmt::Display for Tick {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ticks", self.0)
    }
}

macro_rules! continuous_unit {
    ($(#[$meta:meta])* $name:ident, $suffix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name(pub f64);

        impl $name {
            /// The origin of this axis.
            pub const ZERO: Self = Self(0.0);

            /// Gets the internal value.
            #[must_use]
            pub const fn value(self) -> f64 {
                self.0
            }

            /// Compares with `other` using [`f64::total_cmp`].
            #[must_use]
            pub fn total_cmp(&self, other: &Self) -> std::cmp::Ordering {
                self.0.total_cmp(&other.0)
            }
        }

        impl From<f64> for $name {
            fn from(value: f64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for f64 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl Add for $name {
            type Output = Self;

            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $name {
            type Output = Self;

            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl AddAssign for $name {
            fn add_assign(&mut self, rhs: Self) {
                self.0 += rhs.0;
            }
        }

        impl SubAssign for $name {
            fn sub_assign(&mut self, rhs: Self) {
                self.0 -= rhs.0;
            }
        }

        impl Mul<f64> for $name {
            type Output = Self;

            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}{}", self.0, $suffix)
            }
        }
    };
}

continuous_unit!(
    /// A position in quarter notes, `tick / resolution`.
    Beat,
    "b"
);

continuous_unit!(
    /// A position in seconds from tick 0.
    Second,
    "s"
);

continuous_unit!(
    /// A position in measures. One measure of 4/4 is 4 beats long.
    Measure,
    "m"
);

impl Beat {
    /// Converts a span of beats into seconds with the tempo given in milli-BPM.
    #[must_use]
    pub fn to_second(self, milli_bpm: i64) -> Second {
        const MS_PER_MINUTE: f64 = 60000.0;
        Second(self.0 * MS_PER_MINUTE / milli_bpm as f64)
    }

    /// Converts a span of beats into measures with the given beats per measure.
    #[must_use]
    pub fn to_measure(self, beat_rate: f64) -> Measure {
        Measure(self.0 / beat_rate)
    }
}

impl Second {
    /// Converts a span of seconds into beats with the tempo given in milli-BPM.
    #[must_use]
    pub fn to_beat(self, milli_bpm: i64) -> Beat {
        const MS_PER_MINUTE: f64 = 60000.0;
        Beat(self.0 * milli_bpm as f64 / MS_PER_MINUTE)
    }
}

impl Measure {
    /// Converts a span of measures into beats with the given beats per measure.
    #[must_use]
    pub fn to_beat(self, beat_rate: f64) -> Beat {
        Beat(self.0 * beat_rate)
    }
}

/// `Beat / Beat` is a plain ratio, used for interpolation inside a segment.
impl std::ops::Div for Beat {
    type Output = f64;

    fn div(self, rhs: Self) -> Self::Output {
        self.0 / rhs.0
    }
}

impl std::ops::Div for Second {
    type Output = f64;

    fn div(self, rhs: Self) -> Self::Output {
        self.0 / rhs.0
    }
}

impl std::ops::Div for Measure {
    type Output = f64;

    fn div(self, rhs: Self) -> Self::Output {
        self.0 / rhs.0
    }
}
