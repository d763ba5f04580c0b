//! Validated run configuration for point generation.
//!
//! Everything here is checked once on construction, so the timing and scoring code downstream
//! can treat its inputs as total.

use strict_num_extended::{FinF64, NonNegativeF64};
use thiserror::Error;

use crate::time::{Beat, Second, Tick};

/// A configuration value was outside of the domain accepted by the engine.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConfigError {
    /// The resolution must be a positive number of ticks per quarter note.
    #[error("resolution must be positive, but got {0}")]
    NonPositiveResolution(i32),
    /// The squeeze factor must be a finite number in `[0, 1]`.
    #[error("squeeze must be in [0, 1], but got {0}")]
    SqueezeOutOfRange(f64),
    /// The video lag must be a finite number of seconds.
    #[error("video lag must be finite, but got {0}")]
    NonFiniteVideoLag(f64),
    /// A hit window half width must be a finite, non-negative number of seconds.
    #[error("hit window half width must be finite and non-negative, but got {0}")]
    InvalidHitWindow(f64),
}

/// Ticks per quarter note. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "i32", into = "i32"))]
#[repr(transparent)]
pub struct Resolution(i32);

impl Resolution {
    /// The resolution assumed when a chart does not state one.
    pub const DEFAULT: Self = Self(192);

    /// Creates a new resolution.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NonPositiveResolution`] if `ticks_per_beat` is zero or negative.
    pub const fn new(ticks_per_beat: i32) -> Result<Self, ConfigError> {
        if ticks_per_beat <= 0 {
            return Err(ConfigError::NonPositiveResolution(ticks_per_beat));
        }
        Ok(Self(ticks_per_beat))
    }

    /// Gets the number of ticks per quarter note.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }

    /// Converts a tick position into beats.
    #[must_use]
    pub fn to_beats(self, tick: Tick) -> Beat {
        Beat(f64::from(tick.value()) / f64::from(self.0))
    }

    /// Converts a beat position into ticks, truncating toward zero.
    #[must_use]
    pub fn to_ticks(self, beat: Beat) -> Tick {
        Tick((beat.value() * f64::from(self.0)) as i32)
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<i32> for Resolution {
    type Error = ConfigError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Resolution> for i32 {
    fn from(value: Resolution) -> Self {
        value.get()
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ticks/beat", self.0)
    }
}

/// Hit window narrowing factor, a finite `f64` in `[0, 1]`.
///
/// `1.0` keeps the full baseline window, `0.5` halves it on both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "f64", into = "f64"))]
#[repr(transparent)]
pub struct Squeeze(NonNegativeF64);

impl Squeeze {
    /// No narrowing at all.
    pub const FULL: Self = Self(NonNegativeF64::new_const(1.0));

    /// Creates a new `Squeeze`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::SqueezeOutOfRange`] if `value` is NaN or outside of `[0, 1]`.
    pub fn new(value: f64) -> Result<Self, ConfigError> {
        NonNegativeF64::new(value)
            .ok()
            .filter(|factor| factor.as_f64() <= 1.0)
            .map(Self)
            .ok_or(ConfigError::SqueezeOutOfRange(value))
    }

    /// Gets the internal value.
    #[inline]
    #[must_use]
    pub fn as_f64(self) -> f64 {
        self.0.as_f64()
    }
}

impl Default for Squeeze {
    fn default() -> Self {
        Self::FULL
    }
}

impl TryFrom<f64> for Squeeze {
    type Error = ConfigError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Squeeze> for f64 {
    fn from(value: Squeeze) -> Self {
        value.as_f64()
    }
}

/// Settings of one point generation run.
///
/// # Example
///
/// ```
/// use fretline::config::PointConfig;
///
/// let config = PointConfig::default().squeeze(0.5)?.video_lag(-0.02)?;
/// assert_eq!(config.squeeze_factor().as_f64(), 0.5);
/// # Ok::<(), fretline::config::ConfigError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PointConfig {
    squeeze: Squeeze,
    video_lag: FinF64,
    early_window: NonNegativeF64,
    late_window: NonNegativeF64,
}

impl PointConfig {
    /// Baseline half width of the window before a note, in seconds.
    pub const DEFAULT_EARLY_WINDOW: NonNegativeF64 = NonNegativeF64::new_const(0.07);
    /// Baseline half width of the window after a note, in seconds.
    pub const DEFAULT_LATE_WINDOW: NonNegativeF64 = NonNegativeF64::new_const(0.07);

    /// Sets the squeeze factor.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::SqueezeOutOfRange`] if `squeeze` is not in `[0, 1]`.
    pub fn squeeze(self, squeeze: f64) -> Result<Self, ConfigError> {
        Ok(Self {
            squeeze: Squeeze::new(squeeze)?,
            ..self
        })
    }

    /// Sets the video lag calibration in seconds. Negative values move notes earlier.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NonFiniteVideoLag`] if `seconds` is NaN or infinite.
    pub fn video_lag(self, seconds: f64) -> Result<Self, ConfigError> {
        let video_lag = FinF64::new(seconds).ok().ok_or(ConfigError::NonFiniteVideoLag(seconds))?;
        Ok(Self { video_lag, ..self })
    }

    /// Sets the baseline early and late half widths of the hit window, before squeeze.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidHitWindow`] if either width is negative or not finite.
    pub fn hit_window(self, early: f64, late: f64) -> Result<Self, ConfigError> {
        let half_width = |width: f64| {
            NonNegativeF64::new(width)
                .ok()
                .filter(|width| width.as_f64().is_finite())
                .ok_or(ConfigError::InvalidHitWindow(width))
        };
        Ok(Self {
            early_window: half_width(early)?,
            late_window: half_width(late)?,
            ..self
        })
    }

    /// Gets the squeeze factor.
    #[must_use]
    pub const fn squeeze_factor(&self) -> Squeeze {
        self.squeeze
    }

    /// Gets the video lag.
    #[must_use]
    pub fn lag(&self) -> Second {
        Second(self.video_lag.as_f64())
    }

    /// The early half width after applying squeeze.
    #[must_use]
    pub fn early_half_width(&self) -> Second {
        Second(self.early_window.as_f64() * self.squeeze.as_f64())
    }

    /// The late half width after applying squeeze.
    #[must_use]
    pub fn late_half_width(&self) -> Second {
        Second(self.late_window.as_f64() * self.squeeze.as_f64())
    }
}

impl Default for PointConfig {
    fn default() -> Self {
        Self {
            squeeze: Squeeze::FULL,
            video_lag: FinF64::new_const(0.0),
            early_window: Self::DEFAULT_EARLY_WINDOW,
            late_window: Self::DEFAULT_LATE_WINDOW,
        }
    }
}
