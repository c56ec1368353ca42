pub mod codec;
pub mod series;

pub use codec::*;
pub use series::*;

use core::fmt::Display;
use serde::{Deserialize, Serialize};

pub const SECONDS_PER_MINUTE: u32 = 60;
pub const SECONDS_PER_HOUR: u32 = 60 * SECONDS_PER_MINUTE;
pub const SECONDS_PER_DAY: u32 = 24 * SECONDS_PER_HOUR;

/// Number of 10-minute points averaged into one 60-minute point (6 × 10 min)
pub const TEN_MINUTE_POINTS_PER_HOUR: usize = 6;

/// A single `(timestamp, value)` reading
///
/// The atomic unit moved through every stage of the engine. Samples are
/// plain `Copy` data and never change once created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Seconds since epoch
    pub timestamp: u32,
    /// Reading in the channel's physical units
    pub value: f32,
}

impl Sample {
    /// Create a new sample
    pub const fn new(timestamp: u32, value: f32) -> Self {
        Self { timestamp, value }
    }
}

impl Display for Sample {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {:.2})", self.timestamp, self.value)
    }
}

/// Resolution of a persisted series
///
/// Each channel keeps one bounded series per resolution; daily data is a
/// maxima/minima pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    /// 10-minute averages
    TenMinute,
    /// 60-minute averages of six 10-minute points
    SixtyMinute,
    /// Daily maxima and minima
    Daily,
}

impl Resolution {
    /// Get a short label for display
    pub const fn label(self) -> &'static str {
        match self {
            Self::TenMinute => "10m",
            Self::SixtyMinute => "60m",
            Self::Daily => "1d",
        }
    }

    /// Get the roll-up interval of this resolution in seconds
    pub const fn duration_secs(self) -> u32 {
        match self {
            Self::TenMinute => 10 * SECONDS_PER_MINUTE,
            Self::SixtyMinute => SECONDS_PER_HOUR,
            Self::Daily => SECONDS_PER_DAY,
        }
    }

    /// Suffix appended to a channel's file prefix when persisting this series
    pub const fn file_suffix(self) -> &'static str {
        match self {
            Self::TenMinute => "_10_min",
            Self::SixtyMinute => "_60_min",
            Self::Daily => "_max_min",
        }
    }

    /// Oldest data (in seconds before now) worth recovering after a restart
    ///
    /// Applied by the caller before re-seeding; the engine itself never
    /// filters by age.
    pub const fn recovery_cutoff_secs(self) -> u32 {
        match self {
            Self::TenMinute => 30 * SECONDS_PER_MINUTE,
            Self::SixtyMinute => 3 * SECONDS_PER_HOUR,
            Self::Daily => 3 * SECONDS_PER_DAY,
        }
    }

    /// All resolutions, finest first
    pub const fn all() -> [Resolution; 3] {
        [Self::TenMinute, Self::SixtyMinute, Self::Daily]
    }
}
