//! Classification of wind readings for display
//!
//! Stateless mappings from a speed to its Beaufort description and from a
//! heading to one of eight compass sectors.

use serde::{Deserialize, Serialize};

/// Beaufort wind force description
///
/// Thresholds are in mph, matching the reference anemometer calibration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Beaufort {
    Calm,
    LightAir,
    LightBreeze,
    GentleBreeze,
    ModerateBreeze,
    FreshBreeze,
    StrongBreeze,
    HighWind,
    /// Anything from gale force upward
    Extreme,
}

impl Beaufort {
    /// Upper bounds (exclusive) for every category but the last, in order
    const THRESHOLDS: [(f32, Beaufort); 8] = [
        (1.0, Beaufort::Calm),
        (4.0, Beaufort::LightAir),
        (8.0, Beaufort::LightBreeze),
        (13.0, Beaufort::GentleBreeze),
        (19.0, Beaufort::ModerateBreeze),
        (25.0, Beaufort::FreshBreeze),
        (32.0, Beaufort::StrongBreeze),
        (39.0, Beaufort::HighWind),
    ];

    /// Classify a wind speed
    pub fn assess(speed: f32) -> Self {
        Self::THRESHOLDS
            .iter()
            .find(|(limit, _)| speed < *limit)
            .map(|(_, category)| *category)
            .unwrap_or(Self::Extreme)
    }

    /// Get the display label for this category
    pub const fn label(self) -> &'static str {
        match self {
            Self::Calm => "Calm",
            Self::LightAir => "Light Air",
            Self::LightBreeze => "Light Breeze",
            Self::GentleBreeze => "Gentle Breeze",
            Self::ModerateBreeze => "Moderate Breeze",
            Self::FreshBreeze => "Fresh Breeze",
            Self::StrongBreeze => "Strong Breeze",
            Self::HighWind => "High Wind",
            Self::Extreme => "RUN",
        }
    }
}

/// One of eight 45° compass sectors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cardinal {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl Cardinal {
    /// Sector for an azimuth in degrees (0 = north, clockwise)
    ///
    /// Sectors are half-open, `[lower, upper)`; north wraps through 360.
    /// Angles outside `[0, 360)` are normalized first.
    pub fn assess(angle_deg: f32) -> Self {
        let angle = normalize_degrees(angle_deg);
        if angle < 22.0 {
            Self::N
        } else if angle < 67.0 {
            Self::NE
        } else if angle < 112.0 {
            Self::E
        } else if angle < 157.0 {
            Self::SE
        } else if angle < 202.0 {
            Self::S
        } else if angle < 247.0 {
            Self::SW
        } else if angle < 292.0 {
            Self::W
        } else if angle < 337.0 {
            Self::NW
        } else {
            Self::N
        }
    }

    /// Get the display label for this sector
    pub const fn label(self) -> &'static str {
        match self {
            Self::N => "N",
            Self::NE => "NE",
            Self::E => "E",
            Self::SE => "SE",
            Self::S => "S",
            Self::SW => "SW",
            Self::W => "W",
            Self::NW => "NW",
        }
    }
}

/// Sector of every angle in order
pub fn cardinals_of<I>(angles: I) -> impl Iterator<Item = Cardinal>
where
    I: IntoIterator<Item = f32>,
{
    angles.into_iter().map(Cardinal::assess)
}

/// Wrap an angle into `[0, 360)`.
pub fn normalize_degrees(angle_deg: f32) -> f32 {
    let wrapped = libm::fmodf(angle_deg, 360.0);
    let wrapped = if wrapped < 0.0 { wrapped + 360.0 } else { wrapped };
    // -1e-8 + 360 rounds to exactly 360 in f32
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}
