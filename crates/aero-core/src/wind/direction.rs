//! Vector-averaged wind direction
//!
//! Headings cannot be averaged as plain numbers (the mean of 350° and 10° is
//! north, not south), so each reading is split into east and north
//! components, weighted by the wind speed at the time, and summed. The
//! average heading is the azimuth of the resultant vector.

use alloc::string::String;
use core::f64::consts::PI;
use core::ops::AddAssign;

use log::{debug, info};

use crate::config::WindDirectionConfig;
use crate::error::ConfigResult;
use crate::metrics::{Cardinal, normalize_degrees};
use crate::storage::{BoundedSeries, Resolution, Sample, TEN_MINUTE_POINTS_PER_HOUR};

const DEGREES_PER_RADIAN: f64 = 180.0 / PI;

/// Resultants shorter than this have no meaningful direction
pub const DEGENERATE_MAGNITUDE: f64 = 1.0e-6;

/// Sum of heading unit vectors, each scaled by its weight
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HeadingVector {
    /// Eastward component
    pub east: f64,
    /// Northward component
    pub north: f64,
}

impl HeadingVector {
    /// The empty sum
    pub const ZERO: Self = Self {
        east: 0.0,
        north: 0.0,
    };

    /// Vector of length `weight` pointing along azimuth `heading_deg`
    pub fn from_heading(heading_deg: f32, weight: f32) -> Self {
        let radians = heading_deg as f64 / DEGREES_PER_RADIAN;
        let weight = weight as f64;
        Self {
            east: libm::sin(radians) * weight,
            north: libm::cos(radians) * weight,
        }
    }

    /// Length of the resultant
    pub fn magnitude(&self) -> f64 {
        libm::sqrt(self.east * self.east + self.north * self.north)
    }

    /// Opposing headings cancelled out, or nothing was summed
    pub fn is_degenerate(&self) -> bool {
        self.magnitude() < DEGENERATE_MAGNITUDE
    }

    /// Azimuth in `[0, 360)`: 0 is north, increasing clockwise
    pub fn azimuth_deg(&self) -> f32 {
        // atan2(east, north), not atan2(y, x): azimuth turns the other way
        let degrees = libm::atan2(self.east, self.north) * DEGREES_PER_RADIAN;
        normalize_degrees(degrees as f32)
    }
}

impl AddAssign for HeadingVector {
    fn add_assign(&mut self, rhs: Self) {
        self.east += rhs.east;
        self.north += rhs.north;
    }
}

/// Wind vane channel
///
/// Keeps the running speed-weighted vector for the current 10-minute window
/// plus 10-minute and 60-minute heading series. A window in which nothing
/// passed the speed gate (or whose headings cancelled out) rolls up as a
/// heading of exactly 0, which the default format writes as an empty field.
#[derive(Debug, Clone)]
pub struct WindDirectionAverager {
    config: WindDirectionConfig,
    sums: HeadingVector,
    last_reading: Sample,
    headings_10min: BoundedSeries,
    headings_60min: BoundedSeries,
}

impl WindDirectionAverager {
    /// Create an averager, validating `config` first
    pub fn new(config: WindDirectionConfig) -> ConfigResult<Self> {
        config.validate()?;

        Ok(Self {
            sums: HeadingVector::ZERO,
            last_reading: Sample::default(),
            headings_10min: BoundedSeries::new("10-min", config.capacities.ten_minute)?,
            headings_60min: BoundedSeries::new("60-min", config.capacities.sixty_minute)?,
            config,
        })
    }

    /// Add a raw vane heading taken at `concurrent_speed`
    ///
    /// The reading always becomes the last raw heading. It only joins the
    /// average if the speed is at least the configured threshold; returns
    /// whether it did.
    pub fn add_direction_reading(&mut self, time: u32, heading_deg: f32, concurrent_speed: f32) -> bool {
        self.last_reading = Sample::new(time, heading_deg);

        if concurrent_speed < self.config.speed_threshold {
            debug!(
                "Ignoring heading {:.0} at speed {:.2}",
                heading_deg, concurrent_speed
            );
            return false;
        }

        let corrected = heading_deg - self.config.offset_angle_deg;
        self.sums += HeadingVector::from_heading(corrected, concurrent_speed);
        true
    }

    /// Resultant of the readings accumulated this window
    pub fn heading_vector(&self) -> HeadingVector {
        self.sums
    }

    /// Average heading of this window in degrees, `[0, 360)`
    ///
    /// Meaningless when [`heading_vector`](Self::heading_vector) is
    /// degenerate.
    pub fn average_heading_now(&self) -> f32 {
        self.sums.azimuth_deg()
    }

    /// Compass sector of `angle_deg`
    pub fn cardinal(angle_deg: f32) -> Cardinal {
        Cardinal::assess(angle_deg)
    }

    /// Sector of the last 10-minute heading
    pub fn cardinal_now(&self) -> Option<Cardinal> {
        self.avg_10_min().map(Cardinal::assess)
    }

    /// Unweighted vector average of the newest `n` headings in `series`
    ///
    /// Returns `None` for an empty window or when the headings cancel out.
    pub fn average_heading_of_window(series: &BoundedSeries, n: usize) -> Option<f32> {
        let mut sum = HeadingVector::ZERO;
        for point in series.iter_from_newest(n) {
            sum += HeadingVector::from_heading(point.value, 1.0);
        }

        if sum.is_degenerate() {
            None
        } else {
            Some(sum.azimuth_deg())
        }
    }

    /// Reset the vector sums for a new window
    pub fn clear_10_min(&mut self) {
        self.sums = HeadingVector::ZERO;
    }

    /// Push this window's average heading and start a new window
    pub fn rollup_10min(&mut self) -> Sample {
        let heading = if self.sums.is_degenerate() {
            0.0
        } else {
            self.average_heading_now()
        };

        let point = Sample::new(self.last_reading.timestamp, heading);
        self.headings_10min.push(point);
        self.clear_10_min();

        info!("{}: 10-min roll-up {}", self.config.labels.label, point);
        point
    }

    /// Push the vector average of the newest six 10-minute headings
    ///
    /// Returns `None` (and pushes nothing) while the 10-minute series is empty.
    /// Calm 10-minute windows are stored as `0.0` and count as north here,
    /// so a mostly calm hour is pulled toward north.
    pub fn rollup_60min(&mut self) -> Option<Sample> {
        if self.headings_10min.is_empty() {
            return None;
        }

        let heading =
            Self::average_heading_of_window(&self.headings_10min, TEN_MINUTE_POINTS_PER_HOUR)
                .unwrap_or(0.0);
        let point = Sample::new(self.last_reading.timestamp, heading);
        self.headings_60min.push(point);

        info!("{}: 60-min roll-up {}", self.config.labels.label, point);
        Some(point)
    }

    /// Newest 10-minute heading
    pub fn avg_10_min(&self) -> Option<f32> {
        self.headings_10min.newest().map(|s| s.value)
    }

    /// Newest 60-minute heading
    pub fn avg_60_min(&self) -> Option<f32> {
        self.headings_60min.newest().map(|s| s.value)
    }

    /// Most recent raw (uncorrected) heading
    pub fn last_reading(&self) -> Sample {
        self.last_reading
    }

    /// Heading series at `resolution`; no daily series is kept
    pub fn series(&self, resolution: Resolution) -> Option<&BoundedSeries> {
        match resolution {
            Resolution::TenMinute => Some(&self.headings_10min),
            Resolution::SixtyMinute => Some(&self.headings_60min),
            Resolution::Daily => None,
        }
    }

    /// Heading text at `resolution`; there is no daily heading series
    pub fn encode(&self, resolution: Resolution) -> Option<String> {
        self.series(resolution)
            .map(|series| self.config.format.encode(series.iter()))
    }

    /// Replace the heading series at `resolution`; daily points are ignored
    pub fn restore<I>(&mut self, resolution: Resolution, points: I)
    where
        I: IntoIterator<Item = Sample>,
    {
        let series = match resolution {
            Resolution::TenMinute => &mut self.headings_10min,
            Resolution::SixtyMinute => &mut self.headings_60min,
            Resolution::Daily => return,
        };
        series.clear();
        series.extend(points);
    }

    pub fn config(&self) -> &WindDirectionConfig {
        &self.config
    }
}
