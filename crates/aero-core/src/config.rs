//! Channel configuration
//!
//! Plain, immutable values handed to each analyzer at construction. Loading
//! them (from flash, a file, build-time environment) is the caller's job;
//! the engine only validates them.

use alloc::string::String;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::storage::{Resolution, SeriesCodec};

/// Seconds between raw readings on the reference station
pub const DEFAULT_BASE_PERIOD_SECS: f32 = 4.0;

/// Speed per (rotation / second) for the Davis cup anemometer, in mph
pub const DAVIS_CALIBRATION_FACTOR: f32 = 2.25;

/// Wind speed below which a vane heading carries no direction information
pub const WIND_DIRECTION_SPEED_THRESHOLD: f32 = 1.0;

/// Readings kept in the smoothing moving average
pub const DEFAULT_SMOOTHING_WINDOW: usize = 5;

/// Absolute margin below the moving average still accepted as a reading
pub const DEFAULT_OUTLIER_DELTA: f32 = 10.0;

/// Identifying text for a channel and the names of its persisted files
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ChannelLabels {
    /// Display label, e.g. "Temperature"
    pub label: String,
    /// Start of every persisted file name, e.g. "temperature"
    pub file_prefix: String,
    /// Units, e.g. "F"
    pub units: String,
    /// Units with HTML entities, e.g. "&deg;F"
    pub units_html: String,
}

impl ChannelLabels {
    /// Create labels whose HTML units match the plain units
    pub fn new(label: &str, file_prefix: &str, units: &str) -> Self {
        Self {
            label: label.into(),
            file_prefix: file_prefix.into(),
            units: units.into(),
            units_html: units.into(),
        }
    }

    /// Replace the HTML rendering of the units
    pub fn with_units_html(mut self, units_html: &str) -> Self {
        self.units_html = units_html.into();
        self
    }

    /// File name holding this channel's series at `resolution`
    pub fn file_name(&self, resolution: Resolution) -> String {
        let mut name = self.file_prefix.clone();
        name.push_str(resolution.file_suffix());
        name.push_str(".txt");
        name
    }
}

/// Maximum points kept per resolution
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesCapacities {
    /// 10-minute series (at least 6 for a full 60-minute average)
    pub ten_minute: usize,
    /// 60-minute series
    pub sixty_minute: usize,
    /// Each of the daily maxima and minima series
    pub daily: usize,
}

impl Default for SeriesCapacities {
    fn default() -> Self {
        Self {
            ten_minute: 24,
            sixty_minute: 24,
            daily: 30,
        }
    }
}

impl SeriesCapacities {
    pub fn validate(&self) -> ConfigResult<()> {
        let checks = [
            ("10-min", self.ten_minute),
            ("60-min", self.sixty_minute),
            ("daily", self.daily),
        ];
        for (series, capacity) in checks {
            if capacity == 0 {
                return Err(ConfigError::ZeroCapacity { series });
            }
        }
        Ok(())
    }
}

/// Moving-average smoothing with outlier rejection
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Smoothing {
    /// Reject outliers and average accepted readings
    pub enabled: bool,
    /// Accepted readings averaged into the moving average
    pub window: usize,
    /// Readings this far below the moving average are outliers
    pub outlier_delta: f32,
}

impl Default for Smoothing {
    fn default() -> Self {
        Self {
            enabled: false,
            window: DEFAULT_SMOOTHING_WINDOW,
            outlier_delta: DEFAULT_OUTLIER_DELTA,
        }
    }
}

impl Smoothing {
    /// Smoothing switched on with the given window and delta
    pub fn enabled(window: usize, outlier_delta: f32) -> Self {
        Self {
            enabled: true,
            window,
            outlier_delta,
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if !self.enabled {
            return Ok(());
        }
        if self.window == 0 {
            return Err(ConfigError::ZeroSmoothingWindow);
        }
        if !self.outlier_delta.is_finite() || self.outlier_delta < 0.0 {
            return Err(ConfigError::InvalidOutlierDelta {
                delta: self.outlier_delta,
            });
        }
        Ok(())
    }
}

/// Configuration of a generic sensor channel
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ChannelConfig {
    /// Display text and file names
    pub labels: ChannelLabels,
    /// Points kept per resolution
    pub capacities: SeriesCapacities,
    pub smoothing: Smoothing,
    /// How this channel's series are rendered to text
    pub format: SeriesCodec,
    /// Persist daily maxima only, without the `|minima` half
    pub report_daily_max_only: bool,
}

impl ChannelConfig {
    /// Default channel configuration with the given labels
    pub fn new(labels: ChannelLabels) -> Self {
        Self {
            labels,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.capacities.validate()?;
        self.smoothing.validate()
    }
}

/// Configuration of an anemometer channel
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WindSpeedConfig {
    /// Settings of the underlying speed channel
    pub channel: ChannelConfig,
    /// Speed per (rotation / second)
    pub calibration_factor: f32,
    /// Seconds over which each rotation count is taken
    pub base_period_secs: f32,
    /// Text format of the gust series; "no gust" is a zero
    pub gust_format: SeriesCodec,
}

impl Default for WindSpeedConfig {
    fn default() -> Self {
        Self {
            channel: ChannelConfig::new(ChannelLabels::new("Wind Speed", "wind_speed", "mph")),
            calibration_factor: DAVIS_CALIBRATION_FACTOR,
            base_period_secs: DEFAULT_BASE_PERIOD_SECS,
            gust_format: SeriesCodec::new(true, 2),
        }
    }
}

impl WindSpeedConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        self.channel.validate()?;
        if !self.calibration_factor.is_finite() || self.calibration_factor <= 0.0 {
            return Err(ConfigError::InvalidCalibration {
                factor: self.calibration_factor,
            });
        }
        validate_period(self.base_period_secs)
    }
}

/// Configuration of a wind vane channel
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WindDirectionConfig {
    /// Display text and file names
    pub labels: ChannelLabels,
    /// Only the 10-minute and 60-minute capacities are used
    pub capacities: SeriesCapacities,
    /// Degrees by which the raw vane reading exceeds true north
    pub offset_angle_deg: f32,
    /// Readings taken below this wind speed are left out of the average
    pub speed_threshold: f32,
    /// Text format of the heading series
    pub format: SeriesCodec,
}

impl Default for WindDirectionConfig {
    fn default() -> Self {
        Self {
            labels: ChannelLabels::new("Wind Direction", "wind_direction", "deg")
                .with_units_html("&deg;"),
            capacities: SeriesCapacities::default(),
            offset_angle_deg: 0.0,
            speed_threshold: WIND_DIRECTION_SPEED_THRESHOLD,
            // A calm window averages to 0 and should render as "no direction"
            format: SeriesCodec::new(true, 0),
        }
    }
}

impl WindDirectionConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        self.capacities.validate()?;
        let settings = [
            ("offset angle", self.offset_angle_deg),
            ("speed threshold", self.speed_threshold),
        ];
        for (setting, value) in settings {
            if !value.is_finite() {
                return Err(ConfigError::NonFiniteVaneSetting { setting, value });
            }
        }
        Ok(())
    }
}

/// A sampling period must be a positive, finite number of seconds.
pub fn validate_period(period: f32) -> ConfigResult<()> {
    if period.is_finite() && period > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidPeriod { period })
    }
}
