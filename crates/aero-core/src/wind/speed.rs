//! Wind speed and gust detection

use alloc::string::String;

use log::{debug, info, warn};

use crate::aggregation::SensorChannel;
use crate::config::WindSpeedConfig;
use crate::error::ConfigResult;
use crate::metrics::Beaufort;
use crate::storage::{BoundedSeries, Resolution, Sample, TEN_MINUTE_POINTS_PER_HOUR};

/// Window maximum at or above which a gust is always reported
pub const GUST_THRESHOLD: f32 = 18.41;

/// Window spread (maximum minus minimum) at or above which a gust is reported
pub const GUST_SPREAD: f32 = 10.36;

/// Speed extrema of the current 10-minute window and the latest gusts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GustState {
    /// Fastest instantaneous speed in the current window
    pub speed_max_window: f32,
    /// Slowest instantaneous speed in the current window
    pub speed_min_window: f32,
    /// Newest 10-minute gust, 0 for none
    pub last_gust_10min: f32,
    /// Newest 60-minute gust
    pub last_gust_60min: f32,
}

impl Default for GustState {
    fn default() -> Self {
        Self {
            speed_max_window: 0.0,
            speed_min_window: f32::INFINITY,
            last_gust_10min: 0.0,
            last_gust_60min: 0.0,
        }
    }
}

impl GustState {
    fn record(&mut self, speed: f32) {
        if speed > self.speed_max_window {
            self.speed_max_window = speed;
        }
        if speed < self.speed_min_window {
            self.speed_min_window = speed;
        }
    }

    /// Gust for the current window, 0 when the window does not qualify
    pub fn window_gust(&self) -> f32 {
        let max = self.speed_max_window;
        // An empty window has min = +inf, so the spread is never met
        if max >= GUST_THRESHOLD || max - self.speed_min_window >= GUST_SPREAD {
            max
        } else {
            0.0
        }
    }

    fn reset_window(&mut self) {
        self.speed_max_window = 0.0;
        self.speed_min_window = f32::INFINITY;
    }
}

/// Anemometer channel
///
/// Owns a [`SensorChannel`] for the sustained speed and a parallel pair of
/// gust series. Gust roll-ups are driven separately from the speed roll-ups
/// but on the same cadence.
#[derive(Debug, Clone)]
pub struct WindSpeedAnalyzer {
    config: WindSpeedConfig,
    channel: SensorChannel,
    gusts: GustState,
    gusts_10min: BoundedSeries,
    gusts_60min: BoundedSeries,
}

impl WindSpeedAnalyzer {
    /// Create an analyzer, validating `config` first
    pub fn new(config: WindSpeedConfig) -> ConfigResult<Self> {
        config.validate()?;

        let capacities = config.channel.capacities;
        Ok(Self {
            channel: SensorChannel::new(config.channel.clone())?,
            gusts: GustState::default(),
            gusts_10min: BoundedSeries::new("10-min gust", capacities.ten_minute)?,
            gusts_60min: BoundedSeries::new("60-min gust", capacities.sixty_minute)?,
            config,
        })
    }

    /// Speed for `rotation_count` cup rotations over `period_secs`
    ///
    /// `period_secs` must be positive.
    pub fn speed_instant(&self, rotation_count: u32, period_secs: f32) -> f32 {
        speed_from_rotations(rotation_count, period_secs, self.config.calibration_factor)
    }

    /// Add a rotation count taken over one base period, returning the speed
    pub fn add_wind_reading(&mut self, time: u32, rotation_count: u32) -> f32 {
        let speed = self.speed_instant(rotation_count, self.config.base_period_secs);
        debug!("{} rotations -> {:.2}", rotation_count, speed);

        self.channel.add_reading(Sample::new(time, speed));
        self.gusts.record(speed);
        speed
    }

    /// Close the 10-minute gust window
    ///
    /// Always pushes a point: the window maximum if it qualifies as a gust,
    /// otherwise 0. The window extrema are reset either way.
    pub fn rollup_gust_10min(&mut self) -> Sample {
        let gust = self.gusts.window_gust();
        let point = Sample::new(self.channel.aggregator().last_sample().timestamp, gust);

        self.gusts.last_gust_10min = gust;
        self.gusts_10min.push(point);
        self.gusts.reset_window();

        if gust > 0.0 {
            info!("Gust {:.2} {}", gust, self.config.channel.labels.units);
        }
        point
    }

    /// Largest gust among the newest six 10-minute gusts
    ///
    /// Returns `None` (and pushes nothing) while no 10-minute gust exists.
    pub fn rollup_gust_60min(&mut self) -> Option<Sample> {
        let Some(gust) = self.gusts_10min.max_of_newest(TEN_MINUTE_POINTS_PER_HOUR) else {
            warn!("10-min gust series empty, skipping 60-min gust roll-up");
            return None;
        };

        let point = Sample::new(self.channel.aggregator().last_sample().timestamp, gust);
        self.gusts.last_gust_60min = gust;
        self.gusts_60min.push(point);
        Some(point)
    }

    /// Sustained speed roll-up; see [`SensorChannel::rollup_10min`]
    pub fn rollup_10min(&mut self) -> Option<Sample> {
        self.channel.rollup_10min()
    }

    pub fn rollup_60min(&mut self) -> Option<Sample> {
        self.channel.rollup_60min()
    }

    pub fn rollup_day(&mut self) -> Option<(Sample, Sample)> {
        self.channel.rollup_day()
    }

    /// Classify a speed on the Beaufort scale
    pub fn beaufort_description(speed: f32) -> Beaufort {
        Beaufort::assess(speed)
    }

    /// Beaufort category of the last sustained (10-minute) speed
    pub fn sustained_beaufort(&self) -> Option<Beaufort> {
        self.channel.avg_10_min().map(Beaufort::assess)
    }

    /// Most recent instantaneous speed
    pub fn speed_now(&self) -> f32 {
        self.channel.aggregator().last_sample().value
    }

    /// Newest 10-minute gust, 0 for none
    pub fn gust_10_min(&self) -> f32 {
        self.gusts.last_gust_10min
    }

    pub fn gust_60_min(&self) -> f32 {
        self.gusts.last_gust_60min
    }

    pub fn gust_state(&self) -> &GustState {
        &self.gusts
    }

    /// Gust series at `resolution`; daily gusts are not kept
    pub fn gust_series(&self, resolution: Resolution) -> Option<&BoundedSeries> {
        match resolution {
            Resolution::TenMinute => Some(&self.gusts_10min),
            Resolution::SixtyMinute => Some(&self.gusts_60min),
            Resolution::Daily => None,
        }
    }

    /// Render the gust series at `resolution`, `None` for daily
    pub fn encode_gusts(&self, resolution: Resolution) -> Option<String> {
        self.gust_series(resolution)
            .map(|series| self.config.gust_format.encode(series.iter()))
    }

    /// Replace the gust series at `resolution` with recovered points
    ///
    /// Daily points are ignored. The latest gust readings are updated from
    /// the newest recovered point.
    pub fn restore_gusts<I>(&mut self, resolution: Resolution, points: I)
    where
        I: IntoIterator<Item = Sample>,
    {
        let (series, last) = match resolution {
            Resolution::TenMinute => (&mut self.gusts_10min, &mut self.gusts.last_gust_10min),
            Resolution::SixtyMinute => (&mut self.gusts_60min, &mut self.gusts.last_gust_60min),
            Resolution::Daily => return,
        };
        series.clear();
        series.extend(points);
        *last = series.newest().map(|s| s.value).unwrap_or(0.0);
    }

    /// The sustained speed channel
    pub fn channel(&self) -> &SensorChannel {
        &self.channel
    }

    pub fn channel_mut(&mut self) -> &mut SensorChannel {
        &mut self.channel
    }

    pub fn config(&self) -> &WindSpeedConfig {
        &self.config
    }
}

/// Speed from a rotation count: `rotations * calibration / period`
pub fn speed_from_rotations(rotation_count: u32, period_secs: f32, calibration_factor: f32) -> f32 {
    rotation_count as f32 * calibration_factor / period_secs
}
