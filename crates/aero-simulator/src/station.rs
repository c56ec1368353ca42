//! The simulated station: channels, roll-up schedule, persistence and
//! start-up recovery.

use std::io;

use log::{info, warn};

use aero_core::config::{ChannelLabels, Smoothing};
use aero_core::error::ConfigResult;
use aero_core::metrics::{Beaufort, Cardinal};
use aero_core::{
    ChannelConfig, Resolution, Sample, SensorChannel, SeriesCodec, WindDirectionAverager,
    WindDirectionConfig, WindSpeedAnalyzer, WindSpeedConfig,
};

use crate::store::FileStore;

// ---------------------------------------------------------------------------
// Schedule
// ---------------------------------------------------------------------------

/// Seconds between readings
pub const BASE_PERIOD_SECS: u32 = 4;

/// Base periods per 10-minute roll-up
pub const PERIODS_PER_10_MIN: u32 = 150;

/// Base periods per 60-minute roll-up
pub const PERIODS_PER_60_MIN: u32 = 900;

/// Base periods per daily roll-up
pub const PERIODS_PER_DAY: u32 = 21_600;

/// One base period's worth of raw sensor output
#[derive(Debug, Clone, Copy)]
pub struct Readings {
    pub time: u32,
    pub temperature: f32,
    pub uv_index: f32,
    pub rotations: u32,
    pub heading_deg: f32,
}

// ---------------------------------------------------------------------------
// Station
// ---------------------------------------------------------------------------

pub struct Station {
    temperature: SensorChannel,
    uv_index: SensorChannel,
    wind: WindSpeedAnalyzer,
    vane: WindDirectionAverager,
    store: FileStore,
    periods: u32,
}

impl Station {
    pub fn new(store: FileStore) -> ConfigResult<Self> {
        let mut temperature = ChannelConfig::new(
            ChannelLabels::new("Temperature", "temperature", "F").with_units_html("&deg;F"),
        );
        temperature.smoothing = Smoothing::enabled(5, 10.0);

        let mut uv_index = ChannelConfig::new(ChannelLabels::new("UV Index", "uv_index", ""));
        uv_index.report_daily_max_only = true;
        uv_index.format = SeriesCodec::new(false, 1);

        Ok(Self {
            temperature: SensorChannel::new(temperature)?,
            uv_index: SensorChannel::new(uv_index)?,
            wind: WindSpeedAnalyzer::new(WindSpeedConfig {
                base_period_secs: BASE_PERIOD_SECS as f32,
                ..WindSpeedConfig::default()
            })?,
            vane: WindDirectionAverager::new(WindDirectionConfig::default())?,
            store,
            periods: 0,
        })
    }

    /// Feed one base period of readings and run whatever roll-ups are due
    ///
    /// Each roll-up is persisted immediately; a failed write is returned
    /// after the in-memory state has already moved on.
    pub fn tick(&mut self, readings: &Readings) -> io::Result<()> {
        let time = readings.time;
        self.temperature.add_reading(Sample::new(time, readings.temperature));
        self.uv_index.add_reading(Sample::new(time, readings.uv_index));
        let speed = self.wind.add_wind_reading(time, readings.rotations);
        self.vane.add_direction_reading(time, readings.heading_deg, speed);

        self.periods += 1;
        if self.periods % PERIODS_PER_10_MIN == 0 {
            self.temperature.rollup_10min();
            self.uv_index.rollup_10min();
            self.wind.rollup_10min();
            self.wind.rollup_gust_10min();
            self.vane.rollup_10min();
            self.persist(Resolution::TenMinute)?;
        }
        if self.periods % PERIODS_PER_60_MIN == 0 {
            self.temperature.rollup_60min();
            self.uv_index.rollup_60min();
            self.wind.rollup_60min();
            self.wind.rollup_gust_60min();
            self.vane.rollup_60min();
            self.persist(Resolution::SixtyMinute)?;
            self.log_summary();
        }
        if self.periods % PERIODS_PER_DAY == 0 {
            self.temperature.rollup_day();
            self.uv_index.rollup_day();
            self.wind.rollup_day();
            self.persist(Resolution::Daily)?;
        }
        Ok(())
    }

    /// Write every series kept at `resolution`
    pub fn persist(&self, resolution: Resolution) -> io::Result<()> {
        for channel in [&self.temperature, &self.uv_index, self.wind.channel()] {
            let name = channel.labels().file_name(resolution);
            self.store.write(&name, &channel.encode(resolution))?;
        }

        let labels = &self.wind.config().channel.labels;
        if let Some(text) = self.wind.encode_gusts(resolution) {
            self.store.write(&gust_file_name(labels, resolution), &text)?;
        }
        if let Some(text) = self.vane.encode(resolution) {
            let name = self.vane.config().labels.file_name(resolution);
            self.store.write(&name, &text)?;
        }
        Ok(())
    }

    /// Re-seed every series from persisted files, dropping stale points
    ///
    /// Missing or unreadable files leave their series empty. Returns the
    /// number of points restored.
    pub fn recover(&mut self, now: u32) -> usize {
        let mut restored = 0;

        for resolution in [Resolution::TenMinute, Resolution::SixtyMinute] {
            for channel in [
                &mut self.temperature,
                &mut self.uv_index,
                self.wind.channel_mut(),
            ] {
                let name = channel.labels().file_name(resolution);
                let points = load_recent(&self.store, &name, resolution, now);
                restored += points.len();
                channel.restore(resolution, points);
            }

            let name = gust_file_name(&self.wind.config().channel.labels, resolution);
            let points = load_recent(&self.store, &name, resolution, now);
            restored += points.len();
            self.wind.restore_gusts(resolution, points);

            let name = self.vane.config().labels.file_name(resolution);
            let points = load_recent(&self.store, &name, resolution, now);
            restored += points.len();
            self.vane.restore(resolution, points);
        }

        for channel in [
            &mut self.temperature,
            &mut self.uv_index,
            self.wind.channel_mut(),
        ] {
            let name = channel.labels().file_name(Resolution::Daily);
            let (maxima, minima) = load_recent_daily(&self.store, &name, now);
            restored += maxima.len() + minima.len();
            channel.restore_daily(maxima, minima);
        }

        info!("Recovered {} points from {}", restored, self.store.dir().display());
        restored
    }

    /// Pre-fill the 10-minute temperature series when nothing was recovered
    pub fn seed_history(&mut self, history: Vec<Sample>) {
        self.temperature.restore(Resolution::TenMinute, history);
    }

    fn log_summary(&self) {
        let fmt = |v: Option<f32>| v.map_or("--".to_string(), |v| format!("{:.2}", v));

        info!(
            "Temperature 10m {} 60m {} | UV 10m {}",
            fmt(self.temperature.avg_10_min()),
            fmt(self.temperature.avg_60_min()),
            fmt(self.uv_index.avg_10_min()),
        );
        info!(
            "Wind {} mph ({}) gust 10m {:.2} 60m {:.2} | heading {} ({})",
            fmt(self.wind.channel().avg_10_min()),
            self.wind.sustained_beaufort().map_or("--", Beaufort::label),
            self.wind.gust_10_min(),
            self.wind.gust_60_min(),
            fmt(self.vane.avg_10_min()),
            self.vane.cardinal_now().map_or("--", Cardinal::label),
        );
    }

    pub fn temperature(&self) -> &SensorChannel {
        &self.temperature
    }

    pub fn wind(&self) -> &WindSpeedAnalyzer {
        &self.wind
    }

    pub fn vane(&self) -> &WindDirectionAverager {
        &self.vane
    }
}

// ---------------------------------------------------------------------------
// Recovery helpers
// ---------------------------------------------------------------------------

/// File holding the gust series of the anemometer with `labels`
pub fn gust_file_name(labels: &ChannelLabels, resolution: Resolution) -> String {
    format!("{}_gust{}.txt", labels.file_prefix, resolution.file_suffix())
}

/// Points no older than the recovery cutoff of `resolution`
///
/// Points stamped after `now` are dropped so restored series stay in
/// chronological order with the readings that follow.
fn recent(points: Vec<Sample>, resolution: Resolution, now: u32) -> Vec<Sample> {
    let cutoff = resolution.recovery_cutoff_secs();
    points
        .into_iter()
        .filter(|p| p.timestamp <= now && now - p.timestamp <= cutoff)
        .collect()
}

fn read_text(store: &FileStore, name: &str) -> Option<String> {
    match store.read(name) {
        Ok(text) => text,
        Err(e) => {
            warn!("Failed to read {}: {}", name, e);
            None
        }
    }
}

fn load_recent(store: &FileStore, name: &str, resolution: Resolution, now: u32) -> Vec<Sample> {
    let Some(text) = read_text(store, name) else {
        return Vec::new();
    };

    match SeriesCodec::decode(&text) {
        Ok(points) => recent(points, resolution, now),
        Err(e) => {
            warn!("Discarding {}: {}", name, e);
            Vec::new()
        }
    }
}

fn load_recent_daily(store: &FileStore, name: &str, now: u32) -> (Vec<Sample>, Vec<Sample>) {
    let Some(text) = read_text(store, name) else {
        return (Vec::new(), Vec::new());
    };

    match SeriesCodec::decode_pair(&text) {
        Ok((maxima, minima)) => (
            recent(maxima, Resolution::Daily, now),
            recent(minima, Resolution::Daily, now),
        ),
        Err(e) => {
            warn!("Discarding {}: {}", name, e);
            (Vec::new(), Vec::new())
        }
    }
}
