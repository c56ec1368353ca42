//! Roll-up pipeline for a generic sensor channel

use alloc::string::String;

use log::{info, warn};

use super::ReadingAggregator;
use crate::config::{ChannelConfig, ChannelLabels};
use crate::error::ConfigResult;
use crate::storage::{BoundedSeries, Resolution, Sample, TEN_MINUTE_POINTS_PER_HOUR};

/// One physical sensor: its aggregator plus the series its roll-ups feed
///
/// ## Roll-ups
///
/// - **10-minute**: running average of the accepted readings, then the
///   sub-interval state is cleared
/// - **60-minute**: mean of the newest six 10-minute points; nothing is cleared
/// - **Daily**: the day's raw minimum and maximum, then the day extrema are
///   cleared
///
/// The caller drives the cadence and must run every 10-minute roll-up before
/// a 60-minute roll-up that depends on it.
#[derive(Debug, Clone)]
pub struct SensorChannel {
    config: ChannelConfig,
    aggregator: ReadingAggregator,
    ten_minute: BoundedSeries,
    sixty_minute: BoundedSeries,
    daily_maxima: BoundedSeries,
    daily_minima: BoundedSeries,
}

impl SensorChannel {
    /// Build a channel, rejecting configurations that would break the
    /// bounded-memory guarantees
    pub fn new(config: ChannelConfig) -> ConfigResult<Self> {
        config.validate()?;

        let capacities = config.capacities;
        Ok(Self {
            aggregator: ReadingAggregator::new(&config.smoothing)?,
            ten_minute: BoundedSeries::new("10-min", capacities.ten_minute)?,
            sixty_minute: BoundedSeries::new("60-min", capacities.sixty_minute)?,
            daily_maxima: BoundedSeries::new("daily", capacities.daily)?,
            daily_minima: BoundedSeries::new("daily", capacities.daily)?,
            config,
        })
    }

    /// Feed one raw reading to the aggregator
    pub fn add_reading(&mut self, sample: Sample) {
        self.aggregator.add_reading(sample);
    }

    /// Close the current 10-minute window
    ///
    /// Returns the pushed point, or `None` if no reading was accepted since
    /// the last roll-up (nothing is pushed then).
    pub fn rollup_10min(&mut self) -> Option<Sample> {
        let Some(avg) = self.aggregator.average_now() else {
            warn!(
                "{}: no accepted readings, skipping 10-min roll-up",
                self.config.labels.label
            );
            self.aggregator.clear_sub_interval();
            return None;
        };

        let point = Sample::new(self.aggregator.last_sample().timestamp, avg);
        self.ten_minute.push(point);
        self.aggregator.clear_sub_interval();

        info!("{}: 10-min roll-up {}", self.config.labels.label, point);
        Some(point)
    }

    /// Average the newest hour of 10-minute points
    ///
    /// With fewer than six points available, averages what there is.
    /// Returns `None` (and pushes nothing) while the 10-minute series is empty.
    pub fn rollup_60min(&mut self) -> Option<Sample> {
        let Some(avg) = self.ten_minute.mean_of_newest(TEN_MINUTE_POINTS_PER_HOUR) else {
            warn!(
                "{}: 10-min series empty, skipping 60-min roll-up",
                self.config.labels.label
            );
            return None;
        };

        let point = Sample::new(self.aggregator.last_sample().timestamp, avg);
        self.sixty_minute.push(point);

        info!("{}: 60-min roll-up {}", self.config.labels.label, point);
        Some(point)
    }

    /// Record the day's extrema as `(maximum, minimum)`
    ///
    /// Returns `None` if no reading arrived since the last daily roll-up.
    pub fn rollup_day(&mut self) -> Option<(Sample, Sample)> {
        let extrema = self.aggregator.day_max().zip(self.aggregator.day_min());
        self.aggregator.clear_day();

        let Some((max, min)) = extrema else {
            warn!(
                "{}: no readings today, skipping daily roll-up",
                self.config.labels.label
            );
            return None;
        };

        self.daily_maxima.push(max);
        self.daily_minima.push(min);

        info!(
            "{}: daily roll-up max {} min {}",
            self.config.labels.label, max, min
        );
        Some((max, min))
    }

    /// Last 10-minute average pushed
    pub fn avg_10_min(&self) -> Option<f32> {
        self.ten_minute.newest().map(|s| s.value)
    }

    /// Last 60-minute average pushed
    pub fn avg_60_min(&self) -> Option<f32> {
        self.sixty_minute.newest().map(|s| s.value)
    }

    /// Series kept at `resolution`; for daily data this is the maxima
    pub fn series(&self, resolution: Resolution) -> &BoundedSeries {
        match resolution {
            Resolution::TenMinute => &self.ten_minute,
            Resolution::SixtyMinute => &self.sixty_minute,
            Resolution::Daily => &self.daily_maxima,
        }
    }

    /// Daily maxima, oldest first
    pub fn daily_maxima(&self) -> &BoundedSeries {
        &self.daily_maxima
    }

    /// Daily minima, oldest first
    pub fn daily_minima(&self) -> &BoundedSeries {
        &self.daily_minima
    }

    /// Render the series at `resolution` in this channel's text format
    ///
    /// Daily data renders as `maxima|minima`, or maxima alone for channels
    /// configured to report maxima only.
    pub fn encode(&self, resolution: Resolution) -> String {
        let codec = self.config.format;
        match resolution {
            Resolution::Daily if self.config.report_daily_max_only => {
                codec.encode(self.daily_maxima.iter())
            }
            Resolution::Daily => codec.encode_pair(self.daily_maxima.iter(), self.daily_minima.iter()),
            other => codec.encode(self.series(other).iter()),
        }
    }

    /// Replace the series at `resolution` with recovered points
    ///
    /// Points must be oldest first; only the newest `capacity` are kept. For
    /// [`Resolution::Daily`] the points become the maxima, leaving the minima
    /// untouched. Recency filtering is the caller's responsibility.
    pub fn restore<I>(&mut self, resolution: Resolution, points: I)
    where
        I: IntoIterator<Item = Sample>,
    {
        let series = match resolution {
            Resolution::TenMinute => &mut self.ten_minute,
            Resolution::SixtyMinute => &mut self.sixty_minute,
            Resolution::Daily => &mut self.daily_maxima,
        };
        series.clear();
        series.extend(points);

        info!(
            "{}: restored {} {} points",
            self.config.labels.label,
            series.len(),
            resolution.label()
        );
    }

    /// Replace both daily series with recovered points
    pub fn restore_daily<A, B>(&mut self, maxima: A, minima: B)
    where
        A: IntoIterator<Item = Sample>,
        B: IntoIterator<Item = Sample>,
    {
        self.restore(Resolution::Daily, maxima);
        self.daily_minima.clear();
        self.daily_minima.extend(minima);
    }

    /// Running state of the current sub-interval and day
    pub fn aggregator(&self) -> &ReadingAggregator {
        &self.aggregator
    }

    pub fn labels(&self) -> &ChannelLabels {
        &self.config.labels
    }

    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SeriesCapacities, Smoothing};
    use crate::storage::SeriesCodec;
    use alloc::vec::Vec;

    fn channel() -> SensorChannel {
        SensorChannel::new(ChannelConfig::new(ChannelLabels::new(
            "Temperature",
            "temperature",
            "F",
        )))
        .unwrap()
    }

    fn values(series: &BoundedSeries) -> Vec<f32> {
        series.iter().map(|s| s.value).collect()
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut config = ChannelConfig::default();
        config.capacities.daily = 0;
        assert!(SensorChannel::new(config).is_err());
    }

    #[test]
    fn test_rollup_10min_pushes_average_at_last_time() {
        let mut ch = channel();
        for (t, v) in [(4, 10.0), (8, 11.0), (12, 12.0)] {
            ch.add_reading(Sample::new(t, v));
        }

        assert_eq!(ch.rollup_10min(), Some(Sample::new(12, 11.0)));
        assert_eq!(ch.avg_10_min(), Some(11.0));
        assert_eq!(ch.aggregator().count(), 0, "sub-interval cleared");
        assert_eq!(ch.aggregator().sub_interval_max(), None);
    }

    #[test]
    fn test_rollup_10min_without_readings_pushes_nothing() {
        let mut ch = channel();
        assert_eq!(ch.rollup_10min(), None);
        assert!(ch.series(Resolution::TenMinute).is_empty());
    }

    #[test]
    fn test_rollup_60min_averages_newest_six() {
        let mut ch = channel();
        for i in 1..=6u32 {
            ch.add_reading(Sample::new(i * 600, i as f32));
            ch.rollup_10min();
        }

        let point = ch.rollup_60min().unwrap();
        assert_eq!(point.value, 3.5);
        assert_eq!(point.timestamp, 3600);
        assert_eq!(ch.avg_60_min(), Some(3.5));
        // 10-min series is the source of truth and stays intact
        assert_eq!(ch.series(Resolution::TenMinute).len(), 6);
    }

    #[test]
    fn test_rollup_60min_clamps_to_available_points() {
        let mut ch = channel();
        assert_eq!(ch.rollup_60min(), None);

        for (t, v) in [(600, 2.0), (1200, 4.0)] {
            ch.add_reading(Sample::new(t, v));
            ch.rollup_10min();
        }
        assert_eq!(ch.rollup_60min().map(|s| s.value), Some(3.0));
    }

    #[test]
    fn test_rollup_day_records_raw_extrema() {
        let mut config = ChannelConfig::default();
        config.smoothing = Smoothing::enabled(5, 10.0);
        let mut ch = SensorChannel::new(config).unwrap();

        for (t, v) in [(1, 20.0), (2, 21.0), (3, 95.0), (4, 19.0)] {
            ch.add_reading(Sample::new(t, v));
        }
        ch.rollup_10min();

        // 95 was rejected from the average but still counts for the day maximum
        assert_eq!(ch.avg_10_min(), Some(20.0));
        assert_eq!(
            ch.rollup_day(),
            Some((Sample::new(3, 95.0), Sample::new(4, 19.0)))
        );
        assert_eq!(ch.aggregator().day_max(), None);
        assert_eq!(ch.rollup_day(), None, "no readings since last daily roll-up");
        assert_eq!(ch.daily_maxima().len(), 1);
    }

    #[test]
    fn test_series_stay_bounded() {
        let mut config = ChannelConfig::default();
        config.capacities = SeriesCapacities {
            ten_minute: 6,
            sixty_minute: 2,
            daily: 2,
        };
        let mut ch = SensorChannel::new(config).unwrap();

        for i in 0..50u32 {
            ch.add_reading(Sample::new(i * 600, i as f32));
            ch.rollup_10min();
            ch.rollup_60min();
            ch.rollup_day();
        }
        assert_eq!(ch.series(Resolution::TenMinute).len(), 6);
        assert_eq!(ch.series(Resolution::SixtyMinute).len(), 2);
        assert_eq!(ch.daily_minima().len(), 2);
        assert_eq!(values(ch.series(Resolution::TenMinute)), [44.0, 45.0, 46.0, 47.0, 48.0, 49.0]);
    }

    #[test]
    fn test_encode_daily_pair_and_max_only() {
        let mut ch = channel();
        ch.add_reading(Sample::new(100, 5.0));
        ch.add_reading(Sample::new(200, 9.0));
        ch.rollup_day();

        assert_eq!(ch.encode(Resolution::Daily), "200,9.00|100,5.00");
        assert_eq!(ch.encode(Resolution::TenMinute), "[-EMPTY-]");

        let mut config = ChannelConfig::default();
        config.report_daily_max_only = true;
        config.format = SeriesCodec::new(false, 1);
        let mut ch = SensorChannel::new(config).unwrap();
        ch.add_reading(Sample::new(100, 5.0));
        ch.rollup_day();
        assert_eq!(ch.encode(Resolution::Daily), "100,5.0");
    }

    #[test]
    fn test_restore_round_trip() {
        let mut ch = channel();
        for i in 1..=4u32 {
            ch.add_reading(Sample::new(i * 600, i as f32 * 1.5));
            ch.rollup_10min();
        }
        ch.add_reading(Sample::new(3000, 1.0));
        ch.add_reading(Sample::new(3100, 8.0));
        ch.rollup_day();

        let ten = SeriesCodec::decode(&ch.encode(Resolution::TenMinute)).unwrap();
        let (maxima, minima) = SeriesCodec::decode_pair(&ch.encode(Resolution::Daily)).unwrap();

        let mut restored = channel();
        restored.restore(Resolution::TenMinute, ten);
        restored.restore_daily(maxima, minima);

        assert_eq!(
            values(restored.series(Resolution::TenMinute)),
            values(ch.series(Resolution::TenMinute))
        );
        assert_eq!(restored.daily_maxima().newest(), Some(Sample::new(3100, 8.0)));
        assert_eq!(restored.daily_minima().newest(), Some(Sample::new(3000, 1.0)));
        assert_eq!(restored.avg_10_min(), Some(6.0));
    }

    #[test]
    fn test_restore_keeps_newest_when_over_capacity() {
        let mut ch = channel();
        ch.restore(
            Resolution::SixtyMinute,
            (0..30u32).map(|i| Sample::new(i * 3600, i as f32)),
        );

        let series = ch.series(Resolution::SixtyMinute);
        assert_eq!(series.len(), 24);
        assert_eq!(series.iter().next(), Some(Sample::new(6 * 3600, 6.0)));
    }
}
