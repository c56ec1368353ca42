//! Drives a full day of readings through every analyzer and checks that the
//! persisted text brings a fresh station back to the same state.

use aero_core::config::{ChannelLabels, Smoothing};
use aero_core::metrics::Cardinal;
use aero_core::storage::SECONDS_PER_DAY;
use aero_core::{
    ChannelConfig, Resolution, Sample, SensorChannel, SeriesCodec, WindDirectionAverager,
    WindDirectionConfig, WindSpeedAnalyzer, WindSpeedConfig,
};

const BASE_PERIOD: u32 = 4;
const PERIODS_PER_10_MIN: u32 = 150;
const PERIODS_PER_60_MIN: u32 = 900;

struct Station {
    temperature: SensorChannel,
    wind: WindSpeedAnalyzer,
    vane: WindDirectionAverager,
}

impl Station {
    fn new() -> Self {
        let mut temperature =
            ChannelConfig::new(ChannelLabels::new("Temperature", "temperature", "F"));
        temperature.smoothing = Smoothing::enabled(5, 10.0);

        Self {
            temperature: SensorChannel::new(temperature).unwrap(),
            wind: WindSpeedAnalyzer::new(WindSpeedConfig::default()).unwrap(),
            vane: WindDirectionAverager::new(WindDirectionConfig::default()).unwrap(),
        }
    }

    fn tick(&mut self, period: u32) {
        let time = 1_700_000_000 + period * BASE_PERIOD;

        // Slow ramp with a spike every 500 periods
        let mut temperature = 50.0 + (period % 900) as f32 / 180.0;
        if period % 500 == 250 {
            temperature += 80.0;
        }
        self.temperature.add_reading(Sample::new(time, temperature));

        // Steady breeze with one strong burst per hour
        let rotations = if period % PERIODS_PER_60_MIN == 450 { 40 } else { 12 };
        let speed = self.wind.add_wind_reading(time, rotations);

        // Vane swings between 80° and 100°
        let heading = 80.0 + (period % 21) as f32;
        self.vane.add_direction_reading(time, heading, speed);

        let period = period + 1;
        if period % PERIODS_PER_10_MIN == 0 {
            self.temperature.rollup_10min();
            self.wind.rollup_10min();
            self.wind.rollup_gust_10min();
            self.vane.rollup_10min();
        }
        if period % PERIODS_PER_60_MIN == 0 {
            self.temperature.rollup_60min();
            self.wind.rollup_60min();
            self.wind.rollup_gust_60min();
            self.vane.rollup_60min();
        }
    }
}

fn run_day() -> Station {
    let mut station = Station::new();
    for period in 0..SECONDS_PER_DAY / BASE_PERIOD {
        station.tick(period);
    }
    station.temperature.rollup_day();
    station.wind.rollup_day();
    station
}

#[test]
fn test_full_day_fills_bounded_series() {
    let station = run_day();

    for resolution in [Resolution::TenMinute, Resolution::SixtyMinute] {
        assert_eq!(station.temperature.series(resolution).len(), 24);
        assert_eq!(station.wind.channel().series(resolution).len(), 24);
        assert_eq!(station.wind.gust_series(resolution).map(|s| s.len()), Some(24));
        assert_eq!(station.vane.series(resolution).map(|s| s.len()), Some(24));
    }
    assert_eq!(station.temperature.daily_maxima().len(), 1);
}

#[test]
fn test_spikes_reach_extrema_but_not_averages() {
    let station = run_day();

    let (max, _) = station
        .temperature
        .daily_maxima()
        .newest()
        .zip(station.temperature.daily_minima().newest())
        .unwrap();
    assert!(max.value > 120.0, "daily max {} should include the spike", max.value);

    for point in station.temperature.series(Resolution::TenMinute).iter() {
        assert!(point.value < 56.0, "10-min average {} polluted by spike", point.value);
    }
}

#[test]
fn test_hourly_gust_and_direction() {
    let station = run_day();

    // 40 rotations over 4 s is 22.5 mph, above the gust threshold
    assert_eq!(station.wind.gust_60_min(), 22.5);
    let hourly = station.vane.avg_60_min().unwrap();
    assert!((85.0..95.0).contains(&hourly), "hourly heading {}", hourly);
    assert_eq!(Cardinal::assess(hourly), Cardinal::E);
}

#[test]
fn test_persisted_text_restores_series() {
    let station = run_day();
    let mut restored = Station::new();

    for resolution in [Resolution::TenMinute, Resolution::SixtyMinute] {
        let text = station.temperature.encode(resolution);
        restored
            .temperature
            .restore(resolution, SeriesCodec::decode(&text).unwrap());

        let text = station.wind.encode_gusts(resolution).unwrap();
        restored
            .wind
            .restore_gusts(resolution, SeriesCodec::decode(&text).unwrap());

        let text = station.vane.encode(resolution).unwrap();
        restored
            .vane
            .restore(resolution, SeriesCodec::decode(&text).unwrap());
    }

    let (maxima, minima) =
        SeriesCodec::decode_pair(&station.temperature.encode(Resolution::Daily)).unwrap();
    restored.temperature.restore_daily(maxima, minima);

    assert_eq!(
        restored.temperature.encode(Resolution::TenMinute),
        station.temperature.encode(Resolution::TenMinute)
    );
    assert_eq!(
        restored.temperature.encode(Resolution::Daily),
        station.temperature.encode(Resolution::Daily)
    );
    assert_eq!(restored.wind.gust_60_min(), station.wind.gust_60_min());
    assert_eq!(
        restored.vane.encode(Resolution::SixtyMinute),
        station.vane.encode(Resolution::SixtyMinute)
    );
}
