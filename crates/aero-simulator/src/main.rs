//! Desktop simulator for the aero weather station engine.
//!
//! Replays the station's main loop on a virtual clock: synthetic readings
//! every base period, roll-ups on the 10-minute / 60-minute / daily
//! schedule, and every roll-up persisted as text into a data directory.
//! On start-up the directory is read back and each series re-seeded with
//! whatever is still recent enough, exactly as the station does after a
//! power cut.
//!
//! # Environment
//!
//! | Variable         | Default      | Meaning                         |
//! |------------------|--------------|---------------------------------|
//! | `AERO_DATA_DIR`  | `aero-data`  | Directory for persisted series  |
//! | `AERO_SIM_DAYS`  | `2`          | Simulated days to run           |
//! | `RUST_LOG`       | unset        | `env_logger` filter             |

mod station;
mod store;

use std::env;
use std::f64::consts::PI;
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};

use log::{error, info};

use aero_core::Sample;
use aero_core::metrics::Cardinal;
use aero_core::storage::SECONDS_PER_DAY;

use station::{BASE_PERIOD_SECS, PERIODS_PER_DAY, Readings, Station};
use store::FileStore;

// ---------------------------------------------------------------------------
// Simulation constants
// ---------------------------------------------------------------------------

const DEFAULT_DATA_DIR: &str = "aero-data";

const DEFAULT_SIM_DAYS: u32 = 2;

/// 10-minute points of temperature history seeded on a cold start
const WARM_UP_POINTS: usize = 12;

// ---------------------------------------------------------------------------
// Mock data generation
// ---------------------------------------------------------------------------

/// Linear ramp between two bounds with a periodic spike on top
///
/// The ramp reverses direction at either bound. A spike lifts a single
/// reading without moving the ramp itself.
struct LinearWithSpikes {
    value: f32,
    increment: f32,
    low: f32,
    high: f32,
    spike: f32,
    spike_every: u32,
    cycles: u32,
}

impl LinearWithSpikes {
    fn next(&mut self) -> f32 {
        self.cycles += 1;

        let reading = if self.cycles % self.spike_every == 0 {
            self.value + self.spike
        } else {
            self.value
        };

        self.value += self.increment;
        if self.value >= self.high || self.value <= self.low {
            self.increment = -self.increment;
        }
        reading
    }
}

/// Anemometer rotation counts rising from `first` to `last` over `periods`,
/// with a gust burst partway through every cycle
struct RampedRotations {
    first: f32,
    last: f32,
    periods: u32,
    spike: f32,
    spike_period: u32,
    count: u32,
}

impl RampedRotations {
    fn next(&mut self) -> u32 {
        self.count += 1;
        let increment = (self.last - self.first) / self.periods as f32;
        let mut rotations = self.first + increment * self.count as f32;

        if self.count == self.spike_period {
            rotations += self.spike;
        }
        if self.count == self.spike_period + 5 {
            rotations += 1.5 * self.spike;
        }
        if self.count == self.periods {
            self.count = 0;
        }
        rotations.max(0.0) as u32
    }
}

/// Generates one base period of synthetic readings at a time.
struct MockSensorGenerator {
    temperature: LinearWithSpikes,
    rotations: RampedRotations,
    heading_deg: f32,
}

impl MockSensorGenerator {
    fn new() -> Self {
        Self {
            temperature: LinearWithSpikes {
                value: 55.0,
                increment: 0.002,
                low: 45.0,
                high: 75.0,
                spike: 60.0,
                spike_every: 1_000,
                cycles: 0,
            },
            rotations: RampedRotations {
                first: 0.0,
                last: 12.0,
                periods: 1_800,
                spike: 20.0,
                spike_period: 1_200,
                count: 0,
            },
            heading_deg: 200.0,
        }
    }

    fn next_readings(&mut self, time: u32) -> Readings {
        // Vane drifts slowly clockwise, wrapping through north
        self.heading_deg = (self.heading_deg + 0.05) % 360.0;

        Readings {
            time,
            temperature: self.temperature.next(),
            uv_index: uv_index_at(time),
            rotations: self.rotations.next(),
            heading_deg: self.heading_deg,
        }
    }

    /// Generate `count` 10-minute temperature points ending at `end_ts`.
    fn generate_history(&self, count: usize, interval_secs: u32, end_ts: u32) -> Vec<Sample> {
        let start_ts = end_ts.saturating_sub(count as u32 * interval_secs);
        (1..=count)
            .map(|i| {
                let ts = start_ts + i as u32 * interval_secs;
                let t = ts as f64;
                let value = self.temperature.value as f64 + 2.0 * (t / 5_400.0).sin();
                Sample::new(ts, value as f32)
            })
            .collect()
    }
}

/// Daylight UV: a half sine from 06:00 to 18:00 UTC, zero at night
fn uv_index_at(time: u32) -> f32 {
    let day_fraction = (time % SECONDS_PER_DAY) as f64 / SECONDS_PER_DAY as f64;
    let daylight = ((day_fraction - 0.25) * 2.0 * PI).sin();
    (8.0 * daylight).max(0.0) as f32
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    env_logger::init();

    let data_dir = env::var("AERO_DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.into());
    let days = env::var("AERO_SIM_DAYS")
        .ok()
        .and_then(|d| d.parse().ok())
        .unwrap_or(DEFAULT_SIM_DAYS);

    info!("Starting aero simulator");
    info!("Data directory: {}, simulating {} day(s)", data_dir, days);

    let store = match FileStore::open(&data_dir) {
        Ok(store) => store,
        Err(e) => {
            error!("Cannot open data directory {}: {}", data_dir, e);
            return ExitCode::FAILURE;
        }
    };

    let mut station = match Station::new(store) {
        Ok(station) => station,
        Err(e) => {
            error!("Invalid station configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let start = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as u32;

    let mut sensor_gen = MockSensorGenerator::new();
    if station.recover(start) == 0 {
        info!("Nothing recovered, seeding {} points of history", WARM_UP_POINTS);
        station.seed_history(sensor_gen.generate_history(WARM_UP_POINTS, 600, start));
    }

    // -----------------------------------------------------------------------
    // Main loop (virtual clock)
    // -----------------------------------------------------------------------
    for period in 0..days * PERIODS_PER_DAY {
        let time = start + period * BASE_PERIOD_SECS;
        let readings = sensor_gen.next_readings(time);

        if let Err(e) = station.tick(&readings) {
            error!("Failed to persist roll-up at {}: {}", time, e);
        }
    }

    info!(
        "Done: {} daily temperature maxima, last 60-min gust {:.2}, heading {}",
        station.temperature().daily_maxima().len(),
        station.wind().gust_60_min(),
        station.vane().cardinal_now().map_or("--", Cardinal::label)
    );
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_spikes_do_not_move_ramp() {
        let mut ramp = LinearWithSpikes {
            value: 10.0,
            increment: 1.0,
            low: 0.0,
            high: 100.0,
            spike: 50.0,
            spike_every: 3,
            cycles: 0,
        };
        let readings: Vec<f32> = (0..6).map(|_| ramp.next()).collect();
        assert_eq!(readings, [10.0, 11.0, 62.0, 13.0, 14.0, 65.0]);
    }

    #[test]
    fn test_linear_reverses_at_bounds() {
        let mut ramp = LinearWithSpikes {
            value: 1.0,
            increment: 1.0,
            low: 0.0,
            high: 3.0,
            spike: 0.0,
            spike_every: 1_000,
            cycles: 0,
        };
        let readings: Vec<f32> = (0..6).map(|_| ramp.next()).collect();
        assert_eq!(readings, [1.0, 2.0, 3.0, 2.0, 1.0, 0.0]);
    }

    #[test]
    fn test_rotations_ramp_and_burst() {
        let mut rotations = RampedRotations {
            first: 0.0,
            last: 10.0,
            periods: 10,
            spike: 4.0,
            spike_period: 2,
            count: 0,
        };
        let cycle: Vec<u32> = (0..10).map(|_| rotations.next()).collect();
        assert_eq!(cycle, [1, 6, 3, 4, 5, 6, 13, 8, 9, 10]);
        // Cycle restarts
        assert_eq!(rotations.next(), 1);
    }

    #[test]
    fn test_uv_is_zero_at_night() {
        assert_eq!(uv_index_at(0), 0.0);
        assert!(uv_index_at(SECONDS_PER_DAY / 2) > 7.9);
        assert_eq!(uv_index_at(SECONDS_PER_DAY / 8 * 7), 0.0);
    }

    #[test]
    fn test_history_spacing() {
        let sensor_gen = MockSensorGenerator::new();
        let history = sensor_gen.generate_history(6, 600, 10_000);
        assert_eq!(history.len(), 6);
        assert_eq!(history.first().map(|s| s.timestamp), Some(7_000));
        assert_eq!(history.last().map(|s| s.timestamp), Some(10_000));
    }
}
