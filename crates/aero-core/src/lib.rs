//! Hardware-independent core library for aero
//!
//! This crate contains the data-acquisition engine of the aero weather
//! station: bounded time-series storage, reading aggregation with smoothing
//! and outlier rejection, the 10-minute / 60-minute / daily roll-up
//! pipeline, gust detection, vector-averaged wind direction, and the
//! delimited text format used to persist series across restarts.
//!
//! It is `#![no_std]` with `extern crate alloc` so it compiles on both
//! embedded targets and desktop hosts (for the simulator and tests).
//! Sensor drivers, storage media and scheduling live with the caller.

#![no_std]

extern crate alloc;

pub mod aggregation;
pub mod config;
pub mod error;
pub mod metrics;
pub mod storage;
pub mod wind;

pub use aggregation::{ReadingAggregator, SensorChannel};
pub use config::{ChannelConfig, WindDirectionConfig, WindSpeedConfig};
pub use error::{ConfigError, DecodeError};
pub use storage::{BoundedSeries, Resolution, Sample, SeriesCodec};
pub use wind::{WindDirectionAverager, WindSpeedAnalyzer};
