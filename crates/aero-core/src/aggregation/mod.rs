//! Reading aggregation for a single sensor channel
//!
//! [`ReadingAggregator`] accumulates raw readings between 10-minute
//! roll-ups: a running sum and count for the sub-interval average, the
//! sub-interval and day extrema, and optionally a moving average used to
//! reject outliers before they reach the running average.

pub mod channel;

pub use channel::SensorChannel;

use log::debug;

use crate::config::Smoothing;
use crate::error::ConfigResult;
use crate::storage::{BoundedSeries, Sample};

/// Sentinel larger in magnitude than any physically possible reading
///
/// Minima start at `+VALUE_LIMIT` and maxima at `-VALUE_LIMIT`, so the
/// first real reading always replaces them.
pub const VALUE_LIMIT: f32 = 1.0e9;

/// Moving average state
///
/// A seeded average of exactly zero is distinct from "no readings yet".
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MovingAverage {
    /// No reading has been seen since the aggregator was created
    Unseeded,
    /// Mean of the accepted readings in the smoothing window
    Seeded(f32),
}

impl MovingAverage {
    /// The average, `None` until the first reading arrives
    pub fn value(self) -> Option<f32> {
        match self {
            Self::Unseeded => None,
            Self::Seeded(avg) => Some(avg),
        }
    }
}

/// Smoothing state, present only when smoothing is enabled
#[derive(Debug, Clone)]
struct Smoother {
    average: MovingAverage,
    window: BoundedSeries<f32>,
    outlier_delta: f32,
}

/// Accumulates raw readings between roll-ups
#[derive(Debug, Clone)]
pub struct ReadingAggregator {
    sum: f32,
    count: u32,
    last_sample: Sample,
    sub_interval_min: Sample,
    sub_interval_max: Sample,
    day_min: Sample,
    day_max: Sample,
    smoother: Option<Smoother>,
}

impl ReadingAggregator {
    /// Create an aggregator, smoothing per `smoothing`
    pub fn new(smoothing: &Smoothing) -> ConfigResult<Self> {
        smoothing.validate()?;

        let smoother = if smoothing.enabled {
            Some(Smoother {
                average: MovingAverage::Unseeded,
                window: BoundedSeries::new("moving average", smoothing.window)?,
                outlier_delta: smoothing.outlier_delta,
            })
        } else {
            None
        };

        Ok(Self {
            sum: 0.0,
            count: 0,
            last_sample: Sample::default(),
            sub_interval_min: Sample::new(0, VALUE_LIMIT),
            sub_interval_max: Sample::new(0, -VALUE_LIMIT),
            day_min: Sample::new(0, VALUE_LIMIT),
            day_max: Sample::new(0, -VALUE_LIMIT),
            smoother,
        })
    }

    /// Add a raw reading
    ///
    /// With smoothing enabled, outliers are kept out of the running and
    /// moving averages. Extrema always see the raw reading.
    pub fn add_reading(&mut self, sample: Sample) {
        self.last_sample = sample;

        let accepted = match self.smoother.as_mut() {
            None => true,
            Some(smoother) => {
                // The very first reading seeds the average and is never an outlier
                let seeding = smoother.average == MovingAverage::Unseeded;
                if seeding {
                    smoother.average = MovingAverage::Seeded(sample.value);
                }

                if !seeding && smoother.is_outlier(sample.value) {
                    debug!(
                        "Rejected outlier {} (moving average {:?})",
                        sample, smoother.average
                    );
                    false
                } else {
                    smoother.window.push(sample.value);
                    if let Some(mean) = smoother.window.mean() {
                        smoother.average = MovingAverage::Seeded(mean);
                    }
                    true
                }
            }
        };

        if accepted {
            self.count += 1;
            self.sum += sample.value;
        }

        self.update_extrema(sample);
    }

    /// Whether `sample` falls outside the band around the moving average
    ///
    /// Readings above twice the average or more than the outlier delta below
    /// it are outliers. Nothing is an outlier while smoothing is disabled,
    /// before the average is seeded, or while the average is exactly zero.
    pub fn is_outlier(&self, sample: Sample) -> bool {
        self.smoother
            .as_ref()
            .is_some_and(|smoother| smoother.is_outlier(sample.value))
    }

    fn update_extrema(&mut self, sample: Sample) {
        if sample.value < self.sub_interval_min.value {
            self.sub_interval_min = sample;
        }
        if sample.value > self.sub_interval_max.value {
            self.sub_interval_max = sample;
        }
        if sample.value < self.day_min.value {
            self.day_min = sample;
        }
        if sample.value > self.day_max.value {
            self.day_max = sample;
        }
    }

    /// Mean of the readings accepted since the last sub-interval clear
    ///
    /// `None` when no reading has been accepted yet.
    pub fn average_now(&self) -> Option<f32> {
        if self.count == 0 {
            None
        } else {
            Some(self.sum / self.count as f32)
        }
    }

    /// Reset the running average and the sub-interval extrema
    pub fn clear_sub_interval(&mut self) {
        self.sum = 0.0;
        self.count = 0;
        self.sub_interval_min = Sample::new(0, VALUE_LIMIT);
        self.sub_interval_max = Sample::new(0, -VALUE_LIMIT);
    }

    /// Reset the day extrema
    pub fn clear_day(&mut self) {
        self.day_min = Sample::new(0, VALUE_LIMIT);
        self.day_max = Sample::new(0, -VALUE_LIMIT);
    }

    /// Most recent reading, whether or not it was accepted
    pub fn last_sample(&self) -> Sample {
        self.last_sample
    }

    /// Readings accepted since the last sub-interval clear
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Current moving average, `None` with smoothing disabled
    pub fn moving_average(&self) -> Option<MovingAverage> {
        self.smoother.as_ref().map(|smoother| smoother.average)
    }

    /// Lowest reading this sub-interval, `None` if there were none
    pub fn sub_interval_min(&self) -> Option<Sample> {
        seen(self.sub_interval_min)
    }

    /// Highest reading this sub-interval, `None` if there were none
    pub fn sub_interval_max(&self) -> Option<Sample> {
        seen(self.sub_interval_max)
    }

    /// Lowest reading today, `None` if there were none
    pub fn day_min(&self) -> Option<Sample> {
        seen(self.day_min)
    }

    /// Highest reading today, `None` if there were none
    pub fn day_max(&self) -> Option<Sample> {
        seen(self.day_max)
    }
}

impl Smoother {
    fn is_outlier(&self, value: f32) -> bool {
        match self.average {
            MovingAverage::Unseeded => false,
            MovingAverage::Seeded(avg) if avg == 0.0 => false,
            MovingAverage::Seeded(avg) => value > avg * 2.0 || value < avg - self.outlier_delta,
        }
    }
}

/// Hide the sentinels from callers.
fn seen(extreme: Sample) -> Option<Sample> {
    if libm::fabsf(extreme.value) >= VALUE_LIMIT {
        None
    } else {
        Some(extreme)
    }
}
