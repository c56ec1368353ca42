//! Error types for the aero engine

use thiserror_no_std::Error;

/// Longest field excerpt kept in a [`DecodeError`]
pub const FIELD_EXCERPT_LEN: usize = 16;

/// Truncated copy of an offending text field
pub type FieldExcerpt = heapless::String<FIELD_EXCERPT_LEN>;

/// Rejected configuration values
///
/// Raised at construction time. A bad capacity or period would break the
/// bounded-memory guarantees of the engine, so nothing is built from it.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// A series was configured with room for nothing
    #[error("Series capacity for {series} must be at least 1")]
    ZeroCapacity {
        /// Which series was misconfigured
        series: &'static str,
    },

    /// The smoothing window cannot hold a single value
    #[error("Moving average window must hold at least 1 value")]
    ZeroSmoothingWindow,

    /// Base sampling period is zero, negative or not a number
    #[error("Base period must be a positive number of seconds (got {period})")]
    InvalidPeriod {
        /// The rejected period in seconds
        period: f32,
    },

    /// Anemometer calibration factor is zero, negative or not a number
    #[error("Calibration factor must be positive (got {factor})")]
    InvalidCalibration {
        /// The rejected factor
        factor: f32,
    },

    /// Outlier delta is negative or not a number
    #[error("Outlier delta must be a non-negative number (got {delta})")]
    InvalidOutlierDelta {
        /// The rejected delta
        delta: f32,
    },

    /// A wind vane setting is infinite or not a number
    #[error("Wind direction {setting} must be a finite number (got {value})")]
    NonFiniteVaneSetting {
        /// Which setting was rejected
        setting: &'static str,
        /// The rejected value
        value: f32,
    },
}

/// Result type for configuration checks
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Failures while decoding persisted series text
///
/// Recoverable: the usual policy is to log it and start the affected
/// series empty.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DecodeError {
    /// A point has no `,` between its timestamp and value
    #[error("Point {index} has no time/value separator: {field}")]
    MissingSeparator {
        /// Zero-based point index
        index: usize,
        /// Offending point text
        field: FieldExcerpt,
    },

    /// The timestamp is not an unsigned integer
    #[error("Point {index} has an invalid timestamp: {field}")]
    InvalidTimestamp {
        /// Zero-based point index
        index: usize,
        /// Offending timestamp text
        field: FieldExcerpt,
    },

    /// The value is present but not a number
    #[error("Point {index} has an invalid value: {field}")]
    InvalidValue {
        /// Zero-based point index
        index: usize,
        /// Offending value text
        field: FieldExcerpt,
    },

    /// A maxima/minima text holds more than two halves
    #[error("Expected at most 2 series halves, found {found}")]
    TooManyHalves {
        /// Number of `|`-separated halves found
        found: usize,
    },
}

/// Result type for decode operations
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Copy as much of `text` as fits into a [`FieldExcerpt`].
pub(crate) fn excerpt(text: &str) -> FieldExcerpt {
    let mut out = FieldExcerpt::new();
    for c in text.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excerpt_truncates_long_fields() {
        let field = excerpt("12345678901234567890");
        assert_eq!(field.as_str(), "1234567890123456");
    }

    #[test]
    fn test_excerpt_keeps_short_fields() {
        assert_eq!(excerpt("abc").as_str(), "abc");
        assert_eq!(excerpt("").as_str(), "");
    }
}
