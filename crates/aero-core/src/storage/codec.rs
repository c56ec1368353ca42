//! Delimited text format for persisted series.
//!
//! A series renders as `t1,v1~t2,v2~...~tn,vn`, or as [`EMPTY_TOKEN`] when
//! it holds nothing. Daily maxima and minima travel together as
//! `<maxima>|<minima>`, where either half may be the empty token. Values use
//! a fixed number of decimal places; with zero-blanking enabled a value of
//! exactly zero is written as an empty field and reads back as `0.0`.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Write;

use log::debug;
use serde::{Deserialize, Serialize};

use super::Sample;
use crate::error::{DecodeError, DecodeResult, excerpt};

/// Text written for a series with no points
pub const EMPTY_TOKEN: &str = "[-EMPTY-]";

/// Separator between points
pub const POINT_DELIMITER: char = '~';

/// Separator between a point's timestamp and value
pub const FIELD_DELIMITER: char = ',';

/// Separator between the maxima and minima halves of daily data
pub const PAIR_DELIMITER: char = '|';

/// Renders and parses the persisted series text
///
/// Encoding options are fixed per channel; decoding accepts anything the
/// encoder can produce regardless of its options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesCodec {
    /// Digits after the decimal point for each value
    pub decimal_places: usize,
    /// Write zero values as empty fields
    pub blank_zero: bool,
}

impl Default for SeriesCodec {
    fn default() -> Self {
        Self {
            decimal_places: 2,
            blank_zero: false,
        }
    }
}

impl SeriesCodec {
    /// Create a codec writing `decimal_places` digits per value
    pub const fn new(blank_zero: bool, decimal_places: usize) -> Self {
        Self {
            decimal_places,
            blank_zero,
        }
    }

    /// Render points (oldest first) as `time,value` pairs joined by `~`
    pub fn encode<I>(&self, points: I) -> String
    where
        I: IntoIterator<Item = Sample>,
    {
        let mut out = String::new();
        for (i, point) in points.into_iter().enumerate() {
            if i > 0 {
                out.push(POINT_DELIMITER);
            }
            // Writing into a String cannot fail
            let _ = write!(out, "{}{}", point.timestamp, FIELD_DELIMITER);
            if !(self.blank_zero && point.value == 0.0) {
                let _ = write!(out, "{:.*}", self.decimal_places, point.value);
            }
        }

        if out.is_empty() {
            out.push_str(EMPTY_TOKEN);
        }
        out
    }

    /// Render two series independently and join them with `|`
    pub fn encode_pair<A, B>(&self, first: A, second: B) -> String
    where
        A: IntoIterator<Item = Sample>,
        B: IntoIterator<Item = Sample>,
    {
        let mut out = self.encode(first);
        out.push(PAIR_DELIMITER);
        out.push_str(&self.encode(second));
        out
    }

    /// Parse series text back into points, oldest first
    ///
    /// Blank or empty-token text yields no points. An empty value field
    /// reads as `0.0`.
    pub fn decode(text: &str) -> DecodeResult<Vec<Sample>> {
        let text = text.trim();
        if is_empty_series(text) {
            return Ok(Vec::new());
        }

        let mut points = Vec::new();
        for (index, field) in text.split(POINT_DELIMITER).enumerate() {
            points.push(decode_point(index, field.trim())?);
        }

        debug!("Decoded {} points", points.len());
        Ok(points)
    }

    /// Parse `maxima|minima` text into its two series
    ///
    /// Text without a `|` is a maxima-only series; the minima come back
    /// empty.
    pub fn decode_pair(text: &str) -> DecodeResult<(Vec<Sample>, Vec<Sample>)> {
        let halves: Vec<&str> = text.trim().split(PAIR_DELIMITER).collect();
        match halves.as_slice() {
            [maxima] => Ok((Self::decode(maxima)?, Vec::new())),
            [maxima, minima] => Ok((Self::decode(maxima)?, Self::decode(minima)?)),
            _ => Err(DecodeError::TooManyHalves {
                found: halves.len(),
            }),
        }
    }
}

/// Empty text, the empty token, or the per-half tokens older files used.
fn is_empty_series(text: &str) -> bool {
    text.is_empty() || (text.starts_with("[-EMPTY") && text.ends_with("-]"))
}

fn decode_point(index: usize, field: &str) -> DecodeResult<Sample> {
    let (time, value) = field
        .split_once(FIELD_DELIMITER)
        .ok_or_else(|| DecodeError::MissingSeparator {
            index,
            field: excerpt(field),
        })?;

    let timestamp = time
        .trim()
        .parse::<u32>()
        .map_err(|_| DecodeError::InvalidTimestamp {
            index,
            field: excerpt(time),
        })?;

    let field = value.trim();
    let value = if field.is_empty() {
        0.0
    } else {
        match field.parse::<f32>() {
            Ok(v) if v.is_finite() => v,
            _ => {
                return Err(DecodeError::InvalidValue {
                    index,
                    field: excerpt(field),
                });
            }
        }
    };

    Ok(Sample::new(timestamp, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn points(values: &[(u32, f32)]) -> Vec<Sample> {
        values.iter().map(|&(t, v)| Sample::new(t, v)).collect()
    }

    #[test]
    fn test_encode_format() {
        let codec = SeriesCodec::new(false, 2);
        let text = codec.encode(points(&[(100, 1.5), (700, 0.0), (1300, -3.256)]));
        assert_eq!(text, "100,1.50~700,0.00~1300,-3.26");
    }

    #[test]
    fn test_encode_blank_zero() {
        let codec = SeriesCodec::new(true, 1);
        let text = codec.encode(points(&[(100, 0.0), (700, 4.0), (1300, 0.0)]));
        assert_eq!(text, "100,~700,4.0~1300,");
    }

    #[test]
    fn test_encode_empty_series() {
        let codec = SeriesCodec::default();
        assert_eq!(codec.encode(Vec::new()), EMPTY_TOKEN);
    }

    #[test]
    fn test_encode_pair_halves_independent() {
        let codec = SeriesCodec::new(false, 0);
        let text = codec.encode_pair(points(&[(10, 30.0), (20, 31.0)]), Vec::new());
        assert_eq!(text, "10,30~20,31|[-EMPTY-]");

        let text = codec.encode_pair(Vec::new(), Vec::new());
        assert_eq!(text, "[-EMPTY-]|[-EMPTY-]");
    }

    #[test]
    fn test_round_trip_to_precision() {
        let original = points(&[(1_700_000_000, 12.3456), (1_700_000_600, -0.5), (1_700_001_200, 99.994)]);

        // Half a unit in the last rendered place, plus float slack
        for (decimals, half_unit) in [(0usize, 0.5f32), (1, 0.05), (2, 0.005), (3, 0.0005)] {
            let codec = SeriesCodec::new(false, decimals);
            let decoded = SeriesCodec::decode(&codec.encode(original.iter().copied())).unwrap();

            assert_eq!(decoded.len(), original.len());
            let tolerance = half_unit + 1e-4;
            for (a, b) in original.iter().zip(&decoded) {
                assert_eq!(a.timestamp, b.timestamp);
                assert_abs_diff_eq!(a.value, b.value, epsilon = tolerance);
            }
        }
    }

    #[test]
    fn test_blank_zero_round_trip() {
        let original = points(&[(1, 0.0), (2, 7.25), (3, 0.0), (4, -1.5)]);
        let codec = SeriesCodec::new(true, 2);
        let decoded = SeriesCodec::decode(&codec.encode(original.iter().copied())).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_decode_empty_forms() {
        assert!(SeriesCodec::decode("[-EMPTY-]").unwrap().is_empty());
        assert!(SeriesCodec::decode("").unwrap().is_empty());
        assert!(SeriesCodec::decode("  \n").unwrap().is_empty());
        assert!(SeriesCodec::decode("[-EMPTY HI-]").unwrap().is_empty());
    }

    #[test]
    fn test_decode_splits_on_first_comma_only() {
        let err = SeriesCodec::decode("100,1.5,2").unwrap_err();
        assert!(matches!(err, DecodeError::InvalidValue { index: 0, .. }));
    }

    #[test]
    fn test_decode_errors() {
        assert!(matches!(
            SeriesCodec::decode("100,1.0~200").unwrap_err(),
            DecodeError::MissingSeparator { index: 1, .. }
        ));
        assert!(matches!(
            SeriesCodec::decode("abc,1.0").unwrap_err(),
            DecodeError::InvalidTimestamp { index: 0, .. }
        ));
        assert!(matches!(
            SeriesCodec::decode("100,1.0~200,x7").unwrap_err(),
            DecodeError::InvalidValue { index: 1, .. }
        ));
    }

    #[test]
    fn test_decode_rejects_non_finite() {
        assert!(matches!(
            SeriesCodec::decode("100,NaN~200,1.0").unwrap_err(),
            DecodeError::InvalidValue { index: 0, .. }
        ));
        assert!(matches!(
            SeriesCodec::decode("100,1.0~200,inf").unwrap_err(),
            DecodeError::InvalidValue { index: 1, .. }
        ));
        assert!(matches!(
            SeriesCodec::decode("100,-infinity").unwrap_err(),
            DecodeError::InvalidValue { index: 0, .. }
        ));
    }

    #[test]
    fn test_decode_error_keeps_field_excerpt() {
        match SeriesCodec::decode("100,garbage-value-that-is-long").unwrap_err() {
            DecodeError::InvalidValue { field, .. } => {
                assert_eq!(field.as_str(), "garbage-value-th");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_decode_pair() {
        let (maxima, minima) = SeriesCodec::decode_pair("10,30.00~20,31.00|10,12.00").unwrap();
        assert_eq!(maxima, points(&[(10, 30.0), (20, 31.0)]));
        assert_eq!(minima, points(&[(10, 12.0)]));

        let (maxima, minima) = SeriesCodec::decode_pair("[-EMPTY-]|10,12.00").unwrap();
        assert!(maxima.is_empty());
        assert_eq!(minima.len(), 1);
    }

    #[test]
    fn test_decode_pair_maxima_only() {
        let (maxima, minima) = SeriesCodec::decode_pair("10,5.00~20,6.00").unwrap();
        assert_eq!(maxima.len(), 2);
        assert!(minima.is_empty());
    }

    #[test]
    fn test_decode_pair_rejects_three_halves() {
        assert_eq!(
            SeriesCodec::decode_pair("a|b|c").unwrap_err(),
            DecodeError::TooManyHalves { found: 3 }
        );
    }
}
