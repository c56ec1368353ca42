//! Wind analysis
//!
//! - [`WindSpeedAnalyzer`]: anemometer rotation counts to speed, with gust
//!   detection on top of the generic roll-up pipeline
//! - [`WindDirectionAverager`]: speed-weighted vector averaging of vane
//!   headings

pub mod direction;
pub mod speed;

pub use direction::{HeadingVector, WindDirectionAverager};
pub use speed::{GUST_SPREAD, GUST_THRESHOLD, GustState, WindSpeedAnalyzer};
