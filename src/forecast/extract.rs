//! Reductions over hourly series.
//!
//! A forecast day is the first [`HOURS`] entries of an hourly array. Both
//! extractors check the shape of the series up front instead of trusting it.

use serde_json::Value;

/// Entries of an hourly series that make up one day.
pub const HOURS: usize = 24;

/// Why a series could not be reduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractError {
    /// The value is not a JSON array.
    NotAnArray,
    /// The array holds fewer than [`HOURS`] entries.
    TooShort { len: usize },
    /// The requested hour is past the day or past the array.
    OutOfRange { index: usize, len: usize },
    /// The entry at `index` is not a number.
    NotANumber { index: usize },
}

#[cfg(feature = "defmt")]
impl defmt::Format for ExtractError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            ExtractError::NotAnArray => defmt::write!(f, "NotAnArray"),
            ExtractError::TooShort { len } => defmt::write!(f, "TooShort({})", len),
            ExtractError::OutOfRange { index, len } => {
                defmt::write!(f, "OutOfRange({} of {})", index, len)
            }
            ExtractError::NotANumber { index } => defmt::write!(f, "NotANumber({})", index),
        }
    }
}

fn number_at(series: &[Value], index: usize) -> Result<f32, ExtractError> {
    series[index]
        .as_f64()
        .map(|v| v as f32)
        .ok_or(ExtractError::NotANumber { index })
}

/// Minimum and maximum over the first [`HOURS`] entries of `sequence`.
pub fn min_max(sequence: &Value) -> Result<(f32, f32), ExtractError> {
    let series = sequence.as_array().ok_or(ExtractError::NotAnArray)?;
    if series.len() < HOURS {
        return Err(ExtractError::TooShort { len: series.len() });
    }

    let first = number_at(series, 0)?;
    (1..HOURS).try_fold((first, first), |(min, max), index| {
        let value = number_at(series, index)?;
        Ok((min.min(value), max.max(value)))
    })
}

/// The entry of `sequence` at `hour` (0-23).
pub fn current_value(sequence: &Value, hour: usize) -> Result<f32, ExtractError> {
    let series = sequence.as_array().ok_or(ExtractError::NotAnArray)?;
    if hour >= HOURS || hour >= series.len() {
        return Err(ExtractError::OutOfRange {
            index: hour,
            len: series.len(),
        });
    }
    number_at(series, hour)
}
