//! Time series and timestamp axes.

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

/// A sequence of `(epoch milliseconds, value)` points.
///
/// Serializes as a list of `[millis, value]` pairs.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TimeSeries {
    /// Points in time order.
    pub points: Vec<(i64, f64)>,
}

impl TimeSeries {
    /// Pair values with timestamps, truncating to the shorter of the two.
    pub fn zip(axis: &[i64], values: &[f64]) -> Self {
        Self {
            points: axis.iter().copied().zip(values.iter().copied()).collect(),
        }
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the series has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Timestamps of the series.
    pub fn timestamps(&self) -> impl Iterator<Item = i64> + '_ {
        self.points.iter().map(|(t, _)| *t)
    }

    /// Values of the series.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|(_, v)| *v)
    }
}

/// Evenly spaced timestamps starting at `start`.
pub fn uniform_axis(start: NaiveDateTime, len: usize, step: Duration) -> Vec<i64> {
    let origin = start.and_utc().timestamp_millis();
    let step = step.num_milliseconds();
    (0..len as i64).map(|i| origin + i * step).collect()
}

/// Timestamps of a split-horizon forecast.
///
/// The first `fine_len` points are `fine_step` apart; the rest continue from
/// the end of the fine segment at `coarse_step` spacing.
pub fn split_axis(
    start: NaiveDateTime,
    len: usize,
    fine_len: usize,
    fine_step: Duration,
    coarse_step: Duration,
) -> Vec<i64> {
    let origin = start.and_utc().timestamp_millis();
    let fine = fine_step.num_milliseconds();
    let coarse = coarse_step.num_milliseconds();

    (0..len)
        .map(|i| {
            let fine_steps = i.min(fine_len) as i64;
            let coarse_steps = i.saturating_sub(fine_len) as i64;
            origin + fine_steps * fine + coarse_steps * coarse
        })
        .collect()
}
