//! Forecast cycle identification.

use crate::error::{FlowcastError, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::fmt;

/// One forecast run, named by its output directory (`YYYYMMDD.HHMM`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastCycle {
    /// Directory name, used as the cycle selector.
    pub token: String,
    /// Start of the forecast, UTC.
    pub start_time: NaiveDateTime,
}

impl ForecastCycle {
    /// Decode a cycle directory name.
    ///
    /// The part before the dot is the calendar date, the part after it the
    /// cycle hour times 100 (`1200` is noon).
    pub fn from_token(token: &str) -> Result<Self> {
        let (date_part, hour_part) = token
            .split_once('.')
            .ok_or_else(|| invalid_token(token, "missing '.' separator"))?;

        if date_part.len() != 8 || !date_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid_token(token, "date must be YYYYMMDD"));
        }
        let date = NaiveDate::parse_from_str(date_part, "%Y%m%d")
            .map_err(|e| invalid_token(token, &e.to_string()))?;

        if hour_part.len() != 4 || !hour_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid_token(token, "cycle hour must be HHMM"));
        }
        let hhmm: i64 = hour_part
            .parse()
            .map_err(|_| invalid_token(token, "cycle hour must be HHMM"))?;
        let hour = hhmm / 100;
        if hour > 23 || hhmm % 100 > 59 {
            return Err(invalid_token(token, "cycle hour out of range"));
        }

        let start_time = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| invalid_token(token, "invalid date"))?
            + Duration::hours(hour);

        Ok(Self {
            token: token.to_string(),
            start_time,
        })
    }

    /// Start time in milliseconds since the Unix epoch.
    pub fn start_millis(&self) -> i64 {
        self.start_time.and_utc().timestamp_millis()
    }

    /// Start time as shown in cycle selectors, e.g. `2023-06-01 12:00:00`.
    pub fn display_text(&self) -> String {
        self.start_time.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

impl fmt::Display for ForecastCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.token, self.display_text())
    }
}

fn invalid_token(token: &str, reason: &str) -> FlowcastError {
    FlowcastError::invalid_input(format!("cycle directory '{}': {}", token, reason))
}
