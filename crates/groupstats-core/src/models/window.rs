//! Query date window

use std::fmt;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Date format accepted at the boundary
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Inclusive calendar date range used to decide whether usage counts
///
/// The engine only filters by the window. Sanity checks (`end < start`, span
/// limits) belong to the caller, via [`DateWindow::validated`] or
/// [`DateWindow::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateWindow {
    /// First day included
    pub start: NaiveDate,
    /// Last day included
    pub end: NaiveDate,
}

impl DateWindow {
    /// Create a window without validation
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Create a window, rejecting `end < start` and spans over `max_days` days
    pub fn validated(start: NaiveDate, end: NaiveDate, max_days: u32) -> Result<Self> {
        if end < start {
            return Err(Error::validation("End date must be after start date."));
        }
        if (end - start).num_days() > i64::from(max_days) {
            return Err(Error::validation(format!(
                "Maximum query period is {max_days} days."
            )));
        }
        Ok(Self { start, end })
    }

    /// Parse two `YYYY-MM-DD` dates and validate the result
    pub fn parse(start: &str, end: &str, max_days: u32) -> Result<Self> {
        Self::validated(parse_date(start)?, parse_date(end)?, max_days)
    }

    /// The `days`-long window ending on `today`, e.g. the last 30 days.
    ///
    /// Fails when the start would fall before the earliest representable date.
    pub fn trailing(today: NaiveDate, days: u32) -> Result<Self> {
        let start = today
            .checked_sub_days(Days::new(u64::from(days)))
            .ok_or_else(|| {
                Error::validation(format!("A {days}-day window ending {today} is out of range."))
            })?;
        Ok(Self { start, end: today })
    }

    /// Whether `date` falls inside the window, both ends included
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Days between start and end
    pub fn span_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ~ {}",
            self.start.format(DATE_FORMAT),
            self.end.format(DATE_FORMAT)
        )
    }
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|e| Error::validation(format!("invalid date '{value}': {e}")))
}
