//! Calendar sources used to decide segment applicability.

use chrono::NaiveDate;

/// A trait that supplies the calendar date a segment must be valid for.
pub trait Clock {
    /// Returns the current date.
    fn today(&self) -> NaiveDate;
}

/// The local wall clock.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

impl<F: Fn() -> NaiveDate> Clock for F {
    fn today(&self) -> NaiveDate {
        self()
    }
}

/// Formats a date the way it appears in requests and identifiers (`YYYYMMDD`).
pub(crate) fn day_stamp(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}
