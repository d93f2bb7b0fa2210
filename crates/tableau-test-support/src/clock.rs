//! Test clock: deterministic `Clock` implementation for tests.

use chrono::{NaiveDate, NaiveDateTime};
use tableau_core::clock::Clock;

/// A clock that always returns a fixed point in time.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl FixedClock {
    /// A fixed clock at `yyyy-mm-dd hh:mm:ss`.
    ///
    /// # Panics
    ///
    /// Panics if the components do not form a valid date and time.
    #[must_use]
    pub fn at(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> Self {
        Self(
            NaiveDate::from_ymd_opt(year, month, day)
                .and_then(|d| d.and_hms_opt(hour, min, sec))
                .expect("FixedClock::at requires a valid timestamp"),
        )
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
