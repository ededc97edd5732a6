//! Time access behind a trait so code generation and date defaults can be
//! tested against a fixed instant.

use chrono::{DateTime, Local, NaiveDate, Utc};

pub trait Clock {
    /// Current time in UTC.
    fn now_utc(&self) -> DateTime<Utc>;

    /// Current time in the local timezone.
    fn now_local(&self) -> DateTime<Local> {
        self.now_utc().with_timezone(&Local)
    }

    /// Seconds since the UNIX epoch, as consumed by [crate::totp::Totp].
    fn unix_seconds(&self) -> u64 {
        // Instants before 1970 clamp to the first window
        u64::try_from(self.now_utc().timestamp()).unwrap_or(0)
    }

    /// Milliseconds since the UNIX epoch, sent as `clientTime`.
    fn unix_millis(&self) -> i64 {
        self.now_utc().timestamp_millis()
    }

    /// The local calendar date, used when a query leaves its dates open.
    fn today(&self) -> NaiveDate {
        self.now_local().date_naive()
    }
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn now_local(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// A clock frozen at a single instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// Creates a clock frozen at the given seconds since the UNIX epoch.
    pub fn from_unix_seconds(seconds: i64) -> Option<Self> {
        DateTime::<Utc>::from_timestamp(seconds, 0).map(Self)
    }
}

impl Clock for FixedClock {
    fn now_utc(&self) -> DateTime<Utc> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{Clock, FixedClock};

    #[test]
    fn fixed_clock_reports_its_instant() {
        let clock = FixedClock::from_unix_seconds(1_111_111_109).unwrap();

        assert_eq!(1_111_111_109, clock.unix_seconds());
        assert_eq!(1_111_111_109_000, clock.unix_millis());
    }

    #[test]
    fn clamps_instants_before_the_epoch() {
        let clock = FixedClock::from_unix_seconds(-60).unwrap();

        assert_eq!(0, clock.unix_seconds());
    }
}
