//! The time source used for stamping jobs and deriving date keys.
use chrono::{DateTime, Local, NaiveDate, Utc};

/// Provides the current time.
///
/// The shop's calendar day, used for job ids and export file names, is taken from
/// [`Clock::today`] which defaults to the local date of [`Clock::now`].
pub trait Clock: Send + Sync + std::fmt::Debug {
    fn now(&self) -> DateTime<Utc>;

    fn today(&self) -> NaiveDate {
        self.now().with_timezone(&Local).date_naive()
    }
}

/// The system wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Formats a date as the `YYYYMMDD` key used in job ids and export file names.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn date_key_is_zero_padded() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();

        assert_eq!(date_key(date), "20240105");
    }

    #[test]
    fn system_clock_today_is_local() {
        let clock = SystemClock;
        let before = Local::now().date_naive();
        let today = clock.today();
        let after = Local::now().date_naive();

        assert!(today == before || today == after);
    }
}
