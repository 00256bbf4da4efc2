//! Helpers for testing code built on a [`JobBoard`](crate::JobBoard).
use std::sync::{Arc, Mutex};

use chrono::{DateTime, NaiveDate, TimeDelta, TimeZone, Utc};

use crate::clock::Clock;

/// A clock that only moves when told to.
///
/// Clones share the same time, so a test can keep one and hand another to a
/// [`BoardConfig`](crate::config::BoardConfig). Its calendar day is the UTC date.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    /// A clock at the given UTC minute. Out of range parts fall back to the Unix epoch.
    pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Self {
        let now = Utc
            .with_ymd_and_hms(year, month, day, hour, minute, 0)
            .single()
            .unwrap_or_default();
        Self::new(now)
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = now;
    }

    pub fn advance(&self, delta: TimeDelta) {
        let mut now = self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *now += delta;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Asserts the ids of the jobs persisted in a [`KeyValueStore`](crate::store::KeyValueStore),
/// in stored order. Must be used in an async context.
///
/// ```
/// # use jobcard::prelude::*;
/// # use jobcard::testing::assert_persisted;
/// # tokio_test();
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn tokio_test() {
/// let backing = InMemoryStore::new();
/// let board = JobBoard::open(backing.clone()).await.unwrap();
///
/// let job = board.create_job(JobForm::default().with_customer_name("Alice")).await.unwrap();
///
/// assert_persisted!(backing, ids: [job.id.as_str()]);
/// # }
/// ```
#[macro_export]
macro_rules! assert_persisted {
    ($store:expr, ids: [$($id:expr),* $(,)?]) => {
        $crate::assert_persisted!($store, key: "sjc.jobs", ids: [$($id),*])
    };
    ($store:expr, key: $key:expr, ids: [$($id:expr),* $(,)?]) => {{
        let jobs: ::std::option::Option<::std::vec::Vec<$crate::job::Job>> =
            $crate::store::KeyValueStoreExt::get_as(&$store, $key)
                .await
                .expect("Failed to read persisted jobs");
        let jobs = jobs.unwrap_or_default();
        let ids: ::std::vec::Vec<&str> = jobs.iter().map(|job| job.id.as_str()).collect();
        let expected: ::std::vec::Vec<&str> = vec![$($id),*];
        assert_eq!(ids, expected, "persisted job ids");
    }};
}

pub use assert_persisted;
