use chrono::{DateTime, NaiveDateTime, Utc};

use super::{Job, JobId, JobStatus};

/// A filter over jobs, built from the constructors below and combined with
/// [`Where::and`], [`Where::or`] and `!`.
///
/// # Example
///
/// ```
/// # use jobcard::prelude::*;
/// let waiting_for_alice = Where::text("ali")
///     .and(!Where::status_equal(JobStatus::PickedUp));
/// # let _ = waiting_for_alice;
/// ```
#[derive(Debug, PartialEq, Clone)]
#[non_exhaustive]
pub struct Where<'a>(pub(crate) Query<'a>);

#[derive(Debug, PartialEq, Clone)]
pub(crate) enum Query<'a> {
    All,
    Not(Box<Query<'a>>),
    And(Vec<Query<'a>>),
    Or(Vec<Query<'a>>),
    Text(&'a str),
    IdEquals(&'a JobId),
    StatusEqual(JobStatus),
    CreatedBefore(DateTime<Utc>),
    CreatedAfter(DateTime<Utc>),
    PromisedBefore(NaiveDateTime),
}

impl<'a> Where<'a> {
    pub fn and(mut self, other: Where<'a>) -> Self {
        if let Query::And(ref mut constraints) = self.0 {
            constraints.push(other.0);
        } else {
            self.0 = Query::And(vec![self.0, other.0]);
        }
        self
    }

    pub fn or(mut self, other: Where<'a>) -> Self {
        if let Query::Or(ref mut constraints) = self.0 {
            constraints.push(other.0);
        } else {
            self.0 = Query::Or(vec![self.0, other.0]);
        }
        self
    }

    /// Matches every job.
    pub fn all() -> Self {
        Self(Query::All)
    }

    /// Case-insensitive substring search over the id, customer, item, issue, accessories and
    /// notes. A blank query matches every job.
    pub fn text(query: &'a str) -> Self {
        Self(Query::Text(query))
    }

    pub fn id_equals(id: &'a JobId) -> Self {
        Self(Query::IdEquals(id))
    }

    pub fn status_equal(status: JobStatus) -> Self {
        Self(Query::StatusEqual(status))
    }

    pub fn created_before(created_at: DateTime<Utc>) -> Self {
        Self(Query::CreatedBefore(created_at))
    }

    pub fn created_after(created_at: DateTime<Utc>) -> Self {
        Self(Query::CreatedAfter(created_at))
    }

    /// Jobs promised before the given shop local time. Jobs without a promise never match.
    pub fn promised_before(promised_at: NaiveDateTime) -> Self {
        Self(Query::PromisedBefore(promised_at))
    }

    pub fn matches(&self, job: &Job) -> bool {
        self.0.matches(job)
    }
}

impl<'a> std::ops::Not for Where<'a> {
    type Output = Self;
    fn not(self) -> Self {
        Self(Query::Not(Box::new(self.0)))
    }
}

impl Default for Where<'_> {
    fn default() -> Self {
        Self::all()
    }
}

impl<'a> Query<'a> {
    fn matches(&self, job: &Job) -> bool {
        match self {
            Query::All => true,
            Query::Not(inner) => !inner.matches(job),
            Query::And(inner) => inner.iter().all(|query| query.matches(job)),
            Query::Or(inner) => inner.iter().any(|query| query.matches(job)),
            Query::Text(text) => {
                let text = text.trim().to_lowercase();
                text.is_empty() || job.search_text().contains(&text)
            }
            Query::IdEquals(id) => job.id == **id,
            Query::StatusEqual(status) => job.status == *status,
            Query::CreatedBefore(created_at) => job.created_at < *created_at,
            Query::CreatedAfter(created_at) => job.created_at > *created_at,
            Query::PromisedBefore(promised_at) => job
                .promised_at
                .is_some_and(|promised| promised < *promised_at),
        }
    }
}

#[cfg(test)]
mod test {
    use std::ops::{Add, Sub};

    use chrono::{NaiveDate, TimeDelta};

    use super::*;

    fn all_of<'a>(queries: &[Where<'a>]) -> Where<'a> {
        queries.iter().cloned().reduce(Where::and).unwrap()
    }

    fn any_of<'a>(queries: &[Where<'a>]) -> Where<'a> {
        queries.iter().cloned().reduce(Where::or).unwrap()
    }

    #[test]
    fn query_matches() {
        let mut job = Job::raw_job();
        let promised = NaiveDate::from_ymd_opt(2024, 1, 20)
            .unwrap()
            .and_hms_opt(17, 30, 0)
            .unwrap();
        job.promised_at = Some(promised);
        let other_id = JobId::from("20240115-002");

        let matching = [
            Where::all(),
            Where::text(""),
            Where::text("   "),
            Where::text("ALI"),
            Where::text("nokia 3310"),
            Where::text("sn-1"),
            Where::text("charger"),
            Where::text("20240115"),
            Where::id_equals(&job.id),
            Where::status_equal(JobStatus::New),
            Where::created_before(job.created_at.add(TimeDelta::hours(1))),
            Where::created_after(job.created_at.sub(TimeDelta::hours(1))),
            Where::promised_before(promised.add(TimeDelta::minutes(1))),
        ];
        let non_matching = [
            Where::text("bob"),
            Where::id_equals(&other_id),
            Where::status_equal(JobStatus::Ready),
            Where::created_before(job.created_at),
            Where::created_after(job.created_at),
            Where::promised_before(promised),
        ];

        for query in matching.iter().cloned() {
            assert!(query.matches(&job), "{query:?}");
            assert!(!(!query).matches(&job));
        }
        for query in non_matching.iter().cloned() {
            assert!(!query.matches(&job), "{query:?}");
            assert!((!query).matches(&job));
        }

        assert!(all_of(&matching).matches(&job));
        assert!(any_of(&matching).matches(&job));
        assert!(!all_of(&non_matching).matches(&job));
        assert!(!any_of(&non_matching).matches(&job));
        assert!(any_of(&[non_matching[0].clone(), matching[3].clone()]).matches(&job));
    }

    #[test]
    fn jobs_without_a_promise_are_never_overdue() {
        let job = Job::raw_job();

        assert!(!Where::promised_before(NaiveDateTime::MAX).matches(&job));
    }

    #[test]
    fn combinators_flatten() {
        let query = Where::text("a")
            .and(Where::text("b"))
            .and(Where::text("c"));

        assert_eq!(
            query.0,
            Query::And(vec![Query::Text("a"), Query::Text("b"), Query::Text("c")])
        );
    }
}
