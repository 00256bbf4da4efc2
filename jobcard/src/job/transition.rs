//! Which status changes are permitted.
//!
//! Jobs move `new → in_progress → ready → picked_up`. Reaching `picked_up` always requires the
//! billing details collected at pickup, so it is only possible through
//! [`JobStore::complete_pickup`](crate::job_store::JobStore::complete_pickup). Whether a job may
//! also move backwards, and what happens to billing recorded at pickup if it does, is decided by
//! the [`TransitionPolicy`].
//!
//! # Example
//!
//! ```
//! # use jobcard::prelude::*;
//! let policy = TransitionPolicy::Monotonic;
//!
//! assert!(policy.allows(JobStatus::New, JobStatus::Ready));
//! assert!(!policy.allows(JobStatus::Ready, JobStatus::InProgress));
//! assert!(!policy.allows(JobStatus::Ready, JobStatus::PickedUp));
//! ```
use chrono::{DateTime, Utc};

use super::{Job, JobStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransitionPolicy {
    /// Any status may be reached from any other. Billing recorded at pickup is kept if a
    /// picked up job is moved back.
    #[default]
    Free,
    /// As [`TransitionPolicy::Free`], but moving a job out of `picked_up` clears its billing and
    /// pickup time.
    ResetOnReopen,
    /// Jobs only move forwards. Setting the current status again is allowed.
    Monotonic,
}

impl TransitionPolicy {
    /// Whether a plain status change from `from` to `to` is permitted.
    pub fn allows(&self, from: JobStatus, to: JobStatus) -> bool {
        if to == JobStatus::PickedUp {
            return false;
        }
        match self {
            Self::Free | Self::ResetOnReopen => true,
            Self::Monotonic => to.rank() >= from.rank(),
        }
    }

    /// Whether a job currently at `from` may be picked up.
    pub fn allows_pickup(&self, from: JobStatus) -> bool {
        match self {
            Self::Free | Self::ResetOnReopen => true,
            Self::Monotonic => from != JobStatus::PickedUp,
        }
    }

    pub(crate) fn apply(&self, job: &mut Job, to: JobStatus, now: DateTime<Utc>) {
        if *self == Self::ResetOnReopen && job.status == JobStatus::PickedUp {
            job.clear_pickup();
        }
        job.mark_status(to, now);
    }
}
