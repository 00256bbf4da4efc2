//! The collection of jobs and its persisted copy.
//!
//! [`JobStore`] is the only writer of job state. Every mutation is applied to a copy of the
//! collection, the copy is written to the backing store, and only once that write succeeds does
//! it replace the in memory collection. A failed write therefore leaves the store exactly as it
//! was and is reported as [`JobCardError::PersistenceUnavailable`].
//!
//! Jobs are handed out as clones; changing a returned [`Job`] has no effect on the store.
use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::Mutex;
use tracing::instrument;

use crate::{
    billing,
    clock::date_key,
    config::BoardConfig,
    job::{
        form::{JobForm, JobPatch},
        query::Where,
        Job, JobId, JobStatus, PaymentMode,
    },
    store::{KeyValueStore, KeyValueStoreExt},
    JobCardError,
};

type Result<T> = std::result::Result<T, JobCardError>;

#[derive(Debug, Clone)]
pub struct JobStore<S: KeyValueStore> {
    backing: S,
    jobs: Arc<Mutex<Vec<Job>>>,
    config: Arc<BoardConfig>,
}

impl<S: KeyValueStore> JobStore<S> {
    /// Restores the collection from the backing store.
    ///
    /// A missing record gives an empty collection. So does a record that cannot be decoded,
    /// which is logged; it will be overwritten by the next mutation.
    pub async fn load(backing: S, config: Arc<BoardConfig>) -> Result<Self> {
        let jobs = match backing.get_as::<Vec<Job>>(&config.keys.jobs).await {
            Ok(jobs) => jobs.unwrap_or_default(),
            Err(error) if error.is_decode_error() => {
                tracing::warn!(%error, key = %config.keys.jobs, "Discarding unreadable jobs record");
                Vec::new()
            }
            Err(error) => return Err(error.into()),
        };
        tracing::debug!(count = jobs.len(), "Loaded jobs");
        Ok(Self {
            backing,
            jobs: Arc::new(Mutex::new(jobs)),
            config,
        })
    }

    /// Takes a job in, giving it the next id for today and putting it at the head of the
    /// collection.
    #[instrument(skip_all, fields(job_id))]
    pub async fn create_job(&self, form: JobForm) -> Result<Job> {
        let now = self.config.clock.now();
        let today = self.config.clock.today();
        let job = self
            .mutate(|jobs| {
                let job = form.into_job(next_id(jobs, today), now);
                jobs.insert(0, job.clone());
                Ok(job)
            })
            .await?;
        tracing::Span::current().record("job_id", tracing::field::display(&job.id));
        tracing::debug!("Created job {}", job.id);
        Ok(job)
    }

    #[instrument(skip_all, fields(job_id = %id))]
    pub async fn update_job(&self, id: &JobId, patch: JobPatch) -> Result<Job> {
        let now = self.config.clock.now();
        self.mutate(|jobs| {
            let job = find_mut(jobs, id)?;
            patch.apply(job);
            job.touch(now);
            Ok(job.clone())
        })
        .await
    }

    /// Moves a job to `status`, stamping `readyAt` the first time it becomes ready.
    ///
    /// Moving to [`JobStatus::PickedUp`] is rejected; use [`JobStore::complete_pickup`].
    #[instrument(skip_all, fields(job_id = %id, %status))]
    pub async fn change_status(&self, id: &JobId, status: JobStatus) -> Result<Job> {
        let now = self.config.clock.now();
        let policy = self.config.transition_policy;
        self.mutate(|jobs| {
            let job = find_mut(jobs, id)?;
            if !policy.allows(job.status, status) {
                return Err(JobCardError::InvalidTransition {
                    id: id.clone(),
                    current: job.status,
                    requested: status,
                });
            }
            policy.apply(job, status, now);
            Ok(job.clone())
        })
        .await
    }

    /// Records the settlement and marks the job picked up.
    ///
    /// The balance is what remains of `final_amount` after the advance, never negative.
    #[instrument(skip_all, fields(job_id = %id, %payment_mode))]
    pub async fn complete_pickup(
        &self,
        id: &JobId,
        final_amount: f64,
        payment_mode: PaymentMode,
    ) -> Result<Job> {
        let now = self.config.clock.now();
        let policy = self.config.transition_policy;
        let final_amount = billing::non_negative(final_amount);
        self.mutate(|jobs| {
            let job = find_mut(jobs, id)?;
            if !policy.allows_pickup(job.status) {
                return Err(JobCardError::InvalidTransition {
                    id: id.clone(),
                    current: job.status,
                    requested: JobStatus::PickedUp,
                });
            }
            job.mark_picked_up(final_amount, payment_mode, now);
            Ok(job.clone())
        })
        .await
    }

    /// Removes a job. Deleting an id that is not present does nothing.
    #[instrument(skip_all, fields(job_id = %id))]
    pub async fn delete_job(&self, id: &JobId) -> Result<()> {
        let mut jobs = self.jobs.lock().await;
        let Some(position) = jobs.iter().position(|job| job.id == *id) else {
            tracing::debug!("Job {id} already absent");
            return Ok(());
        };
        let mut updated = jobs.clone();
        updated.remove(position);
        self.persist(&updated).await?;
        *jobs = updated;
        tracing::debug!("Deleted job {id}");
        Ok(())
    }

    pub async fn find(&self, id: &JobId) -> Option<Job> {
        self.jobs
            .lock()
            .await
            .iter()
            .find(|job| job.id == *id)
            .cloned()
    }

    /// The matching jobs, most recently created first.
    pub async fn list(&self, query: &Where<'_>) -> Vec<Job> {
        self.jobs
            .lock()
            .await
            .iter()
            .filter(|job| query.matches(job))
            .cloned()
            .collect()
    }

    /// Free text search, as typed into the board's search box.
    pub async fn search(&self, text: &str) -> Vec<Job> {
        self.list(&Where::text(text)).await
    }

    pub async fn all(&self) -> Vec<Job> {
        self.jobs.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.jobs.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.lock().await.is_empty()
    }

    /// The matching jobs split into one column per status.
    pub async fn board(&self, query: &Where<'_>) -> Board {
        Board::new(self.list(query).await)
    }

    /// Overwrites the whole collection, as an import does. Order is kept as given.
    #[instrument(skip_all, fields(count = jobs.len()))]
    pub async fn replace_all(&self, jobs: Vec<Job>) -> Result<()> {
        let mut current = self.jobs.lock().await;
        self.persist(&jobs).await?;
        *current = jobs;
        tracing::debug!("Replaced all jobs");
        Ok(())
    }

    /// Removes the persisted record and empties the collection.
    #[instrument(skip_all)]
    pub async fn clear(&self) -> Result<()> {
        let mut current = self.jobs.lock().await;
        self.backing
            .remove(&self.config.keys.jobs)
            .await
            .inspect_err(|error| tracing::error!(%error, "Failed to remove jobs"))?;
        current.clear();
        Ok(())
    }

    async fn mutate<T>(&self, mutation: impl FnOnce(&mut Vec<Job>) -> Result<T>) -> Result<T> {
        let mut jobs = self.jobs.lock().await;
        let mut updated = jobs.clone();
        let value = mutation(&mut updated)?;
        self.persist(&updated).await?;
        *jobs = updated;
        Ok(value)
    }

    async fn persist(&self, jobs: &[Job]) -> Result<()> {
        self.backing
            .set_as(&self.config.keys.jobs, jobs)
            .await
            .inspect_err(|error| tracing::error!(%error, "Failed to persist jobs"))?;
        Ok(())
    }
}

fn find_mut<'a>(jobs: &'a mut [Job], id: &JobId) -> Result<&'a mut Job> {
    jobs.iter_mut()
        .find(|job| job.id == *id)
        .ok_or_else(|| JobCardError::JobNotFound(id.clone()))
}

/// The id for the next job taken in on `today`.
///
/// The sequence is one more than the number of today's jobs, or than the highest sequence used
/// today if jobs have since been deleted, so ids are never reused.
fn next_id(jobs: &[Job], today: NaiveDate) -> JobId {
    let key = date_key(today);
    let todays = || jobs.iter().filter(|job| job.id.starts_with(&key));
    let count = u32::try_from(todays().count()).unwrap_or(u32::MAX);
    let highest = todays().filter_map(|job| job.id.sequence()).max().unwrap_or(0);
    JobId::new(today, count.max(highest).saturating_add(1))
}

/// Jobs grouped by status, in workflow order.
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    pub columns: Vec<Column>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub status: JobStatus,
    pub jobs: Vec<Job>,
}

impl Board {
    fn new(jobs: Vec<Job>) -> Self {
        let mut columns: Vec<Column> = JobStatus::ALL
            .into_iter()
            .map(|status| Column {
                status,
                jobs: Vec::new(),
            })
            .collect();
        for job in jobs {
            columns[job.status.rank()].jobs.push(job);
        }
        Self { columns }
    }

    pub fn column(&self, status: JobStatus) -> &[Job] {
        &self.columns[status.rank()].jobs
    }
}
