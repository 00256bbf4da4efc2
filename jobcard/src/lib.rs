//! Job tracking for repair and service shops.
//!
//! A [`JobBoard`] keeps the shop's jobs, from intake to pickup, together with the shop settings
//! printed on receipts and an autosaved intake draft. Every change is written straight through to
//! a [`KeyValueStore`] so the board can be restored after a restart.
//!
//! ```
//! # use jobcard::prelude::*;
//! # tokio_test();
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn tokio_test() {
//! let board = JobBoard::open(InMemoryStore::new()).await.unwrap();
//!
//! let job = board
//!     .create_job(
//!         JobForm::default()
//!             .with_customer_name("Alice")
//!             .with_item_type("Phone")
//!             .with_estimate("400")
//!             .with_tax_percent("10"),
//!     )
//!     .await
//!     .unwrap();
//! board.jobs().change_status(&job.id, JobStatus::Ready).await.unwrap();
//!
//! let pickup = board.request_pickup(&job.id, 440.0, PaymentMode::Upi).await.unwrap();
//! println!("{}", pickup.prompt());
//! let outcome = pickup.confirm().await.unwrap();
//! # assert!(matches!(outcome, Outcome::Updated(job) if job.status == JobStatus::PickedUp));
//! # }
//! ```
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::RwLock;
use tracing::instrument;

pub mod billing;
pub mod clock;
pub mod config;
pub mod intent;
pub mod interchange;
pub mod job;
pub mod job_store;
pub mod prelude;
pub mod receipt;
pub mod settings;
pub mod store;
pub mod testing;

use billing::{Breakdown, Currency};
use config::BoardConfig;
use intent::{Action, Intent};
use interchange::{ImportDocument, Snapshot};
use job::{
    form::{Draft, JobForm},
    query::Where,
    Job, JobId, JobStatus, PaymentMode,
};
use job_store::{Board, JobStore};
use receipt::Receipt;
use settings::ShopSettings;
use store::{KeyValueStore, KeyValueStoreExt, StoreError};

type Result<T> = std::result::Result<T, JobCardError>;

/// The shop's board: its jobs, settings and intake draft.
///
/// Cloning a board is cheap and every clone operates on the same state.
#[derive(Debug, Clone)]
pub struct JobBoard<S: KeyValueStore> {
    backing: S,
    jobs: JobStore<S>,
    settings: Arc<RwLock<ShopSettings>>,
    config: Arc<BoardConfig>,
}

impl<S: KeyValueStore> JobBoard<S> {
    pub async fn open(backing: S) -> Result<Self> {
        Self::open_with_config(backing, BoardConfig::default()).await
    }

    /// Restores the board from `backing`. Records that cannot be read are replaced with their
    /// defaults.
    #[instrument(skip_all)]
    pub async fn open_with_config(backing: S, config: BoardConfig) -> Result<Self> {
        let config = Arc::new(config);
        let jobs = JobStore::load(backing.clone(), config.clone()).await?;
        let settings = read_or_default::<ShopSettings, _>(&backing, &config.keys.settings)
            .await?
            .normalized();
        Ok(Self {
            backing,
            jobs,
            settings: Arc::new(RwLock::new(settings)),
            config,
        })
    }

    pub fn jobs(&self) -> &JobStore<S> {
        &self.jobs
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn currency(&self) -> &Currency {
        &self.config.currency
    }

    /// Takes in a job from the intake form and discards the saved draft.
    pub async fn create_job(&self, form: JobForm) -> Result<Job> {
        let job = self.jobs.create_job(form).await?;
        if let Err(error) = self.discard_draft().await {
            tracing::warn!(%error, job_id = %job.id, "Failed to discard draft after intake");
        }
        Ok(job)
    }

    /// The matching jobs split into status columns.
    pub async fn board(&self, query: &Where<'_>) -> Board {
        self.jobs.board(query).await
    }

    pub async fn settings(&self) -> ShopSettings {
        self.settings.read().await.clone()
    }

    /// Saves the shop settings, falling back to the default name if none is given.
    pub async fn save_settings(&self, settings: ShopSettings) -> Result<ShopSettings> {
        self.write_settings(settings).await
    }

    pub async fn load_draft(&self) -> Result<Draft> {
        read_or_default(&self.backing, &self.config.keys.draft).await
    }

    #[instrument(skip_all)]
    pub async fn save_draft(&self, draft: &Draft) -> Result<()> {
        self.backing
            .set_as(&self.config.keys.draft, draft)
            .await
            .inspect_err(|error| tracing::error!(%error, "Failed to save draft"))?;
        Ok(())
    }

    #[instrument(skip_all)]
    pub async fn discard_draft(&self) -> Result<()> {
        self.backing.remove(&self.config.keys.draft).await?;
        Ok(())
    }

    /// The live totals for a form being filled in.
    pub fn preview(&self, form: &JobForm) -> Breakdown {
        Breakdown::from_form(form)
    }

    pub async fn receipt(&self, id: &JobId) -> Result<Receipt> {
        let job = self.require(id).await?;
        Ok(Receipt::new(self.settings().await, job))
    }

    pub async fn snapshot(&self) -> Snapshot {
        Snapshot {
            jobs: self.jobs.all().await,
            settings: self.settings().await,
        }
    }

    /// The whole board as a pretty printed JSON document.
    pub async fn export(&self) -> Result<String> {
        Ok(self.snapshot().await.to_json()?)
    }

    pub fn export_file_name(&self) -> String {
        Snapshot::file_name(self.config.clock.today())
    }

    /// Replaces the jobs and settings with those in `document`, without asking.
    ///
    /// The board is left untouched if the document is malformed or cannot be stored.
    pub async fn import(&self, document: &str) -> Result<Snapshot> {
        let snapshot = ImportDocument::parse(document)?.resolve(self.settings().await);
        self.apply_snapshot(snapshot.clone()).await?;
        Ok(snapshot)
    }

    /// Clears the jobs, settings and draft, without asking. If any of them cannot be removed the
    /// records already cleared are written back and the error is returned.
    #[instrument(skip_all)]
    pub async fn reset(&self) -> Result<()> {
        let keys = &self.config.keys;
        let mut settings = self.settings.write().await;
        let previous_jobs = self.jobs.all().await;
        let previous_settings = self.backing.get(&keys.settings).await?;

        self.jobs.clear().await?;
        if let Err(error) = self.backing.remove(&keys.settings).await {
            tracing::error!(%error, "Failed to remove settings during reset");
            self.restore_jobs(previous_jobs).await;
            return Err(error.into());
        }
        if let Err(error) = self.discard_draft().await {
            if let Some(previous) = previous_settings {
                if let Err(rollback) = self.backing.set(&keys.settings, previous).await {
                    tracing::error!(%rollback, "Failed to restore settings after a failed reset");
                }
            }
            self.restore_jobs(previous_jobs).await;
            return Err(error);
        }
        *settings = ShopSettings::default();
        tracing::debug!("Reset board");
        Ok(())
    }

    pub async fn request_delete(&self, id: &JobId) -> Result<Intent<S>> {
        let job = self.require(id).await?;
        let prompt = format!("Delete job {}? This cannot be undone.", job.id);
        Ok(Intent::new(self.clone(), Action::DeleteJob(job.id), prompt))
    }

    pub async fn request_status_change(
        &self,
        id: &JobId,
        status: JobStatus,
    ) -> Result<Intent<S>> {
        let job = self.require(id).await?;
        if !self.config.transition_policy.allows(job.status, status) {
            return Err(JobCardError::InvalidTransition {
                id: job.id,
                current: job.status,
                requested: status,
            });
        }
        let prompt = format!("Move {} → {}?", job.id, status.label());
        Ok(Intent::new(
            self.clone(),
            Action::ChangeStatus { id: job.id, status },
            prompt,
        ))
    }

    pub async fn request_pickup(
        &self,
        id: &JobId,
        final_amount: f64,
        payment_mode: PaymentMode,
    ) -> Result<Intent<S>> {
        let job = self.require(id).await?;
        if !self.config.transition_policy.allows_pickup(job.status) {
            return Err(JobCardError::InvalidTransition {
                id: job.id,
                current: job.status,
                requested: JobStatus::PickedUp,
            });
        }
        let final_amount = billing::non_negative(final_amount);
        let advance = job.estimate.advance;
        let currency = self.currency();
        let prompt = format!(
            "Confirm pickup?\nFinal: {}\nAdvance: {}\nBalance: {}\nPayment: {payment_mode}",
            currency.format(final_amount),
            currency.format(advance),
            currency.format(billing::settle(final_amount, advance)),
        );
        Ok(Intent::new(
            self.clone(),
            Action::CompletePickup {
                id: job.id,
                final_amount,
                payment_mode,
            },
            prompt,
        ))
    }

    /// Parses `document` and asks before replacing the board with it.
    pub async fn request_import(&self, document: &str) -> Result<Intent<S>> {
        let snapshot = ImportDocument::parse(document)?.resolve(self.settings().await);
        Ok(Intent::new(
            self.clone(),
            Action::Import(snapshot),
            "Importing will REPLACE current jobs & settings. Continue?".to_owned(),
        ))
    }

    pub fn request_reset(&self) -> Intent<S> {
        Intent::new(
            self.clone(),
            Action::Reset,
            "This will permanently clear ALL data (jobs, settings, drafts). Are you sure?"
                .to_owned(),
        )
    }

    /// Writes the jobs then the settings, restoring the previous jobs if the settings cannot be
    /// written.
    #[instrument(skip_all, fields(jobs = snapshot.jobs.len()))]
    pub(crate) async fn apply_snapshot(&self, snapshot: Snapshot) -> Result<()> {
        let previous = self.jobs.all().await;
        self.jobs.replace_all(snapshot.jobs).await?;
        if let Err(error) = self.write_settings(snapshot.settings).await {
            self.restore_jobs(previous).await;
            return Err(error);
        }
        tracing::debug!("Imported snapshot");
        Ok(())
    }

    async fn restore_jobs(&self, previous: Vec<Job>) {
        if let Err(rollback) = self.jobs.replace_all(previous).await {
            tracing::error!(%rollback, "Failed to restore jobs");
        }
    }

    async fn write_settings(&self, settings: ShopSettings) -> Result<ShopSettings> {
        let settings = settings.normalized();
        let mut current = self.settings.write().await;
        self.backing
            .set_as(&self.config.keys.settings, &settings)
            .await
            .inspect_err(|error| tracing::error!(%error, "Failed to persist settings"))?;
        *current = settings.clone();
        Ok(settings)
    }

    async fn require(&self, id: &JobId) -> Result<Job> {
        self.jobs
            .find(id)
            .await
            .ok_or_else(|| JobCardError::JobNotFound(id.clone()))
    }
}

async fn read_or_default<T, S>(backing: &S, key: &str) -> Result<T>
where
    T: serde::de::DeserializeOwned + Default + Send,
    S: KeyValueStore,
{
    match backing.get_as::<T>(key).await {
        Ok(value) => Ok(value.unwrap_or_default()),
        Err(error) if error.is_decode_error() => {
            tracing::warn!(%error, key, "Discarding unreadable record");
            Ok(T::default())
        }
        Err(error) => Err(error.into()),
    }
}

#[derive(Debug, Error)]
pub enum JobCardError {
    #[error("Job {0} not found")]
    JobNotFound(JobId),
    #[error("Job {id} cannot move from {current} to {requested}")]
    InvalidTransition {
        id: JobId,
        current: JobStatus,
        requested: JobStatus,
    },
    #[error("Import rejected: {0}")]
    MalformedImport(String),
    #[error("Error persisting to storage")]
    PersistenceUnavailable(#[from] StoreError),
    #[error("Error encoding data")]
    EncodeError(#[from] serde_json::Error),
}
