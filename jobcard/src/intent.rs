//! Destructive operations that need the user to confirm them first.
//!
//! Requesting one of these from a [`JobBoard`] checks that it can be carried out and returns an
//! [`Intent`] holding the prompt to show. Nothing changes until [`Intent::confirm`] is called;
//! [`Intent::cancel`] drops it with no effect.
use crate::{
    interchange::Snapshot,
    job::{Job, JobId, JobStatus, PaymentMode},
    store::KeyValueStore,
    JobBoard, JobCardError,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    DeleteJob(JobId),
    ChangeStatus {
        id: JobId,
        status: JobStatus,
    },
    CompletePickup {
        id: JobId,
        final_amount: f64,
        payment_mode: PaymentMode,
    },
    Import(Snapshot),
    Reset,
}

/// What a confirmed [`Intent`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Deleted(JobId),
    Updated(Job),
    Imported { jobs: usize },
    Reset,
}

#[derive(Debug)]
#[must_use = "an intent does nothing unless confirmed"]
pub struct Intent<S: KeyValueStore> {
    board: JobBoard<S>,
    action: Action,
    prompt: String,
}

impl<S: KeyValueStore> Intent<S> {
    pub(crate) fn new(board: JobBoard<S>, action: Action, prompt: String) -> Self {
        Self {
            board,
            action,
            prompt,
        }
    }

    pub fn action(&self) -> &Action {
        &self.action
    }

    /// The question to put to the user.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub async fn confirm(self) -> Result<Outcome, JobCardError> {
        tracing::debug!(action = ?self.action, "Confirmed");
        let board = self.board;
        match self.action {
            Action::DeleteJob(id) => {
                board.jobs().delete_job(&id).await?;
                Ok(Outcome::Deleted(id))
            }
            Action::ChangeStatus { id, status } => board
                .jobs()
                .change_status(&id, status)
                .await
                .map(Outcome::Updated),
            Action::CompletePickup {
                id,
                final_amount,
                payment_mode,
            } => board
                .jobs()
                .complete_pickup(&id, final_amount, payment_mode)
                .await
                .map(Outcome::Updated),
            Action::Import(snapshot) => {
                let jobs = snapshot.jobs.len();
                board.apply_snapshot(snapshot).await?;
                Ok(Outcome::Imported { jobs })
            }
            Action::Reset => {
                board.reset().await?;
                Ok(Outcome::Reset)
            }
        }
    }

    pub fn cancel(self) {
        tracing::debug!(action = ?self.action, "Cancelled");
    }
}
