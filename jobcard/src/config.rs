//! Configuration for a [`JobBoard`](crate::JobBoard).
//!
//! # Example
//!
//! ```
//! # use jobcard::prelude::*;
//! let config = BoardConfig::default()
//!     .with_transition_policy(TransitionPolicy::Monotonic)
//!     .with_key_prefix("bench2")
//!     .with_currency(Currency::new("$"));
//!
//! assert_eq!(config.keys.jobs, "bench2.jobs");
//! ```
use std::sync::Arc;

use crate::{
    billing::Currency,
    clock::{Clock, SystemClock},
    job::transition::TransitionPolicy,
    store::StorageKeys,
};

#[derive(Debug, Clone)]
pub struct BoardConfig {
    pub transition_policy: TransitionPolicy,
    pub keys: StorageKeys,
    pub currency: Currency,
    pub clock: Arc<dyn Clock>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            transition_policy: TransitionPolicy::default(),
            keys: StorageKeys::default(),
            currency: Currency::default(),
            clock: Arc::new(SystemClock),
        }
    }
}

impl BoardConfig {
    pub fn with_transition_policy(self, transition_policy: TransitionPolicy) -> Self {
        Self {
            transition_policy,
            ..self
        }
    }

    pub fn with_keys(self, keys: StorageKeys) -> Self {
        Self { keys, ..self }
    }

    pub fn with_key_prefix(self, prefix: &str) -> Self {
        self.with_keys(StorageKeys::with_prefix(prefix))
    }

    pub fn with_currency(self, currency: Currency) -> Self {
        Self { currency, ..self }
    }

    pub fn with_clock(self, clock: impl Clock + 'static) -> Self {
        Self {
            clock: Arc::new(clock),
            ..self
        }
    }
}
