//! The purpose of this module is to alleviate the need to import many of the `[jobcard]` types.
//!
//! ```
//! # #![allow(unused_imports)]
//! use jobcard::prelude::*;
//! ```
pub use crate::billing::{Breakdown, Currency};
pub use crate::clock::{Clock, SystemClock};
pub use crate::config::BoardConfig;
pub use crate::intent::{Action, Intent, Outcome};
pub use crate::interchange::Snapshot;
pub use crate::job::form::{Draft, JobForm, JobPatch};
pub use crate::job::query::Where;
pub use crate::job::transition::TransitionPolicy;
pub use crate::job::{Job, JobId, JobStatus, PaymentMode};
pub use crate::job_store::{Board, JobStore};
pub use crate::receipt::Receipt;
pub use crate::settings::ShopSettings;
pub use crate::store::memory::InMemoryStore;
pub use crate::store::{KeyValueStore, KeyValueStoreExt, StorageKeys, StoreError};
pub use crate::testing::FixedClock;
pub use crate::{JobBoard, JobCardError};
