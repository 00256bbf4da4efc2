//! Raw form input for creating and editing jobs.
//!
//! [`JobForm`] holds the intake form's fields exactly as typed, all as text, so it can be
//! autosaved as the draft while being filled in. Numbers are only coerced once the form is
//! turned into a [`Job`].
//!
//! # Example
//!
//! ```
//! # use jobcard::job::form::JobForm;
//! let form = JobForm::default()
//!     .with_customer_name("  Alice ")
//!     .with_item_type("Phone")
//!     .with_estimate("400")
//!     .with_tax_percent("10")
//!     .with_advance("oops");
//!
//! let estimate = form.estimate();
//! assert_eq!(estimate.amount, 400.0);
//! assert_eq!(estimate.advance, 0.0);
//! ```
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{serde_helpers::optional_wall_time, Billing, Customer, Estimate, Item, Job, JobId};
use crate::billing::{coerce_amount, non_negative};

/// The intake form, keyed by form field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JobForm {
    pub customer_name: String,
    pub customer_phone: String,
    pub item_type: String,
    pub item_brand: String,
    pub item_model: String,
    pub item_serial: String,
    pub issue: String,
    pub accessories: String,
    pub estimate: String,
    pub advance: String,
    pub tax_percent: String,
    pub promised_at: String,
    pub notes: String,
}

/// Unsaved intake form content kept for session continuity.
pub type Draft = JobForm;

macro_rules! with_field {
    ($($method:ident => $field:ident),* $(,)?) => {
        $(
            pub fn $method(self, value: impl Into<String>) -> Self {
                Self {
                    $field: value.into(),
                    ..self
                }
            }
        )*
    };
}

impl JobForm {
    with_field! {
        with_customer_name => customer_name,
        with_customer_phone => customer_phone,
        with_item_type => item_type,
        with_item_brand => item_brand,
        with_item_model => item_model,
        with_item_serial => item_serial,
        with_issue => issue,
        with_accessories => accessories,
        with_estimate => estimate,
        with_advance => advance,
        with_tax_percent => tax_percent,
        with_promised_at => promised_at,
        with_notes => notes,
    }

    /// The estimate the form describes, with unusable numbers read as zero.
    pub fn estimate(&self) -> Estimate {
        Estimate {
            amount: coerce_amount(&self.estimate),
            tax_percent: coerce_amount(&self.tax_percent),
            advance: coerce_amount(&self.advance),
        }
    }

    /// The promised date and time, if the field holds one.
    pub fn promised_at(&self) -> Option<NaiveDateTime> {
        optional_wall_time::parse(&self.promised_at)
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub(crate) fn into_job(self, id: JobId, now: DateTime<Utc>) -> Job {
        let estimate = self.estimate();
        let promised_at = self.promised_at();
        Job {
            id,
            created_at: now,
            updated_at: now,
            customer: Customer {
                name: self.customer_name.trim().to_owned(),
                phone: self.customer_phone.trim().to_owned(),
            },
            item: Item {
                kind: self.item_type,
                brand: self.item_brand,
                model: self.item_model,
                serial: self.item_serial,
            },
            issue: self.issue,
            accessories: self.accessories,
            estimate,
            status: Default::default(),
            promised_at,
            ready_at: None,
            picked_at: None,
            billing: Billing::default(),
            notes: self.notes,
        }
    }
}

/// Replacement values for a job's editable fields; [`None`] leaves a field as it is.
///
/// Converting a [`JobForm`] gives a patch that overwrites every editable field, which is what
/// saving the job detail form does.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobPatch {
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub item_type: Option<String>,
    pub item_brand: Option<String>,
    pub item_model: Option<String>,
    pub item_serial: Option<String>,
    pub issue: Option<String>,
    pub accessories: Option<String>,
    pub estimate_amount: Option<f64>,
    pub tax_percent: Option<f64>,
    pub advance: Option<f64>,
    pub promised_at: Option<Option<NaiveDateTime>>,
    pub notes: Option<String>,
}

macro_rules! with_text {
    ($($method:ident => $field:ident),* $(,)?) => {
        $(
            pub fn $method(self, value: impl Into<String>) -> Self {
                Self {
                    $field: Some(value.into()),
                    ..self
                }
            }
        )*
    };
}

macro_rules! with_amount {
    ($($method:ident => $field:ident),* $(,)?) => {
        $(
            pub fn $method(self, value: f64) -> Self {
                Self {
                    $field: Some(value),
                    ..self
                }
            }
        )*
    };
}

impl JobPatch {
    with_text! {
        with_customer_name => customer_name,
        with_customer_phone => customer_phone,
        with_item_type => item_type,
        with_item_brand => item_brand,
        with_item_model => item_model,
        with_item_serial => item_serial,
        with_issue => issue,
        with_accessories => accessories,
        with_notes => notes,
    }

    with_amount! {
        with_estimate_amount => estimate_amount,
        with_tax_percent => tax_percent,
        with_advance => advance,
    }

    pub fn with_promised_at(self, promised_at: Option<NaiveDateTime>) -> Self {
        Self {
            promised_at: Some(promised_at),
            ..self
        }
    }

    pub(crate) fn apply(self, job: &mut Job) {
        fn replace<T>(target: &mut T, value: Option<T>) {
            if let Some(value) = value {
                *target = value;
            }
        }
        let amount = |value: Option<f64>| value.map(non_negative);

        replace(&mut job.customer.name, self.customer_name);
        replace(&mut job.customer.phone, self.customer_phone);
        replace(&mut job.item.kind, self.item_type);
        replace(&mut job.item.brand, self.item_brand);
        replace(&mut job.item.model, self.item_model);
        replace(&mut job.item.serial, self.item_serial);
        replace(&mut job.issue, self.issue);
        replace(&mut job.accessories, self.accessories);
        replace(&mut job.estimate.amount, amount(self.estimate_amount));
        replace(&mut job.estimate.tax_percent, amount(self.tax_percent));
        replace(&mut job.estimate.advance, amount(self.advance));
        replace(&mut job.promised_at, self.promised_at);
        replace(&mut job.notes, self.notes);
    }
}

impl From<JobForm> for JobPatch {
    fn from(form: JobForm) -> Self {
        let estimate = form.estimate();
        let promised_at = form.promised_at();
        Self {
            customer_name: Some(form.customer_name),
            customer_phone: Some(form.customer_phone),
            item_type: Some(form.item_type),
            item_brand: Some(form.item_brand),
            item_model: Some(form.item_model),
            item_serial: Some(form.item_serial),
            issue: Some(form.issue),
            accessories: Some(form.accessories),
            estimate_amount: Some(estimate.amount),
            tax_percent: Some(estimate.tax_percent),
            advance: Some(estimate.advance),
            promised_at: Some(promised_at),
            notes: Some(form.notes),
        }
    }
}
