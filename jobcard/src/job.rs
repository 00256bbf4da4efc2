use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    billing::{self, Breakdown},
    clock::date_key,
};

pub mod form;
pub mod query;
mod serde_helpers;
pub mod transition;

/// Identifies a job as `YYYYMMDD-NNN`: the day it was taken in and its sequence number that day.
///
/// Ids read back from storage or an import are kept verbatim even when they do not follow that
/// format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(date: NaiveDate, sequence: u32) -> Self {
        Self(format!("{}-{sequence:03}", date_key(date)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The `YYYYMMDD` part of a well formed id.
    pub fn date_key(&self) -> Option<&str> {
        let (date, _) = self.0.split_once('-')?;
        (date.len() == 8 && date.bytes().all(|b| b.is_ascii_digit())).then_some(date)
    }

    /// The daily sequence number of a well formed id.
    pub fn sequence(&self) -> Option<u32> {
        self.date_key()?;
        let (_, sequence) = self.0.split_once('-')?;
        sequence.parse().ok()
    }

    pub(crate) fn starts_with(&self, date_key: &str) -> bool {
        self.0.starts_with(date_key)
    }
}

impl From<&str> for JobId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for JobId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<JobId> for String {
    fn from(value: JobId) -> Self {
        value.0
    }
}

impl Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A repair or service ticket tracked from intake to pickup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: JobId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub customer: Customer,
    #[serde(default)]
    pub item: Item,
    #[serde(default)]
    pub issue: String,
    #[serde(default)]
    pub accessories: String,
    #[serde(default)]
    pub estimate: Estimate,
    #[serde(default)]
    pub status: JobStatus,
    #[serde(default, with = "serde_helpers::optional_wall_time")]
    pub promised_at: Option<NaiveDateTime>,
    #[serde(default, with = "serde_helpers::optional_timestamp")]
    pub ready_at: Option<DateTime<Utc>>,
    #[serde(default, with = "serde_helpers::optional_timestamp")]
    pub picked_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub billing: Billing,
    #[serde(default)]
    pub notes: String,
}

impl Job {
    /// The estimate figures for this job.
    pub fn breakdown(&self) -> Breakdown {
        Breakdown::from_estimate(&self.estimate)
    }

    /// Everything the board's free text search looks at, lower cased.
    pub(crate) fn search_text(&self) -> String {
        [
            self.id.as_str(),
            &self.customer.name,
            &self.customer.phone,
            &self.item.kind,
            &self.item.brand,
            &self.item.model,
            &self.item.serial,
            &self.issue,
            &self.accessories,
            &self.notes,
        ]
        .join(" ")
        .to_lowercase()
    }

    /// Clamps money fields read from outside the board into the range intake allows.
    pub(crate) fn clamp_amounts(&mut self) {
        let estimate = &mut self.estimate;
        estimate.amount = billing::non_negative(estimate.amount);
        estimate.tax_percent = billing::non_negative(estimate.tax_percent);
        estimate.advance = billing::non_negative(estimate.advance);
        self.billing.final_amount = billing::non_negative(self.billing.final_amount);
        self.billing.balance = billing::non_negative(self.billing.balance);
    }

    pub(crate) fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    pub(crate) fn mark_status(&mut self, status: JobStatus, now: DateTime<Utc>) {
        self.status = status;
        if status == JobStatus::Ready && self.ready_at.is_none() {
            self.ready_at = Some(now);
        }
        self.touch(now);
    }

    pub(crate) fn mark_picked_up(
        &mut self,
        final_amount: f64,
        payment_mode: PaymentMode,
        now: DateTime<Utc>,
    ) {
        self.billing = Billing {
            final_amount,
            balance: billing::settle(final_amount, self.estimate.advance),
            payment_mode: (!payment_mode.as_str().trim().is_empty()).then_some(payment_mode),
        };
        self.status = JobStatus::PickedUp;
        self.picked_at = Some(now);
        self.touch(now);
    }

    pub(crate) fn clear_pickup(&mut self) {
        self.billing = Billing::default();
        self.picked_at = None;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Customer {
    pub name: String,
    pub phone: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Item {
    #[serde(rename = "type")]
    pub kind: String,
    pub brand: String,
    pub model: String,
    pub serial: String,
}

impl Item {
    /// Type, brand and model joined with ` · `, skipping blanks.
    pub fn summary(&self) -> Option<String> {
        let parts: Vec<&str> = [&self.kind, &self.brand, &self.model]
            .into_iter()
            .map(String::as_str)
            .filter(|part| !part.is_empty())
            .collect();
        (!parts.is_empty()).then(|| parts.join(" · "))
    }
}

/// The quote agreed at intake. All amounts are non-negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Estimate {
    pub amount: f64,
    pub tax_percent: f64,
    /// Already paid by the customer.
    pub advance: f64,
}

/// The settlement recorded at pickup; zeroed until then.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Billing {
    pub final_amount: f64,
    pub balance: f64,
    #[serde(with = "serde_helpers::optional_text")]
    pub payment_mode: Option<PaymentMode>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum PaymentMode {
    #[default]
    Upi,
    Card,
    Cash,
    Other(String),
}

impl PaymentMode {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Upi => "UPI",
            Self::Card => "Card",
            Self::Cash => "Cash",
            Self::Other(other) => other,
        }
    }
}

impl Display for PaymentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMode {
    type Err = std::convert::Infallible;

    /// Only the exact names produced by [`PaymentMode::as_str`] map to the named modes. Any
    /// other text is kept verbatim in [`PaymentMode::Other`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "UPI" => Self::Upi,
            "Card" => Self::Card,
            "Cash" => Self::Cash,
            other => Self::Other(other.to_owned()),
        })
    }
}

/// A job's position in the shop's workflow.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[default]
    New,
    InProgress,
    Ready,
    PickedUp,
}

impl JobStatus {
    /// All the statuses in workflow order.
    pub const ALL: [JobStatus; 4] = [
        JobStatus::New,
        JobStatus::InProgress,
        JobStatus::Ready,
        JobStatus::PickedUp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::InProgress => "in_progress",
            Self::Ready => "ready",
            Self::PickedUp => "picked_up",
        }
    }

    /// Human readable name.
    pub fn label(&self) -> &'static str {
        match self {
            Self::New => "New",
            Self::InProgress => "In-Progress",
            Self::Ready => "Ready",
            Self::PickedUp => "Picked-Up",
        }
    }

    pub(crate) fn rank(&self) -> usize {
        *self as usize
    }
}

impl Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown job status: {0}")]
pub struct ParseStatusError(String);

impl FromStr for JobStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseStatusError(s.to_owned()))
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    impl Job {
        pub(crate) fn raw_job() -> Self {
            let now = Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap();
            Self {
                id: "20240115-001".into(),
                created_at: now,
                updated_at: now,
                customer: Customer {
                    name: "Alice".to_owned(),
                    phone: "98765".to_owned(),
                },
                item: Item {
                    kind: "Phone".to_owned(),
                    brand: "Nokia".to_owned(),
                    model: "3310".to_owned(),
                    serial: "SN-1".to_owned(),
                },
                issue: "Cracked screen".to_owned(),
                accessories: "Charger".to_owned(),
                estimate: Estimate {
                    amount: 400.0,
                    tax_percent: 10.0,
                    advance: 200.0,
                },
                status: JobStatus::New,
                promised_at: None,
                ready_at: None,
                picked_at: None,
                billing: Billing::default(),
                notes: String::new(),
            }
        }

        pub(crate) fn with_id(self, id: &str) -> Self {
            Self {
                id: id.into(),
                ..self
            }
        }

        pub(crate) fn with_customer_name(mut self, name: &str) -> Self {
            self.customer.name = name.to_owned();
            self
        }

        pub(crate) fn with_status(self, status: JobStatus) -> Self {
            Self { status, ..self }
        }
    }

    #[test]
    fn job_id_format() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();

        assert_eq!(JobId::new(date, 1).as_str(), "20240115-001");
        assert_eq!(JobId::new(date, 42).as_str(), "20240115-042");
        assert_eq!(JobId::new(date, 1234).as_str(), "20240115-1234");
    }

    #[test]
    fn job_id_parts() {
        let id = JobId::from("20240115-007");
        assert_eq!(id.date_key(), Some("20240115"));
        assert_eq!(id.sequence(), Some(7));

        let imported = JobId::from("legacy-7");
        assert_eq!(imported.date_key(), None);
        assert_eq!(imported.sequence(), None);
    }

    #[test]
    fn status_names() {
        assert_eq!(JobStatus::InProgress.to_string(), "In-Progress");
        assert_eq!(JobStatus::PickedUp.label(), "Picked-Up");
        assert_eq!("picked_up".parse(), Ok(JobStatus::PickedUp));
        assert_eq!(
            "done".parse::<JobStatus>(),
            Err(ParseStatusError("done".to_owned()))
        );
        assert_eq!(
            serde_json::to_value(JobStatus::InProgress).unwrap(),
            json!("in_progress")
        );
    }

    #[test]
    fn payment_mode_from_text() {
        assert_eq!("UPI".parse(), Ok(PaymentMode::Upi));
        assert_eq!("Cash".parse(), Ok(PaymentMode::Cash));
        assert_eq!(
            "Cheque".parse(),
            Ok(PaymentMode::Other("Cheque".to_owned()))
        );
        assert_eq!("upi".parse(), Ok(PaymentMode::Other("upi".to_owned())));
    }

    #[test]
    fn payment_mode_text_is_kept_as_written() {
        for text in ["UPI", "upi", "Card", "gpay", "Cash"] {
            let mut job = Job::raw_job();
            job.mark_picked_up(10.0, text.parse().unwrap(), job.created_at);

            let value = serde_json::to_value(&job).unwrap();
            assert_eq!(value["billing"]["paymentMode"], json!(text));
            let read: Job = serde_json::from_value(value).unwrap();
            assert_eq!(read, job, "{text}");
        }
    }

    #[test]
    fn blank_payment_mode_is_recorded_as_none() {
        let mut job = Job::raw_job();

        job.mark_picked_up(10.0, PaymentMode::Other(" ".to_owned()), job.created_at);

        assert_eq!(job.billing.payment_mode, None);
        let read: Job = serde_json::from_value(serde_json::to_value(&job).unwrap()).unwrap();
        assert_eq!(read, job);
    }

    #[test]
    fn item_summary() {
        assert_eq!(
            Job::raw_job().item.summary().as_deref(),
            Some("Phone · Nokia · 3310")
        );
        let item = Item {
            brand: "Dell".to_owned(),
            ..Default::default()
        };
        assert_eq!(item.summary().as_deref(), Some("Dell"));
        assert_eq!(Item::default().summary(), None);
    }

    #[test]
    fn serialises_in_the_persisted_shape() {
        let value = serde_json::to_value(Job::raw_job()).unwrap();

        assert_eq!(value["id"], json!("20240115-001"));
        assert_eq!(value["createdAt"], json!("2024-01-15T09:30:00Z"));
        assert_eq!(value["item"]["type"], json!("Phone"));
        assert_eq!(value["estimate"]["taxPercent"], json!(10.0));
        assert_eq!(value["status"], json!("new"));
        assert_eq!(value["promisedAt"], json!(""));
        assert_eq!(value["readyAt"], json!(""));
        assert_eq!(value["pickedAt"], json!(""));
        assert_eq!(
            value["billing"],
            json!({"finalAmount": 0.0, "balance": 0.0, "paymentMode": ""})
        );
    }

    #[test]
    fn reads_documents_written_by_the_browser_board() {
        let document = json!({
            "id": "20240115-002",
            "createdAt": "2024-01-15T10:00:00.000Z",
            "updatedAt": "2024-01-15T11:00:00.000Z",
            "customer": {"name": "Bob", "phone": ""},
            "item": {"type": "Laptop", "brand": "", "model": "", "serial": ""},
            "issue": "No power",
            "accessories": "",
            "estimate": {"amount": 1500, "notes": "", "advance": 500, "taxPercent": 18},
            "status": "ready",
            "promisedAt": "2024-01-20T17:30",
            "readyAt": "2024-01-16T12:00:00.000Z",
            "pickedAt": "",
            "billing": {"finalAmount": 0, "balance": 0, "paymentMode": ""},
            "notes": ""
        });

        let job: Job = serde_json::from_value(document).unwrap();

        assert_eq!(job.status, JobStatus::Ready);
        assert_eq!(job.estimate.amount, 1500.0);
        assert_eq!(
            job.promised_at,
            NaiveDate::from_ymd_opt(2024, 1, 20)
                .unwrap()
                .and_hms_opt(17, 30, 0)
        );
        assert_eq!(
            job.ready_at,
            Some(Utc.with_ymd_and_hms(2024, 1, 16, 12, 0, 0).unwrap())
        );
        assert_eq!(job.picked_at, None);
        assert_eq!(job.billing.payment_mode, None);
    }

    #[test]
    fn mark_ready_stamps_once() {
        let mut job = Job::raw_job();
        let first = job.created_at + chrono::TimeDelta::hours(1);
        let second = first + chrono::TimeDelta::hours(1);

        job.mark_status(JobStatus::Ready, first);
        job.mark_status(JobStatus::Ready, second);

        assert_eq!(job.ready_at, Some(first));
        assert_eq!(job.updated_at, second);
    }

    #[test]
    fn mark_picked_up_settles_against_advance() {
        let mut job = Job::raw_job();
        let now = job.created_at + chrono::TimeDelta::days(2);

        job.mark_picked_up(500.0, PaymentMode::Upi, now);

        assert_eq!(job.billing.final_amount, 500.0);
        assert_eq!(job.billing.balance, 300.0);
        assert_eq!(job.billing.payment_mode, Some(PaymentMode::Upi));
        assert_eq!(job.status, JobStatus::PickedUp);
        assert_eq!(job.picked_at, Some(now));
        assert_eq!(job.breakdown().grand_total, 440.0);
    }
}
