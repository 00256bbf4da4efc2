//! Whole-board export and import documents.
//!
//! An export is a pretty printed JSON object `{ "jobs": [...], "settings": {...} }`. An import
//! accepts the same shape; either member may be missing. Imported job ids must be unique and
//! negative amounts are read as zero.
use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{clock::date_key, job::Job, settings::ShopSettings, JobCardError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub jobs: Vec<Job>,
    pub settings: ShopSettings,
}

impl Snapshot {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// The suggested file name for an export taken on `date`.
    pub fn file_name(date: NaiveDate) -> String {
        format!("service-job-card-{}.json", date_key(date))
    }
}

/// A parsed import before it is applied to a board.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ImportDocument {
    #[serde(default)]
    pub jobs: Option<Vec<Job>>,
    #[serde(default)]
    pub settings: Option<ShopSettings>,
}

impl ImportDocument {
    pub fn parse(document: &str) -> Result<Self, JobCardError> {
        let value: serde_json::Value = serde_json::from_str(document)
            .map_err(|error| JobCardError::MalformedImport(error.to_string()))?;
        if !value.is_object() {
            return Err(JobCardError::MalformedImport(
                "expected a JSON object".to_owned(),
            ));
        }
        let mut document: Self = serde_json::from_value(value)
            .map_err(|error| JobCardError::MalformedImport(error.to_string()))?;

        let jobs = document.jobs.iter_mut().flatten();
        let mut seen = HashSet::new();
        for job in jobs {
            if !seen.insert(job.id.clone()) {
                return Err(JobCardError::MalformedImport(format!(
                    "duplicate job id {}",
                    job.id
                )));
            }
            job.clamp_amounts();
        }
        Ok(document)
    }

    /// The snapshot this import produces when applied over `current` settings.
    ///
    /// Missing jobs mean no jobs. Missing settings keep the current ones.
    pub fn resolve(self, current: ShopSettings) -> Snapshot {
        Snapshot {
            jobs: self.jobs.unwrap_or_default(),
            settings: self.settings.unwrap_or(current),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn export_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();

        assert_eq!(Snapshot::file_name(date), "service-job-card-20240307.json");
    }

    #[test]
    fn export_shape() {
        let snapshot = Snapshot {
            jobs: vec![Job::raw_job()],
            settings: ShopSettings::default(),
        };

        let text = snapshot.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert!(text.contains('\n'));
        assert_eq!(value["jobs"][0]["id"], json!("20240115-001"));
        assert_eq!(value["settings"]["name"], json!("Service Job Card"));
    }

    #[test]
    fn parse_rejects_non_objects() {
        for document in ["not json", "[]", "42", "null", r#""jobs""#] {
            assert_matches!(
                ImportDocument::parse(document),
                Err(JobCardError::MalformedImport(_)),
                "{document}"
            );
        }
    }

    #[test]
    fn parse_rejects_badly_typed_members() {
        assert_matches!(
            ImportDocument::parse(r#"{"jobs": "nope"}"#),
            Err(JobCardError::MalformedImport(_))
        );
    }

    #[test]
    fn parse_rejects_duplicate_ids() {
        let document = json!({ "jobs": [Job::raw_job(), Job::raw_job()] }).to_string();

        assert_matches!(
            ImportDocument::parse(&document),
            Err(JobCardError::MalformedImport(message)) if message.contains("20240115-001")
        );
    }

    #[test]
    fn negative_amounts_are_read_as_zero() {
        let mut job = serde_json::to_value(Job::raw_job()).unwrap();
        job["estimate"]["amount"] = json!(-400.0);
        job["estimate"]["taxPercent"] = json!(-10.0);
        job["estimate"]["advance"] = json!(-50.0);
        job["billing"]["finalAmount"] = json!(-1.0);
        job["billing"]["balance"] = json!(-0.5);

        let document = ImportDocument::parse(&json!({ "jobs": [job] }).to_string()).unwrap();

        let job = &document.jobs.unwrap()[0];
        assert_eq!(job.estimate.amount, 0.0);
        assert_eq!(job.estimate.tax_percent, 0.0);
        assert_eq!(job.estimate.advance, 0.0);
        assert_eq!(job.billing.final_amount, 0.0);
        assert_eq!(job.billing.balance, 0.0);
        assert_eq!(job.breakdown().grand_total, 0.0);
    }

    #[test]
    fn missing_members_resolve_to_defaults() {
        let current = ShopSettings::new("FixIt", "", "");

        let snapshot = ImportDocument::parse("{}").unwrap().resolve(current.clone());
        assert!(snapshot.jobs.is_empty());
        assert_eq!(snapshot.settings, current);

        let snapshot = ImportDocument::parse(r#"{"jobs": null, "settings": {"name": "Other"}}"#)
            .unwrap()
            .resolve(current);
        assert!(snapshot.jobs.is_empty());
        assert_eq!(snapshot.settings.name, "Other");
    }
}
