use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::domain::{ApplicationRecord, StudyMode};

/// What survives of an application once it has been handed off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicantSummary {
    pub full_name: String,
    pub email: String,
    pub selected_program: Option<String>,
    pub study_mode: Option<StudyMode>,
    pub preferred_start_date: Option<NaiveDate>,
    pub documents_uploaded: usize,
}

impl ApplicantSummary {
    pub fn of(record: &ApplicationRecord) -> Self {
        Self {
            full_name: record.full_name(),
            email: record.email.trim().to_string(),
            selected_program: record.selected_program.clone(),
            study_mode: record.study_mode,
            preferred_start_date: record.preferred_start_date,
            documents_uploaded: record.documents.uploaded().len(),
        }
    }
}

/// Acknowledgement returned by a submission backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub application_id: String,
    pub submitted_at: DateTime<Utc>,
    pub applicant: ApplicantSummary,
}

impl SubmissionReceipt {
    /// Reference numbers take the last six digits of the millisecond clock: `APP-123456`.
    pub fn issue(record: &ApplicationRecord, submitted_at: DateTime<Utc>) -> Self {
        let millis = submitted_at.timestamp_millis().rem_euclid(1_000_000);
        Self {
            application_id: format!("APP-{millis:06}"),
            submitted_at,
            applicant: ApplicantSummary::of(record),
        }
    }
}

/// Hand-off target for completed applications.
pub trait SubmissionBackend: Send + Sync {
    fn submit(
        &self,
        record: ApplicationRecord,
    ) -> impl Future<Output = Result<SubmissionReceipt, SubmissionError>> + Send;
}

/// Error raised by a submission backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    #[error("submission backend unavailable: {0}")]
    Unavailable(String),
    #[error("submission rejected: {0}")]
    Rejected(String),
}

/// Stand-in for the admissions office: waits a fixed delay, then always accepts.
#[derive(Debug, Clone, Copy)]
pub struct MockSubmissionBackend {
    delay: Duration,
}

impl MockSubmissionBackend {
    pub const DEFAULT_DELAY: Duration = Duration::from_secs(2);

    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn instant() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for MockSubmissionBackend {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DELAY)
    }
}

impl SubmissionBackend for MockSubmissionBackend {
    fn submit(
        &self,
        record: ApplicationRecord,
    ) -> impl Future<Output = Result<SubmissionReceipt, SubmissionError>> + Send {
        let delay = self.delay;
        async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            let receipt = SubmissionReceipt::issue(&record, Utc::now());
            info!(
                application_id = %receipt.application_id,
                program = record.selected_program.as_deref().unwrap_or("unspecified"),
                "mock admissions backend accepted application"
            );
            Ok(receipt)
        }
    }
}
