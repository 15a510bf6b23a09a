//! Multi-step admissions application.
//!
//! An applicant moves through personal details, education, documents, and motivation before a
//! review step gates the hand-off to the submission backend. Each step validates only its own
//! fields; once submitted the session is terminal and the record is discarded.

pub mod documents;
pub mod domain;
pub mod repository;
pub mod router;
pub mod service;
pub mod submission;
pub mod validation;
pub mod views;
pub mod wizard;

#[cfg(test)]
mod tests;

pub use documents::{format_file_size, DocumentRequirement, DOCUMENT_REQUIREMENTS};
pub use domain::{
    ApplicationField, ApplicationPatch, ApplicationRecord, DocumentSlot, DocumentSlots,
    EducationLevel, SessionId, StudyMode, UploadedFile,
};
pub use repository::{RepositoryError, SessionRepository, WizardSession};
pub use router::application_router;
pub use service::{AdmissionsService, ApplicationServiceError};
pub use submission::{
    ApplicantSummary, MockSubmissionBackend, SubmissionBackend, SubmissionError,
    SubmissionReceipt,
};
pub use validation::{FieldErrorKind, StepRules, TextStats, ValidationErrors};
pub use views::WizardView;
pub use wizard::{ApplicationWizard, WizardError, WizardPhase, WizardStep, TOTAL_STEPS};
