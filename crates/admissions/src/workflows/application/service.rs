use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::catalog::ProgramCatalog;

use super::domain::{ApplicationPatch, DocumentSlot, SessionId, UploadedFile};
use super::repository::{RepositoryError, SessionRepository, WizardSession};
use super::submission::{SubmissionBackend, SubmissionError};
use super::validation::{StepRules, ValidationErrors};
use super::views::WizardView;
use super::wizard::WizardError;

/// Service composing the session store, the submission backend, and the program catalog.
pub struct AdmissionsService<R, B> {
    repository: Arc<R>,
    backend: Arc<B>,
    catalog: Arc<ProgramCatalog>,
}

static SESSION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_session_id() -> SessionId {
    let id = SESSION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    SessionId(format!("session-{id:06}"))
}

impl<R, B> AdmissionsService<R, B>
where
    R: SessionRepository + 'static,
    B: SubmissionBackend + 'static,
{
    pub fn new(repository: Arc<R>, backend: Arc<B>, catalog: Arc<ProgramCatalog>) -> Self {
        Self {
            repository,
            backend,
            catalog,
        }
    }

    pub fn catalog(&self) -> &ProgramCatalog {
        &self.catalog
    }

    fn view(&self, session: &WizardSession) -> WizardView {
        WizardView::from_session(session, &self.catalog)
    }

    /// Open a fresh session on the first step.
    pub fn start(&self) -> Result<WizardView, ApplicationServiceError> {
        let session = WizardSession::new(next_session_id(), Utc::now());
        let stored = self.repository.insert(session)?;
        debug!(session = %stored.id.0, "application session started");
        Ok(self.view(&stored))
    }

    pub fn get(&self, id: &SessionId) -> Result<WizardView, ApplicationServiceError> {
        let session = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(self.view(&session))
    }

    /// Keystroke-level edit. Never validates.
    pub fn update(
        &self,
        id: &SessionId,
        patch: ApplicationPatch,
    ) -> Result<WizardView, ApplicationServiceError> {
        let (result, session) = self
            .repository
            .modify(id, |session| session.wizard.update_record(patch))?;
        result?;
        Ok(self.view(&session))
    }

    pub fn select_document(
        &self,
        id: &SessionId,
        slot: DocumentSlot,
        file: UploadedFile,
    ) -> Result<WizardView, ApplicationServiceError> {
        let (result, session) = self
            .repository
            .modify(id, |session| session.wizard.select_document(slot, file))?;
        result?;
        Ok(self.view(&session))
    }

    pub fn remove_document(
        &self,
        id: &SessionId,
        slot: DocumentSlot,
    ) -> Result<WizardView, ApplicationServiceError> {
        let (result, session) = self
            .repository
            .modify(id, |session| session.wizard.remove_document(slot))?;
        result?;
        Ok(self.view(&session))
    }

    /// Validate the current step and move forward when it is clean.
    pub fn proceed(&self, id: &SessionId) -> Result<WizardView, ApplicationServiceError> {
        let rules = StepRules::new(&self.catalog);
        let (result, session) = self
            .repository
            .modify(id, |session| session.wizard.proceed(&rules))?;
        result?;
        Ok(self.view(&session))
    }

    pub fn back(&self, id: &SessionId) -> Result<WizardView, ApplicationServiceError> {
        let (_, session) = self
            .repository
            .modify(id, |session| session.wizard.retreat())?;
        Ok(self.view(&session))
    }

    /// Consent check, hand-off, terminal view. A second call while the first is in flight, or
    /// after it finished, returns the current view unchanged. The hand-off completes even if
    /// the caller stops waiting for it.
    pub async fn submit(&self, id: &SessionId) -> Result<WizardView, ApplicationServiceError> {
        let (begun, session) = self
            .repository
            .modify(id, |session| session.wizard.begin_submission())?;

        let record = match begun {
            Ok(record) => record,
            Err(WizardError::SubmissionPending | WizardError::AlreadySubmitted) => {
                debug!(session = %id.0, "duplicate submit ignored");
                return Ok(self.view(&session));
            }
            Err(other) => return Err(other.into()),
        };

        info!(session = %id.0, "submitting application");
        // Detached: the hand-off finishes even when this future is dropped.
        let repository = Arc::clone(&self.repository);
        let backend = Arc::clone(&self.backend);
        let session_id = id.clone();
        let handoff = tokio::spawn(async move {
            let outcome = backend.submit(record).await;
            repository.modify(&session_id, |session| {
                session
                    .wizard
                    .complete_submission(outcome)
                    .map(|receipt| receipt.application_id.clone())
            })
        });

        let (completed, session) = handoff
            .await
            .map_err(|err| ApplicationServiceError::Interrupted(err.to_string()))??;
        let application_id = completed?;
        info!(session = %id.0, %application_id, "application submitted");

        Ok(self.view(&session))
    }
}

/// Error raised by the admissions service.
#[derive(Debug, thiserror::Error)]
pub enum ApplicationServiceError {
    #[error("{} field(s) need attention", .0.len())]
    Invalid(ValidationErrors),
    #[error("transition refused: {0}")]
    Transition(WizardError),
    #[error(transparent)]
    Submission(SubmissionError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("submission task failed: {0}")]
    Interrupted(String),
}

impl From<WizardError> for ApplicationServiceError {
    fn from(value: WizardError) -> Self {
        match value {
            WizardError::StepInvalid(errors) => Self::Invalid(errors),
            WizardError::DocumentRejected { field, kind } => {
                let mut errors = ValidationErrors::new();
                errors.insert(field, kind);
                Self::Invalid(errors)
            }
            WizardError::Backend(error) => Self::Submission(error),
            other => Self::Transition(other),
        }
    }
}
