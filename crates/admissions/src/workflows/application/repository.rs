use chrono::{DateTime, Utc};

use super::domain::SessionId;
use super::wizard::ApplicationWizard;

/// One applicant's wizard plus bookkeeping.
#[derive(Debug, Clone)]
pub struct WizardSession {
    pub id: SessionId,
    pub started_at: DateTime<Utc>,
    pub wizard: ApplicationWizard,
}

impl WizardSession {
    pub fn new(id: SessionId, started_at: DateTime<Utc>) -> Self {
        Self {
            id,
            started_at,
            wizard: ApplicationWizard::new(),
        }
    }
}

/// Storage abstraction so the service module can be exercised in isolation. Sessions are never
/// persisted beyond the process.
pub trait SessionRepository: Send + Sync {
    fn insert(&self, session: WizardSession) -> Result<WizardSession, RepositoryError>;

    fn fetch(&self, id: &SessionId) -> Result<Option<WizardSession>, RepositoryError>;

    /// Apply `change` to the stored session while holding it exclusively, keep the result, and
    /// return the closure's output with a copy of the updated session.
    fn modify<T, F>(&self, id: &SessionId, change: F) -> Result<(T, WizardSession), RepositoryError>
    where
        F: FnOnce(&mut WizardSession) -> T;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("session already exists")]
    Conflict,
    #[error("session not found")]
    NotFound,
    #[error("session store unavailable: {0}")]
    Unavailable(String),
}
