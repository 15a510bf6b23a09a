use admissions::catalog::ProgramCatalog;
use admissions::config::LanguageConfig;
use admissions::i18n::{FilePreferenceStorage, Language, LanguageStore};
use admissions::workflows::application::{
    RepositoryError, SessionId, SessionRepository, WizardSession,
};
use chrono::{DateTime, Duration, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::debug;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) language: Arc<LanguageStore>,
    pub(crate) catalog: Arc<ProgramCatalog>,
}

/// Sessions untouched for this long are dropped on the next insert.
pub(crate) const SESSION_IDLE_LIMIT_MINUTES: i64 = 120;

struct StoredSession {
    session: WizardSession,
    touched_at: DateTime<Utc>,
}

/// Wizard sessions held in process memory, evicted once idle.
#[derive(Clone)]
pub(crate) struct InMemorySessionRepository {
    sessions: Arc<Mutex<HashMap<SessionId, StoredSession>>>,
    idle_limit: Duration,
}

impl Default for InMemorySessionRepository {
    fn default() -> Self {
        Self::with_idle_limit(Duration::minutes(SESSION_IDLE_LIMIT_MINUTES))
    }
}

impl SessionRepository for InMemorySessionRepository {
    fn insert(&self, session: WizardSession) -> Result<WizardSession, RepositoryError> {
        let now = Utc::now();
        let mut guard = self.sessions.lock().expect("session mutex poisoned");
        self.evict_idle(&mut guard, now);
        if guard.contains_key(&session.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(
            session.id.clone(),
            StoredSession {
                session: session.clone(),
                touched_at: now,
            },
        );
        Ok(session)
    }

    fn fetch(&self, id: &SessionId) -> Result<Option<WizardSession>, RepositoryError> {
        let guard = self.sessions.lock().expect("session mutex poisoned");
        Ok(guard.get(id).map(|stored| stored.session.clone()))
    }

    fn modify<T, F>(&self, id: &SessionId, change: F) -> Result<(T, WizardSession), RepositoryError>
    where
        F: FnOnce(&mut WizardSession) -> T,
    {
        let mut guard = self.sessions.lock().expect("session mutex poisoned");
        let stored = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        let output = change(&mut stored.session);
        stored.touched_at = Utc::now();
        Ok((output, stored.session.clone()))
    }
}

impl InMemorySessionRepository {
    pub(crate) fn with_idle_limit(idle_limit: Duration) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            idle_limit,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.sessions.lock().expect("session mutex poisoned").len()
    }

    /// Drop sessions idle past the limit. A session mid-submission is kept until its hand-off
    /// completes.
    fn evict_idle(&self, sessions: &mut HashMap<SessionId, StoredSession>, now: DateTime<Utc>) {
        let before = sessions.len();
        sessions.retain(|_, stored| {
            stored.session.wizard.is_submitting() || now - stored.touched_at < self.idle_limit
        });
        let evicted = before - sessions.len();
        if evicted > 0 {
            debug!(evicted, remaining = sessions.len(), "idle sessions evicted");
        }
    }
}

pub(crate) fn language_store(config: &LanguageConfig) -> Arc<LanguageStore> {
    let storage = FilePreferenceStorage::new(config.store_path.clone());
    Arc::new(LanguageStore::initialize(Arc::new(storage)))
}

pub(crate) fn parse_language(raw: &str) -> Result<Language, String> {
    Language::from_code(raw).map_err(|err| err.to_string())
}
