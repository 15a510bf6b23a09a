use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::catalog::ProgramCatalog;
use crate::workflows::application::domain::{
    ApplicationPatch, ApplicationRecord, DocumentSlot, DocumentSlots, EducationLevel, SessionId,
    StudyMode, UploadedFile,
};
use crate::workflows::application::repository::{
    RepositoryError, SessionRepository, WizardSession,
};
use crate::workflows::application::submission::{
    MockSubmissionBackend, SubmissionBackend, SubmissionError, SubmissionReceipt,
};
use crate::workflows::application::validation::StepRules;
use crate::workflows::application::wizard::{ApplicationWizard, WizardStep};
use crate::workflows::application::AdmissionsService;

pub(super) fn letter(chars: usize) -> String {
    "a".repeat(chars)
}

pub(super) fn valid_documents() -> DocumentSlots {
    DocumentSlots::default()
        .with(
            DocumentSlot::Transcript,
            Some(UploadedFile::new("transcript.pdf", 120_000)),
        )
        .with(
            DocumentSlot::Diploma,
            Some(UploadedFile::new("diploma.jpg", 340_000)),
        )
        .with(DocumentSlot::Cv, Some(UploadedFile::new("cv.docx", 48_000)))
        .with(
            DocumentSlot::Passport,
            Some(UploadedFile::new("passport.png", 910_000)),
        )
}

/// Record passing every step, consents included.
pub(super) fn valid_record() -> ApplicationRecord {
    ApplicationRecord {
        first_name: "Lina".to_string(),
        last_name: "Haddad".to_string(),
        email: "lina.haddad@example.org".to_string(),
        phone: "+49 30 1234567".to_string(),
        date_of_birth: "1999-04-12".to_string(),
        nationality: "Jordanian".to_string(),
        address: "Invalidenstr. 42".to_string(),
        city: "Berlin".to_string(),
        postal_code: "10115".to_string(),
        country: "Germany".to_string(),
        highest_education: Some(EducationLevel::BachelorsDegree),
        institution_name: "University of Jordan".to_string(),
        graduation_year: Some(2021),
        gpa: "3.6".to_string(),
        field_of_study: "Computer Engineering".to_string(),
        selected_program: Some("msc-data-science".to_string()),
        preferred_start_date: NaiveDate::from_ymd_opt(2025, 10, 1),
        study_mode: Some(StudyMode::Online),
        documents: valid_documents(),
        motivation_letter: letter(240),
        career_goals: letter(120),
        why_this_program: letter(110),
        agree_to_terms: true,
        agree_to_privacy: true,
        agree_to_marketing: false,
    }
}

/// Wizard parked on `step` with a fully valid record.
pub(super) fn wizard_at(step: WizardStep) -> ApplicationWizard {
    let mut wizard = ApplicationWizard::new();
    wizard
        .update_record(ApplicationPatch {
            documents: Some(valid_documents()),
            ..patch_from(valid_record())
        })
        .expect("editable");
    while wizard.current_step() != Some(step) {
        wizard.proceed(&rules()).expect("valid record advances");
    }
    wizard
}

/// Patch carrying every field of `record` except documents.
pub(super) fn patch_from(record: ApplicationRecord) -> ApplicationPatch {
    ApplicationPatch {
        first_name: Some(record.first_name),
        last_name: Some(record.last_name),
        email: Some(record.email),
        phone: Some(record.phone),
        date_of_birth: Some(record.date_of_birth),
        nationality: Some(record.nationality),
        address: Some(record.address),
        city: Some(record.city),
        postal_code: Some(record.postal_code),
        country: Some(record.country),
        highest_education: Some(record.highest_education),
        institution_name: Some(record.institution_name),
        graduation_year: Some(record.graduation_year),
        gpa: Some(record.gpa),
        field_of_study: Some(record.field_of_study),
        selected_program: Some(record.selected_program),
        preferred_start_date: Some(record.preferred_start_date),
        study_mode: Some(record.study_mode),
        documents: None,
        motivation_letter: Some(record.motivation_letter),
        career_goals: Some(record.career_goals),
        why_this_program: Some(record.why_this_program),
        agree_to_terms: Some(record.agree_to_terms),
        agree_to_privacy: Some(record.agree_to_privacy),
        agree_to_marketing: Some(record.agree_to_marketing),
    }
}

pub(super) fn rules() -> StepRules<'static> {
    StepRules::new(ProgramCatalog::embedded())
}

pub(super) fn catalog() -> Arc<ProgramCatalog> {
    Arc::new(ProgramCatalog::embedded().clone())
}

pub(super) fn build_service() -> (
    AdmissionsService<MemoryRepository, MockSubmissionBackend>,
    Arc<MemoryRepository>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let service = AdmissionsService::new(
        repository.clone(),
        Arc::new(MockSubmissionBackend::instant()),
        catalog(),
    );
    (service, repository)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) sessions: Arc<Mutex<HashMap<SessionId, WizardSession>>>,
}

impl MemoryRepository {
    pub(super) fn stored(&self, id: &SessionId) -> WizardSession {
        self.sessions
            .lock()
            .expect("repository mutex poisoned")
            .get(id)
            .cloned()
            .expect("session stored")
    }
}

impl SessionRepository for MemoryRepository {
    fn insert(&self, session: WizardSession) -> Result<WizardSession, RepositoryError> {
        let mut guard = self.sessions.lock().expect("repository mutex poisoned");
        if guard.contains_key(&session.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(session.id.clone(), session.clone());
        Ok(session)
    }

    fn fetch(&self, id: &SessionId) -> Result<Option<WizardSession>, RepositoryError> {
        let guard = self.sessions.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn modify<T, F>(&self, id: &SessionId, change: F) -> Result<(T, WizardSession), RepositoryError>
    where
        F: FnOnce(&mut WizardSession) -> T,
    {
        let mut guard = self.sessions.lock().expect("repository mutex poisoned");
        let session = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        let output = change(session);
        Ok((output, session.clone()))
    }
}

pub(super) struct UnavailableRepository;

impl SessionRepository for UnavailableRepository {
    fn insert(&self, _session: WizardSession) -> Result<WizardSession, RepositoryError> {
        Err(RepositoryError::Unavailable("session store offline".to_string()))
    }

    fn fetch(&self, _id: &SessionId) -> Result<Option<WizardSession>, RepositoryError> {
        Err(RepositoryError::Unavailable("session store offline".to_string()))
    }

    fn modify<T, F>(
        &self,
        _id: &SessionId,
        _change: F,
    ) -> Result<(T, WizardSession), RepositoryError>
    where
        F: FnOnce(&mut WizardSession) -> T,
    {
        Err(RepositoryError::Unavailable("session store offline".to_string()))
    }
}

/// Backend that refuses every hand-off and counts attempts.
#[derive(Default, Clone)]
pub(super) struct FailingBackend {
    pub(super) attempts: Arc<Mutex<usize>>,
}

impl FailingBackend {
    pub(super) fn attempts(&self) -> usize {
        *self.attempts.lock().expect("backend mutex poisoned")
    }
}

impl SubmissionBackend for FailingBackend {
    fn submit(
        &self,
        _record: ApplicationRecord,
    ) -> impl Future<Output = Result<SubmissionReceipt, SubmissionError>> + Send {
        *self.attempts.lock().expect("backend mutex poisoned") += 1;
        async { Err(SubmissionError::Unavailable("admissions office offline".to_string())) }
    }
}

/// Backend that counts accepted hand-offs.
#[derive(Default, Clone)]
pub(super) struct CountingBackend {
    pub(super) accepted: Arc<Mutex<Vec<ApplicationRecord>>>,
}

impl CountingBackend {
    pub(super) fn accepted(&self) -> Vec<ApplicationRecord> {
        self.accepted.lock().expect("backend mutex poisoned").clone()
    }
}

impl SubmissionBackend for CountingBackend {
    fn submit(
        &self,
        record: ApplicationRecord,
    ) -> impl Future<Output = Result<SubmissionReceipt, SubmissionError>> + Send {
        let receipt = SubmissionReceipt::issue(&record, chrono::Utc::now());
        self.accepted
            .lock()
            .expect("backend mutex poisoned")
            .push(record);
        async move { Ok(receipt) }
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
