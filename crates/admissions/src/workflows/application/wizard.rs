//! Five-step application wizard.
//!
//! The wizard owns one [`ApplicationRecord`] per session and moves through
//! [`WizardPhase::Editing`] steps until a successful hand-off flips it into the terminal
//! [`WizardPhase::Submitted`] phase. Navigation itself never validates; [`ApplicationWizard::proceed`]
//! is the gate that runs the current step's validator before calling [`ApplicationWizard::advance`].

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{
    ApplicationField, ApplicationPatch, ApplicationRecord, DocumentSlot, UploadedFile,
};
use super::submission::{SubmissionBackend, SubmissionError, SubmissionReceipt};
use super::validation::{
    validate_consent, validate_step, FieldErrorKind, StepRules, ValidationErrors,
};

pub const TOTAL_STEPS: u8 = 5;

/// One screen of the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    PersonalInfo,
    Education,
    Documents,
    Motivation,
    Review,
}

impl WizardStep {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::PersonalInfo,
            Self::Education,
            Self::Documents,
            Self::Motivation,
            Self::Review,
        ]
    }

    /// 1-based position.
    pub const fn index(self) -> u8 {
        match self {
            Self::PersonalInfo => 1,
            Self::Education => 2,
            Self::Documents => 3,
            Self::Motivation => 4,
            Self::Review => 5,
        }
    }

    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            1 => Some(Self::PersonalInfo),
            2 => Some(Self::Education),
            3 => Some(Self::Documents),
            4 => Some(Self::Motivation),
            5 => Some(Self::Review),
            _ => None,
        }
    }

    pub const fn next(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    pub const fn previous(self) -> Option<Self> {
        Self::from_index(self.index() - 1)
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::PersonalInfo => "Personal Information",
            Self::Education => "Education Background",
            Self::Documents => "Document Upload",
            Self::Motivation => "Motivation & Goals",
            Self::Review => "Review & Submit",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::PersonalInfo => "Basic personal details",
            Self::Education => "Academic history",
            Self::Documents => "Required documents",
            Self::Motivation => "Personal statement",
            Self::Review => "Final confirmation",
        }
    }

    pub const fn translation_key(self) -> &'static str {
        match self {
            Self::PersonalInfo => "apply.steps.personal",
            Self::Education => "apply.steps.education",
            Self::Documents => "apply.steps.documents",
            Self::Motivation => "apply.steps.motivation",
            Self::Review => "apply.steps.review",
        }
    }

    /// Rounded completion shown in the progress bar.
    pub fn progress_percent(self) -> u8 {
        let ratio = f32::from(self.index()) / f32::from(TOTAL_STEPS);
        (ratio * 100.0).round() as u8
    }
}

/// Where a wizard session stands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum WizardPhase {
    Editing { step: WizardStep },
    Submitting,
    Submitted { receipt: SubmissionReceipt },
}

impl WizardPhase {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Editing { .. } => "editing",
            Self::Submitting => "submitting",
            Self::Submitted { .. } => "submitted",
        }
    }
}

/// Transition refused by the wizard.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    #[error("current step has {} invalid field(s)", .0.len())]
    StepInvalid(ValidationErrors),
    #[error("{field:?} rejected the selected file")]
    DocumentRejected {
        field: ApplicationField,
        kind: FieldErrorKind,
    },
    #[error("applications can only be submitted from the review step (currently {0:?})")]
    NotOnReviewStep(WizardStep),
    #[error("a submission is already in flight")]
    SubmissionPending,
    #[error("the application has already been submitted")]
    AlreadySubmitted,
    #[error("no submission is in flight")]
    NotSubmitting,
    #[error(transparent)]
    Backend(#[from] SubmissionError),
}

/// Controller for one application session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationWizard {
    record: ApplicationRecord,
    phase: WizardPhase,
    errors: ValidationErrors,
}

impl Default for ApplicationWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl ApplicationWizard {
    pub fn new() -> Self {
        Self {
            record: ApplicationRecord::default(),
            phase: WizardPhase::Editing {
                step: WizardStep::PersonalInfo,
            },
            errors: ValidationErrors::new(),
        }
    }

    pub fn phase(&self) -> &WizardPhase {
        &self.phase
    }

    /// The step being edited, or `None` once a submission has started.
    pub fn current_step(&self) -> Option<WizardStep> {
        match self.phase {
            WizardPhase::Editing { step } => Some(step),
            WizardPhase::Submitting | WizardPhase::Submitted { .. } => None,
        }
    }

    pub fn record(&self) -> &ApplicationRecord {
        &self.record
    }

    /// Errors recorded by the last validation or file pick on the active step.
    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn receipt(&self) -> Option<&SubmissionReceipt> {
        match &self.phase {
            WizardPhase::Submitted { receipt } => Some(receipt),
            _ => None,
        }
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.phase, WizardPhase::Submitting)
    }

    pub fn is_submitted(&self) -> bool {
        matches!(self.phase, WizardPhase::Submitted { .. })
    }

    fn ensure_editable(&self) -> Result<WizardStep, WizardError> {
        match self.phase {
            WizardPhase::Editing { step } => Ok(step),
            WizardPhase::Submitting => Err(WizardError::SubmissionPending),
            WizardPhase::Submitted { .. } => Err(WizardError::AlreadySubmitted),
        }
    }

    /// Merge `patch` into the record without validating. Errors for every touched field are
    /// cleared so the next validation decides afresh.
    pub fn update_record(
        &mut self,
        patch: ApplicationPatch,
    ) -> Result<Vec<ApplicationField>, WizardError> {
        self.ensure_editable()?;
        let touched = self.record.apply(patch);
        for field in &touched {
            self.errors.clear(*field);
        }
        Ok(touched)
    }

    /// Move forward one step. No-op on the review step or outside the editing phase.
    pub fn advance(&mut self) -> bool {
        let Some(next) = self.current_step().and_then(WizardStep::next) else {
            return false;
        };
        debug!(step = next.index(), "wizard advanced");
        self.phase = WizardPhase::Editing { step: next };
        self.errors = ValidationErrors::new();
        true
    }

    /// Move back one step. Never validates; no-op on the first step.
    pub fn retreat(&mut self) -> bool {
        let Some(previous) = self.current_step().and_then(WizardStep::previous) else {
            return false;
        };
        debug!(step = previous.index(), "wizard retreated");
        self.phase = WizardPhase::Editing { step: previous };
        self.errors = ValidationErrors::new();
        true
    }

    /// Validate the active step and keep the result as the step's error set.
    pub fn validate_current_step(
        &mut self,
        rules: &StepRules<'_>,
    ) -> Result<&ValidationErrors, WizardError> {
        let step = self.ensure_editable()?;
        self.errors = validate_step(step, &self.record, rules);
        Ok(&self.errors)
    }

    /// Validate the active step and advance when it is clean. On the review step a clean
    /// validation leaves the wizard where it is; submission is a separate action.
    pub fn proceed(&mut self, rules: &StepRules<'_>) -> Result<WizardStep, WizardError> {
        let step = self.ensure_editable()?;
        let errors = validate_step(step, &self.record, rules);
        if !errors.is_empty() {
            debug!(step = step.index(), invalid = errors.len(), "step blocked");
            self.errors = errors.clone();
            return Err(WizardError::StepInvalid(errors));
        }

        self.errors = ValidationErrors::new();
        self.advance();
        Ok(self.current_step().unwrap_or(step))
    }

    /// Put `file` into `slot` if it passes the slot's size and type checks. A rejected file
    /// leaves the slot untouched and records the error immediately.
    pub fn select_document(
        &mut self,
        slot: DocumentSlot,
        file: UploadedFile,
    ) -> Result<(), WizardError> {
        self.ensure_editable()?;
        let field = slot.field();

        if let Err(kind) = slot.requirement().check(&file) {
            debug!(?slot, file = %file.name, "document rejected");
            self.errors.insert(field, kind.clone());
            return Err(WizardError::DocumentRejected { field, kind });
        }

        let documents = self.record.documents.clone().with(slot, Some(file));
        self.record.documents = documents;
        self.errors.clear(field);
        Ok(())
    }

    pub fn remove_document(&mut self, slot: DocumentSlot) -> Result<(), WizardError> {
        self.ensure_editable()?;
        let documents = self.record.documents.clone().with(slot, None);
        self.record.documents = documents;
        Ok(())
    }

    /// First half of a submission: check consent and enter the submitting phase. Returns the
    /// record to hand to the backend.
    pub fn begin_submission(&mut self) -> Result<ApplicationRecord, WizardError> {
        let step = self.ensure_editable()?;
        if step != WizardStep::Review {
            return Err(WizardError::NotOnReviewStep(step));
        }

        let errors = validate_consent(&self.record);
        if !errors.is_empty() {
            self.errors = errors.clone();
            return Err(WizardError::StepInvalid(errors));
        }

        self.errors = ValidationErrors::new();
        self.phase = WizardPhase::Submitting;
        Ok(self.record.clone())
    }

    /// Second half of a submission. Success discards the record and makes the wizard terminal;
    /// a backend failure returns to the review step with the record intact.
    pub fn complete_submission(
        &mut self,
        outcome: Result<SubmissionReceipt, SubmissionError>,
    ) -> Result<&SubmissionReceipt, WizardError> {
        match self.phase {
            WizardPhase::Submitting => {}
            WizardPhase::Submitted { .. } => return Err(WizardError::AlreadySubmitted),
            WizardPhase::Editing { .. } => return Err(WizardError::NotSubmitting),
        }

        match outcome {
            Ok(receipt) => {
                self.record = ApplicationRecord::default();
                self.errors = ValidationErrors::new();
                self.phase = WizardPhase::Submitted { receipt };
                self.receipt().ok_or(WizardError::NotSubmitting)
            }
            Err(error) => {
                self.phase = WizardPhase::Editing {
                    step: WizardStep::Review,
                };
                Err(WizardError::Backend(error))
            }
        }
    }

    /// Run both halves against `backend` for callers that own the wizard exclusively.
    pub async fn submit<B: SubmissionBackend>(
        &mut self,
        backend: &B,
    ) -> Result<&SubmissionReceipt, WizardError> {
        let record = self.begin_submission()?;
        let outcome = backend.submit(record).await;
        self.complete_submission(outcome)
    }
}
