use serde::Serialize;

use crate::catalog::{ProgramCatalog, ProgramLevel};

use super::documents::format_file_size;
use super::domain::{ApplicationField, ApplicationRecord, DocumentSlot, SessionId};
use super::repository::WizardSession;
use super::submission::SubmissionReceipt;
use super::validation::{TextStats, ValidationErrors};
use super::wizard::{WizardPhase, WizardStep, TOTAL_STEPS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Completed,
    Current,
    Upcoming,
}

/// Progress strip entry.
#[derive(Debug, Clone, Serialize)]
pub struct StepBadge {
    pub index: u8,
    pub step: WizardStep,
    pub title: &'static str,
    pub description: &'static str,
    pub status: StepStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldErrorView {
    pub field: ApplicationField,
    pub message: String,
    pub translation_key: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadedDocumentView {
    pub slot: DocumentSlot,
    pub title: &'static str,
    pub file_name: String,
    pub size: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgramChoiceView {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<ProgramLevel>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MotivationStatsView {
    pub motivation_letter: TextStats,
    pub career_goals: TextStats,
    pub why_this_program: TextStats,
}

/// Read-only summary rendered on the review step.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewView {
    pub program: Option<ProgramChoiceView>,
    pub documents: Vec<UploadedDocumentView>,
}

/// Everything a client needs to render one wizard screen.
#[derive(Debug, Clone, Serialize)]
pub struct WizardView {
    pub session_id: SessionId,
    pub phase: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_step: Option<u8>,
    pub total_steps: u8,
    pub progress_percent: u8,
    pub steps: Vec<StepBadge>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<ApplicationRecord>,
    pub errors: Vec<FieldErrorView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub motivation: Option<MotivationStatsView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review: Option<ReviewView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt: Option<SubmissionReceipt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program_title: Option<String>,
}

pub fn error_views(errors: &ValidationErrors) -> Vec<FieldErrorView> {
    errors
        .iter()
        .map(|(field, kind)| FieldErrorView {
            field,
            message: kind.message(field),
            translation_key: kind.translation_key(),
        })
        .collect()
}

fn step_badges(position: u8) -> Vec<StepBadge> {
    WizardStep::ordered()
        .into_iter()
        .map(|step| StepBadge {
            index: step.index(),
            step,
            title: step.title(),
            description: step.description(),
            status: match step.index().cmp(&position) {
                std::cmp::Ordering::Less => StepStatus::Completed,
                std::cmp::Ordering::Equal => StepStatus::Current,
                std::cmp::Ordering::Greater => StepStatus::Upcoming,
            },
        })
        .collect()
}

fn program_choice(catalog: &ProgramCatalog, id: &str) -> ProgramChoiceView {
    match catalog.find(id) {
        Some(program) => ProgramChoiceView {
            id: program.id.clone(),
            title: program.title.clone(),
            level: Some(program.level),
        },
        None => ProgramChoiceView {
            id: id.to_string(),
            title: id.to_string(),
            level: None,
        },
    }
}

fn review_view(record: &ApplicationRecord, catalog: &ProgramCatalog) -> ReviewView {
    ReviewView {
        program: record
            .selected_program
            .as_deref()
            .map(|id| program_choice(catalog, id)),
        documents: record
            .documents
            .uploaded()
            .into_iter()
            .map(|(slot, file)| UploadedDocumentView {
                slot,
                title: slot.requirement().title,
                file_name: file.name.clone(),
                size: format_file_size(file.size_bytes),
            })
            .collect(),
    }
}

impl WizardView {
    pub fn from_session(session: &WizardSession, catalog: &ProgramCatalog) -> Self {
        let wizard = &session.wizard;
        let phase = wizard.phase();

        let position = match phase {
            WizardPhase::Editing { step } => step.index(),
            WizardPhase::Submitting | WizardPhase::Submitted { .. } => TOTAL_STEPS + 1,
        };
        let progress_percent = match phase {
            WizardPhase::Editing { step } => step.progress_percent(),
            WizardPhase::Submitting | WizardPhase::Submitted { .. } => 100,
        };

        let current_step = wizard.current_step();
        let record = wizard.record();
        let receipt = wizard.receipt().cloned();

        let motivation = (current_step == Some(WizardStep::Motivation)).then(|| {
            MotivationStatsView {
                motivation_letter: TextStats::of(&record.motivation_letter),
                career_goals: TextStats::of(&record.career_goals),
                why_this_program: TextStats::of(&record.why_this_program),
            }
        });
        let review =
            (current_step == Some(WizardStep::Review)).then(|| review_view(record, catalog));
        let program_title = receipt.as_ref().and_then(|receipt| {
            receipt
                .applicant
                .selected_program
                .as_deref()
                .map(|id| program_choice(catalog, id).title)
        });

        Self {
            session_id: session.id.clone(),
            phase: phase.label(),
            current_step: current_step.map(WizardStep::index),
            total_steps: TOTAL_STEPS,
            progress_percent,
            steps: step_badges(position),
            record: (!wizard.is_submitted()).then(|| record.clone()),
            errors: error_views(wizard.errors()),
            motivation,
            review,
            receipt,
            program_title,
        }
    }
}
