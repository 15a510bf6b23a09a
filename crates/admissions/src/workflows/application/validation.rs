use std::collections::BTreeMap;
use std::sync::OnceLock;

use chrono::{Datelike, Utc};
use regex::Regex;
use serde::Serialize;

use crate::catalog::ProgramCatalog;

use super::domain::{ApplicationField, ApplicationRecord};
use super::documents::DOCUMENT_REQUIREMENTS;
use super::wizard::WizardStep;

pub const MOTIVATION_LETTER_MIN_CHARS: usize = 200;
pub const CAREER_GOALS_MIN_CHARS: usize = 100;
pub const WHY_THIS_PROGRAM_MIN_CHARS: usize = 100;
/// Graduation years offered by the education form, counting the current year.
pub const GRADUATION_YEAR_SPAN: i32 = 50;

/// Why a single field is blocking its step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldErrorKind {
    Required,
    InvalidEmail,
    TooShort { minimum: usize, actual: usize },
    FileTooLarge { max_bytes: u64, size_bytes: u64 },
    UnsupportedFileType { accepted: Vec<&'static str> },
    ConsentRequired,
    UnknownProgram,
    YearOutOfRange { earliest: i32, latest: i32 },
}

impl FieldErrorKind {
    pub const fn translation_key(&self) -> &'static str {
        match self {
            Self::Required => "apply.errors.required",
            Self::InvalidEmail => "apply.errors.invalidEmail",
            Self::TooShort { .. } => "apply.errors.tooShort",
            Self::FileTooLarge { .. } => "apply.errors.fileTooLarge",
            Self::UnsupportedFileType { .. } => "apply.errors.unsupportedFileType",
            Self::ConsentRequired => "apply.errors.consentRequired",
            Self::UnknownProgram => "apply.errors.unknownProgram",
            Self::YearOutOfRange { .. } => "apply.errors.yearOutOfRange",
        }
    }

    /// English message shown beneath the offending input.
    pub fn message(&self, field: ApplicationField) -> String {
        match (self, field) {
            (Self::Required, ApplicationField::CareerGoals) => {
                "Career goals are required".to_string()
            }
            (Self::Required, ApplicationField::WhyThisProgram) => {
                "This field is required".to_string()
            }
            (Self::Required, _) => format!("{} is required", field.label()),
            (Self::InvalidEmail, _) => "Email is invalid".to_string(),
            (Self::TooShort { minimum, .. }, ApplicationField::WhyThisProgram) => {
                format!("Response must be at least {minimum} characters")
            }
            (Self::TooShort { minimum, .. }, _) => {
                format!("{} must be at least {minimum} characters", field.label())
            }
            (Self::FileTooLarge { .. }, _) => "File size must be less than 10MB".to_string(),
            (Self::UnsupportedFileType { accepted }, _) => format!(
                "File type not supported. Accepted types: {}",
                accepted.join(", ")
            ),
            (Self::ConsentRequired, ApplicationField::AgreeToPrivacy) => {
                "You must agree to the privacy policy".to_string()
            }
            (Self::ConsentRequired, _) => {
                "You must agree to the terms and conditions".to_string()
            }
            (Self::UnknownProgram, _) => "Please select a program from the list".to_string(),
            (Self::YearOutOfRange { earliest, latest }, _) => {
                format!("{} must be between {earliest} and {latest}", field.label())
            }
        }
    }
}

/// Field-keyed errors for one step. At most one error per field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    entries: BTreeMap<ApplicationField, FieldErrorKind>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: ApplicationField, kind: FieldErrorKind) {
        self.entries.insert(field, kind);
    }

    /// Drop the error for `field`, leaving every other entry in place.
    pub fn clear(&mut self, field: ApplicationField) -> bool {
        self.entries.remove(&field).is_some()
    }

    pub fn get(&self, field: ApplicationField) -> Option<&FieldErrorKind> {
        self.entries.get(&field)
    }

    pub fn contains(&self, field: ApplicationField) -> bool {
        self.entries.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn fields(&self) -> Vec<ApplicationField> {
        self.entries.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ApplicationField, &FieldErrorKind)> {
        self.entries.iter().map(|(field, kind)| (*field, kind))
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

/// Derived counters shown under the motivation text areas. Never gating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TextStats {
    pub characters: usize,
    pub words: usize,
}

impl TextStats {
    pub fn of(text: &str) -> Self {
        Self {
            characters: text.chars().count(),
            words: text.split_whitespace().count(),
        }
    }
}

/// Reference data the education step checks its choices against.
#[derive(Debug, Clone, Copy)]
pub struct StepRules<'a> {
    pub catalog: &'a ProgramCatalog,
    pub current_year: i32,
}

impl<'a> StepRules<'a> {
    pub fn new(catalog: &'a ProgramCatalog) -> Self {
        Self {
            catalog,
            current_year: Utc::now().year(),
        }
    }

    pub fn graduation_years(&self) -> std::ops::RangeInclusive<i32> {
        (self.current_year - GRADUATION_YEAR_SPAN + 1)..=self.current_year
    }
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\S+@\S+\.\S+").expect("email pattern compiles"))
}

/// Loose shape check: something, `@`, something, `.`, something.
pub fn is_valid_email(candidate: &str) -> bool {
    email_pattern().is_match(candidate)
}

fn require_text(errors: &mut ValidationErrors, field: ApplicationField, value: &str) {
    if value.trim().is_empty() {
        errors.insert(field, FieldErrorKind::Required);
    }
}

fn require_min_chars(
    errors: &mut ValidationErrors,
    field: ApplicationField,
    value: &str,
    minimum: usize,
) {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.insert(field, FieldErrorKind::Required);
        return;
    }

    let actual = trimmed.chars().count();
    if actual < minimum {
        errors.insert(field, FieldErrorKind::TooShort { minimum, actual });
    }
}

pub fn validate_personal_info(record: &ApplicationRecord) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    require_text(&mut errors, ApplicationField::FirstName, &record.first_name);
    require_text(&mut errors, ApplicationField::LastName, &record.last_name);
    if record.email.trim().is_empty() {
        errors.insert(ApplicationField::Email, FieldErrorKind::Required);
    } else if !is_valid_email(&record.email) {
        errors.insert(ApplicationField::Email, FieldErrorKind::InvalidEmail);
    }
    require_text(&mut errors, ApplicationField::Phone, &record.phone);
    require_text(&mut errors, ApplicationField::DateOfBirth, &record.date_of_birth);
    require_text(&mut errors, ApplicationField::Nationality, &record.nationality);
    require_text(&mut errors, ApplicationField::Address, &record.address);
    require_text(&mut errors, ApplicationField::City, &record.city);
    require_text(&mut errors, ApplicationField::PostalCode, &record.postal_code);
    require_text(&mut errors, ApplicationField::Country, &record.country);

    errors
}

pub fn validate_education(record: &ApplicationRecord, rules: &StepRules<'_>) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    if record.highest_education.is_none() {
        errors.insert(ApplicationField::HighestEducation, FieldErrorKind::Required);
    }
    require_text(
        &mut errors,
        ApplicationField::InstitutionName,
        &record.institution_name,
    );
    match record.graduation_year {
        None => errors.insert(ApplicationField::GraduationYear, FieldErrorKind::Required),
        Some(year) if !rules.graduation_years().contains(&year) => {
            let years = rules.graduation_years();
            errors.insert(
                ApplicationField::GraduationYear,
                FieldErrorKind::YearOutOfRange {
                    earliest: *years.start(),
                    latest: *years.end(),
                },
            );
        }
        Some(_) => {}
    }
    require_text(&mut errors, ApplicationField::FieldOfStudy, &record.field_of_study);
    match record.selected_program.as_deref().map(str::trim) {
        None | Some("") => {
            errors.insert(ApplicationField::SelectedProgram, FieldErrorKind::Required)
        }
        Some(program) if rules.catalog.find(program).is_none() => {
            errors.insert(ApplicationField::SelectedProgram, FieldErrorKind::UnknownProgram)
        }
        Some(_) => {}
    }
    if record.preferred_start_date.is_none() {
        errors.insert(ApplicationField::PreferredStartDate, FieldErrorKind::Required);
    }
    if record.study_mode.is_none() {
        errors.insert(ApplicationField::StudyMode, FieldErrorKind::Required);
    }

    errors
}

pub fn validate_documents(record: &ApplicationRecord) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    for requirement in DOCUMENT_REQUIREMENTS.iter().filter(|req| req.required) {
        if record.documents.get(requirement.slot).is_none() {
            errors.insert(requirement.slot.field(), FieldErrorKind::Required);
        }
    }

    errors
}

pub fn validate_motivation(record: &ApplicationRecord) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    require_min_chars(
        &mut errors,
        ApplicationField::MotivationLetter,
        &record.motivation_letter,
        MOTIVATION_LETTER_MIN_CHARS,
    );
    require_min_chars(
        &mut errors,
        ApplicationField::CareerGoals,
        &record.career_goals,
        CAREER_GOALS_MIN_CHARS,
    );
    require_min_chars(
        &mut errors,
        ApplicationField::WhyThisProgram,
        &record.why_this_program,
        WHY_THIS_PROGRAM_MIN_CHARS,
    );

    errors
}

pub fn validate_consent(record: &ApplicationRecord) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    if !record.agree_to_terms {
        errors.insert(ApplicationField::AgreeToTerms, FieldErrorKind::ConsentRequired);
    }
    if !record.agree_to_privacy {
        errors.insert(ApplicationField::AgreeToPrivacy, FieldErrorKind::ConsentRequired);
    }

    errors
}

/// Run the validator owned by `step`.
pub fn validate_step(
    step: WizardStep,
    record: &ApplicationRecord,
    rules: &StepRules<'_>,
) -> ValidationErrors {
    match step {
        WizardStep::PersonalInfo => validate_personal_info(record),
        WizardStep::Education => validate_education(record, rules),
        WizardStep::Documents => validate_documents(record),
        WizardStep::Motivation => validate_motivation(record),
        WizardStep::Review => validate_consent(record),
    }
}

/// Which step owns a field.
pub const fn step_of(field: ApplicationField) -> WizardStep {
    use ApplicationField as F;
    match field {
        F::FirstName
        | F::LastName
        | F::Email
        | F::Phone
        | F::DateOfBirth
        | F::Nationality
        | F::Address
        | F::City
        | F::PostalCode
        | F::Country => WizardStep::PersonalInfo,
        F::HighestEducation
        | F::InstitutionName
        | F::GraduationYear
        | F::Gpa
        | F::FieldOfStudy
        | F::SelectedProgram
        | F::PreferredStartDate
        | F::StudyMode => WizardStep::Education,
        F::Transcript | F::Diploma | F::Cv | F::Passport | F::LanguageCertificate => {
            WizardStep::Documents
        }
        F::MotivationLetter | F::CareerGoals | F::WhyThisProgram => WizardStep::Motivation,
        F::AgreeToTerms | F::AgreeToPrivacy | F::AgreeToMarketing => WizardStep::Review,
    }
}

