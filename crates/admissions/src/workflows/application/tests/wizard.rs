use super::common::*;
use crate::workflows::application::domain::{
    ApplicationField, ApplicationPatch, ApplicationRecord, DocumentSlot, UploadedFile,
};
use crate::workflows::application::documents::MAX_DOCUMENT_BYTES;
use crate::workflows::application::submission::{MockSubmissionBackend, SubmissionError};
use crate::workflows::application::validation::FieldErrorKind;
use crate::workflows::application::wizard::{
    ApplicationWizard, WizardError, WizardPhase, WizardStep,
};

#[test]
fn new_wizard_starts_on_personal_info_with_empty_record() {
    let wizard = ApplicationWizard::new();
    assert_eq!(wizard.current_step(), Some(WizardStep::PersonalInfo));
    assert_eq!(wizard.record(), &ApplicationRecord::default());
    assert!(wizard.errors().is_empty());
    assert!(!wizard.is_submitting());
}

#[test]
fn progress_rounds_to_whole_percent() {
    let percents: Vec<u8> = WizardStep::ordered()
        .into_iter()
        .map(WizardStep::progress_percent)
        .collect();
    assert_eq!(percents, vec![20, 40, 60, 80, 100]);
}

#[test]
fn advance_and_retreat_stay_in_bounds() {
    let mut wizard = ApplicationWizard::new();
    assert!(!wizard.retreat());
    assert_eq!(wizard.current_step(), Some(WizardStep::PersonalInfo));

    for _ in 0..4 {
        assert!(wizard.advance());
    }
    assert_eq!(wizard.current_step(), Some(WizardStep::Review));
    assert!(!wizard.advance());
    assert_eq!(wizard.current_step(), Some(WizardStep::Review));
}

#[test]
fn proceed_blocks_on_invalid_step_and_stays_put() {
    let mut wizard = ApplicationWizard::new();
    wizard
        .update_record(ApplicationPatch {
            first_name: Some("Lina".to_string()),
            ..ApplicationPatch::default()
        })
        .expect("editable");

    match wizard.proceed(&rules()) {
        Err(WizardError::StepInvalid(errors)) => {
            assert!(!errors.contains(ApplicationField::FirstName));
            assert!(errors.contains(ApplicationField::LastName));
        }
        other => panic!("expected step errors, got {other:?}"),
    }
    assert_eq!(wizard.current_step(), Some(WizardStep::PersonalInfo));
    assert!(wizard.errors().contains(ApplicationField::Email));
}

#[test]
fn proceed_only_validates_the_current_step() {
    let mut wizard = ApplicationWizard::new();
    let mut patch = patch_from(valid_record());
    patch.motivation_letter = Some(String::new());
    patch.highest_education = Some(None);
    wizard.update_record(patch).expect("editable");

    assert_eq!(wizard.proceed(&rules()), Ok(WizardStep::Education));
    assert!(wizard.errors().is_empty());
    assert!(matches!(wizard.proceed(&rules()), Err(WizardError::StepInvalid(_))));
    assert_eq!(
        wizard.errors().fields(),
        vec![ApplicationField::HighestEducation]
    );
}

#[test]
fn editing_clears_only_the_touched_field_error() {
    let mut wizard = ApplicationWizard::new();
    let _ = wizard.proceed(&rules());
    assert!(wizard.errors().contains(ApplicationField::FirstName));
    assert!(wizard.errors().contains(ApplicationField::City));

    wizard
        .update_record(ApplicationPatch {
            first_name: Some("L".to_string()),
            ..ApplicationPatch::default()
        })
        .expect("editable");

    assert!(!wizard.errors().contains(ApplicationField::FirstName));
    assert!(wizard.errors().contains(ApplicationField::City));
}

#[test]
fn retreat_never_validates_and_keeps_entered_data() {
    let mut wizard = wizard_at(WizardStep::Motivation);
    wizard
        .update_record(ApplicationPatch {
            motivation_letter: Some("too short".to_string()),
            ..ApplicationPatch::default()
        })
        .expect("editable");

    assert!(wizard.retreat());
    assert_eq!(wizard.current_step(), Some(WizardStep::Documents));
    assert!(wizard.errors().is_empty());
    assert_eq!(wizard.record().motivation_letter, "too short");
}

#[test]
fn explicit_null_clears_optional_fields() {
    let mut wizard = wizard_at(WizardStep::Education);
    let patch: ApplicationPatch =
        serde_json::from_str(r#"{"study_mode": null, "gpa": "3.9"}"#).expect("patch parses");
    let touched = wizard.update_record(patch).expect("editable");

    assert_eq!(
        touched,
        vec![ApplicationField::Gpa, ApplicationField::StudyMode]
    );
    assert!(wizard.record().study_mode.is_none());
    assert_eq!(wizard.record().gpa, "3.9");
    assert!(wizard.record().selected_program.is_some());
}

#[test]
fn unknown_patch_keys_are_rejected() {
    let parsed = serde_json::from_str::<ApplicationPatch>(r#"{"favourite_colour": "teal"}"#);
    assert!(parsed.is_err());
}

#[test]
fn oversized_file_is_rejected_and_slot_left_untouched() {
    let mut wizard = wizard_at(WizardStep::Documents);
    let before = wizard.record().documents.clone();

    let result = wizard.select_document(
        DocumentSlot::Transcript,
        UploadedFile::new("scan.pdf", MAX_DOCUMENT_BYTES + 1),
    );

    assert!(matches!(
        result,
        Err(WizardError::DocumentRejected {
            field: ApplicationField::Transcript,
            kind: FieldErrorKind::FileTooLarge { .. },
        })
    ));
    assert_eq!(wizard.record().documents, before);
    assert_eq!(
        wizard
            .errors()
            .get(ApplicationField::Transcript)
            .map(|kind| kind.message(ApplicationField::Transcript)),
        Some("File size must be less than 10MB".to_string())
    );
}

#[test]
fn wrong_type_lists_accepted_extensions() {
    let mut wizard = wizard_at(WizardStep::Documents);
    let result = wizard.select_document(DocumentSlot::Passport, UploadedFile::new("passport", 10));

    match result {
        Err(WizardError::DocumentRejected { kind, field }) => assert_eq!(
            kind.message(field),
            "File type not supported. Accepted types: .pdf, .jpg, .jpeg, .png"
        ),
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[test]
fn accepted_file_replaces_slot_and_clears_its_error() {
    let mut wizard = ApplicationWizard::new();
    for _ in 0..2 {
        wizard.advance();
    }
    let _ = wizard.proceed(&rules());
    assert!(wizard.errors().contains(ApplicationField::Cv));

    wizard
        .select_document(DocumentSlot::Cv, UploadedFile::new("cv.PDF", 2_048))
        .expect("pdf accepted for cv");

    assert!(!wizard.errors().contains(ApplicationField::Cv));
    assert!(wizard.errors().contains(ApplicationField::Transcript));
    let stored = wizard
        .record()
        .documents
        .get(DocumentSlot::Cv)
        .expect("slot filled");
    assert_eq!(stored.content_type, "application/pdf");
}

#[test]
fn removing_a_required_document_blocks_the_step_again() {
    let mut wizard = wizard_at(WizardStep::Documents);
    wizard
        .remove_document(DocumentSlot::Diploma)
        .expect("editable");

    match wizard.proceed(&rules()) {
        Err(WizardError::StepInvalid(errors)) => {
            assert_eq!(errors.fields(), vec![ApplicationField::Diploma]);
        }
        other => panic!("expected diploma error, got {other:?}"),
    }
}

#[test]
fn proceed_on_review_validates_consent_without_moving() {
    let mut wizard = wizard_at(WizardStep::Review);
    assert_eq!(wizard.proceed(&rules()), Ok(WizardStep::Review));
    assert!(!wizard.is_submitting());
}

#[test]
fn submission_requires_review_step() {
    let mut wizard = wizard_at(WizardStep::Motivation);
    assert_eq!(
        wizard.begin_submission(),
        Err(WizardError::NotOnReviewStep(WizardStep::Motivation))
    );
}

#[test]
fn missing_consent_blocks_submission() {
    let mut wizard = wizard_at(WizardStep::Review);
    wizard
        .update_record(ApplicationPatch {
            agree_to_privacy: Some(false),
            ..ApplicationPatch::default()
        })
        .expect("editable");

    assert!(matches!(
        wizard.begin_submission(),
        Err(WizardError::StepInvalid(_))
    ));
    assert!(wizard.errors().contains(ApplicationField::AgreeToPrivacy));
    assert_eq!(wizard.current_step(), Some(WizardStep::Review));
}

#[test]
fn second_submission_is_refused_while_pending() {
    let mut wizard = wizard_at(WizardStep::Review);
    wizard.begin_submission().expect("first submission starts");

    assert!(wizard.is_submitting());
    assert_eq!(wizard.current_step(), None);
    assert_eq!(
        wizard.begin_submission(),
        Err(WizardError::SubmissionPending)
    );
    assert_eq!(
        wizard.update_record(ApplicationPatch::default()),
        Err(WizardError::SubmissionPending)
    );
    assert!(!wizard.retreat());
}

#[test]
fn backend_failure_returns_to_review_with_record_intact() {
    let mut wizard = wizard_at(WizardStep::Review);
    let record = wizard.begin_submission().expect("submission starts");

    let outcome = Err(SubmissionError::Unavailable("timeout".to_string()));
    assert!(matches!(
        wizard.complete_submission(outcome),
        Err(WizardError::Backend(_))
    ));
    assert_eq!(wizard.current_step(), Some(WizardStep::Review));
    assert_eq!(wizard.record(), &record);
}

#[test]
fn completing_without_pending_submission_is_refused() {
    let mut wizard = wizard_at(WizardStep::Review);
    assert!(matches!(
        wizard.complete_submission(Err(SubmissionError::Rejected("n/a".to_string()))),
        Err(WizardError::NotSubmitting)
    ));
}

#[tokio::test]
async fn successful_submission_is_terminal_and_discards_record() {
    let mut wizard = wizard_at(WizardStep::Review);
    let backend = MockSubmissionBackend::instant();

    let receipt = wizard.submit(&backend).await.expect("mock accepts").clone();

    assert!(receipt.application_id.starts_with("APP-"));
    assert_eq!(receipt.application_id.len(), "APP-".len() + 6);
    assert_eq!(receipt.applicant.full_name, "Lina Haddad");
    assert_eq!(receipt.applicant.documents_uploaded, 4);
    assert!(matches!(wizard.phase(), WizardPhase::Submitted { .. }));
    assert_eq!(wizard.record(), &ApplicationRecord::default());

    assert!(!wizard.advance());
    assert!(!wizard.retreat());
    assert_eq!(
        wizard.submit(&backend).await.map(|receipt| receipt.clone()),
        Err(WizardError::AlreadySubmitted)
    );
    assert_eq!(
        wizard.select_document(DocumentSlot::Cv, UploadedFile::new("cv.pdf", 1)),
        Err(WizardError::AlreadySubmitted)
    );
}
