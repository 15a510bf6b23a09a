use crate::infra::InMemorySessionRepository;
use admissions::catalog::ProgramCatalog;
use admissions::error::AppError;
use admissions::workflows::application::{
    AdmissionsService, ApplicationPatch, DocumentSlot, EducationLevel, MockSubmissionBackend,
    SessionId, StudyMode, UploadedFile, WizardView,
};
use chrono::NaiveDate;
use clap::Args;
use std::sync::Arc;
use std::time::Duration;

type DemoService = AdmissionsService<InMemorySessionRepository, MockSubmissionBackend>;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Mock submission latency in milliseconds
    #[arg(long, default_value_t = 0)]
    pub(crate) delay_ms: u64,
    /// Program to apply for
    #[arg(long, default_value = "msc-data-science")]
    pub(crate) program: String,
    /// Pick an oversized transcript first to show the rejection path
    #[arg(long)]
    pub(crate) show_rejections: bool,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        delay_ms,
        program,
        show_rejections,
    } = args;

    let repository = Arc::new(InMemorySessionRepository::default());
    let service = AdmissionsService::new(
        repository.clone(),
        Arc::new(MockSubmissionBackend::new(Duration::from_millis(delay_ms))),
        Arc::new(ProgramCatalog::embedded().clone()),
    );

    println!("HOPn application wizard demo");
    let view = service.start()?;
    let id = view.session_id.clone();
    render_step(&view);

    if show_rejections {
        match service.proceed(&id) {
            Ok(view) => render_step(&view),
            Err(err) => println!("  Blocked: {}", err),
        }
    }

    service.update(&id, personal_info())?;
    advance(&service, &id)?;

    service.update(&id, education(&program))?;
    advance(&service, &id)?;

    if show_rejections {
        let oversized = UploadedFile::new("transcript-scan.pdf", 11 * 1024 * 1024);
        if let Err(err) = service.select_document(&id, DocumentSlot::Transcript, oversized) {
            println!("  Transcript rejected: {}", err);
        }
    }
    for (slot, name, size) in [
        (DocumentSlot::Transcript, "transcript.pdf", 180_000),
        (DocumentSlot::Diploma, "diploma.pdf", 240_000),
        (DocumentSlot::Cv, "cv.docx", 52_000),
        (DocumentSlot::Passport, "passport.jpg", 1_400_000),
    ] {
        service.select_document(&id, slot, UploadedFile::new(name, size))?;
        println!("  Uploaded {:?}: {}", slot, name);
    }
    advance(&service, &id)?;

    service.update(&id, motivation())?;
    let view = advance(&service, &id)?;
    if let Some(review) = &view.review {
        if let Some(program) = &review.program {
            println!("  Program: {}", program.title);
        }
        for document in &review.documents {
            println!("  - {} ({}, {})", document.title, document.file_name, document.size);
        }
    }

    service.update(
        &id,
        ApplicationPatch {
            agree_to_terms: Some(true),
            agree_to_privacy: Some(true),
            ..ApplicationPatch::default()
        },
    )?;
    if delay_ms > 0 {
        println!("Submitting (mock backend, {} ms)...", delay_ms);
    }
    let view = service.submit(&id).await?;

    match &view.receipt {
        Some(receipt) => {
            println!("\nApplication submitted: {}", receipt.application_id);
            println!("  Applicant: {}", receipt.applicant.full_name);
            println!("  Confirmation sent to: {}", receipt.applicant.email);
            if let Some(title) = &view.program_title {
                println!("  Program: {}", title);
            }
        }
        None => println!("\nSubmission did not complete (phase {})", view.phase),
    }
    println!("Sessions held in memory: {}", repository.len());

    Ok(())
}

fn advance(service: &DemoService, id: &SessionId) -> Result<WizardView, AppError> {
    let view = service.proceed(id)?;
    render_step(&view);
    Ok(view)
}

fn render_step(view: &WizardView) {
    let Some(index) = view.current_step else {
        println!("[{}]", view.phase);
        return;
    };
    if let Some(badge) = view.steps.iter().find(|badge| badge.index == index) {
        println!(
            "\nStep {}/{} ({}%): {} - {}",
            index, view.total_steps, view.progress_percent, badge.title, badge.description
        );
    }
    for error in &view.errors {
        println!("  ! {}", error.message);
    }
}

fn personal_info() -> ApplicationPatch {
    ApplicationPatch {
        first_name: Some("Sara".to_string()),
        last_name: Some("Weber".to_string()),
        email: Some("sara.weber@example.de".to_string()),
        phone: Some("+49 40 555 0101".to_string()),
        date_of_birth: Some("1998-11-03".to_string()),
        nationality: Some("German".to_string()),
        address: Some("Hafenstrasse 7".to_string()),
        city: Some("Hamburg".to_string()),
        postal_code: Some("20359".to_string()),
        country: Some("Germany".to_string()),
        ..ApplicationPatch::default()
    }
}

fn education(program: &str) -> ApplicationPatch {
    ApplicationPatch {
        highest_education: Some(Some(EducationLevel::BachelorsDegree)),
        institution_name: Some("Universitaet Hamburg".to_string()),
        graduation_year: Some(Some(2021)),
        gpa: Some("1.7".to_string()),
        field_of_study: Some("Mathematics".to_string()),
        selected_program: Some(Some(program.to_string())),
        preferred_start_date: Some(NaiveDate::from_ymd_opt(2025, 10, 1)),
        study_mode: Some(Some(StudyMode::Online)),
        ..ApplicationPatch::default()
    }
}

fn motivation() -> ApplicationPatch {
    ApplicationPatch {
        motivation_letter: Some(
            "After four years of applied statistics work in logistics I want to deepen my \
             understanding of machine learning, reproducible analysis and data engineering so \
             that I can lead analytics projects end to end and mentor junior colleagues."
                .to_string(),
        ),
        career_goals: Some(
            "Lead a data science team that builds forecasting products for sustainable supply \
             chains across Europe."
                .to_string(),
        ),
        why_this_program: Some(
            "The online format lets me keep working while the curriculum covers exactly the \
             modelling and engineering gaps I have today."
                .to_string(),
        ),
        ..ApplicationPatch::default()
    }
}
