use super::common::*;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::workflows::application::submission::MockSubmissionBackend;
use crate::workflows::application::{application_router, AdmissionsService};

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request builds")
}

#[tokio::test]
async fn start_returns_created_session() {
    let (service, _) = build_service();
    let router = application_router(Arc::new(service));

    let response = router
        .oneshot(empty_request("POST", "/api/v1/applications"))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json_body(response).await;
    assert_eq!(body["current_step"], 1);
    assert_eq!(body["total_steps"], 5);
    assert_eq!(body["steps"][0]["status"], "current");
    assert_eq!(body["steps"][1]["status"], "upcoming");
}

#[tokio::test]
async fn next_on_invalid_step_is_unprocessable_with_field_errors() {
    let (service, _) = build_service();
    let service = Arc::new(service);
    let id = service.start().expect("session starts").session_id;

    let response = application_router(service)
        .oneshot(empty_request(
            "POST",
            &format!("/api/v1/applications/{}/next", id.0),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    let errors = body["errors"].as_array().expect("error list");
    assert_eq!(errors.len(), 10);
    assert_eq!(errors[0]["field"], "first_name");
    assert_eq!(errors[0]["message"], "First name is required");
    assert_eq!(errors[0]["translation_key"], "apply.errors.required");
}

#[tokio::test]
async fn patch_merges_fields_without_validation() {
    let (service, repository) = build_service();
    let service = Arc::new(service);
    let id = service.start().expect("session starts").session_id;

    let response = application_router(service)
        .oneshot(json_request(
            "PATCH",
            &format!("/api/v1/applications/{}", id.0),
            json!({ "first_name": "Lina", "study_mode": "on-campus" }),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["record"]["first_name"], "Lina");
    assert_eq!(body["errors"], json!([]));
    assert_eq!(
        repository.stored(&id).wizard.record().study_mode,
        Some(crate::workflows::application::StudyMode::OnCampus)
    );
}

#[tokio::test]
async fn oversized_document_is_unprocessable() {
    let (service, _) = build_service();
    let service = Arc::new(service);
    let id = service.start().expect("session starts").session_id;

    let response = application_router(service)
        .oneshot(json_request(
            "PUT",
            &format!("/api/v1/applications/{}/documents/transcript", id.0),
            json!({ "file_name": "transcript.pdf", "size_bytes": 10 * 1024 * 1024 + 1 }),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    assert_eq!(body["errors"][0]["field"], "transcript");
    assert_eq!(body["errors"][0]["message"], "File size must be less than 10MB");
}

#[tokio::test]
async fn unknown_session_is_not_found() {
    let (service, _) = build_service();
    let response = crate::workflows::application::router::view_handler::<
        MemoryRepository,
        MockSubmissionBackend,
    >(State(Arc::new(service)), Path("session-unknown".to_string()))
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn submit_before_review_is_conflict() {
    let (service, _) = build_service();
    let service = Arc::new(service);
    let id = service.start().expect("session starts").session_id;

    let response = crate::workflows::application::router::submit_handler::<
        MemoryRepository,
        MockSubmissionBackend,
    >(State(service), Path(id.0))
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn backend_failure_is_bad_gateway() {
    let repository = Arc::new(MemoryRepository::default());
    let service = Arc::new(AdmissionsService::new(
        repository.clone(),
        Arc::new(FailingBackend::default()),
        catalog(),
    ));
    let id = service.start().expect("session starts").session_id;
    repository
        .sessions
        .lock()
        .expect("repository mutex poisoned")
        .get_mut(&id)
        .expect("session stored")
        .wizard = wizard_at(crate::workflows::application::WizardStep::Review);

    let response = application_router(service)
        .oneshot(empty_request(
            "POST",
            &format!("/api/v1/applications/{}/submit", id.0),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(
        repository.stored(&id).wizard.current_step(),
        Some(crate::workflows::application::WizardStep::Review)
    );
}

#[tokio::test]
async fn unavailable_store_is_internal_error() {
    let service = Arc::new(AdmissionsService::new(
        Arc::new(UnavailableRepository),
        Arc::new(MockSubmissionBackend::instant()),
        catalog(),
    ));

    let response = crate::workflows::application::router::start_handler::<
        UnavailableRepository,
        MockSubmissionBackend,
    >(State(service))
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn back_then_delete_document_round_trip() {
    let (service, repository) = build_service();
    let service = Arc::new(service);
    let id = service.start().expect("session starts").session_id;
    repository
        .sessions
        .lock()
        .expect("repository mutex poisoned")
        .get_mut(&id)
        .expect("session stored")
        .wizard = wizard_at(crate::workflows::application::WizardStep::Motivation);
    let router = application_router(service);

    let back = router
        .clone()
        .oneshot(empty_request(
            "POST",
            &format!("/api/v1/applications/{}/back", id.0),
        ))
        .await
        .expect("router responds");
    assert_eq!(back.status(), StatusCode::OK);
    let body = read_json_body(back).await;
    assert_eq!(body["current_step"], 3);

    let removed = router
        .oneshot(empty_request(
            "DELETE",
            &format!("/api/v1/applications/{}/documents/passport", id.0),
        ))
        .await
        .expect("router responds");
    assert_eq!(removed.status(), StatusCode::OK);
    let body = read_json_body(removed).await;
    assert_eq!(body["record"]["documents"]["passport"], Value::Null);
}
