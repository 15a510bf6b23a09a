use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use super::domain::{ApplicationPatch, DocumentSlot, SessionId, UploadedFile};
use super::repository::{RepositoryError, SessionRepository};
use super::service::{AdmissionsService, ApplicationServiceError};
use super::submission::SubmissionBackend;
use super::views::{error_views, WizardView};

/// Metadata of a picked file; bytes stay on the client.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentSelection {
    pub file_name: String,
    pub size_bytes: u64,
}

/// Router builder exposing the wizard over HTTP.
pub fn application_router<R, B>(service: Arc<AdmissionsService<R, B>>) -> Router
where
    R: SessionRepository + 'static,
    B: SubmissionBackend + 'static,
{
    Router::new()
        .route("/api/v1/applications", post(start_handler::<R, B>))
        .route(
            "/api/v1/applications/:session_id",
            axum::routing::get(view_handler::<R, B>).patch(update_handler::<R, B>),
        )
        .route(
            "/api/v1/applications/:session_id/documents/:slot",
            put(select_document_handler::<R, B>).delete(remove_document_handler::<R, B>),
        )
        .route(
            "/api/v1/applications/:session_id/next",
            post(next_handler::<R, B>),
        )
        .route(
            "/api/v1/applications/:session_id/back",
            post(back_handler::<R, B>),
        )
        .route(
            "/api/v1/applications/:session_id/submit",
            post(submit_handler::<R, B>),
        )
        .with_state(service)
}

fn respond(result: Result<WizardView, ApplicationServiceError>, success: StatusCode) -> Response {
    match result {
        Ok(view) => (success, Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) fn error_response(err: ApplicationServiceError) -> Response {
    match err {
        ApplicationServiceError::Invalid(errors) => {
            let payload = json!({
                "error": "validation failed",
                "errors": error_views(&errors),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        ApplicationServiceError::Transition(error) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::CONFLICT, Json(payload)).into_response()
        }
        ApplicationServiceError::Repository(RepositoryError::NotFound) => {
            let payload = json!({ "error": "application session not found" });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        ApplicationServiceError::Submission(error) => {
            error!(error = %error, "submission backend failed");
            let payload = json!({ "error": error.to_string() });
            (StatusCode::BAD_GATEWAY, Json(payload)).into_response()
        }
        other => {
            error!(error = %other, "application request failed");
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn start_handler<R, B>(
    State(service): State<Arc<AdmissionsService<R, B>>>,
) -> Response
where
    R: SessionRepository + 'static,
    B: SubmissionBackend + 'static,
{
    respond(service.start(), StatusCode::CREATED)
}

pub(crate) async fn view_handler<R, B>(
    State(service): State<Arc<AdmissionsService<R, B>>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
    B: SubmissionBackend + 'static,
{
    respond(service.get(&SessionId(session_id)), StatusCode::OK)
}

pub(crate) async fn update_handler<R, B>(
    State(service): State<Arc<AdmissionsService<R, B>>>,
    Path(session_id): Path<String>,
    Json(patch): Json<ApplicationPatch>,
) -> Response
where
    R: SessionRepository + 'static,
    B: SubmissionBackend + 'static,
{
    respond(service.update(&SessionId(session_id), patch), StatusCode::OK)
}

pub(crate) async fn select_document_handler<R, B>(
    State(service): State<Arc<AdmissionsService<R, B>>>,
    Path((session_id, slot)): Path<(String, DocumentSlot)>,
    Json(selection): Json<DocumentSelection>,
) -> Response
where
    R: SessionRepository + 'static,
    B: SubmissionBackend + 'static,
{
    let file = UploadedFile::new(selection.file_name, selection.size_bytes);
    respond(
        service.select_document(&SessionId(session_id), slot, file),
        StatusCode::OK,
    )
}

pub(crate) async fn remove_document_handler<R, B>(
    State(service): State<Arc<AdmissionsService<R, B>>>,
    Path((session_id, slot)): Path<(String, DocumentSlot)>,
) -> Response
where
    R: SessionRepository + 'static,
    B: SubmissionBackend + 'static,
{
    respond(
        service.remove_document(&SessionId(session_id), slot),
        StatusCode::OK,
    )
}

pub(crate) async fn next_handler<R, B>(
    State(service): State<Arc<AdmissionsService<R, B>>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
    B: SubmissionBackend + 'static,
{
    respond(service.proceed(&SessionId(session_id)), StatusCode::OK)
}

pub(crate) async fn back_handler<R, B>(
    State(service): State<Arc<AdmissionsService<R, B>>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
    B: SubmissionBackend + 'static,
{
    respond(service.back(&SessionId(session_id)), StatusCode::OK)
}

pub(crate) async fn submit_handler<R, B>(
    State(service): State<Arc<AdmissionsService<R, B>>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
    B: SubmissionBackend + 'static,
{
    respond(service.submit(&SessionId(session_id)).await, StatusCode::OK)
}
