use crate::infra::AppState;
use admissions::catalog::{Program, ProgramQuery};
use admissions::error::AppError;
use admissions::i18n::{languages, DocumentAttributes, Language, LanguageDescriptor};
use admissions::portal::{authenticate, Credentials, StudentUser};
use admissions::workflows::application::{
    application_router, AdmissionsService, SessionRepository, SubmissionBackend,
};
use axum::extract::{Path, Query};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Deserialize)]
pub(crate) struct LanguageSelection {
    pub(crate) code: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TranslateQuery {
    pub(crate) key: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct TranslationResponse {
    pub(crate) key: String,
    pub(crate) language: Language,
    pub(crate) text: String,
}

pub(crate) fn with_application_routes<R, B>(service: Arc<AdmissionsService<R, B>>) -> axum::Router
where
    R: SessionRepository + 'static,
    B: SubmissionBackend + 'static,
{
    application_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/language",
            axum::routing::get(current_language_endpoint).put(select_language_endpoint),
        )
        .route("/api/v1/languages", axum::routing::get(languages_endpoint))
        .route("/api/v1/translate", axum::routing::get(translate_endpoint))
        .route("/api/v1/programs", axum::routing::get(programs_endpoint))
        .route("/api/v1/programs/:id", axum::routing::get(program_endpoint))
        .route("/api/v1/portal/login", axum::routing::post(login_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn current_language_endpoint(
    Extension(state): Extension<AppState>,
) -> Json<LanguageDescriptor> {
    Json(state.language.current().descriptor())
}

pub(crate) async fn select_language_endpoint(
    Extension(state): Extension<AppState>,
    Json(selection): Json<LanguageSelection>,
) -> Result<Json<DocumentAttributes>, AppError> {
    let language = Language::from_code(&selection.code)?;
    let attributes = state.language.set_language(language)?;
    Ok(Json(attributes))
}

pub(crate) async fn languages_endpoint() -> Json<Vec<LanguageDescriptor>> {
    Json(languages())
}

pub(crate) async fn translate_endpoint(
    Extension(state): Extension<AppState>,
    Query(query): Query<TranslateQuery>,
) -> Json<TranslationResponse> {
    let text = state.language.translate(&query.key);
    Json(TranslationResponse {
        key: query.key,
        language: state.language.current(),
        text,
    })
}

pub(crate) async fn programs_endpoint(
    Extension(state): Extension<AppState>,
    Query(query): Query<ProgramQuery>,
) -> Result<Json<Vec<Program>>, AppError> {
    let filter = query.into_filter()?;
    let programs = state
        .catalog
        .filter(&filter)
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(programs))
}

pub(crate) async fn program_endpoint(
    Extension(state): Extension<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Program>, AppError> {
    let program = state.catalog.get(&id)?.clone();
    Ok(Json(program))
}

pub(crate) async fn login_endpoint(
    Json(credentials): Json<Credentials>,
) -> Result<Json<StudentUser>, AppError> {
    let user = authenticate(&credentials)?;
    info!(student_id = %user.student_id, "portal dashboard opened");
    Ok(Json(user))
}
