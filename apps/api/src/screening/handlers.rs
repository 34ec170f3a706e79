//! Axum route handlers for the screening API.

use std::time::Duration;

use axum::{
    extract::{multipart::Field, Multipart, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::extraction::{Document, DocumentReport};
use crate::llm_client::{check_credential, CredentialStatus};
use crate::screening::export::{to_csv, to_html, CSV_FILENAME};
use crate::screening::models::{ResultSet, ResultTable};
use crate::screening::pipeline::{run_evaluation, PipelineSettings, SubmittedForm};
use crate::session::{session_from_headers, SESSION_HEADER};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct EvaluationResponse<'a> {
    pub session_id: Uuid,
    pub status_log: Vec<String>,
    pub documents: Vec<DocumentReport>,
    #[serde(flatten)]
    pub table: ResultTable<'a>,
}

#[derive(Debug, Deserialize)]
pub struct CredentialCheckRequest {
    pub api_key: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions
pub async fn handle_start_session(State(state): State<AppState>) -> Json<SessionResponse> {
    Json(SessionResponse {
        session_id: state.sessions.start(),
    })
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_end_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.sessions.end(id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Session {id} not found")))
    }
}

/// POST /api/v1/evaluations
///
/// Multipart form: `api_key`, `job_file`, `job_text`, `candidate_files`
/// (repeatable), `candidate_text`. A known session's previous table is
/// cleared before the run and replaced only when the run succeeds. Requests
/// without a live session get a new one only on success.
pub async fn handle_evaluate(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let form = read_form(multipart).await?;

    let resumed = state.sessions.resume(session_from_headers(&headers));
    if let Some(id) = resumed {
        state.sessions.clear(id);
    }

    let settings = PipelineSettings {
        default_model: state.config.default_model.clone(),
        status_step: Duration::from_millis(state.config.status_step_ms),
    };
    let outcome = run_evaluation(state.provider.as_ref(), &settings, form).await?;

    let session_id = resumed.unwrap_or_else(|| state.sessions.start());
    state
        .sessions
        .store(session_id, outcome.results.clone());

    let body = EvaluationResponse {
        session_id,
        status_log: outcome.status_log,
        documents: outcome.documents,
        table: outcome.results.table(),
    };
    let body = serde_json::to_value(&body).map_err(|e| AppError::Internal(e.into()))?;

    Ok(([(SESSION_HEADER, session_id.to_string())], Json(body)))
}

/// GET /api/v1/results
pub async fn handle_get_results(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AppError> {
    let results = current_results(&state, &headers)?;
    let table = serde_json::to_value(results.table()).map_err(|e| AppError::Internal(e.into()))?;
    Ok(Json(table))
}

/// GET /api/v1/results/export.csv
pub async fn handle_export_csv(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let results = current_results(&state, &headers)?;
    let csv = to_csv(&results)?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{CSV_FILENAME}\""),
            ),
        ],
        csv,
    ))
}

/// GET /api/v1/results/table
pub async fn handle_results_table(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Html<String>, AppError> {
    let results = current_results(&state, &headers)?;
    Ok(Html(to_html(&results)?))
}

/// POST /api/v1/credentials/check
///
/// Advisory only: evaluation does not depend on this check.
pub async fn handle_check_credential(
    State(state): State<AppState>,
    Json(request): Json<CredentialCheckRequest>,
) -> Result<Json<CredentialStatus>, AppError> {
    let api_key = request.api_key.trim();
    if api_key.is_empty() {
        return Err(AppError::Validation("api_key cannot be empty".to_string()));
    }
    Ok(Json(check_credential(state.provider.as_ref(), api_key).await))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

fn current_results(state: &AppState, headers: &HeaderMap) -> Result<ResultSet, AppError> {
    let session_id = session_from_headers(headers).ok_or_else(|| {
        AppError::Validation(format!("{SESSION_HEADER} header with a session id is required"))
    })?;
    state
        .sessions
        .current(session_id)
        .ok_or_else(|| AppError::NotFound("No evaluation results for this session".to_string()))
}

async fn read_form(mut multipart: Multipart) -> Result<SubmittedForm, AppError> {
    let mut form = SubmittedForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let field_name = field.name().unwrap_or("").to_string();
        match field_name.as_str() {
            "api_key" => form.api_key = read_text(field).await?,
            "job_text" => form.job_text = read_text(field).await?,
            "candidate_text" => form.candidate_text = read_text(field).await?,
            "job_file" => form.job_file = read_file(field).await?,
            "candidate_files" => {
                if let Some(document) = read_file(field).await? {
                    form.candidate_files.push(document);
                }
            }
            _ => {
                let _ = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid field {field_name}: {e}")))?;
            }
        }
    }

    Ok(form)
}

async fn read_text(field: Field<'_>) -> Result<String, AppError> {
    let name = field.name().unwrap_or("").to_string();
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid field {name}: {e}")))
}

/// Browsers send an empty part when no file was chosen; that is not a document.
async fn read_file(field: Field<'_>) -> Result<Option<Document>, AppError> {
    let filename = field.file_name().unwrap_or("").to_string();
    let data = field
        .bytes()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid upload {filename}: {e}")))?;

    if filename.is_empty() && data.is_empty() {
        return Ok(None);
    }
    Ok(Some(Document::new(filename, data)))
}
