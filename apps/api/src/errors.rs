use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;
use crate::screening::export::ExportError;
use crate::screening::parser::ParseFailure;

/// A required evaluation input that was not supplied. Checked in this order
/// before any network call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingInput {
    ApiKey,
    JobDescription,
    Candidates,
}

impl MissingInput {
    pub fn code(self) -> &'static str {
        match self {
            MissingInput::ApiKey => "MISSING_API_KEY",
            MissingInput::JobDescription => "MISSING_JOB_DESCRIPTION",
            MissingInput::Candidates => "MISSING_CANDIDATES",
        }
    }

    /// A missing key blocks outright; missing data is a warning to fix the form.
    pub fn severity(self) -> &'static str {
        match self {
            MissingInput::ApiKey => "error",
            MissingInput::JobDescription | MissingInput::Candidates => "warning",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            MissingInput::ApiKey => "Введіть API Key.",
            MissingInput::JobDescription => "Відсутній опис вакансії.",
            MissingInput::Candidates => "Відсутні дані кандидатів.",
        }
    }
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Missing input: {}", .0.code())]
    MissingInput(MissingInput),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Unparseable model response: {0}")]
    UnparseableResponse(#[from] ParseFailure),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match &self {
            AppError::MissingInput(missing) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "code": missing.code(),
                    "severity": missing.severity(),
                    "message": missing.message()
                }),
            ),
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                json!({ "code": "VALIDATION_ERROR", "message": msg }),
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                json!({ "code": "NOT_FOUND", "message": msg }),
            ),
            AppError::Llm(e) => {
                tracing::error!("LLM error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    json!({ "code": "LLM_ERROR", "message": e.to_string() }),
                )
            }
            // The raw model text goes back verbatim so the user can see what failed.
            AppError::UnparseableResponse(failure) => {
                tracing::error!("Unparseable model response: {}", failure.reason);
                (
                    StatusCode::BAD_GATEWAY,
                    json!({
                        "code": "UNPARSEABLE_RESPONSE",
                        "message": format!("Помилка обробки: {}", failure.reason),
                        "raw_response": failure.raw
                    }),
                )
            }
            AppError::Export(e) => {
                tracing::error!("Export error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "code": "EXPORT_ERROR",
                        "message": "The results could not be exported"
                    }),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "code": "INTERNAL_ERROR",
                        "message": "An internal server error occurred"
                    }),
                )
            }
        };

        (status, Json(json!({ "error": error }))).into_response()
    }
}
