//! Error types and HTTP error response handling.
//!
//! Every fallible handler returns `Result<_, AppError>`. The `IntoResponse`
//! impl maps each variant to a status code and a JSON body of the form
//! `{"error": {"code": "...", "message": "..."}}` so clients get a uniform
//! error envelope across the whole API.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Application-wide error type.
///
/// # Taxonomy
///
/// - `NotFound`: entity missing, or owned by a different user (the two are
///   deliberately indistinguishable to clients)
/// - `Validation`: malformed or out-of-range input → 400
/// - `Conflict`: duplicate account name, budget key, username or email → 409
/// - `Unauthorized`: missing/invalid credentials or bearer token → 401
/// - `ImportFailed`: per-row CSV import errors, collected as a batch → 400
/// - `Database` / `Internal`: unexpected failures → 500, detail hidden
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed (connection error, query error).
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Missing or invalid credentials or bearer token.
    #[error("Unauthorized")]
    Unauthorized,

    /// Entity does not exist or does not belong to the authenticated user.
    /// The static str names the entity kind ("account", "invoice", ...).
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Request body or parameters are invalid.
    #[error("{0}")]
    Validation(String),

    /// Uniqueness rule violated (account name, budget key, username, email).
    #[error("{0}")]
    Conflict(String),

    /// CSV import aborted; every row error is reported, nothing committed.
    #[error("Import failed")]
    ImportFailed(Vec<String>),

    /// Non-database internal failure (e.g. the PDF renderer).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // The import case carries the per-row error list alongside the
        // standard envelope; everything else is (status, code, message).
        if let AppError::ImportFailed(errors) = self {
            let body = Json(json!({
                "error": {
                    "code": "import_failed",
                    "message": "Import completed with errors",
                    "errors": errors
                }
            }));
            return (StatusCode::BAD_REQUEST, body).into_response();
        }

        let (status, code, message) = match self {
            AppError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, "unauthorized", self.to_string())
            }
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found", self.to_string()),
            AppError::Validation(ref msg) => {
                (StatusCode::BAD_REQUEST, "validation_error", msg.clone())
            }
            AppError::Conflict(ref msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            AppError::Database(ref err) => {
                tracing::error!(error = %err, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
            AppError::Internal(ref msg) => {
                tracing::error!(error = %msg, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
            AppError::ImportFailed(_) => unreachable!("handled above"),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
