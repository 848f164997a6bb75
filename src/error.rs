use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;

/// Errors surfaced by the leave ledger.
///
/// `Validation` and `NotFound` are caller mistakes and map to 4xx responses.
/// `Storage` is a persistence failure: it is logged, reported as a 500 and
/// never retried, since a blind retry could apply a counter delta twice.
#[derive(Debug, Display, Clone, PartialEq)]
pub enum LeaveError {
    #[display(fmt = "{}", _0)]
    Validation(String),

    #[display(fmt = "{}", _0)]
    NotFound(String),

    #[display(fmt = "storage failure: {}", _0)]
    Storage(String),
}

impl std::error::Error for LeaveError {}

impl LeaveError {
    pub fn validation(msg: impl Into<String>) -> Self {
        LeaveError::Validation(msg.into())
    }

    pub fn employee_not_found(employee_id: u64) -> Self {
        LeaveError::NotFound(format!("Employee {} not found", employee_id))
    }

    pub fn request_not_found(request_id: u64) -> Self {
        LeaveError::NotFound(format!("Vacation request {} not found", request_id))
    }
}

impl From<sqlx::Error> for LeaveError {
    fn from(e: sqlx::Error) -> Self {
        LeaveError::Storage(e.to_string())
    }
}

impl ResponseError for LeaveError {
    fn status_code(&self) -> StatusCode {
        match self {
            LeaveError::Validation(_) => StatusCode::BAD_REQUEST,
            LeaveError::NotFound(_) => StatusCode::NOT_FOUND,
            LeaveError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            LeaveError::Storage(detail) => {
                tracing::error!(error = %detail, "Storage failure");
                "Internal Server Error".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(json!({ "message": message }))
    }
}
