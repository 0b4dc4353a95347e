use actix_web::error::{JsonPayloadError, PathError};
use actix_web::{HttpRequest, HttpResponse};
use thiserror::Error;

use crate::domain::errors::DomainError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found")]
    NotFound,

    #[error("Forbidden")]
    Forbidden,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::NotFound => AppError::NotFound,
            DomainError::Forbidden => AppError::Forbidden,
            DomainError::EmptyOrder
            | DomainError::InvalidPrice(_)
            | DomainError::InvalidPaymentProof(_)
            | DomainError::InvalidInput(_) => AppError::BadRequest(e.to_string()),
            DomainError::NotPaid | DomainError::AlreadyInState(_) => AppError::Conflict(e.to_string()),
            DomainError::StoreUnavailable(msg) => AppError::Unavailable(msg),
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let body = |msg: String| serde_json::json!({ "error": msg });
        match self {
            AppError::NotFound => HttpResponse::NotFound().json(body(self.to_string())),
            AppError::Forbidden => HttpResponse::Forbidden().json(body(self.to_string())),
            AppError::Unauthorized(_) => HttpResponse::Unauthorized().json(body(self.to_string())),
            AppError::BadRequest(_) => HttpResponse::BadRequest().json(body(self.to_string())),
            AppError::Conflict(_) => HttpResponse::Conflict().json(body(self.to_string())),
            AppError::Unavailable(msg) => {
                log::error!("Record store unavailable: {}", msg);
                HttpResponse::ServiceUnavailable().json(body("Service unavailable".to_string()))
            }
            AppError::Internal(msg) => {
                log::error!("Internal error: {}", msg);
                HttpResponse::InternalServerError().json(body("Internal server error".to_string()))
            }
        }
    }
}

/// Rejected request bodies get the same JSON error shape as domain errors.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(format!("Invalid request body: {}", err)).into()
}

pub fn path_error_handler(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(format!("Invalid path: {}", err)).into()
}
