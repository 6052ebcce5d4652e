//! Error handling - maps failures onto the `{ success: false, error, details? }` envelope.

use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::{HttpRequest, HttpResponse, ResponseError, http::StatusCode};
use sapien_core::{DomainError, FieldError, RepoError};
use sapien_shared::ErrorResponse;
use thiserror::Error;

/// Application-level error type rendered as a JSON error envelope.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error")]
    Validation(Vec<FieldError>),

    #[error("Invalid {0} ID")]
    InvalidId(&'static str),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Internal server error")]
    Internal(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::InvalidId(_) | AppError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = ErrorResponse::new(self.to_string());
        let body = match self {
            AppError::Validation(fields) => body.with_details(fields),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                if cfg!(debug_assertions) {
                    body.with_details(detail)
                } else {
                    body
                }
            }
            _ => body,
        };

        HttpResponse::build(self.status_code()).json(body)
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity, .. } => AppError::NotFound(entity.to_string()),
            DomainError::InvalidId { entity, .. } => AppError::InvalidId(entity),
            DomainError::Validation(fields) => AppError::Validation(fields),
            DomainError::BadRequest(msg) => AppError::BadRequest(msg),
            DomainError::Duplicate(msg) => AppError::Conflict(msg),
            DomainError::Unauthorized(msg) => AppError::Unauthorized(msg),
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        DomainError::from(err).into()
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

/// Malformed or oversized JSON bodies.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    tracing::debug!("Rejected JSON body: {}", err);
    AppError::BadRequest(format!("Invalid JSON body: {err}")).into()
}

/// Query strings that do not fit the expected shape, e.g. an unknown `sortBy`.
pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(format!("Invalid query parameters: {err}")).into()
}

pub fn path_error_handler(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(format!("Invalid path: {err}")).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.error_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body()).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[actix_rt::test]
    async fn validation_lists_every_field() {
        let err = AppError::from(DomainError::Validation(vec![
            FieldError::new("content", "Prompt content is required"),
            FieldError::new("title", "Title is required"),
        ]));
        let (status, json) = body_json(err).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Validation error");
        assert_eq!(json["details"].as_array().unwrap().len(), 2);
        assert_eq!(json["details"][1]["field"], "title");
    }

    #[actix_rt::test]
    async fn domain_errors_map_to_statuses() {
        let (status, json) = body_json(DomainError::not_found("Prompt", "x").into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "Prompt not found");

        let (status, json) = body_json(
            DomainError::InvalidId {
                entity: "Comment",
                value: "abc".to_string(),
            }
            .into(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Invalid Comment ID");

        let (status, _) = body_json(DomainError::Duplicate("taken".to_string()).into()).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, json) =
            body_json(DomainError::Unauthorized("Invalid email or password".to_string()).into())
                .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"], "Invalid email or password");
    }

    #[actix_rt::test]
    async fn internal_errors_hide_the_message() {
        let (status, json) =
            body_json(RepoError::Connection("pool timed out".to_string()).into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "Internal server error");
    }
}
