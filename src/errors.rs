use crate::validate::FieldError;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use miette::Diagnostic;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum AppError {
    #[error("I/O error: {0}")]
    #[diagnostic(code(eyesonasset::io))]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    #[diagnostic(code(eyesonasset::config))]
    Config(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(eyesonasset::serde))]
    Serde(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    #[diagnostic(code(eyesonasset::db))]
    Db(#[from] sea_orm::DbErr),

    #[error("JOSE error: {0}")]
    #[diagnostic(code(eyesonasset::jose))]
    Jose(String),

    #[error("{0}")]
    #[diagnostic(code(eyesonasset::not_found))]
    NotFound(String),

    #[error("email already registered")]
    #[diagnostic(code(eyesonasset::duplicate_email))]
    DuplicateEmail,

    #[error("validation failed")]
    #[diagnostic(code(eyesonasset::validation))]
    Validation(Vec<FieldError>),

    #[error("{0}")]
    #[diagnostic(code(eyesonasset::unauthenticated))]
    Unauthenticated(String),

    #[error("{0}")]
    #[diagnostic(code(eyesonasset::forbidden))]
    Forbidden(String),
}

impl From<josekit::JoseError> for AppError {
    fn from(value: josekit::JoseError) -> Self {
        AppError::Jose(value.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DuplicateEmail => StatusCode::BAD_REQUEST,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Io(_)
            | AppError::Config(_)
            | AppError::Serde(_)
            | AppError::Db(_)
            | AppError::Jose(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = match &self {
            AppError::Validation(errors) => json!({
                "detail": self.to_string(),
                "errors": errors
                    .iter()
                    .map(|e| json!({"field": e.field, "message": e.message}))
                    .collect::<Vec<_>>(),
            }),
            _ if status == StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!(error = %self, "request failed");
                json!({"detail": "internal server error"})
            }
            _ => json!({"detail": self.to_string()}),
        };

        let mut response = (status, Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}
