//! API-boundary error type.
//!
//! Every handler returns `Result<_, ApiError>`; the conversion to a response
//! renders the uniform `{success:false, message}` envelope with a status
//! matching the failure class. Unexpected errors are logged server-side and
//! surfaced with a generic message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::storage::StoreError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    #[error("password hashing error: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::Store(_) | ApiError::Hash(_) | ApiError::Token(_) => {
                error!("internal error: {self}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (
            status,
            Json(json!({ "success": false, "message": message })),
        )
            .into_response()
    }
}
