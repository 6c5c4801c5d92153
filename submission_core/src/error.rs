//! Application error types and handling

use crate::attachments::AttachmentError;
use crate::forms::FormKind;
use crate::mail::MailError;
use crate::validation::ValidationErrors;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Attachment rejected: {0}")]
    Attachment(#[from] AttachmentError),

    #[error("Delivery of {form} submission failed: {source}")]
    Delivery {
        form: FormKind,
        #[source]
        source: MailError,
    },

    #[error("Internal server error")]
    InternalServerError,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::MalformedPayload(_) | AppError::Attachment(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Delivery { .. } | AppError::InternalServerError | AppError::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match self {
            AppError::Validation(errors) => json!({
                "error": "Invalid form data",
                "details": errors.to_details(),
                "status": status.as_u16(),
            }),
            AppError::MalformedPayload(msg) => {
                tracing::debug!("Malformed payload: {}", msg);
                json!({
                    "error": "Invalid form data",
                    "details": ValidationErrors::new().to_details(),
                    "status": status.as_u16(),
                })
            }
            AppError::Attachment(err) => json!({
                "error": err.public_message(),
                "code": err.kind().as_str(),
                "status": status.as_u16(),
            }),
            AppError::Delivery { form, source } => {
                tracing::error!(form = %form, "Mail delivery failed: {}", source);
                json!({
                    "error": form.failure_message(),
                    "status": status.as_u16(),
                })
            }
            AppError::InternalServerError => json!({
                "error": "Internal server error",
                "status": status.as_u16(),
            }),
            AppError::Other(err) => {
                tracing::error!("Unexpected error: {:?}", err);
                json!({
                    "error": "Internal server error",
                    "status": status.as_u16(),
                })
            }
        };

        (status, Json(body)).into_response()
    }
}
