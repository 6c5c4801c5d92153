//! JSON extractor whose rejections use the form error contract

use crate::error::AppError;
use axum::{
    async_trait,
    body::Body,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

/// Like `axum::Json`, but a body that is not a JSON object of the expected
/// shape is answered as an invalid form (400) instead of axum's plain-text
/// 415/422 rejections.
pub struct FormJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for FormJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(FormJson(value)),
            Err(rejection) => Err(AppError::MalformedPayload(describe(&rejection))),
        }
    }
}

fn describe(rejection: &JsonRejection) -> String {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => "expected application/json".to_string(),
        JsonRejection::JsonSyntaxError(err) => format!("syntax error: {}", err.body_text()),
        JsonRejection::JsonDataError(err) => format!("unexpected shape: {}", err.body_text()),
        other => other.body_text(),
    }
}
