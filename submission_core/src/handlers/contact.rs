//! Contact form endpoint

use crate::{
    error::{AppError, Result},
    extractors::FormJson,
    forms::{ContactForm, SubmissionMeta},
    middleware::rate_limit::ClientKey,
    AppState,
};
use axum::{extract::State, Json};
use serde_json::{json, Value};
use tracing::{info, warn};

pub async fn handle_contact(
    State(state): State<AppState>,
    client: ClientKey,
    payload: std::result::Result<FormJson<ContactForm>, AppError>,
) -> Result<Json<Value>> {
    state.metrics.record_received();

    let FormJson(form) = payload.map_err(|err| {
        state.metrics.record_validation_rejected();
        warn!(form = "contact", client = %client, "malformed payload: {}", err);
        err
    })?;

    let submission = form.validate().map_err(|errors| {
        state.metrics.record_validation_rejected();
        warn!(
            form = "contact",
            client = %client,
            fields = ?errors.field_names(),
            "validation failed"
        );
        AppError::Validation(errors)
    })?;

    let meta = SubmissionMeta::new(client);
    info!(form = "contact", client = %meta.client, submission_id = %meta.id, "POST /api/contact");

    state.submissions.submit_contact(submission, meta).await?;

    Ok(Json(json!({ "success": true })))
}
