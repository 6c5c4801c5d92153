//! Career application and open positions endpoints

use crate::{
    attachments::{AttachmentError, UploadedFile},
    catalog,
    error::{AppError, Result},
    forms::{CareerApplicationForm, SubmissionMeta},
    middleware::rate_limit::ClientKey,
    AppState,
};
use axum::{
    extract::{
        multipart::{Multipart, MultipartError, MultipartRejection},
        State,
    },
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

const CV_FIELD: &str = "cv";

pub async fn handle_careers(
    State(state): State<AppState>,
    client: ClientKey,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<Value>> {
    state.metrics.record_received();
    let max_cv_bytes = state.config.attachments.max_cv_bytes;

    let parsed = match multipart {
        Ok(mut multipart) => read_application(&mut multipart, max_cv_bytes).await,
        Err(rejection) => Err(AppError::MalformedPayload(rejection.body_text())),
    };

    let (form, cv) = parsed.map_err(|err| {
        match &err {
            AppError::Attachment(_) => state.metrics.record_attachment_rejected(),
            _ => state.metrics.record_validation_rejected(),
        }
        warn!(form = "careers", client = %client, "unreadable application: {}", err);
        err
    })?;

    let application = form.validate().map_err(|errors| {
        state.metrics.record_validation_rejected();
        warn!(
            form = "careers",
            client = %client,
            fields = ?errors.field_names(),
            "validation failed"
        );
        AppError::Validation(errors)
    })?;

    let meta = SubmissionMeta::new(client);
    info!(
        form = "careers",
        client = %meta.client,
        submission_id = %meta.id,
        job_id = %application.job_id,
        cv_attached = cv.is_some(),
        "POST /api/careers"
    );

    state
        .submissions
        .submit_application(application, cv, meta)
        .await?;

    Ok(Json(json!({ "success": true })))
}

pub async fn handle_positions() -> Json<Value> {
    Json(json!({ "positions": catalog::open_positions() }))
}

/// Buffers the text parts and the optional CV part. An empty file part is
/// what browsers send when no file was chosen, so it counts as absent.
async fn read_application(
    multipart: &mut Multipart,
    max_cv_bytes: u64,
) -> Result<(CareerApplicationForm, Option<UploadedFile>)> {
    let mut form = CareerApplicationForm::default();
    let mut cv = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, PartKind::Text, max_cv_bytes))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == CV_FIELD {
            let filename = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().unwrap_or_default().to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| multipart_error(e, PartKind::Cv, max_cv_bytes))?;

            if !data.is_empty() {
                cv = Some(UploadedFile {
                    filename,
                    content_type,
                    data,
                });
            }
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| multipart_error(e, PartKind::Text, max_cv_bytes))?;
        if !form.set_field(&name, value) {
            debug!(field = %name, "ignoring unknown multipart field");
        }
    }

    Ok((form, cv))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PartKind {
    Cv,
    Text,
}

/// Only a body cut off while reading the CV part is blamed on the CV.
fn multipart_error(err: MultipartError, part: PartKind, max_cv_bytes: u64) -> AppError {
    let too_large = err.status() == StatusCode::PAYLOAD_TOO_LARGE;

    match (too_large, part) {
        // The stream was cut at the body limit, so the real size is unknown.
        (true, PartKind::Cv) => AppError::Attachment(AttachmentError::TooLarge {
            size: max_cv_bytes + 1,
            max_size: max_cv_bytes,
        }),
        (true, PartKind::Text) => {
            AppError::MalformedPayload("form body exceeds the upload limit".to_string())
        }
        (false, _) => AppError::MalformedPayload(err.body_text()),
    }
}
