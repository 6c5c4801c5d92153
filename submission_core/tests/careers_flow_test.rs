mod common;

use axum::{body::Body, http::{header, Request, StatusCode}};
use common::*;
use serde_json::json;

const MIB: usize = 1024 * 1024;

#[tokio::test]
async fn test_application_with_pdf_is_delivered_with_attachment() {
    let app = TestApp::new();
    let cv = vec![0x25u8; MIB];
    let body = application(NOW - 10_000)
        .file("cv", "ada-lovelace.pdf", "application/pdf", &cv)
        .finish();

    let response = app.send(careers_request(body, "203.0.113.20")).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({ "success": true }));
    assert_eq!(response.header("x-ratelimit-limit"), Some("3"));

    let sent = app.dispatcher.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0]
        .subject
        .contains("Application for Senior Backend Engineer from Ada Lovelace"));
    assert!(sent[0].text.ends_with("CV Attached: Yes"));
    assert_eq!(sent[0].attachments.len(), 1);
    assert_eq!(sent[0].attachments[0].filename, "ada-lovelace.pdf");
    assert_eq!(sent[0].attachments[0].content.len(), MIB);
}

#[tokio::test]
async fn test_application_without_cv_is_delivered() {
    let app = TestApp::new();

    let response = app
        .send(careers_request(application(NOW - 10_000).finish(), "203.0.113.20"))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let sent = app.dispatcher.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].attachments.is_empty());
    assert!(sent[0].text.ends_with("CV Attached: No"));
}

#[tokio::test]
async fn test_empty_file_part_counts_as_no_cv() {
    let app = TestApp::new();
    let body = application(NOW - 10_000)
        .file("cv", "", "application/octet-stream", b"")
        .finish();

    let response = app.send(careers_request(body, "203.0.113.20")).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(app.dispatcher.sent()[0].attachments.is_empty());
}

#[tokio::test]
async fn test_image_cv_is_rejected() {
    let app = TestApp::new();
    let body = application(NOW - 10_000)
        .file("cv", "selfie.png", "image/png", b"\x89PNG\r\n\x1a\n")
        .finish();

    let response = app.send(careers_request(body, "203.0.113.20")).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["code"], "cvInvalidType");
    assert_eq!(
        response.body["error"],
        "Invalid file type. Please upload a PDF or Word document."
    );
    assert_eq!(app.dispatcher.count(), 0);
}

#[tokio::test]
async fn test_cv_one_byte_over_limit_is_rejected() {
    let app = TestApp::new();
    let cv = vec![0u8; 5 * MIB + 1];
    let body = application(NOW - 10_000)
        .file("cv", "huge.pdf", "application/pdf", &cv)
        .finish();

    let response = app.send(careers_request(body, "203.0.113.20")).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["code"], "cvTooLarge");
    assert_eq!(
        response.body["error"],
        "CV file is too large. Maximum size is 5MB."
    );
    assert_eq!(app.dispatcher.count(), 0);
}

#[tokio::test]
async fn test_body_over_upload_limit_is_rejected_as_too_large() {
    let app = TestApp::new();
    let cv = vec![0u8; 7 * MIB];
    let body = application(NOW - 10_000)
        .file("cv", "enormous.pdf", "application/pdf", &cv)
        .finish();

    let response = app.send(careers_request(body, "203.0.113.20")).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["code"], "cvTooLarge");
    assert_eq!(app.dispatcher.count(), 0);
}

#[tokio::test]
async fn test_oversized_text_part_is_not_blamed_on_the_cv() {
    let app = TestApp::new();
    let padding = "a".repeat(7 * MIB);
    let body = application(NOW - 10_000)
        .text("message", &padding)
        .finish();

    let response = app.send(careers_request(body, "203.0.113.20")).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "Invalid form data");
    assert!(response.body.get("code").is_none());
    assert_eq!(app.dispatcher.count(), 0);
    assert_eq!(app.state.metrics.get_snapshot().attachment_rejected, 0);
}

#[tokio::test]
async fn test_word_documents_are_accepted() {
    let app = TestApp::new();
    let docx = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

    for (client, filename, content_type) in [
        ("203.0.113.31", "cv.doc", "application/msword"),
        ("203.0.113.32", "cv.docx", docx),
    ] {
        let body = application(NOW - 10_000)
            .file("cv", filename, content_type, b"word document")
            .finish();
        let response = app.send(careers_request(body, client)).await;
        assert_eq!(response.status, StatusCode::OK, "{}", content_type);
    }

    assert_eq!(app.dispatcher.count(), 2);
}

#[tokio::test]
async fn test_missing_fields_are_reported() {
    let app = TestApp::new();
    let body = MultipartBody::new()
        .text("email", "not-an-email")
        .text("jobId", "senior-backend-engineer")
        .text("timestamp", "yesterday")
        .finish();

    let response = app.send(careers_request(body, "203.0.113.20")).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let fields = &response.body["details"]["fieldErrors"];
    assert_eq!(fields["firstName"], json!(["firstNameRequired"]));
    assert_eq!(fields["lastName"], json!(["lastNameRequired"]));
    assert_eq!(fields["email"], json!(["emailInvalid"]));
    assert_eq!(fields["jobTitle"], json!(["jobTitleRequired"]));
    assert_eq!(fields["timestamp"], json!(["timestampInvalid"]));
    assert!(fields.get("jobId").is_none());
    assert_eq!(app.dispatcher.count(), 0);
}

#[tokio::test]
async fn test_spam_is_discarded_before_cv_checks() {
    let app = TestApp::new();
    let body = application(NOW - 10_000)
        .text("website", "http://bot.example")
        .file("cv", "selfie.png", "image/png", b"\x89PNG")
        .finish();

    let response = app.send(careers_request(body, "203.0.113.20")).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({ "success": true }));
    assert_eq!(app.dispatcher.count(), 0);
}

#[tokio::test]
async fn test_fast_application_is_discarded() {
    let app = TestApp::new();

    let response = app
        .send(careers_request(application(NOW - 2999).finish(), "203.0.113.20"))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(app.dispatcher.count(), 0);
}

#[tokio::test]
async fn test_non_multipart_body_is_rejected() {
    let app = TestApp::new();
    let request = Request::builder()
        .method("POST")
        .uri("/api/careers")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();

    let response = app.send(request).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "Invalid form data");
}

#[tokio::test]
async fn test_careers_limit_is_separate_from_contact() {
    let app = TestApp::new();
    let client = "192.0.2.77";

    for _ in 0..3 {
        let response = app
            .send(careers_request(application(NOW - 10_000).finish(), client))
            .await;
        assert_eq!(response.status, StatusCode::OK);
    }

    let limited = app
        .send(careers_request(application(NOW - 10_000).finish(), client))
        .await;
    assert_eq!(limited.status, StatusCode::TOO_MANY_REQUESTS);

    let contact = app
        .send(contact_request(&contact_payload(NOW - 4000), client))
        .await;
    assert_eq!(contact.status, StatusCode::OK);
    assert_eq!(app.dispatcher.count(), 4);
}
