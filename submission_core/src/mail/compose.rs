//! Plain-text messages for accepted submissions

use super::log::preview;
use super::{MailAttachment, MailMessage, SubmissionSummary};
use crate::attachments::UploadedFile;
use crate::config::MailConfig;
use crate::forms::{CareerApplication, ContactSubmission, SubmissionMeta};
use chrono::SecondsFormat;
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt::Write as _;

lazy_static! {
    static ref LINE_BREAKS: Regex = Regex::new(r"[\r\n]+").unwrap();
}

const FALLBACK_FROM: &str = "noreply@localhost";
const FALLBACK_TO: &str = "inbox@localhost";

#[derive(Debug, Clone)]
pub struct MessageComposer {
    site_name: String,
    from: String,
    contact_to: String,
    careers_to: String,
}

impl MessageComposer {
    pub fn new(config: &MailConfig) -> Self {
        Self {
            site_name: config.site_name.clone(),
            from: config
                .from_address
                .clone()
                .unwrap_or_else(|| FALLBACK_FROM.to_string()),
            contact_to: config
                .contact_to
                .clone()
                .unwrap_or_else(|| FALLBACK_TO.to_string()),
            careers_to: config
                .careers_recipient()
                .unwrap_or(FALLBACK_TO)
                .to_string(),
        }
    }

    pub fn contact(&self, submission: &ContactSubmission, meta: &SubmissionMeta) -> MailMessage {
        let mut text = format!(
            "New contact form submission from {} website:\n\n\
             Name: {}\n\
             Email: {}\n\
             Company: {}\n\n\
             Message:\n{}\n",
            self.site_name,
            submission.name,
            submission.email,
            submission.company.as_deref().unwrap_or("Not provided"),
            submission.message,
        );
        append_meta(&mut text, meta);

        MailMessage {
            from: self.from.clone(),
            to: self.contact_to.clone(),
            reply_to: Some(submission.email.clone()),
            subject: header_safe(&format!(
                "[{} Contact] New message from {}",
                self.site_name, submission.name
            )),
            text,
            attachments: Vec::new(),
            summary: SubmissionSummary {
                form: "contact",
                name: submission.name.clone(),
                email: submission.email.clone(),
                company: submission.company.clone(),
                message_preview: Some(preview(&submission.message)),
                ..SubmissionSummary::default()
            },
        }
    }

    pub fn career_application(
        &self,
        application: &CareerApplication,
        cv: Option<&UploadedFile>,
        meta: &SubmissionMeta,
    ) -> MailMessage {
        let mut text = format!(
            "New job application from {} website:\n\n\
             Position: {}\n\
             Job ID: {}\n\n\
             Applicant Details:\n\
             Name: {}\n\
             Email: {}\n",
            self.site_name,
            application.job_title,
            application.job_id,
            application.full_name(),
            application.email,
        );
        if let Some(message) = &application.message {
            let _ = write!(text, "\nCover Letter / Message:\n{}\n", message);
        }
        append_meta(&mut text, meta);
        let _ = write!(text, "\nCV Attached: {}", if cv.is_some() { "Yes" } else { "No" });

        let attachments = cv
            .map(|file| MailAttachment {
                filename: file.filename.clone(),
                content_type: file.content_type.clone(),
                content: file.data.clone(),
            })
            .into_iter()
            .collect();

        MailMessage {
            from: self.from.clone(),
            to: self.careers_to.clone(),
            reply_to: Some(application.email.clone()),
            subject: header_safe(&format!(
                "[{} Careers] Application for {} from {}",
                self.site_name,
                application.job_title,
                application.full_name()
            )),
            text,
            attachments,
            summary: SubmissionSummary {
                form: "careers",
                name: application.full_name(),
                email: application.email.clone(),
                company: None,
                job_id: Some(application.job_id.clone()),
                job_title: Some(application.job_title.clone()),
                has_cv: cv.is_some(),
                message_preview: application.message.as_deref().map(preview),
            },
        }
    }
}

fn append_meta(text: &mut String, meta: &SubmissionMeta) {
    let _ = write!(
        text,
        "\n---\nSubmitted at: {}\nIP: {}\nSubmission ID: {}",
        meta.received_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        meta.client,
        meta.id,
    );
}

/// Collapses line breaks so user input cannot add header lines.
fn header_safe(value: &str) -> String {
    LINE_BREAKS.replace_all(value.trim(), " ").into_owned()
}
