//! Submission shapes for the website forms

pub mod careers;
pub mod contact;

pub use careers::{CareerApplication, CareerApplicationForm};
pub use contact::{ContactForm, ContactSubmission};

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FormKind {
    Contact,
    Careers,
}

impl FormKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormKind::Contact => "contact",
            FormKind::Careers => "careers",
        }
    }

    /// Generic 500 text; delivery details never reach the caller.
    pub fn failure_message(&self) -> &'static str {
        match self {
            FormKind::Contact => "Failed to send message",
            FormKind::Careers => "Failed to submit application",
        }
    }
}

impl fmt::Display for FormKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The parts of a validated submission the spam heuristics look at.
pub trait SpamSignals {
    /// Hidden field value; humans never fill it.
    fn honeypot(&self) -> Option<&str>;

    /// Epoch milliseconds at which the form was rendered.
    fn rendered_at(&self) -> i64;
}

/// Request metadata recorded with every accepted submission.
#[derive(Debug, Clone)]
pub struct SubmissionMeta {
    pub id: uuid::Uuid,
    pub received_at: chrono::DateTime<chrono::Utc>,
    pub client: crate::middleware::rate_limit::ClientKey,
}

impl SubmissionMeta {
    pub fn new(client: crate::middleware::rate_limit::ClientKey) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            received_at: chrono::Utc::now(),
            client,
        }
    }
}
