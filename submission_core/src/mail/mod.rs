//! Outbound mail for accepted submissions
//!
//! The transport is picked once at startup: the HTTP mail API when
//! credentials are configured, otherwise a dispatcher that only logs.

pub mod api;
pub mod compose;
pub mod log;

pub use api::ApiMailDispatcher;
pub use compose::MessageComposer;
pub use log::LogMailDispatcher;

use crate::config::MailConfig;
use async_trait::async_trait;
use axum::body::Bytes;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct MailAttachment {
    pub filename: String,
    pub content_type: String,
    pub content: Bytes,
}

#[derive(Debug, Clone)]
pub struct MailMessage {
    pub from: String,
    pub to: String,
    pub reply_to: Option<String>,
    pub subject: String,
    pub text: String,
    pub attachments: Vec<MailAttachment>,
    pub summary: SubmissionSummary,
}

/// Submitter fields carried next to the composed body, so a transport that
/// only logs can record who wrote and what they said.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionSummary {
    pub form: &'static str,
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub job_id: Option<String>,
    pub job_title: Option<String>,
    pub has_cv: bool,
    /// First 100 characters of the submitter's own message.
    pub message_preview: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchReceipt {
    Sent { provider_id: Option<String> },
    Logged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    Api,
    LogOnly,
}

#[derive(Error, Debug)]
pub enum MailError {
    #[error("mail provider rejected the message with status {status}")]
    Rejected { status: u16, body: String },

    #[error("mail transport network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("mail dispatch timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("mail transport misconfigured: {0}")]
    Config(String),
}

#[async_trait]
pub trait MailDispatcher: Send + Sync {
    async fn dispatch(&self, message: MailMessage) -> Result<DispatchReceipt, MailError>;

    fn mode(&self) -> TransportMode;
}

pub type SharedDispatcher = Arc<dyn MailDispatcher>;

pub fn dispatcher_from_config(config: &MailConfig) -> Result<SharedDispatcher, MailError> {
    if config.is_configured() {
        let dispatcher = ApiMailDispatcher::from_config(config)?;
        tracing::info!(api_url = %config.api_url, "mail API dispatcher enabled");
        Ok(Arc::new(dispatcher))
    } else {
        tracing::info!("mail transport not configured, submissions will be logged only");
        Ok(Arc::new(LogMailDispatcher::new()))
    }
}
