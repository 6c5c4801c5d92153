//! Log-only transport used when no mail credentials are configured

use super::{DispatchReceipt, MailDispatcher, MailError, MailMessage, TransportMode};
use async_trait::async_trait;
use tracing::info;

const PREVIEW_CHARS: usize = 100;

#[derive(Debug, Clone, Default)]
pub struct LogMailDispatcher;

impl LogMailDispatcher {
    pub fn new() -> Self {
        Self
    }
}

pub(crate) fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

#[async_trait]
impl MailDispatcher for LogMailDispatcher {
    async fn dispatch(&self, message: MailMessage) -> Result<DispatchReceipt, MailError> {
        let attachments: Vec<&str> = message
            .attachments
            .iter()
            .map(|a| a.filename.as_str())
            .collect();

        let summary = &message.summary;

        info!(
            form = summary.form,
            name = %summary.name,
            email = %summary.email,
            company = ?summary.company,
            job_id = ?summary.job_id,
            job_title = ?summary.job_title,
            has_cv = summary.has_cv,
            user_message = ?summary.message_preview,
            subject = %message.subject,
            to = %message.to,
            attachments = ?attachments,
            "submission received (mail transport not configured)"
        );

        Ok(DispatchReceipt::Logged)
    }

    fn mode(&self) -> TransportMode {
        TransportMode::LogOnly
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MailConfig;
    use crate::forms::{ContactSubmission, SubmissionMeta};
    use crate::mail::{MessageComposer, SubmissionSummary};
    use crate::middleware::rate_limit::ClientKey;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn test_preview_truncates_long_text() {
        assert_eq!(preview("short"), "short");

        let long = "x".repeat(150);
        let shortened = preview(&long);
        assert_eq!(shortened.len(), 103);
        assert!(shortened.ends_with("..."));

        let exact = "y".repeat(100);
        assert_eq!(preview(&exact), exact);
    }

    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_log_record_keeps_submitter_message() {
        let captured = CapturedLog::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let composer = MessageComposer::new(&MailConfig::default());
        let submission = ContactSubmission {
            name: "Test User".to_string(),
            email: "test@example.com".to_string(),
            company: Some("Acme".to_string()),
            message: "UNIQUE-MESSAGE-BODY please call me".to_string(),
            website: None,
            timestamp: 1_700_000_000_000,
        };
        let meta = SubmissionMeta::new(ClientKey("203.0.113.7".to_string()));

        let receipt = LogMailDispatcher::new()
            .dispatch(composer.contact(&submission, &meta))
            .await
            .unwrap();
        assert_eq!(receipt, DispatchReceipt::Logged);

        let output = String::from_utf8(captured.0.lock().clone()).unwrap();
        assert!(output.contains("UNIQUE-MESSAGE-BODY please call me"), "{}", output);
        assert!(output.contains("test@example.com"));
        assert!(output.contains("Acme"));
    }

    #[tokio::test]
    async fn test_logs_and_reports_success() {
        let dispatcher = LogMailDispatcher::new();
        let receipt = dispatcher
            .dispatch(MailMessage {
                from: "noreply@localhost".to_string(),
                to: "inbox@localhost".to_string(),
                reply_to: None,
                subject: "hello".to_string(),
                text: "body".to_string(),
                attachments: Vec::new(),
                summary: SubmissionSummary::default(),
            })
            .await
            .unwrap();

        assert_eq!(receipt, DispatchReceipt::Logged);
        assert_eq!(dispatcher.mode(), TransportMode::LogOnly);
    }
}
