//! Spam check, attachment handling and dispatch for validated submissions

use crate::attachments::{AttachmentValidator, UploadedFile};
use crate::clock::SharedClock;
use crate::config::AppConfig;
use crate::error::{AppError, Result};
use crate::forms::{CareerApplication, ContactSubmission, FormKind, SpamSignals, SubmissionMeta};
use crate::mail::{
    DispatchReceipt, MailError, MailMessage, MessageComposer, SharedDispatcher, TransportMode,
};
use crate::metrics::SubmissionMetrics;
use crate::spam::{SpamGuard, SpamReason, SpamVerdict};
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Delivered,
    Logged,
    /// Answered as a success, but nothing was sent.
    Discarded(SpamReason),
}

#[derive(Clone)]
pub struct SubmissionService {
    dispatcher: SharedDispatcher,
    composer: MessageComposer,
    spam_guard: SpamGuard,
    attachments: AttachmentValidator,
    clock: SharedClock,
    dispatch_timeout: Duration,
    metrics: SubmissionMetrics,
}

impl SubmissionService {
    pub fn new(
        config: &AppConfig,
        dispatcher: SharedDispatcher,
        clock: SharedClock,
        metrics: SubmissionMetrics,
    ) -> Self {
        Self {
            dispatcher,
            composer: MessageComposer::new(&config.mail),
            spam_guard: SpamGuard::from_config(&config.spam),
            attachments: AttachmentValidator::new(&config.attachments),
            clock,
            dispatch_timeout: config.mail.timeout(),
            metrics,
        }
    }

    pub fn transport_mode(&self) -> TransportMode {
        self.dispatcher.mode()
    }

    pub async fn submit_contact(
        &self,
        submission: ContactSubmission,
        meta: SubmissionMeta,
    ) -> Result<SubmissionOutcome> {
        if let Some(outcome) = self.screen(FormKind::Contact, &submission, &meta) {
            return Ok(outcome);
        }

        let message = self.composer.contact(&submission, &meta);
        self.deliver(FormKind::Contact, message, &meta).await
    }

    pub async fn submit_application(
        &self,
        application: CareerApplication,
        cv: Option<UploadedFile>,
        meta: SubmissionMeta,
    ) -> Result<SubmissionOutcome> {
        if let Some(outcome) = self.screen(FormKind::Careers, &application, &meta) {
            return Ok(outcome);
        }

        if let Some(file) = &cv {
            if let Err(err) = self.attachments.validate(file) {
                self.metrics.record_attachment_rejected();
                warn!(
                    client = %meta.client,
                    submission_id = %meta.id,
                    filename = %file.filename,
                    content_type = %file.content_type,
                    size = file.size(),
                    "CV rejected: {}", err
                );
                return Err(AppError::Attachment(err));
            }
        }

        let message = self
            .composer
            .career_application(&application, cv.as_ref(), &meta);
        self.deliver(FormKind::Careers, message, &meta).await
    }

    fn screen<S: SpamSignals>(
        &self,
        form: FormKind,
        submission: &S,
        meta: &SubmissionMeta,
    ) -> Option<SubmissionOutcome> {
        match self.spam_guard.inspect(submission, self.clock.now_millis()) {
            SpamVerdict::Deliver => None,
            SpamVerdict::Discard(reason) => {
                self.metrics.record_spam();
                info!(
                    form = %form,
                    client = %meta.client,
                    submission_id = %meta.id,
                    reason = %reason,
                    "discarding likely automated submission"
                );
                Some(SubmissionOutcome::Discarded(reason))
            }
        }
    }

    async fn deliver(
        &self,
        form: FormKind,
        message: MailMessage,
        meta: &SubmissionMeta,
    ) -> Result<SubmissionOutcome> {
        let dispatched = tokio::time::timeout(self.dispatch_timeout, self.dispatcher.dispatch(message))
            .await
            .unwrap_or(Err(MailError::Timeout(self.dispatch_timeout)));

        match dispatched {
            Ok(DispatchReceipt::Sent { provider_id }) => {
                self.metrics.record_delivered();
                info!(
                    form = %form,
                    client = %meta.client,
                    submission_id = %meta.id,
                    provider_id = ?provider_id,
                    "submission delivered"
                );
                Ok(SubmissionOutcome::Delivered)
            }
            Ok(DispatchReceipt::Logged) => {
                self.metrics.record_logged();
                Ok(SubmissionOutcome::Logged)
            }
            Err(source) => {
                self.metrics.record_delivery_failed();
                warn!(
                    form = %form,
                    client = %meta.client,
                    submission_id = %meta.id,
                    "submission delivery failed: {}", source
                );
                Err(AppError::Delivery { form, source })
            }
        }
    }
}
