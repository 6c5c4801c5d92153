//! HTTP mail API transport (Resend-compatible JSON endpoint)

use super::{DispatchReceipt, MailDispatcher, MailError, MailMessage, TransportMode};
use crate::config::MailConfig;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
    subject: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attachments: Vec<ApiAttachment<'a>>,
}

#[derive(Debug, Serialize)]
struct ApiAttachment<'a> {
    filename: &'a str,
    content_type: &'a str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct SendEmailResponse {
    id: Option<String>,
}

#[derive(Clone)]
pub struct ApiMailDispatcher {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl ApiMailDispatcher {
    pub fn from_config(config: &MailConfig) -> Result<Self, MailError> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| MailError::Config("missing mail API key".to_string()))?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("submission-core/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: api_key.to_string(),
        })
    }
}

#[async_trait]
impl MailDispatcher for ApiMailDispatcher {
    async fn dispatch(&self, message: MailMessage) -> Result<DispatchReceipt, MailError> {
        let attachments = message
            .attachments
            .iter()
            .map(|a| ApiAttachment {
                filename: &a.filename,
                content_type: &a.content_type,
                content: STANDARD.encode(&a.content),
            })
            .collect();

        let payload = SendEmailRequest {
            from: &message.from,
            to: [&message.to],
            reply_to: message.reply_to.as_deref(),
            subject: &message.subject,
            text: &message.text,
            attachments,
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "mail API rejected message");
            return Err(MailError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let provider_id = response
            .json::<SendEmailResponse>()
            .await
            .ok()
            .and_then(|r| r.id);

        debug!(provider_id = ?provider_id, "mail API accepted message");

        Ok(DispatchReceipt::Sent { provider_id })
    }

    fn mode(&self) -> TransportMode {
        TransportMode::Api
    }
}
