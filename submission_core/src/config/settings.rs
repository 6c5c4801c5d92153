use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub rate_limit: RateLimitConfig,
    pub spam: SpamConfig,
    pub attachments: AttachmentConfig,
    pub mail: MailConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Fixed-window limits, one counter map per form endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub enable: bool,
    pub contact_max_requests: u32,
    pub careers_max_requests: u32,
    pub window_seconds: u64,
    /// Chance that a single check also purges expired records.
    pub cleanup_probability: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpamConfig {
    pub min_submit_ms: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachmentConfig {
    pub max_cv_bytes: u64,
    pub allowed_content_types: Vec<String>,
    pub verify_signatures: bool,
}

/// Outbound mail settings. Without an `api_key` the service runs in
/// log-only mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub from_address: Option<String>,
    pub contact_to: Option<String>,
    pub careers_to: Option<String>,
    pub site_name: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            rate_limit: RateLimitConfig::default(),
            spam: SpamConfig::default(),
            attachments: AttachmentConfig::default(),
            mail: MailConfig::default(),
            cors: CorsConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enable: true,
            contact_max_requests: 5,
            careers_max_requests: 3,
            window_seconds: 60,
            cleanup_probability: 0.1,
        }
    }
}

impl Default for SpamConfig {
    fn default() -> Self {
        Self { min_submit_ms: 3000 }
    }
}

impl Default for AttachmentConfig {
    fn default() -> Self {
        Self {
            max_cv_bytes: 5 * 1024 * 1024,
            allowed_content_types: vec![
                "application/pdf".to_string(),
                "application/msword".to_string(),
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
                    .to_string(),
            ],
            verify_signatures: false,
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.resend.com/emails".to_string(),
            api_key: None,
            from_address: None,
            contact_to: None,
            careers_to: None,
            site_name: "FI Int".to_string(),
            timeout_seconds: 10,
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?);

        if std::path::Path::new("config.toml").exists() {
            builder = builder.add_source(File::with_name("config"));
        }

        builder = builder.add_source(
            Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("cors.allowed_origins")
                .with_list_parse_key("attachments.allowed_content_types")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let app_config: AppConfig = config.try_deserialize()?;

        app_config.validate()?;

        Ok(app_config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Message("Server port cannot be 0".to_string()));
        }

        if self.rate_limit.contact_max_requests == 0 || self.rate_limit.careers_max_requests == 0 {
            return Err(ConfigError::Message(
                "Rate limit maximums must be greater than 0".to_string(),
            ));
        }

        if self.rate_limit.window_seconds == 0 {
            return Err(ConfigError::Message(
                "Rate limit window must be greater than 0".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.rate_limit.cleanup_probability) {
            return Err(ConfigError::Message(
                "Rate limit cleanup probability must be between 0 and 1".to_string(),
            ));
        }

        if self.spam.min_submit_ms < 0 {
            return Err(ConfigError::Message(
                "Minimum submit time cannot be negative".to_string(),
            ));
        }

        if self.attachments.max_cv_bytes == 0 {
            return Err(ConfigError::Message(
                "Max CV size must be greater than 0".to_string(),
            ));
        }

        if self.attachments.allowed_content_types.is_empty() {
            return Err(ConfigError::Message(
                "At least one CV content type must be allowed".to_string(),
            ));
        }

        if self.mail.timeout_seconds == 0 {
            return Err(ConfigError::Message(
                "Mail timeout must be greater than 0".to_string(),
            ));
        }

        if self.mail.is_configured() {
            if is_blank(&self.mail.from_address) {
                return Err(ConfigError::Message(
                    "Mail sender address must be set when a mail API key is configured".to_string(),
                ));
            }
            if is_blank(&self.mail.contact_to) {
                return Err(ConfigError::Message(
                    "Contact recipient must be set when a mail API key is configured".to_string(),
                ));
            }
        } else {
            tracing::warn!("No mail API key configured - submissions will only be logged");
        }

        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_seconds)
    }
}

impl MailConfig {
    /// True when credentials for the mail API are present.
    pub fn is_configured(&self) -> bool {
        !is_blank(&self.api_key)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Careers mail goes to the contact inbox unless a dedicated one is set.
    pub fn careers_recipient(&self) -> Option<&str> {
        self.careers_to
            .as_deref()
            .filter(|addr| !addr.trim().is_empty())
            .or(self.contact_to.as_deref())
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}
