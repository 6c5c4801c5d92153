//! CV upload constraints for career applications

use crate::config::AttachmentConfig;
use crate::validation::FieldErrorKind;
use axum::body::Bytes;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttachmentError {
    #[error("File too large: {size} bytes (max: {max_size} bytes)")]
    TooLarge { size: u64, max_size: u64 },

    #[error("Invalid file type: {content_type}")]
    InvalidType { content_type: String },

    #[error("File content does not match declared type {content_type}")]
    SignatureMismatch { content_type: String },
}

impl AttachmentError {
    pub fn kind(&self) -> FieldErrorKind {
        match self {
            AttachmentError::TooLarge { .. } => FieldErrorKind::CvTooLarge,
            AttachmentError::InvalidType { .. } | AttachmentError::SignatureMismatch { .. } => {
                FieldErrorKind::CvInvalidType
            }
        }
    }

    /// Text shown to the applicant.
    pub fn public_message(&self) -> String {
        match self {
            AttachmentError::TooLarge { max_size, .. } => format!(
                "CV file is too large. Maximum size is {}MB.",
                max_size / (1024 * 1024)
            ),
            AttachmentError::InvalidType { .. } | AttachmentError::SignatureMismatch { .. } => {
                "Invalid file type. Please upload a PDF or Word document.".to_string()
            }
        }
    }
}

/// A file part received with a career application.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
}

impl UploadedFile {
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

#[derive(Debug, Clone)]
pub struct AttachmentValidator {
    max_size: u64,
    allowed_content_types: HashSet<String>,
    verify_signatures: bool,
}

impl AttachmentValidator {
    pub fn new(config: &AttachmentConfig) -> Self {
        Self {
            max_size: config.max_cv_bytes,
            allowed_content_types: config
                .allowed_content_types
                .iter()
                .map(|t| t.trim().to_ascii_lowercase())
                .collect(),
            verify_signatures: config.verify_signatures,
        }
    }

    pub fn with_default_config() -> Self {
        Self::new(&AttachmentConfig::default())
    }

    pub fn max_size(&self) -> u64 {
        self.max_size
    }

    pub fn validate(&self, file: &UploadedFile) -> Result<(), AttachmentError> {
        self.validate_size(file.size())?;

        let essence = self.validate_content_type(&file.content_type)?;

        if self.verify_signatures {
            validate_signature(&essence, &file.data)?;
        }

        Ok(())
    }

    pub fn validate_size(&self, size: u64) -> Result<(), AttachmentError> {
        if size > self.max_size {
            return Err(AttachmentError::TooLarge {
                size,
                max_size: self.max_size,
            });
        }
        Ok(())
    }

    fn validate_content_type(&self, content_type: &str) -> Result<String, AttachmentError> {
        let essence = content_type
            .parse::<mime::Mime>()
            .map(|m| m.essence_str().to_ascii_lowercase())
            .map_err(|_| AttachmentError::InvalidType {
                content_type: content_type.to_string(),
            })?;

        if !self.allowed_content_types.contains(&essence) {
            return Err(AttachmentError::InvalidType {
                content_type: content_type.to_string(),
            });
        }

        Ok(essence)
    }
}

const DOC_SIGNATURE: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
const ZIP_SIGNATURE: &[u8] = &[0x50, 0x4B, 0x03, 0x04];

fn validate_signature(essence: &str, data: &[u8]) -> Result<(), AttachmentError> {
    let matches = match essence {
        "application/pdf" => data.starts_with(b"%PDF"),
        "application/msword" => data.starts_with(DOC_SIGNATURE),
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
            data.starts_with(ZIP_SIGNATURE)
        }
        _ => true,
    };

    if !matches {
        return Err(AttachmentError::SignatureMismatch {
            content_type: essence.to_string(),
        });
    }

    Ok(())
}
