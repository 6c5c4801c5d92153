//! Field-level validation for the website forms
//!
//! Each field has its own rule function returning either the normalized value
//! or a [`FieldErrorKind`]. Record validators run every rule and collect the
//! failures into [`ValidationErrors`], keyed by the wire name of the field.
//! Error kinds are stable tokens; turning them into localized text is the
//! page's job.

pub mod rules;

pub use rules::*;

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldErrorKind {
    NameRequired,
    EmailRequired,
    EmailInvalid,
    MessageRequired,
    MessageTooShort,
    FirstNameRequired,
    LastNameRequired,
    JobIdRequired,
    JobTitleRequired,
    TimestampInvalid,
    CvTooLarge,
    CvInvalidType,
}

impl FieldErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldErrorKind::NameRequired => "nameRequired",
            FieldErrorKind::EmailRequired => "emailRequired",
            FieldErrorKind::EmailInvalid => "emailInvalid",
            FieldErrorKind::MessageRequired => "messageRequired",
            FieldErrorKind::MessageTooShort => "messageTooShort",
            FieldErrorKind::FirstNameRequired => "firstNameRequired",
            FieldErrorKind::LastNameRequired => "lastNameRequired",
            FieldErrorKind::JobIdRequired => "jobIdRequired",
            FieldErrorKind::JobTitleRequired => "jobTitleRequired",
            FieldErrorKind::TimestampInvalid => "timestampInvalid",
            FieldErrorKind::CvTooLarge => "cvTooLarge",
            FieldErrorKind::CvInvalidType => "cvInvalidType",
        }
    }
}

impl fmt::Display for FieldErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every failing field of one submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<&'static str, Vec<FieldErrorKind>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, kind: FieldErrorKind) {
        let kinds = self.fields.entry(field).or_default();
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }

    /// Records the failure, if any, and hands back the normalized value.
    pub fn check<T>(
        &mut self,
        field: &'static str,
        result: Result<T, FieldErrorKind>,
    ) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(kind) => {
                self.add(field, kind);
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn get(&self, field: &str) -> &[FieldErrorKind] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has(&self, field: &str, kind: FieldErrorKind) -> bool {
        self.get(field).contains(&kind)
    }

    pub fn field_names(&self) -> Vec<&'static str> {
        self.fields.keys().copied().collect()
    }

    /// `Ok(value)` when nothing failed.
    pub fn finish<T>(self, build: impl FnOnce() -> Option<T>) -> Result<T, ValidationErrors> {
        if !self.is_empty() {
            return Err(self);
        }
        // every rule passed, so every value is present
        build().ok_or(self)
    }

    /// Body of the `details` member in a 400 response.
    pub fn to_details(&self) -> serde_json::Value {
        let field_errors: BTreeMap<&str, Vec<&str>> = self
            .fields
            .iter()
            .map(|(field, kinds)| (*field, kinds.iter().map(FieldErrorKind::as_str).collect()))
            .collect();

        json!({
            "formErrors": [],
            "fieldErrors": field_errors,
        })
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .fields
            .iter()
            .map(|(field, kinds)| {
                let kinds: Vec<&str> = kinds.iter().map(FieldErrorKind::as_str).collect();
                format!("{}: {}", field, kinds.join(", "))
            })
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}
