use super::SpamSignals;
use crate::validation::{rules, FieldErrorKind, ValidationErrors};
use serde::{Deserialize, Serialize};

/// Contact form as posted by the page. Everything is optional here so that
/// missing fields surface as field errors instead of a decode failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub company: Option<String>,
    pub message: Option<String>,
    pub website: Option<String>,
    pub timestamp: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub message: String,
    pub website: Option<String>,
    pub timestamp: i64,
}

impl ContactForm {
    pub fn validate(self) -> Result<ContactSubmission, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = errors.check(
            "name",
            rules::required_text(self.name.as_deref(), FieldErrorKind::NameRequired),
        );
        let email = errors.check("email", rules::email_address(self.email.as_deref()));
        let message = errors.check("message", rules::contact_message(self.message.as_deref()));
        let timestamp = errors.check("timestamp", rules::epoch_millis(self.timestamp));

        let company = rules::optional_text(self.company.as_deref());
        let website = self.website.filter(|w| !w.is_empty());

        errors.finish(|| {
            Some(ContactSubmission {
                name: name?,
                email: email?,
                company,
                message: message?,
                website,
                timestamp: timestamp?,
            })
        })
    }
}

impl SpamSignals for ContactSubmission {
    fn honeypot(&self) -> Option<&str> {
        self.website.as_deref()
    }

    fn rendered_at(&self) -> i64 {
        self.timestamp
    }
}
