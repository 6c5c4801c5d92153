use super::SpamSignals;
use crate::validation::{rules, FieldErrorKind, ValidationErrors};

/// Text parts of a career application multipart body. The CV file part is
/// carried separately as an [`crate::attachments::UploadedFile`].
#[derive(Debug, Clone, Default)]
pub struct CareerApplicationForm {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
    pub job_id: Option<String>,
    pub job_title: Option<String>,
    pub website: Option<String>,
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CareerApplication {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub message: Option<String>,
    pub job_id: String,
    pub job_title: String,
    pub website: Option<String>,
    pub timestamp: i64,
}

impl CareerApplicationForm {
    /// Stores a text part by its wire name. Returns false for unknown names.
    pub fn set_field(&mut self, name: &str, value: String) -> bool {
        let slot = match name {
            "firstName" => &mut self.first_name,
            "lastName" => &mut self.last_name,
            "email" => &mut self.email,
            "message" => &mut self.message,
            "jobId" => &mut self.job_id,
            "jobTitle" => &mut self.job_title,
            "website" => &mut self.website,
            "timestamp" => &mut self.timestamp,
            _ => return false,
        };
        *slot = Some(value);
        true
    }

    pub fn validate(self) -> Result<CareerApplication, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let first_name = errors.check(
            "firstName",
            rules::required_text(self.first_name.as_deref(), FieldErrorKind::FirstNameRequired),
        );
        let last_name = errors.check(
            "lastName",
            rules::required_text(self.last_name.as_deref(), FieldErrorKind::LastNameRequired),
        );
        let email = errors.check("email", rules::email_address(self.email.as_deref()));
        let job_id = errors.check(
            "jobId",
            rules::required_text(self.job_id.as_deref(), FieldErrorKind::JobIdRequired),
        );
        let job_title = errors.check(
            "jobTitle",
            rules::required_text(self.job_title.as_deref(), FieldErrorKind::JobTitleRequired),
        );
        let timestamp = errors.check(
            "timestamp",
            rules::epoch_millis_text(self.timestamp.as_deref()),
        );

        let message = rules::optional_text(self.message.as_deref());
        let website = self.website.filter(|w| !w.is_empty());

        errors.finish(|| {
            Some(CareerApplication {
                first_name: first_name?,
                last_name: last_name?,
                email: email?,
                message,
                job_id: job_id?,
                job_title: job_title?,
                website,
                timestamp: timestamp?,
            })
        })
    }
}

impl CareerApplication {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl SpamSignals for CareerApplication {
    fn honeypot(&self) -> Option<&str> {
        self.website.as_deref()
    }

    fn rendered_at(&self) -> i64 {
        self.timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> CareerApplicationForm {
        let mut form = CareerApplicationForm::default();
        form.set_field("firstName", "Ada".to_string());
        form.set_field("lastName", "Lovelace".to_string());
        form.set_field("email", "ada@example.com".to_string());
        form.set_field("jobId", "senior-backend-engineer".to_string());
        form.set_field("jobTitle", "Senior Backend Engineer".to_string());
        form.set_field("website", String::new());
        form.set_field("timestamp", "1700000000000".to_string());
        form
    }

    #[test]
    fn test_valid_application() {
        let application = valid_form().validate().unwrap();
        assert_eq!(application.full_name(), "Ada Lovelace");
        assert_eq!(application.message, None);
        assert_eq!(application.timestamp, 1_700_000_000_000);
        assert_eq!(application.honeypot(), None);
    }

    #[test]
    fn test_unknown_parts_are_ignored() {
        let mut form = valid_form();
        assert!(!form.set_field("favouriteColour", "green".to_string()));
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_invalid_email() {
        let mut form = valid_form();
        form.set_field("email", "not-an-email".to_string());
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("email"), &[FieldErrorKind::EmailInvalid]);
    }

    #[test]
    fn test_required_fields() {
        let errors = CareerApplicationForm::default().validate().unwrap_err();
        assert!(errors.has("firstName", FieldErrorKind::FirstNameRequired));
        assert!(errors.has("lastName", FieldErrorKind::LastNameRequired));
        assert!(errors.has("email", FieldErrorKind::EmailRequired));
        assert!(errors.has("jobId", FieldErrorKind::JobIdRequired));
        assert!(errors.has("jobTitle", FieldErrorKind::JobTitleRequired));
        assert!(errors.has("timestamp", FieldErrorKind::TimestampInvalid));
        assert!(errors.get("message").is_empty());
    }

    #[test]
    fn test_timestamp_must_be_numeric() {
        let mut form = valid_form();
        form.set_field("timestamp", "yesterday".to_string());
        assert!(form
            .validate()
            .unwrap_err()
            .has("timestamp", FieldErrorKind::TimestampInvalid));
    }

    #[test]
    fn test_cover_letter_is_kept() {
        let mut form = valid_form();
        form.set_field("message", "I would love to join.".to_string());
        let application = form.validate().unwrap();
        assert_eq!(application.message.as_deref(), Some("I would love to join."));
    }
}
