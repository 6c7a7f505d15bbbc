use chrono::Utc;
use validator::ValidateEmail;

use crate::domain::{ErrorCode, Form, SubmissionRequest};

const HONEYPOT_FIELD: &str = "_mc4wp_honeypot";
const TIMESTAMP_FIELD: &str = "_mc4wp_timestamp";

/// Built-in checks every submission goes through before it is dispatched.
#[derive(Clone, Copy, Debug)]
pub struct FormValidator {
    min_submit_seconds: u64,
}

impl FormValidator {
    pub fn new(min_submit_seconds: u64) -> Self {
        Self { min_submit_seconds }
    }

    /// Error codes for the submission, empty when it is valid.
    ///
    /// Spam short-circuits the remaining checks.
    pub fn validate(&self, form: &Form, request: &SubmissionRequest) -> Vec<ErrorCode> {
        if self.is_spam(request) {
            return vec![ErrorCode::Spam];
        }

        let mut errors = Vec::new();

        if form.lists().is_empty() {
            errors.push(ErrorCode::NoListsSelected);
        }

        if !form.email().validate_email() {
            errors.push(ErrorCode::InvalidEmail);
        }

        let missing_required = form.settings().required_fields.iter().any(|field| {
            form.data()
                .get(field)
                .map_or(true, |value| value.trim().is_empty())
        });
        if missing_required {
            errors.push(ErrorCode::RequiredFieldMissing);
        }

        errors
    }

    fn is_spam(&self, request: &SubmissionRequest) -> bool {
        if request.post(HONEYPOT_FIELD).is_some_and(|v| !v.is_empty()) {
            return true;
        }

        match request.post(TIMESTAMP_FIELD) {
            None => false,
            Some(timestamp) => match timestamp.trim().parse::<i64>() {
                Ok(submitted_at) => {
                    let earliest = Utc::now()
                        .timestamp()
                        .saturating_sub_unsigned(self.min_submit_seconds);
                    submitted_at > earliest
                }
                Err(_) => true,
            },
        }
    }
}

impl Default for FormValidator {
    fn default() -> Self {
        Self::new(2)
    }
}
