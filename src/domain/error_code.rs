use std::fmt;

/// Error codes a form can accumulate while a submission is handled.
///
/// Validation hooks may add codes outside the known set, those end up in
/// [`ErrorCode::Custom`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    Error,
    Spam,
    InvalidEmail,
    RequiredFieldMissing,
    NoListsSelected,
    AlreadySubscribed,
    PreviouslyUnsubscribed,
    NotSubscribed,
    Custom(String),
}

impl ErrorCode {
    pub fn as_str(&self) -> &str {
        match self {
            ErrorCode::Error => "error",
            ErrorCode::Spam => "spam",
            ErrorCode::InvalidEmail => "invalid_email",
            ErrorCode::RequiredFieldMissing => "required_field_missing",
            ErrorCode::NoListsSelected => "no_lists_selected",
            ErrorCode::AlreadySubscribed => "already_subscribed",
            ErrorCode::PreviouslyUnsubscribed => "previously_unsubscribed",
            ErrorCode::NotSubscribed => "not_subscribed",
            ErrorCode::Custom(code) => code,
        }
    }

    /// Soft errors are business-rule outcomes rather than failures.
    pub fn is_soft(&self) -> bool {
        matches!(
            self,
            ErrorCode::AlreadySubscribed | ErrorCode::NotSubscribed
        )
    }
}

impl From<&str> for ErrorCode {
    fn from(s: &str) -> Self {
        match s {
            "error" => ErrorCode::Error,
            "spam" => ErrorCode::Spam,
            "invalid_email" => ErrorCode::InvalidEmail,
            "required_field_missing" => ErrorCode::RequiredFieldMissing,
            "no_lists_selected" => ErrorCode::NoListsSelected,
            "already_subscribed" => ErrorCode::AlreadySubscribed,
            "previously_unsubscribed" => ErrorCode::PreviouslyUnsubscribed,
            "not_subscribed" => ErrorCode::NotSubscribed,
            other => ErrorCode::Custom(other.into()),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl serde::Serialize for ErrorCode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
