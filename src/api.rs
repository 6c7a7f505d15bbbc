//! The mailing-list API as seen by the form listener.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::domain::{ListMember, MemberStatus};

/// The member unsubscribed before and can not be re-added by a form.
pub const PREVIOUSLY_UNSUBSCRIBED: u16 = 212;
/// The member is on the list already and updating was not allowed.
pub const ALREADY_SUBSCRIBED: u16 = 214;
/// The address is not on the list.
pub const LIST_NOT_SUBSCRIBED: u16 = 215;
/// The address is on the list but not subscribed.
pub const EMAIL_NOT_SUBSCRIBED: u16 = 232;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} (code {code})")]
pub struct ApiError {
    pub code: u16,
    pub message: String,
}

impl ApiError {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// A list member as returned by the API after a successful call.
#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize)]
pub struct MemberRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub email_address: String,
    #[serde(default)]
    pub status: MemberStatus,
    #[serde(default, deserialize_with = "optional_timestamp")]
    pub timestamp_signup: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "optional_timestamp")]
    pub last_changed: Option<DateTime<Utc>>,
    #[serde(default)]
    pub interests: BTreeMap<String, bool>,
}

impl MemberRecord {
    /// True when an existing subscriber's record was changed rather than created.
    ///
    /// A member without a signup timestamp signed up before any change.
    pub fn was_updated(&self) -> bool {
        if self.status != MemberStatus::Subscribed {
            return false;
        }
        match (self.timestamp_signup, self.last_changed) {
            (_, None) => false,
            (None, Some(_)) => true,
            (Some(signup), Some(changed)) => signup < changed,
        }
    }
}

/// Mailchimp sends an empty string for timestamps it does not know.
fn optional_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: Option<String> = serde::Deserialize::deserialize(deserializer)?;
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => DateTime::parse_from_rfc3339(s)
            .map(|t| Some(t.with_timezone(&Utc)))
            .map_err(serde::de::Error::custom),
    }
}

#[async_trait::async_trait]
pub trait MailingListApi: Send + Sync {
    async fn subscribe(
        &self,
        list_id: &str,
        email_address: &str,
        member: &ListMember,
        update_existing: bool,
        replace_interests: bool,
    ) -> Result<MemberRecord, ApiError>;

    async fn unsubscribe(&self, list_id: &str, email_address: &str) -> Result<(), ApiError>;
}
