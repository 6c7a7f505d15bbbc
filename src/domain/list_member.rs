use std::collections::BTreeMap;

use super::MemberStatus;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailType {
    #[default]
    Html,
    Text,
}

/// The part of a submission that is sent to one mailing list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListMember {
    pub email_address: String,
    pub status: MemberStatus,
    pub email_type: EmailType,
    pub ip_signup: String,
    pub merge_fields: BTreeMap<String, String>,
    pub interests: BTreeMap<String, bool>,
}
