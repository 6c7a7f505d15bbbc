use std::{collections::BTreeMap, time::Duration};

use md5::{Digest, Md5};
use reqwest::{RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;

use crate::{
    api::{
        ApiError, MailingListApi, MemberRecord, ALREADY_SUBSCRIBED, EMAIL_NOT_SUBSCRIBED,
        LIST_NOT_SUBSCRIBED, PREVIOUSLY_UNSUBSCRIBED,
    },
    domain::{EmailType, ListMember, MemberStatus},
};

pub struct MailchimpClient {
    client: reqwest::Client,
    base_url: reqwest::Url,
    api_key: SecretString,
}

impl MailchimpClient {
    pub fn new(
        base_url: reqwest::Url,
        api_key: SecretString,
        timeout: Duration,
    ) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    pub fn from_config(config: &crate::config::Config) -> anyhow::Result<Self> {
        let mailchimp = &config.mailchimp;
        let client = Self::new(
            mailchimp.base_url()?,
            mailchimp.api_key.clone(),
            mailchimp.timeout(),
        )?;
        Ok(client)
    }

    fn member_url(&self, list_id: &str, email_address: &str) -> Result<reqwest::Url, ApiError> {
        let resource = format!(
            "lists/{}/members/{}",
            list_id,
            subscriber_hash(email_address)
        );
        self.base_url
            .join(&resource)
            .map_err(|e| ApiError::new(0, format!("invalid member url: {e}")))
    }

    /// `None` when the address is not on the list.
    #[tracing::instrument(name = "fetching list member", skip(self, email_address))]
    async fn get_member(
        &self,
        list_id: &str,
        email_address: &str,
    ) -> Result<Option<MemberRecord>, ApiError> {
        let url = self.member_url(list_id, email_address)?;
        match self.send(self.client.get(url)).await {
            Ok(member) => Ok(Some(member)),
            Err(e) if e.code == StatusCode::NOT_FOUND.as_u16() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request
            .basic_auth("signup_forms", Some(self.api_key.expose_secret()))
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status.is_success() {
            return response.json::<T>().await.map_err(transport_error);
        }

        let body = response.json::<ErrorBody>().await.unwrap_or_default();
        Err(classify_error(status, body))
    }
}

#[async_trait::async_trait]
impl MailingListApi for MailchimpClient {
    #[tracing::instrument(
        name = "subscribing to list",
        skip(self, email_address, member),
        fields(status = member.status.as_str())
    )]
    async fn subscribe(
        &self,
        list_id: &str,
        email_address: &str,
        member: &ListMember,
        update_existing: bool,
        replace_interests: bool,
    ) -> Result<MemberRecord, ApiError> {
        let mut status = member.status;
        let mut interests = member.interests.clone();

        if let Some(existing) = self.get_member(list_id, email_address).await? {
            if existing.status == MemberStatus::Subscribed {
                if !update_existing {
                    return Err(ApiError::new(
                        ALREADY_SUBSCRIBED,
                        format!("{email_address} is already a list member."),
                    ));
                }
                // never send a confirmed subscriber back through double opt-in
                status = MemberStatus::Subscribed;
            }

            if !replace_interests {
                let mut merged = existing.interests;
                merged.extend(interests);
                interests = merged;
            }
        }

        let url = self.member_url(list_id, email_address)?;
        let body = MemberRequestBody {
            email_address,
            status,
            status_if_new: status,
            email_type: member.email_type,
            ip_signup: &member.ip_signup,
            merge_fields: member.merge_fields.clone(),
            interests,
        };

        self.send(self.client.put(url).json(&body)).await
    }

    #[tracing::instrument(name = "unsubscribing from list", skip(self, email_address))]
    async fn unsubscribe(&self, list_id: &str, email_address: &str) -> Result<(), ApiError> {
        match self.get_member(list_id, email_address).await? {
            None => Err(ApiError::new(
                LIST_NOT_SUBSCRIBED,
                format!("{email_address} is not on list {list_id}."),
            )),
            Some(existing) if existing.status == MemberStatus::Unsubscribed => Err(ApiError::new(
                EMAIL_NOT_SUBSCRIBED,
                format!("{email_address} is not subscribed to list {list_id}."),
            )),
            Some(_) => {
                let url = self.member_url(list_id, email_address)?;
                let body = serde_json::json!({ "status": MemberStatus::Unsubscribed });
                let _: MemberRecord = self.send(self.client.patch(url).json(&body)).await?;
                Ok(())
            }
        }
    }
}

/// Members are addressed by the MD5 hash of their lower-cased email address.
pub fn subscriber_hash(email_address: &str) -> String {
    hex::encode(Md5::digest(email_address.trim().to_lowercase().as_bytes()))
}

#[derive(serde::Serialize)]
struct MemberRequestBody<'a> {
    email_address: &'a str,
    status: MemberStatus,
    status_if_new: MemberStatus,
    email_type: EmailType,
    #[serde(skip_serializing_if = "str::is_empty")]
    ip_signup: &'a str,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    merge_fields: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    interests: BTreeMap<String, bool>,
}

#[derive(Default, serde::Deserialize)]
struct ErrorBody {
    #[serde(default)]
    title: String,
    #[serde(default)]
    detail: String,
}

fn classify_error(status: StatusCode, body: ErrorBody) -> ApiError {
    let code = match body.title.as_str() {
        "Member In Compliance State" | "Forgotten Email Not Subscribed" => PREVIOUSLY_UNSUBSCRIBED,
        "Member Exists" => ALREADY_SUBSCRIBED,
        _ => status.as_u16(),
    };

    let message = match (body.title.is_empty(), body.detail.is_empty()) {
        (true, true) => status.to_string(),
        (false, true) => body.title,
        (true, false) => body.detail,
        (false, false) => format!("{}: {}", body.title, body.detail),
    };

    ApiError::new(code, message)
}

fn transport_error(e: reqwest::Error) -> ApiError {
    ApiError::new(0, e.to_string())
}
