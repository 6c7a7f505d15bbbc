use std::{collections::HashMap, time::Duration};

use secrecy::{ExposeSecret, SecretString};
use serde_aux::field_attributes::deserialize_number_from_string;

use crate::domain::{EmailType, FormAction};

#[derive(serde::Deserialize, Clone)]
pub struct Config {
    pub web: WebConfig,
    pub mailchimp: MailchimpConfig,
    #[serde(default)]
    pub spam: SpamConfig,
    #[serde(default)]
    pub lists: Vec<ListConfig>,
    #[serde(default)]
    pub forms: Vec<FormConfig>,
}

#[derive(serde::Deserialize, Clone)]
pub struct WebConfig {
    pub host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
}

impl WebConfig {
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(serde::Deserialize, Clone)]
pub struct MailchimpConfig {
    /// Derived from the API key's data centre when left empty.
    #[serde(default)]
    pub base_url: String,
    pub api_key: SecretString,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_milliseconds: u64,
}

impl MailchimpConfig {
    pub fn base_url(&self) -> Result<reqwest::Url, ConfigError> {
        let base_url = if self.base_url.trim().is_empty() {
            let data_centre = self
                .api_key
                .expose_secret()
                .rsplit_once('-')
                .map(|(_, dc)| dc.to_owned())
                .filter(|dc| !dc.is_empty())
                .ok_or(ConfigError::MissingDataCentre)?;
            format!("https://{data_centre}.api.mailchimp.com/3.0/")
        } else if self.base_url.ends_with('/') {
            self.base_url.clone()
        } else {
            format!("{}/", self.base_url)
        };

        reqwest::Url::parse(&base_url).map_err(|e| ConfigError::InvalidUrl {
            url: base_url,
            reason: e.to_string(),
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_milliseconds)
    }
}

#[derive(serde::Deserialize, Clone)]
pub struct SpamConfig {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub min_submit_seconds: u64,
}

impl Default for SpamConfig {
    fn default() -> Self {
        Self {
            min_submit_seconds: 2,
        }
    }
}

/// Fields a mailing list accepts.
#[derive(serde::Deserialize, Clone, Debug, Default)]
pub struct ListConfig {
    pub id: String,
    #[serde(default)]
    pub merge_fields: Vec<String>,
    #[serde(default)]
    pub interests: Vec<String>,
}

#[derive(serde::Deserialize, Clone, Debug)]
#[serde(default)]
pub struct FormConfig {
    pub id: u32,
    pub action: FormAction,
    pub lists: Vec<String>,
    pub required_fields: Vec<String>,
    pub double_optin: bool,
    pub update_existing: bool,
    pub replace_interests: bool,
    pub email_type: EmailType,
    pub redirect: Option<String>,
    pub messages: HashMap<String, String>,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            id: 0,
            action: FormAction::Subscribe,
            lists: Vec::new(),
            required_fields: Vec::new(),
            double_optin: true,
            update_existing: false,
            replace_interests: true,
            email_type: EmailType::Html,
            redirect: None,
            messages: HashMap::new(),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Source(#[from] config::ConfigError),
    #[error("`{url}` is not a valid url: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("the mailchimp api key does not end with a data centre such as `-us6`")]
    MissingDataCentre,
    #[error("form {0} is defined more than once")]
    DuplicateForm(u32),
    #[error("form ids start at 1")]
    MissingFormId,
}

/// Reads `config.yaml` from the working directory, overridden by `APP__*`
/// environment variables.
pub fn config() -> Result<Config, ConfigError> {
    let config = config::Config::builder()
        .add_source(config::File::new("config.yaml", config::FileFormat::Yaml).required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?
        .try_deserialize::<Config>()?;

    Ok(config)
}
