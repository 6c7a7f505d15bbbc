use std::collections::{BTreeMap, HashMap};

use reqwest::Url;

use super::{
    submission::INTERNAL_FIELD_PREFIX, EmailType, ErrorCode, FormAction, SubmissionRequest,
};

/// Field name data is stored under after binding, keys are upper-cased.
pub const EMAIL_FIELD: &str = "EMAIL";
const LISTS_FIELD: &str = "_mc4wp_lists";

#[derive(Clone, Debug, Default)]
pub struct FormSettings {
    pub double_optin: bool,
    pub update_existing: bool,
    pub replace_interests: bool,
    pub email_type: EmailType,
    pub required_fields: Vec<String>,
    pub redirect: Option<Url>,
    pub messages: HashMap<String, String>,
}

/// A configured sign-up form and the state of the submission it is handling.
#[derive(Clone, Debug)]
pub struct Form {
    id: u32,
    action: FormAction,
    lists: Vec<String>,
    settings: FormSettings,
    data: BTreeMap<String, String>,
    errors: Vec<ErrorCode>,
    messages: Vec<String>,
}

impl Form {
    pub fn new(id: u32, action: FormAction, lists: Vec<String>, settings: FormSettings) -> Self {
        Self {
            id,
            action,
            lists,
            settings,
            data: BTreeMap::new(),
            errors: Vec::new(),
            messages: Vec::new(),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn action(&self) -> FormAction {
        self.action
    }

    pub fn lists(&self) -> &[String] {
        &self.lists
    }

    pub fn settings(&self) -> &FormSettings {
        &self.settings
    }

    pub fn email_type(&self) -> EmailType {
        self.settings.email_type
    }

    pub fn redirect_url(&self) -> Option<&Url> {
        self.settings.redirect.as_ref()
    }

    pub fn data(&self) -> &BTreeMap<String, String> {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut BTreeMap<String, String> {
        &mut self.data
    }

    pub fn email(&self) -> &str {
        self.data.get(EMAIL_FIELD).map(String::as_str).unwrap_or_default()
    }

    /// Copies the submitted fields onto the form.
    ///
    /// Internal fields are skipped, a non-empty list selection overrides the
    /// configured lists.
    pub fn handle_request(&mut self, request: &SubmissionRequest) {
        for (key, value) in request.post_params() {
            if key.starts_with(INTERNAL_FIELD_PREFIX) {
                continue;
            }
            self.data.insert(key.to_uppercase(), value.trim().to_owned());
        }

        if let Some(lists) = request.post(LISTS_FIELD) {
            let lists: Vec<String> = lists
                .split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(String::from)
                .collect();
            if !lists.is_empty() {
                self.lists = lists;
            }
        }
    }

    /// Adds an error code, a code already present is not repeated.
    pub fn add_error(&mut self, code: ErrorCode) {
        if !self.errors.contains(&code) {
            self.errors.push(code);
        }
    }

    pub fn errors(&self) -> &[ErrorCode] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn queue_message(&mut self, key: impl Into<String>) {
        self.messages.push(key.into());
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Messages to show for the outcome: one per error, or the queued ones.
    pub fn response_messages(&self) -> Vec<FormMessage> {
        if self.has_errors() {
            self.errors
                .iter()
                .map(|code| {
                    let kind = if code.is_soft() {
                        MessageKind::Notice
                    } else {
                        MessageKind::Error
                    };
                    self.message(kind, code.as_str())
                })
                .collect()
        } else {
            self.messages
                .iter()
                .map(|key| self.message(MessageKind::Success, key))
                .collect()
        }
    }

    fn message(&self, kind: MessageKind, key: &str) -> FormMessage {
        let text = self
            .settings
            .messages
            .get(key)
            .cloned()
            .or_else(|| default_message_text(key).map(String::from))
            .unwrap_or_else(|| default_message_text("error").unwrap_or_default().into());

        FormMessage {
            kind,
            key: key.to_owned(),
            text,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Success,
    Notice,
    Error,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct FormMessage {
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub key: String,
    pub text: String,
}

fn default_message_text(key: &str) -> Option<&'static str> {
    let text = match key {
        "subscribed" => "Thank you, your sign-up request was successful! Please check your email inbox to confirm.",
        "updated" => "Thank you, your records have been updated!",
        "unsubscribed" => "You were successfully unsubscribed.",
        "not_subscribed" => "Given email address is not subscribed.",
        "already_subscribed" => "Given email address is already subscribed, thank you!",
        "previously_unsubscribed" => "It seems you unsubscribed before, so we can not sign you up again automatically.",
        "invalid_email" => "Please provide a valid email address.",
        "required_field_missing" => "Please fill in the required fields.",
        "no_lists_selected" => "Please select at least one list.",
        "error" | "spam" => "Oops. Something went wrong. Please try again later.",
        _ => return None,
    };
    Some(text)
}
