use std::collections::HashMap;

use crate::{
    config::{ConfigError, FormConfig},
    domain::{Form, FormSettings},
};

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("there is no form with id `{0}`")]
pub struct FormNotFound(pub String);

/// Looks up forms by the id a submission carries.
pub trait FormRepository: Send + Sync {
    /// Returns a fresh copy of the form, ready to handle one submission.
    fn get(&self, id: &str) -> Result<Form, FormNotFound>;
}

/// Forms defined in the configuration file.
#[derive(Clone, Debug, Default)]
pub struct ConfigFormRepository {
    forms: HashMap<u32, Form>,
}

impl ConfigFormRepository {
    pub fn from_config(forms: &[FormConfig]) -> Result<Self, ConfigError> {
        let mut repository = Self::default();
        for config in forms {
            let form = form_from_config(config)?;
            if repository.forms.insert(form.id(), form).is_some() {
                return Err(ConfigError::DuplicateForm(config.id));
            }
        }
        Ok(repository)
    }
}

impl FormRepository for ConfigFormRepository {
    fn get(&self, id: &str) -> Result<Form, FormNotFound> {
        id.trim()
            .parse::<u32>()
            .ok()
            .and_then(|id| self.forms.get(&id))
            .cloned()
            .ok_or_else(|| FormNotFound(id.to_owned()))
    }
}

fn form_from_config(config: &FormConfig) -> Result<Form, ConfigError> {
    if config.id == 0 {
        return Err(ConfigError::MissingFormId);
    }

    let redirect = match config.redirect.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(url) => Some(reqwest::Url::parse(url).map_err(|e| ConfigError::InvalidUrl {
            url: url.to_owned(),
            reason: e.to_string(),
        })?),
    };

    let settings = FormSettings {
        double_optin: config.double_optin,
        update_existing: config.update_existing,
        replace_interests: config.replace_interests,
        email_type: config.email_type,
        required_fields: config
            .required_fields
            .iter()
            .map(|field| field.to_uppercase())
            .collect(),
        redirect,
        messages: config.messages.clone(),
    };

    Ok(Form::new(
        config.id,
        config.action,
        config.lists.clone(),
        settings,
    ))
}
