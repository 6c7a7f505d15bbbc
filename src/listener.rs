use std::sync::Arc;

use reqwest::Url;

use crate::{
    api::{
        ApiError, MailingListApi, ALREADY_SUBSCRIBED, EMAIL_NOT_SUBSCRIBED, LIST_NOT_SUBSCRIBED,
        PREVIOUSLY_UNSUBSCRIBED,
    },
    config::Config,
    debug_log::{DebugLog, TracingLog},
    domain::{ErrorCode, Form, FormAction, MemberStatus, SubmissionRequest, FORM_ID_FIELD},
    forms::{ConfigFormRepository, FormRepository},
    hooks::{FormEvent, FormHooks, TracingHook},
    list_data_mapper::ListDataMapper,
    mailchimp_client::MailchimpClient,
    util::obfuscate,
    validation::FormValidator,
};

/// Everything a [`FormListener`] talks to. Cheap to clone, one copy per request.
#[derive(Clone)]
pub struct FormServices {
    pub forms: Arc<dyn FormRepository>,
    pub api: Arc<dyn MailingListApi>,
    pub mapper: Arc<ListDataMapper>,
    pub validator: FormValidator,
    pub hooks: FormHooks,
    pub log: Arc<dyn DebugLog>,
}

impl FormServices {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            forms: Arc::new(ConfigFormRepository::from_config(&config.forms)?),
            api: Arc::new(MailchimpClient::from_config(config)?),
            mapper: Arc::new(ListDataMapper::new(&config.lists)),
            validator: FormValidator::new(config.spam.min_submit_seconds),
            hooks: FormHooks::new().with(TracingHook),
            log: Arc::new(TracingLog),
        })
    }
}

/// Handles one form submission from start to finish.
pub struct FormListener {
    services: FormServices,
    /// The form handled by the last successful call to [`FormListener::listen`].
    pub submitted_form: Option<Form>,
    redirect: Option<Url>,
}

impl FormListener {
    pub fn new(services: FormServices) -> Self {
        Self {
            services,
            submitted_form: None,
            redirect: None,
        }
    }

    /// Where the browser should be sent after the last submission, if anywhere.
    pub fn redirect(&self) -> Option<&Url> {
        self.redirect.as_ref()
    }

    /// Handles a submission if it is one.
    ///
    /// Returns `false` when the request carries no form id or names an
    /// unknown form, `true` once the form was processed and responded to,
    /// whatever the outcome. The outcome itself is on
    /// [`FormListener::submitted_form`].
    #[tracing::instrument(
        name = "listening for form submission",
        skip_all,
        fields(form_id = tracing::field::Empty)
    )]
    pub async fn listen(&mut self, request: &SubmissionRequest) -> bool {
        self.redirect = None;

        if request.post(FORM_ID_FIELD).map_or(true, str::is_empty) {
            return false;
        }

        let id = request.param(FORM_ID_FIELD).unwrap_or_default();
        let mut form = match self.services.forms.get(id) {
            Ok(form) => form,
            Err(e) => {
                tracing::debug!(error.message = %e, "ignoring submission.");
                return false;
            }
        };
        tracing::Span::current().record("form_id", form.id());

        form.handle_request(request);
        self.validate(&mut form, request);

        if form.has_errors() {
            let errors: Vec<&str> = form.errors().iter().map(ErrorCode::as_str).collect();
            self.services.log.info(&format!(
                "Form {} > Submitted with errors: {}",
                form.id(),
                errors.join(", ")
            ));
        } else {
            match form.action() {
                FormAction::Subscribe => self.process_subscribe(&mut form, request).await,
                FormAction::Unsubscribe => self.process_unsubscribe(&mut form, request).await,
            }
        }

        self.redirect = self.respond(&form, request);
        self.submitted_form = Some(form);

        true
    }

    fn validate(&self, form: &mut Form, request: &SubmissionRequest) {
        let errors = self.services.validator.validate(form, request);
        let errors = self.services.hooks.filter_errors(errors, form);
        for error in errors {
            form.add_error(error);
        }
    }

    /// Subscribes the submitted address to every list of the form.
    ///
    /// Lists are processed in order and only the last list's result decides
    /// the outcome.
    #[tracing::instrument(skip_all, fields(form_id = form.id()))]
    pub async fn process_subscribe(&self, form: &mut Form, request: &SubmissionRequest) {
        let data = form.data().clone();
        let merge_vars = self.services.hooks.filter_merge_vars(data, form);
        let email = form.email().to_owned();
        let settings = form.settings().clone();

        let mut result = None;
        for (list_id, mut member) in self.services.mapper.map(&merge_vars, form.lists()) {
            member.status = if settings.double_optin {
                MemberStatus::Pending
            } else {
                MemberStatus::Subscribed
            };
            member.email_type = form.email_type();
            member.ip_signup = request.client_ip().to_owned();

            result = Some(
                self.services
                    .api
                    .subscribe(
                        &list_id,
                        &member.email_address,
                        &member,
                        settings.update_existing,
                        settings.replace_interests,
                    )
                    .await,
            );
        }

        let member = match result {
            Some(Ok(member)) if !member.id.is_empty() => member,
            other => {
                let error = match other {
                    Some(Err(e)) => e,
                    Some(Ok(_)) => ApiError::new(0, "the api returned a member without an id"),
                    None => ApiError::new(0, "the form has no lists to subscribe to"),
                };
                self.subscribe_failed(form, &email, &error);
                return;
            }
        };

        if member.was_updated() {
            form.queue_message("updated");
        } else {
            form.queue_message("subscribed");
        }
        self.services.log.info(&format!(
            "Form {} > Successfully subscribed {}",
            form.id(),
            email
        ));

        self.services.hooks.fire(FormEvent::Subscribed {
            form: &*form,
            email: &email,
            merge_vars: &merge_vars,
        });
    }

    fn subscribe_failed(&self, form: &mut Form, email: &str, error: &ApiError) {
        let log = &self.services.log;
        match error.code {
            PREVIOUSLY_UNSUBSCRIBED => {
                form.add_error(ErrorCode::PreviouslyUnsubscribed);
                log.warning(&format!(
                    "Form {} > {} unsubscribed before and can not be signed up again by a form.",
                    form.id(),
                    email
                ));
            }
            ALREADY_SUBSCRIBED => {
                form.add_error(ErrorCode::AlreadySubscribed);
                log.warning(&format!(
                    "Form {} > {} is already subscribed to the selected list(s)",
                    form.id(),
                    obfuscate(email)
                ));
            }
            _ => {
                log.error(&format!(
                    "Form {} > Mailchimp API error: {}",
                    form.id(),
                    error.message
                ));
                form.add_error(ErrorCode::Error);
            }
        }
    }

    /// Removes the submitted address from every list of the form.
    ///
    /// Like subscribing, only the last list's result decides the outcome.
    #[tracing::instrument(skip_all, fields(form_id = form.id()))]
    pub async fn process_unsubscribe(&self, form: &mut Form, _request: &SubmissionRequest) {
        let email = form.email().to_owned();

        let mut result = None;
        for list_id in form.lists() {
            result = Some(self.services.api.unsubscribe(list_id, &email).await);
        }

        let error = match result {
            Some(Ok(())) => None,
            Some(Err(e)) => Some(e),
            None => Some(ApiError::new(0, "the form has no lists to unsubscribe from")),
        };

        match error {
            None => form.queue_message("unsubscribed"),
            Some(e) if matches!(e.code, LIST_NOT_SUBSCRIBED | EMAIL_NOT_SUBSCRIBED) => {
                form.add_error(ErrorCode::NotSubscribed);
                self.services.log.info(&format!(
                    "Form {} > {} is not subscribed to the selected list(s)",
                    form.id(),
                    email
                ));
            }
            Some(e) => {
                form.add_error(ErrorCode::Error);
                self.services.log.error(&format!(
                    "Form {} > Mailchimp API error: {}",
                    form.id(),
                    e.message
                ));
            }
        }

        self.services.hooks.fire(FormEvent::Unsubscribed { form: &*form });
    }

    /// Fires the closing events and decides on a redirect.
    ///
    /// Only a successful, non-AJAX submission of a form with a redirect url
    /// is redirected.
    pub fn respond(&self, form: &Form, request: &SubmissionRequest) -> Option<Url> {
        let hooks = &self.services.hooks;
        let success = !form.has_errors();

        if success {
            hooks.fire(FormEvent::Success { form });
        } else {
            hooks.fire(FormEvent::Error { form });
            for code in form.errors() {
                hooks.fire(FormEvent::ErrorCode { form, code });
            }
        }

        hooks.fire(FormEvent::Respond { form });

        if success && !request.is_async() {
            form.redirect_url().cloned()
        } else {
            None
        }
    }
}
