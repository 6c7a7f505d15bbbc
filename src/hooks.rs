//! Typed extension points fired while a submission is handled.

use std::{borrow::Cow, collections::BTreeMap, sync::Arc};

use crate::domain::{ErrorCode, Form};

/// Field values sent to the mailing list alongside the email address.
pub type MergeVars = BTreeMap<String, String>;

/// Prefix of the event fired once per error code on a failed submission.
pub const ERROR_EVENT_PREFIX: &str = "form_error_";

#[derive(Debug)]
pub enum FormEvent<'a> {
    Subscribed {
        form: &'a Form,
        email: &'a str,
        merge_vars: &'a MergeVars,
    },
    Unsubscribed {
        form: &'a Form,
    },
    Success {
        form: &'a Form,
    },
    Error {
        form: &'a Form,
    },
    ErrorCode {
        form: &'a Form,
        code: &'a ErrorCode,
    },
    Respond {
        form: &'a Form,
    },
}

impl FormEvent<'_> {
    pub fn name(&self) -> Cow<'static, str> {
        match self {
            FormEvent::Subscribed { .. } => "form_subscribed".into(),
            FormEvent::Unsubscribed { .. } => "form_unsubscribed".into(),
            FormEvent::Success { .. } => "form_success".into(),
            FormEvent::Error { .. } => "form_error".into(),
            FormEvent::ErrorCode { code, .. } => format!("{ERROR_EVENT_PREFIX}{code}").into(),
            FormEvent::Respond { .. } => "form_respond".into(),
        }
    }

    pub fn form(&self) -> &Form {
        match self {
            FormEvent::Subscribed { form, .. }
            | FormEvent::Unsubscribed { form }
            | FormEvent::Success { form }
            | FormEvent::Error { form }
            | FormEvent::ErrorCode { form, .. }
            | FormEvent::Respond { form } => form,
        }
    }
}

/// An observer of form submissions.
///
/// Every method has a pass-through default so a hook only implements what it
/// cares about. Hooks run synchronously in registration order.
pub trait FormHook: Send + Sync {
    /// Runs before a subscribe request is mapped and sent.
    fn filter_merge_vars(&self, merge_vars: MergeVars, _form: &mut Form) -> MergeVars {
        merge_vars
    }

    /// Runs after the built-in validation, may add or drop error codes.
    fn filter_errors(&self, errors: Vec<ErrorCode>, _form: &Form) -> Vec<ErrorCode> {
        errors
    }

    fn on_event(&self, _event: &FormEvent<'_>) {}
}

#[derive(Clone, Default)]
pub struct FormHooks {
    hooks: Vec<Arc<dyn FormHook>>,
}

impl FormHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, hook: impl FormHook + 'static) -> Self {
        self.register(Arc::new(hook));
        self
    }

    pub fn register(&mut self, hook: Arc<dyn FormHook>) {
        self.hooks.push(hook);
    }

    pub fn filter_merge_vars(&self, merge_vars: MergeVars, form: &mut Form) -> MergeVars {
        self.hooks
            .iter()
            .fold(merge_vars, |merge_vars, hook| hook.filter_merge_vars(merge_vars, form))
    }

    pub fn filter_errors(&self, errors: Vec<ErrorCode>, form: &Form) -> Vec<ErrorCode> {
        self.hooks
            .iter()
            .fold(errors, |errors, hook| hook.filter_errors(errors, form))
    }

    pub fn fire(&self, event: FormEvent<'_>) {
        for hook in &self.hooks {
            hook.on_event(&event);
        }
    }
}

/// Writes every form event to the trace log.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingHook;

impl FormHook for TracingHook {
    fn on_event(&self, event: &FormEvent<'_>) {
        tracing::debug!(
            event = %event.name(),
            form_id = event.form().id(),
            "form event fired"
        );
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::{FormEvent, FormHook, FormHooks, MergeVars};
    use crate::domain::{ErrorCode, Form, FormAction, FormSettings};

    struct Suffix(&'static str, Arc<Mutex<Vec<String>>>);

    impl FormHook for Suffix {
        fn filter_merge_vars(&self, mut merge_vars: MergeVars, _form: &mut Form) -> MergeVars {
            merge_vars
                .entry("TAG".into())
                .or_default()
                .push_str(self.0);
            merge_vars
        }

        fn on_event(&self, event: &FormEvent<'_>) {
            self.1.lock().unwrap().push(format!("{}:{}", self.0, event.name()));
        }
    }

    fn form() -> Form {
        Form::new(1, FormAction::Subscribe, vec![], FormSettings::default())
    }

    #[test]
    fn filters_and_events_run_in_registration_order() {
        let fired = Arc::new(Mutex::new(Vec::new()));
        let hooks = FormHooks::new()
            .with(Suffix("a", fired.clone()))
            .with(Suffix("b", fired.clone()));
        let mut form = form();

        let merge_vars = hooks.filter_merge_vars(MergeVars::new(), &mut form);
        assert_eq!("ab", merge_vars["TAG"]);

        hooks.fire(FormEvent::Success { form: &form });
        assert_eq!(
            vec!["a:form_success".to_string(), "b:form_success".to_string()],
            *fired.lock().unwrap()
        );
    }

    #[test]
    fn error_code_events_are_named_after_the_code() {
        let form = form();
        let code = ErrorCode::AlreadySubscribed;
        let event = FormEvent::ErrorCode {
            form: &form,
            code: &code,
        };
        assert_eq!("form_error_already_subscribed", event.name());
    }
}
