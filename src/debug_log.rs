/// Leveled sink for the messages the form listener records about a submission.
pub trait DebugLog: Send + Sync {
    fn info(&self, message: &str);
    fn warning(&self, message: &str);
    fn error(&self, message: &str);
}

/// Forwards debug log entries to `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLog;

impl DebugLog for TracingLog {
    fn info(&self, message: &str) {
        tracing::info!(target: "signup_forms::debug_log", "{message}");
    }

    fn warning(&self, message: &str) {
        tracing::warn!(target: "signup_forms::debug_log", "{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "signup_forms::debug_log", "{message}");
    }
}
