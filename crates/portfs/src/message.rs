/// Severity attached to a diagnostics-sink message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Sink for failure reports and operational messages.
///
/// Every fallible operation reports its failure here before returning, so a
/// caller that discards the returned error still leaves a trace.  The sink
/// decides formatting and destination; the abstraction only promises to
/// call it.
pub trait MessageHandler: Send + Sync {
    fn message(&self, severity: Severity, text: &str);

    fn info(&self, text: &str) {
        self.message(Severity::Info, text);
    }

    fn warning(&self, text: &str) {
        self.message(Severity::Warning, text);
    }

    fn error(&self, text: &str) {
        self.message(Severity::Error, text);
    }
}

/// Default sink: routes messages into the workspace diagnostics crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmitMessageHandler;

impl MessageHandler for EmitMessageHandler {
    fn message(&self, severity: Severity, text: &str) {
        match severity {
            Severity::Info => diagnostics::log_info!("{text}", text: text),
            Severity::Warning => diagnostics::log_warn!("{text}", text: text),
            Severity::Error => diagnostics::log_error!("{text}", text: text),
        }
    }
}

/// Sink that drops everything, for callers with their own reporting.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullMessageHandler;

impl MessageHandler for NullMessageHandler {
    fn message(&self, _severity: Severity, _text: &str) {}
}
