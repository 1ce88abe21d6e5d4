// src/diagnostics.rs
use serde::Serialize;
use tracing::{error, info, warn};

/// How loudly a recoverable condition is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Note,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

/// Collects every note/warning/error of a run while forwarding it to `tracing`.
#[derive(Debug, Default, Clone, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, severity: Severity, message: impl Into<String>) {
        let message = message.into();
        match severity {
            Severity::Note => info!("Note: {}", message),
            Severity::Warning => warn!("Warning: {}", message),
            Severity::Error => error!("Error: {}", message),
        }
        self.entries.push(Diagnostic { severity, message });
    }

    pub fn note(&mut self, message: impl Into<String>) {
        self.record(Severity::Note, message)
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.record(Severity::Warning, message)
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.record(Severity::Error, message)
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.entries
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    pub fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.severity == severity)
    }
}
