//! Non-throwing validation reporting.
//!
//! Runtime validation failures never abort the action that triggered them.
//! They are recorded as [`Diagnostic`]s for the content author and the
//! caller carries on with "nothing".

use std::sync::Mutex;

use serde::{Deserialize, Serialize};

/// A validation failure visible to the content author.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Name of the item that owns the failing rule element.
    pub item: String,
    /// Rule element key (e.g. `EphemeralEffect`).
    pub rule: String,
    /// Human-readable failure message.
    pub message: String,
}

impl Diagnostic {
    /// Create a diagnostic.
    pub fn new(
        item: impl Into<String>,
        rule: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            item: item.into(),
            rule: rule.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} on item {}: {}", self.rule, self.item, self.message)
    }
}

/// Sink for runtime validation failures. Must not panic.
pub trait ValidationReporter: Send + Sync {
    /// Record a failure.
    fn report(&self, diagnostic: Diagnostic);
}

/// Reporter that logs through `tracing` and keeps every diagnostic.
#[derive(Debug, Default)]
pub struct DiagnosticLog {
    entries: Mutex<Vec<Diagnostic>>,
}

impl DiagnosticLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all recorded diagnostics, oldest first.
    #[must_use]
    pub fn entries(&self) -> Vec<Diagnostic> {
        self.lock().clone()
    }

    /// Number of recorded diagnostics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check if nothing has been reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop all recorded diagnostics.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Diagnostic>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ValidationReporter for DiagnosticLog {
    fn report(&self, diagnostic: Diagnostic) {
        tracing::warn!(
            item = %diagnostic.item,
            rule = %diagnostic.rule,
            "{}",
            diagnostic.message
        );
        self.lock().push(diagnostic);
    }
}
