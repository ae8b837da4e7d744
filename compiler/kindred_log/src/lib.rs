//! Provides the severity levels and the console rendering of log messages.

use std::fmt;

use colored::Colorize;
use derive_new::new;
use serde::{Deserialize, Serialize};

/// Enumeration of the severity levels of a message.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
)]
pub enum Severity {
    /// An error that stops the declaration from being processed.
    Error,

    /// A warning that does not stop the declaration from being processed.
    Warning,

    /// An informational message.
    Info,
}

impl Severity {
    /// Returns the lowercase label of the severity, e.g. `error`.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A message header printed to the console, e.g. `[error]: message`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, new)]
pub struct Message<T> {
    /// The severity of the message.
    pub severity: Severity,

    /// The message body.
    pub display: T,
}

impl<T: fmt::Display> fmt::Display for Message<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header = match self.severity {
            Severity::Error => "[error]:".bright_red().bold(),
            Severity::Warning => "[warning]:".yellow().bold(),
            Severity::Info => "[info]:".bright_green().bold(),
        };

        let body = self.display.to_string();

        write!(f, "{header} {}", body.bold())
    }
}
