//! Contains the definition of the [`Diagnostic`] struct and related types.

use std::{fmt, ops::Range};

use codespan_reporting::{
    diagnostic::Label,
    files::{self, Files, SimpleFile},
    term::{self, termcolor::NoColor},
};
use derive_new::new;
use kindred_log::{Message, Severity};
use serde::{Deserialize, Serialize};

/// Implement this trait for a type that can report a diagnostic.
///
/// This trait is typically implemented by the error structs and enums of the
/// engine. Keeping the error as data and rendering it on demand lets the
/// caller decide where (and whether) the diagnostic is displayed.
pub trait Report<Param> {
    /// Creates a diagnostic.
    fn report(&self, parameter: Param) -> Diagnostic;
}

/// A byte range in a declaration source.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    new,
)]
pub struct Span {
    /// The byte index where the span starts (inclusive).
    pub start: usize,

    /// The byte index where the span ends (exclusive).
    pub end: usize,
}

impl Span {
    /// Creates a span covering both `self` and `other`.
    #[must_use]
    pub fn join(self, other: Self) -> Self {
        Self { start: self.start.min(other.start), end: self.end.max(other.end) }
    }

    /// Resolves the 1-based line and column of the start of the span within
    /// the given source text.
    ///
    /// # Errors
    ///
    /// Returns an error when the span does not lie within the source.
    pub fn location_in(
        &self,
        source: &str,
    ) -> Result<files::Location, files::Error> {
        self.check_bounds(source)?;

        SimpleFile::new("", source).location((), self.start)
    }

    fn check_bounds(&self, source: &str) -> Result<(), files::Error> {
        if self.end > source.len() || self.start > self.end {
            return Err(files::Error::IndexTooLarge {
                given: self.end.max(self.start),
                max: source.len(),
            });
        }

        Ok(())
    }

    /// Returns the byte range covered by the span.
    #[must_use]
    pub const fn range(&self) -> Range<usize> { self.start..self.end }
}

/// A struct containing all the information required to display the diagnostic
/// to the user.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Diagnostic {
    /// The span location where the diagnostic occurred, if known.
    pub span: Option<Span>,

    /// The message to display to the user.
    pub message: String,

    /// The severity of the diagnostic.
    pub severity: Severity,

    /// The optional help message to display to the user. This will be
    /// displayed alongside the main message.
    pub help_message: Option<String>,

    /// List of related useful information to display to the user.
    ///
    /// For example, for a missing required implementation, this lists the
    /// signature that was expected.
    pub related: Vec<Related>,
}

impl Diagnostic {
    /// Creates an error diagnostic with the given message and nothing else.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            span: None,
            message: message.into(),
            severity: Severity::Error,
            help_message: None,
            related: Vec::new(),
        }
    }

    /// Attaches the span to the diagnostic unless it already has one.
    #[must_use]
    pub fn with_fallback_span(mut self, span: Option<Span>) -> Self {
        if self.span.is_none() {
            self.span = span;
        }

        self
    }

    /// Converts the diagnostic into a `codespan_reporting` diagnostic over a
    /// single source file. Related information with a span becomes a
    /// secondary label, the rest becomes notes.
    #[must_use]
    pub fn to_codespan(
        &self,
    ) -> codespan_reporting::diagnostic::Diagnostic<()> {
        let result = match self.severity {
            Severity::Error => {
                codespan_reporting::diagnostic::Diagnostic::error()
            }
            Severity::Warning => {
                codespan_reporting::diagnostic::Diagnostic::warning()
            }
            Severity::Info => {
                codespan_reporting::diagnostic::Diagnostic::note()
            }
        }
        .with_message(self.message.clone());

        let labels = self
            .span
            .iter()
            .map(|span| Label::primary((), span.range()))
            .chain(self.related.iter().filter_map(|related| {
                related.span.map(|span| {
                    Label::secondary((), span.range())
                        .with_message(related.message.clone())
                })
            }))
            .collect();

        let notes = self
            .related
            .iter()
            .filter(|related| related.span.is_none())
            .map(|related| related.message.clone())
            .chain(
                self.help_message.iter().map(|help| format!("help: {help}")),
            )
            .collect();

        result.with_labels(labels).with_notes(notes)
    }

    /// Renders the diagnostic against the source it was reported for, with
    /// the source snippets highlighted and no colors.
    ///
    /// # Errors
    ///
    /// Returns an error when a span of the diagnostic does not lie within the
    /// source.
    pub fn render(
        &self,
        name: &str,
        source: &str,
    ) -> Result<String, files::Error> {
        let related = self.related.iter().filter_map(|x| x.span.as_ref());

        for span in self.span.iter().chain(related) {
            span.check_bounds(source)?;
        }

        let file = SimpleFile::new(name, source);
        let mut writer = NoColor::new(Vec::new());

        term::emit(
            &mut writer,
            &term::Config::default(),
            &file,
            &self.to_codespan(),
        )?;

        Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Message::new(self.severity, &self.message))?;

        if let Some(help) = &self.help_message {
            write!(f, "\n  help: {help}")?;
        }

        for related in &self.related {
            write!(f, "\n  note: {}", related.message)?;
        }

        Ok(())
    }
}

/// The related information that is displayed alongside the main [`Diagnostic`].
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    new,
)]
pub struct Related {
    /// The span location to display the message at, if known.
    pub span: Option<Span>,

    /// The message to display to the user.
    pub message: String,
}

/// The error is caused by the user input that makes it impossible to continue
/// a particular process.
///
/// The diagnostic should've been reported to the user to inform them about the
/// error.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    thiserror::Error,
)]
#[error(
    "encountered an error from the user input that makes it impossible to \
     continue the process"
)]
pub struct Abort;
