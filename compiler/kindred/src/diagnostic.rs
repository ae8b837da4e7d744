//! Contains the [`Error`] aggregating every error a [`crate::Unit`] reports.

use enum_as_inner::EnumAsInner;
use kindred_diagnostic::{Diagnostic, Report};
use kindred_host::diagnostic::{EvaluationError, Redefinition};
use kindred_marker::diagnostic::QueryError;
use kindred_registry::diagnostic::DeclareError;

/// An error raised while processing a declaration unit.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    EnumAsInner,
    thiserror::Error,
    derive_more::From,
)]
#[allow(missing_docs)]
pub enum Error {
    #[error(transparent)]
    Syntax(kindred_syntax::Error),

    #[error(transparent)]
    Declare(DeclareError),

    #[error(transparent)]
    Instantiate(kindred_instance::diagnostic::Error),

    #[error(transparent)]
    Redefinition(Redefinition),

    #[error(transparent)]
    Query(QueryError),

    #[error(transparent)]
    Evaluation(EvaluationError),
}

impl Report<()> for Error {
    fn report(&self, (): ()) -> Diagnostic {
        match self {
            Self::Syntax(error) => error.report(()),
            Self::Declare(error) => error.report(()),
            Self::Instantiate(error) => error.report(()),
            Self::Redefinition(error) => error.report(()),
            Self::Query(error) => error.report(()),
            Self::Evaluation(error) => error.report(()),
        }
    }
}
