//! Contains the errors of the structural queries.

use enum_as_inner::EnumAsInner;
use kindred_diagnostic::{Diagnostic, Report};
use kindred_term::predicate::Predicate;

/// The query needed to prove more nested where-clauses than allowed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, thiserror::Error)]
#[error(
    "proving `{predicate}` exceeded the maximum query depth of {max_depth}"
)]
pub struct OverflowError {
    /// The predicate being proven when the limit was hit.
    pub predicate: Predicate,

    /// The configured limit.
    pub max_depth: usize,
}

/// More than one marker matches the predicate and none is more specific than
/// the others.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, thiserror::Error)]
#[error("more than one instance matches `{predicate}`")]
pub struct AmbiguousMarker {
    /// The predicate being proven.
    pub predicate: Predicate,
}

/// The error returned by the structural queries of
/// [`crate::MarkerTable`].
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    EnumAsInner,
    thiserror::Error,
    derive_more::From,
)]
#[allow(missing_docs)]
pub enum QueryError {
    #[error(transparent)]
    Overflow(OverflowError),

    #[error(transparent)]
    Ambiguous(AmbiguousMarker),
}

impl Report<()> for QueryError {
    fn report(&self, (): ()) -> Diagnostic {
        match self {
            Self::Overflow(_) => Diagnostic {
                help_message: Some(
                    "the where-clauses of the instances involved might be \
                     recursive"
                        .to_owned(),
                ),
                ..Diagnostic::error(self.to_string())
            },
            Self::Ambiguous(_) => Diagnostic::error(self.to_string()),
        }
    }
}
