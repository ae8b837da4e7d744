//! Contains the errors raised while defining, resolving and evaluating
//! functions in a [`crate::scope::Scope`].

use std::fmt;

use enum_as_inner::EnumAsInner;
use itertools::Itertools;
use kindred_diagnostic::{Diagnostic, Related, Report};
use kindred_marker::diagnostic::QueryError;
use kindred_term::{declaration::Signature, TypeExpr, Variable};

/// A function with the same name and an equivalent signature is already
/// defined.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, thiserror::Error)]
#[error("the function `{name}{signature}` is already defined")]
pub struct Redefinition {
    /// The name of the function.
    pub name: String,

    /// The signature of the rejected definition.
    pub signature: Signature,

    /// The signature of the existing definition.
    pub existing: Signature,
}

impl Report<()> for Redefinition {
    fn report(&self, (): ()) -> Diagnostic {
        Diagnostic {
            related: vec![Related::new(
                None,
                format!(
                    "previously defined as `{}`",
                    self.existing.describe(&self.name)
                ),
            )],
            ..Diagnostic::error(self.to_string())
        }
    }
}

/// No overload of the function accepts the given arguments.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NoMatchingOverload {
    /// The name of the called function.
    pub name: String,

    /// The types of the arguments.
    pub arguments: Vec<TypeExpr>,
}

impl std::error::Error for NoMatchingOverload {}

impl fmt::Display for NoMatchingOverload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "no overload of `{}` accepts arguments of type ({})",
            self.name,
            self.arguments.iter().format(", ")
        )
    }
}

/// No function has exactly the signature a reference was pinned to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, thiserror::Error)]
#[error("no function has the signature `{name}{signature}`")]
pub struct NoMatchingSignature {
    /// The name of the referenced function.
    pub name: String,

    /// The pinned signature.
    pub signature: Signature,
}

/// Several overloads accept the arguments and none is more specific than the
/// others.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, thiserror::Error)]
#[error("the reference to `{name}` is ambiguous")]
pub struct AmbiguousOverload {
    /// The name of the referenced function.
    pub name: String,

    /// The signatures of the equally specific candidates.
    pub candidates: Vec<Signature>,
}

/// A generic parameter of the selected overload is neither deduced from the
/// arguments nor supplied explicitly.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, thiserror::Error)]
#[error("cannot infer the type of `{variable}` in the call to `{name}`")]
pub struct CannotInfer {
    /// The name of the called function.
    pub name: String,

    /// The undetermined generic parameter.
    pub variable: Variable,
}

/// The error raised while selecting the overload a reference denotes.
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
pub enum ResolutionError {
    #[error(transparent)]
    NoMatchingOverload(NoMatchingOverload),

    #[error(transparent)]
    NoMatchingSignature(NoMatchingSignature),

    #[error(transparent)]
    AmbiguousOverload(AmbiguousOverload),

    #[error(transparent)]
    CannotInfer(CannotInfer),

    #[error(transparent)]
    Query(QueryError),
}

impl Report<()> for ResolutionError {
    fn report(&self, (): ()) -> Diagnostic {
        match self {
            Self::AmbiguousOverload(error) => Diagnostic {
                related: error
                    .candidates
                    .iter()
                    .map(|signature| {
                        Related::new(
                            None,
                            format!(
                                "candidate `{}`",
                                signature.describe(&error.name)
                            ),
                        )
                    })
                    .collect(),
                help_message: Some(
                    "supply the type arguments explicitly".to_owned(),
                ),
                ..Diagnostic::error(self.to_string())
            },
            Self::CannotInfer(_) => Diagnostic {
                help_message: Some(
                    "supply the type arguments explicitly".to_owned(),
                ),
                ..Diagnostic::error(self.to_string())
            },
            Self::Query(error) => error.report(()),
            Self::NoMatchingOverload(_) | Self::NoMatchingSignature(_) => {
                Diagnostic::error(self.to_string())
            }
        }
    }
}

/// A local variable is referenced but not in scope.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, thiserror::Error)]
#[error("the local `{name}` is not in scope")]
pub struct UnknownLocal {
    /// The name of the local.
    pub name: String,
}

/// A local that is not a function is called.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, thiserror::Error)]
#[error("the local `{name}` is not a function")]
pub struct NotCallable {
    /// The name of the local.
    pub name: String,
}

/// A function received arguments it cannot operate on.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, thiserror::Error)]
#[error("invalid arguments to `{function}`: {reason}")]
pub struct InvalidArguments {
    /// The name of the function.
    pub function: String,

    /// What is wrong with the arguments.
    pub reason: String,
}

/// An integer operation overflowed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, thiserror::Error)]
#[error("integer overflow in `{function}`")]
pub struct ArithmeticOverflow {
    /// The name of the function.
    pub function: String,
}

/// Calls are nested deeper than allowed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, thiserror::Error,
)]
#[error("exceeded the maximum call depth of {max_depth}")]
pub struct CallDepthExceeded {
    /// The configured limit.
    pub max_depth: usize,
}

/// The error raised while evaluating an expression.
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
pub enum EvaluationError {
    #[error(transparent)]
    Resolution(ResolutionError),

    #[error(transparent)]
    UnknownLocal(UnknownLocal),

    #[error(transparent)]
    NotCallable(NotCallable),

    #[error(transparent)]
    InvalidArguments(InvalidArguments),

    #[error(transparent)]
    ArithmeticOverflow(ArithmeticOverflow),

    #[error(transparent)]
    CallDepthExceeded(CallDepthExceeded),
}

impl Report<()> for EvaluationError {
    fn report(&self, (): ()) -> Diagnostic {
        match self {
            Self::Resolution(error) => error.report(()),
            Self::CallDepthExceeded(_) => Diagnostic {
                help_message: Some(
                    "the function might recurse without terminating"
                        .to_owned(),
                ),
                ..Diagnostic::error(self.to_string())
            },
            Self::UnknownLocal(_)
            | Self::NotCallable(_)
            | Self::InvalidArguments(_)
            | Self::ArithmeticOverflow(_) => Diagnostic::error(self.to_string()),
        }
    }
}
