//! Contains the errors raised by the [`crate::Generator`].

use enum_as_inner::EnumAsInner;
use kindred_diagnostic::{Diagnostic, Related, Report};
pub use kindred_registry::diagnostic::UnknownTypeclass;
use kindred_term::{declaration::Signature, substitution, Variable};

/// The way a binding fails to cover the placeholders of its typeclass.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    EnumAsInner,
    displaydoc::Display,
)]
pub enum MismatchKind {
    /// the placeholder `{placeholder}` is not bound
    Missing {
        /// The unbound placeholder.
        placeholder: String,
    },

    /// there is no placeholder named `{placeholder}`
    Unexpected {
        /// The unknown placeholder name.
        placeholder: String,
    },

    /// the placeholder `{placeholder}` takes {expected} type argument(s) but
    /// is bound to a constructor taking {found}
    Arity {
        /// The placeholder.
        placeholder: String,

        /// The arity the typeclass declares.
        expected: usize,

        /// The arity of the bound constructor.
        found: usize,
    },

    /// expected {expected} type argument(s) but {found} were given
    Count {
        /// The number of placeholders.
        expected: usize,

        /// The number of arguments supplied.
        found: usize,
    },
}

/// The binding of an instance request does not cover exactly the
/// placeholders of the typeclass.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, thiserror::Error)]
#[error("invalid binding for the typeclass `{typeclass}`: {kind}")]
pub struct BindingMismatch {
    /// The name of the typeclass.
    pub typeclass: String,

    /// What is wrong with the binding.
    pub kind: MismatchKind,
}

/// A member template could not be substituted.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, thiserror::Error)]
#[error(
    "failed to substitute the member `{member}` of the typeclass \
     `{typeclass}`: {error}"
)]
pub struct Substitution {
    /// The name of the typeclass.
    pub typeclass: String,

    /// The name of the member.
    pub member: String,

    /// The error raised by the substitution.
    pub error: substitution::Error,
}

/// No declaration with the substituted signature of a required member is
/// visible at the point of instantiation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, thiserror::Error)]
#[error(
    "the required member `{member}` of the typeclass `{typeclass}` has no \
     implementation with the signature `{member}{expected}`"
)]
pub struct MissingRequiredImplementation {
    /// The name of the typeclass.
    pub typeclass: String,

    /// The name of the required member.
    pub member: String,

    /// The substituted signature an implementation must have.
    pub expected: Signature,
}

/// A generic parameter of a member has the same name as a type variable of
/// the partial instance.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, thiserror::Error)]
#[error(
    "the generic parameter `{variable}` of the member `{member}` collides \
     with a type variable of the instance of `{typeclass}`"
)]
#[allow(missing_docs)]
pub struct GenericParameterCollision {
    pub typeclass: String,
    pub member: String,
    pub variable: Variable,
}

/// Nested instances are instantiated deeper than allowed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, thiserror::Error)]
#[error(
    "instantiating `{typeclass}` exceeded the maximum instantiation depth of \
     {max_depth}"
)]
#[allow(missing_docs)]
pub struct InstantiationOverflow {
    pub typeclass: String,
    pub max_depth: usize,
}

/// The error returned by [`crate::Generator::instantiate`]. Nothing is
/// generated when an error is returned.
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
pub enum Error {
    #[error(transparent)]
    UnknownTypeclass(UnknownTypeclass),

    #[error(transparent)]
    BindingMismatch(BindingMismatch),

    #[error(transparent)]
    Substitution(Substitution),

    #[error(transparent)]
    MissingRequiredImplementation(MissingRequiredImplementation),

    #[error(transparent)]
    GenericParameterCollision(GenericParameterCollision),

    #[error(transparent)]
    InstantiationOverflow(InstantiationOverflow),
}

impl Report<()> for Error {
    fn report(&self, (): ()) -> Diagnostic {
        let diagnostic = Diagnostic::error(self.to_string());

        match self {
            Self::UnknownTypeclass(error) => error.report(()),

            Self::MissingRequiredImplementation(error) => Diagnostic {
                help_message: Some(format!(
                    "declare `{}` before the instance, or skip the member \
                     with `skipping({})`",
                    error.expected.describe(&error.member),
                    error.member
                )),
                ..diagnostic
            },

            Self::Substitution(error) => Diagnostic {
                related: vec![Related::new(None, error.error.to_string())],
                ..diagnostic
            },

            Self::GenericParameterCollision(error) => Diagnostic {
                help_message: Some(format!(
                    "rename the type variable `{}` of the instance",
                    error.variable
                )),
                ..diagnostic
            },

            Self::InstantiationOverflow(_) => Diagnostic {
                help_message: Some(
                    "the typeclass might instantiate itself through nested \
                     instances"
                        .to_owned(),
                ),
                ..diagnostic
            },

            Self::BindingMismatch(_) => diagnostic,
        }
    }
}
