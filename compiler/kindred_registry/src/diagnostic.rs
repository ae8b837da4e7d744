//! Contains the errors raised by the [`crate::Registry`].

use enum_as_inner::EnumAsInner;
use kindred_diagnostic::{Diagnostic, Related, Report};

/// A typeclass with the same name has already been declared.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, thiserror::Error)]
#[error("the typeclass `{typeclass}` is already declared")]
pub struct DuplicateTypeclass {
    /// The name of the typeclass.
    pub typeclass: String,
}

/// Two placeholders of one typeclass share a name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, thiserror::Error)]
#[error(
    "the placeholder `{placeholder}` is declared more than once in the \
     typeclass `{typeclass}`"
)]
#[allow(missing_docs)]
pub struct DuplicatePlaceholder {
    pub typeclass: String,
    pub placeholder: String,
}

/// Two members of one typeclass template share a name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, thiserror::Error)]
#[error(
    "the member `{member}` is declared more than once in the typeclass \
     `{typeclass}`"
)]
#[allow(missing_docs)]
pub struct DuplicateMember {
    pub typeclass: String,
    pub member: String,
}

/// A placeholder occurrence is applied to a number of arguments different
/// from the declared arity of the placeholder.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, thiserror::Error)]
#[error(
    "the placeholder `{placeholder}` of the typeclass `{typeclass}` is \
     declared with arity {declared} but the member `{member}` applies it to \
     {found} argument(s)"
)]
pub struct InconsistentArity {
    /// The name of the typeclass.
    pub typeclass: String,

    /// The name of the member containing the occurrence.
    pub member: String,

    /// The name of the placeholder.
    pub placeholder: String,

    /// The declared arity.
    pub declared: usize,

    /// The number of arguments of the occurrence.
    pub found: usize,
}

/// A member mentions a placeholder its typeclass does not declare.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, thiserror::Error)]
#[error(
    "the member `{member}` of the typeclass `{typeclass}` mentions the \
     undeclared placeholder `{placeholder}`"
)]
#[allow(missing_docs)]
pub struct UnboundPlaceholder {
    pub typeclass: String,
    pub member: String,
    pub placeholder: String,
}

/// No typeclass with the given name has been declared.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, thiserror::Error)]
#[error("the typeclass `{typeclass}` is not declared")]
pub struct UnknownTypeclass {
    /// The name that was looked up.
    pub typeclass: String,
}

/// The error returned by [`crate::Registry::declare`]. The declaration is
/// rejected and nothing is registered.
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
pub enum DeclareError {
    #[error(transparent)]
    DuplicateTypeclass(DuplicateTypeclass),

    #[error(transparent)]
    DuplicatePlaceholder(DuplicatePlaceholder),

    #[error(transparent)]
    DuplicateMember(DuplicateMember),

    #[error(transparent)]
    InconsistentArity(InconsistentArity),

    #[error(transparent)]
    UnboundPlaceholder(UnboundPlaceholder),
}

impl Report<()> for DuplicateTypeclass {
    fn report(&self, (): ()) -> Diagnostic { Diagnostic::error(self.to_string()) }
}

impl Report<()> for DuplicatePlaceholder {
    fn report(&self, (): ()) -> Diagnostic { Diagnostic::error(self.to_string()) }
}

impl Report<()> for DuplicateMember {
    fn report(&self, (): ()) -> Diagnostic {
        Diagnostic {
            help_message: Some(
                "members of a typeclass cannot be overloaded".to_owned(),
            ),
            ..Diagnostic::error(self.to_string())
        }
    }
}

impl Report<()> for InconsistentArity {
    fn report(&self, (): ()) -> Diagnostic {
        Diagnostic {
            related: vec![Related::new(
                None,
                format!(
                    "`{}` takes {} type argument(s) everywhere in the \
                     template",
                    self.placeholder, self.declared
                ),
            )],
            ..Diagnostic::error(self.to_string())
        }
    }
}

impl Report<()> for UnboundPlaceholder {
    fn report(&self, (): ()) -> Diagnostic {
        Diagnostic {
            help_message: Some(format!(
                "declare `{}` in the placeholder list of `{}`",
                self.placeholder, self.typeclass
            )),
            ..Diagnostic::error(self.to_string())
        }
    }
}

impl Report<()> for UnknownTypeclass {
    fn report(&self, (): ()) -> Diagnostic { Diagnostic::error(self.to_string()) }
}

impl Report<()> for DeclareError {
    fn report(&self, (): ()) -> Diagnostic {
        match self {
            Self::DuplicateTypeclass(error) => error.report(()),
            Self::DuplicatePlaceholder(error) => error.report(()),
            Self::DuplicateMember(error) => error.report(()),
            Self::InconsistentArity(error) => error.report(()),
            Self::UnboundPlaceholder(error) => error.report(()),
        }
    }
}
