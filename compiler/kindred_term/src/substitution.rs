//! Contains the code related to replacing placeholders by the constructors
//! they are bound to.
//!
//! Substitution is purely structural: every placeholder occurrence of the term
//! is replaced simultaneously, and the replacements are never substituted
//! again. Terms without placeholders come out unchanged.

use enum_as_inner::EnumAsInner;

use crate::{
    binding::Binding,
    visitor::{Element, MutableVisitor},
    TypeExpr,
};

/// A placeholder occurs in the term but the binding has no entry for it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, thiserror::Error)]
#[error("the placeholder `{placeholder}` is not bound")]
pub struct UnboundPlaceholder {
    /// The name of the unbound placeholder.
    pub placeholder: String,
}

/// A placeholder is applied to a number of arguments different from the arity
/// of the constructor it is bound to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, thiserror::Error)]
#[error(
    "the placeholder `{placeholder}` is applied to {found} argument(s) but is \
     bound to a constructor of arity {expected}"
)]
pub struct ArityMismatch {
    /// The name of the placeholder.
    pub placeholder: String,

    /// The arity of the bound constructor.
    pub expected: usize,

    /// The number of arguments of the occurrence.
    pub found: usize,
}

/// The error returned by [`Substitute::substitute`].
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
    UnboundPlaceholder(UnboundPlaceholder),

    #[error(transparent)]
    ArityMismatch(ArityMismatch),
}

/// Implemented by the terms a [`Binding`] can be applied to.
pub trait Substitute: Sized {
    /// Returns a copy of the term with every placeholder occurrence replaced
    /// by its bound constructor.
    ///
    /// A bare occurrence `P` becomes the type of its arity-zero constructor.
    /// An applied occurrence `P[t1, .., tn]` has its arguments substituted
    /// first and then fills the holes of the constructor bound to `P`.
    ///
    /// # Errors
    ///
    /// See [`Error`] for the possible errors. The term is never partially
    /// substituted.
    fn substitute(&self, binding: &Binding) -> Result<Self, Error>;
}

impl<T: Element + Clone> Substitute for T {
    fn substitute(&self, binding: &Binding) -> Result<Self, Error> {
        let mut term = self.clone();
        let mut substituter = Substituter { binding, error: None };

        term.accept_mut(&mut substituter);

        match substituter.error {
            Some(error) => Err(error),
            None => Ok(term),
        }
    }
}

#[derive(Debug)]
struct Substituter<'a> {
    binding: &'a Binding,
    error: Option<Error>,
}

impl Substituter<'_> {
    fn replace(&self, ty: &TypeExpr) -> Result<Option<TypeExpr>, Error> {
        let TypeExpr::Placeholder(placeholder) = ty else {
            return Ok(None);
        };

        let constructor =
            self.binding.get(&placeholder.name).ok_or_else(|| {
                UnboundPlaceholder { placeholder: placeholder.name.clone() }
            })?;

        let arguments = placeholder
            .arguments
            .iter()
            .map(|argument| argument.substitute(self.binding))
            .collect::<Result<Vec<_>, _>>()?;

        constructor.apply(&arguments).map(Some).ok_or_else(|| {
            ArityMismatch {
                placeholder: placeholder.name.clone(),
                expected: constructor.arity(),
                found: arguments.len(),
            }
            .into()
        })
    }
}

impl MutableVisitor for Substituter<'_> {
    fn visit(&mut self, ty: &mut TypeExpr) -> bool {
        if self.error.is_some() {
            return false;
        }

        match self.replace(ty) {
            Ok(Some(replacement)) => {
                *ty = replacement;
                false
            }
            Ok(None) => true,
            Err(error) => {
                self.error = Some(error);
                false
            }
        }
    }
}
