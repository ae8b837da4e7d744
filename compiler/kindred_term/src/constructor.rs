//! Contains the definition of [`Constructor`], the value a placeholder is
//! bound to.

use std::fmt;

use getset::{CopyGetters, Getters};
use serde::{Deserialize, Serialize};

use crate::{
    visitor::{Element, MutableVisitor, Visitor},
    Hole, TypeExpr,
};

/// A type or type constructor bound to a placeholder.
///
/// A constructor of arity `n` is a template containing the holes `_0` up to
/// `_(n-1)`; applying it to `n` arguments replaces each hole by the argument
/// at the same position. A constructor of arity zero is a plain type.
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
    Getters,
    CopyGetters,
)]
pub struct Constructor {
    /// The number of arguments the constructor takes.
    #[get_copy = "pub"]
    arity: usize,

    /// The template type containing the holes.
    #[get = "pub"]
    template: TypeExpr,
}

/// The template given to [`Constructor::new`] is not well formed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, displaydoc::Display)]
#[allow(missing_docs)]
pub enum InvalidConstructor {
    /// the hole `{hole}` is out of range for a constructor of arity {arity}
    HoleOutOfRange { hole: Hole, arity: usize },

    /// the constructor template `{template}` mentions a placeholder
    ContainsPlaceholder { template: TypeExpr },
}

#[derive(Debug)]
struct HoleChecker {
    arity: usize,
    out_of_range: Option<Hole>,
    placeholder: bool,
}

impl Visitor for HoleChecker {
    fn visit(&mut self, ty: &TypeExpr) -> bool {
        match ty {
            TypeExpr::Hole(hole) if hole.0 >= self.arity => {
                self.out_of_range.get_or_insert(*hole);
            }
            TypeExpr::Placeholder(_) => self.placeholder = true,
            _ => {}
        }

        true
    }
}

#[derive(Debug)]
struct HoleFiller<'a> {
    arguments: &'a [TypeExpr],
}

impl MutableVisitor for HoleFiller<'_> {
    fn visit(&mut self, ty: &mut TypeExpr) -> bool {
        let TypeExpr::Hole(hole) = ty else {
            return true;
        };

        if let Some(argument) = self.arguments.get(hole.0) {
            *ty = argument.clone();
        }

        false
    }
}

impl Constructor {
    /// Creates a constructor of the given arity, checking that every hole of
    /// the template is in range and that no placeholder is mentioned.
    ///
    /// # Errors
    ///
    /// See [`InvalidConstructor`] for the possible errors.
    pub fn new(
        arity: usize,
        template: TypeExpr,
    ) -> Result<Self, InvalidConstructor> {
        let mut checker =
            HoleChecker { arity, out_of_range: None, placeholder: false };
        template.accept(&mut checker);

        if let Some(hole) = checker.out_of_range {
            return Err(InvalidConstructor::HoleOutOfRange { hole, arity });
        }

        if checker.placeholder {
            return Err(InvalidConstructor::ContainsPlaceholder { template });
        }

        Ok(Self { arity, template })
    }

    /// Creates an arity-zero constructor denoting the given type.
    ///
    /// The type is used as is; holes in it are never filled.
    #[must_use]
    pub const fn concrete(ty: TypeExpr) -> Self {
        Self { arity: 0, template: ty }
    }

    /// Creates a constructor of the given arity whose template may mention
    /// placeholders. Used for the arguments of predicates and nested
    /// instances written inside typeclass templates.
    #[must_use]
    pub const fn template_of(arity: usize, template: TypeExpr) -> Self {
        Self { arity, template }
    }

    /// Creates the constructor `name[_0, .., _(arity-1)]`.
    #[must_use]
    pub fn symbol(name: impl Into<String>, arity: usize) -> Self {
        Self {
            arity,
            template: TypeExpr::applied(
                name,
                (0..arity).map(|index| TypeExpr::Hole(Hole(index))).collect(),
            ),
        }
    }

    /// Creates a constructor of the given arity from a type written where a
    /// constructor is expected.
    ///
    /// A bare symbol such as `Option` given for a positive arity denotes
    /// `Option[_, ..]` applied to all of its holes; any other type is checked
    /// like in [`Self::new`].
    ///
    /// # Errors
    ///
    /// See [`InvalidConstructor`] for the possible errors.
    pub fn with_arity(
        arity: usize,
        ty: TypeExpr,
    ) -> Result<Self, InvalidConstructor> {
        match ty {
            TypeExpr::Symbol(symbol)
                if arity > 0 && symbol.arguments.is_empty() =>
            {
                Ok(Self::symbol(symbol.name, arity))
            }
            ty => Self::new(arity, ty),
        }
    }

    pub(crate) fn template_mut(&mut self) -> &mut TypeExpr {
        &mut self.template
    }

    /// Applies the constructor to the given arguments.
    ///
    /// Returns `None` if the number of arguments differs from the arity.
    #[must_use]
    pub fn apply(&self, arguments: &[TypeExpr]) -> Option<TypeExpr> {
        if arguments.len() != self.arity {
            return None;
        }

        if self.arity == 0 {
            return Some(self.template.clone());
        }

        let mut result = self.template.clone();
        result.accept_mut(&mut HoleFiller { arguments });

        Some(result)
    }

    /// Returns the type denoted by an arity-zero constructor.
    #[must_use]
    pub const fn as_type(&self) -> Option<&TypeExpr> {
        if self.arity == 0 {
            Some(&self.template)
        } else {
            None
        }
    }

    /// Consumes the constructor and returns its template.
    #[must_use]
    pub fn into_template(self) -> TypeExpr { self.template }
}

impl From<TypeExpr> for Constructor {
    fn from(value: TypeExpr) -> Self { Self::concrete(value) }
}

impl fmt::Display for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.template)
    }
}
