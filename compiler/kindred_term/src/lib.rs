//! Contains the definition of the terms the engine works on: type expressions,
//! type constructors, bindings, body expressions and declarations, together
//! with the structural substitution over them.

use std::{collections::BTreeSet, fmt};

use derive_more::{Deref, From};
use derive_new::new;
use enum_as_inner::EnumAsInner;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

pub mod binding;
pub mod constructor;
pub mod declaration;
pub mod expression;
pub mod instantiation;
pub mod matching;
pub mod predicate;
pub mod substitution;
pub mod visitor;

#[cfg(test)]
mod arbitrary;

use visitor::{Element, Visitor};

/// A concrete named type, possibly applied to type arguments, such as `string`
/// or `seq[int]`.
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
pub struct Symbol {
    /// The name of the type.
    pub name: String,

    /// The type arguments applied to the type; empty for a nullary type.
    pub arguments: Vec<TypeExpr>,
}

/// An occurrence of a typeclass placeholder inside a template.
///
/// The occurrence is *bare* (`A`) when [`Self::arguments`] is empty and
/// *applied* (`F[A]`) otherwise.
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
pub struct PlaceholderTerm {
    /// The name of the placeholder.
    pub name: String,

    /// The type arguments the placeholder is applied to.
    pub arguments: Vec<TypeExpr>,
}

/// A still-generic type variable, bound by a declaration's generic parameter
/// list or by a partial instance.
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
    Deref,
    From,
    derive_more::Display,
)]
#[display(fmt = "{}", _0)]
pub struct Variable(pub String);

impl From<&str> for Variable {
    fn from(value: &str) -> Self { Self(value.to_owned()) }
}

/// A positional hole of a [`constructor::Constructor`] template.
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
pub struct Hole(pub usize);

impl fmt::Display for Hole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            f.write_str("_")
        } else {
            write!(f, "_{}", self.0)
        }
    }
}

/// The type of a function value, denoted by `(A, B) -> C` syntax.
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
pub struct FunctionType {
    /// The parameter types of the function.
    pub parameters: Vec<TypeExpr>,

    /// The return type of the function.
    pub return_type: Box<TypeExpr>,
}

/// A tuple type, denoted by `(A, B)` syntax.
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
pub struct Tuple {
    /// The element types of the tuple.
    pub elements: Vec<TypeExpr>,
}

/// Represents a type expression.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    EnumAsInner,
    Serialize,
    Deserialize,
    From,
)]
#[allow(missing_docs)]
pub enum TypeExpr {
    Symbol(Symbol),
    Placeholder(PlaceholderTerm),
    Variable(Variable),
    Hole(Hole),
    Function(FunctionType),
    Tuple(Tuple),
}

impl TypeExpr {
    /// Creates a nullary concrete type such as `string`.
    #[must_use]
    pub fn symbol(name: impl Into<String>) -> Self {
        Self::Symbol(Symbol::new(name.into(), Vec::new()))
    }

    /// Creates a concrete type applied to the given arguments such as
    /// `seq[int]`.
    #[must_use]
    pub fn applied(name: impl Into<String>, arguments: Vec<Self>) -> Self {
        Self::Symbol(Symbol::new(name.into(), arguments))
    }

    /// Creates a bare placeholder occurrence.
    #[must_use]
    pub fn placeholder(name: impl Into<String>) -> Self {
        Self::Placeholder(PlaceholderTerm::new(name.into(), Vec::new()))
    }

    /// Creates an applied placeholder occurrence such as `F[A]`.
    #[must_use]
    pub fn applied_placeholder(
        name: impl Into<String>,
        arguments: Vec<Self>,
    ) -> Self {
        Self::Placeholder(PlaceholderTerm::new(name.into(), arguments))
    }

    /// Creates a type variable.
    #[must_use]
    pub fn variable(name: impl Into<String>) -> Self {
        Self::Variable(Variable(name.into()))
    }

    /// Creates a function type.
    #[must_use]
    pub fn function(parameters: Vec<Self>, return_type: Self) -> Self {
        Self::Function(FunctionType::new(parameters, Box::new(return_type)))
    }

    /// Returns `true` if a placeholder occurs anywhere in the type.
    #[must_use]
    pub fn contains_placeholder(&self) -> bool {
        let mut finder = Finder { predicate: Self::is_placeholder, found: false };
        self.accept(&mut finder);
        finder.found
    }

    /// Returns `true` if a constructor hole occurs anywhere in the type.
    #[must_use]
    pub fn contains_hole(&self) -> bool {
        let mut finder = Finder { predicate: Self::is_hole, found: false };
        self.accept(&mut finder);
        finder.found
    }

    /// Collects all the type variables occurring in the type.
    #[must_use]
    pub fn variables(&self) -> BTreeSet<Variable> {
        let mut collector = visitor::VariableCollector::default();
        self.accept(&mut collector);
        collector.variables
    }
}

/// The unit type `()`.
impl Default for TypeExpr {
    fn default() -> Self { Self::Tuple(Tuple::new(Vec::new())) }
}

#[derive(Debug)]
struct Finder {
    predicate: fn(&TypeExpr) -> bool,
    found: bool,
}

impl Visitor for Finder {
    fn visit(&mut self, ty: &TypeExpr) -> bool {
        if (self.predicate)(ty) {
            self.found = true;
        }

        !self.found
    }
}

fn write_applied(
    f: &mut fmt::Formatter<'_>,
    name: &str,
    arguments: &[TypeExpr],
) -> fmt::Result {
    f.write_str(name)?;

    if !arguments.is_empty() {
        write!(f, "[{}]", arguments.iter().format(", "))?;
    }

    Ok(())
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Symbol(symbol) => {
                write_applied(f, &symbol.name, &symbol.arguments)
            }
            Self::Placeholder(placeholder) => {
                write_applied(f, &placeholder.name, &placeholder.arguments)
            }
            Self::Variable(variable) => write!(f, "{variable}"),
            Self::Hole(hole) => write!(f, "{hole}"),
            Self::Function(function) => write!(
                f,
                "({}) -> {}",
                function.parameters.iter().format(", "),
                function.return_type
            ),
            Self::Tuple(tuple) => match tuple.elements.as_slice() {
                [single] => write!(f, "({single},)"),
                elements => write!(f, "({})", elements.iter().format(", ")),
            },
        }
    }
}

/// A placeholder declared by a typeclass: a name plus the number of type
/// arguments it takes.
///
/// An arity of zero denotes an ordinary type placeholder; a positive arity
/// denotes a type-constructor placeholder such as `F[_]`.
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
pub struct Placeholder {
    /// The name of the placeholder.
    pub name: String,

    /// The number of type arguments the placeholder takes.
    pub arity: usize,
}

impl Placeholder {
    /// Creates an ordinary (arity zero) placeholder.
    #[must_use]
    pub fn ordinary(name: impl Into<String>) -> Self {
        Self { name: name.into(), arity: 0 }
    }

    /// Creates a type-constructor placeholder taking `arity` arguments.
    #[must_use]
    pub fn constructor(name: impl Into<String>, arity: usize) -> Self {
        Self { name: name.into(), arity }
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;

        if self.arity > 0 {
            write!(
                f,
                "[{}]",
                std::iter::repeat("_").take(self.arity).format(", ")
            )?;
        }

        Ok(())
    }
}
