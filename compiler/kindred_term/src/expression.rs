//! Contains the definition of [`Expr`], the body of a function declaration.

use std::fmt;

use derive_new::new;
use enum_as_inner::EnumAsInner;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    declaration::{Parameter, Signature},
    TypeExpr,
};

/// A literal value.
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
)]
#[allow(missing_docs)]
pub enum Literal {
    Int(i64),
    String(String),
    Bool(bool),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::String(value) => write!(f, "{value:?}"),
            Self::Bool(value) => write!(f, "{value}"),
        }
    }
}

/// A reference to a function by name.
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
pub struct Callee {
    /// The name of the referenced function.
    pub name: String,

    /// The explicitly supplied type arguments, empty when they are deduced.
    pub type_arguments: Vec<TypeExpr>,

    /// The exact signature of the referenced overload, if the reference has
    /// been pinned to one.
    pub pinned: Option<Box<Signature>>,
}

impl Callee {
    /// Creates an unpinned reference without type arguments.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into(), type_arguments: Vec::new(), pinned: None }
    }
}

impl fmt::Display for Callee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;

        if !self.type_arguments.is_empty() {
            write!(f, "[{}]", self.type_arguments.iter().format(", "))?;
        }

        Ok(())
    }
}

/// A call expression `callee(arguments..)`.
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
#[allow(missing_docs)]
pub struct Call {
    pub callee: Callee,
    pub arguments: Vec<Expr>,
}

/// An anonymous function `fn(x: A): B => body`.
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
#[allow(missing_docs)]
pub struct Lambda {
    pub parameters: Vec<Parameter>,
    pub return_type: TypeExpr,
    pub body: Box<Expr>,
}

/// A sequence literal `[a, b; T]` whose elements have type `T`.
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
#[allow(missing_docs)]
pub struct Sequence {
    pub element: TypeExpr,
    pub items: Vec<Expr>,
}

/// Represents an expression.
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
)]
#[allow(missing_docs)]
pub enum Expr {
    Literal(Literal),
    Local(String),
    Call(Call),
    Function(Callee),
    Lambda(Lambda),
    Sequence(Sequence),
}

impl Expr {
    /// Creates a call to the named function.
    #[must_use]
    pub fn call(name: impl Into<String>, arguments: Vec<Self>) -> Self {
        Self::Call(Call::new(Callee::named(name), arguments))
    }

    /// Creates a reference to the named function as a value.
    #[must_use]
    pub fn function(name: impl Into<String>) -> Self {
        Self::Function(Callee::named(name))
    }

    /// Creates a reference to a local variable.
    #[must_use]
    pub fn local(name: impl Into<String>) -> Self { Self::Local(name.into()) }

    /// Creates a string literal.
    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Self::Literal(Literal::String(value.into()))
    }

    /// Creates an integer literal.
    #[must_use]
    pub const fn int(value: i64) -> Self { Self::Literal(Literal::Int(value)) }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(literal) => write!(f, "{literal}"),
            Self::Local(name) => f.write_str(name),
            Self::Call(call) => write!(
                f,
                "{}({})",
                call.callee,
                call.arguments.iter().format(", ")
            ),
            Self::Function(callee) => write!(f, "{callee}"),
            Self::Lambda(lambda) => write!(
                f,
                "fn({}): {} => {}",
                lambda.parameters.iter().format(", "),
                lambda.return_type,
                lambda.body
            ),
            Self::Sequence(sequence) => write!(
                f,
                "[{}; {}]",
                sequence.items.iter().format(", "),
                sequence.element
            ),
        }
    }
}
