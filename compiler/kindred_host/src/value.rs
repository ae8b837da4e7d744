//! Contains the definition of [`Value`], the result of evaluating an
//! expression.

use std::fmt;

use enum_as_inner::EnumAsInner;
use itertools::Itertools;
use kindred_term::{
    expression::Lambda, instantiation::Instantiation, FunctionType, TypeExpr,
};

use crate::scope::FunctionId;

/// A function used as a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Closure {
    /// A declared or native function whose generic parameters have been
    /// instantiated.
    Function {
        /// The referenced function.
        id: FunctionId,

        /// The types of the function's generic parameters.
        instantiation: Instantiation,

        /// The type of the function after instantiation.
        r#type: FunctionType,
    },

    /// An anonymous function together with the locals it captured.
    Lambda {
        /// The lambda expression as written.
        lambda: Lambda,

        /// The locals visible where the lambda was created.
        captures: Vec<(String, Value)>,

        /// The types of the generic parameters in scope where the lambda was
        /// created.
        instantiation: Instantiation,
    },

    /// A function ignoring its single argument and returning `value`.
    Constant {
        /// The type of the ignored argument.
        parameter: TypeExpr,

        /// The returned value.
        value: Box<Value>,
    },
}

impl Closure {
    /// Returns the type of the closure.
    #[must_use]
    pub fn r#type(&self) -> FunctionType {
        match self {
            Self::Function { r#type, .. } => r#type.clone(),
            Self::Lambda { lambda, instantiation, .. } => FunctionType::new(
                lambda
                    .parameters
                    .iter()
                    .map(|parameter| instantiation.apply(&parameter.r#type))
                    .collect(),
                Box::new(instantiation.apply(&lambda.return_type)),
            ),
            Self::Constant { parameter, value } => FunctionType::new(
                vec![parameter.clone()],
                Box::new(value.r#type()),
            ),
        }
    }
}

/// A runtime value.
#[derive(Debug, Clone, PartialEq, Eq, EnumAsInner)]
#[allow(missing_docs)]
pub enum Value {
    Int(i64),
    String(String),
    Bool(bool),

    /// A sequence whose items have type `element`.
    Sequence {
        element: TypeExpr,
        items: Vec<Value>,
    },

    /// An optional value of type `Option[inner]`.
    Option {
        inner: TypeExpr,
        value: Option<Box<Value>>,
    },

    Closure(Closure),
}

impl Value {
    /// Creates a string value.
    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    /// Creates a present optional value; `inner` is the type of `value`.
    #[must_use]
    pub fn some(value: Self) -> Self {
        Self::Option { inner: value.r#type(), value: Some(Box::new(value)) }
    }

    /// Creates an absent optional value of type `Option[inner]`.
    #[must_use]
    pub const fn none(inner: TypeExpr) -> Self {
        Self::Option { inner, value: None }
    }

    /// Creates a sequence of the given items of type `element`.
    #[must_use]
    pub const fn sequence(element: TypeExpr, items: Vec<Self>) -> Self {
        Self::Sequence { element, items }
    }

    /// Returns the type of the value.
    #[must_use]
    pub fn r#type(&self) -> TypeExpr {
        match self {
            Self::Int(_) => TypeExpr::symbol("int"),
            Self::String(_) => TypeExpr::symbol("string"),
            Self::Bool(_) => TypeExpr::symbol("bool"),
            Self::Sequence { element, .. } => {
                TypeExpr::applied("seq", vec![element.clone()])
            }
            Self::Option { inner, .. } => {
                TypeExpr::applied("Option", vec![inner.clone()])
            }
            Self::Closure(closure) => TypeExpr::Function(closure.r#type()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::String(value) => write!(f, "{value:?}"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Sequence { items, .. } => {
                write!(f, "[{}]", items.iter().format(", "))
            }
            Self::Option { value: Some(value), .. } => write!(f, "Some({value})"),
            Self::Option { value: None, .. } => f.write_str("None"),
            Self::Closure(closure) => {
                write!(f, "<{}>", TypeExpr::Function(closure.r#type()))
            }
        }
    }
}
