//! Contains the native functions every [`crate::scope::Scope`] may start
//! with.

use kindred_term::{
    declaration::{Parameter, Signature},
    instantiation::Instantiation,
    TypeExpr, Variable,
};
use serde::{Deserialize, Serialize};

use crate::{
    diagnostic::{ArithmeticOverflow, EvaluationError, InvalidArguments},
    value::{Closure, Value},
};

/// A function implemented by the host rather than by an expression.
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
pub enum Builtin {
    /// `concat(a: string, b: string): string`
    Concat,

    /// `add(a: int, b: int): int`
    Add,

    /// `mul(a: int, b: int): int`
    Mul,

    /// `fold[X, Y](f: (Y, X) -> Y, init: Y, items: seq[X]): Y`
    Fold,

    /// `const[X, Y](value: Y): (X) -> Y`
    Const,

    /// `some[T](value: T): Option[T]`
    Some,

    /// `none[T](): Option[T]`
    None,

    /// `map_option[A, B](value: Option[A], f: (A) -> B): Option[B]`
    MapOption,

    /// `map_seq[A, B](items: seq[A], f: (A) -> B): seq[B]`
    MapSeq,

    /// `empty[T](): seq[T]`
    Empty,

    /// `append[T](items: seq[T], item: T): seq[T]`
    Append,
}

fn variable(name: &str) -> TypeExpr { TypeExpr::variable(name) }

fn parameter(name: &str, r#type: TypeExpr) -> Parameter {
    Parameter::new(name.to_owned(), r#type)
}

fn generic(
    variables: &[&str],
    parameters: Vec<Parameter>,
    return_type: TypeExpr,
) -> Signature {
    Signature::new(
        variables.iter().copied().map(Variable::from).collect(),
        parameters,
        return_type,
        Vec::new(),
    )
}

fn option(inner: TypeExpr) -> TypeExpr { TypeExpr::applied("Option", vec![inner]) }

fn seq(element: TypeExpr) -> TypeExpr { TypeExpr::applied("seq", vec![element]) }

impl Builtin {
    /// All builtins.
    pub const ALL: [Self; 11] = [
        Self::Concat,
        Self::Add,
        Self::Mul,
        Self::Fold,
        Self::Const,
        Self::Some,
        Self::None,
        Self::MapOption,
        Self::MapSeq,
        Self::Empty,
        Self::Append,
    ];

    /// Returns the name the builtin is defined under.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Concat => "concat",
            Self::Add => "add",
            Self::Mul => "mul",
            Self::Fold => "fold",
            Self::Const => "const",
            Self::Some => "some",
            Self::None => "none",
            Self::MapOption => "map_option",
            Self::MapSeq => "map_seq",
            Self::Empty => "empty",
            Self::Append => "append",
        }
    }

    /// Returns the signature of the builtin.
    #[must_use]
    pub fn signature(self) -> Signature {
        let (x, y) = (variable("X"), variable("Y"));
        let (a, b, t) = (variable("A"), variable("B"), variable("T"));

        match self {
            Self::Concat => {
                let string = TypeExpr::symbol("string");
                Signature::monomorphic(
                    vec![
                        parameter("a", string.clone()),
                        parameter("b", string.clone()),
                    ],
                    string,
                )
            }
            Self::Add | Self::Mul => {
                let int = TypeExpr::symbol("int");
                Signature::monomorphic(
                    vec![parameter("a", int.clone()), parameter("b", int.clone())],
                    int,
                )
            }
            Self::Fold => generic(
                &["X", "Y"],
                vec![
                    parameter(
                        "f",
                        TypeExpr::function(vec![y.clone(), x.clone()], y.clone()),
                    ),
                    parameter("init", y.clone()),
                    parameter("items", seq(x)),
                ],
                y,
            ),
            Self::Const => generic(
                &["X", "Y"],
                vec![parameter("value", y.clone())],
                TypeExpr::function(vec![x], y),
            ),
            Self::Some => {
                generic(&["T"], vec![parameter("value", t.clone())], option(t))
            }
            Self::None => generic(&["T"], Vec::new(), option(t)),
            Self::MapOption => generic(
                &["A", "B"],
                vec![
                    parameter("value", option(a.clone())),
                    parameter("f", TypeExpr::function(vec![a], b.clone())),
                ],
                option(b),
            ),
            Self::MapSeq => generic(
                &["A", "B"],
                vec![
                    parameter("items", seq(a.clone())),
                    parameter("f", TypeExpr::function(vec![a], b.clone())),
                ],
                seq(b),
            ),
            Self::Empty => generic(&["T"], Vec::new(), seq(t)),
            Self::Append => generic(
                &["T"],
                vec![
                    parameter("items", seq(t.clone())),
                    parameter("item", t.clone()),
                ],
                seq(t),
            ),
        }
    }

    fn invalid(self, reason: impl Into<String>) -> EvaluationError {
        InvalidArguments { function: self.name().to_owned(), reason: reason.into() }
            .into()
    }

    fn overflow(self) -> EvaluationError {
        ArithmeticOverflow { function: self.name().to_owned() }.into()
    }

    fn type_of(
        self,
        instantiation: &Instantiation,
        name: &str,
    ) -> Result<TypeExpr, EvaluationError> {
        instantiation.get(&Variable::from(name)).cloned().ok_or_else(|| {
            self.invalid(format!("the type of `{name}` is unknown"))
        })
    }

    /// Runs the builtin on already evaluated arguments.
    ///
    /// `instantiation` maps the generic parameters of [`Self::signature`] to
    /// the types selected for this call. `apply` calls a closure argument.
    pub(crate) fn run(
        self,
        instantiation: &Instantiation,
        arguments: Vec<Value>,
        apply: &mut dyn FnMut(&Closure, Vec<Value>) -> Result<Value, EvaluationError>,
    ) -> Result<Value, EvaluationError> {
        match (self, arguments.as_slice()) {
            (Self::Concat, [Value::String(a), Value::String(b)]) => {
                Ok(Value::String(format!("{a}{b}")))
            }
            (Self::Add, [Value::Int(a), Value::Int(b)]) => {
                a.checked_add(*b).map(Value::Int).ok_or_else(|| self.overflow())
            }
            (Self::Mul, [Value::Int(a), Value::Int(b)]) => {
                a.checked_mul(*b).map(Value::Int).ok_or_else(|| self.overflow())
            }
            (
                Self::Fold,
                [Value::Closure(f), init, Value::Sequence { items, .. }],
            ) => items.iter().try_fold(init.clone(), |accumulator, item| {
                apply(f, vec![accumulator, item.clone()])
            }),
            (Self::Const, [value]) => Ok(Value::Closure(Closure::Constant {
                parameter: self.type_of(instantiation, "X")?,
                value: Box::new(value.clone()),
            })),
            (Self::Some, [value]) => Ok(Value::Option {
                inner: self.type_of(instantiation, "T")?,
                value: Some(Box::new(value.clone())),
            }),
            (Self::None, []) => {
                Ok(Value::none(self.type_of(instantiation, "T")?))
            }
            (
                Self::MapOption,
                [Value::Option { value, .. }, Value::Closure(f)],
            ) => Ok(Value::Option {
                inner: self.type_of(instantiation, "B")?,
                value: match value {
                    Some(value) => {
                        Some(Box::new(apply(f, vec![value.as_ref().clone()])?))
                    }
                    None => None,
                },
            }),
            (
                Self::MapSeq,
                [Value::Sequence { items, .. }, Value::Closure(f)],
            ) => Ok(Value::Sequence {
                element: self.type_of(instantiation, "B")?,
                items: items
                    .iter()
                    .map(|item| apply(f, vec![item.clone()]))
                    .collect::<Result<_, _>>()?,
            }),
            (Self::Empty, []) => Ok(Value::sequence(
                self.type_of(instantiation, "T")?,
                Vec::new(),
            )),
            (Self::Append, [Value::Sequence { element, items }, item]) => {
                let mut items = items.clone();
                items.push(item.clone());

                Ok(Value::sequence(element.clone(), items))
            }
            (_, arguments) => Err(self.invalid(format!(
                "expected {} argument(s) of the declared types but got {}",
                self.signature().parameters.len(),
                arguments.len()
            ))),
        }
    }
}
