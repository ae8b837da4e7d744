//! Contains the [`Evaluator`], a tree-walking interpreter over the functions
//! of a [`Scope`].

use itertools::Itertools;
use kindred_term::{
    expression::{Callee, Expr, Literal},
    instantiation::Instantiation,
    FunctionType, TypeExpr,
};

use crate::{
    diagnostic::{
        CallDepthExceeded, EvaluationError, InvalidArguments, NotCallable,
        UnknownLocal,
    },
    scope::{Body, Scope, Selection},
    value::{Closure, Value},
};

/// The default limit of nested calls.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 256;

/// The locals and generic parameter types of one function activation.
#[derive(Debug, Clone, Default)]
struct Frame {
    locals: Vec<(String, Value)>,
    instantiation: Instantiation,
}

impl Frame {
    fn local(&self, name: &str) -> Option<&Value> {
        self.locals
            .iter()
            .rev()
            .find(|(local, _)| local == name)
            .map(|(_, value)| value)
    }

    /// Instantiates the explicit type arguments of the callee; a pinned
    /// signature is kept in the namespace it was written in.
    fn callee(&self, callee: &Callee) -> Callee {
        Callee {
            type_arguments: callee
                .type_arguments
                .iter()
                .map(|ty| self.instantiation.apply(ty))
                .collect(),
            ..callee.clone()
        }
    }

    fn is_local(&self, callee: &Callee) -> bool {
        callee.pinned.is_none()
            && callee.type_arguments.is_empty()
            && self.local(&callee.name).is_some()
    }
}

/// Evaluates calls against a [`Scope`].
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'a> {
    scope: &'a Scope,
    max_depth: usize,
}

impl<'a> Evaluator<'a> {
    /// Creates an evaluator with the default call depth limit.
    #[must_use]
    pub const fn new(scope: &'a Scope) -> Self {
        Self { scope, max_depth: DEFAULT_MAX_CALL_DEPTH }
    }

    /// Sets the limit of nested calls.
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Calls the overload of `name` that accepts the arguments.
    ///
    /// # Errors
    ///
    /// See [`EvaluationError`] for the possible errors.
    pub fn call(
        &self,
        name: &str,
        type_arguments: Vec<TypeExpr>,
        arguments: Vec<Value>,
    ) -> Result<Value, EvaluationError> {
        let types = arguments.iter().map(Value::r#type).collect::<Vec<_>>();
        let selection = self.scope.resolve(
            &Callee::new(name.to_owned(), type_arguments, None),
            Some(&types),
            &Instantiation::default(),
        )?;

        self.invoke(selection, arguments, 0)
    }

    /// Evaluates a closed expression.
    ///
    /// # Errors
    ///
    /// See [`EvaluationError`] for the possible errors.
    pub fn evaluate(&self, expression: &Expr) -> Result<Value, EvaluationError> {
        self.evaluate_in(expression, &Frame::default(), 0)
    }

    fn enter(&self, depth: usize) -> Result<usize, EvaluationError> {
        if depth >= self.max_depth {
            return Err(CallDepthExceeded { max_depth: self.max_depth }.into());
        }

        Ok(depth + 1)
    }

    fn invoke(
        &self,
        selection: Selection,
        arguments: Vec<Value>,
        depth: usize,
    ) -> Result<Value, EvaluationError> {
        let depth = self.enter(depth)?;
        let function = self.scope.function(selection.id);

        log::trace!(
            "calling `{}` with ({})",
            function.signature().describe(function.name()),
            arguments.iter().format(", ")
        );

        match function.body() {
            Body::Expression(body) => {
                let locals = function
                    .signature()
                    .parameters
                    .iter()
                    .map(|parameter| parameter.name.clone())
                    .zip(arguments)
                    .collect();

                self.evaluate_in(
                    body,
                    &Frame { locals, instantiation: selection.instantiation },
                    depth,
                )
            }
            Body::Builtin(builtin) => builtin.run(
                &selection.instantiation,
                arguments,
                &mut |closure, arguments| self.apply(closure, arguments, depth),
            ),
        }
    }

    fn apply(
        &self,
        closure: &Closure,
        arguments: Vec<Value>,
        depth: usize,
    ) -> Result<Value, EvaluationError> {
        match closure {
            Closure::Function { id, instantiation, .. } => self.invoke(
                Selection::new(*id, instantiation.clone()),
                arguments,
                depth,
            ),
            Closure::Lambda { lambda, captures, instantiation } => {
                let depth = self.enter(depth)?;

                if lambda.parameters.len() != arguments.len() {
                    return Err(InvalidArguments {
                        function: "<lambda>".to_owned(),
                        reason: format!(
                            "expected {} argument(s) but got {}",
                            lambda.parameters.len(),
                            arguments.len()
                        ),
                    }
                    .into());
                }

                let mut locals = captures.clone();
                locals.extend(
                    lambda
                        .parameters
                        .iter()
                        .map(|parameter| parameter.name.clone())
                        .zip(arguments),
                );

                self.evaluate_in(
                    &lambda.body,
                    &Frame { locals, instantiation: instantiation.clone() },
                    depth,
                )
            }
            Closure::Constant { value, .. } => {
                if arguments.len() == 1 {
                    Ok(value.as_ref().clone())
                } else {
                    Err(InvalidArguments {
                        function: "const".to_owned(),
                        reason: format!(
                            "expected 1 argument but got {}",
                            arguments.len()
                        ),
                    }
                    .into())
                }
            }
        }
    }

    fn evaluate_in(
        &self,
        expression: &Expr,
        frame: &Frame,
        depth: usize,
    ) -> Result<Value, EvaluationError> {
        match expression {
            Expr::Literal(literal) => Ok(match literal {
                Literal::Int(value) => Value::Int(*value),
                Literal::String(value) => Value::String(value.clone()),
                Literal::Bool(value) => Value::Bool(*value),
            }),

            Expr::Local(name) => frame.local(name).cloned().ok_or_else(|| {
                UnknownLocal { name: name.clone() }.into()
            }),

            Expr::Call(call) => {
                let arguments = call
                    .arguments
                    .iter()
                    .map(|argument| self.evaluate_in(argument, frame, depth))
                    .collect::<Result<Vec<_>, _>>()?;

                if frame.is_local(&call.callee) {
                    return match frame.local(&call.callee.name) {
                        Some(Value::Closure(closure)) => {
                            self.apply(closure, arguments, depth)
                        }
                        _ => Err(NotCallable { name: call.callee.name.clone() }
                            .into()),
                    };
                }

                let types =
                    arguments.iter().map(Value::r#type).collect::<Vec<_>>();
                let selection = self.scope.resolve(
                    &frame.callee(&call.callee),
                    Some(&types),
                    &frame.instantiation,
                )?;

                self.invoke(selection, arguments, depth)
            }

            Expr::Function(callee) => {
                if frame.is_local(callee) {
                    if let Some(value) = frame.local(&callee.name) {
                        return Ok(value.clone());
                    }
                }

                let selection = self.scope.resolve(
                    &frame.callee(callee),
                    None,
                    &frame.instantiation,
                )?;
                let signature = self.scope.function(selection.id).signature();
                let r#type = FunctionType::new(
                    signature
                        .parameter_types()
                        .map(|ty| selection.instantiation.apply(ty))
                        .collect(),
                    Box::new(selection.instantiation.apply(&signature.return_type)),
                );

                Ok(Value::Closure(Closure::Function {
                    id: selection.id,
                    instantiation: selection.instantiation,
                    r#type,
                }))
            }

            Expr::Lambda(lambda) => Ok(Value::Closure(Closure::Lambda {
                lambda: lambda.clone(),
                captures: frame.locals.clone(),
                instantiation: frame.instantiation.clone(),
            })),

            Expr::Sequence(sequence) => Ok(Value::Sequence {
                element: frame.instantiation.apply(&sequence.element),
                items: sequence
                    .items
                    .iter()
                    .map(|item| self.evaluate_in(item, frame, depth))
                    .collect::<Result<_, _>>()?,
            }),
        }
    }
}
