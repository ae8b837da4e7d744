//! The compilation unit tying the typeclass engine together.
//!
//! A [`Unit`] owns the [`Registry`] of typeclass templates and the host
//! [`Scope`]. Typeclasses, definitions and instances are declared through it,
//! either as values or as source text of the declaration language:
//!
//! ```
//! use kindred::{Config, Unit};
//! use kindred_handler::Panic;
//! use kindred_host::Value;
//!
//! let mut unit = Unit::new(Config::default(), &Panic);
//! unit.declare_source(
//!     r#"
//!     typeclass Monoid[A] {
//!         required mempty(): A;
//!         required mappend(a: A, b: A): A;
//!         default mconcat(items: seq[A]): A = fold(mappend, mempty(), items);
//!     }
//!
//!     def mempty(): string = "";
//!     def mappend(a: string, b: string): string = concat(a, b);
//!     instance Monoid[string];
//!     "#,
//! )
//! .unwrap();
//!
//! assert_eq!(
//!     unit.evaluate(r#"mconcat(["a", "b"; string])"#).unwrap(),
//!     Value::string("ab")
//! );
//! ```
//!
//! Every error is reported to the [`Handler`] given at construction as a
//! [`Diagnostic`]; the failing operation then returns [`Abort`] and leaves
//! the unit as it was before the operation.

use std::{fmt, sync::Arc};

use getset::Getters;
use kindred_diagnostic::{Abort, Diagnostic, Report, Span};
use kindred_handler::Handler;
use kindred_host::{scope::FunctionId, Evaluator, Scope, Value};
use kindred_instance::{Generator, InstanceRequest};
use kindred_marker::Constraint;
use kindred_registry::{
    template::{TypeclassDeclaration, TypeclassTemplate},
    Registry,
};
use kindred_syntax::{Item, Parser};
use kindred_term::{declaration::Declaration, TypeExpr};

pub mod config;
pub mod diagnostic;
mod source;

#[cfg(test)]
mod test;

pub use config::Config;
pub use diagnostic::Error;

/// The typeclasses, functions and instances declared so far.
#[derive(Getters)]
pub struct Unit<'h> {
    /// The declared typeclass templates.
    #[get = "pub"]
    registry: Registry,

    /// The defined and generated functions together with the markers of the
    /// committed instances.
    #[get = "pub"]
    scope: Scope,

    /// The limits the unit runs with.
    #[get = "pub"]
    config: Config,

    handler: &'h dyn Handler<Diagnostic>,
}

impl fmt::Debug for Unit<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unit")
            .field("registry", &self.registry)
            .field("scope", &self.scope)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<'h> Unit<'h> {
    /// Creates an empty unit whose scope contains the built-in functions.
    #[must_use]
    pub fn new(config: Config, handler: &'h dyn Handler<Diagnostic>) -> Self {
        Self {
            registry: Registry::new(),
            scope: Scope::with_builtins()
                .with_max_query_depth(config.max_query_depth),
            config,
            handler,
        }
    }

    fn report(&self, error: impl Into<Error>, span: Option<Span>) -> Abort {
        let diagnostic = error.into().report(()).with_fallback_span(span);

        log::debug!("reported: {}", diagnostic.message);
        self.handler.receive(diagnostic);

        Abort
    }

    /// Declares a typeclass.
    ///
    /// # Errors
    ///
    /// Reports the declaration error and returns [`Abort`].
    pub fn declare_typeclass(
        &mut self,
        declaration: TypeclassDeclaration,
    ) -> Result<Arc<TypeclassTemplate>, Abort> {
        self.declare_typeclass_at(declaration, None)
    }

    fn declare_typeclass_at(
        &mut self,
        mut declaration: TypeclassDeclaration,
        span: Option<Span>,
    ) -> Result<Arc<TypeclassTemplate>, Abort> {
        source::normalize_typeclass(&self.registry, &mut declaration);

        self.registry
            .declare(declaration)
            .map_err(|error| self.report(error, span))
    }

    /// Defines a function in the scope.
    ///
    /// # Errors
    ///
    /// Reports a redefinition and returns [`Abort`].
    pub fn define(
        &mut self,
        declaration: Declaration,
    ) -> Result<FunctionId, Abort> {
        self.define_at(declaration, None)
    }

    fn define_at(
        &mut self,
        mut declaration: Declaration,
        span: Option<Span>,
    ) -> Result<FunctionId, Abort> {
        source::normalize_declaration(&self.registry, &mut declaration);

        self.scope
            .define(declaration)
            .map_err(|error| self.report(error, span))
    }

    /// Instantiates a typeclass and commits the generated members and
    /// markers to the scope.
    ///
    /// Returns the identifiers of the generated members in generation order.
    ///
    /// # Errors
    ///
    /// Reports the instantiation error, or the redefinition caused by a
    /// generated member, and returns [`Abort`]. Nothing is committed then.
    pub fn declare_instance(
        &mut self,
        request: &InstanceRequest,
    ) -> Result<Vec<FunctionId>, Abort> {
        self.declare_instance_at(request, None)
    }

    fn declare_instance_at(
        &mut self,
        request: &InstanceRequest,
        span: Option<Span>,
    ) -> Result<Vec<FunctionId>, Abort> {
        let instance = Generator::new(&self.registry, &self.scope)
            .with_max_depth(self.config.max_instantiation_depth)
            .instantiate(request)
            .map_err(|error| self.report(error, span))?;

        match self.scope.commit(instance) {
            Ok(ids) => {
                log::debug!(
                    "committed {} member(s) of `{}`",
                    ids.len(),
                    request.typeclass
                );

                Ok(ids)
            }
            Err(error) => Err(self.report(error, span)),
        }
    }

    /// Parses the source and declares its items in order.
    ///
    /// Stops at the first failing item; the items before it stay declared.
    ///
    /// # Errors
    ///
    /// Reports the syntax error or the error of the failing item and returns
    /// [`Abort`]. Diagnostics without a span of their own point at the item.
    pub fn declare_source(&mut self, source: &str) -> Result<(), Abort> {
        let items = self
            .parse(source, Parser::parse_items)
            .map_err(|error| self.report(error, None))?;

        for item in items {
            let span = Some(item.span());

            match item {
                Item::Typeclass(typeclass) => {
                    self.declare_typeclass_at(typeclass.into_declaration(), span)?;
                }
                Item::Definition(definition) => {
                    self.define_at(definition.into_declaration(), span)?;
                }
                Item::Instance(instance) => {
                    let request =
                        source::instance_request(&self.registry, &instance)
                            .map_err(|error| self.report(error, span))?;

                    self.declare_instance_at(&request, span)?;
                }
            }
        }

        Ok(())
    }

    /// Calls the overload of `name` accepting the arguments.
    ///
    /// # Errors
    ///
    /// Reports the resolution or evaluation error and returns [`Abort`].
    pub fn call(
        &self,
        name: &str,
        type_arguments: Vec<TypeExpr>,
        arguments: Vec<Value>,
    ) -> Result<Value, Abort> {
        self.evaluator()
            .call(name, type_arguments, arguments)
            .map_err(|error| self.report(error, None))
    }

    /// Parses and evaluates a closed expression such as
    /// `mconcat(["a", "b"; string])`.
    ///
    /// # Errors
    ///
    /// Reports the syntax, resolution or evaluation error and returns
    /// [`Abort`].
    pub fn evaluate(&self, source: &str) -> Result<Value, Abort> {
        let expression = self
            .parse(source, Parser::parse_expression)
            .map_err(|error| self.report(error, None))?;

        self.evaluator()
            .evaluate(&expression)
            .map_err(|error| self.report(error, None))
    }

    /// Checks a constraint against the committed instances.
    ///
    /// # Errors
    ///
    /// Reports the query error and returns [`Abort`].
    pub fn holds(&self, constraint: &Constraint) -> Result<bool, Abort> {
        let mut constraint = constraint.clone();
        source::normalize_constraint(&self.registry, &mut constraint);

        self.scope
            .holds(&constraint)
            .map_err(|error| self.report(error, None))
    }

    /// Parses and checks a constraint such as `Monoid[int] & !Show[int]`.
    ///
    /// # Errors
    ///
    /// Reports the syntax or query error and returns [`Abort`].
    pub fn satisfies(&self, source: &str) -> Result<bool, Abort> {
        let constraint = self
            .parse(source, Parser::parse_constraint)
            .map_err(|error| self.report(error, None))?;

        self.holds(&constraint)
    }

    fn parse<T>(
        &self,
        source: &str,
        parse: impl FnOnce(&mut Parser) -> Result<T, kindred_syntax::Error>,
    ) -> Result<T, kindred_syntax::Error> {
        Parser::new(source)?
            .with_max_nesting_depth(self.config.max_nesting_depth)
            .finish(parse)
    }

    const fn evaluator(&self) -> Evaluator<'_> {
        Evaluator::new(&self.scope).with_max_depth(self.config.max_call_depth)
    }
}
