//! The declaration language of typeclasses, definitions and instances.
//!
//! ```text
//! export typeclass Monoid[A] {
//!     required mempty(): A;
//!     required mappend(a: A, b: A): A;
//!     default mconcat(items: seq[A]): A = fold(mappend, mempty(), items);
//! }
//!
//! def mempty(): string = "";
//! def mappend(a: string, b: string): string = concat(a, b);
//! instance Monoid[string] exporting(_);
//! ```
//!
//! Comments start with `#` and run to the end of the line.

use kindred_marker::Constraint;
use kindred_registry::options::InstanceOptions;
use kindred_term::{
    constructor::Constructor, expression::Expr, Placeholder, TypeExpr,
};

pub mod error;
pub mod item;
pub mod parser;
pub mod token;

#[cfg(test)]
mod test;

pub use error::Error;
pub use item::Item;
pub use parser::Parser;

/// Parses a type; every name is a concrete symbol.
///
/// # Errors
///
/// Returns the first lexical or syntax error.
pub fn parse_type(source: &str) -> Result<TypeExpr, Error> {
    Parser::new(source)?.finish(Parser::parse_type)
}

/// Parses a constructor such as `int`, `Option[_]` or `Pair[_1, _0]`.
///
/// # Errors
///
/// Returns the first lexical or syntax error.
pub fn parse_constructor(source: &str) -> Result<Constructor, Error> {
    Parser::new(source)?.finish(Parser::parse_constructor)
}

/// Parses a placeholder list such as `[A, F[_]]`.
///
/// # Errors
///
/// Returns the first lexical or syntax error.
pub fn parse_placeholders(source: &str) -> Result<Vec<Placeholder>, Error> {
    Parser::new(source)?.finish(Parser::parse_placeholders)
}

/// Parses instance options such as `skipping(mconcat) exporting(_)`.
///
/// # Errors
///
/// Returns the first lexical or syntax error.
pub fn parse_options(source: &str) -> Result<InstanceOptions, Error> {
    Parser::new(source)?.finish(Parser::parse_options)
}

/// Parses a constraint such as `Monoid[int] & !Functor[seq[_]]`.
///
/// # Errors
///
/// Returns the first lexical or syntax error.
pub fn parse_constraint(source: &str) -> Result<Constraint, Error> {
    Parser::new(source)?.finish(Parser::parse_constraint)
}

/// Parses a closed expression; every name is a function reference.
///
/// # Errors
///
/// Returns the first lexical or syntax error.
pub fn parse_expression(source: &str) -> Result<Expr, Error> {
    Parser::new(source)?.finish(Parser::parse_expression)
}

/// Parses a whole declaration unit.
///
/// # Errors
///
/// Returns the first lexical or syntax error.
pub fn parse_unit(source: &str) -> Result<Vec<Item>, Error> {
    Parser::new(source)?.finish(Parser::parse_items)
}
