//! The reference host for generated instances.
//!
//! A [`Scope`](scope::Scope) holds declared, generated and builtin functions
//! together with the markers of committed instances. It answers the required
//! member lookups of the instance generator and resolves overloaded calls;
//! the [`Evaluator`](evaluate::Evaluator) then runs them.

pub mod builtin;
pub mod diagnostic;
pub mod evaluate;
pub mod scope;
pub mod value;

#[cfg(test)]
mod test;

pub use evaluate::Evaluator;
pub use scope::Scope;
pub use value::Value;
