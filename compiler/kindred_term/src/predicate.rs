//! Contains the definition of [`Predicate`].

use std::fmt;

use derive_new::new;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::constructor::Constructor;

/// A typeclass constraint such as `Monoid[string]` or `Functor[Option]`,
/// found in where-clauses and marker queries.
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
pub struct Predicate {
    /// The name of the constrained typeclass.
    pub typeclass: String,

    /// The constructors given for the typeclass placeholders, in
    /// declaration order.
    pub arguments: Vec<Constructor>,
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.typeclass, self.arguments.iter().format(", "))
    }
}
