//! Contains the definition of [`Constraint`].

use std::fmt;

use enum_as_inner::EnumAsInner;
use itertools::Itertools;
use kindred_term::predicate::Predicate;
use serde::{Deserialize, Serialize};

/// A structural constraint built from typeclass membership tests.
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
pub enum Constraint {
    /// The predicate's arguments satisfy its typeclass.
    Satisfies(Predicate),

    /// Every constraint holds. Holds when empty.
    All(Vec<Constraint>),

    /// At least one constraint holds. Does not hold when empty.
    Any(Vec<Constraint>),

    /// The constraint cannot be proven.
    Not(Box<Constraint>),
}

impl Constraint {
    /// Creates the conjunction of two constraints.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        match self {
            Self::All(mut constraints) => {
                constraints.push(other);
                Self::All(constraints)
            }
            this => Self::All(vec![this, other]),
        }
    }

    /// Creates the disjunction of two constraints.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        match self {
            Self::Any(mut constraints) => {
                constraints.push(other);
                Self::Any(constraints)
            }
            this => Self::Any(vec![this, other]),
        }
    }

    /// Creates the negation of the constraint.
    #[must_use]
    pub fn negate(self) -> Self { Self::Not(Box::new(self)) }
}

impl From<Predicate> for Constraint {
    fn from(value: Predicate) -> Self { Self::Satisfies(value) }
}

#[derive(Debug)]
struct Operand<'a>(&'a Constraint);

impl fmt::Display for Operand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Constraint::All(constraints) | Constraint::Any(constraints)
                if constraints.len() > 1 =>
            {
                write!(f, "({})", self.0)
            }
            constraint => write!(f, "{constraint}"),
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Satisfies(predicate) => write!(f, "{predicate}"),
            Self::All(constraints) if constraints.is_empty() => {
                f.write_str("true")
            }
            Self::Any(constraints) if constraints.is_empty() => {
                f.write_str("false")
            }
            Self::All(constraints) => {
                write!(f, "{}", constraints.iter().map(Operand).format(" & "))
            }
            Self::Any(constraints) => {
                write!(f, "{}", constraints.iter().map(Operand).format(" | "))
            }
            Self::Not(constraint) => write!(f, "!{}", Operand(constraint)),
        }
    }
}
