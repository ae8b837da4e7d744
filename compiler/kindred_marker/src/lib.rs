//! Contains the synthesis of the "is-instance" markers and the structural
//! queries answered from them.
//!
//! Every successful instantiation of a typeclass leaves behind a [`Marker`]
//! recording the constructors the placeholders were bound to. Generic code
//! can then ask whether some types satisfy the typeclass, combine such
//! questions into [`Constraint`]s, and never needs the instance generator at
//! resolution time.

use std::{collections::BTreeSet, fmt};

use derive_new::new;
use itertools::Itertools;
use kindred_registry::template::TypeclassTemplate;
use kindred_term::{
    binding::Binding, constructor::Constructor, predicate::Predicate,
    Variable,
};
use serde::{Deserialize, Serialize};

pub mod constraint;
pub mod diagnostic;
pub mod table;

#[cfg(test)]
mod test;

pub use constraint::Constraint;
pub use table::{MarkerTable, Resolution};

/// Returns the name of the marker of the given typeclass, e.g. `isMonoid`.
#[must_use]
pub fn marker_name(typeclass: &str) -> String { format!("is{typeclass}") }

/// A zero-effect declaration stating that the subject constructors satisfy
/// a typeclass.
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
pub struct Marker {
    /// The derived name of the marker, see [`marker_name`].
    pub name: String,

    /// The typeclass the marker belongs to.
    pub typeclass: String,

    /// The type variables of a partial instance, empty for a concrete one.
    pub generic_parameters: Vec<Variable>,

    /// The predicates the variables must satisfy for the marker to apply.
    pub where_clause: Vec<Predicate>,

    /// The constructors bound to each placeholder, in declaration order.
    pub subject: Vec<Constructor>,

    /// Whether the marker is visible outside the declaring scope.
    pub exported: bool,
}

impl Marker {
    /// Returns the generic parameters as a set.
    #[must_use]
    pub fn variables(&self) -> BTreeSet<Variable> {
        self.generic_parameters.iter().cloned().collect()
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("marker")?;

        if !self.generic_parameters.is_empty() {
            write!(f, "[{}]", self.generic_parameters.iter().format(", "))?;
        }

        write!(f, " {}[{}]", self.name, self.subject.iter().format(", "))?;

        if !self.where_clause.is_empty() {
            write!(f, " where {}", self.where_clause.iter().format(", "))?;
        }

        Ok(())
    }
}

/// Builds the marker of one instantiation of the given typeclass.
///
/// Returns `None` if the binding misses one of the placeholders.
#[must_use]
pub fn synthesize(
    template: &TypeclassTemplate,
    binding: &Binding,
    generic_parameters: &[Variable],
    where_clause: &[Predicate],
) -> Option<Marker> {
    let subject = template
        .placeholders()
        .iter()
        .map(|placeholder| binding.get(&placeholder.name).cloned())
        .collect::<Option<Vec<_>>>()?;

    Some(Marker {
        name: marker_name(template.name()),
        typeclass: template.name().clone(),
        generic_parameters: generic_parameters.to_vec(),
        where_clause: where_clause.to_vec(),
        subject,
        exported: template.exported(),
    })
}
