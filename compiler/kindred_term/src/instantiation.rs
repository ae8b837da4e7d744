//! Contains the code related to replacing type variables in terms.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    visitor::{Element, MutableVisitor},
    TypeExpr, Variable,
};

/// Maps type variables to the types they stand for.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize,
    Deserialize,
)]
pub struct Instantiation {
    /// The type each variable is replaced with.
    pub types: BTreeMap<Variable, TypeExpr>,
}

impl Instantiation {
    /// Creates an instantiation replacing each variable by another variable.
    #[must_use]
    pub fn from_renaming(renaming: &BTreeMap<Variable, Variable>) -> Self {
        Self {
            types: renaming
                .iter()
                .map(|(from, to)| {
                    (from.clone(), TypeExpr::Variable(to.clone()))
                })
                .collect(),
        }
    }

    /// Returns the type the variable is replaced with.
    #[must_use]
    pub fn get(&self, variable: &Variable) -> Option<&TypeExpr> {
        self.types.get(variable)
    }

    /// Returns a copy of the term with this instantiation applied.
    #[must_use]
    pub fn apply<T: Element + Clone>(&self, term: &T) -> T {
        let mut term = term.clone();
        instantiate(&mut term, self);
        term
    }
}

#[derive(Debug)]
struct Instantiater<'a> {
    instantiation: &'a Instantiation,
}

impl MutableVisitor for Instantiater<'_> {
    fn visit(&mut self, ty: &mut TypeExpr) -> bool {
        let TypeExpr::Variable(variable) = ty else {
            return true;
        };

        if let Some(replacement) = self.instantiation.types.get(variable) {
            *ty = replacement.clone();
        }

        false
    }
}

/// Applies the given instantiation to the term. Every variable is replaced at
/// once; the replacements themselves are not instantiated again.
pub fn instantiate<T: Element + ?Sized>(
    term: &mut T,
    instantiation: &Instantiation,
) {
    if instantiation.types.is_empty() {
        return;
    }

    term.accept_mut(&mut Instantiater { instantiation });
}
