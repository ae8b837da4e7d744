//! Contains the first-order matching used to deduce type variables.

use std::collections::BTreeSet;

use crate::{instantiation::Instantiation, TypeExpr, Variable};

/// Matches `pattern` against `target`, extending `instantiation` so that
/// instantiating `pattern` yields `target`.
///
/// Only the variables in `variables` may be deduced; any other variable must
/// occur identically in both types. A variable already present in the
/// instantiation must map to a type equal to the matched sub-term.
///
/// Returns `false` if the types cannot be matched, in which case the
/// instantiation may have been partially extended.
pub fn deduce(
    pattern: &TypeExpr,
    target: &TypeExpr,
    variables: &BTreeSet<Variable>,
    instantiation: &mut Instantiation,
) -> bool {
    match (pattern, target) {
        (TypeExpr::Variable(variable), target)
            if variables.contains(variable) =>
        {
            match instantiation.types.get(variable) {
                Some(existing) => existing == target,
                None => {
                    instantiation.types.insert(variable.clone(), target.clone());
                    true
                }
            }
        }

        (TypeExpr::Symbol(pattern), TypeExpr::Symbol(target)) => {
            pattern.name == target.name
                && deduce_all(
                    &pattern.arguments,
                    &target.arguments,
                    variables,
                    instantiation,
                )
        }

        (TypeExpr::Placeholder(pattern), TypeExpr::Placeholder(target)) => {
            pattern.name == target.name
                && deduce_all(
                    &pattern.arguments,
                    &target.arguments,
                    variables,
                    instantiation,
                )
        }

        (TypeExpr::Function(pattern), TypeExpr::Function(target)) => {
            deduce_all(
                &pattern.parameters,
                &target.parameters,
                variables,
                instantiation,
            ) && deduce(
                &pattern.return_type,
                &target.return_type,
                variables,
                instantiation,
            )
        }

        (TypeExpr::Tuple(pattern), TypeExpr::Tuple(target)) => deduce_all(
            &pattern.elements,
            &target.elements,
            variables,
            instantiation,
        ),

        (TypeExpr::Variable(pattern), TypeExpr::Variable(target)) => {
            pattern == target
        }

        (TypeExpr::Hole(pattern), TypeExpr::Hole(target)) => pattern == target,

        _ => false,
    }
}

/// Matches the patterns against the targets pairwise. See [`deduce`].
pub fn deduce_all(
    patterns: &[TypeExpr],
    targets: &[TypeExpr],
    variables: &BTreeSet<Variable>,
    instantiation: &mut Instantiation,
) -> bool {
    patterns.len() == targets.len()
        && patterns.iter().zip(targets).all(|(pattern, target)| {
            deduce(pattern, target, variables, instantiation)
        })
}

/// The order of two lists of patterns in terms of specificity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Order {
    /// Neither list matches the other.
    Incompatible,

    /// The left-hand side matches everything the right-hand side matches,
    /// and more.
    MoreGeneral,

    /// The right-hand side matches everything the left-hand side matches,
    /// and more.
    MoreSpecific,

    /// Both lists match each other, i.e. they are equal up to renaming.
    Ambiguous,
}

/// Determines which of the two pattern lists is more specific. Each list may
/// only bind its own variables.
#[must_use]
pub fn order(
    lhs: &[TypeExpr],
    lhs_variables: &BTreeSet<Variable>,
    rhs: &[TypeExpr],
    rhs_variables: &BTreeSet<Variable>,
) -> Order {
    let lhs_matches =
        deduce_all(lhs, rhs, lhs_variables, &mut Instantiation::default());
    let rhs_matches =
        deduce_all(rhs, lhs, rhs_variables, &mut Instantiation::default());

    match (lhs_matches, rhs_matches) {
        (true, true) => Order::Ambiguous,
        (true, false) => Order::MoreGeneral,
        (false, true) => Order::MoreSpecific,
        (false, false) => Order::Incompatible,
    }
}
