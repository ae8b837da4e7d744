//! Contains the definition of function [`Signature`]s and [`Declaration`]s.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

use derive_new::new;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    expression::Expr,
    instantiation::Instantiation,
    matching,
    predicate::Predicate,
    visitor::{Element, VariableCollector},
    FunctionType, TypeExpr, Variable,
};

/// A named, typed function parameter.
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
pub struct Parameter {
    /// The name of the parameter.
    pub name: String,

    /// The type of the parameter.
    pub r#type: TypeExpr,
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.r#type)
    }
}

/// The signature of a function: its generic parameters, parameters, return
/// type and the predicates its generic parameters must satisfy.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    new,
)]
pub struct Signature {
    /// The type variables the function is generic over.
    pub generic_parameters: Vec<Variable>,

    /// The parameters of the function.
    pub parameters: Vec<Parameter>,

    /// The return type of the function.
    pub return_type: TypeExpr,

    /// The predicates that must hold for the function to be callable.
    pub where_clause: Vec<Predicate>,
}

impl Signature {
    /// Creates a non-generic signature without a where-clause.
    #[must_use]
    pub const fn monomorphic(
        parameters: Vec<Parameter>,
        return_type: TypeExpr,
    ) -> Self {
        Self {
            generic_parameters: Vec::new(),
            parameters,
            return_type,
            where_clause: Vec::new(),
        }
    }

    /// Returns the types of the parameters in order.
    pub fn parameter_types(&self) -> impl Iterator<Item = &TypeExpr> {
        self.parameters.iter().map(|parameter| &parameter.r#type)
    }

    /// Returns the type of the function as a value.
    #[must_use]
    pub fn function_type(&self) -> FunctionType {
        FunctionType::new(
            self.parameter_types().cloned().collect(),
            Box::new(self.return_type.clone()),
        )
    }

    /// Checks whether two signatures are equal up to a renaming of their
    /// generic parameters, comparing the parameter types and the return type.
    ///
    /// Parameter names and where-clauses take no part in the comparison.
    ///
    /// # Returns
    ///
    /// The renaming from the generic parameters of `self` to the generic
    /// parameters of `other`, or `None` if the signatures differ.
    #[must_use]
    pub fn alpha_equivalent(
        &self,
        other: &Self,
    ) -> Option<BTreeMap<Variable, Variable>> {
        if self.generic_parameters.len() != other.generic_parameters.len()
            || self.parameters.len() != other.parameters.len()
        {
            return None;
        }

        let variables =
            self.generic_parameters.iter().cloned().collect::<BTreeSet<_>>();
        let mut instantiation = Instantiation::default();

        let matched = self
            .parameter_types()
            .zip(other.parameter_types())
            .chain(std::iter::once((&self.return_type, &other.return_type)))
            .all(|(pattern, target)| {
                matching::deduce(pattern, target, &variables, &mut instantiation)
            });

        if !matched {
            return None;
        }

        let targets =
            other.generic_parameters.iter().collect::<BTreeSet<_>>();
        let mut renaming = BTreeMap::new();
        let mut used = BTreeSet::new();

        for (variable, ty) in instantiation.types {
            let TypeExpr::Variable(target) = ty else {
                return None;
            };

            if !targets.contains(&target) || !used.insert(target.clone()) {
                return None;
            }

            renaming.insert(variable, target);
        }

        // a generic parameter of `other` may only be matched by a generic
        // parameter of `self`
        let mut mentioned = VariableCollector::default();
        other.parameters.accept(&mut mentioned);
        other.return_type.accept(&mut mentioned);

        if mentioned
            .variables
            .iter()
            .any(|variable| targets.contains(variable) && !used.contains(variable))
        {
            return None;
        }

        let mut unused = other
            .generic_parameters
            .iter()
            .filter(|variable| !used.contains(*variable));

        for variable in &self.generic_parameters {
            if !renaming.contains_key(variable) {
                renaming.insert(variable.clone(), unused.next()?.clone());
            }
        }

        Some(renaming)
    }

    /// Renders the signature preceded by the given function name.
    #[must_use]
    pub fn describe(&self, name: &str) -> String { format!("{name}{self}") }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.generic_parameters.is_empty() {
            write!(f, "[{}]", self.generic_parameters.iter().format(", "))?;
        }

        write!(
            f,
            "({}): {}",
            self.parameters.iter().format(", "),
            self.return_type
        )?;

        if !self.where_clause.is_empty() {
            write!(f, " where {}", self.where_clause.iter().format(", "))?;
        }

        Ok(())
    }
}

/// A function declaration with a body.
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
pub struct Declaration {
    /// The name of the function.
    pub name: String,

    /// The signature of the function.
    pub signature: Signature,

    /// The body of the function.
    pub body: Expr,
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{} = {}", self.name, self.signature, self.body)
    }
}
