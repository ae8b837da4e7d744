//! Contains the definition of [`MarkerTable`] and the resolution of
//! predicates against the stored markers.

use std::{collections::HashMap, sync::Arc};

use kindred_term::{
    constructor::Constructor,
    instantiation::Instantiation,
    matching::{self, Order},
    predicate::Predicate,
    TypeExpr,
};

use crate::{
    constraint::Constraint,
    diagnostic::{AmbiguousMarker, OverflowError, QueryError},
    Marker,
};

/// The default limit of nested where-clause proofs.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// The marker that proves a predicate together with the instantiation of the
/// marker's generic parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// The resolved marker.
    pub marker: Arc<Marker>,

    /// The deduced types of the marker's generic parameters.
    pub instantiation: Instantiation,
}

/// Stores the markers of the completed instantiations, grouped by typeclass.
#[derive(Debug, Clone)]
pub struct MarkerTable {
    markers: HashMap<String, Vec<Arc<Marker>>>,
    max_depth: usize,
}

impl Default for MarkerTable {
    fn default() -> Self {
        Self { markers: HashMap::new(), max_depth: DEFAULT_MAX_DEPTH }
    }
}

fn templates(constructors: &[Constructor]) -> Vec<TypeExpr> {
    constructors.iter().map(|constructor| constructor.template().clone()).collect()
}

fn arities_match(lhs: &[Constructor], rhs: &[Constructor]) -> bool {
    lhs.len() == rhs.len()
        && lhs.iter().zip(rhs).all(|(lhs, rhs)| lhs.arity() == rhs.arity())
}

fn compare(lhs: &Marker, rhs: &Marker) -> Order {
    matching::order(
        &templates(&lhs.subject),
        &lhs.variables(),
        &templates(&rhs.subject),
        &rhs.variables(),
    )
}

impl MarkerTable {
    /// Creates an empty table with the default depth limit.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Sets the limit of nested where-clause proofs.
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Stores the marker.
    ///
    /// Returns `false` and leaves the table unchanged if a marker of the same
    /// typeclass with the same subject (up to renaming) is already stored.
    pub fn insert(&mut self, marker: Marker) -> bool {
        let markers = self.markers.entry(marker.typeclass.clone()).or_default();

        if markers.iter().any(|existing| {
            arities_match(&existing.subject, &marker.subject)
                && compare(existing, &marker) == Order::Ambiguous
        }) {
            return false;
        }

        log::debug!("added {marker}");
        markers.push(Arc::new(marker));

        true
    }

    /// Returns `true` if [`Self::insert`] would reject the marker.
    #[must_use]
    pub fn contains(&self, marker: &Marker) -> bool {
        self.markers(&marker.typeclass).any(|existing| {
            arities_match(&existing.subject, &marker.subject)
                && compare(existing, marker) == Order::Ambiguous
        })
    }

    /// Iterates over the markers of the given typeclass in insertion order.
    pub fn markers<'a>(
        &'a self,
        typeclass: &str,
    ) -> impl Iterator<Item = &'a Arc<Marker>> + 'a {
        self.markers.get(typeclass).into_iter().flatten()
    }

    /// Iterates over every stored marker.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Marker>> {
        self.markers.values().flatten()
    }

    /// Finds the most specific marker proving the predicate.
    ///
    /// A marker proves the predicate if its subject matches the predicate's
    /// arguments, binding the marker's generic parameters, and every
    /// predicate of its where-clause is proven in turn.
    ///
    /// # Errors
    ///
    /// See [`QueryError`] for the possible errors.
    pub fn resolve(
        &self,
        predicate: &Predicate,
    ) -> Result<Option<Resolution>, QueryError> {
        self.resolve_with_depth(predicate, 0)
    }

    fn resolve_with_depth(
        &self,
        predicate: &Predicate,
        depth: usize,
    ) -> Result<Option<Resolution>, QueryError> {
        if depth > self.max_depth {
            return Err(OverflowError {
                predicate: predicate.clone(),
                max_depth: self.max_depth,
            }
            .into());
        }

        let arguments = templates(&predicate.arguments);
        let mut candidate: Option<Resolution> = None;

        for marker in self.markers(&predicate.typeclass) {
            if !arities_match(&marker.subject, &predicate.arguments) {
                continue;
            }

            let mut instantiation = Instantiation::default();

            if !matching::deduce_all(
                &templates(&marker.subject),
                &arguments,
                &marker.variables(),
                &mut instantiation,
            ) {
                continue;
            }

            if !self.where_clause_holds(marker, &instantiation, depth)? {
                continue;
            }

            match &mut candidate {
                Some(current) => match compare(marker, &current.marker) {
                    Order::MoreGeneral => {}
                    Order::MoreSpecific => {
                        *current = Resolution {
                            marker: marker.clone(),
                            instantiation,
                        };
                    }
                    Order::Ambiguous | Order::Incompatible => {
                        return Err(AmbiguousMarker {
                            predicate: predicate.clone(),
                        }
                        .into());
                    }
                },
                None => {
                    candidate = Some(Resolution {
                        marker: marker.clone(),
                        instantiation,
                    });
                }
            }
        }

        log::trace!(
            "resolved `{predicate}` to {}",
            candidate
                .as_ref()
                .map_or_else(|| "nothing".to_owned(), |x| x.marker.to_string())
        );

        Ok(candidate)
    }

    fn where_clause_holds(
        &self,
        marker: &Marker,
        instantiation: &Instantiation,
        depth: usize,
    ) -> Result<bool, QueryError> {
        for predicate in &marker.where_clause {
            let predicate = instantiation.apply(predicate);

            if self.resolve_with_depth(&predicate, depth + 1)?.is_none() {
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// Returns `true` if some marker proves the predicate.
    ///
    /// # Errors
    ///
    /// See [`QueryError`] for the possible errors.
    pub fn satisfies(&self, predicate: &Predicate) -> Result<bool, QueryError> {
        self.resolve(predicate).map(|resolution| resolution.is_some())
    }

    /// Evaluates the structural constraint. A negated constraint holds when
    /// its operand cannot be proven.
    ///
    /// # Errors
    ///
    /// See [`QueryError`] for the possible errors.
    pub fn holds(&self, constraint: &Constraint) -> Result<bool, QueryError> {
        match constraint {
            Constraint::Satisfies(predicate) => self.satisfies(predicate),
            Constraint::All(constraints) => {
                for constraint in constraints {
                    if !self.holds(constraint)? {
                        return Ok(false);
                    }
                }

                Ok(true)
            }
            Constraint::Any(constraints) => {
                for constraint in constraints {
                    if self.holds(constraint)? {
                        return Ok(true);
                    }
                }

                Ok(false)
            }
            Constraint::Not(constraint) => Ok(!self.holds(constraint)?),
        }
    }

    /// Returns the number of stored markers.
    #[must_use]
    pub fn len(&self) -> usize { self.markers.values().map(Vec::len).sum() }

    /// Returns `true` if no marker is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.len() == 0 }
}
