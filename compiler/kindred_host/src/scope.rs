//! Contains the [`Scope`], the set of functions and markers visible to
//! calls.

use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    sync::Arc,
};

use derive_new::new;
use enum_as_inner::EnumAsInner;
use getset::Getters;
use kindred_instance::{Environment, Instance, Visibility};
use kindred_marker::{diagnostic::QueryError, Constraint, MarkerTable};
use kindred_term::{
    declaration::{Declaration, Signature},
    expression::{Callee, Expr},
    instantiation::Instantiation,
    matching::{self, Order},
    predicate::Predicate,
    TypeExpr, Variable,
};
use serde::{Deserialize, Serialize};

use crate::{
    builtin::Builtin,
    diagnostic::{
        AmbiguousOverload, CannotInfer, NoMatchingOverload,
        NoMatchingSignature, Redefinition, ResolutionError,
    },
};

/// Identifies a function defined in a [`Scope`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[display(fmt = "#{}", _0)]
pub struct FunctionId(usize);

/// What a function evaluates when called.
#[derive(Debug, Clone, PartialEq, Eq, EnumAsInner)]
pub enum Body {
    /// The expression of a declared or generated function.
    Expression(Expr),

    /// A function implemented by the host.
    Builtin(Builtin),
}

/// Where a function comes from.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, EnumAsInner,
)]
pub enum Origin {
    /// Defined directly by the user.
    Defined,

    /// Generated by an instantiation of the typeclass.
    Generated(String),

    /// Provided by the host.
    Builtin,
}

/// A function visible in a [`Scope`].
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
#[get = "pub"]
pub struct Function {
    /// The name of the function.
    name: String,

    /// The signature of the function.
    signature: Signature,

    /// The body of the function.
    body: Body,

    /// Whether the function is visible outside the scope.
    visibility: Visibility,

    /// Where the function comes from.
    origin: Origin,
}

/// The overload a reference resolved to.
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct Selection {
    /// The selected function.
    pub id: FunctionId,

    /// The types of the function's generic parameters.
    pub instantiation: Instantiation,
}

/// A candidate overload surviving deduction.
#[derive(Debug)]
struct Candidate {
    id: FunctionId,
    instantiation: Instantiation,
    undetermined: Option<Variable>,
}

/// The functions and markers visible to calls.
///
/// Overloads share a name and differ in their signatures. Two functions with
/// the same name whose signatures are equal up to generic renaming cannot
/// coexist.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    functions: Vec<Arc<Function>>,
    overloads: HashMap<String, Vec<FunctionId>>,
    markers: MarkerTable,
}

impl Scope {
    /// Creates an empty scope.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Creates a scope containing every [`Builtin`].
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut scope = Self::new();

        for builtin in Builtin::ALL {
            scope.push(Function {
                name: builtin.name().to_owned(),
                signature: builtin.signature(),
                body: Body::Builtin(builtin),
                visibility: Visibility::Exported,
                origin: Origin::Builtin,
            });
        }

        scope
    }

    /// Sets the limit of nested where-clause proofs.
    #[must_use]
    pub fn with_max_query_depth(mut self, max_depth: usize) -> Self {
        self.markers = std::mem::take(&mut self.markers).with_max_depth(max_depth);
        self
    }

    /// Returns the markers of the committed instances.
    #[must_use]
    pub const fn markers(&self) -> &MarkerTable { &self.markers }

    /// Returns the function with the given id.
    ///
    /// # Panics
    ///
    /// Panics if the id was not handed out by this scope.
    #[must_use]
    pub fn function(&self, id: FunctionId) -> &Arc<Function> {
        &self.functions[id.0]
    }

    /// Iterates over the overloads with the given name in definition order.
    pub fn overloads<'a>(
        &'a self,
        name: &str,
    ) -> impl Iterator<Item = FunctionId> + 'a {
        self.overloads.get(name).into_iter().flatten().copied()
    }

    /// Iterates over every function in definition order.
    pub fn functions(&self) -> impl Iterator<Item = (FunctionId, &Arc<Function>)> {
        self.functions
            .iter()
            .enumerate()
            .map(|(index, function)| (FunctionId(index), function))
    }

    /// Iterates over the exported functions that are not builtins.
    pub fn exported(&self) -> impl Iterator<Item = &Arc<Function>> {
        self.functions.iter().filter(|function| {
            function.visibility == Visibility::Exported
                && function.origin != Origin::Builtin
        })
    }

    fn conflict(&self, name: &str, signature: &Signature) -> Option<&Signature> {
        self.overloads(name)
            .map(|id| &self.function(id).signature)
            .find(|existing| existing.alpha_equivalent(signature).is_some())
    }

    fn push(&mut self, function: Function) -> FunctionId {
        let id = FunctionId(self.functions.len());

        log::debug!(
            "defined {id} `{}`",
            function.signature.describe(&function.name)
        );

        self.overloads.entry(function.name.clone()).or_default().push(id);
        self.functions.push(Arc::new(function));

        id
    }

    /// Defines an exported function.
    ///
    /// # Errors
    ///
    /// Returns [`Redefinition`] if an overload with an equivalent signature
    /// is already defined.
    pub fn define(
        &mut self,
        declaration: Declaration,
    ) -> Result<FunctionId, Redefinition> {
        if let Some(existing) =
            self.conflict(&declaration.name, &declaration.signature)
        {
            return Err(Redefinition {
                name: declaration.name,
                signature: declaration.signature,
                existing: existing.clone(),
            });
        }

        Ok(self.push(Function {
            name: declaration.name,
            signature: declaration.signature,
            body: Body::Expression(declaration.body),
            visibility: Visibility::Exported,
            origin: Origin::Defined,
        }))
    }

    /// Adds the generated members and the markers of an instance.
    ///
    /// Either every member is added or, if one of them conflicts with an
    /// existing function or with another member, nothing is.
    ///
    /// # Errors
    ///
    /// Returns [`Redefinition`] for the first conflicting member.
    pub fn commit(
        &mut self,
        instance: Instance,
    ) -> Result<Vec<FunctionId>, Redefinition> {
        for (index, member) in instance.members.iter().enumerate() {
            let declaration = &member.declaration;
            let earlier = instance.members[..index].iter().find(|earlier| {
                earlier.declaration.name == declaration.name
                    && earlier
                        .declaration
                        .signature
                        .alpha_equivalent(&declaration.signature)
                        .is_some()
            });

            let existing = self
                .conflict(&declaration.name, &declaration.signature)
                .or_else(|| earlier.map(|x| &x.declaration.signature));

            if let Some(existing) = existing {
                return Err(Redefinition {
                    name: declaration.name.clone(),
                    signature: declaration.signature.clone(),
                    existing: existing.clone(),
                });
            }
        }

        let ids = instance
            .members
            .into_iter()
            .map(|member| {
                self.push(Function {
                    name: member.declaration.name,
                    signature: member.declaration.signature,
                    body: Body::Expression(member.declaration.body),
                    visibility: member.visibility,
                    origin: Origin::Generated(member.typeclass),
                })
            })
            .collect();

        for marker in instance.markers {
            if self.markers.contains(&marker) {
                log::debug!("kept the earlier marker equal to `{marker}`");
            } else {
                self.markers.insert(marker);
            }
        }

        Ok(ids)
    }

    /// Returns `true` if the committed instances prove the predicate.
    ///
    /// # Errors
    ///
    /// See [`QueryError`] for the possible errors.
    pub fn satisfies(&self, predicate: &Predicate) -> Result<bool, QueryError> {
        self.markers.satisfies(predicate)
    }

    /// Returns `true` if the committed instances prove the constraint.
    ///
    /// # Errors
    ///
    /// See [`QueryError`] for the possible errors.
    pub fn holds(&self, constraint: &Constraint) -> Result<bool, QueryError> {
        self.markers.holds(constraint)
    }

    /// Selects the overload a reference denotes.
    ///
    /// A pinned reference selects the overload whose signature is equal to
    /// the pinned one up to generic renaming. Otherwise every overload whose
    /// parameters match `arguments` (or every overload at all, for a
    /// reference without arguments) is a candidate and the most specific one
    /// is selected.
    ///
    /// Generic parameters are deduced from the argument types and the
    /// explicit type arguments. Those still undetermined take the type
    /// `context` assigns to the same variable, which lets generated members
    /// refer to siblings that only differ in their return type. The
    /// where-clause of a candidate must be proven by the markers.
    ///
    /// # Errors
    ///
    /// See [`ResolutionError`] for the possible errors.
    pub fn resolve(
        &self,
        callee: &Callee,
        arguments: Option<&[TypeExpr]>,
        context: &Instantiation,
    ) -> Result<Selection, ResolutionError> {
        let selection = match &callee.pinned {
            Some(pinned) => {
                self.resolve_pinned(callee, pinned, arguments, context)?
            }
            None => self.resolve_overload(callee, arguments, context)?,
        };

        log::trace!(
            "resolved `{callee}` to {} with {:?}",
            selection.id,
            selection.instantiation.types
        );

        Ok(selection)
    }

    fn resolve_pinned(
        &self,
        callee: &Callee,
        pinned: &Signature,
        arguments: Option<&[TypeExpr]>,
        context: &Instantiation,
    ) -> Result<Selection, ResolutionError> {
        let no_match = || NoMatchingSignature {
            name: callee.name.clone(),
            signature: pinned.clone(),
        };

        let (id, renaming) = self
            .overloads(&callee.name)
            .find_map(|id| {
                pinned
                    .alpha_equivalent(&self.function(id).signature)
                    .map(|renaming| (id, renaming))
            })
            .ok_or_else(no_match)?;

        if !callee.type_arguments.is_empty()
            && callee.type_arguments.len() != pinned.generic_parameters.len()
        {
            return Err(no_match().into());
        }

        // explicit type arguments follow the order of the pinned generics
        let mut seed = Instantiation::default();
        for (variable, ty) in
            pinned.generic_parameters.iter().zip(&callee.type_arguments)
        {
            if let Some(declared) = renaming.get(variable) {
                seed.types.insert(declared.clone(), ty.clone());
            }
        }

        let inverse = renaming
            .iter()
            .map(|(pinned, declared)| (declared.clone(), pinned.clone()))
            .collect::<BTreeMap<_, _>>();

        let candidate = self
            .candidate(id, seed, arguments, |declared| {
                inverse.get(declared).and_then(|pinned| context.get(pinned))
            })?
            .ok_or_else(no_match)?;

        Self::select(&callee.name, candidate)
    }

    fn resolve_overload(
        &self,
        callee: &Callee,
        arguments: Option<&[TypeExpr]>,
        context: &Instantiation,
    ) -> Result<Selection, ResolutionError> {
        let mut candidates = Vec::new();

        for id in self.overloads(&callee.name) {
            let signature = &self.function(id).signature;

            if !callee.type_arguments.is_empty()
                && callee.type_arguments.len()
                    != signature.generic_parameters.len()
            {
                continue;
            }

            let seed = Instantiation {
                types: signature
                    .generic_parameters
                    .iter()
                    .cloned()
                    .zip(callee.type_arguments.iter().cloned())
                    .collect(),
            };

            if let Some(candidate) =
                self.candidate(id, seed, arguments, |variable| context.get(variable))?
            {
                candidates.push(candidate);
            }
        }

        let most_specific = candidates.iter().position(|candidate| {
            candidates.iter().all(|other| {
                other.id == candidate.id
                    || (arguments.is_some()
                        && self.compare(candidate.id, other.id)
                            == Order::MoreSpecific)
            })
        });

        match most_specific {
            Some(index) => Self::select(&callee.name, candidates.swap_remove(index)),
            None if candidates.is_empty() => Err(NoMatchingOverload {
                name: callee.name.clone(),
                arguments: arguments.map(<[_]>::to_vec).unwrap_or_default(),
            }
            .into()),
            None => Err(AmbiguousOverload {
                name: callee.name.clone(),
                candidates: candidates
                    .iter()
                    .map(|candidate| self.function(candidate.id).signature.clone())
                    .collect(),
            }
            .into()),
        }
    }

    fn select(
        name: &str,
        candidate: Candidate,
    ) -> Result<Selection, ResolutionError> {
        match candidate.undetermined {
            Some(variable) => {
                Err(CannotInfer { name: name.to_owned(), variable }.into())
            }
            None => Ok(Selection::new(candidate.id, candidate.instantiation)),
        }
    }

    fn compare(&self, lhs: FunctionId, rhs: FunctionId) -> Order {
        let parameters = |id: FunctionId| {
            let signature = &self.function(id).signature;
            (
                signature.parameter_types().cloned().collect::<Vec<_>>(),
                signature.generic_parameters.iter().cloned().collect::<BTreeSet<_>>(),
            )
        };

        let (lhs, lhs_variables) = parameters(lhs);
        let (rhs, rhs_variables) = parameters(rhs);

        matching::order(&lhs, &lhs_variables, &rhs, &rhs_variables)
    }

    /// Deduces the generic parameters of the function from the arguments,
    /// falls back to `context` for the undetermined ones and checks the
    /// where-clause once everything is known.
    ///
    /// Returns `None` if the function does not accept the arguments.
    fn candidate<'c>(
        &self,
        id: FunctionId,
        mut instantiation: Instantiation,
        arguments: Option<&[TypeExpr]>,
        context: impl Fn(&Variable) -> Option<&'c TypeExpr>,
    ) -> Result<Option<Candidate>, ResolutionError> {
        let signature = &self.function(id).signature;
        let variables =
            signature.generic_parameters.iter().cloned().collect::<BTreeSet<_>>();

        if let Some(arguments) = arguments {
            let parameters =
                signature.parameter_types().cloned().collect::<Vec<_>>();

            if parameters.len() != arguments.len()
                || !matching::deduce_all(
                    &parameters,
                    arguments,
                    &variables,
                    &mut instantiation,
                )
            {
                return Ok(None);
            }
        }

        let mut undetermined = None;

        for variable in &signature.generic_parameters {
            if instantiation.types.contains_key(variable) {
                continue;
            }

            match context(variable) {
                Some(ty) => {
                    instantiation.types.insert(variable.clone(), ty.clone());
                }
                None => {
                    undetermined.get_or_insert_with(|| variable.clone());
                }
            }
        }

        if undetermined.is_none() {
            for predicate in &signature.where_clause {
                if !self.markers.satisfies(&instantiation.apply(predicate))? {
                    log::trace!(
                        "`{}` rejected, `{predicate}` does not hold",
                        signature.describe(&self.function(id).name)
                    );
                    return Ok(None);
                }
            }
        }

        Ok(Some(Candidate { id, instantiation, undetermined }))
    }
}

impl Environment for Scope {
    fn find_function(&self, name: &str, signature: &Signature) -> bool {
        self.conflict(name, signature).is_some()
    }
}
