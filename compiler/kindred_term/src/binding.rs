//! Contains the definition of [`Binding`].

use std::{collections::BTreeMap, fmt};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::constructor::Constructor;

/// A mapping from placeholder names to the constructors they are bound to.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize,
    Deserialize,
)]
pub struct Binding {
    constructors: BTreeMap<String, Constructor>,
}

impl Binding {
    /// Creates an empty binding.
    #[must_use]
    pub const fn new() -> Self { Self { constructors: BTreeMap::new() } }

    /// Binds the placeholder to the given constructor, returning the
    /// constructor it was previously bound to.
    pub fn insert(
        &mut self,
        placeholder: impl Into<String>,
        constructor: Constructor,
    ) -> Option<Constructor> {
        self.constructors.insert(placeholder.into(), constructor)
    }

    /// Builder-style version of [`Self::insert`].
    #[must_use]
    pub fn with(
        mut self,
        placeholder: impl Into<String>,
        constructor: Constructor,
    ) -> Self {
        self.insert(placeholder, constructor);
        self
    }

    /// Returns the constructor bound to the placeholder.
    #[must_use]
    pub fn get(&self, placeholder: &str) -> Option<&Constructor> {
        self.constructors.get(placeholder)
    }

    /// Removes the placeholder from the binding.
    pub fn remove(&mut self, placeholder: &str) -> Option<Constructor> {
        self.constructors.remove(placeholder)
    }

    /// Returns `true` if the placeholder is bound.
    #[must_use]
    pub fn contains(&self, placeholder: &str) -> bool {
        self.constructors.contains_key(placeholder)
    }

    /// Iterates over the bound placeholder names in ascending order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }

    /// Iterates over the `(placeholder, constructor)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Constructor)> {
        self.constructors.iter().map(|(name, ctor)| (name.as_str(), ctor))
    }

    /// Returns the number of bound placeholders.
    #[must_use]
    pub fn len(&self) -> usize { self.constructors.len() }

    /// Returns `true` if nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.constructors.is_empty() }
}

impl<S: Into<String>> FromIterator<(S, Constructor)> for Binding {
    fn from_iter<T: IntoIterator<Item = (S, Constructor)>>(iter: T) -> Self {
        Self {
            constructors: iter
                .into_iter()
                .map(|(name, constructor)| (name.into(), constructor))
                .collect(),
        }
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{{}}}",
            self.constructors
                .iter()
                .format_with(", ", |(name, constructor), f| {
                    f(&format_args!("{name} = {constructor}"))
                })
        )
    }
}
