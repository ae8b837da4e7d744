//! Contains the definition of the [`Registry`] of typeclass templates.
//!
//! The registry is written once per typeclass by [`Registry::declare`] and read
//! by every later instantiation. Registered templates are immutable and shared
//! through [`Arc`]s.

use std::{
    collections::{hash_map::Entry, BTreeSet, HashMap},
    sync::Arc,
};

use kindred_term::{
    visitor::{Element, PlaceholderCollector},
    Placeholder,
};

pub mod diagnostic;
pub mod options;
pub mod template;


use diagnostic::{
    DeclareError, DuplicateMember, DuplicatePlaceholder, DuplicateTypeclass,
    InconsistentArity, UnboundPlaceholder, UnknownTypeclass,
};
use template::{MemberTemplate, TypeclassDeclaration, TypeclassTemplate};

/// Stores the declared typeclass templates by name.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    typeclasses: HashMap<String, Arc<TypeclassTemplate>>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Validates and registers a typeclass declaration.
    ///
    /// # Errors
    ///
    /// See [`DeclareError`] for the possible errors. On error nothing is
    /// registered.
    pub fn declare(
        &mut self,
        declaration: TypeclassDeclaration,
    ) -> Result<Arc<TypeclassTemplate>, DeclareError> {
        let entry = match self.typeclasses.entry(declaration.name.clone()) {
            Entry::Occupied(_) => {
                return Err(DuplicateTypeclass {
                    typeclass: declaration.name,
                }
                .into())
            }
            Entry::Vacant(entry) => entry,
        };

        validate(&declaration)?;

        log::debug!(
            "declared typeclass `{}` with {} placeholder(s) and {} member(s)",
            declaration.name,
            declaration.placeholders.len(),
            declaration.members.len()
        );

        let template =
            Arc::new(TypeclassTemplate::from_declaration(declaration));
        entry.insert(template.clone());

        Ok(template)
    }

    /// Retrieves the template of the typeclass with the given name.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownTypeclass`] if no such typeclass is declared.
    pub fn lookup(
        &self,
        name: &str,
    ) -> Result<Arc<TypeclassTemplate>, UnknownTypeclass> {
        self.typeclasses
            .get(name)
            .cloned()
            .ok_or_else(|| UnknownTypeclass { typeclass: name.to_owned() })
    }

    /// Returns `true` if a typeclass with the given name is declared.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.typeclasses.contains_key(name)
    }

    /// Iterates over the declared typeclasses in no particular order.
    pub fn typeclasses(&self) -> impl Iterator<Item = &Arc<TypeclassTemplate>> {
        self.typeclasses.values()
    }

    /// Returns the number of declared typeclasses.
    #[must_use]
    pub fn len(&self) -> usize { self.typeclasses.len() }

    /// Returns `true` if no typeclass is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.typeclasses.is_empty() }
}

fn validate(declaration: &TypeclassDeclaration) -> Result<(), DeclareError> {
    let mut placeholders = HashMap::<&str, &Placeholder>::new();

    for placeholder in &declaration.placeholders {
        if placeholders.insert(&placeholder.name, placeholder).is_some() {
            return Err(DuplicatePlaceholder {
                typeclass: declaration.name.clone(),
                placeholder: placeholder.name.clone(),
            }
            .into());
        }
    }

    let mut members = BTreeSet::new();

    for member in &declaration.members {
        if !members.insert(member.name()) {
            return Err(DuplicateMember {
                typeclass: declaration.name.clone(),
                member: member.name().to_owned(),
            }
            .into());
        }

        check_occurrences(declaration, &placeholders, member)?;
    }

    Ok(())
}

fn check_occurrences(
    declaration: &TypeclassDeclaration,
    placeholders: &HashMap<&str, &Placeholder>,
    member: &MemberTemplate,
) -> Result<(), DeclareError> {
    let mut collector = PlaceholderCollector::default();
    member.accept(&mut collector);

    for (name, found) in collector.placeholders {
        let Some(placeholder) = placeholders.get(name.as_str()) else {
            return Err(UnboundPlaceholder {
                typeclass: declaration.name.clone(),
                member: member.name().to_owned(),
                placeholder: name,
            }
            .into());
        };

        if placeholder.arity != found {
            return Err(InconsistentArity {
                typeclass: declaration.name.clone(),
                member: member.name().to_owned(),
                placeholder: name,
                declared: placeholder.arity,
                found,
            }
            .into());
        }
    }

    Ok(())
}
