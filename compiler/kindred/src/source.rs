//! Lowers parsed items into the inputs of the registry, the generator and the
//! host scope.
//!
//! The parser does not know the arities of the typeclass placeholders, so a
//! constructor written as a bare symbol (`Functor[Option]`) comes out as a
//! plain type. Lowering looks the typeclass up and turns such an argument
//! into the constructor applying the symbol to all of its holes.

use kindred_instance::{
    diagnostic::{BindingMismatch, Error, MismatchKind},
    InstanceRequest,
};
use kindred_marker::Constraint;
use kindred_registry::{
    template::{MemberTemplate, TypeclassDeclaration},
    Registry,
};
use kindred_syntax::item;
use kindred_term::{
    constructor::Constructor, declaration::Declaration, predicate::Predicate,
    Placeholder,
};

/// Rewrites the bare symbols given for constructor placeholders.
fn normalize_arguments(
    placeholders: &[Placeholder],
    arguments: &mut [Constructor],
) {
    for (placeholder, argument) in placeholders.iter().zip(arguments) {
        if placeholder.arity == 0 || argument.arity() != 0 {
            continue;
        }

        let Some(symbol) = argument.template().as_symbol() else {
            continue;
        };

        if symbol.arguments.is_empty() {
            *argument = Constructor::symbol(symbol.name.clone(), placeholder.arity);
        }
    }
}

/// Normalizes the arguments of a predicate whose typeclass is declared.
/// Predicates of unknown typeclasses are left for the queries to reject.
pub(crate) fn normalize_predicate(registry: &Registry, predicate: &mut Predicate) {
    if let Ok(template) = registry.lookup(&predicate.typeclass) {
        normalize_arguments(template.placeholders(), &mut predicate.arguments);
    }
}

pub(crate) fn normalize_where_clause(
    registry: &Registry,
    where_clause: &mut [Predicate],
) {
    for predicate in where_clause {
        normalize_predicate(registry, predicate);
    }
}

pub(crate) fn normalize_constraint(
    registry: &Registry,
    constraint: &mut Constraint,
) {
    match constraint {
        Constraint::Satisfies(predicate) => {
            normalize_predicate(registry, predicate);
        }
        Constraint::All(constraints) | Constraint::Any(constraints) => {
            for constraint in constraints {
                normalize_constraint(registry, constraint);
            }
        }
        Constraint::Not(constraint) => normalize_constraint(registry, constraint),
    }
}

pub(crate) fn normalize_declaration(
    registry: &Registry,
    declaration: &mut Declaration,
) {
    normalize_where_clause(registry, &mut declaration.signature.where_clause);
}

/// Normalizes the where-clauses of the members and the arguments of the
/// nested instances. Nested instances of the typeclass being declared are
/// left alone since its placeholders are not registered yet.
pub(crate) fn normalize_typeclass(
    registry: &Registry,
    declaration: &mut TypeclassDeclaration,
) {
    for member in &mut declaration.members {
        match member {
            MemberTemplate::Required(stub) => {
                normalize_where_clause(registry, &mut stub.signature.where_clause);
            }
            MemberTemplate::Default(default) => {
                normalize_declaration(registry, default);
            }
            MemberTemplate::Instance(nested) => {
                if let Ok(template) = registry.lookup(&nested.typeclass) {
                    normalize_arguments(
                        template.placeholders(),
                        &mut nested.arguments,
                    );
                }
            }
        }
    }
}

/// Binds the positional arguments of an instance item to the placeholders of
/// its typeclass.
///
/// # Errors
///
/// Returns [`Error::UnknownTypeclass`] for an undeclared typeclass and
/// [`Error::BindingMismatch`] when the number of arguments differs from the
/// number of placeholders.
pub(crate) fn instance_request(
    registry: &Registry,
    instance: &item::Instance,
) -> Result<InstanceRequest, Error> {
    let template = registry.lookup(instance.typeclass())?;

    let placeholders = template.placeholders();
    if placeholders.len() != instance.arguments().len() {
        return Err(BindingMismatch {
            typeclass: instance.typeclass().clone(),
            kind: MismatchKind::Count {
                expected: placeholders.len(),
                found: instance.arguments().len(),
            },
        }
        .into());
    }

    let mut arguments = instance.arguments().clone();
    normalize_arguments(placeholders, &mut arguments);

    let mut where_clause = instance.where_clause().clone();
    normalize_where_clause(registry, &mut where_clause);

    let binding = placeholders
        .iter()
        .map(|placeholder| placeholder.name.clone())
        .zip(arguments)
        .collect();

    Ok(InstanceRequest::new(
        instance.typeclass().clone(),
        binding,
        instance.generic_parameters().clone(),
        where_clause,
        instance.options().clone(),
    ))
}
