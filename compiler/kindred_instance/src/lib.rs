//! Contains the [`Generator`] turning instance requests into generated member
//! declarations.
//!
//! An instantiation resolves the typeclass template, validates the binding,
//! then walks the members in declaration order: required members are looked
//! up in the host [`Environment`], default members are substituted and
//! emitted, and nested instance members are instantiated recursively. The
//! result is returned all at once; a failed instantiation generates nothing.

use std::collections::HashMap;

use derive_new::new;
use enum_as_inner::EnumAsInner;
use kindred_marker::Marker;
use kindred_registry::{
    options::InstanceOptions,
    template::{MemberTemplate, NestedInstance, Stub, TypeclassTemplate},
    Registry,
};
use kindred_term::{
    binding::Binding,
    declaration::{Declaration, Signature},
    predicate::Predicate,
    substitution::Substitute,
    Variable,
};
use serde::{Deserialize, Serialize};

pub mod diagnostic;
mod link;


use diagnostic::{
    BindingMismatch, Error, GenericParameterCollision, InstantiationOverflow,
    MismatchKind, MissingRequiredImplementation, Substitution,
};

/// The default limit of nested instantiations.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// A request to instantiate a typeclass.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, new,
)]
pub struct InstanceRequest {
    /// The name of the typeclass.
    pub typeclass: String,

    /// The constructors bound to the placeholders.
    pub binding: Binding,

    /// The type variables of a partial instance; appended to the generic
    /// parameters of every generated member.
    pub generic_parameters: Vec<Variable>,

    /// The predicates the variables of a partial instance must satisfy;
    /// appended to the where-clause of every generated member.
    pub where_clause: Vec<Predicate>,

    /// The skip and export sets.
    pub options: InstanceOptions,
}

impl InstanceRequest {
    /// Creates a request for a concrete instance with default options.
    #[must_use]
    pub fn concrete(typeclass: impl Into<String>, binding: Binding) -> Self {
        Self {
            typeclass: typeclass.into(),
            binding,
            generic_parameters: Vec::new(),
            where_clause: Vec::new(),
            options: InstanceOptions::default(),
        }
    }

    /// Replaces the options of the request.
    #[must_use]
    pub fn with_options(mut self, options: InstanceOptions) -> Self {
        self.options = options;
        self
    }

    fn extend(&self, signature: &mut Signature) {
        signature
            .generic_parameters
            .extend(self.generic_parameters.iter().cloned());
        signature.where_clause.extend(self.where_clause.iter().cloned());
    }
}

/// Whether a generated member is visible outside the declaring scope.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    EnumAsInner,
    Serialize,
    Deserialize,
)]
pub enum Visibility {
    /// Visible outside the declaring scope.
    Exported,

    /// Visible only inside the declaring scope.
    Local,
}

/// A default member substituted for one instantiation.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, new,
)]
pub struct GeneratedMember {
    /// The generated declaration.
    pub declaration: Declaration,

    /// The visibility chosen by the export set.
    pub visibility: Visibility,

    /// The typeclass the member was generated from.
    pub typeclass: String,
}

/// The output of a successful instantiation.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
pub struct Instance {
    /// The generated members, nested instances included, in generation
    /// order.
    pub members: Vec<GeneratedMember>,

    /// The markers of the instantiated typeclasses, one per instantiation.
    pub markers: Vec<Marker>,
}

impl Instance {
    /// Returns the generated member with the given name.
    #[must_use]
    pub fn member(&self, name: &str) -> Option<&GeneratedMember> {
        self.members.iter().find(|member| member.declaration.name == name)
    }

    fn provides(&self, name: &str, signature: &Signature) -> bool {
        self.members.iter().any(|member| {
            member.declaration.name == name
                && member
                    .declaration
                    .signature
                    .alpha_equivalent(signature)
                    .is_some()
        })
    }
}

/// The host scope consulted for the implementations of required members.
pub trait Environment {
    /// Returns `true` if a function with the given name and a signature equal
    /// to `signature` up to generic renaming is visible.
    fn find_function(&self, name: &str, signature: &Signature) -> bool;
}

/// Generates the members of instance requests.
///
/// The generator only reads the registry and the environment; any number of
/// instantiations, nested ones included, may run against the same
/// generator.
#[derive(Debug, Clone, Copy)]
pub struct Generator<'a, E: ?Sized> {
    registry: &'a Registry,
    environment: &'a E,
    max_depth: usize,
}

impl<'a, E: Environment + ?Sized> Generator<'a, E> {
    /// Creates a generator with the default depth limit.
    #[must_use]
    pub const fn new(registry: &'a Registry, environment: &'a E) -> Self {
        Self { registry, environment, max_depth: DEFAULT_MAX_DEPTH }
    }

    /// Sets the limit of nested instantiations.
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Instantiates the typeclass named by the request.
    ///
    /// # Errors
    ///
    /// See [`Error`] for the possible errors.
    pub fn instantiate(
        &self,
        request: &InstanceRequest,
    ) -> Result<Instance, Error> {
        log::debug!(
            "instantiating `{}` with {}",
            request.typeclass,
            request.binding
        );

        let mut instance = Instance::default();
        self.instantiate_into(request, 0, &mut instance)?;

        Ok(instance)
    }

    fn instantiate_into(
        &self,
        request: &InstanceRequest,
        depth: usize,
        instance: &mut Instance,
    ) -> Result<(), Error> {
        if depth > self.max_depth {
            return Err(InstantiationOverflow {
                typeclass: request.typeclass.clone(),
                max_depth: self.max_depth,
            }
            .into());
        }

        let template = self.registry.lookup(&request.typeclass)?;

        validate_binding(&template, &request.binding)?;

        let signatures = member_signatures(&template, request)?;

        for member in template.members() {
            if request.options.is_skipped(member.name()) {
                log::trace!(
                    "skipped `{}` of `{}`",
                    member.name(),
                    request.typeclass
                );
                continue;
            }

            match member {
                MemberTemplate::Required(stub) => {
                    self.check_required(
                        &template,
                        stub,
                        &signatures,
                        instance,
                    )?;
                }
                MemberTemplate::Default(declaration) => {
                    let member = generate_default(
                        &template,
                        declaration,
                        &signatures,
                        request,
                    )?;

                    log::trace!("generated `{}`", member.declaration);
                    instance.members.push(member);
                }
                MemberTemplate::Instance(nested) => {
                    let nested =
                        self.nested_request(&template, nested, request)?;
                    self.instantiate_into(&nested, depth + 1, instance)?;
                }
            }
        }

        let marker = kindred_marker::synthesize(
            &template,
            &request.binding,
            &request.generic_parameters,
            &request.where_clause,
        )
        .ok_or_else(|| BindingMismatch {
            typeclass: request.typeclass.clone(),
            kind: MismatchKind::Count {
                expected: template.placeholders().len(),
                found: request.binding.len(),
            },
        })?;

        instance.markers.push(marker);

        Ok(())
    }

    /// Builds the request of a nested instance member: its arguments are
    /// substituted with the enclosing binding and bound positionally to the
    /// placeholders of the nested typeclass.
    fn nested_request(
        &self,
        template: &TypeclassTemplate,
        nested: &NestedInstance,
        request: &InstanceRequest,
    ) -> Result<InstanceRequest, Error> {
        let nested_template = self.registry.lookup(&nested.typeclass)?;

        if nested.arguments.len() != nested_template.placeholders().len() {
            return Err(BindingMismatch {
                typeclass: nested.typeclass.clone(),
                kind: MismatchKind::Count {
                    expected: nested_template.placeholders().len(),
                    found: nested.arguments.len(),
                },
            }
            .into());
        }

        let binding = nested_template
            .placeholders()
            .iter()
            .zip(&nested.arguments)
            .map(|(placeholder, argument)| {
                argument
                    .substitute(&request.binding)
                    .map(|constructor| (placeholder.name.clone(), constructor))
            })
            .collect::<Result<Binding, _>>()
            .map_err(|error| Substitution {
                typeclass: template.name().clone(),
                member: nested.typeclass.clone(),
                error,
            })?;

        Ok(InstanceRequest {
            typeclass: nested.typeclass.clone(),
            binding,
            generic_parameters: request.generic_parameters.clone(),
            where_clause: request.where_clause.clone(),
            options: nested.options.clone(),
        })
    }

    fn check_required(
        &self,
        template: &TypeclassTemplate,
        stub: &Stub,
        signatures: &HashMap<String, Signature>,
        instance: &Instance,
    ) -> Result<(), Error> {
        let Some(expected) = signatures.get(&stub.name) else {
            return Ok(());
        };

        if self.environment.find_function(&stub.name, expected)
            || instance.provides(&stub.name, expected)
        {
            return Ok(());
        }

        Err(MissingRequiredImplementation {
            typeclass: template.name().clone(),
            member: stub.name.clone(),
            expected: expected.clone(),
        }
        .into())
    }
}

fn validate_binding(
    template: &TypeclassTemplate,
    binding: &Binding,
) -> Result<(), BindingMismatch> {
    let mismatch = |kind| BindingMismatch {
        typeclass: template.name().clone(),
        kind,
    };

    for placeholder in template.placeholders() {
        let Some(constructor) = binding.get(&placeholder.name) else {
            return Err(mismatch(MismatchKind::Missing {
                placeholder: placeholder.name.clone(),
            }));
        };

        if constructor.arity() != placeholder.arity {
            return Err(mismatch(MismatchKind::Arity {
                placeholder: placeholder.name.clone(),
                expected: placeholder.arity,
                found: constructor.arity(),
            }));
        }
    }

    if let Some(unexpected) =
        binding.names().find(|name| template.placeholder(name).is_none())
    {
        return Err(mismatch(MismatchKind::Unexpected {
            placeholder: unexpected.to_owned(),
        }));
    }

    Ok(())
}

/// Substitutes the signature of a member, appending the variables of the
/// request.
fn substitute_signature(
    template: &TypeclassTemplate,
    member: &str,
    signature: &Signature,
    request: &InstanceRequest,
) -> Result<Signature, Error> {
    if let Some(variable) = signature
        .generic_parameters
        .iter()
        .find(|variable| request.generic_parameters.contains(variable))
    {
        return Err(GenericParameterCollision {
            typeclass: template.name().clone(),
            member: member.to_owned(),
            variable: variable.clone(),
        }
        .into());
    }

    let mut signature =
        signature.substitute(&request.binding).map_err(|error| {
            Substitution {
                typeclass: template.name().clone(),
                member: member.to_owned(),
                error,
            }
        })?;
    request.extend(&mut signature);

    Ok(signature)
}

/// Substitutes the signatures of every required and default member.
///
/// Skipped members are not validated: a skipped member whose signature can
/// not be substituted is left out, so calls to it are not pinned.
fn member_signatures(
    template: &TypeclassTemplate,
    request: &InstanceRequest,
) -> Result<HashMap<String, Signature>, Error> {
    let mut signatures = HashMap::new();

    for member in template.members() {
        let Some(signature) = member.signature() else {
            continue;
        };

        let substituted =
            substitute_signature(template, member.name(), signature, request);

        let signature = if request.options.is_skipped(member.name()) {
            match substituted {
                Ok(signature) => signature,
                Err(error) => {
                    log::trace!(
                        "not pinning skipped `{}`: {error}",
                        member.name()
                    );
                    continue;
                }
            }
        } else {
            substituted?
        };

        signatures.insert(member.name().to_owned(), signature);
    }

    Ok(signatures)
}

fn generate_default(
    template: &TypeclassTemplate,
    declaration: &Declaration,
    signatures: &HashMap<String, Signature>,
    request: &InstanceRequest,
) -> Result<GeneratedMember, Error> {
    let mut body =
        declaration.body.substitute(&request.binding).map_err(|error| {
            Substitution {
                typeclass: template.name().clone(),
                member: declaration.name.clone(),
                error,
            }
        })?;

    let mut locals = declaration
        .signature
        .parameters
        .iter()
        .map(|parameter| parameter.name.clone())
        .collect();
    link::pin_members(&mut body, signatures, &mut locals);

    let signature = substitute_signature(
        template,
        &declaration.name,
        &declaration.signature,
        request,
    )?;

    let visibility = if request.options.is_exported(&declaration.name) {
        Visibility::Exported
    } else {
        Visibility::Local
    };

    Ok(GeneratedMember {
        declaration: Declaration::new(declaration.name.clone(), signature, body),
        visibility,
        typeclass: template.name().clone(),
    })
}
