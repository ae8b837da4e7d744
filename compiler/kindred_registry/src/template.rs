//! Contains the definition of the declaration templates stored by the
//! [`crate::Registry`].

use std::fmt;

use derive_new::new;
use enum_as_inner::EnumAsInner;
use getset::{CopyGetters, Getters};
use itertools::Itertools;
use kindred_term::{
    constructor::Constructor,
    declaration::{Declaration, Signature},
    visitor::{Element, MutableVisitor, Visitor},
    Placeholder,
};
use serde::{Deserialize, Serialize};

use crate::options::InstanceOptions;

/// A required member: a signature without a body.
///
/// The stub documents the contract; instances must supply a declaration with
/// the substituted signature.
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
pub struct Stub {
    /// The name of the member.
    pub name: String,

    /// The signature expected from the implementation.
    pub signature: Signature,
}

/// An instance of another typeclass generated as part of every instance of
/// the enclosing typeclass.
///
/// The arguments are positional, one per placeholder of the nested
/// typeclass, and may mention the placeholders of the enclosing typeclass.
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
pub struct NestedInstance {
    /// The name of the instantiated typeclass.
    pub typeclass: String,

    /// The constructors bound to the placeholders of the nested typeclass.
    pub arguments: Vec<Constructor>,

    /// The skip and export sets of the nested instance.
    pub options: InstanceOptions,
}

/// A member of a typeclass declaration template.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    EnumAsInner,
    Serialize,
    Deserialize,
    derive_more::From,
)]
#[allow(missing_docs)]
pub enum MemberTemplate {
    Required(Stub),
    Default(Declaration),
    Instance(NestedInstance),
}

impl MemberTemplate {
    /// Returns the name of the member. A nested instance is named after the
    /// typeclass it instantiates.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Required(stub) => &stub.name,
            Self::Default(declaration) => &declaration.name,
            Self::Instance(instance) => &instance.typeclass,
        }
    }

    /// Returns the signature of a required or default member.
    #[must_use]
    pub const fn signature(&self) -> Option<&Signature> {
        match self {
            Self::Required(stub) => Some(&stub.signature),
            Self::Default(declaration) => Some(&declaration.signature),
            Self::Instance(_) => None,
        }
    }
}

impl Element for Stub {
    fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        self.signature.accept(visitor);
    }

    fn accept_mut<V: MutableVisitor + ?Sized>(&mut self, visitor: &mut V) {
        self.signature.accept_mut(visitor);
    }
}

impl Element for NestedInstance {
    fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        self.arguments.accept(visitor);
    }

    fn accept_mut<V: MutableVisitor + ?Sized>(&mut self, visitor: &mut V) {
        self.arguments.accept_mut(visitor);
    }
}

impl Element for MemberTemplate {
    fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        match self {
            Self::Required(stub) => stub.accept(visitor),
            Self::Default(declaration) => declaration.accept(visitor),
            Self::Instance(instance) => instance.accept(visitor),
        }
    }

    fn accept_mut<V: MutableVisitor + ?Sized>(&mut self, visitor: &mut V) {
        match self {
            Self::Required(stub) => stub.accept_mut(visitor),
            Self::Default(declaration) => declaration.accept_mut(visitor),
            Self::Instance(instance) => instance.accept_mut(visitor),
        }
    }
}

impl fmt::Display for MemberTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required(stub) => {
                write!(f, "required {};", stub.signature.describe(&stub.name))
            }
            Self::Default(declaration) => write!(f, "default {declaration};"),
            Self::Instance(instance) => {
                write!(
                    f,
                    "instance {}[{}]",
                    instance.typeclass,
                    instance.arguments.iter().format(", ")
                )?;

                let options = instance.options.to_string();
                if !options.is_empty() {
                    write!(f, " {options}")?;
                }

                f.write_str(";")
            }
        }
    }
}

/// The input of [`crate::Registry::declare`].
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, new,
)]
pub struct TypeclassDeclaration {
    /// The name of the typeclass.
    pub name: String,

    /// The placeholders of the typeclass in declaration order.
    pub placeholders: Vec<Placeholder>,

    /// The members of the template in declaration order.
    pub members: Vec<MemberTemplate>,

    /// Whether the typeclass (and its markers) is visible outside the
    /// declaring scope.
    pub exported: bool,
}

/// A registered typeclass. Immutable once registered.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Getters,
    CopyGetters,
)]
pub struct TypeclassTemplate {
    /// The name of the typeclass.
    #[get = "pub"]
    name: String,

    /// The placeholders of the typeclass in declaration order.
    #[get = "pub"]
    placeholders: Vec<Placeholder>,

    /// The members of the template in declaration order.
    #[get = "pub"]
    members: Vec<MemberTemplate>,

    /// Whether the typeclass is exported.
    #[get_copy = "pub"]
    exported: bool,
}

impl TypeclassTemplate {
    pub(crate) fn from_declaration(declaration: TypeclassDeclaration) -> Self {
        Self {
            name: declaration.name,
            placeholders: declaration.placeholders,
            members: declaration.members,
            exported: declaration.exported,
        }
    }

    /// Returns the placeholder with the given name.
    #[must_use]
    pub fn placeholder(&self, name: &str) -> Option<&Placeholder> {
        self.placeholders.iter().find(|placeholder| placeholder.name == name)
    }

    /// Returns the member with the given name.
    #[must_use]
    pub fn member(&self, name: &str) -> Option<&MemberTemplate> {
        self.members.iter().find(|member| member.name() == name)
    }

    /// Returns `true` if a required or default member has the given name.
    #[must_use]
    pub fn has_function(&self, name: &str) -> bool {
        self.member(name).is_some_and(|member| member.signature().is_some())
    }
}

impl fmt::Display for TypeclassTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.exported {
            f.write_str("export ")?;
        }

        writeln!(
            f,
            "typeclass {}[{}] {{",
            self.name,
            self.placeholders.iter().format(", ")
        )?;

        for member in &self.members {
            writeln!(f, "    {member}")?;
        }

        f.write_str("}")
    }
}
