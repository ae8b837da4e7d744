//! Contains the items a declaration unit consists of.

use enum_as_inner::EnumAsInner;
use getset::Getters;
use kindred_diagnostic::Span;
use kindred_registry::{options::InstanceOptions, template::TypeclassDeclaration};
use kindred_term::{
    constructor::Constructor, declaration::Declaration, predicate::Predicate,
    Variable,
};

/// `export? typeclass Name[..] { .. }`
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
#[get = "pub"]
pub struct Typeclass {
    /// The parsed declaration.
    declaration: TypeclassDeclaration,

    /// The span of the whole item.
    span: Span,
}

impl Typeclass {
    /// Consumes the item, returning the declaration.
    #[must_use]
    pub fn into_declaration(self) -> TypeclassDeclaration { self.declaration }
}

/// `def name[..](..): R where .. = body;`
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
#[get = "pub"]
pub struct Definition {
    /// The parsed declaration.
    declaration: Declaration,

    /// The span of the whole item.
    span: Span,
}

impl Definition {
    /// Consumes the item, returning the declaration.
    #[must_use]
    pub fn into_declaration(self) -> Declaration { self.declaration }
}

/// `instance[..] Name[..] where .. skipping(..) exporting(..);`
///
/// The arguments are positional: they are bound to the placeholders of the
/// typeclass in declaration order once the typeclass is known.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
#[get = "pub"]
pub struct Instance {
    /// The name of the instantiated typeclass.
    typeclass: String,

    /// The constructors written for the placeholders.
    arguments: Vec<Constructor>,

    /// The type variables introduced by `instance[..]`.
    generic_parameters: Vec<Variable>,

    /// The where-clause of a partial instance.
    where_clause: Vec<Predicate>,

    /// The skip and export sets.
    options: InstanceOptions,

    /// The span of the whole item.
    span: Span,
}

/// A top-level item of a declaration unit.
#[derive(Debug, Clone, PartialEq, Eq, EnumAsInner)]
#[allow(missing_docs)]
pub enum Item {
    Typeclass(Typeclass),
    Definition(Definition),
    Instance(Instance),
}

impl Item {
    /// Returns the span of the whole item.
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Typeclass(item) => item.span,
            Self::Definition(item) => item.span,
            Self::Instance(item) => item.span,
        }
    }
}

impl Typeclass {
    pub(crate) const fn new(declaration: TypeclassDeclaration, span: Span) -> Self {
        Self { declaration, span }
    }
}

impl Definition {
    pub(crate) const fn new(declaration: Declaration, span: Span) -> Self {
        Self { declaration, span }
    }
}

impl Instance {
    pub(crate) const fn new(
        typeclass: String,
        arguments: Vec<Constructor>,
        generic_parameters: Vec<Variable>,
        where_clause: Vec<Predicate>,
        options: InstanceOptions,
        span: Span,
    ) -> Self {
        Self { typeclass, arguments, generic_parameters, where_clause, options, span }
    }
}
