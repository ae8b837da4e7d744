//! Contains the visitor traits used to traverse every [`TypeExpr`] nested in a
//! term.
//!
//! Visiting is pre-order: the visitor sees a type before its sub-terms and
//! decides whether the traversal should descend into them.

use std::collections::BTreeSet;

use crate::{
    constructor::Constructor,
    declaration::{Declaration, Parameter, Signature},
    expression::{Callee, Expr},
    predicate::Predicate,
    TypeExpr, Variable,
};

/// A read-only visitor over type expressions.
pub trait Visitor {
    /// Visits the type; returns `false` to skip the sub-terms of `ty`.
    fn visit(&mut self, ty: &TypeExpr) -> bool;
}

/// A visitor that may rewrite the visited type expressions in place.
pub trait MutableVisitor {
    /// Visits the type; returns `false` to skip the sub-terms of `ty`.
    ///
    /// A visitor that replaces `ty` should return `false` so that the
    /// replacement is not revisited.
    fn visit(&mut self, ty: &mut TypeExpr) -> bool;
}

/// Implemented by every term that contains type expressions.
pub trait Element {
    /// Passes every type expression of the term to the visitor.
    fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V);

    /// Passes every type expression of the term to the mutable visitor.
    fn accept_mut<V: MutableVisitor + ?Sized>(&mut self, visitor: &mut V);
}

impl Element for TypeExpr {
    fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        if !visitor.visit(self) {
            return;
        }

        match self {
            Self::Symbol(symbol) => symbol.arguments.accept(visitor),
            Self::Placeholder(placeholder) => {
                placeholder.arguments.accept(visitor);
            }
            Self::Variable(_) | Self::Hole(_) => {}
            Self::Function(function) => {
                function.parameters.accept(visitor);
                function.return_type.accept(visitor);
            }
            Self::Tuple(tuple) => tuple.elements.accept(visitor),
        }
    }

    fn accept_mut<V: MutableVisitor + ?Sized>(&mut self, visitor: &mut V) {
        if !visitor.visit(self) {
            return;
        }

        match self {
            Self::Symbol(symbol) => symbol.arguments.accept_mut(visitor),
            Self::Placeholder(placeholder) => {
                placeholder.arguments.accept_mut(visitor);
            }
            Self::Variable(_) | Self::Hole(_) => {}
            Self::Function(function) => {
                function.parameters.accept_mut(visitor);
                function.return_type.accept_mut(visitor);
            }
            Self::Tuple(tuple) => tuple.elements.accept_mut(visitor),
        }
    }
}

impl<T: Element> Element for Vec<T> {
    fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        for element in self {
            element.accept(visitor);
        }
    }

    fn accept_mut<V: MutableVisitor + ?Sized>(&mut self, visitor: &mut V) {
        for element in self {
            element.accept_mut(visitor);
        }
    }
}

impl<T: Element> Element for Box<T> {
    fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        self.as_ref().accept(visitor);
    }

    fn accept_mut<V: MutableVisitor + ?Sized>(&mut self, visitor: &mut V) {
        self.as_mut().accept_mut(visitor);
    }
}

impl<T: Element> Element for Option<T> {
    fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        if let Some(element) = self {
            element.accept(visitor);
        }
    }

    fn accept_mut<V: MutableVisitor + ?Sized>(&mut self, visitor: &mut V) {
        if let Some(element) = self {
            element.accept_mut(visitor);
        }
    }
}

impl Element for Constructor {
    fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        self.template().accept(visitor);
    }

    fn accept_mut<V: MutableVisitor + ?Sized>(&mut self, visitor: &mut V) {
        self.template_mut().accept_mut(visitor);
    }
}

impl Element for Predicate {
    fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        self.arguments.accept(visitor);
    }

    fn accept_mut<V: MutableVisitor + ?Sized>(&mut self, visitor: &mut V) {
        self.arguments.accept_mut(visitor);
    }
}

impl Element for Parameter {
    fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        self.r#type.accept(visitor);
    }

    fn accept_mut<V: MutableVisitor + ?Sized>(&mut self, visitor: &mut V) {
        self.r#type.accept_mut(visitor);
    }
}

impl Element for Signature {
    fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        self.parameters.accept(visitor);
        self.return_type.accept(visitor);
        self.where_clause.accept(visitor);
    }

    fn accept_mut<V: MutableVisitor + ?Sized>(&mut self, visitor: &mut V) {
        self.parameters.accept_mut(visitor);
        self.return_type.accept_mut(visitor);
        self.where_clause.accept_mut(visitor);
    }
}

impl Element for Callee {
    fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        self.type_arguments.accept(visitor);
        self.pinned.accept(visitor);
    }

    fn accept_mut<V: MutableVisitor + ?Sized>(&mut self, visitor: &mut V) {
        self.type_arguments.accept_mut(visitor);
        self.pinned.accept_mut(visitor);
    }
}

impl Element for Expr {
    fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        match self {
            Self::Literal(_) | Self::Local(_) => {}
            Self::Call(call) => {
                call.callee.accept(visitor);
                call.arguments.accept(visitor);
            }
            Self::Function(callee) => callee.accept(visitor),
            Self::Lambda(lambda) => {
                lambda.parameters.accept(visitor);
                lambda.return_type.accept(visitor);
                lambda.body.accept(visitor);
            }
            Self::Sequence(sequence) => {
                sequence.element.accept(visitor);
                sequence.items.accept(visitor);
            }
        }
    }

    fn accept_mut<V: MutableVisitor + ?Sized>(&mut self, visitor: &mut V) {
        match self {
            Self::Literal(_) | Self::Local(_) => {}
            Self::Call(call) => {
                call.callee.accept_mut(visitor);
                call.arguments.accept_mut(visitor);
            }
            Self::Function(callee) => callee.accept_mut(visitor),
            Self::Lambda(lambda) => {
                lambda.parameters.accept_mut(visitor);
                lambda.return_type.accept_mut(visitor);
                lambda.body.accept_mut(visitor);
            }
            Self::Sequence(sequence) => {
                sequence.element.accept_mut(visitor);
                sequence.items.accept_mut(visitor);
            }
        }
    }
}

impl Element for Declaration {
    fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        self.signature.accept(visitor);
        self.body.accept(visitor);
    }

    fn accept_mut<V: MutableVisitor + ?Sized>(&mut self, visitor: &mut V) {
        self.signature.accept_mut(visitor);
        self.body.accept_mut(visitor);
    }
}

/// Collects every type variable found in the visited terms.
#[derive(Debug, Clone, Default)]
pub struct VariableCollector {
    /// The variables collected so far.
    pub variables: BTreeSet<Variable>,
}

impl Visitor for VariableCollector {
    fn visit(&mut self, ty: &TypeExpr) -> bool {
        if let TypeExpr::Variable(variable) = ty {
            self.variables.insert(variable.clone());
        }

        true
    }
}

/// Collects the names of every placeholder occurring in the visited terms.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderCollector {
    /// The placeholder names collected so far, paired with the number of
    /// arguments of their first occurrence.
    pub placeholders: Vec<(String, usize)>,
}

impl Visitor for PlaceholderCollector {
    fn visit(&mut self, ty: &TypeExpr) -> bool {
        if let TypeExpr::Placeholder(placeholder) = ty {
            self.placeholders
                .push((placeholder.name.clone(), placeholder.arguments.len()));
        }

        true
    }
}
