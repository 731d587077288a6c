//! # Type Error Definitions
//!
//! Errors reported by environment building, compile-time evaluation,
//! constraint generation and solving. Every error is recoverable: it aborts
//! the inference of one declaration, never the whole module.
//!
//! A [`TypeError`] pairs a [`TypeErrorKind`] with the source span it was
//! raised at. The kind carries the diagnostic payload (offending names and
//! types); the span is only used for rendering.
//!
//! ## Example Error Messages
//!
//! ```text
//! Type error: `Bool` already exists in this scope
//! Type error: cannot unify String with Int32
//! Type error: tuple index 5 out of range for tuple of arity 2
//! Type error: return type mismatch: expected String, found Int32
//! ```

use std::fmt;

use lachs::Span;
use thiserror::Error;

use crate::ast::MemberSelector;

use super::ty::{Type, TypeVar};
use super::unify::UnifyError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeErrorKind {
    /// A type, binding or function name is declared twice in one scope.
    #[error("`{name}` already exists in this scope")]
    Redeclaration { name: String },

    #[error("unbound name: {name}")]
    UnboundName { name: String },

    /// An annotation does not denote a known type.
    #[error("unknown type: {name}")]
    UnknownType { name: String },

    #[error("type {owner} has no member `{selector}`")]
    UnknownMember {
        owner: Type,
        selector: MemberSelector,
    },

    #[error("tuple index {index} out of range for tuple of arity {arity}")]
    TupleIndexOutOfRange { index: usize, arity: usize },

    #[error("cannot unify {expected} with {found}")]
    UnificationFailure { expected: Type, found: Type },

    #[error("cannot construct infinite type: {var} = {ty}")]
    InfiniteType { var: TypeVar, ty: Type },

    #[error("cannot access member `{selector}` on function type {ty}")]
    InvalidMemberTarget { ty: Type, selector: MemberSelector },

    #[error("`{name}` needs a type annotation or an initial value")]
    MissingAnnotation { name: String },

    #[error("return type mismatch: expected {expected}, found {actual}")]
    ReturnTypeMismatch { expected: Type, actual: Type },

    #[error("enum case `{name}` declared outside of an enum")]
    CaseOutsideEnum { name: String },

    #[error("enum case `{name}` cannot carry access modifiers")]
    CaseModifier { name: String },

    /// A member constraint on a type variable was never discharged.
    #[error("cannot infer the receiver type of member `{selector}`")]
    UnresolvedMember { selector: MemberSelector },

    /// A type-level expression was used where a value is expected.
    #[error("`{expression}` is a type, not a value")]
    NotAValue { expression: String },

    #[error("internal compiler error: {message}")]
    Internal { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeError {
    pub kind: TypeErrorKind,
    pub span: Span,
}

impl TypeError {
    pub fn new(kind: TypeErrorKind, span: Span) -> Self {
        TypeError { kind, span }
    }

    pub fn kind(&self) -> &TypeErrorKind {
        &self.kind
    }

    pub fn redeclaration(name: impl ToString, span: Span) -> Self {
        TypeError::new(
            TypeErrorKind::Redeclaration {
                name: name.to_string(),
            },
            span,
        )
    }

    pub fn unbound_name(name: impl ToString, span: Span) -> Self {
        TypeError::new(
            TypeErrorKind::UnboundName {
                name: name.to_string(),
            },
            span,
        )
    }

    pub fn unknown_type(name: impl ToString, span: Span) -> Self {
        TypeError::new(
            TypeErrorKind::UnknownType {
                name: name.to_string(),
            },
            span,
        )
    }

    pub fn unknown_member(owner: Type, selector: MemberSelector, span: Span) -> Self {
        TypeError::new(TypeErrorKind::UnknownMember { owner, selector }, span)
    }

    pub fn internal(message: impl ToString, span: Span) -> Self {
        TypeError::new(
            TypeErrorKind::Internal {
                message: message.to_string(),
            },
            span,
        )
    }

    /// Attach a span to a unification error.
    pub fn from_unify_error(err: UnifyError, span: Span) -> Self {
        match err {
            UnifyError::Mismatch { expected, found } => {
                TypeError::new(TypeErrorKind::UnificationFailure { expected, found }, span)
            }
            UnifyError::OccursCheck { var, ty } => {
                TypeError::new(TypeErrorKind::InfiniteType { var, ty }, span)
            }
        }
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let msg = self.kind.to_string();
        if self.span.source.is_empty() {
            write!(f, "Type error: {}", msg)
        } else {
            write!(f, "{}", self.span.to_string(&msg))
        }
    }
}

impl std::error::Error for TypeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unification_failure_display() {
        let err = TypeError::new(
            TypeErrorKind::UnificationFailure {
                expected: Type::string(),
                found: Type::int(),
            },
            Span::default(),
        );
        assert_eq!(err.to_string(), "Type error: cannot unify String with Int32");
    }

    #[test]
    fn test_from_unify_error_occurs() {
        let var = TypeVar::new(0);
        let ty = Type::arrow(vec![Type::Variable(var.clone())], Type::int());
        let err = TypeError::from_unify_error(
            UnifyError::OccursCheck {
                var: var.clone(),
                ty: ty.clone(),
            },
            Span::default(),
        );
        assert_eq!(err.kind, TypeErrorKind::InfiniteType { var, ty });
        assert!(err.to_string().contains("infinite type"));
    }

    #[test]
    fn test_unknown_member_display() {
        let err = TypeError::unknown_member(
            Type::string(),
            MemberSelector::Named("description".to_string()),
            Span::default(),
        );
        assert_eq!(
            err.to_string(),
            "Type error: type String has no member `description`"
        );
    }

    #[test]
    fn test_tuple_index_display() {
        let err = TypeError::new(
            TypeErrorKind::TupleIndexOutOfRange { index: 5, arity: 2 },
            Span::default(),
        );
        assert!(err.to_string().contains("tuple index 5"));
    }
}
