use std::fmt;

use lachs::Span;

use crate::ast::MemberSelector;

use super::subst::Substitution;
use super::ty::Type;

/// A deferred obligation emitted while walking an expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// `left` and `right` must unify.
    Equal { left: Type, right: Type, span: Span },
    /// `ty` must have member `selector` of type `expected`.
    Member {
        ty: Type,
        selector: MemberSelector,
        expected: Type,
        span: Span,
    },
    /// A function body of type `actual` must satisfy the declared result.
    Return {
        expected: Type,
        actual: Type,
        span: Span,
    },
}

impl Constraint {
    pub fn equal(left: Type, right: Type, span: Span) -> Self {
        Constraint::Equal { left, right, span }
    }

    pub fn member(ty: Type, selector: MemberSelector, expected: Type, span: Span) -> Self {
        Constraint::Member {
            ty,
            selector,
            expected,
            span,
        }
    }

    pub fn span(&self) -> &Span {
        match self {
            Constraint::Equal { span, .. }
            | Constraint::Member { span, .. }
            | Constraint::Return { span, .. } => span,
        }
    }

    pub fn apply(&self, subst: &Substitution) -> Self {
        match self {
            Constraint::Equal { left, right, span } => Constraint::Equal {
                left: subst.apply(left),
                right: subst.apply(right),
                span: span.clone(),
            },
            Constraint::Member {
                ty,
                selector,
                expected,
                span,
            } => Constraint::Member {
                ty: subst.apply(ty),
                selector: selector.clone(),
                expected: subst.apply(expected),
                span: span.clone(),
            },
            Constraint::Return {
                expected,
                actual,
                span,
            } => Constraint::Return {
                expected: subst.apply(expected),
                actual: subst.apply(actual),
                span: span.clone(),
            },
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Constraint::Equal { left, right, .. } => write!(f, "{} ~ {}", left, right),
            Constraint::Member {
                ty,
                selector,
                expected,
                ..
            } => write!(f, "{}.{} : {}", ty, selector, expected),
            Constraint::Return {
                expected, actual, ..
            } => write!(f, "return {} : {}", actual, expected),
        }
    }
}
