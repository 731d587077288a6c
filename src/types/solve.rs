//! # Constraint Solving
//!
//! The solver is a value. Each [`Solver::step`] consumes one solver and
//! produces the next, so a caller that wants to try something speculatively
//! clones the current state first.
//!
//! Constraints are processed from a FIFO queue:
//!
//! - `Equal` unifies both sides and composes the result into the running
//!   substitution (newer after older).
//! - `Return` does the same but reports `ReturnTypeMismatch`.
//! - `Member` looks the member up once the receiver is a named type or a
//!   tuple. While the receiver is still a bare variable the constraint is set
//!   aside.
//!
//! When the queue runs dry, the set-aside constraints are re-queued if any of
//! their receivers has since been resolved. Otherwise the solver has reached
//! its fixpoint and applies the [`MemberConstraintPolicy`] to what is left.

use std::collections::VecDeque;

use crate::ast::MemberSelector;

use super::constraint::Constraint;
use super::env::ModuleEnvironment;
use super::error::{TypeError, TypeErrorKind};
use super::infer::VarSupply;
use super::options::MemberConstraintPolicy;
use super::subst::Substitution;
use super::ty::Type;
use super::unify::{UnifyError, unify};

#[derive(Debug, Clone)]
pub struct Solver<'env> {
    env: &'env ModuleEnvironment,
    pending: VecDeque<Constraint>,
    deferred: Vec<Constraint>,
    substitution: Substitution,
    supply: VarSupply,
    policy: MemberConstraintPolicy,
}

pub enum Step<'env> {
    Continue(Solver<'env>),
    Done(Substitution),
}

impl<'env> Solver<'env> {
    pub fn new(
        env: &'env ModuleEnvironment,
        constraints: Vec<Constraint>,
        supply: VarSupply,
        policy: MemberConstraintPolicy,
    ) -> Self {
        Solver {
            env,
            pending: constraints.into(),
            deferred: Vec::new(),
            substitution: Substitution::empty(),
            supply,
            policy,
        }
    }

    pub fn substitution(&self) -> &Substitution {
        &self.substitution
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn solve(self) -> Result<Substitution, TypeError> {
        let mut solver = self;
        loop {
            match solver.step()? {
                Step::Continue(next) => solver = next,
                Step::Done(substitution) => return Ok(substitution),
            }
        }
    }

    /// Discharge one constraint.
    pub fn step(mut self) -> Result<Step<'env>, TypeError> {
        let Some(constraint) = self.pending.pop_front() else {
            return self.fixpoint();
        };
        let constraint = constraint.apply(&self.substitution);
        tracing::debug!("solving {}", constraint);

        match constraint {
            Constraint::Equal { left, right, span } => {
                let s = unify(&left, &right).map_err(|err| TypeError::from_unify_error(err, span))?;
                self.substitution = s.compose(&self.substitution);
            }
            Constraint::Return {
                expected,
                actual,
                span,
            } => {
                let s = unify(&expected, &actual).map_err(|err| match err {
                    UnifyError::Mismatch { .. } => TypeError::new(
                        TypeErrorKind::ReturnTypeMismatch {
                            expected: expected.clone(),
                            actual: actual.clone(),
                        },
                        span,
                    ),
                    occurs => TypeError::from_unify_error(occurs, span),
                })?;
                self.substitution = s.compose(&self.substitution);
            }
            Constraint::Member {
                ty,
                selector,
                expected,
                span,
            } => {
                let member_ty = match &ty {
                    Type::Variable(_) => None,
                    Type::Constructor(name, _) => {
                        let scheme = self.env.instance_member(&ty, name, &selector, &span)?;
                        Some(self.supply.instantiate(scheme))
                    }
                    Type::Tuple(elements) => match &selector {
                        MemberSelector::Index(index) => {
                            Some(elements.get(*index).cloned().ok_or_else(|| {
                                TypeError::new(
                                    TypeErrorKind::TupleIndexOutOfRange {
                                        index: *index,
                                        arity: elements.len(),
                                    },
                                    span.clone(),
                                )
                            })?)
                        }
                        MemberSelector::Named(_) => {
                            return Err(TypeError::unknown_member(
                                ty.clone(),
                                selector.clone(),
                                span,
                            ));
                        }
                    },
                    Type::Arrow(..) => {
                        return Err(TypeError::new(
                            TypeErrorKind::InvalidMemberTarget {
                                ty: ty.clone(),
                                selector: selector.clone(),
                            },
                            span,
                        ));
                    }
                };
                let Some(member_ty) = member_ty else {
                    tracing::trace!("deferring member {} on {}", selector, ty);
                    self.deferred.push(Constraint::Member {
                        ty,
                        selector,
                        expected,
                        span,
                    });
                    return Ok(Step::Continue(self));
                };
                self.pending
                    .push_front(Constraint::equal(expected, member_ty, span));
            }
        }

        Ok(Step::Continue(self))
    }

    fn fixpoint(mut self) -> Result<Step<'env>, TypeError> {
        if self.deferred.is_empty() {
            return Ok(Step::Done(self.substitution));
        }

        let progressed = self.deferred.iter().any(|constraint| match constraint {
            Constraint::Member { ty, .. } => {
                !matches!(self.substitution.apply(ty), Type::Variable(_))
            }
            _ => true,
        });

        if progressed {
            tracing::debug!("re-queueing {} member constraints", self.deferred.len());
            self.pending.extend(self.deferred.drain(..));
            return Ok(Step::Continue(self));
        }

        match self.policy {
            MemberConstraintPolicy::Strict => {
                let constraint = self.deferred.remove(0);
                let selector = match &constraint {
                    Constraint::Member { selector, .. } => selector.clone(),
                    other => {
                        return Err(TypeError::internal(
                            format!("unexpected deferred constraint {}", other),
                            other.span().clone(),
                        ));
                    }
                };
                Err(TypeError::new(
                    TypeErrorKind::UnresolvedMember { selector },
                    constraint.span().clone(),
                ))
            }
            MemberConstraintPolicy::Permissive => {
                for constraint in &self.deferred {
                    tracing::warn!("dropping unresolved member constraint {}", constraint);
                }
                Ok(Step::Done(self.substitution))
            }
        }
    }
}
