use thiserror::Error;

use super::subst::Substitution;
use super::ty::{Type, TypeVar};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnifyError {
    #[error("type mismatch: expected {expected}, found {found}")]
    Mismatch { expected: Type, found: Type },
    #[error("occurs check: cannot construct infinite type {var} = {ty}")]
    OccursCheck { var: TypeVar, ty: Type },
}

/// Bind `var` to `ty` after the occurs check.
fn bind(var: &TypeVar, ty: &Type) -> Result<Substitution, UnifyError> {
    if matches!(ty, Type::Variable(other) if other == var) {
        return Ok(Substitution::empty());
    }
    if ty.occurs(var) {
        return Err(UnifyError::OccursCheck {
            var: var.clone(),
            ty: ty.clone(),
        });
    }
    Ok(Substitution::singleton(var.clone(), ty.clone()))
}

/// Unify two sequences pairwise, threading the substitution through.
fn unify_all(left: &[Type], right: &[Type]) -> Result<Substitution, UnifyError> {
    let mut subst = Substitution::empty();
    for (l, r) in left.iter().zip(right) {
        let s = unify(&subst.apply(l), &subst.apply(r))?;
        subst = s.compose(&subst);
    }
    Ok(subst)
}

/// Find the most general substitution making `t1` and `t2` equal.
///
/// ```text
/// unify('t0, Int32)                         = [t0 := Int32]
/// unify(('t0) -> 't1, (Int32) -> Bool)      = [t0 := Int32, t1 := Bool]
/// unify((Int32, 't0), (Int32, String))      = [t0 := String]
/// unify(Array<'t0>, Array<Bool>)            = [t0 := Bool]
/// unify('t0, ('t0) -> Int32)                = OccursCheck
/// unify(Int32, String)                      = Mismatch
/// ```
///
/// Arrows unify their parameter tuples first and their results under that
/// substitution. Arity differences are mismatches of the outer types.
pub fn unify(t1: &Type, t2: &Type) -> Result<Substitution, UnifyError> {
    tracing::trace!("unify {} ~ {}", t1, t2);
    let mismatch = || UnifyError::Mismatch {
        expected: t1.clone(),
        found: t2.clone(),
    };

    match (t1, t2) {
        (Type::Variable(v), t) | (t, Type::Variable(v)) => bind(v, t),

        (Type::Constructor(n1, args1), Type::Constructor(n2, args2)) => {
            if n1 != n2 || args1.len() != args2.len() {
                return Err(mismatch());
            }
            unify_all(args1, args2).map_err(|err| match err {
                UnifyError::Mismatch { .. } => mismatch(),
                occurs => occurs,
            })
        }

        (Type::Arrow(params1, result1), Type::Arrow(params2, result2)) => {
            if params1.len() != params2.len() {
                return Err(mismatch());
            }
            let s1 = unify_all(params1, params2)?;
            let s2 = unify(&s1.apply(result1), &s1.apply(result2))?;
            Ok(s2.compose(&s1))
        }

        (Type::Tuple(elements1), Type::Tuple(elements2)) => {
            if elements1.len() != elements2.len() {
                return Err(mismatch());
            }
            unify_all(elements1, elements2)
        }

        _ => Err(mismatch()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(id: usize) -> Type {
        Type::Variable(TypeVar::new(id))
    }

    #[test]
    fn test_unify_identical_constructors() {
        assert_eq!(unify(&Type::int(), &Type::int()), Ok(Substitution::empty()));
        assert_eq!(unify(&Type::unit(), &Type::unit()), Ok(Substitution::empty()));
    }

    #[test]
    fn test_unify_var_with_concrete() {
        let result = unify(&var(0), &Type::int());
        assert_eq!(
            result,
            Ok(Substitution::singleton(TypeVar::new(0), Type::int()))
        );
    }

    #[test]
    fn test_unify_concrete_with_var() {
        let result = unify(&Type::int(), &var(0));
        assert_eq!(
            result,
            Ok(Substitution::singleton(TypeVar::new(0), Type::int()))
        );
    }

    #[test]
    fn test_unify_same_var() {
        assert_eq!(unify(&var(0), &var(0)), Ok(Substitution::empty()));
    }

    #[test]
    fn test_unify_occurs_check() {
        let ty = Type::arrow(vec![var(0)], Type::int());
        let result = unify(&var(0), &ty);
        assert!(matches!(result, Err(UnifyError::OccursCheck { .. })));
    }

    #[test]
    fn test_unify_occurs_check_in_tuple() {
        let ty = Type::Tuple(vec![Type::int(), var(0)]);
        let result = unify(&ty, &var(0));
        assert!(matches!(result, Err(UnifyError::OccursCheck { .. })));
    }

    #[test]
    fn test_unify_arrows_thread_substitution() {
        // ('t0) -> 't0 ~ (Int32) -> 't1
        let t1 = Type::arrow(vec![var(0)], var(0));
        let t2 = Type::arrow(vec![Type::int()], var(1));
        let subst = unify(&t1, &t2).unwrap();
        assert_eq!(subst.apply(&var(0)), Type::int());
        assert_eq!(subst.apply(&var(1)), Type::int());
    }

    #[test]
    fn test_unify_nullary_arrows() {
        let t1 = Type::arrow(vec![], var(0));
        let t2 = Type::arrow(vec![], Type::string());
        let subst = unify(&t1, &t2).unwrap();
        assert_eq!(subst.apply(&var(0)), Type::string());
    }

    #[test]
    fn test_unify_arrow_arity_mismatch() {
        let t1 = Type::arrow(vec![Type::int()], Type::int());
        let t2 = Type::arrow(vec![Type::int(), Type::int()], Type::int());
        assert_eq!(
            unify(&t1, &t2),
            Err(UnifyError::Mismatch {
                expected: t1,
                found: t2
            })
        );
    }

    #[test]
    fn test_unify_tuples_elementwise() {
        let t1 = Type::Tuple(vec![var(0), Type::bool()]);
        let t2 = Type::Tuple(vec![Type::int(), var(1)]);
        let subst = unify(&t1, &t2).unwrap();
        assert_eq!(subst.apply(&t1), subst.apply(&t2));
    }

    #[test]
    fn test_unify_constructor_arguments() {
        let t1 = Type::Constructor("Array".to_string(), vec![var(0)]);
        let t2 = Type::Constructor("Array".to_string(), vec![Type::bool()]);
        let subst = unify(&t1, &t2).unwrap();
        assert_eq!(subst.apply(&var(0)), Type::bool());
    }

    #[test]
    fn test_unify_constructor_argument_mismatch_names_outer_types() {
        let t1 = Type::Constructor("Array".to_string(), vec![Type::int()]);
        let t2 = Type::Constructor("Array".to_string(), vec![Type::bool()]);
        assert_eq!(
            unify(&t1, &t2),
            Err(UnifyError::Mismatch {
                expected: t1,
                found: t2
            })
        );
    }

    #[test]
    fn test_unify_mismatch_concrete() {
        let result = unify(&Type::int(), &Type::string());
        assert!(matches!(result, Err(UnifyError::Mismatch { .. })));
    }

    #[test]
    fn test_unify_mismatch_shape() {
        let result = unify(&Type::int(), &Type::arrow(vec![], Type::int()));
        assert!(matches!(result, Err(UnifyError::Mismatch { .. })));
    }
}
