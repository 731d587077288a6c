//! Property tests for unification and literal inference.
//!
//! 1. `unify(t, t)` always succeeds
//! 2. A successful `unify(a, b)` makes both sides equal
//! 3. The resulting substitution is idempotent
//! 4. Binding a variable to a type containing it fails the occurs check
//! 5. A variable-free type survives the trip through its annotation
//!    expression and the evaluator
//! 6. Literal tuples annotate to the tuple of their element types, also when
//!    passed through an identity closure

mod common;

use common::*;
use proptest::prelude::*;
use sema::ast::Expr;
use sema::types::{ModuleEnvironment, Type, TypeVar, UnifyError, unify};

fn arb_var() -> impl Strategy<Value = TypeVar> {
    (0usize..6).prop_map(TypeVar::new)
}

fn arb_type() -> impl Strategy<Value = Type> {
    let leaf = prop_oneof![
        Just(Type::int()),
        Just(Type::bool()),
        Just(Type::string()),
        Just(Type::float()),
        arb_var().prop_map(Type::Variable),
    ];
    leaf.prop_recursive(4, 24, 3, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..3).prop_map(Type::Tuple),
            (prop::collection::vec(inner.clone(), 0..3), inner.clone())
                .prop_map(|(parameters, result)| Type::arrow(parameters, result)),
            inner.prop_map(|element| Type::Constructor("Array".to_string(), vec![element])),
        ]
    })
}

fn arb_ground_type() -> impl Strategy<Value = Type> {
    let leaf = prop_oneof![
        Just(Type::int()),
        Just(Type::bool()),
        Just(Type::string()),
        Just(Type::float()),
    ];
    leaf.prop_recursive(4, 24, 3, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..3).prop_map(Type::Tuple),
            (prop::collection::vec(inner.clone(), 0..3), inner.clone())
                .prop_map(|(parameters, result)| Type::arrow(parameters, result)),
            inner.prop_map(|element| Type::Constructor("Array".to_string(), vec![element])),
        ]
    })
}

/// Types that strictly contain `var`.
fn arb_compound(var: TypeVar) -> impl Strategy<Value = Type> {
    let hole = Type::Variable(var);
    arb_type().prop_flat_map(move |other| {
        let hole = hole.clone();
        prop_oneof![
            Just(Type::arrow(vec![hole.clone()], other.clone())),
            Just(Type::arrow(vec![other.clone()], hole.clone())),
            Just(Type::Tuple(vec![other.clone(), hole.clone()])),
            Just(Type::Constructor("Array".to_string(), vec![hole.clone()])),
        ]
    })
}

fn arb_literal() -> impl Strategy<Value = (Expr<()>, Type)> {
    let leaf = prop_oneof![
        any::<i64>().prop_map(|value| (int(value), Type::int())),
        any::<bool>().prop_map(|value| (boolean(value), Type::bool())),
        "[a-z]{0,8}".prop_map(|value| (string(&value), Type::string())),
        (-1.0e6f64..1.0e6).prop_map(|value| (float(value), Type::float())),
    ];
    leaf.prop_recursive(3, 16, 4, |inner| {
        prop::collection::vec(inner, 0..4).prop_map(|elements| {
            let (exprs, types): (Vec<_>, Vec<_>) = elements.into_iter().unzip();
            (tuple(exprs), Type::Tuple(types))
        })
    })
}

proptest! {
    #[test]
    fn unify_is_reflexive(ty in arb_type()) {
        prop_assert!(unify(&ty, &ty).is_ok());
    }

    #[test]
    fn unifier_equates_both_sides(left in arb_type(), right in arb_type()) {
        if let Ok(subst) = unify(&left, &right) {
            prop_assert_eq!(subst.apply(&left), subst.apply(&right));
        }
    }

    #[test]
    fn unifier_is_idempotent(left in arb_type(), right in arb_type()) {
        if let Ok(subst) = unify(&left, &right) {
            let once = subst.apply(&left);
            prop_assert_eq!(subst.apply(&once), once);
        }
    }

    #[test]
    fn variable_unifies_with_anything_free_of_it(var in arb_var(), ty in arb_type()) {
        let subst = unify(&Type::Variable(var.clone()), &ty);
        if ty.occurs(&var) && ty != Type::Variable(var.clone()) {
            let is_occurs_check = matches!(subst, Err(UnifyError::OccursCheck { .. }));
            prop_assert!(is_occurs_check);
        } else {
            prop_assert!(subst.is_ok());
        }
    }

    #[test]
    fn occurs_check_rejects_infinite_types((var, ty) in arb_var().prop_flat_map(|var| {
        arb_compound(var.clone()).prop_map(move |ty| (var.clone(), ty))
    })) {
        let result = unify(&Type::Variable(var), &ty);
        let is_occurs_check = matches!(result, Err(UnifyError::OccursCheck { .. }));
        prop_assert!(is_occurs_check);
    }

    #[test]
    fn annotation_round_trip(ty in arb_ground_type()) {
        let env = ModuleEnvironment::empty();
        let annotation = ty.to_expr().unwrap();
        prop_assert_eq!(env.resolve_annotation(&annotation).unwrap(), ty);
    }

    #[test]
    fn literal_tuples_annotate_structurally((expr, expected) in arb_literal()) {
        let env = ModuleEnvironment::empty();
        let typed = expr.annotate(&env).unwrap();
        prop_assert_eq!(typed.info(), &expected);
    }

    #[test]
    fn identity_preserves_literal_types((expr, expected) in arb_literal()) {
        let env = ModuleEnvironment::empty();
        let applied = apply(closure(&["x"], ident("x")), vec![expr]);
        let typed = applied.annotate(&env).unwrap();
        prop_assert_eq!(typed.info(), &expected);
    }
}
