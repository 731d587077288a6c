use std::collections::HashMap;

use super::ty::{Scheme, Type, TypeVar};

/// Finite mapping from type variables to types.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Substitution(pub HashMap<TypeVar, Type>);

impl Substitution {
    pub fn empty() -> Self {
        Substitution(HashMap::new())
    }

    pub fn singleton(var: TypeVar, ty: Type) -> Self {
        let mut map = HashMap::new();
        map.insert(var, ty);
        Substitution(map)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, var: &TypeVar) -> Option<&Type> {
        self.0.get(var)
    }

    pub fn apply(&self, ty: &Type) -> Type {
        match ty {
            Type::Constructor(name, arguments) => Type::Constructor(
                name.clone(),
                arguments.iter().map(|arg| self.apply(arg)).collect(),
            ),
            Type::Variable(v) => self.0.get(v).cloned().unwrap_or_else(|| ty.clone()),
            Type::Arrow(parameters, result) => Type::Arrow(
                parameters.iter().map(|p| self.apply(p)).collect(),
                Box::new(self.apply(result)),
            ),
            Type::Tuple(elements) => Type::Tuple(elements.iter().map(|e| self.apply(e)).collect()),
        }
    }

    /// Apply to the free part of a scheme; bound variables are left alone.
    pub fn apply_scheme(&self, scheme: &Scheme) -> Scheme {
        let mut free = self.clone();
        for var in &scheme.vars {
            free.0.remove(var);
        }
        Scheme {
            vars: scheme.vars.clone(),
            ty: free.apply(&scheme.ty),
        }
    }

    /// Compose `self` (the newer substitution) after `older`: `self` is
    /// applied to every type in `older`, then both are merged with the
    /// entries of `self` winning on conflicts.
    pub fn compose(&self, older: &Substitution) -> Substitution {
        let mut result = older
            .0
            .iter()
            .map(|(var, ty)| (var.clone(), self.apply(ty)))
            .collect::<HashMap<_, _>>();

        for (var, ty) in &self.0 {
            result.insert(var.clone(), ty.clone());
        }

        Substitution(result)
    }

    pub fn insert(&mut self, var: TypeVar, ty: Type) {
        self.0.insert(var, ty);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_substitution() {
        let subst = Substitution::empty();
        let ty = Type::int();
        assert_eq!(subst.apply(&ty), ty);
    }

    #[test]
    fn test_singleton_substitution() {
        let var = TypeVar::new(0);
        let subst = Substitution::singleton(var.clone(), Type::int());
        assert_eq!(subst.apply(&Type::Variable(var)), Type::int());
    }

    #[test]
    fn test_apply_to_arrow_and_tuple() {
        let var = TypeVar::new(0);
        let subst = Substitution::singleton(var.clone(), Type::int());
        let ty = Type::arrow(
            vec![Type::Tuple(vec![Type::Variable(var.clone()), Type::bool()])],
            Type::Constructor("Array".to_string(), vec![Type::Variable(var)]),
        );
        assert_eq!(
            subst.apply(&ty),
            Type::arrow(
                vec![Type::Tuple(vec![Type::int(), Type::bool()])],
                Type::Constructor("Array".to_string(), vec![Type::int()]),
            )
        );
    }

    #[test]
    fn test_apply_preserves_unbound_vars() {
        let var1 = TypeVar::new(0);
        let var2 = TypeVar::new(1);
        let subst = Substitution::singleton(var1, Type::int());
        let ty = Type::Variable(var2.clone());
        assert_eq!(subst.apply(&ty), Type::Variable(var2));
    }

    #[test]
    fn test_apply_scheme_skips_bound_vars() {
        let a = TypeVar::new(0);
        let b = TypeVar::new(1);
        let mut subst = Substitution::singleton(a.clone(), Type::int());
        subst.insert(b.clone(), Type::bool());
        let scheme = Scheme::polymorphic(
            vec![a.clone()],
            Type::arrow(vec![Type::Variable(a.clone())], Type::Variable(b)),
        );
        let applied = subst.apply_scheme(&scheme);
        assert_eq!(
            applied.ty,
            Type::arrow(vec![Type::Variable(a)], Type::bool())
        );
    }

    #[test]
    fn test_compose_applies_newer_to_older() {
        let var1 = TypeVar::new(0);
        let var2 = TypeVar::new(1);

        let older = Substitution::singleton(var1.clone(), Type::Variable(var2.clone()));
        let newer = Substitution::singleton(var2, Type::int());

        let composed = newer.compose(&older);
        assert_eq!(composed.apply(&Type::Variable(var1)), Type::int());
    }

    #[test]
    fn test_compose_newer_wins() {
        let var = TypeVar::new(0);

        let older = Substitution::singleton(var.clone(), Type::int());
        let newer = Substitution::singleton(var.clone(), Type::string());

        let result = newer.compose(&older);
        assert_eq!(result.apply(&Type::Variable(var)), Type::string());
    }

    #[test]
    fn test_compose_is_associative() {
        let a = TypeVar::new(0);
        let b = TypeVar::new(1);
        let c = TypeVar::new(2);
        let s1 = Substitution::singleton(a.clone(), Type::Variable(b.clone()));
        let s2 = Substitution::singleton(b.clone(), Type::Variable(c.clone()));
        let s3 = Substitution::singleton(c.clone(), Type::bool());

        let left = s3.compose(&s2).compose(&s1);
        let right = s3.compose(&s2.compose(&s1));
        for var in [a, b, c] {
            assert_eq!(
                left.apply(&Type::Variable(var.clone())),
                right.apply(&Type::Variable(var))
            );
        }
    }

    #[test]
    fn test_substitution_idempotent() {
        let var = TypeVar::new(0);
        let subst = Substitution::singleton(var.clone(), Type::int());
        let ty = Type::Variable(var);

        let once = subst.apply(&ty);
        let twice = subst.apply(&once);
        assert_eq!(once, twice);
    }
}
