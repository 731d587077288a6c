use std::collections::HashMap;

use crate::ast::{
    Application, Arrow, BindingDeclaration, Block, BlockItem, Closure, Conditional, Expr,
    MemberAccess, StructLiteral, Tuple, TypeConstructor,
};

pub type Replacements = HashMap<String, Expr<()>>;

/// Replace free occurrences of the mapped names, all at once.
///
/// Closure parameters and block bindings shadow the mapped names for the
/// rest of their scope.
pub fn substitute(expr: &Expr<()>, replacements: &Replacements) -> Expr<()> {
    if replacements.is_empty() {
        return expr.clone();
    }

    match expr {
        Expr::Identifier(ident) => replacements
            .get(&ident.value)
            .cloned()
            .unwrap_or_else(|| expr.clone()),
        Expr::Literal(_) => expr.clone(),
        Expr::Closure(closure) => {
            let inner = without(
                replacements,
                closure.parameters.iter().map(|parameter| parameter.name.as_str()),
            );
            Expr::Closure(Closure {
                parameters: closure.parameters.clone(),
                body: Box::new(substitute(&closure.body, &inner)),
                position: closure.position.clone(),
                info: (),
            })
        }
        Expr::Application(application) => Expr::Application(Application {
            function: Box::new(substitute(&application.function, replacements)),
            arguments: substitute_all(&application.arguments, replacements),
            position: application.position.clone(),
            info: (),
        }),
        Expr::Conditional(conditional) => Expr::Conditional(Conditional {
            condition: Box::new(substitute(&conditional.condition, replacements)),
            then_branch: Box::new(substitute(&conditional.then_branch, replacements)),
            else_branch: conditional
                .else_branch
                .as_ref()
                .map(|branch| Box::new(substitute(branch, replacements))),
            position: conditional.position.clone(),
            info: (),
        }),
        Expr::Member(member) => Expr::Member(MemberAccess {
            base: Box::new(substitute(&member.base, replacements)),
            selector: member.selector.clone(),
            position: member.position.clone(),
            info: (),
        }),
        Expr::Tuple(tuple) => Expr::Tuple(Tuple {
            elements: substitute_all(&tuple.elements, replacements),
            position: tuple.position.clone(),
            info: (),
        }),
        Expr::StructLiteral(literal) => Expr::StructLiteral(StructLiteral {
            type_name: literal.type_name.clone(),
            fields: literal
                .fields
                .iter()
                .map(|(name, value)| (name.clone(), substitute(value, replacements)))
                .collect(),
            position: literal.position.clone(),
            info: (),
        }),
        Expr::TypeConstructor(constructor) => Expr::TypeConstructor(TypeConstructor {
            name: constructor.name.clone(),
            arguments: substitute_all(&constructor.arguments, replacements),
            position: constructor.position.clone(),
            info: (),
        }),
        Expr::Arrow(arrow) => Expr::Arrow(Arrow {
            parameters: substitute_all(&arrow.parameters, replacements),
            result: Box::new(substitute(&arrow.result, replacements)),
            position: arrow.position.clone(),
            info: (),
        }),
        Expr::Block(block) => Expr::Block(Block {
            items: substitute_items(&block.items, replacements),
            position: block.position.clone(),
            info: (),
        }),
    }
}

/// Substitute through a sequence of block items. A binding's own value still
/// sees the outer names; the items after it do not see the bound name.
pub fn substitute_items(items: &[BlockItem<()>], replacements: &Replacements) -> Vec<BlockItem<()>> {
    let mut current = replacements.clone();
    let mut result = Vec::with_capacity(items.len());

    for item in items {
        match item {
            BlockItem::Expr(expr) => result.push(BlockItem::Expr(substitute(expr, &current))),
            BlockItem::Binding(binding) => {
                result.push(BlockItem::Binding(BindingDeclaration {
                    value: binding
                        .value
                        .as_ref()
                        .map(|value| substitute(value, &current)),
                    ..binding.clone()
                }));
                current.remove(&binding.name);
            }
        }
    }

    result
}

fn substitute_all(exprs: &[Expr<()>], replacements: &Replacements) -> Vec<Expr<()>> {
    exprs
        .iter()
        .map(|expr| substitute(expr, replacements))
        .collect()
}

fn without<'a>(replacements: &Replacements, names: impl Iterator<Item = &'a str>) -> Replacements {
    let mut inner = replacements.clone();
    for name in names {
        inner.remove(name);
    }
    inner
}

#[cfg(test)]
mod tests {
    use lachs::Span;

    use super::*;
    use crate::ast::{ClosureParameter, Ident, Literal, LiteralValue};

    fn ident(name: &str) -> Expr<()> {
        Expr::Identifier(Ident {
            value: name.to_string(),
            position: Span::default(),
            info: (),
        })
    }

    fn int(value: i64) -> Expr<()> {
        Expr::Literal(Literal {
            value: LiteralValue::Integer(value),
            position: Span::default(),
            info: (),
        })
    }

    fn tuple(elements: Vec<Expr<()>>) -> Expr<()> {
        Expr::Tuple(Tuple {
            elements,
            position: Span::default(),
            info: (),
        })
    }

    fn replace(pairs: Vec<(&str, Expr<()>)>) -> Replacements {
        pairs
            .into_iter()
            .map(|(name, expr)| (name.to_string(), expr))
            .collect()
    }

    #[test]
    fn test_replaces_free_identifiers() {
        let expr = tuple(vec![ident("x"), ident("y")]);
        let result = substitute(&expr, &replace(vec![("x", int(1))]));
        assert_eq!(result, tuple(vec![int(1), ident("y")]));
    }

    #[test]
    fn test_substitution_is_simultaneous() {
        // [x := y, y := x] swaps rather than collapsing both to one name
        let expr = tuple(vec![ident("x"), ident("y")]);
        let result = substitute(
            &expr,
            &replace(vec![("x", ident("y")), ("y", ident("x"))]),
        );
        assert_eq!(result, tuple(vec![ident("y"), ident("x")]));
    }

    #[test]
    fn test_closure_parameters_shadow() {
        let closure = Expr::Closure(Closure {
            parameters: vec![ClosureParameter {
                name: "x".to_string(),
                annotation: None,
                position: Span::default(),
            }],
            body: Box::new(tuple(vec![ident("x"), ident("y")])),
            position: Span::default(),
            info: (),
        });
        let result = substitute(&closure, &replace(vec![("x", int(1)), ("y", int(2))]));
        match result {
            Expr::Closure(closure) => {
                assert_eq!(*closure.body, tuple(vec![ident("x"), int(2)]));
            }
            other => panic!("expected closure, got {:?}", other),
        }
    }

    #[test]
    fn test_block_binding_shadows_following_items() {
        let items = vec![
            BlockItem::Binding(BindingDeclaration {
                name: "x".to_string(),
                modifiers: vec![],
                annotation: None,
                value: Some(ident("x")),
                position: Span::default(),
            }),
            BlockItem::Expr(ident("x")),
        ];
        let result = substitute_items(&items, &replace(vec![("x", int(7))]));
        match &result[0] {
            BlockItem::Binding(binding) => assert_eq!(binding.value, Some(int(7))),
            other => panic!("expected binding, got {:?}", other),
        }
        assert_eq!(result[1], BlockItem::Expr(ident("x")));
    }
}
