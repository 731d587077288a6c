use lachs::Span;

use crate::ast::{
    BindingDeclaration, Declaration, Expr, FunctionDeclaration, TypeDeclaration,
};

use super::constraint::Constraint;
use super::env::ModuleEnvironment;
use super::error::TypeError;
use super::infer::Infer;
use super::options::InferOptions;
use super::ty::{Scheme, Type};

impl Expr<()> {
    /// Infer the type of this expression and of every sub-expression.
    ///
    /// Runs constraint generation and solving in one go; the final
    /// substitution is applied to every `info` slot of the result.
    pub fn annotate(&self, env: &ModuleEnvironment) -> Result<Expr<Type>, TypeError> {
        let mut infer = Infer::new(env);
        let typed = infer.infer(self)?;
        let subst = infer.solve()?;
        Ok(typed.map_info(&mut |ty| subst.apply(&ty)))
    }
}

/// A fully annotated module together with the environment it was checked in.
#[derive(Debug, Clone)]
pub struct TypedModule {
    pub declarations: Vec<Declaration<Type>>,
    pub environment: ModuleEnvironment,
}

/// Build the module environment and type check every declaration.
///
/// A failure inside one declaration does not stop the others from being
/// checked; all errors are returned together.
pub fn check_module(
    declarations: &[Declaration<()>],
    options: InferOptions,
) -> Result<TypedModule, Vec<TypeError>> {
    let environment = ModuleEnvironment::build(declarations, options).map_err(|err| vec![err])?;

    let mut errors = Vec::new();
    let typed = declarations
        .iter()
        .map(|declaration| check_declaration(&environment, declaration, None, &mut errors))
        .collect::<Vec<_>>();

    if errors.is_empty() {
        Ok(TypedModule {
            declarations: typed,
            environment,
        })
    } else {
        Err(errors)
    }
}

fn check_declaration(
    env: &ModuleEnvironment,
    declaration: &Declaration<()>,
    receiver: Option<&Type>,
    errors: &mut Vec<TypeError>,
) -> Declaration<Type> {
    match declaration {
        Declaration::Binding(binding) => {
            Declaration::Binding(check_binding(env, binding).unwrap_or_else(|err| {
                errors.push(err);
                unchecked_binding(binding)
            }))
        }
        Declaration::Function(function) => {
            let receiver = if declaration.is_static() { None } else { receiver };
            Declaration::Function(check_function(env, function, receiver).unwrap_or_else(|err| {
                errors.push(err);
                unchecked_function(function)
            }))
        }
        Declaration::Struct(inner) => Declaration::Struct(check_type(env, inner, errors)),
        Declaration::Enum(inner) => Declaration::Enum(check_type(env, inner, errors)),
        Declaration::EnumCase(case) => Declaration::EnumCase(case.clone()),
        Declaration::Trait(inner) => Declaration::Trait(inner.clone()),
    }
}

fn check_type(
    env: &ModuleEnvironment,
    declaration: &TypeDeclaration<()>,
    errors: &mut Vec<TypeError>,
) -> TypeDeclaration<Type> {
    let qualified = env.qualify(&declaration.name);
    let self_type = Type::named(&qualified);

    let members = match env.type_scope(&qualified) {
        Some(scope) => declaration
            .members
            .iter()
            .map(|member| check_declaration(&scope, member, Some(&self_type), errors))
            .collect(),
        None => {
            errors.push(TypeError::internal(
                format!("type `{}` missing from its own environment", qualified),
                declaration.position.clone(),
            ));
            Vec::new()
        }
    };

    TypeDeclaration {
        name: declaration.name.clone(),
        modifiers: declaration.modifiers.clone(),
        members,
        position: declaration.position.clone(),
    }
}

fn check_binding(
    env: &ModuleEnvironment,
    binding: &BindingDeclaration<()>,
) -> Result<BindingDeclaration<Type>, TypeError> {
    let Some(value) = &binding.value else {
        return Ok(unchecked_binding(binding));
    };

    let mut infer = Infer::new(env);
    let typed = infer.infer(value)?;
    if let Some(annotation) = &binding.annotation {
        let expected = env.resolve_annotation(annotation)?;
        infer.constrain(Constraint::equal(
            expected,
            typed.info().clone(),
            value.position().clone(),
        ));
    }
    let subst = infer.solve()?;
    tracing::debug!("checked binding {}", binding.name);

    Ok(BindingDeclaration {
        name: binding.name.clone(),
        modifiers: binding.modifiers.clone(),
        annotation: binding.annotation.clone(),
        value: Some(typed.map_info(&mut |ty| subst.apply(&ty))),
        position: binding.position.clone(),
    })
}

fn check_function(
    env: &ModuleEnvironment,
    function: &FunctionDeclaration<()>,
    receiver: Option<&Type>,
) -> Result<FunctionDeclaration<Type>, TypeError> {
    let Some(body) = &function.body else {
        return Ok(unchecked_function(function));
    };

    let mut bindings: Vec<(String, Scheme)> = Vec::new();
    if let Some(receiver) = receiver {
        bindings.push(("self".to_string(), Scheme::monomorphic(receiver.clone())));
    }
    for parameter in &function.parameters {
        if bindings.iter().any(|(name, _)| name == &parameter.name) {
            return Err(TypeError::redeclaration(
                &parameter.name,
                parameter.position.clone(),
            ));
        }
        let ty = env.resolve_annotation(&parameter.annotation)?;
        bindings.push((parameter.name.clone(), Scheme::monomorphic(ty)));
    }

    let declared = match &function.return_type {
        Some(annotation) => env.resolve_annotation(annotation)?,
        None => Type::unit(),
    };

    let mut infer = Infer::new(env);
    let typed = infer.with_bindings(bindings, |infer| infer.infer_block(body))?;
    infer.constrain(Constraint::Return {
        expected: declared,
        actual: typed.info.clone(),
        span: return_span(function),
    });
    let subst = infer.solve()?;
    tracing::debug!("checked function {}", function.name);

    Ok(FunctionDeclaration {
        name: function.name.clone(),
        modifiers: function.modifiers.clone(),
        parameters: function.parameters.clone(),
        return_type: function.return_type.clone(),
        body: Some(typed.map_info(&mut |ty| subst.apply(&ty))),
        position: function.position.clone(),
    })
}

/// Where a return mismatch is reported: the last body item if there is one.
fn return_span(function: &FunctionDeclaration<()>) -> Span {
    function
        .body
        .as_ref()
        .and_then(|body| body.items.last())
        .map(|item| match item {
            crate::ast::BlockItem::Expr(expr) => expr.position().clone(),
            crate::ast::BlockItem::Binding(binding) => binding.position.clone(),
        })
        .unwrap_or_else(|| function.position.clone())
}

fn unchecked_binding(binding: &BindingDeclaration<()>) -> BindingDeclaration<Type> {
    BindingDeclaration {
        name: binding.name.clone(),
        modifiers: binding.modifiers.clone(),
        annotation: binding.annotation.clone(),
        value: None,
        position: binding.position.clone(),
    }
}

fn unchecked_function(function: &FunctionDeclaration<()>) -> FunctionDeclaration<Type> {
    FunctionDeclaration {
        name: function.name.clone(),
        modifiers: function.modifiers.clone(),
        parameters: function.parameters.clone(),
        return_type: function.return_type.clone(),
        body: None,
        position: function.position.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Block, BlockItem, Ident, Literal, LiteralValue, Parameter};
    use crate::types::TypeErrorKind;

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

    fn function(
        name: &str,
        parameters: Vec<(&str, &str)>,
        return_type: Option<&str>,
        body: Vec<BlockItem<()>>,
    ) -> Declaration<()> {
        Declaration::Function(FunctionDeclaration {
            name: name.to_string(),
            modifiers: vec![],
            parameters: parameters
                .into_iter()
                .map(|(name, annotation)| Parameter {
                    external_name: None,
                    name: name.to_string(),
                    annotation: ident(annotation),
                    position: Span::default(),
                })
                .collect(),
            return_type: return_type.map(ident),
            body: Some(Block {
                items: body,
                position: Span::default(),
                info: (),
            }),
            position: Span::default(),
        })
    }

    #[test]
    fn test_function_body_checks() {
        let module = check_module(
            &[function(
                "same",
                vec![("x", "Int32")],
                Some("Int32"),
                vec![BlockItem::Expr(ident("x"))],
            )],
            InferOptions::default(),
        )
        .unwrap();
        match &module.declarations[0] {
            Declaration::Function(function) => {
                assert_eq!(function.body.as_ref().unwrap().info, Type::int());
            }
            other => panic!("expected function, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_return_type_means_unit() {
        let errors = check_module(
            &[function("f", vec![], None, vec![BlockItem::Expr(int(1))])],
            InferOptions::default(),
        )
        .unwrap_err();
        assert_eq!(
            errors[0].kind,
            TypeErrorKind::ReturnTypeMismatch {
                expected: Type::unit(),
                actual: Type::int(),
            }
        );
    }

    #[test]
    fn test_errors_are_collected_per_declaration() {
        let errors = check_module(
            &[
                function("f", vec![], Some("Bool"), vec![BlockItem::Expr(int(1))]),
                function("g", vec![], Some("Int32"), vec![BlockItem::Expr(int(1))]),
                function("h", vec![], Some("Bool"), vec![BlockItem::Expr(ident("nope"))]),
            ],
            InferOptions::default(),
        )
        .unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(matches!(errors[0].kind, TypeErrorKind::ReturnTypeMismatch { .. }));
        assert!(matches!(errors[1].kind, TypeErrorKind::UnboundName { .. }));
    }

    #[test]
    fn test_duplicate_parameters() {
        let errors = check_module(
            &[function(
                "f",
                vec![("x", "Int32"), ("x", "Int32")],
                Some("Int32"),
                vec![BlockItem::Expr(ident("x"))],
            )],
            InferOptions::default(),
        )
        .unwrap_err();
        assert_eq!(
            errors[0].kind,
            TypeErrorKind::Redeclaration {
                name: "x".to_string()
            }
        );
    }
}
