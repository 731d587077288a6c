//! Builders for declaration trees, standing in for a parser.

#![allow(dead_code)]

use lachs::Span;
use sema::ast::*;
use sema::types::{ModuleEnvironment, Scheme, Type};

pub fn ident(name: &str) -> Expr<()> {
    Expr::Identifier(Ident {
        value: name.to_string(),
        position: Span::default(),
        info: (),
    })
}

fn literal(value: LiteralValue) -> Expr<()> {
    Expr::Literal(Literal {
        value,
        position: Span::default(),
        info: (),
    })
}

pub fn int(value: i64) -> Expr<()> {
    literal(LiteralValue::Integer(value))
}

pub fn float(value: f64) -> Expr<()> {
    literal(LiteralValue::Float(value))
}

pub fn boolean(value: bool) -> Expr<()> {
    literal(LiteralValue::Boolean(value))
}

pub fn string(value: &str) -> Expr<()> {
    literal(LiteralValue::String(value.to_string()))
}

/// `{ a, b in body }`
pub fn closure(parameters: &[&str], body: Expr<()>) -> Expr<()> {
    Expr::Closure(Closure {
        parameters: parameters
            .iter()
            .map(|name| ClosureParameter {
                name: name.to_string(),
                annotation: None,
                position: Span::default(),
            })
            .collect(),
        body: Box::new(body),
        position: Span::default(),
        info: (),
    })
}

/// `{ a: A in body }`
pub fn annotated_closure(parameters: &[(&str, Expr<()>)], body: Expr<()>) -> Expr<()> {
    Expr::Closure(Closure {
        parameters: parameters
            .iter()
            .map(|(name, annotation)| ClosureParameter {
                name: name.to_string(),
                annotation: Some(annotation.clone()),
                position: Span::default(),
            })
            .collect(),
        body: Box::new(body),
        position: Span::default(),
        info: (),
    })
}

pub fn apply(function: Expr<()>, arguments: Vec<Expr<()>>) -> Expr<()> {
    Expr::Application(Application {
        function: Box::new(function),
        arguments,
        position: Span::default(),
        info: (),
    })
}

pub fn member(base: Expr<()>, name: &str) -> Expr<()> {
    Expr::Member(MemberAccess {
        base: Box::new(base),
        selector: MemberSelector::Named(name.to_string()),
        position: Span::default(),
        info: (),
    })
}

pub fn index(base: Expr<()>, position: usize) -> Expr<()> {
    Expr::Member(MemberAccess {
        base: Box::new(base),
        selector: MemberSelector::Index(position),
        position: Span::default(),
        info: (),
    })
}

pub fn tuple(elements: Vec<Expr<()>>) -> Expr<()> {
    Expr::Tuple(Tuple {
        elements,
        position: Span::default(),
        info: (),
    })
}

pub fn conditional(
    condition: Expr<()>,
    then_branch: Expr<()>,
    else_branch: Option<Expr<()>>,
) -> Expr<()> {
    Expr::Conditional(Conditional {
        condition: Box::new(condition),
        then_branch: Box::new(then_branch),
        else_branch: else_branch.map(Box::new),
        position: Span::default(),
        info: (),
    })
}

pub fn struct_literal(type_name: &str, fields: Vec<(&str, Expr<()>)>) -> Expr<()> {
    Expr::StructLiteral(StructLiteral {
        type_name: type_name.to_string(),
        fields: fields
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect(),
        position: Span::default(),
        info: (),
    })
}

/// `Name<A, B>`
pub fn type_constructor(name: &str, arguments: Vec<Expr<()>>) -> Expr<()> {
    Expr::TypeConstructor(TypeConstructor {
        name: name.to_string(),
        arguments,
        position: Span::default(),
        info: (),
    })
}

/// `(A, B) -> C`
pub fn arrow(parameters: Vec<Expr<()>>, result: Expr<()>) -> Expr<()> {
    Expr::Arrow(Arrow {
        parameters,
        result: Box::new(result),
        position: Span::default(),
        info: (),
    })
}

pub fn block(items: Vec<BlockItem<()>>) -> Block<()> {
    Block {
        items,
        position: Span::default(),
        info: (),
    }
}

pub fn block_expr(items: Vec<BlockItem<()>>) -> Expr<()> {
    Expr::Block(block(items))
}

pub fn local(name: &str, annotation: Option<Expr<()>>, value: Option<Expr<()>>) -> BlockItem<()> {
    BlockItem::Binding(binding(name, annotation, value))
}

pub fn stmt(expr: Expr<()>) -> BlockItem<()> {
    BlockItem::Expr(expr)
}

fn binding(
    name: &str,
    annotation: Option<Expr<()>>,
    value: Option<Expr<()>>,
) -> BindingDeclaration<()> {
    BindingDeclaration {
        name: name.to_string(),
        modifiers: vec![],
        annotation,
        value,
        position: Span::default(),
    }
}

/// `let name: annotation = value`
pub fn let_decl(name: &str, annotation: Option<Expr<()>>, value: Option<Expr<()>>) -> Declaration<()> {
    Declaration::Binding(binding(name, annotation, value))
}

/// `let name: Type` (a field)
pub fn field(name: &str, annotation: Expr<()>) -> Declaration<()> {
    let_decl(name, Some(annotation), None)
}

pub fn static_let(name: &str, annotation: Option<Expr<()>>, value: Option<Expr<()>>) -> Declaration<()> {
    Declaration::Binding(BindingDeclaration {
        modifiers: vec![Modifier::Static],
        ..binding(name, annotation, value)
    })
}

/// `func name(p: A, ...) -> R { body }`
pub fn func(
    name: &str,
    parameters: Vec<(&str, Expr<()>)>,
    return_type: Option<Expr<()>>,
    body: Vec<BlockItem<()>>,
) -> Declaration<()> {
    Declaration::Function(function(name, parameters, return_type, body))
}

pub fn static_func(
    name: &str,
    parameters: Vec<(&str, Expr<()>)>,
    return_type: Option<Expr<()>>,
    body: Vec<BlockItem<()>>,
) -> Declaration<()> {
    Declaration::Function(FunctionDeclaration {
        modifiers: vec![Modifier::Static],
        ..function(name, parameters, return_type, body)
    })
}

fn function(
    name: &str,
    parameters: Vec<(&str, Expr<()>)>,
    return_type: Option<Expr<()>>,
    body: Vec<BlockItem<()>>,
) -> FunctionDeclaration<()> {
    FunctionDeclaration {
        name: name.to_string(),
        modifiers: vec![],
        parameters: parameters
            .into_iter()
            .map(|(name, annotation)| Parameter {
                external_name: None,
                name: name.to_string(),
                annotation,
                position: Span::default(),
            })
            .collect(),
        return_type,
        body: Some(block(body)),
        position: Span::default(),
    }
}

fn type_declaration(name: &str, members: Vec<Declaration<()>>) -> TypeDeclaration<()> {
    TypeDeclaration {
        name: name.to_string(),
        modifiers: vec![],
        members,
        position: Span::default(),
    }
}

pub fn struct_decl(name: &str, members: Vec<Declaration<()>>) -> Declaration<()> {
    Declaration::Struct(type_declaration(name, members))
}

pub fn enum_decl(name: &str, members: Vec<Declaration<()>>) -> Declaration<()> {
    Declaration::Enum(type_declaration(name, members))
}

/// `case name(A, B)`
pub fn case(name: &str, associated_values: Vec<Expr<()>>) -> Declaration<()> {
    Declaration::EnumCase(EnumCaseDeclaration {
        name: name.to_string(),
        modifiers: vec![],
        associated_values,
        position: Span::default(),
    })
}

/// Module environment extended with signature-only bindings.
pub fn env_with(declarations: &[Declaration<()>], schemes: Vec<(&str, Type)>) -> ModuleEnvironment {
    let mut env = ModuleEnvironment::new(declarations).expect("environment should build");
    for (name, ty) in schemes {
        env.insert_scheme(name, Scheme::monomorphic(ty))
            .expect("scheme names should be unique");
    }
    env
}

pub fn int_to_int() -> Type {
    Type::arrow(vec![Type::int()], Type::int())
}
