use std::fmt;

use lachs::Span;

use super::declaration::BindingDeclaration;

/// Expression node. `T` is `()` before inference and `Type` after.
///
/// Type annotations are ordinary expressions too: `Int32`, `Array<Int32>`,
/// `(Int32, Bool) -> String` and `Outer.Inner` are all parsed into this tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr<T> {
    Literal(Literal<T>),
    Identifier(Ident<T>),
    Closure(Closure<T>),
    Application(Application<T>),
    Conditional(Conditional<T>),
    Member(MemberAccess<T>),
    Tuple(Tuple<T>),
    StructLiteral(StructLiteral<T>),
    TypeConstructor(TypeConstructor<T>),
    Arrow(Arrow<T>),
    Block(Block<T>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    String(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Literal<T> {
    pub value: LiteralValue,
    pub position: Span,
    pub info: T,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ident<T> {
    pub value: String,
    pub position: Span,
    pub info: T,
}

/// Closure parameter. The annotation is a type-level expression.
#[derive(Debug, Clone, PartialEq)]
pub struct ClosureParameter {
    pub name: String,
    pub annotation: Option<Expr<()>>,
    pub position: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Closure<T> {
    pub parameters: Vec<ClosureParameter>,
    pub body: Box<Expr<T>>,
    pub position: Span,
    pub info: T,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Application<T> {
    pub function: Box<Expr<T>>,
    pub arguments: Vec<Expr<T>>,
    pub position: Span,
    pub info: T,
}

/// `if condition { then } else { otherwise }`; the else branch is optional.
#[derive(Debug, Clone, PartialEq)]
pub struct Conditional<T> {
    pub condition: Box<Expr<T>>,
    pub then_branch: Box<Expr<T>>,
    pub else_branch: Option<Box<Expr<T>>>,
    pub position: Span,
    pub info: T,
}

/// Field/method name or positional tuple index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MemberSelector {
    Named(String),
    Index(usize),
}

impl fmt::Display for MemberSelector {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MemberSelector::Named(name) => write!(f, "{}", name),
            MemberSelector::Index(index) => write!(f, "{}", index),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemberAccess<T> {
    pub base: Box<Expr<T>>,
    pub selector: MemberSelector,
    pub position: Span,
    pub info: T,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tuple<T> {
    pub elements: Vec<Expr<T>>,
    pub position: Span,
    pub info: T,
}

/// `Point { x: 1, y: 2 }`
#[derive(Debug, Clone, PartialEq)]
pub struct StructLiteral<T> {
    pub type_name: String,
    pub fields: Vec<(String, Expr<T>)>,
    pub position: Span,
    pub info: T,
}

/// A type name applied to type arguments, e.g. `Array<Int32>`.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeConstructor<T> {
    pub name: String,
    pub arguments: Vec<Expr<T>>,
    pub position: Span,
    pub info: T,
}

/// Function type annotation `(A, B) -> C`.
#[derive(Debug, Clone, PartialEq)]
pub struct Arrow<T> {
    pub parameters: Vec<Expr<T>>,
    pub result: Box<Expr<T>>,
    pub position: Span,
    pub info: T,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BlockItem<T> {
    Binding(BindingDeclaration<T>),
    Expr(Expr<T>),
}

/// Sequence of local bindings and expressions. The value of a block is the
/// value of its trailing expression, or unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Block<T> {
    pub items: Vec<BlockItem<T>>,
    pub position: Span,
    pub info: T,
}

impl<T> Expr<T> {
    pub fn info(&self) -> &T {
        match self {
            Expr::Literal(inner) => &inner.info,
            Expr::Identifier(inner) => &inner.info,
            Expr::Closure(inner) => &inner.info,
            Expr::Application(inner) => &inner.info,
            Expr::Conditional(inner) => &inner.info,
            Expr::Member(inner) => &inner.info,
            Expr::Tuple(inner) => &inner.info,
            Expr::StructLiteral(inner) => &inner.info,
            Expr::TypeConstructor(inner) => &inner.info,
            Expr::Arrow(inner) => &inner.info,
            Expr::Block(inner) => &inner.info,
        }
    }

    pub fn position(&self) -> &Span {
        match self {
            Expr::Literal(inner) => &inner.position,
            Expr::Identifier(inner) => &inner.position,
            Expr::Closure(inner) => &inner.position,
            Expr::Application(inner) => &inner.position,
            Expr::Conditional(inner) => &inner.position,
            Expr::Member(inner) => &inner.position,
            Expr::Tuple(inner) => &inner.position,
            Expr::StructLiteral(inner) => &inner.position,
            Expr::TypeConstructor(inner) => &inner.position,
            Expr::Arrow(inner) => &inner.position,
            Expr::Block(inner) => &inner.position,
        }
    }

    /// Rebuild the tree with every `info` slot mapped through `f`.
    pub fn map_info<U>(self, f: &mut impl FnMut(T) -> U) -> Expr<U> {
        match self {
            Expr::Literal(Literal {
                value,
                position,
                info,
            }) => Expr::Literal(Literal {
                value,
                position,
                info: f(info),
            }),
            Expr::Identifier(Ident {
                value,
                position,
                info,
            }) => Expr::Identifier(Ident {
                value,
                position,
                info: f(info),
            }),
            Expr::Closure(Closure {
                parameters,
                body,
                position,
                info,
            }) => Expr::Closure(Closure {
                parameters,
                body: Box::new(body.map_info(f)),
                position,
                info: f(info),
            }),
            Expr::Application(Application {
                function,
                arguments,
                position,
                info,
            }) => Expr::Application(Application {
                function: Box::new(function.map_info(f)),
                arguments: arguments.into_iter().map(|arg| arg.map_info(f)).collect(),
                position,
                info: f(info),
            }),
            Expr::Conditional(Conditional {
                condition,
                then_branch,
                else_branch,
                position,
                info,
            }) => Expr::Conditional(Conditional {
                condition: Box::new(condition.map_info(f)),
                then_branch: Box::new(then_branch.map_info(f)),
                else_branch: else_branch.map(|branch| Box::new(branch.map_info(f))),
                position,
                info: f(info),
            }),
            Expr::Member(MemberAccess {
                base,
                selector,
                position,
                info,
            }) => Expr::Member(MemberAccess {
                base: Box::new(base.map_info(f)),
                selector,
                position,
                info: f(info),
            }),
            Expr::Tuple(Tuple {
                elements,
                position,
                info,
            }) => Expr::Tuple(Tuple {
                elements: elements.into_iter().map(|e| e.map_info(f)).collect(),
                position,
                info: f(info),
            }),
            Expr::StructLiteral(StructLiteral {
                type_name,
                fields,
                position,
                info,
            }) => Expr::StructLiteral(StructLiteral {
                type_name,
                fields: fields
                    .into_iter()
                    .map(|(name, value)| (name, value.map_info(f)))
                    .collect(),
                position,
                info: f(info),
            }),
            Expr::TypeConstructor(TypeConstructor {
                name,
                arguments,
                position,
                info,
            }) => Expr::TypeConstructor(TypeConstructor {
                name,
                arguments: arguments.into_iter().map(|arg| arg.map_info(f)).collect(),
                position,
                info: f(info),
            }),
            Expr::Arrow(Arrow {
                parameters,
                result,
                position,
                info,
            }) => Expr::Arrow(Arrow {
                parameters: parameters.into_iter().map(|p| p.map_info(f)).collect(),
                result: Box::new(result.map_info(f)),
                position,
                info: f(info),
            }),
            Expr::Block(block) => Expr::Block(block.map_info(f)),
        }
    }
}

impl<T> Block<T> {
    pub fn map_info<U>(self, f: &mut impl FnMut(T) -> U) -> Block<U> {
        let Block {
            items,
            position,
            info,
        } = self;
        Block {
            items: items
                .into_iter()
                .map(|item| match item {
                    BlockItem::Binding(binding) => BlockItem::Binding(binding.map_info(f)),
                    BlockItem::Expr(expr) => BlockItem::Expr(expr.map_info(f)),
                })
                .collect(),
            position,
            info: f(info),
        }
    }
}
