use lachs::Span;

use super::expression::{Block, Expr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    Static,
    Public,
    Private,
}

/// Top-level or member declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum Declaration<T> {
    Binding(BindingDeclaration<T>),
    Function(FunctionDeclaration<T>),
    Struct(TypeDeclaration<T>),
    Enum(TypeDeclaration<T>),
    EnumCase(EnumCaseDeclaration),
    /// Parsed but not checked.
    Trait(TraitDeclaration),
}

/// `let name: Annotation = value`
#[derive(Debug, Clone, PartialEq)]
pub struct BindingDeclaration<T> {
    pub name: String,
    pub modifiers: Vec<Modifier>,
    pub annotation: Option<Expr<()>>,
    pub value: Option<Expr<T>>,
    pub position: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub external_name: Option<String>,
    pub name: String,
    pub annotation: Expr<()>,
    pub position: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDeclaration<T> {
    pub name: String,
    pub modifiers: Vec<Modifier>,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<Expr<()>>,
    pub body: Option<Block<T>>,
    pub position: Span,
}

/// Shared shape of `struct` and `enum` declarations.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDeclaration<T> {
    pub name: String,
    pub modifiers: Vec<Modifier>,
    pub members: Vec<Declaration<T>>,
    pub position: Span,
}

/// `case some(Int32)`
#[derive(Debug, Clone, PartialEq)]
pub struct EnumCaseDeclaration {
    pub name: String,
    pub modifiers: Vec<Modifier>,
    pub associated_values: Vec<Expr<()>>,
    pub position: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TraitDeclaration {
    pub name: String,
    pub modifiers: Vec<Modifier>,
    pub position: Span,
}

impl<T> Declaration<T> {
    pub fn name(&self) -> &str {
        match self {
            Declaration::Binding(inner) => &inner.name,
            Declaration::Function(inner) => &inner.name,
            Declaration::Struct(inner) | Declaration::Enum(inner) => &inner.name,
            Declaration::EnumCase(inner) => &inner.name,
            Declaration::Trait(inner) => &inner.name,
        }
    }

    pub fn position(&self) -> &Span {
        match self {
            Declaration::Binding(inner) => &inner.position,
            Declaration::Function(inner) => &inner.position,
            Declaration::Struct(inner) | Declaration::Enum(inner) => &inner.position,
            Declaration::EnumCase(inner) => &inner.position,
            Declaration::Trait(inner) => &inner.position,
        }
    }

    pub fn modifiers(&self) -> &[Modifier] {
        match self {
            Declaration::Binding(inner) => &inner.modifiers,
            Declaration::Function(inner) => &inner.modifiers,
            Declaration::Struct(inner) | Declaration::Enum(inner) => &inner.modifiers,
            Declaration::EnumCase(inner) => &inner.modifiers,
            Declaration::Trait(inner) => &inner.modifiers,
        }
    }

    pub fn is_static(&self) -> bool {
        self.modifiers().contains(&Modifier::Static)
    }
}

impl<T> BindingDeclaration<T> {
    pub fn map_info<U>(self, f: &mut impl FnMut(T) -> U) -> BindingDeclaration<U> {
        BindingDeclaration {
            name: self.name,
            modifiers: self.modifiers,
            annotation: self.annotation,
            value: self.value.map(|value| value.map_info(f)),
            position: self.position,
        }
    }
}
