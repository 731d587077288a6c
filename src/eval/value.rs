use std::fmt;

use lachs::Span;

use crate::ast::{
    Application, Arrow, Closure, ClosureParameter, Conditional, Expr, Ident, Literal,
    LiteralValue, MemberAccess, MemberSelector, StructLiteral, Tuple, TypeConstructor,
};
use crate::types::Type;

/// Result of compile-time evaluation.
///
/// Forms that cannot be reduced further (unknown identifiers, applications of
/// opaque functions, member accesses on them) stay symbolic.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalForm {
    Closure {
        parameters: Vec<String>,
        body: Box<Expr<()>>,
    },
    Literal(LiteralValue),
    /// Conditional whose condition is a symbolic name.
    IfThenElse {
        condition: String,
        then_branch: Box<NormalForm>,
        else_branch: Option<Box<NormalForm>>,
    },
    Tuple(Vec<NormalForm>),
    StructLiteral {
        type_name: String,
        fields: Vec<(String, NormalForm)>,
    },
    /// A (qualified) type name with its reduced type arguments.
    TypeConstructor {
        name: String,
        arguments: Vec<NormalForm>,
    },
    Arrow {
        parameters: Vec<NormalForm>,
        result: Box<NormalForm>,
    },
    Identifier(String),
    Application {
        function: Box<NormalForm>,
        arguments: Vec<NormalForm>,
    },
    Member {
        base: Box<NormalForm>,
        selector: MemberSelector,
    },
}

impl NormalForm {
    pub fn unit() -> Self {
        NormalForm::Tuple(Vec::new())
    }

    /// The type this form denotes, if it denotes one.
    pub fn to_type(&self) -> Option<Type> {
        match self {
            NormalForm::TypeConstructor { name, arguments } => Some(Type::Constructor(
                name.clone(),
                arguments
                    .iter()
                    .map(NormalForm::to_type)
                    .collect::<Option<Vec<_>>>()?,
            )),
            NormalForm::Arrow { parameters, result } => Some(Type::arrow(
                parameters
                    .iter()
                    .map(NormalForm::to_type)
                    .collect::<Option<Vec<_>>>()?,
                result.to_type()?,
            )),
            NormalForm::Tuple(elements) => Some(Type::Tuple(
                elements
                    .iter()
                    .map(NormalForm::to_type)
                    .collect::<Option<Vec<_>>>()?,
            )),
            _ => None,
        }
    }

    /// Read the form back into an expression so it can be substituted into
    /// a closure body.
    pub fn quote(&self) -> Expr<()> {
        let position = Span::default();
        match self {
            NormalForm::Closure { parameters, body } => Expr::Closure(Closure {
                parameters: parameters
                    .iter()
                    .map(|name| ClosureParameter {
                        name: name.clone(),
                        annotation: None,
                        position: position.clone(),
                    })
                    .collect(),
                body: body.clone(),
                position,
                info: (),
            }),
            NormalForm::Literal(value) => Expr::Literal(Literal {
                value: value.clone(),
                position,
                info: (),
            }),
            NormalForm::IfThenElse {
                condition,
                then_branch,
                else_branch,
            } => Expr::Conditional(Conditional {
                condition: Box::new(Expr::Identifier(Ident {
                    value: condition.clone(),
                    position: position.clone(),
                    info: (),
                })),
                then_branch: Box::new(then_branch.quote()),
                else_branch: else_branch.as_ref().map(|branch| Box::new(branch.quote())),
                position,
                info: (),
            }),
            NormalForm::Tuple(elements) => Expr::Tuple(Tuple {
                elements: elements.iter().map(NormalForm::quote).collect(),
                position,
                info: (),
            }),
            NormalForm::StructLiteral { type_name, fields } => {
                Expr::StructLiteral(StructLiteral {
                    type_name: type_name.clone(),
                    fields: fields
                        .iter()
                        .map(|(name, value)| (name.clone(), value.quote()))
                        .collect(),
                    position,
                    info: (),
                })
            }
            NormalForm::TypeConstructor { name, arguments } => {
                Expr::TypeConstructor(TypeConstructor {
                    name: name.clone(),
                    arguments: arguments.iter().map(NormalForm::quote).collect(),
                    position,
                    info: (),
                })
            }
            NormalForm::Arrow { parameters, result } => Expr::Arrow(Arrow {
                parameters: parameters.iter().map(NormalForm::quote).collect(),
                result: Box::new(result.quote()),
                position,
                info: (),
            }),
            NormalForm::Identifier(name) => Expr::Identifier(Ident {
                value: name.clone(),
                position,
                info: (),
            }),
            NormalForm::Application {
                function,
                arguments,
            } => Expr::Application(Application {
                function: Box::new(function.quote()),
                arguments: arguments.iter().map(NormalForm::quote).collect(),
                position,
                info: (),
            }),
            NormalForm::Member { base, selector } => Expr::Member(MemberAccess {
                base: Box::new(base.quote()),
                selector: selector.clone(),
                position,
                info: (),
            }),
        }
    }
}

fn join(forms: &[NormalForm]) -> String {
    forms
        .iter()
        .map(NormalForm::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for NormalForm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            NormalForm::Closure { parameters, body } => {
                write!(f, "{{ {} in {} }}", parameters.join(", "), body)
            }
            NormalForm::Literal(value) => write!(f, "{}", value),
            NormalForm::IfThenElse {
                condition,
                then_branch,
                else_branch,
            } => {
                write!(f, "if {} {{ {} }}", condition, then_branch)?;
                if let Some(else_branch) = else_branch {
                    write!(f, " else {{ {} }}", else_branch)?;
                }
                Ok(())
            }
            NormalForm::Tuple(elements) => write!(f, "({})", join(elements)),
            NormalForm::StructLiteral { type_name, fields } => {
                let fields = fields
                    .iter()
                    .map(|(name, value)| format!("{}: {}", name, value))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{} {{ {} }}", type_name, fields)
            }
            NormalForm::TypeConstructor { name, arguments } if arguments.is_empty() => {
                write!(f, "{}", name)
            }
            NormalForm::TypeConstructor { name, arguments } => {
                write!(f, "{}<{}>", name, join(arguments))
            }
            NormalForm::Arrow { parameters, result } => {
                write!(f, "({}) -> {}", join(parameters), result)
            }
            NormalForm::Identifier(name) => write!(f, "{}", name),
            NormalForm::Application {
                function,
                arguments,
            } => write!(f, "{}({})", function, join(arguments)),
            NormalForm::Member { base, selector } => write!(f, "{}.{}", base, selector),
        }
    }
}
