use std::collections::HashSet;
use std::fmt;

use lachs::Span;

use crate::ast::{Arrow, Expr, Ident, MemberAccess, MemberSelector, Tuple, TypeConstructor};

pub const INT32: &str = "Int32";
pub const FLOAT64: &str = "Float64";
pub const BOOL: &str = "Bool";
pub const STRING: &str = "String";
pub const ARRAY: &str = "Array";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeVar {
    pub id: usize,
}

impl TypeVar {
    pub fn new(id: usize) -> Self {
        Self { id }
    }
}

impl fmt::Display for TypeVar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "'t{}", self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    /// Nullary or applied type constructor: `Int32`, `Array<Int32>`.
    Constructor(String, Vec<Type>),
    Variable(TypeVar),
    Arrow(Vec<Type>, Box<Type>),
    /// The empty tuple is the unit type.
    Tuple(Vec<Type>),
}

impl Type {
    pub fn named(name: impl ToString) -> Self {
        Type::Constructor(name.to_string(), Vec::new())
    }

    pub fn arrow(parameters: Vec<Type>, result: Type) -> Self {
        Type::Arrow(parameters, Box::new(result))
    }

    pub fn unit() -> Self {
        Type::Tuple(Vec::new())
    }

    pub fn int() -> Self {
        Type::named(INT32)
    }

    pub fn float() -> Self {
        Type::named(FLOAT64)
    }

    pub fn bool() -> Self {
        Type::named(BOOL)
    }

    pub fn string() -> Self {
        Type::named(STRING)
    }

    pub fn free_type_vars(&self) -> HashSet<TypeVar> {
        let mut set = HashSet::new();
        self.collect_free_vars(&mut set);
        set
    }

    fn collect_free_vars(&self, set: &mut HashSet<TypeVar>) {
        match self {
            Type::Constructor(_, arguments) | Type::Tuple(arguments) => {
                arguments.iter().for_each(|arg| arg.collect_free_vars(set))
            }
            Type::Variable(v) => {
                set.insert(v.clone());
            }
            Type::Arrow(parameters, result) => {
                parameters.iter().for_each(|p| p.collect_free_vars(set));
                result.collect_free_vars(set);
            }
        }
    }

    /// True iff `var` is a free variable of this type.
    pub fn occurs(&self, var: &TypeVar) -> bool {
        match self {
            Type::Constructor(_, arguments) | Type::Tuple(arguments) => {
                arguments.iter().any(|arg| arg.occurs(var))
            }
            Type::Variable(v) => v == var,
            Type::Arrow(parameters, result) => {
                parameters.iter().any(|p| p.occurs(var)) || result.occurs(var)
            }
        }
    }

    /// Read a variable-free type back into the annotation expression that
    /// denotes it. Returns `None` if the type still contains variables.
    pub fn to_expr(&self) -> Option<Expr<()>> {
        let position = Span::default();
        match self {
            Type::Constructor(name, arguments) if arguments.is_empty() => {
                Some(type_name_expr(name))
            }
            Type::Constructor(name, arguments) => Some(Expr::TypeConstructor(TypeConstructor {
                name: name.clone(),
                arguments: arguments
                    .iter()
                    .map(Type::to_expr)
                    .collect::<Option<Vec<_>>>()?,
                position,
                info: (),
            })),
            Type::Variable(_) => None,
            Type::Arrow(parameters, result) => Some(Expr::Arrow(Arrow {
                parameters: parameters
                    .iter()
                    .map(Type::to_expr)
                    .collect::<Option<Vec<_>>>()?,
                result: Box::new(result.to_expr()?),
                position,
                info: (),
            })),
            Type::Tuple(elements) => Some(Expr::Tuple(Tuple {
                elements: elements
                    .iter()
                    .map(Type::to_expr)
                    .collect::<Option<Vec<_>>>()?,
                position,
                info: (),
            })),
        }
    }

    pub fn pretty(&self) -> String {
        match self {
            Type::Constructor(name, arguments) if arguments.is_empty() => name.clone(),
            Type::Constructor(name, arguments) => format!(
                "{}<{}>",
                name,
                arguments
                    .iter()
                    .map(Type::pretty)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            Type::Variable(v) => v.to_string(),
            Type::Arrow(parameters, result) => {
                let params = match parameters.as_slice() {
                    [single @ (Type::Constructor(..) | Type::Variable(_))] => single.pretty(),
                    _ => format!(
                        "({})",
                        parameters
                            .iter()
                            .map(Type::pretty)
                            .collect::<Vec<_>>()
                            .join(", ")
                    ),
                };
                format!("{} -> {}", params, result.pretty())
            }
            Type::Tuple(elements) => format!(
                "({})",
                elements
                    .iter()
                    .map(Type::pretty)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        }
    }
}

/// `Outer.Inner` is read back as a member access on `Outer`.
fn type_name_expr(name: &str) -> Expr<()> {
    let mut segments = name.split('.');
    let first = segments.next().unwrap_or(name);
    segments.fold(
        Expr::Identifier(Ident {
            value: first.to_string(),
            position: Span::default(),
            info: (),
        }),
        |base, segment| {
            Expr::Member(MemberAccess {
                base: Box::new(base),
                selector: MemberSelector::Named(segment.to_string()),
                position: Span::default(),
                info: (),
            })
        },
    )
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.pretty())
    }
}

/// A possibly polymorphic signature. Only `vars` are generalized; any other
/// free variable belongs to an enclosing scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scheme {
    pub vars: Vec<TypeVar>,
    pub ty: Type,
}

impl Scheme {
    pub fn monomorphic(ty: Type) -> Self {
        Scheme {
            vars: Vec::new(),
            ty,
        }
    }

    pub fn polymorphic(vars: Vec<TypeVar>, ty: Type) -> Self {
        Scheme { vars, ty }
    }

    /// Quantify over every free variable of `ty`. Only valid where the
    /// enclosing scope has no free variables of its own (module level).
    pub fn generalize(ty: Type) -> Self {
        let mut vars = ty.free_type_vars().into_iter().collect::<Vec<_>>();
        vars.sort_by_key(|v| v.id);
        Scheme { vars, ty }
    }

    pub fn free_type_vars(&self) -> HashSet<TypeVar> {
        let mut free = self.ty.free_type_vars();
        for var in &self.vars {
            free.remove(var);
        }
        free
    }

    /// One past the largest variable id this scheme mentions, bound or free.
    pub fn var_ceiling(&self) -> usize {
        let mentioned = self.ty.free_type_vars();
        mentioned
            .iter()
            .chain(&self.vars)
            .map(|var| var.id + 1)
            .max()
            .unwrap_or(0)
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.vars.is_empty() {
            return write!(f, "{}", self.ty);
        }
        let vars = self
            .vars
            .iter()
            .map(TypeVar::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        write!(f, "forall {}. {}", vars, self.ty)
    }
}
