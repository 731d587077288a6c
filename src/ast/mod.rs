//! # Declaration Tree
//!
//! The tree the parser hands to the semantic core. Every node is generic over
//! an `info` slot:
//!
//! - **Before inference**: `Expr<()>` / `Declaration<()>`
//! - **After inference**: `Expr<Type>` / `Declaration<Type>`
//!
//! Type annotations are not a separate grammar. `Int32`, `Array<Int32>`,
//! `(Int32) -> String` and `Outer.Inner` are plain expressions that the
//! compile-time evaluator reduces to types. Annotation expressions therefore
//! stay `Expr<()>` in both phases.

pub mod declaration;
pub mod expression;

pub use declaration::{
    BindingDeclaration, Declaration, EnumCaseDeclaration, FunctionDeclaration, Modifier,
    Parameter, TraitDeclaration, TypeDeclaration,
};
pub use expression::{
    Application, Arrow, Block, BlockItem, Closure, ClosureParameter, Conditional, Expr, Ident,
    Literal, LiteralValue, MemberAccess, MemberSelector, StructLiteral, Tuple, TypeConstructor,
};
