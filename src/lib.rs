//! # Sema - Semantic Core for a Swift-like Language
//!
//! Sema takes the declaration tree a parser produces and works out the type
//! of every expression in it. It has no lexer, parser or backend of its own;
//! callers build [`ast::Declaration`] values directly and get annotated
//! declarations (or a list of type errors) back.
//!
//! ## Architecture Overview
//!
//! Checking a module runs through the following stages:
//!
//! 1. **Environment building** (`types::env`) - Folds the declarations into
//!    scoped tables of bindings, functions and struct/enum member tables
//! 2. **Compile-time evaluation** (`eval`) - Reduces annotation expressions
//!    such as `Array<Int32>` or `Outer.Inner` to types
//! 3. **Constraint generation** (`types::infer`) - Walks each expression once,
//!    assigning provisional types and recording constraints
//! 4. **Constraint solving** (`types::solve`) - Unifies the constraints into a
//!    substitution, deferring member lookups whose receiver is still unknown
//! 5. **Annotation** (`types::check`) - Applies the substitution to every node
//!
//! ## Pipeline Flow
//!
//! ```text
//! Declarations (Vec<ast::Declaration<()>>)
//!     ↓
//! [Environment] → types::ModuleEnvironment
//!     ↓
//! [Generator] → Expr<Type> with provisional types + Vec<Constraint>
//!     ↓
//! [Solver] → Substitution
//!     ↓
//! [Annotate] → Typed declarations (ast::Declaration<Type>)
//! ```
//!
//! ## Key Design Decisions
//!
//! ### Types Are Expressions
//! There is no separate grammar for type annotations. An annotation is an
//! ordinary expression that the compile-time evaluator reduces to a
//! [`eval::NormalForm`]; forms like type constructors, arrows and tuples of
//! types convert to a [`types::Type`]. This lets annotations use names bound
//! elsewhere in the module, including conditionals over known constants.
//!
//! ### Hindley-Milner with a Constraint Queue
//! Inference is split in two. The generator never unifies; it records
//! equality, member and return constraints. The solver processes them in
//! order, one step at a time, producing a new solver value per step. Member
//! constraints on a bare type variable wait until the variable is resolved,
//! which makes `{ p in p.count }("Test")` check without annotations.
//!
//! ### Let-Polymorphism at Module Level
//! A module binding without annotation gets its initializer's type,
//! generalized over all free variables. Locals in blocks and closure
//! parameters stay monomorphic.
//!
//! ## Module Structure
//!
//! - [`ast`] - Declaration and expression trees, generic over an `info` slot
//! - [`eval`] - Compile-time evaluator and normal forms
//! - [`types`] - Environments, inference, solving and type errors
//! - [`fmt`] - Pretty-printing for diagnostics
//!
//! ## Example
//!
//! ```text
//! struct String { let count: Int32 }
//!
//! { p in p.count }("Test")      // Int32
//! "Test".description            // error: type String has no member `description`
//! (42, false).5                 // error: tuple index 5 out of range
//! ```
//!
//! ## Getting Started
//!
//! 1. Build declarations with the types in [`ast`]
//! 2. Check them with [`types::check_module()`]
//! 3. Or annotate a single expression with [`ast::Expr::annotate()`] against a
//!    [`types::ModuleEnvironment`]

pub mod ast;
pub mod eval;
pub mod fmt;
pub mod types;
