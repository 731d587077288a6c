pub mod check;
pub mod constraint;
pub mod env;
pub mod error;
pub mod infer;
pub mod options;
pub mod solve;
pub mod subst;
pub mod ty;
pub mod unify;

pub use check::{TypedModule, check_module};
pub use constraint::Constraint;
pub use env::{
    EnumEnvironment, MemberEnvironment, Members, ModuleEnvironment, SchemeEntry,
    SchemeEnvironment, StructEnvironment, TypeDefinition, TypeEnvironment,
};
pub use error::{TypeError, TypeErrorKind};
pub use infer::{Infer, VarSupply};
pub use options::{InferOptions, MemberConstraintPolicy};
pub use solve::{Solver, Step};
pub use subst::Substitution;
pub use ty::{Scheme, Type, TypeVar};
pub use unify::{UnifyError, unify};
