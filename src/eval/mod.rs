//! Compile-time evaluation.
//!
//! Type annotations are expressions, so before inference can use one it has
//! to be reduced to a [`NormalForm`] and then converted to a [`Type`]. The
//! evaluator does this by unfolding named definitions, substituting closure
//! arguments and selecting members, leaving anything it cannot reduce as a
//! symbolic form.
//!
//! [`Type`]: crate::types::Type

mod reduce;
mod substitute;
mod value;

pub use reduce::Evaluator;
pub use substitute::{Replacements, substitute, substitute_items};
pub use value::NormalForm;
