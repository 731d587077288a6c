//! Source formatting
//!
//! Display implementations for the declaration tree, used in diagnostics and
//! for dumping annotated modules.

pub mod surface;
