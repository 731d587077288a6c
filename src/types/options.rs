/// What the solver does with a member constraint whose receiver is still a
/// bare type variable once no other constraint can make progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MemberConstraintPolicy {
    /// Report `UnresolvedMember`.
    #[default]
    Strict,
    /// Drop the constraint and keep going.
    Permissive,
}

/// Knobs shared by environment building, evaluation and inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InferOptions {
    pub member_constraints: MemberConstraintPolicy,
    /// Maximum nesting of reductions before the evaluator gives up and keeps
    /// an expression symbolic.
    pub eval_depth: usize,
}

impl InferOptions {
    pub fn permissive() -> Self {
        InferOptions {
            member_constraints: MemberConstraintPolicy::Permissive,
            ..Self::default()
        }
    }

    pub fn with_eval_depth(self, eval_depth: usize) -> Self {
        InferOptions { eval_depth, ..self }
    }
}

impl Default for InferOptions {
    fn default() -> Self {
        InferOptions {
            member_constraints: MemberConstraintPolicy::Strict,
            eval_depth: 64,
        }
    }
}
