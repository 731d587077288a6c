//! Constraint generation.
//!
//! [`Infer`] walks an expression once, assigning every node a provisional
//! type and recording [`Constraint`]s about how those types relate. Nothing
//! is unified here; the collected constraints are handed to the
//! [`Solver`](super::solve::Solver) together with the variable counter, and
//! the resulting substitution is applied to the annotated tree afterwards.

use std::collections::HashMap;

use crate::ast::{
    Application, Block, BlockItem, BindingDeclaration, Closure, ClosureParameter, Conditional,
    Expr, Ident, Literal, LiteralValue, MemberAccess, MemberSelector, StructLiteral, Tuple,
};

use super::constraint::Constraint;
use super::env::{Members, ModuleEnvironment, SchemeEntry};
use super::error::{TypeError, TypeErrorKind};
use super::solve::Solver;
use super::subst::Substitution;
use super::ty::{Scheme, Type, TypeVar};

/// Source of fresh type variables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VarSupply {
    next: usize,
}

impl VarSupply {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(next: usize) -> Self {
        VarSupply { next }
    }

    pub fn fresh(&mut self) -> Type {
        let id = self.next;
        self.next += 1;
        Type::Variable(TypeVar::new(id))
    }

    /// Replace the quantified variables of `scheme` with fresh ones.
    pub fn instantiate(&mut self, scheme: &Scheme) -> Type {
        if scheme.vars.is_empty() {
            return scheme.ty.clone();
        }
        // Fresh ids must not land on a variable the scheme leaves free.
        self.next = self.next.max(scheme.var_ceiling());
        let subst = Substitution(
            scheme
                .vars
                .iter()
                .map(|var| (var.clone(), self.fresh()))
                .collect(),
        );
        subst.apply(&scheme.ty)
    }
}

pub struct Infer<'env> {
    env: &'env ModuleEnvironment,
    /// Closure parameters and block locals, innermost last.
    scopes: Vec<HashMap<String, Scheme>>,
    supply: VarSupply,
    constraints: Vec<Constraint>,
}

impl<'env> Infer<'env> {
    pub fn new(env: &'env ModuleEnvironment) -> Self {
        Infer {
            env,
            scopes: Vec::new(),
            supply: VarSupply::starting_at(env.next_var_id()),
            constraints: Vec::new(),
        }
    }

    pub fn fresh_var(&mut self) -> Type {
        self.supply.fresh()
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn constrain(&mut self, constraint: Constraint) {
        tracing::trace!("constraint {}", constraint);
        self.constraints.push(constraint);
    }

    /// Run `f` with `bindings` in scope. The scope is dropped again whether
    /// or not `f` succeeds.
    pub fn with_bindings<R>(
        &mut self,
        bindings: Vec<(String, Scheme)>,
        f: impl FnOnce(&mut Self) -> R,
    ) -> R {
        self.scopes.push(bindings.into_iter().collect());
        let result = f(self);
        self.scopes.pop();
        result
    }

    /// Solve everything collected so far.
    pub fn solve(self) -> Result<Substitution, TypeError> {
        Solver::new(
            self.env,
            self.constraints,
            self.supply,
            self.env.options().member_constraints,
        )
        .solve()
    }

    fn lookup_local(&self, name: &str) -> Option<&Scheme> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    fn is_value_name(&self, name: &str) -> bool {
        self.lookup_local(name).is_some() || self.env.lookup(name).is_some()
    }

    pub fn infer(&mut self, expr: &Expr<()>) -> Result<Expr<Type>, TypeError> {
        match expr {
            Expr::Literal(literal) => Ok(Expr::Literal(Literal {
                value: literal.value.clone(),
                position: literal.position.clone(),
                info: literal_type(&literal.value),
            })),
            Expr::Identifier(ident) => self.infer_identifier(ident),
            Expr::Closure(closure) => self.infer_closure(closure),
            Expr::Application(application) => self.infer_application(application),
            Expr::Conditional(conditional) => self.infer_conditional(conditional),
            Expr::Member(member) => self.infer_member(member),
            Expr::Tuple(tuple) => {
                let elements = tuple
                    .elements
                    .iter()
                    .map(|element| self.infer(element))
                    .collect::<Result<Vec<_>, _>>()?;
                let ty = Type::Tuple(elements.iter().map(|e| e.info().clone()).collect());
                Ok(Expr::Tuple(Tuple {
                    elements,
                    position: tuple.position.clone(),
                    info: ty,
                }))
            }
            Expr::StructLiteral(literal) => self.infer_struct_literal(literal),
            Expr::TypeConstructor(_) | Expr::Arrow(_) => Err(not_a_value(expr)),
            Expr::Block(block) => Ok(Expr::Block(self.infer_block(block)?)),
        }
    }

    fn infer_identifier(&mut self, ident: &Ident<()>) -> Result<Expr<Type>, TypeError> {
        let scheme = match self.lookup_local(&ident.value) {
            Some(scheme) => scheme.clone(),
            None => match self.env.lookup(&ident.value) {
                Some(entry) => entry.scheme().clone(),
                None if self.env.resolve_type(&ident.value).is_some() => {
                    return Err(TypeError::new(
                        TypeErrorKind::NotAValue {
                            expression: ident.value.clone(),
                        },
                        ident.position.clone(),
                    ));
                }
                None => {
                    return Err(TypeError::unbound_name(
                        &ident.value,
                        ident.position.clone(),
                    ));
                }
            },
        };
        Ok(Expr::Identifier(Ident {
            value: ident.value.clone(),
            position: ident.position.clone(),
            info: self.supply.instantiate(&scheme),
        }))
    }

    fn infer_closure(&mut self, closure: &Closure<()>) -> Result<Expr<Type>, TypeError> {
        let mut bindings = Vec::with_capacity(closure.parameters.len());
        for ClosureParameter {
            name,
            annotation,
            position,
        } in &closure.parameters
        {
            if bindings.iter().any(|(bound, _): &(String, Scheme)| bound == name) {
                return Err(TypeError::redeclaration(name, position.clone()));
            }
            let ty = match annotation {
                Some(annotation) => self.env.resolve_annotation(annotation)?,
                None => self.fresh_var(),
            };
            bindings.push((name.clone(), Scheme::monomorphic(ty)));
        }

        let parameter_types = bindings.iter().map(|(_, s)| s.ty.clone()).collect();
        let body = self.with_bindings(bindings, |this| this.infer(&closure.body))?;
        let ty = Type::arrow(parameter_types, body.info().clone());

        Ok(Expr::Closure(Closure {
            parameters: closure.parameters.clone(),
            body: Box::new(body),
            position: closure.position.clone(),
            info: ty,
        }))
    }

    fn infer_application(
        &mut self,
        application: &Application<()>,
    ) -> Result<Expr<Type>, TypeError> {
        let function = self.infer(&application.function)?;
        let arguments = application
            .arguments
            .iter()
            .map(|argument| self.infer(argument))
            .collect::<Result<Vec<_>, _>>()?;

        let result = self.fresh_var();
        let expected = Type::arrow(
            arguments.iter().map(|a| a.info().clone()).collect(),
            result.clone(),
        );
        self.constrain(Constraint::equal(
            function.info().clone(),
            expected,
            application.position.clone(),
        ));

        Ok(Expr::Application(Application {
            function: Box::new(function),
            arguments,
            position: application.position.clone(),
            info: result,
        }))
    }

    fn infer_conditional(
        &mut self,
        conditional: &Conditional<()>,
    ) -> Result<Expr<Type>, TypeError> {
        let condition = self.infer(&conditional.condition)?;
        self.constrain(Constraint::equal(
            condition.info().clone(),
            Type::bool(),
            conditional.condition.position().clone(),
        ));

        let then_branch = self.infer(&conditional.then_branch)?;
        let ty = then_branch.info().clone();

        let else_branch = match &conditional.else_branch {
            Some(branch) => {
                let branch = self.infer(branch)?;
                self.constrain(Constraint::equal(
                    ty.clone(),
                    branch.info().clone(),
                    branch.position().clone(),
                ));
                Some(Box::new(branch))
            }
            None => {
                self.constrain(Constraint::equal(
                    ty.clone(),
                    Type::unit(),
                    conditional.position.clone(),
                ));
                None
            }
        };

        Ok(Expr::Conditional(Conditional {
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch,
            position: conditional.position.clone(),
            info: ty,
        }))
    }

    /// Qualified name of the type an expression names, if it names one and
    /// is not shadowed by a value.
    fn type_name_of(&self, expr: &Expr<()>) -> Option<String> {
        match expr {
            Expr::Identifier(ident) if !self.is_value_name(&ident.value) => self
                .env
                .resolve_type(&ident.value)
                .map(|(qualified, _)| qualified),
            Expr::TypeConstructor(constructor) if constructor.arguments.is_empty() => self
                .env
                .resolve_type(&constructor.name)
                .map(|(qualified, _)| qualified),
            Expr::Member(MemberAccess {
                base,
                selector: MemberSelector::Named(name),
                ..
            }) => {
                let owner = self.type_name_of(base)?;
                let definition = self.env.lookup_type(&owner)?;
                definition
                    .nested_type(name)
                    .map(|_| format!("{}.{}", owner, name))
            }
            _ => None,
        }
    }

    fn infer_member(&mut self, member: &MemberAccess<()>) -> Result<Expr<Type>, TypeError> {
        if let Some(owner) = self.type_name_of(&member.base) {
            return self.infer_static_member(owner, member);
        }

        let base = self.infer(&member.base)?;
        let base_ty = base.info().clone();
        let span = &member.position;

        let ty = match &base_ty {
            Type::Constructor(name, _) => {
                let env = self.env;
                let scheme = env.instance_member(&base_ty, name, &member.selector, span)?;
                self.supply.instantiate(scheme)
            }
            Type::Tuple(elements) => match &member.selector {
                MemberSelector::Index(index) => {
                    elements.get(*index).cloned().ok_or_else(|| {
                        TypeError::new(
                            TypeErrorKind::TupleIndexOutOfRange {
                                index: *index,
                                arity: elements.len(),
                            },
                            span.clone(),
                        )
                    })?
                }
                MemberSelector::Named(_) => {
                    return Err(TypeError::unknown_member(
                        base_ty.clone(),
                        member.selector.clone(),
                        span.clone(),
                    ));
                }
            },
            Type::Arrow(..) => {
                return Err(TypeError::new(
                    TypeErrorKind::InvalidMemberTarget {
                        ty: base_ty.clone(),
                        selector: member.selector.clone(),
                    },
                    span.clone(),
                ));
            }
            Type::Variable(_) => {
                let result = self.fresh_var();
                self.constrain(Constraint::member(
                    base_ty.clone(),
                    member.selector.clone(),
                    result.clone(),
                    span.clone(),
                ));
                result
            }
        };

        Ok(Expr::Member(MemberAccess {
            base: Box::new(base),
            selector: member.selector.clone(),
            position: member.position.clone(),
            info: ty,
        }))
    }

    /// `Point.origin`, `Color.red`, `Outer.Inner.make`
    fn infer_static_member(
        &mut self,
        owner: String,
        member: &MemberAccess<()>,
    ) -> Result<Expr<Type>, TypeError> {
        let owner_ty = Type::named(&owner);
        let env = self.env;
        let scheme = env.static_member(&owner_ty, &owner, &member.selector, &member.position)?;
        let ty = self.supply.instantiate(scheme);
        let base = (*member.base).clone().map_info(&mut |_| owner_ty.clone());

        Ok(Expr::Member(MemberAccess {
            base: Box::new(base),
            selector: member.selector.clone(),
            position: member.position.clone(),
            info: ty,
        }))
    }

    fn infer_struct_literal(
        &mut self,
        literal: &StructLiteral<()>,
    ) -> Result<Expr<Type>, TypeError> {
        let env = self.env;
        let (qualified, definition) = env
            .resolve_type(&literal.type_name)
            .ok_or_else(|| TypeError::unknown_type(&literal.type_name, literal.position.clone()))?;
        let owner = Type::named(&qualified);

        let mut fields = Vec::with_capacity(literal.fields.len());
        for (name, value) in &literal.fields {
            let typed = self.infer(value)?;
            let scheme = match definition.value_member(name) {
                Some(SchemeEntry::Binding { scheme, .. }) => scheme,
                _ => {
                    return Err(TypeError::unknown_member(
                        owner,
                        MemberSelector::Named(name.clone()),
                        value.position().clone(),
                    ));
                }
            };
            let field_ty = self.supply.instantiate(scheme);
            self.constrain(Constraint::equal(
                field_ty,
                typed.info().clone(),
                value.position().clone(),
            ));
            fields.push((name.clone(), typed));
        }

        Ok(Expr::StructLiteral(StructLiteral {
            type_name: literal.type_name.clone(),
            fields,
            position: literal.position.clone(),
            info: owner,
        }))
    }

    /// Locals bound in a block are visible to the rest of the block only.
    pub fn infer_block(&mut self, block: &Block<()>) -> Result<Block<Type>, TypeError> {
        self.with_bindings(Vec::new(), |this| this.infer_block_items(block))
    }

    fn infer_block_items(&mut self, block: &Block<()>) -> Result<Block<Type>, TypeError> {
        let mut items = Vec::with_capacity(block.items.len());
        let mut ty = Type::unit();

        for item in &block.items {
            match item {
                BlockItem::Binding(binding) => {
                    let typed = self.infer_local(binding)?;
                    items.push(BlockItem::Binding(typed));
                    ty = Type::unit();
                }
                BlockItem::Expr(expr) => {
                    let typed = self.infer(expr)?;
                    ty = typed.info().clone();
                    items.push(BlockItem::Expr(typed));
                }
            }
        }

        Ok(Block {
            items,
            position: block.position.clone(),
            info: ty,
        })
    }

    fn infer_local(
        &mut self,
        binding: &BindingDeclaration<()>,
    ) -> Result<BindingDeclaration<Type>, TypeError> {
        let declared_here = self
            .scopes
            .last()
            .is_some_and(|scope| scope.contains_key(&binding.name));
        if declared_here {
            return Err(TypeError::redeclaration(
                &binding.name,
                binding.position.clone(),
            ));
        }

        let value = binding
            .value
            .as_ref()
            .map(|value| self.infer(value))
            .transpose()?;

        let ty = match (&binding.annotation, &value) {
            (Some(annotation), value) => {
                let annotated = self.env.resolve_annotation(annotation)?;
                if let Some(value) = value {
                    self.constrain(Constraint::equal(
                        annotated.clone(),
                        value.info().clone(),
                        value.position().clone(),
                    ));
                }
                annotated
            }
            (None, Some(value)) => value.info().clone(),
            (None, None) => {
                return Err(TypeError::new(
                    TypeErrorKind::MissingAnnotation {
                        name: binding.name.clone(),
                    },
                    binding.position.clone(),
                ));
            }
        };

        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(binding.name.clone(), Scheme::monomorphic(ty));
        }

        Ok(BindingDeclaration {
            name: binding.name.clone(),
            modifiers: binding.modifiers.clone(),
            annotation: binding.annotation.clone(),
            value,
            position: binding.position.clone(),
        })
    }
}

fn literal_type(value: &LiteralValue) -> Type {
    match value {
        LiteralValue::Integer(_) => Type::int(),
        LiteralValue::Float(_) => Type::float(),
        LiteralValue::Boolean(_) => Type::bool(),
        LiteralValue::String(_) => Type::string(),
    }
}

fn not_a_value(expr: &Expr<()>) -> TypeError {
    TypeError::new(
        TypeErrorKind::NotAValue {
            expression: expr.to_string(),
        },
        expr.position().clone(),
    )
}
