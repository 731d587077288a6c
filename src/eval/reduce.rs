use lachs::Span;

use crate::ast::{BlockItem, Expr, LiteralValue, MemberSelector};
use crate::types::{Members, ModuleEnvironment, SchemeEntry, Type, TypeError, TypeErrorKind};

use super::substitute::{Replacements, substitute, substitute_items};
use super::value::NormalForm;

/// Reduces expressions against a module environment.
///
/// Unfolding a named definition and applying a closure each cost one level of
/// depth. Past the configured limit both stay symbolic, so runaway recursion
/// in type-level code ends in a symbolic form instead of a stack overflow.
pub struct Evaluator<'env> {
    env: &'env ModuleEnvironment,
    depth: usize,
    limit: usize,
}

impl<'env> Evaluator<'env> {
    pub fn new(env: &'env ModuleEnvironment) -> Self {
        Evaluator {
            env,
            depth: 0,
            limit: env.options().eval_depth,
        }
    }

    pub fn eval(&mut self, expr: &Expr<()>) -> Result<NormalForm, TypeError> {
        match expr {
            Expr::Literal(literal) => Ok(NormalForm::Literal(literal.value.clone())),
            Expr::Identifier(ident) => self.eval_identifier(&ident.value),
            Expr::Closure(closure) => Ok(NormalForm::Closure {
                parameters: closure
                    .parameters
                    .iter()
                    .map(|parameter| parameter.name.clone())
                    .collect(),
                body: closure.body.clone(),
            }),
            Expr::Application(application) => {
                let function = self.eval(&application.function)?;
                let arguments = self.eval_all(&application.arguments)?;
                self.apply(function, arguments)
            }
            Expr::Conditional(conditional) => {
                let condition = self.eval(&conditional.condition)?;
                match condition {
                    NormalForm::Literal(LiteralValue::Boolean(true)) => {
                        self.eval(&conditional.then_branch)
                    }
                    NormalForm::Literal(LiteralValue::Boolean(false)) => {
                        match &conditional.else_branch {
                            Some(branch) => self.eval(branch),
                            None => Ok(NormalForm::unit()),
                        }
                    }
                    NormalForm::Identifier(name) => Ok(NormalForm::IfThenElse {
                        condition: name,
                        then_branch: Box::new(self.eval(&conditional.then_branch)?),
                        else_branch: match &conditional.else_branch {
                            Some(branch) => Some(Box::new(self.eval(branch)?)),
                            None => None,
                        },
                    }),
                    other => Err(TypeError::internal(
                        format!("condition reduced to `{}`, expected a boolean", other),
                        conditional.condition.position().clone(),
                    )),
                }
            }
            Expr::Member(member) => {
                let base = self.eval(&member.base)?;
                self.select(base, &member.selector, &member.position)
            }
            Expr::Tuple(tuple) => Ok(NormalForm::Tuple(self.eval_all(&tuple.elements)?)),
            Expr::StructLiteral(literal) => {
                let type_name = self
                    .env
                    .resolve_type(&literal.type_name)
                    .map(|(qualified, _)| qualified)
                    .unwrap_or_else(|| literal.type_name.clone());
                let fields = literal
                    .fields
                    .iter()
                    .map(|(name, value)| Ok((name.clone(), self.eval(value)?)))
                    .collect::<Result<Vec<_>, TypeError>>()?;
                Ok(NormalForm::StructLiteral { type_name, fields })
            }
            Expr::TypeConstructor(constructor) => {
                match self.env.resolve_type(&constructor.name) {
                    Some((name, _)) => Ok(NormalForm::TypeConstructor {
                        name,
                        arguments: self.eval_all(&constructor.arguments)?,
                    }),
                    None => Ok(NormalForm::Identifier(constructor.name.clone())),
                }
            }
            Expr::Arrow(arrow) => Ok(NormalForm::Arrow {
                parameters: self.eval_all(&arrow.parameters)?,
                result: Box::new(self.eval(&arrow.result)?),
            }),
            Expr::Block(block) => self.eval_block(&block.items),
        }
    }

    fn eval_all(&mut self, exprs: &[Expr<()>]) -> Result<Vec<NormalForm>, TypeError> {
        exprs.iter().map(|expr| self.eval(expr)).collect()
    }

    fn exhausted(&self) -> bool {
        self.depth >= self.limit
    }

    /// Evaluate one level deeper; the depth is restored on every path.
    fn deeper(&mut self, expr: &Expr<()>) -> Result<NormalForm, TypeError> {
        self.depth += 1;
        let result = self.eval(expr);
        self.depth -= 1;
        result
    }

    fn eval_identifier(&mut self, name: &str) -> Result<NormalForm, TypeError> {
        let env = self.env;
        match env.lookup(name) {
            Some(SchemeEntry::Binding {
                value: Some(value), ..
            }) if !self.exhausted() => {
                tracing::trace!("unfolding {}", name);
                self.deeper(value)
            }
            Some(entry) => Ok(Self::entry_form(name, entry)),
            None => match env.resolve_type(name) {
                Some((qualified, _)) => Ok(NormalForm::TypeConstructor {
                    name: qualified,
                    arguments: vec![],
                }),
                None => Ok(NormalForm::Identifier(name.to_string())),
            },
        }
    }

    /// Form of a named entry without unfolding its value.
    fn entry_form(name: &str, entry: &SchemeEntry) -> NormalForm {
        match entry {
            SchemeEntry::Function {
                parameters,
                body: Some(body),
                ..
            } => NormalForm::Closure {
                parameters: parameters.clone(),
                body: Box::new(body.clone()),
            },
            _ => NormalForm::Identifier(name.to_string()),
        }
    }

    fn apply(
        &mut self,
        function: NormalForm,
        arguments: Vec<NormalForm>,
    ) -> Result<NormalForm, TypeError> {
        match function {
            NormalForm::Closure { parameters, body }
                if parameters.len() == arguments.len() && !self.exhausted() =>
            {
                let replacements = parameters
                    .into_iter()
                    .zip(arguments.iter().map(NormalForm::quote))
                    .collect::<Replacements>();
                let body = substitute(&body, &replacements);
                self.deeper(&body)
            }
            function => Ok(NormalForm::Application {
                function: Box::new(function),
                arguments,
            }),
        }
    }

    fn select(
        &mut self,
        base: NormalForm,
        selector: &MemberSelector,
        span: &Span,
    ) -> Result<NormalForm, TypeError> {
        let env = self.env;
        match (base, selector) {
            (NormalForm::Tuple(elements), MemberSelector::Index(index)) => {
                let arity = elements.len();
                elements.into_iter().nth(*index).ok_or_else(|| {
                    TypeError::new(
                        TypeErrorKind::TupleIndexOutOfRange {
                            index: *index,
                            arity,
                        },
                        span.clone(),
                    )
                })
            }
            (NormalForm::StructLiteral { type_name, fields }, MemberSelector::Named(name)) => {
                if let Some((_, value)) = fields.iter().find(|(field, _)| field == name) {
                    return Ok(value.clone());
                }
                let entry = env.lookup_type(&type_name).and_then(|definition| {
                    definition
                        .value_member(name)
                        .or_else(|| definition.static_member(name))
                });
                match entry {
                    Some(entry) => self.member_form(&type_name, name, entry),
                    None => Err(TypeError::unknown_member(
                        Type::named(type_name),
                        selector.clone(),
                        span.clone(),
                    )),
                }
            }
            (NormalForm::TypeConstructor { name, arguments }, MemberSelector::Named(member)) => {
                let Some(definition) = env.lookup_type(&name) else {
                    return Err(TypeError::internal(
                        format!("type `{}` vanished from the environment", name),
                        span.clone(),
                    ));
                };
                if definition.nested_type(member).is_some() {
                    return Ok(NormalForm::TypeConstructor {
                        name: format!("{}.{}", name, member),
                        arguments: vec![],
                    });
                }
                match definition.static_member(member) {
                    Some(entry) => self.member_form(&name, member, entry),
                    None => Err(TypeError::unknown_member(
                        Type::Constructor(name, arguments.iter().filter_map(NormalForm::to_type).collect()),
                        selector.clone(),
                        span.clone(),
                    )),
                }
            }
            (
                base @ (NormalForm::Identifier(_)
                | NormalForm::Application { .. }
                | NormalForm::Member { .. }
                | NormalForm::IfThenElse { .. }),
                selector,
            ) => Ok(NormalForm::Member {
                base: Box::new(base),
                selector: selector.clone(),
            }),
            (base, selector) => Err(TypeError::internal(
                format!("cannot select `{}` from `{}`", selector, base),
                span.clone(),
            )),
        }
    }

    fn member_form(
        &mut self,
        owner: &str,
        member: &str,
        entry: &SchemeEntry,
    ) -> Result<NormalForm, TypeError> {
        match entry {
            SchemeEntry::Binding {
                value: Some(value), ..
            } if !self.exhausted() => self.deeper(value),
            entry => Ok(match Self::entry_form(member, entry) {
                NormalForm::Identifier(_) => NormalForm::Member {
                    base: Box::new(NormalForm::TypeConstructor {
                        name: owner.to_string(),
                        arguments: vec![],
                    }),
                    selector: MemberSelector::Named(member.to_string()),
                },
                form => form,
            }),
        }
    }

    /// Blocks reduce by substituting each binding's value into the items
    /// that follow it.
    fn eval_block(&mut self, items: &[BlockItem<()>]) -> Result<NormalForm, TypeError> {
        match items.split_first() {
            None => Ok(NormalForm::unit()),
            Some((BlockItem::Expr(expr), [])) => self.eval(expr),
            Some((BlockItem::Expr(_), rest)) => self.eval_block(rest),
            Some((BlockItem::Binding(binding), rest)) => match &binding.value {
                Some(value) => {
                    let value = self.eval(value)?;
                    let replacements =
                        Replacements::from([(binding.name.clone(), value.quote())]);
                    self.eval_block(&substitute_items(rest, &replacements))
                }
                None => self.eval_block(rest),
            },
        }
    }
}
