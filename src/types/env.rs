//! # Environment Model
//!
//! Scoped tables built bottom-up from the declaration tree:
//!
//! - [`SchemeEnvironment`]: identifier → binding or function entry (scheme plus
//!   the value expression or body the evaluator can unfold)
//! - [`TypeEnvironment`]: type name → struct/enum member table, stored as an
//!   arena keyed by name
//! - [`MemberEnvironment`]: instance members, static members, nested types
//! - [`ModuleEnvironment`]: one scope of the chain `prelude → module → type
//!   body → nested type body`; lookups fall back to the enclosing scope
//!
//! Environments are built once, before inference, and never mutated by it.
//! Enclosing scopes are shared through `Rc`, so handing a snapshot to another
//! check is a cheap clone.

use std::collections::HashMap;
use std::rc::Rc;

use lachs::Span;

use crate::ast::{
    BindingDeclaration, Declaration, Expr, FunctionDeclaration, MemberSelector, TypeDeclaration,
};
use crate::eval::Evaluator;

use super::error::{TypeError, TypeErrorKind};
use super::options::InferOptions;
use super::ty::{ARRAY, BOOL, FLOAT64, INT32, STRING, Scheme, Type};

/// What a name in value position refers to.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemeEntry {
    Binding {
        value: Option<Expr<()>>,
        scheme: Scheme,
    },
    Function {
        parameters: Vec<String>,
        body: Option<Expr<()>>,
        scheme: Scheme,
    },
}

impl SchemeEntry {
    pub fn scheme(&self) -> &Scheme {
        match self {
            SchemeEntry::Binding { scheme, .. } | SchemeEntry::Function { scheme, .. } => scheme,
        }
    }

    /// Entry with a known signature but nothing to unfold.
    pub fn opaque(scheme: Scheme) -> Self {
        SchemeEntry::Binding {
            value: None,
            scheme,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemeEnvironment {
    entries: HashMap<String, SchemeEntry>,
}

impl SchemeEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn lookup(&self, name: &str) -> Option<&SchemeEntry> {
        self.entries.get(name)
    }

    pub fn insert(&mut self, name: String, entry: SchemeEntry, span: &Span) -> Result<(), TypeError> {
        if self.entries.contains_key(&name) {
            return Err(TypeError::redeclaration(name, span.clone()));
        }
        self.entries.insert(name, entry);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SchemeEntry)> {
        self.entries.iter()
    }

    pub fn var_ceiling(&self) -> usize {
        self.entries
            .values()
            .map(|entry| entry.scheme().var_ceiling())
            .max()
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeEnvironment {
    definitions: HashMap<String, TypeDefinition>,
}

impl TypeEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&TypeDefinition> {
        self.definitions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    /// Register a new type name in this scope.
    pub fn declare(
        &mut self,
        name: String,
        definition: TypeDefinition,
        span: &Span,
    ) -> Result<(), TypeError> {
        if self.definitions.contains_key(&name) {
            return Err(TypeError::redeclaration(name, span.clone()));
        }
        self.definitions.insert(name, definition);
        Ok(())
    }

    /// Overwrite the table of an already declared type.
    pub fn fill(&mut self, name: &str, definition: TypeDefinition) {
        if let Some(slot) = self.definitions.get_mut(name) {
            *slot = definition;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &TypeDefinition)> {
        self.definitions.iter()
    }

    pub fn var_ceiling(&self) -> usize {
        self.definitions
            .values()
            .map(Members::var_ceiling)
            .max()
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemberEnvironment {
    pub values: SchemeEnvironment,
    pub statics: SchemeEnvironment,
    pub types: TypeEnvironment,
}

impl MemberEnvironment {
    /// Instance and static members share one namespace.
    pub fn insert_value(
        &mut self,
        name: String,
        entry: SchemeEntry,
        is_static: bool,
        span: &Span,
    ) -> Result<(), TypeError> {
        if self.values.contains(&name) || self.statics.contains(&name) {
            return Err(TypeError::redeclaration(name, span.clone()));
        }
        if is_static {
            self.statics.insert(name, entry, span)
        } else {
            self.values.insert(name, entry, span)
        }
    }
}

/// Uniform accessors over struct and enum member tables.
pub trait Members {
    fn value_members(&self) -> &SchemeEnvironment;
    fn static_members(&self) -> &SchemeEnvironment;
    fn types(&self) -> &TypeEnvironment;

    fn value_member(&self, name: &str) -> Option<&SchemeEntry> {
        self.value_members().lookup(name)
    }

    fn static_member(&self, name: &str) -> Option<&SchemeEntry> {
        self.static_members().lookup(name)
    }

    fn nested_type(&self, name: &str) -> Option<&TypeDefinition> {
        self.types().get(name)
    }

    /// One past the largest variable id used by any member signature.
    fn var_ceiling(&self) -> usize {
        self.value_members()
            .var_ceiling()
            .max(self.static_members().var_ceiling())
            .max(self.types().var_ceiling())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructEnvironment {
    pub members: MemberEnvironment,
}

impl Members for StructEnvironment {
    fn value_members(&self) -> &SchemeEnvironment {
        &self.members.values
    }

    fn static_members(&self) -> &SchemeEnvironment {
        &self.members.statics
    }

    fn types(&self) -> &TypeEnvironment {
        &self.members.types
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnumEnvironment {
    pub members: MemberEnvironment,
    /// Case name → associated value types.
    pub cases: HashMap<String, Vec<Type>>,
}

impl EnumEnvironment {
    pub fn case(&self, name: &str) -> Option<&[Type]> {
        self.cases.get(name).map(Vec::as_slice)
    }
}

impl Members for EnumEnvironment {
    fn value_members(&self) -> &SchemeEnvironment {
        &self.members.values
    }

    fn static_members(&self) -> &SchemeEnvironment {
        &self.members.statics
    }

    fn types(&self) -> &TypeEnvironment {
        &self.members.types
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeDefinition {
    Struct(StructEnvironment),
    Enum(EnumEnvironment),
}

impl TypeDefinition {
    fn placeholder(is_enum: bool) -> Self {
        if is_enum {
            TypeDefinition::Enum(EnumEnvironment::default())
        } else {
            TypeDefinition::Struct(StructEnvironment::default())
        }
    }

    pub fn as_enum(&self) -> Option<&EnumEnvironment> {
        match self {
            TypeDefinition::Enum(inner) => Some(inner),
            TypeDefinition::Struct(_) => None,
        }
    }
}

impl Members for TypeDefinition {
    fn value_members(&self) -> &SchemeEnvironment {
        match self {
            TypeDefinition::Struct(inner) => inner.value_members(),
            TypeDefinition::Enum(inner) => inner.value_members(),
        }
    }

    fn static_members(&self) -> &SchemeEnvironment {
        match self {
            TypeDefinition::Struct(inner) => inner.static_members(),
            TypeDefinition::Enum(inner) => inner.static_members(),
        }
    }

    fn types(&self) -> &TypeEnvironment {
        match self {
            TypeDefinition::Struct(inner) => inner.types(),
            TypeDefinition::Enum(inner) => inner.types(),
        }
    }
}

/// One scope of bindings and types, shadowing its parent.
#[derive(Debug, Clone)]
pub struct ModuleEnvironment {
    /// Qualified name of the type whose body this scope is, if any.
    qualifier: Option<String>,
    schemes: SchemeEnvironment,
    types: TypeEnvironment,
    parent: Option<Rc<ModuleEnvironment>>,
    options: InferOptions,
}

impl ModuleEnvironment {
    /// Root scope declaring the builtin types as empty structs.
    pub fn prelude() -> Self {
        let mut types = TypeEnvironment::new();
        for name in [INT32, FLOAT64, BOOL, STRING, ARRAY] {
            types.definitions.insert(
                name.to_string(),
                TypeDefinition::Struct(StructEnvironment::default()),
            );
        }
        ModuleEnvironment {
            qualifier: None,
            schemes: SchemeEnvironment::new(),
            types,
            parent: None,
            options: InferOptions::default(),
        }
    }

    /// An empty module scope on top of the prelude.
    pub fn empty() -> Self {
        Self::empty_with_options(InferOptions::default())
    }

    pub fn empty_with_options(options: InferOptions) -> Self {
        let prelude = ModuleEnvironment {
            options,
            ..Self::prelude()
        };
        ModuleEnvironment::shadowing(Rc::new(prelude), None)
    }

    /// Build the environment of a module from its declarations.
    pub fn new(declarations: &[Declaration<()>]) -> Result<Self, TypeError> {
        Self::build(declarations, InferOptions::default())
    }

    pub fn build(
        declarations: &[Declaration<()>],
        options: InferOptions,
    ) -> Result<Self, TypeError> {
        let mut env = Self::empty_with_options(options);
        for declaration in declarations {
            env.insert(declaration)?;
        }
        Ok(env)
    }

    /// A fresh scope nested in `parent`.
    pub fn shadowing(parent: Rc<ModuleEnvironment>, qualifier: Option<String>) -> Self {
        ModuleEnvironment {
            qualifier,
            schemes: SchemeEnvironment::new(),
            types: TypeEnvironment::new(),
            options: parent.options,
            parent: Some(parent),
        }
    }

    pub fn options(&self) -> InferOptions {
        self.options
    }

    pub fn schemes(&self) -> &SchemeEnvironment {
        &self.schemes
    }

    pub fn types(&self) -> &TypeEnvironment {
        &self.types
    }

    pub fn parent(&self) -> Option<&ModuleEnvironment> {
        self.parent.as_deref()
    }

    /// Name under which a type declared in this scope is registered.
    pub fn qualify(&self, name: &str) -> String {
        match &self.qualifier {
            Some(qualifier) => format!("{}.{}", qualifier, name),
            None => name.to_string(),
        }
    }

    /// Add a signature-only binding to this scope.
    pub fn insert_scheme(&mut self, name: impl ToString, scheme: Scheme) -> Result<(), TypeError> {
        self.schemes
            .insert(name.to_string(), SchemeEntry::opaque(scheme), &Span::default())
    }

    /// First variable id not mentioned by any signature in this scope chain.
    pub fn next_var_id(&self) -> usize {
        self.schemes
            .var_ceiling()
            .max(self.types.var_ceiling())
            .max(self.parent.as_ref().map_or(0, |p| p.next_var_id()))
    }

    pub fn lookup(&self, name: &str) -> Option<&SchemeEntry> {
        self.schemes
            .lookup(name)
            .or_else(|| self.parent.as_ref().and_then(|p| p.lookup(name)))
    }

    pub fn scheme(&self, name: &str, span: &Span) -> Result<&Scheme, TypeError> {
        self.lookup(name)
            .map(SchemeEntry::scheme)
            .ok_or_else(|| TypeError::unbound_name(name, span.clone()))
    }

    /// Resolve a possibly dotted type name (`Outer.Inner`) to its qualified
    /// name and member table.
    pub fn resolve_type(&self, name: &str) -> Option<(String, &TypeDefinition)> {
        let mut segments = name.split('.');
        let (mut qualified, mut definition) = self.resolve_type_head(segments.next()?)?;
        for segment in segments {
            definition = definition.nested_type(segment)?;
            qualified = format!("{}.{}", qualified, segment);
        }
        Some((qualified, definition))
    }

    fn resolve_type_head(&self, name: &str) -> Option<(String, &TypeDefinition)> {
        match self.types.get(name) {
            Some(definition) => Some((self.qualify(name), definition)),
            None => self.parent.as_ref()?.resolve_type_head(name),
        }
    }

    pub fn lookup_type(&self, name: &str) -> Option<&TypeDefinition> {
        self.resolve_type(name).map(|(_, definition)| definition)
    }

    /// Scheme of an instance member of the named type.
    pub fn instance_member(
        &self,
        owner: &Type,
        type_name: &str,
        selector: &MemberSelector,
        span: &Span,
    ) -> Result<&Scheme, TypeError> {
        self.member_of(owner, type_name, selector, span, |d, name| d.value_member(name))
    }

    /// Scheme of a static member (including enum cases) of the named type.
    pub fn static_member(
        &self,
        owner: &Type,
        type_name: &str,
        selector: &MemberSelector,
        span: &Span,
    ) -> Result<&Scheme, TypeError> {
        self.member_of(owner, type_name, selector, span, |d, name| d.static_member(name))
    }

    fn member_of<'a>(
        &'a self,
        owner: &Type,
        type_name: &str,
        selector: &MemberSelector,
        span: &Span,
        find: impl FnOnce(&'a TypeDefinition, &str) -> Option<&'a SchemeEntry>,
    ) -> Result<&'a Scheme, TypeError> {
        let definition = self
            .lookup_type(type_name)
            .ok_or_else(|| TypeError::unknown_type(type_name, span.clone()))?;
        let unknown = || TypeError::unknown_member(owner.clone(), selector.clone(), span.clone());
        match selector {
            MemberSelector::Named(name) => find(definition, name)
                .map(SchemeEntry::scheme)
                .ok_or_else(unknown),
            MemberSelector::Index(_) => Err(unknown()),
        }
    }

    /// Scope of a type's body: nested type names resolve directly, everything
    /// else falls back to this environment.
    pub fn type_scope(&self, qualified: &str) -> Option<ModuleEnvironment> {
        let (qualified, definition) = self.resolve_type(qualified)?;
        let mut scope = ModuleEnvironment::shadowing(Rc::new(self.clone()), Some(qualified));
        scope.types = definition.types().clone();
        Some(scope)
    }

    /// Reduce an annotation expression to the type it denotes.
    pub fn resolve_annotation(&self, annotation: &Expr<()>) -> Result<Type, TypeError> {
        let normal_form = Evaluator::new(self).eval(annotation)?;
        normal_form
            .to_type()
            .ok_or_else(|| TypeError::unknown_type(&normal_form, annotation.position().clone()))
    }

    /// Extend this scope with one declaration.
    pub fn insert(&mut self, declaration: &Declaration<()>) -> Result<(), TypeError> {
        match declaration {
            Declaration::Binding(binding) => {
                let entry = self.binding_entry(binding)?;
                tracing::debug!("binding {} : {}", binding.name, entry.scheme());
                self.schemes
                    .insert(binding.name.clone(), entry, &binding.position)
            }
            Declaration::Function(function) => {
                let entry = self.function_entry(function)?;
                tracing::debug!("function {} : {}", function.name, entry.scheme());
                self.schemes
                    .insert(function.name.clone(), entry, &function.position)
            }
            Declaration::Struct(declaration) => self.insert_type(declaration, false),
            Declaration::Enum(declaration) => self.insert_type(declaration, true),
            Declaration::EnumCase(case) => Err(TypeError::new(
                TypeErrorKind::CaseOutsideEnum {
                    name: case.name.clone(),
                },
                case.position.clone(),
            )),
            Declaration::Trait(declaration) => {
                tracing::debug!("skipping trait {}", declaration.name);
                Ok(())
            }
        }
    }

    /// Install an empty table under the name first so that members can refer
    /// to the enclosing type, then replace it with the resolved table.
    fn insert_type(
        &mut self,
        declaration: &TypeDeclaration<()>,
        is_enum: bool,
    ) -> Result<(), TypeError> {
        self.types.declare(
            declaration.name.clone(),
            TypeDefinition::placeholder(is_enum),
            &declaration.position,
        )?;
        let definition = self.extend(declaration, is_enum)?;
        tracing::debug!(
            "type {} ({} members)",
            self.qualify(&declaration.name),
            definition.value_members().len() + definition.static_members().len()
        );
        self.types.fill(&declaration.name, definition);
        Ok(())
    }

    /// Fold the member declarations of a struct or enum into a member table.
    fn extend(
        &self,
        declaration: &TypeDeclaration<()>,
        is_enum: bool,
    ) -> Result<TypeDefinition, TypeError> {
        let qualified = self.qualify(&declaration.name);
        let self_type = Type::named(&qualified);
        let mut scope = ModuleEnvironment::shadowing(Rc::new(self.clone()), Some(qualified));

        // nested types first, so value members may mention them in any order
        for member in &declaration.members {
            if matches!(member, Declaration::Struct(_) | Declaration::Enum(_)) {
                scope.insert(member)?;
            }
        }

        let mut members = MemberEnvironment::default();
        let mut cases = HashMap::new();

        for member in &declaration.members {
            match member {
                Declaration::Binding(binding) => {
                    let entry = scope.binding_entry(binding)?;
                    members.insert_value(
                        binding.name.clone(),
                        entry,
                        member.is_static(),
                        &binding.position,
                    )?;
                }
                Declaration::Function(function) => {
                    let entry = scope.function_entry(function)?;
                    members.insert_value(
                        function.name.clone(),
                        entry,
                        member.is_static(),
                        &function.position,
                    )?;
                }
                Declaration::EnumCase(case) => {
                    if !is_enum {
                        return Err(TypeError::new(
                            TypeErrorKind::CaseOutsideEnum {
                                name: case.name.clone(),
                            },
                            case.position.clone(),
                        ));
                    }
                    if !case.modifiers.is_empty() {
                        return Err(TypeError::new(
                            TypeErrorKind::CaseModifier {
                                name: case.name.clone(),
                            },
                            case.position.clone(),
                        ));
                    }
                    let associated = case
                        .associated_values
                        .iter()
                        .map(|annotation| scope.resolve_annotation(annotation))
                        .collect::<Result<Vec<_>, _>>()?;
                    let ty = if associated.is_empty() {
                        self_type.clone()
                    } else {
                        Type::arrow(associated.clone(), self_type.clone())
                    };
                    members.insert_value(
                        case.name.clone(),
                        SchemeEntry::opaque(Scheme::monomorphic(ty)),
                        true,
                        &case.position,
                    )?;
                    cases.insert(case.name.clone(), associated);
                }
                Declaration::Struct(_) | Declaration::Enum(_) => {}
                Declaration::Trait(declaration) => {
                    tracing::debug!("skipping trait {}", declaration.name);
                }
            }
        }

        members.types = scope.types;

        Ok(if is_enum {
            TypeDefinition::Enum(EnumEnvironment { members, cases })
        } else {
            TypeDefinition::Struct(StructEnvironment { members })
        })
    }

    fn binding_entry(&self, binding: &BindingDeclaration<()>) -> Result<SchemeEntry, TypeError> {
        let scheme = match (&binding.annotation, &binding.value) {
            (Some(annotation), _) => Scheme::monomorphic(self.resolve_annotation(annotation)?),
            (None, Some(value)) => {
                let typed = value.annotate(self)?;
                Scheme::generalize(typed.info().clone())
            }
            (None, None) => {
                return Err(TypeError::new(
                    TypeErrorKind::MissingAnnotation {
                        name: binding.name.clone(),
                    },
                    binding.position.clone(),
                ));
            }
        };
        Ok(SchemeEntry::Binding {
            value: binding.value.clone(),
            scheme,
        })
    }

    fn function_entry(
        &self,
        function: &FunctionDeclaration<()>,
    ) -> Result<SchemeEntry, TypeError> {
        let parameters = function
            .parameters
            .iter()
            .map(|parameter| self.resolve_annotation(&parameter.annotation))
            .collect::<Result<Vec<_>, _>>()?;
        let result = match &function.return_type {
            Some(annotation) => self.resolve_annotation(annotation)?,
            None => Type::unit(),
        };
        Ok(SchemeEntry::Function {
            parameters: function
                .parameters
                .iter()
                .map(|parameter| parameter.name.clone())
                .collect(),
            body: function.body.clone().map(Expr::Block),
            scheme: Scheme::monomorphic(Type::arrow(parameters, result)),
        })
    }
}
