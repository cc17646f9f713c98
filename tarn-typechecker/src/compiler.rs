//! Compilation context
//!
//! The [`Compiler`] owns every table of one compilation unit and runs the
//! passes in order: signatures, overload finalization, then function bodies.

use crate::arena::TypeArena;
use crate::bindings::{Binding, Bindings, OverloadRef};
use crate::checker::{lower_nodes, ExprNode, ExpressionTypeChecker};
use crate::dispatch::OverloadRegistry;
use crate::entity::{Entity, EntityClass};
use crate::error::{to_source_span, InternalError, TypeError, TypeResult};
use crate::internal_error;
use crate::options::CompilerOptions;
use crate::prelude;
use crate::type_expr::{define, DeclKind, DefinedType, TypeExprContext};
use crate::types::{EntityId, OuterType, Sort, TypeElement, TypeHeader, TypeId};
use tarn_parser::{FnDecl, Item, Module, NameId, NameTable, Span, Token};
use tracing::instrument;

/// A function body after checking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckedBody {
    /// Body nodes with every call resolved to its overload
    pub nodes: Vec<ExprNode>,
    pub type_id: TypeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckedFunction {
    pub name: NameId,
    pub entity: EntityId,
    pub type_id: TypeId,
    pub body: Option<CheckedBody>,
}

/// Result of checking a module
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckedModule {
    pub types: Vec<(NameId, TypeId)>,
    pub functions: Vec<CheckedFunction>,
}

/// A declared function waiting for its body to be checked
pub(crate) struct PendingFunction<'m> {
    decl: &'m FnDecl,
    entity: EntityId,
    defined: DefinedType,
}

#[derive(Debug, Clone)]
pub struct Compiler {
    options: CompilerOptions,
    names: NameTable,
    arena: TypeArena,
    entities: Vec<Entity>,
    bindings: Bindings,
    overloads: OverloadRegistry,
}

impl Compiler {
    pub fn new() -> TypeResult<Self> {
        Self::with_options(CompilerOptions::default())
    }

    pub fn with_options(options: CompilerOptions) -> TypeResult<Self> {
        let mut compiler = Self {
            names: NameTable::new(),
            arena: TypeArena::with_capacity(options.arena_capacity),
            entities: Vec::new(),
            bindings: Bindings::new(),
            overloads: OverloadRegistry::new(),
            options,
        };

        for id in 0..TypeId::PRIMITIVE_COUNT {
            let id = TypeId(id);
            if let Some(name) = id.primitive_name() {
                compiler.bindings.set(name, Binding::Type(id));
            }
        }
        if compiler.options.load_prelude {
            prelude::load(&mut compiler)?;
        }
        Ok(compiler)
    }

    /// Define a type from its declaration tokens, binding it to `name` when given
    ///
    /// Redefining a name to the identical type is allowed and returns the same id.
    pub fn define_type(
        &mut self,
        name: Option<NameId>,
        tokens: &[Token],
        span: Option<Span>,
    ) -> TypeResult<TypeId> {
        let existing = match name.map(|name| self.bindings.get(name)) {
            None | Some(Binding::Unbound) => None,
            Some(Binding::Type(id)) => Some(id),
            Some(_) => return Err(self.shadowing(name, span)),
        };

        let defined = self.define_tokens(tokens, DeclKind::Type(name))?;
        match (name, existing) {
            (Some(_), Some(id)) if id == defined.type_id => Ok(id),
            (Some(_), Some(_)) => Err(self.shadowing(name, span)),
            (Some(name), None) => {
                self.bindings.set(name, Binding::Type(defined.type_id));
                tracing::debug!(
                    name = self.names.display(name),
                    type_id = defined.type_id.0,
                    "defined type"
                );
                Ok(defined.type_id)
            }
            (None, _) => Ok(defined.type_id),
        }
    }

    /// Define the function type of a signature, keeping its parameter names
    pub fn define_signature(&mut self, tokens: &[Token]) -> TypeResult<DefinedType> {
        self.define_tokens(tokens, DeclKind::Signature)
    }

    fn define_tokens(&mut self, tokens: &[Token], kind: DeclKind) -> TypeResult<DefinedType> {
        let mut ctx = TypeExprContext {
            arena: &mut self.arena,
            names: &self.names,
            bindings: &self.bindings,
            max_type_params: self.options.max_type_params,
        };
        define(&mut ctx, tokens, kind)
    }

    /// Create an entity; variables are also bound to their name
    pub fn declare_entity(
        &mut self,
        name: NameId,
        type_id: Option<TypeId>,
        class: EntityClass,
        span: Option<Span>,
    ) -> TypeResult<EntityId> {
        if class != EntityClass::Function && self.bindings.get(name) != Binding::Unbound {
            return Err(self.shadowing(Some(name), span));
        }
        let id = self.push_entity(Entity::new(name, type_id, class, span))?;
        if class != EntityClass::Function {
            self.bindings.set(name, Binding::Entity(id));
        }
        Ok(id)
    }

    fn push_entity(&mut self, entity: Entity) -> TypeResult<EntityId> {
        let id = u32::try_from(self.entities.len()).map_err(|_| TypeError::WordLengthExceeded {
            what: "too many entities".to_string(),
            span: to_source_span(entity.span),
        })?;
        self.entities.push(entity);
        Ok(EntityId(id))
    }

    /// Register `entity` as an overload of `name`
    pub fn declare_overload(
        &mut self,
        name: NameId,
        type_id: TypeId,
        entity: EntityId,
    ) -> TypeResult<()> {
        let span = self.entities.get(entity.index()).and_then(|entity| entity.span);
        match self.bindings.get(name) {
            Binding::Unbound | Binding::Overloaded(OverloadRef::Raw(_)) => {
                let handle = self
                    .overloads
                    .add_raw_overload(name, type_id, entity, span, &self.arena)?;
                self.bindings.set(name, Binding::Overloaded(OverloadRef::Raw(handle)));
                Ok(())
            }
            Binding::Overloaded(OverloadRef::Final(_)) => {
                Err(internal_error!(InternalError::RegistryFrozen))
            }
            Binding::Type(_) | Binding::Entity(_) => Err(self.shadowing(Some(name), span)),
        }
    }

    /// Declare a function from its signature tokens
    pub fn declare_function(
        &mut self,
        name: NameId,
        tokens: &[Token],
        span: Option<Span>,
    ) -> TypeResult<(EntityId, DefinedType)> {
        let defined = self.define_signature(tokens)?;
        let entity = self.declare_entity(name, Some(defined.type_id), EntityClass::Function, span)?;
        self.declare_overload(name, defined.type_id, entity)?;
        Ok((entity, defined))
    }

    /// Build a function type from concrete parameter and return types
    pub fn add_concr_fn_type(&mut self, params: &[TypeId], ret: TypeId) -> TypeResult<TypeId> {
        let arity = u8::try_from(params.len()).map_err(|_| TypeError::WordLengthExceeded {
            what: format!("{} function parameters", params.len()),
            span: None,
        })?;
        let mut builder = self.arena.begin(TypeHeader::new(Sort::Function, arity, 0));
        for param in params {
            builder.push_element(TypeElement::Concrete(*param));
        }
        builder.push_element(TypeElement::Concrete(ret));
        self.arena.commit(builder)
    }

    /// Sort and validate every overload set, after which no overloads can be added
    #[instrument(skip(self))]
    pub fn finalize_overloads(&mut self) -> TypeResult<()> {
        let finalized = self.overloads.finalize(&self.arena, &self.names)?;
        for (name, table) in finalized {
            self.bindings
                .set(name, Binding::Overloaded(OverloadRef::Final(table)));
        }
        Ok(())
    }

    /// Type check an expression in the global scope, resolving its calls in place
    pub fn type_check_expression(&mut self, nodes: &mut [ExprNode]) -> TypeResult<TypeId> {
        self.check_nodes(nodes, &[])
    }

    fn check_nodes(&mut self, nodes: &mut [ExprNode], scope_arities: &[u8]) -> TypeResult<TypeId> {
        ExpressionTypeChecker::new(
            &mut self.arena,
            &mut self.entities,
            &self.bindings,
            &self.overloads,
            &self.names,
        )
        .with_scope(scope_arities)
        .check(nodes)
    }

    /// Check a whole module: declarations first, then every function body
    #[instrument(skip_all, fields(items = module.items.len()))]
    pub fn check_module(&mut self, module: &Module) -> TypeResult<CheckedModule> {
        let (types, pending) = self.declare_items(module)?;
        self.finalize_overloads()?;

        let mut functions = Vec::with_capacity(pending.len());
        for function in pending {
            let body = match module.body_nodes(function.decl) {
                Some(nodes) => Some(self.check_body(&function, nodes)?),
                None => None,
            };
            functions.push(CheckedFunction {
                name: function.decl.name,
                entity: function.entity,
                type_id: function.defined.type_id,
                body,
            });
        }

        tracing::info!(
            types = types.len(),
            functions = functions.len(),
            "module checked"
        );
        Ok(CheckedModule { types, functions })
    }

    /// Signature pass over a module's items
    pub(crate) fn declare_items<'m>(
        &mut self,
        module: &'m Module,
    ) -> TypeResult<(Vec<(NameId, TypeId)>, Vec<PendingFunction<'m>>)> {
        let mut types = Vec::new();
        let mut pending = Vec::new();
        for item in &module.items {
            match item {
                Item::Type(decl) => {
                    let id = self.define_type(Some(decl.name), module.type_tokens(decl), Some(decl.span))?;
                    types.push((decl.name, id));
                }
                Item::Function(decl) => {
                    let (entity, defined) =
                        self.declare_function(decl.name, module.signature_tokens(decl), Some(decl.span))?;
                    pending.push(PendingFunction {
                        decl,
                        entity,
                        defined,
                    });
                }
            }
        }
        Ok((types, pending))
    }

    /// Check a body with the function's parameters in scope
    fn check_body(
        &mut self,
        function: &PendingFunction<'_>,
        nodes: &[tarn_parser::ExprNode],
    ) -> TypeResult<CheckedBody> {
        let fn_type = function.defined.type_id;
        let arities = &function.defined.param_arities;
        let params = self
            .arena
            .fn_params(fn_type)
            .ok_or(internal_error!(InternalError::NotAFunction))?;
        let declared_ret = self
            .arena
            .fn_return(fn_type)
            .ok_or(internal_error!(InternalError::NotAFunction))?;

        let mut saved = Vec::with_capacity(params.len());
        let mut scoped = Ok(());
        for ((name, span), element) in function.defined.params.iter().zip(&params) {
            let tree = self.arena.element_tree(*element);
            let entity = self.arena.intern_tree(&tree, arities).and_then(|type_id| {
                self.push_entity(Entity::new(
                    *name,
                    Some(type_id),
                    EntityClass::Immutable,
                    Some(*span),
                ))
            });
            match entity {
                Ok(entity) => saved.push((*name, self.bindings.set(*name, Binding::Entity(entity)))),
                Err(err) => {
                    scoped = Err(err);
                    break;
                }
            }
        }

        let mut lowered = lower_nodes(nodes);
        let checked = scoped.and_then(|()| self.check_nodes(&mut lowered, arities));
        for (name, previous) in saved.into_iter().rev() {
            self.bindings.restore(name, previous);
        }
        let body_type = checked?;

        let tree = self.arena.element_tree(declared_ret);
        let expected = self.arena.intern_tree(&tree, arities)?;
        if body_type != expected {
            let span = nodes.first().map(|first| {
                let end = nodes.iter().map(|node| node.span.end).max().unwrap_or(first.span.end);
                Span::new(first.span.start, end)
            });
            return Err(TypeError::TypeWrongReturnType {
                expected: self.arena.describe(expected, &self.names),
                found: self.arena.describe(body_type, &self.names),
                span: to_source_span(span),
            });
        }

        Ok(CheckedBody {
            nodes: lowered,
            type_id: body_type,
        })
    }

    pub fn type_arity(&self, id: TypeId) -> usize {
        self.arena.arity(id)
    }

    pub fn type_is_function(&self, id: TypeId) -> bool {
        self.arena.is_function(id)
    }

    pub fn type_get_outer(&self, id: TypeId) -> OuterType {
        self.arena.outer(id)
    }

    pub fn describe_type(&self, id: TypeId) -> String {
        self.arena.describe(id, &self.names)
    }

    /// The type a name is bound to, if it names a type
    pub fn lookup_type(&self, name: &str) -> Option<TypeId> {
        match self.bindings.get(self.names.get(name)?) {
            Binding::Type(id) => Some(id),
            _ => None,
        }
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    pub fn names(&self) -> &NameTable {
        &self.names
    }

    pub fn names_mut(&mut self) -> &mut NameTable {
        &mut self.names
    }

    pub fn arena(&self) -> &TypeArena {
        &self.arena
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id.index())
    }

    pub fn binding(&self, name: NameId) -> Binding {
        self.bindings.get(name)
    }

    pub fn overloads(&self) -> &OverloadRegistry {
        &self.overloads
    }

    fn shadowing(&self, name: Option<NameId>, span: Option<Span>) -> TypeError {
        TypeError::AssignmentShadowing {
            name: name
                .map(|name| self.names.display(name).to_string())
                .unwrap_or_default(),
            span: to_source_span(span),
        }
    }
}
