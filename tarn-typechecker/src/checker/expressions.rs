//! Right-to-left folding of prefix expressions
//!
//! The nodes are first linearized into operand and call entries. Scanning them
//! from the end means every call is met after all of its arguments have been
//! reduced, so each call pops its arguments from the operand stack and pushes
//! its return type in their place.

use super::{Callee, ExprKind, ExprNode};
use crate::arena::TypeArena;
use crate::bindings::{Binding, Bindings, OverloadRef};
use crate::dispatch::OverloadRegistry;
use crate::entity::Entity;
use crate::error::{to_source_span, InternalError, TypeError, TypeResult};
use crate::generics::{instantiate, GenericMatcher, ParamBindings};
use crate::internal_error;
use crate::types::{EntityId, TypeElement, TypeId};
use tarn_parser::{NameId, NameTable, Span};
use tracing::instrument;

/// One linearized node
#[derive(Debug, Clone, Copy)]
enum StackEntry {
    Operand(Operand),
    Call {
        node: usize,
        callee: Callee,
        name: NameId,
        arity: usize,
        span: Span,
    },
}

/// A reduced value; untyped entities get their type from the call consuming them
#[derive(Debug, Clone, Copy)]
struct Operand {
    type_id: Option<TypeId>,
    entity: Option<EntityId>,
    span: Span,
}

/// How a call's parameters relate to its arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallMode {
    /// An overload whose type parameters are bound per call
    Generic,
    /// A function-typed entity; its parameters belong to the enclosing declaration
    Rigid,
}

pub struct ExpressionTypeChecker<'a> {
    arena: &'a mut TypeArena,
    entities: &'a mut Vec<Entity>,
    bindings: &'a Bindings,
    overloads: &'a OverloadRegistry,
    names: &'a NameTable,
    /// Parameter arities of the enclosing generic declaration, if any
    scope_arities: &'a [u8],
}

impl<'a> ExpressionTypeChecker<'a> {
    pub fn new(
        arena: &'a mut TypeArena,
        entities: &'a mut Vec<Entity>,
        bindings: &'a Bindings,
        overloads: &'a OverloadRegistry,
        names: &'a NameTable,
    ) -> Self {
        Self {
            arena,
            entities,
            bindings,
            overloads,
            names,
            scope_arities: &[],
        }
    }

    pub fn with_scope(mut self, scope_arities: &'a [u8]) -> Self {
        self.scope_arities = scope_arities;
        self
    }

    /// Type check one expression, rewriting its calls to the resolved overloads
    #[instrument(skip_all, fields(nodes = nodes.len()))]
    pub fn check(&mut self, nodes: &mut [ExprNode]) -> TypeResult<TypeId> {
        let entries = self.populate_exp_stack(nodes)?;
        self.resolve(&entries, nodes)
    }

    fn populate_exp_stack(&self, nodes: &[ExprNode]) -> TypeResult<Vec<StackEntry>> {
        nodes
            .iter()
            .enumerate()
            .map(|(index, node)| match node.kind {
                ExprKind::Literal(type_id) => Ok(StackEntry::Operand(Operand {
                    type_id: Some(type_id),
                    entity: None,
                    span: node.span,
                })),
                ExprKind::Ident(name) => self.identifier(name, node.span).map(StackEntry::Operand),
                ExprKind::Call {
                    callee,
                    name,
                    arity,
                } => Ok(StackEntry::Call {
                    node: index,
                    callee,
                    name,
                    arity,
                    span: node.span,
                }),
            })
            .collect()
    }

    fn identifier(&self, name: NameId, span: Span) -> TypeResult<Operand> {
        match self.bindings.get(name) {
            Binding::Entity(entity) => Ok(Operand {
                type_id: self.entity(entity)?.type_id,
                entity: Some(entity),
                span,
            }),
            // A function named without calling it, usable when it has a single overload
            Binding::Overloaded(OverloadRef::Final(table)) => {
                match self.overloads.table(table) {
                    Some(table) if table.len() == 1 => Ok(Operand {
                        type_id: table.fn_types.first().copied(),
                        entity: table.entities.first().copied(),
                        span,
                    }),
                    Some(_) => Err(TypeError::UnknownIdentifier {
                        name: self.names.display(name).to_string(),
                        span: to_source_span(Some(span)),
                    }),
                    None => Err(internal_error!(InternalError::DanglingOverload)),
                }
            }
            _ => Err(TypeError::UnknownIdentifier {
                name: self.names.display(name).to_string(),
                span: to_source_span(Some(span)),
            }),
        }
    }

    fn resolve(&mut self, entries: &[StackEntry], nodes: &mut [ExprNode]) -> TypeResult<TypeId> {
        // The last element is the leftmost pending operand
        let mut operands: Vec<Operand> = Vec::new();

        for entry in entries.iter().rev() {
            match *entry {
                StackEntry::Operand(operand) => operands.push(operand),
                StackEntry::Call {
                    node,
                    callee,
                    name,
                    arity,
                    span,
                } => {
                    if operands.len() < arity {
                        return Err(TypeError::UnresolvedExpression {
                            span: to_source_span(Some(span)),
                        });
                    }
                    let start = operands.len() - arity;
                    let args: Vec<Operand> = operands.drain(start..).rev().collect();
                    let (entity, ret) = self.resolve_call(callee, name, &args, span)?;

                    if let Some(node) = nodes.get_mut(node) {
                        node.kind = ExprKind::Call {
                            callee: Callee::Resolved(entity),
                            name,
                            arity,
                        };
                    }
                    operands.push(Operand {
                        type_id: Some(ret),
                        entity: None,
                        span,
                    });
                }
            }
        }

        match operands.as_slice() {
            [operand] => match self.operand_type(operand) {
                Some(type_id) => Ok(type_id),
                None => Err(TypeError::UnresolvedExpression {
                    span: to_source_span(Some(operand.span)),
                }),
            },
            _ => Err(TypeError::UnresolvedExpression {
                span: to_source_span(nodes.first().map(|node| node.span)),
            }),
        }
    }

    /// Pick the function for a call and compute its return type
    fn resolve_call(
        &mut self,
        callee: Callee,
        name: NameId,
        args: &[Operand],
        span: Span,
    ) -> TypeResult<(EntityId, TypeId)> {
        let first_arg = match args.first() {
            None => None,
            Some(first) => match self.operand_type(first) {
                Some(type_id) => Some(type_id),
                None => {
                    return Err(TypeError::TypeUnknownFirstArg {
                        name: self.names.display(name).to_string(),
                        span: to_source_span(Some(first.span)),
                    })
                }
            },
        };

        let (entity, fn_type, mode) = match callee {
            Callee::Resolved(entity) => self.function_entity(entity, name, span)?,
            Callee::Unresolved(_) => match self.bindings.get(name) {
                Binding::Overloaded(OverloadRef::Final(table)) => {
                    self.dispatch(table, name, first_arg, args.len(), span)?
                }
                Binding::Overloaded(OverloadRef::Raw(_)) => {
                    return Err(internal_error!(InternalError::DanglingOverload))
                }
                Binding::Entity(entity) => self.function_entity(entity, name, span)?,
                Binding::Unbound | Binding::Type(_) => {
                    return Err(TypeError::UnknownFunction {
                        name: self.names.display(name).to_string(),
                        span: to_source_span(Some(span)),
                    })
                }
            },
        };

        if self.arena.arity(fn_type) != args.len() {
            return Err(TypeError::TypeNoMatchingOverload {
                name: self.names.display(name).to_string(),
                found: format!("{} arguments", args.len()),
                span: to_source_span(Some(span)),
            });
        }

        let ret = self.check_arguments(fn_type, mode, args, span)?;
        tracing::debug!(
            function = self.names.display(name),
            entity = entity.0,
            result = %self.arena.describe(ret, self.names),
            "resolved call"
        );
        Ok((entity, ret))
    }

    fn dispatch(
        &self,
        table_id: usize,
        name: NameId,
        first_arg: Option<TypeId>,
        arg_count: usize,
        span: Span,
    ) -> TypeResult<(EntityId, TypeId, CallMode)> {
        let table = self
            .overloads
            .table(table_id)
            .ok_or(internal_error!(InternalError::DanglingOverload))?;

        let found = self.overloads.find_overload(table_id, first_arg, self.arena);
        let Some(index) = found else {
            let found = match first_arg {
                Some(arg) => self.arena.describe(arg, self.names),
                None if arg_count == 0 => "no arguments".to_string(),
                None => format!("{} arguments", arg_count),
            };
            return Err(TypeError::TypeNoMatchingOverload {
                name: self.names.display(name).to_string(),
                found,
                span: to_source_span(Some(span)),
            });
        };

        match (table.entities.get(index), table.fn_types.get(index)) {
            (Some(entity), Some(fn_type)) => Ok((*entity, *fn_type, CallMode::Generic)),
            _ => Err(internal_error!(InternalError::DanglingOverload)),
        }
    }

    /// A call through an entity holding a function value
    fn function_entity(
        &self,
        entity: EntityId,
        name: NameId,
        span: Span,
    ) -> TypeResult<(EntityId, TypeId, CallMode)> {
        match self.entity(entity)?.type_id {
            Some(fn_type) if self.arena.is_function(fn_type) => {
                Ok((entity, fn_type, CallMode::Rigid))
            }
            _ => Err(TypeError::UnknownFunction {
                name: self.names.display(name).to_string(),
                span: to_source_span(Some(span)),
            }),
        }
    }

    /// Check every argument against its parameter and return the call's type
    fn check_arguments(
        &mut self,
        fn_type: TypeId,
        mode: CallMode,
        args: &[Operand],
        span: Span,
    ) -> TypeResult<TypeId> {
        let params = self
            .arena
            .fn_params(fn_type)
            .ok_or(internal_error!(InternalError::NotAFunction))?;
        let ret = self
            .arena
            .fn_return(fn_type)
            .ok_or(internal_error!(InternalError::NotAFunction))?;

        match mode {
            CallMode::Generic => {
                let mut bindings = ParamBindings::new();
                let mut untyped = Vec::new();
                for (param, arg) in params.iter().zip(args) {
                    match self.operand_type(arg) {
                        Some(found) => {
                            let matcher = GenericMatcher::new(self.arena);
                            if !matcher.match_element(*param, found, &mut bindings) {
                                return Err(self.wrong_argument(*param, found, arg.span));
                            }
                        }
                        None => untyped.push((*param, *arg)),
                    }
                }

                for (param, arg) in untyped {
                    let declared =
                        instantiate(self.arena, param, &bindings, self.scope_arities, Some(arg.span))?;
                    self.back_propagate(arg, declared)?;
                }
                instantiate(self.arena, ret, &bindings, self.scope_arities, Some(span))
            }
            CallMode::Rigid => {
                for (param, arg) in params.iter().zip(args) {
                    let expected = self.rigid_type(*param)?;
                    match self.operand_type(arg) {
                        Some(found) if found == expected => {}
                        Some(found) => return Err(self.wrong_argument(*param, found, arg.span)),
                        None => self.back_propagate(*arg, expected)?,
                    }
                }
                self.rigid_type(ret)
            }
        }
    }

    /// A slot of a function value, read in the enclosing declaration's scope
    fn rigid_type(&mut self, element: TypeElement) -> TypeResult<TypeId> {
        let tree = self.arena.element_tree(element);
        self.arena.intern_tree(&tree, self.scope_arities)
    }

    fn back_propagate(&mut self, arg: Operand, declared: TypeId) -> TypeResult<()> {
        let Some(entity_id) = arg.entity else {
            return Ok(());
        };
        let description = self.arena.describe(declared, self.names);
        let entity = self
            .entities
            .get_mut(entity_id.index())
            .ok_or(internal_error!(InternalError::DanglingEntity))?;
        entity.type_id = Some(declared);
        tracing::debug!(
            entity = entity_id.0,
            name = self.names.display(entity.name),
            inferred = %description,
            "typed entity from call"
        );
        Ok(())
    }

    fn wrong_argument(&self, param: TypeElement, found: TypeId, span: Span) -> TypeError {
        TypeError::TypeWrongArgumentType {
            expected: self.arena.describe_element(param, self.names),
            found: self.arena.describe(found, self.names),
            span: to_source_span(Some(span)),
        }
    }

    /// Current type of an operand, seeing types inferred earlier in the same expression
    fn operand_type(&self, operand: &Operand) -> Option<TypeId> {
        operand.type_id.or_else(|| {
            operand
                .entity
                .and_then(|entity| self.entities.get(entity.index()))
                .and_then(|entity| entity.type_id)
        })
    }

    fn entity(&self, entity: EntityId) -> TypeResult<&Entity> {
        self.entities
            .get(entity.index())
            .ok_or(internal_error!(InternalError::DanglingEntity))
    }
}
