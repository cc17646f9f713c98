//! Backward reduction of a type expression into interned types

use super::{DeclKind, DeclaredParam, ExprItem, TypeExprContext};
use crate::error::{to_source_span, InternalError, TypeError, TypeResult};
use crate::internal_error;
use crate::types::{Sort, TypeElement, TypeHeader, TypeId};

pub struct TypeExpressionEvaluator<'c, 'a, 'p> {
    ctx: &'c mut TypeExprContext<'a>,
    params: &'p [DeclaredParam],
    kind: DeclKind,
}

impl<'c, 'a, 'p> TypeExpressionEvaluator<'c, 'a, 'p> {
    pub fn new(ctx: &'c mut TypeExprContext<'a>, params: &'p [DeclaredParam], kind: DeclKind) -> Self {
        Self { ctx, params, kind }
    }

    /// Reduce every compound node, innermost first, and return the root type
    pub fn evaluate(mut self, mut items: Vec<ExprItem>) -> TypeResult<TypeId> {
        for index in (0..items.len()).rev() {
            let item = items[index];
            let Some(children) = item.children() else {
                continue;
            };
            let end = index + 1 + children;
            if end > items.len() {
                return Err(internal_error!(InternalError::UnbalancedTypeExpression));
            }

            let top_level = index == 0;
            let kids = &items[index + 1..end];
            let id = match item {
                ExprItem::Struct { .. } => self.create_struct(kids, top_level)?,
                ExprItem::FnType { .. } => self.create_function(kids, false)?,
                ExprItem::Signature { .. } => self.create_function(kids, true)?,
                ExprItem::TypeCall { ctor, .. } => {
                    let root = TypeElement::Call {
                        target: ctor,
                        arg_count: children as u8,
                    };
                    self.create_call(root, kids)?
                }
                ExprItem::ParamCall { index: param, .. } => {
                    let root = TypeElement::Param {
                        index: param,
                        arity: children as u8,
                    };
                    self.create_call(root, kids)?
                }
                _ => continue,
            };

            items.splice(
                index..end,
                std::iter::once(ExprItem::Type {
                    id,
                    span: item.span(),
                }),
            );
        }

        match items.as_slice() {
            [ExprItem::Type { id, .. }] => Ok(*id),
            [ExprItem::Param { span, .. }] => Err(TypeError::TypeDefError {
                reason: "a type cannot be a bare type parameter".to_string(),
                span: to_source_span(Some(*span)),
            }),
            _ => Err(internal_error!(InternalError::UnbalancedTypeExpression)),
        }
    }

    /// A reduced child as a payload element, with the parameter prefix it needs
    fn slot(&self, item: &ExprItem) -> TypeResult<(TypeElement, usize)> {
        match item {
            ExprItem::Type { id, .. } => Ok((TypeElement::Concrete(*id), self.ctx.arena.tyrity(*id))),
            ExprItem::Param { index, .. } => Ok((
                TypeElement::Param {
                    index: *index,
                    arity: 0,
                },
                *index as usize + 1,
            )),
            _ => Err(internal_error!(InternalError::UnbalancedTypeExpression)),
        }
    }

    fn create_struct(&mut self, kids: &[ExprItem], top_level: bool) -> TypeResult<TypeId> {
        let mut names = Vec::new();
        let mut slots = Vec::new();
        let mut tyrity = 0;

        for pair in kids.chunks(2) {
            let [ExprItem::FieldName { name, .. }, slot] = pair else {
                return Err(internal_error!(InternalError::UnbalancedTypeExpression));
            };
            let (element, needed) = self.slot(slot)?;
            names.push(*name);
            slots.push(element);
            tyrity = tyrity.max(needed);
        }

        let arity = self.count(names.len(), kids.first().map(ExprItem::span))?;
        let mut header = TypeHeader::new(Sort::Record, arity, 0);
        if top_level {
            tyrity = self.params.len();
            if let DeclKind::Type(Some(name)) = self.kind {
                header = header.named(name, self.ctx.names.display(name).len());
            }
        }
        header.tyrity = tyrity as u8;

        let mut builder = self.ctx.arena.begin(header);
        for param in self.params.iter().take(tyrity) {
            builder.push_param_arity(param.arity);
        }
        for name in names {
            builder.push_name(name);
        }
        for element in slots {
            builder.push_element(element);
        }
        self.ctx.arena.commit(builder)
    }

    fn create_function(&mut self, kids: &[ExprItem], signature: bool) -> TypeResult<TypeId> {
        let mut params = Vec::new();
        let mut ret = None;
        let mut tyrity = 0;
        let mut after_arrow = false;

        for kid in kids {
            match kid {
                ExprItem::FieldName { .. } => {}
                ExprItem::RetType { .. } => after_arrow = true,
                other => {
                    let (element, needed) = self.slot(other)?;
                    tyrity = tyrity.max(needed);
                    if after_arrow {
                        ret = Some(element);
                    } else {
                        params.push(element);
                    }
                }
            }
        }

        let Some(ret) = ret else {
            return Err(internal_error!(InternalError::UnbalancedTypeExpression));
        };
        if signature {
            tyrity = self.params.len();
        }

        let arity = self.count(params.len(), kids.first().map(ExprItem::span))?;
        let header = TypeHeader::new(Sort::Function, arity, tyrity as u8);
        let mut builder = self.ctx.arena.begin(header);
        for param in self.params.iter().take(tyrity) {
            builder.push_param_arity(param.arity);
        }
        for element in params {
            builder.push_element(element);
        }
        builder.push_element(ret);
        self.ctx.arena.commit(builder)
    }

    /// Build the flat element tree of an application, inlining nested applications
    fn create_call(&mut self, root: TypeElement, kids: &[ExprItem]) -> TypeResult<TypeId> {
        let mut tree = vec![root.encode()];
        for kid in kids {
            match kid {
                ExprItem::Type { id, .. } => tree.extend(self.ctx.arena.type_tree(*id)),
                ExprItem::Param { index, .. } => tree.push(
                    TypeElement::Param {
                        index: *index,
                        arity: 0,
                    }
                    .encode(),
                ),
                _ => return Err(internal_error!(InternalError::UnbalancedTypeExpression)),
            }
        }

        let arities: Vec<u8> = self.params.iter().map(|param| param.arity).collect();
        self.ctx.arena.intern_tree(&tree, &arities)
    }

    fn count(&self, count: usize, span: Option<tarn_parser::Span>) -> TypeResult<u8> {
        u8::try_from(count).map_err(|_| TypeError::WordLengthExceeded {
            what: format!("{} fields or parameters", count),
            span: to_source_span(span),
        })
    }
}

