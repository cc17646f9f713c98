//! Token walk producing the prefix item list of a type expression

use super::{DeclKind, DeclaredParam, ExprItem, TypeExprContext};
use crate::bindings::Binding;
use crate::error::{to_source_span, InternalError, TypeError, TypeResult};
use crate::internal_error;
use crate::types::{Sort, TypeId, MAX_TYPE_PARAMS};
use tarn_parser::{NameId, Span, Token, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    Struct,
    FnType,
    Signature,
    TypeCall,
    ParamCall,
}

impl FrameKind {
    fn takes_names(self) -> bool {
        matches!(self, FrameKind::Struct | FrameKind::Signature)
    }

    fn takes_arrow(self) -> bool {
        matches!(self, FrameKind::FnType | FrameKind::Signature)
    }
}

/// An open group; it closes when the walk reaches `end`
#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    item: usize,
    end: usize,
    span: Span,
    ctor: NameId,
    expected_args: usize,
    children: usize,
    names: Vec<(NameId, Span)>,
    pending_name: Option<(NameId, Span)>,
    arrow: Option<Span>,
    returns: usize,
}

/// What a token contributes to its enclosing frame
#[derive(Debug, Clone, Copy)]
enum Child {
    Name(NameId, Span),
    Type(Span),
    Arrow(Span),
}

/// Output of the token walk
#[derive(Debug, Clone)]
pub struct BuiltExpression {
    pub items: Vec<ExprItem>,
    pub params: Vec<DeclaredParam>,
    pub signature_params: Vec<(NameId, Span)>,
}

pub struct TypeExpressionBuilder<'c, 'a, 't> {
    ctx: &'c TypeExprContext<'a>,
    tokens: &'t [Token],
    kind: DeclKind,
    params: Vec<DeclaredParam>,
    items: Vec<ExprItem>,
    frames: Vec<Frame>,
    roots: usize,
    signature_params: Option<Vec<(NameId, Span)>>,
}

impl<'c, 'a, 't> TypeExpressionBuilder<'c, 'a, 't> {
    pub fn new(ctx: &'c TypeExprContext<'a>, tokens: &'t [Token], kind: DeclKind) -> Self {
        Self {
            ctx,
            tokens,
            kind,
            params: Vec::new(),
            items: Vec::new(),
            frames: Vec::new(),
            roots: 0,
            signature_params: None,
        }
    }

    pub fn build(mut self) -> TypeResult<BuiltExpression> {
        let start = self.capture_params()?;
        let mut pos = start;

        loop {
            while self.frames.last().is_some_and(|frame| frame.end == pos) {
                self.close_frame()?;
            }
            let Some(token) = self.tokens.get(pos).copied() else {
                break;
            };
            pos += 1;
            self.token(token, pos)?;
        }

        if !self.frames.is_empty() {
            return Err(internal_error!(InternalError::UnbalancedTypeExpression));
        }
        if self.roots == 0 {
            return Err(TypeError::TypeDefError {
                reason: "empty type expression".to_string(),
                span: self.whole_span(),
            });
        }

        let signature_params = match (self.kind, self.signature_params.take()) {
            (DeclKind::Signature, Some(params)) => params,
            (DeclKind::Signature, None) => {
                return Err(TypeError::TypeDefError {
                    reason: "a function declaration needs a parenthesised signature".to_string(),
                    span: self.whole_span(),
                })
            }
            (DeclKind::Type(_), _) => Vec::new(),
        };

        let is_record = matches!(self.items.first(), Some(ExprItem::Struct { .. }));
        if matches!(self.kind, DeclKind::Type(_)) && !self.params.is_empty() && !is_record {
            return Err(TypeError::TypeDefError {
                reason: "type parameters are only allowed on record types".to_string(),
                span: to_source_span(Some(self.params[0].span)),
            });
        }

        Ok(BuiltExpression {
            items: self.items,
            params: self.params,
            signature_params,
        })
    }

    /// Collect the leading `TypeParam` tokens, returning where the body starts
    fn capture_params(&mut self) -> TypeResult<usize> {
        let tokens = self.tokens;
        let mut pos = 0;
        while let Some(token) = tokens.get(pos).filter(|t| t.kind == TokenKind::TypeParam) {
            let name = token.name();
            if self.params.iter().any(|param| param.name == name) {
                return Err(TypeError::AssignmentShadowing {
                    name: self.ctx.names.display(name).to_string(),
                    span: to_source_span(Some(token.span)),
                });
            }
            if self.params.len() >= self.ctx.max_type_params {
                return Err(TypeError::WordLengthExceeded {
                    what: format!(
                        "more than {} type parameters",
                        self.ctx.max_type_params
                    ),
                    span: to_source_span(Some(token.span)),
                });
            }
            let arity = u8::try_from(token.pl2)
                .ok()
                .filter(|arity| (*arity as usize) <= MAX_TYPE_PARAMS)
                .ok_or_else(|| TypeError::WordLengthExceeded {
                    what: format!("type parameter arity {}", token.pl2),
                    span: to_source_span(Some(token.span)),
                })?;
            self.params.push(DeclaredParam {
                name,
                arity,
                span: token.span,
            });
            pos += 1;
        }
        Ok(pos)
    }

    fn token(&mut self, token: Token, next: usize) -> TypeResult<()> {
        let span = token.span;
        match token.kind {
            TokenKind::Word => {
                self.child(Child::Name(token.name(), span))?;
                self.items.push(ExprItem::FieldName {
                    name: token.name(),
                    span,
                });
            }
            TokenKind::Arrow => {
                self.child(Child::Arrow(span))?;
                self.items.push(ExprItem::RetType { span });
            }
            TokenKind::TypeName => {
                let item = self.type_reference(token.name(), span)?;
                self.child(Child::Type(span))?;
                self.items.push(item);
            }
            TokenKind::Record => {
                self.open(FrameKind::Struct, token, next, 0)?;
            }
            TokenKind::Signature => {
                if self.kind != DeclKind::Signature || !self.frames.is_empty() || self.roots > 0 {
                    return Err(TypeError::TypeDefError {
                        reason: "a signature can only appear in a function declaration"
                            .to_string(),
                        span: to_source_span(Some(span)),
                    });
                }
                self.open(FrameKind::Signature, token, next, 0)?;
            }
            TokenKind::TypeCall => {
                let name = token.name();
                if name == NameId::FUNCTION {
                    self.open(FrameKind::FnType, token, next, 0)?;
                } else if let Some((index, param)) = self.param(name) {
                    if param.arity == 0 {
                        return Err(TypeError::UnknownTypeConstructor {
                            name: self.ctx.names.display(name).to_string(),
                            span: to_source_span(Some(span)),
                        });
                    }
                    self.open(FrameKind::ParamCall, token, next, param.arity as usize)?;
                    self.patch_head(ExprItem::ParamCall {
                        index,
                        children: 0,
                        span,
                    });
                } else {
                    let ctor = self.constructor(name, span)?;
                    let expected = self.ctx.arena.tyrity(ctor);
                    self.open(FrameKind::TypeCall, token, next, expected)?;
                    self.patch_head(ExprItem::TypeCall {
                        ctor,
                        children: 0,
                        span,
                    });
                }
            }
            TokenKind::TypeParam => {
                return Err(TypeError::TypeDefError {
                    reason: "type parameters must be declared before the type".to_string(),
                    span: to_source_span(Some(span)),
                })
            }
        }
        Ok(())
    }

    /// Resolve a bare type name to a `Type` or `Param` item
    fn type_reference(&self, name: NameId, span: Span) -> TypeResult<ExprItem> {
        if let Some((index, param)) = self.param(name) {
            if param.arity > 0 {
                return Err(TypeError::TypeConstructorWrongArity {
                    name: self.ctx.names.display(name).to_string(),
                    expected: param.arity as usize,
                    found: 0,
                    span: to_source_span(Some(span)),
                });
            }
            return Ok(ExprItem::Param { index, span });
        }

        match self.ctx.bindings.get(name) {
            Binding::Type(id) => {
                let tyrity = self.ctx.arena.tyrity(id);
                if tyrity > 0 {
                    return Err(TypeError::TypeConstructorWrongArity {
                        name: self.ctx.names.display(name).to_string(),
                        expected: tyrity,
                        found: 0,
                        span: to_source_span(Some(span)),
                    });
                }
                Ok(ExprItem::Type { id, span })
            }
            _ => Err(TypeError::UnknownType {
                name: self.ctx.names.display(name).to_string(),
                span: to_source_span(Some(span)),
            }),
        }
    }

    /// Resolve the name of a generic type applied to arguments
    fn constructor(&self, name: NameId, span: Span) -> TypeResult<TypeId> {
        let unknown = || TypeError::UnknownTypeConstructor {
            name: self.ctx.names.display(name).to_string(),
            span: to_source_span(Some(span)),
        };
        let Binding::Type(id) = self.ctx.bindings.get(name) else {
            return Err(unknown());
        };
        if self.ctx.arena.tyrity(id) == 0 || self.ctx.arena.sort(id) != Some(Sort::Record) {
            return Err(unknown());
        }
        if self.ctx.arena.param_arities(id).iter().any(|arity| *arity > 0) {
            return Err(TypeError::TypeDefError {
                reason: format!(
                    "`{}` takes a type constructor argument, which cannot be written as a type",
                    self.ctx.names.display(name)
                ),
                span: to_source_span(Some(span)),
            });
        }
        Ok(id)
    }

    fn param(&self, name: NameId) -> Option<(u8, DeclaredParam)> {
        self.params
            .iter()
            .position(|param| param.name == name)
            .map(|index| (index as u8, self.params[index]))
    }

    /// Open a frame for a group token whose children follow it
    fn open(&mut self, kind: FrameKind, token: Token, next: usize, expected_args: usize) -> TypeResult<()> {
        let end = next + token.inner_len();
        if end > self.tokens.len() {
            return Err(internal_error!(InternalError::UnbalancedTypeExpression));
        }
        self.child(Child::Type(token.span))?;

        let item = self.items.len();
        self.items.push(match kind {
            FrameKind::Struct => ExprItem::Struct {
                children: 0,
                span: token.span,
            },
            FrameKind::FnType => ExprItem::FnType {
                children: 0,
                span: token.span,
            },
            FrameKind::Signature => ExprItem::Signature {
                children: 0,
                span: token.span,
            },
            // Patched with the resolved head right after opening
            FrameKind::TypeCall | FrameKind::ParamCall => ExprItem::Type {
                id: TypeId::VOID,
                span: token.span,
            },
        });

        self.frames.push(Frame {
            kind,
            item,
            end,
            span: token.span,
            ctor: token.name(),
            expected_args,
            children: 0,
            names: Vec::new(),
            pending_name: None,
            arrow: None,
            returns: 0,
        });
        Ok(())
    }

    fn patch_head(&mut self, head: ExprItem) {
        if let Some(frame) = self.frames.last() {
            self.items[frame.item] = head;
        }
    }

    /// Account for a child of the innermost frame, validating its position
    fn child(&mut self, child: Child) -> TypeResult<()> {
        let Some(frame) = self.frames.last_mut() else {
            return match child {
                Child::Type(span) if self.roots > 0 => Err(TypeError::TypeDefError {
                    reason: "expected a single type expression".to_string(),
                    span: to_source_span(Some(span)),
                }),
                Child::Type(_) => {
                    self.roots += 1;
                    Ok(())
                }
                Child::Name(_, span) => Err(TypeError::TypeDefError {
                    reason: "field names can only appear inside a record".to_string(),
                    span: to_source_span(Some(span)),
                }),
                Child::Arrow(span) => Err(TypeError::TypeDefError {
                    reason: "`->` can only appear inside a function type".to_string(),
                    span: to_source_span(Some(span)),
                }),
            };
        };

        match child {
            Child::Arrow(span) => {
                if !frame.kind.takes_arrow() {
                    return Err(TypeError::TypeDefError {
                        reason: "`->` can only appear inside a function type".to_string(),
                        span: to_source_span(Some(span)),
                    });
                }
                if frame.arrow.is_some() {
                    return Err(TypeError::FnSingleReturnType {
                        span: to_source_span(Some(span)),
                    });
                }
                if let Some((name, name_span)) = frame.pending_name {
                    return Err(untyped_name(self.ctx, name, name_span));
                }
                frame.arrow = Some(span);
            }
            Child::Name(name, span) => {
                if !frame.kind.takes_names() || frame.arrow.is_some() {
                    return Err(TypeError::TypeDefError {
                        reason: format!(
                            "unexpected name `{}`",
                            self.ctx.names.display(name)
                        ),
                        span: to_source_span(Some(span)),
                    });
                }
                if let Some((pending, pending_span)) = frame.pending_name {
                    return Err(untyped_name(self.ctx, pending, pending_span));
                }
                if frame.names.iter().any(|(seen, _)| *seen == name) {
                    return Err(TypeError::DuplicateName {
                        name: self.ctx.names.display(name).to_string(),
                        span: to_source_span(Some(span)),
                    });
                }
                frame.names.push((name, span));
                frame.pending_name = Some((name, span));
            }
            Child::Type(span) => {
                if frame.arrow.is_some() {
                    frame.returns += 1;
                    if frame.returns > 1 {
                        return Err(TypeError::TypeDefError {
                            reason: "a function has exactly one return type".to_string(),
                            span: to_source_span(Some(span)),
                        });
                    }
                } else if frame.kind.takes_names() {
                    if frame.pending_name.take().is_none() {
                        let reason = match frame.kind {
                            FrameKind::Signature => "every parameter must be named",
                            _ => "every record field must be named",
                        };
                        return Err(TypeError::TypeDefError {
                            reason: reason.to_string(),
                            span: to_source_span(Some(span)),
                        });
                    }
                }
            }
        }

        frame.children += 1;
        Ok(())
    }

    fn close_frame(&mut self) -> TypeResult<()> {
        let Some(mut frame) = self.frames.pop() else {
            return Err(internal_error!(InternalError::UnbalancedTypeExpression));
        };

        if let Some((name, span)) = frame.pending_name {
            return Err(untyped_name(self.ctx, name, span));
        }

        match frame.kind {
            FrameKind::FnType | FrameKind::Signature => {
                if frame.arrow.is_none() {
                    return Err(TypeError::MissingReturnType {
                        span: to_source_span(Some(frame.span)),
                    });
                }
                if frame.returns == 0 {
                    let span = frame.arrow.unwrap_or(frame.span);
                    self.items.push(ExprItem::Type {
                        id: TypeId::VOID,
                        span,
                    });
                    frame.children += 1;
                }
                if frame.kind == FrameKind::Signature {
                    self.signature_params = Some(std::mem::take(&mut frame.names));
                }
            }
            FrameKind::TypeCall | FrameKind::ParamCall => {
                if frame.children != frame.expected_args {
                    return Err(TypeError::TypeConstructorWrongArity {
                        name: self.ctx.names.display(frame.ctor).to_string(),
                        expected: frame.expected_args,
                        found: frame.children,
                        span: to_source_span(Some(frame.span)),
                    });
                }
            }
            FrameKind::Struct => {}
        }

        self.items[frame.item].set_children(frame.children);
        Ok(())
    }

    fn whole_span(&self) -> Option<miette::SourceSpan> {
        let first = self.tokens.first()?;
        let last = self.tokens.last()?;
        to_source_span(Some(Span::new(first.span.start, last.span.end.max(first.span.end))))
    }
}

fn untyped_name(ctx: &TypeExprContext<'_>, name: NameId, span: Span) -> TypeError {
    TypeError::TypeDefError {
        reason: format!("`{}` has no type", ctx.names.display(name)),
        span: to_source_span(Some(span)),
    }
}
