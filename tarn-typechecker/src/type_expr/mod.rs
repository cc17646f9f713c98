//! Type expressions
//!
//! Declarations are processed in two steps. The [`builder`] walks the tokens left
//! to right and produces a prefix list of [`ExprItem`]s, validating structure as
//! it goes. The [`evaluator`] then scans that list from the end, interning each
//! compound node once its children are reduced and collapsing it to a single
//! `Type` item.

pub mod builder;
pub mod evaluator;

pub use builder::TypeExpressionBuilder;
pub use evaluator::TypeExpressionEvaluator;

use crate::arena::TypeArena;
use crate::bindings::Bindings;
use crate::error::TypeResult;
use crate::types::TypeId;
use tarn_parser::{NameId, NameTable, Span, Token};

/// What a token range declares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    /// `type Name<T> = ...`, bound to the given name when present
    Type(Option<NameId>),
    /// The signature of a function declaration
    Signature,
}

/// A node of a type expression, in prefix order
///
/// Compound nodes are followed by `children` items, each of which reduces to
/// exactly one item before the node itself is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExprItem {
    Struct { children: usize, span: Span },
    FnType { children: usize, span: Span },
    Signature { children: usize, span: Span },
    TypeCall { ctor: TypeId, children: usize, span: Span },
    ParamCall { index: u8, children: usize, span: Span },
    FieldName { name: NameId, span: Span },
    RetType { span: Span },
    Type { id: TypeId, span: Span },
    Param { index: u8, span: Span },
}

impl ExprItem {
    pub fn span(&self) -> Span {
        match self {
            ExprItem::Struct { span, .. }
            | ExprItem::FnType { span, .. }
            | ExprItem::Signature { span, .. }
            | ExprItem::TypeCall { span, .. }
            | ExprItem::ParamCall { span, .. }
            | ExprItem::FieldName { span, .. }
            | ExprItem::RetType { span }
            | ExprItem::Type { span, .. }
            | ExprItem::Param { span, .. } => *span,
        }
    }

    /// Number of child items of a compound node
    pub fn children(&self) -> Option<usize> {
        match self {
            ExprItem::Struct { children, .. }
            | ExprItem::FnType { children, .. }
            | ExprItem::Signature { children, .. }
            | ExprItem::TypeCall { children, .. }
            | ExprItem::ParamCall { children, .. } => Some(*children),
            _ => None,
        }
    }

    fn set_children(&mut self, count: usize) {
        match self {
            ExprItem::Struct { children, .. }
            | ExprItem::FnType { children, .. }
            | ExprItem::Signature { children, .. }
            | ExprItem::TypeCall { children, .. }
            | ExprItem::ParamCall { children, .. } => *children = count,
            _ => {}
        }
    }
}

/// A declared type parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeclaredParam {
    pub name: NameId,
    pub arity: u8,
    pub span: Span,
}

/// Shared state a declaration is resolved against
pub struct TypeExprContext<'a> {
    pub arena: &'a mut TypeArena,
    pub names: &'a NameTable,
    pub bindings: &'a Bindings,
    pub max_type_params: usize,
}

/// Result of defining a type or signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinedType {
    pub type_id: TypeId,
    /// Declared arity of each type parameter
    pub param_arities: Vec<u8>,
    /// Parameter names of a signature, in order
    pub params: Vec<(NameId, Span)>,
}

/// Build and evaluate the type expression in `tokens`
pub fn define(
    ctx: &mut TypeExprContext<'_>,
    tokens: &[Token],
    kind: DeclKind,
) -> TypeResult<DefinedType> {
    let built = TypeExpressionBuilder::new(ctx, tokens, kind).build()?;
    let param_arities: Vec<u8> = built.params.iter().map(|param| param.arity).collect();
    let type_id = TypeExpressionEvaluator::new(ctx, &built.params, kind).evaluate(built.items)?;

    // Declared parameters only live as long as the declaration
    Ok(DefinedType {
        type_id,
        param_arities,
        params: built.signature_params,
    })
}
