//! Expression type checking
//!
//! This module handles:
//! - Lowering parser nodes into checker nodes with resolvable callees
//! - Folding a prefix expression into its result type
//! - Recording the overload each call resolved to

pub mod expressions;

pub use expressions::ExpressionTypeChecker;

use crate::types::{EntityId, TypeId};
use tarn_parser::{NameId, NodeKind, Span};

/// The function a call refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Callee {
    /// Not resolved yet, dispatched through the name's binding
    Unresolved(NameId),
    /// The overload chosen by the checker
    Resolved(EntityId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExprKind {
    Literal(TypeId),
    Ident(NameId),
    /// A call whose `arity` argument subtrees follow it
    Call { callee: Callee, name: NameId, arity: usize },
}

/// Expression node in prefix order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExprNode {
    pub kind: ExprKind,
    pub span: Span,
}

impl ExprNode {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// The entity a call resolved to, once checked
    pub fn resolved(&self) -> Option<EntityId> {
        match self.kind {
            ExprKind::Call {
                callee: Callee::Resolved(entity),
                ..
            } => Some(entity),
            _ => None,
        }
    }
}

/// Convert parser nodes, typing literals on the way
pub fn lower_nodes(nodes: &[tarn_parser::ExprNode]) -> Vec<ExprNode> {
    nodes
        .iter()
        .map(|node| {
            let kind = match &node.kind {
                NodeKind::Int(_) => ExprKind::Literal(TypeId::INT),
                NodeKind::Long(_) => ExprKind::Literal(TypeId::LONG),
                NodeKind::Double(_) => ExprKind::Literal(TypeId::DOUBLE),
                NodeKind::Bool(_) => ExprKind::Literal(TypeId::BOOL),
                NodeKind::String(_) => ExprKind::Literal(TypeId::STRING),
                NodeKind::Ident(name) => ExprKind::Ident(*name),
                NodeKind::Call { name, arity } => ExprKind::Call {
                    callee: Callee::Unresolved(*name),
                    name: *name,
                    arity: *arity,
                },
            };
            ExprNode::new(kind, node.span)
        })
        .collect()
}
