// Tarn AST Definitions
// Flat token and node arrays addressed by index ranges

use crate::names::NameId;
use std::ops::Range;

/// Source position information for tokens and nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Kind of a type-level token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Lowercase name: a record field or signature parameter. `pl1` is the NameId.
    Word,
    /// Reference to a type or type parameter. `pl1` is the NameId.
    TypeName,
    /// `Name(...)`. `pl1` is the constructor NameId, `pl2` the number of inner tokens.
    TypeCall,
    /// `(...)` in a type declaration. `pl2` is the number of inner tokens.
    Record,
    /// `(...)` of a function declaration. `pl2` is the number of inner tokens.
    Signature,
    /// `->`
    Arrow,
    /// Declared type parameter. `pl1` is the NameId, `pl2` the declared arity.
    TypeParam,
}

/// A single type-level token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub pl1: u32,
    pub pl2: u32,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, pl1: u32, pl2: u32, span: Span) -> Self {
        Self {
            kind,
            pl1,
            pl2,
            span,
        }
    }

    /// The name carried by word, type name, call and parameter tokens
    pub fn name(&self) -> NameId {
        NameId(self.pl1)
    }

    /// Number of tokens nested inside a frame token
    pub fn inner_len(&self) -> usize {
        match self.kind {
            TokenKind::TypeCall | TokenKind::Record | TokenKind::Signature => self.pl2 as usize,
            _ => 0,
        }
    }
}

/// Expression node payload
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Int(i64),
    Long(i64),
    Double(f64),
    Bool(bool),
    String(String),
    Ident(NameId),
    /// A call whose `arity` argument subtrees follow it in prefix order
    Call { name: NameId, arity: usize },
}

/// Expression node, stored in prefix order
#[derive(Debug, Clone, PartialEq)]
pub struct ExprNode {
    pub kind: NodeKind,
    pub span: Span,
}

impl ExprNode {
    pub fn new(kind: NodeKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// `type Name<T> = ...`
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDecl {
    pub name: NameId,
    /// Declared parameters followed by the type expression
    pub tokens: Range<usize>,
    pub span: Span,
}

/// `fn name<T>(a T -> T) = body`
#[derive(Debug, Clone, PartialEq)]
pub struct FnDecl {
    pub name: NameId,
    /// Declared parameters followed by the signature frame
    pub signature: Range<usize>,
    /// Body nodes, absent for built-in declarations
    pub body: Option<Range<usize>>,
    pub span: Span,
}

/// Top-level module item
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Type(TypeDecl),
    Function(FnDecl),
}

/// A parsed module: flat tokens and nodes plus the items indexing into them
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub source: String,
    pub tokens: Vec<Token>,
    pub nodes: Vec<ExprNode>,
    pub items: Vec<Item>,
}

impl Module {
    pub fn type_tokens(&self, decl: &TypeDecl) -> &[Token] {
        &self.tokens[decl.tokens.clone()]
    }

    pub fn signature_tokens(&self, decl: &FnDecl) -> &[Token] {
        &self.tokens[decl.signature.clone()]
    }

    pub fn body_nodes(&self, decl: &FnDecl) -> Option<&[ExprNode]> {
        decl.body.clone().map(|range| &self.nodes[range])
    }
}
