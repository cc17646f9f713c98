// Tarn Parser
// Lowers pest pairs into the flat token and node arrays of a Module

mod expressions;
mod types;

use crate::ast::*;
use crate::error::*;
use crate::names::{NameId, NameTable};
use miette::SourceSpan;
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "grammar.pest"]
pub struct TarnParser;

impl TarnParser {
    /// Parse a whole module of type and function declarations
    pub fn parse_module(input: &str, names: &mut NameTable) -> ParseResult<Module> {
        let pairs = Self::parse(Rule::module, input)
            .map_err(|error| ParseError::from_pest_error(error, input.to_string()))?;

        let mut builder = ModuleBuilder::new(input, names);
        let mut items = Vec::new();

        for pair in pairs.flat_map(|module| module.into_inner()) {
            match pair.as_rule() {
                Rule::type_decl => items.push(Item::Type(builder.type_decl(pair)?)),
                Rule::fn_decl => items.push(Item::Function(builder.fn_decl(pair)?)),
                Rule::EOI => {}
                other => {
                    return Err(ParseError::UnexpectedRule {
                        expected: "type or function declaration".to_string(),
                        found: other,
                        span: span_from_pair(&pair),
                    })
                }
            }
        }

        Ok(builder.finish(items))
    }

    /// Parse a single expression into prefix-ordered nodes
    pub fn parse_expression(input: &str, names: &mut NameTable) -> ParseResult<Vec<ExprNode>> {
        let pairs = Self::parse(Rule::expression_only, input)
            .map_err(|error| ParseError::from_pest_error(error, input.to_string()))?;

        let mut builder = ModuleBuilder::new(input, names);
        for pair in pairs.flat_map(|expr| expr.into_inner()) {
            if pair.as_rule() != Rule::EOI {
                builder.expression(pair)?;
            }
        }

        Ok(builder.nodes)
    }
}

/// Accumulates tokens and nodes while walking the parse tree
pub(crate) struct ModuleBuilder<'a> {
    source: &'a str,
    names: &'a mut NameTable,
    tokens: Vec<Token>,
    nodes: Vec<ExprNode>,
}

impl<'a> ModuleBuilder<'a> {
    fn new(source: &'a str, names: &'a mut NameTable) -> Self {
        Self {
            source,
            names,
            tokens: Vec::new(),
            nodes: Vec::new(),
        }
    }

    fn finish(self, items: Vec<Item>) -> Module {
        Module {
            source: self.source.to_string(),
            tokens: self.tokens,
            nodes: self.nodes,
            items,
        }
    }

    fn intern(&mut self, pair: &Pair<Rule>) -> NameId {
        self.names.intern(pair.as_str())
    }

    /// Take the next pair, which must be of the given rule
    fn expect_pair<'i>(
        next: Option<Pair<'i, Rule>>,
        rule: Rule,
        parent: Span,
    ) -> ParseResult<Pair<'i, Rule>> {
        match next {
            Some(pair) if pair.as_rule() == rule => Ok(pair),
            Some(pair) => Err(ParseError::UnexpectedRule {
                expected: format!("{:?}", rule),
                found: pair.as_rule(),
                span: span_from_pair(&pair),
            }),
            None => Err(ParseError::UnexpectedRule {
                expected: format!("{:?}", rule),
                found: Rule::EOI,
                span: parent,
            }),
        }
    }

    /// Build an error carrying the module source and the offending text
    fn create_parse_error<F>(&self, span: Span, text: &str, constructor: F) -> ParseError
    where
        F: FnOnce(String, SourceSpan, String) -> ParseError,
    {
        constructor(
            self.source.to_string(),
            to_source_span(span),
            text.to_string(),
        )
    }
}

/// Extract a Span from a pest pair
pub(crate) fn span_from_pair(pair: &Pair<Rule>) -> Span {
    let span = pair.as_span();
    Span::new(span.start(), span.end())
}

pub(crate) fn to_source_span(span: Span) -> SourceSpan {
    SourceSpan::new(span.start.into(), span.len())
}
