// Expression parsing
// Prefix calls and literals, flattened into nodes in prefix order

use super::{span_from_pair, ModuleBuilder, Rule};
use crate::ast::*;
use crate::error::*;
use pest::iterators::Pair;
use std::ops::Range;

impl ModuleBuilder<'_> {
    /// Parse an expression, returning the range of nodes it occupies
    pub(super) fn expression(&mut self, pair: Pair<Rule>) -> ParseResult<Range<usize>> {
        let start = self.nodes.len();
        self.expression_node(pair)?;
        Ok(start..self.nodes.len())
    }

    fn expression_node(&mut self, pair: Pair<Rule>) -> ParseResult<()> {
        let span = span_from_pair(&pair);
        let text = pair.as_str();

        let kind = match pair.as_rule() {
            Rule::int => NodeKind::Int(text.parse::<i64>().map_err(|_| {
                self.create_parse_error(span, text, ParseError::invalid_integer)
            })?),
            Rule::long => {
                let digits = text.trim_end_matches('L');
                NodeKind::Long(digits.parse::<i64>().map_err(|_| {
                    self.create_parse_error(span, text, ParseError::invalid_integer)
                })?)
            }
            Rule::double => NodeKind::Double(
                text.parse::<f64>()
                    .map_err(|_| self.create_parse_error(span, text, ParseError::invalid_float))?,
            ),
            Rule::boolean => NodeKind::Bool(text == "true"),
            // Quotes are single bytes, so slicing them off is always on a char boundary
            Rule::string => NodeKind::String(text[1..text.len() - 1].to_string()),
            Rule::ident => NodeKind::Ident(self.intern(&pair)),
            Rule::call => return self.call(pair),
            other => {
                return Err(ParseError::UnexpectedRule {
                    expected: "expression".to_string(),
                    found: other,
                    span,
                })
            }
        };

        self.nodes.push(ExprNode::new(kind, span));
        Ok(())
    }

    /// Emit the call node, then its arguments, then patch in the arity
    fn call(&mut self, pair: Pair<Rule>) -> ParseResult<()> {
        let span = span_from_pair(&pair);
        let mut inner = pair.into_inner();
        let head = Self::expect_pair(inner.next(), Rule::call_head, span)?;
        let callee = head.into_inner().next().ok_or(ParseError::UnexpectedRule {
            expected: "callee".to_string(),
            found: Rule::call_head,
            span,
        })?;
        let name = self.intern(&callee);

        let index = self.nodes.len();
        self.nodes
            .push(ExprNode::new(NodeKind::Call { name, arity: 0 }, span));

        let mut count = 0;
        for argument in inner {
            self.expression_node(argument)?;
            count += 1;
        }

        if let NodeKind::Call { arity, .. } = &mut self.nodes[index].kind {
            *arity = count;
        }
        Ok(())
    }
}
