// Type-level parsing
// Emits the token stream consumed by the type expression builder

use super::{span_from_pair, ModuleBuilder, Rule};
use crate::ast::*;
use crate::error::*;
use pest::iterators::Pair;

/// Type parameters may take at most this many arguments
const MAX_PARAM_ARITY: u32 = 254;

impl ModuleBuilder<'_> {
    /// Parse `type Name<T> = expr`
    pub(super) fn type_decl(&mut self, pair: Pair<Rule>) -> ParseResult<TypeDecl> {
        let span = span_from_pair(&pair);
        let mut inner = pair.into_inner();
        let name_pair = Self::expect_pair(inner.next(), Rule::type_name, span)?;
        let name = self.intern(&name_pair);

        let start = self.tokens.len();
        for part in inner {
            match part.as_rule() {
                Rule::type_params => self.type_params(part)?,
                _ => self.type_part(part)?,
            }
        }

        Ok(TypeDecl {
            name,
            tokens: start..self.tokens.len(),
            span,
        })
    }

    /// Parse `fn name<T>(a T -> T) = body`
    pub(super) fn fn_decl(&mut self, pair: Pair<Rule>) -> ParseResult<FnDecl> {
        let span = span_from_pair(&pair);
        let mut inner = pair.into_inner();
        let name_pair = Self::expect_pair(inner.next(), Rule::fn_name, span)?;
        let name = self.intern(&name_pair);

        let start = self.tokens.len();
        let mut body = None;
        for part in inner {
            match part.as_rule() {
                Rule::type_params => self.type_params(part)?,
                Rule::signature => self.type_part(part)?,
                _ => body = Some(self.expression(part)?),
            }
        }

        Ok(FnDecl {
            name,
            signature: start..self.tokens.len(),
            body,
            span,
        })
    }

    /// Emit one `TypeParam` token per declared parameter
    fn type_params(&mut self, pair: Pair<Rule>) -> ParseResult<()> {
        for param in pair.into_inner() {
            let span = span_from_pair(&param);
            let mut inner = param.into_inner();
            let name_pair = Self::expect_pair(inner.next(), Rule::type_name, span)?;
            let name = self.intern(&name_pair);

            let arity = match inner.next() {
                Some(arity_pair) => {
                    let text = arity_pair.as_str();
                    match text.parse::<u32>() {
                        Ok(arity) if arity <= MAX_PARAM_ARITY => arity,
                        _ => {
                            return Err(self.create_parse_error(
                                span_from_pair(&arity_pair),
                                text,
                                ParseError::invalid_arity,
                            ))
                        }
                    }
                }
                None => 0,
            };

            self.tokens
                .push(Token::new(TokenKind::TypeParam, name.0, arity, span));
        }
        Ok(())
    }

    /// Emit the tokens of a single type-level element, recursing into groups
    fn type_part(&mut self, pair: Pair<Rule>) -> ParseResult<()> {
        let span = span_from_pair(&pair);
        match pair.as_rule() {
            Rule::word => {
                let name = self.intern(&pair);
                self.tokens.push(Token::new(TokenKind::Word, name.0, 0, span));
            }
            Rule::type_ref => {
                let name = self.intern(&pair);
                self.tokens
                    .push(Token::new(TokenKind::TypeName, name.0, 0, span));
            }
            Rule::arrow => {
                self.tokens.push(Token::new(TokenKind::Arrow, 0, 0, span));
            }
            Rule::record => self.frame(TokenKind::Record, 0, span, pair.into_inner())?,
            Rule::signature => self.frame(TokenKind::Signature, 0, span, pair.into_inner())?,
            Rule::type_call => {
                let mut inner = pair.into_inner();
                let head = Self::expect_pair(inner.next(), Rule::type_head, span)?;
                let ctor = Self::expect_pair(head.into_inner().next(), Rule::type_name, span)?;
                let name = self.intern(&ctor);
                self.frame(TokenKind::TypeCall, name.0, span, inner)?;
            }
            other => {
                return Err(ParseError::UnexpectedRule {
                    expected: "type expression".to_string(),
                    found: other,
                    span,
                })
            }
        }
        Ok(())
    }

    /// Emit a frame token followed by its children, then patch in the child count
    fn frame<'i>(
        &mut self,
        kind: TokenKind,
        pl1: u32,
        span: Span,
        children: impl Iterator<Item = Pair<'i, Rule>>,
    ) -> ParseResult<()> {
        let index = self.tokens.len();
        self.tokens.push(Token::new(kind, pl1, 0, span));

        for child in children {
            self.type_part(child)?;
        }

        let inner = self.tokens.len() - index - 1;
        self.tokens[index].pl2 = u32::try_from(inner).map_err(|_| ParseError::TooManyTokens {
            src: self.source.to_string(),
            span: super::to_source_span(span),
        })?;
        Ok(())
    }
}
