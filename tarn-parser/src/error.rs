// Tarn Parser Error Handling
// Error reporting with miette integration

use crate::parser::Rule;
use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// Main parse error type with miette integration
#[derive(Error, Diagnostic, Debug)]
pub enum ParseError {
    #[error("Parse error")]
    #[diagnostic(
        code(tarn::parse::pest_error),
        help("Check the syntax near the highlighted location")
    )]
    PestError {
        #[source_code]
        src: String,
        #[label("error occurred here")]
        span: SourceSpan,
        message: String,
    },

    #[error("Invalid integer literal")]
    #[diagnostic(
        code(tarn::parse::invalid_integer),
        help("Integer literals must fit in a signed 64-bit value")
    )]
    InvalidInteger {
        #[source_code]
        src: String,
        #[label("invalid integer")]
        span: SourceSpan,
        found: String,
    },

    #[error("Invalid float literal")]
    #[diagnostic(
        code(tarn::parse::invalid_float),
        help("Float literals are written with a decimal point (e.g., 3.14)")
    )]
    InvalidFloat {
        #[source_code]
        src: String,
        #[label("invalid float")]
        span: SourceSpan,
        found: String,
    },

    #[error("Invalid type parameter arity")]
    #[diagnostic(
        code(tarn::parse::invalid_arity),
        help("A type parameter takes at most 254 arguments, e.g. `F/2`")
    )]
    InvalidArity {
        #[source_code]
        src: String,
        #[label("invalid arity")]
        span: SourceSpan,
        found: String,
    },

    #[error("Unexpected grammar rule")]
    #[diagnostic(
        code(tarn::parse::unexpected_rule),
        help("Expected rule: {expected}")
    )]
    UnexpectedRule {
        expected: String,
        found: Rule,
        span: crate::ast::Span,
    },

    #[error("Too many nested tokens")]
    #[diagnostic(
        code(tarn::parse::too_many_tokens),
        help("Split the declaration into smaller named types")
    )]
    TooManyTokens {
        #[source_code]
        src: String,
        #[label("this group is too large")]
        span: SourceSpan,
    },
}

impl ParseError {
    /// Create a parse error from a Pest parsing error
    pub fn from_pest_error(error: pest::error::Error<Rule>, src: String) -> Self {
        let span = match error.location {
            pest::error::InputLocation::Pos(pos) => SourceSpan::new(pos.into(), 1),
            pest::error::InputLocation::Span((start, end)) => {
                SourceSpan::new(start.into(), end - start)
            }
        };

        let message = match &error.variant {
            pest::error::ErrorVariant::ParsingError { positives, .. } if !positives.is_empty() => {
                let expected: Vec<String> = positives
                    .iter()
                    .map(rule_to_user_friendly_description)
                    .collect();
                format!("{}\nexpected {}", error, expected.join(" or "))
            }
            _ => format!("{}", error),
        };

        ParseError::PestError { src, span, message }
    }

    /// Create an invalid integer error
    pub fn invalid_integer(src: String, span: SourceSpan, found: String) -> Self {
        ParseError::InvalidInteger { src, span, found }
    }

    /// Create an invalid float error
    pub fn invalid_float(src: String, span: SourceSpan, found: String) -> Self {
        ParseError::InvalidFloat { src, span, found }
    }

    /// Create an invalid arity error
    pub fn invalid_arity(src: String, span: SourceSpan, found: String) -> Self {
        ParseError::InvalidArity { src, span, found }
    }
}

/// Result type for parsing operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Convert a parser rule to a user-friendly description
fn rule_to_user_friendly_description(rule: &Rule) -> String {
    match rule {
        Rule::int => "an integer (like 42)".to_string(),
        Rule::long => "a long integer (like 42L)".to_string(),
        Rule::double => "a double (like 3.14)".to_string(),
        Rule::boolean => "a boolean (true or false)".to_string(),
        Rule::string => "a string (like \"hello\")".to_string(),
        Rule::word => "a lowercase name (like count)".to_string(),
        Rule::type_name => "a type name (like Int or List)".to_string(),
        Rule::type_param => "a type parameter (like T or F/1)".to_string(),
        Rule::type_params => "type parameters (like <T U>)".to_string(),
        Rule::arity => "a parameter arity (like 1)".to_string(),
        Rule::arrow => "a return arrow (->)".to_string(),
        Rule::operator => "an operator (like + or ==)".to_string(),
        Rule::type_call => "a type application (like List(Int))".to_string(),
        Rule::type_head => "a type constructor (like List()".to_string(),
        Rule::record => "a record type (like (id Int name String))".to_string(),
        Rule::type_ref => "a type reference".to_string(),
        Rule::signature => "a function signature (like (a Int -> Bool))".to_string(),
        Rule::fn_name => "a function name".to_string(),
        Rule::call => "a call (like f(1, 2))".to_string(),
        Rule::call_head => "a callee (like f()".to_string(),
        Rule::ident => "an identifier".to_string(),
        Rule::type_decl => "a type declaration (type Name = ...)".to_string(),
        Rule::fn_decl => "a function declaration (fn name(...))".to_string(),
        Rule::EOI => "end of input".to_string(),
        _ => format!("a {:?}", rule).replace('_', " "),
    }
}
