// Tarn Parser Library
// Pest-based producer of type tokens and expression nodes for the Tarn type checker

pub mod ast;
pub mod error;
pub mod names;
pub mod parser;

pub use ast::*;
pub use error::*;
pub use names::*;
pub use parser::*;

#[cfg(test)]
mod tests;

// Main parsing functions
pub fn parse_module(input: &str, names: &mut NameTable) -> Result<Module, ParseError> {
    parser::TarnParser::parse_module(input, names)
}

pub fn parse_expression(input: &str, names: &mut NameTable) -> Result<Vec<ExprNode>, ParseError> {
    parser::TarnParser::parse_expression(input, names)
}

// Version and metadata
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
