//! Parser tests: token emission for type declarations and node emission for expressions

mod test_expressions;
mod test_names;
