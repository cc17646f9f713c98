//! Error types for the Tarn typechecker
//!
//! Following the parser's miette patterns for consistent error reporting.

use miette::{Diagnostic, SourceSpan};
use tarn_parser::{ParseError, Span};
use thiserror::Error;

/// Consistency failures inside the checker itself, never caused by user input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InternalError {
    /// Overloads were declared after the registry was finalized
    RegistryFrozen,
    /// A type record did not decode
    CorruptTypeRecord,
    /// A function type was expected
    NotAFunction,
    /// A frame or item stack was left unbalanced
    UnbalancedTypeExpression,
    /// The built-in declarations failed to load
    PreludeFailure,
    /// A name was bound to an overload list that does not exist
    DanglingOverload,
    /// An entity id outside the entity list
    DanglingEntity,
}

/// Main typechecker error type
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum TypeError {
    #[error("Unknown type `{name}`")]
    #[diagnostic(
        code(tarn::typecheck::unknown_type),
        help("Declare the type before using it, or check the spelling")
    )]
    UnknownType {
        name: String,
        #[label("not a known type or type parameter")]
        span: Option<SourceSpan>,
    },

    #[error("Unknown type constructor `{name}`")]
    #[diagnostic(
        code(tarn::typecheck::unknown_type_constructor),
        help("Only generic types and constructor parameters can be applied to arguments")
    )]
    UnknownTypeConstructor {
        name: String,
        #[label("cannot be applied")]
        span: Option<SourceSpan>,
    },

    #[error("`{name}` expects {expected} type arguments, found {found}")]
    #[diagnostic(
        code(tarn::typecheck::type_constructor_wrong_arity),
        help("Apply the constructor to exactly as many arguments as it declares")
    )]
    TypeConstructorWrongArity {
        name: String,
        expected: usize,
        found: usize,
        #[label("wrong number of type arguments")]
        span: Option<SourceSpan>,
    },

    #[error("Malformed type definition: {reason}")]
    #[diagnostic(code(tarn::typecheck::type_def_error))]
    TypeDefError {
        reason: String,
        #[label("here")]
        span: Option<SourceSpan>,
    },

    #[error("A function type has exactly one return type")]
    #[diagnostic(
        code(tarn::typecheck::fn_single_return_type),
        help("Remove the second `->`")
    )]
    FnSingleReturnType {
        #[label("second return arrow")]
        span: Option<SourceSpan>,
    },

    #[error("Function signature is missing its return type")]
    #[diagnostic(
        code(tarn::typecheck::missing_return_type),
        help("Add `-> Type` at the end of the signature, or a bare `->` for Void")
    )]
    MissingReturnType {
        #[label("no `->` in this signature")]
        span: Option<SourceSpan>,
    },

    #[error("Duplicate name `{name}`")]
    #[diagnostic(
        code(tarn::typecheck::duplicate_name),
        help("Field and parameter names must be unique within a declaration")
    )]
    DuplicateName {
        name: String,
        #[label("declared again here")]
        span: Option<SourceSpan>,
    },

    #[error("`{name}` is already declared")]
    #[diagnostic(
        code(tarn::typecheck::assignment_shadowing),
        help("Choose a different name")
    )]
    AssignmentShadowing {
        name: String,
        #[label("shadows an earlier declaration")]
        span: Option<SourceSpan>,
    },

    #[error("Limit exceeded: {what}")]
    #[diagnostic(code(tarn::typecheck::word_length_exceeded))]
    WordLengthExceeded {
        what: String,
        #[label("too large")]
        span: Option<SourceSpan>,
    },

    #[error("Unknown identifier `{name}`")]
    #[diagnostic(code(tarn::typecheck::unknown_identifier))]
    UnknownIdentifier {
        name: String,
        #[label("not a variable in scope")]
        span: Option<SourceSpan>,
    },

    #[error("Unknown function `{name}`")]
    #[diagnostic(code(tarn::typecheck::unknown_function))]
    UnknownFunction {
        name: String,
        #[label("no function with this name")]
        span: Option<SourceSpan>,
    },

    #[error("Overloads of `{name}` intersect")]
    #[diagnostic(
        code(tarn::typecheck::overloads_intersect),
        help("Two overloads of the same function cannot accept the same first argument")
    )]
    TypeOverloadsIntersect {
        name: String,
        #[label("conflicting overload")]
        span: Option<SourceSpan>,
    },

    #[error("`{name}` has more than one zero-argument overload")]
    #[diagnostic(code(tarn::typecheck::overloads_only_one_zero))]
    TypeOverloadsOnlyOneZero {
        name: String,
        #[label("second zero-argument overload")]
        span: Option<SourceSpan>,
    },

    #[error("The type of the first argument to `{name}` is unknown")]
    #[diagnostic(
        code(tarn::typecheck::unknown_first_arg),
        help("Overloads are chosen by the first argument, so its type must be known")
    )]
    TypeUnknownFirstArg {
        name: String,
        #[label("untyped first argument")]
        span: Option<SourceSpan>,
    },

    #[error("No overload of `{name}` accepts {found}")]
    #[diagnostic(code(tarn::typecheck::no_matching_overload))]
    TypeNoMatchingOverload {
        name: String,
        found: String,
        #[label("no matching overload")]
        span: Option<SourceSpan>,
    },

    #[error("Wrong argument type: expected {expected}, found {found}")]
    #[diagnostic(code(tarn::typecheck::wrong_argument_type))]
    TypeWrongArgumentType {
        expected: String,
        found: String,
        #[label("expected {expected}")]
        span: Option<SourceSpan>,
    },

    #[error("Wrong return type: declared {expected}, body has {found}")]
    #[diagnostic(code(tarn::typecheck::wrong_return_type))]
    TypeWrongReturnType {
        expected: String,
        found: String,
        #[label("body has type {found}")]
        span: Option<SourceSpan>,
    },

    #[error("Type parameter {param} cannot be determined from the arguments")]
    #[diagnostic(
        code(tarn::typecheck::unresolved_param),
        help("Every type parameter of a return type must appear in the arguments")
    )]
    TypeUnresolvedParam {
        param: String,
        #[label("in this call")]
        span: Option<SourceSpan>,
    },

    #[error("Expression does not reduce to a single value")]
    #[diagnostic(code(tarn::typecheck::unresolved_expression))]
    UnresolvedExpression {
        #[label("here")]
        span: Option<SourceSpan>,
    },

    #[error("Internal typechecker error {code:?} (typechecker line {line})")]
    #[diagnostic(
        code(tarn::typecheck::internal),
        help("This is a bug in the typechecker, not in the program being checked")
    )]
    Internal { code: InternalError, line: u32 },
}

/// Result type for typechecking operations
pub type TypeResult<T> = Result<T, TypeError>;

/// Top-level compiler error combining parse and typecheck errors
#[derive(Error, Diagnostic, Debug)]
pub enum CompilerError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Typecheck(#[from] TypeError),
}

/// Build an internal error tagged with the current source line
#[macro_export]
macro_rules! internal_error {
    ($code:expr) => {
        $crate::error::TypeError::Internal {
            code: $code,
            line: line!(),
        }
    };
}

/// Helper for creating source spans from optional spans
pub fn to_source_span(span: Option<Span>) -> Option<SourceSpan> {
    span.map(|s| SourceSpan::new(s.start.into(), s.end - s.start))
}
