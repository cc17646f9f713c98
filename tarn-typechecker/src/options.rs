//! Compiler configuration

use crate::types::MAX_TYPE_PARAMS;

/// Compiler configuration options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerOptions {
    /// Declare the built-in types, operators and generic functions
    pub load_prelude: bool,

    /// Maximum number of type parameters a declaration may introduce
    pub max_type_params: usize,

    /// Initial capacity of the type arena, in words
    pub arena_capacity: usize,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            load_prelude: true,
            max_type_params: MAX_TYPE_PARAMS,
            arena_capacity: 4096,
        }
    }
}

impl CompilerOptions {
    pub fn with_prelude(mut self, load_prelude: bool) -> Self {
        self.load_prelude = load_prelude;
        self
    }

    /// Lower the type parameter cap; values above the hard limit are clamped
    pub fn with_max_type_params(mut self, max_type_params: usize) -> Self {
        self.max_type_params = max_type_params.min(MAX_TYPE_PARAMS);
        self
    }

    pub fn with_arena_capacity(mut self, arena_capacity: usize) -> Self {
        self.arena_capacity = arena_capacity;
        self
    }
}
