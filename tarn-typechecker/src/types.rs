//! Core type representation
//!
//! Types live in a flat arena of 32-bit words. A record starts with a length word,
//! a packed header word and a name word, then one word per declared type parameter
//! holding that parameter's arity, then a sort-specific payload of names and
//! packed type elements.

use std::cmp::Ordering;
use std::fmt;
use tarn_parser::NameId;

/// Words before the type parameter arities: length, header, name
pub const TYPE_PREFIX_LEN: usize = 3;

/// Upper bound for type parameters, arities and argument counts
pub const MAX_TYPE_PARAMS: usize = 254;

/// TypeIds and NameIds are packed into the low 24 bits of a word
pub const MAX_ID: u32 = 0x00FF_FFFF;

/// Name word of anonymous types
pub const ANONYMOUS: u32 = u32::MAX;

/// Offset placing function outer types after every concrete type
pub const BIG: i64 = 1 << 24;

const PARAM_TAG: u32 = 0xFF;

/// Offset of a type record in the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub u32);

impl TypeId {
    pub const INT: TypeId = TypeId(0);
    pub const LONG: TypeId = TypeId(1);
    pub const DOUBLE: TypeId = TypeId(2);
    pub const BOOL: TypeId = TypeId(3);
    pub const STRING: TypeId = TypeId(4);
    pub const VOID: TypeId = TypeId(5);

    /// Number of reserved primitive ids
    pub const PRIMITIVE_COUNT: u32 = 6;

    pub fn is_primitive(self) -> bool {
        self.0 < Self::PRIMITIVE_COUNT
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// The primitive type carrying this name, if any
    pub fn primitive_name(self) -> Option<NameId> {
        match self {
            TypeId::INT => Some(NameId::INT),
            TypeId::LONG => Some(NameId::LONG),
            TypeId::DOUBLE => Some(NameId::DOUBLE),
            TypeId::BOOL => Some(NameId::BOOL),
            TypeId::STRING => Some(NameId::STRING),
            TypeId::VOID => Some(NameId::VOID),
            _ => None,
        }
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type#{}", self.0)
    }
}

/// Index of a concrete binding: a function, a parameter or a variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

impl EntityId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Top-level kind of a type record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sort {
    Record = 1,
    Enum = 2,
    Function = 3,
    TypeCall = 4,
}

impl Sort {
    pub fn from_word(word: u32) -> Option<Sort> {
        match word {
            1 => Some(Sort::Record),
            2 => Some(Sort::Enum),
            3 => Some(Sort::Function),
            4 => Some(Sort::TypeCall),
            _ => None,
        }
    }
}

/// Decoded header and name words of a type record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeHeader {
    pub sort: Sort,
    /// Field count for records, parameter count for functions
    pub arity: u8,
    /// Number of declared type parameters
    pub tyrity: u8,
    /// `len << 24 | name`, or `ANONYMOUS`
    pub name_and_len: u32,
}

impl TypeHeader {
    pub fn new(sort: Sort, arity: u8, tyrity: u8) -> Self {
        Self {
            sort,
            arity,
            tyrity,
            name_and_len: ANONYMOUS,
        }
    }

    /// Attach a name; the length byte saturates for very long names
    pub fn named(mut self, name: NameId, name_len: usize) -> Self {
        let len = name_len.min(0xFF) as u32;
        self.name_and_len = (len << 24) | (name.0 & MAX_ID);
        self
    }

    pub fn name(&self) -> Option<NameId> {
        if self.name_and_len == ANONYMOUS {
            None
        } else {
            Some(NameId(self.name_and_len & MAX_ID))
        }
    }

    pub fn pack(&self) -> u32 {
        ((self.sort as u32) << 16) | ((self.arity as u32) << 8) | self.tyrity as u32
    }

    pub fn unpack(word: u32, name_and_len: u32) -> Option<Self> {
        Some(Self {
            sort: Sort::from_word(word >> 16)?,
            arity: ((word >> 8) & 0xFF) as u8,
            tyrity: (word & 0xFF) as u8,
            name_and_len,
        })
    }
}

/// One packed word of a type payload
///
/// Elements form self-delimiting prefix trees: a `Call` or an applied `Param`
/// is followed by exactly as many argument subtrees as its count says.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeElement {
    /// A fully formed type
    Concrete(TypeId),
    /// A declared type parameter, applied to `arity` arguments
    Param { index: u8, arity: u8 },
    /// A generic type applied to `arg_count` arguments
    Call { target: TypeId, arg_count: u8 },
}

impl TypeElement {
    pub fn encode(self) -> u32 {
        match self {
            TypeElement::Concrete(id) => id.0,
            TypeElement::Param { index, arity } => {
                (PARAM_TAG << 24) | ((index as u32) << 8) | arity as u32
            }
            TypeElement::Call { target, arg_count } => ((arg_count as u32) << 24) | target.0,
        }
    }

    pub fn decode(word: u32) -> Self {
        match word >> 24 {
            0 => TypeElement::Concrete(TypeId(word)),
            PARAM_TAG => TypeElement::Param {
                index: ((word >> 8) & 0xFF) as u8,
                arity: (word & 0xFF) as u8,
            },
            count => TypeElement::Call {
                target: TypeId(word & MAX_ID),
                arg_count: count as u8,
            },
        }
    }

    /// Number of argument subtrees following this element
    pub fn child_count(self) -> usize {
        match self {
            TypeElement::Concrete(_) => 0,
            TypeElement::Param { arity, .. } => arity as usize,
            TypeElement::Call { arg_count, .. } => arg_count as usize,
        }
    }
}

/// Index just past the element tree starting at `pos`
pub fn skip_element(words: &[u32], pos: usize) -> usize {
    let mut pos = pos;
    let mut pending = 1usize;
    while pending > 0 && pos < words.len() {
        pending = pending - 1 + TypeElement::decode(words[pos]).child_count();
        pos += 1;
    }
    pos
}

/// Highest parameter index referenced in an element tree, plus one
pub fn tree_tyrity(words: &[u32]) -> u8 {
    words
        .iter()
        .filter_map(|word| match TypeElement::decode(*word) {
            TypeElement::Param { index, .. } => Some(index + 1),
            _ => None,
        })
        .max()
        .unwrap_or(0)
}

/// Dispatch key of a first parameter or first argument
///
/// Ordered `Param < ZeroArity < Concrete < Function`, params by descending arity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OuterType {
    /// A type parameter applied to `arity` arguments
    Param { arity: u8 },
    /// The function takes no parameters
    ZeroArity,
    /// A concrete type or generic type constructor
    Concrete(TypeId),
    /// A function type with `arity` parameters
    Function { arity: u8 },
}

impl OuterType {
    pub fn sort_key(&self) -> i64 {
        match self {
            OuterType::Param { arity } => -(*arity as i64) - 2,
            OuterType::ZeroArity => -1,
            OuterType::Concrete(id) => id.0 as i64,
            OuterType::Function { arity } => BIG + *arity as i64,
        }
    }
}

impl Ord for OuterType {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl PartialOrd for OuterType {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
