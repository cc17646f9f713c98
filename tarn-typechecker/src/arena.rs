//! Type arena and structural interning
//!
//! Every type ever defined is a word range in one growable vector and is
//! identified by its offset. Candidates are assembled in a [`TypeBuilder`] and
//! only appended by [`TypeArena::commit`] when no structurally identical record
//! exists yet, so equal types always share a TypeId.

use crate::error::{InternalError, TypeError, TypeResult};
use crate::internal_error;
use crate::types::*;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use tarn_parser::{NameId, NameTable};

/// Scratch buffer for a type record that has not been interned yet
#[derive(Debug, Clone)]
pub struct TypeBuilder {
    words: Vec<u32>,
}

impl TypeBuilder {
    pub fn push_param_arity(&mut self, arity: u8) {
        self.words.push(arity as u32);
    }

    pub fn push_name(&mut self, name: NameId) {
        self.words.push(name.0);
    }

    pub fn push_element(&mut self, element: TypeElement) {
        self.words.push(element.encode());
    }

    /// Append an already encoded element tree
    pub fn extend_tree(&mut self, tree: &[u32]) {
        self.words.extend_from_slice(tree);
    }
}

/// Flat store of interned type records
#[derive(Debug, Clone)]
pub struct TypeArena {
    words: Vec<u32>,
    dict: HashMap<u64, Vec<TypeId>>,
}

impl TypeArena {
    pub fn new() -> Self {
        Self::with_capacity(1024)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let mut words = Vec::with_capacity(capacity.max(TypeId::PRIMITIVE_COUNT as usize));
        // One placeholder word per primitive keeps their ids below every record offset
        words.resize(TypeId::PRIMITIVE_COUNT as usize, 0);
        Self {
            words,
            dict: HashMap::new(),
        }
    }

    /// Total number of words in the arena
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.len() == TypeId::PRIMITIVE_COUNT as usize
    }

    /// Start a new candidate record with the given header
    pub fn begin(&self, header: TypeHeader) -> TypeBuilder {
        TypeBuilder {
            words: vec![0, header.pack(), header.name_and_len],
        }
    }

    /// Intern a candidate, returning the id of an identical record if one exists
    pub fn commit(&mut self, mut builder: TypeBuilder) -> TypeResult<TypeId> {
        builder.words[0] = (builder.words.len() - 1) as u32;

        let mut hasher = DefaultHasher::new();
        builder.words.hash(&mut hasher);
        let hash = hasher.finish();

        if let Some(bucket) = self.dict.get(&hash) {
            for candidate in bucket {
                if self.record(*candidate) == Some(builder.words.as_slice()) {
                    tracing::trace!(type_id = candidate.0, "interned type reused");
                    return Ok(*candidate);
                }
            }
        }

        let offset = self.words.len();
        if offset + builder.words.len() > MAX_ID as usize {
            return Err(TypeError::WordLengthExceeded {
                what: "the type arena is full".to_string(),
                span: None,
            });
        }

        let id = TypeId(offset as u32);
        self.words.extend_from_slice(&builder.words);
        self.dict.entry(hash).or_default().push(id);
        tracing::trace!(type_id = id.0, words = builder.words.len(), "interned new type");
        Ok(id)
    }

    /// Words of a record including its length word
    fn record(&self, id: TypeId) -> Option<&[u32]> {
        if id.is_primitive() {
            return None;
        }
        let start = id.index();
        let len = *self.words.get(start)? as usize;
        self.words.get(start..start + 1 + len)
    }

    pub fn header(&self, id: TypeId) -> Option<TypeHeader> {
        let record = self.record(id)?;
        TypeHeader::unpack(*record.get(1)?, *record.get(2)?)
    }

    /// Header of a non-primitive type, failing on primitives and corrupt records
    pub fn read_header(&self, id: TypeId) -> TypeResult<TypeHeader> {
        self.header(id)
            .ok_or(internal_error!(InternalError::CorruptTypeRecord))
    }

    /// Declared arity of each type parameter
    pub fn param_arities(&self, id: TypeId) -> Vec<u8> {
        match (self.record(id), self.header(id)) {
            (Some(record), Some(header)) => record
                .iter()
                .skip(TYPE_PREFIX_LEN)
                .take(header.tyrity as usize)
                .map(|word| *word as u8)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Words after the parameter arities
    pub fn payload(&self, id: TypeId) -> &[u32] {
        match (self.record(id), self.header(id)) {
            (Some(record), Some(header)) => {
                let start = (TYPE_PREFIX_LEN + header.tyrity as usize).min(record.len());
                &record[start..]
            }
            _ => &[],
        }
    }

    pub fn sort(&self, id: TypeId) -> Option<Sort> {
        self.header(id).map(|header| header.sort)
    }

    /// Field count for records, parameter count for functions, zero for primitives
    pub fn arity(&self, id: TypeId) -> usize {
        self.header(id).map_or(0, |header| header.arity as usize)
    }

    pub fn tyrity(&self, id: TypeId) -> usize {
        self.header(id).map_or(0, |header| header.tyrity as usize)
    }

    pub fn is_function(&self, id: TypeId) -> bool {
        self.sort(id) == Some(Sort::Function)
    }

    /// Parameter elements of a function type
    pub fn fn_params(&self, id: TypeId) -> Option<Vec<TypeElement>> {
        let header = self.header(id).filter(|h| h.sort == Sort::Function)?;
        let payload = self.payload(id);
        Some(
            payload
                .iter()
                .take(header.arity as usize)
                .map(|word| TypeElement::decode(*word))
                .collect(),
        )
    }

    pub fn fn_return(&self, id: TypeId) -> Option<TypeElement> {
        let header = self.header(id).filter(|h| h.sort == Sort::Function)?;
        self.payload(id)
            .get(header.arity as usize)
            .map(|word| TypeElement::decode(*word))
    }

    /// First parameter of a function type, `None` for zero-arity functions
    pub fn first_param(&self, id: TypeId) -> Option<TypeElement> {
        let header = self.header(id).filter(|h| h.sort == Sort::Function)?;
        if header.arity == 0 {
            return None;
        }
        self.payload(id).first().map(|word| TypeElement::decode(*word))
    }

    /// Field names and types of a record
    pub fn fields(&self, id: TypeId) -> Vec<(NameId, TypeElement)> {
        let Some(header) = self.header(id).filter(|h| h.sort == Sort::Record) else {
            return Vec::new();
        };
        let arity = header.arity as usize;
        let payload = self.payload(id);
        payload
            .iter()
            .take(arity)
            .zip(payload.iter().skip(arity))
            .map(|(name, element)| (NameId(*name), TypeElement::decode(*element)))
            .collect()
    }

    /// The inline element tree of a type call
    pub fn call_tree(&self, id: TypeId) -> Option<&[u32]> {
        match self.sort(id) {
            Some(Sort::TypeCall) => Some(self.payload(id)),
            _ => None,
        }
    }

    /// Element tree standing for a type, inlining type calls
    pub fn type_tree(&self, id: TypeId) -> Vec<u32> {
        match self.call_tree(id) {
            Some(tree) => tree.to_vec(),
            None => vec![TypeElement::Concrete(id).encode()],
        }
    }

    /// Element tree standing for a single slot element
    pub fn element_tree(&self, element: TypeElement) -> Vec<u32> {
        match element {
            TypeElement::Concrete(id) => self.type_tree(id),
            other => vec![other.encode()],
        }
    }

    /// Turn an element tree back into a TypeId, interning a type call when needed
    ///
    /// `arities` are the declared arities of the parameters the tree may reference.
    pub fn intern_tree(&mut self, tree: &[u32], arities: &[u8]) -> TypeResult<TypeId> {
        let Some(root) = tree.first().map(|word| TypeElement::decode(*word)) else {
            return Err(internal_error!(InternalError::UnbalancedTypeExpression));
        };
        if let (TypeElement::Concrete(id), 1) = (root, tree.len()) {
            return Ok(id);
        }

        let tyrity = tree_tyrity(tree);
        let arg_count = root.child_count() as u8;
        let mut builder = self.begin(TypeHeader::new(Sort::TypeCall, arg_count, tyrity));
        for index in 0..tyrity as usize {
            builder.push_param_arity(arities.get(index).copied().unwrap_or(0));
        }
        builder.extend_tree(tree);
        self.commit(builder)
    }

    /// Dispatch key of a type
    pub fn outer(&self, id: TypeId) -> OuterType {
        match self.header(id) {
            None => OuterType::Concrete(id),
            Some(header) => match header.sort {
                Sort::Record | Sort::Enum => OuterType::Concrete(id),
                Sort::Function => OuterType::Function {
                    arity: header.arity,
                },
                Sort::TypeCall => match self.payload(id).first() {
                    Some(word) => self.element_outer(TypeElement::decode(*word)),
                    None => OuterType::Concrete(id),
                },
            },
        }
    }

    /// Dispatch key of a slot element
    pub fn element_outer(&self, element: TypeElement) -> OuterType {
        match element {
            TypeElement::Concrete(id) => self.outer(id),
            TypeElement::Param { arity, .. } => OuterType::Param { arity },
            TypeElement::Call { target, .. } => OuterType::Concrete(target),
        }
    }

    /// Number of arguments a type call applies its outer constructor to
    pub fn applied_arity(&self, id: TypeId) -> u8 {
        self.call_tree(id)
            .and_then(|tree| tree.first())
            .map_or(0, |word| TypeElement::decode(*word).child_count() as u8)
    }

    /// Render a type for diagnostics
    pub fn describe(&self, id: TypeId, names: &NameTable) -> String {
        if let Some(name) = id.primitive_name() {
            return names.display(name).to_string();
        }
        let Some(header) = self.header(id) else {
            return format!("{}", id);
        };
        if let (Some(name), Sort::Record | Sort::Enum) = (header.name(), header.sort) {
            return names.display(name).to_string();
        }

        match header.sort {
            Sort::Record | Sort::Enum => {
                let fields: Vec<String> = self
                    .fields(id)
                    .into_iter()
                    .map(|(name, element)| {
                        format!(
                            "{} {}",
                            names.display(name),
                            self.describe_element(element, names)
                        )
                    })
                    .collect();
                format!("({})", fields.join(" "))
            }
            Sort::Function => {
                let params: Vec<String> = self
                    .fn_params(id)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|element| self.describe_element(element, names))
                    .collect();
                let ret = self
                    .fn_return(id)
                    .map(|element| self.describe_element(element, names))
                    .unwrap_or_default();
                if params.is_empty() {
                    format!("F(-> {})", ret)
                } else {
                    format!("F({} -> {})", params.join(" "), ret)
                }
            }
            Sort::TypeCall => self.describe_tree(self.payload(id), names),
        }
    }

    pub fn describe_element(&self, element: TypeElement, names: &NameTable) -> String {
        match element {
            TypeElement::Concrete(id) => self.describe(id, names),
            other => self.describe_tree(&[other.encode()], names),
        }
    }

    /// Render an element tree such as `List(T0)`
    pub fn describe_tree(&self, tree: &[u32], names: &NameTable) -> String {
        let mut pos = 0;
        self.describe_subtree(tree, &mut pos, names)
    }

    fn describe_subtree(&self, tree: &[u32], pos: &mut usize, names: &NameTable) -> String {
        let Some(word) = tree.get(*pos) else {
            return String::new();
        };
        *pos += 1;
        let element = TypeElement::decode(*word);
        let head = match element {
            TypeElement::Concrete(id) => return self.describe(id, names),
            TypeElement::Param { index, .. } => format!("T{}", index),
            TypeElement::Call { target, .. } => self.describe(target, names),
        };
        let count = element.child_count();
        if count == 0 {
            return head;
        }
        let args: Vec<String> = (0..count)
            .map(|_| self.describe_subtree(tree, pos, names))
            .collect();
        format!("{}({})", head, args.join(" "))
    }
}

impl Default for TypeArena {
    fn default() -> Self {
        Self::new()
    }
}
