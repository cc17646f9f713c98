//! Generic matching
//!
//! A template is an element tree that may mention the type parameters of the
//! declaration it came from. Matching walks a template and a candidate type in
//! lock step, binding uncalled parameters to whole subtrees and called
//! parameters to constructors. Parameters on the candidate side belong to an
//! enclosing declaration and are treated as opaque.

use crate::arena::TypeArena;
use crate::error::{to_source_span, TypeError, TypeResult};
use crate::types::{skip_element, tree_tyrity, Sort, TypeElement, TypeId};
use tarn_parser::Span;

/// What a called type parameter stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constructor {
    /// A generic type such as `List`
    Type(TypeId),
    /// A constructor parameter of the enclosing declaration
    Param(u8),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamBinding {
    /// An uncalled parameter, bound to an encoded element tree
    Tree(Vec<u32>),
    /// A called parameter, bound to the constructor it is applied as
    Constructor(Constructor),
}

/// Bindings of a template's type parameters, indexed by parameter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamBindings {
    slots: Vec<Option<ParamBinding>>,
}

impl ParamBindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, index: u8) -> Option<&ParamBinding> {
        self.slots.get(index as usize).and_then(Option::as_ref)
    }

    /// Bind a parameter, or check the existing binding agrees
    fn bind(&mut self, index: u8, binding: ParamBinding) -> bool {
        let index = index as usize;
        if self.slots.len() <= index {
            self.slots.resize(index + 1, None);
        }
        match &self.slots[index] {
            Some(existing) => *existing == binding,
            None => {
                self.slots[index] = Some(binding);
                true
            }
        }
    }

    /// The type an uncalled parameter is bound to, interning sub-calls as needed
    pub fn bound_type(
        &self,
        index: u8,
        arena: &mut TypeArena,
        scope_arities: &[u8],
    ) -> TypeResult<Option<TypeId>> {
        match self.get(index) {
            Some(ParamBinding::Tree(tree)) => arena.intern_tree(tree, scope_arities).map(Some),
            _ => Ok(None),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Read-only matching of templates against types
pub struct GenericMatcher<'a> {
    arena: &'a TypeArena,
}

impl<'a> GenericMatcher<'a> {
    pub fn new(arena: &'a TypeArena) -> Self {
        Self { arena }
    }

    /// Whether `concrete` is an instance of `generic`, and under which bindings
    pub fn satisfies_generic(&self, concrete: TypeId, generic: TypeId) -> Option<ParamBindings> {
        let mut bindings = ParamBindings::new();
        let template = self.arena.type_tree(generic);
        let actual = self.arena.type_tree(concrete);
        self.match_trees(&template, &actual, &mut bindings)
            .then_some(bindings)
    }

    /// Match one slot of a signature against an argument type, extending `bindings`
    pub fn match_element(
        &self,
        template: TypeElement,
        actual: TypeId,
        bindings: &mut ParamBindings,
    ) -> bool {
        let template = self.arena.element_tree(template);
        let actual = self.arena.type_tree(actual);
        self.match_trees(&template, &actual, bindings)
    }

    fn match_trees(&self, template: &[u32], actual: &[u32], bindings: &mut ParamBindings) -> bool {
        let (mut tp, mut ap) = (0, 0);
        self.match_subtree(template, &mut tp, actual, &mut ap, bindings)
            && tp == template.len()
            && ap == actual.len()
    }

    fn match_subtree(
        &self,
        template: &[u32],
        tp: &mut usize,
        actual: &[u32],
        ap: &mut usize,
        bindings: &mut ParamBindings,
    ) -> bool {
        let (Some(t_word), Some(a_word)) = (template.get(*tp), actual.get(*ap)) else {
            return false;
        };
        let t_elem = TypeElement::decode(*t_word);
        let a_elem = TypeElement::decode(*a_word);

        match t_elem {
            TypeElement::Param { index, arity: 0 } => {
                let end = skip_element(actual, *ap);
                let subtree = actual[*ap..end].to_vec();
                *tp += 1;
                *ap = end;
                bindings.bind(index, ParamBinding::Tree(subtree))
            }
            TypeElement::Param { index, arity } => {
                let constructor = match a_elem {
                    TypeElement::Call { target, arg_count } if arg_count == arity => {
                        Constructor::Type(target)
                    }
                    TypeElement::Param {
                        index: outer,
                        arity: applied,
                    } if applied == arity => Constructor::Param(outer),
                    _ => return false,
                };
                if !bindings.bind(index, ParamBinding::Constructor(constructor)) {
                    return false;
                }
                *tp += 1;
                *ap += 1;
                self.match_children(arity as usize, template, tp, actual, ap, bindings)
            }
            TypeElement::Call { target, arg_count } => {
                if a_elem != (TypeElement::Call { target, arg_count }) {
                    return false;
                }
                *tp += 1;
                *ap += 1;
                self.match_children(arg_count as usize, template, tp, actual, ap, bindings)
            }
            TypeElement::Concrete(expected) => {
                let TypeElement::Concrete(found) = a_elem else {
                    return false;
                };
                *tp += 1;
                *ap += 1;
                expected == found || self.match_structures(expected, found, bindings)
            }
        }
    }

    fn match_children(
        &self,
        count: usize,
        template: &[u32],
        tp: &mut usize,
        actual: &[u32],
        ap: &mut usize,
        bindings: &mut ParamBindings,
    ) -> bool {
        (0..count).all(|_| self.match_subtree(template, tp, actual, ap, bindings))
    }

    /// Match a partial record or function type slot by slot
    fn match_structures(&self, template: TypeId, actual: TypeId, bindings: &mut ParamBindings) -> bool {
        if !self.same_shape(template, actual) {
            return false;
        }
        self.slot_pairs(template, actual)
            .into_iter()
            .all(|(t, a)| {
                let t_tree = self.arena.element_tree(t);
                let a_tree = self.arena.element_tree(a);
                self.match_trees(&t_tree, &a_tree, bindings)
            })
    }

    /// Same sort, arity, name and field names, with the template still partial
    fn same_shape(&self, template: TypeId, actual: TypeId) -> bool {
        let (Some(t), Some(a)) = (self.arena.header(template), self.arena.header(actual)) else {
            return false;
        };
        if t.tyrity == 0 || t.sort != a.sort || t.arity != a.arity || t.name_and_len != a.name_and_len {
            return false;
        }
        match t.sort {
            Sort::Record => {
                let names = |id| {
                    self.arena
                        .fields(id)
                        .into_iter()
                        .map(|(name, _)| name)
                        .collect::<Vec<_>>()
                };
                names(template) == names(actual)
            }
            Sort::Function => true,
            Sort::Enum | Sort::TypeCall => false,
        }
    }

    fn slot_pairs(&self, template: TypeId, actual: TypeId) -> Vec<(TypeElement, TypeElement)> {
        slots(self.arena, template)
            .into_iter()
            .zip(slots(self.arena, actual))
            .collect()
    }

    /// Whether some type could satisfy both templates
    ///
    /// Conservative: a parameter repeated within one template is not cross-checked.
    pub fn generics_intersect(&self, first: &[u32], second: &[u32]) -> bool {
        let (mut fp, mut sp) = (0, 0);
        self.intersect_subtree(first, &mut fp, second, &mut sp)
    }

    fn intersect_subtree(&self, a: &[u32], ap: &mut usize, b: &[u32], bp: &mut usize) -> bool {
        let (Some(a_word), Some(b_word)) = (a.get(*ap), b.get(*bp)) else {
            return false;
        };
        let a_end = skip_element(a, *ap);
        let b_end = skip_element(b, *bp);
        let a_elem = TypeElement::decode(*a_word);
        let b_elem = TypeElement::decode(*b_word);

        let result = match (a_elem, b_elem) {
            (TypeElement::Param { arity: 0, .. }, _) | (_, TypeElement::Param { arity: 0, .. }) => true,
            (TypeElement::Concrete(x), TypeElement::Concrete(y)) => {
                x == y || self.structures_intersect(x, y)
            }
            (TypeElement::Concrete(_), _) | (_, TypeElement::Concrete(_)) => false,
            (TypeElement::Call { target: x, .. }, TypeElement::Call { target: y, .. })
                if x != y =>
            {
                false
            }
            _ if a_elem.child_count() != b_elem.child_count() => false,
            _ => {
                *ap += 1;
                *bp += 1;
                (0..a_elem.child_count()).fold(true, |all, _| {
                    self.intersect_subtree(a, ap, b, bp) && all
                })
            }
        };

        *ap = a_end;
        *bp = b_end;
        result
    }

    fn structures_intersect(&self, x: TypeId, y: TypeId) -> bool {
        let partial = self.arena.tyrity(x) > 0 || self.arena.tyrity(y) > 0;
        if !partial {
            return false;
        }
        let (template, other) = if self.arena.tyrity(x) > 0 { (x, y) } else { (y, x) };
        if !self.same_shape(template, other) {
            return false;
        }
        self.slot_pairs(x, y).into_iter().all(|(s, t)| {
            let s_tree = self.arena.element_tree(s);
            let t_tree = self.arena.element_tree(t);
            self.generics_intersect(&s_tree, &t_tree)
        })
    }
}

/// Payload elements of a record or function, in order
fn slots(arena: &TypeArena, id: TypeId) -> Vec<TypeElement> {
    match arena.sort(id) {
        Some(Sort::Record) => arena.fields(id).into_iter().map(|(_, element)| element).collect(),
        Some(Sort::Function) => {
            let mut elements = arena.fn_params(id).unwrap_or_default();
            elements.extend(arena.fn_return(id));
            elements
        }
        _ => Vec::new(),
    }
}

/// Substitute bindings into a template and intern the result
///
/// `scope_arities` describe the parameters of the enclosing declaration, which
/// may still appear in the result.
pub fn instantiate(
    arena: &mut TypeArena,
    template: TypeElement,
    bindings: &ParamBindings,
    scope_arities: &[u8],
    span: Option<Span>,
) -> TypeResult<TypeId> {
    let tree = arena.element_tree(template);
    let mut out = Vec::with_capacity(tree.len());
    let mut pos = 0;
    instantiate_subtree(arena, &tree, &mut pos, &mut out, bindings, scope_arities, span)?;
    arena.intern_tree(&out, scope_arities)
}

fn instantiate_subtree(
    arena: &mut TypeArena,
    tree: &[u32],
    pos: &mut usize,
    out: &mut Vec<u32>,
    bindings: &ParamBindings,
    scope_arities: &[u8],
    span: Option<Span>,
) -> TypeResult<()> {
    let Some(word) = tree.get(*pos) else {
        return Ok(());
    };
    *pos += 1;
    let element = TypeElement::decode(*word);

    match element {
        TypeElement::Concrete(id) => {
            let id = if arena.tyrity(id) > 0 {
                instantiate_structure(arena, id, bindings, scope_arities, span)?
            } else {
                id
            };
            out.push(TypeElement::Concrete(id).encode());
            return Ok(());
        }
        TypeElement::Param { index, arity: 0 } => {
            return match bindings.get(index) {
                Some(ParamBinding::Tree(bound)) => {
                    out.extend_from_slice(bound);
                    Ok(())
                }
                _ => Err(unresolved(index, span)),
            };
        }
        TypeElement::Param { index, arity } => match bindings.get(index) {
            Some(ParamBinding::Constructor(Constructor::Type(target))) => out.push(
                TypeElement::Call {
                    target: *target,
                    arg_count: arity,
                }
                .encode(),
            ),
            Some(ParamBinding::Constructor(Constructor::Param(outer))) => out.push(
                TypeElement::Param {
                    index: *outer,
                    arity,
                }
                .encode(),
            ),
            _ => return Err(unresolved(index, span)),
        },
        TypeElement::Call { .. } => out.push(*word),
    }

    for _ in 0..element.child_count() {
        instantiate_subtree(arena, tree, pos, out, bindings, scope_arities, span)?;
    }
    Ok(())
}

/// Rebuild a partial record or function type with its slots instantiated
fn instantiate_structure(
    arena: &mut TypeArena,
    id: TypeId,
    bindings: &ParamBindings,
    scope_arities: &[u8],
    span: Option<Span>,
) -> TypeResult<TypeId> {
    let mut header = arena.read_header(id)?;
    let names: Vec<u32> = match header.sort {
        Sort::Record => arena.fields(id).into_iter().map(|(name, _)| name.0).collect(),
        Sort::Function => Vec::new(),
        Sort::Enum | Sort::TypeCall => return Ok(id),
    };

    let mut elements = Vec::new();
    let mut tyrity = 0;
    for slot in slots(arena, id) {
        let tree = arena.element_tree(slot);
        let mut out = Vec::new();
        let mut pos = 0;
        instantiate_subtree(arena, &tree, &mut pos, &mut out, bindings, scope_arities, span)?;
        tyrity = tyrity.max(tree_tyrity(&out));
        let element = match out.as_slice() {
            [single] => match TypeElement::decode(*single) {
                element @ (TypeElement::Concrete(_) | TypeElement::Param { arity: 0, .. }) => element,
                _ => TypeElement::Concrete(arena.intern_tree(&out, scope_arities)?),
            },
            _ => TypeElement::Concrete(arena.intern_tree(&out, scope_arities)?),
        };
        if let TypeElement::Concrete(inner) = element {
            tyrity = tyrity.max(arena.tyrity(inner) as u8);
        }
        elements.push(element);
    }

    header.tyrity = tyrity;
    let mut builder = arena.begin(header);
    for index in 0..tyrity as usize {
        builder.push_param_arity(scope_arities.get(index).copied().unwrap_or(0));
    }
    for name in names {
        builder.push_name(tarn_parser::NameId(name));
    }
    for element in elements {
        builder.push_element(element);
    }
    arena.commit(builder)
}

fn unresolved(index: u8, span: Option<Span>) -> TypeError {
    TypeError::TypeUnresolvedParam {
        param: format!("T{}", index),
        span: to_source_span(span),
    }
}
