//! Structural comparison and hashing.
//!
//! Both algorithms consume the same per-node decomposition, [`fields`], so
//! they visit exactly the same data in exactly the same order. The only
//! place they differ is [`Field::Ref`]: comparison follows the reference
//! structurally, hashing folds in a shallow key of the target (its leading
//! scalar fields). Structural equality implies equal shallow keys, hence
//! `compare(a, b) == Equal` implies `hash(a) == hash(b)`, and hashing
//! terminates even on recursive class hierarchies.
//!
//! Comparison through references keeps a set of entry pairs already under
//! comparison; meeting such a pair again assumes equality, which makes
//! comparison of self-referential hierarchies terminate.
//!
//! A reference to a class that is declared but not yet defined has no
//! structure to compare, so references to distinct undefined classes
//! compare by handle, and sort before every other reference. Monos over
//! two forward declarations of the same name stay distinct until the
//! classes are defined.

use std::cell::RefCell;
use std::cmp::Ordering;

use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use crate::{Type, TypeId, TypeKind, TypeTable};

const HASH_SEED: u64 = 5381;
const GOLDEN_RATIO: u64 = 0x9e37_79b9;

/// Number of leading scalar fields used as a reference's shallow key:
/// tag plus the first discriminating word (primitive kind or name).
const SHALLOW_WORDS: usize = 2;

/// `seed ^= value + φ + (seed << 6) + (seed >> 2)`
#[inline]
pub(crate) fn hash_combine(seed: u64, value: u64) -> u64 {
    seed ^ value
        .wrapping_add(GOLDEN_RATIO)
        .wrapping_add(seed << 6)
        .wrapping_add(seed >> 2)
}

/// One element of a node's structural decomposition.
#[derive(Copy, Clone)]
enum Field<'a> {
    /// Tag, primitive kind, name or list length.
    Word(u64),
    /// Compared and hashed by handle identity.
    Identity(TypeId),
    /// Owned child, recursed into.
    Owned(&'a Type),
    /// Non-owning reference, compared structurally, hashed shallowly.
    Ref(TypeId),
}

/// Decompose a node in comparison order.
///
/// Every list is preceded by its length so that lexicographic comparison
/// is length-first and two decompositions stay aligned until they differ.
fn fields(ty: &Type) -> SmallVec<[Field<'_>; 8]> {
    let mut out = SmallVec::new();
    out.push(Field::Word(ty.tag() as u64));
    match ty.kind() {
        TypeKind::Primitive(p) => out.push(Field::Word(*p as u64)),
        TypeKind::Array { elem } => out.push(Field::Owned(elem)),
        TypeKind::Callable { ret, params } => {
            out.push(Field::Owned(ret));
            out.push(Field::Word(params.len() as u64));
            out.extend(params.iter().map(Field::Owned));
        }
        TypeKind::ClassTemplate {
            name,
            typenames,
            parents,
        } => {
            out.push(Field::Word(u64::from(name.raw())));
            out.push(Field::Word(parents.len() as u64));
            out.extend(parents.iter().map(|&p| Field::Ref(p)));
            match typenames {
                None => out.push(Field::Word(0)),
                Some(list) => {
                    out.push(Field::Word(1));
                    out.push(Field::Word(list.len() as u64));
                    out.extend(list.iter().map(Field::Owned));
                }
            }
        }
        TypeKind::Typename { name, source } => {
            out.push(Field::Word(u64::from(name.raw())));
            out.push(Field::Identity(*source));
        }
        TypeKind::Mono { template, args } => {
            out.push(Field::Ref(*template));
            out.push(Field::Word(args.len() as u64));
            out.extend(args.iter().map(Field::Owned));
        }
    }
    out
}

/// Comparison state: pairs of entries currently being compared.
struct Comparator<'t> {
    table: &'t TypeTable,
    in_progress: RefCell<FxHashSet<(TypeId, TypeId)>>,
}

impl Comparator<'_> {
    fn compare(&self, a: &Type, b: &Type) -> Ordering {
        if std::ptr::eq(a, b) {
            return Ordering::Equal;
        }
        if let (Some(ea), Some(eb)) = (a.entry(), b.entry()) {
            if ea == eb {
                return Ordering::Equal;
            }
        }
        vex_stack::ensure_sufficient_stack(|| {
            let (fa, fb) = (fields(a), fields(b));
            for (x, y) in fa.iter().zip(fb.iter()) {
                let ord = self.compare_field(*x, *y);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            fa.len().cmp(&fb.len())
        })
    }

    fn compare_field(&self, x: Field<'_>, y: Field<'_>) -> Ordering {
        match (x, y) {
            (Field::Word(a), Field::Word(b)) => a.cmp(&b),
            (Field::Identity(a), Field::Identity(b)) => a.cmp(&b),
            (Field::Owned(a), Field::Owned(b)) => self.compare(a, b),
            (Field::Ref(a), Field::Ref(b)) => self.compare_refs(a, b),
            // Decompositions are aligned by tag and lengths, so mixed pairs
            // only arise from a malformed table; order them by kind.
            _ => field_rank(x).cmp(&field_rank(y)),
        }
    }

    fn compare_refs(&self, a: TypeId, b: TypeId) -> Ordering {
        if a == b {
            return Ordering::Equal;
        }
        let (Some(ta), Some(tb)) = (self.table.try_get(a), self.table.try_get(b)) else {
            return a.cmp(&b);
        };
        match (is_undefined_class(ta), is_undefined_class(tb)) {
            (true, true) => return a.cmp(&b),
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            (false, false) => {}
        }
        if !self.in_progress.borrow_mut().insert((a, b)) {
            return Ordering::Equal;
        }
        let ord = self.compare(ta, tb);
        self.in_progress.borrow_mut().remove(&(a, b));
        ord
    }
}

fn is_undefined_class(ty: &Type) -> bool {
    matches!(ty.kind(), TypeKind::ClassTemplate { typenames: None, .. })
}

fn field_rank(field: Field<'_>) -> u8 {
    match field {
        Field::Word(_) => 0,
        Field::Identity(_) => 1,
        Field::Owned(_) => 2,
        Field::Ref(_) => 3,
    }
}

impl TypeTable {
    /// Structural total order over types.
    ///
    /// Orders by tag, then variant fields. Returns `Equal` immediately for
    /// the same node or the same table entry.
    pub fn compare(&self, a: &Type, b: &Type) -> Ordering {
        Comparator {
            table: self,
            in_progress: RefCell::new(FxHashSet::default()),
        }
        .compare(a, b)
    }

    /// [`compare`](Self::compare) on interned handles.
    pub fn compare_ids(&self, a: TypeId, b: TypeId) -> Ordering {
        Comparator {
            table: self,
            in_progress: RefCell::new(FxHashSet::default()),
        }
        .compare_refs(a, b)
    }

    /// Structural hash consistent with [`compare`](Self::compare).
    pub fn hash(&self, ty: &Type) -> u64 {
        vex_stack::ensure_sufficient_stack(|| {
            fields(ty)
                .into_iter()
                .fold(HASH_SEED, |seed, field| {
                    hash_combine(seed, self.hash_field(field))
                })
        })
    }

    /// [`hash`](Self::hash) on an interned handle.
    pub fn hash_id(&self, id: TypeId) -> u64 {
        self.try_get(id)
            .map_or_else(|| u64::from(id.raw()), |ty| self.hash(ty))
    }

    fn hash_field(&self, field: Field<'_>) -> u64 {
        match field {
            Field::Word(w) => w,
            Field::Identity(id) => u64::from(id.raw()),
            Field::Owned(ty) => self.hash(ty),
            Field::Ref(id) => self.shallow_key(id),
        }
    }

    /// Hash of the leading scalar fields of an entry.
    fn shallow_key(&self, id: TypeId) -> u64 {
        let Some(ty) = self.try_get(id) else {
            return u64::from(id.raw());
        };
        fields(ty)
            .into_iter()
            .take(SHALLOW_WORDS)
            .map_while(|field| match field {
                Field::Word(w) => Some(w),
                _ => None,
            })
            .fold(HASH_SEED, hash_combine)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
