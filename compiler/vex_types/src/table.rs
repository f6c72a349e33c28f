//! The type table: arena and interner for type nodes.
//!
//! Every interned node lives in `entries` and is addressed by its index.
//! Lookup for deduplication goes through `buckets`, keyed by structural
//! hash, with [`TypeTable::compare`] resolving collisions.
//!
//! Class templates are never deduplicated: each declaration is its own
//! identity, which is what typename `source` handles rely on.

use std::cell::{Ref, RefCell};

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use tracing::{debug, error};
use vex_diagnostic::{Diagnostic, DiagnosticConfig, DiagnosticQueue, ErrorGuaranteed};
use vex_ir::{Name, StringInterner};

use crate::{InternalError, Primitive, Type, TypeId, TypeKind};

/// Owner of every interned type of one compilation unit.
pub struct TypeTable {
    entries: Vec<Type>,
    buckets: FxHashMap<u64, SmallVec<[TypeId; 2]>>,
    interner: StringInterner,
    diagnostics: RefCell<DiagnosticQueue>,
    /// Entries whose mono status is being computed (cycle guard).
    pub(crate) classifying: RefCell<FxHashSet<TypeId>>,
}

impl TypeTable {
    /// Create a table with the ten primitives pre-interned at their
    /// fixed handles ([`TypeId::BOOL`] .. [`TypeId::ANY`]).
    pub fn new() -> Self {
        let mut table = TypeTable {
            entries: Vec::with_capacity(64),
            buckets: FxHashMap::default(),
            interner: StringInterner::new(),
            diagnostics: RefCell::new(DiagnosticQueue::with_config(
                DiagnosticConfig::unlimited(),
            )),
            classifying: RefCell::new(FxHashSet::default()),
        };
        for kind in Primitive::ALL {
            let id = table.emplace(Type::primitive(kind));
            debug_assert_eq!(id, kind.id());
        }
        table
    }

    /// Intern `ty`, returning the handle of the structurally equal entry
    /// if one exists, otherwise of the newly inserted one.
    ///
    /// The stored node's entry back-reference is set here, once.
    pub fn emplace(&mut self, ty: Type) -> TypeId {
        if let Some(id) = ty.entry() {
            return id;
        }
        if matches!(ty.kind(), TypeKind::ClassTemplate { .. }) {
            return self.push(ty);
        }

        let hash = self.hash(&ty);
        if let Some(bucket) = self.buckets.get(&hash) {
            for &candidate in bucket {
                if self.compare(&self.entries[candidate.index()], &ty).is_eq() {
                    return candidate;
                }
            }
        }
        let id = self.push(ty);
        self.buckets.entry(hash).or_default().push(id);
        id
    }

    fn push(&mut self, mut ty: Type) -> TypeId {
        let id = TypeId::from_raw(u32::try_from(self.entries.len()).unwrap_or(u32::MAX));
        ty.set_entry(id);
        debug!(?id, tag = %ty.tag(), "interned type");
        self.entries.push(ty);
        id
    }

    /// Register a class by name before its typenames and parents are
    /// known. Its mono status stays `Unset` until
    /// [`define_class`](Self::define_class) is called.
    pub fn declare_class(&mut self, name: Name) -> TypeId {
        self.push(Type::class_template(name, None, Vec::new()))
    }

    /// Complete a declared class with its typename names and parents.
    ///
    /// Typename nodes are created here with `source` set to `class`.
    /// Defining a class twice, or calling this on something that is not a
    /// class template, is an internal error and leaves the entry unchanged.
    pub fn define_class(
        &mut self,
        class: TypeId,
        typenames: impl IntoIterator<Item = Name>,
        parents: Vec<TypeId>,
    ) -> Result<(), ErrorGuaranteed> {
        let err = match self.entries.get_mut(class.index()).map(Type::kind_mut) {
            Some(TypeKind::ClassTemplate {
                name,
                typenames: slot @ None,
                parents: parent_slot,
            }) => {
                let list: Vec<Type> = typenames
                    .into_iter()
                    .map(|tn| Type::typename(tn, class))
                    .collect();
                debug!(
                    class = self.interner.lookup(*name),
                    typenames = list.len(),
                    parents = parents.len(),
                    "defined class"
                );
                *slot = Some(list);
                *parent_slot = parents;
                return Ok(());
            }
            Some(TypeKind::ClassTemplate { name, .. }) => InternalError::ClassRedefined {
                name: self.interner.lookup(*name).to_owned(),
            },
            Some(_) => InternalError::NotATemplate { id: class },
            None => InternalError::UnknownType { id: class },
        };
        Err(self.report_internal(err))
    }

    /// The node behind a handle.
    ///
    /// # Panics
    ///
    /// If `id` was not produced by this table.
    #[inline]
    pub fn get(&self, id: TypeId) -> &Type {
        &self.entries[id.index()]
    }

    #[inline]
    pub fn try_get(&self, id: TypeId) -> Option<&Type> {
        self.entries.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (TypeId, &Type)> {
        self.entries.iter().filter_map(|ty| Some((ty.entry()?, ty)))
    }

    pub fn intern(&self, s: &str) -> Name {
        self.interner.intern(s)
    }

    pub fn name(&self, name: Name) -> &'static str {
        self.interner.lookup(name)
    }

    /// Log an internal error and record it as a bug diagnostic.
    #[cold]
    pub fn report_internal(&self, err: InternalError) -> ErrorGuaranteed {
        error!(%err, "internal type model error");
        self.diagnostics
            .borrow_mut()
            .emit_error(Diagnostic::bug(err.to_string()), 0)
    }

    /// Diagnostics recorded so far.
    pub fn diagnostics(&self) -> Ref<'_, DiagnosticQueue> {
        self.diagnostics.borrow()
    }

    /// Drain recorded diagnostics, ordered by span.
    pub fn take_diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow_mut().flush()
    }
}

impl Default for TypeTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
