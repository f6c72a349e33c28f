//! Type nodes.

use std::cell::Cell;
use std::fmt;

use vex_ir::Name;

use crate::{MonoStatus, Primitive, TypeId};

/// Variant discriminant. Structural comparison orders by this first.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[repr(u8)]
pub enum TypeTag {
    Primitive = 0,
    Array = 1,
    Callable = 2,
    ClassTemplate = 3,
    Typename = 4,
    Mono = 5,
}

impl TypeTag {
    pub const fn name(self) -> &'static str {
        match self {
            TypeTag::Primitive => "primitive",
            TypeTag::Array => "array",
            TypeTag::Callable => "callable",
            TypeTag::ClassTemplate => "class_template",
            TypeTag::Typename => "typename",
            TypeTag::Mono => "mono",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The six type variants.
#[derive(Debug)]
pub enum TypeKind {
    Primitive(Primitive),

    /// `array[elem]`
    Array { elem: Box<Type> },

    /// `(params) -> ret`
    Callable { ret: Box<Type>, params: Vec<Type> },

    /// A class declaration, generic when `typenames` is non-empty.
    ///
    /// `typenames == None` means the declaration has been registered but not
    /// yet defined; that is distinct from `Some(vec![])`, a concrete class.
    /// Each entry of `typenames` is a [`TypeKind::Typename`] whose `source`
    /// is this class. `parents` alias other table entries.
    ClassTemplate {
        name: Name,
        typenames: Option<Vec<Type>>,
        parents: Vec<TypeId>,
    },

    /// Type parameter placeholder. Two typenames are the same parameter
    /// only if they share `source`, the class that declared them.
    Typename { name: Name, source: TypeId },

    /// Instantiation of `template` with `args`, one per template typename.
    Mono { template: TypeId, args: Vec<Type> },
}

/// A type node.
///
/// Carries two pieces of mutable metadata next to its immutable structure:
/// the memoized [`MonoStatus`] and, once interned, the handle of its own
/// table entry.
pub struct Type {
    kind: TypeKind,
    mono: Cell<MonoStatus>,
    entry: Option<TypeId>,
}

impl Type {
    fn new(kind: TypeKind) -> Self {
        Type {
            kind,
            mono: Cell::new(MonoStatus::Unset),
            entry: None,
        }
    }

    pub fn primitive(kind: Primitive) -> Self {
        Self::new(TypeKind::Primitive(kind))
    }

    pub fn array(elem: Type) -> Self {
        Self::new(TypeKind::Array {
            elem: Box::new(elem),
        })
    }

    pub fn callable(ret: Type, params: Vec<Type>) -> Self {
        Self::new(TypeKind::Callable {
            ret: Box::new(ret),
            params,
        })
    }

    pub fn class_template(name: Name, typenames: Option<Vec<Type>>, parents: Vec<TypeId>) -> Self {
        Self::new(TypeKind::ClassTemplate {
            name,
            typenames,
            parents,
        })
    }

    pub fn typename(name: Name, source: TypeId) -> Self {
        Self::new(TypeKind::Typename { name, source })
    }

    pub fn mono(template: TypeId, args: Vec<Type>) -> Self {
        Self::new(TypeKind::Mono { template, args })
    }

    #[inline]
    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    /// Mutable access for use while a type is still being built.
    ///
    /// Clears this node's cached mono status. Interned types are only
    /// reachable through shared references, so they cannot be mutated.
    pub fn kind_mut(&mut self) -> &mut TypeKind {
        self.mono.set(MonoStatus::Unset);
        &mut self.kind
    }

    pub fn tag(&self) -> TypeTag {
        match self.kind {
            TypeKind::Primitive(_) => TypeTag::Primitive,
            TypeKind::Array { .. } => TypeTag::Array,
            TypeKind::Callable { .. } => TypeTag::Callable,
            TypeKind::ClassTemplate { .. } => TypeTag::ClassTemplate,
            TypeKind::Typename { .. } => TypeTag::Typename,
            TypeKind::Mono { .. } => TypeTag::Mono,
        }
    }

    /// Handle of this node's table entry, if it has been interned.
    #[inline]
    pub fn entry(&self) -> Option<TypeId> {
        self.entry
    }

    /// Set the entry handle. Only the table calls this, once, at insertion.
    pub(crate) fn set_entry(&mut self, id: TypeId) {
        debug_assert!(self.entry.is_none(), "type interned twice");
        self.entry = Some(id);
    }

    /// Raw cached mono status, `Unset` if never computed.
    ///
    /// Use [`TypeTable::get_or_compute`](crate::TypeTable::get_or_compute)
    /// for a computed answer.
    #[inline]
    pub fn mono_status(&self) -> MonoStatus {
        self.mono.get()
    }

    #[inline]
    pub(crate) fn cache_mono_status(&self, status: MonoStatus) {
        self.mono.set(status);
    }

    /// Deep copy.
    ///
    /// Every owned child is copied. `Typename::source`, `Mono::template` and
    /// class parents keep referring to the original table entries. The copy
    /// is not interned and has no cached mono status.
    #[must_use]
    pub fn copy(&self) -> Type {
        vex_stack::ensure_sufficient_stack(|| {
            let kind = match &self.kind {
                TypeKind::Primitive(p) => TypeKind::Primitive(*p),
                TypeKind::Array { elem } => TypeKind::Array {
                    elem: Box::new(elem.copy()),
                },
                TypeKind::Callable { ret, params } => TypeKind::Callable {
                    ret: Box::new(ret.copy()),
                    params: params.iter().map(Type::copy).collect(),
                },
                TypeKind::ClassTemplate {
                    name,
                    typenames,
                    parents,
                } => TypeKind::ClassTemplate {
                    name: *name,
                    typenames: typenames
                        .as_ref()
                        .map(|list| list.iter().map(Type::copy).collect()),
                    parents: parents.clone(),
                },
                TypeKind::Typename { name, source } => TypeKind::Typename {
                    name: *name,
                    source: *source,
                },
                TypeKind::Mono { template, args } => TypeKind::Mono {
                    template: *template,
                    args: args.iter().map(Type::copy).collect(),
                },
            };
            Type::new(kind)
        })
    }

    /// Owned children in structural order.
    pub fn children(&self) -> impl Iterator<Item = &Type> {
        let (first, rest): (Option<&Type>, &[Type]) = match &self.kind {
            TypeKind::Primitive(_) | TypeKind::Typename { .. } => (None, &[]),
            TypeKind::Array { elem } => (Some(&**elem), &[]),
            TypeKind::Callable { ret, params } => (Some(&**ret), params),
            TypeKind::ClassTemplate { typenames, .. } => {
                (None, typenames.as_deref().unwrap_or_default())
            }
            TypeKind::Mono { args, .. } => (None, args),
        };
        first.into_iter().chain(rest.iter())
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Type")
            .field("kind", &self.kind)
            .field("mono", &self.mono.get())
            .field("entry", &self.entry)
            .finish()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
