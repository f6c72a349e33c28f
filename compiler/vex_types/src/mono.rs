//! Monomorphization classifier.
//!
//! Decides whether a type is fully concrete: no typename placeholder
//! anywhere in its owned structure or its class ancestry. The answer is
//! memoized on the node itself.
//!
//! `Unset` doubles as "cannot tell yet" (a class declared but not yet
//! defined). It propagates upward instead of being demoted to `NotFull`,
//! and it is never cached, so a later query after the class is defined
//! gets a real answer.

use tracing::trace;

use crate::{InternalError, Type, TypeKind, TypeTable};

/// Polymorphism-completeness of a type.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
#[repr(u8)]
pub enum MonoStatus {
    /// Not computed, or not analyzable yet.
    #[default]
    Unset,
    /// Fully concrete.
    Full,
    /// Contains at least one typename placeholder.
    NotFull,
}

impl MonoStatus {
    /// Combine the statuses of all children: any `Unset` wins, then any
    /// `NotFull`, else `Full`.
    pub fn all(statuses: impl IntoIterator<Item = MonoStatus>) -> MonoStatus {
        let mut result = MonoStatus::Full;
        for status in statuses {
            match status {
                MonoStatus::Unset => return MonoStatus::Unset,
                MonoStatus::NotFull => result = MonoStatus::NotFull,
                MonoStatus::Full => {}
            }
        }
        result
    }

    pub fn is_full(self) -> bool {
        self == MonoStatus::Full
    }
}

impl TypeTable {
    /// Cached status if known, otherwise classify and cache.
    pub fn get_or_compute(&self, ty: &Type) -> MonoStatus {
        let cached = ty.mono_status();
        if cached != MonoStatus::Unset {
            return cached;
        }
        let status = self.classify(ty);
        if status != MonoStatus::Unset {
            ty.cache_mono_status(status);
        }
        status
    }

    /// [`get_or_compute`](Self::get_or_compute) for an interned type.
    ///
    /// Re-entering an entry that is already being classified (a class that
    /// inherits from itself) yields `Unset`.
    pub fn mono_status_of(&self, id: crate::TypeId) -> MonoStatus {
        let Some(ty) = self.try_get(id) else {
            self.report_internal(InternalError::UnknownType { id });
            return MonoStatus::Unset;
        };
        if !self.classifying.borrow_mut().insert(id) {
            return MonoStatus::Unset;
        }
        let status = self.get_or_compute(ty);
        self.classifying.borrow_mut().remove(&id);
        status
    }

    /// Classify without consulting this node's own cache.
    ///
    /// Children are resolved through [`get_or_compute`](Self::get_or_compute),
    /// so their results are memoized as a side effect.
    pub fn classify(&self, ty: &Type) -> MonoStatus {
        let status = vex_stack::ensure_sufficient_stack(|| match ty.kind() {
            TypeKind::Primitive(_) => MonoStatus::Full,
            TypeKind::Typename { .. } => MonoStatus::NotFull,
            TypeKind::Array { .. } | TypeKind::Callable { .. } => {
                MonoStatus::all(ty.children().map(|child| self.get_or_compute(child)))
            }
            TypeKind::ClassTemplate {
                typenames, parents, ..
            } => match typenames {
                None => MonoStatus::Unset,
                Some(list) if !list.is_empty() => MonoStatus::NotFull,
                Some(_) => MonoStatus::all(parents.iter().map(|&p| self.mono_status_of(p))),
            },
            TypeKind::Mono { template, args } => {
                let Some(expected) = self.template_arity(*template) else {
                    return MonoStatus::Unset;
                };
                if expected != args.len() {
                    self.report_internal(InternalError::MonoArity {
                        template: self.render_id(*template),
                        expected,
                        found: args.len(),
                    });
                    return MonoStatus::Unset;
                }
                MonoStatus::all(args.iter().map(|arg| self.get_or_compute(arg)))
            }
        });
        trace!(tag = %ty.tag(), ?status, "classified type");
        status
    }

    /// Typename count of a class template, `None` if it is not yet defined.
    ///
    /// A handle that is not a class template is an internal error.
    fn template_arity(&self, id: crate::TypeId) -> Option<usize> {
        match self.try_get(id).map(Type::kind) {
            Some(TypeKind::ClassTemplate { typenames, .. }) => typenames.as_ref().map(Vec::len),
            Some(_) => {
                self.report_internal(InternalError::NotATemplate { id });
                None
            }
            None => {
                self.report_internal(InternalError::UnknownType { id });
                None
            }
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
