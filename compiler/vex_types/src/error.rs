//! Internal type-model errors.
//!
//! These indicate compiler bugs, not user mistakes. They are logged and
//! recorded as [`Severity::Bug`](vex_diagnostic::Severity::Bug) diagnostics;
//! the failing operation degrades (e.g. classification yields `Unset`)
//! instead of aborting the compilation.

use crate::TypeId;

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum InternalError {
    /// A mono's argument list length differs from its template's typename count.
    #[error("mono of `{template}` has {found} type arguments, template declares {expected}")]
    MonoArity {
        template: String,
        expected: usize,
        found: usize,
    },

    /// A mono or parent reference points at something other than a class template.
    #[error("{id:?} is not a class template")]
    NotATemplate { id: TypeId },

    /// `define_class` called on a class whose typename list is already set.
    #[error("class `{name}` defined twice")]
    ClassRedefined { name: String },

    /// A handle that does not belong to this table.
    #[error("unknown type handle {id:?}")]
    UnknownType { id: TypeId },
}
