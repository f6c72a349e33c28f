//! Type system for Vex.
//!
//! Types are structural trees with six variants (see [`TypeKind`]). Once a
//! type is interned into a [`TypeTable`] it is addressed by a [`TypeId`]
//! handle; the table owns every interned node until it is dropped.
//!
//! Owned children (array elements, callable signatures, mono arguments,
//! typename lists) live inline in their parent. Non-owning relations
//! (class parents, a typename's declaring class, a mono's template) are
//! stored as `TypeId`s, so they can never become second owners.
//!
//! # Operations
//!
//! - [`TypeTable::compare`] / [`TypeTable::hash`]: structural total order and
//!   its matching hash, both driven by one field decomposition
//! - [`Type::copy`]: deep copy that keeps non-owning references
//! - [`TypeTable::render`]: surface syntax, with mono substitution
//! - [`TypeTable::get_or_compute`]: memoized monomorphization status
//!
//! # Tracing
//!
//! `RUST_LOG=vex_types=debug` logs interning and class definitions;
//! `trace` additionally logs every classification.

mod error;
mod id;
mod mono;
mod primitive;
mod render;
mod structural;
mod table;
mod ty;

pub use error::InternalError;
pub use id::TypeId;
pub use mono::MonoStatus;
pub use primitive::Primitive;
pub use render::TypeDisplay;
pub use table::TypeTable;
pub use ty::{Type, TypeKind, TypeTag};

#[cfg(target_pointer_width = "64")]
mod size_asserts {
    use super::{MonoStatus, TypeId};
    vex_ir::static_assert_size!(TypeId, 4);
    vex_ir::static_assert_size!(MonoStatus, 1);
}
