//! Vex IR - shared identifiers and source locations.
//!
//! This crate holds the small vocabulary every other compiler crate speaks:
//! - [`Name`]: interned identifier handle (class names, typenames, fields)
//! - [`StringInterner`]: owner of the interned strings
//! - [`Span`]: byte range attached to diagnostics by the front end
//!
//! Everything here is `Copy` or cheaply cloneable so that the type table and
//! diagnostics can store handles instead of owned strings.

/// Compile-time assertion that a type has a specific size.
///
/// Used to pin the layout of handles that are stored in bulk.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

mod interner;
mod name;
mod span;

pub use interner::{InternError, StringInterner};
pub use name::Name;
pub use span::{Span, SpanError};
