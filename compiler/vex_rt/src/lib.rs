//! Vex runtime library (`libvex_rt`).
//!
//! Every value a generated Vex program manipulates is a [`Value`]: a
//! 24-byte record holding a [`ValueTag`], a pointer to the tag's static
//! [`OpTable`] and an 8-byte payload. Operations never test the tag at the
//! call site; they jump through `value.ops`.
//!
//! # Build Modes
//!
//! - **rlib**: for Rust consumers (the debugger, tests)
//! - **staticlib**: linked into generated programs
//!
//! # Function Categories
//!
//! - **Construction**: `__vex_make_*` (see [`builtins`])
//! - **Extraction**: `__vex_unwrap_*`
//! - **Lifecycle**: `__vex_copy`, `__vex_drop`, plus the `copy`/`drop`/`assign` columns
//! - **Dispatch tables**: `__vex_op_tbl_<tag>` statics (see [`ops`])
//! - **Debugger ABI**: offsets and raw decoding in [`layout`]
//!
//! # Ownership
//!
//! Arrays, objects, strings and errors point at reference-counted heap
//! blocks. A `Value` is `Copy` at the bit level; ownership is manual:
//! `copy` retains, `drop` releases, and a block is freed (dropping its
//! elements) when its count reaches zero. Cycles leak.
//!
//! `value_ref` and `string_elem_ref` alias a slot of a container without
//! owning it. They must not outlive that container; nothing checks this.
//!
//! # Safety
//!
//! Entry points are `extern "C"` and take raw pointers from generated code,
//! which guarantees validity. They are not marked `unsafe` because they are
//! FFI entry points, not Rust API functions. Null pointers are tolerated and
//! logged.

#![allow(
    unsafe_code,
    reason = "C-ABI runtime functions require unsafe for raw pointer operations"
)]
#![allow(
    clippy::not_unsafe_ptr_arg_deref,
    reason = "FFI entry points receive pointers from generated code which guarantees validity"
)]
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap,
    clippy::cast_ptr_alignment,
    reason = "payload casts follow the ABI widths of each tag"
)]

pub mod alloc_track;
pub mod block;
pub mod builtins;
pub mod layout;
pub mod ops;
mod value;

pub use block::{ArrayBlock, ObjectBlock, StringBlock, Symbols, SymbolsError};
pub use ops::{op_table, OpTable};
pub use value::{CallableFn, Payload, Value, ValueTag};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber for runtime diagnostics.
///
/// Does nothing unless `RUST_LOG` is set. Safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}

#[cfg(target_pointer_width = "64")]
const _: () = assert!(std::mem::size_of::<Value>() == 24);

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
