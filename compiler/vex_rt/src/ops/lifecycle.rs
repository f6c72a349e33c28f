//! Copy, drop and assign columns.

use tracing::error;

use super::{unsupported, view};
use crate::alloc_track::BlockKind;
use crate::block::{self, ArrayBlock, ObjectBlock, StringBlock};
use crate::{Value, ValueTag};

/// Bitwise copy, retaining the heap block of counted values.
pub(super) extern "C" fn copy(this: *const Value) -> Value {
    // SAFETY: generated code passes valid or null pointers.
    let Some(value) = (unsafe { this.as_ref() }).copied() else {
        error!("copy of null value pointer");
        return Value::void();
    };
    // SAFETY: the tag says which payload field is live; each block starts
    // with its count.
    unsafe {
        let count: *mut i64 = match value.tag {
            ValueTag::Array => value.payload.array.cast(),
            ValueTag::Object => value.payload.object.cast(),
            ValueTag::String | ValueTag::Error => value.payload.string.cast(),
            _ => return value,
        };
        if count.is_null() {
            error!(tag = %value.tag, "copy of counted value without a block");
            return Value::void();
        }
        block::retain(count);
    }
    value
}

/// Release the heap block of a counted value, freeing it and dropping
/// its elements when the count reaches zero. The slot is left void.
pub(super) extern "C" fn release(this: *mut Value) {
    // SAFETY: generated code passes valid or null pointers.
    let Some(value) = (unsafe { this.as_mut() }) else {
        return;
    };
    let old = std::mem::replace(value, Value::void());
    // SAFETY: the tag says which payload field is live.
    unsafe {
        match old.tag {
            ValueTag::Array => {
                let block = old.payload.array;
                if !block.is_null() && block::release(block.cast(), BlockKind::Array) {
                    ArrayBlock::destroy(block);
                }
            }
            ValueTag::Object => {
                let block = old.payload.object;
                if !block.is_null() && block::release(block.cast(), BlockKind::Object) {
                    ObjectBlock::destroy(block);
                }
            }
            ValueTag::String | ValueTag::Error => {
                let block = old.payload.string;
                if !block.is_null() && block::release(block.cast(), BlockKind::String) {
                    StringBlock::destroy(block);
                }
            }
            _ => {}
        }
    }
}

/// Store a copy of `source` into the slot `this`.
///
/// The source is copied before the old value is dropped, so assigning a
/// value to itself (or to a container that holds it) is safe.
pub(super) extern "C" fn assign(this: *mut Value, source: *const Value) -> Value {
    if this.is_null() {
        error!("assign to null value pointer");
        return Value::error("assign to null slot");
    }
    let incoming = view(source).copy_value();
    // SAFETY: checked non-null; the slot holds a value this call owns.
    unsafe {
        ((*this).ops().drop)(this);
        *this = incoming;
    }
    Value::void()
}

/// Assign through a `value_ref` into the aliased slot.
pub(super) extern "C" fn assign_value_ref(this: *mut Value, source: *const Value) -> Value {
    // SAFETY: generated code passes valid or null pointers.
    let Some(reference) = (unsafe { this.as_ref() }) else {
        return Value::error("assign to null slot");
    };
    // SAFETY: this table is only installed on value_ref values.
    let target = unsafe { reference.payload.value_ref };
    // SAFETY: a value_ref aliases a live slot, or is null.
    match unsafe { target.as_ref() } {
        Some(slot) => (slot.ops().assign)(target, source),
        None => Value::error("assign through null value_ref"),
    }
}

/// Assign a char or byte through a `string_elem_ref`.
pub(super) extern "C" fn assign_elem_ref(this: *mut Value, source: *const Value) -> Value {
    // SAFETY: generated code passes valid or null pointers.
    let Some(reference) = (unsafe { this.as_ref() }) else {
        return Value::error("assign to null slot");
    };
    // SAFETY: this table is only installed on string_elem_ref values.
    let byte = unsafe { reference.payload.elem_ref };
    if byte.is_null() {
        return Value::error("assign through null string_elem_ref");
    }
    let incoming = view(source);
    let Some(b) = incoming.as_char().or_else(|| incoming.as_byte()) else {
        return unsupported("assign", &view(this), Some(&incoming));
    };
    // SAFETY: a string_elem_ref aliases a live byte.
    unsafe { *byte = b };
    Value::void()
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
