//! Indexing, member access, calls and reference forwarding.

use std::ffi::{c_char, CStr};

use super::numeric::number;
use super::{propagate, unsupported, view};
use crate::block::{ArrayBlock, ObjectBlock, StringBlock};
use crate::{Value, ValueTag};

/// Storage an index list resolves to.
enum Place {
    Slot(*mut Value),
    Byte(*mut u8),
}

fn slice<'a>(items: *const Value, count: usize) -> &'a [Value] {
    if items.is_null() || count == 0 {
        return &[];
    }
    // SAFETY: generated code passes `count` contiguous values.
    unsafe { std::slice::from_raw_parts(items, count) }
}

/// Integer index from a byte/int/uint/long/ulong operand.
fn coerce_index(index: &Value) -> Result<usize, Value> {
    if let Some(err) = propagate(index, None) {
        return Err(err);
    }
    let Some((_, n)) = number(index) else {
        return Err(Value::error(format!("index must be an integer, got {}", index.tag)));
    };
    usize::try_from(n).map_err(|_| Value::error(format!("negative index {n}")))
}

/// Walk `indices` through nested arrays, ending at a slot or a string byte.
fn locate(container: &Value, indices: &[Value]) -> Result<Place, Value> {
    let Some((first, rest)) = indices.split_first() else {
        return Err(Value::error("index list is empty"));
    };
    let i = coerce_index(&view(first))?;
    let place = match container.tag {
        ValueTag::Array => {
            // SAFETY: array payloads point at live array blocks.
            let block = unsafe { container.payload.array };
            if block.is_null() {
                return Err(Value::error("array without storage"));
            }
            // SAFETY: checked non-null above.
            let (slot, len) = unsafe { (ArrayBlock::slot(block, i), (*block).len) };
            Place::Slot(slot.ok_or_else(|| out_of_range(i, len))?)
        }
        ValueTag::String => {
            // SAFETY: string payloads point at live string blocks.
            let block = unsafe { container.payload.string };
            if block.is_null() {
                return Err(Value::error("string without storage"));
            }
            // SAFETY: checked non-null above.
            let (byte, len) = unsafe { (StringBlock::byte_ptr(block, i), (*block).len) };
            Place::Byte(byte.ok_or_else(|| out_of_range(i, len))?)
        }
        _ => return Err(unsupported("index", container, None)),
    };
    match (place, rest.is_empty()) {
        (place, true) => Ok(place),
        (Place::Slot(slot), false) => locate(&view(slot), rest),
        (Place::Byte(_), false) => Err(Value::error("too many indices for string")),
    }
}

#[cold]
fn out_of_range(index: usize, len: u64) -> Value {
    Value::error(format!("index {index} out of range for length {len}"))
}

/// Owned copy of the element (or sub-array) at `indices`.
fn index_value(this: *const Value, indices: *const Value, count: usize) -> Value {
    let container = view(this);
    if let Some(err) = propagate(&container, None) {
        return err;
    }
    match locate(&container, slice(indices, count)) {
        Ok(Place::Slot(slot)) => view(slot).copy_value(),
        // SAFETY: `locate` checked the byte is in range.
        Ok(Place::Byte(byte)) => Value::char(unsafe { *byte }),
        Err(err) => err,
    }
}

/// Alias of the element (or sub-array slot) at `indices`.
fn index_alias(this: *const Value, indices: *const Value, count: usize) -> Value {
    let container = view(this);
    if let Some(err) = propagate(&container, None) {
        return err;
    }
    match locate(&container, slice(indices, count)) {
        Ok(Place::Slot(slot)) => Value::value_ref(slot),
        Ok(Place::Byte(byte)) => Value::string_elem_ref(byte),
        Err(err) => err,
    }
}

pub(super) extern "C" fn array_index(this: *const Value, indices: *const Value, count: usize) -> Value {
    index_value(this, indices, count)
}

pub(super) extern "C" fn array_index_ref(this: *const Value, indices: *const Value, count: usize) -> Value {
    index_alias(this, indices, count)
}

pub(super) extern "C" fn string_index(this: *const Value, indices: *const Value, count: usize) -> Value {
    index_value(this, indices, count)
}

pub(super) extern "C" fn string_index_ref(this: *const Value, indices: *const Value, count: usize) -> Value {
    index_alias(this, indices, count)
}

/// Slot of member `name` in an object.
fn member_slot(object: &Value, name: *const c_char) -> Result<*mut Value, Value> {
    if name.is_null() {
        return Err(Value::error("member name is null"));
    }
    // SAFETY: generated code passes NUL-terminated names.
    let name = unsafe { CStr::from_ptr(name) };
    // SAFETY: object payloads point at live object blocks.
    let block = unsafe { object.payload.object };
    if object.tag != ValueTag::Object || block.is_null() {
        return Err(unsupported("member", object, None));
    }
    let Some(symbols) = (unsafe { ObjectBlock::symbols(block) }) else {
        return Err(Value::error("object without symbols"));
    };
    match symbols.find(name) {
        // SAFETY: `find` only returns indices below the slot count.
        Some(i) => Ok(unsafe { ObjectBlock::slots_ptr(block).add(i) }),
        None => Err(Value::error(format!(
            "no member `{}` in class `{}`",
            name.to_string_lossy(),
            symbols.class_name()
        ))),
    }
}

pub(super) extern "C" fn object_member(this: *const Value, name: *const c_char) -> Value {
    let object = view(this);
    match member_slot(&object, name) {
        Ok(slot) => view(slot).copy_value(),
        Err(err) => err,
    }
}

pub(super) extern "C" fn object_member_ref(this: *const Value, name: *const c_char) -> Value {
    let object = view(this);
    match member_slot(&object, name) {
        Ok(slot) => Value::value_ref(slot),
        Err(err) => err,
    }
}

pub(super) extern "C" fn call(this: *const Value, args: *const Value, count: usize) -> Value {
    let callee = view(this);
    match callee.tag {
        // SAFETY: callable payloads hold a function pointer.
        ValueTag::Callable => (unsafe { callee.payload.callable })(args, count),
        _ => unsupported("call", &callee, None),
    }
}

/// Owned copy of a reference's target.
pub(super) extern "C" fn deref(this: *const Value) -> Value {
    view(this).copy_value()
}

macro_rules! forward_unary {
    ($($name:ident => $column:ident),* $(,)?) => {
        $(
            pub(super) extern "C" fn $name(this: *const Value) -> Value {
                let target = view(this);
                (target.ops().$column)(&target)
            }
        )*
    };
}

macro_rules! forward_binary {
    ($($name:ident => $column:ident),* $(,)?) => {
        $(
            pub(super) extern "C" fn $name(this: *const Value, other: *const Value) -> Value {
                let target = view(this);
                (target.ops().$column)(&target, other)
            }
        )*
    };
}

forward_unary! {
    fwd_neg => neg,
    fwd_pos => pos,
    fwd_not => not,
    fwd_bit_not => bit_not,
    fwd_inc => inc,
    fwd_dec => dec,
}

forward_binary! {
    fwd_add => add,
    fwd_sub => sub,
    fwd_mul => mul,
    fwd_div => div,
    fwd_rem => rem,
    fwd_bit_and => bit_and,
    fwd_bit_or => bit_or,
    fwd_bit_xor => bit_xor,
    fwd_shl => shl,
    fwd_shr => shr,
    fwd_and => and,
    fwd_or => or,
    fwd_eq => eq,
    fwd_ne => ne,
    fwd_lt => lt,
    fwd_le => le,
    fwd_gt => gt,
    fwd_ge => ge,
}

pub(super) extern "C" fn fwd_index(this: *const Value, indices: *const Value, count: usize) -> Value {
    let target = view(this);
    (target.ops().index)(&target, indices, count)
}

pub(super) extern "C" fn fwd_index_ref(this: *const Value, indices: *const Value, count: usize) -> Value {
    let target = view(this);
    (target.ops().index_ref)(&target, indices, count)
}

pub(super) extern "C" fn fwd_member(this: *const Value, name: *const c_char) -> Value {
    let target = view(this);
    (target.ops().member)(&target, name)
}

pub(super) extern "C" fn fwd_member_ref(this: *const Value, name: *const c_char) -> Value {
    let target = view(this);
    (target.ops().member_ref)(&target, name)
}

pub(super) extern "C" fn fwd_call(this: *const Value, args: *const Value, count: usize) -> Value {
    let target = view(this);
    (target.ops().call)(&target, args, count)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
