//! Entry points called by generated code.
//!
//! `__vex_make_*` construct values; `__vex_unwrap_*` extract raw payloads
//! for glue code. An unwrap on the wrong tag is a compiler bug: it is
//! logged and yields zero or NULL so the program keeps running.

use std::ffi::{c_char, CStr};

use tracing::error;

use crate::block::ArrayBlock;
use crate::ops::view;
use crate::{CallableFn, Symbols, Value, ValueTag};

#[no_mangle]
pub extern "C" fn __vex_make_void() -> Value {
    Value::void()
}

#[no_mangle]
pub extern "C" fn __vex_make_bool(v: u8) -> Value {
    Value::bool(v != 0)
}

#[no_mangle]
pub extern "C" fn __vex_make_byte(v: u8) -> Value {
    Value::byte(v)
}

#[no_mangle]
pub extern "C" fn __vex_make_char(v: u8) -> Value {
    Value::char(v)
}

#[no_mangle]
pub extern "C" fn __vex_make_int(v: i32) -> Value {
    Value::int(v)
}

#[no_mangle]
pub extern "C" fn __vex_make_uint(v: u32) -> Value {
    Value::uint(v)
}

#[no_mangle]
pub extern "C" fn __vex_make_long(v: i64) -> Value {
    Value::long(v)
}

#[no_mangle]
pub extern "C" fn __vex_make_ulong(v: u64) -> Value {
    Value::ulong(v)
}

/// String value copied from a NUL-terminated buffer.
#[no_mangle]
pub extern "C" fn __vex_make_string(s: *const c_char) -> Value {
    if s.is_null() {
        error!("__vex_make_string: null pointer");
        return Value::error("string from null pointer");
    }
    // SAFETY: generated code passes NUL-terminated strings.
    Value::string_bytes(unsafe { CStr::from_ptr(s) }.to_bytes())
}

#[no_mangle]
pub extern "C" fn __vex_make_error(message: *const c_char) -> Value {
    if message.is_null() {
        return Value::error("");
    }
    // SAFETY: generated code passes NUL-terminated strings.
    Value::error(unsafe { CStr::from_ptr(message) }.to_string_lossy())
}

#[no_mangle]
pub extern "C" fn __vex_make_callable(f: Option<CallableFn>) -> Value {
    match f {
        Some(f) => Value::callable(f),
        None => {
            error!("__vex_make_callable: null function");
            Value::error("callable from null function")
        }
    }
}

/// Array of `len` void slots.
#[no_mangle]
pub extern "C" fn __vex_make_array(len: u64) -> Value {
    match usize::try_from(len) {
        Ok(len) => Value::array(len),
        Err(_) => Value::error(format!("array length {len} too large")),
    }
}

/// Nested arrays with extents `dims[0] x dims[1] x ...`, leaves void.
#[no_mangle]
pub extern "C" fn __vex_make_array_dims(dims: *const u64, count: usize) -> Value {
    if dims.is_null() || count == 0 {
        return Value::error("array needs at least one dimension");
    }
    // SAFETY: generated code passes `count` extents.
    let dims = unsafe { std::slice::from_raw_parts(dims, count) };
    match dims.iter().map(|&d| usize::try_from(d)).collect::<Result<Vec<_>, _>>() {
        Ok(dims) => nested_array(&dims),
        Err(_) => Value::error("array dimension too large"),
    }
}

/// Build each level in place so a refused allocation at any depth
/// releases what was built and returns the error.
fn nested_array(dims: &[usize]) -> Value {
    let [len, rest @ ..] = dims else {
        return Value::void();
    };
    let array = Value::array(*len);
    if rest.is_empty() || array.is_error() {
        return array;
    }
    for i in 0..*len {
        let inner = nested_array(rest);
        if inner.is_error() {
            array.drop_value();
            return inner;
        }
        // SAFETY: `array` was just allocated with `len` void slots.
        match unsafe { ArrayBlock::slot(array.payload.array, i) } {
            // SAFETY: the slot holds void, so nothing is overwritten.
            Some(slot) => unsafe { slot.write(inner) },
            None => inner.drop_value(),
        }
    }
    array
}

/// Object with every member slot void.
#[no_mangle]
pub extern "C" fn __vex_make_object(symbols: *const Symbols) -> Value {
    // SAFETY: symbols live in the program's data section.
    match unsafe { symbols.as_ref() } {
        Some(symbols) => Value::object(symbols),
        None => {
            error!("__vex_make_object: null symbols");
            Value::error("object without symbols")
        }
    }
}

/// Object taking ownership of `count` initial member values.
#[no_mangle]
pub extern "C" fn __vex_make_object_init(
    symbols: *const Symbols,
    values: *const Value,
    count: usize,
) -> Value {
    let values = if values.is_null() || count == 0 {
        Vec::new()
    } else {
        // SAFETY: generated code passes `count` values it gives up.
        unsafe { std::slice::from_raw_parts(values, count) }.to_vec()
    };
    // SAFETY: symbols live in the program's data section.
    match unsafe { symbols.as_ref() } {
        Some(symbols) => Value::object_with(symbols, values),
        None => {
            error!("__vex_make_object_init: null symbols");
            for value in values {
                value.drop_value();
            }
            Value::error("object without symbols")
        }
    }
}

#[no_mangle]
pub extern "C" fn __vex_make_value_ref(target: *mut Value) -> Value {
    Value::value_ref(target)
}

#[cold]
fn mismatch(expected: ValueTag, found: ValueTag) {
    error!(%expected, %found, "unwrap of wrong value type");
}

macro_rules! unwrap_scalar {
    ($($name:ident -> $ty:ty => $tag:ident . $accessor:ident),* $(,)?) => {
        $(
            #[no_mangle]
            pub extern "C" fn $name(value: *const Value) -> $ty {
                let value = view(value);
                value.$accessor().unwrap_or_else(|| {
                    mismatch(ValueTag::$tag, value.tag);
                    <$ty>::default()
                })
            }
        )*
    };
}

unwrap_scalar! {
    __vex_unwrap_byte -> u8 => Byte.as_byte,
    __vex_unwrap_char -> u8 => Char.as_char,
    __vex_unwrap_int -> i32 => Int.as_int,
    __vex_unwrap_uint -> u32 => UInt.as_uint,
    __vex_unwrap_long -> i64 => Long.as_long,
    __vex_unwrap_ulong -> u64 => ULong.as_ulong,
}

#[no_mangle]
pub extern "C" fn __vex_unwrap_bool(value: *const Value) -> u8 {
    let value = view(value);
    match value.as_bool() {
        Some(b) => u8::from(b),
        None => {
            mismatch(ValueTag::Bool, value.tag);
            0
        }
    }
}

/// Borrowed NUL-terminated contents of a string. Valid while the string is.
#[no_mangle]
pub extern "C" fn __vex_unwrap_string(value: *const Value) -> *const c_char {
    let value = view(value);
    if value.tag != ValueTag::String {
        mismatch(ValueTag::String, value.tag);
        return std::ptr::null();
    }
    // SAFETY: string payloads point at live string blocks.
    match unsafe { value.payload.string.as_ref() } {
        Some(block) => block.data.cast_const().cast(),
        None => std::ptr::null(),
    }
}

#[no_mangle]
pub extern "C" fn __vex_unwrap_array_len(value: *const Value) -> u64 {
    let value = view(value);
    match value.array_len() {
        Some(len) => len as u64,
        None => {
            mismatch(ValueTag::Array, value.tag);
            0
        }
    }
}

#[no_mangle]
pub extern "C" fn __vex_drop(value: *mut Value) {
    // SAFETY: generated code passes valid or null pointers.
    if let Some(v) = unsafe { value.as_ref() } {
        (v.ops().drop)(value);
    }
}

#[no_mangle]
pub extern "C" fn __vex_copy(value: *const Value) -> Value {
    // SAFETY: generated code passes valid or null pointers.
    match unsafe { value.as_ref() } {
        Some(v) => (v.ops().copy)(value),
        None => Value::void(),
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
