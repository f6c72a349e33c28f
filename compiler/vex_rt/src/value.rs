//! The runtime value record.

use std::ffi::CStr;
use std::fmt;

use crate::block::{ArrayBlock, ObjectBlock, StringBlock, Symbols};
use crate::ops::{op_table, OpTable};

/// Dynamic type of a [`Value`]. Stored as a full word in the record.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(u64)]
pub enum ValueTag {
    Array = 0,
    Bool = 1,
    Byte = 2,
    Callable = 3,
    Char = 4,
    Error = 5,
    Int = 6,
    Long = 7,
    Object = 8,
    String = 9,
    StringElemRef = 10,
    UInt = 11,
    ULong = 12,
    ValueRef = 13,
    Void = 14,
}

impl ValueTag {
    pub const ALL: [ValueTag; 15] = [
        ValueTag::Array,
        ValueTag::Bool,
        ValueTag::Byte,
        ValueTag::Callable,
        ValueTag::Char,
        ValueTag::Error,
        ValueTag::Int,
        ValueTag::Long,
        ValueTag::Object,
        ValueTag::String,
        ValueTag::StringElemRef,
        ValueTag::UInt,
        ValueTag::ULong,
        ValueTag::ValueRef,
        ValueTag::Void,
    ];

    /// Name used in op table symbols, `type_of` and error messages.
    pub const fn name(self) -> &'static str {
        match self {
            ValueTag::Array => "array",
            ValueTag::Bool => "bool",
            ValueTag::Byte => "byte",
            ValueTag::Callable => "callable",
            ValueTag::Char => "char",
            ValueTag::Error => "error",
            ValueTag::Int => "int",
            ValueTag::Long => "long",
            ValueTag::Object => "object",
            ValueTag::String => "string",
            ValueTag::StringElemRef => "string_elem_ref",
            ValueTag::UInt => "uint",
            ValueTag::ULong => "ulong",
            ValueTag::ValueRef => "value_ref",
            ValueTag::Void => "void",
        }
    }

    pub fn from_raw(raw: u64) -> Option<Self> {
        Self::ALL.get(usize::try_from(raw).ok()?).copied()
    }

    /// byte, int, uint, long, ulong.
    pub const fn is_numeric(self) -> bool {
        matches!(
            self,
            ValueTag::Byte | ValueTag::Int | ValueTag::UInt | ValueTag::Long | ValueTag::ULong
        )
    }

    /// Payload is a reference-counted heap block.
    pub const fn is_counted(self) -> bool {
        matches!(
            self,
            ValueTag::Array | ValueTag::Object | ValueTag::String | ValueTag::Error
        )
    }

    /// Payload aliases storage owned by some container.
    pub const fn is_reference(self) -> bool {
        matches!(self, ValueTag::ValueRef | ValueTag::StringElemRef)
    }
}

impl fmt::Display for ValueTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Function pointer stored by callable values.
pub type CallableFn = extern "C" fn(args: *const Value, count: usize) -> Value;

/// Eight-byte payload. Which field is live is decided by the tag.
#[repr(C)]
#[derive(Copy, Clone)]
pub union Payload {
    pub raw: u64,
    pub boolean: u8,
    pub byte: u8,
    pub chr: u8,
    pub int: i32,
    pub uint: u32,
    pub long: i64,
    pub ulong: u64,
    pub callable: CallableFn,
    pub array: *mut ArrayBlock,
    pub object: *mut ObjectBlock,
    pub string: *mut StringBlock,
    pub value_ref: *mut Value,
    pub elem_ref: *mut u8,
}

impl Payload {
    pub const ZERO: Payload = Payload { raw: 0 };
}

/// A tagged runtime value.
///
/// Bitwise copies are views; use [`Value::copy_value`] for an owning copy
/// and [`Value::drop_value`] to release one.
#[repr(C)]
#[derive(Copy, Clone)]
pub struct Value {
    pub tag: ValueTag,
    pub ops: *const OpTable,
    pub payload: Payload,
}

macro_rules! scalar_constructors {
    ($($name:ident($ty:ty) => $tag:ident . $field:ident),* $(,)?) => {
        $(
            pub fn $name(v: $ty) -> Value {
                let mut payload = Payload::ZERO;
                payload.$field = v;
                Value::with_payload(ValueTag::$tag, payload)
            }
        )*
    };
}

macro_rules! scalar_accessors {
    ($($name:ident -> $ty:ty => $tag:ident . $field:ident),* $(,)?) => {
        $(
            pub fn $name(&self) -> Option<$ty> {
                // SAFETY: the tag says which payload field is live.
                (self.tag == ValueTag::$tag).then(|| unsafe { self.payload.$field })
            }
        )*
    };
}

impl Value {
    pub(crate) fn with_payload(tag: ValueTag, payload: Payload) -> Value {
        Value {
            tag,
            ops: op_table(tag),
            payload,
        }
    }

    pub fn void() -> Value {
        Value::with_payload(ValueTag::Void, Payload::ZERO)
    }

    pub fn bool(v: bool) -> Value {
        let mut payload = Payload::ZERO;
        payload.boolean = u8::from(v);
        Value::with_payload(ValueTag::Bool, payload)
    }

    scalar_constructors! {
        byte(u8) => Byte.byte,
        char(u8) => Char.chr,
        int(i32) => Int.int,
        uint(u32) => UInt.uint,
        long(i64) => Long.long,
        ulong(u64) => ULong.ulong,
        callable(CallableFn) => Callable.callable,
    }

    pub fn string(s: &str) -> Value {
        Value::string_bytes(s.as_bytes())
    }

    pub fn string_bytes(bytes: &[u8]) -> Value {
        let mut payload = Payload::ZERO;
        payload.string = StringBlock::alloc(bytes);
        Value::with_payload(ValueTag::String, payload)
    }

    /// An error value carrying `message`.
    #[cold]
    pub fn error(message: impl AsRef<str>) -> Value {
        let mut payload = Payload::ZERO;
        payload.string = StringBlock::alloc(message.as_ref().as_bytes());
        Value::with_payload(ValueTag::Error, payload)
    }

    /// Array of `len` void slots.
    ///
    /// A length with no valid layout, or one the allocator refuses, yields
    /// an error value.
    pub fn array(len: usize) -> Value {
        match ArrayBlock::alloc_void(len) {
            Some(block) => {
                let mut payload = Payload::ZERO;
                payload.array = block;
                Value::with_payload(ValueTag::Array, payload)
            }
            None => Value::error(format!("cannot allocate an array of {len} values")),
        }
    }

    /// Array owning `items`.
    pub fn array_from(items: impl IntoIterator<Item = Value>) -> Value {
        let items: Vec<Value> = items.into_iter().collect();
        match ArrayBlock::alloc(&items) {
            Some(block) => {
                let mut payload = Payload::ZERO;
                payload.array = block;
                Value::with_payload(ValueTag::Array, payload)
            }
            None => {
                for mut item in items {
                    item.release();
                }
                Value::error("array allocation failed")
            }
        }
    }

    /// Object of class `symbols` with every slot void.
    pub fn object(symbols: &'static Symbols) -> Value {
        let slots = std::iter::repeat_with(Value::void).take(symbols.slot_count());
        Value::object_with(symbols, slots.collect())
    }

    /// Object of class `symbols` owning `values`, one per symbol.
    pub fn object_with(symbols: &'static Symbols, values: Vec<Value>) -> Value {
        if !symbols.is_well_formed() || values.len() != symbols.slot_count() {
            let message = format!(
                "class `{}` has {} members, got {} values",
                symbols.class_name(),
                symbols.slot_count(),
                values.len()
            );
            for mut value in values {
                value.release();
            }
            return Value::error(message);
        }
        match ObjectBlock::alloc(symbols, &values) {
            Some(block) => {
                let mut payload = Payload::ZERO;
                payload.object = block;
                Value::with_payload(ValueTag::Object, payload)
            }
            None => {
                for mut value in values {
                    value.release();
                }
                Value::error("object allocation failed")
            }
        }
    }

    /// Alias of the slot at `target`. Must not outlive the slot's container.
    pub fn value_ref(target: *mut Value) -> Value {
        let mut payload = Payload::ZERO;
        payload.value_ref = target;
        Value::with_payload(ValueTag::ValueRef, payload)
    }

    /// Alias of one byte of a string block.
    pub fn string_elem_ref(byte: *mut u8) -> Value {
        let mut payload = Payload::ZERO;
        payload.elem_ref = byte;
        Value::with_payload(ValueTag::StringElemRef, payload)
    }

    /// This value's operation table.
    ///
    /// Falls back to the table for the tag when `ops` is null, which happens
    /// for zero-initialised records written by generated code.
    pub fn ops(&self) -> &'static OpTable {
        // SAFETY: non-null `ops` always points at one of the static tables.
        unsafe { self.ops.as_ref() }.unwrap_or_else(|| op_table(self.tag))
    }

    pub fn is_error(&self) -> bool {
        self.tag == ValueTag::Error
    }

    pub fn as_bool(&self) -> Option<bool> {
        // SAFETY: the tag says which payload field is live.
        (self.tag == ValueTag::Bool).then(|| unsafe { self.payload.boolean } != 0)
    }

    scalar_accessors! {
        as_byte -> u8 => Byte.byte,
        as_char -> u8 => Char.chr,
        as_int -> i32 => Int.int,
        as_uint -> u32 => UInt.uint,
        as_long -> i64 => Long.long,
        as_ulong -> u64 => ULong.ulong,
    }

    /// Bytes of a string, or the message of an error.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        if !matches!(self.tag, ValueTag::String | ValueTag::Error) {
            return None;
        }
        // SAFETY: string and error payloads point at live string blocks.
        unsafe { StringBlock::bytes(self.payload.string) }
    }

    /// Element count of an array.
    pub fn array_len(&self) -> Option<usize> {
        if self.tag != ValueTag::Array {
            return None;
        }
        // SAFETY: array payloads point at live array blocks.
        unsafe { self.payload.array.as_ref() }.map(|block| block.len as usize)
    }

    /// Reference count of the heap block behind a counted value.
    pub fn ref_count(&self) -> Option<i64> {
        // SAFETY: the tag says which payload field is live; every block
        // starts with its count.
        unsafe {
            match self.tag {
                ValueTag::Array => self.payload.array.as_ref().map(|b| b.ref_count),
                ValueTag::Object => self.payload.object.as_ref().map(|b| b.ref_count),
                ValueTag::String | ValueTag::Error => {
                    self.payload.string.as_ref().map(|b| b.ref_count)
                }
                _ => None,
            }
        }
    }

    /// Owning copy through the `copy` column.
    #[must_use]
    pub fn copy_value(&self) -> Value {
        (self.ops().copy)(self)
    }

    /// Release this value through the `drop` column.
    pub fn drop_value(mut self) {
        self.release();
    }

    /// Release in place, leaving void behind.
    pub(crate) fn release(&mut self) {
        (self.ops().drop)(self);
    }

    /// `repr` as a Rust string. The intermediate runtime string is dropped.
    pub fn repr(&self) -> String {
        let repr = (self.ops().repr)(self);
        let text = repr.text();
        repr.drop_value();
        text
    }

    /// `type_of` as a Rust string.
    pub fn type_name(&self) -> String {
        let name = (self.ops().type_of)(self);
        let text = name.text();
        name.drop_value();
        text
    }

    /// Lossy text of a string or error payload, empty otherwise.
    pub(crate) fn text(&self) -> String {
        self.as_bytes()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
            .unwrap_or_default()
    }

    /// Look up a member by name. See the `member` column.
    pub fn member(&self, name: &CStr) -> Value {
        (self.ops().member)(self, name.as_ptr())
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Value({}: {})", self.tag, self.repr())
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
