//! Memory layout shared with the code generator and the debugger.
//!
//! The debugger reads values out of a stopped process as raw bytes, so it
//! needs the offsets here rather than Rust field access. All offsets are
//! derived with `offset_of!` and hold for the 64-bit little-endian target.

use std::mem::{offset_of, size_of};

use crate::{ArrayBlock, ObjectBlock, OpTable, StringBlock, Symbols, Value, ValueTag};

pub const VALUE_SIZE: usize = size_of::<Value>();
pub const VALUE_TAG_OFFSET: usize = offset_of!(Value, tag);
pub const VALUE_OPS_OFFSET: usize = offset_of!(Value, ops);
pub const VALUE_PAYLOAD_OFFSET: usize = offset_of!(Value, payload);

pub const BLOCK_REF_COUNT_OFFSET: usize = 0;
pub const ARRAY_LEN_OFFSET: usize = offset_of!(ArrayBlock, len);
pub const ARRAY_ITEMS_OFFSET: usize = offset_of!(ArrayBlock, items);
pub const OBJECT_SYMBOLS_OFFSET: usize = offset_of!(ObjectBlock, symbols);
pub const OBJECT_SLOTS_OFFSET: usize = offset_of!(ObjectBlock, slots);
pub const STRING_LEN_OFFSET: usize = offset_of!(StringBlock, len);
pub const STRING_DATA_OFFSET: usize = offset_of!(StringBlock, data);

pub const SYMBOLS_CLASS_NAME_OFFSET: usize = offset_of!(Symbols, class_name);
pub const SYMBOLS_FIELD_COUNT_OFFSET: usize = offset_of!(Symbols, field_count);
pub const SYMBOLS_LEN_OFFSET: usize = offset_of!(Symbols, len);
pub const SYMBOLS_NAMES_OFFSET: usize = offset_of!(Symbols, names);

const _: () = {
    assert!(offset_of!(ArrayBlock, ref_count) == BLOCK_REF_COUNT_OFFSET);
    assert!(offset_of!(ObjectBlock, ref_count) == BLOCK_REF_COUNT_OFFSET);
    assert!(offset_of!(StringBlock, ref_count) == BLOCK_REF_COUNT_OFFSET);
};

macro_rules! op_slots {
    ($($variant:ident => $field:ident),* $(,)?) => {
        /// A column of [`OpTable`], in table order.
        #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
        pub enum OpSlot {
            $($variant,)*
        }

        impl OpSlot {
            pub const ALL: &'static [OpSlot] = &[$(OpSlot::$variant,)*];

            /// Byte offset of the function pointer within a table.
            pub const fn offset(self) -> usize {
                match self {
                    $(OpSlot::$variant => offset_of!(OpTable, $field),)*
                }
            }

            pub const fn field_name(self) -> &'static str {
                match self {
                    $(OpSlot::$variant => stringify!($field),)*
                }
            }
        }
    };
}

op_slots! {
    Neg => neg,
    Pos => pos,
    Not => not,
    BitNot => bit_not,
    Inc => inc,
    Dec => dec,
    Add => add,
    Sub => sub,
    Mul => mul,
    Div => div,
    Rem => rem,
    BitAnd => bit_and,
    BitOr => bit_or,
    BitXor => bit_xor,
    Shl => shl,
    Shr => shr,
    And => and,
    Or => or,
    Eq => eq,
    Ne => ne,
    Lt => lt,
    Le => le,
    Gt => gt,
    Ge => ge,
    Index => index,
    IndexRef => index_ref,
    Member => member,
    MemberRef => member_ref,
    Deref => deref,
    Call => call,
    Assign => assign,
    Drop => drop,
    Copy => copy,
    Cast => cast,
    Repr => repr,
    TypeOf => type_of,
}

impl OpSlot {
    /// Slot named `name`, as spelled in the table.
    pub fn from_name(name: &str) -> Option<OpSlot> {
        Self::ALL.iter().copied().find(|slot| slot.field_name() == name)
    }
}

/// Linker symbol of the op table for `tag`.
pub fn op_table_symbol(tag: ValueTag) -> String {
    format!("__vex_op_tbl_{}", tag.name())
}

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum LayoutError {
    #[error("value image is {found} bytes, need {VALUE_SIZE}")]
    Truncated { found: usize },
    #[error("unknown value tag {0}")]
    UnknownTag(u64),
}

/// A value image copied out of another process.
///
/// Scalars decode completely; for heap and reference tags `payload` is an
/// address in the target that the debugger has to read separately.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct RawValue {
    pub tag: u64,
    pub ops: u64,
    pub payload: u64,
}

fn word(bytes: &[u8], offset: usize) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[offset..offset + 8]);
    u64::from_le_bytes(buf)
}

impl RawValue {
    pub fn decode(bytes: &[u8]) -> Result<RawValue, LayoutError> {
        if bytes.len() < VALUE_SIZE {
            return Err(LayoutError::Truncated { found: bytes.len() });
        }
        let raw = RawValue {
            tag: word(bytes, VALUE_TAG_OFFSET),
            ops: word(bytes, VALUE_OPS_OFFSET),
            payload: word(bytes, VALUE_PAYLOAD_OFFSET),
        };
        raw.tag()?;
        Ok(raw)
    }

    pub fn tag(&self) -> Result<ValueTag, LayoutError> {
        ValueTag::from_raw(self.tag).ok_or(LayoutError::UnknownTag(self.tag))
    }

    /// Payload is the address of a reference-counted block.
    pub fn is_heap(&self) -> bool {
        self.tag().is_ok_and(ValueTag::is_counted)
    }

    /// Text of a scalar value, as `repr` would print it. `None` for tags
    /// whose payload points into the target.
    pub fn describe(&self) -> Option<String> {
        let p = self.payload;
        let text = match self.tag().ok()? {
            ValueTag::Void => "void".to_owned(),
            ValueTag::Bool => ((p & 0xff) != 0).to_string(),
            ValueTag::Byte => (p as u8).to_string(),
            ValueTag::Char => format!("{:?}", char::from(p as u8)),
            ValueTag::Int => (p as u32 as i32).to_string(),
            ValueTag::UInt => (p as u32).to_string(),
            ValueTag::Long => (p as i64).to_string(),
            ValueTag::ULong => p.to_string(),
            _ => return None,
        };
        Some(text)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
