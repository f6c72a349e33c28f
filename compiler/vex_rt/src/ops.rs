//! Operation tables.
//!
//! One `#[repr(C)]` [`OpTable`] per [`ValueTag`], exported as
//! `__vex_op_tbl_<tag>` so generated code and the debugger can address it
//! by symbol. Columns a type does not support point at shared defaults
//! that return an error value; ops applied to an error value return a
//! copy of that error.
//!
//! Operands are read through [`view`], which makes `value_ref` and
//! `string_elem_ref` transparent to every read.

mod access;
mod cast;
mod lifecycle;
mod logic;
mod numeric;
mod repr;
mod text;

use std::ffi::{c_char, CStr};

use tracing::error;

use crate::{Value, ValueTag};

pub use repr::render;

pub type UnaryFn = extern "C" fn(this: *const Value) -> Value;
pub type BinaryFn = extern "C" fn(this: *const Value, other: *const Value) -> Value;
pub type IndexFn = extern "C" fn(this: *const Value, indices: *const Value, count: usize) -> Value;
pub type MemberFn = extern "C" fn(this: *const Value, name: *const c_char) -> Value;
pub type CallFn = extern "C" fn(this: *const Value, args: *const Value, count: usize) -> Value;
pub type AssignFn = extern "C" fn(this: *mut Value, source: *const Value) -> Value;
pub type DropFn = extern "C" fn(this: *mut Value);
pub type CastFn = extern "C" fn(this: *const Value, target: u64) -> Value;

/// Dispatch table for one runtime type. Column order is part of the ABI.
#[repr(C)]
pub struct OpTable {
    /// NUL-terminated tag name.
    pub name: *const c_char,

    pub neg: UnaryFn,
    pub pos: UnaryFn,
    pub not: UnaryFn,
    pub bit_not: UnaryFn,
    pub inc: UnaryFn,
    pub dec: UnaryFn,

    pub add: BinaryFn,
    pub sub: BinaryFn,
    pub mul: BinaryFn,
    pub div: BinaryFn,
    pub rem: BinaryFn,
    pub bit_and: BinaryFn,
    pub bit_or: BinaryFn,
    pub bit_xor: BinaryFn,
    pub shl: BinaryFn,
    pub shr: BinaryFn,
    pub and: BinaryFn,
    pub or: BinaryFn,
    pub eq: BinaryFn,
    pub ne: BinaryFn,
    pub lt: BinaryFn,
    pub le: BinaryFn,
    pub gt: BinaryFn,
    pub ge: BinaryFn,

    pub index: IndexFn,
    pub index_ref: IndexFn,
    pub member: MemberFn,
    pub member_ref: MemberFn,
    pub deref: UnaryFn,
    pub call: CallFn,

    pub assign: AssignFn,
    pub drop: DropFn,
    pub copy: UnaryFn,
    pub cast: CastFn,

    pub repr: UnaryFn,
    pub type_of: UnaryFn,
}

// SAFETY: tables are immutable statics; `name` points at static data.
unsafe impl Sync for OpTable {}

impl OpTable {
    /// Tag name stored in the table.
    pub fn name(&self) -> &str {
        if self.name.is_null() {
            return "";
        }
        // SAFETY: a non-null name is a static NUL-terminated string.
        unsafe { CStr::from_ptr(self.name) }.to_str().unwrap_or("")
    }
}

/// Non-owning view of `value` with references resolved.
///
/// A `value_ref` chain is followed to its target; a `string_elem_ref`
/// becomes a char. Never drop the result; copy it to own it.
pub(crate) fn view(value: *const Value) -> Value {
    const MAX_DEPTH: usize = 64;

    // SAFETY: generated code passes valid or null pointers.
    let Some(mut current) = (unsafe { value.as_ref() }).copied() else {
        error!("null value pointer");
        return Value::void();
    };
    for _ in 0..MAX_DEPTH {
        match current.tag {
            ValueTag::ValueRef => {
                // SAFETY: a value_ref aliases a live slot.
                match unsafe { current.payload.value_ref.as_ref() } {
                    Some(target) => current = *target,
                    None => {
                        error!("value_ref to null");
                        return Value::void();
                    }
                }
            }
            ValueTag::StringElemRef => {
                // SAFETY: a string_elem_ref aliases a live byte.
                let byte = unsafe { current.payload.elem_ref.as_ref() };
                return byte.map_or_else(Value::void, |b| Value::char(*b));
            }
            _ => return current,
        }
    }
    error!("value_ref chain longer than {MAX_DEPTH}");
    Value::void()
}

/// Copy of whichever operand is an error, if any.
pub(crate) fn propagate(this: &Value, other: Option<&Value>) -> Option<Value> {
    if this.is_error() {
        return Some(this.copy_value());
    }
    other.filter(|o| o.is_error()).map(Value::copy_value)
}

/// Error value for an operation the operand types do not support.
#[cold]
pub(crate) fn unsupported(op: &str, this: &Value, other: Option<&Value>) -> Value {
    if let Some(err) = propagate(this, other) {
        return err;
    }
    match other {
        Some(other) => Value::error(format!(
            "unsupported operation `{op}` for {} and {}",
            this.tag, other.tag
        )),
        None => Value::error(format!("unsupported operation `{op}` for {}", this.tag)),
    }
}

macro_rules! default_unary {
    ($($fn_name:ident => $op:literal),* $(,)?) => {
        $(
            extern "C" fn $fn_name(this: *const Value) -> Value {
                unsupported($op, &view(this), None)
            }
        )*
    };
}

macro_rules! default_binary {
    ($($fn_name:ident => $op:literal),* $(,)?) => {
        $(
            extern "C" fn $fn_name(this: *const Value, other: *const Value) -> Value {
                unsupported($op, &view(this), Some(&view(other)))
            }
        )*
    };
}

default_unary! {
    default_neg => "neg",
    default_pos => "pos",
    default_not => "not",
    default_bit_not => "bit_not",
    default_inc => "inc",
    default_dec => "dec",
    default_deref => "deref",
}

default_binary! {
    default_add => "add",
    default_sub => "sub",
    default_mul => "mul",
    default_div => "div",
    default_rem => "rem",
    default_bit_and => "bit_and",
    default_bit_or => "bit_or",
    default_bit_xor => "bit_xor",
    default_shl => "shl",
    default_shr => "shr",
    default_and => "and",
    default_or => "or",
    default_eq => "eq",
    default_ne => "ne",
    default_lt => "lt",
    default_le => "le",
    default_gt => "gt",
    default_ge => "ge",
}

extern "C" fn default_index(this: *const Value, _indices: *const Value, _count: usize) -> Value {
    unsupported("index", &view(this), None)
}

extern "C" fn default_index_ref(this: *const Value, _indices: *const Value, _count: usize) -> Value {
    unsupported("index_ref", &view(this), None)
}

extern "C" fn default_member(this: *const Value, _name: *const c_char) -> Value {
    unsupported("member", &view(this), None)
}

extern "C" fn default_member_ref(this: *const Value, _name: *const c_char) -> Value {
    unsupported("member_ref", &view(this), None)
}

extern "C" fn default_call(this: *const Value, _args: *const Value, _count: usize) -> Value {
    unsupported("call", &view(this), None)
}

/// Every column at its default; tables override what they support.
const DEFAULT: OpTable = OpTable {
    name: c"".as_ptr(),
    neg: default_neg,
    pos: default_pos,
    not: default_not,
    bit_not: default_bit_not,
    inc: default_inc,
    dec: default_dec,
    add: default_add,
    sub: default_sub,
    mul: default_mul,
    div: default_div,
    rem: default_rem,
    bit_and: default_bit_and,
    bit_or: default_bit_or,
    bit_xor: default_bit_xor,
    shl: default_shl,
    shr: default_shr,
    and: default_and,
    or: default_or,
    eq: default_eq,
    ne: default_ne,
    lt: default_lt,
    le: default_le,
    gt: default_gt,
    ge: default_ge,
    index: default_index,
    index_ref: default_index_ref,
    member: default_member,
    member_ref: default_member_ref,
    deref: default_deref,
    call: default_call,
    assign: lifecycle::assign,
    drop: lifecycle::release,
    copy: lifecycle::copy,
    cast: cast::cast,
    repr: repr::repr,
    type_of: repr::type_of,
};

const NUMERIC: OpTable = OpTable {
    neg: numeric::neg,
    pos: numeric::pos,
    bit_not: numeric::bit_not,
    inc: numeric::inc,
    dec: numeric::dec,
    add: numeric::add,
    sub: numeric::sub,
    mul: numeric::mul,
    div: numeric::div,
    rem: numeric::rem,
    bit_and: numeric::bit_and,
    bit_or: numeric::bit_or,
    bit_xor: numeric::bit_xor,
    shl: numeric::shl,
    shr: numeric::shr,
    eq: numeric::eq,
    ne: numeric::ne,
    lt: numeric::lt,
    le: numeric::le,
    gt: numeric::gt,
    ge: numeric::ge,
    ..DEFAULT
};

/// Reads forward to the target; writes go through it.
const REFERENCE: OpTable = OpTable {
    neg: access::fwd_neg,
    pos: access::fwd_pos,
    not: access::fwd_not,
    bit_not: access::fwd_bit_not,
    inc: access::fwd_inc,
    dec: access::fwd_dec,
    add: access::fwd_add,
    sub: access::fwd_sub,
    mul: access::fwd_mul,
    div: access::fwd_div,
    rem: access::fwd_rem,
    bit_and: access::fwd_bit_and,
    bit_or: access::fwd_bit_or,
    bit_xor: access::fwd_bit_xor,
    shl: access::fwd_shl,
    shr: access::fwd_shr,
    and: access::fwd_and,
    or: access::fwd_or,
    eq: access::fwd_eq,
    ne: access::fwd_ne,
    lt: access::fwd_lt,
    le: access::fwd_le,
    gt: access::fwd_gt,
    ge: access::fwd_ge,
    index: access::fwd_index,
    index_ref: access::fwd_index_ref,
    member: access::fwd_member,
    member_ref: access::fwd_member_ref,
    call: access::fwd_call,
    deref: access::deref,
    ..DEFAULT
};

#[export_name = "__vex_op_tbl_array"]
pub static OP_TBL_ARRAY: OpTable = OpTable {
    name: c"array".as_ptr(),
    index: access::array_index,
    index_ref: access::array_index_ref,
    ..DEFAULT
};

#[export_name = "__vex_op_tbl_bool"]
pub static OP_TBL_BOOL: OpTable = OpTable {
    name: c"bool".as_ptr(),
    not: logic::not,
    bit_and: logic::bit_and,
    bit_or: logic::bit_or,
    bit_xor: logic::bit_xor,
    and: logic::and,
    or: logic::or,
    eq: logic::eq,
    ne: logic::ne,
    ..DEFAULT
};

#[export_name = "__vex_op_tbl_byte"]
pub static OP_TBL_BYTE: OpTable = OpTable {
    name: c"byte".as_ptr(),
    ..NUMERIC
};

#[export_name = "__vex_op_tbl_callable"]
pub static OP_TBL_CALLABLE: OpTable = OpTable {
    name: c"callable".as_ptr(),
    call: access::call,
    ..DEFAULT
};

#[export_name = "__vex_op_tbl_char"]
pub static OP_TBL_CHAR: OpTable = OpTable {
    name: c"char".as_ptr(),
    eq: text::char_eq,
    ne: text::char_ne,
    lt: text::char_lt,
    le: text::char_le,
    gt: text::char_gt,
    ge: text::char_ge,
    ..DEFAULT
};

#[export_name = "__vex_op_tbl_error"]
pub static OP_TBL_ERROR: OpTable = OpTable {
    name: c"error".as_ptr(),
    ..DEFAULT
};

#[export_name = "__vex_op_tbl_int"]
pub static OP_TBL_INT: OpTable = OpTable {
    name: c"int".as_ptr(),
    ..NUMERIC
};

#[export_name = "__vex_op_tbl_long"]
pub static OP_TBL_LONG: OpTable = OpTable {
    name: c"long".as_ptr(),
    ..NUMERIC
};

#[export_name = "__vex_op_tbl_object"]
pub static OP_TBL_OBJECT: OpTable = OpTable {
    name: c"object".as_ptr(),
    member: access::object_member,
    member_ref: access::object_member_ref,
    ..DEFAULT
};

#[export_name = "__vex_op_tbl_string"]
pub static OP_TBL_STRING: OpTable = OpTable {
    name: c"string".as_ptr(),
    add: text::string_add,
    eq: text::string_eq,
    ne: text::string_ne,
    lt: text::string_lt,
    le: text::string_le,
    gt: text::string_gt,
    ge: text::string_ge,
    index: access::string_index,
    index_ref: access::string_index_ref,
    ..DEFAULT
};

#[export_name = "__vex_op_tbl_string_elem_ref"]
pub static OP_TBL_STRING_ELEM_REF: OpTable = OpTable {
    name: c"string_elem_ref".as_ptr(),
    assign: lifecycle::assign_elem_ref,
    ..REFERENCE
};

#[export_name = "__vex_op_tbl_uint"]
pub static OP_TBL_UINT: OpTable = OpTable {
    name: c"uint".as_ptr(),
    ..NUMERIC
};

#[export_name = "__vex_op_tbl_ulong"]
pub static OP_TBL_ULONG: OpTable = OpTable {
    name: c"ulong".as_ptr(),
    ..NUMERIC
};

#[export_name = "__vex_op_tbl_value_ref"]
pub static OP_TBL_VALUE_REF: OpTable = OpTable {
    name: c"value_ref".as_ptr(),
    assign: lifecycle::assign_value_ref,
    ..REFERENCE
};

#[export_name = "__vex_op_tbl_void"]
pub static OP_TBL_VOID: OpTable = OpTable {
    name: c"void".as_ptr(),
    ..DEFAULT
};

/// The static table for `tag`.
pub fn op_table(tag: ValueTag) -> &'static OpTable {
    match tag {
        ValueTag::Array => &OP_TBL_ARRAY,
        ValueTag::Bool => &OP_TBL_BOOL,
        ValueTag::Byte => &OP_TBL_BYTE,
        ValueTag::Callable => &OP_TBL_CALLABLE,
        ValueTag::Char => &OP_TBL_CHAR,
        ValueTag::Error => &OP_TBL_ERROR,
        ValueTag::Int => &OP_TBL_INT,
        ValueTag::Long => &OP_TBL_LONG,
        ValueTag::Object => &OP_TBL_OBJECT,
        ValueTag::String => &OP_TBL_STRING,
        ValueTag::StringElemRef => &OP_TBL_STRING_ELEM_REF,
        ValueTag::UInt => &OP_TBL_UINT,
        ValueTag::ULong => &OP_TBL_ULONG,
        ValueTag::ValueRef => &OP_TBL_VALUE_REF,
        ValueTag::Void => &OP_TBL_VOID,
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
