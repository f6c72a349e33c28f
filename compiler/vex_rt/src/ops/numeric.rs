//! Integer arithmetic shared by byte, int, uint, long and ulong.
//!
//! Binary operands are promoted to the wider rank
//! (byte < int < uint < long < ulong). Values are carried as `i128`,
//! reduced into the result type before and after each operation, so
//! every operation wraps exactly like the fixed-width type would.

use std::cmp::Ordering;

use super::{propagate, unsupported, view};
use crate::{Value, ValueTag};

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug)]
pub(crate) enum Rank {
    Byte,
    Int,
    UInt,
    Long,
    ULong,
}

impl Rank {
    pub(crate) fn of(tag: ValueTag) -> Option<Rank> {
        match tag {
            ValueTag::Byte => Some(Rank::Byte),
            ValueTag::Int => Some(Rank::Int),
            ValueTag::UInt => Some(Rank::UInt),
            ValueTag::Long => Some(Rank::Long),
            ValueTag::ULong => Some(Rank::ULong),
            _ => None,
        }
    }

    fn bits(self) -> i128 {
        match self {
            Rank::Byte => 8,
            Rank::Int | Rank::UInt => 32,
            Rank::Long | Rank::ULong => 64,
        }
    }

    /// Reduce `v` into this rank's range, wrapping.
    fn fit(self, v: i128) -> i128 {
        match self {
            Rank::Byte => i128::from(v as u8),
            Rank::Int => i128::from(v as i32),
            Rank::UInt => i128::from(v as u32),
            Rank::Long => i128::from(v as i64),
            Rank::ULong => i128::from(v as u64),
        }
    }

    /// Value of this rank holding `v`, truncated like `as`.
    pub(crate) fn make(self, v: i128) -> Value {
        match self {
            Rank::Byte => Value::byte(v as u8),
            Rank::Int => Value::int(v as i32),
            Rank::UInt => Value::uint(v as u32),
            Rank::Long => Value::long(v as i64),
            Rank::ULong => Value::ulong(v as u64),
        }
    }
}

/// Rank and widened value of a numeric operand.
pub(crate) fn number(value: &Value) -> Option<(Rank, i128)> {
    let n = match value.tag {
        ValueTag::Byte => i128::from(value.as_byte()?),
        ValueTag::Int => i128::from(value.as_int()?),
        ValueTag::UInt => i128::from(value.as_uint()?),
        ValueTag::Long => i128::from(value.as_long()?),
        ValueTag::ULong => i128::from(value.as_ulong()?),
        _ => return None,
    };
    Some((Rank::of(value.tag)?, n))
}

type Arith = fn(Rank, i128, i128) -> Result<i128, &'static str>;

fn arith(op: &str, this: *const Value, other: *const Value, f: Arith) -> Value {
    let (a, b) = (view(this), view(other));
    if let Some(err) = propagate(&a, Some(&b)) {
        return err;
    }
    let (Some((ra, x)), Some((rb, y))) = (number(&a), number(&b)) else {
        return unsupported(op, &a, Some(&b));
    };
    let rank = ra.max(rb);
    match f(rank, rank.fit(x), rank.fit(y)) {
        Ok(v) => rank.make(rank.fit(v)),
        Err(message) => Value::error(message),
    }
}

fn compare(op: &str, this: *const Value, other: *const Value, pred: fn(Ordering) -> bool) -> Value {
    let (a, b) = (view(this), view(other));
    if let Some(err) = propagate(&a, Some(&b)) {
        return err;
    }
    let (Some((ra, x)), Some((rb, y))) = (number(&a), number(&b)) else {
        return unsupported(op, &a, Some(&b));
    };
    let rank = ra.max(rb);
    Value::bool(pred(rank.fit(x).cmp(&rank.fit(y))))
}

fn unary(op: &str, this: *const Value, f: fn(i128) -> i128) -> Value {
    let a = view(this);
    match number(&a) {
        Some((rank, x)) => rank.make(rank.fit(f(x))),
        None => unsupported(op, &a, None),
    }
}

/// Shift amount reduced modulo the operand width.
fn shift(rank: Rank, amount: i128) -> u32 {
    amount.rem_euclid(rank.bits()) as u32
}

macro_rules! binary_ops {
    ($($name:ident => $op:literal, $f:expr;)*) => {
        $(
            pub(super) extern "C" fn $name(this: *const Value, other: *const Value) -> Value {
                arith($op, this, other, $f)
            }
        )*
    };
}

macro_rules! comparisons {
    ($($name:ident => $op:literal, $pred:expr;)*) => {
        $(
            pub(super) extern "C" fn $name(this: *const Value, other: *const Value) -> Value {
                compare($op, this, other, $pred)
            }
        )*
    };
}

macro_rules! unary_ops {
    ($($name:ident => $op:literal, $f:expr;)*) => {
        $(
            pub(super) extern "C" fn $name(this: *const Value) -> Value {
                unary($op, this, $f)
            }
        )*
    };
}

binary_ops! {
    add => "add", |_, a, b| Ok(a.wrapping_add(b));
    sub => "sub", |_, a, b| Ok(a.wrapping_sub(b));
    mul => "mul", |_, a, b| Ok(a.wrapping_mul(b));
    div => "div", |_, a, b| if b == 0 { Err("division by zero") } else { Ok(a / b) };
    rem => "rem", |_, a, b| if b == 0 { Err("remainder by zero") } else { Ok(a % b) };
    bit_and => "bit_and", |_, a, b| Ok(a & b);
    bit_or => "bit_or", |_, a, b| Ok(a | b);
    bit_xor => "bit_xor", |_, a, b| Ok(a ^ b);
    shl => "shl", |r, a, b| Ok(a.wrapping_shl(shift(r, b)));
    shr => "shr", |r, a, b| Ok(a >> shift(r, b));
}

comparisons! {
    eq => "eq", Ordering::is_eq;
    ne => "ne", Ordering::is_ne;
    lt => "lt", Ordering::is_lt;
    le => "le", Ordering::is_le;
    gt => "gt", Ordering::is_gt;
    ge => "ge", Ordering::is_ge;
}

unary_ops! {
    neg => "neg", i128::wrapping_neg;
    pos => "pos", |x| x;
    bit_not => "bit_not", |x| !x;
    inc => "inc", |x| x.wrapping_add(1);
    dec => "dec", |x| x.wrapping_sub(1);
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
