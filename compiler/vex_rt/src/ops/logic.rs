//! Boolean operators.

use super::{propagate, unsupported, view};
use crate::Value;

fn binary(op: &str, this: *const Value, other: *const Value, f: fn(bool, bool) -> bool) -> Value {
    let (a, b) = (view(this), view(other));
    if let Some(err) = propagate(&a, Some(&b)) {
        return err;
    }
    match (a.as_bool(), b.as_bool()) {
        (Some(x), Some(y)) => Value::bool(f(x, y)),
        _ => unsupported(op, &a, Some(&b)),
    }
}

pub(super) extern "C" fn not(this: *const Value) -> Value {
    let a = view(this);
    match a.as_bool() {
        Some(x) => Value::bool(!x),
        None => unsupported("not", &a, None),
    }
}

macro_rules! bool_ops {
    ($($name:ident => $op:literal, $f:expr;)*) => {
        $(
            pub(super) extern "C" fn $name(this: *const Value, other: *const Value) -> Value {
                binary($op, this, other, $f)
            }
        )*
    };
}

bool_ops! {
    and => "and", |x, y| x && y;
    or => "or", |x, y| x || y;
    bit_and => "bit_and", |x, y| x & y;
    bit_or => "bit_or", |x, y| x | y;
    bit_xor => "bit_xor", |x, y| x ^ y;
    eq => "eq", |x, y| x == y;
    ne => "ne", |x, y| x != y;
}
