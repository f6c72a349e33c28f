//! Char and string operators.

use std::cmp::Ordering;

use super::{propagate, unsupported, view};
use crate::{Value, ValueTag};

fn char_compare(op: &str, this: *const Value, other: *const Value, pred: fn(Ordering) -> bool) -> Value {
    let (a, b) = (view(this), view(other));
    if let Some(err) = propagate(&a, Some(&b)) {
        return err;
    }
    match (a.as_char(), b.as_char()) {
        (Some(x), Some(y)) => Value::bool(pred(x.cmp(&y))),
        _ => unsupported(op, &a, Some(&b)),
    }
}

fn string_compare(op: &str, this: *const Value, other: *const Value, pred: fn(Ordering) -> bool) -> Value {
    let (a, b) = (view(this), view(other));
    if let Some(err) = propagate(&a, Some(&b)) {
        return err;
    }
    if a.tag != ValueTag::String || b.tag != ValueTag::String {
        return unsupported(op, &a, Some(&b));
    }
    match (a.as_bytes(), b.as_bytes()) {
        (Some(x), Some(y)) => Value::bool(pred(x.cmp(y))),
        _ => unsupported(op, &a, Some(&b)),
    }
}

/// Concatenation with a string or a single char.
pub(super) extern "C" fn string_add(this: *const Value, other: *const Value) -> Value {
    let (a, b) = (view(this), view(other));
    if let Some(err) = propagate(&a, Some(&b)) {
        return err;
    }
    let Some(head) = a.as_bytes().filter(|_| a.tag == ValueTag::String) else {
        return unsupported("add", &a, Some(&b));
    };
    let mut joined = head.to_vec();
    match b.tag {
        ValueTag::String => joined.extend_from_slice(b.as_bytes().unwrap_or_default()),
        ValueTag::Char => joined.push(b.as_char().unwrap_or_default()),
        _ => return unsupported("add", &a, Some(&b)),
    }
    Value::string_bytes(&joined)
}

macro_rules! comparisons {
    ($compare:ident: $($name:ident => $op:literal, $pred:expr;)*) => {
        $(
            pub(super) extern "C" fn $name(this: *const Value, other: *const Value) -> Value {
                $compare($op, this, other, $pred)
            }
        )*
    };
}

comparisons! { char_compare:
    char_eq => "eq", Ordering::is_eq;
    char_ne => "ne", Ordering::is_ne;
    char_lt => "lt", Ordering::is_lt;
    char_le => "le", Ordering::is_le;
    char_gt => "gt", Ordering::is_gt;
    char_ge => "ge", Ordering::is_ge;
}

comparisons! { string_compare:
    string_eq => "eq", Ordering::is_eq;
    string_ne => "ne", Ordering::is_ne;
    string_lt => "lt", Ordering::is_lt;
    string_le => "le", Ordering::is_le;
    string_gt => "gt", Ordering::is_gt;
    string_ge => "ge", Ordering::is_ge;
}
