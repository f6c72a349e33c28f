//! The cast column.
//!
//! | from \ to           | result                               |
//! |---------------------|--------------------------------------|
//! | same tag            | copy                                 |
//! | numeric -> numeric  | `as` conversion                      |
//! | numeric -> char     | truncated to one byte                |
//! | char -> numeric     | the byte value                       |
//! | bool <-> numeric    | 0/1, non-zero is true                |
//! | scalar -> string    | rendered text (no quotes)            |
//! | scalar -> array     | singleton array                      |
//! | anything else       | error value                          |

use super::numeric::{number, Rank};
use super::{propagate, view};
use crate::{Value, ValueTag};

pub(super) extern "C" fn cast(this: *const Value, target: u64) -> Value {
    let source = view(this);
    if let Some(err) = propagate(&source, None) {
        return err;
    }
    let Some(target) = ValueTag::from_raw(target) else {
        return Value::error(format!("cast to unknown tag {target}"));
    };
    if source.tag == target {
        return source.copy_value();
    }

    let widened = number(&source)
        .map(|(_, n)| n)
        .or_else(|| source.as_char().map(i128::from))
        .or_else(|| source.as_bool().map(i128::from));

    match (widened, target) {
        (Some(n), ValueTag::Char) if source.tag != ValueTag::Bool => Value::char(n as u8),
        (Some(n), ValueTag::Bool) if source.tag != ValueTag::Char => Value::bool(n != 0),
        (Some(n), tag) if tag.is_numeric() => match Rank::of(tag) {
            Some(rank) => rank.make(n),
            None => cannot_cast(&source, target),
        },
        (Some(_), ValueTag::String) => Value::string(&plain_text(&source)),
        (Some(_), ValueTag::Array) => Value::array_from([source.copy_value()]),
        _ => cannot_cast(&source, target),
    }
}

/// Scalar text without the quoting `repr` adds to chars.
fn plain_text(scalar: &Value) -> String {
    match scalar.as_char() {
        Some(c) => char::from(c).to_string(),
        None => super::render(scalar),
    }
}

#[cold]
fn cannot_cast(source: &Value, target: ValueTag) -> Value {
    Value::error(format!("cannot cast {} to {target}", source.tag))
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
