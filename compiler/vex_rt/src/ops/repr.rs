//! `repr` and `type_of` columns.
//!
//! Both return freshly allocated strings the caller must drop. References
//! are transparent: they render and report as their target.

use rustc_hash::FxHashSet;
use vex_stack::ensure_sufficient_stack;

use super::view;
use crate::block::{ArrayBlock, ObjectBlock};
use crate::{Value, ValueTag};

pub(super) extern "C" fn repr(this: *const Value) -> Value {
    Value::string(&render(&view(this)))
}

pub(super) extern "C" fn type_of(this: *const Value) -> Value {
    let value = view(this);
    let name = match value.tag {
        ValueTag::Object => object_parts(&value).map_or("object", |(symbols, _)| {
            symbols.class_name()
        }),
        tag => tag.name(),
    };
    Value::string(name)
}

/// Printed form of a value: `5`, `true`, `'a'`, `"abc"`, `[void, 5]`,
/// `Point{x: 1, y: 2}`, `error: msg`, `void`, `<callable>`.
///
/// An array or object reached again while it is still being printed
/// renders as `<cycle>`. Shared blocks that do not contain themselves
/// print in full at every occurrence.
pub fn render(value: &Value) -> String {
    let mut out = String::new();
    Renderer::default().value(value, &mut out);
    out
}

/// Blocks on the current printing path.
#[derive(Default)]
struct Renderer {
    open: FxHashSet<*const u8>,
}

impl Renderer {
    fn value(&mut self, value: &Value, out: &mut String) {
        let value = view(value);
        match value.tag {
            ValueTag::Bool => out.push_str(&value.as_bool().unwrap_or_default().to_string()),
            ValueTag::Byte => out.push_str(&value.as_byte().unwrap_or_default().to_string()),
            ValueTag::Int => out.push_str(&value.as_int().unwrap_or_default().to_string()),
            ValueTag::UInt => out.push_str(&value.as_uint().unwrap_or_default().to_string()),
            ValueTag::Long => out.push_str(&value.as_long().unwrap_or_default().to_string()),
            ValueTag::ULong => out.push_str(&value.as_ulong().unwrap_or_default().to_string()),
            ValueTag::Char => {
                out.push_str(&format!("{:?}", char::from(value.as_char().unwrap_or_default())));
            }
            ValueTag::String => out.push_str(&format!("{:?}", value.text())),
            ValueTag::Error => {
                out.push_str("error: ");
                out.push_str(&value.text());
            }
            ValueTag::Callable => out.push_str("<callable>"),
            ValueTag::Array | ValueTag::Object => self.block(&value, out),
            // `view` resolved references already.
            ValueTag::Void | ValueTag::ValueRef | ValueTag::StringElemRef => out.push_str("void"),
        }
    }

    fn block(&mut self, value: &Value, out: &mut String) {
        // SAFETY: the tag says which block pointer is live.
        let key = unsafe {
            match value.tag {
                ValueTag::Array => value.payload.array.cast::<u8>().cast_const(),
                _ => value.payload.object.cast::<u8>().cast_const(),
            }
        };
        if !self.open.insert(key) {
            out.push_str("<cycle>");
            return;
        }
        ensure_sufficient_stack(|| match value.tag {
            ValueTag::Array => self.array(value, out),
            _ => self.object(value, out),
        });
        self.open.remove(&key);
    }

    fn array(&mut self, array: &Value, out: &mut String) {
        let Some(len) = array.array_len() else {
            out.push_str("[]");
            return;
        };
        // SAFETY: array payloads point at live array blocks with `len` items.
        let items = unsafe { ArrayBlock::items_ptr(array.payload.array) };
        out.push('[');
        for i in 0..len {
            if i > 0 {
                out.push_str(", ");
            }
            // SAFETY: `i < len`.
            self.value(unsafe { &*items.add(i) }, out);
        }
        out.push(']');
    }

    fn object(&mut self, object: &Value, out: &mut String) {
        let Some((symbols, slots)) = object_parts(object) else {
            out.push_str("<object>");
            return;
        };
        out.push_str(symbols.class_name());
        out.push('{');
        for i in 0..symbols.field_count().min(symbols.slot_count()) {
            if i > 0 {
                out.push_str(", ");
            }
            if let Some(name) = symbols.name(i) {
                out.push_str(&name.to_string_lossy());
            }
            out.push_str(": ");
            // SAFETY: `i` is below the slot count.
            self.value(unsafe { &*slots.add(i) }, out);
        }
        out.push('}');
    }
}

/// Symbols and slot pointer of a live object.
fn object_parts(object: &Value) -> Option<(&'static crate::Symbols, *mut Value)> {
    // SAFETY: object payloads point at live object blocks.
    let block = unsafe { object.payload.object };
    if block.is_null() {
        return None;
    }
    // SAFETY: checked non-null; symbols are static class descriptors.
    unsafe {
        let symbols = ObjectBlock::symbols(block)?;
        Some((symbols, ObjectBlock::slots_ptr(block)))
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
