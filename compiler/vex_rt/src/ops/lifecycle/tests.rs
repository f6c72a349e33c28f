use pretty_assertions::assert_eq;

use super::*;
use crate::alloc_track::live_blocks;

#[test]
fn copy_of_scalar_is_bitwise() {
    let v = Value::long(-5);
    assert_eq!(copy(&v).as_long(), Some(-5));
}

#[test]
fn copy_then_drop_frees_once() {
    let base = live_blocks();
    let array = Value::array_from([Value::string("a"), Value::string("b")]);
    let copies: Vec<Value> = (0..3).map(|_| copy(&array)).collect();
    assert_eq!(array.ref_count(), Some(4));
    for mut c in copies {
        release(&mut c);
        assert_eq!(c.tag, ValueTag::Void);
    }
    assert_eq!(array.ref_count(), Some(1));
    array.drop_value();
    assert_eq!(live_blocks(), base);
}

#[test]
fn release_of_null_is_ignored() {
    release(std::ptr::null_mut());
}

#[test]
fn assign_replaces_and_releases_old_value() {
    let base = live_blocks();
    let mut slot = Value::string("old");
    let incoming = Value::string("new");
    let out = assign(&mut slot, &incoming);
    assert_eq!(out.tag, ValueTag::Void);
    assert_eq!(slot.repr(), "\"new\"");
    assert_eq!(incoming.ref_count(), Some(2));
    slot.drop_value();
    incoming.drop_value();
    assert_eq!(live_blocks(), base);
}

#[test]
fn self_assign_keeps_the_value() {
    let mut slot = Value::string("same");
    let alias = slot;
    assign(&mut slot, &alias);
    assert_eq!(slot.ref_count(), Some(1));
    assert_eq!(slot.repr(), "\"same\"");
    slot.drop_value();
}

#[test]
fn assign_stores_the_target_of_a_reference() {
    let mut source = Value::int(8);
    let reference = Value::value_ref(&mut source);
    let mut slot = Value::void();
    assign(&mut slot, &reference);
    assert_eq!(slot.tag, ValueTag::Int);
    assert_eq!(slot.as_int(), Some(8));
}

#[test]
fn assign_through_null_reference_is_an_error() {
    let mut dangling = Value::value_ref(std::ptr::null_mut());
    let out = assign_value_ref(&mut dangling, &Value::int(1));
    assert_eq!(out.repr(), "error: assign through null value_ref");
    out.drop_value();
}

#[test]
fn elem_ref_accepts_byte() {
    let s = Value::string("xy");
    // SAFETY: index 1 is in range; the string outlives the reference.
    let byte = unsafe { (*s.payload.string).data.add(1) };
    let mut r = Value::string_elem_ref(byte);
    assign_elem_ref(&mut r, &Value::byte(b'z'));
    assert_eq!(s.as_bytes(), Some(&b"xz"[..]));
    s.drop_value();
}
