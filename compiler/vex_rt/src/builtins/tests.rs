use std::ffi::CStr;

use pretty_assertions::assert_eq;

use super::*;
use crate::alloc_track::live_blocks;

#[test]
fn scalar_constructors_round_trip() {
    assert_eq!(__vex_unwrap_bool(&__vex_make_bool(2)), 1);
    assert_eq!(__vex_unwrap_byte(&__vex_make_byte(200)), 200);
    assert_eq!(__vex_unwrap_char(&__vex_make_char(b'k')), b'k');
    assert_eq!(__vex_unwrap_int(&__vex_make_int(-9)), -9);
    assert_eq!(__vex_unwrap_uint(&__vex_make_uint(9)), 9);
    assert_eq!(__vex_unwrap_long(&__vex_make_long(i64::MIN)), i64::MIN);
    assert_eq!(__vex_unwrap_ulong(&__vex_make_ulong(u64::MAX)), u64::MAX);
    assert_eq!(__vex_make_void().tag, ValueTag::Void);
}

#[test]
fn unwrap_of_wrong_tag_yields_zero() {
    assert_eq!(__vex_unwrap_int(&__vex_make_long(5)), 0);
    assert_eq!(__vex_unwrap_bool(&__vex_make_int(1)), 0);
    assert!(__vex_unwrap_string(&__vex_make_int(1)).is_null());
    assert_eq!(__vex_unwrap_array_len(&__vex_make_void()), 0);
}

#[test]
fn unwrap_reads_through_references() {
    let mut slot = __vex_make_int(11);
    let r = __vex_make_value_ref(&mut slot);
    assert_eq!(__vex_unwrap_int(&r), 11);
}

#[test]
fn strings_cross_the_boundary() {
    let mut s = __vex_make_string(c"hello".as_ptr());
    let raw = __vex_unwrap_string(&s);
    assert_eq!(unsafe { CStr::from_ptr(raw) }, c"hello");
    __vex_drop(&mut s);
    assert_eq!(s.tag, ValueTag::Void);
}

#[test]
fn null_inputs_produce_errors() {
    let mut s = __vex_make_string(std::ptr::null());
    assert!(s.is_error());
    __vex_drop(&mut s);

    let mut f = __vex_make_callable(None);
    assert_eq!(f.repr(), "error: callable from null function");
    __vex_drop(&mut f);

    let mut o = __vex_make_object(std::ptr::null());
    assert!(o.is_error());
    __vex_drop(&mut o);

    __vex_drop(std::ptr::null_mut());
    assert_eq!(__vex_copy(std::ptr::null()).tag, ValueTag::Void);
}

#[test]
fn error_values_carry_messages() {
    let mut e = __vex_make_error(c"it broke".as_ptr());
    assert_eq!(e.repr(), "error: it broke");
    __vex_drop(&mut e);
}

#[test]
fn dropping_an_array_frees_everything() {
    let base = live_blocks();
    let mut array = __vex_make_array(3);
    let strings: Vec<Value> = (0..3).map(|_| Value::string("s")).collect();
    for (i, s) in strings.into_iter().enumerate() {
        let idx = [__vex_make_ulong(i as u64)];
        let mut r = (array.ops().index_ref)(&array, idx.as_ptr(), 1);
        (r.ops().assign)(&mut r, &s);
        s.drop_value();
    }
    assert_eq!(__vex_unwrap_array_len(&array), 3);
    __vex_drop(&mut array);
    assert_eq!(live_blocks(), base);
}

#[test]
fn array_dims_nest() {
    let dims = [2_u64, 3];
    let mut grid = __vex_make_array_dims(dims.as_ptr(), dims.len());
    assert_eq!(grid.repr(), "[[void, void, void], [void, void, void]]");
    __vex_drop(&mut grid);

    let mut err = __vex_make_array_dims(dims.as_ptr(), 0);
    assert_eq!(err.repr(), "error: array needs at least one dimension");
    __vex_drop(&mut err);
}

#[test]
fn object_init_takes_ownership() {
    let base = live_blocks();
    let symbols = Symbols::leak("Named", &["name"], &[]).unwrap();
    let values = [Value::string("n")];
    let mut object = __vex_make_object_init(symbols, values.as_ptr(), values.len());
    assert_eq!(object.repr(), "Named{name: \"n\"}");
    __vex_drop(&mut object);
    assert_eq!(live_blocks(), base);
}

#[test]
fn copy_retains() {
    let mut s = __vex_make_string(c"c".as_ptr());
    let mut t = __vex_copy(&s);
    assert_eq!(s.ref_count(), Some(2));
    __vex_drop(&mut t);
    __vex_drop(&mut s);
}

#[test]
fn oversized_arrays_are_errors() {
    let base = live_blocks();
    let mut huge = __vex_make_array(1 << 60);
    assert!(huge.is_error());
    assert_eq!(huge.repr(), format!("error: cannot allocate an array of {} values", 1_u64 << 60));
    __vex_drop(&mut huge);

    let dims = [2_u64, 1 << 60];
    let mut grid = __vex_make_array_dims(dims.as_ptr(), dims.len());
    assert!(grid.is_error());
    __vex_drop(&mut grid);
    assert_eq!(live_blocks(), base);
}
