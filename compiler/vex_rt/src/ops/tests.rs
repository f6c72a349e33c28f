use pretty_assertions::assert_eq;

use super::*;
use crate::alloc_track::live_blocks;

fn binary(f: BinaryFn, a: Value, b: Value) -> Value {
    let out = f(&a, &b);
    a.drop_value();
    b.drop_value();
    out
}

#[test]
fn unsupported_columns_return_errors() {
    let out = binary(op_table(ValueTag::Bool).add, Value::bool(true), Value::int(1));
    assert_eq!(out.repr(), "error: unsupported operation `add` for bool and int");
    out.drop_value();

    let callable = Value::void();
    let out = (callable.ops().call)(&callable, std::ptr::null(), 0);
    assert_eq!(out.repr(), "error: unsupported operation `call` for void");
    out.drop_value();
}

#[test]
fn errors_propagate_through_every_operator() {
    let base = live_blocks();
    let err = Value::error("first");
    let out = (err.ops().add)(&err, &Value::int(1));
    assert_eq!(out.repr(), "error: first");
    out.drop_value();

    let out = (op_table(ValueTag::Int).mul)(&Value::int(2), &err);
    assert_eq!(out.repr(), "error: first");
    out.drop_value();

    let out = (err.ops().neg)(&err);
    assert_eq!(out.repr(), "error: first");
    out.drop_value();

    err.drop_value();
    assert_eq!(live_blocks(), base);
}

#[test]
fn view_resolves_reference_chains() {
    let mut slot = Value::int(9);
    let mut first = Value::value_ref(&mut slot);
    let second = Value::value_ref(&mut first);
    assert_eq!(view(&second).as_int(), Some(9));
}

#[test]
fn view_of_null_is_void() {
    assert_eq!(view(std::ptr::null()).tag, ValueTag::Void);
    assert_eq!(view(&Value::value_ref(std::ptr::null_mut())).tag, ValueTag::Void);
}

#[test]
fn view_of_cyclic_reference_is_void() {
    let mut cell = Value::void();
    cell = Value::value_ref(&mut cell);
    assert_eq!(view(&cell).tag, ValueTag::Void);
}

#[test]
fn references_forward_operators() {
    let mut slot = Value::int(40);
    let r = Value::value_ref(&mut slot);
    let out = (r.ops().add)(&r, &Value::int(2));
    assert_eq!(out.as_int(), Some(42));
    assert_eq!(r.repr(), "40");
    assert_eq!(r.type_name(), "int");
}

#[test]
fn string_elem_ref_reads_as_char() {
    let s = Value::string("hi");
    let byte = unsafe { (*s.payload.string).data.add(1) };
    let r = Value::string_elem_ref(byte);
    let out = (r.ops().eq)(&r, &Value::char(b'i'));
    assert_eq!(out.as_bool(), Some(true));
    s.drop_value();
}

#[test]
fn table_names_follow_tags() {
    assert_eq!(OP_TBL_STRING_ELEM_REF.name(), "string_elem_ref");
    assert_eq!(OP_TBL_VALUE_REF.name(), "value_ref");
}

#[test]
fn text_operators() {
    let out = binary(OP_TBL_STRING.add, Value::string("ab"), Value::string("cd"));
    assert_eq!(out.repr(), "\"abcd\"");
    out.drop_value();

    let out = binary(OP_TBL_STRING.add, Value::string("ab"), Value::char(b'!'));
    assert_eq!(out.repr(), "\"ab!\"");
    out.drop_value();

    let out = binary(OP_TBL_STRING.lt, Value::string("abc"), Value::string("abd"));
    assert_eq!(out.as_bool(), Some(true));

    let out = binary(OP_TBL_CHAR.ge, Value::char(b'a'), Value::char(b'b'));
    assert_eq!(out.as_bool(), Some(false));

    let out = binary(OP_TBL_STRING.eq, Value::string("x"), Value::int(1));
    assert!(out.is_error());
    out.drop_value();
}

#[test]
fn logic_operators() {
    let out = binary(OP_TBL_BOOL.and, Value::bool(true), Value::bool(false));
    assert_eq!(out.as_bool(), Some(false));
    let out = binary(OP_TBL_BOOL.bit_xor, Value::bool(true), Value::bool(false));
    assert_eq!(out.as_bool(), Some(true));
    let t = Value::bool(true);
    assert_eq!((t.ops().not)(&t).as_bool(), Some(false));
    let out = binary(OP_TBL_BOOL.or, Value::bool(true), Value::int(0));
    assert!(out.is_error());
    out.drop_value();
}
