use pretty_assertions::assert_eq;

use super::*;

fn cast_to(value: Value, target: ValueTag) -> Value {
    let out = cast(&value, target as u64);
    value.drop_value();
    out
}

#[test]
fn numeric_conversions_truncate_like_as() {
    assert_eq!(cast_to(Value::int(300), ValueTag::Byte).as_byte(), Some(44));
    assert_eq!(cast_to(Value::int(-1), ValueTag::ULong).as_ulong(), Some(u64::MAX));
    assert_eq!(cast_to(Value::ulong(u64::MAX), ValueTag::Int).as_int(), Some(-1));
    assert_eq!(cast_to(Value::byte(7), ValueTag::Long).as_long(), Some(7));
}

#[test]
fn char_and_numeric() {
    assert_eq!(cast_to(Value::char(b'A'), ValueTag::Int).as_int(), Some(65));
    assert_eq!(cast_to(Value::int(0x161), ValueTag::Char).as_char(), Some(b'a'));
}

#[test]
fn bool_and_numeric() {
    assert_eq!(cast_to(Value::long(-3), ValueTag::Bool).as_bool(), Some(true));
    assert_eq!(cast_to(Value::byte(0), ValueTag::Bool).as_bool(), Some(false));
    assert_eq!(cast_to(Value::bool(true), ValueTag::UInt).as_uint(), Some(1));
}

#[test]
fn scalars_to_string() {
    let cases = [
        (Value::int(-12), "-12"),
        (Value::char(b'q'), "q"),
        (Value::bool(false), "false"),
        (Value::ulong(9), "9"),
    ];
    for (value, expected) in cases {
        let out = cast_to(value, ValueTag::String);
        assert_eq!(out.as_bytes(), Some(expected.as_bytes()));
        out.drop_value();
    }
}

#[test]
fn scalar_to_singleton_array() {
    let out = cast_to(Value::int(4), ValueTag::Array);
    assert_eq!(out.repr(), "[4]");
    out.drop_value();
}

#[test]
fn same_tag_is_a_copy() {
    let s = Value::string("me");
    let out = cast(&s, ValueTag::String as u64);
    assert_eq!(s.ref_count(), Some(2));
    out.drop_value();
    s.drop_value();
}

#[test]
fn invalid_casts() {
    let cases = [
        (Value::bool(true), ValueTag::Char, "error: cannot cast bool to char"),
        (Value::char(b'x'), ValueTag::Bool, "error: cannot cast char to bool"),
        (Value::string("5"), ValueTag::Int, "error: cannot cast string to int"),
        (Value::void(), ValueTag::Int, "error: cannot cast void to int"),
    ];
    for (value, target, expected) in cases {
        let out = cast_to(value, target);
        assert_eq!(out.repr(), expected);
        out.drop_value();
    }
}

#[test]
fn unknown_target_tag() {
    let out = cast(&Value::int(1), 99);
    assert_eq!(out.repr(), "error: cast to unknown tag 99");
    out.drop_value();
}

#[test]
fn errors_cast_to_themselves() {
    let out = cast_to(Value::error("bad"), ValueTag::Int);
    assert_eq!(out.repr(), "error: bad");
    out.drop_value();
}
