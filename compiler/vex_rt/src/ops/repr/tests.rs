use pretty_assertions::assert_eq;

use super::*;
use crate::Symbols;

extern "C" fn noop(_args: *const Value, _count: usize) -> Value {
    Value::void()
}

#[test]
fn scalar_forms() {
    assert_eq!(render(&Value::void()), "void");
    assert_eq!(render(&Value::bool(true)), "true");
    assert_eq!(render(&Value::byte(255)), "255");
    assert_eq!(render(&Value::int(-4)), "-4");
    assert_eq!(render(&Value::ulong(u64::MAX)), "18446744073709551615");
    assert_eq!(render(&Value::char(b'z')), "'z'");
    assert_eq!(render(&Value::callable(noop)), "<callable>");
}

#[test]
fn heap_forms() {
    let s = Value::string("say \"hi\"");
    assert_eq!(render(&s), r#""say \"hi\"""#);
    let e = Value::error("nope");
    assert_eq!(render(&e), "error: nope");
    let nested = Value::array_from([Value::array(0), Value::array_from([s.copy_value()])]);
    assert_eq!(render(&nested), r#"[[], ["say \"hi\""]]"#);
    nested.drop_value();
    e.drop_value();
    s.drop_value();
}

#[test]
fn objects_render_fields_only() {
    let symbols = Symbols::leak("Pt", &["x", "y"], &["norm"]).unwrap();
    let p = Value::object_with(symbols, vec![Value::int(1), Value::int(2), Value::void()]);
    assert_eq!(render(&p), "Pt{x: 1, y: 2}");
    p.drop_value();
}

#[test]
fn repr_column_allocates_a_string() {
    let v = Value::int(3);
    let out = repr(&v);
    assert_eq!(out.tag, ValueTag::String);
    assert_eq!(out.as_bytes(), Some(&b"3"[..]));
    out.drop_value();
}

#[test]
fn type_of_reports_tag_names() {
    let cases = [
        (Value::void(), "void"),
        (Value::char(b'c'), "char"),
        (Value::uint(0), "uint"),
    ];
    for (value, expected) in cases {
        let out = type_of(&value);
        assert_eq!(out.as_bytes(), Some(expected.as_bytes()));
        out.drop_value();
    }
}

#[test]
fn references_report_their_target() {
    let mut slot = Value::bool(false);
    let r = Value::value_ref(&mut slot);
    assert_eq!(render(&r), "false");
    let out = type_of(&r);
    assert_eq!(out.as_bytes(), Some(&b"bool"[..]));
    out.drop_value();
}

#[test]
fn self_containing_blocks_render_a_cycle_marker() {
    let base = crate::alloc_track::live_blocks();
    let symbols = Symbols::leak("Node", &["next"], &[]).unwrap();
    let node = Value::object(symbols);
    let mut next = (node.ops().member_ref)(&node, c"next".as_ptr());
    (next.ops().assign)(&mut next, &node).drop_value();
    assert_eq!(render(&node), "Node{next: <cycle>}");

    let list = Value::array(2);
    let idx = [Value::ulong(1)];
    let mut tail = (list.ops().index_ref)(&list, idx.as_ptr(), 1);
    (tail.ops().assign)(&mut tail, &list).drop_value();
    assert_eq!(render(&list), "[void, <cycle>]");

    // Break both cycles so the blocks can be freed.
    (next.ops().assign)(&mut next, &Value::void()).drop_value();
    (tail.ops().assign)(&mut tail, &Value::void()).drop_value();
    node.drop_value();
    list.drop_value();
    assert_eq!(crate::alloc_track::live_blocks(), base);
}

#[test]
fn shared_blocks_render_at_every_occurrence() {
    let inner = Value::array_from([Value::int(1)]);
    let outer = Value::array_from([inner.copy_value(), inner.copy_value()]);
    assert_eq!(render(&outer), "[[1], [1]]");
    outer.drop_value();
    inner.drop_value();
}

#[test]
fn deeply_nested_arrays_render() {
    const DEPTH: usize = 200_000;
    let mut nested = Value::void();
    for _ in 0..DEPTH {
        nested = Value::array_from([nested]);
    }
    let text = render(&nested);
    assert_eq!(text.len(), 2 * DEPTH + "void".len());
    assert!(text.starts_with("[[[") && text.ends_with("void]]]"));
    nested.drop_value();
}
