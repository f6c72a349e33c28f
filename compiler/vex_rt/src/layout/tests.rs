use pretty_assertions::assert_eq;

use super::*;
use crate::op_table;

fn image(tag: u64, ops: u64, payload: u64) -> Vec<u8> {
    [tag, ops, payload].iter().flat_map(|w| w.to_le_bytes()).collect()
}

#[test]
fn value_offsets() {
    assert_eq!(VALUE_SIZE, 24);
    assert_eq!(VALUE_TAG_OFFSET, 0);
    assert_eq!(VALUE_OPS_OFFSET, 8);
    assert_eq!(VALUE_PAYLOAD_OFFSET, 16);
}

#[test]
fn block_offsets() {
    assert_eq!(ARRAY_LEN_OFFSET, 8);
    assert_eq!(ARRAY_ITEMS_OFFSET, 16);
    assert_eq!(OBJECT_SYMBOLS_OFFSET, 8);
    assert_eq!(OBJECT_SLOTS_OFFSET, 16);
    assert_eq!(STRING_DATA_OFFSET, 16);
    assert_eq!(SYMBOLS_NAMES_OFFSET, 24);
}

#[test]
fn op_slots_follow_the_name_word() {
    assert_eq!(OpSlot::ALL.len(), 36);
    assert_eq!(OpSlot::Neg.offset(), 8);
    for pair in OpSlot::ALL.windows(2) {
        assert_eq!(pair[1].offset(), pair[0].offset() + 8);
    }
    assert_eq!(OpSlot::TypeOf.field_name(), "type_of");
    assert_eq!(OpSlot::from_name("index_ref"), Some(OpSlot::IndexRef));
    assert_eq!(OpSlot::from_name("frobnicate"), None);
}

#[test]
fn slot_offset_addresses_the_function() {
    let table = op_table(ValueTag::Int);
    let base = std::ptr::from_ref(table).cast::<u8>();
    // SAFETY: the offset is inside the table and holds a function pointer.
    let add = unsafe { *base.add(OpSlot::Add.offset()).cast::<crate::ops::BinaryFn>() };
    let out = add(&Value::int(2), &Value::int(2));
    assert_eq!(out.as_int(), Some(4));
}

#[test]
fn symbols_per_tag() {
    assert_eq!(op_table_symbol(ValueTag::StringElemRef), "__vex_op_tbl_string_elem_ref");
    assert_eq!(op_table_symbol(ValueTag::ULong), "__vex_op_tbl_ulong");
}

#[test]
fn decode_scalars() {
    let raw = RawValue::decode(&image(ValueTag::Int as u64, 0x1000, 0xffff_fffe)).unwrap();
    assert_eq!(raw.tag().unwrap(), ValueTag::Int);
    assert_eq!(raw.describe().as_deref(), Some("-2"));
    assert!(!raw.is_heap());

    let raw = RawValue::decode(&image(ValueTag::Char as u64, 0, u64::from(b'x'))).unwrap();
    assert_eq!(raw.describe().as_deref(), Some("'x'"));
}

#[test]
fn decode_matches_live_value() {
    let v = Value::long(-77);
    // SAFETY: `Value` is plain old data of VALUE_SIZE bytes.
    let bytes = unsafe {
        std::slice::from_raw_parts(std::ptr::from_ref(&v).cast::<u8>(), VALUE_SIZE)
    };
    let raw = RawValue::decode(bytes).unwrap();
    assert_eq!(raw.describe().as_deref(), Some("-77"));
    assert_eq!(raw.ops, std::ptr::from_ref(v.ops()) as u64);
}

#[test]
fn heap_values_need_target_memory() {
    let raw = RawValue::decode(&image(ValueTag::String as u64, 0, 0xdead_0000)).unwrap();
    assert!(raw.is_heap());
    assert_eq!(raw.describe(), None);
}

#[test]
fn decode_errors() {
    assert_eq!(
        RawValue::decode(&[0; 10]),
        Err(LayoutError::Truncated { found: 10 })
    );
    assert_eq!(
        RawValue::decode(&image(40, 0, 0)),
        Err(LayoutError::UnknownTag(40))
    );
    assert_eq!(
        LayoutError::Truncated { found: 3 }.to_string(),
        "value image is 3 bytes, need 24"
    );
}
