use pretty_assertions::assert_eq;

use super::*;
use crate::alloc_track::live_blocks;

#[test]
fn release_reports_last_reference() {
    let mut count = 2_i64;
    // SAFETY: `count` stands in for a block header.
    unsafe {
        assert!(!release(&mut count, BlockKind::String));
        assert!(release(&mut count, BlockKind::String));
        // Already zero: logged and ignored.
        assert!(!release(&mut count, BlockKind::String));
    }
    assert_eq!(count, 0);
}

#[test]
fn string_block_is_nul_terminated() {
    let block = StringBlock::alloc(b"abc");
    // SAFETY: freshly allocated, freed below.
    unsafe {
        assert_eq!(StringBlock::bytes(block), Some(&b"abc"[..]));
        assert_eq!(*(*block).data.add(3), 0);
        assert_eq!(StringBlock::byte_ptr(block, 3), None);
        StringBlock::destroy(block);
    }
}

#[test]
fn array_slots_are_bounds_checked() {
    let block = ArrayBlock::alloc(&[Value::int(1), Value::int(2)]).unwrap();
    // SAFETY: freshly allocated, freed below.
    unsafe {
        assert_eq!((*ArrayBlock::slot(block, 1).unwrap()).as_int(), Some(2));
        assert!(ArrayBlock::slot(block, 2).is_none());
        ArrayBlock::destroy(block);
    }
}

#[test]
fn destroying_an_array_drops_each_element_once() {
    let base = live_blocks();
    let shared = Value::string("kept");
    let items: Vec<Value> = (0..5).map(|_| shared.copy_value()).collect();
    assert_eq!(shared.ref_count(), Some(6));

    let array = Value::array_from(items);
    array.drop_value();

    assert_eq!(shared.ref_count(), Some(1));
    shared.drop_value();
    assert_eq!(live_blocks(), base);
}

#[test]
fn symbols_list_fields_then_methods() {
    let symbols = Symbols::leak("Account", &["owner", "balance"], &["deposit"]).unwrap();
    assert!(symbols.is_well_formed());
    assert_eq!(symbols.field_count(), 2);
    assert_eq!(symbols.slot_count(), 3);
    assert_eq!(symbols.class_name(), "Account");
    assert_eq!(symbols.name(2), Some(c"deposit"));
    assert_eq!(symbols.find(c"balance"), Some(1));
    assert_eq!(symbols.find(c"missing"), None);
    assert_eq!(symbols.name(3), None);
}

#[test]
fn symbols_reject_interior_nul() {
    let err = Symbols::leak("Bad", &["a\0b"], &[]).unwrap_err();
    assert_eq!(err, SymbolsError::InteriorNul("a\0b".to_owned()));
}

#[test]
fn malformed_symbols_are_detected() {
    let symbols = Symbols {
        class_name: std::ptr::null(),
        field_count: 3,
        len: 1,
        names: std::ptr::null(),
    };
    assert!(!symbols.is_well_formed());
    assert_eq!(symbols.class_name(), "<anonymous>");
}

#[test]
fn void_blocks_are_filled_in_place() {
    let block = ArrayBlock::alloc_void(3).unwrap();
    // SAFETY: freshly allocated, freed below.
    unsafe {
        assert_eq!((*block).len, 3);
        assert!((0..3).all(|i| (*ArrayBlock::slot(block, i).unwrap()).tag == crate::ValueTag::Void));
        ArrayBlock::destroy(block);
    }
}

#[test]
fn lengths_without_a_layout_are_refused() {
    let base = live_blocks();
    assert!(ArrayBlock::alloc_void(1 << 60).is_none());
    assert!(ArrayBlock::alloc_void(usize::MAX).is_none());
    assert_eq!(live_blocks(), base);
}

#[test]
fn deeply_nested_arrays_drop() {
    let base = live_blocks();
    let mut nested = Value::void();
    for _ in 0..200_000 {
        nested = Value::array_from([nested]);
    }
    assert_eq!(live_blocks(), base + 200_000);
    nested.drop_value();
    assert_eq!(live_blocks(), base);
}
