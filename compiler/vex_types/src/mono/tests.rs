use pretty_assertions::assert_eq;

use super::*;
use crate::{Primitive, TypeId};

fn int() -> Type {
    Type::primitive(Primitive::Int)
}

/// `class Box<T>` with no parents.
fn boxed(table: &mut TypeTable) -> TypeId {
    let class = table.declare_class(table.intern("Box"));
    let t = table.intern("T");
    table.define_class(class, [t], vec![]).unwrap();
    class
}

fn box_param(table: &TypeTable, class: TypeId) -> Type {
    Type::typename(table.intern("T"), class)
}

#[test]
fn combine_statuses() {
    use MonoStatus::{Full, NotFull, Unset};
    assert_eq!(MonoStatus::all([]), Full);
    assert_eq!(MonoStatus::all([Full, Full]), Full);
    assert_eq!(MonoStatus::all([Full, NotFull]), NotFull);
    assert_eq!(MonoStatus::all([NotFull, Unset, Full]), Unset);
    assert!(Full.is_full());
    assert!(!NotFull.is_full());
}

#[test]
fn primitive_is_full_and_cached() {
    let table = TypeTable::new();
    let ty = int();
    assert_eq!(ty.mono_status(), MonoStatus::Unset);
    assert_eq!(table.get_or_compute(&ty), MonoStatus::Full);
    assert_eq!(ty.mono_status(), MonoStatus::Full);
}

#[test]
fn typename_is_not_full() {
    let mut table = TypeTable::new();
    let class = boxed(&mut table);
    assert_eq!(
        table.get_or_compute(&box_param(&table, class)),
        MonoStatus::NotFull
    );
}

#[test]
fn array_and_callable_follow_children() {
    let mut table = TypeTable::new();
    let class = boxed(&mut table);

    assert_eq!(table.get_or_compute(&Type::array(int())), MonoStatus::Full);
    assert_eq!(
        table.get_or_compute(&Type::array(box_param(&table, class))),
        MonoStatus::NotFull
    );
    let sig = Type::callable(int(), vec![int(), box_param(&table, class)]);
    assert_eq!(table.get_or_compute(&sig), MonoStatus::NotFull);
    let sig = Type::callable(int(), vec![Type::array(int())]);
    assert_eq!(table.get_or_compute(&sig), MonoStatus::Full);
}

#[test]
fn undefined_class_stays_unset_until_defined() {
    let mut table = TypeTable::new();
    let class = table.declare_class(table.intern("Node"));
    let sig = Type::callable(Type::mono(class, vec![]), vec![]);

    assert_eq!(table.mono_status_of(class), MonoStatus::Unset);
    assert_eq!(table.get_or_compute(&sig), MonoStatus::Unset);
    assert_eq!(sig.mono_status(), MonoStatus::Unset);

    table.define_class(class, [], vec![]).unwrap();
    assert_eq!(table.mono_status_of(class), MonoStatus::Full);
    assert_eq!(table.get_or_compute(&sig), MonoStatus::Full);
    assert!(table.diagnostics().is_empty());
}

#[test]
fn class_status_depends_on_typenames_and_parents() {
    let mut table = TypeTable::new();
    let class = boxed(&mut table);
    assert_eq!(table.mono_status_of(class), MonoStatus::NotFull);

    // class Raw : Box
    let raw = table.declare_class(table.intern("Raw"));
    table.define_class(raw, [], vec![class]).unwrap();
    assert_eq!(table.mono_status_of(raw), MonoStatus::NotFull);

    // class IntBox : Box<int>
    let parent = table.emplace(Type::mono(class, vec![int()]));
    let int_box = table.declare_class(table.intern("IntBox"));
    table.define_class(int_box, [], vec![parent]).unwrap();
    assert_eq!(table.mono_status_of(int_box), MonoStatus::Full);
}

#[test]
fn unset_parent_propagates() {
    let mut table = TypeTable::new();
    let base = table.declare_class(table.intern("Base"));
    let derived = table.declare_class(table.intern("Derived"));
    table.define_class(derived, [], vec![base]).unwrap();
    assert_eq!(table.mono_status_of(derived), MonoStatus::Unset);

    table.define_class(base, [], vec![]).unwrap();
    assert_eq!(table.mono_status_of(derived), MonoStatus::Full);
}

#[test]
fn box_of_type_parameter_vs_box_of_int() {
    let mut table = TypeTable::new();
    let class = boxed(&mut table);

    let generic = Type::mono(class, vec![box_param(&table, class)]);
    assert_eq!(table.get_or_compute(&generic), MonoStatus::NotFull);

    let concrete = Type::mono(class, vec![int()]);
    assert_eq!(table.get_or_compute(&concrete), MonoStatus::Full);
}

#[test]
fn mono_arity_mismatch_reports_internal_error() {
    let mut table = TypeTable::new();
    let class = boxed(&mut table);
    let bad = Type::mono(class, vec![int(), int()]);

    assert_eq!(table.get_or_compute(&bad), MonoStatus::Unset);
    let diags = table.take_diagnostics();
    assert_eq!(diags.len(), 1);
    assert!(diags[0].is_bug());
    assert_eq!(
        diags[0].message,
        "mono of `class Box<T>` has 2 type arguments, template declares 1"
    );
}

#[test]
fn mono_of_non_template_reports_internal_error() {
    let table = TypeTable::new();
    let bad = Type::mono(TypeId::INT, vec![]);
    assert_eq!(table.get_or_compute(&bad), MonoStatus::Unset);
    assert!(table.diagnostics().has_errors().is_some());
}

#[test]
fn self_inheritance_terminates() {
    let mut table = TypeTable::new();
    let ouroboros = table.declare_class(table.intern("Ouroboros"));
    table.define_class(ouroboros, [], vec![ouroboros]).unwrap();
    assert_eq!(table.mono_status_of(ouroboros), MonoStatus::Unset);
}

#[test]
fn unknown_handle_is_internal_error() {
    let table = TypeTable::new();
    assert_eq!(
        table.mono_status_of(TypeId::from_raw(4096)),
        MonoStatus::Unset
    );
    assert_eq!(table.diagnostics().error_count(), 1);
}
