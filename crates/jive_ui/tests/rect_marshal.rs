use jive_script::State;
use jive_ui::{Rect, ScriptError, ScriptStack, push_rect, to_rect};
use proptest::prelude::*;

fn push_sequence(s: &mut State, items: &[f64]) {
    s.new_table();
    for (i, v) in items.iter().enumerate() {
        s.push_number(*v);
        s.raw_set_i(-2, i as i64 + 1).unwrap();
    }
}

#[test]
fn sequence_becomes_rect() {
    let mut s = State::new();
    push_sequence(&mut s, &[3.0, 4.0, 20.0, 10.0]);
    assert_eq!(to_rect(&mut s, 1).unwrap(), Rect::new(3, 4, 20, 10));
    assert_eq!(to_rect(&mut s, -1).unwrap(), Rect::new(3, 4, 20, 10));
    assert_eq!(s.get_top(), 1);
}

#[test]
fn fractional_and_string_elements_coerce() {
    let mut s = State::new();
    push_sequence(&mut s, &[1.9, -2.9, 0.0, 0.0]);
    s.push_string("12");
    s.raw_set_i(1, 3).unwrap();
    assert_eq!(to_rect(&mut s, 1).unwrap(), Rect::new(1, -2, 12, 0));
}

#[test]
fn non_table_is_a_type_mismatch() {
    let mut s = State::new();
    s.push_number(1.0);
    s.push_string("0 0 10 10");
    let err = to_rect(&mut s, 2).unwrap_err();
    assert_eq!(err, ScriptError::type_mismatch(2, "table", "string"));
    assert_eq!(s.get_top(), 2);
}

#[test]
fn missing_element_is_not_defaulted() {
    let mut s = State::new();
    push_sequence(&mut s, &[1.0, 2.0, 3.0]);
    let err = to_rect(&mut s, 1).unwrap_err();
    assert_eq!(
        err,
        ScriptError::FieldTypeMismatch {
            slot: 1,
            field: 4,
            expected: "number".to_string(),
            actual: "nil".to_string(),
        }
    );
    assert!(err.is_type_mismatch());
    assert_eq!(s.get_top(), 1);
}

#[test]
fn non_numeric_element_is_a_type_mismatch() {
    let mut s = State::new();
    push_sequence(&mut s, &[1.0, 2.0, 3.0, 4.0]);
    s.push_string("wide");
    s.raw_set_i(1, 3).unwrap();
    let err = to_rect(&mut s, 1).unwrap_err();
    assert!(matches!(err, ScriptError::FieldTypeMismatch { field: 3, .. }));
    assert_eq!(err.to_string(), "bad argument #1 (field [3]: number expected, got string)");
    assert_eq!(s.get_top(), 1);
}

#[test]
fn elements_are_read_raw() {
    let mut s = State::new();
    push_sequence(&mut s, &[1.0, 2.0]);
    // { __index = {nil, nil, 30, 40} } is not consulted
    s.new_table();
    push_sequence(&mut s, &[0.0, 0.0, 30.0, 40.0]);
    s.set_field(-2, "__index").unwrap();
    s.set_metatable(1).unwrap();
    assert!(to_rect(&mut s, 1).unwrap_err().is_type_mismatch());
}

#[test]
fn huge_values_saturate() {
    let mut s = State::new();
    push_sequence(&mut s, &[1e12, -1e12, 5.0, 5.0]);
    assert_eq!(to_rect(&mut s, 1).unwrap(), Rect::new(i32::MAX, i32::MIN, 5, 5));
}

#[test]
fn values_beyond_i64_and_infinities_saturate() {
    let mut s = State::new();
    push_sequence(&mut s, &[1e300, -1e300, f64::INFINITY, f64::NEG_INFINITY]);
    assert_eq!(
        to_rect(&mut s, 1).unwrap(),
        Rect::new(i32::MAX, i32::MIN, i32::MAX, i32::MIN)
    );
    assert_eq!(s.get_top(), 1);
}

#[test]
fn nan_element_is_a_type_mismatch() {
    let mut s = State::new();
    push_sequence(&mut s, &[0.0, f64::NAN, 1.0, 1.0]);
    let err = to_rect(&mut s, 1).unwrap_err();
    assert!(matches!(err, ScriptError::FieldTypeMismatch { field: 2, .. }));
    assert_eq!(s.get_top(), 1);
}

#[test]
fn saturated_rect_feeds_geometry() {
    let mut s = State::new();
    push_sequence(&mut s, &[1e12, 0.0, 10.0, 10.0]);
    let r = to_rect(&mut s, 1).unwrap();
    assert_eq!(r, Rect::new(i32::MAX, 0, 10, 10));
    assert_eq!(r.union(&Rect::new(0, 0, 1, 1)), Rect::new(0, 0, i32::MAX, 10));
    assert_eq!(r.intersection(&Rect::new(0, 0, 1, 1)), Rect::EMPTY);
}

#[test]
fn pushed_rect_is_a_four_element_sequence() {
    let mut s = State::new();
    let r = Rect::new(-5, 6, 70, 80);
    push_rect(&mut s, &r).unwrap();
    assert_eq!(s.get_top(), 1);
    assert_eq!(s.raw_len(1), 4);
    s.raw_get_i(1, 1).unwrap();
    assert_eq!(s.to_integer(-1), Some(-5));
    s.pop(1);
    assert_eq!(to_rect(&mut s, 1).unwrap(), r);
}

#[derive(Debug, Clone)]
enum Element {
    Num(f64),
    Str(String),
    Bool(bool),
}

fn any_element() -> impl Strategy<Value = Element> {
    prop_oneof![
        (-1000.0f64..1000.0).prop_map(Element::Num),
        "[a-z0-9]{0,4}".prop_map(Element::Str),
        any::<bool>().prop_map(Element::Bool),
    ]
}

proptest! {
    #[test]
    fn conversion_never_changes_stack_depth(
        items in proptest::collection::vec(any_element(), 0..6),
        below in 0usize..3,
    ) {
        let mut s = State::new();
        for _ in 0..below {
            s.push_nil();
        }
        s.new_table();
        for (i, item) in items.iter().enumerate() {
            match item {
                Element::Num(n) => s.push_number(*n),
                Element::Str(t) => s.push_string(t),
                Element::Bool(b) => s.push_boolean(*b),
            }
            s.raw_set_i(-2, i as i64 + 1).unwrap();
        }
        let depth = s.get_top();
        match to_rect(&mut s, -1) {
            Ok(_) => prop_assert!(items.len() >= 4),
            Err(e) => prop_assert!(e.is_type_mismatch()),
        }
        prop_assert_eq!(s.get_top(), depth);
    }
}
