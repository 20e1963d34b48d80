use jive_core::{ScriptError, ScriptStack, ValueType};
use jive_script::{MULTRET, State};

fn setup_proxy(s: &mut State) {
    // proxy = setmetatable({}, { __index = backing })
    s.new_table();
    s.new_table();
    s.new_table();
    s.push_number(7.0);
    s.set_field(-2, "answer").unwrap();
    s.set_field(-2, "__index").unwrap();
    s.set_metatable(-2).unwrap();
}

#[test]
fn relative_and_absolute_indices_agree() {
    let mut s = State::new();
    s.push_number(1.0);
    s.push_string("two");
    s.push_boolean(true);
    assert_eq!(s.get_top(), 3);
    assert_eq!(s.type_of(1), ValueType::Number);
    assert_eq!(s.type_of(-1), ValueType::Boolean);
    assert_eq!(s.type_of(-2), s.type_of(2));
    assert_eq!(s.abs_index(-1), 3);
    assert_eq!(s.type_of(4), ValueType::None);
    assert_eq!(s.type_of(-4), ValueType::None);
}

#[test]
fn set_top_grows_with_nils_and_pop_shrinks() {
    let mut s = State::new();
    s.set_top(3);
    assert_eq!(s.get_top(), 3);
    assert!(s.is_nil(3));
    s.pop(2);
    assert_eq!(s.get_top(), 1);
    s.set_top(-1);
    assert_eq!(s.get_top(), 1);
    s.pop(5);
    assert_eq!(s.get_top(), 0);
}

#[test]
fn coercions_follow_scripting_rules() {
    let mut s = State::new();
    s.push_string(" 12 ");
    s.push_number(-3.75);
    s.push_string("abc");
    s.push_nil();
    assert_eq!(s.to_integer(1), Some(12));
    assert_eq!(s.to_integer(2), Some(-3));
    assert_eq!(s.to_number(3), None);
    assert_eq!(s.to_str(2).as_deref(), Some("-3.75"));
    assert!(s.to_boolean(2));
    assert!(!s.to_boolean(4));
    assert!(!s.to_boolean(9));
    assert_eq!(s.to_pointer(1), 0);
}

#[test]
fn get_field_follows_index_table_chain() {
    let mut s = State::new();
    setup_proxy(&mut s);
    assert_eq!(s.get_field(1, "answer").unwrap(), ValueType::Number);
    assert_eq!(s.to_integer(-1), Some(7));
    s.pop(1);
    assert_eq!(s.raw_get_field(1, "answer").unwrap(), ValueType::Nil);
    s.pop(1);
    assert_eq!(s.get_top(), 1);
}

fn index_fn(s: &mut State) -> Result<i32, ScriptError> {
    let key = s.to_str(2).unwrap_or_default();
    s.push_string(&format!("computed:{}", key));
    Ok(1)
}

#[test]
fn get_field_calls_index_function() {
    let mut s = State::new();
    s.new_table();
    s.new_table();
    s.push_function(index_fn);
    s.set_field(-2, "__index").unwrap();
    s.set_metatable(-2).unwrap();
    s.get_field(1, "width").unwrap();
    assert_eq!(s.to_str(-1).as_deref(), Some("computed:width"));
    assert_eq!(s.get_top(), 2);
}

#[test]
fn indexing_a_number_fails_without_touching_the_stack() {
    let mut s = State::new();
    s.push_number(1.0);
    let err = s.get_field(1, "x").unwrap_err();
    assert_eq!(err, ScriptError::NotIndexable("number"));
    assert_eq!(s.get_top(), 1);
}

#[test]
fn cyclic_index_chain_is_bounded() {
    let mut s = State::new();
    s.new_table();
    s.new_table();
    s.push_value(-1);
    s.set_field(-2, "__index").unwrap();
    s.push_value(-1);
    s.set_metatable(-2).unwrap();
    // metatable's own metatable is itself and its __index is itself
    s.set_metatable(1).unwrap();
    let err = s.get_field(1, "missing").unwrap_err();
    assert_eq!(err, ScriptError::IndexChainTooDeep);
}

#[test]
fn raw_integer_access_round_trips() {
    let mut s = State::new();
    s.new_table();
    for (i, v) in [3.0, 4.0, 20.0].iter().enumerate() {
        s.push_number(*v);
        s.raw_set_i(1, i as i64 + 1).unwrap();
    }
    assert_eq!(s.raw_len(1), 3);
    s.raw_get_i(1, 3).unwrap();
    assert_eq!(s.to_integer(-1), Some(20));
    s.raw_get_i(1, 4).unwrap();
    assert!(s.is_nil(-1));
    assert_eq!(s.get_top(), 3);
}

#[test]
fn raw_access_on_non_table_is_a_type_mismatch() {
    let mut s = State::new();
    s.push_string("not a table");
    let err = s.raw_get_i(1, 1).unwrap_err();
    assert_eq!(err, ScriptError::type_mismatch(1, "table", "string"));
    assert_eq!(s.get_top(), 1);
}

#[test]
fn named_metatables_register_once() {
    let mut s = State::new();
    assert!(s.new_metatable("JiveWidget"));
    assert!(!s.new_metatable("JiveWidget"));
    assert!(s.raw_equal(-1, -2));
    s.raw_get_field(-1, "__name").unwrap();
    assert_eq!(s.to_str(-1).as_deref(), Some("JiveWidget"));
    assert_eq!(s.push_registered_metatable("Unknown"), ValueType::Nil);
}

#[test]
fn check_udata_reports_the_actual_tag() {
    let mut s = State::new();
    s.new_userdata(8);
    s.new_metatable("JiveFont");
    s.set_metatable(-2).unwrap();
    s.new_metatable("JiveWidget");
    s.pop(1);

    assert!(s.check_udata(1, "JiveFont").is_ok());
    let err = s.check_udata(1, "JiveWidget").unwrap_err();
    assert_eq!(err, ScriptError::type_mismatch(1, "JiveWidget", "JiveFont"));
    assert_eq!(s.get_top(), 1);
}

#[test]
fn globals_and_replace() {
    let mut s = State::new();
    s.push_number(5.0);
    s.set_global("five").unwrap();
    assert_eq!(s.get_top(), 0);
    s.push_nil();
    s.get_global("five").unwrap();
    s.replace(1).unwrap();
    assert_eq!(s.get_top(), 1);
    assert_eq!(s.to_integer(1), Some(5));
}

fn add(s: &mut State) -> Result<i32, ScriptError> {
    let a = s.to_number(1).unwrap_or(0.0);
    let b = s.to_number(2).unwrap_or(0.0);
    s.push_number(a + b);
    s.push_string("extra");
    Ok(2)
}

#[test]
fn call_runs_natives_in_their_own_frame() {
    let mut s = State::new();
    s.push_string("below");
    s.register("add", add).unwrap();
    s.get_global("add").unwrap();
    s.push_number(2.0);
    s.push_number(3.0);
    s.call(2, 1).unwrap();
    assert_eq!(s.get_top(), 2);
    assert_eq!(s.to_integer(-1), Some(5));

    s.get_global("add").unwrap();
    s.call(0, MULTRET).unwrap();
    assert_eq!(s.get_top(), 4);
    assert_eq!(s.to_str(-1).as_deref(), Some("extra"));
    assert_eq!(s.to_str(1).as_deref(), Some("below"));
}

#[test]
fn calling_a_non_function_fails() {
    let mut s = State::new();
    s.push_number(1.0);
    let err = s.call(0, 0).unwrap_err();
    assert_eq!(err, ScriptError::NotCallable("number"));
    assert_eq!(s.get_top(), 0);
}
