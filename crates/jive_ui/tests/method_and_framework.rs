use jive_script::State;
use jive_ui::{ScriptError, ScriptStack, get_framework, get_method};

fn noop(_s: &mut State) -> Result<i32, ScriptError> {
    Ok(0)
}

/// widget = setmetatable({}, { __index = { draw = noop } })
fn push_widget(s: &mut State) {
    s.new_table();
    s.new_table();
    s.new_table();
    s.push_function(noop);
    s.set_field(-2, "draw").unwrap();
    s.set_field(-2, "__index").unwrap();
    s.set_metatable(-2).unwrap();
}

#[test]
fn found_method_is_left_on_the_stack() {
    let mut s = State::new();
    push_widget(&mut s);
    assert!(get_method(&mut s, 1, "draw").unwrap());
    assert_eq!(s.get_top(), 2);
    assert_eq!(s.type_name(-1), "function");
}

#[test]
fn missing_method_leaves_the_stack_alone() {
    let mut s = State::new();
    push_widget(&mut s);
    assert!(!get_method(&mut s, 1, "layout").unwrap());
    assert_eq!(s.get_top(), 1);
}

#[test]
fn nil_object_is_not_found() {
    let mut s = State::new();
    s.push_nil();
    assert!(!get_method(&mut s, 1, "draw").unwrap());
    assert!(!get_method(&mut s, -1, "draw").unwrap());
    assert_eq!(s.get_top(), 1);
}

#[test]
fn any_non_nil_field_counts_as_found() {
    let mut s = State::new();
    s.new_table();
    s.push_boolean(false);
    s.set_field(1, "visible").unwrap();
    assert!(get_method(&mut s, 1, "visible").unwrap());
    assert_eq!(s.get_top(), 2);
}

#[test]
fn lookup_on_a_scalar_raises() {
    let mut s = State::new();
    s.push_number(4.0);
    assert_eq!(get_method(&mut s, 1, "draw"), Err(ScriptError::NotIndexable("number")));
    assert_eq!(s.get_top(), 1);
}

fn install_framework(s: &mut State) {
    s.new_table();
    s.new_table();
    s.new_table();
    s.push_string("framework");
    s.set_field(-2, "name").unwrap();
    s.set_field(-2, "Framework").unwrap();
    s.set_field(-2, "ui").unwrap();
    s.set_global("jive").unwrap();
}

#[test]
fn framework_is_pushed_alone() {
    let mut s = State::new();
    install_framework(&mut s);
    s.push_string("below");
    assert_eq!(get_framework(&mut s).unwrap(), 1);
    assert_eq!(s.get_top(), 2);
    s.get_field(-1, "name").unwrap();
    assert_eq!(s.to_str(-1).as_deref(), Some("framework"));
    assert_eq!(s.to_str(1).as_deref(), Some("below"));
}

#[test]
fn framework_works_as_a_native_function() {
    let mut s = State::new();
    install_framework(&mut s);
    s.register("getFramework", get_framework::<State>).unwrap();
    s.get_global("getFramework").unwrap();
    s.call(0, 1).unwrap();
    assert_eq!(s.get_top(), 1);
    assert_eq!(s.type_name(1), "table");
}

#[test]
fn missing_framework_namespace_raises_and_restores() {
    let mut s = State::new();
    s.push_number(1.0);
    assert_eq!(get_framework(&mut s), Err(ScriptError::NotIndexable("nil")));
    assert_eq!(s.get_top(), 1);
}
