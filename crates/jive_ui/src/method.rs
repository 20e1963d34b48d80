//! Method lookup on script objects.

use jive_core::{ScriptError, ScriptStack};

use crate::stack_check::StackCheck;

/// Look up `method` on the object at `index`.
///
/// Returns `Ok(true)` with the found value pushed on the stack (+1); the caller
/// owns that slot and must consume it. Returns `Ok(false)` with the stack
/// unchanged when the object is nil or the field is nil. The lookup honors the
/// object's `__index`.
pub fn get_method<S: ScriptStack + ?Sized>(
    s: &mut S,
    index: i32,
    method: &str,
) -> Result<bool, ScriptError> {
    if s.is_nil(index) {
        return Ok(false);
    }

    let check = StackCheck::begin(s);
    s.get_field(index, method)?;
    if !s.is_nil(-1) {
        check.end_with(s, 1);
        return Ok(true);
    }
    s.pop(1);
    check.end(s);
    Ok(false)
}
