//! Access to the script-side framework object.

use jive_core::{ScriptError, ScriptStack};

use crate::stack_check::with_stack_check;

/// Push `jive.ui.Framework` (+1) and return the result count, `1`.
///
/// Usable directly as a native function.
pub fn get_framework<S: ScriptStack + ?Sized>(s: &mut S) -> Result<i32, ScriptError> {
    with_stack_check(s, 1, |s| {
        s.get_global("jive")?;
        s.get_field(-1, "ui")?;
        s.get_field(-1, "Framework")?;

        s.replace(-3)?;
        s.pop(1);
        Ok(1)
    })
}
