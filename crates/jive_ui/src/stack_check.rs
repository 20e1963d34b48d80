//! Stack-balance checks around binding operations.

use jive_core::{ScriptError, ScriptStack};

use crate::inspect::print_stack;

/// Records the stack depth on entry to an operation.
///
/// A mismatch at `end` is a bug in the binding, not a runtime condition: debug
/// builds dump the stack and panic, release builds skip the check.
#[derive(Debug, Clone, Copy)]
#[must_use]
pub struct StackCheck {
    top: i32,
}

impl StackCheck {
    pub fn begin<S: ScriptStack + ?Sized>(s: &S) -> Self {
        Self { top: s.get_top() }
    }

    /// Depth recorded at `begin`.
    pub fn top(&self) -> i32 {
        self.top
    }

    /// Check the stack is back at its entry depth.
    pub fn end<S: ScriptStack + ?Sized>(self, s: &S) {
        self.end_with(s, 0);
    }

    /// Check the depth changed by exactly `delta`.
    pub fn end_with<S: ScriptStack + ?Sized>(self, s: &S, delta: i32) {
        if cfg!(debug_assertions) {
            let expected = self.top + delta;
            let actual = s.get_top();
            if actual != expected {
                print_stack(s, "stack imbalance");
                panic!("stack imbalance: expected depth {}, found {}", expected, actual);
            }
        }
    }

    /// Drop everything pushed since `begin`.
    pub fn unwind<S: ScriptStack + ?Sized>(self, s: &mut S) {
        s.set_top(self.top);
    }
}

/// Run `f`, then check the stack moved by `delta`; on error restore the entry depth.
pub(crate) fn with_stack_check<S, T>(
    s: &mut S,
    delta: i32,
    f: impl FnOnce(&mut S) -> Result<T, ScriptError>,
) -> Result<T, ScriptError>
where
    S: ScriptStack + ?Sized,
{
    let check = StackCheck::begin(s);
    match f(s) {
        Ok(v) => {
            check.end_with(s, delta);
            Ok(v)
        }
        Err(e) => {
            check.unwind(s);
            Err(e)
        }
    }
}
