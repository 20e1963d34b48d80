//! The stack protocol between native bindings and the scripting state.
//!
//! Values are exchanged positionally on the state's evaluation stack. Positive
//! indices count from the bottom of the current frame (`1` is the first slot),
//! negative indices count from the top (`-1` is the topmost slot).
//!
//! Every operation documents its net stack effect. Methods returning `Result`
//! leave the stack unchanged when they fail.

use crate::error::ScriptError;
use crate::gc::UserdataId;
use crate::value::ValueType;

/// Native release hook for a userdata block, run once by the collector.
pub type Finalizer = fn(&mut [u8]);

pub trait ScriptStack {
    /// Number of slots in the current frame.
    fn get_top(&self) -> i32;

    /// Grow (with nils) or shrink the current frame to `idx` slots.
    /// Negative `idx` is relative to the current top.
    fn set_top(&mut self, idx: i32);

    /// Type tag of the slot, `ValueType::None` if `idx` names no slot.
    fn type_of(&self, idx: i32) -> ValueType;

    fn to_number(&self, idx: i32) -> Option<f64>;

    /// Numeric coercion truncated toward zero.
    fn to_integer(&self, idx: i32) -> Option<i64>;

    fn to_boolean(&self, idx: i32) -> bool;

    /// String contents; numbers are converted to their string form.
    fn to_str(&self, idx: i32) -> Option<String>;

    /// Identity address of a composite value, `0` for anything else.
    fn to_pointer(&self, idx: i32) -> usize;

    fn to_userdata(&self, idx: i32) -> Option<UserdataId>;

    fn raw_equal(&self, a: i32, b: i32) -> bool;

    /// Bytes of a userdata block, `None` once it has been collected.
    fn userdata_bytes(&self, ud: UserdataId) -> Option<&[u8]>;

    fn userdata_bytes_mut(&mut self, ud: UserdataId) -> Option<&mut [u8]>;

    // -- pushes (+1 each) --

    fn push_nil(&mut self);
    fn push_number(&mut self, n: f64);
    fn push_boolean(&mut self, b: bool);
    fn push_string(&mut self, s: &str);

    /// Push a copy of the value at `idx`.
    fn push_value(&mut self, idx: i32);

    /// Push a function value that runs `f` on the bytes of the userdata it is called with.
    fn push_finalizer(&mut self, f: Finalizer);

    /// Push a new empty table.
    fn new_table(&mut self);

    /// Push a new userdata block of `size` bytes. Implementations zero-fill it.
    fn new_userdata(&mut self, size: usize) -> UserdataId;

    /// Pop the top value and store it in slot `idx` (-1).
    fn replace(&mut self, idx: i32) -> Result<(), ScriptError>;

    // -- field access --

    /// Push `t[key]` for the value at `idx`, honoring `__index` (+1).
    fn get_field(&mut self, idx: i32, key: &str) -> Result<ValueType, ScriptError>;

    /// Pop a value and assign `t[key] = value`, honoring `__newindex` (-1).
    fn set_field(&mut self, idx: i32, key: &str) -> Result<(), ScriptError>;

    /// Push `t[key]` for the table at `idx` without metamethods (+1).
    fn raw_get_field(&mut self, idx: i32, key: &str) -> Result<ValueType, ScriptError>;

    /// Push `t[n]` for the table at `idx` without metamethods (+1).
    fn raw_get_i(&mut self, idx: i32, n: i64) -> Result<ValueType, ScriptError>;

    /// Pop a value and assign `t[n] = value` without metamethods (-1).
    fn raw_set_i(&mut self, idx: i32, n: i64) -> Result<(), ScriptError>;

    /// Push the global `name` (+1).
    fn get_global(&mut self, name: &str) -> Result<ValueType, ScriptError>;

    /// Pop a value into the global `name` (-1).
    fn set_global(&mut self, name: &str) -> Result<(), ScriptError>;

    // -- metatables --

    /// Push the metatable of the value at `idx` and return true, or push nothing.
    fn get_metatable(&mut self, idx: i32) -> bool;

    /// Pop a table (or nil) and make it the metatable of the value at `idx` (-1).
    fn set_metatable(&mut self, idx: i32) -> Result<(), ScriptError>;

    /// Push the metatable registered under `tag`, creating it first if absent (+1).
    ///
    /// Returns true if this call created it. Registration is idempotent.
    fn new_metatable(&mut self, tag: &str) -> bool;

    /// Push the metatable registered under `tag`, or nil (+1).
    fn push_registered_metatable(&mut self, tag: &str) -> ValueType;

    // -- provided --

    /// Convert a relative index into an absolute one.
    fn abs_index(&self, idx: i32) -> i32 {
        if idx > 0 { idx } else { self.get_top() + idx + 1 }
    }

    fn pop(&mut self, n: i32) {
        self.set_top(-n - 1);
    }

    fn is_nil(&self, idx: i32) -> bool {
        self.type_of(idx) == ValueType::Nil
    }

    fn type_name(&self, idx: i32) -> &'static str {
        self.type_of(idx).name()
    }

    /// Fail with a type mismatch unless the slot holds a `t`.
    fn check_type(&self, idx: i32, t: ValueType) -> Result<(), ScriptError> {
        let actual = self.type_of(idx);
        if actual == t {
            return Ok(());
        }
        Err(ScriptError::type_mismatch(self.abs_index(idx), t.name(), actual.name()))
    }

    /// The tag a value carries: the `__name` of its metatable, or its type name.
    /// Net effect 0.
    fn tag_name(&mut self, idx: i32) -> String {
        let idx = self.abs_index(idx);
        let fallback = self.type_name(idx).to_string();
        if !self.get_metatable(idx) {
            return fallback;
        }
        let name = match self.raw_get_field(-1, "__name") {
            Ok(ValueType::String) => self.to_str(-1),
            Ok(_) => None,
            Err(_) => {
                self.pop(1);
                return fallback;
            }
        };
        self.pop(2);
        name.unwrap_or(fallback)
    }

    /// Return the userdata at `idx` if its metatable is the one registered under `tag`.
    /// Net effect 0.
    fn check_udata(&mut self, idx: i32, tag: &str) -> Result<UserdataId, ScriptError> {
        let idx = self.abs_index(idx);
        if let Some(ud) = self.to_userdata(idx) {
            if self.get_metatable(idx) {
                self.push_registered_metatable(tag);
                let same = self.raw_equal(-1, -2);
                self.pop(2);
                if same {
                    return Ok(ud);
                }
            }
        }
        let actual = self.tag_name(idx);
        Err(ScriptError::type_mismatch(idx, tag, actual))
    }
}
