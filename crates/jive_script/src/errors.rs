//! Common error message constants used throughout the state.

pub mod messages {
    pub const TABLE_INDEX_IS_NIL: &str = "table index is nil";
    pub const TABLE_INDEX_IS_NAN: &str = "table index is NaN";
    pub const BAD_METATABLE: &str = "metatable must be a table or nil";
    pub const NO_METATABLE_SLOT: &str = "cannot set metatable on this value";
    pub const C_STACK_UNDERFLOW: &str = "not enough values on the stack";
}
