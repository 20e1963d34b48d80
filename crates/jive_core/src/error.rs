//! Errors raised across the script/native boundary.

/// Errors raised by the scripting state and by the binding layer.
///
/// These unwind to the caller of the current script operation. A lookup that
/// finds nothing is not an error and is reported through return values instead.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScriptError {
    /// The value at `slot` has the wrong type, or a userdata carries the wrong tag.
    #[error("bad argument #{slot} ({expected} expected, got {actual})")]
    TypeMismatch {
        slot: i32,
        expected: String,
        actual: String,
    },

    /// Element `field` of the sequence at `slot` has the wrong type.
    #[error("bad argument #{slot} (field [{field}]: {expected} expected, got {actual})")]
    FieldTypeMismatch {
        slot: i32,
        field: i64,
        expected: String,
        actual: String,
    },

    /// Non-raw field access on a value that has no indexing behavior.
    #[error("attempt to index a {0} value")]
    NotIndexable(&'static str),

    #[error("attempt to call a {0} value")]
    NotCallable(&'static str),

    /// A stack index that does not name a slot in the current frame.
    #[error("invalid stack index {0}")]
    InvalidIndex(i32),

    /// A heap handle was used after the object was collected.
    #[error("invalid handle")]
    InvalidHandle,

    /// An `__index`/`__newindex` chain exceeded its loop bound.
    #[error("'__index' chain too long; possible loop")]
    IndexChainTooDeep,

    #[error("{0}")]
    Runtime(String),
}

impl ScriptError {
    pub fn type_mismatch(slot: i32, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        ScriptError::TypeMismatch {
            slot,
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// True for both whole-slot and element type mismatches.
    pub fn is_type_mismatch(&self) -> bool {
        matches!(
            self,
            ScriptError::TypeMismatch { .. } | ScriptError::FieldTypeMismatch { .. }
        )
    }
}
