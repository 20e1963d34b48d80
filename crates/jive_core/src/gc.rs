//! Garbage collection infrastructure - base types.

/// Handle to a heap-allocated object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(pub usize);

/// Handle to a native-backed opaque value (a userdata block) owned by the collector.
///
/// Two handles compare equal exactly when they name the same block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserdataId(pub ObjectId);

impl UserdataId {
    #[inline]
    pub fn object(self) -> ObjectId {
        self.0
    }
}
