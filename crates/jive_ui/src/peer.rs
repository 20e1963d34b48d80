//! Native peers: tagged data blocks attached to script objects.
//!
//! A peer is created the first time native code asks for it and is cached in
//! the object's `peer` field. From then on the collector owns the block; native
//! code never frees it, it only supplies the finalizer that runs when the
//! block is collected (or when the state is closed).

use jive_core::{Finalizer, ScriptError, ScriptStack, UserdataId};

use crate::stack_check::with_stack_check;

/// Name of the object field that caches its peer.
pub const PEER_FIELD: &str = "peer";

/// Describes one kind of peer. Declared once per native type, usually as a
/// `static`, and never mutated.
#[derive(Debug, Clone, Copy)]
pub struct PeerMeta {
    /// Tag the block's metatable is registered under.
    pub magic: &'static str,
    /// Size of the block in bytes.
    pub size: usize,
    /// Runs once on the block's bytes when it is released.
    pub gc: Finalizer,
}

impl PeerMeta {
    pub const fn new(magic: &'static str, size: usize, gc: Finalizer) -> Self {
        Self { magic, size, gc }
    }
}

/// Return the peer of the object at `index`, creating it on first access.
///
/// A new peer is a zero-filled block of `meta.size` bytes, tagged with
/// `meta.magic` and released through `meta.gc`; it is stored in the object's
/// `peer` field, which is written only on that first access. An existing
/// peer must carry `meta.magic`, otherwise this fails with a type mismatch
/// naming the expected and actual tags. The stack is unchanged on return.
pub fn get_peer<S: ScriptStack + ?Sized>(
    s: &mut S,
    index: i32,
    meta: &PeerMeta,
) -> Result<UserdataId, ScriptError> {
    let index = s.abs_index(index);

    with_stack_check(s, 0, |s| {
        s.get_field(index, PEER_FIELD)?;
        if !s.is_nil(-1) {
            let peer = s.check_udata(-1, meta.magic).map_err(|e| match e {
                ScriptError::TypeMismatch { expected, actual, .. } => ScriptError::TypeMismatch {
                    slot: index,
                    expected,
                    actual,
                },
                other => other,
            })?;
            s.pop(1);
            return Ok(peer);
        }
        s.pop(1);

        let peer = s.new_userdata(meta.size);

        s.new_metatable(meta.magic);
        s.push_finalizer(meta.gc);
        s.set_field(-2, "__gc")?;
        s.set_metatable(-2)?;

        s.set_field(index, PEER_FIELD)?;
        Ok(peer)
    })
}
