//! Native binding helpers for the UI layer.
//!
//! These functions are written against [`ScriptStack`] and are called while a
//! script is calling into native code:
//! - `get_peer` - Lazily attach a tagged native block to a script object
//! - `get_method` - Look up a callable field on a script object
//! - `to_rect` / `push_rect` - Convert between sequences and [`Rect`]
//! - `get_framework` - Fetch `jive.ui.Framework`
//! - `print_stack` - Dump the stack for debugging
//!
//! Each operation leaves the stack at its documented depth, on success and on error.

pub mod framework;
pub mod inspect;
pub mod method;
pub mod peer;
pub mod rect;
pub mod stack_check;

pub use framework::get_framework;
pub use inspect::{format_stack, print_stack};
pub use method::get_method;
pub use peer::{PEER_FIELD, PeerMeta, get_peer};
pub use rect::{push_rect, to_rect};
pub use stack_check::StackCheck;

pub use jive_core::{Rect, ScriptError, ScriptStack, UserdataId};
