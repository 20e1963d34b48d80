//! Core types shared by the scripting state and the native binding layer.
//!
//! This crate contains the types both sides of the boundary agree on:
//! - `Value` / `ValueType` - Tagged scripting values and their slot type tags
//! - `ObjectId` / `UserdataId` - Handles to heap-allocated script objects
//! - `ScriptStack` - The stack protocol the binding layer drives
//! - `Rect` - Axis-aligned rectangles with union/intersection
//! - `ScriptError` - Errors raised across the boundary

pub mod error;
pub mod gc;
pub mod rect;
pub mod stack;
pub mod value;

pub use error::ScriptError;
pub use gc::{ObjectId, UserdataId};
pub use rect::Rect;
pub use stack::{Finalizer, ScriptStack};
pub use value::{Value, ValueType};
