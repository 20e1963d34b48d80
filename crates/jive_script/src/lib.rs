//! In-process scripting state.
//!
//! `State` owns a value stack, a heap of tables, userdata and native functions,
//! the globals table and the named-metatable registry. It implements
//! [`jive_core::ScriptStack`], the protocol native bindings are written against.

pub mod config;
pub mod core;
pub mod errors;
mod call;
mod gc;
mod state;

pub use call::MULTRET;
pub use config::StateConfig;
pub use crate::core::{Function, NativeFn};
pub use gc::GcStats;
pub use state::State;
