//! Core state infrastructure.
//!
//! - `Heap` and GC marking - object storage and reachability
//! - `Table` - The scripting language's associative array
//! - `Function` / `Userdata` - Native callables and native-backed blocks

pub mod heap;
pub mod table;

pub use heap::{Function, Heap, ManagedObject, NativeFn, Userdata};
pub use table::{FastHashMap, Table, TableKey};
