//! The scripting state: value stack, globals and the metatable registry.

use jive_core::value::{number_to_integer, str_to_number};
use jive_core::{Finalizer, ObjectId, ScriptError, ScriptStack, UserdataId, Value, ValueType};
use smallvec::SmallVec;

use crate::config::StateConfig;
use crate::core::table::fast_map_new;
use crate::core::{FastHashMap, Function, Heap, ManagedObject, NativeFn, Table, TableKey, Userdata};
use crate::errors::messages::{BAD_METATABLE, NO_METATABLE_SLOT};
use crate::gc::GcStats;

pub struct State {
    pub(crate) heap: Heap,
    pub(crate) stack: SmallVec<[Value; 32]>,
    /// Position of slot 1 of the current frame.
    pub(crate) base: usize,
    pub(crate) globals: ObjectId,
    /// Metatables registered by tag.
    pub(crate) registry: FastHashMap<String, ObjectId>,
    pub(crate) config: StateConfig,
    pub(crate) stats: GcStats,
    pub(crate) in_gc: bool,
    pub(crate) closed: bool,
}

impl State {
    pub fn new() -> Self {
        Self::with_config(StateConfig::default())
    }

    pub fn with_config(config: StateConfig) -> Self {
        let mut heap = Heap::new(&config);
        let globals = heap.alloc(ManagedObject::Table(Box::new(Table::new())));
        Self {
            heap,
            stack: SmallVec::new(),
            base: 0,
            globals,
            registry: fast_map_new(),
            config,
            stats: GcStats::default(),
            in_gc: false,
            closed: false,
        }
    }

    pub fn config(&self) -> &StateConfig {
        &self.config
    }

    /// Position in `stack` of the slot named by `idx`.
    pub(crate) fn slot(&self, idx: i32) -> Option<usize> {
        let len = self.stack.len();
        if idx > 0 {
            let pos = self.base + idx as usize - 1;
            (pos < len).then_some(pos)
        } else if idx < 0 {
            let back = idx.unsigned_abs() as usize;
            (back <= len - self.base).then(|| len - back)
        } else {
            None
        }
    }

    pub(crate) fn value_at(&self, idx: i32) -> Option<&Value> {
        self.slot(idx).map(|pos| &self.stack[pos])
    }

    fn require(&self, idx: i32) -> Result<Value, ScriptError> {
        self.value_at(idx).cloned().ok_or(ScriptError::InvalidIndex(idx))
    }

    fn require_table(&self, idx: i32) -> Result<ObjectId, ScriptError> {
        match self.value_at(idx) {
            Some(Value::Table(id)) => Ok(*id),
            other => Err(ScriptError::type_mismatch(
                self.abs_index(idx),
                ValueType::Table.name(),
                other.map_or(ValueType::None, Value::value_type).name(),
            )),
        }
    }

    #[inline]
    pub fn push(&mut self, v: Value) {
        self.stack.push(v);
    }

    /// Allocate, collecting first if the heap has crossed its thresholds.
    pub(crate) fn alloc(&mut self, obj: ManagedObject) -> ObjectId {
        if self.config.auto_gc && !self.in_gc && self.heap.should_gc() {
            self.collect_garbage();
        }
        self.heap.alloc(obj)
    }

    pub fn push_integer(&mut self, i: i64) {
        self.push(Value::Number(i as f64));
    }

    pub fn push_light_userdata(&mut self, p: usize) {
        self.push(Value::LightUserdata(p));
    }

    pub fn push_function(&mut self, f: NativeFn) {
        let id = self.alloc(ManagedObject::Function(Box::new(Function::Native(f))));
        self.push(Value::Function(id));
    }

    /// Install `f` as the global `name`.
    pub fn register(&mut self, name: &str, f: NativeFn) -> Result<(), ScriptError> {
        self.push_function(f);
        self.set_global(name)
    }

    /// Pop a key and push `t[key]` for the table at `idx`, without metamethods.
    pub fn raw_get(&mut self, idx: i32) -> Result<ValueType, ScriptError> {
        let id = self.require_table(idx)?;
        let key = self.require(-1)?;
        let v = match TableKey::from_value(&key) {
            Ok(k) => self.heap.table(id).ok_or(ScriptError::InvalidHandle)?.get(&k),
            Err(_) => Value::Nil,
        };
        let t = v.value_type();
        self.stack.pop();
        self.push(v);
        Ok(t)
    }

    /// Pop a value and a key, assigning `t[key] = value` without metamethods.
    pub fn raw_set(&mut self, idx: i32) -> Result<(), ScriptError> {
        let id = self.require_table(idx)?;
        let key = self.require(-2)?;
        let val = self.require(-1)?;
        let key = TableKey::from_value(&key).map_err(|m| ScriptError::Runtime(m.to_string()))?;
        self.heap.table_mut(id).ok_or(ScriptError::InvalidHandle)?.set(key, val);
        self.pop(2);
        Ok(())
    }

    /// Length of the sequence part of the table at `idx`.
    pub fn raw_len(&self, idx: i32) -> usize {
        match self.value_at(idx) {
            Some(Value::Table(id)) => self.heap.table(*id).map_or(0, Table::len),
            _ => 0,
        }
    }

    /// Number of objects currently on the heap.
    pub fn live_objects(&self) -> usize {
        self.heap.live_count()
    }

    pub fn gc_stats(&self) -> GcStats {
        self.stats
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

/// String form of a number: integral values print without a fraction.
pub(crate) fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        return "nan".to_string();
    }
    if n.fract() == 0.0 && n.abs() < 1e15 {
        let mut buf = itoa::Buffer::new();
        return buf.format(n as i64).to_string();
    }
    let mut buf = ryu::Buffer::new();
    buf.format(n).to_string()
}

impl ScriptStack for State {
    fn get_top(&self) -> i32 {
        (self.stack.len() - self.base) as i32
    }

    fn set_top(&mut self, idx: i32) {
        let len = self.stack.len();
        let new_len = if idx >= 0 {
            self.base + idx as usize
        } else {
            let back = (idx.unsigned_abs() as usize - 1).min(len - self.base);
            len - back
        };
        self.stack.resize(new_len, Value::Nil);
    }

    fn type_of(&self, idx: i32) -> ValueType {
        self.value_at(idx).map_or(ValueType::None, Value::value_type)
    }

    fn to_number(&self, idx: i32) -> Option<f64> {
        match self.value_at(idx)? {
            Value::Number(n) => Some(*n),
            Value::Str(s) => str_to_number(s),
            _ => None,
        }
    }

    fn to_integer(&self, idx: i32) -> Option<i64> {
        self.to_number(idx).and_then(number_to_integer)
    }

    fn to_boolean(&self, idx: i32) -> bool {
        self.value_at(idx).is_some_and(Value::truthy)
    }

    fn to_str(&self, idx: i32) -> Option<String> {
        match self.value_at(idx)? {
            Value::Str(s) => Some(s.to_string()),
            Value::Number(n) => Some(number_to_string(*n)),
            _ => None,
        }
    }

    fn to_pointer(&self, idx: i32) -> usize {
        match self.value_at(idx) {
            Some(Value::LightUserdata(p)) => *p,
            Some(v) => v
                .obj_id()
                .and_then(|id| self.heap.get(id))
                .map_or(0, ManagedObject::address),
            None => 0,
        }
    }

    fn to_userdata(&self, idx: i32) -> Option<UserdataId> {
        match self.value_at(idx)? {
            Value::Userdata(id) => Some(UserdataId(*id)),
            _ => None,
        }
    }

    fn raw_equal(&self, a: i32, b: i32) -> bool {
        match (self.value_at(a), self.value_at(b)) {
            (Some(x), Some(y)) => x.raw_eq(y),
            _ => false,
        }
    }

    fn userdata_bytes(&self, ud: UserdataId) -> Option<&[u8]> {
        self.heap.userdata(ud.object()).map(|u| &*u.data)
    }

    fn userdata_bytes_mut(&mut self, ud: UserdataId) -> Option<&mut [u8]> {
        self.heap.userdata_mut(ud.object()).map(|u| &mut *u.data)
    }

    fn push_nil(&mut self) {
        self.push(Value::Nil);
    }

    fn push_number(&mut self, n: f64) {
        self.push(Value::Number(n));
    }

    fn push_boolean(&mut self, b: bool) {
        self.push(Value::Boolean(b));
    }

    fn push_string(&mut self, s: &str) {
        self.push(Value::str(s));
    }

    fn push_value(&mut self, idx: i32) {
        let v = self.value_at(idx).cloned().unwrap_or_default();
        self.push(v);
    }

    fn push_finalizer(&mut self, f: Finalizer) {
        let id = self.alloc(ManagedObject::Function(Box::new(Function::Finalizer(f))));
        self.push(Value::Function(id));
    }

    fn new_table(&mut self) {
        let id = self.alloc(ManagedObject::Table(Box::new(Table::new())));
        self.push(Value::Table(id));
    }

    fn new_userdata(&mut self, size: usize) -> UserdataId {
        let id = self.alloc(ManagedObject::Userdata(Box::new(Userdata::zeroed(size))));
        self.push(Value::Userdata(id));
        UserdataId(id)
    }

    fn replace(&mut self, idx: i32) -> Result<(), ScriptError> {
        let pos = self.slot(idx).ok_or(ScriptError::InvalidIndex(idx))?;
        let v = self.require(-1)?;
        self.stack[pos] = v;
        self.stack.pop();
        Ok(())
    }

    fn get_field(&mut self, idx: i32, key: &str) -> Result<ValueType, ScriptError> {
        let obj = self
            .value_at(idx)
            .cloned()
            .ok_or(ScriptError::NotIndexable(ValueType::None.name()))?;
        let v = self.index_value(obj, Value::str(key))?;
        let t = v.value_type();
        self.push(v);
        Ok(t)
    }

    fn set_field(&mut self, idx: i32, key: &str) -> Result<(), ScriptError> {
        let obj = self
            .value_at(idx)
            .cloned()
            .ok_or(ScriptError::NotIndexable(ValueType::None.name()))?;
        // The value stays on the stack (rooted) until the store completes.
        let val = self.require(-1)?;
        self.newindex_value(obj, Value::str(key), val)?;
        self.stack.pop();
        Ok(())
    }

    fn raw_get_field(&mut self, idx: i32, key: &str) -> Result<ValueType, ScriptError> {
        let id = self.require_table(idx)?;
        let v = self.heap.table(id).ok_or(ScriptError::InvalidHandle)?.get_str(key);
        let t = v.value_type();
        self.push(v);
        Ok(t)
    }

    fn raw_get_i(&mut self, idx: i32, n: i64) -> Result<ValueType, ScriptError> {
        let id = self.require_table(idx)?;
        let v = self.heap.table(id).ok_or(ScriptError::InvalidHandle)?.get_int(n);
        let t = v.value_type();
        self.push(v);
        Ok(t)
    }

    fn raw_set_i(&mut self, idx: i32, n: i64) -> Result<(), ScriptError> {
        let id = self.require_table(idx)?;
        let val = self.require(-1)?;
        self.heap
            .table_mut(id)
            .ok_or(ScriptError::InvalidHandle)?
            .set(TableKey::Int(n), val);
        self.stack.pop();
        Ok(())
    }

    fn get_global(&mut self, name: &str) -> Result<ValueType, ScriptError> {
        let v = self.index_value(Value::Table(self.globals), Value::str(name))?;
        let t = v.value_type();
        self.push(v);
        Ok(t)
    }

    fn set_global(&mut self, name: &str) -> Result<(), ScriptError> {
        let val = self.require(-1)?;
        self.newindex_value(Value::Table(self.globals), Value::str(name), val)?;
        self.stack.pop();
        Ok(())
    }

    fn get_metatable(&mut self, idx: i32) -> bool {
        let mt = self.value_at(idx).and_then(|v| self.heap.metatable_of(v));
        match mt {
            Some(id) => {
                self.push(Value::Table(id));
                true
            }
            None => false,
        }
    }

    fn set_metatable(&mut self, idx: i32) -> Result<(), ScriptError> {
        let target = self.require(idx)?;
        let mt = match self.require(-1)? {
            Value::Table(id) => Some(id),
            Value::Nil => None,
            _ => return Err(ScriptError::Runtime(BAD_METATABLE.to_string())),
        };
        let slot = match target {
            Value::Table(id) => self.heap.table_mut(id).map(|t| &mut t.metatable),
            Value::Userdata(id) => self.heap.userdata_mut(id).map(|u| &mut u.metatable),
            _ => return Err(ScriptError::Runtime(NO_METATABLE_SLOT.to_string())),
        };
        *slot.ok_or(ScriptError::InvalidHandle)? = mt;
        self.stack.pop();
        Ok(())
    }

    fn new_metatable(&mut self, tag: &str) -> bool {
        if let Some(&id) = self.registry.get(tag) {
            self.push(Value::Table(id));
            return false;
        }
        let mut mt = Table::new();
        mt.set(TableKey::str("__name"), Value::str(tag));
        let id = self.alloc(ManagedObject::Table(Box::new(mt)));
        self.registry.insert(tag.to_string(), id);
        self.push(Value::Table(id));
        true
    }

    fn push_registered_metatable(&mut self, tag: &str) -> ValueType {
        match self.registry.get(tag) {
            Some(&id) => {
                self.push(Value::Table(id));
                ValueType::Table
            }
            None => {
                self.push(Value::Nil);
                ValueType::Nil
            }
        }
    }
}
