//! Tables: an array part for keys `1..n` and a hash part for everything else.

use ahash::RandomState;
use hashbrown::{Equivalent, HashMap};
use jive_core::value::number_to_integer;
use jive_core::{ObjectId, Value};
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::errors::messages::{TABLE_INDEX_IS_NAN, TABLE_INDEX_IS_NIL};

pub type FastHashMap<K, V> = HashMap<K, V, RandomState>;

pub fn fast_hasher() -> RandomState {
    RandomState::with_seeds(0, 0, 0, 0)
}

pub fn fast_map_new<K: Eq + Hash, V>() -> FastHashMap<K, V> {
    HashMap::with_hasher(fast_hasher())
}

/// Hashable form of a non-nil, non-NaN value.
///
/// Integral numbers normalize to `Int` so `t[1]` and `t[1.0]` name the same slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TableKey {
    Bool(bool),
    Int(i64),
    Float(u64),
    Str(Rc<str>),
    Table(ObjectId),
    Function(ObjectId),
    Userdata(ObjectId),
    Thread(ObjectId),
    Light(usize),
}

impl TableKey {
    pub fn from_value(v: &Value) -> Result<TableKey, &'static str> {
        Ok(match v {
            Value::Nil => return Err(TABLE_INDEX_IS_NIL),
            Value::Boolean(b) => TableKey::Bool(*b),
            Value::Number(n) => {
                if n.is_nan() {
                    return Err(TABLE_INDEX_IS_NAN);
                }
                match number_to_integer(*n) {
                    Some(i) if i as f64 == *n => TableKey::Int(i),
                    _ => TableKey::Float(n.to_bits()),
                }
            }
            Value::Str(s) => TableKey::Str(s.clone()),
            Value::Table(id) => TableKey::Table(*id),
            Value::Function(id) => TableKey::Function(*id),
            Value::Userdata(id) => TableKey::Userdata(*id),
            Value::Thread(id) => TableKey::Thread(*id),
            Value::LightUserdata(p) => TableKey::Light(*p),
        })
    }

    pub fn str(s: &str) -> TableKey {
        TableKey::Str(Rc::from(s))
    }

    pub fn to_value(&self) -> Value {
        match self {
            TableKey::Bool(b) => Value::Boolean(*b),
            TableKey::Int(i) => Value::Number(*i as f64),
            TableKey::Float(bits) => Value::Number(f64::from_bits(*bits)),
            TableKey::Str(s) => Value::Str(s.clone()),
            TableKey::Table(id) => Value::Table(*id),
            TableKey::Function(id) => Value::Function(*id),
            TableKey::Userdata(id) => Value::Userdata(*id),
            TableKey::Thread(id) => Value::Thread(*id),
            TableKey::Light(p) => Value::LightUserdata(*p),
        }
    }
}

impl Hash for TableKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            TableKey::Bool(b) => {
                state.write_u8(0);
                b.hash(state);
            }
            TableKey::Int(i) => {
                state.write_u8(1);
                i.hash(state);
            }
            TableKey::Float(bits) => {
                state.write_u8(2);
                bits.hash(state);
            }
            TableKey::Str(s) => {
                state.write_u8(3);
                (**s).hash(state);
            }
            TableKey::Table(id)
            | TableKey::Function(id)
            | TableKey::Userdata(id)
            | TableKey::Thread(id) => {
                state.write_u8(4);
                id.hash(state);
            }
            TableKey::Light(p) => {
                state.write_u8(5);
                p.hash(state);
            }
        }
    }
}

/// Borrowed string key, hashed identically to `TableKey::Str`.
struct StrKey<'a>(&'a str);

impl Hash for StrKey<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u8(3);
        self.0.hash(state);
    }
}

impl Equivalent<TableKey> for StrKey<'_> {
    fn equivalent(&self, key: &TableKey) -> bool {
        matches!(key, TableKey::Str(s) if &**s == self.0)
    }
}

#[derive(Clone)]
pub struct Table {
    pub(crate) array: Vec<Value>,
    pub(crate) hash: FastHashMap<TableKey, Value>,
    pub(crate) metatable: Option<ObjectId>,
}

impl Default for Table {
    fn default() -> Self {
        Self::new()
    }
}

impl Table {
    pub fn new() -> Self {
        Self {
            array: Vec::new(),
            hash: fast_map_new(),
            metatable: None,
        }
    }

    #[inline]
    fn array_slot(&self, i: i64) -> Option<usize> {
        if i >= 1 && (i as u64) <= self.array.len() as u64 {
            Some(i as usize - 1)
        } else {
            None
        }
    }

    pub fn get(&self, key: &TableKey) -> Value {
        if let TableKey::Int(i) = key {
            if let Some(slot) = self.array_slot(*i) {
                return self.array[slot].clone();
            }
        }
        self.hash.get(key).cloned().unwrap_or_default()
    }

    pub fn get_int(&self, i: i64) -> Value {
        match self.array_slot(i) {
            Some(slot) => self.array[slot].clone(),
            None => self.hash.get(&TableKey::Int(i)).cloned().unwrap_or_default(),
        }
    }

    pub fn get_str(&self, key: &str) -> Value {
        self.hash.get(&StrKey(key)).cloned().unwrap_or_default()
    }

    /// Assign `t[key] = value`; assigning nil removes the entry.
    pub fn set(&mut self, key: TableKey, value: Value) {
        if let TableKey::Int(i) = key {
            if let Some(slot) = self.array_slot(i) {
                if value.is_nil() && slot + 1 == self.array.len() {
                    self.array.pop();
                    while self.array.last().is_some_and(Value::is_nil) {
                        self.array.pop();
                    }
                } else {
                    self.array[slot] = value;
                }
                return;
            }
            if i == self.array.len() as i64 + 1 && !value.is_nil() {
                self.hash.remove(&key);
                self.array.push(value);
                self.migrate_from_hash();
                return;
            }
        }
        if value.is_nil() {
            self.hash.remove(&key);
        } else {
            self.hash.insert(key, value);
        }
    }

    // Pull now-contiguous integer keys out of the hash part.
    fn migrate_from_hash(&mut self) {
        loop {
            let next = TableKey::Int(self.array.len() as i64 + 1);
            match self.hash.remove(&next) {
                Some(v) => self.array.push(v),
                None => break,
            }
        }
    }

    /// Border of the sequence part.
    pub fn len(&self) -> usize {
        self.array.len()
    }

    pub fn is_empty(&self) -> bool {
        self.array.is_empty() && self.hash.is_empty()
    }

    pub(crate) fn values(&self) -> impl Iterator<Item = &Value> {
        self.array.iter().chain(self.hash.values())
    }

    pub(crate) fn keys(&self) -> impl Iterator<Item = &TableKey> {
        self.hash.keys()
    }
}
