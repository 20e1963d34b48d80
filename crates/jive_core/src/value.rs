//! Scripting value representation.
//!
//! Values crossing the boundary are a tagged variant: every coercion checks the
//! tag before it looks at the payload.

use crate::gc::ObjectId;
use std::fmt;
use std::rc::Rc;

/// Type tag of a stack slot.
///
/// `None` is reported for an index that does not name a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    None,
    Nil,
    Boolean,
    LightUserdata,
    Number,
    String,
    Table,
    Function,
    Userdata,
    Thread,
}

impl ValueType {
    /// Script-visible name of the type.
    pub fn name(self) -> &'static str {
        match self {
            ValueType::None => "no value",
            ValueType::Nil => "nil",
            ValueType::Boolean => "boolean",
            ValueType::LightUserdata | ValueType::Userdata => "userdata",
            ValueType::Number => "number",
            ValueType::String => "string",
            ValueType::Table => "table",
            ValueType::Function => "function",
            ValueType::Thread => "thread",
        }
    }

    /// True for types whose values live on the heap or are opaque addresses.
    pub fn is_composite(self) -> bool {
        matches!(
            self,
            ValueType::Table
                | ValueType::Function
                | ValueType::Userdata
                | ValueType::Thread
                | ValueType::LightUserdata
        )
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A dynamically-typed scripting value.
#[derive(Clone, Debug, Default)]
pub enum Value {
    #[default]
    Nil,
    Boolean(bool),
    Number(f64),
    Str(Rc<str>),
    Table(ObjectId),
    Function(ObjectId),
    Userdata(ObjectId),
    LightUserdata(usize),
    Thread(ObjectId),
}

impl Value {
    pub fn str(s: &str) -> Self {
        Value::Str(Rc::from(s))
    }

    #[inline]
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Nil => ValueType::Nil,
            Value::Boolean(_) => ValueType::Boolean,
            Value::Number(_) => ValueType::Number,
            Value::Str(_) => ValueType::String,
            Value::Table(_) => ValueType::Table,
            Value::Function(_) => ValueType::Function,
            Value::Userdata(_) => ValueType::Userdata,
            Value::LightUserdata(_) => ValueType::LightUserdata,
            Value::Thread(_) => ValueType::Thread,
        }
    }

    #[inline]
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Only nil and false are falsy.
    #[inline]
    pub fn truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Boolean(false))
    }

    /// Heap handle for collectable values.
    #[inline]
    pub fn obj_id(&self) -> Option<ObjectId> {
        match self {
            Value::Table(id) | Value::Function(id) | Value::Userdata(id) | Value::Thread(id) => {
                Some(*id)
            }
            _ => None,
        }
    }

    /// Raw equality: no metamethods, heap values compare by identity.
    pub fn raw_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::LightUserdata(a), Value::LightUserdata(b)) => a == b,
            (Value::Table(a), Value::Table(b))
            | (Value::Function(a), Value::Function(b))
            | (Value::Userdata(a), Value::Userdata(b))
            | (Value::Thread(a), Value::Thread(b)) => a == b,
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Number(i as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::str(s)
    }
}

/// Parse a numeric string the way the scripting language coerces it:
/// surrounding whitespace is ignored and `0x` prefixes are hexadecimal.
pub fn str_to_number(s: &str) -> Option<f64> {
    let t = s.trim();
    if t.is_empty() {
        return None;
    }
    let (neg, body) = match t.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, t.strip_prefix('+').unwrap_or(t)),
    };
    if let Some(hex) = body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
        let n = u64::from_str_radix(hex, 16).ok()? as f64;
        return Some(if neg { -n } else { n });
    }
    // Rust accepts "inf"/"nan" spellings the scripting language does not.
    if !body.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return None;
    }
    t.parse::<f64>().ok()
}

/// Truncate a number toward zero; `None` for NaN and values outside `i64`.
pub fn number_to_integer(n: f64) -> Option<i64> {
    if n.is_nan() {
        return None;
    }
    let t = n.trunc();
    if t < i64::MIN as f64 || t >= i64::MAX as f64 {
        return None;
    }
    Some(t as i64)
}
