//! Calling native functions and resolving `__index` / `__newindex`.

use jive_core::{ScriptError, ScriptStack, Value};
use smallvec::SmallVec;

use crate::State;
use crate::core::{Function, NativeFn, TableKey};
use crate::errors::messages::C_STACK_UNDERFLOW;

/// Bound on metamethod chains, so a cyclic `__index` cannot hang the state.
const MAX_TAG_LOOP: usize = 100;

/// Pass every result of a call through.
pub const MULTRET: i32 = -1;

type Results = SmallVec<[Value; 4]>;

impl State {
    /// Call the function at `-(nargs + 1)` with the `nargs` values above it.
    ///
    /// The function and its arguments are popped; `nresults` results are pushed,
    /// padded with nils, or every result for [`MULTRET`]. On error the function
    /// and arguments are still popped.
    pub fn call(&mut self, nargs: i32, nresults: i32) -> Result<(), ScriptError> {
        if nargs < 0 || nargs >= self.get_top() {
            return Err(ScriptError::Runtime(C_STACK_UNDERFLOW.to_string()));
        }
        let func_pos = self.stack.len() - nargs as usize - 1;
        let func = self.stack[func_pos].clone();
        let args: SmallVec<[Value; 8]> = self.stack[func_pos + 1..].iter().cloned().collect();
        let results = self.call_value(func, &args);
        self.stack.truncate(func_pos);
        let mut results = results?;
        if nresults != MULTRET {
            results.resize(nresults.max(0) as usize, Value::Nil);
        }
        self.stack.extend(results);
        Ok(())
    }

    pub(crate) fn call_value(&mut self, func: Value, args: &[Value]) -> Result<Results, ScriptError> {
        let Value::Function(id) = func else {
            return Err(ScriptError::NotCallable(func.value_type().name()));
        };
        match self.heap.function(id).ok_or(ScriptError::InvalidHandle)? {
            Function::Native(f) => self.call_native(f, args),
            Function::Finalizer(fin) => {
                if let Some(Value::Userdata(ud)) = args.first() {
                    if let Some(u) = self.heap.userdata_mut(*ud) {
                        fin(&mut u.data);
                    }
                }
                Ok(Results::new())
            }
        }
    }

    // Runs `f` in a fresh frame holding `args`.
    fn call_native(&mut self, f: NativeFn, args: &[Value]) -> Result<Results, ScriptError> {
        let saved_base = self.base;
        let frame = self.stack.len();
        self.stack.extend(args.iter().cloned());
        self.base = frame;

        let out = f(self).map(|n| {
            let available = self.stack.len() - frame;
            let n = (n.max(0) as usize).min(available);
            self.stack[self.stack.len() - n..].iter().cloned().collect()
        });

        self.stack.truncate(frame);
        self.base = saved_base;
        out
    }

    /// `obj[key]`, consulting `__index` when the raw lookup finds nothing.
    pub(crate) fn index_value(&mut self, obj: Value, key: Value) -> Result<Value, ScriptError> {
        let mut cur = obj;
        for _ in 0..MAX_TAG_LOOP {
            if let Value::Table(id) = cur {
                let table = self.heap.table(id).ok_or(ScriptError::InvalidHandle)?;
                let raw = match TableKey::from_value(&key) {
                    Ok(k) => table.get(&k),
                    Err(_) => Value::Nil,
                };
                if !raw.is_nil() {
                    return Ok(raw);
                }
                let handler = self.heap.metamethod(&cur, "__index");
                if handler.is_nil() {
                    return Ok(Value::Nil);
                }
                if let Value::Function(_) = handler {
                    return self.call_first(handler, &[cur, key]);
                }
                cur = handler;
                continue;
            }
            let handler = self.heap.metamethod(&cur, "__index");
            match handler {
                Value::Nil => return Err(ScriptError::NotIndexable(cur.value_type().name())),
                Value::Function(_) => return self.call_first(handler, &[cur, key]),
                _ => cur = handler,
            }
        }
        Err(ScriptError::IndexChainTooDeep)
    }

    /// `obj[key] = val`, consulting `__newindex` when the key is absent.
    pub(crate) fn newindex_value(&mut self, obj: Value, key: Value, val: Value) -> Result<(), ScriptError> {
        let mut cur = obj;
        for _ in 0..MAX_TAG_LOOP {
            if let Value::Table(id) = cur {
                let tk = TableKey::from_value(&key).map_err(|m| ScriptError::Runtime(m.to_string()))?;
                let present = !self.heap.table(id).ok_or(ScriptError::InvalidHandle)?.get(&tk).is_nil();
                let handler = if present {
                    Value::Nil
                } else {
                    self.heap.metamethod(&cur, "__newindex")
                };
                match handler {
                    Value::Nil => {
                        self.heap.table_mut(id).ok_or(ScriptError::InvalidHandle)?.set(tk, val);
                        return Ok(());
                    }
                    Value::Function(_) => {
                        self.call_value(handler, &[cur, key, val])?;
                        return Ok(());
                    }
                    _ => cur = handler,
                }
                continue;
            }
            let handler = self.heap.metamethod(&cur, "__newindex");
            match handler {
                Value::Nil => return Err(ScriptError::NotIndexable(cur.value_type().name())),
                Value::Function(_) => {
                    self.call_value(handler, &[cur, key, val])?;
                    return Ok(());
                }
                _ => cur = handler,
            }
        }
        Err(ScriptError::IndexChainTooDeep)
    }

    fn call_first(&mut self, func: Value, args: &[Value]) -> Result<Value, ScriptError> {
        Ok(self.call_value(func, args)?.into_iter().next().unwrap_or_default())
    }
}
