//! Heap of collectable objects and the mark/sweep machinery.

use jive_core::{Finalizer, ObjectId, ScriptError, Value};

use super::table::Table;
use crate::State;
use crate::config::StateConfig;

/// A native function: arguments are slots `1..=n` of its own frame, and the
/// returned count names how many values at the top of the frame are results.
pub type NativeFn = fn(&mut State) -> Result<i32, ScriptError>;

#[derive(Clone, Copy)]
pub enum Function {
    Native(NativeFn),
    /// Release hook that runs on the bytes of the userdata it is called with.
    Finalizer(Finalizer),
}

/// A native-backed block owned by the collector.
pub struct Userdata {
    pub(crate) data: Box<[u8]>,
    pub(crate) metatable: Option<ObjectId>,
    pub(crate) finalized: bool,
}

impl Userdata {
    pub fn zeroed(size: usize) -> Self {
        Self {
            data: vec![0u8; size].into_boxed_slice(),
            metatable: None,
            finalized: false,
        }
    }
}

pub enum ManagedObject {
    Table(Box<Table>),
    Userdata(Box<Userdata>),
    Function(Box<Function>),
}

impl ManagedObject {
    pub fn size(&self) -> usize {
        // Base size of the enum variant + deep size estimation
        let base = std::mem::size_of::<ManagedObject>();
        let deep = match self {
            ManagedObject::Table(t) => {
                t.array.capacity() * std::mem::size_of::<Value>()
                    + t.hash.capacity() * (std::mem::size_of::<Value>() * 2 + 16)
                    + 64
            }
            ManagedObject::Userdata(u) => u.data.len() + std::mem::size_of::<Userdata>(),
            ManagedObject::Function(_) => std::mem::size_of::<Function>(),
        };
        base + deep
    }

    /// Address of the boxed payload; stable for the object's lifetime.
    pub fn address(&self) -> usize {
        match self {
            ManagedObject::Table(t) => &**t as *const Table as usize,
            ManagedObject::Userdata(u) => &**u as *const Userdata as usize,
            ManagedObject::Function(f) => &**f as *const Function as usize,
        }
    }

    fn metatable(&self) -> Option<ObjectId> {
        match self {
            ManagedObject::Table(t) => t.metatable,
            ManagedObject::Userdata(u) => u.metatable,
            ManagedObject::Function(_) => None,
        }
    }
}

pub struct Heap {
    pub(crate) objects: Vec<Option<ManagedObject>>,
    free_list: Vec<usize>,
    marks: Vec<u64>,
    pub(crate) alloc_count: usize,
    pub(crate) gc_threshold: usize,
    pub(crate) alloc_bytes: usize,
    pub(crate) gc_threshold_bytes: usize,
    min_threshold: usize,
    min_threshold_bytes: usize,
}

impl Heap {
    pub fn new(config: &StateConfig) -> Self {
        Self {
            objects: Vec::with_capacity(256),
            free_list: Vec::new(),
            marks: Vec::new(),
            alloc_count: 0,
            gc_threshold: config.gc_threshold,
            alloc_bytes: 0,
            gc_threshold_bytes: config.gc_threshold_bytes,
            min_threshold: config.gc_threshold,
            min_threshold_bytes: config.gc_threshold_bytes,
        }
    }

    /// Allocate a managed object on the heap.
    pub fn alloc(&mut self, obj: ManagedObject) -> ObjectId {
        self.alloc_count += 1;
        self.alloc_bytes += obj.size();

        if let Some(id) = self.free_list.pop() {
            self.objects[id] = Some(obj);
            ObjectId(id)
        } else {
            let id = self.objects.len();
            self.objects.push(Some(obj));
            ObjectId(id)
        }
    }

    #[inline]
    pub fn should_gc(&self) -> bool {
        self.alloc_count >= self.gc_threshold || self.alloc_bytes >= self.gc_threshold_bytes
    }

    pub fn get(&self, id: ObjectId) -> Option<&ManagedObject> {
        self.objects.get(id.0).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut ManagedObject> {
        self.objects.get_mut(id.0).and_then(Option::as_mut)
    }

    pub fn table(&self, id: ObjectId) -> Option<&Table> {
        match self.get(id) {
            Some(ManagedObject::Table(t)) => Some(t),
            _ => None,
        }
    }

    pub fn table_mut(&mut self, id: ObjectId) -> Option<&mut Table> {
        match self.get_mut(id) {
            Some(ManagedObject::Table(t)) => Some(t),
            _ => None,
        }
    }

    pub fn userdata(&self, id: ObjectId) -> Option<&Userdata> {
        match self.get(id) {
            Some(ManagedObject::Userdata(u)) => Some(u),
            _ => None,
        }
    }

    pub fn userdata_mut(&mut self, id: ObjectId) -> Option<&mut Userdata> {
        match self.get_mut(id) {
            Some(ManagedObject::Userdata(u)) => Some(u),
            _ => None,
        }
    }

    pub fn function(&self, id: ObjectId) -> Option<Function> {
        match self.get(id) {
            Some(ManagedObject::Function(f)) => Some(**f),
            _ => None,
        }
    }

    /// Metatable of a table or userdata.
    pub fn metatable_of(&self, v: &Value) -> Option<ObjectId> {
        match v {
            Value::Table(id) | Value::Userdata(id) => self.get(*id).and_then(ManagedObject::metatable),
            _ => None,
        }
    }

    /// Raw lookup of `event` in the metatable of `v`.
    pub fn metamethod(&self, v: &Value, event: &str) -> Value {
        self.metatable_of(v)
            .and_then(|mt| self.table(mt))
            .map(|mt| mt.get_str(event))
            .unwrap_or_default()
    }

    pub fn live_count(&self) -> usize {
        self.objects.iter().filter(|o| o.is_some()).count()
    }

    pub fn is_marked(&self, id: ObjectId) -> bool {
        let word = id.0 >> 6;
        let bit = id.0 & 63;
        self.marks
            .get(word)
            .is_some_and(|w| (w & (1 << bit)) != 0)
    }

    fn set_mark(&mut self, id: ObjectId) -> bool {
        let word = id.0 >> 6;
        let bit = id.0 & 63;
        if word >= self.marks.len() {
            self.marks.resize(word + 1, 0);
        }
        let w = &mut self.marks[word];
        let mask = 1 << bit;
        if (*w & mask) != 0 {
            return false;
        }
        *w |= mask;
        true
    }

    /// Mark everything reachable from `roots`, clearing previous marks first.
    pub(crate) fn mark_all(&mut self, roots: &[ObjectId]) {
        self.marks.clear();

        let mut pending: Vec<ObjectId> = roots.to_vec();
        while let Some(id) = pending.pop() {
            if self.get(id).is_none() || !self.set_mark(id) {
                continue;
            }
            match &self.objects[id.0] {
                Some(ManagedObject::Table(t)) => {
                    pending.extend(t.values().filter_map(Value::obj_id));
                    pending.extend(t.keys().filter_map(|k| k.to_value().obj_id()));
                    pending.extend(t.metatable);
                }
                Some(ManagedObject::Userdata(u)) => pending.extend(u.metatable),
                Some(ManagedObject::Function(_)) | None => {}
            }
        }
    }

    /// Unmarked userdata whose metatable carries a `__gc` handler that has not run yet.
    pub(crate) fn pending_finalizers(&self, only_unmarked: bool) -> Vec<ObjectId> {
        let mut out = Vec::new();
        for (i, slot) in self.objects.iter().enumerate() {
            let Some(ManagedObject::Userdata(u)) = slot else {
                continue;
            };
            if u.finalized || (only_unmarked && self.is_marked(ObjectId(i))) {
                continue;
            }
            if !self.metamethod(&Value::Userdata(ObjectId(i)), "__gc").is_nil() {
                out.push(ObjectId(i));
            }
        }
        out
    }

    /// Sweep unmarked objects and update thresholds. Returns the number freed.
    pub fn sweep(&mut self) -> usize {
        let mut live_bytes = 0;
        let mut live_count = 0;
        let mut freed = 0;

        self.free_list.clear();

        for i in 0..self.objects.len() {
            if let Some(obj) = &self.objects[i] {
                if !self.is_marked(ObjectId(i)) {
                    self.objects[i] = None;
                    self.free_list.push(i);
                    freed += 1;
                } else {
                    live_bytes += obj.size();
                    live_count += 1;
                }
            } else {
                self.free_list.push(i);
            }
        }

        // Truncate trailing empty slots to reduce memory usage
        while self.objects.last().is_some_and(|o| o.is_none()) {
            self.objects.pop();
        }
        let new_len = self.objects.len();
        self.free_list.retain(|&i| i < new_len);

        self.marks.clear();

        self.alloc_count = 0;
        self.alloc_bytes = live_bytes;

        self.gc_threshold = (live_count * 2).max(self.min_threshold);
        self.gc_threshold_bytes = (live_bytes * 2).max(self.min_threshold_bytes);

        freed
    }
}
