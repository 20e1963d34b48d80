//! Collection cycles, finalization and state close.

use jive_core::{ObjectId, Value};

use crate::State;

/// Running totals across collections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GcStats {
    pub collections: usize,
    pub freed: usize,
    pub finalized: usize,
}

impl State {
    fn gc_roots(&self) -> Vec<ObjectId> {
        let mut roots: Vec<ObjectId> = self.stack.iter().filter_map(Value::obj_id).collect();
        roots.push(self.globals);
        roots.extend(self.registry.values().copied());
        roots
    }

    /// Run a full collection.
    ///
    /// Unreachable userdata with a `__gc` handler are finalized first; the heap
    /// is then re-marked so anything a finalizer made reachable again survives.
    /// A finalized block is never finalized twice.
    pub fn collect_garbage(&mut self) {
        if self.in_gc {
            return;
        }
        self.in_gc = true;

        let roots = self.gc_roots();
        self.heap.mark_all(&roots);

        let pending = self.heap.pending_finalizers(true);
        for &id in &pending {
            self.run_finalizer(id);
        }
        if !pending.is_empty() {
            let roots = self.gc_roots();
            self.heap.mark_all(&roots);
        }
        let freed = self.heap.sweep();

        self.stats.collections += 1;
        self.stats.freed += freed;
        self.stats.finalized += pending.len();
        if self.config.trace_gc {
            eprintln!(
                "gc: freed {} objects, ran {} finalizers, {} live",
                freed,
                pending.len(),
                self.heap.live_count()
            );
        }

        self.in_gc = false;
    }

    fn run_finalizer(&mut self, id: ObjectId) {
        match self.heap.userdata_mut(id) {
            Some(u) if !u.finalized => u.finalized = true,
            _ => return,
        }
        let ud = Value::Userdata(id);
        let handler = self.heap.metamethod(&ud, "__gc");
        if let Err(e) = self.call_value(handler, &[ud]) {
            eprintln!("gc: error in __gc: {}", e);
        }
    }

    /// Run every finalizer that has not run yet and clear the stack.
    ///
    /// Called on drop; calling it again is a no-op.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.stack.clear();
        self.base = 0;

        self.in_gc = true;
        let pending = self.heap.pending_finalizers(false);
        for &id in pending.iter().rev() {
            self.run_finalizer(id);
        }
        self.stats.finalized += pending.len();
        self.in_gc = false;
    }
}

impl Drop for State {
    fn drop(&mut self) {
        self.close();
    }
}
