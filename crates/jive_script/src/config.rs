//! State configuration.

/// Configuration options for a [`State`](crate::State).
#[derive(Clone, Copy, Debug)]
pub struct StateConfig {
    /// Collect before an allocation once the heap crosses its thresholds.
    pub auto_gc: bool,
    /// Initial object-count threshold, also the floor after each sweep.
    pub gc_threshold: usize,
    /// Initial byte threshold, also the floor after each sweep.
    pub gc_threshold_bytes: usize,
    /// Print one `gc:` line to stderr per collection.
    pub trace_gc: bool,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            auto_gc: true,
            gc_threshold: 4096,
            gc_threshold_bytes: 1024 * 1024,
            trace_gc: false,
        }
    }
}

impl StateConfig {
    /// Defaults, with `trace_gc` taken from `JIVE_TRACE_GC` (`1` or `true`).
    pub fn from_env() -> Self {
        let trace_gc = std::env::var("JIVE_TRACE_GC")
            .ok()
            .is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"));
        Self {
            trace_gc,
            ..Self::default()
        }
    }
}
