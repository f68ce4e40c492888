//! Engine configuration.

/// Engine construction options.
#[derive(Clone, Copy, Debug)]
pub struct EngineConfig {
    /// Initial capacity of the handle slab.
    pub heap_capacity: usize,
    /// Upper bound on retained guest error reports. Older reports are
    /// dropped first once the sink is full.
    pub max_reported_errors: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            heap_capacity: 1024,
            max_reported_errors: 64,
        }
    }
}
