//! Pipeline configuration

/// Configuration for the pipeline channel topology
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Capacity of the channel between adjacent stages (default: 1)
    ///
    /// The default gives each handoff point room for a single parked
    /// element, which keeps cancellation latency within one element while
    /// still letting neighbouring stages overlap. A capacity of zero is
    /// treated as one.
    pub channel_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 1,
        }
    }
}

impl PipelineConfig {
    /// Capacity actually used for a stage edge.
    pub(crate) fn edge_capacity(&self) -> usize {
        self.channel_capacity.max(1)
    }
}
