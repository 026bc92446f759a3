//! Per-run counters for [`Simulation::evolve`](crate::Simulation::evolve).

/// Counts and timing for one `evolve` call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EvolveMetrics {
    /// Lattice elements traversed.
    pub elements_visited: u64,
    /// Sub-steps executed across all elements.
    pub substeps: u64,
    /// Element pushes applied.
    pub push_calls: u64,
    /// Sub-steps in which space-charge coupling ran.
    pub coupling_calls: u64,
    /// Sub-steps in which space-charge coupling was skipped.
    pub coupling_skips: u64,
    /// Diagnostic records written successfully.
    pub diagnostics_written: u64,
    /// Diagnostic records that failed and were skipped.
    pub diagnostic_failures: u64,
    /// Wall-clock time for the whole call, in microseconds.
    pub total_us: u64,
}
