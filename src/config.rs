/// Profiler configuration
use serde::{Deserialize, Serialize};

use crate::error::{ProfilerError, ProfilerResult};

/// Order in which finished combinations are expanded from the done queue.
///
/// Combinations are always expanded smallest-first. Within one size the
/// default expands the least surprising combination first, which matches the
/// original breadth-first behavior; `MostSurprisingFirst` inverts that leg so
/// promising regions are chased before the pass budget runs out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpansionOrder {
    LeastSurprisingFirst,
    MostSurprisingFirst,
}

/// Configuration for a profiler run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProfilerConfig {
    /// Maximum number of column combinations evaluated per pass.
    /// Each combination carries a collector; the sketch fallback keeps a
    /// collector at roughly 2KB once it degrades, so this knob bounds peak
    /// memory. Must be greater than 2.
    pub combinations_per_pass: usize,

    /// A single-column distribution keeps its full value list only when the
    /// column has fewer than this many distinct values.
    pub value_list_cap: usize,

    /// Composite collectors hold exact tuple sets up to this many distinct
    /// tuples, then degrade to an approximate sketch.
    pub sketch_threshold: usize,

    /// Done-queue expansion order.
    pub expansion_order: ExpansionOrder,
}

impl Default for ProfilerConfig {
    fn default() -> Self {
        Self {
            combinations_per_pass: 100,
            value_list_cap: 20,
            sketch_threshold: 16_384,
            expansion_order: ExpansionOrder::LeastSurprisingFirst,
        }
    }
}

impl ProfilerConfig {
    /// Validate the configuration. Called at run start.
    pub fn validate(&self) -> ProfilerResult<()> {
        if self.combinations_per_pass <= 2 {
            return Err(ProfilerError::misuse(format!(
                "combinations_per_pass must be greater than 2, got {}",
                self.combinations_per_pass
            )));
        }
        if self.sketch_threshold == 0 {
            return Err(ProfilerError::misuse(
                "sketch_threshold must be at least 1",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ProfilerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.combinations_per_pass, 100);
        assert_eq!(config.value_list_cap, 20);
        assert_eq!(config.expansion_order, ExpansionOrder::LeastSurprisingFirst);
    }

    #[test]
    fn test_pass_size_must_exceed_two() {
        let config = ProfilerConfig {
            combinations_per_pass: 2,
            ..ProfilerConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
