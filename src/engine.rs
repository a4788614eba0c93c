/// Public profiler engines
///
/// Two implementations of the `Profiler` trait. `CombinationProfiler` is
/// the bounded-memory, pass-limited search that only evaluates interesting
/// column combinations; `ExhaustiveProfiler` is the baseline that evaluates
/// every combination, usable when the column count is small.
use crate::config::{ExpansionOrder, ProfilerConfig};
use crate::error::{ProfilerError, ProfilerResult};
use crate::profile::Profile;
use crate::rows::{Column, RowSource};
use crate::search::run::{InterestPredicate, Run};

/// Anything that can turn a row stream and a schema into a `Profile`.
pub trait Profiler {
    fn profile(&self, rows: &mut dyn RowSource, columns: &[Column]) -> ProfilerResult<Profile>;
}

/// The exhaustive baseline refuses tables wider than this; the power set
/// stops being a sane unit of work long before 2^20 combinations.
const MAX_EXHAUSTIVE_COLUMNS: usize = 20;

/// Every column ordinal must equal its position in the schema.
fn validate_schema(columns: &[Column]) -> ProfilerResult<()> {
    for (index, column) in columns.iter().enumerate() {
        if column.ordinal != index {
            return Err(ProfilerError::misuse(format!(
                "column '{}' has ordinal {} but sits at position {}",
                column.name, column.ordinal, index
            )));
        }
    }
    Ok(())
}

/// Profiler that only investigates interesting combinations of columns.
///
/// # Example
///
/// ```rust
/// use table_profiler::{CombinationProfiler, Column, MemoryRows, Profiler, Value};
///
/// let columns = vec![Column::new(0, "DEPTNO"), Column::new(1, "DNAME")];
/// let mut rows = MemoryRows::new(vec![
///     vec![Value::Int64(10), Value::str("ACCOUNTING")],
///     vec![Value::Int64(20), Value::str("RESEARCH")],
/// ]);
/// let profiler = CombinationProfiler::new();
/// let profile = profiler.profile(&mut rows, &columns).unwrap();
/// assert_eq!(profile.row_count, 2);
/// ```
pub struct CombinationProfiler {
    config: ProfilerConfig,
    predicate: InterestPredicate,
}

impl CombinationProfiler {
    /// Default configuration and an accept-everything predicate.
    pub fn new() -> Self {
        Self {
            config: ProfilerConfig::default(),
            predicate: Box::new(|_, _, _| true),
        }
    }

    pub fn builder() -> CombinationProfilerBuilder {
        CombinationProfilerBuilder {
            config: ProfilerConfig::default(),
            predicate: Box::new(|_, _, _| true),
        }
    }

    pub fn config(&self) -> &ProfilerConfig {
        &self.config
    }
}

impl Default for CombinationProfiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Profiler for CombinationProfiler {
    fn profile(&self, rows: &mut dyn RowSource, columns: &[Column]) -> ProfilerResult<Profile> {
        self.config.validate()?;
        validate_schema(columns)?;
        Run::new(&self.config, &self.predicate, columns, false).profile(rows)
    }
}

/// Builder for `CombinationProfiler`.
pub struct CombinationProfilerBuilder {
    config: ProfilerConfig,
    predicate: InterestPredicate,
}

impl CombinationProfilerBuilder {
    /// Maximum combinations evaluated per pass; trades memory for precision.
    pub fn combinations_per_pass(mut self, combinations: usize) -> Self {
        self.config.combinations_per_pass = combinations;
        self
    }

    pub fn value_list_cap(mut self, cap: usize) -> Self {
        self.config.value_list_cap = cap;
        self
    }

    pub fn sketch_threshold(mut self, threshold: usize) -> Self {
        self.config.sketch_threshold = threshold;
        self
    }

    pub fn expansion_order(mut self, order: ExpansionOrder) -> Self {
        self.config.expansion_order = order;
        self
    }

    pub fn with_config(mut self, config: ProfilerConfig) -> Self {
        self.config = config;
        self
    }

    /// Custom interest predicate deciding which successors to evaluate.
    pub fn interest_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(
                &crate::search::space::Space,
                Option<&crate::profile::Distribution>,
                &Column,
            ) -> bool
            + Send
            + Sync
            + 'static,
    {
        self.predicate = Box::new(predicate);
        self
    }

    /// The canonical predicate: expand a combination only when its observed
    /// cardinality undershoots the prediction by more than `threshold`, or
    /// when it has not been evaluated yet.
    pub fn minimum_surprise(mut self, threshold: f64) -> Self {
        self.predicate = Box::new(move |_space, distribution, _column| match distribution {
            Some(distribution) => distribution.surprise() > threshold,
            None => true,
        });
        self
    }

    pub fn build(self) -> ProfilerResult<CombinationProfiler> {
        self.config.validate()?;
        Ok(CombinationProfiler {
            config: self.config,
            predicate: self.predicate,
        })
    }
}

/// Baseline profiler: evaluates every column combination exactly once and
/// emits a distribution for each. Memory grows with 2^N, so it is limited
/// to narrow tables; the combination engine covers the rest.
pub struct ExhaustiveProfiler {
    config: ProfilerConfig,
    predicate: InterestPredicate,
}

impl ExhaustiveProfiler {
    pub fn new() -> Self {
        Self::with_config(ProfilerConfig::default())
    }

    pub fn with_config(config: ProfilerConfig) -> Self {
        Self {
            config,
            predicate: Box::new(|_, _, _| true),
        }
    }
}

impl Default for ExhaustiveProfiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Profiler for ExhaustiveProfiler {
    fn profile(&self, rows: &mut dyn RowSource, columns: &[Column]) -> ProfilerResult<Profile> {
        self.config.validate()?;
        validate_schema(columns)?;
        if columns.len() > MAX_EXHAUSTIVE_COLUMNS {
            return Err(ProfilerError::misuse(format!(
                "exhaustive profiling of {} columns would enumerate 2^{} combinations; \
                 use CombinationProfiler",
                columns.len(),
                columns.len()
            )));
        }
        Run::new(&self.config, &self.predicate, columns, true).profile(rows)
    }
}
