/// Per-combination workspace
///
/// A `Space` holds everything the run learns about one column combination.
/// Spaces live in an arena owned by the run and are addressed by handle, so
/// none of them needs a reference back to the run; lookups that need run
/// state (the distribution map, the singleton table) go through the run.
use crate::rows::Value;
use crate::search::column_set::ColumnSet;
use crate::search::estimate;

/// Handle into the run's space arena.
pub type SpaceId = usize;

#[derive(Debug)]
pub struct Space {
    pub columns: ColumnSet,
    /// Distinct combinations observed; for a single column, null counts as
    /// one value when present.
    pub cardinality: u64,
    /// Null observations for single-column spaces; composite spaces collapse
    /// null rows into an unreported group.
    pub null_count: Option<u64>,
    /// Sorted non-null values, kept only for small single-column spaces.
    pub value_set: Option<Vec<Value>>,
    pub expected_cardinality: f64,
    /// True once this combination is known to be a key.
    pub unique: bool,
    /// False once the collector degraded to a sketch.
    pub exact: bool,
    /// Columns known to be functionally determined by a subset of this one.
    pub dependencies: ColumnSet,
    /// For single-column spaces: combinations known to determine this column.
    pub dependents: Vec<ColumnSet>,
}

impl Space {
    pub fn new(columns: ColumnSet) -> Self {
        let width = columns.width();
        Self {
            columns,
            cardinality: 0,
            null_count: None,
            value_set: None,
            expected_cardinality: 0.0,
            unique: false,
            exact: true,
            dependencies: ColumnSet::empty(width),
            dependents: Vec::new(),
        }
    }

    /// How much smaller the observed cardinality is than predicted.
    pub fn surprise(&self) -> f64 {
        estimate::surprise(self.expected_cardinality, self.cardinality as f64)
    }
}
