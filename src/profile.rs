/// Profiler output model
///
/// A finished run produces one `Profile`: the observed row count, a
/// distribution per emitted column combination, the discovered unique keys
/// and the minimal functional dependencies. Statistics are plain serde-able
/// records; how they are transported (JSON, catalog tables) is the caller's
/// business.
use serde::{Deserialize, Serialize};

use crate::rows::{Column, Value};
use crate::search::estimate;

/// Statistics for one column combination.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Distribution {
    /// Member columns in ascending ordinal order.
    pub columns: Vec<Column>,
    /// Sorted non-null values; present only for single-column combinations
    /// below the value-list cap.
    pub values: Option<Vec<Value>>,
    /// Distinct combinations observed. For a single column, null counts as
    /// one value when present.
    pub cardinality: u64,
    /// Null observations; `None` for composite combinations.
    pub null_count: Option<u64>,
    /// Cardinality predicted from sub-combinations.
    pub expected_cardinality: f64,
    /// Whether this combination is minimal: not a key, not a superset of a
    /// key, and not implied by a known functional dependency.
    pub minimal: bool,
}

impl Distribution {
    /// Relative gap between predicted and observed cardinality.
    pub fn surprise(&self) -> f64 {
        estimate::surprise(self.expected_cardinality, self.cardinality as f64)
    }
}

/// A combination whose cardinality equals the row count: a key.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Unique {
    pub columns: Vec<Column>,
}

/// On the observed rows, `determinants` uniquely determine `dependent`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FunctionalDependency {
    pub determinants: Vec<Column>,
    pub dependent: Column,
}

/// The complete statistical description of one table.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Profile {
    pub row_count: u64,
    pub columns: Vec<Column>,
    pub distributions: Vec<Distribution>,
    pub uniques: Vec<Unique>,
    pub functional_dependencies: Vec<FunctionalDependency>,
}

impl Profile {
    /// The distribution for an exact set of column ordinals, if emitted.
    pub fn distribution(&self, ordinals: &[usize]) -> Option<&Distribution> {
        let mut wanted: Vec<usize> = ordinals.to_vec();
        wanted.sort_unstable();
        self.distributions.iter().find(|d| {
            d.columns.len() == wanted.len()
                && d.columns.iter().zip(&wanted).all(|(c, w)| c.ordinal == *w)
        })
    }

    /// Whether a unique was emitted for exactly these ordinals.
    pub fn is_unique(&self, ordinals: &[usize]) -> bool {
        let mut wanted: Vec<usize> = ordinals.to_vec();
        wanted.sort_unstable();
        self.uniques.iter().any(|u| {
            u.columns.len() == wanted.len()
                && u.columns.iter().zip(&wanted).all(|(c, w)| c.ordinal == *w)
        })
    }
}
