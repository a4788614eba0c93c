/// Per-combination value collectors
///
/// A collector accumulates the distinct values observed for one column
/// combination while a pass streams the rows. Collectors are transient:
/// created when a pass starts, finished and dropped when it ends.
///
/// Two variants, chosen by the arity of the combination. The singleton
/// collector keeps an ordered set of scalar values and counts nulls. The
/// composite collector keeps an ordered set of tuples; a row with a null in
/// any member column is counted into a single null group and not inserted,
/// so which columns were null is deliberately not tracked. When the exact
/// tuple set outgrows the configured threshold the composite collector
/// degrades to a HyperLogLog sketch and the combination's statistics become
/// approximate.
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

use crate::rows::Value;
use crate::search::column_set::ColumnSet;
use crate::search::sketch::HllSketch;

/// What a finished collector hands back to its space.
#[derive(Debug)]
pub struct CollectorOutcome {
    pub cardinality: u64,
    /// Per-column null count; `None` for composite combinations.
    pub null_count: Option<u64>,
    /// Sorted non-null values; singleton combinations below the cap only.
    pub value_set: Option<Vec<Value>>,
    /// False once the collector degraded to a sketch.
    pub exact: bool,
}

pub enum Collector {
    Singleton(SingletonCollector),
    Composite(CompositeCollector),
}

impl Collector {
    /// Create a collector of the appropriate kind for `columns`.
    pub fn create(columns: &ColumnSet, sketch_threshold: usize) -> Self {
        let ordinals: Vec<usize> = columns.members().collect();
        if ordinals.len() == 1 {
            Collector::Singleton(SingletonCollector::new(ordinals[0]))
        } else {
            Collector::Composite(CompositeCollector::new(ordinals, sketch_threshold))
        }
    }

    pub fn add(&mut self, row: &[Value]) {
        match self {
            Collector::Singleton(c) => c.add(row),
            Collector::Composite(c) => c.add(row),
        }
    }

    pub fn finish(self, value_list_cap: usize) -> CollectorOutcome {
        match self {
            Collector::Singleton(c) => c.finish(value_list_cap),
            Collector::Composite(c) => c.finish(),
        }
    }
}

/// Collects values of a single column.
pub struct SingletonCollector {
    ordinal: usize,
    values: BTreeSet<Value>,
    null_count: u64,
}

impl SingletonCollector {
    fn new(ordinal: usize) -> Self {
        Self {
            ordinal,
            values: BTreeSet::new(),
            null_count: 0,
        }
    }

    fn add(&mut self, row: &[Value]) {
        let value = &row[self.ordinal];
        if value.is_null() {
            self.null_count += 1;
        } else {
            self.values.insert(value.clone());
        }
    }

    fn finish(self, value_list_cap: usize) -> CollectorOutcome {
        // Null counts as one extra distinct value when present.
        let cardinality = self.values.len() as u64 + u64::from(self.null_count > 0);
        let value_set = if self.values.len() < value_list_cap {
            Some(self.values.into_iter().collect())
        } else {
            None
        };
        CollectorOutcome {
            cardinality,
            null_count: Some(self.null_count),
            value_set,
            exact: true,
        }
    }
}

enum TupleStore {
    Exact(BTreeSet<Vec<Value>>),
    Approx(HllSketch),
}

/// Collects tuples over two or more columns (or the empty combination,
/// whose single empty tuple establishes the grand-total cardinality).
pub struct CompositeCollector {
    ordinals: Vec<usize>,
    scratch: Vec<Value>,
    store: TupleStore,
    null_count: u64,
    sketch_threshold: usize,
}

impl CompositeCollector {
    fn new(ordinals: Vec<usize>, sketch_threshold: usize) -> Self {
        let scratch = Vec::with_capacity(ordinals.len());
        Self {
            ordinals,
            scratch,
            store: TupleStore::Exact(BTreeSet::new()),
            null_count: 0,
            sketch_threshold,
        }
    }

    fn add(&mut self, row: &[Value]) {
        self.scratch.clear();
        for &ordinal in &self.ordinals {
            let value = &row[ordinal];
            if value.is_null() {
                // Any null collapses the row into the null group.
                self.null_count += 1;
                return;
            }
            self.scratch.push(value.clone());
        }
        match &mut self.store {
            TupleStore::Exact(tuples) => {
                if tuples.contains(&self.scratch) {
                    return;
                }
                if tuples.len() < self.sketch_threshold {
                    tuples.insert(self.scratch.clone());
                    return;
                }
            }
            TupleStore::Approx(sketch) => {
                sketch.add(tuple_hash(&self.scratch));
                return;
            }
        }
        // The exact set is full: spill it into a sketch, then record the
        // tuple that pushed it over.
        self.degrade();
        if let TupleStore::Approx(sketch) = &mut self.store {
            sketch.add(tuple_hash(&self.scratch));
        }
    }

    /// Replace the exact tuple set with a sketch seeded from its contents.
    fn degrade(&mut self) {
        let store = std::mem::replace(&mut self.store, TupleStore::Approx(HllSketch::default()));
        if let TupleStore::Exact(tuples) = store {
            let mut sketch = HllSketch::default();
            for tuple in &tuples {
                sketch.add(tuple_hash(tuple));
            }
            self.store = TupleStore::Approx(sketch);
        } else {
            self.store = store;
        }
    }

    fn finish(self) -> CollectorOutcome {
        let (cardinality, exact) = match self.store {
            TupleStore::Exact(tuples) => (tuples.len() as u64, true),
            TupleStore::Approx(sketch) => (sketch.estimate().round() as u64, false),
        };
        CollectorOutcome {
            cardinality,
            null_count: None,
            value_set: None,
            exact,
        }
    }
}

fn tuple_hash(tuple: &[Value]) -> u64 {
    let mut hasher = fxhash::FxHasher::default();
    tuple.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(collector: &mut Collector, rows: &[Vec<Value>]) {
        for row in rows {
            collector.add(row);
        }
    }

    #[test]
    fn test_singleton_counts_null_as_one_value() {
        let columns = ColumnSet::of(2, &[1]);
        let mut collector = Collector::create(&columns, 1000);
        feed(
            &mut collector,
            &[
                vec![Value::Int64(1), Value::str("a")],
                vec![Value::Int64(2), Value::Null],
                vec![Value::Int64(3), Value::str("a")],
                vec![Value::Int64(4), Value::Null],
            ],
        );
        let outcome = collector.finish(20);
        assert_eq!(outcome.cardinality, 2);
        assert_eq!(outcome.null_count, Some(2));
        assert_eq!(outcome.value_set, Some(vec![Value::str("a")]));
        assert!(outcome.exact);
    }

    #[test]
    fn test_singleton_value_list_cap() {
        let columns = ColumnSet::of(1, &[0]);
        let mut collector = Collector::create(&columns, 1000);
        let rows: Vec<Vec<Value>> = (0..25).map(|i| vec![Value::Int64(i)]).collect();
        feed(&mut collector, &rows);
        let outcome = collector.finish(20);
        assert_eq!(outcome.cardinality, 25);
        assert!(outcome.value_set.is_none());
    }

    #[test]
    fn test_singleton_value_set_is_sorted() {
        let columns = ColumnSet::of(1, &[0]);
        let mut collector = Collector::create(&columns, 1000);
        feed(
            &mut collector,
            &[
                vec![Value::Int64(30)],
                vec![Value::Int64(10)],
                vec![Value::Int64(20)],
            ],
        );
        let outcome = collector.finish(20);
        assert_eq!(
            outcome.value_set,
            Some(vec![Value::Int64(10), Value::Int64(20), Value::Int64(30)])
        );
    }

    #[test]
    fn test_composite_collapses_null_rows_into_one_group() {
        let columns = ColumnSet::of(3, &[0, 2]);
        let mut collector = Collector::create(&columns, 1000);
        feed(
            &mut collector,
            &[
                vec![Value::Int64(1), Value::str("x"), Value::str("a")],
                vec![Value::Int64(1), Value::str("y"), Value::str("a")],
                vec![Value::Int64(2), Value::str("x"), Value::Null],
                vec![Value::Null, Value::str("x"), Value::str("b")],
            ],
        );
        let outcome = collector.finish(20);
        // Two null-free tuples; the two null rows form a group that does not
        // contribute to cardinality, and per-column nulls are not reported.
        assert_eq!(outcome.cardinality, 2);
        assert_eq!(outcome.null_count, None);
        assert!(outcome.value_set.is_none());
        assert!(outcome.exact);
    }

    #[test]
    fn test_empty_combination_sees_one_tuple() {
        let columns = ColumnSet::empty(3);
        let mut collector = Collector::create(&columns, 1000);
        feed(
            &mut collector,
            &[
                vec![Value::Int64(1), Value::Null, Value::str("a")],
                vec![Value::Int64(2), Value::str("x"), Value::str("b")],
            ],
        );
        let outcome = collector.finish(20);
        assert_eq!(outcome.cardinality, 1);
    }

    #[test]
    fn test_composite_degrades_to_sketch_past_threshold() {
        let columns = ColumnSet::of(2, &[0, 1]);
        let mut collector = Collector::create(&columns, 64);
        let rows: Vec<Vec<Value>> = (0..512)
            .map(|i| vec![Value::Int64(i), Value::Int64(i % 7)])
            .collect();
        feed(&mut collector, &rows);
        let outcome = collector.finish(20);
        assert!(!outcome.exact);
        assert!(
            outcome.cardinality > 400 && outcome.cardinality < 650,
            "estimate {} outside tolerance of 512",
            outcome.cardinality
        );
    }
}
