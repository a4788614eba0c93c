/// The pass controller
///
/// A `Run` drives the multi-pass search over the column-subset lattice. Each
/// pass pulls a bounded batch of combinations, attaches a collector to each,
/// streams the rows once through the whole batch, finalizes the collectors,
/// derives keys and functional dependencies against everything finished so
/// far, and finally expands the most promising finished combinations into
/// successors for the next pass. The run ends when both queues are empty.
///
/// The run owns all mutable state: spaces live in an arena and are addressed
/// by handle, never by back-reference.
use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};

use fxhash::{FxHashMap, FxHashSet};
use ordered_float::OrderedFloat;
use tracing::debug;

use crate::config::{ExpansionOrder, ProfilerConfig};
use crate::error::{ProfilerError, ProfilerResult};
use crate::profile::{Distribution, FunctionalDependency, Profile, Unique};
use crate::rows::{Column, RowSource};
use crate::search::collector::Collector;
use crate::search::column_set::ColumnSet;
use crate::search::estimate;
use crate::search::lattice::SubsetLattice;
use crate::search::space::{Space, SpaceId};

/// Decides whether extending `parent` by `column` is worth evaluating. The
/// second argument is the parent's registered distribution, when one exists.
pub type InterestPredicate =
    Box<dyn Fn(&Space, Option<&Distribution>, &Column) -> bool + Send + Sync>;

/// A composite combination is emitted only when its observed cardinality
/// undershoots the prediction by more than this.
const INTERESTING_SURPRISE: f64 = 0.3;

/// Entry in the done queue. Finished combinations are expanded smallest
/// first; within one size the `surprise` leg decides (negated when the
/// expansion order is inverted). The handle breaks ties deterministically.
#[derive(PartialEq, Eq, PartialOrd, Ord)]
struct DoneEntry {
    size: usize,
    surprise: OrderedFloat<f64>,
    id: SpaceId,
}

pub struct Run<'a> {
    config: &'a ProfilerConfig,
    predicate: &'a InterestPredicate,
    /// Evaluate every subset and emit every distribution, ignoring the
    /// interest machinery. The baseline profiler runs this way.
    exhaustive: bool,
    columns: &'a [Column],
    width: usize,

    /// Arena of all spaces ever materialized.
    spaces: Vec<Space>,
    /// Combinations queued for the next pass.
    frontier: VecDeque<ColumnSet>,
    /// Every combination ever queued, so no space is built twice.
    seen: FxHashSet<ColumnSet>,
    /// Finished combinations whose successors have not been generated.
    done: BinaryHeap<Reverse<DoneEntry>>,
    /// Partial order over finished spaces, for descendant queries.
    results: SubsetLattice,
    distributions: FxHashMap<ColumnSet, Distribution>,
    /// Singleton space per column ordinal, once evaluated.
    singletons: Vec<Option<SpaceId>>,
    /// Known unique keys; any superset is pruned.
    keys: Vec<ColumnSet>,
    uniques: Vec<Unique>,
    /// Row count observed on pass 0.
    row_count: u64,
}

impl<'a> Run<'a> {
    pub fn new(
        config: &'a ProfilerConfig,
        predicate: &'a InterestPredicate,
        columns: &'a [Column],
        exhaustive: bool,
    ) -> Self {
        let width = columns.len();
        let mut run = Self {
            config,
            predicate,
            exhaustive,
            columns,
            width,
            spaces: Vec::new(),
            frontier: VecDeque::new(),
            seen: FxHashSet::default(),
            done: BinaryHeap::new(),
            results: SubsetLattice::new(),
            distributions: FxHashMap::default(),
            singletons: vec![None; width],
            keys: Vec::new(),
            uniques: Vec::new(),
            row_count: 0,
        };
        if run.exhaustive || run.power_set_fits() {
            // Few enough columns to evaluate every combination. Counting
            // order keeps each set after its subsets, so keys and
            // dependencies are always discovered smallest-first.
            for set in ColumnSet::power_set(width) {
                run.enqueue(set);
            }
        } else {
            // Multi-pass search: pass 0 evaluates the empty combination,
            // which establishes the row count and roots the expansion.
            run.enqueue(ColumnSet::empty(width));
        }
        run
    }

    fn power_set_fits(&self) -> bool {
        self.width < usize::BITS as usize - 1
            && self.config.combinations_per_pass > (1usize << self.width)
    }

    pub fn profile(mut self, rows: &mut dyn RowSource) -> ProfilerResult<Profile> {
        let mut pass = 0;
        loop {
            let batch = self.next_batch(pass);
            if batch.is_empty() {
                break;
            }
            self.run_pass(pass, &batch, rows)?;
            pass += 1;
        }
        Ok(self.assemble())
    }

    /// Pull the next batch of combinations, expanding finished combinations
    /// into successors once the frontier runs dry. Empty when the search is
    /// exhausted.
    fn next_batch(&mut self, pass: usize) -> Vec<SpaceId> {
        let mut batch = Vec::new();
        loop {
            if batch.len() >= self.config.combinations_per_pass {
                return batch;
            }
            if let Some(columns) = self.frontier.pop_front() {
                let id = self.spaces.len();
                let singleton = if columns.cardinality() == 1 {
                    columns.members().next()
                } else {
                    None
                };
                self.spaces.push(Space::new(columns));
                if let Some(ordinal) = singleton {
                    self.singletons[ordinal] = Some(id);
                }
                batch.push(id);
            } else {
                loop {
                    let Some(Reverse(entry)) = self.done.pop() else {
                        return batch;
                    };
                    self.expand(pass, entry.id);
                    if !self.frontier.is_empty() {
                        break;
                    }
                }
            }
        }
    }

    /// Generate the successors of one finished combination. A successor is
    /// queued unless a known key is contained in it or the interest
    /// predicate declines; the empty parent bypasses both so that every
    /// singleton is always profiled.
    fn expand(&mut self, pass: usize, parent: SpaceId) {
        let columns = self.columns;
        for column in columns {
            if self.spaces[parent].columns.contains(column.ordinal) {
                continue;
            }
            let successor = self.spaces[parent].columns.with(column.ordinal);
            let admitted = pass == 0
                || self.spaces[parent].columns.is_empty()
                || (!self.contains_key(&successor) && self.accepts(parent, column));
            if admitted {
                self.enqueue(successor);
            }
        }
    }

    fn accepts(&self, parent: SpaceId, column: &Column) -> bool {
        let space = &self.spaces[parent];
        let distribution = self.distributions.get(&space.columns);
        (self.predicate)(space, distribution, column)
    }

    /// Queue a combination unless it has ever been queued before.
    fn enqueue(&mut self, columns: ColumnSet) {
        if self.seen.insert(columns.clone()) {
            self.frontier.push_back(columns);
        }
    }

    /// Whether some known key is a subset of `columns`.
    fn contains_key(&self, columns: &ColumnSet) -> bool {
        self.keys.iter().any(|key| key.is_subset_of(columns))
    }

    /// Stream the rows once through the batch, then finalize every space:
    /// index it, derive dependencies and keys, and decide emission.
    fn run_pass(
        &mut self,
        pass: usize,
        batch: &[SpaceId],
        rows: &mut dyn RowSource,
    ) -> ProfilerResult<()> {
        debug!(
            pass,
            batch_size = batch.len(),
            distributions = self.distributions.len(),
            "profiling pass"
        );

        let mut collectors: Vec<Collector> = batch
            .iter()
            .map(|&id| Collector::create(&self.spaces[id].columns, self.config.sketch_threshold))
            .collect();

        rows.restart()
            .map_err(|source| ProfilerError::iteration(pass, source))?;
        let mut local_rows: u64 = 0;
        loop {
            let row = rows
                .next_row()
                .map_err(|source| ProfilerError::iteration(pass, source))?;
            let Some(row) = row else { break };
            if row.len() != self.width {
                return Err(ProfilerError::row_shape(
                    local_rows as usize,
                    self.width,
                    row.len(),
                    pass,
                ));
            }
            for collector in &mut collectors {
                collector.add(row);
            }
            local_rows += 1;
        }

        for (&id, collector) in batch.iter().zip(collectors.into_iter()) {
            let outcome = collector.finish(self.config.value_list_cap);
            {
                let space = &mut self.spaces[id];
                space.cardinality = outcome.cardinality;
                space.null_count = outcome.null_count;
                space.value_set = outcome.value_set;
                space.exact = outcome.exact;
            }
            let columns = self.spaces[id].columns.clone();
            self.results.add(columns.clone(), id);

            let non_minimal = self.derive_dependencies(id, local_rows);
            if non_minimal > 0 {
                // Everything this combination could tell us is already
                // stated by a smaller dependency.
                continue;
            }

            let expected = self.expected_cardinality(id, local_rows);
            self.spaces[id].expected_cardinality = expected;
            let minimal = !self.contains_key(&columns);

            let space = &self.spaces[id];
            let distribution = Distribution {
                columns: self.to_columns(&columns),
                values: space.value_set.clone(),
                cardinality: space.cardinality,
                null_count: space.null_count,
                expected_cardinality: expected,
                minimal,
            };
            if self.exhaustive {
                self.distributions.insert(columns.clone(), distribution);
            } else if minimal && self.is_interesting(id) {
                self.distributions.insert(columns.clone(), distribution);
                let surprise = match self.config.expansion_order {
                    ExpansionOrder::LeastSurprisingFirst => self.spaces[id].surprise(),
                    ExpansionOrder::MostSurprisingFirst => -self.spaces[id].surprise(),
                };
                self.done.push(Reverse(DoneEntry {
                    size: columns.cardinality(),
                    surprise: OrderedFloat(surprise),
                    id,
                }));
            }

            // A new key: cardinality matches the row count, no smaller key
            // explains it, and the count is exact. Batches arrive in
            // subset-before-superset order, so minimal keys always win.
            if self.spaces[id].cardinality == local_rows
                && local_rows > 0
                && self.spaces[id].exact
                && minimal
            {
                self.uniques.push(Unique {
                    columns: self.to_columns(&columns),
                });
                self.keys.push(columns);
                self.spaces[id].unique = true;
            }
        }

        if pass == 0 {
            self.row_count = local_rows;
        }
        Ok(())
    }

    /// Null-free cardinality: what the comparison below is defined over.
    /// Composite collectors already exclude null rows; a singleton's null
    /// increment is taken back off.
    fn nonnull_cardinality(&self, id: SpaceId) -> u64 {
        let space = &self.spaces[id];
        space.cardinality - u64::from(space.null_count.is_some_and(|n| n > 0))
    }

    /// Compare this space against every finished proper subset. A subset
    /// with the same null-free cardinality functionally determines the
    /// columns not in common; the dependency is recorded only if no
    /// already-known dependency states it with a smaller determinant.
    /// Returns the number of candidates rejected as non-minimal.
    ///
    /// The comparison is over null-free cardinalities because composite
    /// collectors collapse null rows into an uncounted group: only the
    /// null-free projections are counted on both sides. Dependencies are
    /// therefore statements about null-free rows, and can be optimistic
    /// when the two sides drop different rows.
    fn derive_dependencies(&mut self, id: SpaceId, local_rows: u64) -> usize {
        if !self.spaces[id].exact {
            return 0;
        }
        let columns = self.spaces[id].columns.clone();
        let cardinality = self.nonnull_cardinality(id);
        let mut non_minimal = 0;

        'candidates: for did in self.results.strict_descendants(&columns) {
            if !self.spaces[did].exact || self.nonnull_cardinality(did) != cardinality {
                continue;
            }
            // A determinant that is itself a key (or the empty set on a
            // degenerate table) only restates the unique.
            if self.spaces[did].cardinality == local_rows {
                continue;
            }
            let determinant = self.spaces[did].columns.clone();
            let dependents = columns.difference(&determinant);

            // The determinant is reducible if one of its columns is already
            // determined by something the rest of it contains: (a) -> x
            // makes (a, b, x) -> y non-minimal, (a, b) -> y says more.
            for ordinal in determinant.members() {
                let rest = determinant.without(ordinal);
                if let Some(sid) = self.singletons[ordinal] {
                    for known in &self.spaces[sid].dependents {
                        if known.is_subset_of(&rest) {
                            non_minimal += 1;
                            continue 'candidates;
                        }
                    }
                }
            }
            // Likewise if some dependent is already determined by a subset
            // of the determinant.
            for ordinal in dependents.members() {
                if let Some(sid) = self.singletons[ordinal] {
                    for known in &self.spaces[sid].dependents {
                        if known.is_subset_of(&determinant) {
                            non_minimal += 1;
                            continue 'candidates;
                        }
                    }
                }
            }

            self.spaces[id].dependencies.union_with(&dependents);
            for ordinal in dependents.members() {
                if let Some(sid) = self.singletons[ordinal] {
                    let known = &mut self.spaces[sid].dependents;
                    if !known.contains(&determinant) {
                        known.push(determinant.clone());
                    }
                }
            }
        }
        non_minimal
    }

    /// Predicted cardinality per the independence model: the minimum over
    /// member columns of the urn estimate from the column's distribution and
    /// the rest's distribution. Terms without registered distributions are
    /// skipped; with none known the prediction is the row count.
    fn expected_cardinality(&self, id: SpaceId, local_rows: u64) -> f64 {
        let space = &self.spaces[id];
        match space.columns.cardinality() {
            0 => 1.0,
            1 => local_rows as f64,
            _ => {
                let mut expected = local_rows as f64;
                for ordinal in space.columns.members() {
                    let single = ColumnSet::empty(self.width).with(ordinal);
                    let rest = space.columns.without(ordinal);
                    let (Some(d1), Some(d2)) =
                        (self.distributions.get(&single), self.distributions.get(&rest))
                    else {
                        continue;
                    };
                    let joint = estimate::joint_cardinality(
                        local_rows as f64,
                        d1.cardinality as f64,
                        d2.cardinality as f64,
                    );
                    expected = expected.min(joint);
                }
                expected
            }
        }
    }

    fn is_interesting(&self, id: SpaceId) -> bool {
        let space = &self.spaces[id];
        space.columns.cardinality() < 2 || space.surprise() > INTERESTING_SURPRISE
    }

    fn to_columns(&self, set: &ColumnSet) -> Vec<Column> {
        set.members().map(|i| self.columns[i].clone()).collect()
    }

    fn assemble(mut self) -> Profile {
        let mut functional_dependencies = Vec::new();
        for sid in self.singletons.iter().flatten() {
            let space = &self.spaces[*sid];
            let Some(dependent) = space.columns.members().next() else {
                continue;
            };
            for determinant in &space.dependents {
                functional_dependencies.push(FunctionalDependency {
                    determinants: self.to_columns(determinant),
                    dependent: self.columns[dependent].clone(),
                });
            }
        }

        let mut emitted: Vec<(ColumnSet, Distribution)> = self.distributions.drain().collect();
        emitted.sort_by(|(a, _), (b, _)| {
            a.cardinality().cmp(&b.cardinality()).then_with(|| a.cmp(b))
        });
        let distributions = emitted.into_iter().map(|(_, d)| d).collect();

        Profile {
            row_count: self.row_count,
            columns: self.columns.to_vec(),
            distributions,
            uniques: self.uniques,
            functional_dependencies,
        }
    }
}
