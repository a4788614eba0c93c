/// Combination-search machinery: the column bit-set, per-combination
/// collectors, the space arena, the partial-order index, the
/// expected-cardinality model and the pass controller.
pub mod collector;
pub mod column_set;
pub mod estimate;
pub mod lattice;
pub mod run;
pub mod sketch;
pub mod space;
