//! # Table Profiler
//!
//! A column-set statistical profiler. Given a restartable stream of rows
//! and a column schema, it discovers, across subsets of columns, the number
//! of distinct value combinations, compact value lists for small columns,
//! unique keys, and minimal functional dependencies.
//!
//! With N columns there are 2^N subsets, so the main engine runs a
//! bounded-memory, pass-limited search: each pass streams the rows once
//! through a bounded batch of per-combination collectors, then expands only
//! the combinations whose observed cardinality is surprising relative to
//! what their sub-combinations predict.
//!
//! ## Quick Start
//!
//! ```rust
//! use table_profiler::{CombinationProfiler, Column, MemoryRows, Profiler, Value};
//!
//! let columns = vec![
//!     Column::new(0, "DEPTNO"),
//!     Column::new(1, "DNAME"),
//!     Column::new(2, "LOC"),
//! ];
//! let mut rows = MemoryRows::new(vec![
//!     vec![Value::Int64(10), Value::str("ACCOUNTING"), Value::str("NEW YORK")],
//!     vec![Value::Int64(20), Value::str("RESEARCH"), Value::str("DALLAS")],
//!     vec![Value::Int64(30), Value::str("SALES"), Value::str("CHICAGO")],
//!     vec![Value::Int64(40), Value::str("OPERATIONS"), Value::str("BOSTON")],
//! ]);
//!
//! let profiler = CombinationProfiler::new();
//! let profile = profiler.profile(&mut rows, &columns).unwrap();
//!
//! assert_eq!(profile.row_count, 4);
//! assert!(profile.is_unique(&[0])); // DEPTNO is a key
//! ```

// Internal modules
pub mod config;
pub mod engine;
pub mod error;
pub mod profile;
pub mod rows;
pub mod search;

// Public API - main types users need
pub use config::{ExpansionOrder, ProfilerConfig};
pub use engine::{CombinationProfiler, CombinationProfilerBuilder, ExhaustiveProfiler, Profiler};
pub use error::{ProfilerError, ProfilerResult};
pub use profile::{Distribution, FunctionalDependency, Profile, Unique};
pub use rows::{Column, MemoryRows, Row, RowSource, Value};

// Re-exports for custom interest predicates
pub use search::run::InterestPredicate;
pub use search::space::Space;
