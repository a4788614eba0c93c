/// Row model for the profiler
///
/// The profiler consumes a restartable stream of rows. A row is an ordered
/// sequence of `Value`s, one per column; SQL NULL is represented by the
/// `Value::Null` sentinel. Values are opaque to the engine: all it needs is
/// total ordering, equality and hashing.
use serde::{Deserialize, Serialize};

/// A single cell value. Totally ordered across variants so that collectors
/// can keep ordered sets of mixed columns; ordering between variants is by
/// type rank and carries no semantic meaning.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Value {
    Int64(i64),
    Float64(f64),
    Str(String),
    Bool(bool),
    Null,
}

impl Value {
    /// Convenience constructor for string values.
    pub fn str(v: impl Into<String>) -> Self {
        Value::Str(v.into())
    }

    /// Whether this value is the null sentinel.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Int64(v) => write!(f, "{}", v),
            Value::Float64(v) => write!(f, "{}", v),
            Value::Str(v) => write!(f, "{}", v),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Null => write!(f, "NULL"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int64(a), Value::Int64(b)) => a == b,
            (Value::Float64(a), Value::Float64(b)) => {
                ordered_float::OrderedFloat(*a) == ordered_float::OrderedFloat(*b)
            }
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Null, Value::Null) => true,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        match (self, other) {
            (Value::Int64(a), Value::Int64(b)) => a.cmp(b),
            (Value::Float64(a), Value::Float64(b)) => {
                ordered_float::OrderedFloat(*a).cmp(&ordered_float::OrderedFloat(*b))
            }
            (Value::Str(a), Value::Str(b)) => a.cmp(b),
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Null, Value::Null) => std::cmp::Ordering::Equal,
            // Type-based ordering: Int64 < Float64 < Str < Bool < Null
            (Value::Int64(_), _) => std::cmp::Ordering::Less,
            (Value::Float64(_), Value::Int64(_)) => std::cmp::Ordering::Greater,
            (Value::Float64(_), _) => std::cmp::Ordering::Less,
            (Value::Str(_), Value::Int64(_) | Value::Float64(_)) => std::cmp::Ordering::Greater,
            (Value::Str(_), _) => std::cmp::Ordering::Less,
            (Value::Bool(_), Value::Null) => std::cmp::Ordering::Less,
            (Value::Bool(_), _) => std::cmp::Ordering::Greater,
            (Value::Null, _) => std::cmp::Ordering::Greater,
        }
    }
}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match self {
            Value::Int64(v) => {
                0u8.hash(state);
                v.hash(state);
            }
            Value::Float64(v) => {
                1u8.hash(state);
                v.to_bits().hash(state);
            }
            Value::Str(v) => {
                2u8.hash(state);
                v.hash(state);
            }
            Value::Bool(v) => {
                3u8.hash(state);
                v.hash(state);
            }
            Value::Null => {
                4u8.hash(state);
            }
        }
    }
}

/// A row is one value per column, in schema order.
pub type Row = Vec<Value>;

/// Column descriptor. The ordinal is the column's identity and must equal
/// its position in the schema passed to the profiler.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Column {
    pub ordinal: usize,
    pub name: String,
}

impl Column {
    pub fn new(ordinal: usize, name: impl Into<String>) -> Self {
        Self {
            ordinal,
            name: name.into(),
        }
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Restartable source of rows.
///
/// The profiler makes several passes over the data; before each pass it
/// calls `restart` and then pulls rows with `next_row` until `None`. Every
/// restart must replay the same row sequence. Sources that cannot replay
/// (network cursors) must buffer or re-execute on the caller's side.
pub trait RowSource {
    /// Rewind to the first row.
    fn restart(&mut self) -> anyhow::Result<()>;

    /// The next row, or `None` at end of stream. The returned slice is only
    /// valid until the next call.
    fn next_row(&mut self) -> anyhow::Result<Option<&[Value]>>;
}

/// In-memory table, the simplest restartable source.
#[derive(Clone, Debug, Default)]
pub struct MemoryRows {
    rows: Vec<Row>,
    cursor: usize,
}

impl MemoryRows {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows, cursor: 0 }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl From<Vec<Row>> for MemoryRows {
    fn from(rows: Vec<Row>) -> Self {
        Self::new(rows)
    }
}

impl RowSource for MemoryRows {
    fn restart(&mut self) -> anyhow::Result<()> {
        self.cursor = 0;
        Ok(())
    }

    fn next_row(&mut self) -> anyhow::Result<Option<&[Value]>> {
        match self.rows.get(self.cursor) {
            Some(row) => {
                self.cursor += 1;
                Ok(Some(row.as_slice()))
            }
            None => Ok(None),
        }
    }
}
