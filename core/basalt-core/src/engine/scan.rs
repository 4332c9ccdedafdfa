//! Predicate evaluation and the scan paths.
//!
//! A comparator is a chain of clauses evaluated strictly left to right:
//! the first clause combines into `true` under AND, and the junction
//! stored on clause k governs how clause k+1 combines. There is no
//! precedence between AND and OR.

use crate::error::{BasaltError, BasaltResult};
use crate::storage::sorted::{lower_bound, upper_bound};
use crate::storage::{Column, ColumnIndex, IndexData, Value, ValueType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareKind {
    LessThan,
    GreaterThan,
    Equal,
    LessEq,
    GreaterEq,
}

/// How the following clause combines with the result so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Junction {
    And,
    Or,
    None,
}

#[derive(Debug, Clone, Copy)]
pub struct Clause {
    pub kind: CompareKind,
    pub value: i64,
    pub junction: Junction,
}

impl Clause {
    fn hit(&self, value: i64) -> bool {
        match self.kind {
            CompareKind::LessThan => value < self.value,
            CompareKind::GreaterThan => value > self.value,
            CompareKind::Equal => value == self.value,
            CompareKind::LessEq => value <= self.value,
            CompareKind::GreaterEq => value >= self.value,
        }
    }
}

/// A chain of clauses forming one predicate.
#[derive(Debug, Clone, Default)]
pub struct Comparator {
    pub clauses: Vec<Clause>,
}

impl Comparator {
    /// The select command's `[lo, hi)` range; either bound may be absent.
    pub fn range(lo: Option<i64>, hi: Option<i64>) -> Self {
        let mut clauses = Vec::new();
        if let Some(hi) = hi {
            clauses.push(Clause {
                kind: CompareKind::LessThan,
                value: hi,
                junction: Junction::And,
            });
        }
        if let Some(lo) = lo {
            clauses.push(Clause {
                kind: CompareKind::GreaterEq,
                value: lo,
                junction: Junction::None,
            });
        }
        Comparator { clauses }
    }

    pub fn matches(&self, value: i64) -> bool {
        let mut success = true;
        let mut mode = Junction::And;
        for clause in &self.clauses {
            let hit = clause.hit(value);
            success = match mode {
                Junction::And => success && hit,
                _ => success || hit,
            };
            mode = clause.junction;
        }
        success
    }

    /// At most one lower and one upper bound, each `(value, inclusive)`,
    /// for pushing a range into an index. Later clauses of the same
    /// direction are ignored.
    pub fn bounds(&self) -> (Option<(i64, bool)>, Option<(i64, bool)>) {
        let mut lower = None;
        let mut upper = None;
        for clause in &self.clauses {
            match clause.kind {
                CompareKind::GreaterThan if lower.is_none() => {
                    lower = Some((clause.value, false));
                }
                CompareKind::GreaterEq if lower.is_none() => {
                    lower = Some((clause.value, true));
                }
                CompareKind::LessThan if upper.is_none() => {
                    upper = Some((clause.value, false));
                }
                CompareKind::LessEq if upper.is_none() => {
                    upper = Some((clause.value, true));
                }
                _ => {}
            }
        }
        (lower, upper)
    }
}

/// Scan `col` under `pred`, optionally restricted to `input` positions.
///
/// Dispatches to the index scan when the column is indexed. Over a
/// transient value vector the input positions run parallel to the values;
/// over a named column they index into it. The result is a fresh position
/// vector and no input is touched.
pub fn col_scan(col: &Column, pred: &Comparator, input: Option<&Column>) -> BasaltResult<Column> {
    if let Some(idx) = col.index() {
        return index_scan(col, idx, pred, input);
    }

    let ty = col.ty();
    let mut out = Vec::new();
    match input {
        None => {
            for i in 0..col.count() {
                if pred.matches(col.value(i).as_key(ty)) {
                    out.push(Value::from_position(i));
                }
            }
        }
        Some(positions) if col.name().is_none() => {
            // Value vector produced by an earlier fetch: entry k pairs
            // with positions[k].
            if positions.count() != col.count() {
                return Err(BasaltError::InvalidOperand(format!(
                    "position vector has {} entries, value vector has {}",
                    positions.count(),
                    col.count()
                )));
            }
            for k in 0..col.count() {
                if pred.matches(col.value(k).as_key(ty)) {
                    out.push(positions.value(k));
                }
            }
        }
        Some(positions) => {
            for k in 0..positions.count() {
                let p = positions.value(k).as_position();
                if p >= col.count() {
                    return Err(BasaltError::InvalidOperand(format!(
                        "scan position {p} out of range ({} rows)",
                        col.count()
                    )));
                }
                if pred.matches(col.value(p).as_key(ty)) {
                    out.push(positions.value(k));
                }
            }
        }
    }
    Ok(Column::transient(ValueType::Long, out))
}

/// Push the predicate's range bounds into the column's index.
fn index_scan(
    col: &Column,
    idx: &ColumnIndex,
    pred: &Comparator,
    input: Option<&Column>,
) -> BasaltResult<Column> {
    let ty = col.ty();
    let (lower, upper) = pred.bounds();

    let positions: Vec<Value> = match &idx.data {
        IndexData::Sorted(sorted) => {
            // Clustered means the base data is the sorted order and the
            // matching slots are themselves the positions.
            let keys: &[Value] = if idx.clustered { col.values() } else { &sorted.keys };
            let lo = match lower {
                Some((v, true)) => lower_bound(keys, ty, v),
                Some((v, false)) => upper_bound(keys, ty, v),
                None => 0,
            };
            let hi = match upper {
                Some((v, true)) => upper_bound(keys, ty, v),
                Some((v, false)) => lower_bound(keys, ty, v),
                None => keys.len(),
            };
            let hi = hi.max(lo);
            if idx.clustered {
                (lo..hi).map(Value::from_position).collect()
            } else {
                sorted.positions[lo..hi].to_vec()
            }
        }
        IndexData::BTree(tree) => tree.range_positions(lower, upper),
    };

    let result = match input {
        Some(existing) => intersect_positions(existing.values(), &positions),
        None => positions,
    };
    Ok(Column::transient(ValueType::Long, result))
}

/// Sort both position sets and merge their intersection.
fn intersect_positions(a: &[Value], b: &[Value]) -> Vec<Value> {
    let mut xs: Vec<i64> = a.iter().map(|v| v.as_long()).collect();
    let mut ys: Vec<i64> = b.iter().map(|v| v.as_long()).collect();
    xs.sort_unstable();
    ys.sort_unstable();

    let mut out = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < xs.len() && j < ys.len() {
        if xs[i] < ys[j] {
            i += 1;
        } else if xs[i] > ys[j] {
            j += 1;
        } else {
            out.push(Value::from_long(xs[i]));
            i += 1;
            j += 1;
        }
    }
    out
}
