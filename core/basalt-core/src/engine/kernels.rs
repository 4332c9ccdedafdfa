//! Aggregate and vector kernels, plus tuple materialization.
//!
//! Every kernel reads its operands, builds a fresh transient column and
//! leaves the inputs untouched; the executor binds results into the
//! session's variable pool.

use crate::error::{BasaltError, BasaltResult};
use crate::storage::{Column, Value, ValueType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtremeKind {
    Min,
    Max,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorKind {
    Add,
    Sub,
}

/// Length-1 column holding the extremum of `vec`.
pub fn extreme(vec: &Column, kind: ExtremeKind) -> BasaltResult<Column> {
    let idx = extreme_index(vec, kind)?;
    Ok(Column::transient(vec.ty(), vec![vec.value(idx)]))
}

/// Extremum value plus its position, each as a length-1 column.
///
/// Without `vec_pos` the position is the index within `vec_val`; with it
/// the index routes through a prior scan's position vector.
pub fn extreme_with_index(
    vec_val: &Column,
    vec_pos: Option<&Column>,
    kind: ExtremeKind,
) -> BasaltResult<(Column, Column)> {
    let idx = extreme_index(vec_val, kind)?;
    let position = match vec_pos {
        Some(pos) => {
            if idx >= pos.count() {
                return Err(BasaltError::InvalidOperand(format!(
                    "position vector has {} entries, value vector has {}",
                    pos.count(),
                    vec_val.count()
                )));
            }
            pos.value(idx)
        }
        None => Value::from_position(idx),
    };
    let pos_col = Column::transient(ValueType::Long, vec![position]);
    let val_col = Column::transient(vec_val.ty(), vec![vec_val.value(idx)]);
    Ok((pos_col, val_col))
}

fn extreme_index(vec: &Column, kind: ExtremeKind) -> BasaltResult<usize> {
    if vec.is_empty() {
        return Err(BasaltError::InvalidOperand(
            "extreme of an empty vector".into(),
        ));
    }
    let ty = vec.ty();
    let mut best = 0;
    for i in 1..vec.count() {
        let better = match kind {
            ExtremeKind::Min => vec.value(i).as_key(ty) < vec.value(best).as_key(ty),
            ExtremeKind::Max => vec.value(i).as_key(ty) > vec.value(best).as_key(ty),
        };
        if better {
            best = i;
        }
    }
    Ok(best)
}

/// Mean of `vec` as a length-1 DOUBLE column.
///
/// Values accumulate into a 64-bit integer before the floating divide.
pub fn average(vec: &Column) -> BasaltResult<Column> {
    if vec.is_empty() {
        return Err(BasaltError::InvalidOperand(
            "average of an empty vector".into(),
        ));
    }
    let ty = vec.ty();
    let mut sum: i64 = 0;
    for v in vec.values() {
        sum += v.as_key(ty);
    }
    let mean = sum as f64 / vec.count() as f64;
    Ok(Column::transient(
        ValueType::Double,
        vec![Value::from_double(mean)],
    ))
}

/// Elementwise add or subtract; the result widens to LONGINT.
pub fn vector_op(a: &Column, b: &Column, kind: VectorKind) -> BasaltResult<Column> {
    if a.count() != b.count() {
        return Err(BasaltError::InvalidOperand(format!(
            "vectors of different size: {}, {}",
            a.count(),
            b.count()
        )));
    }
    let (ta, tb) = (a.ty(), b.ty());
    let mut out = Vec::with_capacity(a.count());
    for i in 0..a.count() {
        let (x, y) = (a.value(i).as_key(ta), b.value(i).as_key(tb));
        let v = match kind {
            VectorKind::Add => x + y,
            VectorKind::Sub => x - y,
        };
        out.push(Value::from_long(v));
    }
    Ok(Column::transient(ValueType::Long, out))
}

/// Render `columns` as comma-separated rows, one line per row.
///
/// Each value prints per its column's type; all columns must agree on
/// their count.
pub fn materialize(columns: &[&Column]) -> BasaltResult<String> {
    let Some(first) = columns.first() else {
        return Ok(String::new());
    };
    let rows = first.count();
    if columns.iter().any(|c| c.count() != rows) {
        return Err(BasaltError::InvalidOperand(
            "tuple over columns of unequal length".into(),
        ));
    }

    let mut out = String::new();
    for row in 0..rows {
        for (i, col) in columns.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            out.push_str(&col.ty().format(col.value(row)));
        }
        out.push('\n');
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(vs: &[i32]) -> Column {
        Column::transient(
            ValueType::Int,
            vs.iter().copied().map(Value::from_int).collect(),
        )
    }

    fn longs(vs: &[i64]) -> Column {
        Column::transient(
            ValueType::Long,
            vs.iter().copied().map(Value::from_long).collect(),
        )
    }

    #[test]
    fn extreme_min_and_max() {
        let vec = ints(&[9, 5, 7, 1, 8]);
        assert_eq!(extreme(&vec, ExtremeKind::Min).unwrap().value(0).as_int(), 1);
        assert_eq!(extreme(&vec, ExtremeKind::Max).unwrap().value(0).as_int(), 9);
    }

    #[test]
    fn extreme_of_empty_rejected() {
        let vec = ints(&[]);
        assert!(matches!(
            extreme(&vec, ExtremeKind::Min).unwrap_err(),
            BasaltError::InvalidOperand(_)
        ));
    }

    #[test]
    fn extreme_with_index_direct() {
        let vec = ints(&[9, 5, 7, 1, 8]);
        let (pos, val) = extreme_with_index(&vec, None, ExtremeKind::Min).unwrap();
        assert_eq!(pos.value(0).as_position(), 3);
        assert_eq!(val.value(0).as_int(), 1);
    }

    #[test]
    fn extreme_with_index_indirect() {
        let vec = ints(&[9, 5, 7, 1, 8]);
        let through = longs(&[10, 11, 12, 13, 14]);
        let (pos, val) = extreme_with_index(&vec, Some(&through), ExtremeKind::Min).unwrap();
        assert_eq!(pos.value(0).as_long(), 13);
        assert_eq!(val.value(0).as_int(), 1);
    }

    #[test]
    fn extreme_ties_keep_first() {
        let vec = ints(&[4, 1, 1]);
        let (pos, _) = extreme_with_index(&vec, None, ExtremeKind::Min).unwrap();
        assert_eq!(pos.value(0).as_position(), 1);
    }

    #[test]
    fn average_formats_as_double() {
        let vec = ints(&[1, 2, 3, 4]);
        let avg = average(&vec).unwrap();
        assert_eq!(avg.ty(), ValueType::Double);
        assert_eq!(avg.count(), 1);
        assert_eq!(
            ValueType::Double.format(avg.value(0)),
            "2.500000000000"
        );
    }

    #[test]
    fn vector_add_and_sub_widen_to_long() {
        let a = ints(&[1, 2, 3]);
        let b = ints(&[10, 20, 30]);
        let sum = vector_op(&a, &b, VectorKind::Add).unwrap();
        assert_eq!(sum.ty(), ValueType::Long);
        let out: Vec<i64> = sum.values().iter().map(|v| v.as_long()).collect();
        assert_eq!(out, vec![11, 22, 33]);

        let diff = vector_op(&b, &a, VectorKind::Sub).unwrap();
        let out: Vec<i64> = diff.values().iter().map(|v| v.as_long()).collect();
        assert_eq!(out, vec![9, 18, 27]);
    }

    #[test]
    fn vector_op_size_mismatch_rejected() {
        let a = ints(&[1]);
        let b = ints(&[1, 2]);
        assert!(matches!(
            vector_op(&a, &b, VectorKind::Add).unwrap_err(),
            BasaltError::InvalidOperand(_)
        ));
    }

    #[test]
    fn materialize_rows() {
        let a = ints(&[1, 2]);
        let b = longs(&[10, 20]);
        let out = materialize(&[&a, &b]).unwrap();
        assert_eq!(out, "1,10\n2,20\n");
    }

    #[test]
    fn materialize_mixed_types() {
        let a = ints(&[7]);
        let avg = average(&ints(&[1, 2])).unwrap();
        let out = materialize(&[&a, &avg]).unwrap();
        assert_eq!(out, "7,1.500000000000\n");
    }

    #[test]
    fn materialize_unequal_counts_rejected() {
        let a = ints(&[1, 2]);
        let b = ints(&[1]);
        assert!(matches!(
            materialize(&[&a, &b]).unwrap_err(),
            BasaltError::InvalidOperand(_)
        ));
    }

    #[test]
    fn materialize_nothing() {
        assert_eq!(materialize(&[]).unwrap(), "");
    }
}
