//! Growable columns of fixed-width values.

use crate::error::{BasaltError, BasaltResult};
use crate::storage::index::ColumnIndex;
use crate::storage::value::{Value, ValueType};

/// Slots allocated the first time a column takes data.
pub const INITIAL_CAPACITY: usize = 1024;

/// A named, typed, growable vector of 64-bit values.
///
/// `name == None` marks a transient result vector produced by a query
/// kernel; those live in the per-session variable pool, never in the
/// resource pool. Capacity grows by doubling plus one and `count` never
/// exceeds it.
#[derive(Debug)]
pub struct Column {
    name: Option<String>,
    ty: ValueType,
    data: Vec<Value>,
    index: Option<ColumnIndex>,
}

impl Column {
    /// A persistent column registered under `name`.
    pub fn named(name: &str, ty: ValueType) -> Self {
        Column {
            name: Some(name.to_string()),
            ty,
            data: Vec::new(),
            index: None,
        }
    }

    /// A transient result vector.
    pub fn transient(ty: ValueType, data: Vec<Value>) -> Self {
        Column {
            name: None,
            ty,
            data,
            index: None,
        }
    }

    /// Rebuild a persistent column from loaded parts.
    pub fn from_parts(name: &str, ty: ValueType, data: Vec<Value>) -> Self {
        Column {
            name: Some(name.to_string()),
            ty,
            data,
            index: None,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn ty(&self) -> ValueType {
        self.ty
    }

    pub fn count(&self) -> usize {
        self.data.len()
    }

    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn value(&self, i: usize) -> Value {
        self.data[i]
    }

    pub fn values(&self) -> &[Value] {
        &self.data
    }

    pub fn index(&self) -> Option<&ColumnIndex> {
        self.index.as_ref()
    }

    pub fn index_mut(&mut self) -> Option<&mut ColumnIndex> {
        self.index.as_mut()
    }

    pub fn set_index(&mut self, index: Option<ColumnIndex>) {
        self.index = index;
    }

    pub(crate) fn data_mut(&mut self) -> &mut [Value] {
        &mut self.data
    }

    pub(crate) fn replace_data(&mut self, data: Vec<Value>) {
        self.data = data;
    }

    /// Append a value at the end, maintaining the index if one exists.
    pub fn push(&mut self, v: Value) -> BasaltResult<()> {
        self.insert(self.data.len(), v)
    }

    /// Insert at `pos`, shifting the suffix right by one.
    ///
    /// The index is probed before the data moves, so a refused insert
    /// leaves the column exactly as it was.
    pub fn insert(&mut self, pos: usize, v: Value) -> BasaltResult<()> {
        if pos > self.data.len() {
            return Err(BasaltError::InvalidOperand(format!(
                "insert position {pos} past column count {}",
                self.data.len()
            )));
        }
        self.check_insert(v)?;
        self.reserve_slot();
        self.data.insert(pos, v);
        if let Some(idx) = self.index.as_mut() {
            idx.on_insert(self.ty, pos, v)?;
        }
        Ok(())
    }

    /// Whether an insert of `v` could complete, index maintenance included.
    pub fn check_insert(&self, v: Value) -> BasaltResult<()> {
        match self.index.as_ref() {
            Some(idx) => idx.check_insert(v),
            None => Ok(()),
        }
    }

    /// Grow by doubling plus one; the first allocation takes 1024 slots.
    fn reserve_slot(&mut self) {
        if self.data.len() == self.data.capacity() {
            let target = if self.data.capacity() == 0 {
                INITIAL_CAPACITY
            } else {
                2 * self.data.len() + 1
            };
            self.data.reserve_exact(target - self.data.len());
        }
    }

    /// New transient column whose i-th entry is `self[positions[i]]`.
    pub fn fetch(&self, positions: &[Value]) -> BasaltResult<Column> {
        let mut out = Vec::with_capacity(positions.len());
        for p in positions {
            let i = p.as_position();
            if i >= self.data.len() {
                return Err(BasaltError::InvalidOperand(format!(
                    "fetch position {i} out of range ({} rows)",
                    self.data.len()
                )));
            }
            out.push(self.data[i]);
        }
        Ok(Column::transient(self.ty, out))
    }

    /// Remove the rows at `positions`. Future work.
    pub fn delete(&mut self, _positions: &[Value]) -> BasaltResult<()> {
        Err(BasaltError::Unimplemented("column delete".into()))
    }

    /// Overwrite the rows at `positions` with `new_value`. Future work.
    pub fn update(&mut self, _positions: &[Value], _new_value: Value) -> BasaltResult<()> {
        Err(BasaltError::Unimplemented("column update".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::index::{ColumnIndex, IndexData, IndexKind};

    #[test]
    fn capacity_discipline() {
        let mut col = Column::named("db1.t.a", ValueType::Int);
        assert_eq!(col.capacity(), 0);
        col.push(Value::from_int(1)).unwrap();
        assert_eq!(col.capacity(), INITIAL_CAPACITY);
        for i in 0..INITIAL_CAPACITY as i32 {
            col.push(Value::from_int(i)).unwrap();
        }
        // One slot past the initial block: doubled plus one.
        assert_eq!(col.capacity(), 2 * INITIAL_CAPACITY + 1);
        assert!(col.count() <= col.capacity());
    }

    #[test]
    fn insert_shifts_suffix() {
        let mut col = Column::named("db1.t.a", ValueType::Int);
        for v in [1, 2, 4] {
            col.push(Value::from_int(v)).unwrap();
        }
        col.insert(2, Value::from_int(3)).unwrap();
        let out: Vec<i32> = col.values().iter().map(|v| v.as_int()).collect();
        assert_eq!(out, vec![1, 2, 3, 4]);
    }

    #[test]
    fn insert_past_end_rejected() {
        let mut col = Column::named("db1.t.a", ValueType::Int);
        let err = col.insert(1, Value::from_int(9)).unwrap_err();
        assert!(matches!(err, BasaltError::InvalidOperand(_)));
    }

    #[test]
    fn fetch_copies_positions() {
        let mut col = Column::named("db1.t.a", ValueType::Int);
        for v in [10, 20, 30] {
            col.push(Value::from_int(v)).unwrap();
        }
        let positions = vec![Value::from_position(2), Value::from_position(0)];
        let out = col.fetch(&positions).unwrap();
        assert!(out.name().is_none());
        assert_eq!(out.ty(), ValueType::Int);
        let vals: Vec<i32> = out.values().iter().map(|v| v.as_int()).collect();
        assert_eq!(vals, vec![30, 10]);
    }

    #[test]
    fn fetch_out_of_range_rejected() {
        let col = Column::named("db1.t.a", ValueType::Int);
        let err = col.fetch(&[Value::from_position(0)]).unwrap_err();
        assert!(matches!(err, BasaltError::InvalidOperand(_)));
    }

    #[test]
    fn push_maintains_secondary_index() {
        let mut col = Column::named("db1.t.a", ValueType::Int);
        for v in [5, 1, 3] {
            col.push(Value::from_int(v)).unwrap();
        }
        col.set_index(Some(ColumnIndex::secondary(
            col.values(),
            ValueType::Int,
            IndexKind::Sorted,
        )));
        col.push(Value::from_int(2)).unwrap();

        let Some(idx) = col.index() else {
            panic!("index dropped");
        };
        let IndexData::Sorted(s) = &idx.data else {
            panic!("expected sorted index");
        };
        let keys: Vec<i32> = s.keys.iter().map(|v| v.as_int()).collect();
        assert_eq!(keys, vec![1, 2, 3, 5]);
        for (i, p) in s.positions.iter().enumerate() {
            assert_eq!(col.value(p.as_position()), s.keys[i]);
        }
    }

    #[test]
    fn refused_index_insert_leaves_count_unchanged() {
        use crate::storage::btree::{CAPACITY, FANOUT};

        let mut col = Column::named("db1.t.a", ValueType::Int);
        for i in 0..CAPACITY as i32 {
            col.push(Value::from_int(i)).unwrap();
        }
        col.set_index(Some(ColumnIndex::secondary(
            col.values(),
            ValueType::Int,
            IndexKind::BTree,
        )));
        // Fill the single leaf to the fanout, then one more must bounce.
        for i in CAPACITY..FANOUT {
            col.push(Value::from_int(i as i32)).unwrap();
        }
        let count = col.count();
        let err = col.push(Value::from_int(0)).unwrap_err();
        assert!(matches!(err, BasaltError::Unimplemented(_)));
        assert_eq!(col.count(), count);
    }

    #[test]
    fn delete_and_update_are_future_work() {
        let mut col = Column::named("db1.t.a", ValueType::Int);
        assert!(matches!(
            col.delete(&[]).unwrap_err(),
            BasaltError::Unimplemented(_)
        ));
        assert!(matches!(
            col.update(&[], Value::from_int(0)).unwrap_err(),
            BasaltError::Unimplemented(_)
        ));
    }
}
