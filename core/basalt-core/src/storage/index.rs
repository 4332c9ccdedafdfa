//! Column index wrapper.
//!
//! A column carries at most one index: a sorted twin-vector or a B⁺-tree,
//! plus a flag telling whether the column is the table's cluster column.
//! For a clustered column the sorted form is degenerate (the base data is
//! already the sorted order) while the tree form still stores payloads.

use crate::error::{BasaltError, BasaltResult};
use crate::storage::btree::BPlusTree;
use crate::storage::sorted::SortedIndex;
use crate::storage::value::{Value, ValueType};

/// Which index family a column uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    Sorted,
    BTree,
}

impl IndexKind {
    /// Metadata-file spelling of this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            IndexKind::Sorted => "sorted",
            IndexKind::BTree => "btree",
        }
    }
}

/// The index payload, one of the two families.
#[derive(Debug)]
pub enum IndexData {
    Sorted(SortedIndex),
    BTree(BPlusTree),
}

/// An index owned by exactly one column; dropping the column drops it.
#[derive(Debug)]
pub struct ColumnIndex {
    pub data: IndexData,
    /// The owning column is the table's cluster column.
    pub clustered: bool,
}

impl ColumnIndex {
    /// Degenerate index for a freshly declared cluster column.
    pub fn clustered_sorted() -> Self {
        ColumnIndex {
            data: IndexData::Sorted(SortedIndex::default()),
            clustered: true,
        }
    }

    /// Build a secondary index over a snapshot of the base column.
    pub fn secondary(values: &[Value], ty: ValueType, kind: IndexKind) -> Self {
        let sorted = SortedIndex::build(values, ty);
        let data = match kind {
            IndexKind::Sorted => IndexData::Sorted(sorted),
            IndexKind::BTree => {
                IndexData::BTree(BPlusTree::bulk_load(&sorted.keys, &sorted.positions, ty))
            }
        };
        ColumnIndex {
            data,
            clustered: false,
        }
    }

    pub fn kind(&self) -> IndexKind {
        match self.data {
            IndexData::Sorted(_) => IndexKind::Sorted,
            IndexData::BTree(_) => IndexKind::BTree,
        }
    }

    /// Whether an insert of `value` could complete without overflowing.
    ///
    /// Only a full B⁺-tree leaf refuses a key; probing up front lets
    /// callers keep their own state untouched on refusal.
    pub fn check_insert(&self, value: Value) -> BasaltResult<()> {
        match &self.data {
            IndexData::BTree(tree) if !tree.has_room_for(value) => Err(
                BasaltError::Unimplemented("b+tree leaf split on overflow".into()),
            ),
            _ => Ok(()),
        }
    }

    /// Maintain the index for an insert of `value` at base position `pos`.
    ///
    /// Appends never shift anything; a mid-column insert first moves the
    /// stored positions that the base shift displaced. Refusal happens
    /// before the shift, so a failed insert leaves the index untouched.
    pub fn on_insert(&mut self, ty: ValueType, pos: usize, value: Value) -> BasaltResult<()> {
        self.check_insert(value)?;
        match &mut self.data {
            // The base data is the index; nothing extra to do.
            IndexData::Sorted(_) if self.clustered => Ok(()),
            IndexData::Sorted(idx) => {
                idx.insert(ty, pos, value);
                Ok(())
            }
            IndexData::BTree(tree) => {
                tree.shift_positions_from(pos);
                tree.insert(value, Value::from_position(pos))
            }
        }
    }

    /// Swap index families in place, reusing the already ordered content.
    ///
    /// On a clustered column the base data is the sorted order, so the
    /// identity permutation stands in for the missing positions vector.
    pub fn convert(&mut self, base: &[Value], ty: ValueType, kind: IndexKind) {
        if self.kind() == kind {
            return;
        }
        self.data = match &self.data {
            IndexData::Sorted(idx) => {
                let tree = if self.clustered {
                    let positions: Vec<Value> = (0..base.len()).map(Value::from_position).collect();
                    BPlusTree::bulk_load(base, &positions, ty)
                } else {
                    BPlusTree::bulk_load(&idx.keys, &idx.positions, ty)
                };
                IndexData::BTree(tree)
            }
            IndexData::BTree(tree) => {
                if self.clustered {
                    IndexData::Sorted(SortedIndex::default())
                } else {
                    let (keys, positions) = tree.extract_all();
                    IndexData::Sorted(SortedIndex { keys, positions })
                }
            }
        };
    }

    /// Rebuild after the base column was physically reordered.
    pub fn rebuild(&mut self, base: &[Value], ty: ValueType) {
        if self.clustered {
            if let IndexData::BTree(_) = self.data {
                let positions: Vec<Value> = (0..base.len()).map(Value::from_position).collect();
                self.data = IndexData::BTree(BPlusTree::bulk_load(base, &positions, ty));
            }
            // Degenerate sorted form follows the base data by definition.
        } else {
            *self = ColumnIndex::secondary(base, ty, self.kind());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(vs: &[i32]) -> Vec<Value> {
        vs.iter().copied().map(Value::from_int).collect()
    }

    #[test]
    fn secondary_sorted_tracks_base() {
        let base = ints(&[7, 3, 5]);
        let idx = ColumnIndex::secondary(&base, ValueType::Int, IndexKind::Sorted);
        assert_eq!(idx.kind(), IndexKind::Sorted);
        assert!(!idx.clustered);
        let IndexData::Sorted(s) = &idx.data else {
            panic!("expected sorted index");
        };
        for (i, p) in s.positions.iter().enumerate() {
            assert_eq!(base[p.as_position()], s.keys[i]);
        }
    }

    #[test]
    fn secondary_btree_holds_permutation() {
        let base = ints(&[9, 1, 4, 1]);
        let idx = ColumnIndex::secondary(&base, ValueType::Int, IndexKind::BTree);
        let IndexData::BTree(tree) = &idx.data else {
            panic!("expected btree index");
        };
        let (keys, positions) = tree.extract_all();
        let sorted: Vec<i32> = keys.iter().map(|k| k.as_int()).collect();
        assert_eq!(sorted, vec![1, 1, 4, 9]);
        for (k, p) in keys.iter().zip(positions.iter()) {
            assert_eq!(base[p.as_position()], *k);
        }
    }

    #[test]
    fn convert_round_trip() {
        let base = ints(&[4, 2, 8]);
        let mut idx = ColumnIndex::secondary(&base, ValueType::Int, IndexKind::Sorted);
        idx.convert(&base, ValueType::Int, IndexKind::BTree);
        assert_eq!(idx.kind(), IndexKind::BTree);
        idx.convert(&base, ValueType::Int, IndexKind::Sorted);
        assert_eq!(idx.kind(), IndexKind::Sorted);
        let IndexData::Sorted(s) = &idx.data else {
            panic!("expected sorted index");
        };
        for (i, p) in s.positions.iter().enumerate() {
            assert_eq!(base[p.as_position()], s.keys[i]);
        }
    }

    #[test]
    fn clustered_convert_uses_identity_positions() {
        let base = ints(&[1, 2, 3]);
        let mut idx = ColumnIndex::clustered_sorted();
        idx.convert(&base, ValueType::Int, IndexKind::BTree);
        assert!(idx.clustered);
        let IndexData::BTree(tree) = &idx.data else {
            panic!("expected btree index");
        };
        let (_, positions) = tree.extract_all();
        let p: Vec<usize> = positions.iter().map(|v| v.as_position()).collect();
        assert_eq!(p, vec![0, 1, 2]);
    }

    #[test]
    fn clustered_sorted_insert_is_a_no_op() {
        let mut idx = ColumnIndex::clustered_sorted();
        idx.on_insert(ValueType::Int, 0, Value::from_int(5)).unwrap();
        let IndexData::Sorted(s) = &idx.data else {
            panic!("expected sorted index");
        };
        assert!(s.is_empty());
    }
}
