//! Tables, databases and the clustering protocol.

use crate::error::{BasaltError, BasaltResult};
use crate::storage::column::Column;
use crate::storage::sorted::merge_sort_pairs;
use crate::storage::value::Value;

/// Named collection of owned columns with an optional cluster column.
///
/// Invariant: every column has the same count, and when a non-empty
/// cluster column is set all columns sit in the permutation induced by
/// sorting it ascending.
#[derive(Debug)]
pub struct Table {
    name: String,
    columns: Vec<Column>,
    cluster_column: Option<usize>,
}

impl Table {
    /// New table with room for `num_columns` columns.
    pub fn new(name: &str, num_columns: usize) -> Self {
        Table {
            name: name.to_string(),
            columns: Vec::with_capacity(num_columns),
            cluster_column: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, i: usize) -> &Column {
        &self.columns[i]
    }

    pub fn column_mut(&mut self, i: usize) -> &mut Column {
        &mut self.columns[i]
    }

    pub fn cluster_column(&self) -> Option<usize> {
        self.cluster_column
    }

    pub fn set_cluster_column(&mut self, i: usize) {
        self.cluster_column = Some(i);
    }

    /// Name of the cluster column, as the metadata file records it.
    pub fn cluster_column_name(&self) -> Option<&str> {
        self.cluster_column
            .and_then(|i| self.columns.get(i))
            .and_then(|c| c.name())
    }

    /// Rows currently stored (the shared count of all columns).
    pub fn row_count(&self) -> usize {
        self.columns.first().map(Column::count).unwrap_or(0)
    }

    /// Take ownership of a new column; slots grow by doubling plus one.
    pub fn add_column(&mut self, column: Column) -> usize {
        reserve_slot(&mut self.columns);
        self.columns.push(column);
        self.columns.len() - 1
    }

    /// Append one row, one value per column in table order.
    ///
    /// Every column is asked first whether it can take its value, so a
    /// refused insert rejects the whole row and the shared count stays
    /// identical across columns.
    pub fn append_row(&mut self, values: &[Value]) -> BasaltResult<()> {
        if values.len() != self.columns.len() {
            return Err(BasaltError::InvalidOperand(format!(
                "row has {} values, table '{}' has {} columns",
                values.len(),
                self.name,
                self.columns.len()
            )));
        }
        for (col, &v) in self.columns.iter().zip(values) {
            col.check_insert(v)?;
        }
        for (col, &v) in self.columns.iter_mut().zip(values) {
            col.push(v)?;
        }
        Ok(())
    }

    /// Physically order every column by the cluster column.
    ///
    /// Sorts the cluster column in place alongside an identity permutation,
    /// re-fetches every sibling column through that permutation, then
    /// rebuilds each column's index against the new ordering. A table
    /// without a cluster column is already clustered.
    pub fn cluster(&mut self) -> BasaltResult<()> {
        let Some(ci) = self.cluster_column else {
            return Ok(());
        };
        let n = self.columns[ci].count();
        if n == 0 {
            return Ok(());
        }

        let mut perm: Vec<Value> = (0..n).map(Value::from_position).collect();
        let ty = self.columns[ci].ty();
        merge_sort_pairs(self.columns[ci].data_mut(), &mut perm, ty);

        for (i, col) in self.columns.iter_mut().enumerate() {
            if i != ci {
                let reordered = col.fetch(&perm)?;
                let data = reordered.values().to_vec();
                col.replace_data(data);
            }
            if col.index().is_some() {
                let snapshot = col.values().to_vec();
                let col_ty = col.ty();
                if let Some(idx) = col.index_mut() {
                    idx.rebuild(&snapshot, col_ty);
                }
            }
        }
        Ok(())
    }
}

/// Named collection of owned tables.
#[derive(Debug)]
pub struct Database {
    name: String,
    tables: Vec<Table>,
}

impl Database {
    pub fn new(name: &str) -> Self {
        Database {
            name: name.to_string(),
            tables: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn table(&self, i: usize) -> &Table {
        &self.tables[i]
    }

    pub fn table_mut(&mut self, i: usize) -> &mut Table {
        &mut self.tables[i]
    }

    pub fn add_table(&mut self, table: Table) -> usize {
        reserve_slot(&mut self.tables);
        self.tables.push(table);
        self.tables.len() - 1
    }
}

/// Doubling-plus-one growth for a slot vector that is full.
fn reserve_slot<T>(vec: &mut Vec<T>) {
    if vec.len() == vec.capacity() {
        let target = 2 * vec.len() + 1;
        vec.reserve_exact(target - vec.len());
    }
}
