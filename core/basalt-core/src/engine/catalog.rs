//! The engine: databases, the resource pool and the dirty flag.
//!
//! All process-wide state lives here as explicit fields, created once at
//! server startup and threaded through the kernels.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::engine::pools::{ResourceId, ResourcePool, Session};
use crate::error::{BasaltError, BasaltResult};
use crate::storage::{Column, ColumnIndex, Database, IndexKind, Table, Value, ValueType};

/// Process-wide engine state.
#[derive(Debug)]
pub struct Engine {
    pub(crate) databases: Vec<Database>,
    pub(crate) resources: ResourcePool,
    /// Set by any mutating command; SHUTDOWN flushes only when set.
    pub(crate) changed: bool,
    pub(crate) data_dir: PathBuf,
}

impl Engine {
    pub fn new(data_dir: &Path) -> Self {
        Engine {
            databases: Vec::new(),
            resources: ResourcePool::new(),
            changed: false,
            data_dir: data_dir.to_path_buf(),
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.changed
    }

    pub fn database_count(&self) -> usize {
        self.databases.len()
    }

    // ════════════════════════════════════════════
    // Creation
    // ════════════════════════════════════════════

    pub fn create_db(&mut self, name: &str) -> BasaltResult<()> {
        self.resources.register(name, ResourceId::Db(self.databases.len()))?;
        self.databases.push(Database::new(name));
        self.changed = true;
        info!("created database {name}");
        Ok(())
    }

    /// Create `full_name` (`db.tbl`) in `db_name` with room for
    /// `num_columns` columns.
    pub fn create_table(
        &mut self,
        full_name: &str,
        db_name: &str,
        num_columns: usize,
    ) -> BasaltResult<()> {
        let Some(ResourceId::Db(di)) = self.resources.get(db_name) else {
            return Err(BasaltError::NotFound(db_name.to_string()));
        };
        if self.resources.contains(full_name) {
            return Err(BasaltError::AlreadyExists(full_name.to_string()));
        }
        let ti = self.databases[di].add_table(Table::new(full_name, num_columns));
        self.resources.register(full_name, ResourceId::Table(di, ti))?;
        self.changed = true;
        info!("created table {full_name}");
        Ok(())
    }

    /// Create `full_name` (`db.tbl.col`) in `table_name`. A sorted column
    /// becomes the table's cluster column with a degenerate index.
    pub fn create_column(
        &mut self,
        full_name: &str,
        table_name: &str,
        sorted: bool,
    ) -> BasaltResult<()> {
        let Some(ResourceId::Table(di, ti)) = self.resources.get(table_name) else {
            return Err(BasaltError::NotFound(table_name.to_string()));
        };
        if self.resources.contains(full_name) {
            return Err(BasaltError::AlreadyExists(full_name.to_string()));
        }
        let mut column = Column::named(full_name, ValueType::Int);
        if sorted {
            column.set_index(Some(ColumnIndex::clustered_sorted()));
        }
        let table = self.databases[di].table_mut(ti);
        let ci = table.add_column(column);
        if sorted {
            table.set_cluster_column(ci);
        }
        self.resources
            .register(full_name, ResourceId::Column(di, ti, ci))?;
        self.changed = true;
        Ok(())
    }

    /// Create (or convert) a secondary index on `col_name`.
    ///
    /// On the cluster column this only ever converts the index family;
    /// everywhere else a missing index is built from the current data.
    pub fn create_index(&mut self, col_name: &str, kind: IndexKind) -> BasaltResult<()> {
        let Some(ResourceId::Column(di, ti, ci)) = self.resources.get(col_name) else {
            return Err(BasaltError::NotFound(col_name.to_string()));
        };
        let table = self.databases[di].table_mut(ti);
        let is_cluster = table.cluster_column() == Some(ci);
        let col = table.column_mut(ci);
        let snapshot = col.values().to_vec();
        let ty = col.ty();
        if col.index().is_some() {
            if let Some(idx) = col.index_mut() {
                idx.convert(&snapshot, ty, kind);
            }
        } else if !is_cluster {
            col.set_index(Some(ColumnIndex::secondary(&snapshot, ty, kind)));
        }
        self.changed = true;
        Ok(())
    }

    // ════════════════════════════════════════════
    // Resolution
    // ════════════════════════════════════════════

    pub fn database(&self, name: &str) -> BasaltResult<&Database> {
        match self.resources.get(name) {
            Some(ResourceId::Db(di)) => Ok(&self.databases[di]),
            _ => Err(BasaltError::NotFound(name.to_string())),
        }
    }

    pub fn table(&self, name: &str) -> BasaltResult<&Table> {
        match self.resources.get(name) {
            Some(ResourceId::Table(di, ti)) => Ok(self.databases[di].table(ti)),
            _ => Err(BasaltError::NotFound(name.to_string())),
        }
    }

    pub fn table_mut(&mut self, name: &str) -> BasaltResult<&mut Table> {
        match self.resources.get(name) {
            Some(ResourceId::Table(di, ti)) => Ok(self.databases[di].table_mut(ti)),
            _ => Err(BasaltError::NotFound(name.to_string())),
        }
    }

    pub fn column(&self, name: &str) -> BasaltResult<&Column> {
        match self.resources.get(name) {
            Some(ResourceId::Column(di, ti, ci)) => Ok(self.databases[di].table(ti).column(ci)),
            _ => Err(BasaltError::NotFound(name.to_string())),
        }
    }

    pub fn column_mut(&mut self, name: &str) -> BasaltResult<&mut Column> {
        match self.resources.get(name) {
            Some(ResourceId::Column(di, ti, ci)) => {
                Ok(self.databases[di].table_mut(ti).column_mut(ci))
            }
            _ => Err(BasaltError::NotFound(name.to_string())),
        }
    }

    /// Resolve a query operand: the session's variables shadow resources.
    pub fn operand<'a>(&'a self, session: &'a Session, name: &str) -> BasaltResult<&'a Column> {
        if let Some(col) = session.vars.get(name) {
            return Ok(col);
        }
        self.column(name)
    }

    // ════════════════════════════════════════════
    // Mutation
    // ════════════════════════════════════════════

    /// Append one row to `table_name`, values in table column order.
    pub fn insert_row(&mut self, table_name: &str, values: &[i64]) -> BasaltResult<()> {
        let table = self.table_mut(table_name)?;
        if values.len() != table.column_count() {
            return Err(BasaltError::InvalidOperand(format!(
                "row has {} values, table '{table_name}' has {} columns",
                values.len(),
                table.column_count()
            )));
        }
        let row: Vec<Value> = table
            .columns()
            .iter()
            .zip(values)
            .map(|(c, &v)| Value::from_literal(c.ty(), v))
            .collect();
        table.append_row(&row)?;
        self.changed = true;
        Ok(())
    }

    /// Bulk-ingest one row into explicitly named columns.
    ///
    /// Like [`Table::append_row`], the whole row is probed before any
    /// column takes its value, so the named columns never drift apart.
    pub fn bulk_row(&mut self, columns: &[String], values: &[i64]) -> BasaltResult<()> {
        for (name, &v) in columns.iter().zip(values) {
            let col = self.column(name)?;
            col.check_insert(Value::from_literal(col.ty(), v))?;
        }
        for (name, &v) in columns.iter().zip(values) {
            let col = self.column_mut(name)?;
            let value = Value::from_literal(col.ty(), v);
            col.push(value)?;
        }
        self.changed = true;
        Ok(())
    }

    /// Re-cluster the table that owns `column_name` (`db.tbl.col`).
    pub fn cluster_table_of(&mut self, column_name: &str) -> BasaltResult<()> {
        let Some((table_name, _)) = column_name.rsplit_once('.') else {
            return Err(BasaltError::BadFormat(format!(
                "'{column_name}' is not a qualified column name"
            )));
        };
        let table_name = table_name.to_string();
        self.table_mut(&table_name)?.cluster()?;
        self.changed = true;
        Ok(())
    }
}
