//! On-disk persistence.
//!
//! One system metadata file lists the databases; each database gets a
//! metadata text file and each column a binary file holding the raw value
//! words, followed by the column's index: sorted values then positions for
//! a secondary sorted index, or the tree pre-order for a B⁺-tree. The
//! cluster column's degenerate index writes nothing beyond its data.
//!
//! Byte order is native; portability across hosts is not a goal.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::PathBuf;

use tracing::info;

use crate::engine::catalog::Engine;
use crate::engine::pools::ResourceId;
use crate::error::{BasaltError, BasaltResult};
use crate::storage::{
    BPlusTree, Column, ColumnIndex, Database, IndexData, IndexKind, SortedIndex, Table, Value,
    ValueType,
};

/// Basename of the system metadata file inside the data directory.
const SYSTEM_META: &str = "server.meta";

impl Engine {
    fn system_meta_path(&self) -> PathBuf {
        self.data_dir.join(SYSTEM_META)
    }

    fn db_meta_path(&self, db: &str) -> PathBuf {
        self.data_dir.join(format!("{db}.meta"))
    }

    fn column_path(&self, col: &str) -> PathBuf {
        self.data_dir.join(format!("{col}.data"))
    }

    /// Flush everything when the dirty flag is set.
    pub fn flush_if_changed(&mut self) -> BasaltResult<()> {
        if self.changed {
            self.sync()?;
        }
        Ok(())
    }

    /// Write the whole catalog out: column data and indexes first, each
    /// database's metadata after its columns, the system file up front.
    pub fn sync(&mut self) -> BasaltResult<()> {
        fs::create_dir_all(&self.data_dir)?;

        let mut sys = BufWriter::new(File::create(self.system_meta_path())?);
        writeln!(sys, "{}", self.databases.len())?;
        for db in &self.databases {
            writeln!(sys, "{} {}", db.name(), db.table_count())?;
        }
        sys.flush()?;

        for di in 0..self.databases.len() {
            self.sync_db(di)?;
        }
        self.changed = false;
        info!("synced {} database(s)", self.databases.len());
        Ok(())
    }

    fn sync_db(&self, di: usize) -> BasaltResult<()> {
        let db = &self.databases[di];
        for table in db.tables() {
            for col in table.columns() {
                self.write_column(col)?;
            }
        }

        // Metadata last, after every column landed.
        let mut meta = BufWriter::new(File::create(self.db_meta_path(db.name()))?);
        for table in db.tables() {
            write!(
                meta,
                "{} {} {}",
                table.name(),
                table.column_count(),
                table.cluster_column_name().unwrap_or("null")
            )?;
            for col in table.columns() {
                write!(meta, " {} {} {}", column_name(col)?, col.count(), kind_str(col))?;
            }
            writeln!(meta)?;
        }
        meta.flush()?;
        Ok(())
    }

    fn write_column(&self, col: &Column) -> BasaltResult<()> {
        let name = column_name(col)?;
        let mut f = BufWriter::new(File::create(self.column_path(name))?);
        for v in col.values() {
            f.write_all(&v.to_bits().to_ne_bytes())?;
        }
        match col.index() {
            Some(ColumnIndex {
                data: IndexData::Sorted(idx),
                clustered: false,
            }) => {
                for v in &idx.keys {
                    f.write_all(&v.to_bits().to_ne_bytes())?;
                }
                for v in &idx.positions {
                    f.write_all(&v.to_bits().to_ne_bytes())?;
                }
            }
            Some(ColumnIndex {
                data: IndexData::BTree(tree),
                ..
            }) => tree.write_into(&mut f)?,
            // Clustered sorted index: the data already on disk is the index.
            Some(_) | None => {}
        }
        f.flush()?;
        Ok(())
    }

    /// Load every database the system metadata lists. A missing system
    /// file is a fresh start, not an error.
    pub fn load(&mut self) -> BasaltResult<()> {
        let path = self.system_meta_path();
        if !path.exists() {
            return Ok(());
        }
        let text = fs::read_to_string(&path)?;
        let mut tokens = text.split_whitespace();
        let db_count: usize = next_token(&mut tokens, "database count")?;
        for _ in 0..db_count {
            let name: String = next_token(&mut tokens, "database name")?;
            let table_count: usize = next_token(&mut tokens, "table count")?;
            self.load_db(&name, table_count)?;
        }
        info!("loaded {db_count} database(s)");
        Ok(())
    }

    fn load_db(&mut self, name: &str, table_count: usize) -> BasaltResult<()> {
        let di = self.databases.len();
        self.resources.register(name, ResourceId::Db(di))?;
        self.databases.push(Database::new(name));

        let text = fs::read_to_string(self.db_meta_path(name))?;
        let mut tokens = text.split_whitespace();
        for _ in 0..table_count {
            let table_name: String = next_token(&mut tokens, "table name")?;
            let col_count: usize = next_token(&mut tokens, "column count")?;
            let cluster: String = next_token(&mut tokens, "cluster column")?;

            let mut table = Table::new(&table_name, col_count);
            let mut column_ids = Vec::with_capacity(col_count);
            for _ in 0..col_count {
                let col_name: String = next_token(&mut tokens, "column name")?;
                let count: usize = next_token(&mut tokens, "column length")?;
                let kind: String = next_token(&mut tokens, "index kind")?;

                let is_cluster = col_name == cluster;
                let col = self.read_column(&col_name, count, &kind, is_cluster)?;
                let ci = table.add_column(col);
                if is_cluster {
                    table.set_cluster_column(ci);
                }
                column_ids.push((col_name, ci));
            }

            let ti = self.databases[di].add_table(table);
            self.resources
                .register(&table_name, ResourceId::Table(di, ti))?;
            for (col_name, ci) in column_ids {
                self.resources
                    .register(&col_name, ResourceId::Column(di, ti, ci))?;
            }
        }
        Ok(())
    }

    fn read_column(
        &self,
        name: &str,
        count: usize,
        kind: &str,
        is_cluster: bool,
    ) -> BasaltResult<Column> {
        let mut f = BufReader::new(File::open(self.column_path(name))?);
        let data = read_values(&mut f, count)?;
        let mut col = Column::from_parts(name, ValueType::Int, data);
        let index = match kind {
            "unsorted" => None,
            "sorted" if is_cluster => Some(ColumnIndex::clustered_sorted()),
            "sorted" => {
                let keys = read_values(&mut f, count)?;
                let positions = read_values(&mut f, count)?;
                Some(ColumnIndex {
                    data: IndexData::Sorted(SortedIndex { keys, positions }),
                    clustered: false,
                })
            }
            "btree" => {
                let tree = BPlusTree::read_from(&mut f, col.ty())?;
                Some(ColumnIndex {
                    data: IndexData::BTree(tree),
                    clustered: is_cluster,
                })
            }
            other => {
                return Err(BasaltError::BadFormat(format!(
                    "unknown index kind '{other}' for column '{name}'"
                )));
            }
        };
        col.set_index(index);
        Ok(col)
    }
}

fn column_name(col: &Column) -> BasaltResult<&str> {
    col.name().ok_or_else(|| {
        BasaltError::InvalidOperand("transient column cannot be persisted".into())
    })
}

/// Metadata spelling of a column's index kind.
fn kind_str(col: &Column) -> &'static str {
    match col.index().map(ColumnIndex::kind) {
        None => "unsorted",
        Some(IndexKind::Sorted) => IndexKind::Sorted.as_str(),
        Some(IndexKind::BTree) => IndexKind::BTree.as_str(),
    }
}

fn read_values<R: Read>(r: &mut R, count: usize) -> BasaltResult<Vec<Value>> {
    let mut out = Vec::with_capacity(count);
    let mut word = [0u8; 8];
    for _ in 0..count {
        r.read_exact(&mut word)?;
        out.push(Value::from_bits(u64::from_ne_bytes(word)));
    }
    Ok(out)
}

fn next_token<'a, T, I>(tokens: &mut I, what: &str) -> BasaltResult<T>
where
    T: std::str::FromStr,
    I: Iterator<Item = &'a str>,
{
    tokens
        .next()
        .ok_or_else(|| BasaltError::BadFormat(format!("metadata ended before {what}")))?
        .parse()
        .map_err(|_| BasaltError::BadFormat(format!("metadata has malformed {what}")))
}
