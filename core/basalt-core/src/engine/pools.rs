//! Name pools.
//!
//! Two string-keyed pools back the engine: the resource pool maps
//! qualified names of persistent entities (`db`, `db.tbl`, `db.tbl.col`)
//! to their catalog positions, and the variable pool holds a session's
//! transient result vectors, cleared when the client goes away.

use std::collections::HashMap;

use crate::error::{BasaltError, BasaltResult};
use crate::storage::Column;

/// Catalog position of a persistent entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceId {
    Db(usize),
    Table(usize, usize),
    Column(usize, usize, usize),
}

/// Process-wide registry of persistent named entities.
#[derive(Debug, Default)]
pub struct ResourcePool {
    map: HashMap<String, ResourceId>,
}

impl ResourcePool {
    pub fn new() -> Self {
        ResourcePool::default()
    }

    /// Register a name; creating over an existing one is an error.
    pub fn register(&mut self, name: &str, id: ResourceId) -> BasaltResult<()> {
        if self.map.contains_key(name) {
            return Err(BasaltError::AlreadyExists(name.to_string()));
        }
        self.map.insert(name.to_string(), id);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<ResourceId> {
        self.map.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Per-session registry of transient result vectors.
#[derive(Debug, Default)]
pub struct VarPool {
    map: HashMap<String, Column>,
}

impl VarPool {
    pub fn new() -> Self {
        VarPool::default()
    }

    /// Bind a result under `name`; rebinding replaces the old vector.
    pub fn set(&mut self, name: &str, column: Column) {
        self.map.insert(name.to_string(), column);
    }

    pub fn get(&self, name: &str) -> Option<&Column> {
        self.map.get(name)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }
}

/// One client connection's worth of state.
#[derive(Debug, Default)]
pub struct Session {
    pub vars: VarPool,
}

impl Session {
    pub fn new() -> Self {
        Session::default()
    }
}
