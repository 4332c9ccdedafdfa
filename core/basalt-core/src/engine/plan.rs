//! The operator descriptor the planner hands the engine.
//!
//! One variant per command kind; the parser validates shape, the executor
//! resolves names and runs the kernels.

use crate::engine::kernels::{ExtremeKind, VectorKind};
use crate::engine::scan::Comparator;
use crate::storage::IndexKind;

/// A validated, executable command.
#[derive(Debug, Clone)]
pub enum DbOperator {
    CreateDb {
        name: String,
    },
    CreateTable {
        name: String,
        db: String,
        columns: usize,
    },
    CreateColumn {
        name: String,
        table: String,
        sorted: bool,
    },
    CreateIndex {
        column: String,
        kind: IndexKind,
    },
    Insert {
        table: String,
        values: Vec<i64>,
    },
    Select {
        column: String,
        input: Option<String>,
        comparator: Comparator,
        out: String,
    },
    Fetch {
        column: String,
        positions: String,
        out: String,
    },
    Extreme {
        vec: String,
        kind: ExtremeKind,
        out: String,
    },
    ExtremeWithIndex {
        vec_val: String,
        vec_pos: Option<String>,
        kind: ExtremeKind,
        out_pos: String,
        out_val: String,
    },
    Average {
        vec: String,
        out: String,
    },
    VectorOp {
        a: String,
        b: String,
        kind: VectorKind,
        out: String,
    },
    Print {
        columns: Vec<String>,
    },
    /// Switch the connection into the bulk-ingest mini-protocol.
    Load,
    /// Flush dirty state and stop the server.
    Shutdown,
}
