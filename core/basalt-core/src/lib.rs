//! # basalt — a single-node in-memory column store
//!
//! basalt keeps databases → tables → columns of fixed-width integer values
//! in memory, persists them to a binary on-disk format, and serves a small
//! textual query language over a unix-domain stream socket.
//!
//! ## Architecture
//!
//! - **Columns** are growable vectors of 64-bit words, each interpreted
//!   through the column's type tag.
//! - **Indexes** come in two families: a sorted twin-vector secondary
//!   index and a bulk-loaded, leaf-linked B⁺-tree. A table may cluster
//!   all of its columns by one chosen column.
//! - **Kernels** (insert, select, fetch, aggregates, vector arithmetic,
//!   tuple materialization) execute operator descriptors produced by the
//!   command parser; results land in a per-session variable pool.
//! - **Persistence** writes one metadata text file per database plus one
//!   binary data-and-index file per column, round-tripping on restart.
//!
//! ## Command flow
//!
//! ```text
//! client line → regex dispatch → DbOperator → execute() → reply payload
//! ```
//!
//! ## Quick start
//!
//! ```rust
//! use basalt_core::engine::{Engine, Session, DbOperator, execute};
//! use std::path::Path;
//!
//! # fn main() -> basalt_core::BasaltResult<()> {
//! let mut engine = Engine::new(Path::new("./data"));
//! let mut session = Session::new();
//! execute(&mut engine, &mut session, DbOperator::CreateDb { name: "db1".into() })?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dsl;
pub mod engine;
pub mod error;
pub mod logging;
pub mod net;
pub mod storage;

// Re-export commonly used types
pub use config::ServerConfig;
pub use engine::{DbOperator, Engine, Reply, Session, execute};
pub use error::{BasaltError, BasaltResult};
pub use net::Server;
