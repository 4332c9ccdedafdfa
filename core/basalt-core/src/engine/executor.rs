//! Operator dispatch.

use tracing::debug;

use crate::engine::catalog::Engine;
use crate::engine::kernels::{average, extreme, extreme_with_index, materialize, vector_op};
use crate::engine::plan::DbOperator;
use crate::engine::pools::Session;
use crate::engine::scan::col_scan;
use crate::error::BasaltResult;

/// What the server should do with a finished command.
#[derive(Debug, PartialEq, Eq)]
pub enum Reply {
    /// Send the payload back (possibly empty).
    Payload(String),
    /// Drive the bulk-ingest mini-protocol on this connection.
    StartLoad,
    /// Flush and stop the server.
    Shutdown,
}

/// Execute one descriptor against the engine and session state.
pub fn execute(engine: &mut Engine, session: &mut Session, op: DbOperator) -> BasaltResult<Reply> {
    debug!(?op, "executing");
    match op {
        DbOperator::CreateDb { name } => {
            engine.create_db(&name)?;
            Ok(Reply::Payload(String::new()))
        }
        DbOperator::CreateTable { name, db, columns } => {
            engine.create_table(&name, &db, columns)?;
            Ok(Reply::Payload(String::new()))
        }
        DbOperator::CreateColumn { name, table, sorted } => {
            engine.create_column(&name, &table, sorted)?;
            Ok(Reply::Payload(String::new()))
        }
        DbOperator::CreateIndex { column, kind } => {
            engine.create_index(&column, kind)?;
            Ok(Reply::Payload(String::new()))
        }
        DbOperator::Insert { table, values } => {
            engine.insert_row(&table, &values)?;
            Ok(Reply::Payload(String::new()))
        }
        DbOperator::Select {
            column,
            input,
            comparator,
            out,
        } => {
            let result = {
                let col = engine.operand(session, &column)?;
                let positions = match &input {
                    Some(name) => Some(engine.operand(session, name)?),
                    None => None,
                };
                col_scan(col, &comparator, positions)?
            };
            session.vars.set(&out, result);
            Ok(Reply::Payload(String::new()))
        }
        DbOperator::Fetch {
            column,
            positions,
            out,
        } => {
            let result = {
                let col = engine.operand(session, &column)?;
                let pos = engine.operand(session, &positions)?;
                col.fetch(pos.values())?
            };
            session.vars.set(&out, result);
            Ok(Reply::Payload(String::new()))
        }
        DbOperator::Extreme { vec, kind, out } => {
            let result = extreme(engine.operand(session, &vec)?, kind)?;
            session.vars.set(&out, result);
            Ok(Reply::Payload(String::new()))
        }
        DbOperator::ExtremeWithIndex {
            vec_val,
            vec_pos,
            kind,
            out_pos,
            out_val,
        } => {
            let (pos_col, val_col) = {
                let values = engine.operand(session, &vec_val)?;
                let positions = match &vec_pos {
                    Some(name) => Some(engine.operand(session, name)?),
                    None => None,
                };
                extreme_with_index(values, positions, kind)?
            };
            session.vars.set(&out_pos, pos_col);
            session.vars.set(&out_val, val_col);
            Ok(Reply::Payload(String::new()))
        }
        DbOperator::Average { vec, out } => {
            let result = average(engine.operand(session, &vec)?)?;
            session.vars.set(&out, result);
            Ok(Reply::Payload(String::new()))
        }
        DbOperator::VectorOp { a, b, kind, out } => {
            let result = {
                let left = engine.operand(session, &a)?;
                let right = engine.operand(session, &b)?;
                vector_op(left, right, kind)?
            };
            session.vars.set(&out, result);
            Ok(Reply::Payload(String::new()))
        }
        DbOperator::Print { columns } => {
            let mut resolved = Vec::with_capacity(columns.len());
            for name in &columns {
                resolved.push(engine.operand(session, name)?);
            }
            let payload = materialize(&resolved)?;
            Ok(Reply::Payload(payload))
        }
        DbOperator::Load => Ok(Reply::StartLoad),
        DbOperator::Shutdown => Ok(Reply::Shutdown),
    }
}
