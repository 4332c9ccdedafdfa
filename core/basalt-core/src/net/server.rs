//! The server loop.
//!
//! One unix-domain listener, one client at a time: commands are parsed,
//! executed and answered strictly in arrival order. Each connection gets
//! its own variable pool, dropped when the connection ends. SHUTDOWN
//! flushes dirty state, answers with the well-known payload and stops the
//! accept loop.

use std::fs;
use std::io::{Read, Write};
use std::os::unix::net::UnixListener;
use std::path::PathBuf;

use tracing::{error, info, warn};

use crate::config::ServerConfig;
use crate::dsl::CommandSet;
use crate::engine::{Engine, Reply, Session, execute};
use crate::error::{BasaltError, BasaltResult};
use crate::net::message::{
    LOAD_TERMINATOR, MessageStatus, SHUTDOWN_PAYLOAD, read_message, write_message,
};

pub struct Server {
    engine: Engine,
    commands: CommandSet,
    socket_path: PathBuf,
}

impl Server {
    /// Build the engine, load persisted state and compile the command set.
    pub fn new(config: &ServerConfig) -> BasaltResult<Self> {
        let mut engine = Engine::new(&config.data_dir);
        engine.load()?;
        Ok(Server {
            engine,
            commands: CommandSet::new(),
            socket_path: config.socket_path.clone(),
        })
    }

    /// Accept clients until a SHUTDOWN command stops the loop.
    pub fn run(&mut self) -> BasaltResult<()> {
        // A stale socket file from an earlier run blocks the bind.
        if self.socket_path.exists() {
            fs::remove_file(&self.socket_path)?;
        }
        let listener = UnixListener::bind(&self.socket_path)?;
        info!("listening on {:?}", self.socket_path);

        let mut shutdown = false;
        while !shutdown {
            match listener.incoming().next() {
                Some(Ok(mut stream)) => {
                    shutdown = self.handle_client(&mut stream);
                }
                Some(Err(e)) => {
                    warn!("accept failed: {e}");
                }
                None => break,
            }
        }
        let _ = fs::remove_file(&self.socket_path);
        Ok(())
    }

    /// Run one client's session to completion. Returns true on SHUTDOWN.
    pub(crate) fn handle_client<S: Read + Write>(&mut self, stream: &mut S) -> bool {
        let mut session = Session::new();
        info!("client connected");

        loop {
            let payload = match read_message(stream) {
                Ok(Some((_, payload))) => payload,
                Ok(None) => {
                    info!("client disconnected");
                    return false;
                }
                Err(e) => {
                    warn!("session dropped: {e}");
                    return false;
                }
            };

            let outcome = self
                .commands
                .parse(&payload)
                .and_then(|op| execute(&mut self.engine, &mut session, op));
            let sent = match outcome {
                Ok(Reply::Payload(text)) => {
                    write_message(stream, MessageStatus::OkWaitForResponse, &text)
                }
                Ok(Reply::StartLoad) => {
                    let status = self.run_load(stream);
                    match status {
                        Ok(rows) => write_message(
                            stream,
                            MessageStatus::OkWaitForResponse,
                            &format!("loaded {rows} rows"),
                        ),
                        Err(e) => {
                            warn!("bulk load failed: {e}");
                            write_message(stream, MessageStatus::Error, &e.to_string())
                        }
                    }
                }
                Ok(Reply::Shutdown) => {
                    if let Err(e) = self.engine.flush_if_changed() {
                        // The flush error reaches the log; the exit proceeds.
                        error!("sync on shutdown failed: {e}");
                    }
                    let _ = write_message(stream, MessageStatus::Shutdown, SHUTDOWN_PAYLOAD);
                    return true;
                }
                Err(e) => write_message(stream, MessageStatus::Error, &e.to_string()),
            };
            if let Err(e) = sent {
                warn!("reply failed, dropping session: {e}");
                return false;
            }
        }
    }

    /// The bulk-ingest mini-protocol: a header of fully qualified column
    /// names, one CSV row per message, the `EOF` sentinel, then a
    /// clustering pass over the loaded table.
    fn run_load<S: Read + Write>(&mut self, stream: &mut S) -> BasaltResult<usize> {
        let Some((_, header)) = read_message(stream)? else {
            return Err(BasaltError::BadFormat("load ended before its header".into()));
        };
        let columns: Vec<String> = header.split(',').map(|s| s.trim().to_string()).collect();
        for name in &columns {
            // Fail before any row lands, not in the middle of the stream.
            self.engine.column(name)?;
        }

        let mut rows = 0usize;
        loop {
            let Some((_, row)) = read_message(stream)? else {
                return Err(BasaltError::BadFormat("load ended before EOF".into()));
            };
            if row == LOAD_TERMINATOR {
                break;
            }
            let values = row
                .split(',')
                .map(|v| {
                    v.trim().parse::<i64>().map_err(|_| {
                        BasaltError::BadFormat(format!("'{v}' is not an integer"))
                    })
                })
                .collect::<BasaltResult<Vec<i64>>>()?;
            if values.len() != columns.len() {
                return Err(BasaltError::InvalidOperand(format!(
                    "row has {} values, header names {} columns",
                    values.len(),
                    columns.len()
                )));
            }
            self.engine.bulk_row(&columns, &values)?;
            rows += 1;
        }

        if let Some(first) = columns.first() {
            self.engine.cluster_table_of(first)?;
        }
        info!("bulk loaded {rows} rows into {} column(s)", columns.len());
        Ok(rows)
    }
}
