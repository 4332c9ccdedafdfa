//! Wire framing.
//!
//! Every message is a fixed-size header (status and payload length,
//! bincode-encoded) followed by that many bytes of UTF-8 payload.

use std::io::{ErrorKind, Read, Write};

use serde::{Deserialize, Serialize};

use crate::error::{BasaltError, BasaltResult};

/// Well-known payload the server sends back on SHUTDOWN.
pub const SHUTDOWN_PAYLOAD: &str = "SHUTDOWN";

/// Sentinel payload ending the bulk-load row stream.
pub const LOAD_TERMINATOR: &str = "EOF";

/// Encoded header size: a status word and a length word.
pub const HEADER_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageStatus {
    Ok,
    OkWaitForResponse,
    UnknownCommand,
    Error,
    Shutdown,
}

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    status: MessageStatus,
    length: u32,
}

/// Frame and send one message.
pub fn write_message<W: Write>(w: &mut W, status: MessageStatus, payload: &str) -> BasaltResult<()> {
    let header = Header {
        status,
        length: payload.len() as u32,
    };
    let bytes =
        bincode::serialize(&header).map_err(|e| BasaltError::Serialization(e.to_string()))?;
    w.write_all(&bytes)?;
    w.write_all(payload.as_bytes())?;
    w.flush()?;
    Ok(())
}

/// Read one message; `None` means the peer closed the stream cleanly.
pub fn read_message<R: Read>(r: &mut R) -> BasaltResult<Option<(MessageStatus, String)>> {
    let mut head = [0u8; HEADER_LEN];
    match r.read_exact(&mut head) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    }
    let header: Header =
        bincode::deserialize(&head).map_err(|e| BasaltError::Serialization(e.to_string()))?;

    let mut payload = vec![0u8; header.length as usize];
    r.read_exact(&mut payload)?;
    let text = String::from_utf8(payload)
        .map_err(|e| BasaltError::BadFormat(format!("payload is not UTF-8: {e}")))?;
    Ok(Some((header.status, text)))
}
