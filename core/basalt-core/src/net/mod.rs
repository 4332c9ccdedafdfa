//! Client/server plumbing: wire framing, the accept loop, the REPL.

pub mod client;
pub mod message;
pub mod server;

pub use message::{MessageStatus, read_message, write_message};
pub use server::Server;
