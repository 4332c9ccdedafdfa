//! The command language: regex dispatch plus argument extraction.

pub mod commands;
pub mod parser;

pub use commands::{CommandKind, CommandSet};
