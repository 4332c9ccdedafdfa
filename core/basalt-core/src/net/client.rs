//! The interactive client.
//!
//! Reads commands from stdin, ships them to the server and prints
//! responses. `load("file")` is the one command with client-side work:
//! the named file streams to the server line by line, closed by the
//! `EOF` sentinel.

use std::fs::File;
use std::io::{self, BufRead, BufReader, IsTerminal, Read, Write};
use std::os::unix::net::UnixStream;
use std::sync::OnceLock;

use regex::Regex;
use tracing::info;

use crate::config::ServerConfig;
use crate::error::{BasaltError, BasaltResult};
use crate::net::message::{
    LOAD_TERMINATOR, MessageStatus, SHUTDOWN_PAYLOAD, read_message, write_message,
};

/// Connect and run the interactive loop until EOF or server shutdown.
pub fn run(config: &ServerConfig) -> BasaltResult<()> {
    let mut stream = UnixStream::connect(&config.socket_path)?;
    info!("connected to {:?}", config.socket_path);

    let prompt = if io::stdin().is_terminal() {
        "basalt> "
    } else {
        ""
    };
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("{prompt}");
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        if !process_line(&mut stream, line.trim())? {
            break;
        }
    }
    Ok(())
}

/// Handle one input line. Returns false when the session should end.
fn process_line(stream: &mut UnixStream, line: &str) -> BasaltResult<bool> {
    if line.len() <= 1 || line.starts_with("--") {
        return Ok(true);
    }

    write_message(stream, MessageStatus::Ok, line)?;
    if let Some(filename) = load_filename(line) {
        stream_file(stream, &filename)?;
    }

    let Some((status, payload)) = read_message(stream)? else {
        info!("server closed the connection");
        return Ok(false);
    };
    if !payload.is_empty() && payload != SHUTDOWN_PAYLOAD {
        println!("{payload}");
    }
    Ok(status != MessageStatus::Shutdown && payload != SHUTDOWN_PAYLOAD)
}

/// The file named by a `load("...")` command, if this is one.
///
/// The pattern compiles once for the whole process, the same way the
/// server builds its command table once at startup.
fn load_filename(line: &str) -> Option<String> {
    static LOAD_COMMAND: OnceLock<Regex> = OnceLock::new();
    let load = LOAD_COMMAND.get_or_init(|| {
        Regex::new(r#"^load\("([a-zA-Z0-9_./]+)"\)"#).expect("load pattern compiles")
    });
    load.captures(line)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Send every line of `filename`, then the terminator.
fn stream_file<S: Read + Write>(stream: &mut S, filename: &str) -> BasaltResult<()> {
    let file = File::open(filename).map_err(|e| {
        BasaltError::BadFormat(format!("cannot open load file '{filename}': {e}"))
    })?;
    for line in BufReader::new(file).lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        write_message(stream, MessageStatus::Ok, trimmed)?;
    }
    write_message(stream, MessageStatus::Ok, LOAD_TERMINATOR)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;

    #[test]
    fn load_filename_extraction() {
        assert_eq!(
            load_filename(r#"load("/tmp/rows.csv")"#),
            Some("/tmp/rows.csv".to_string())
        );
        assert_eq!(load_filename("p=select(a,1,2)"), None);
        assert_eq!(load_filename(r#"load(missing_quotes.csv)"#), None);
    }

    #[test]
    fn stream_file_sends_rows_then_terminator() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rows.csv");
        std::fs::write(&path, "db1.t.a,db1.t.b\n1,10\n\n2,20\n").unwrap();

        struct Sink(Vec<u8>);
        impl Read for Sink {
            fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
                Ok(0)
            }
        }
        impl Write for Sink {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.0.extend_from_slice(buf);
                Ok(buf.len())
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut sink = Sink(Vec::new());
        stream_file(&mut sink, path.to_str().unwrap()).unwrap();

        let mut cursor = Cursor::new(sink.0);
        let mut payloads = Vec::new();
        while let Some((_, p)) = read_message(&mut cursor).unwrap() {
            payloads.push(p);
        }
        // The blank line dropped out; the terminator closed the stream.
        assert_eq!(payloads, vec!["db1.t.a,db1.t.b", "1,10", "2,20", "EOF"]);
    }

    #[test]
    fn stream_file_missing_file_is_bad_format() {
        struct Nothing;
        impl Read for Nothing {
            fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
                Ok(0)
            }
        }
        impl Write for Nothing {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                Ok(buf.len())
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }
        let err = stream_file(&mut Nothing, "/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, BasaltError::BadFormat(_)));
    }
}
