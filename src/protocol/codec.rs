//! Protocol codec
//!
//! Line framing for commands and the three response shapes.
//!
//! Everything here works on plain `BufRead`/`Write` so it can be driven by
//! a socket or an in-memory cursor alike. I/O failures come back as
//! `std::io::Error`; the session decides what a failure means for the
//! connection.

use std::io::{self, BufRead, Read, Write};

use bytes::{Bytes, BytesMut};

use crate::error::{Result, RpcError};
use super::Response;

/// Line terminator on the wire
pub const LINE_TERMINATOR: &str = "\r\n";

/// Line that closes a "response follows" block
pub const END_OF_BLOCK: &str = ".";

/// Lowercased status marker announcing a line block
pub const MULTILINE_MARKER: &str = "response follows";

/// Lowercased status marker announcing a binary block
pub const BINARY_MARKER: &str = "binary";

/// Largest binary block accepted (16 MB)
pub const MAX_BINARY_SIZE: usize = 16 * 1024 * 1024;

// =============================================================================
// Outbound
// =============================================================================

/// Validate a command line and terminate it with CRLF
///
/// A single trailing line ending is tolerated and normalized; CR or LF
/// anywhere else is rejected.
pub fn frame_line(line: &str) -> Result<String> {
    let body = line
        .strip_suffix(LINE_TERMINATOR)
        .or_else(|| line.strip_suffix('\n'))
        .unwrap_or(line);

    if body.contains(|c: char| c == '\r' || c == '\n') {
        return Err(RpcError::InvalidCommand(format!(
            "embedded line break in {:?}",
            body
        )));
    }

    let mut framed = String::with_capacity(body.len() + LINE_TERMINATOR.len());
    framed.push_str(body);
    framed.push_str(LINE_TERMINATOR);
    Ok(framed)
}

/// Write an already framed line and flush
pub fn write_frame<W: Write>(writer: &mut W, framed: &str) -> io::Result<()> {
    writer.write_all(framed.as_bytes())?;
    writer.flush()
}

// =============================================================================
// Inbound
// =============================================================================

/// Read one line, stripping LF and a trailing CR
///
/// End-of-stream before any byte is an error, never an empty line.
pub fn read_line<R: BufRead>(reader: &mut R) -> io::Result<String> {
    let mut buf = Vec::with_capacity(128);
    let n = reader.read_until(b'\n', &mut buf)?;
    if n == 0 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "connection closed",
        ));
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
    }
    if buf.last() == Some(&b'\r') {
        buf.pop();
    }

    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Read a complete response: status line plus whatever block it announces
pub fn read_response<R: BufRead>(reader: &mut R) -> io::Result<Response> {
    let status = read_line(reader)?;
    let lower = status.to_ascii_lowercase();

    // Checked first: "203- binary response follows" is a binary block.
    if lower.contains(BINARY_MARKER) {
        let data = read_binary_block(reader)?;
        return Ok(Response::binary(status, data));
    }

    if lower.contains(MULTILINE_MARKER) {
        let mut lines = Vec::new();
        loop {
            let line = read_line(reader)?;
            if line == END_OF_BLOCK {
                break;
            }
            lines.push(line);
        }
        return Ok(Response::lines(status, lines));
    }

    Ok(Response::line(status))
}

/// Read a decimal length line followed by exactly that many raw bytes
///
/// One trailing line is consumed afterwards; failing to read it is ignored.
pub fn read_binary_block<R: BufRead>(reader: &mut R) -> io::Result<Bytes> {
    let len_line = read_line(reader)?;
    let len: usize = len_line.trim().parse().map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("bad binary length line {:?}", len_line),
        )
    })?;

    if len > MAX_BINARY_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("binary block too large: {} bytes (max {})", len, MAX_BINARY_SIZE),
        ));
    }

    let mut data = BytesMut::zeroed(len);
    reader.read_exact(&mut data)?;

    let _ = read_line(reader);

    Ok(data.freeze())
}
