//! Connection
//!
//! One live TCP link to the debug monitor.

use std::io::{self, BufReader, BufWriter};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::protocol::{read_line, read_response, write_frame, Response};

/// An open socket with buffered read and write halves
pub struct Connection {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Connect within `connect_timeout` and swallow the greeting banner
    ///
    /// Every resolved address is tried in turn; the last failure is
    /// returned if none accepts.
    pub fn open(addr: &str, connect_timeout: Duration, conversation_timeout: Duration) -> io::Result<Self> {
        let mut last_err = None;
        let mut stream = None;

        for sock_addr in addr.to_socket_addrs()? {
            match TcpStream::connect_timeout(&sock_addr, connect_timeout) {
                Ok(s) => {
                    stream = Some(s);
                    break;
                }
                Err(e) => last_err = Some(e),
            }
        }

        let stream = match stream {
            Some(s) => s,
            None => {
                return Err(last_err.unwrap_or_else(|| {
                    io::Error::new(io::ErrorKind::NotFound, format!("no address for {}", addr))
                }))
            }
        };

        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| addr.to_string());

        // Disable Nagle's algorithm: every exchange is one short line
        stream.set_nodelay(true)?;

        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        let mut conn = Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            peer_addr,
        };
        conn.set_timeouts(conversation_timeout)?;

        // Banner ("201- connected"); its content and failures are irrelevant
        let _ = read_line(&mut conn.reader);

        Ok(conn)
    }

    /// Apply the conversation timeout to both halves (zero disables it)
    pub fn set_timeouts(&self, timeout: Duration) -> io::Result<()> {
        let timeout = if timeout.is_zero() { None } else { Some(timeout) };
        self.reader.get_ref().set_read_timeout(timeout)?;
        self.writer.get_ref().set_write_timeout(timeout)?;
        Ok(())
    }

    /// Send a framed line and read the full response
    pub fn exchange(&mut self, framed: &str) -> io::Result<Response> {
        write_frame(&mut self.writer, framed)?;
        read_response(&mut self.reader)
    }

    /// Close both directions, ignoring errors
    pub fn shutdown(&self) {
        let _ = self.writer.get_ref().shutdown(Shutdown::Both);
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}
