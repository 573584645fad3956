//! Scripted loopback debug target shared by the integration tests

#![allow(dead_code)]

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;
use xbdm_rpc::{Config, Session};

/// Greeting every accepted connection receives first
pub const GREETING: &str = "201- connected\r\n";

/// What the target does with one received command line
pub enum Reply {
    /// Write these bytes back
    Send(Vec<u8>),

    /// Close the connection without answering
    Hangup,

    /// Read the next line without answering
    Silent,
}

impl Reply {
    /// A single CRLF-terminated line
    pub fn line(text: &str) -> Self {
        Reply::Send(format!("{}\r\n", text).into_bytes())
    }
}

/// A debug target on 127.0.0.1 driven by a handler closure
pub struct MockTarget {
    port: u16,
    connections: Arc<AtomicUsize>,
    received: Arc<Mutex<Vec<String>>>,
}

impl MockTarget {
    pub fn start<F>(handler: F) -> Self
    where
        F: Fn(&str) -> Reply + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let connections = Arc::new(AtomicUsize::new(0));
        let received = Arc::new(Mutex::new(Vec::new()));
        let handler = Arc::new(handler);

        let accepted = Arc::clone(&connections);
        let log = Arc::clone(&received);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let stream = match stream {
                    Ok(s) => s,
                    Err(_) => break,
                };
                accepted.fetch_add(1, Ordering::SeqCst);
                let handler = Arc::clone(&handler);
                let log = Arc::clone(&log);
                thread::spawn(move || serve(stream, handler.as_ref(), &log));
            }
        });

        Self {
            port,
            connections,
            received,
        }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Connections accepted so far
    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    /// Command lines received so far, CRLF stripped
    pub fn received(&self) -> Vec<String> {
        self.received.lock().clone()
    }

    pub fn config(&self) -> Config {
        Config::builder()
            .host("127.0.0.1")
            .port(self.port)
            .connect_timeout_ms(2000)
            .conversation_timeout_ms(2000)
            .continuation_delay_ms(1)
            .build()
    }

    pub fn session(&self) -> Session {
        Session::new(self.config()).unwrap()
    }
}

fn serve(stream: TcpStream, handler: &(dyn Fn(&str) -> Reply + Send + Sync), log: &Mutex<Vec<String>>) {
    let mut writer = match stream.try_clone() {
        Ok(s) => s,
        Err(_) => return,
    };
    if writer.write_all(GREETING.as_bytes()).is_err() {
        return;
    }

    let mut reader = BufReader::new(stream);
    loop {
        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) | Err(_) => return,
            Ok(_) => {}
        }
        let command = line.trim_end_matches(|c: char| c == '\r' || c == '\n').to_string();
        log.lock().push(command.clone());

        match handler(&command) {
            Reply::Send(bytes) => {
                if writer.write_all(&bytes).is_err() {
                    return;
                }
            }
            Reply::Hangup => return,
            Reply::Silent => {}
        }
    }
}

/// A port nothing listens on
pub fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}
