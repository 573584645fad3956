//! Transport Session
//!
//! Owns at most one connection to a debug target and serializes every
//! exchange on it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::{Mutex, MutexGuard};

use crate::config::Config;
use crate::error::{Result, RpcError};
use crate::protocol::{frame_line, Response};
use super::Connection;

/// Source of per-session connection ids
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// A lazily connected, self-healing session with one debug target
///
/// ## Connection States
/// - **Disconnected**: no socket. The next operation connects.
/// - **Connected**: socket open with the conversation timeout applied.
///
/// Any I/O failure drops straight back to Disconnected before the error
/// is returned, so a failed call never leaves a half-open socket behind.
///
/// ## Concurrency
/// All state sits behind one mutex. A single command holds it for one
/// request/response; a remote call holds it for its whole exchange
/// sequence, continuation rounds included.
pub struct Session {
    /// Session configuration
    config: Config,

    /// Logical connection id, fixed at construction
    connection_id: u64,

    /// Socket and live timeouts
    state: Mutex<SessionState>,
}

/// Mutable half of a session, only reachable through the lock
pub(crate) struct SessionState {
    /// `host:port` of the target
    addr: String,

    /// Live connection, if any
    conn: Option<Connection>,

    connect_timeout: Duration,

    conversation_timeout: Duration,
}

impl Session {
    /// Create a session; nothing is connected until first use
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let state = SessionState {
            addr: config.addr(),
            conn: None,
            connect_timeout: config.connect_timeout(),
            conversation_timeout: config.conversation_timeout(),
        };

        Ok(Self {
            config,
            connection_id: NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
            state: Mutex::new(state),
        })
    }

    /// Session to `host` on the default port with default timeouts
    pub fn open(host: impl Into<String>) -> Result<Self> {
        Self::new(Config::new(host))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The id every `send_text_command` must present
    pub fn connection_id(&self) -> u64 {
        self.connection_id
    }

    pub fn is_connected(&self) -> bool {
        self.state.lock().conn.is_some()
    }

    /// Connect now (if needed) and hand out the connection id
    pub fn open_connection(&self) -> Result<u64> {
        self.state.lock().ensure_connected()?;
        Ok(self.connection_id)
    }

    /// Send a command under an explicit connection id
    pub fn send_text_command(&self, connection_id: u64, command: &str) -> Result<Response> {
        let mut state = self.state.lock();
        state.ensure_connected()?;
        if connection_id != self.connection_id {
            return Err(RpcError::BadConnectionId {
                expected: self.connection_id,
                got: connection_id,
            });
        }
        state.exchange(command)
    }

    /// Send a command and read its complete response
    pub fn send_command(&self, command: &str) -> Result<Response> {
        self.state.lock().exchange(command)
    }

    /// Send a command and return the flattened response text
    ///
    /// No `error=` interpretation happens here.
    pub fn exec(&self, command: &str) -> Result<String> {
        Ok(self.send_command(command)?.text())
    }

    /// Drop the connection; the next operation reconnects
    pub fn disconnect(&self) {
        self.state.lock().teardown();
    }

    pub fn connect_timeout(&self) -> Duration {
        self.state.lock().connect_timeout
    }

    pub fn set_connect_timeout(&self, timeout: Duration) {
        self.state.lock().connect_timeout = timeout;
    }

    pub fn conversation_timeout(&self) -> Duration {
        self.state.lock().conversation_timeout
    }

    /// Takes effect immediately on a live socket
    pub fn set_conversation_timeout(&self, timeout: Duration) {
        self.state.lock().set_conversation_timeout(timeout);
    }

    /// Exclusive access for multi-exchange operations
    pub(crate) fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock()
    }
}

impl SessionState {
    /// Connect if disconnected
    pub(crate) fn ensure_connected(&mut self) -> Result<()> {
        if self.conn.is_some() {
            return Ok(());
        }

        tracing::debug!("Connecting to {}", self.addr);
        match Connection::open(&self.addr, self.connect_timeout, self.conversation_timeout) {
            Ok(conn) => {
                tracing::debug!("Connected to {}", conn.peer_addr());
                self.conn = Some(conn);
                Ok(())
            }
            Err(source) => {
                tracing::debug!("Connect to {} failed: {}", self.addr, source);
                self.teardown();
                Err(RpcError::Connect {
                    addr: self.addr.clone(),
                    source,
                })
            }
        }
    }

    /// One request/response; tears down on any I/O failure
    pub(crate) fn exchange(&mut self, command: &str) -> Result<Response> {
        let framed = frame_line(command)?;
        self.ensure_connected()?;

        let result = match self.conn.as_mut() {
            Some(conn) => {
                tracing::trace!("-> {}", framed.trim_end());
                conn.exchange(&framed)
            }
            None => return Err(RpcError::Io(not_connected())),
        };

        match result {
            Ok(response) => {
                tracing::trace!("<- {}", response.status);
                Ok(response)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Run `f` with both timeouts widened to `timeout`, then restore them
    ///
    /// Restoration happens on the error path too.
    pub(crate) fn with_timeouts<T>(
        &mut self,
        timeout: Duration,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        let prior_connect = self.connect_timeout;
        let prior_conversation = self.conversation_timeout;

        self.connect_timeout = timeout;
        self.set_conversation_timeout(timeout);

        let result = f(self);

        self.connect_timeout = prior_connect;
        self.set_conversation_timeout(prior_conversation);

        result
    }

    pub(crate) fn set_conversation_timeout(&mut self, timeout: Duration) {
        self.conversation_timeout = timeout;
        let applied = match &self.conn {
            Some(conn) => conn.set_timeouts(timeout),
            None => Ok(()),
        };
        if let Err(e) = applied {
            tracing::warn!("Failed to apply timeout on {}: {}", self.addr, e);
            self.teardown();
        }
    }

    /// Record an I/O failure: close everything, wrap the error
    fn fail(&mut self, e: std::io::Error) -> RpcError {
        tracing::warn!("I/O failure with {}: {}", self.addr, e);
        self.teardown();
        RpcError::Io(e)
    }

    pub(crate) fn teardown(&mut self) {
        if let Some(conn) = self.conn.take() {
            tracing::debug!("Closing connection to {}", conn.peer_addr());
            conn.shutdown();
        }
    }
}

fn not_connected() -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::NotConnected, "not connected")
}
