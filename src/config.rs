//! Configuration for xbdm-rpc
//!
//! Centralized configuration with sensible defaults.

use std::time::Duration;

use crate::error::{Result, RpcError};

/// Default XBDM listening port
pub const DEFAULT_PORT: u16 = 730;

/// Configuration for one debug-target session
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Target Configuration
    // -------------------------------------------------------------------------
    /// Resolved host name or IP address of the target
    pub host: String,

    /// TCP port of the debug monitor
    pub port: u16,

    // -------------------------------------------------------------------------
    // Timeout Configuration
    // -------------------------------------------------------------------------
    /// Connect timeout (milliseconds)
    pub connect_timeout_ms: u64,

    /// Read/write timeout for each exchange (milliseconds)
    pub conversation_timeout_ms: u64,

    /// Both timeouts are widened to this for the duration of a remote call
    /// (milliseconds)
    pub call_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Remote Call Configuration
    // -------------------------------------------------------------------------
    /// Pause before each `buf_addr=` continuation request (milliseconds)
    pub continuation_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            connect_timeout_ms: 5000,
            conversation_timeout_ms: 2000,
            call_timeout_ms: 4_000_000,
            continuation_delay_ms: 250,
        }
    }
}

impl Config {
    /// Default config pointed at `host`
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// `host:port` as handed to the resolver
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn conversation_timeout(&self) -> Duration {
        Duration::from_millis(self.conversation_timeout_ms)
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }

    pub fn continuation_delay(&self) -> Duration {
        Duration::from_millis(self.continuation_delay_ms)
    }

    /// Reject values that can never produce a working session
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(RpcError::Config("host must not be empty".to_string()));
        }
        if self.port == 0 {
            return Err(RpcError::Config("port must not be 0".to_string()));
        }
        if self.connect_timeout_ms == 0 || self.call_timeout_ms == 0 {
            return Err(RpcError::Config(
                "connect and call timeouts must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the target host
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the target port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the connect timeout (in milliseconds)
    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.connect_timeout_ms = ms;
        self
    }

    /// Set the conversation timeout (in milliseconds)
    pub fn conversation_timeout_ms(mut self, ms: u64) -> Self {
        self.config.conversation_timeout_ms = ms;
        self
    }

    /// Set the widened timeout used while a remote call runs (in milliseconds)
    pub fn call_timeout_ms(mut self, ms: u64) -> Self {
        self.config.call_timeout_ms = ms;
        self
    }

    /// Set the pause between continuation round trips (in milliseconds)
    pub fn continuation_delay_ms(mut self, ms: u64) -> Self {
        self.config.continuation_delay_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
