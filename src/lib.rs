//! # xbdm-rpc
//!
//! Client for the XBDM debug-monitor line protocol, with:
//! - Lazy, self-healing TCP sessions (default port 730)
//! - Line, line-block and binary-block response framing
//! - Raw memory reads and writes plus big-endian typed accessors
//! - Remote function calls through `consolefeatures`, including
//!   continuation of results too large for one response
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │            Caller (CLI, feature helpers, tools)              │
//! └──────────────┬──────────────────────────────┬───────────────┘
//!                │                              │
//! ┌──────────────▼──────────────┐  ┌────────────▼───────────────┐
//! │        Remote Call          │  │       Memory Access         │
//! │ encode ─► dispatch ─► decode│  │     getmem / setmem         │
//! └──────────────┬──────────────┘  └────────────┬───────────────┘
//!                │                              │
//! ┌──────────────▼──────────────────────────────▼───────────────┐
//! │                    Transport Session                         │
//! │        (one socket, one exchange at a time, lazy connect)    │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  TCP, CRLF lines
//!                       ▼
//!                  debug target
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use xbdm_rpc::{Argument, CallOptions, ReturnKind, Session};
//!
//! # fn main() -> xbdm_rpc::Result<()> {
//! let session = Session::open("192.168.1.20")?;
//! let len = session.call(
//!     &CallOptions::address(0x8200_0000).returns(ReturnKind::Int),
//!     &[Argument::from("hello")],
//! )?;
//! println!("{:?}", len);
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod network;
pub mod memory;
pub mod rpc;
pub mod features;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Result, RpcError, E_CONNECT_FAILED, E_IO_FAILURE};
pub use config::{Config, DEFAULT_PORT};
pub use network::Session;
pub use protocol::{Body, Response};
pub use rpc::{Argument, CallOptions, CallTarget, ReturnKind, ReturnValue, ThreadType};
pub use features::{LedState, NotifyLogo, RebootKind, TemperatureKind};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of xbdm-rpc
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
