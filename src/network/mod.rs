//! Network Module
//!
//! TCP transport to the debug target.
//!
//! ## Architecture
//! - `Connection`: one socket, buffered halves, timeouts
//! - `Session`: lazy connect, teardown on failure, one exchange at a time

mod connection;
mod session;

pub use connection::Connection;
pub use session::Session;
pub(crate) use session::SessionState;
