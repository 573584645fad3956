//! Protocol Module
//!
//! Defines the XBDM text line protocol spoken with the debug target.
//!
//! ## Request Format
//! ```text
//! ┌──────────────────────────────────────┬──────────┐
//! │ ASCII command line (no CR/LF inside) │  CR LF   │
//! └──────────────────────────────────────┴──────────┘
//! ```
//!
//! ## Response Formats
//! ```text
//! single line   200- OK
//!
//! line block    202- multiline response follows
//!               line 1
//!               ...
//!               .
//!
//! binary block  203- binary response follows
//!               <decimal length>
//!               <length raw bytes>
//!               <trailing line, discarded>
//! ```
//!
//! Status codes are opaque to this layer; only the block markers are
//! interpreted.

mod command;
mod response;
mod codec;

pub use command::Command;
pub use response::{extract_field, Body, Response};
pub use codec::{
    frame_line, read_binary_block, read_line, read_response, write_frame, BINARY_MARKER,
    END_OF_BLOCK, LINE_TERMINATOR, MAX_BINARY_SIZE, MULTILINE_MARKER,
};
