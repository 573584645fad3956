//! Remote Call Module
//!
//! Invokes functions on the target through `consolefeatures`.
//!
//! ## Data Flow
//! ```text
//!  caller ──► Argument Encoder ──► Call Dispatcher ──► Session ──► target
//!                                       │  ▲
//!                                       │  └── buf_addr= continuation
//!                                       ▼
//!  caller ◄── Result Decoder ◄── terminal response
//! ```

mod kind;
mod argument;
mod decode;
mod dispatch;

pub use kind::ReturnKind;
pub use argument::{encode_arguments, Argument, EncodedArguments, MAX_ARGUMENTS};
pub use decode::{decode_result, payload, ReturnValue};
pub use dispatch::{
    build_call_command, check_response, continuation_address, CallOptions, CallTarget,
    ThreadType, AGENT_MISSING_MARKER, BUF_ADDR_MARKER, ERROR_MARKER, JRPC_VERSION,
};
pub(crate) use argument::string_payload;
pub(crate) use dispatch::checked_exchange;
