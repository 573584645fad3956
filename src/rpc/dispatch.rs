//! Call Dispatcher
//!
//! Builds the `consolefeatures` call line, runs it with widened timeouts,
//! follows `buf_addr=` continuations and hands the terminal text to the
//! decoder.
//!
//! ## Call Line
//! ```text
//! consolefeatures ver=2 type=<kind> [system] [module="<m>" ord=<o>] [VM]
//!     as=<array size> params="A\<HEX address>\A\<unit count>\<units>"
//! ```
//!
//! ## Continuation
//! ```text
//! -> consolefeatures ver=2 type=7 ... params="..."
//! <- 200- buf_addr=0x40012000
//! -> consolefeatures buf_addr=0x40012000        (after a short pause)
//! <- 200- 1,2,3,...;
//! ```

use std::time::Duration;

use crate::error::{Result, RpcError};
use crate::network::{Session, SessionState};
use crate::protocol::Command;
use super::{decode_result, encode_arguments, Argument, EncodedArguments, ReturnKind, ReturnValue};

/// Protocol version sent as `ver=`
pub const JRPC_VERSION: u32 = 2;

/// Marks a partial result; the hex address of the remainder follows
pub const BUF_ADDR_MARKER: &str = "buf_addr=";

/// Marks a failure reported by the target
pub const ERROR_MARKER: &str = "error=";

/// Present when the target answers without the call agent loaded
pub const AGENT_MISSING_MARKER: &str = "DEBUG";

/// Which thread kind runs the call on the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThreadType {
    #[default]
    System,
    Title,
}

/// What to call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallTarget {
    /// Raw function address
    Address(u32),

    /// Export `ordinal` of a loaded module
    Ordinal { module: String, ordinal: u32 },
}

/// Everything that shapes one remote call besides its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallOptions {
    pub target: CallTarget,
    pub thread: ThreadType,
    pub vm: bool,
    pub returns: ReturnKind,
    /// Declared destination length for array kinds, sent as `as=`
    pub array_size: u32,
}

impl CallOptions {
    /// Call by address on a system thread, expecting a 64-bit result
    pub fn address(address: u32) -> Self {
        Self::new(CallTarget::Address(address))
    }

    /// Call by module export ordinal on a system thread
    pub fn ordinal(module: impl Into<String>, ordinal: u32) -> Self {
        Self::new(CallTarget::Ordinal {
            module: module.into(),
            ordinal,
        })
    }

    fn new(target: CallTarget) -> Self {
        Self {
            target,
            thread: ThreadType::System,
            vm: false,
            returns: ReturnKind::UInt64,
            array_size: 0,
        }
    }

    pub fn returns(mut self, kind: ReturnKind) -> Self {
        self.returns = kind;
        self
    }

    /// Expect an array of `size` elements
    pub fn returns_array(mut self, kind: ReturnKind, size: u32) -> Self {
        self.returns = kind;
        self.array_size = size;
        self
    }

    pub fn thread(mut self, thread: ThreadType) -> Self {
        self.thread = thread;
        self
    }

    /// Expand array arguments into scalar units
    pub fn vm(mut self) -> Self {
        self.vm = true;
        self
    }
}

/// Render the full call line
pub fn build_call_command(options: &CallOptions, args: &EncodedArguments) -> String {
    let mut line = format!(
        "consolefeatures ver={} type={}",
        JRPC_VERSION,
        options.returns.code()
    );

    if options.thread == ThreadType::System {
        line.push_str(" system");
    }

    let address = match &options.target {
        CallTarget::Address(address) => *address,
        CallTarget::Ordinal { module, ordinal } => {
            line.push_str(&format!(" module=\"{}\" ord={}", module, ordinal));
            0
        }
    };

    if options.vm {
        line.push_str(" VM");
    }

    line.push_str(&format!(
        " as={} params=\"A\\{:X}\\A\\{}\\{}\"",
        options.array_size, address, args.count, args.units
    ));
    line
}

/// Translate target-reported failures into errors
pub fn check_response(text: &str) -> Result<()> {
    if let Some(pos) = text.find(ERROR_MARKER) {
        let message = text[pos + ERROR_MARKER.len()..].trim();
        return Err(RpcError::Protocol(message.to_string()));
    }
    if text.contains(AGENT_MISSING_MARKER) {
        return Err(RpcError::AgentNotInstalled);
    }
    Ok(())
}

/// Address after `buf_addr=`, if the response is a partial result
pub fn continuation_address(text: &str) -> Result<Option<u64>> {
    let pos = match text.find(BUF_ADDR_MARKER) {
        Some(pos) => pos,
        None => return Ok(None),
    };

    let rest = &text[pos + BUF_ADDR_MARKER.len()..];
    let rest = rest
        .strip_prefix("0x")
        .or_else(|| rest.strip_prefix("0X"))
        .unwrap_or(rest);
    let end = rest
        .find(|c: char| !c.is_ascii_hexdigit())
        .unwrap_or(rest.len());

    u64::from_str_radix(&rest[..end], 16)
        .map(Some)
        .map_err(|_| RpcError::DecodeMismatch(format!("bad continuation address in {:?}", text)))
}

/// One exchange whose text is checked for target-reported failures
pub(crate) fn checked_exchange(state: &mut SessionState, command: &str) -> Result<String> {
    let text = state.exchange(command)?.text();
    check_response(&text)?;
    Ok(text)
}

/// Send the call and follow continuations until a terminal response
fn run_call(state: &mut SessionState, command: &str, delay: Duration) -> Result<String> {
    let mut text = checked_exchange(state, command)?;
    let mut rounds = 0u32;

    while let Some(buf_addr) = continuation_address(&text)? {
        rounds += 1;
        tracing::debug!("Continuation round {} at 0x{:X}", rounds, buf_addr);
        std::thread::sleep(delay);
        text = checked_exchange(state, &Command::Continue { buf_addr }.to_line())?;
    }

    Ok(text)
}

impl Session {
    /// Invoke a remote function and decode its result
    ///
    /// Arguments are encoded before any I/O, so an oversized argument list
    /// never touches the connection. An array kind with `array_size` 0 is
    /// still sent; only an empty result then decodes. Both timeouts are
    /// widened for the duration of the call and restored afterwards, on
    /// failure too.
    pub fn call(&self, options: &CallOptions, args: &[Argument]) -> Result<ReturnValue> {
        let encoded = encode_arguments(args, options.vm)?;
        let command = build_call_command(options, &encoded);
        let delay = self.config().continuation_delay();
        let timeout = self.config().call_timeout();

        tracing::debug!(
            "Remote call {:?} returning {} with {} units",
            options.target,
            options.returns,
            encoded.count
        );

        let text = self
            .lock()
            .with_timeouts(timeout, |state| run_call(state, &command, delay))?;

        decode_result(&text, options.returns, options.array_size as usize)
    }

    /// Call expecting no result
    pub fn call_void(&self, options: CallOptions, args: &[Argument]) -> Result<()> {
        self.call(&options.returns(ReturnKind::Void), args).map(|_| ())
    }

    /// Call expecting a string result
    pub fn call_string(&self, options: CallOptions, args: &[Argument]) -> Result<String> {
        match self.call(&options.returns(ReturnKind::String), args)? {
            ReturnValue::String(s) => Ok(s),
            other => Err(RpcError::DecodeMismatch(format!(
                "expected string, got {}",
                other.kind()
            ))),
        }
    }
}
