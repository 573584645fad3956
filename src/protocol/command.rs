//! Command definitions
//!
//! Commands sent to the debug monitor, rendered as single text lines.

/// A command for the debug monitor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Free-form command line, sent verbatim
    Raw(String),

    /// Read `length` bytes of target memory
    GetMem { address: u32, length: u32 },

    /// Write bytes to target memory
    SetMem { address: u32, data: Vec<u8> },

    /// Fetch the next chunk of a large remote-call result
    Continue { buf_addr: u64 },
}

impl Command {
    /// Render the command line (without CRLF)
    pub fn to_line(&self) -> String {
        match self {
            Command::Raw(line) => line.clone(),
            Command::GetMem { address, length } => {
                format!("getmem addr=0x{:X} length={}", address, length)
            }
            Command::SetMem { address, data } => {
                format!("setmem addr=0x{:X} data={}", address, hex::encode_upper(data))
            }
            Command::Continue { buf_addr } => {
                format!("consolefeatures buf_addr=0x{:X}", buf_addr)
            }
        }
    }
}

impl From<&str> for Command {
    fn from(line: &str) -> Self {
        Command::Raw(line.to_string())
    }
}

impl From<String> for Command {
    fn from(line: String) -> Self {
        Command::Raw(line)
    }
}
