//! Return kinds
//!
//! The numeric codes double as argument type tags on the wire.

use std::fmt;
use std::str::FromStr;

use crate::error::RpcError;

/// Caller-declared shape of a remote call's result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ReturnKind {
    Void = 0,
    Int = 1,
    String = 2,
    Float = 3,
    Byte = 4,
    IntArray = 5,
    FloatArray = 6,
    ByteArray = 7,
    UInt64 = 8,
    UInt64Array = 9,
}

impl ReturnKind {
    /// Wire code
    pub fn code(self) -> u32 {
        self as u32
    }

    /// Kinds whose result is a `;`-terminated list sized by `as=`
    pub fn is_array(self) -> bool {
        matches!(
            self,
            ReturnKind::IntArray
                | ReturnKind::FloatArray
                | ReturnKind::ByteArray
                | ReturnKind::UInt64Array
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            ReturnKind::Void => "void",
            ReturnKind::Int => "int",
            ReturnKind::String => "string",
            ReturnKind::Float => "float",
            ReturnKind::Byte => "byte",
            ReturnKind::IntArray => "int-array",
            ReturnKind::FloatArray => "float-array",
            ReturnKind::ByteArray => "byte-array",
            ReturnKind::UInt64 => "uint64",
            ReturnKind::UInt64Array => "uint64-array",
        }
    }
}

impl fmt::Display for ReturnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ReturnKind {
    type Err = RpcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s.to_ascii_lowercase().as_str() {
            "void" => ReturnKind::Void,
            "int" => ReturnKind::Int,
            "string" | "str" => ReturnKind::String,
            "float" => ReturnKind::Float,
            "byte" => ReturnKind::Byte,
            "int-array" | "ints" => ReturnKind::IntArray,
            "float-array" | "floats" => ReturnKind::FloatArray,
            "byte-array" | "bytes" => ReturnKind::ByteArray,
            "uint64" | "u64" => ReturnKind::UInt64,
            "uint64-array" | "u64s" => ReturnKind::UInt64Array,
            other => {
                return Err(RpcError::Config(format!("unknown return kind {:?}", other)))
            }
        };
        Ok(kind)
    }
}
