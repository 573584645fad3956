//! Argument Encoder
//!
//! Turns call arguments into the tagged units of a `params="..."` body.
//!
//! ## Unit Shapes
//! ```text
//! scalar   <tag>\<value>\            1\42\   3\1.5\   8\65535\
//! blob     7/<declared len>\<data>\  7/8\2A00000001000000\
//! ```
//!
//! Tags reuse the return-kind codes: 1 int, 3 float, 7 byte array,
//! 8 uint64.

use std::fmt::{Debug, Display, LowerExp, Write};

use crate::error::{Result, RpcError};
use super::ReturnKind;

/// Most units one call may carry
pub const MAX_ARGUMENTS: usize = 37;

/// One argument of a remote call
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    Bool(bool),
    Byte(u8),
    Short(i16),
    Int(i32),
    /// Only the low 32 bits reach the target
    Long(i64),
    /// Raw 64-bit unit
    UInt64(u64),
    Float(f32),
    Double(f64),
    /// Sent as the low byte of each character
    Str(String),
    /// Sent as signed decimal text, not hex
    Bytes(Vec<u8>),
    IntArray(Vec<i32>),
    /// Elements are narrowed to 32 bits
    LongArray(Vec<i64>),
    FloatArray(Vec<f32>),
}

impl Argument {
    /// Value used by the 64-bit fallback unit
    ///
    /// Booleans become 0/1, small integers are zero-extended, floats
    /// travel as the bits of the equivalent `f64`. Anything else is 0.
    pub fn as_wire_u64(&self) -> u64 {
        match self {
            Argument::Bool(b) => *b as u64,
            Argument::Byte(b) => *b as u64,
            Argument::Short(v) => *v as u16 as u64,
            Argument::Int(v) => *v as u32 as u64,
            Argument::Long(v) => *v as u64,
            Argument::UInt64(v) => *v,
            Argument::Float(v) => (*v as f64).to_bits(),
            Argument::Double(v) => v.to_bits(),
            _ => 0,
        }
    }
}

/// Encoded `params` units and how many there are
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EncodedArguments {
    pub units: String,
    pub count: usize,
}

/// Encode `args`; VM mode expands arrays into one unit per element
///
/// Fails with `ArgumentLimitExceeded` when more than `MAX_ARGUMENTS`
/// units result.
pub fn encode_arguments(args: &[Argument], vm: bool) -> Result<EncodedArguments> {
    let mut enc = Encoder::default();

    for arg in args {
        match arg {
            // Low 32 bits only; there is no 64-bit scalar unit for this
            Argument::Long(v) => enc.scalar(ReturnKind::Int, *v as i32),
            Argument::Int(v) => enc.scalar(ReturnKind::Int, v),
            Argument::Bool(b) => enc.scalar(ReturnKind::Int, *b as u8),
            Argument::Byte(b) => enc.scalar(ReturnKind::Int, b),
            Argument::IntArray(values) => enc.int_array(values.iter().copied(), vm),
            Argument::LongArray(values) => enc.int_array(values.iter().map(|v| *v as i32), vm),
            Argument::Str(s) => {
                let (len, payload) = string_payload(s);
                enc.blob(len, &payload);
            }
            Argument::Double(v) => enc.scalar(ReturnKind::Float, float_text(*v, *v)),
            Argument::Float(v) => enc.scalar(ReturnKind::Float, float_text(*v, *v as f64)),
            Argument::FloatArray(values) if vm => {
                for v in values {
                    enc.scalar(ReturnKind::Float, float_text(*v, *v as f64));
                }
            }
            Argument::FloatArray(values) => {
                let payload: String = values
                    .iter()
                    .map(|v| hex::encode_upper(v.to_be_bytes()))
                    .collect();
                enc.blob(values.len() * 4, &payload);
            }
            Argument::Bytes(bytes) => {
                let payload: String = bytes.iter().map(|b| (*b as i8).to_string()).collect();
                enc.blob(bytes.len(), &payload);
            }
            Argument::Short(_) | Argument::UInt64(_) => {
                enc.scalar(ReturnKind::UInt64, arg.as_wire_u64())
            }
        }
    }

    if enc.count > MAX_ARGUMENTS {
        return Err(RpcError::ArgumentLimitExceeded {
            count: enc.count,
            max: MAX_ARGUMENTS,
        });
    }

    Ok(EncodedArguments {
        units: enc.out,
        count: enc.count,
    })
}

/// Character count and the hex of each character's low byte
pub(crate) fn string_payload(s: &str) -> (usize, String) {
    let mut payload = String::with_capacity(s.len() * 2);
    let mut len = 0;
    for c in s.chars() {
        let _ = write!(payload, "{:02X}", c as u32 as u8);
        len += 1;
    }
    (len, payload)
}

/// Decimal text the call agent parses: plain notation for magnitudes in
/// `[1e-3, 1e7)`, otherwise `<digits>E<exp>`, e.g. `1.0E-5`, `Infinity`
///
/// `value` supplies the shortest digits at its own precision; `wide` is
/// the same value used for classification.
pub(crate) fn float_text<T: LowerExp + Debug>(value: T, wide: f64) -> String {
    if wide.is_nan() {
        return "NaN".to_string();
    }
    if wide.is_infinite() {
        return if wide > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    let magnitude = wide.abs();
    if magnitude == 0.0 || (1e-3..1e7).contains(&magnitude) {
        return format!("{:?}", value);
    }

    let sci = format!("{:e}", value);
    match sci.split_once('e') {
        Some((mantissa, exp)) if mantissa.contains('.') => format!("{}E{}", mantissa, exp),
        Some((mantissa, exp)) => format!("{}.0E{}", mantissa, exp),
        None => sci,
    }
}

#[derive(Default)]
struct Encoder {
    out: String,
    count: usize,
}

impl Encoder {
    fn scalar(&mut self, tag: ReturnKind, value: impl Display) {
        let _ = write!(self.out, "{}\\{}\\", tag.code(), value);
        self.count += 1;
    }

    fn blob(&mut self, declared_len: usize, payload: &str) {
        let _ = write!(
            self.out,
            "{}/{}\\{}\\",
            ReturnKind::ByteArray.code(),
            declared_len,
            payload
        );
        self.count += 1;
    }

    /// Packed little-endian blob, or one int unit per element in VM mode
    fn int_array(&mut self, values: impl ExactSizeIterator<Item = i32>, vm: bool) {
        if vm {
            for v in values {
                self.scalar(ReturnKind::Int, v);
            }
            return;
        }

        let len = values.len() * 4;
        let payload: String = values.map(|v| hex::encode_upper(v.to_le_bytes())).collect();
        self.blob(len, &payload);
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<bool> for Argument {
    fn from(v: bool) -> Self {
        Argument::Bool(v)
    }
}

impl From<u8> for Argument {
    fn from(v: u8) -> Self {
        Argument::Byte(v)
    }
}

impl From<i16> for Argument {
    fn from(v: i16) -> Self {
        Argument::Short(v)
    }
}

impl From<i32> for Argument {
    fn from(v: i32) -> Self {
        Argument::Int(v)
    }
}

/// Addresses and other unsigned words travel as their 32-bit pattern
impl From<u32> for Argument {
    fn from(v: u32) -> Self {
        Argument::Int(v as i32)
    }
}

impl From<i64> for Argument {
    fn from(v: i64) -> Self {
        Argument::Long(v)
    }
}

impl From<u64> for Argument {
    fn from(v: u64) -> Self {
        Argument::UInt64(v)
    }
}

impl From<f32> for Argument {
    fn from(v: f32) -> Self {
        Argument::Float(v)
    }
}

impl From<f64> for Argument {
    fn from(v: f64) -> Self {
        Argument::Double(v)
    }
}

impl From<&str> for Argument {
    fn from(v: &str) -> Self {
        Argument::Str(v.to_string())
    }
}

impl From<String> for Argument {
    fn from(v: String) -> Self {
        Argument::Str(v)
    }
}

impl From<&[u8]> for Argument {
    fn from(v: &[u8]) -> Self {
        Argument::Bytes(v.to_vec())
    }
}

impl From<Vec<u8>> for Argument {
    fn from(v: Vec<u8>) -> Self {
        Argument::Bytes(v)
    }
}

impl From<Vec<i32>> for Argument {
    fn from(v: Vec<i32>) -> Self {
        Argument::IntArray(v)
    }
}

impl From<Vec<i64>> for Argument {
    fn from(v: Vec<i64>) -> Self {
        Argument::LongArray(v)
    }
}

impl From<Vec<f32>> for Argument {
    fn from(v: Vec<f32>) -> Self {
        Argument::FloatArray(v)
    }
}
