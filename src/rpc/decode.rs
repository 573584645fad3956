//! Result Decoder
//!
//! Interprets the terminal response of a remote call according to the
//! declared return kind.
//!
//! The payload is everything after the first space of the response text.
//! Scalars are hexadecimal except floats; arrays are `,`-separated and
//! end at the first `;`.

use crate::error::{Result, RpcError};
use super::ReturnKind;

/// Typed result of a remote call
#[derive(Debug, Clone, PartialEq)]
pub enum ReturnValue {
    Void,
    Int(i32),
    String(String),
    Float(f64),
    Byte(u8),
    IntArray(Vec<i32>),
    FloatArray(Vec<f32>),
    ByteArray(Vec<u8>),
    UInt64(u64),
    UInt64Array(Vec<u64>),
}

impl ReturnValue {
    pub fn kind(&self) -> ReturnKind {
        match self {
            ReturnValue::Void => ReturnKind::Void,
            ReturnValue::Int(_) => ReturnKind::Int,
            ReturnValue::String(_) => ReturnKind::String,
            ReturnValue::Float(_) => ReturnKind::Float,
            ReturnValue::Byte(_) => ReturnKind::Byte,
            ReturnValue::IntArray(_) => ReturnKind::IntArray,
            ReturnValue::FloatArray(_) => ReturnKind::FloatArray,
            ReturnValue::ByteArray(_) => ReturnKind::ByteArray,
            ReturnValue::UInt64(_) => ReturnKind::UInt64,
            ReturnValue::UInt64Array(_) => ReturnKind::UInt64Array,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            ReturnValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            ReturnValue::UInt64(v) => Some(*v),
            ReturnValue::Int(v) => Some(*v as u32 as u64),
            ReturnValue::Byte(v) => Some(*v as u64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ReturnValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ReturnValue::String(s) => Some(s),
            _ => None,
        }
    }
}

/// Everything after the first space, or the whole text if there is none
pub fn payload(text: &str) -> &str {
    match text.find(' ') {
        Some(pos) => &text[pos + 1..],
        None => text,
    }
}

/// Decode a terminal response
///
/// `array_size` is the declared destination length for array kinds;
/// elements the target did not send stay zero.
pub fn decode_result(text: &str, kind: ReturnKind, array_size: usize) -> Result<ReturnValue> {
    let body = payload(text);

    let value = match kind {
        ReturnKind::Void => ReturnValue::Void,
        ReturnKind::Int => {
            let v = parse_hex(body)?;
            let v = u32::try_from(v).map_err(|_| {
                RpcError::DecodeMismatch(format!("int result {:?} exceeds 32 bits", body.trim()))
            })?;
            ReturnValue::Int(v as i32)
        }
        ReturnKind::UInt64 => ReturnValue::UInt64(parse_hex(body)?),
        ReturnKind::Byte => ReturnValue::Byte(parse_hex(body)? as u8),
        ReturnKind::String => ReturnValue::String(body.to_string()),
        ReturnKind::Float => ReturnValue::Float(parse_float_lenient(body)),
        ReturnKind::IntArray => ReturnValue::IntArray(parse_array(body, array_size, kind, |t| {
            parse_hex(t).ok().and_then(|v| u32::try_from(v).ok()).map(|v| v as i32)
        })?),
        ReturnKind::FloatArray => {
            ReturnValue::FloatArray(parse_array(body, array_size, kind, |t| t.parse().ok())?)
        }
        ReturnKind::ByteArray => ReturnValue::ByteArray(parse_array(body, array_size, kind, |t| {
            // Signed decimal, e.g. "-1" is 0xFF
            t.parse::<i16>()
                .ok()
                .filter(|v| (-128..=255).contains(v))
                .map(|v| v as u8)
        })?),
        ReturnKind::UInt64Array => {
            ReturnValue::UInt64Array(parse_array(body, array_size, kind, |t| t.parse().ok())?)
        }
    };

    Ok(value)
}

/// Hexadecimal, optional `0x`, surrounding whitespace ignored
fn parse_hex(text: &str) -> Result<u64> {
    let t = text.trim();
    let digits = t
        .strip_prefix("0x")
        .or_else(|| t.strip_prefix("0X"))
        .unwrap_or(t);
    u64::from_str_radix(digits, 16)
        .map_err(|_| RpcError::DecodeMismatch(format!("expected hex, got {:?}", t)))
}

/// Double when the text looks like one, single precision otherwise; 0.0
/// when it parses as neither
fn parse_float_lenient(text: &str) -> f64 {
    let t = text.trim();
    let parsed = if t.contains(|c: char| c == '.' || c == 'e' || c == 'E') {
        t.parse::<f64>().ok()
    } else {
        t.parse::<f32>().ok().map(f64::from)
    };
    parsed.unwrap_or(0.0)
}

fn parse_array<T, F>(text: &str, size: usize, kind: ReturnKind, parse: F) -> Result<Vec<T>>
where
    T: Clone + Default,
    F: Fn(&str) -> Option<T>,
{
    let mut out = vec![T::default(); size];
    let mut index = 0;
    let mut token = String::new();

    for ch in text.chars() {
        if ch != ',' && ch != ';' {
            token.push(ch);
            continue;
        }

        // "1,2,;" and ";" end cleanly
        if ch == ';' && token.trim().is_empty() {
            return Ok(out);
        }

        let value = parse(token.trim()).ok_or_else(|| {
            RpcError::DecodeMismatch(format!("bad {} element {:?}", kind, token))
        })?;
        if index >= size {
            return Err(RpcError::DecodeMismatch(format!(
                "{} result has more than the declared {} elements",
                kind, size
            )));
        }
        out[index] = value;
        index += 1;
        token.clear();

        if ch == ';' {
            return Ok(out);
        }
    }

    Err(RpcError::DecodeMismatch(format!(
        "{} result is missing its ';' terminator",
        kind
    )))
}
