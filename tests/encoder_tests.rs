//! Argument Encoder Tests
//!
//! Tests for the tagged units of a call's `params` body.

use xbdm_rpc::rpc::{encode_arguments, MAX_ARGUMENTS};
use xbdm_rpc::{Argument, RpcError};

fn units(args: &[Argument], vm: bool) -> String {
    encode_arguments(args, vm).unwrap().units
}

// =============================================================================
// Scalar Tests
// =============================================================================

#[test]
fn test_encode_int() {
    assert_eq!(units(&[Argument::Int(42)], false), "1\\42\\");
    assert_eq!(units(&[Argument::Int(-5)], false), "1\\-5\\");
}

#[test]
fn test_encode_unsigned_word_as_int_pattern() {
    assert_eq!(units(&[Argument::from(0xFFFF_FFFFu32)], false), "1\\-1\\");
}

#[test]
fn test_encode_bool_and_byte() {
    assert_eq!(units(&[Argument::Bool(true)], false), "1\\1\\");
    assert_eq!(units(&[Argument::Bool(false)], false), "1\\0\\");
    assert_eq!(units(&[Argument::Byte(200)], false), "1\\200\\");
}

#[test]
fn test_encode_long_keeps_low_32_bits() {
    assert_eq!(units(&[Argument::Long(0x1_0000_0005)], false), "1\\5\\");
    assert_eq!(units(&[Argument::Long(0xFFFF_FFFF)], false), "1\\-1\\");
}

#[test]
fn test_encode_short_and_uint64_use_64_bit_tag() {
    assert_eq!(units(&[Argument::Short(-1)], false), "8\\65535\\");
    assert_eq!(
        units(&[Argument::UInt64(u64::MAX)], false),
        "8\\18446744073709551615\\"
    );
}

#[test]
fn test_encode_floats() {
    assert_eq!(units(&[Argument::Float(1.5)], false), "3\\1.5\\");
    assert_eq!(units(&[Argument::Double(2.0)], false), "3\\2.0\\");
}

#[test]
fn test_encode_float_text_form() {
    assert_eq!(units(&[Argument::Float(1e-5)], false), "3\\1.0E-5\\");
    assert_eq!(units(&[Argument::Double(1.5e10)], false), "3\\1.5E10\\");
    assert_eq!(units(&[Argument::Float(1e7)], false), "3\\1.0E7\\");
    assert_eq!(units(&[Argument::Float(-0.001)], false), "3\\-0.001\\");
    assert_eq!(units(&[Argument::Float(0.0)], false), "3\\0.0\\");
    assert_eq!(units(&[Argument::Float(f32::INFINITY)], false), "3\\Infinity\\");
    assert_eq!(units(&[Argument::Double(f64::NEG_INFINITY)], false), "3\\-Infinity\\");
    assert_eq!(units(&[Argument::Float(f32::NAN)], false), "3\\NaN\\");
}

#[test]
fn test_vm_float_array_uses_same_text_form() {
    let encoded = encode_arguments(&[Argument::FloatArray(vec![2.5e-4, 1.0])], true).unwrap();
    assert_eq!(encoded.units, "3\\2.5E-4\\3\\1.0\\");
}

// =============================================================================
// Blob Tests
// =============================================================================

#[test]
fn test_encode_string_as_hex_blob() {
    assert_eq!(units(&[Argument::from("hi")], false), "7/2\\6869\\");
}

#[test]
fn test_encode_string_uses_low_byte_of_each_char() {
    // U+0141 has low byte 0x41
    assert_eq!(units(&[Argument::from("\u{141}")], false), "7/1\\41\\");
}

#[test]
fn test_encode_bytes_as_signed_decimal() {
    assert_eq!(
        units(&[Argument::Bytes(vec![0x01, 0xFF, 0x7F])], false),
        "7/3\\1-1127\\"
    );
}

#[test]
fn test_encode_int_array_little_endian_blob() {
    assert_eq!(
        units(&[Argument::IntArray(vec![1, 0x0A0B0C0D])], false),
        "7/8\\010000000D0C0B0A\\"
    );
}

#[test]
fn test_encode_long_array_narrowed() {
    assert_eq!(
        units(&[Argument::LongArray(vec![0x1_0000_0002])], false),
        "7/4\\02000000\\"
    );
}

#[test]
fn test_encode_float_array_big_endian_blob() {
    assert_eq!(
        units(&[Argument::FloatArray(vec![1.0, -2.0])], false),
        "7/8\\3F800000C0000000\\"
    );
}

// =============================================================================
// VM Mode Tests
// =============================================================================

#[test]
fn test_vm_expands_int_array() {
    let encoded = encode_arguments(&[Argument::IntArray(vec![1, 2, 3])], true).unwrap();
    assert_eq!(encoded.units, "1\\1\\1\\2\\1\\3\\");
    assert_eq!(encoded.count, 3);
}

#[test]
fn test_vm_expands_float_array() {
    let encoded = encode_arguments(&[Argument::FloatArray(vec![0.5, 3.0])], true).unwrap();
    assert_eq!(encoded.units, "3\\0.5\\3\\3.0\\");
    assert_eq!(encoded.count, 2);
}

#[test]
fn test_vm_leaves_strings_as_blobs() {
    let encoded = encode_arguments(&[Argument::from("a")], true).unwrap();
    assert_eq!(encoded.units, "7/1\\61\\");
    assert_eq!(encoded.count, 1);
}

// =============================================================================
// Limit Tests
// =============================================================================

#[test]
fn test_unit_count_concatenates_in_order() {
    let encoded =
        encode_arguments(&[Argument::Int(1), Argument::from("x"), Argument::Float(0.25)], false)
            .unwrap();
    assert_eq!(encoded.units, "1\\1\\7/1\\78\\3\\0.25\\");
    assert_eq!(encoded.count, 3);
}

#[test]
fn test_argument_limit_boundary() {
    let args = vec![Argument::Int(0); MAX_ARGUMENTS];
    assert_eq!(encode_arguments(&args, false).unwrap().count, 37);

    let args = vec![Argument::Int(0); MAX_ARGUMENTS + 1];
    let err = encode_arguments(&args, false).unwrap_err();
    assert!(matches!(
        err,
        RpcError::ArgumentLimitExceeded { count: 38, max: 37 }
    ));
}

#[test]
fn test_vm_expansion_counts_toward_limit() {
    // One array argument, but 40 units once expanded
    let args = [Argument::IntArray(vec![7; 40])];
    assert_eq!(encode_arguments(&args, false).unwrap().count, 1);
    assert!(matches!(
        encode_arguments(&args, true),
        Err(RpcError::ArgumentLimitExceeded { count: 40, .. })
    ));
}

#[test]
fn test_no_arguments() {
    let encoded = encode_arguments(&[], false).unwrap();
    assert_eq!(encoded.units, "");
    assert_eq!(encoded.count, 0);
}
