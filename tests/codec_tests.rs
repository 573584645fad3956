//! Codec Tests
//!
//! Tests for command framing and the three response shapes.

use std::io::{Cursor, ErrorKind};

use xbdm_rpc::protocol::{extract_field, frame_line, read_line, read_response, Body, Command};
use xbdm_rpc::RpcError;

// =============================================================================
// Command Framing Tests
// =============================================================================

#[test]
fn test_frame_line_appends_crlf() {
    assert_eq!(frame_line("dmversion").unwrap(), "dmversion\r\n");
}

#[test]
fn test_frame_line_normalizes_trailing_terminator() {
    assert_eq!(frame_line("go\r\n").unwrap(), "go\r\n");
    assert_eq!(frame_line("go\n").unwrap(), "go\r\n");
}

#[test]
fn test_frame_line_rejects_embedded_line_break() {
    let err = frame_line("go\r\nstop").unwrap_err();
    assert!(matches!(err, RpcError::InvalidCommand(_)));

    let err = frame_line("a\nb\n").unwrap_err();
    assert!(matches!(err, RpcError::InvalidCommand(_)));
}

#[test]
fn test_command_lines() {
    assert_eq!(
        Command::GetMem { address: 0x8200_0000, length: 16 }.to_line(),
        "getmem addr=0x82000000 length=16"
    );
    assert_eq!(
        Command::SetMem { address: 0xC0DE, data: vec![0x60, 0x00, 0xAB] }.to_line(),
        "setmem addr=0xC0DE data=6000AB"
    );
    assert_eq!(
        Command::Continue { buf_addr: 0x4001_2000 }.to_line(),
        "consolefeatures buf_addr=0x40012000"
    );
    assert_eq!(Command::from("dmversion").to_line(), "dmversion");
}

// =============================================================================
// Line Reading Tests
// =============================================================================

#[test]
fn test_read_line_strips_crlf_and_lf() {
    let mut cursor = Cursor::new(b"first\r\nsecond\n".to_vec());
    assert_eq!(read_line(&mut cursor).unwrap(), "first");
    assert_eq!(read_line(&mut cursor).unwrap(), "second");
}

#[test]
fn test_read_line_eof_is_error() {
    let mut cursor = Cursor::new(Vec::new());
    let err = read_line(&mut cursor).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnexpectedEof);
}

// =============================================================================
// Response Shape Tests
// =============================================================================

#[test]
fn test_single_line_response() {
    let mut cursor = Cursor::new(b"200- OK\r\n".to_vec());
    let response = read_response(&mut cursor).unwrap();

    assert_eq!(response.status, "200- OK");
    assert_eq!(response.body, Body::Empty);
    assert_eq!(response.status_code(), Some(200));
    assert_eq!(response.text(), "200- OK");
}

#[test]
fn test_multiline_response() {
    let wire = b"202- multiline response follows\r\nalpha\r\nbeta\r\n.\r\n".to_vec();
    let mut cursor = Cursor::new(wire);
    let response = read_response(&mut cursor).unwrap();

    assert_eq!(
        response.body,
        Body::Lines(vec!["alpha".to_string(), "beta".to_string()])
    );
    assert_eq!(response.text(), "202- multiline response follows\nalpha\nbeta");
}

#[test]
fn test_multiline_response_truncated() {
    let mut cursor = Cursor::new(b"202- multiline response follows\r\nalpha\r\n".to_vec());
    let err = read_response(&mut cursor).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnexpectedEof);
}

#[test]
fn test_binary_response_reads_exact_length() {
    let mut wire = b"203- binary response follows\r\n3\r\n".to_vec();
    wire.extend_from_slice(&[0x0A, 0x0D, 0xFF]);
    wire.extend_from_slice(b"\r\n200- next\r\n");
    let mut cursor = Cursor::new(wire);

    let response = read_response(&mut cursor).unwrap();
    assert_eq!(response.data().unwrap().as_ref(), &[0x0A, 0x0D, 0xFF]);
    assert_eq!(response.text(), "200- data=0A0DFF");

    // The trailing line was consumed; the next response is intact
    let next = read_response(&mut cursor).unwrap();
    assert_eq!(next.status, "200- next");
}

#[test]
fn test_binary_response_without_trailer() {
    let mut wire = b"203- binary response follows\r\n2\r\n".to_vec();
    wire.extend_from_slice(&[0x01, 0x02]);
    let mut cursor = Cursor::new(wire);

    let response = read_response(&mut cursor).unwrap();
    assert_eq!(response.data().unwrap().as_ref(), &[0x01, 0x02]);
}

#[test]
fn test_binary_response_bad_length() {
    let mut cursor = Cursor::new(b"203- binary response follows\r\nlots\r\n".to_vec());
    let err = read_response(&mut cursor).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidData);
}

#[test]
fn test_binary_response_short_payload() {
    let mut wire = b"203- binary response follows\r\n8\r\n".to_vec();
    wire.extend_from_slice(&[1, 2, 3]);
    let mut cursor = Cursor::new(wire);

    let err = read_response(&mut cursor).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnexpectedEof);
}

// =============================================================================
// Field Extraction Tests
// =============================================================================

#[test]
fn test_extract_field() {
    let text = "200- addr=0x1000 data=DEADBEEF extra";
    assert_eq!(extract_field(text, "data="), Some("DEADBEEF"));
    assert_eq!(extract_field(text, "addr="), Some("0x1000"));
    assert_eq!(extract_field(text, "missing="), None);
}
