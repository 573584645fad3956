//! Response definitions
//!
//! Represents responses read back from the debug monitor.

use bytes::Bytes;

/// What followed the status line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// Nothing: a single-line response
    Empty,

    /// Lines of a "response follows" block, terminator excluded
    Lines(Vec<String>),

    /// Raw bytes of a binary block
    Binary(Bytes),
}

/// A complete response to one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// First line, CR stripped
    pub status: String,

    pub body: Body,
}

impl Response {
    /// Create a single-line response
    pub fn line(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            body: Body::Empty,
        }
    }

    /// Create a line-block response
    pub fn lines(status: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            status: status.into(),
            body: Body::Lines(lines),
        }
    }

    /// Create a binary-block response
    pub fn binary(status: impl Into<String>, data: Bytes) -> Self {
        Self {
            status: status.into(),
            body: Body::Binary(data),
        }
    }

    /// Numeric status prefix (`200` in `200- OK`), if present
    pub fn status_code(&self) -> Option<u16> {
        let digits: String = self.status.chars().take_while(|c| c.is_ascii_digit()).collect();
        digits.parse().ok()
    }

    /// Raw bytes when the response carried a binary block
    pub fn data(&self) -> Option<&Bytes> {
        match &self.body {
            Body::Binary(data) => Some(data),
            _ => None,
        }
    }

    /// Flattened textual form
    ///
    /// Line blocks are joined to the status with `\n`. Binary blocks render
    /// as `200- data=<HEX>`, the same shape a text-mode `getmem` reply has.
    pub fn text(&self) -> String {
        match &self.body {
            Body::Empty => self.status.clone(),
            Body::Lines(lines) => {
                let mut text = self.status.clone();
                for line in lines {
                    text.push('\n');
                    text.push_str(line);
                }
                text
            }
            Body::Binary(data) => format!("200- data={}", hex::encode_upper(data)),
        }
    }
}

/// Value of a `key=value` field, ending at the next space
pub fn extract_field<'a>(text: &'a str, key: &str) -> Option<&'a str> {
    let start = text.find(key)? + key.len();
    let rest = &text[start..];
    let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
    Some(rest[..end].trim())
}
