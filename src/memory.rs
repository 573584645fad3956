//! Memory Access
//!
//! `getmem` / `setmem` primitives and the typed accessors built on them.
//!
//! Target memory is big-endian; the typed accessors convert through
//! `bytes::Buf` / `BufMut`, which read and write big-endian by default.

use bytes::{Buf, BufMut, BytesMut};

use crate::error::{Result, RpcError};
use crate::network::Session;
use crate::protocol::{extract_field, Command};

impl Session {
    // =========================================================================
    // Raw Primitives
    // =========================================================================

    /// Read up to `length` bytes into `buf`, returning how many arrived
    ///
    /// The count is bounded by `length`, the data the target returned and
    /// `buf.len()`.
    pub fn read_memory_into(&self, address: u32, length: u32, buf: &mut [u8]) -> Result<usize> {
        let command = Command::GetMem { address, length }.to_line();
        let response = self.send_command(&command)?;
        let limit = buf.len().min(length as usize);

        if let Some(data) = response.data() {
            let n = limit.min(data.len());
            buf[..n].copy_from_slice(&data[..n]);
            return Ok(n);
        }

        let text = response.text();
        let hex_digits = extract_field(&text, "data=").unwrap_or("");
        if !hex_digits.is_ascii() {
            return Err(RpcError::DecodeMismatch(format!(
                "getmem data at 0x{:X} is not hex",
                address
            )));
        }
        let n = limit.min(hex_digits.len() / 2);
        let decoded = hex::decode(&hex_digits[..n * 2]).map_err(|e| {
            RpcError::DecodeMismatch(format!("getmem data at 0x{:X}: {}", address, e))
        })?;
        buf[..n].copy_from_slice(&decoded);
        Ok(n)
    }

    /// Read `length` bytes; the result may be shorter if the target sent less
    pub fn read_memory(&self, address: u32, length: u32) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; length as usize];
        let n = self.read_memory_into(address, length, &mut buf)?;
        buf.truncate(n);
        Ok(buf)
    }

    /// Write `data` and return the number of bytes sent
    ///
    /// The acknowledgement must arrive, but its content is not inspected.
    /// Losing the link before it does is an I/O failure.
    pub fn write_memory(&self, address: u32, data: &[u8]) -> Result<usize> {
        let command = Command::SetMem {
            address,
            data: data.to_vec(),
        }
        .to_line();
        self.send_command(&command)?;
        Ok(data.len())
    }

    // =========================================================================
    // Typed Reads
    // =========================================================================

    /// Read exactly `len` bytes or fail
    fn read_exact_memory(&self, address: u32, len: u32) -> Result<Vec<u8>> {
        let data = self.read_memory(address, len)?;
        if data.len() < len as usize {
            return Err(RpcError::DecodeMismatch(format!(
                "short read at 0x{:X}: wanted {} bytes, got {}",
                address,
                len,
                data.len()
            )));
        }
        Ok(data)
    }

    pub fn read_u8(&self, address: u32) -> Result<u8> {
        Ok(self.read_exact_memory(address, 1)?[0])
    }

    pub fn read_bool(&self, address: u32) -> Result<bool> {
        Ok(self.read_u8(address)? != 0)
    }

    pub fn read_u16(&self, address: u32) -> Result<u16> {
        Ok(self.read_exact_memory(address, 2)?.as_slice().get_u16())
    }

    pub fn read_u32(&self, address: u32) -> Result<u32> {
        Ok(self.read_exact_memory(address, 4)?.as_slice().get_u32())
    }

    pub fn read_i32(&self, address: u32) -> Result<i32> {
        Ok(self.read_exact_memory(address, 4)?.as_slice().get_i32())
    }

    pub fn read_u64(&self, address: u32) -> Result<u64> {
        Ok(self.read_exact_memory(address, 8)?.as_slice().get_u64())
    }

    pub fn read_f32(&self, address: u32) -> Result<f32> {
        Ok(self.read_exact_memory(address, 4)?.as_slice().get_f32())
    }

    /// Read `count` consecutive big-endian u32 values
    pub fn read_u32_array(&self, address: u32, count: u32) -> Result<Vec<u32>> {
        let len = count.checked_mul(4).ok_or_else(|| {
            RpcError::Config(format!(
                "{} words at 0x{:X} exceed the 32-bit length field",
                count, address
            ))
        })?;
        let data = self.read_exact_memory(address, len)?;
        let mut buf = data.as_slice();
        Ok((0..count).map(|_| buf.get_u32()).collect())
    }

    /// Read at most `max_len` bytes as text, stopping at the first NUL
    pub fn read_string(&self, address: u32, max_len: u32) -> Result<String> {
        let data = self.read_memory(address, max_len)?;
        let end = data.iter().position(|&b| b == 0).unwrap_or(data.len());
        Ok(String::from_utf8_lossy(&data[..end]).into_owned())
    }

    // =========================================================================
    // Typed Writes
    // =========================================================================

    pub fn write_u8(&self, address: u32, value: u8) -> Result<()> {
        self.write_memory(address, &[value]).map(|_| ())
    }

    pub fn write_bool(&self, address: u32, value: bool) -> Result<()> {
        self.write_u8(address, value as u8)
    }

    pub fn write_u16(&self, address: u32, value: u16) -> Result<()> {
        let mut buf = BytesMut::with_capacity(2);
        buf.put_u16(value);
        self.write_memory(address, &buf).map(|_| ())
    }

    pub fn write_u32(&self, address: u32, value: u32) -> Result<()> {
        let mut buf = BytesMut::with_capacity(4);
        buf.put_u32(value);
        self.write_memory(address, &buf).map(|_| ())
    }

    pub fn write_i32(&self, address: u32, value: i32) -> Result<()> {
        let mut buf = BytesMut::with_capacity(4);
        buf.put_i32(value);
        self.write_memory(address, &buf).map(|_| ())
    }

    pub fn write_u64(&self, address: u32, value: u64) -> Result<()> {
        let mut buf = BytesMut::with_capacity(8);
        buf.put_u64(value);
        self.write_memory(address, &buf).map(|_| ())
    }

    pub fn write_f32(&self, address: u32, value: f32) -> Result<()> {
        let mut buf = BytesMut::with_capacity(4);
        buf.put_f32(value);
        self.write_memory(address, &buf).map(|_| ())
    }

    /// Write the string's bytes followed by a NUL terminator
    pub fn write_string(&self, address: u32, value: &str) -> Result<()> {
        let mut buf = BytesMut::with_capacity(value.len() + 1);
        buf.put_slice(value.as_bytes());
        buf.put_u8(0);
        self.write_memory(address, &buf).map(|_| ())
    }
}
