//! Little-endian primitives shared by the frame headers and the message catalog.
//!
//! Every multi-byte integer on the LIFX wire is little-endian. Text fields are
//! fixed-width and zero padded, identifiers are 16 raw bytes and hardware
//! addresses are 6 raw bytes.
//!
//! [`Reader`] decodes from a borrowed slice and reports short input as
//! [`Error::Truncated`] instead of panicking, so a malformed datagram can never
//! take the engine down. [`BufMutExt`] adds the protocol's composite fields to
//! any [`BufMut`].

use bytes::{Buf, BufMut};
use uuid::Uuid;

use crate::errors::Error;
use crate::types::MacAddress;

type Result<T> = std::result::Result<T, Error>;

/// Cursor over a received payload.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    buf: &'a [u8],
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Reader { buf }
    }

    pub fn remaining(&self) -> usize {
        self.buf.len()
    }

    fn need(&self, n: usize) -> Result<()> {
        if self.buf.len() < n {
            return Err(Error::truncated(n, self.buf.len()));
        }
        Ok(())
    }

    pub fn u8(&mut self) -> Result<u8> {
        self.need(1)?;
        Ok(self.buf.get_u8())
    }

    pub fn u16(&mut self) -> Result<u16> {
        self.need(2)?;
        Ok(self.buf.get_u16_le())
    }

    pub fn i16(&mut self) -> Result<i16> {
        self.need(2)?;
        Ok(self.buf.get_i16_le())
    }

    pub fn u32(&mut self) -> Result<u32> {
        self.need(4)?;
        Ok(self.buf.get_u32_le())
    }

    pub fn u64(&mut self) -> Result<u64> {
        self.need(8)?;
        Ok(self.buf.get_u64_le())
    }

    pub fn f32(&mut self) -> Result<f32> {
        self.need(4)?;
        Ok(self.buf.get_f32_le())
    }

    /// Any non-zero byte reads as `true`.
    pub fn bool(&mut self) -> Result<bool> {
        Ok(self.u8()? != 0)
    }

    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.need(n)?;
        self.buf.advance(n);
        Ok(())
    }

    pub fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        self.need(N)?;
        let mut out = [0u8; N];
        self.buf.copy_to_slice(&mut out);
        Ok(out)
    }

    /// Reads a fixed-width text field of `len` bytes.
    pub fn label(&mut self, len: usize) -> Result<String> {
        self.need(len)?;
        let text = decode_label(&self.buf[..len]);
        self.buf.advance(len);
        Ok(text)
    }

    pub fn uuid(&mut self) -> Result<Uuid> {
        Ok(Uuid::from_bytes(self.array::<16>()?))
    }

    pub fn mac(&mut self) -> Result<MacAddress> {
        Ok(MacAddress::new(self.array::<6>()?))
    }
}

/// Protocol field writers for any [`BufMut`].
pub trait BufMutExt: BufMut {
    /// Writes exactly one byte, 0 or 1.
    fn put_bool(&mut self, value: bool) {
        self.put_u8(u8::from(value));
    }

    /// Writes `text` truncated or zero padded to exactly `len` bytes.
    fn put_label(&mut self, text: &str, len: usize) {
        self.put_slice(&encode_label(text, len));
    }

    fn put_uuid(&mut self, id: &Uuid) {
        self.put_slice(id.as_bytes());
    }

    fn put_mac(&mut self, mac: &MacAddress) {
        self.put_slice(mac.as_bytes());
    }

    fn put_zeros(&mut self, n: usize) {
        self.put_bytes(0, n);
    }
}

impl<B: BufMut + ?Sized> BufMutExt for B {}

/// Encodes `text` into a fixed-width field of `len` bytes.
///
/// Longer input is truncated, shorter input is right-padded with zeros.
pub fn encode_label(text: &str, len: usize) -> Vec<u8> {
    let mut out = vec![0u8; len];
    let bytes = text.as_bytes();
    let n = bytes.len().min(len);
    out[..n].copy_from_slice(&bytes[..n]);
    out
}

/// Decodes a fixed-width text field, stopping at the first zero byte.
pub fn decode_label(raw: &[u8]) -> String {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    String::from_utf8_lossy(&raw[..end]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn test_little_endian_integers() {
        let mut buf = BytesMut::new();
        buf.put_u16_le(0x1234);
        buf.put_u32_le(0xdead_beef);
        buf.put_u64_le(1);
        buf.put_f32_le(1.5);
        buf.put_i16_le(-2);
        assert_eq!(&buf[..2], &[0x34, 0x12]);

        let mut r = Reader::new(&buf);
        assert_eq!(r.u16().unwrap(), 0x1234);
        assert_eq!(r.u32().unwrap(), 0xdead_beef);
        assert_eq!(r.u64().unwrap(), 1);
        assert_eq!(r.f32().unwrap(), 1.5);
        assert_eq!(r.i16().unwrap(), -2);
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn test_truncated_input() {
        let mut r = Reader::new(&[1, 2, 3]);
        assert_eq!(r.u32().unwrap_err(), Error::truncated(4, 3));
        // A failed read does not consume anything.
        assert_eq!(r.u16().unwrap(), 0x0201);
    }

    #[test]
    fn test_label_padding_and_truncation() {
        assert_eq!(encode_label("abc", 5), vec![b'a', b'b', b'c', 0, 0]);
        assert_eq!(encode_label("abcdef", 4), b"abcd".to_vec());
        assert_eq!(decode_label(b"Kitchen\0\0garbage"), "Kitchen");
        assert_eq!(decode_label(b"full"), "full");

        let mut buf = BytesMut::new();
        buf.put_label("Bedroom", 32);
        assert_eq!(buf.len(), 32);
        assert_eq!(Reader::new(&buf).label(32).unwrap(), "Bedroom");
    }

    #[test]
    fn test_bool_and_uuid_fields() {
        let id = Uuid::from_bytes([
            0x12, 0x34, 0x56, 0x78, 0x9a, 0xbc, 0xde, 0xf0, 0x01, 0x23, 0x45, 0x67, 0x89, 0xab,
            0xcd, 0xef,
        ]);
        let mut buf = BytesMut::new();
        buf.put_bool(true);
        buf.put_u8(7);
        buf.put_bool(false);
        buf.put_uuid(&id);
        assert_eq!(&buf[..3], &[1, 7, 0]);

        let mut r = Reader::new(&buf);
        assert!(r.bool().unwrap());
        assert!(r.bool().unwrap());
        assert!(!r.bool().unwrap());
        assert_eq!(r.uuid().unwrap(), id);
    }
}
