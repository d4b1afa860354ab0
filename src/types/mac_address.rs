//! Hardware address of a device.

use std::fmt;
use std::str::FromStr;

use serde_with::{DeserializeFromStr, SerializeDisplay};

use crate::errors::Error;

/// A 6-byte device hardware address.
///
/// Displays as lowercase colon-separated hex (`d0:73:d5:43:47:86`) and parses
/// from any punctuation style as long as 12 hex digits remain.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, SerializeDisplay, DeserializeFromStr,
)]
pub struct MacAddress([u8; 6]);

impl MacAddress {
    /// The all-zero address used by tagged (broadcast) frames.
    pub const ZERO: MacAddress = MacAddress([0; 6]);

    pub const fn new(bytes: [u8; 6]) -> Self {
        MacAddress(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0; 6]
    }
}

impl From<[u8; 6]> for MacAddress {
    fn from(bytes: [u8; 6]) -> Self {
        MacAddress(bytes)
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

impl FromStr for MacAddress {
    type Err = Error;

    /// Parse from twelve hex digits. Punctuation and whitespace between them
    /// are ignored, so `d0:73:d5:43:47:86`, `D0-73-D5-43-47-86`,
    /// `d073.d543.4786` and `d0_73_d5_43_47_86` are all accepted.
    fn from_str(s: &str) -> Result<Self, Error> {
        let digits: Vec<u8> = s
            .bytes()
            .filter(|b| !b.is_ascii_punctuation() && !b.is_ascii_whitespace())
            .collect();
        if digits.len() != 12 {
            return Err(Error::InvalidMacAddress(s.to_string()));
        }

        let mut bytes = [0u8; 6];
        for (slot, pair) in bytes.iter_mut().zip(digits.chunks(2)) {
            let hi = hex_value(pair[0]).ok_or_else(|| Error::InvalidMacAddress(s.to_string()))?;
            let lo = hex_value(pair[1]).ok_or_else(|| Error::InvalidMacAddress(s.to_string()))?;
            *slot = (hi << 4) | lo;
        }
        Ok(MacAddress(bytes))
    }
}

fn hex_value(digit: u8) -> Option<u8> {
    (digit as char).to_digit(16).map(|v| v as u8)
}
