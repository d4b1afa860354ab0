//! Frame layout: the 36-byte header that precedes every payload.
//!
//! A frame is three fixed headers followed by the payload:
//!
//! | Header     | Bytes | Contents                                         |
//! |------------|-------|--------------------------------------------------|
//! | transport  | 8     | size, protocol marker, tagged/addressable, source |
//! | addressing | 16    | target, ack/response flags, sequence             |
//! | type       | 12    | message type tag                                 |
//!
//! Reserved bytes are written as zero and ignored when reading.

use bytes::{BufMut, Bytes, BytesMut};

use crate::codec::Reader;
use crate::errors::Error;
use crate::messages::Payload;
use crate::types::MacAddress;

type Result<T> = std::result::Result<T, Error>;

/// Length of the three headers together.
pub const HEADER_LEN: usize = 36;

/// Value added to the payload length to form the `size` field.
pub const FRAME_SIZE_BASE: u16 = 32;

const PROTOCOL_MARKER: u8 = 0x04;
const ADDRESSABLE_BIT: u8 = 0x10;
const TAGGED_BIT: u8 = 0x20;

const RESPONSE_REQUIRED_BIT: u8 = 0x01;
const ACK_REQUIRED_BIT: u8 = 0x02;

/// First 8 bytes of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportHeader {
    pub size: u16,
    /// Addressed to every device on the network.
    pub tagged: bool,
    pub addressable: bool,
    /// Chosen by the client, echoed back in replies.
    pub source: u32,
}

impl TransportHeader {
    pub const LEN: usize = 8;

    pub fn encode(&self) -> [u8; Self::LEN] {
        let mut out = [0u8; Self::LEN];
        out[..2].copy_from_slice(&self.size.to_le_bytes());
        let mut flags = PROTOCOL_MARKER;
        if self.addressable {
            flags |= ADDRESSABLE_BIT;
        }
        if self.tagged {
            flags |= TAGGED_BIT;
        }
        out[3] = flags;
        out[4..].copy_from_slice(&self.source.to_le_bytes());
        out
    }

    pub fn decode(raw: &[u8]) -> Result<Self> {
        let mut r = Reader::new(raw);
        let size = r.u16()?;
        r.skip(1)?;
        let flags = r.u8()?;
        let source = r.u32()?;
        Ok(TransportHeader {
            size,
            tagged: flags & TAGGED_BIT != 0,
            addressable: flags & ADDRESSABLE_BIT != 0,
            source,
        })
    }
}

/// Bytes 8..24 of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressingHeader {
    /// All zero when the frame is tagged.
    pub target: MacAddress,
    pub response_required: bool,
    pub ack_required: bool,
    pub sequence: u8,
}

impl AddressingHeader {
    pub const LEN: usize = 16;

    pub fn encode(&self) -> [u8; Self::LEN] {
        let mut out = [0u8; Self::LEN];
        out[..6].copy_from_slice(self.target.as_bytes());
        let mut flags = 0;
        if self.response_required {
            flags |= RESPONSE_REQUIRED_BIT;
        }
        if self.ack_required {
            flags |= ACK_REQUIRED_BIT;
        }
        out[14] = flags;
        out[15] = self.sequence;
        out
    }

    pub fn decode(raw: &[u8]) -> Result<Self> {
        let mut r = Reader::new(raw);
        let target = r.mac()?;
        r.skip(8)?;
        let flags = r.u8()?;
        let sequence = r.u8()?;
        Ok(AddressingHeader {
            target,
            response_required: flags & RESPONSE_REQUIRED_BIT != 0,
            ack_required: flags & ACK_REQUIRED_BIT != 0,
            sequence,
        })
    }
}

/// Bytes 24..36 of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeHeader {
    pub message_type: u16,
}

impl TypeHeader {
    pub const LEN: usize = 12;

    pub fn encode(&self) -> [u8; Self::LEN] {
        let mut out = [0u8; Self::LEN];
        out[8..10].copy_from_slice(&self.message_type.to_le_bytes());
        out
    }

    pub fn decode(raw: &[u8]) -> Result<Self> {
        let mut r = Reader::new(raw);
        r.skip(8)?;
        Ok(TypeHeader {
            message_type: r.u16()?,
        })
    }
}

/// A complete frame as sent or received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub transport: TransportHeader,
    pub addressing: AddressingHeader,
    pub type_header: TypeHeader,
    pub payload: Bytes,
}

impl Frame {
    /// Builds an outbound frame around `payload`.
    ///
    /// Without a target the frame is tagged and addressed to every device.
    pub fn new(
        payload: &dyn Payload,
        source: u32,
        target: Option<MacAddress>,
        response_required: bool,
        ack_required: bool,
        sequence: u8,
    ) -> Self {
        let mut body = BytesMut::new();
        payload.encode(&mut body);
        let body = body.freeze();

        Frame {
            transport: TransportHeader {
                size: FRAME_SIZE_BASE.wrapping_add(body.len() as u16),
                tagged: target.is_none(),
                addressable: true,
                source,
            },
            addressing: AddressingHeader {
                target: target.unwrap_or(MacAddress::ZERO),
                response_required,
                ack_required,
                sequence,
            },
            type_header: TypeHeader {
                message_type: payload.message_type(),
            },
            payload: body,
        }
    }

    pub fn message_type(&self) -> u16 {
        self.type_header.message_type
    }

    pub fn sequence(&self) -> u8 {
        self.addressing.sequence
    }

    pub fn target(&self) -> MacAddress {
        self.addressing.target
    }

    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(HEADER_LEN + self.payload.len());
        buf.put_slice(&self.transport.encode());
        buf.put_slice(&self.addressing.encode());
        buf.put_slice(&self.type_header.encode());
        buf.put_slice(&self.payload);
        buf.freeze()
    }

    /// Parses a received datagram.
    ///
    /// Everything after the header is payload; the `size` field is not used
    /// to delimit it.
    pub fn parse(datagram: &[u8]) -> Result<Self> {
        if datagram.len() < HEADER_LEN {
            return Err(Error::truncated(HEADER_LEN, datagram.len()));
        }
        let (transport, rest) = datagram.split_at(TransportHeader::LEN);
        let (addressing, rest) = rest.split_at(AddressingHeader::LEN);
        let (type_header, payload) = rest.split_at(TypeHeader::LEN);

        Ok(Frame {
            transport: TransportHeader::decode(transport)?,
            addressing: AddressingHeader::decode(addressing)?,
            type_header: TypeHeader::decode(type_header)?,
            payload: Bytes::copy_from_slice(payload),
        })
    }
}
