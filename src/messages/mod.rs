//! The message catalog.
//!
//! Every message is a plain struct implementing [`Message`], which supplies its
//! type tag and its byte layout. [`Payload`] is the object-safe view the engine
//! works with: it never needs to know what a payload means, only how to turn it
//! into bytes and which tag goes in the header.
//!
//! Messages are grouped by device capability:
//!
//! - [`discovery`]: service discovery
//! - [`device`]: labels, power, firmware and grouping common to every device
//! - [`light`]: color, waveforms, infrared and HEV cycles
//! - [`multizone`]: strips and beams
//! - [`tile`]: matrix devices
//! - [`relay`]: switches

use std::any::Any;
use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};

use crate::codec::Reader;
use crate::errors::Error;
use crate::types::Hsbk;

pub mod device;
pub mod discovery;
pub mod light;
pub mod multizone;
pub mod relay;
pub mod tile;

pub(crate) type Result<T> = std::result::Result<T, Error>;

/// Width of every text label in the catalog.
pub const LABEL_LEN: usize = 32;

/// A message with a fixed tag and wire layout.
pub trait Message: fmt::Debug + Send + Sync + Sized + 'static {
    const MESSAGE_TYPE: u16;

    /// Whether the message may be sent without a target.
    const BROADCAST: bool = false;

    /// Appends the payload bytes. Messages without fields write nothing.
    fn write(&self, _buf: &mut BytesMut) {}

    /// Decodes the payload. Bytes past the known layout are ignored.
    fn read(r: &mut Reader<'_>) -> Result<Self>;

    fn from_bytes(raw: &[u8]) -> Result<Self> {
        Self::read(&mut Reader::new(raw))
    }
}

/// Upcast helper so a `dyn Payload` can be downcast to its concrete message.
pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Object-safe view of a message, as carried through the engine.
pub trait Payload: AsAny + fmt::Debug + Send + Sync {
    fn message_type(&self) -> u16;

    fn encode(&self, buf: &mut BytesMut);

    /// Broadcast messages are the only ones that may omit a target.
    fn is_broadcast(&self) -> bool {
        false
    }

    fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::new();
        self.encode(&mut buf);
        buf.freeze()
    }
}

impl<M: Message> Payload for M {
    fn message_type(&self) -> u16 {
        M::MESSAGE_TYPE
    }

    fn encode(&self, buf: &mut BytesMut) {
        self.write(buf)
    }

    fn is_broadcast(&self) -> bool {
        M::BROADCAST
    }
}

impl dyn Payload {
    /// Returns the concrete message if this payload is an `M`.
    pub fn downcast_ref<M: Payload + 'static>(&self) -> Option<&M> {
        self.as_any().downcast_ref::<M>()
    }
}

/// Declares a message with no fields.
macro_rules! empty_message {
    ($(#[$meta:meta])* $name:ident = $tag:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        pub struct $name;

        impl $crate::messages::Message for $name {
            const MESSAGE_TYPE: u16 = $tag;

            fn read(_: &mut $crate::codec::Reader<'_>) -> $crate::messages::Result<Self> {
                Ok($name)
            }
        }
    };
}

pub(crate) use empty_message;

/// Reads exactly `count` colors.
pub(crate) fn read_colors(r: &mut Reader<'_>, count: usize) -> Result<Vec<Hsbk>> {
    (0..count).map(|_| Hsbk::read(r)).collect()
}

/// Writes `colors` padded with zeroed colors, or truncated, to exactly `count`.
pub(crate) fn write_colors<B: BufMut + ?Sized>(buf: &mut B, colors: &[Hsbk], count: usize) {
    colors
        .iter()
        .copied()
        .chain(std::iter::repeat(Hsbk::default()))
        .take(count)
        .for_each(|color| color.write(buf));
}

/// Maps an out-of-range enum byte to a protocol error.
pub(crate) fn invalid_value(field: &str, value: impl fmt::Display) -> Error {
    Error::Protocol(format!("invalid {field} value {value}"))
}
