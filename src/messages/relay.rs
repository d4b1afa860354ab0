//! Switch relay messages.

use bytes::{BufMut, BytesMut};

use super::{Message, Result};
use crate::codec::Reader;

/// Asks for the power level of one relay. (816)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GetRPower {
    pub relay_index: u8,
}

impl Message for GetRPower {
    const MESSAGE_TYPE: u16 = 816;

    fn write(&self, buf: &mut BytesMut) {
        buf.put_u8(self.relay_index);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        Ok(GetRPower {
            relay_index: r.u8()?,
        })
    }
}

/// Switches one relay. Replies with [`StateRPower`]. (817)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetRPower {
    pub relay_index: u8,
    pub level: u16,
}

impl Message for SetRPower {
    const MESSAGE_TYPE: u16 = 817;

    fn write(&self, buf: &mut BytesMut) {
        buf.put_u8(self.relay_index);
        buf.put_u16_le(self.level);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        Ok(SetRPower {
            relay_index: r.u8()?,
            level: r.u16()?,
        })
    }
}

/// Power level of one relay. (818)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateRPower {
    pub relay_index: u8,
    pub level: u16,
}

impl Message for StateRPower {
    const MESSAGE_TYPE: u16 = 818;

    fn write(&self, buf: &mut BytesMut) {
        buf.put_u8(self.relay_index);
        buf.put_u16_le(self.level);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        Ok(StateRPower {
            relay_index: r.u8()?,
            level: r.u16()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::Payload;

    #[test]
    fn test_state_rpower_layout() {
        let state = StateRPower {
            relay_index: 2,
            level: 65535,
        };
        assert_eq!(&state.to_bytes()[..], &[2, 0xff, 0xff]);
        assert_eq!(StateRPower::from_bytes(&[2, 0xff, 0xff]).unwrap(), state);
    }
}
