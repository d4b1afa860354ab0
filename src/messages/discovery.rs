//! Service discovery.

use bytes::{BufMut, BytesMut};

use super::{Message, Result, invalid_value};
use crate::codec::Reader;
use crate::types::Service;

/// Asks every device on the network which services it offers. (2)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GetService;

impl Message for GetService {
    const MESSAGE_TYPE: u16 = 2;
    const BROADCAST: bool = true;

    fn read(_: &mut Reader<'_>) -> Result<Self> {
        Ok(GetService)
    }
}

/// One service a device listens on. A device replies once per service. (3)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateService {
    pub service: Service,
    pub port: u32,
}

impl Message for StateService {
    const MESSAGE_TYPE: u16 = 3;

    fn write(&self, buf: &mut BytesMut) {
        buf.put_u8(self.service.id());
        buf.put_u32_le(self.port);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        let raw = r.u8()?;
        let service = Service::create(raw).ok_or_else(|| invalid_value("service", raw))?;
        Ok(StateService {
            service,
            port: r.u32()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::Payload;

    #[test]
    fn test_state_service_layout() {
        let state = StateService {
            service: Service::Udp,
            port: 56700,
        };
        let raw = state.to_bytes();
        assert_eq!(&raw[..], &[1, 0x7c, 0xdd, 0, 0]);
        assert_eq!(StateService::from_bytes(&raw).unwrap(), state);
    }

    #[test]
    fn test_unknown_service_rejected() {
        assert!(StateService::from_bytes(&[9, 0, 0, 0, 0]).is_err());
    }
}
