//! Switches with relays.

use crate::device::Device;
use crate::errors::Error;
use crate::messages::relay::{GetRPower, SetRPower, StateRPower};
use crate::types::PowerLevel;

type Result<T> = std::result::Result<T, Error>;

/// A switch. Relays are numbered from zero.
#[derive(Debug, Clone)]
pub struct Relay {
    device: Device,
}

impl From<Device> for Relay {
    fn from(device: Device) -> Self {
        Relay { device }
    }
}

impl AsRef<Device> for Relay {
    fn as_ref(&self) -> &Device {
        &self.device
    }
}

impl Relay {
    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut Device {
        &mut self.device
    }

    pub async fn get_rpower(&self, relay_index: u8) -> Result<StateRPower> {
        self.device.query(&GetRPower { relay_index }).await
    }

    /// Switches one relay. Sent once.
    pub async fn set_rpower(&self, relay_index: u8, on: bool) -> Result<()> {
        let message = SetRPower {
            relay_index,
            level: PowerLevel::from_bool(on),
        };
        self.device.send(&message, false).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::tests::{addr, device, mac};
    use crate::frame::Frame;
    use crate::messages::{Message, Payload};
    use crate::transport::mock::MockTransport;

    #[tokio::test]
    async fn test_get_rpower() {
        let transport = MockTransport::device(mac(), addr(), |request: &Frame| -> Vec<Box<dyn Payload>> {
            let get = GetRPower::from_bytes(&request.payload).unwrap();
            vec![Box::new(StateRPower {
                relay_index: get.relay_index,
                level: if get.relay_index == 2 { 65535 } else { 0 },
            })]
        });
        let relay = Relay::from(device(&transport));
        assert_eq!(relay.get_rpower(2).await.unwrap().level, 65535);
        assert_eq!(relay.get_rpower(0).await.unwrap().level, 0);
    }

    #[tokio::test]
    async fn test_set_rpower() {
        let transport = MockTransport::silent();
        let relay = Relay::from(device(&transport));
        relay.set_rpower(3, true).await.unwrap();

        let frames = transport.sent_frames();
        assert_eq!(frames.len(), 1);
        assert!(!frames[0].addressing.response_required);
        let sent = SetRPower::from_bytes(&frames[0].payload).unwrap();
        assert_eq!((sent.relay_index, sent.level), (3, 65535));
    }
}
