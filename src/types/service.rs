//! Transport services advertised by a device.

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

/// Service reported in `StateService` discovery replies.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, EnumIter, PartialEq, Eq)]
pub enum Service {
    Udp = 1,
    Reserved1 = 2,
    Reserved2 = 3,
    Reserved3 = 4,
    Reserved4 = 5,
}

impl Service {
    pub fn create(value: u8) -> Option<Self> {
        Service::iter().find(|service| *service as u8 == value)
    }

    pub fn id(&self) -> u8 {
        *self as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert_eq!(Service::create(1), Some(Service::Udp));
        assert_eq!(Service::create(5), Some(Service::Reserved4));
        assert_eq!(Service::create(0), None);
        assert_eq!(Service::Udp.id(), 1);
    }
}
