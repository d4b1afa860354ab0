//! Product classification.

use serde::{Deserialize, Serialize};

/// Broad capability class of a device, derived from its product id.
///
/// See the LIFX product registry for the ids behind each class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceKind {
    /// A single-zone bulb.
    #[default]
    Light,
    /// A strip or beam with linear zones.
    MultiZone,
    /// A switch with relays and no light output.
    Relay,
    /// A tile, candle or other device with matrix zones.
    Matrix,
}

const RELAY_PRODUCTS: &[u32] = &[70, 71, 89, 115, 116];

const MULTIZONE_PRODUCTS: &[u32] = &[
    31, 32, 38, 118, 119, 120, 141, 142, 143, 144, 161, 162, 203, 204, 205, 206, 213, 214,
];

const MATRIX_PRODUCTS: &[u32] = &[
    55, 57, 68, 137, 138, 171, 173, 174, 176, 177, 185, 186, 201, 202, 215, 216, 217, 218,
];

impl DeviceKind {
    pub fn from_product(product: u32) -> Self {
        if RELAY_PRODUCTS.contains(&product) {
            DeviceKind::Relay
        } else if MULTIZONE_PRODUCTS.contains(&product) {
            DeviceKind::MultiZone
        } else if MATRIX_PRODUCTS.contains(&product) {
            DeviceKind::Matrix
        } else {
            DeviceKind::Light
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_product() {
        assert_eq!(DeviceKind::from_product(70), DeviceKind::Relay);
        assert_eq!(DeviceKind::from_product(38), DeviceKind::MultiZone);
        assert_eq!(DeviceKind::from_product(55), DeviceKind::Matrix);
        assert_eq!(DeviceKind::from_product(27), DeviceKind::Light);
        assert_eq!(DeviceKind::from_product(0), DeviceKind::Light);
    }
}
