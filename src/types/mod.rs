//! Value types carried by protocol messages.

mod application_request;
mod device_kind;
mod effect;
mod hev;
mod hsbk;
mod mac_address;
mod power;
mod service;
mod waveform;

pub use application_request::{ApplicationRequest, ExtendedApplicationRequest};
pub use device_kind::DeviceKind;
pub use effect::{Direction, MultiZoneEffectType, TileEffectType};
pub use hev::LastHevCycleResult;
pub use hsbk::Hsbk;
pub use mac_address::MacAddress;
pub use power::PowerLevel;
pub use service::Service;
pub use waveform::Waveform;
