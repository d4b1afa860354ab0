//! Tag to decoder lookup for inbound payloads.
//!
//! The engine never matches on message types itself. It hands the tag and the
//! payload bytes to a [`PayloadRegistry`], which either produces a decoded
//! message or reports that the tag is unknown.

use std::collections::HashMap;

use log::trace;

use crate::errors::Error;
use crate::messages::{Message, Payload, device, discovery, light, multizone, relay, tile};

/// Builds a payload from the bytes after the frame header.
pub type Factory = fn(&[u8]) -> Result<Box<dyn Payload>, Error>;

/// Map from message type tag to decoder.
#[derive(Debug, Clone, Default)]
pub struct PayloadRegistry {
    factories: HashMap<u16, Factory>,
}

fn decode_boxed<M: Message>(raw: &[u8]) -> Result<Box<dyn Payload>, Error> {
    Ok(Box::new(M::from_bytes(raw)?))
}

impl PayloadRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every reply message in the catalog.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        registry.register_message::<discovery::StateService>();

        registry.register_message::<device::StateHostFirmware>();
        registry.register_message::<device::StateWifiInfo>();
        registry.register_message::<device::StateWifiFirmware>();
        registry.register_message::<device::StatePower>();
        registry.register_message::<device::StateLabel>();
        registry.register_message::<device::StateVersion>();
        registry.register_message::<device::StateInfo>();
        registry.register_message::<device::Acknowledgement>();
        registry.register_message::<device::StateLocation>();
        registry.register_message::<device::StateGroup>();
        registry.register_message::<device::EchoResponse>();
        registry.register_message::<device::StateUnhandled>();

        registry.register_message::<light::LightState>();
        registry.register_message::<light::StateLightPower>();
        registry.register_message::<light::StateInfrared>();
        registry.register_message::<light::StateHevCycle>();
        registry.register_message::<light::StateHevCycleConfiguration>();
        registry.register_message::<light::StateLastHevCycleResult>();

        registry.register_message::<multizone::StateZone>();
        registry.register_message::<multizone::StateMultiZone>();
        registry.register_message::<multizone::StateMultiZoneEffect>();
        registry.register_message::<multizone::StateExtendedColorZones>();

        registry.register_message::<relay::StateRPower>();

        registry.register_message::<tile::StateDeviceChain>();
        registry.register_message::<tile::State64>();
        registry.register_message::<tile::StateTileEffect>();

        registry
    }

    /// Registers `factory` for `message_type`, replacing any earlier entry.
    pub fn register(&mut self, message_type: u16, factory: Factory) {
        self.factories.insert(message_type, factory);
    }

    /// Registers a catalog message under its own tag.
    pub fn register_message<M: Message>(&mut self) {
        self.register(M::MESSAGE_TYPE, decode_boxed::<M>);
    }

    pub fn resolve(&self, message_type: u16) -> Option<Factory> {
        self.factories.get(&message_type).copied()
    }

    pub fn contains(&self, message_type: u16) -> bool {
        self.factories.contains_key(&message_type)
    }

    /// Decodes a payload, or `None` when the tag is unknown or the bytes do
    /// not fit the layout.
    pub fn decode(&self, message_type: u16, raw: &[u8]) -> Option<Box<dyn Payload>> {
        let Some(factory) = self.resolve(message_type) else {
            trace!("No decoder for message type {message_type}");
            return None;
        };
        match factory(raw) {
            Ok(payload) => Some(payload),
            Err(e) => {
                trace!("Dropping message type {message_type}: {e}");
                None
            }
        }
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}
