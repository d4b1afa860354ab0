//! Strips and beams with linear zones.

use std::time::Duration;

use log::warn;

use crate::device::{Device, effect_instance_id, millis, nanos};
use crate::errors::Error;
use crate::light::Light;
use crate::messages::multizone::{
    EXTENDED_ZONE_COLORS, GetColorZones, GetExtendedColorZones, GetMultiZoneEffect,
    MultiZoneEffect, SetColorZones, SetExtendedColorZones, SetMultiZoneEffect, StateExtendedColorZones,
    StateMultiZone, StateMultiZoneEffect, StateZone,
};
use crate::types::{ApplicationRequest, Direction, ExtendedApplicationRequest, Hsbk, MultiZoneEffectType};

type Result<T> = std::result::Result<T, Error>;

/// One reply to [`MultiZone::get_color_zones`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneColors {
    Single(StateZone),
    Batch(StateMultiZone),
}

impl ZoneColors {
    /// Index of the first zone covered.
    pub fn zone_index(&self) -> u8 {
        match self {
            ZoneColors::Single(state) => state.zone_index,
            ZoneColors::Batch(state) => state.zone_index,
        }
    }

    pub fn colors(&self) -> &[Hsbk] {
        match self {
            ZoneColors::Single(state) => std::slice::from_ref(&state.color),
            ZoneColors::Batch(state) => &state.colors,
        }
    }
}

/// A light with a row of independently colored zones.
#[derive(Debug, Clone)]
pub struct MultiZone {
    light: Light,
    zones_count: u16,
    saved_state: Option<StateExtendedColorZones>,
}

impl From<Light> for MultiZone {
    fn from(light: Light) -> Self {
        MultiZone {
            light,
            zones_count: 0,
            saved_state: None,
        }
    }
}

impl From<Device> for MultiZone {
    fn from(device: Device) -> Self {
        MultiZone::from(Light::new(device))
    }
}

impl AsRef<Device> for MultiZone {
    fn as_ref(&self) -> &Device {
        self.light.device()
    }
}

impl MultiZone {
    /// Wraps `device` and learns its zone count.
    ///
    /// A device that does not answer still yields a handle, with a zone
    /// count of zero until [`fetch_zones_count`](Self::fetch_zones_count)
    /// succeeds.
    pub async fn connect(device: Device) -> Self {
        let mut multizone = MultiZone::from(device);
        if let Err(e) = multizone.fetch_zones_count().await {
            warn!("Could not read zone count of {}: {e}", multizone.device().mac());
        }
        multizone
    }

    pub fn light(&self) -> &Light {
        &self.light
    }

    pub fn light_mut(&mut self) -> &mut Light {
        &mut self.light
    }

    pub fn device(&self) -> &Device {
        self.light.device()
    }

    /// Zone count from the last successful fetch.
    pub fn zones_count(&self) -> u16 {
        self.zones_count
    }

    pub async fn fetch_zones_count(&mut self) -> Result<u16> {
        self.zones_count = self.get_extended_color_zones().await?.zones_count;
        Ok(self.zones_count)
    }

    /// Colors of zones `start..=end`, as every reply that arrives before the
    /// timeout. Older firmware answers with one message per zone or per
    /// batch of eight.
    pub async fn get_color_zones(&self, start: u8, end: u8) -> Result<Vec<ZoneColors>> {
        let request = GetColorZones {
            start_index: start,
            end_index: end,
        };
        let options = self.device().client().default_options().unbounded();
        let replies = self.device().request(&request, &options).await?;
        Ok(replies
            .iter()
            .filter_map(|reply| {
                if let Some(zone) = reply.message_as::<StateZone>() {
                    Some(ZoneColors::Single(zone.clone()))
                } else {
                    reply
                        .message_as::<StateMultiZone>()
                        .map(|batch| ZoneColors::Batch(batch.clone()))
                }
            })
            .collect())
    }

    /// Paints zones `start..=end` with one color.
    pub async fn set_color_zones(
        &self,
        start: u8,
        end: u8,
        color: Hsbk,
        duration: Duration,
        wait: bool,
    ) -> Result<()> {
        let message = SetColorZones {
            start_index: start,
            end_index: end,
            color,
            duration: millis(duration),
            apply: ApplicationRequest::Apply,
        };
        self.device().send(&message, wait).await
    }

    pub async fn get_extended_color_zones(&self) -> Result<StateExtendedColorZones> {
        self.device().query(&GetExtendedColorZones).await
    }

    /// Paints `colors` starting at `zone_index`. At most 82 colors are sent.
    pub async fn set_extended_color_zones(
        &self,
        zone_index: u16,
        colors: &[Hsbk],
        duration: Duration,
        wait: bool,
    ) -> Result<()> {
        let message = SetExtendedColorZones {
            duration: millis(duration),
            apply: ExtendedApplicationRequest::Apply,
            zone_index,
            colors: colors.iter().copied().take(EXTENDED_ZONE_COLORS).collect(),
        };
        self.device().send(&message, wait).await
    }

    pub async fn get_multizone_effect(&self) -> Result<StateMultiZoneEffect> {
        self.device().query(&GetMultiZoneEffect).await
    }

    /// Starts the firmware `Move` effect. `speed` is the time per cycle; a
    /// zero `duration` runs until stopped.
    pub async fn run_move_effect(
        &self,
        speed: Duration,
        duration: Duration,
        direction: Direction,
    ) -> Result<StateMultiZoneEffect> {
        let message = SetMultiZoneEffect {
            effect: MultiZoneEffect {
                instance_id: effect_instance_id(),
                effect_type: MultiZoneEffectType::Move,
                speed: millis(speed),
                duration: nanos(duration),
                parameters: MultiZoneEffect::move_parameters(direction),
            },
        };
        self.device().query(&message).await
    }

    pub async fn stop_effect(&self, wait: bool) -> Result<()> {
        let message = SetMultiZoneEffect {
            effect: MultiZoneEffect {
                instance_id: effect_instance_id(),
                effect_type: MultiZoneEffectType::Off,
                ..Default::default()
            },
        };
        self.device().send(&message, wait).await
    }

    pub fn saved_state(&self) -> Option<&StateExtendedColorZones> {
        self.saved_state.as_ref()
    }

    /// Remembers every zone color.
    pub async fn save_state(&mut self) -> Result<()> {
        self.saved_state = Some(self.get_extended_color_zones().await?);
        Ok(())
    }

    /// Stops any firmware effect and repaints the saved zones. Returns false
    /// when nothing was saved.
    pub async fn restore_state(&self, duration: Duration) -> Result<bool> {
        let Some(saved) = &self.saved_state else {
            return Ok(false);
        };
        self.stop_effect(true).await?;
        self.set_extended_color_zones(saved.zone_index, &saved.colors, duration, true)
            .await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::device::tests::{addr, device, mac};
    use crate::frame::Frame;
    use crate::messages::{Message, Payload};
    use crate::transport::mock::MockTransport;

    fn zones(count: u16) -> Vec<Hsbk> {
        (0..count).map(|i| Hsbk::new(i * 1000, 65535, 65535, 3500)).collect()
    }

    /// A 16 zone strip that follows extended zone writes and effect changes.
    fn strip() -> MockTransport {
        let colors = Arc::new(Mutex::new(zones(16)));
        let effect = Arc::new(Mutex::new(MultiZoneEffect::default()));
        MockTransport::device(mac(), addr(), move |request: &Frame| -> Vec<Box<dyn Payload>> {
            let mut colors = colors.lock().unwrap();
            let mut effect = effect.lock().unwrap();
            match request.message_type() {
                502 => vec![
                    Box::new(StateMultiZone {
                        zones_count: 16,
                        zone_index: 0,
                        colors: colors[..8].to_vec(),
                    }),
                    Box::new(StateMultiZone {
                        zones_count: 16,
                        zone_index: 8,
                        colors: colors[8..].to_vec(),
                    }),
                ],
                507 => vec![Box::new(StateMultiZoneEffect { effect: *effect })],
                508 => {
                    *effect = SetMultiZoneEffect::from_bytes(&request.payload).unwrap().effect;
                    vec![Box::new(StateMultiZoneEffect { effect: *effect })]
                }
                510 => {
                    let set = SetExtendedColorZones::from_bytes(&request.payload).unwrap();
                    let start = set.zone_index as usize;
                    for (i, color) in set.colors.iter().enumerate() {
                        if let Some(zone) = colors.get_mut(start + i) {
                            *zone = *color;
                        }
                    }
                    Vec::new()
                }
                511 => vec![Box::new(StateExtendedColorZones {
                    zones_count: 16,
                    zone_index: 0,
                    colors: colors.clone(),
                })],
                _ => Vec::new(),
            }
        })
    }

    #[tokio::test]
    async fn test_connect_reads_zone_count() {
        let transport = strip();
        let multizone = MultiZone::connect(device(&transport)).await;
        assert_eq!(multizone.zones_count(), 16);
    }

    #[tokio::test]
    async fn test_connect_tolerates_silence() {
        let transport = MockTransport::silent();
        let multizone = MultiZone::connect(device(&transport)).await;
        assert_eq!(multizone.zones_count(), 0);
    }

    #[tokio::test]
    async fn test_color_zones_collects_batches() {
        let transport = strip();
        let multizone = MultiZone::from(device(&transport));
        let replies = multizone.get_color_zones(0, 255).await.unwrap();
        assert_eq!(replies.len(), 2);
        assert_eq!(replies[1].zone_index(), 8);
        assert_eq!(replies[1].colors()[0], zones(16)[8]);
    }

    #[tokio::test]
    async fn test_move_effect() {
        let transport = strip();
        let multizone = MultiZone::from(device(&transport));
        let state = multizone
            .run_move_effect(Duration::from_secs(1), Duration::ZERO, Direction::Left)
            .await
            .unwrap();
        assert_eq!(state.effect.effect_type, MultiZoneEffectType::Move);
        assert_eq!(state.effect.speed, 1000);
        assert_eq!(state.effect.direction(), Some(Direction::Left));

        multizone.stop_effect(true).await.unwrap();
        let state = multizone.get_multizone_effect().await.unwrap();
        assert_eq!(state.effect.effect_type, MultiZoneEffectType::Off);
    }

    #[tokio::test]
    async fn test_save_and_restore() {
        let transport = strip();
        let mut multizone = MultiZone::from(device(&transport));
        multizone.save_state().await.unwrap();

        let white = vec![Hsbk::new(0, 0, 65535, 6500); 16];
        multizone
            .set_extended_color_zones(0, &white, Duration::ZERO, false)
            .await
            .unwrap();
        assert_eq!(multizone.get_extended_color_zones().await.unwrap().colors, white);

        assert!(multizone.restore_state(Duration::ZERO).await.unwrap());
        assert_eq!(
            multizone.get_extended_color_zones().await.unwrap().colors,
            zones(16)
        );
    }

    #[tokio::test]
    async fn test_set_color_zones_applies() {
        let transport = MockTransport::silent();
        let multizone = MultiZone::from(device(&transport));
        multizone
            .set_color_zones(2, 5, Hsbk::from_rgb(0, 255, 0), Duration::ZERO, false)
            .await
            .unwrap();
        let frame = &transport.sent_frames()[0];
        let sent = SetColorZones::from_bytes(&frame.payload).unwrap();
        assert_eq!((sent.start_index, sent.end_index), (2, 5));
        assert_eq!(sent.apply, ApplicationRequest::Apply);
    }
}
