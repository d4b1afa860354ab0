//! Matrix devices: tiles, candles and other lights with a grid of zones.

use std::time::Duration;

use crate::device::{Device, effect_instance_id, millis, nanos};
use crate::errors::Error;
use crate::light::Light;
use crate::messages::tile::{
    EFFECT_PARAMETERS_LEN, Get64, GetDeviceChain, GetTileEffect, PALETTE_LEN, Set64,
    SetTileEffect, SetUserPosition, State64, StateDeviceChain, StateTileEffect, TileEffect,
};
use crate::types::{Hsbk, TileEffectType};

type Result<T> = std::result::Result<T, Error>;

/// A light made of one or more chained tiles.
#[derive(Debug, Clone)]
pub struct Tile {
    light: Light,
}

impl From<Light> for Tile {
    fn from(light: Light) -> Self {
        Tile { light }
    }
}

impl From<Device> for Tile {
    fn from(device: Device) -> Self {
        Tile::from(Light::new(device))
    }
}

impl AsRef<Device> for Tile {
    fn as_ref(&self) -> &Device {
        self.light.device()
    }
}

impl Tile {
    pub fn light(&self) -> &Light {
        &self.light
    }

    pub fn light_mut(&mut self) -> &mut Light {
        &mut self.light
    }

    pub fn device(&self) -> &Device {
        self.light.device()
    }

    pub async fn get_device_chain(&self) -> Result<StateDeviceChain> {
        self.device().query(&GetDeviceChain).await
    }

    /// Zone colors of the tiles `request` names, one reply per tile.
    ///
    /// Tiles that stay silent are missing from the result.
    pub async fn get_64(&self, request: &Get64) -> Result<Vec<State64>> {
        let options = self
            .device()
            .client()
            .default_options()
            .max_replies(usize::from(request.length.max(1)));
        let replies = self.device().request(request, &options).await?;
        Ok(replies
            .iter()
            .filter_map(|reply| reply.message_as::<State64>().cloned())
            .collect())
    }

    /// Paints zones. Sent once; the device does not reply.
    pub async fn set_64(&self, request: &Set64) -> Result<()> {
        self.device().send(request, false).await
    }

    /// Records where a tile sits in the chain. Sent once.
    pub async fn set_user_position(&self, tile_index: u8, user_x: f32, user_y: f32) -> Result<()> {
        let message = SetUserPosition {
            tile_index,
            user_x,
            user_y,
        };
        self.device().send(&message, false).await
    }

    pub async fn get_tile_effect(&self) -> Result<StateTileEffect> {
        self.device().query(&GetTileEffect).await
    }

    /// Starts a firmware effect. At most 16 palette colors are sent.
    pub async fn set_tile_effect(
        &self,
        effect_type: TileEffectType,
        speed: Duration,
        duration: Duration,
        palette: &[Hsbk],
    ) -> Result<StateTileEffect> {
        let message = SetTileEffect {
            effect: TileEffect {
                instance_id: effect_instance_id(),
                effect_type,
                speed: millis(speed),
                duration: nanos(duration),
                parameters: [0; EFFECT_PARAMETERS_LEN],
                palette: palette.iter().copied().take(PALETTE_LEN).collect(),
            },
        };
        self.device().query(&message).await
    }

    pub async fn run_flame(&self, speed: Duration, duration: Duration) -> Result<StateTileEffect> {
        self.set_tile_effect(TileEffectType::Flame, speed, duration, &[])
            .await
    }

    /// Morphs between the `palette` colors.
    pub async fn run_morph(
        &self,
        speed: Duration,
        duration: Duration,
        palette: &[Hsbk],
    ) -> Result<StateTileEffect> {
        self.set_tile_effect(TileEffectType::Morph, speed, duration, palette)
            .await
    }

    pub async fn stop_effect(&self, wait: bool) -> Result<()> {
        let message = SetTileEffect {
            effect: TileEffect {
                instance_id: effect_instance_id(),
                effect_type: TileEffectType::Off,
                ..Default::default()
            },
        };
        self.device().send(&message, wait).await
    }
}
