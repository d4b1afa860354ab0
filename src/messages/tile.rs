//! Matrix device messages.
//!
//! A matrix device is a chain of up to 16 tiles, each an 8x8 grid of zones.
//! `x`, `y` and `width` select a rectangle inside one tile's grid.

use bytes::{BufMut, BytesMut};

use super::{Message, Result, empty_message, invalid_value, read_colors, write_colors};
use crate::codec::{BufMutExt, Reader};
use crate::types::{Hsbk, TileEffectType};

/// Tiles described by one [`StateDeviceChain`].
pub const CHAIN_LEN: usize = 16;

/// Zones carried by one 64-zone message.
pub const TILE_COLORS: usize = 64;

/// Colors in an effect palette.
pub const PALETTE_LEN: usize = 16;

/// Length of the effect parameter block.
pub const EFFECT_PARAMETERS_LEN: usize = 32;

/// One tile in a chain.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TileInfo {
    pub accel_meas_x: i16,
    pub accel_meas_y: i16,
    pub accel_meas_z: i16,
    pub user_x: f32,
    pub user_y: f32,
    pub width: u8,
    pub height: u8,
    pub device_version_vendor: u32,
    pub device_version_product: u32,
    pub firmware_build: u64,
    pub firmware_version_minor: u16,
    pub firmware_version_major: u16,
}

impl TileInfo {
    pub const WIRE_LEN: usize = 55;

    fn write(&self, buf: &mut BytesMut) {
        buf.put_i16_le(self.accel_meas_x);
        buf.put_i16_le(self.accel_meas_y);
        buf.put_i16_le(self.accel_meas_z);
        buf.put_zeros(2);
        buf.put_f32_le(self.user_x);
        buf.put_f32_le(self.user_y);
        buf.put_u8(self.width);
        buf.put_u8(self.height);
        buf.put_zeros(1);
        buf.put_u32_le(self.device_version_vendor);
        buf.put_u32_le(self.device_version_product);
        buf.put_zeros(4);
        buf.put_u64_le(self.firmware_build);
        buf.put_zeros(8);
        buf.put_u16_le(self.firmware_version_minor);
        buf.put_u16_le(self.firmware_version_major);
        buf.put_zeros(4);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        let accel_meas_x = r.i16()?;
        let accel_meas_y = r.i16()?;
        let accel_meas_z = r.i16()?;
        r.skip(2)?;
        let user_x = r.f32()?;
        let user_y = r.f32()?;
        let width = r.u8()?;
        let height = r.u8()?;
        r.skip(1)?;
        let device_version_vendor = r.u32()?;
        let device_version_product = r.u32()?;
        r.skip(4)?;
        let firmware_build = r.u64()?;
        r.skip(8)?;
        let firmware_version_minor = r.u16()?;
        let firmware_version_major = r.u16()?;
        r.skip(4)?;
        Ok(TileInfo {
            accel_meas_x,
            accel_meas_y,
            accel_meas_z,
            user_x,
            user_y,
            width,
            height,
            device_version_vendor,
            device_version_product,
            firmware_build,
            firmware_version_minor,
            firmware_version_major,
        })
    }
}

empty_message!(
    /// Asks for the tiles in the chain. (701)
    GetDeviceChain = 701
);

/// The tiles in the chain. (702)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateDeviceChain {
    pub start_index: u8,
    /// Only the first `tile_devices_count` entries on the wire are kept.
    pub tile_devices: Vec<TileInfo>,
}

impl Message for StateDeviceChain {
    const MESSAGE_TYPE: u16 = 702;

    fn write(&self, buf: &mut BytesMut) {
        buf.put_u8(self.start_index);
        self.tile_devices
            .iter()
            .copied()
            .chain(std::iter::repeat(TileInfo::default()))
            .take(CHAIN_LEN)
            .for_each(|tile| tile.write(buf));
        buf.put_u8(self.tile_devices.len().min(CHAIN_LEN) as u8);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        let start_index = r.u8()?;
        let mut tile_devices = (0..CHAIN_LEN)
            .map(|_| TileInfo::read(r))
            .collect::<Result<Vec<_>>>()?;
        let count = r.u8()? as usize;
        tile_devices.truncate(count);
        Ok(StateDeviceChain {
            start_index,
            tile_devices,
        })
    }
}

/// Records where a tile sits relative to the others. There is no reply. (703)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SetUserPosition {
    pub tile_index: u8,
    pub user_x: f32,
    pub user_y: f32,
}

impl Message for SetUserPosition {
    const MESSAGE_TYPE: u16 = 703;

    fn write(&self, buf: &mut BytesMut) {
        buf.put_u8(self.tile_index);
        buf.put_zeros(2);
        buf.put_f32_le(self.user_x);
        buf.put_f32_le(self.user_y);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        let tile_index = r.u8()?;
        r.skip(2)?;
        Ok(SetUserPosition {
            tile_index,
            user_x: r.f32()?,
            user_y: r.f32()?,
        })
    }
}

/// Asks for the zone colors of `length` tiles starting at `tile_index`.
/// Replies with one [`State64`] per tile. (707)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Get64 {
    pub tile_index: u8,
    pub length: u8,
    pub x: u8,
    pub y: u8,
    pub width: u8,
}

impl Default for Get64 {
    fn default() -> Self {
        Get64 {
            tile_index: 0,
            length: 1,
            x: 0,
            y: 0,
            width: 8,
        }
    }
}

impl Message for Get64 {
    const MESSAGE_TYPE: u16 = 707;

    fn write(&self, buf: &mut BytesMut) {
        buf.put_u8(self.tile_index);
        buf.put_u8(self.length);
        buf.put_zeros(1);
        buf.put_u8(self.x);
        buf.put_u8(self.y);
        buf.put_u8(self.width);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        let tile_index = r.u8()?;
        let length = r.u8()?;
        r.skip(1)?;
        Ok(Get64 {
            tile_index,
            length,
            x: r.u8()?,
            y: r.u8()?,
            width: r.u8()?,
        })
    }
}

/// Zone colors of one tile. (711)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct State64 {
    pub tile_index: u8,
    pub x: u8,
    pub y: u8,
    pub width: u8,
    pub colors: Vec<Hsbk>,
}

impl Message for State64 {
    const MESSAGE_TYPE: u16 = 711;

    fn write(&self, buf: &mut BytesMut) {
        buf.put_u8(self.tile_index);
        buf.put_zeros(1);
        buf.put_u8(self.x);
        buf.put_u8(self.y);
        buf.put_u8(self.width);
        write_colors(buf, &self.colors, TILE_COLORS);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        let tile_index = r.u8()?;
        r.skip(1)?;
        Ok(State64 {
            tile_index,
            x: r.u8()?,
            y: r.u8()?,
            width: r.u8()?,
            colors: read_colors(r, TILE_COLORS)?,
        })
    }
}

/// Paints the zones of `length` tiles starting at `tile_index`. There is no
/// reply. (715)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Set64 {
    pub tile_index: u8,
    pub length: u8,
    pub x: u8,
    pub y: u8,
    pub width: u8,
    pub duration: u32,
    pub colors: Vec<Hsbk>,
}

impl Message for Set64 {
    const MESSAGE_TYPE: u16 = 715;

    fn write(&self, buf: &mut BytesMut) {
        buf.put_u8(self.tile_index);
        buf.put_u8(self.length);
        buf.put_zeros(1);
        buf.put_u8(self.x);
        buf.put_u8(self.y);
        buf.put_u8(self.width);
        buf.put_u32_le(self.duration);
        write_colors(buf, &self.colors, TILE_COLORS);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        let tile_index = r.u8()?;
        let length = r.u8()?;
        r.skip(1)?;
        Ok(Set64 {
            tile_index,
            length,
            x: r.u8()?,
            y: r.u8()?,
            width: r.u8()?,
            duration: r.u32()?,
            colors: read_colors(r, TILE_COLORS)?,
        })
    }
}

/// Asks which firmware effect is running. (718)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GetTileEffect;

impl Message for GetTileEffect {
    const MESSAGE_TYPE: u16 = 718;

    fn write(&self, buf: &mut BytesMut) {
        buf.put_zeros(2);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        r.skip(2)?;
        Ok(GetTileEffect)
    }
}

/// Fields shared by the tile effect request and its reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TileEffect {
    pub instance_id: u32,
    pub effect_type: TileEffectType,
    /// Milliseconds per cycle.
    pub speed: u32,
    /// Nanoseconds to run for; zero runs forever.
    pub duration: u64,
    pub parameters: [u8; EFFECT_PARAMETERS_LEN],
    /// Only the first `palette_count` entries on the wire are kept.
    pub palette: Vec<Hsbk>,
}

impl TileEffect {
    fn write(&self, buf: &mut BytesMut) {
        buf.put_u32_le(self.instance_id);
        buf.put_u8(self.effect_type.id());
        buf.put_u32_le(self.speed);
        buf.put_u64_le(self.duration);
        buf.put_zeros(8);
        buf.put_slice(&self.parameters);
        buf.put_u8(self.palette.len().min(PALETTE_LEN) as u8);
        write_colors(buf, &self.palette, PALETTE_LEN);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        let instance_id = r.u32()?;
        let raw = r.u8()?;
        let effect_type =
            TileEffectType::create(raw).ok_or_else(|| invalid_value("tile effect", raw))?;
        let speed = r.u32()?;
        let duration = r.u64()?;
        r.skip(8)?;
        let parameters = r.array()?;
        let count = r.u8()? as usize;
        let mut palette = read_colors(r, PALETTE_LEN)?;
        palette.truncate(count);
        Ok(TileEffect {
            instance_id,
            effect_type,
            speed,
            duration,
            parameters,
            palette,
        })
    }
}

/// Starts or stops a tile firmware effect. Replies with [`StateTileEffect`]. (719)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetTileEffect {
    pub effect: TileEffect,
}

impl Message for SetTileEffect {
    const MESSAGE_TYPE: u16 = 719;

    fn write(&self, buf: &mut BytesMut) {
        buf.put_zeros(2);
        self.effect.write(buf);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        r.skip(2)?;
        Ok(SetTileEffect {
            effect: TileEffect::read(r)?,
        })
    }
}

/// The running tile firmware effect. (720)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateTileEffect {
    pub effect: TileEffect,
}

impl Message for StateTileEffect {
    const MESSAGE_TYPE: u16 = 720;

    fn write(&self, buf: &mut BytesMut) {
        buf.put_zeros(1);
        self.effect.write(buf);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        r.skip(1)?;
        Ok(StateTileEffect {
            effect: TileEffect::read(r)?,
        })
    }
}
