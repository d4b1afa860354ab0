//! Strip and beam messages.

use bytes::{BufMut, BytesMut};

use super::{Message, Result, empty_message, invalid_value, read_colors, write_colors};
use crate::codec::{BufMutExt, Reader};
use crate::types::{
    ApplicationRequest, Direction, ExtendedApplicationRequest, Hsbk, MultiZoneEffectType,
};

/// Colors carried by one [`StateMultiZone`].
pub const MULTI_ZONE_COLORS: usize = 8;

/// Colors carried by one extended zones message.
pub const EXTENDED_ZONE_COLORS: usize = 82;

/// Length of the effect parameter block.
pub const EFFECT_PARAMETERS_LEN: usize = 32;

/// Paints zones `start_index..=end_index` one color. (501)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetColorZones {
    pub start_index: u8,
    pub end_index: u8,
    pub color: Hsbk,
    pub duration: u32,
    pub apply: ApplicationRequest,
}

impl Message for SetColorZones {
    const MESSAGE_TYPE: u16 = 501;

    fn write(&self, buf: &mut BytesMut) {
        buf.put_u8(self.start_index);
        buf.put_u8(self.end_index);
        self.color.write(buf);
        buf.put_u32_le(self.duration);
        buf.put_u8(self.apply.id());
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        let start_index = r.u8()?;
        let end_index = r.u8()?;
        let color = Hsbk::read(r)?;
        let duration = r.u32()?;
        let raw = r.u8()?;
        let apply = ApplicationRequest::create(raw).ok_or_else(|| invalid_value("apply", raw))?;
        Ok(SetColorZones {
            start_index,
            end_index,
            color,
            duration,
            apply,
        })
    }
}

/// Asks for zones `start_index..=end_index`. Replies with any number of
/// [`StateZone`] and [`StateMultiZone`] messages. (502)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetColorZones {
    pub start_index: u8,
    pub end_index: u8,
}

impl Default for GetColorZones {
    fn default() -> Self {
        GetColorZones {
            start_index: 0,
            end_index: 255,
        }
    }
}

impl Message for GetColorZones {
    const MESSAGE_TYPE: u16 = 502;

    fn write(&self, buf: &mut BytesMut) {
        buf.put_u8(self.start_index);
        buf.put_u8(self.end_index);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        Ok(GetColorZones {
            start_index: r.u8()?,
            end_index: r.u8()?,
        })
    }
}

/// Color of a single zone. (503)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateZone {
    pub zones_count: u8,
    pub zone_index: u8,
    pub color: Hsbk,
}

impl Message for StateZone {
    const MESSAGE_TYPE: u16 = 503;

    fn write(&self, buf: &mut BytesMut) {
        buf.put_u8(self.zones_count);
        buf.put_u8(self.zone_index);
        self.color.write(buf);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        Ok(StateZone {
            zones_count: r.u8()?,
            zone_index: r.u8()?,
            color: Hsbk::read(r)?,
        })
    }
}

/// Colors of eight consecutive zones starting at `zone_index`. (506)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateMultiZone {
    pub zones_count: u8,
    pub zone_index: u8,
    pub colors: Vec<Hsbk>,
}

impl Message for StateMultiZone {
    const MESSAGE_TYPE: u16 = 506;

    fn write(&self, buf: &mut BytesMut) {
        buf.put_u8(self.zones_count);
        buf.put_u8(self.zone_index);
        write_colors(buf, &self.colors, MULTI_ZONE_COLORS);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        Ok(StateMultiZone {
            zones_count: r.u8()?,
            zone_index: r.u8()?,
            colors: read_colors(r, MULTI_ZONE_COLORS)?,
        })
    }
}

empty_message!(
    /// Asks which firmware effect is running. (507)
    GetMultiZoneEffect = 507
);

/// Fields shared by the effect request and its reply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MultiZoneEffect {
    /// Identifies this run of the effect.
    pub instance_id: u32,
    pub effect_type: MultiZoneEffectType,
    /// Milliseconds per cycle.
    pub speed: u32,
    /// Nanoseconds to run for; zero runs forever.
    pub duration: u64,
    pub parameters: [u8; EFFECT_PARAMETERS_LEN],
}

impl MultiZoneEffect {
    /// Parameters for the `Move` effect.
    pub fn move_parameters(direction: Direction) -> [u8; EFFECT_PARAMETERS_LEN] {
        let mut parameters = [0u8; EFFECT_PARAMETERS_LEN];
        parameters[4..8].copy_from_slice(&direction.id().to_le_bytes());
        parameters
    }

    /// Direction of a running `Move` effect.
    pub fn direction(&self) -> Option<Direction> {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(&self.parameters[4..8]);
        Direction::create(u32::from_le_bytes(raw))
    }

    fn write(&self, buf: &mut BytesMut) {
        buf.put_u32_le(self.instance_id);
        buf.put_u8(self.effect_type.id());
        buf.put_zeros(2);
        buf.put_u32_le(self.speed);
        buf.put_u64_le(self.duration);
        buf.put_zeros(8);
        buf.put_slice(&self.parameters);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        let instance_id = r.u32()?;
        let raw = r.u8()?;
        let effect_type =
            MultiZoneEffectType::create(raw).ok_or_else(|| invalid_value("effect", raw))?;
        r.skip(2)?;
        let speed = r.u32()?;
        let duration = r.u64()?;
        r.skip(8)?;
        Ok(MultiZoneEffect {
            instance_id,
            effect_type,
            speed,
            duration,
            parameters: r.array()?,
        })
    }
}

/// Starts or stops a strip firmware effect. (508)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetMultiZoneEffect {
    pub effect: MultiZoneEffect,
}

impl Message for SetMultiZoneEffect {
    const MESSAGE_TYPE: u16 = 508;

    fn write(&self, buf: &mut BytesMut) {
        self.effect.write(buf);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        Ok(SetMultiZoneEffect {
            effect: MultiZoneEffect::read(r)?,
        })
    }
}

/// The running strip firmware effect. (509)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateMultiZoneEffect {
    pub effect: MultiZoneEffect,
}

impl Message for StateMultiZoneEffect {
    const MESSAGE_TYPE: u16 = 509;

    fn write(&self, buf: &mut BytesMut) {
        self.effect.write(buf);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        Ok(StateMultiZoneEffect {
            effect: MultiZoneEffect::read(r)?,
        })
    }
}

/// Paints up to 82 zones starting at `zone_index` in one message. (510)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetExtendedColorZones {
    pub duration: u32,
    pub apply: ExtendedApplicationRequest,
    pub zone_index: u16,
    pub colors: Vec<Hsbk>,
}

impl Message for SetExtendedColorZones {
    const MESSAGE_TYPE: u16 = 510;

    fn write(&self, buf: &mut BytesMut) {
        buf.put_u32_le(self.duration);
        buf.put_u8(self.apply.id());
        buf.put_u16_le(self.zone_index);
        buf.put_u8(self.colors.len().min(EXTENDED_ZONE_COLORS) as u8);
        write_colors(buf, &self.colors, EXTENDED_ZONE_COLORS);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        let duration = r.u32()?;
        let raw = r.u8()?;
        let apply =
            ExtendedApplicationRequest::create(raw).ok_or_else(|| invalid_value("apply", raw))?;
        let zone_index = r.u16()?;
        let count = r.u8()? as usize;
        let mut colors = read_colors(r, EXTENDED_ZONE_COLORS)?;
        colors.truncate(count);
        Ok(SetExtendedColorZones {
            duration,
            apply,
            zone_index,
            colors,
        })
    }
}

empty_message!(
    /// Asks for every zone color at once. (511)
    GetExtendedColorZones = 511
);

/// Up to 82 zone colors starting at `zone_index`. (512)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateExtendedColorZones {
    pub zones_count: u16,
    pub zone_index: u16,
    /// Only the first `colors_count` entries on the wire are kept.
    pub colors: Vec<Hsbk>,
}

impl Message for StateExtendedColorZones {
    const MESSAGE_TYPE: u16 = 512;

    fn write(&self, buf: &mut BytesMut) {
        buf.put_u16_le(self.zones_count);
        buf.put_u16_le(self.zone_index);
        buf.put_u8(self.colors.len().min(EXTENDED_ZONE_COLORS) as u8);
        write_colors(buf, &self.colors, EXTENDED_ZONE_COLORS);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        let zones_count = r.u16()?;
        let zone_index = r.u16()?;
        let count = r.u8()? as usize;
        let mut colors = read_colors(r, EXTENDED_ZONE_COLORS)?;
        colors.truncate(count);
        Ok(StateExtendedColorZones {
            zones_count,
            zone_index,
            colors,
        })
    }
}
