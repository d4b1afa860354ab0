//! Color, waveform, infrared and HEV messages.

use bytes::{BufMut, BytesMut};

use super::{LABEL_LEN, Message, Result, empty_message, invalid_value};
use crate::codec::{BufMutExt, Reader};
use crate::types::{Hsbk, LastHevCycleResult, Waveform};

empty_message!(
    /// Asks for the current color, power and label. (101)
    GetColor = 101
);

/// Changes the color over `duration` milliseconds. Replies with [`LightState`]. (102)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetColor {
    pub color: Hsbk,
    pub duration: u32,
}

impl Message for SetColor {
    const MESSAGE_TYPE: u16 = 102;

    fn write(&self, buf: &mut BytesMut) {
        buf.put_u8(0);
        self.color.write(buf);
        buf.put_u32_le(self.duration);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        r.skip(1)?;
        Ok(SetColor {
            color: Hsbk::read(r)?,
            duration: r.u32()?,
        })
    }
}

/// Runs a waveform towards `color`. Replies with [`LightState`]. (103)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SetWaveform {
    /// Return to the original color when the waveform finishes.
    pub transient: bool,
    pub color: Hsbk,
    /// Milliseconds per cycle.
    pub period: u32,
    pub cycles: f32,
    pub skew_ratio: i16,
    pub waveform: Waveform,
}

impl Message for SetWaveform {
    const MESSAGE_TYPE: u16 = 103;

    fn write(&self, buf: &mut BytesMut) {
        buf.put_u8(0);
        buf.put_bool(self.transient);
        self.color.write(buf);
        buf.put_u32_le(self.period);
        buf.put_f32_le(self.cycles);
        buf.put_i16_le(self.skew_ratio);
        buf.put_u8(self.waveform.id());
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        r.skip(1)?;
        let transient = r.bool()?;
        let color = Hsbk::read(r)?;
        let period = r.u32()?;
        let cycles = r.f32()?;
        let skew_ratio = r.i16()?;
        let waveform = read_waveform(r)?;
        Ok(SetWaveform {
            transient,
            color,
            period,
            cycles,
            skew_ratio,
            waveform,
        })
    }
}

fn read_waveform(r: &mut Reader<'_>) -> Result<Waveform> {
    let raw = r.u8()?;
    Waveform::create(raw).ok_or_else(|| invalid_value("waveform", raw))
}

/// Color, power and label of a light. (107)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LightState {
    pub color: Hsbk,
    pub power: u16,
    pub label: String,
}

impl Message for LightState {
    const MESSAGE_TYPE: u16 = 107;

    fn write(&self, buf: &mut BytesMut) {
        self.color.write(buf);
        buf.put_zeros(2);
        buf.put_u16_le(self.power);
        buf.put_label(&self.label, LABEL_LEN);
        buf.put_zeros(8);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        let color = Hsbk::read(r)?;
        r.skip(2)?;
        let power = r.u16()?;
        let label = r.label(LABEL_LEN)?;
        r.skip(8)?;
        Ok(LightState {
            color,
            power,
            label,
        })
    }
}

empty_message!(
    /// Asks for the light power level. (116)
    GetLightPower = 116
);

/// Changes the power level over `duration` milliseconds. (117)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetLightPower {
    pub level: u16,
    pub duration: u32,
}

impl Message for SetLightPower {
    const MESSAGE_TYPE: u16 = 117;

    fn write(&self, buf: &mut BytesMut) {
        buf.put_u16_le(self.level);
        buf.put_u32_le(self.duration);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        Ok(SetLightPower {
            level: r.u16()?,
            duration: r.u32()?,
        })
    }
}

/// Light power level. (118)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateLightPower {
    pub level: u16,
}

impl Message for StateLightPower {
    const MESSAGE_TYPE: u16 = 118;

    fn write(&self, buf: &mut BytesMut) {
        buf.put_u16_le(self.level);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        Ok(StateLightPower { level: r.u16()? })
    }
}

/// Like [`SetWaveform`], but only the selected channels change. (119)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SetWaveformOptional {
    pub transient: bool,
    pub color: Hsbk,
    pub period: u32,
    pub cycles: f32,
    pub skew_ratio: i16,
    pub waveform: Waveform,
    pub set_hue: bool,
    pub set_saturation: bool,
    pub set_brightness: bool,
    pub set_kelvin: bool,
}

impl Message for SetWaveformOptional {
    const MESSAGE_TYPE: u16 = 119;

    fn write(&self, buf: &mut BytesMut) {
        buf.put_u8(0);
        buf.put_bool(self.transient);
        self.color.write(buf);
        buf.put_u32_le(self.period);
        buf.put_f32_le(self.cycles);
        buf.put_i16_le(self.skew_ratio);
        buf.put_u8(self.waveform.id());
        buf.put_bool(self.set_hue);
        buf.put_bool(self.set_saturation);
        buf.put_bool(self.set_brightness);
        buf.put_bool(self.set_kelvin);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        r.skip(1)?;
        let transient = r.bool()?;
        let color = Hsbk::read(r)?;
        let period = r.u32()?;
        let cycles = r.f32()?;
        let skew_ratio = r.i16()?;
        let waveform = read_waveform(r)?;
        Ok(SetWaveformOptional {
            transient,
            color,
            period,
            cycles,
            skew_ratio,
            waveform,
            set_hue: r.bool()?,
            set_saturation: r.bool()?,
            set_brightness: r.bool()?,
            set_kelvin: r.bool()?,
        })
    }
}

empty_message!(
    /// Asks for the infrared brightness. (120)
    GetInfrared = 120
);

/// Infrared brightness. (121)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateInfrared {
    pub brightness: u16,
}

impl Message for StateInfrared {
    const MESSAGE_TYPE: u16 = 121;

    fn write(&self, buf: &mut BytesMut) {
        buf.put_u16_le(self.brightness);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        Ok(StateInfrared {
            brightness: r.u16()?,
        })
    }
}

/// Changes the infrared brightness. Replies with [`StateInfrared`]. (122)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetInfrared {
    pub brightness: u16,
}

impl Message for SetInfrared {
    const MESSAGE_TYPE: u16 = 122;

    fn write(&self, buf: &mut BytesMut) {
        buf.put_u16_le(self.brightness);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        Ok(SetInfrared {
            brightness: r.u16()?,
        })
    }
}

empty_message!(
    /// Asks for the state of the current HEV cycle. (142)
    GetHevCycle = 142
);

/// Starts or stops a HEV cycle. Replies with [`StateHevCycle`]. (143)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetHevCycle {
    pub enable: bool,
    /// Zero uses the configured default duration.
    pub duration_s: u32,
}

impl Message for SetHevCycle {
    const MESSAGE_TYPE: u16 = 143;

    fn write(&self, buf: &mut BytesMut) {
        buf.put_bool(self.enable);
        buf.put_u32_le(self.duration_s);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        Ok(SetHevCycle {
            enable: r.bool()?,
            duration_s: r.u32()?,
        })
    }
}

/// State of the current HEV cycle. (144)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateHevCycle {
    pub duration_s: u32,
    /// Zero when no cycle is running.
    pub remaining_s: u32,
    pub last_power: bool,
}

impl Message for StateHevCycle {
    const MESSAGE_TYPE: u16 = 144;

    fn write(&self, buf: &mut BytesMut) {
        buf.put_u32_le(self.duration_s);
        buf.put_u32_le(self.remaining_s);
        buf.put_bool(self.last_power);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        Ok(StateHevCycle {
            duration_s: r.u32()?,
            remaining_s: r.u32()?,
            last_power: r.bool()?,
        })
    }
}

empty_message!(
    /// Asks for the default HEV cycle settings. (145)
    GetHevCycleConfiguration = 145
);

/// Changes the default HEV cycle settings. (146)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetHevCycleConfiguration {
    /// Flash briefly when a cycle finishes.
    pub indication: bool,
    pub duration_s: u32,
}

impl Message for SetHevCycleConfiguration {
    const MESSAGE_TYPE: u16 = 146;

    fn write(&self, buf: &mut BytesMut) {
        buf.put_bool(self.indication);
        buf.put_u32_le(self.duration_s);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        Ok(SetHevCycleConfiguration {
            indication: r.bool()?,
            duration_s: r.u32()?,
        })
    }
}

/// Default HEV cycle settings. (147)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateHevCycleConfiguration {
    pub indication: bool,
    pub duration_s: u32,
}

impl Message for StateHevCycleConfiguration {
    const MESSAGE_TYPE: u16 = 147;

    fn write(&self, buf: &mut BytesMut) {
        buf.put_bool(self.indication);
        buf.put_u32_le(self.duration_s);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        Ok(StateHevCycleConfiguration {
            indication: r.bool()?,
            duration_s: r.u32()?,
        })
    }
}

empty_message!(
    /// Asks how the last HEV cycle ended. (148)
    GetLastHevCycleResult = 148
);

/// How the last HEV cycle ended. (149)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateLastHevCycleResult {
    pub result: LastHevCycleResult,
}

impl Message for StateLastHevCycleResult {
    const MESSAGE_TYPE: u16 = 149;

    fn write(&self, buf: &mut BytesMut) {
        buf.put_u8(self.result.id());
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        let raw = r.u8()?;
        let result =
            LastHevCycleResult::create(raw).ok_or_else(|| invalid_value("hev result", raw))?;
        Ok(StateLastHevCycleResult { result })
    }
}
