//! Hue, saturation, brightness and kelvin color representation.

use bytes::BufMut;
use serde::{Deserialize, Serialize};

use crate::codec::Reader;
use crate::errors::Error;

/// A color as the device understands it.
///
/// Every channel spans the full `u16` range: hue 0..=65535 maps onto
/// 0..360 degrees, saturation and brightness onto 0..=100 percent. Kelvin is
/// only meaningful when saturation is low and is clamped by the device to its
/// own supported range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hsbk {
    pub hue: u16,
    pub saturation: u16,
    pub brightness: u16,
    pub kelvin: u16,
}

impl Hsbk {
    /// Kelvin used when a color is built from RGB.
    pub const DEFAULT_KELVIN: u16 = 5500;

    /// Length of one color on the wire.
    pub const WIRE_LEN: usize = 8;

    pub const fn new(hue: u16, saturation: u16, brightness: u16, kelvin: u16) -> Self {
        Hsbk {
            hue,
            saturation,
            brightness,
            kelvin,
        }
    }

    /// Convert from RGB with the default kelvin.
    ///
    /// # Examples
    ///
    /// ```
    /// use lifx_lan_rs::Hsbk;
    ///
    /// let red = Hsbk::from_rgb(255, 0, 0);
    /// assert_eq!(red, Hsbk::new(0, 65535, 65535, 5500));
    /// ```
    pub fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self::from_rgbk(red, green, blue, Self::DEFAULT_KELVIN)
    }

    /// Convert from RGB with an explicit kelvin.
    pub fn from_rgbk(red: u8, green: u8, blue: u8, kelvin: u16) -> Self {
        let (r, g, b) = (red as f32, green as f32, blue as f32);
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);

        let brightness = max / 255.0;
        let saturation = if max != 0.0 { (max - min) / max } else { 0.0 };

        let hue = if saturation == 0.0 {
            0.0
        } else {
            let span = max - min;
            let rc = (max - r) / span;
            let gc = (max - g) / span;
            let bc = (max - b) / span;
            let sector = if r == max {
                bc - gc
            } else if g == max {
                2.0 + rc - bc
            } else {
                4.0 + gc - rc
            };
            let h = sector / 6.0;
            if h < 0.0 { h + 1.0 } else { h }
        };

        Hsbk {
            hue: scale(hue),
            saturation: scale(saturation),
            brightness: scale(brightness),
            kelvin,
        }
    }

    /// Convert to RGB, ignoring kelvin.
    pub fn to_rgb(&self) -> (u8, u8, u8) {
        let h = self.hue as f32 / 65535.0;
        let s = self.saturation as f32 / 65535.0;
        let v = self.brightness as f32 / 65535.0;

        if s == 0.0 {
            let gray = channel(v);
            return (gray, gray, gray);
        }

        let sector = (h - h.floor()) * 6.0;
        let f = sector - sector.floor();
        let p = v * (1.0 - s);
        let q = v * (1.0 - s * f);
        let t = v * (1.0 - s * (1.0 - f));

        let (r, g, b) = match sector as i32 {
            0 => (v, t, p),
            1 => (q, v, p),
            2 => (p, v, t),
            3 => (p, q, v),
            4 => (t, p, v),
            _ => (v, p, q),
        };
        (channel(r), channel(g), channel(b))
    }

    pub(crate) fn read(r: &mut Reader<'_>) -> Result<Self, Error> {
        Ok(Hsbk {
            hue: r.u16()?,
            saturation: r.u16()?,
            brightness: r.u16()?,
            kelvin: r.u16()?,
        })
    }

    pub(crate) fn write<B: BufMut + ?Sized>(&self, buf: &mut B) {
        buf.put_u16_le(self.hue);
        buf.put_u16_le(self.saturation);
        buf.put_u16_le(self.brightness);
        buf.put_u16_le(self.kelvin);
    }
}

fn scale(fraction: f32) -> u16 {
    (fraction * 65535.0) as u16
}

fn channel(fraction: f32) -> u8 {
    (fraction * 255.0 + 0.5) as u8
}
