//! Firmware effects for strips and matrix devices.

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

/// Firmware effect running on a multizone strip.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, EnumIter, PartialEq, Eq)]
pub enum MultiZoneEffectType {
    #[default]
    Off = 0,
    Move = 1,
}

impl MultiZoneEffectType {
    pub fn create(value: u8) -> Option<Self> {
        MultiZoneEffectType::iter().find(|effect| *effect as u8 == value)
    }

    pub fn id(&self) -> u8 {
        *self as u8
    }
}

/// Firmware effect running on a matrix device.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, EnumIter, PartialEq, Eq)]
pub enum TileEffectType {
    #[default]
    Off = 0,
    Reserved1 = 1,
    Morph = 2,
    Flame = 3,
    Reserved2 = 4,
    Sky = 5,
}

impl TileEffectType {
    pub fn create(value: u8) -> Option<Self> {
        TileEffectType::iter().find(|effect| *effect as u8 == value)
    }

    pub fn id(&self) -> u8 {
        *self as u8
    }
}

/// Travel direction of the strip `Move` effect.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, EnumIter, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Right = 0,
    Left = 1,
}

impl Direction {
    pub fn create(value: u32) -> Option<Self> {
        Direction::iter().find(|direction| *direction as u32 == value)
    }

    pub fn id(&self) -> u32 {
        *self as u32
    }
}
