//! Waveform shapes for color transitions.

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

/// Shape of the transition used by `SetWaveform` and `SetWaveformOptional`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, EnumIter, PartialEq, Eq)]
pub enum Waveform {
    #[default]
    Saw = 0,
    Sine = 1,
    HalfSine = 2,
    Triangle = 3,
    Pulse = 4,
}

impl Waveform {
    pub fn create(value: u8) -> Option<Self> {
        Waveform::iter().find(|waveform| *waveform as u8 == value)
    }

    pub fn id(&self) -> u8 {
        *self as u8
    }
}
