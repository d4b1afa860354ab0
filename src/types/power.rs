//! Power levels.

/// Helpers for the `u16` power level devices report.
///
/// Devices only ever use the two extremes; anything above zero counts as on.
pub struct PowerLevel;

impl PowerLevel {
    pub const ON: u16 = 65535;
    pub const OFF: u16 = 0;

    pub fn from_bool(on: bool) -> u16 {
        if on { Self::ON } else { Self::OFF }
    }

    pub fn is_on(level: u16) -> bool {
        level > 0
    }
}
