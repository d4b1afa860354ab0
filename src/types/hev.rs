//! Germicidal (HEV) cycle results.

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

/// How the most recent HEV cycle ended.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, EnumIter, PartialEq, Eq)]
pub enum LastHevCycleResult {
    Success = 0,
    Busy = 1,
    InterruptedByReset = 2,
    InterruptedByHomekit = 3,
    InterruptedByLan = 4,
    InterruptedByCloud = 5,
    None = 255,
}

impl LastHevCycleResult {
    pub fn create(value: u8) -> Option<Self> {
        LastHevCycleResult::iter().find(|result| *result as u8 == value)
    }

    pub fn id(&self) -> u8 {
        *self as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert_eq!(LastHevCycleResult::create(0), Some(LastHevCycleResult::Success));
        assert_eq!(LastHevCycleResult::create(255), Some(LastHevCycleResult::None));
        assert_eq!(LastHevCycleResult::create(6), None);
    }
}
