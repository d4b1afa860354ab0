//! Whether a zone update is applied immediately or buffered.

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

/// Apply mode for `SetColorZones`.
///
/// `NoApply` buffers the change until a later message with `Apply` or
/// `ApplyOnly` arrives, which allows several ranges to change at once.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, EnumIter, PartialEq, Eq)]
pub enum ApplicationRequest {
    NoApply = 0,
    #[default]
    Apply = 1,
    ApplyOnly = 2,
}

impl ApplicationRequest {
    pub fn create(value: u8) -> Option<Self> {
        ApplicationRequest::iter().find(|request| *request as u8 == value)
    }

    pub fn id(&self) -> u8 {
        *self as u8
    }
}

/// Apply mode for `SetExtendedColorZones`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, EnumIter, PartialEq, Eq)]
pub enum ExtendedApplicationRequest {
    NoApply = 0,
    #[default]
    Apply = 1,
    ApplyOnly = 2,
}

impl ExtendedApplicationRequest {
    pub fn create(value: u8) -> Option<Self> {
        ExtendedApplicationRequest::iter().find(|request| *request as u8 == value)
    }

    pub fn id(&self) -> u8 {
        *self as u8
    }
}
