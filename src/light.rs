//! Individual light control.

use std::time::Duration;

use crate::device::{Device, millis};
use crate::errors::Error;
use crate::messages::light::{
    GetColor, GetHevCycle, GetHevCycleConfiguration, GetInfrared, GetLastHevCycleResult,
    GetLightPower, LightState, SetColor, SetHevCycle, SetHevCycleConfiguration, SetInfrared,
    SetLightPower, SetWaveform, SetWaveformOptional, StateHevCycle, StateHevCycleConfiguration,
    StateInfrared, StateLastHevCycleResult, StateLightPower,
};
use crate::types::{Hsbk, LastHevCycleResult, PowerLevel};

type Result<T> = std::result::Result<T, Error>;

/// A device that emits light.
///
/// Setters take a `wait` flag: when false the command is sent once and the
/// call returns without waiting for the device to confirm.
#[derive(Debug, Clone)]
pub struct Light {
    device: Device,
    saved_state: Option<LightState>,
}

impl From<Device> for Light {
    fn from(device: Device) -> Self {
        Light::new(device)
    }
}

impl AsRef<Device> for Light {
    fn as_ref(&self) -> &Device {
        &self.device
    }
}

impl Light {
    pub fn new(device: Device) -> Self {
        Light {
            device,
            saved_state: None,
        }
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut Device {
        &mut self.device
    }

    pub fn into_device(self) -> Device {
        self.device
    }

    /// The state captured by the last [`save_state`](Self::save_state).
    pub fn saved_state(&self) -> Option<&LightState> {
        self.saved_state.as_ref()
    }

    /// Color, power and label in one reply.
    pub async fn get_color(&self) -> Result<LightState> {
        self.device.query(&GetColor).await
    }

    pub async fn get_light_power(&self) -> Result<StateLightPower> {
        self.device.query(&GetLightPower).await
    }

    /// Fades to `color` over `duration`.
    pub async fn set_color(&self, color: Hsbk, duration: Duration, wait: bool) -> Result<()> {
        let message = SetColor {
            color,
            duration: millis(duration),
        };
        self.device.send(&message, wait).await
    }

    /// Sets the power level, fading over `duration`.
    pub async fn set_light_power(&self, level: u16, duration: Duration, wait: bool) -> Result<()> {
        let message = SetLightPower {
            level,
            duration: millis(duration),
        };
        self.device.send(&message, wait).await
    }

    pub async fn get_infrared(&self) -> Result<StateInfrared> {
        self.device.query(&GetInfrared).await
    }

    pub async fn set_infrared(&self, on: bool, wait: bool) -> Result<()> {
        let message = SetInfrared {
            brightness: PowerLevel::from_bool(on),
        };
        self.device.send(&message, wait).await
    }

    pub async fn set_waveform(&self, waveform: &SetWaveform, wait: bool) -> Result<()> {
        self.device.send(waveform, wait).await
    }

    /// Like [`set_waveform`](Self::set_waveform), but only the components
    /// flagged in `waveform` change.
    pub async fn set_waveform_optional(
        &self,
        waveform: &SetWaveformOptional,
        wait: bool,
    ) -> Result<()> {
        self.device.send(waveform, wait).await
    }

    pub async fn get_hev_cycle(&self) -> Result<StateHevCycle> {
        self.device.query(&GetHevCycle).await
    }

    /// Starts or stops a cleaning cycle. A zero `duration` uses the configured default.
    pub async fn set_hev_cycle(&self, enable: bool, duration: Duration) -> Result<StateHevCycle> {
        let message = SetHevCycle {
            enable,
            duration_s: u32::try_from(duration.as_secs()).unwrap_or(u32::MAX),
        };
        self.device.query(&message).await
    }

    pub async fn get_hev_cycle_configuration(&self) -> Result<StateHevCycleConfiguration> {
        self.device.query(&GetHevCycleConfiguration).await
    }

    pub async fn set_hev_cycle_configuration(
        &self,
        indication: bool,
        duration: Duration,
    ) -> Result<StateHevCycleConfiguration> {
        let message = SetHevCycleConfiguration {
            indication,
            duration_s: u32::try_from(duration.as_secs()).unwrap_or(u32::MAX),
        };
        self.device.query(&message).await
    }

    pub async fn get_last_hev_cycle_result(&self) -> Result<LastHevCycleResult> {
        let state: StateLastHevCycleResult = self.device.query(&GetLastHevCycleResult).await?;
        Ok(state.result)
    }

    /// Remembers the current color and power.
    pub async fn save_state(&mut self) -> Result<()> {
        self.saved_state = Some(self.get_color().await?);
        Ok(())
    }

    /// Fades back to the saved color and power. Returns false when nothing was saved.
    pub async fn restore_state(&self, duration: Duration) -> Result<bool> {
        let Some(saved) = &self.saved_state else {
            return Ok(false);
        };
        self.set_color(saved.color, duration, true).await?;
        self.set_light_power(saved.power, duration, true).await?;
        Ok(true)
    }
}
