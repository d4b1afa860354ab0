//! Operations every device supports.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use log::debug;
use uuid::Uuid;

use crate::client::{Client, Response, Target};
use crate::config::{DeviceConfig, PORT, RequestOptions};
use crate::errors::Error;
use crate::messages::Message;
use crate::messages::Payload;
use crate::messages::device::{
    EchoRequest, EchoResponse, GetGroup, GetHostFirmware, GetInfo, GetLabel, GetLocation,
    GetPower, GetVersion, GetWifiFirmware, GetWifiInfo, SetGroup, SetLabel, SetLocation,
    SetPower, SetReboot, StateGroup, StateHostFirmware, StateInfo, StateLabel, StateLocation,
    StatePower, StateVersion, StateWifiFirmware, StateWifiInfo,
};
use crate::types::{DeviceKind, MacAddress, PowerLevel};

type Result<T> = std::result::Result<T, Error>;

/// A device on the local network.
///
/// A `Device` is cheap to build and does no I/O until asked. [`refresh`]
/// fills the cached label, location, group and version, and derives the
/// [`DeviceKind`] that decides which capability wrapper applies.
///
/// [`refresh`]: Device::refresh
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use lifx_lan_rs::{Client, Device};
///
/// let client = Arc::new(Client::default());
/// let device = Device::new(client, "192.168.1.20".parse().unwrap(), "d0:73:d5:43:47:86".parse().unwrap(), 56700);
/// assert!(device.label().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct Device {
    client: Arc<Client>,
    ip: IpAddr,
    mac: MacAddress,
    port: u16,
    label: Option<String>,
    location: Option<StateLocation>,
    group: Option<StateGroup>,
    version: Option<StateVersion>,
    kind: Option<DeviceKind>,
}

impl Device {
    pub fn new(client: Arc<Client>, ip: IpAddr, mac: MacAddress, port: u16) -> Self {
        Device {
            client,
            ip,
            mac,
            port,
            label: None,
            location: None,
            group: None,
            version: None,
            kind: None,
        }
    }

    /// Rebuilds a handle from a saved [`DeviceConfig`].
    pub fn from_config(client: Arc<Client>, config: &DeviceConfig) -> Result<Self> {
        let ip = config
            .ip
            .ok_or_else(|| Error::Protocol("device config has no ip".to_string()))?;
        let mac: MacAddress = config
            .mac
            .as_deref()
            .ok_or_else(|| Error::InvalidMacAddress(String::new()))?
            .parse()?;
        let mut device = Device::new(client, ip, mac, config.port.unwrap_or(PORT));
        device.label = config.label.clone();
        Ok(device)
    }

    /// Serializable snapshot of this handle.
    pub fn config(&self) -> DeviceConfig {
        DeviceConfig {
            ip: Some(self.ip),
            port: Some(self.port),
            mac: Some(self.mac.to_string()),
            label: self.label.clone(),
        }
    }

    pub fn client(&self) -> &Arc<Client> {
        &self.client
    }

    pub fn ip(&self) -> IpAddr {
        self.ip
    }

    pub fn mac(&self) -> MacAddress {
        self.mac
    }

    /// The UDP port the device advertised for its service.
    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn target(&self) -> Target {
        Target::new(self.mac, SocketAddr::new(self.ip, self.port))
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn location(&self) -> Option<&StateLocation> {
        self.location.as_ref()
    }

    pub fn group(&self) -> Option<&StateGroup> {
        self.group.as_ref()
    }

    pub fn version(&self) -> Option<&StateVersion> {
        self.version.as_ref()
    }

    /// Capability class, known once [`refresh`](Self::refresh) has run.
    pub fn kind(&self) -> Option<DeviceKind> {
        self.kind
    }

    /// Fetches the label, location, group and version.
    pub async fn refresh(&mut self) -> Result<()> {
        self.fetch_label().await?;
        self.fetch_location().await?;
        self.fetch_group().await?;

        let version = self.get_version().await?;
        let kind = DeviceKind::from_product(version.product);
        debug!(
            "Device {} is product {} ({kind:?})",
            self.mac, version.product
        );
        self.version = Some(version);
        self.kind = Some(kind);
        Ok(())
    }

    pub async fn fetch_label(&mut self) -> Result<&str> {
        let state: StateLabel = self.query(&GetLabel).await?;
        Ok(self.label.insert(state.label).as_str())
    }

    pub async fn fetch_location(&mut self) -> Result<&StateLocation> {
        let state: StateLocation = self.query(&GetLocation).await?;
        Ok(self.location.insert(state))
    }

    pub async fn fetch_group(&mut self) -> Result<&StateGroup> {
        let state: StateGroup = self.query(&GetGroup).await?;
        Ok(self.group.insert(state))
    }

    pub async fn get_version(&self) -> Result<StateVersion> {
        self.query(&GetVersion).await
    }

    pub async fn get_host_firmware(&self) -> Result<StateHostFirmware> {
        self.query(&GetHostFirmware).await
    }

    pub async fn get_wifi_info(&self) -> Result<StateWifiInfo> {
        self.query(&GetWifiInfo).await
    }

    pub async fn get_wifi_firmware(&self) -> Result<StateWifiFirmware> {
        self.query(&GetWifiFirmware).await
    }

    pub async fn get_power(&self) -> Result<StatePower> {
        self.query(&GetPower).await
    }

    pub async fn is_powered(&self) -> Result<bool> {
        Ok(PowerLevel::is_on(self.get_power().await?.level))
    }

    pub async fn set_power(&self, on: bool) -> Result<()> {
        let message = SetPower {
            level: PowerLevel::from_bool(on),
        };
        self.send(&message, true).await
    }

    /// Time, uptime and downtime, in nanoseconds.
    pub async fn get_info(&self) -> Result<StateInfo> {
        self.query(&GetInfo).await
    }

    /// Round-trips `text` (at most 64 bytes) through the device.
    pub async fn echo(&self, text: &str) -> Result<String> {
        let reply: EchoResponse = self.query(&EchoRequest::from_text(text)).await?;
        Ok(reply.text())
    }

    pub async fn set_label(&mut self, label: &str) -> Result<&str> {
        let message = SetLabel {
            label: label.to_string(),
        };
        let state: StateLabel = self.query(&message).await?;
        Ok(self.label.insert(state.label).as_str())
    }

    /// Restarts the device. Sent once, since a rebooting device cannot answer.
    pub async fn reboot(&self) -> Result<()> {
        self.send(&SetReboot, false).await
    }

    pub async fn set_location(&mut self, location: Uuid, label: &str) -> Result<&StateLocation> {
        let message = SetLocation {
            location,
            label: label.to_string(),
            updated_at: now_nanos(),
        };
        let state: StateLocation = self.query(&message).await?;
        Ok(self.location.insert(state))
    }

    pub async fn set_group(&mut self, group: Uuid, label: &str) -> Result<&StateGroup> {
        let message = SetGroup {
            group,
            label: label.to_string(),
            updated_at: now_nanos(),
        };
        let state: StateGroup = self.query(&message).await?;
        Ok(self.group.insert(state))
    }

    /// Sends `payload` and returns its single reply as an `R`.
    pub(crate) async fn query<R: Message + Clone>(&self, payload: &dyn Payload) -> Result<R> {
        self.client.query(payload, &self.target()).await
    }

    /// Sends `payload`, waiting for the device's reply only when `wait` is set.
    pub(crate) async fn send(&self, payload: &dyn Payload, wait: bool) -> Result<()> {
        let options = self.client.default_options().response_required(wait);
        self.request(payload, &options).await.map(|_| ())
    }

    pub(crate) async fn request(
        &self,
        payload: &dyn Payload,
        options: &RequestOptions,
    ) -> Result<Vec<Response>> {
        self.client
            .request(payload, Some(&self.target()), options)
            .await
    }
}

/// Wire milliseconds for a transition time, saturating at `u32::MAX`.
pub(crate) fn millis(duration: Duration) -> u32 {
    u32::try_from(duration.as_millis()).unwrap_or(u32::MAX)
}

/// Wire nanoseconds for an effect run time, saturating at `u64::MAX`.
pub(crate) fn nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}

/// A fresh identifier for a firmware effect run.
pub(crate) fn effect_instance_id() -> u32 {
    Uuid::new_v4().as_u128() as u32
}

fn now_nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(nanos)
        .unwrap_or(0)
}
