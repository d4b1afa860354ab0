//! Messages every device understands.

use bytes::{BufMut, BytesMut};
use uuid::Uuid;

use super::{LABEL_LEN, Message, Result, empty_message};
use crate::codec::{BufMutExt, Reader};

empty_message!(
    /// Asks for the host firmware version. (14)
    GetHostFirmware = 14
);

/// Host firmware build and version. (15)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateHostFirmware {
    /// Build time in nanoseconds since the epoch.
    pub build: u64,
    pub version_minor: u16,
    pub version_major: u16,
}

impl Message for StateHostFirmware {
    const MESSAGE_TYPE: u16 = 15;

    fn write(&self, buf: &mut BytesMut) {
        buf.put_u64_le(self.build);
        buf.put_zeros(8);
        buf.put_u16_le(self.version_minor);
        buf.put_u16_le(self.version_major);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        let build = r.u64()?;
        r.skip(8)?;
        Ok(StateHostFirmware {
            build,
            version_minor: r.u16()?,
            version_major: r.u16()?,
        })
    }
}

empty_message!(
    /// Asks for the wifi signal strength. (16)
    GetWifiInfo = 16
);

/// Wifi signal strength. (17)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StateWifiInfo {
    /// Signal in milliwatts.
    pub signal: f32,
}

impl StateWifiInfo {
    /// Signal strength in dBm, rounded. `None` when the device reports no
    /// usable reading (zero, negative or not finite).
    pub fn rssi(&self) -> Option<i32> {
        let milliwatts = f64::from(self.signal);
        if !milliwatts.is_finite() || milliwatts <= 0.0 {
            return None;
        }
        Some((10.0 * milliwatts.log10() + 0.5).floor() as i32)
    }
}

impl Message for StateWifiInfo {
    const MESSAGE_TYPE: u16 = 17;

    fn write(&self, buf: &mut BytesMut) {
        buf.put_f32_le(self.signal);
        buf.put_zeros(10);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        let signal = r.f32()?;
        r.skip(10)?;
        Ok(StateWifiInfo { signal })
    }
}

empty_message!(
    /// Asks for the wifi firmware version. (18)
    GetWifiFirmware = 18
);

/// Wifi firmware build and version. (19)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateWifiFirmware {
    pub build: u64,
    pub version_minor: u16,
    pub version_major: u16,
}

impl Message for StateWifiFirmware {
    const MESSAGE_TYPE: u16 = 19;

    fn write(&self, buf: &mut BytesMut) {
        buf.put_u64_le(self.build);
        buf.put_zeros(8);
        buf.put_u16_le(self.version_minor);
        buf.put_u16_le(self.version_major);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        let build = r.u64()?;
        r.skip(8)?;
        Ok(StateWifiFirmware {
            build,
            version_minor: r.u16()?,
            version_major: r.u16()?,
        })
    }
}

empty_message!(
    /// Asks for the device power level. (20)
    GetPower = 20
);

/// Sets the device power level. Replies with [`StatePower`]. (21)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetPower {
    pub level: u16,
}

impl Message for SetPower {
    const MESSAGE_TYPE: u16 = 21;

    fn write(&self, buf: &mut BytesMut) {
        buf.put_u16_le(self.level);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        Ok(SetPower { level: r.u16()? })
    }
}

/// Device power level, 0 or 65535. (22)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatePower {
    pub level: u16,
}

impl Message for StatePower {
    const MESSAGE_TYPE: u16 = 22;

    fn write(&self, buf: &mut BytesMut) {
        buf.put_u16_le(self.level);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        Ok(StatePower { level: r.u16()? })
    }
}

empty_message!(
    /// Asks for the device label. (23)
    GetLabel = 23
);

/// Renames the device. Replies with [`StateLabel`]. (24)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetLabel {
    pub label: String,
}

impl Message for SetLabel {
    const MESSAGE_TYPE: u16 = 24;

    fn write(&self, buf: &mut BytesMut) {
        buf.put_label(&self.label, LABEL_LEN);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        Ok(SetLabel {
            label: r.label(LABEL_LEN)?,
        })
    }
}

/// The device label. (25)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateLabel {
    pub label: String,
}

impl Message for StateLabel {
    const MESSAGE_TYPE: u16 = 25;

    fn write(&self, buf: &mut BytesMut) {
        buf.put_label(&self.label, LABEL_LEN);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        Ok(StateLabel {
            label: r.label(LABEL_LEN)?,
        })
    }
}

empty_message!(
    /// Asks for the vendor and product ids. (32)
    GetVersion = 32
);

/// Vendor and product ids. See the LIFX product registry. (33)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateVersion {
    pub vendor: u32,
    pub product: u32,
}

impl Message for StateVersion {
    const MESSAGE_TYPE: u16 = 33;

    fn write(&self, buf: &mut BytesMut) {
        buf.put_u32_le(self.vendor);
        buf.put_u32_le(self.product);
        buf.put_zeros(4);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        let vendor = r.u32()?;
        let product = r.u32()?;
        r.skip(4)?;
        Ok(StateVersion { vendor, product })
    }
}

empty_message!(
    /// Asks for the device clock and uptime. (34)
    GetInfo = 34
);

/// Device clock and uptime, in nanoseconds. (35)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateInfo {
    pub time: u64,
    pub uptime: u64,
    pub downtime: u64,
}

impl Message for StateInfo {
    const MESSAGE_TYPE: u16 = 35;

    fn write(&self, buf: &mut BytesMut) {
        buf.put_u64_le(self.time);
        buf.put_u64_le(self.uptime);
        buf.put_u64_le(self.downtime);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        Ok(StateInfo {
            time: r.u64()?,
            uptime: r.u64()?,
            downtime: r.u64()?,
        })
    }
}

empty_message!(
    /// Restarts the device. There is no reply. (38)
    SetReboot = 38
);

empty_message!(
    /// Sent when a request set `ack_required`. (45)
    Acknowledgement = 45
);

empty_message!(
    /// Asks which location the device belongs to. (48)
    GetLocation = 48
);

/// Moves the device to a location. Replies with [`StateLocation`]. (49)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetLocation {
    pub location: Uuid,
    pub label: String,
    /// Nanoseconds since the epoch; the most recent update wins across devices.
    pub updated_at: u64,
}

impl Message for SetLocation {
    const MESSAGE_TYPE: u16 = 49;

    fn write(&self, buf: &mut BytesMut) {
        write_membership(buf, &self.location, &self.label, self.updated_at);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        let (location, label, updated_at) = read_membership(r)?;
        Ok(SetLocation {
            location,
            label,
            updated_at,
        })
    }
}

/// The location the device belongs to. (50)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateLocation {
    pub location: Uuid,
    pub label: String,
    pub updated_at: u64,
}

impl Message for StateLocation {
    const MESSAGE_TYPE: u16 = 50;

    fn write(&self, buf: &mut BytesMut) {
        write_membership(buf, &self.location, &self.label, self.updated_at);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        let (location, label, updated_at) = read_membership(r)?;
        Ok(StateLocation {
            location,
            label,
            updated_at,
        })
    }
}

empty_message!(
    /// Asks which group the device belongs to. (51)
    GetGroup = 51
);

/// Moves the device to a group. Replies with [`StateGroup`]. (52)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetGroup {
    pub group: Uuid,
    pub label: String,
    pub updated_at: u64,
}

impl Message for SetGroup {
    const MESSAGE_TYPE: u16 = 52;

    fn write(&self, buf: &mut BytesMut) {
        write_membership(buf, &self.group, &self.label, self.updated_at);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        let (group, label, updated_at) = read_membership(r)?;
        Ok(SetGroup {
            group,
            label,
            updated_at,
        })
    }
}

/// The group the device belongs to. (53)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateGroup {
    pub group: Uuid,
    pub label: String,
    pub updated_at: u64,
}

impl Message for StateGroup {
    const MESSAGE_TYPE: u16 = 53;

    fn write(&self, buf: &mut BytesMut) {
        write_membership(buf, &self.group, &self.label, self.updated_at);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        let (group, label, updated_at) = read_membership(r)?;
        Ok(StateGroup {
            group,
            label,
            updated_at,
        })
    }
}

fn write_membership(buf: &mut BytesMut, id: &Uuid, label: &str, updated_at: u64) {
    buf.put_uuid(id);
    buf.put_label(label, LABEL_LEN);
    buf.put_u64_le(updated_at);
}

fn read_membership(r: &mut Reader<'_>) -> Result<(Uuid, String, u64)> {
    Ok((r.uuid()?, r.label(LABEL_LEN)?, r.u64()?))
}

/// Length of the echo buffer.
pub const ECHO_LEN: usize = 64;

/// Asks the device to send back `echoing` unchanged. (58)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EchoRequest {
    pub echoing: [u8; ECHO_LEN],
}

impl EchoRequest {
    /// Builds a request echoing `text`, truncated or zero padded.
    pub fn from_text(text: &str) -> Self {
        let mut echoing = [0u8; ECHO_LEN];
        let n = text.len().min(ECHO_LEN);
        echoing[..n].copy_from_slice(&text.as_bytes()[..n]);
        EchoRequest { echoing }
    }
}

impl Message for EchoRequest {
    const MESSAGE_TYPE: u16 = 58;

    fn write(&self, buf: &mut BytesMut) {
        buf.put_slice(&self.echoing);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        Ok(EchoRequest {
            echoing: r.array()?,
        })
    }
}

/// The bytes from an [`EchoRequest`]. (59)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EchoResponse {
    pub echoing: [u8; ECHO_LEN],
}

impl EchoResponse {
    /// The echoed bytes up to the first zero, as text.
    pub fn text(&self) -> String {
        crate::codec::decode_label(&self.echoing)
    }
}

impl Message for EchoResponse {
    const MESSAGE_TYPE: u16 = 59;

    fn write(&self, buf: &mut BytesMut) {
        buf.put_slice(&self.echoing);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        Ok(EchoResponse {
            echoing: r.array()?,
        })
    }
}

/// Sent instead of a state message when the device does not understand a
/// request. (223)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateUnhandled {
    pub unhandled_type: u16,
}

impl Message for StateUnhandled {
    const MESSAGE_TYPE: u16 = 223;

    fn write(&self, buf: &mut BytesMut) {
        buf.put_u16_le(self.unhandled_type);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        Ok(StateUnhandled {
            unhandled_type: r.u16()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::Payload;

    #[test]
    fn test_layout_lengths() {
        assert_eq!(StateHostFirmware::default().to_bytes().len(), 20);
        assert_eq!(StateWifiInfo::default().to_bytes().len(), 14);
        assert_eq!(StateWifiFirmware::default().to_bytes().len(), 20);
        assert_eq!(StateVersion::default().to_bytes().len(), 12);
        assert_eq!(StateInfo::default().to_bytes().len(), 24);
        assert_eq!(StateLocation::default().to_bytes().len(), 56);
        assert_eq!(StateGroup::default().to_bytes().len(), 56);
        assert_eq!(EchoRequest::from_text("hi").to_bytes().len(), 64);
        assert!(Acknowledgement.to_bytes().is_empty());
        assert!(GetLabel.to_bytes().is_empty());
    }

    #[test]
    fn test_state_version_decode() {
        let raw = [1, 0, 0, 0, 55, 0, 0, 0, 0, 0, 0, 0];
        let version = StateVersion::from_bytes(&raw).unwrap();
        assert_eq!(version.vendor, 1);
        assert_eq!(version.product, 55);
    }

    #[test]
    fn test_group_round_trip() {
        let group = StateGroup {
            group: Uuid::from_bytes([7; 16]),
            label: "Upstairs".into(),
            updated_at: 1_700_000_000_000_000_000,
        };
        let raw = group.to_bytes();
        assert_eq!(&raw[..16], &[7; 16]);
        assert_eq!(&raw[16..24], b"Upstairs");
        assert_eq!(StateGroup::from_bytes(&raw).unwrap(), group);
    }

    #[test]
    fn test_short_label_is_truncated_error() {
        assert!(StateLabel::from_bytes(&[b'a'; 10]).is_err());
    }

    #[test]
    fn test_echo_text() {
        let request = EchoRequest::from_text("ping");
        let response = EchoResponse {
            echoing: request.echoing,
        };
        assert_eq!(response.text(), "ping");
    }

    #[test]
    fn test_wifi_rssi() {
        let info = StateWifiInfo { signal: 1e-6 };
        assert_eq!(info.rssi(), Some(-60));
    }

    #[test]
    fn test_wifi_rssi_without_signal() {
        assert_eq!(StateWifiInfo { signal: 0.0 }.rssi(), None);
        assert_eq!(StateWifiInfo { signal: -1.0 }.rssi(), None);
        assert_eq!(StateWifiInfo { signal: f32::NAN }.rssi(), None);
    }
}
