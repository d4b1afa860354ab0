//! Device discovery via UDP broadcast.
//!
//! Discovery broadcasts `GetService`, keeps the first answer from each IP
//! address and then refreshes every device so its label, group and
//! [`DeviceKind`] are known. Devices that stop answering during the refresh
//! are left out.

use std::collections::HashSet;
use std::sync::Arc;

use log::{debug, trace, warn};

use crate::client::Client;
use crate::device::Device;
use crate::errors::Error;
use crate::light::Light;
use crate::messages::discovery::{GetService, StateService};
use crate::multizone::MultiZone;
use crate::relay::Relay;
use crate::tile::Tile;
use crate::types::{DeviceKind, MacAddress, Service};

type Result<T> = std::result::Result<T, Error>;

/// Finds every device on the broadcast domain.
///
/// # Examples
///
/// ```ignore
/// use std::sync::Arc;
/// use lifx_lan_rs::{Client, find_devices};
///
/// let client = Arc::new(Client::default());
/// for device in find_devices(&client).await? {
///     println!("{} {:?} at {}", device.mac(), device.label(), device.ip());
/// }
/// ```
pub async fn find_devices(client: &Arc<Client>) -> Result<Vec<Device>> {
    let options = client.default_options().unbounded();
    let replies = client.request(&GetService, None, &options).await?;

    let mut seen = HashSet::new();
    let mut devices = Vec::new();
    for reply in &replies {
        let Some(state) = reply.message_as::<StateService>() else {
            continue;
        };
        if state.service != Service::Udp {
            trace!("Ignoring {:?} service from {}", state.service, reply.sender);
            continue;
        }
        if !seen.insert(reply.sender.ip()) {
            continue;
        }
        let port = u16::try_from(state.port).unwrap_or(reply.sender.port());
        devices.push(Device::new(
            Arc::clone(client),
            reply.sender.ip(),
            reply.mac(),
            port,
        ));
    }
    debug!("Discovered {} devices", devices.len());

    let mut refreshed = Vec::with_capacity(devices.len());
    for mut device in devices {
        match device.refresh().await {
            Ok(()) => refreshed.push(device),
            Err(e) => warn!("Skipping {} at {}: {e}", device.mac(), device.ip()),
        }
    }
    Ok(refreshed)
}

/// The first device whose label matches, ignoring case.
pub async fn find_device_by_label(client: &Arc<Client>, label: &str) -> Result<Option<Device>> {
    let devices = find_devices(client).await?;
    Ok(devices.into_iter().find(|device| {
        device
            .label()
            .is_some_and(|candidate| candidate.eq_ignore_ascii_case(label))
    }))
}

/// The device with hardware address `mac`, in any of the accepted notations.
pub async fn find_device_by_mac(client: &Arc<Client>, mac: &str) -> Result<Option<Device>> {
    let mac: MacAddress = mac.parse()?;
    let devices = find_devices(client).await?;
    Ok(devices.into_iter().find(|device| device.mac() == mac))
}

fn of_kind(devices: Vec<Device>, kind: DeviceKind) -> impl Iterator<Item = Device> {
    devices
        .into_iter()
        .filter(move |device| device.kind() == Some(kind))
}

/// Single-zone lights.
pub async fn find_lights(client: &Arc<Client>) -> Result<Vec<Light>> {
    let devices = find_devices(client).await?;
    Ok(of_kind(devices, DeviceKind::Light).map(Light::from).collect())
}

/// Strips and beams, each with its zone count read.
pub async fn find_multizones(client: &Arc<Client>) -> Result<Vec<MultiZone>> {
    let devices = find_devices(client).await?;
    let mut multizones = Vec::new();
    for device in of_kind(devices, DeviceKind::MultiZone) {
        multizones.push(MultiZone::connect(device).await);
    }
    Ok(multizones)
}

pub async fn find_tiles(client: &Arc<Client>) -> Result<Vec<Tile>> {
    let devices = find_devices(client).await?;
    Ok(of_kind(devices, DeviceKind::Matrix).map(Tile::from).collect())
}

pub async fn find_relays(client: &Arc<Client>) -> Result<Vec<Relay>> {
    let devices = find_devices(client).await?;
    Ok(of_kind(devices, DeviceKind::Relay).map(Relay::from).collect())
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use super::*;
    use crate::frame::Frame;
    use crate::messages::Payload;
    use crate::messages::device::{StateGroup, StateLabel, StateLocation, StateVersion};
    use crate::messages::multizone::StateExtendedColorZones;
    use crate::transport::mock::MockTransport;

    struct Fake {
        addr: SocketAddr,
        mac: MacAddress,
        label: &'static str,
        product: u32,
        /// Answers discovery but nothing after it.
        flaky: bool,
    }

    fn fleet() -> Vec<Fake> {
        vec![
            Fake {
                addr: "192.168.1.10:56700".parse().unwrap(),
                mac: MacAddress::new([0xd0, 0x73, 0xd5, 0, 0, 0x10]),
                label: "Desk",
                product: 27,
                flaky: false,
            },
            Fake {
                addr: "192.168.1.11:56700".parse().unwrap(),
                mac: MacAddress::new([0xd0, 0x73, 0xd5, 0, 0, 0x11]),
                label: "TV Strip",
                product: 32,
                flaky: false,
            },
            Fake {
                addr: "192.168.1.12:56700".parse().unwrap(),
                mac: MacAddress::new([0xd0, 0x73, 0xd5, 0, 0, 0x12]),
                label: "Wall",
                product: 55,
                flaky: false,
            },
            Fake {
                addr: "192.168.1.13:56700".parse().unwrap(),
                mac: MacAddress::new([0xd0, 0x73, 0xd5, 0, 0, 0x13]),
                label: "Switch",
                product: 70,
                flaky: false,
            },
            Fake {
                addr: "192.168.1.14:56700".parse().unwrap(),
                mac: MacAddress::new([0xd0, 0x73, 0xd5, 0, 0, 0x14]),
                label: "Garage",
                product: 27,
                flaky: true,
            },
        ]
    }

    fn answer(fake: &Fake, request: &Frame) -> Vec<Box<dyn Payload>> {
        match request.message_type() {
            2 => vec![
                Box::new(StateService {
                    service: Service::Udp,
                    port: 56700,
                }),
                Box::new(StateService {
                    service: Service::Reserved4,
                    port: 56700,
                }),
            ],
            _ if fake.flaky => Vec::new(),
            23 => vec![Box::new(StateLabel {
                label: fake.label.into(),
            })],
            32 => vec![Box::new(StateVersion {
                vendor: 1,
                product: fake.product,
            })],
            48 => vec![Box::new(StateLocation::default())],
            51 => vec![Box::new(StateGroup::default())],
            511 => vec![Box::new(StateExtendedColorZones {
                zones_count: 24,
                ..Default::default()
            })],
            _ => Vec::new(),
        }
    }

    /// Every fake answers broadcasts; unicast requests reach only their target.
    fn network() -> MockTransport {
        MockTransport::new(|request, to, _| {
            fleet()
                .iter()
                .filter(|fake| request.transport.tagged || fake.addr == to)
                .flat_map(|fake| {
                    answer(fake, request).into_iter().map(move |payload| {
                        let reply = Frame::new(
                            payload.as_ref(),
                            request.transport.source,
                            Some(fake.mac),
                            false,
                            false,
                            request.sequence(),
                        );
                        (reply.to_bytes().to_vec(), fake.addr)
                    })
                })
                .collect()
        })
    }

    #[tokio::test]
    async fn test_find_devices() {
        let transport = network();
        let client = transport.client();
        let devices = find_devices(&client).await.unwrap();

        let labels: Vec<_> = devices.iter().map(|d| d.label().unwrap()).collect();
        assert_eq!(labels, ["Desk", "TV Strip", "Wall", "Switch"]);
        assert_eq!(devices[1].kind(), Some(DeviceKind::MultiZone));
        assert_eq!(devices[0].target().addr, "192.168.1.10:56700".parse().unwrap());
    }

    #[tokio::test]
    async fn test_find_by_label_ignores_case() {
        let client = network().client();
        let device = find_device_by_label(&client, "tv strip").await.unwrap().unwrap();
        assert_eq!(device.mac(), MacAddress::new([0xd0, 0x73, 0xd5, 0, 0, 0x11]));
        assert!(find_device_by_label(&client, "Attic").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_by_mac() {
        let client = network().client();
        let device = find_device_by_mac(&client, "D0:73:D5:00:00:12")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(device.label(), Some("Wall"));
        assert!(find_device_by_mac(&client, "not a mac").await.is_err());
    }

    #[tokio::test]
    async fn test_typed_filters() {
        let client = network().client();
        assert_eq!(find_lights(&client).await.unwrap().len(), 1);
        assert_eq!(find_tiles(&client).await.unwrap().len(), 1);
        assert_eq!(find_relays(&client).await.unwrap().len(), 1);

        let strips = find_multizones(&client).await.unwrap();
        assert_eq!(strips.len(), 1);
        assert_eq!(strips[0].zones_count(), 24);
    }
}
