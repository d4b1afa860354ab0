//! # lifx_lan_rs
//!
//! An async Rust client for LIFX smart lights on the local network.
//!
//! This crate speaks the LIFX LAN protocol over UDP: it frames typed messages,
//! sends them to one device or to the whole broadcast domain, and correlates
//! the replies that come back, retrying on silence. It is **runtime-agnostic**:
//! the same API runs on tokio, async-std or smol.
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use lifx_lan_rs::{Client, Hsbk, find_lights};
//!
//! async fn paint_everything_red() -> Result<(), lifx_lan_rs::Error> {
//!     let client = Arc::new(Client::default());
//!     for light in find_lights(&client).await? {
//!         light
//!             .set_color(Hsbk::from_rgb(255, 0, 0), Duration::from_secs(1), true)
//!             .await?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Layers
//!
//! - **Codec and frames**: [`codec`] reads and writes the little-endian wire
//!   primitives; [`Frame`] is the 36-byte header plus payload.
//! - **Messages**: [`messages`] holds the catalog, one struct per message type.
//!   A [`PayloadRegistry`] maps inbound type tags back to decoders.
//! - **Engine**: [`Client::request`] sends a frame, collects and deduplicates
//!   replies, and retries on timeout. A [`CancelToken`] stops it early.
//! - **Capabilities**: [`Device`] covers what every device supports;
//!   [`Light`], [`MultiZone`], [`Tile`] and [`Relay`] wrap it.
//! - **Discovery**: [`find_devices`] and friends locate devices by broadcast.
//!
//! ## Communication
//!
//! Devices listen on UDP port 56700. Each request binds its own ephemeral
//! local port, so replies for concurrent requests never mix.
//!
//! ## Runtime Selection
//!
//! This library is runtime-agnostic. Select your preferred runtime using feature flags:
//!
//! ### Using tokio (default)
//!
//! ```toml
//! [dependencies]
//! lifx-lan-rs = "0.1"
//! tokio = { version = "1", features = ["rt-multi-thread", "macros"] }
//! ```
//!
//! ### Using async-std
//!
//! ```toml
//! [dependencies]
//! lifx-lan-rs = { version = "0.1", default-features = false, features = ["runtime-async-std"] }
//! async-std = { version = "1.12", features = ["attributes"] }
//! ```
//!
//! ### Using smol
//!
//! ```toml
//! [dependencies]
//! lifx-lan-rs = { version = "0.1", default-features = false, features = ["runtime-smol"] }
//! smol = "2"
//! ```
//!
//! ## Feature Flags
//!
//! - `runtime-tokio` (default): Use the tokio async runtime
//! - `runtime-async-std`: Use the async-std runtime
//! - `runtime-smol`: Use the smol runtime

mod cancel;
mod client;
pub mod codec;
mod config;
mod device;
mod discovery;
mod errors;
pub mod frame;
mod history;
mod light;
pub mod messages;
mod multizone;
mod registry;
mod relay;
pub mod runtime;
mod sequence;
mod tile;
pub mod transport;
mod types;

// Re-export public API
pub use cancel::{CancelToken, Cancelled};
pub use client::{Client, Response, Target};
pub use config::{ClientConfig, DeviceConfig, MAX_RETRIES, PORT, RequestOptions, TIMEOUT_MS};
pub use device::Device;
pub use discovery::{
    find_device_by_label, find_device_by_mac, find_devices, find_lights, find_multizones,
    find_relays, find_tiles,
};
pub use errors::Error;
pub use frame::Frame;
pub use history::{HistoryEntry, HistorySummary, MessageDirection, MessageHistory};
pub use light::Light;
pub use messages::{Message, Payload};
pub use multizone::{MultiZone, ZoneColors};
pub use registry::{Factory, PayloadRegistry};
pub use relay::Relay;
pub use sequence::SequenceAllocator;
pub use tile::Tile;
pub use types::{
    ApplicationRequest, DeviceKind, Direction, ExtendedApplicationRequest, Hsbk,
    LastHevCycleResult, MacAddress, MultiZoneEffectType, PowerLevel, Service, TileEffectType,
    Waveform,
};
