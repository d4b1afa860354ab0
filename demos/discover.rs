//! Discover every LIFX device on the network and print what it is.
//!
//! This example demonstrates:
//! - Broadcast discovery of devices on the local network
//! - Reading the cached label, group and product class of each device
//! - Querying one extra property per device
//!
//! Run with: cargo run --example discover

use std::sync::Arc;

use lifx_lan_rs::{Client, ClientConfig, find_devices};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client = Arc::new(Client::new(ClientConfig::default()));

    println!("Discovering LIFX devices on the network...");
    let devices = find_devices(&client).await?;

    if devices.is_empty() {
        println!("No devices found on the network.");
        return Ok(());
    }

    println!("Found {} device(s):", devices.len());
    for device in &devices {
        println!(
            "  - {:20} MAC: {}  IP: {:15}  Kind: {:?}  Group: {}",
            device.label().unwrap_or("?"),
            device.mac(),
            device.ip().to_string(),
            device.kind(),
            device.group().map(|g| g.label.as_str()).unwrap_or("?"),
        );
        match device.get_wifi_info().await {
            Ok(wifi) => match wifi.rssi() {
                Some(rssi) => println!("      Signal: {} dBm", rssi),
                None => println!("      Signal: none"),
            },
            Err(e) => eprintln!("      Could not read signal: {}", e),
        }
    }

    let summary = client.history().await.summary();
    println!(
        "\nSent {} frames, kept {} replies.",
        summary.send_count, summary.receive_count
    );
    Ok(())
}
