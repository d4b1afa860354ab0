//! CLI application for controlling LIFX devices.
//!
//! This example demonstrates a command-line interface that discovers devices
//! and addresses one of them by label or MAC address.
//!
//! Run with: cargo run --example lifx_cli -- --help

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use lifx_lan_rs::{
    Client, ClientConfig, Device, Hsbk, Light, find_device_by_label, find_device_by_mac,
    find_devices,
};

#[derive(Parser)]
#[command(name = "lifx-cli")]
#[command(about = "Control LIFX devices from the command line", long_about = None)]
struct Cli {
    /// Label of the device to control (not required for discover)
    #[arg(short, long, global = true)]
    label: Option<String>,

    /// MAC address of the device to control, e.g. d0:73:d5:43:47:86
    #[arg(short, long, global = true)]
    mac: Option<String>,

    /// Broadcast address used for discovery
    #[arg(short, long, global = true, default_value = "255.255.255.255")]
    broadcast: IpAddr,

    /// Milliseconds to wait for each reply
    #[arg(short, long, global = true, default_value = "250")]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover all devices on the network
    Discover,

    /// Show the state of the device
    Status,

    /// Turn the device on
    On,

    /// Turn the device off
    Off,

    /// Set RGB color (0-255 for each component)
    Color {
        /// Red component (0-255)
        red: u8,
        /// Green component (0-255)
        green: u8,
        /// Blue component (0-255)
        blue: u8,
        /// Color temperature in Kelvin
        #[arg(short, long, default_value = "3500")]
        kelvin: u16,
        /// Fade time in milliseconds
        #[arg(short, long, default_value = "0")]
        fade: u64,
    },

    /// Rename the device
    Rename {
        /// New label (at most 32 bytes)
        new_label: String,
    },

    /// Restart the device
    Reboot,
}

async fn select_device(cli: &Cli, client: &Arc<Client>) -> Result<Device, Box<dyn std::error::Error>> {
    let device = match (&cli.label, &cli.mac) {
        (_, Some(mac)) => find_device_by_mac(client, mac).await?,
        (Some(label), None) => find_device_by_label(client, label).await?,
        (None, None) => return Err("a device is required for this command. Use --label or --mac".into()),
    };
    device.ok_or_else(|| "no matching device found".into())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = ClientConfig {
        broadcast_address: cli.broadcast,
        timeout_ms: cli.timeout,
        ..Default::default()
    };
    let client = Arc::new(Client::new(config));

    if let Commands::Discover = cli.command {
        println!("Discovering LIFX devices on the network...");
        let devices = find_devices(&client).await?;
        if devices.is_empty() {
            println!("No devices found on the network.");
        } else {
            println!("\nFound {} device(s):", devices.len());
            for device in devices {
                println!(
                    "  {:20} MAC: {}  IP: {}",
                    device.label().unwrap_or("?"),
                    device.mac(),
                    device.ip()
                );
            }
        }
        return Ok(());
    }

    let mut device = select_device(&cli, &client).await?;
    let name = device.label().unwrap_or("?").to_string();

    match cli.command {
        Commands::Discover => unreachable!(),

        Commands::Status => {
            println!("Getting status for {}...", name);
            let light = Light::from(device);
            match light.get_color().await {
                Ok(state) => {
                    let (red, green, blue) = state.color.to_rgb();
                    println!("\nStatus:");
                    println!("  Power: {}", if state.power > 0 { "ON" } else { "OFF" });
                    println!("  Color: RGB({}, {}, {})", red, green, blue);
                    println!("  Temperature: {}K", state.color.kelvin);
                }
                Err(e) => eprintln!("Error getting status: {}", e),
            }
        }

        Commands::On => {
            println!("Turning {} ON...", name);
            match device.set_power(true).await {
                Ok(_) => println!("Device turned ON"),
                Err(e) => eprintln!("Error: {}", e),
            }
        }

        Commands::Off => {
            println!("Turning {} OFF...", name);
            match device.set_power(false).await {
                Ok(_) => println!("Device turned OFF"),
                Err(e) => eprintln!("Error: {}", e),
            }
        }

        Commands::Color {
            red,
            green,
            blue,
            kelvin,
            fade,
        } => {
            println!("Setting {} to RGB({}, {}, {})...", name, red, green, blue);
            let light = Light::from(device);
            let color = Hsbk::from_rgbk(red, green, blue, kelvin);
            match light
                .set_color(color, Duration::from_millis(fade), true)
                .await
            {
                Ok(_) => println!("Color set successfully"),
                Err(e) => eprintln!("Error: {}", e),
            }
        }

        Commands::Rename { new_label } => {
            println!("Renaming {} to '{}'...", name, new_label);
            match device.set_label(&new_label).await {
                Ok(label) => println!("Device is now '{}'", label),
                Err(e) => eprintln!("Error: {}", e),
            }
        }

        Commands::Reboot => {
            println!("Rebooting {}...", name);
            device.reboot().await?;
            println!("Reboot sent");
        }
    }

    Ok(())
}
