//! Register, edit, wake and remove a device
//!
//! Uses a scratch data directory so the real registry is left alone.

use tracing_subscriber::EnvFilter;
use wolkit::{Commands, Config, DeviceDraft};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .init();

    let data_dir = std::env::temp_dir().join("wolkit-demo");
    let config = Config::default().with_data_dir(&data_dir);
    let commands = Commands::open(&config).await?;

    let loaded = commands.load_devices().await;
    if let Some(e) = &loaded.error {
        println!("⚠ Registry unreadable: {}", e);
    }
    println!("{} device(s) in {:?}", loaded.devices.len(), config.devices_path());

    // Add
    let devices = commands
        .add_device(DeviceDraft::new("Workstation", "aa-bb-cc-dd-ee-ff").with_target("127.0.0.1"))
        .await?;
    let mut device = devices
        .last()
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("device was not added"))?;
    println!("✓ Added {}", device);

    // Update
    device.name = "Workstation (office)".to_string();
    device.port = Some(7);
    commands.update_device(device.clone()).await?;
    println!("✓ Updated {}", device);

    // Wake
    commands.wake_device(&device.id).await?;
    println!("✓ Woke {}", device.name);

    // Invalid input is rejected without touching the registry
    if let Err(e) = commands.add_device(DeviceDraft::new("Broken", "not-a-mac")).await {
        println!("✗ {}", serde_json::to_string(&e.report())?);
    }

    // Delete
    let remaining = commands.delete_device(&device.id).await?;
    println!("✓ Deleted, {} device(s) left", remaining.len());

    Ok(())
}
